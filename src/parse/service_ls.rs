#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replicas {
    pub running: String,
    pub desired: String,
}

impl Replicas {
    pub fn parse(token: &str) -> Option<Self> {
        let (running, desired) = token.split_once('/')?;
        Some(Self {
            running: running.to_string(),
            desired: desired.to_string(),
        })
    }

    pub fn is_satisfied(&self) -> bool {
        !self.running.is_empty() && self.running == self.desired
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub line: String,
    pub name: String,
    pub mode: String,
    pub replicas: Option<Replicas>,
    pub image: Option<String>,
}

impl ServiceDescriptor {
    pub fn is_replicated(&self) -> bool {
        self.mode == "replicated"
    }

    pub fn replicas_satisfied(&self) -> bool {
        self.replicas.as_ref().is_some_and(Replicas::is_satisfied)
    }

    pub fn version(&self) -> Option<&str> {
        let image = self.image.as_deref()?;
        let image = image.split('@').next().unwrap_or(image);
        let (_, tag) = image.rsplit_once(':')?;
        if tag.is_empty() || tag.contains('/') {
            return None;
        }
        Some(tag)
    }
}

// ID NAME MODE REPLICAS IMAGE PORTS; newer docker appends "(max N per node)" to REPLICAS.
pub fn parse_service_ls(output: &str) -> Vec<ServiceDescriptor> {
    output
        .lines()
        .filter_map(|line| {
            let mut tokens = line.split_whitespace();
            let id = tokens.next()?;
            if id == "ID" {
                return None;
            }

            let name = tokens.next().unwrap_or_default().to_string();
            let mode = tokens.next().unwrap_or_default().to_string();
            let replicas = tokens.next().and_then(Replicas::parse);

            let mut image = tokens.next();
            if image.is_some_and(|token| token.starts_with("(max")) {
                let _ = tokens.by_ref().find(|token| token.ends_with(')'));
                image = tokens.next();
            }

            Some(ServiceDescriptor {
                line: line.trim().to_string(),
                name,
                mode,
                replicas,
                image: image.map(String::from),
            })
        })
        .collect()
}
