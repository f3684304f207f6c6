mod job_config;
mod service_ls;

pub use job_config::branch_spec;
pub use service_ls::{Replicas, ServiceDescriptor, parse_service_ls};
