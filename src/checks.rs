pub mod cinder;
pub mod drivetrain;
