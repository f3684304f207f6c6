pub mod check;
pub mod checks;
pub mod cli;
pub mod config;
pub mod drivetrain;
pub mod output;
pub mod parse;
pub mod runner;
pub mod salt;
