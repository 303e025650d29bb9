pub mod config;
pub mod history;
pub mod stats;
pub mod timer;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;
