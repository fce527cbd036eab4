pub mod cli;
pub mod network;

pub use cli::{CliConfig, CliError, Operation};
pub use network::{NetworkConfig, NetworkConfigError};
