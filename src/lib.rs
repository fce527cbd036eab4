pub mod config;
pub mod credentials;
pub mod errors;
pub mod ffi;
pub mod gateway;
pub mod identity;
pub mod logging;
pub mod protos;

pub use config::{CliConfig, NetworkConfig};
pub use errors::{GatewayError, STATUS_FAILED, STATUS_OK};
pub use ffi::Bridge;
pub use gateway::{ConnectParams, ConnectionPool, FabricConnector};
