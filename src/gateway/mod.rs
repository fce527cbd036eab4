pub mod fabric;
pub mod pool;
pub mod proposal;
pub mod session;
pub mod transaction;

#[cfg(test)]
pub(crate) mod testing;

pub use fabric::{FabricConnector, FabricSession, FabricTransport};
pub use pool::{ConnectParams, ConnectionPool, SessionHandle};
pub use session::{Commit, Connector, GatewaySession, Transport};
pub use transaction::TransactionGateway;
