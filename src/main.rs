use std::process::ExitCode;

use thiserror::Error;
use tracing::{error, info, warn};

use ledger_bridge::config::{CliConfig, NetworkConfig, NetworkConfigError, Operation};
use ledger_bridge::{Bridge, FabricConnector, GatewayError, STATUS_OK, logging};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const APP_NAME: &str = "ledger-bridge";

// -----------------------------------------------------------------------------
// ----- Main ------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = match CliConfig::from_args() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{APP_NAME}: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(cli.log_level.directive());

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{APP_NAME} failed: {e}");
            ExitCode::FAILURE
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Run -------------------------------------------------------------------

fn run(cli: &CliConfig) -> Result<(), RunError> {
    let network = NetworkConfig::from_file(&cli.network_file_location)?;
    let params = network.connect_params();
    let host = params.pool_key();

    let bridge = Bridge::new(FabricConnector::new()?);

    if bridge.init(&params) != STATUS_OK {
        return Err(RunError::Init {
            host: host.to_string(),
        });
    }
    info!("{APP_NAME} connected to {host}");

    let outcome = match &cli.operation {
        Operation::Write {
            function,
            table,
            payload,
        } => match bridge.write(payload, function, table, host) {
            STATUS_OK => Ok(()),
            _ => Err(RunError::Write {
                function: function.clone(),
                table: table.clone(),
            }),
        },
        Operation::Read {
            function,
            table,
            payload,
        } => bridge
            .read(payload, function, table, host)
            .map(|value| println!("{}", String::from_utf8_lossy(&value)))
            .map_err(|_| RunError::Read {
                function: function.clone(),
                table: table.clone(),
            }),
    };

    if bridge.close(&params.contract, host) != STATUS_OK {
        warn!("{APP_NAME} could not release the session for {host}");
    }

    outcome
}

// -----------------------------------------------------------------------------
// ----- Errors ----------------------------------------------------------------

#[derive(Debug, Error)]
enum RunError {
    #[error("network config: {0}")]
    Network(#[from] NetworkConfigError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("could not connect to {host}")]
    Init { host: String },

    #[error("write {function} on {table} was not committed")]
    Write { function: String, table: String },

    #[error("read {function} on {table} failed")]
    Read { function: String, table: String },
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
