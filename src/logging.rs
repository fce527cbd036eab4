use tracing_subscriber::{EnvFilter, fmt};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

/// Filter directives for the operational log when loaded as a library.
pub const LOG_ENV: &str = "LEDGER_BRIDGE_LOG";

// -----------------------------------------------------------------------------
// ----- LogLevel --------------------------------------------------------------

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Logging: Exported -----------------------------------------------------

/// Install the global subscriber, writing to stderr. A no-op if the host
/// already installed one.
pub fn init(directives: &str) {
    let filter = EnvFilter::try_new(directives)
        .unwrap_or_else(|_| EnvFilter::new(LogLevel::default().directive()));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Same as [`init`], reading directives from `LEDGER_BRIDGE_LOG`.
pub fn init_from_env() {
    match std::env::var(LOG_ENV) {
        Ok(directives) => init(&directives),
        Err(_) => init(LogLevel::default().directive()),
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
