//! C ABI entry points.
//!
//! All strings are NUL-terminated UTF-8. Every function reports 0 on success
//! and 1 on failure; failure detail is written to the log only.

use std::ffi::{CStr, c_char, c_int};
use std::panic::{self, AssertUnwindSafe};

use once_cell::sync::OnceCell;
use tracing::error;

use super::bridge::Bridge;
use crate::errors::{STATUS_FAILED, STATUS_OK};
use crate::gateway::{ConnectParams, FabricConnector};
use crate::logging;

// -----------------------------------------------------------------------------
// ----- Singleton -------------------------------------------------------------

static LOGGING: OnceCell<()> = OnceCell::new();
static BRIDGE: OnceCell<Bridge<FabricConnector>> = OnceCell::new();

fn bridge() -> Option<&'static Bridge<FabricConnector>> {
    let result = BRIDGE.get_or_try_init(|| FabricConnector::new().map(Bridge::new));

    match result {
        Ok(bridge) => Some(bridge),
        Err(err) => {
            error!("ledger bridge unavailable: {err}");
            None
        }
    }
}

// -----------------------------------------------------------------------------
// ----- ReadResult ------------------------------------------------------------

/// Result of [`Read`]. On success `buffer` holds `length` bytes followed by a
/// NUL terminator and belongs to the caller, who must hand it back through
/// [`ReleaseBuffer`].
#[repr(C)]
#[derive(Debug)]
pub struct ReadResult {
    pub buffer: *mut c_char,
    pub length: c_int,
    pub status: c_int,
}

impl ReadResult {
    fn failed() -> Self {
        Self {
            buffer: std::ptr::null_mut(),
            length: 0,
            status: STATUS_FAILED,
        }
    }

    /// Copy `value` into a NUL-terminated heap buffer owned by the caller.
    fn from_value(value: &[u8]) -> Option<Self> {
        let Ok(length) = c_int::try_from(value.len()) else {
            error!("read failed: {} byte result does not fit the boundary", value.len());
            return None;
        };

        let mut owned = Vec::with_capacity(value.len() + 1);
        owned.extend_from_slice(value);
        owned.push(0);

        Some(Self {
            buffer: Box::into_raw(owned.into_boxed_slice()).cast::<c_char>(),
            length,
            status: STATUS_OK,
        })
    }
}

// -----------------------------------------------------------------------------
// ----- Exports ---------------------------------------------------------------

/// Open, or join, the gateway session keyed by `gateway_host`.
///
/// # Safety
/// Every argument must be null or point to a NUL-terminated string that stays
/// valid for the duration of the call.
#[allow(non_snake_case)]
#[allow(clippy::too_many_arguments)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Init(
    channel: *const c_char,
    contract_name: *const c_char,
    msp_id: *const c_char,
    cert_path: *const c_char,
    key_path: *const c_char,
    tls_cert_path: *const c_char,
    peer_endpoint: *const c_char,
    gateway_host: *const c_char,
) -> c_int {
    guard("init", STATUS_FAILED, || {
        let params = unsafe {
            ConnectParams {
                channel: arg(channel, "channel")?.to_string(),
                contract: arg(contract_name, "contractName")?.to_string(),
                msp_id: arg(msp_id, "mspID")?.to_string(),
                cert_path: arg(cert_path, "certPath")?.to_string(),
                key_path: arg(key_path, "keyPath")?.to_string(),
                tls_cert_path: arg(tls_cert_path, "tlsCertPath")?.to_string(),
                peer_endpoint: arg(peer_endpoint, "peerEndpoint")?.to_string(),
                gateway_host: arg(gateway_host, "gatewayHost")?.to_string(),
            }
        };

        Some(bridge()?.init(&params))
    })
}

/// Leave the session keyed by `gateway_host`; the last caller tears it down.
///
/// # Safety
/// See [`Init`].
#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Close(contract_name: *const c_char, gateway_host: *const c_char) -> c_int {
    guard("close", STATUS_FAILED, || {
        let (contract, host) = unsafe {
            (
                arg(contract_name, "contractName")?,
                arg(gateway_host, "gatewayHost")?,
            )
        };

        Some(bridge()?.close(contract, host))
    })
}

/// Submit `function(table_name, json_value)` and wait for it to commit.
///
/// # Safety
/// See [`Init`].
#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Write(
    json_value: *const c_char,
    function: *const c_char,
    table_name: *const c_char,
    gateway_host: *const c_char,
) -> c_int {
    guard("write", STATUS_FAILED, || {
        let (payload, function, table, host) = unsafe {
            (
                arg(json_value, "jsonValue")?,
                arg(function, "function")?,
                arg(table_name, "tableName")?,
                arg(gateway_host, "gatewayHost")?,
            )
        };

        Some(bridge()?.write(payload, function, table, host))
    })
}

/// Evaluate `function(table_name, json_value)` on a single peer.
///
/// # Safety
/// See [`Init`]. A non-null `buffer` in the result must be released with
/// [`ReleaseBuffer`] exactly once.
#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Read(
    json_value: *const c_char,
    function: *const c_char,
    table_name: *const c_char,
    gateway_host: *const c_char,
) -> ReadResult {
    guard("read", ReadResult::failed(), || {
        let (payload, function, table, host) = unsafe {
            (
                arg(json_value, "jsonValue")?,
                arg(function, "function")?,
                arg(table_name, "tableName")?,
                arg(gateway_host, "gatewayHost")?,
            )
        };

        let value = bridge()?.read(payload, function, table, host).ok()?;
        ReadResult::from_value(&value)
    })
}

/// Free a buffer returned by [`Read`].
///
/// # Safety
/// `buffer` must be null or a pointer returned by [`Read`] together with its
/// `length`, not released before.
#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ReleaseBuffer(buffer: *mut c_char, length: c_int) {
    if buffer.is_null() || length < 0 {
        return;
    }

    let len = length as usize + 1;
    let slice = std::ptr::slice_from_raw_parts_mut(buffer.cast::<u8>(), len);
    drop(unsafe { Box::from_raw(slice) });
}

// -----------------------------------------------------------------------------
// ----- Private helpers -------------------------------------------------------

/// # Safety
/// `ptr` must be null or point to a NUL-terminated string valid for `'a`.
unsafe fn arg<'a>(ptr: *const c_char, name: &str) -> Option<&'a str> {
    if ptr.is_null() {
        error!("argument {name} is null");
        return None;
    }

    match unsafe { CStr::from_ptr(ptr) }.to_str() {
        Ok(value) => Some(value),
        Err(e) => {
            error!("argument {name} is not valid utf-8: {e}");
            None
        }
    }
}

/// Run `f`, mapping `None` and panics to `failed`. Installs the subscriber
/// first so argument errors of the very first call are logged.
fn guard<T>(op: &str, failed: T, f: impl FnOnce() -> Option<T>) -> T {
    LOGGING.get_or_init(logging::init_from_env);

    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Some(value)) => value,
        Ok(None) => failed,
        Err(_) => {
            error!("{op} panicked");
            failed
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
