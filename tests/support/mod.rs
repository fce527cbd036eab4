use std::ffi::{CString, c_char};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

pub fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

/// A port nothing listens on once this returns.
#[allow(dead_code)]
pub fn reserve_port(host: &str) -> u16 {
    let addr = format!("{host}:0");
    let listener = TcpListener::bind(&addr).expect("bind ephemeral port");
    listener.local_addr().unwrap().port()
}

#[allow(dead_code)]
pub fn wait_for_listen(host: &str, port: u16) {
    let addr = format!("{host}:{port}");
    for _ in 0..50 {
        if TcpStream::connect(&addr).is_ok() {
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
    panic!("nothing listening on {addr}");
}

/// Owned C strings for one call; pointers stay valid while this lives.
#[allow(dead_code)]
pub struct CArgs {
    strings: Vec<CString>,
}

#[allow(dead_code)]
impl CArgs {
    pub fn new(values: &[&str]) -> Self {
        Self {
            strings: values
                .iter()
                .map(|v| CString::new(*v).expect("no interior nul"))
                .collect(),
        }
    }

    pub fn ptr(&self, i: usize) -> *const c_char {
        self.strings[i].as_ptr()
    }
}

/// Init arguments in boundary order, pointing at the bundled fixtures.
#[allow(dead_code)]
pub fn init_args(peer_endpoint: &str, gateway_host: &str) -> CArgs {
    CArgs::new(&[
        "mychannel",
        "mycontract",
        "Org1MSP",
        &fixture("msp/signcerts/cert.pem"),
        &fixture("msp/keystore"),
        &fixture("tls/ca.crt"),
        peer_endpoint,
        gateway_host,
    ])
}

#[allow(dead_code)]
pub fn network_toml(peer_endpoint: &str, gateway_peer: &str) -> String {
    format!(
        r#"
[network]
channel_name = "mychannel"
contract_name = "mycontract"
msp_id = "Org1MSP"
cert_path = "{cert}"
key_path = "{key}"
tls_cert_path = "{tls}"
peer_endpoint = "{peer_endpoint}"
gateway_peer = "{gateway_peer}"
"#,
        cert = fixture("msp/signcerts/cert.pem"),
        key = fixture("msp/keystore"),
        tls = fixture("tls/ca.crt"),
    )
}
