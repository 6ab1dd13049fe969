#![allow(dead_code)]

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use tiny_http::{Method, Response, Server, StatusCode};

pub const ACCOUNT: &str = "GCFIRY65OQE7DFP5KLNS2PF2LVZMUZYJX4OZIEQ36N2IQANUB5XVYOJR";

/// JSON-RPC methods the mock received, in order.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Base64 `LedgerEntryData::Account` with the given sequence number.
pub fn account_entry_xdr(sequence: i64) -> String {
    let mut entry = vec![0u8; 4 + 36];
    entry.extend_from_slice(&10_000_000i64.to_be_bytes());
    entry.extend_from_slice(&sequence.to_be_bytes());
    entry.extend_from_slice(&[0u8; 24]);
    STANDARD.encode(entry)
}

/// Serves JSON-RPC over HTTP; `handler` maps `(method, params)` to either a
/// result or an error object.
pub fn spawn_jsonrpc_server<F>(handler: F) -> (String, CallLog)
where
    F: Fn(&str, &Value) -> Result<Value, Value> + Send + 'static,
{
    let server = Server::http("127.0.0.1:0").expect("start server");
    let addr = format!("http://{}", server.server_addr());
    let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&calls);

    thread::spawn(move || {
        for mut req in server.incoming_requests() {
            let mut body = String::new();
            if req.as_reader().read_to_string(&mut body).is_err() {
                continue;
            }
            let request: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
            let method = request
                .get("method")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned();
            if let Ok(mut g) = log.lock() {
                g.push(method.clone());
            }

            let payload = match handler(&method, &request["params"]) {
                Ok(result) => json!({"jsonrpc": "2.0", "id": request["id"], "result": result}),
                Err(error) => json!({"jsonrpc": "2.0", "id": request["id"], "error": error}),
            };
            let response =
                Response::from_string(payload.to_string()).with_status_code(StatusCode(200));
            let _ = req.respond(response);
        }
    });

    (addr, calls)
}

/// Serves `GET /accounts/{id}` for a single known account.
pub fn spawn_horizon_server(account: &'static str, sequence: &'static str) -> String {
    let server = Server::http("127.0.0.1:0").expect("start server");
    let addr = format!("http://{}", server.server_addr());

    thread::spawn(move || {
        for req in server.incoming_requests() {
            let (code, payload) = match (req.method(), req.url()) {
                (Method::Get, path) if path == format!("/accounts/{account}") => (
                    200,
                    json!({"id": account, "account_id": account, "sequence": sequence}),
                ),
                (Method::Get, path) if path.starts_with("/accounts/") => {
                    (404, json!({"status": 404, "title": "Resource Missing"}))
                }
                _ => (500, json!({"title": "unexpected request"})),
            };
            let response =
                Response::from_string(payload.to_string()).with_status_code(StatusCode(code));
            let _ = req.respond(response);
        }
    });

    addr
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().expect("call log").clone()
}
