use serde_json::Value;

use soroban_connect_core::PortError;

pub(crate) async fn call(
    client: &reqwest::Client,
    url: &str,
    method: &str,
    params: Value,
) -> Result<Value, PortError> {
    let payload = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params,
    });
    let response = client
        .post(url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| PortError::Transport(format!("{method} request failed: {e}")))?;
    let status = response.status();
    let body: Value = response
        .json()
        .await
        .map_err(|e| PortError::Transport(format!("{method} json decode failed: {e}")))?;
    if !status.is_success() {
        return Err(PortError::Transport(format!(
            "{method} status {status}: {body}"
        )));
    }
    if let Some(err) = body.get("error") {
        return Err(PortError::Transport(format!("{method} returned error: {err}")));
    }
    body.get("result")
        .cloned()
        .ok_or_else(|| PortError::Transport(format!("{method} response missing result")))
}

pub(crate) fn client(timeout: std::time::Duration) -> Result<reqwest::Client, PortError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| PortError::Transport(format!("failed to build http client: {e}")))
}
