use std::collections::HashMap;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::error::AuthError;

#[derive(Debug, Clone, PartialEq)]
pub struct AuthRedirect {
    pub code: String,
    pub state: String,
}

/// Extracts the query parameters from the request line of a redirect,
/// e.g. `GET /callback?code=...&state=... HTTP/1.1`.
pub fn parse_redirect_request(request: &str) -> (String, HashMap<String, String>) {
    let target = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("");
    let (path, query) = target.split_once('?').unwrap_or((target, ""));

    let params = query
        .split('&')
        .filter_map(|kv| {
            let (k, v) = kv.split_once('=')?;
            Some((k.to_string(), v.to_string()))
        })
        .collect();
    (path.to_string(), params)
}

/// Validates the redirect parameters against the state we sent out.
pub fn redirect_from_params(
    params: &HashMap<String, String>,
    expected_state: &str,
) -> Result<AuthRedirect, AuthError> {
    if let Some(err) = params.get("error") {
        return Err(AuthError::Denied(err.clone()));
    }
    let code = params.get("code").ok_or(AuthError::MissingCode)?.clone();
    let state = params.get("state").cloned().unwrap_or_default();
    if state != expected_state {
        return Err(AuthError::StateMismatch);
    }
    Ok(AuthRedirect { code, state })
}

/// Listens on `addr` until Spotify redirects the browser back to `path`.
pub async fn wait_for_auth_code(
    addr: &str,
    path: &str,
    expected_state: &str,
) -> Result<AuthRedirect, AuthError> {
    let listener = TcpListener::bind(addr).await.map_err(AuthError::Listener)?;
    info!("Waiting for Spotify auth redirect on http://{addr}{path} ...");

    loop {
        let (mut stream, _) = listener.accept().await.map_err(AuthError::Listener)?;
        let mut buf = vec![0u8; 8192];
        let n = stream.read(&mut buf).await.map_err(AuthError::Listener)?;
        let request = String::from_utf8_lossy(&buf[..n]);

        let (req_path, params) = parse_redirect_request(&request);
        if req_path != path {
            // browsers also ask for /favicon.ico and friends
            debug!(path = %req_path, "ignoring unrelated request");
            let _ = stream
                .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                .await;
            continue;
        }

        let result = redirect_from_params(&params, expected_state);
        let message = match &result {
            Ok(_) => "Login complete. You can close this tab and return to your terminal.",
            Err(_) => "Login failed. Return to your terminal for details.",
        };
        let body = format!(
            "<!DOCTYPE html><html><head><title>likeshelf</title></head>\
             <body style=\"font-family: monospace; text-align: center; margin-top: 20vh\">\
             <h1>likeshelf</h1><p>{message}</p></body></html>"
        );
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        stream
            .write_all(response.as_bytes())
            .await
            .map_err(AuthError::Listener)?;
        stream.flush().await.map_err(AuthError::Listener)?;

        return result;
    }
}
