//! ureq-backed `Transport`.
//!
//! ureq is blocking, so each exchange runs on tokio's blocking pool. The two
//! list fetches of a load or refresh therefore still overlap.

use std::future::Future;

use petstore_core::{ApiError, HttpMethod, HttpRequest, HttpResponse, Transport};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// An agent that returns 4xx/5xx responses as data so the core client
    /// can classify them.
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse, ApiError>> {
        let agent = self.agent.clone();
        async move {
            tokio::task::spawn_blocking(move || execute(&agent, request))
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))?
        }
    }
}

fn execute(agent: &ureq::Agent, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    debug!(method = req.method.as_str(), url = %req.url, "sending request");
    let result = match (req.method, req.body) {
        (HttpMethod::Get, _) => {
            let mut builder = agent.get(&req.url);
            for (key, value) in &req.headers {
                builder = builder.header(key, value);
            }
            builder.call()
        }
        (HttpMethod::Post, body) => {
            let mut builder = agent.post(&req.url);
            for (key, value) in &req.headers {
                builder = builder.header(key, value);
            }
            builder.send(body.unwrap_or_default().as_bytes())
        }
    };
    let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    Ok(HttpResponse { status, headers, body })
}
