//! Executes `HttpRequest` values over the network with ureq.
//!
//! Status codes are returned as data (`http_status_as_error(false)`), so a
//! 4xx/5xx never becomes a transport error; interpreting them is left to the
//! client's `parse_*` methods. Each call is a single attempt.

use tracing::debug;
use ureq::Agent;

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[derive(Clone)]
pub struct HttpTransport {
    agent: Agent,
    default_headers: Vec<(String, String)>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("default_headers", &self.default_headers)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout))
            .build()
            .new_agent();
        Self {
            agent,
            default_headers: config.default_headers.clone(),
        }
    }

    pub fn execute(&self, req: HttpRequest) -> Result<HttpResponse> {
        debug!(method = req.method.as_str(), url = %req.url, "sending request");

        let headers = self.default_headers.iter().chain(req.headers.iter());
        let result = match req.method {
            HttpMethod::Get => with_headers(self.agent.get(&req.url), headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(&req.url), headers).call(),
            HttpMethod::Post => send(with_headers(self.agent.post(&req.url), headers), req.body.as_deref()),
            HttpMethod::Put => send(with_headers(self.agent.put(&req.url), headers), req.body.as_deref()),
            HttpMethod::Patch => send(with_headers(self.agent.patch(&req.url), headers), req.body.as_deref()),
        };

        let mut response = result.map_err(|e| match e {
            ureq::Error::Timeout(reason) => ApiError::Timeout(format!("{} {}: {reason}", req.method.as_str(), req.url)),
            other => ApiError::Transport(other.to_string()),
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response.body_mut().read_to_string().map_err(|e| match e {
            ureq::Error::Timeout(reason) => ApiError::Timeout(reason.to_string()),
            other => ApiError::Transport(other.to_string()),
        })?;

        debug!(status, bytes = body.len(), "received response");
        Ok(HttpResponse { status, headers, body })
    }
}

fn with_headers<'a, B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: impl Iterator<Item = &'a (String, String)>,
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<&str>,
) -> std::result::Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}
