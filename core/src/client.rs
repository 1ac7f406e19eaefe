//! Typed client for the objects API.
//!
//! # Design
//! Each CRUD operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`. Both
//! are pure and unit-tested without a server. The public operation methods
//! (`list_all`, `get_by_id`, `create`, ...) chain build, exactly one round
//! trip through `HttpTransport`, and parse. Nothing is cached and nothing is
//! retried.

use tracing::info;

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RawResponse};
use crate::transport::HttpTransport;
use crate::types::{CreateOrReplaceRequest, DeleteOutcome, ObjectRecord, PartialUpdate};

#[derive(Debug, Clone)]
pub struct ObjectsClient {
    base_url: String,
    transport: HttpTransport,
}

impl ObjectsClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            transport: HttpTransport::new(&config),
        }
    }

    /// Client with default settings pointed at `base_url`.
    pub fn with_base_url(base_url: &str) -> Self {
        Self::new(ClientConfig::default().with_base_url(base_url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    pub fn list_all(&self) -> Result<Vec<ObjectRecord>> {
        self.parse_list(self.transport.execute(self.build_list_all())?)
    }

    pub fn list_by_ids(&self, ids: &[&str]) -> Result<Vec<ObjectRecord>> {
        self.parse_list(self.transport.execute(self.build_list_by_ids(ids))?)
    }

    /// Fetch one record. A missing id is a `RequestFailed` with status 404.
    pub fn get_by_id(&self, id: &str) -> Result<ObjectRecord> {
        self.parse_get(self.transport.execute(self.build_get(id))?)
    }

    /// Fetch one record without validating the status.
    pub fn get_by_id_raw(&self, id: &str) -> Result<RawResponse> {
        self.transport.execute(self.build_get(id))
    }

    pub fn create(&self, request: &CreateOrReplaceRequest) -> Result<ObjectRecord> {
        let record = self.parse_create(self.transport.execute(self.build_create(request)?)?)?;
        info!(id = %record.id, name = %record.name, "created object");
        Ok(record)
    }

    /// Replace name and data of `id` wholesale.
    pub fn replace(&self, id: &str, request: &CreateOrReplaceRequest) -> Result<ObjectRecord> {
        self.parse_replace(self.transport.execute(self.build_replace(id, request)?)?)
    }

    /// Change only the fields present in `update`.
    pub fn patch(&self, id: &str, update: &PartialUpdate) -> Result<ObjectRecord> {
        self.parse_patch(self.transport.execute(self.build_patch(id, update)?)?)
    }

    pub fn delete(&self, id: &str) -> Result<DeleteOutcome> {
        let outcome = self.parse_delete(self.transport.execute(self.build_delete(id))?)?;
        info!(id, status = outcome.status, "deleted object");
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Request builders
    // -----------------------------------------------------------------------

    pub fn build_list_all(&self) -> HttpRequest {
        self.bare(HttpMethod::Get, format!("{}/objects", self.base_url))
    }

    pub fn build_list_by_ids(&self, ids: &[&str]) -> HttpRequest {
        if ids.is_empty() {
            return self.build_list_all();
        }
        let query = ids
            .iter()
            .map(|id| format!("id={}", urlencoding::encode(id)))
            .collect::<Vec<_>>()
            .join("&");
        self.bare(HttpMethod::Get, format!("{}/objects?{query}", self.base_url))
    }

    pub fn build_get(&self, id: &str) -> HttpRequest {
        self.bare(HttpMethod::Get, self.object_url(id))
    }

    pub fn build_create(&self, request: &CreateOrReplaceRequest) -> Result<HttpRequest> {
        json_request(HttpMethod::Post, format!("{}/objects", self.base_url), request)
    }

    pub fn build_replace(&self, id: &str, request: &CreateOrReplaceRequest) -> Result<HttpRequest> {
        json_request(HttpMethod::Put, self.object_url(id), request)
    }

    pub fn build_patch(&self, id: &str, update: &PartialUpdate) -> Result<HttpRequest> {
        json_request(HttpMethod::Patch, self.object_url(id), update)
    }

    pub fn build_delete(&self, id: &str) -> HttpRequest {
        self.bare(HttpMethod::Delete, self.object_url(id))
    }

    /// `id` is percent-encoded as a single path segment.
    fn object_url(&self, id: &str) -> String {
        format!("{}/objects/{}", self.base_url, urlencoding::encode(id))
    }

    fn bare(&self, method: HttpMethod, url: String) -> HttpRequest {
        HttpRequest {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    // -----------------------------------------------------------------------
    // Response parsers
    // -----------------------------------------------------------------------

    /// An empty array is a valid, successful answer. Every element must carry
    /// an id, same as a single read.
    pub fn parse_list(&self, response: HttpResponse) -> Result<Vec<ObjectRecord>> {
        check_success(&response)?;
        let records: Vec<ObjectRecord> =
            serde_json::from_str(&response.body).map_err(|e| ApiError::DecodeFailed(e.to_string()))?;
        records.iter().try_for_each(ensure_id)?;
        Ok(records)
    }

    pub fn parse_get(&self, response: HttpResponse) -> Result<ObjectRecord> {
        parse_record(response)
    }

    pub fn parse_create(&self, response: HttpResponse) -> Result<ObjectRecord> {
        parse_record(response)
    }

    pub fn parse_replace(&self, response: HttpResponse) -> Result<ObjectRecord> {
        parse_record(response)
    }

    pub fn parse_patch(&self, response: HttpResponse) -> Result<ObjectRecord> {
        parse_record(response)
    }

    /// The confirmation message is optional; only the status is required. The
    /// `message` key is matched case-insensitively.
    pub fn parse_delete(&self, response: HttpResponse) -> Result<DeleteOutcome> {
        check_success(&response)?;
        let message = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&response.body)
            .ok()
            .and_then(|fields| {
                fields
                    .into_iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case("message"))
                    .and_then(|(_, v)| v.as_str().map(str::to_string))
            });
        Ok(DeleteOutcome {
            status: response.status,
            message,
        })
    }
}

fn json_request<T: serde::Serialize>(method: HttpMethod, url: String, payload: &T) -> Result<HttpRequest> {
    let body = serde_json::to_string(payload).map_err(|e| ApiError::EncodeFailed(e.to_string()))?;
    Ok(HttpRequest {
        method,
        url,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}

fn parse_record(response: HttpResponse) -> Result<ObjectRecord> {
    check_success(&response)?;
    let record: ObjectRecord =
        serde_json::from_str(&response.body).map_err(|e| ApiError::DecodeFailed(e.to_string()))?;
    ensure_id(&record)?;
    Ok(record)
}

fn ensure_id(record: &ObjectRecord) -> Result<()> {
    if record.id.is_empty() {
        return Err(ApiError::DecodeFailed(format!("record {:?} has an empty id", record.name)));
    }
    Ok(())
}

/// Map any non-2xx status to `RequestFailed`.
fn check_success(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::RequestFailed {
        status: response.status,
        allow: response.header("allow").map(str::to_string),
        body: response.body.clone(),
    })
}
