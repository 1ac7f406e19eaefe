//! Typed client for a remote object-storage REST API.
//!
//! # Overview
//! Lists, creates, reads, replaces, patches and deletes loosely-typed records
//! made of a name and an open `data` payload. Every operation is one HTTP
//! round trip with a bounded timeout; there is no local cache and no retry.
//!
//! # Design
//! - `ObjectsClient` splits each operation into `build_*` (produces an
//!   `HttpRequest`) and `parse_*` (consumes an `HttpResponse`); only
//!   `HttpTransport` does I/O.
//! - `ObjectRecord` stores server timestamps as raw epoch millis and derives
//!   calendar time on read.
//! - `ScopedObject` ties a created record's lifetime to a scope so scenarios
//!   never leak remote state.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod scope;
pub mod transport;
pub mod types;

pub use client::ObjectsClient;
pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, RawResponse};
pub use scope::ScopedObject;
pub use transport::HttpTransport;
pub use types::{keys, CreateOrReplaceRequest, DataPayload, DataValue, DeleteOutcome, ObjectRecord, PartialUpdate};
