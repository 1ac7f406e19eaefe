//! Scoped ownership of a remote record.
//!
//! # Design
//! `ScopedObject` pairs a create with a delete. The record is deleted when the
//! guard is released explicitly or, failing that, when it is dropped, which
//! includes unwinding out of a failed assertion. A failed drop-time delete is
//! logged and swallowed so it never replaces the error that caused the unwind.

use std::ops::Deref;

use tracing::warn;

use crate::client::ObjectsClient;
use crate::error::Result;
use crate::types::{CreateOrReplaceRequest, DeleteOutcome, ObjectRecord};

#[derive(Debug)]
pub struct ScopedObject<'a> {
    client: &'a ObjectsClient,
    record: ObjectRecord,
    armed: bool,
}

impl ObjectsClient {
    /// Create a record that is deleted again when the returned guard goes away.
    pub fn create_scoped(&self, request: &CreateOrReplaceRequest) -> Result<ScopedObject<'_>> {
        let record = self.create(request)?;
        Ok(ScopedObject {
            client: self,
            record,
            armed: true,
        })
    }
}

impl<'a> ScopedObject<'a> {
    pub fn id(&self) -> &str {
        &self.record.id
    }

    /// The record as returned by the create call.
    pub fn record(&self) -> &ObjectRecord {
        &self.record
    }

    /// Delete now and report the outcome. The guard is disarmed either way,
    /// so a failure here is not retried on drop.
    pub fn release(mut self) -> Result<DeleteOutcome> {
        self.armed = false;
        self.client.delete(&self.record.id)
    }

    /// Disarm without deleting, for callers that deleted the record themselves.
    pub fn forget(mut self) -> ObjectRecord {
        self.armed = false;
        std::mem::replace(
            &mut self.record,
            ObjectRecord {
                id: String::new(),
                name: String::new(),
                data: None,
                created_at_millis: None,
                updated_at_millis: None,
            },
        )
    }
}

impl Deref for ScopedObject<'_> {
    type Target = ObjectRecord;

    fn deref(&self) -> &ObjectRecord {
        &self.record
    }
}

impl Drop for ScopedObject<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = self.client.delete(&self.record.id) {
            warn!(id = %self.record.id, error = %e, "cleanup delete failed");
        }
    }
}
