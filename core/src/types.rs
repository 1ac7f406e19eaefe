//! Domain types for the objects API.
//!
//! # Design
//! `ObjectRecord` is a transient view of a server-owned record. Timestamps are
//! kept exactly as they travel on the wire (epoch milliseconds) and converted
//! to calendar time only when read, so the integer stays the single source of
//! truth.
//!
//! The `data` payload has no fixed schema. It is an ordered map from the exact
//! wire key (spaces and capitals included, e.g. `"CPU model"`) to a scalar
//! value. Well-known keys get typed accessors; anything else is still reachable
//! through `get`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::ApiError;

/// Wire names of the payload attributes the API commonly returns.
pub mod keys {
    pub const YEAR: &str = "year";
    pub const PRICE: &str = "price";
    pub const CPU_MODEL: &str = "CPU model";
    pub const HARD_DISK_SIZE: &str = "Hard disk size";
    pub const COLOR: &str = "color";
    pub const CAPACITY: &str = "capacity";
    pub const SCREEN_SIZE: &str = "Screen size";
    pub const GENERATION: &str = "generation";
}

/// Interpret `millis` as milliseconds since the Unix epoch, in UTC.
pub fn millis_to_utc(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// A single scalar attribute value inside a `DataPayload`.
///
/// Values that are neither strings nor numbers are kept verbatim in `Other`
/// so an unexpected payload never fails decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Text(String),
    Number(Number),
    Other(Value),
}

impl DataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric reading of the value. Text is parsed after trimming.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DataValue::Text(s) => s.trim().parse().ok(),
            DataValue::Number(n) => n.as_f64(),
            DataValue::Other(_) => None,
        }
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::Text(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::Text(value)
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Number(value.into())
    }
}

/// Only finite numbers have a JSON representation.
impl TryFrom<f64> for DataValue {
    type Error = ApiError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Number::from_f64(value)
            .map(DataValue::Number)
            .ok_or_else(|| ApiError::EncodeFailed(format!("{value} is not a finite number")))
    }
}

/// Open attribute bag nested in a record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataPayload(BTreeMap<String, DataValue>);

macro_rules! well_known {
    ($($getter:ident, $builder:ident => $key:path;)*) => {
        $(
            pub fn $getter(&self) -> Option<&DataValue> {
                self.get($key)
            }

            pub fn $builder(self, value: impl Into<DataValue>) -> Self {
                self.with($key, value)
            }
        )*
    };
}

impl DataPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&DataValue> {
        self.0.get(key)
    }

    /// Text value stored under `key`, if it is a string.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(DataValue::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<DataValue>) -> Option<DataValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    well_known! {
        year, with_year => keys::YEAR;
        price, with_price => keys::PRICE;
        cpu_model, with_cpu_model => keys::CPU_MODEL;
        hard_disk_size, with_hard_disk_size => keys::HARD_DISK_SIZE;
        color, with_color => keys::COLOR;
        capacity, with_capacity => keys::CAPACITY;
        screen_size, with_screen_size => keys::SCREEN_SIZE;
        generation, with_generation => keys::GENERATION;
    }

    /// The `price` attribute as a number. `None` when missing or when its text
    /// does not parse.
    pub fn price_value(&self) -> Option<f64> {
        self.price().and_then(DataValue::as_f64)
    }
}

impl<K: Into<String>, V: Into<DataValue>> FromIterator<(K, V)> for DataPayload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A record as returned by the API.
///
/// Top-level property names are matched case-insensitively on decode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectRecord {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<DataPayload>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at_millis: Option<i64>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at_millis: Option<i64>,
}

impl ObjectRecord {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at_millis.and_then(millis_to_utc)
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at_millis.and_then(millis_to_utc)
    }
}

// Keys here are the lowercased wire names.
#[derive(Deserialize)]
struct WireRecord {
    id: String,
    name: String,
    #[serde(default)]
    data: Option<DataPayload>,
    #[serde(default, rename = "createdat")]
    created_at: Option<i64>,
    #[serde(default, rename = "updatedat")]
    updated_at: Option<i64>,
}

impl<'de> Deserialize<'de> for ObjectRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        let folded: Map<String, Value> = fields
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();
        let wire: WireRecord = serde_json::from_value(Value::Object(folded)).map_err(de::Error::custom)?;
        Ok(ObjectRecord {
            id: wire.id,
            name: wire.name,
            data: wire.data,
            created_at_millis: wire.created_at,
            updated_at_millis: wire.updated_at,
        })
    }
}

/// Body of a create or full-replace call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrReplaceRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DataPayload>,
}

impl CreateOrReplaceRequest {
    pub fn new(name: impl Into<String>, data: Option<DataPayload>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// Body of a partial update. Only the fields present are sent; the server
/// keeps everything else as it was.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DataPayload>,
}

/// Confirmation of a successful delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub status: u16,
    pub message: Option<String>,
}

impl DeleteOutcome {
    /// True for `200 OK`, which is what this API answers on delete.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}
