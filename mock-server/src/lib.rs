use std::sync::Arc;

use axum::{
    extract::{Path, RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub id: String,
    pub name: String,
    pub data: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

#[derive(Deserialize)]
pub struct ObjectInput {
    pub name: String,
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
pub struct ObjectPatch {
    pub name: Option<String>,
    pub data: Option<Map<String, Value>>,
}

pub type Db = Arc<RwLock<Vec<StoredObject>>>;

/// Ids of the seeded catalogue. They can be read but never changed.
pub const RESERVED_IDS: [&str; 6] = ["1", "2", "3", "4", "5", "6"];

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(seed()));
    Router::new()
        .route("/objects", get(list_objects).post(create_object))
        .route(
            "/objects/{id}",
            get(get_object).put(replace_object).patch(patch_object).delete(delete_object),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn seed() -> Vec<StoredObject> {
    let entries = [
        ("1", "Google Pixel 6 Pro", json!({"color": "Cloudy White", "capacity": "128 GB"})),
        ("2", "Apple iPhone 12 Mini, 256GB, Blue", Value::Null),
        ("3", "Apple iPhone 12 Pro Max", json!({"color": "Cloudy White", "capacity GB": 512})),
        (
            "4",
            "Apple MacBook Pro 16",
            json!({"year": 2019, "price": 1849.99, "CPU model": "Intel Core i9", "Hard disk size": "1 TB"}),
        ),
        ("5", "Apple Watch Series 8", json!({"Strap Colour": "Elderberry", "Case Size": "41mm"})),
        ("6", "Apple iPad Air", json!({"generation": "4th", "price": "519.99", "Screen size": 10.9})),
    ];
    entries
        .into_iter()
        .map(|(id, name, data)| StoredObject {
            id: id.to_string(),
            name: name.to_string(),
            data: match data {
                Value::Object(map) => Some(map),
                _ => None,
            },
            created_at: None,
            updated_at: None,
        })
        .collect()
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn not_found(id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": format!("Object with id={id} was not found.")})),
    )
        .into_response()
}

fn reserved(id: &str) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "GET")],
        Json(json!({"error": format!("{id} is a reserved id and the data object of it cannot be changed.")})),
    )
        .into_response()
}

fn is_reserved(id: &str) -> bool {
    RESERVED_IDS.contains(&id)
}

async fn list_objects(State(db): State<Db>, RawQuery(query): RawQuery) -> Json<Vec<StoredObject>> {
    let objects = db.read().await;
    let ids: Vec<String> = query
        .as_deref()
        .unwrap_or("")
        .split('&')
        .filter_map(|pair| pair.strip_prefix("id="))
        .filter_map(|id| urlencoding::decode(id).ok().map(|id| id.into_owned()))
        .collect();
    if ids.is_empty() {
        return Json(objects.clone());
    }
    Json(objects.iter().filter(|o| ids.contains(&o.id)).cloned().collect())
}

async fn create_object(State(db): State<Db>, Json(input): Json<ObjectInput>) -> Json<StoredObject> {
    let object = StoredObject {
        id: Uuid::new_v4().simple().to_string(),
        name: input.name,
        data: input.data,
        created_at: Some(now_millis()),
        updated_at: None,
    };
    debug!(id = %object.id, "created");
    db.write().await.push(object.clone());
    Json(object)
}

async fn get_object(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let objects = db.read().await;
    match objects.iter().find(|o| o.id == id) {
        Some(object) => Json(object.clone()).into_response(),
        None => not_found(&id),
    }
}

async fn replace_object(State(db): State<Db>, Path(id): Path<String>, Json(input): Json<ObjectInput>) -> Response {
    if is_reserved(&id) {
        return reserved(&id);
    }
    let mut objects = db.write().await;
    let Some(object) = objects.iter_mut().find(|o| o.id == id) else {
        return not_found(&id);
    };
    object.name = input.name;
    object.data = input.data;
    object.updated_at = Some(now_millis());
    Json(object.clone()).into_response()
}

async fn patch_object(State(db): State<Db>, Path(id): Path<String>, Json(input): Json<ObjectPatch>) -> Response {
    if is_reserved(&id) {
        return reserved(&id);
    }
    let mut objects = db.write().await;
    let Some(object) = objects.iter_mut().find(|o| o.id == id) else {
        return not_found(&id);
    };
    if let Some(name) = input.name {
        object.name = name;
    }
    if let Some(data) = input.data {
        object.data = Some(data);
    }
    object.updated_at = Some(now_millis());
    Json(object.clone()).into_response()
}

async fn delete_object(State(db): State<Db>, Path(id): Path<String>) -> Response {
    if is_reserved(&id) {
        return reserved(&id);
    }
    let mut objects = db.write().await;
    let Some(index) = objects.iter().position(|o| o.id == id) else {
        return not_found(&id);
    };
    objects.remove(index);
    debug!(id = %id, "deleted");
    Json(json!({"message": format!("Object with id = {id} has been deleted.")})).into_response()
}
