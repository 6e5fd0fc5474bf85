//! In-memory entity collections answering the way json-server does.
//!
//! Every top-level key of the fixture is an entity. Arrays are plural resources
//! addressed as `/{entity}` and `/{entity}/{id}`; objects are singular resources
//! addressed as `/{entity}` only. Unmatched routes answer `404 {}`.

use crate::{error::Error, RequestData, ResponseData};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone)]
pub struct Collections {
    db: Map<String, Value>,
}

enum Route<'a> {
    Entity(&'a str),
    Item(&'a str, &'a str),
    Unknown,
}

impl Collections {
    pub fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Object(db) => Ok(Self { db }),
            other => Err(Error::InvalidFixture(format!(
                "expected an object with one key per entity, got {}",
                other
            ))),
        }
    }

    pub fn entity(&self, name: &str) -> Option<&Value> {
        self.db.get(name)
    }

    pub fn handle(&mut self, request: &RequestData) -> ResponseData {
        let body = match Self::read_body(request) {
            Ok(body) => body,
            Err(message) => return ResponseData::json(400, &json!({ "error": message })),
        };

        match (request.method.as_str(), Self::route(request.path())) {
            ("GET", Route::Entity(entity)) => match self.db.get(entity) {
                Some(value) => ResponseData::json(200, value),
                None => Self::not_found(),
            },
            ("GET", Route::Item(entity, id)) => match self.find(entity, id) {
                Some(index) => ResponseData::json(200, &self.items(entity)[index]),
                None => Self::not_found(),
            },
            ("POST", Route::Entity(entity)) => self.create(entity, body),
            ("PUT", Route::Entity(entity)) => self.update_singular(entity, body, false),
            ("PATCH", Route::Entity(entity)) => self.update_singular(entity, body, true),
            ("PUT", Route::Item(entity, id)) => self.update(entity, id, body, false),
            ("PATCH", Route::Item(entity, id)) => self.update(entity, id, body, true),
            ("DELETE", Route::Item(entity, id)) => match self.find(entity, id) {
                Some(index) => {
                    self.items_mut(entity).remove(index);
                    ResponseData::json(200, &json!({}))
                }
                None => Self::not_found(),
            },
            _ => Self::not_found(),
        }
    }

    fn route(path: &str) -> Route<'_> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

        match segments.as_slice() {
            [entity] if !entity.is_empty() => Route::Entity(*entity),
            [entity, id] if !entity.is_empty() && !id.is_empty() => Route::Item(*entity, *id),
            _ => Route::Unknown,
        }
    }

    fn read_body(request: &RequestData) -> Result<Map<String, Value>, String> {
        if request.body.trim().is_empty() {
            return Ok(Map::new());
        }

        let is_form = request
            .content_type()
            .map(|content_type| content_type.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);

        if is_form {
            return Ok(url::form_urlencoded::parse(request.body.as_bytes())
                .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
                .collect());
        }

        match serde_json::from_str(&request.body) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(String::from("the body should be a JSON object")),
            Err(e) => Err(e.to_string()),
        }
    }

    fn create(&mut self, entity: &str, mut body: Map<String, Value>) -> ResponseData {
        match self.db.get_mut(entity) {
            Some(Value::Array(items)) => {
                if !body.contains_key("id") {
                    body.insert(String::from("id"), json!(Self::next_id(items)));
                }
                let id = body["id"].clone();
                let key = match id_key(&id) {
                    Some(key) => key,
                    None => {
                        return ResponseData::json(
                            400,
                            &json!({ "error": format!("unsupported id {}", id) }),
                        )
                    }
                };
                if items
                    .iter()
                    .any(|item| item.get("id").map(|v| id_matches(v, &key)).unwrap_or(false))
                {
                    return ResponseData::json(
                        500,
                        &json!({ "error": format!("Insert failed, duplicate id {}", id) }),
                    );
                }

                let item = Value::Object(body);
                items.push(item.clone());
                ResponseData::json(201, &item)
            }
            Some(singular) if singular.is_object() => {
                *singular = Value::Object(body);
                ResponseData::json(200, singular)
            }
            _ => Self::not_found(),
        }
    }

    fn update(
        &mut self,
        entity: &str,
        id: &str,
        body: Map<String, Value>,
        merge: bool,
    ) -> ResponseData {
        let index = match self.find(entity, id) {
            Some(index) => index,
            None => return Self::not_found(),
        };

        let item = &mut self.items_mut(entity)[index];
        let original_id = item.get("id").cloned().unwrap_or(Value::Null);

        let mut updated = match (merge, item.take()) {
            (true, Value::Object(existing)) => existing,
            _ => Map::new(),
        };
        updated.extend(body);
        updated.insert(String::from("id"), original_id);

        *item = Value::Object(updated);
        ResponseData::json(200, item)
    }

    fn update_singular(
        &mut self,
        entity: &str,
        body: Map<String, Value>,
        merge: bool,
    ) -> ResponseData {
        match self.db.get_mut(entity) {
            Some(Value::Object(existing)) => {
                if !merge {
                    existing.clear();
                }
                existing.extend(body);
                ResponseData::json(200, &Value::Object(existing.clone()))
            }
            _ => Self::not_found(),
        }
    }

    fn find(&self, entity: &str, id: &str) -> Option<usize> {
        match self.db.get(entity) {
            Some(Value::Array(items)) => items
                .iter()
                .position(|item| item.get("id").map(|v| id_matches(v, id)).unwrap_or(false)),
            _ => None,
        }
    }

    // Only called with an index returned by `find`, so the entity is an array.
    fn items(&self, entity: &str) -> &Vec<Value> {
        match self.db.get(entity) {
            Some(Value::Array(items)) => items,
            _ => unreachable!("{} is not a plural resource", entity),
        }
    }

    fn items_mut(&mut self, entity: &str) -> &mut Vec<Value> {
        match self.db.get_mut(entity) {
            Some(Value::Array(items)) => items,
            _ => unreachable!("{} is not a plural resource", entity),
        }
    }

    fn next_id(items: &[Value]) -> u64 {
        items
            .iter()
            .filter_map(|item| match item.get("id") {
                Some(Value::String(s)) => s.parse::<u64>().ok(),
                Some(other) => other.as_u64(),
                None => None,
            })
            .max()
            .map(|max| max + 1)
            .unwrap_or(1)
    }

    fn not_found() -> ResponseData {
        ResponseData::json(404, &json!({}))
    }
}

/// The form an id takes in a request path.
fn id_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn id_matches(value: &Value, id: &str) -> bool {
    id_key(value).map(|key| key == id).unwrap_or(false)
}
