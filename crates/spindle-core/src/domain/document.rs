//! Index document: the write-only projection of a [`Task`] sent to search.
//!
//! Metadata extraction is best-effort. Missing keys and undecodable metadata
//! both yield empty derived fields; neither fails the task.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use super::{Task, TaskId};

/// Payload accepted by the search backend's `/index` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexDocument {
    pub task_id: TaskId,
    pub task_name: String,
    pub task_desc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_data: Option<String>,
}

impl IndexDocument {
    /// Deterministic projection of a task.
    pub fn from_task(task: &Task) -> Self {
        let meta = MetaFields::decode(task.meta.as_ref());
        Self {
            task_id: task.id.clone(),
            task_name: task.name.trim().to_string(),
            task_desc: task.description.trim().to_string(),
            task_type: meta.task_type(),
            geo_data: meta.geo(),
        }
    }
}

/// Task metadata flattened to a string map.
///
/// Non-string scalars are stringified; `null`, nested arrays and objects are
/// skipped, so a null key counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaFields(HashMap<String, String>);

impl MetaFields {
    pub fn decode(meta: Option<&Value>) -> Self {
        let Some(Value::Object(map)) = meta else {
            return Self::default();
        };

        let fields = map
            .iter()
            .filter_map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => number_to_string(n),
                    Value::Bool(b) => b.to_string(),
                    _ => return None,
                };
                Some((key.clone(), text))
            })
            .collect();
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `task_type`, falling back to `type`.
    pub fn task_type(&self) -> Option<String> {
        self.first_non_blank(&["task_type", "type"])
    }

    /// `geo_data`, falling back to `geo`, falling back to `"lat,lon"`.
    pub fn geo(&self) -> Option<String> {
        if let Some(geo) = self.first_non_blank(&["geo_data", "geo"]) {
            return Some(geo);
        }
        match (self.get("lat"), self.get("lon")) {
            (Some(lat), Some(lon)) => Some(format!("{},{}", lat.trim(), lon.trim())),
            _ => None,
        }
    }

    fn first_non_blank(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.get(key))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(str::to_string)
    }
}

fn number_to_string(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    // f64 Display is the shortest round-trip form without an exponent.
    n.as_f64().map(|f| f.to_string()).unwrap_or_default()
}
