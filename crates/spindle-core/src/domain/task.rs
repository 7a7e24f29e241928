use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationType {
    Kyc,
    #[default]
    None,
    Other,
}

/// A task as stored by the record store. Read-only from spindle's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(default)]
    pub customer_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub verification_type: VerificationType,
    #[serde(default)]
    pub cost: i64,
    #[serde(default)]
    pub members_count: i64,
    /// Opaque key/value metadata. May carry a type tag and geo coordinates.
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Minimal task with only the fields the index cares about.
    pub fn new(id: impl Into<TaskId>, name: impl Into<String>, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            customer_id: String::new(),
            name: name.into(),
            description: String::new(),
            verification_type: VerificationType::None,
            cost: 0,
            members_count: 0,
            meta: None,
            created_at: updated_at,
            updated_at,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = Some(meta);
        self
    }
}
