use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Referenced from snacks by name only.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
}

impl Category {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }
}
