use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_CATEGORY: &str = "Snacks";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Snack {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub stock: i64,
    pub is_available: bool,
    #[sqlx(json)]
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Snack {
    pub fn new(name: &str, price: f64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            price,
            category: DEFAULT_CATEGORY.to_string(),
            stock: 0,
            is_available: true,
            images: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; `None` leaves the stored value alone.
#[derive(Debug, Default, Clone)]
pub struct SnackChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub stock: Option<i64>,
    pub is_available: Option<bool>,
    pub images: Option<Vec<String>>,
}

impl SnackChanges {
    /// Applies the changes and returns the image paths that were dropped.
    pub fn apply(self, snack: &mut Snack) -> Vec<String> {
        if let Some(name) = self.name {
            snack.name = name;
        }
        if let Some(description) = self.description {
            snack.description = description;
        }
        if let Some(price) = self.price {
            snack.price = price;
        }
        if let Some(category) = self.category {
            snack.category = category;
        }
        if let Some(stock) = self.stock {
            snack.stock = stock;
        }
        if let Some(is_available) = self.is_available {
            snack.is_available = is_available;
        }

        let mut replaced = Vec::new();
        if let Some(images) = self.images {
            replaced = std::mem::replace(&mut snack.images, images)
                .into_iter()
                .filter(|old| !snack.images.contains(old))
                .collect();
        }

        snack.updated_at = Utc::now();
        replaced
    }
}
