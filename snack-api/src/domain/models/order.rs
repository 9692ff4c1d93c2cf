use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Rejected,
    Delivered,
}

impl TryFrom<String> for OrderStatus {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl OrderStatus {
    /// Customer-facing SMS text for a status change.
    pub fn notification(&self, order_id: Uuid, sender_name: &str) -> String {
        let reference = order_reference(order_id);
        match self {
            OrderStatus::Pending => format!(
                "{}: your order #{} has been received and is awaiting confirmation.",
                sender_name, reference
            ),
            OrderStatus::Confirmed => format!(
                "{}: your order #{} is confirmed and is being prepared.",
                sender_name, reference
            ),
            OrderStatus::Rejected => format!(
                "{}: sorry, your order #{} could not be accepted.",
                sender_name, reference
            ),
            OrderStatus::Delivered => format!(
                "{}: your order #{} has been delivered. Enjoy!",
                sender_name, reference
            ),
        }
    }
}

fn order_reference(order_id: Uuid) -> String {
    order_id.simple().to_string()[..8].to_uppercase()
}

/// A requested line: a catalog id and how many.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderLine {
    pub snack_id: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,
}

/// Name and unit price are snapshotted when the order is placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub snack_id: Uuid,
    pub snack_name: String,
    pub quantity: u32,
    pub price: f64,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    #[sqlx(json)]
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(customer_name: &str, customer_phone: &str, items: Vec<OrderItem>) -> Self {
        let now = Utc::now();
        let total_amount: f64 = items.iter().map(OrderItem::line_total).sum();
        Self {
            id: Uuid::new_v4(),
            customer_name: customer_name.to_string(),
            customer_phone: customer_phone.to_string(),
            items,
            total_amount,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: f64, quantity: u32) -> OrderItem {
        OrderItem {
            snack_id: Uuid::new_v4(),
            snack_name: "Chakli".to_string(),
            quantity,
            price,
        }
    }

    #[test]
    fn new_order_totals_lines_and_starts_pending() {
        let order = Order::new("A", "9876543210", vec![item(50.0, 2), item(12.5, 4)]);
        assert_eq!(order.total_amount, 150.0);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn empty_order_totals_zero() {
        let order = Order::new("A", "9876543210", Vec::new());
        assert_eq!(order.total_amount, 0.0);
    }

    #[test]
    fn status_parses_known_values_only() {
        assert_eq!("Confirmed".parse::<OrderStatus>().unwrap(), OrderStatus::Confirmed);
        assert_eq!(OrderStatus::try_from("Delivered".to_string()).unwrap(), OrderStatus::Delivered);
        assert!("Shipped".parse::<OrderStatus>().is_err());
        assert_eq!(OrderStatus::Rejected.as_ref(), "Rejected");
    }

    #[test]
    fn notification_mentions_short_reference() {
        let id = Uuid::new_v4();
        let text = OrderStatus::Confirmed.notification(id, "Divyam Snacks");
        assert!(text.starts_with("Divyam Snacks:"));
        assert!(text.contains(&id.simple().to_string()[..8].to_uppercase()));
    }
}
