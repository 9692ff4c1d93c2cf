use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::order::{Order, OrderItem, OrderLine, OrderStatus};
use crate::domain::services::catalog_service::CatalogService;
use crate::domain::services::otp_service::OtpService;
use crate::error::AppError;
use crate::server::AppState;

const INVALID_OTP: &str = "Invalid OTP";

const ORDER_COLUMNS: &str =
    "id, customer_name, customer_phone, items, total_amount, status, created_at, updated_at";

pub struct OrderService {
    state: Arc<AppState>,
}

impl OrderService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Verifies the OTP and creates a `Pending` order priced from the live catalog.
    ///
    /// Lines pointing at unknown snacks are dropped. Stock is not touched.
    pub async fn place_order(
        &self,
        customer_name: &str,
        customer_phone: &str,
        code: &str,
        lines: &[OrderLine],
    ) -> Result<Order, AppError> {
        let otp_service = OtpService::new(self.state.clone());
        if otp_service.find_valid(customer_phone, code).await?.is_none() {
            return Err(AppError::Validation(INVALID_OTP.to_string()));
        }

        // 按当前目录价格重新计价
        let catalog = CatalogService::new(self.state.clone());
        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let Ok(snack_id) = Uuid::parse_str(line.snack_id.trim()) else {
                tracing::debug!(snack_id = %line.snack_id, "skipping malformed snack id");
                continue;
            };
            let Some(snack) = catalog.find_snack(snack_id).await? else {
                tracing::debug!(snack_id = %snack_id, "skipping unknown snack");
                continue;
            };
            items.push(OrderItem {
                snack_id: snack.id,
                snack_name: snack.name,
                quantity: line.quantity,
                price: snack.price,
            });
        }

        let order = Order::new(customer_name, customer_phone, items);

        // 创建订单与删除验证码在同一事务内
        let mut tx = self.state.db.begin().await?;

        if !OtpService::consume(&mut *tx, customer_phone, code).await? {
            return Err(AppError::Validation(INVALID_OTP.to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_name, customer_phone, items, total_amount, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(order.id)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(sqlx::types::Json(&order.items))
        .bind(order.total_amount)
        .bind(order.status.as_ref())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            phone = %order.customer_phone,
            lines = order.items.len(),
            total = order.total_amount,
            "order placed"
        );

        Ok(order)
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>, AppError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders ORDER BY created_at DESC, rowid DESC",
            ORDER_COLUMNS
        ))
        .fetch_all(&self.state.db)
        .await?;

        Ok(orders)
    }

    pub async fn get_order(&self, id: Uuid) -> Result<Order, AppError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE id = ?",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order with ID {} not found", id)))?;

        Ok(order)
    }

    /// Any status may follow any other. The customer is texted best-effort.
    pub async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, AppError> {
        let result = sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_ref())
            .bind(chrono::Utc::now())
            .bind(id)
            .execute(&self.state.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Order with ID {} not found", id)));
        }

        let order = self.get_order(id).await?;
        tracing::info!(order_id = %order.id, status = %order.status, "order status updated");

        let message = order
            .status
            .notification(order.id, &self.state.config.sms.sender_name);
        if let Err(e) = self.state.sms.send(&order.customer_phone, &message).await {
            tracing::warn!(order_id = %order.id, error = %e, "status SMS failed");
        }

        Ok(order)
    }

    /// Deleting an unknown id is not an error.
    pub async fn delete_order(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id)
            .execute(&self.state.db)
            .await?;

        tracing::info!(order_id = %id, deleted = result.rows_affected(), "order delete");
        Ok(())
    }
}
