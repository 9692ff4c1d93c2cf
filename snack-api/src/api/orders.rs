use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::domain::models::order::{Order, OrderLine, OrderStatus};
use crate::domain::services::order_service::OrderService;
use crate::domain::services::otp_service::OtpService;
use crate::error::AppError;
use crate::server::AppState;
use crate::utils::extract::{ApiJson, ApiPath};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/otp/send", post(send_otp))
        .route("/place", post(place_order))
        .route("/admin/all", get(list_orders))
        .route("/{id}/status", put(update_status))
        .route("/{id}", delete(delete_order))
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SendOtpRequest {
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaceOrderRequest {
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub customer_name: String,
    #[validate(length(min = 1, message = "Customer phone is required"))]
    pub customer_phone: String,
    #[validate(length(min = 1, message = "OTP is required"))]
    pub otp: String,
    #[validate(nested)]
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    pub message: String,
    pub order_id: Uuid,
    pub total_amount: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateStatusRequest {
    pub status: String,
}

async fn send_otp(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<SendOtpRequest>,
) -> Result<Json<Value>, AppError> {
    // 验证请求
    payload.validate()?;

    let otp_service = OtpService::new(state.clone());

    // 短信失败不影响响应
    otp_service.issue(payload.phone.trim()).await?;

    Ok(Json(json!({ "message": "OTP sent" })))
}

async fn place_order(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<PlaceOrderResponse>), AppError> {
    // 验证请求
    payload.validate()?;

    let order_service = OrderService::new(state.clone());

    let order = order_service
        .place_order(
            payload.customer_name.trim(),
            payload.customer_phone.trim(),
            payload.otp.trim(),
            &payload.items,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PlaceOrderResponse {
            message: "Order Confirmed!".to_string(),
            order_id: order.id,
            total_amount: order.total_amount,
        }),
    ))
}

async fn list_orders(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Order>>, AppError> {
    let order_service = OrderService::new(state.clone());

    Ok(Json(order_service.list_orders().await?))
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateStatusRequest>,
) -> Result<Json<Order>, AppError> {
    let status: OrderStatus = payload
        .status
        .trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("Unknown order status: {:?}", payload.status)))?;

    let order_service = OrderService::new(state.clone());

    Ok(Json(order_service.update_status(id, status).await?))
}

async fn delete_order(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let order_service = OrderService::new(state.clone());

    order_service.delete_order(id).await?;

    Ok(Json(json!({ "message": "Order deleted" })))
}
