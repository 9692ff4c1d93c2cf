use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::domain::models::category::Category;
use crate::domain::models::snack::Snack;
use crate::domain::services::catalog_service::CatalogService;
use crate::error::AppError;
use crate::server::AppState;
use crate::utils::extract::{ApiJson, ApiPath};
use crate::utils::form::SnackForm;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_snacks).post(create_snack))
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{id}", delete(delete_category))
        .route("/{id}", get(get_snack).put(update_snack).delete(delete_snack))
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, message = "Category name is required"))]
    pub name: String,
}

async fn list_snacks(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Snack>>, AppError> {
    let catalog = CatalogService::new(state.clone());

    Ok(Json(catalog.list_snacks().await?))
}

async fn get_snack(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Snack>, AppError> {
    let catalog = CatalogService::new(state.clone());

    Ok(Json(catalog.get_snack(id).await?))
}

async fn create_snack(
    State(state): State<Arc<AppState>>,
    form: SnackForm,
) -> Result<(StatusCode, Json<Snack>), AppError> {
    let catalog = CatalogService::new(state.clone());

    let snack = catalog.create_snack(form).await?;

    Ok((StatusCode::CREATED, Json(snack)))
}

async fn update_snack(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
    form: SnackForm,
) -> Result<Json<Snack>, AppError> {
    let catalog = CatalogService::new(state.clone());

    Ok(Json(catalog.update_snack(id, form).await?))
}

async fn delete_snack(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let catalog = CatalogService::new(state.clone());

    catalog.delete_snack(id).await?;

    Ok(Json(json!({ "message": "Snack deleted" })))
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Category>>, AppError> {
    let catalog = CatalogService::new(state.clone());

    Ok(Json(catalog.list_categories().await?))
}

async fn create_category(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    // 验证请求
    payload.validate()?;

    let catalog = CatalogService::new(state.clone());

    let category = catalog.create_category(&payload.name).await?;

    Ok((StatusCode::CREATED, Json(category)))
}

async fn delete_category(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let catalog = CatalogService::new(state.clone());

    catalog.delete_category(id).await?;

    Ok(Json(json!({ "message": "Deleted" })))
}
