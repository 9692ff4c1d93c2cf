use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::category::Category;
use crate::domain::models::snack::{Snack, SnackChanges, DEFAULT_CATEGORY};
use crate::error::AppError;
use crate::server::AppState;
use crate::utils::form::{parse_bool, parse_price, parse_stock, SnackForm};

const SNACK_COLUMNS: &str =
    "id, name, description, price, category, stock, is_available, images, created_at, updated_at";

pub struct CatalogService {
    state: Arc<AppState>,
}

impl CatalogService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub async fn list_snacks(&self) -> Result<Vec<Snack>, AppError> {
        let snacks = sqlx::query_as::<_, Snack>(&format!(
            "SELECT {} FROM snacks ORDER BY created_at, rowid",
            SNACK_COLUMNS
        ))
        .fetch_all(&self.state.db)
        .await?;

        Ok(snacks)
    }

    pub async fn find_snack(&self, id: Uuid) -> Result<Option<Snack>, AppError> {
        let snack = sqlx::query_as::<_, Snack>(&format!(
            "SELECT {} FROM snacks WHERE id = ?",
            SNACK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.state.db)
        .await?;

        Ok(snack)
    }

    pub async fn get_snack(&self, id: Uuid) -> Result<Snack, AppError> {
        self.find_snack(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Snack with ID {} not found", id)))
    }

    pub async fn create_snack(&self, form: SnackForm) -> Result<Snack, AppError> {
        // 校验必填字段
        let name = form
            .text("name")
            .ok_or_else(|| AppError::Validation("Name is required".to_string()))?;
        let price = form
            .text("price")
            .ok_or_else(|| AppError::Validation("Price is required".to_string()))
            .and_then(validate_price)?;

        // 缺失或无法解析的库存按 0 处理
        let stock = form.text("stock").and_then(parse_stock).unwrap_or(0);
        if stock < 0 {
            return Err(AppError::Validation("Stock cannot be negative".to_string()));
        }

        let mut snack = Snack::new(name, price);
        snack.description = form.text("description").unwrap_or_default().to_string();
        snack.category = form.text("category").unwrap_or(DEFAULT_CATEGORY).to_string();
        snack.stock = stock;
        snack.is_available = form.text("isAvailable").map(parse_bool).unwrap_or(true);
        snack.images = self.collect_images(&form).await?.unwrap_or_default();

        sqlx::query(
            r#"
            INSERT INTO snacks (id, name, description, price, category, stock, is_available, images, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(snack.id)
        .bind(&snack.name)
        .bind(&snack.description)
        .bind(snack.price)
        .bind(&snack.category)
        .bind(snack.stock)
        .bind(snack.is_available)
        .bind(sqlx::types::Json(&snack.images))
        .bind(snack.created_at)
        .bind(snack.updated_at)
        .execute(&self.state.db)
        .await?;

        tracing::info!(snack_id = %snack.id, name = %snack.name, images = snack.images.len(), "snack created");
        Ok(snack)
    }

    pub async fn update_snack(&self, id: Uuid, form: SnackForm) -> Result<Snack, AppError> {
        // 检查零食是否存在
        let mut snack = self.get_snack(id).await?;

        let changes = SnackChanges {
            name: form.text("name").map(str::to_string),
            description: form.text("description").map(str::to_string),
            price: form.text("price").map(validate_price).transpose()?,
            category: form.text("category").map(str::to_string),
            stock: form.text("stock").map(validate_stock).transpose()?,
            is_available: form.text("isAvailable").map(parse_bool),
            images: self.collect_images(&form).await?,
        };
        let replaced = changes.apply(&mut snack);

        sqlx::query(
            r#"
            UPDATE snacks
            SET name = ?, description = ?, price = ?, category = ?, stock = ?, is_available = ?, images = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&snack.name)
        .bind(&snack.description)
        .bind(snack.price)
        .bind(&snack.category)
        .bind(snack.stock)
        .bind(snack.is_available)
        .bind(sqlx::types::Json(&snack.images))
        .bind(snack.updated_at)
        .bind(snack.id)
        .execute(&self.state.db)
        .await?;

        for path in &replaced {
            self.state.uploads.remove(path).await;
        }

        tracing::info!(snack_id = %snack.id, replaced_images = replaced.len(), "snack updated");
        Ok(snack)
    }

    /// Deleting an unknown id is not an error.
    pub async fn delete_snack(&self, id: Uuid) -> Result<(), AppError> {
        let Some(snack) = self.find_snack(id).await? else {
            return Ok(());
        };

        sqlx::query("DELETE FROM snacks WHERE id = ?")
            .bind(id)
            .execute(&self.state.db)
            .await?;

        for path in &snack.images {
            self.state.uploads.remove(path).await;
        }

        tracing::info!(snack_id = %id, "snack deleted");
        Ok(())
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY rowid")
            .fetch_all(&self.state.db)
            .await?;

        Ok(categories)
    }

    pub async fn create_category(&self, name: &str) -> Result<Category, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Category name is required".to_string()));
        }

        let category = Category::new(name);

        sqlx::query("INSERT INTO categories (id, name) VALUES (?, ?)")
            .bind(category.id)
            .bind(&category.name)
            .execute(&self.state.db)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    AppError::Validation(format!("Category {} already exists", name))
                }
                other => AppError::Database(other),
            })?;

        Ok(category)
    }

    /// Snacks keep referencing the category by name.
    pub async fn delete_category(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.state.db)
            .await?;

        Ok(())
    }

    /// Uploaded files win over JSON image paths; `None` means no images were supplied.
    async fn collect_images(&self, form: &SnackForm) -> Result<Option<Vec<String>>, AppError> {
        let max_files = self.state.config.uploads.max_files;
        if form.files.len() > max_files {
            return Err(AppError::BadRequest(format!(
                "At most {} images may be uploaded",
                max_files
            )));
        }

        if form.files.is_empty() {
            return Ok(form.image_paths.clone());
        }

        let mut paths = Vec::with_capacity(form.files.len());
        for file in &form.files {
            paths.push(self.state.uploads.save(file).await?);
        }

        Ok(Some(paths))
    }
}

fn validate_price(value: &str) -> Result<f64, AppError> {
    parse_price(value)
        .ok_or_else(|| AppError::Validation(format!("Price must be a number, got {:?}", value)))
}

/// Create and update share the stock parse; only the fallback differs.
fn validate_stock(value: &str) -> Result<i64, AppError> {
    let stock = parse_stock(value)
        .ok_or_else(|| AppError::Validation(format!("Stock must be a number, got {:?}", value)))?;
    if stock < 0 {
        return Err(AppError::Validation("Stock cannot be negative".to_string()));
    }
    Ok(stock)
}
