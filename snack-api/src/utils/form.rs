use std::collections::HashMap;

use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde_json::Value;

use crate::error::AppError;
use crate::infrastructure::storage::UploadedImage;

pub const IMAGE_FIELD: &str = "images";

/// Snack fields as sent by the admin clients: multipart with image files,
/// or JSON / urlencoded without them.
#[derive(Debug, Default)]
pub struct SnackForm {
    fields: HashMap<String, String>,
    pub files: Vec<UploadedImage>,
    /// Image paths supplied directly in a JSON body.
    pub image_paths: Option<Vec<String>>,
}

impl<S> FromRequest<S> for SnackForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            Self::from_multipart(multipart).await
        } else if content_type.starts_with("application/json") {
            let Json(body) = Json::<serde_json::Map<String, Value>>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            Ok(Self::from_json(body))
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            Ok(Self {
                fields,
                ..Default::default()
            })
        } else {
            Err(AppError::BadRequest(format!(
                "Unsupported content type: {}",
                if content_type.is_empty() { "none" } else { content_type.as_str() }
            )))
        }
    }
}

impl SnackForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = SnackForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("multipart error: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(|s| s.to_string());

            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("failed to read field: {}", e)))?;

            match file_name {
                Some(file_name) => {
                    if name != IMAGE_FIELD {
                        return Err(AppError::BadRequest(format!("Unexpected file field: {}", name)));
                    }
                    // 浏览器对空的文件输入也会发送一个空 part
                    if file_name.is_empty() && data.is_empty() {
                        continue;
                    }
                    form.files.push(UploadedImage {
                        file_name: Some(file_name),
                        data,
                    });
                }
                None => {
                    let text = String::from_utf8(data.to_vec())
                        .map_err(|_| AppError::BadRequest(format!("Field {} is not valid UTF-8", name)))?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    pub fn from_json(body: serde_json::Map<String, Value>) -> Self {
        let mut form = SnackForm::default();

        for (key, value) in body {
            if key == IMAGE_FIELD {
                if let Value::Array(items) = value {
                    form.image_paths = Some(
                        items
                            .into_iter()
                            .filter_map(|item| item.as_str().map(str::to_string))
                            .collect(),
                    );
                }
                continue;
            }

            let text = match value {
                Value::Null => continue,
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                other => other.to_string(),
            };
            form.fields.insert(key, text);
        }

        form
    }

    /// A field counts as present only when it is non-blank.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    #[cfg(test)]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    #[cfg(test)]
    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }
}

/// Strict numeric parse for prices.
pub fn parse_price(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|price| price.is_finite())
}

/// Whole numbers, or decimals truncated toward zero.
pub fn parse_stock(value: &str) -> Option<i64> {
    let value = value.trim();
    value
        .parse::<i64>()
        .ok()
        .or_else(|| value.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
}

pub fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "on" | "yes")
}
