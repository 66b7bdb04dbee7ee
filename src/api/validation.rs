use actix_web::{HttpRequest, HttpResponse};
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub fields: serde_json::Value,
}

/// Query-string extractor config with the project's error format
pub fn query_config() -> actix_web_validator::QueryConfig {
    actix_web_validator::QueryConfig::default().error_handler(error_handler)
}

/// Urlencoded form extractor config with the project's error format
pub fn form_config(limit: usize) -> actix_web_validator::FormConfig {
    actix_web_validator::FormConfig::default()
        .limit(limit)
        .error_handler(error_handler)
}

fn error_handler(err: actix_web_validator::Error, _req: &HttpRequest) -> actix_web::Error {
    let mut fields = serde_json::Map::new();

    let error = match err {
        actix_web_validator::Error::Validate(validation_errors) => {
            for (field, errors) in validation_errors.field_errors() {
                let messages: Vec<String> = errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("Validation error in field: {}", field))
                    })
                    .collect();
                fields.insert(field.to_string(), serde_json::json!({ "errors": messages }));
            }
            "Validation failed"
        }
        actix_web_validator::Error::Deserialize(de_err) => {
            let err_string = de_err.to_string();
            let message = if err_string.contains("duplicate field") {
                "Each parameter may only be given once"
            } else {
                "Invalid parameters"
            };
            fields.insert("message".to_string(), serde_json::json!(message));
            "Request validation failed"
        }
        _ => {
            fields.insert("message".to_string(), serde_json::json!("Validation error"));
            "Validation failed"
        }
    };

    let error_response = ErrorResponse {
        error: error.to_string(),
        fields: serde_json::Value::Object(fields),
    };
    actix_web::error::InternalError::from_response("", HttpResponse::BadRequest().json(error_response))
        .into()
}
