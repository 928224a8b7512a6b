pub mod normalize;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{body::Bytes, routing::post, Json, Router};
use bookit_http::error::{AppError, AppResult};
use bookit_kernel::Module;
use serde::{Deserialize, Serialize};

use crate::utils::{method_not_allowed, send_options};
use normalize::NormalizeError;

/// URL normalizer module: `POST /url`
pub struct UrlModule;

impl UrlModule {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for UrlModule {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UrlRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub operation: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UrlResponse {
    pub processed_url: String,
}

impl From<NormalizeError> for AppError {
    fn from(err: NormalizeError) -> Self {
        AppError::bad_request(err.to_string())
    }
}

#[async_trait]
impl Module for UrlModule {
    fn name(&self) -> &'static str {
        "url"
    }

    fn routes(&self) -> Router {
        let route = || {
            post(process_url)
                .options(send_options)
                .fallback(method_not_allowed)
        };
        Router::new()
            .route("/url", route())
            .route("/url/", route())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "paths": {
                "/url": {
                    "post": {
                        "summary": "Process URL",
                        "description": "Processes URLs depending on the requested operation",
                        "tags": ["url"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/UrlRequest" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Processed URL",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/UrlResponse" }
                                    }
                                }
                            },
                            "400": {
                                "description": "Invalid body, URL, operation or domain",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrMessage" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "UrlRequest": {
                        "type": "object",
                        "properties": {
                            "url": { "type": "string" },
                            "operation": {
                                "type": "string",
                                "enum": ["canonical", "redirection", "all"]
                            }
                        },
                        "required": ["url", "operation"]
                    },
                    "UrlResponse": {
                        "type": "object",
                        "properties": {
                            "processed_url": { "type": "string" }
                        },
                        "required": ["processed_url"]
                    }
                }
            }
        }))
    }
}

async fn process_url(body: Bytes) -> AppResult<Json<UrlResponse>> {
    if body.is_empty() {
        return Err(AppError::bad_request("Error : Request Body is empty"));
    }

    let request: UrlRequest = serde_json::from_slice(&body)
        .map_err(|_| AppError::bad_request("Invalid request format"))?;

    let processed_url = normalize::normalize(&request.url, &request.operation)?;
    tracing::debug!(operation = %request.operation, %processed_url, "url processed");

    Ok(Json(UrlResponse { processed_url }))
}

/// Create a new instance of the url module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(UrlModule::new())
}
