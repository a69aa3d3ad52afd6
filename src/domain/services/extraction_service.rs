// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::llm_service::{InvalidLlmResponse, LLMServiceTrait};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// 菜单提取错误
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Extraction service not configured: {0}")]
    NotConfigured(String),

    #[error("Extraction request failed: {0}")]
    Request(String),

    #[error("Invalid extraction response: {0}")]
    InvalidResponse(String),

    #[error("Extraction timed out after {0:?}")]
    Timeout(Duration),
}

/// 提取服务特质
///
/// 把规整后的菜单文本转换为结构化的周菜单
#[async_trait]
pub trait ExtractionService: Send + Sync {
    async fn extract(&self, document: &str, hint: Option<&str>) -> Result<Value, ExtractionError>;
}

/// 周菜单的 JSON 模式
pub fn weekly_menu_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "restaurant_name": { "type": "string" },
            "week_number": { "type": ["integer", "null"] },
            "lunch_time": { "type": ["string", "null"] },
            "menus": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "day_of_week": {
                            "type": "string",
                            "enum": ["MONDAY", "TUESDAY", "WEDNESDAY", "THURSDAY", "FRIDAY", "SATURDAY", "SUNDAY", "WEEK"]
                        },
                        "items": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "name": { "type": "string" },
                                    "description": { "type": ["string", "null"] },
                                    "price": { "type": ["string", "null"] },
                                    "diets": { "type": "array", "items": { "type": "string" } }
                                },
                                "required": ["name"]
                            }
                        }
                    },
                    "required": ["day_of_week", "items"]
                }
            }
        },
        "required": ["menus"]
    })
}

/// 基于 LLM 的提取服务
pub struct LlmExtractionService {
    llm: Arc<dyn LLMServiceTrait>,
    schema: Value,
}

impl LlmExtractionService {
    pub fn new(llm: Arc<dyn LLMServiceTrait>) -> Self {
        Self {
            llm,
            schema: weekly_menu_schema(),
        }
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = schema;
        self
    }
}

#[async_trait]
impl ExtractionService for LlmExtractionService {
    async fn extract(&self, document: &str, hint: Option<&str>) -> Result<Value, ExtractionError> {
        if !self.llm.is_configured() {
            return Err(ExtractionError::NotConfigured(
                "LLM API key not configured".to_string(),
            ));
        }

        let instructions = hint.map(|hint| format!("The restaurant is described as: {}", hint));
        let (data, usage) = self
            .llm
            .extract_data(document, &self.schema, instructions.as_deref())
            .await
            .map_err(classify_llm_error)?;

        if !data.is_object() {
            return Err(ExtractionError::InvalidResponse(format!(
                "expected a JSON object, got {}",
                data
            )));
        }

        info!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            "Menu extraction completed"
        );

        Ok(data)
    }
}

fn classify_llm_error(err: anyhow::Error) -> ExtractionError {
    let malformed = err
        .chain()
        .any(|cause| cause.is::<serde_json::Error>() || cause.is::<InvalidLlmResponse>());

    if malformed {
        ExtractionError::InvalidResponse(format!("{:#}", err))
    } else {
        ExtractionError::Request(format!("{:#}", err))
    }
}

#[cfg(test)]
#[path = "extraction_service_test.rs"]
mod tests;
