// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::LlmSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

/// 默认输入字符上限
pub const DEFAULT_MAX_INPUT_CHARS: usize = 20_000;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// LLM 返回内容不符合预期格式
#[derive(Debug, Error)]
#[error("Invalid response format from LLM API: {0}")]
pub struct InvalidLlmResponse(pub String);

#[async_trait]
pub trait LLMServiceTrait: Send + Sync {
    /// 按 JSON 模式从文本中提取结构化数据
    ///
    /// `instructions` 会作为额外说明附加在提示词中
    async fn extract_data(
        &self,
        text: &str,
        schema: &Value,
        instructions: Option<&str>,
    ) -> Result<(Value, TokenUsage)>;

    /// 是否已配置可用的 API 凭据
    fn is_configured(&self) -> bool {
        true
    }
}

/// LLM服务 - 处理与LLM提供商的交互
///
/// # 功能
///
/// 通过 OpenAI 兼容的 `/chat/completions` 接口提取结构化数据
///
/// # 配置
///
/// 由 `llm` 配置段提供：
/// - `api_key` - LLM API密钥
/// - `model` - 使用的模型名称
/// - `api_base_url` - LLM API基础URL
/// - `max_input_chars` - 发送给模型的最大字符数
pub struct LLMService {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    api_base_url: String,
    max_input_chars: usize,
}

#[async_trait]
impl LLMServiceTrait for LLMService {
    async fn extract_data(
        &self,
        text: &str,
        schema: &Value,
        instructions: Option<&str>,
    ) -> Result<(Value, TokenUsage)> {
        LLMService::extract_data(self, text, schema, instructions).await
    }

    fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }
}

impl LLMService {
    pub fn new(settings: &LlmSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            api_base_url: settings.api_base_url.clone(),
            max_input_chars: settings.max_input_chars,
        }
    }

    pub fn new_with_config(api_key: String, model: String, api_base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: Some(api_key),
            model,
            api_base_url,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }

    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    /// 使用LLM从文本中提取结构化数据
    ///
    /// # 参数
    /// * `text` - 输入文本（规整后的菜单页面）
    /// * `schema` - JSON模式，描述期望的输出结构
    /// * `instructions` - 附加说明，例如餐厅描述
    ///
    /// # 返回值
    /// * `Result<(Value, TokenUsage)>` - 提取的数据和令牌使用情况
    ///
    /// # 错误
    /// * 当LLM API密钥未配置时返回错误
    /// * 当LLM服务调用失败时返回错误
    /// * 当返回内容不是合法JSON时返回错误
    pub async fn extract_data(
        &self,
        text: &str,
        schema: &Value,
        instructions: Option<&str>,
    ) -> Result<(Value, TokenUsage)> {
        let api_key = self
            .api_key
            .as_ref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| anyhow::anyhow!("LLM API key not configured"))?;

        let truncated_text = truncate_chars(text, self.max_input_chars);
        if truncated_text.len() < text.len() {
            debug!(
                "LLM input truncated from {} to {} bytes",
                text.len(),
                truncated_text.len()
            );
        }

        let mut prompt = format!(
            "Extract data from the following text according to this JSON schema: {}. \
            Return ONLY the valid JSON object, no markdown formatting.",
            schema
        );
        if let Some(instructions) = instructions {
            prompt.push(' ');
            prompt.push_str(instructions);
        }
        prompt.push_str(" Text: ");
        prompt.push_str(truncated_text);

        let request_body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a helpful data extraction assistant. You output only valid JSON."
                },
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "temperature": 0.0
        });

        let url = format!("{}/chat/completions", self.api_base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request_body)
            .send()
            .await
            .context("Failed to send request to LLM API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "LLM API returned error: {} - {}",
                status,
                error_text
            ));
        }

        let raw_body = response
            .text()
            .await
            .context("Failed to read LLM API response")?;
        let body: Value =
            serde_json::from_str(&raw_body).context("Failed to parse LLM API response")?;

        let usage = if let Some(usage_val) = body.get("usage") {
            TokenUsage {
                prompt_tokens: usage_val["prompt_tokens"].as_u64().unwrap_or(0) as u32,
                completion_tokens: usage_val["completion_tokens"].as_u64().unwrap_or(0) as u32,
                total_tokens: usage_val["total_tokens"].as_u64().unwrap_or(0) as u32,
            }
        } else {
            TokenUsage::default()
        };

        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| InvalidLlmResponse("missing choices[0].message.content".to_string()))?;

        let data = serde_json::from_str::<Value>(strip_code_fences(content))
            .context("Failed to parse extracted JSON content")?;
        Ok((data, usage))
    }
}

/// 按字符截断，不会切断多字节字符
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// 去掉模型可能包裹的 Markdown 代码块
fn strip_code_fences(content: &str) -> &str {
    content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}
