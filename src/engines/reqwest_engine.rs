// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::engines::traits::{DocumentSource, FetchError};
use crate::utils::web_content_processor::normalize_document;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::debug;

/// 默认 User-Agent
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; lunch-scraper/0.1; +https://github.com/Kirky-X/lunch-scraper)";

/// 文档获取引擎
///
/// 基于reqwest实现的HTTP文档来源，所有抓取共享同一个连接池
pub struct ReqwestDocumentSource {
    client: reqwest::Client,
}

impl ReqwestDocumentSource {
    /// 创建新的文档来源
    ///
    /// # 参数
    ///
    /// * `user_agent` - 请求使用的 User-Agent
    /// * `timeout` - 单次请求的超时时间
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentSource for ReqwestDocumentSource {
    /// 获取页面并规整为纯文本
    ///
    /// # 参数
    ///
    /// * `url` - 页面地址
    ///
    /// # 返回值
    ///
    /// * `Ok(String)` - 规整后的文档
    /// * `Err(FetchError)` - 请求失败或返回非 2xx 状态码
    async fn fetch_document(&self, url: &str) -> Result<String, FetchError> {
        let start = Instant::now();
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let content = response.text().await?;
        let document = normalize_document(&content);

        debug!(
            url,
            status = status.as_u16(),
            raw_bytes = content.len(),
            document_bytes = document.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fetched menu page"
        );

        Ok(document)
    }

    /// 获取引擎名称
    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
