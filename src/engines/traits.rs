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

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// 文档获取错误类型
#[derive(Error, Debug)]
pub enum FetchError {
    /// 请求失败
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// 非成功状态码
    #[error("Unexpected HTTP status {status}")]
    HttpStatus { status: u16 },
    /// 超时
    #[error("Timeout after {0:?}")]
    Timeout(Duration),
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

impl FetchError {
    /// 判断错误是否可重试
    ///
    /// # 返回值
    ///
    /// 如果错误是可重试的则返回true，否则返回false
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Request(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            FetchError::HttpStatus { status } => *status >= 500 || *status == 429,
            FetchError::Timeout(_) => true,
            FetchError::Other(_) => false,
        }
    }
}

/// 文档来源特质
///
/// 按 URL 获取一份规整后的页面文档。相同页面内容必须得到相同的文档文本，
/// 否则内容哈希无法判断菜单是否变化。
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// 获取并规整单个页面
    async fn fetch_document(&self, url: &str) -> Result<String, FetchError>;

    /// 来源名称
    fn name(&self) -> &'static str;
}
