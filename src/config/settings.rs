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

use crate::domain::models::location::{LocationConfig, ScrapeTargets, TargetsError};
use crate::engines::reqwest_engine::DEFAULT_USER_AGENT;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

/// 配置加载错误
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("配置加载失败: {0}")]
    Config(#[from] ConfigError),

    #[error("配置校验失败: {0}")]
    Invalid(#[from] ValidationErrors),

    #[error("抓取目标配置无效: {0}")]
    Targets(#[from] TargetsError),
}

/// 应用程序配置设置
///
/// 包含抓取、调度、数据库、LLM、指标和抓取目标等所有配置项
#[derive(Debug, Deserialize, Validate)]
pub struct Settings {
    /// 抓取配置
    #[validate(nested)]
    pub scraping: ScrapingSettings,
    /// 调度配置
    #[validate(nested)]
    pub scheduler: SchedulerSettings,
    /// 数据库配置
    pub database: DatabaseSettings,
    /// LLM 配置
    #[validate(nested)]
    pub llm: LlmSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
    /// 抓取目标
    #[serde(default)]
    #[validate(nested)]
    pub locations: Vec<LocationConfig>,
}

/// 抓取配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ScrapingSettings {
    /// 是否保存拼接后的页面文档
    pub save_document: bool,
    /// 同时进行的页面请求上限
    #[validate(range(min = 1))]
    pub max_concurrent_fetches: usize,
    /// 单个页面获取超时时间（秒）
    #[validate(range(min = 1))]
    pub fetch_timeout_secs: u64,
    /// 单次提取超时时间（秒）
    #[validate(range(min = 1))]
    pub extraction_timeout_secs: u64,
    /// 请求使用的 User-Agent
    #[validate(length(min = 1))]
    pub user_agent: String,
}

impl ScrapingSettings {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }
}

/// 调度配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SchedulerSettings {
    /// 是否启用周期性抓取；关闭时只执行一次抓取后退出
    pub enabled: bool,
    /// 抓取间隔（秒），最长一周
    #[validate(range(min = 1, max = 604800))]
    pub interval_secs: u64,
    /// 启动后是否立即执行一次抓取
    pub run_on_start: bool,
}

impl SchedulerSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL，`memory://` 表示使用内存存储
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// LLM 配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LlmSettings {
    /// API 密钥
    pub api_key: Option<String>,
    /// 模型名称
    #[validate(length(min = 1))]
    pub model: String,
    /// OpenAI 兼容接口地址
    #[validate(length(min = 1))]
    pub api_base_url: String,
    /// 发送给模型的最大字符数
    #[validate(range(min = 1))]
    pub max_input_chars: usize,
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// 导出监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载内置默认值、`config/default`、`config/{APP_ENVIRONMENT}`
    /// 和 `LUNCH_SCRAPER__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(SettingsError)` - 配置加载或校验失败
    pub fn new() -> Result<Self, SettingsError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("LUNCH_SCRAPER").separator("__"));

        Self::finish(builder)
    }

    /// 从单个配置文件加载，不读取环境变量
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let builder = Self::defaults()?.add_source(File::from(path.as_ref()));
        Self::finish(builder)
    }

    /// 构建抓取目标，检查标识唯一性
    pub fn scrape_targets(&self) -> Result<ScrapeTargets, TargetsError> {
        ScrapeTargets::from_configs(self.locations.clone())
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            // Scraping
            .set_default("scraping.save_document", false)?
            .set_default("scraping.max_concurrent_fetches", 8)?
            .set_default("scraping.fetch_timeout_secs", 30)?
            .set_default("scraping.extraction_timeout_secs", 120)?
            .set_default("scraping.user_agent", DEFAULT_USER_AGENT)?
            // Scheduler
            .set_default("scheduler.enabled", true)?
            .set_default("scheduler.interval_secs", 3600)?
            .set_default("scheduler.run_on_start", false)?
            // Database
            .set_default("database.url", "memory://")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // LLM
            .set_default("llm.model", "gpt-4o-mini")?
            .set_default("llm.api_base_url", "https://api.openai.com/v1")?
            .set_default("llm.max_input_chars", 20_000)?
            // Metrics
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self, SettingsError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        settings.scrape_targets()?;
        Ok(settings)
    }
}
