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

use crate::config::settings::ScrapingSettings;
use crate::domain::models::location::{Location, RestaurantConfig, ScrapeTargets};
use crate::domain::models::scrape_outcome::{ScrapeOutcome, ScrapeReport, ScrapeStatus};
use crate::domain::models::scrape_result::{ScrapeResult, WeekStamp};
use crate::domain::repositories::scrape_result_repository::ScrapeResultRepository;
use crate::domain::services::extraction_service::{ExtractionError, ExtractionService};
use crate::engines::traits::{DocumentSource, FetchError};
use crate::utils::content_hash::{combine_documents, content_hash};
use crate::utils::errors::ScrapeError;
use chrono::Utc;
use futures::future::{join_all, try_join_all};
use metrics::{counter, histogram};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};

/// 抓取选项
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// 是否在结果中保存拼接后的文档
    pub save_document: bool,
    /// 整个抓取过程中同时进行的页面请求上限
    pub max_concurrent_fetches: usize,
    /// 单个页面获取的超时时间
    pub fetch_timeout: Duration,
    /// 单次提取的超时时间
    pub extraction_timeout: Duration,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            save_document: false,
            max_concurrent_fetches: 8,
            fetch_timeout: Duration::from_secs(30),
            extraction_timeout: Duration::from_secs(120),
        }
    }
}

impl From<&ScrapingSettings> for ScrapeOptions {
    fn from(settings: &ScrapingSettings) -> Self {
        Self {
            save_document: settings.save_document,
            max_concurrent_fetches: settings.max_concurrent_fetches,
            fetch_timeout: settings.fetch_timeout(),
            extraction_timeout: settings.extraction_timeout(),
        }
    }
}

/// 抓取服务
///
/// 对每个餐厅：并发获取全部页面，按配置顺序拼接并计算内容哈希；
/// 本周已有相同哈希的结果时跳过，否则调用提取服务并写入结果。
/// 地点之间、餐厅之间、页面之间都并发执行，某个餐厅失败不影响其他餐厅。
pub struct ScrapeService {
    targets: Arc<ScrapeTargets>,
    document_source: Arc<dyn DocumentSource>,
    extraction_service: Arc<dyn ExtractionService>,
    repository: Arc<dyn ScrapeResultRepository>,
    fetch_permits: Semaphore,
    options: ScrapeOptions,
}

impl ScrapeService {
    /// 创建新的抓取服务实例
    ///
    /// # 参数
    ///
    /// * `targets` - 抓取目标
    /// * `document_source` - 页面文档来源
    /// * `extraction_service` - 菜单提取服务
    /// * `repository` - 抓取结果仓库
    /// * `options` - 抓取选项
    pub fn new(
        targets: Arc<ScrapeTargets>,
        document_source: Arc<dyn DocumentSource>,
        extraction_service: Arc<dyn ExtractionService>,
        repository: Arc<dyn ScrapeResultRepository>,
        options: ScrapeOptions,
    ) -> Self {
        let fetch_permits = Semaphore::new(options.max_concurrent_fetches.max(1));
        Self {
            targets,
            document_source,
            extraction_service,
            repository,
            fetch_permits,
            options,
        }
    }

    /// 抓取全部地点
    pub async fn scrape_all(&self) -> ScrapeReport {
        let started = Instant::now();
        info!(
            locations = self.targets.len(),
            restaurants = self.targets.restaurant_count(),
            "Starting scrape of all locations"
        );

        let reports = join_all(
            self.targets
                .locations()
                .map(|location| self.scrape_location_targets(location)),
        )
        .await;
        let report = ScrapeReport::merge(reports);

        let elapsed = started.elapsed();
        histogram!("menu_scrape_cycle_duration_seconds").record(elapsed.as_secs_f64());
        info!(
            updated = report.updated(),
            skipped = report.skipped(),
            failed = report.failed(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Finished scrape of all locations"
        );

        report
    }

    /// 抓取单个地点，未知地点返回空报告
    pub async fn scrape_location(&self, location_id: &str) -> ScrapeReport {
        match self.targets.location(location_id) {
            Some(location) => self.scrape_location_targets(location).await,
            None => {
                debug!(location_id, "Unknown location, nothing to scrape");
                ScrapeReport::default()
            }
        }
    }

    /// 抓取单个餐厅，未知地点或餐厅返回 `None`
    pub async fn scrape_restaurant(
        &self,
        location_id: &str,
        restaurant_id: &str,
    ) -> Option<ScrapeOutcome> {
        let Some(location) = self.targets.location(location_id) else {
            debug!(location_id, "Unknown location, nothing to scrape");
            return None;
        };
        let Some(restaurant) = location.restaurant(restaurant_id) else {
            debug!(location_id, restaurant_id, "Unknown restaurant, nothing to scrape");
            return None;
        };

        Some(self.scrape_restaurant_target(location, restaurant).await)
    }

    async fn scrape_location_targets(&self, location: &Location) -> ScrapeReport {
        info!(location_id = %location.id, "Scraping menus for location");

        let outcomes = join_all(
            location
                .restaurants()
                .map(|restaurant| self.scrape_restaurant_target(location, restaurant)),
        )
        .await;

        ScrapeReport::new(outcomes)
    }

    async fn scrape_restaurant_target(
        &self,
        location: &Location,
        restaurant: &RestaurantConfig,
    ) -> ScrapeOutcome {
        let status = match self.run_restaurant_scrape(location, restaurant).await {
            Ok(status) => status,
            Err(error) => {
                error!(
                    location_id = %location.id,
                    restaurant_id = %restaurant.id,
                    "Failed to scrape menus for restaurant: {}",
                    error
                );
                ScrapeStatus::Failed { error }
            }
        };

        counter!("menu_scrapes_total", "status" => status.label()).increment(1);

        ScrapeOutcome {
            location_id: location.id.clone(),
            restaurant_id: restaurant.id.clone(),
            status,
        }
    }

    #[instrument(skip_all, fields(location_id = %location.id, restaurant_id = %restaurant.id))]
    async fn run_restaurant_scrape(
        &self,
        location: &Location,
        restaurant: &RestaurantConfig,
    ) -> Result<ScrapeStatus, ScrapeError> {
        info!("Scraping menus for restaurant");

        let previous = self
            .repository
            .find_current(&location.id, &restaurant.id)
            .await
            .map_err(ScrapeError::StoreRead)?;

        let documents = self.fetch_documents(&restaurant.urls).await?;
        let document = combine_documents(&documents);
        let hash = content_hash(&document);
        let week = WeekStamp::current();

        match &previous {
            Some(previous) if previous.week_stamp() == week && previous.document_hash == hash => {
                info!(%hash, "Skipping extraction since document hash matches previous scrape result");
                return Ok(ScrapeStatus::Skipped { hash });
            }
            Some(previous) if previous.week_stamp() != week => {
                info!(
                    previous_week = %previous.week_stamp(),
                    current_week = %week,
                    "Previous scrape result is from an earlier week. Proceeding with scrape."
                );
            }
            Some(previous) => {
                info!(
                    previous_hash = %previous.document_hash,
                    %hash,
                    "Document hash has changed. Proceeding with scrape."
                );
            }
            None => info!("No previous scrape result found. Proceeding with scrape."),
        }

        let extraction_result = self
            .extract(&document, restaurant.hint.as_deref())
            .await?;

        let result = ScrapeResult {
            year: week.year,
            week: week.week,
            location_id: location.id.clone(),
            restaurant_id: restaurant.id.clone(),
            document: self.options.save_document.then_some(document),
            document_hash: hash.clone(),
            scrape_timestamp: Utc::now(),
            extraction_result,
        };

        self.repository.upsert(&result).await.map_err(|e| {
            error!(%hash, "Extracted menu could not be saved: {}", e);
            ScrapeError::StoreWrite(e)
        })?;

        info!(%hash, %week, "Finished scraping menus for restaurant");
        Ok(ScrapeStatus::Updated { hash })
    }

    /// 并发获取全部页面，结果保持配置顺序
    async fn fetch_documents(&self, urls: &[String]) -> Result<Vec<String>, ScrapeError> {
        try_join_all(urls.iter().map(|url| self.fetch_document(url))).await
    }

    async fn fetch_document(&self, url: &str) -> Result<String, ScrapeError> {
        let engine = self.document_source.name();
        let _permit = self
            .fetch_permits
            .acquire()
            .await
            .map_err(|e| ScrapeError::Fetch {
                engine,
                url: url.to_string(),
                source: FetchError::Other(e.to_string()),
            })?;

        let fetch_timeout = self.options.fetch_timeout;
        let result = match timeout(fetch_timeout, self.document_source.fetch_document(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(fetch_timeout)),
        };

        match result {
            Ok(document) => {
                counter!("menu_fetches_total", "engine" => engine, "result" => "ok").increment(1);
                debug!(url, engine, bytes = document.len(), "Fetched document");
                Ok(document)
            }
            Err(source) => {
                counter!("menu_fetches_total", "engine" => engine, "result" => "error").increment(1);
                warn!(
                    url,
                    engine,
                    retryable = source.is_retryable(),
                    "Failed to fetch document: {}",
                    source
                );
                Err(ScrapeError::Fetch {
                    engine,
                    url: url.to_string(),
                    source,
                })
            }
        }
    }

    async fn extract(&self, document: &str, hint: Option<&str>) -> Result<Value, ScrapeError> {
        let extraction_timeout = self.options.extraction_timeout;
        match timeout(
            extraction_timeout,
            self.extraction_service.extract(document, hint),
        )
        .await
        {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(ScrapeError::Extraction(e)),
            Err(_) => Err(ScrapeError::Extraction(ExtractionError::Timeout(
                extraction_timeout,
            ))),
        }
    }
}

#[cfg(test)]
#[path = "scrape_service_test.rs"]
mod tests;
