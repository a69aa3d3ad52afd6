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

use lunch_scraper::config::settings::Settings;
use lunch_scraper::domain::services::extraction_service::LlmExtractionService;
use lunch_scraper::domain::services::llm_service::{LLMService, LLMServiceTrait};
use lunch_scraper::domain::services::scrape_service::{ScrapeOptions, ScrapeService};
use lunch_scraper::engines::reqwest_engine::ReqwestDocumentSource;
use lunch_scraper::infrastructure::metrics;
use lunch_scraper::infrastructure::repositories::create_scrape_result_repository;
use lunch_scraper::utils::telemetry;
use lunch_scraper::workers::{ScrapeScheduler, SchedulerOptions};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动调度器
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting lunch-scraper...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    if settings.metrics.enabled {
        metrics::init_metrics(&settings.metrics.listen_addr)?;
    }

    let targets = Arc::new(settings.scrape_targets()?);
    info!(
        locations = targets.len(),
        restaurants = targets.restaurant_count(),
        "Scrape targets loaded"
    );
    if targets.is_empty() {
        warn!("No locations configured, scrapes will do nothing");
    }

    // 3. Result store
    let repository = create_scrape_result_repository(&settings.database).await?;

    // 4. Collaborators
    let document_source = Arc::new(ReqwestDocumentSource::new(
        &settings.scraping.user_agent,
        settings.scraping.fetch_timeout(),
    )?);
    let llm = Arc::new(LLMService::new(&settings.llm));
    if !llm.is_configured() {
        warn!("LLM API key not configured, menu extraction will fail");
    }
    let extraction_service = Arc::new(LlmExtractionService::new(llm));

    let scrape_service = Arc::new(ScrapeService::new(
        targets,
        document_source,
        extraction_service,
        repository,
        ScrapeOptions::from(&settings.scraping),
    ));

    // 5. Run once or schedule
    if !settings.scheduler.enabled {
        info!("Scrape scheduler disabled, running a single scrape");
        let report = scrape_service.scrape_all().await;
        info!(
            updated = report.updated(),
            skipped = report.skipped(),
            failed = report.failed(),
            "Single scrape finished"
        );
        return Ok(());
    }

    let scheduler = ScrapeScheduler::new(
        scrape_service.clone(),
        SchedulerOptions::from(&settings.scheduler),
    );
    scheduler.start()?;

    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => error!("Unable to listen for shutdown signal: {}", err),
    }

    if scheduler.is_running() {
        scheduler.shutdown().await;
    }

    info!("lunch-scraper stopped");
    Ok(())
}
