// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 提供抓取结果仓库的数据库实现和内存实现
pub mod in_memory_scrape_result_repo;
pub mod scrape_result_repo_impl;

use crate::config::settings::DatabaseSettings;
use crate::domain::repositories::scrape_result_repository::ScrapeResultRepository;
use crate::infrastructure::database::connection::create_pool;
use crate::utils::errors::RepositoryError;
use in_memory_scrape_result_repo::InMemoryScrapeResultRepository;
use migration::{Migrator, MigratorTrait};
use scrape_result_repo_impl::ScrapeResultRepositoryImpl;
use std::sync::Arc;
use tracing::info;

/// 内存存储的数据库地址
pub const MEMORY_DATABASE_URL: &str = "memory://";

/// 根据数据库配置创建抓取结果仓库
///
/// `memory://` 使用进程内存储，其余地址连接数据库并执行迁移。
pub async fn create_scrape_result_repository(
    settings: &DatabaseSettings,
) -> Result<Arc<dyn ScrapeResultRepository>, RepositoryError> {
    if settings.url.starts_with(MEMORY_DATABASE_URL) {
        info!("Using in-memory scrape result store");
        return Ok(Arc::new(InMemoryScrapeResultRepository::new()));
    }

    let db = create_pool(settings).await?;
    Migrator::up(&db, None).await?;
    info!("Database migrations applied");

    Ok(Arc::new(ScrapeResultRepositoryImpl::new(Arc::new(db))))
}
