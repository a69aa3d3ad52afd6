// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scrape_result::ScrapeResult;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;

/// 菜单抓取结果仓库特质
///
/// 定义抓取结果数据访问接口
#[async_trait]
pub trait ScrapeResultRepository: Send + Sync {
    /// 查找餐厅最近一次的抓取结果
    ///
    /// 返回按 (year, week, scrape_timestamp) 排序的最新记录，不限定周。
    /// 读取失败必须返回错误，不能当作“没有结果”。
    async fn find_current(
        &self,
        location_id: &str,
        restaurant_id: &str,
    ) -> Result<Option<ScrapeResult>, RepositoryError>;

    /// 按 (year, week, location_id, restaurant_id) 插入或覆盖结果
    async fn upsert(&self, result: &ScrapeResult) -> Result<(), RepositoryError>;
}
