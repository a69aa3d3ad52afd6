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

use crate::domain::models::scrape_result::ScrapeResult;
use crate::domain::repositories::scrape_result_repository::ScrapeResultRepository;
use crate::infrastructure::database::entities::menu_scrape_result as menu_entity;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use std::sync::Arc;

/// 抓取结果仓库实现
pub struct ScrapeResultRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl ScrapeResultRepositoryImpl {
    /// 创建新的抓取结果仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    ///
    /// # 返回值
    ///
    /// 返回新的抓取结果仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn to_domain(model: menu_entity::Model) -> Result<ScrapeResult, RepositoryError> {
        let week = u32::try_from(model.week).map_err(|_| {
            RepositoryError::Serialization(format!("invalid week number {}", model.week))
        })?;

        Ok(ScrapeResult {
            year: model.year,
            week,
            location_id: model.location_id,
            restaurant_id: model.restaurant_id,
            document: model.document,
            document_hash: model.document_hash,
            scrape_timestamp: model.scrape_timestamp.into(),
            extraction_result: model.extraction_result,
        })
    }
}

#[async_trait]
impl ScrapeResultRepository for ScrapeResultRepositoryImpl {
    async fn find_current(
        &self,
        location_id: &str,
        restaurant_id: &str,
    ) -> Result<Option<ScrapeResult>, RepositoryError> {
        let model = menu_entity::Entity::find()
            .filter(menu_entity::Column::LocationId.eq(location_id))
            .filter(menu_entity::Column::RestaurantId.eq(restaurant_id))
            .order_by_desc(menu_entity::Column::Year)
            .order_by_desc(menu_entity::Column::Week)
            .order_by_desc(menu_entity::Column::ScrapeTimestamp)
            .one(self.db.as_ref())
            .await?;

        model.map(Self::to_domain).transpose()
    }

    async fn upsert(&self, result: &ScrapeResult) -> Result<(), RepositoryError> {
        let week = i32::try_from(result.week).map_err(|_| {
            RepositoryError::Serialization(format!("invalid week number {}", result.week))
        })?;

        let active_model = menu_entity::ActiveModel {
            year: Set(result.year),
            week: Set(week),
            location_id: Set(result.location_id.clone()),
            restaurant_id: Set(result.restaurant_id.clone()),
            document: Set(result.document.clone()),
            document_hash: Set(result.document_hash.clone()),
            scrape_timestamp: Set(result.scrape_timestamp.into()),
            extraction_result: Set(result.extraction_result.clone()),
        };

        menu_entity::Entity::insert(active_model)
            .on_conflict(
                OnConflict::columns([
                    menu_entity::Column::Year,
                    menu_entity::Column::Week,
                    menu_entity::Column::LocationId,
                    menu_entity::Column::RestaurantId,
                ])
                .update_columns([
                    menu_entity::Column::Document,
                    menu_entity::Column::DocumentHash,
                    menu_entity::Column::ScrapeTimestamp,
                    menu_entity::Column::ExtractionResult,
                ])
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;

        Ok(())
    }
}

#[cfg(test)]
#[path = "scrape_result_repo_impl_test.rs"]
mod tests;
