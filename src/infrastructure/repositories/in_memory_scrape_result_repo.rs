// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scrape_result::ScrapeResult;
use crate::domain::repositories::scrape_result_repository::ScrapeResultRepository;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use dashmap::DashMap;

/// 内存抓取结果仓库
///
/// 每个餐厅只保留最新一条结果，进程退出后数据丢失。
#[derive(Debug, Default)]
pub struct InMemoryScrapeResultRepository {
    results: DashMap<(String, String), ScrapeResult>,
}

impl InMemoryScrapeResultRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[async_trait]
impl ScrapeResultRepository for InMemoryScrapeResultRepository {
    async fn find_current(
        &self,
        location_id: &str,
        restaurant_id: &str,
    ) -> Result<Option<ScrapeResult>, RepositoryError> {
        let key = (location_id.to_string(), restaurant_id.to_string());
        Ok(self.results.get(&key).map(|entry| entry.value().clone()))
    }

    async fn upsert(&self, result: &ScrapeResult) -> Result<(), RepositoryError> {
        let key = (result.location_id.clone(), result.restaurant_id.clone());
        self.results.insert(key, result.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn result(restaurant_id: &str, week: u32, hash: &str) -> ScrapeResult {
        ScrapeResult {
            year: 2025,
            week,
            location_id: "tampere".to_string(),
            restaurant_id: restaurant_id.to_string(),
            document: None,
            document_hash: hash.to_string(),
            scrape_timestamp: Utc::now(),
            extraction_result: json!({ "menus": [] }),
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_previous_result() {
        let repo = InMemoryScrapeResultRepository::new();

        repo.upsert(&result("a", 10, "first")).await.unwrap();
        repo.upsert(&result("a", 11, "second")).await.unwrap();

        let current = repo.find_current("tampere", "a").await.unwrap().unwrap();
        assert_eq!(current.week, 11);
        assert_eq!(current.document_hash, "second");
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_find_current_is_keyed_by_restaurant() {
        let repo = InMemoryScrapeResultRepository::new();
        repo.upsert(&result("a", 10, "hash-a")).await.unwrap();

        assert!(repo.find_current("tampere", "b").await.unwrap().is_none());
        assert!(repo.find_current("helsinki", "a").await.unwrap().is_none());
    }
}
