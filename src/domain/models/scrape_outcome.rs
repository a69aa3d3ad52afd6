// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::ScrapeError;

/// 单个餐厅的抓取状态
#[derive(Debug)]
pub enum ScrapeStatus {
    /// 内容有变化（或本周尚无结果），已重新提取并保存
    Updated { hash: String },
    /// 本周已有相同内容的结果，未做任何写入
    Skipped { hash: String },
    /// 抓取失败，未做任何写入
    Failed { error: ScrapeError },
}

impl ScrapeStatus {
    /// 指标标签
    pub fn label(&self) -> &'static str {
        match self {
            ScrapeStatus::Updated { .. } => "updated",
            ScrapeStatus::Skipped { .. } => "skipped",
            ScrapeStatus::Failed { .. } => "failed",
        }
    }
}

/// 单个餐厅的抓取结果
#[derive(Debug)]
pub struct ScrapeOutcome {
    pub location_id: String,
    pub restaurant_id: String,
    pub status: ScrapeStatus,
}

/// 一次抓取的汇总报告
#[derive(Debug, Default)]
pub struct ScrapeReport {
    pub outcomes: Vec<ScrapeOutcome>,
}

impl ScrapeReport {
    pub fn new(outcomes: Vec<ScrapeOutcome>) -> Self {
        Self { outcomes }
    }

    /// 合并多个地点的报告，保留顺序
    pub fn merge(reports: impl IntoIterator<Item = ScrapeReport>) -> Self {
        Self {
            outcomes: reports.into_iter().flat_map(|r| r.outcomes).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn updated(&self) -> usize {
        self.count(|s| matches!(s, ScrapeStatus::Updated { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, ScrapeStatus::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, ScrapeStatus::Failed { .. }))
    }

    /// 查找指定餐厅的结果
    pub fn outcome(&self, location_id: &str, restaurant_id: &str) -> Option<&ScrapeOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.location_id == location_id && o.restaurant_id == restaurant_id)
    }

    fn count(&self, predicate: impl Fn(&ScrapeStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(&o.status)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::traits::FetchError;

    fn outcome(restaurant_id: &str, status: ScrapeStatus) -> ScrapeOutcome {
        ScrapeOutcome {
            location_id: "tampere".to_string(),
            restaurant_id: restaurant_id.to_string(),
            status,
        }
    }

    #[test]
    fn test_report_counts() {
        let report = ScrapeReport::merge(vec![
            ScrapeReport::new(vec![
                outcome("a", ScrapeStatus::Updated { hash: "1".into() }),
                outcome("b", ScrapeStatus::Skipped { hash: "2".into() }),
            ]),
            ScrapeReport::new(vec![outcome(
                "c",
                ScrapeStatus::Failed {
                    error: ScrapeError::Fetch {
                        engine: "reqwest",
                        url: "https://example.com".into(),
                        source: FetchError::HttpStatus { status: 503 },
                    },
                },
            )]),
        ]);

        assert_eq!(report.len(), 3);
        assert_eq!(report.updated(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.outcome("tampere", "c").unwrap().status.label(), "failed");
        assert!(report.outcome("tampere", "x").is_none());
    }

    #[test]
    fn test_empty_report() {
        let report = ScrapeReport::default();
        assert!(report.is_empty());
        assert_eq!(report.updated() + report.skipped() + report.failed(), 0);
    }
}
