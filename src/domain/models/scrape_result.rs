// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO 周标识
///
/// `year` 是 ISO 周所属的年份，跨年周（如 2024-12-31 属于 2025 年第 1 周）
/// 不会被拆成两个不同的周。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WeekStamp {
    pub year: i32,
    pub week: u32,
}

impl WeekStamp {
    /// 当前时间所在的 ISO 周
    pub fn current() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// 指定时间所在的 ISO 周
    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        let iso = datetime.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }
}

impl fmt::Display for WeekStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

/// 菜单抓取结果实体
///
/// 每个餐厅每个 ISO 周最多一条记录，以 (year, week, location_id, restaurant_id) 为键。
/// 同一周内重复抓取会覆盖该记录。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeResult {
    /// ISO 周所属年份
    pub year: i32,
    /// ISO 周序号
    pub week: u32,
    /// 地点标识
    pub location_id: String,
    /// 餐厅标识
    pub restaurant_id: String,
    /// 拼接后的页面文档，仅在开启文档保存时记录
    pub document: Option<String>,
    /// 拼接文档的内容哈希
    pub document_hash: String,
    /// 抓取时间
    pub scrape_timestamp: DateTime<Utc>,
    /// 提取服务返回的结构化菜单
    pub extraction_result: serde_json::Value,
}

impl ScrapeResult {
    /// 记录所属的 ISO 周
    pub fn week_stamp(&self) -> WeekStamp {
        WeekStamp {
            year: self.year,
            week: self.week,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_week_stamp_mid_year() {
        let datetime = Utc.with_ymd_and_hms(2025, 6, 18, 12, 0, 0).unwrap();
        assert_eq!(
            WeekStamp::from_datetime(datetime),
            WeekStamp {
                year: 2025,
                week: 25
            }
        );
    }

    #[test]
    fn test_week_stamp_uses_iso_week_year() {
        let new_years_eve = Utc.with_ymd_and_hms(2024, 12, 31, 10, 0, 0).unwrap();
        assert_eq!(
            WeekStamp::from_datetime(new_years_eve),
            WeekStamp { year: 2025, week: 1 }
        );

        let early_january = Utc.with_ymd_and_hms(2021, 1, 3, 10, 0, 0).unwrap();
        assert_eq!(
            WeekStamp::from_datetime(early_january),
            WeekStamp {
                year: 2020,
                week: 53
            }
        );
    }

    #[test]
    fn test_week_stamp_display() {
        assert_eq!(WeekStamp { year: 2025, week: 3 }.to_string(), "2025-W03");
    }

    #[test]
    fn test_scrape_result_week_stamp() {
        let result = ScrapeResult {
            year: 2025,
            week: 42,
            location_id: "tampere".to_string(),
            restaurant_id: "a".to_string(),
            document: None,
            document_hash: "abc".to_string(),
            scrape_timestamp: Utc::now(),
            extraction_result: serde_json::json!({}),
        };

        assert_eq!(result.week_stamp(), WeekStamp { year: 2025, week: 42 });
    }
}
