// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::extraction_service::ExtractionError;
use crate::engines::traits::FetchError;
use thiserror::Error;

/// 仓库层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据转换错误: {0}")]
    Serialization(String),

    #[error("内部错误: {0}")]
    InternalError(String),
}

impl From<sea_orm::DbErr> for RepositoryError {
    fn from(err: sea_orm::DbErr) -> Self {
        RepositoryError::DatabaseError(err.to_string())
    }
}

/// 单个餐厅抓取失败的原因
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("获取页面失败 ({engine}) {url}: {source}")]
    Fetch {
        engine: &'static str,
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("菜单提取失败: {0}")]
    Extraction(#[source] ExtractionError),

    #[error("读取历史抓取结果失败: {0}")]
    StoreRead(#[source] RepositoryError),

    #[error("保存抓取结果失败: {0}")]
    StoreWrite(#[source] RepositoryError),
}

/// 调度器错误类型
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("调度器已在运行")]
    AlreadyRunning,

    #[error("调度间隔必须大于零且在时钟可表示范围内")]
    InvalidInterval,

    #[error("调度器正在停止")]
    Stopping,
}
