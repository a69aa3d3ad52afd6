// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 提供周期性抓取调度，负责调度器的启动、停止和运行状态查询
pub mod scheduler;

pub use scheduler::{ScrapeCycle, ScrapeScheduler, SchedulerOptions};
