// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 抓取目标（location）：地点、餐厅及其菜单页面
/// - 抓取结果（scrape_result）：每个餐厅每周的菜单提取结果
/// - 抓取报告（scrape_outcome）：一次抓取中每个餐厅的处理结果
pub mod location;
pub mod scrape_outcome;
pub mod scrape_result;
