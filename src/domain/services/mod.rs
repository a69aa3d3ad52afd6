// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 抓取服务（scrape_service）：编排地点、餐厅和页面的并发抓取，
///   通过内容哈希跳过未变化的菜单
/// - 提取服务（extraction_service）：把菜单文本转换为结构化数据
/// - LLM服务（llm_service）：集成大语言模型进行智能处理
pub mod extraction_service;
pub mod llm_service;
pub mod scrape_service;
