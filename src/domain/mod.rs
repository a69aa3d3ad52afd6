// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：抓取目标、抓取结果和抓取报告
/// - 仓库接口（repositories）：抓取结果持久化抽象接口
/// - 服务（services）：抓取编排、菜单提取和 LLM 集成
///
/// 领域层不依赖于任何具体的存储或网络实现。
pub mod models;
pub mod repositories;
pub mod services;
