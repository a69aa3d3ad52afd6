// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置、环境变量和抓取目标
pub mod config;

/// 领域模块
///
/// 包含核心业务实体、抓取编排服务和仓库接口
pub mod domain;

/// 引擎模块
///
/// 实现菜单页面的文档获取引擎
pub mod engines;

/// 基础设施模块
///
/// 提供外部服务集成，如数据库、内存存储和指标导出
pub mod infrastructure;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 实现周期性抓取调度
pub mod workers;
