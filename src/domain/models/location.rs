// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// 餐厅配置
///
/// 一个餐厅可以有多个菜单页面（例如按周拆分），抓取时按配置顺序拼接。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RestaurantConfig {
    /// 餐厅标识，在所属地点内唯一
    #[validate(length(min = 1))]
    pub id: String,
    /// 显示名称
    #[serde(default)]
    pub name: Option<String>,
    /// 菜单页面地址，至少一个
    #[validate(length(min = 1))]
    pub urls: Vec<String>,
    /// 提供给提取服务的餐厅描述
    #[serde(default)]
    pub hint: Option<String>,
}

/// 地点配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LocationConfig {
    /// 地点标识，全局唯一
    #[validate(length(min = 1))]
    pub id: String,
    /// 显示名称
    #[serde(default)]
    pub name: Option<String>,
    /// 该地点的餐厅
    #[serde(default)]
    #[validate(nested)]
    pub restaurants: Vec<RestaurantConfig>,
}

/// 抓取目标构建错误
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TargetsError {
    #[error("重复的地点标识: {0}")]
    DuplicateLocation(String),

    #[error("地点 {location_id} 中重复的餐厅标识: {restaurant_id}")]
    DuplicateRestaurant {
        location_id: String,
        restaurant_id: String,
    },
}

/// 按标识索引的地点，保留配置顺序
#[derive(Debug, Clone)]
pub struct Location {
    pub id: String,
    pub name: Option<String>,
    restaurants: IndexMap<String, RestaurantConfig>,
}

impl Location {
    /// 按标识查找餐厅
    pub fn restaurant(&self, restaurant_id: &str) -> Option<&RestaurantConfig> {
        self.restaurants.get(restaurant_id)
    }

    /// 按配置顺序遍历餐厅
    pub fn restaurants(&self) -> impl Iterator<Item = &RestaurantConfig> {
        self.restaurants.values()
    }
}

/// 全部抓取目标
///
/// 启动时由配置构建，之后只读。
#[derive(Debug, Clone, Default)]
pub struct ScrapeTargets {
    locations: IndexMap<String, Location>,
}

impl ScrapeTargets {
    /// 由地点配置构建抓取目标
    ///
    /// # 参数
    ///
    /// * `configs` - 地点配置列表
    ///
    /// # 返回值
    ///
    /// * `Ok(ScrapeTargets)` - 构建成功
    /// * `Err(TargetsError)` - 存在重复的地点或餐厅标识
    pub fn from_configs(configs: Vec<LocationConfig>) -> Result<Self, TargetsError> {
        let mut locations = IndexMap::with_capacity(configs.len());

        for config in configs {
            if locations.contains_key(&config.id) {
                return Err(TargetsError::DuplicateLocation(config.id));
            }

            let mut restaurants = IndexMap::with_capacity(config.restaurants.len());
            for restaurant in config.restaurants {
                if restaurants.contains_key(&restaurant.id) {
                    return Err(TargetsError::DuplicateRestaurant {
                        location_id: config.id,
                        restaurant_id: restaurant.id,
                    });
                }
                restaurants.insert(restaurant.id.clone(), restaurant);
            }

            locations.insert(
                config.id.clone(),
                Location {
                    id: config.id,
                    name: config.name,
                    restaurants,
                },
            );
        }

        Ok(Self { locations })
    }

    /// 按标识查找地点
    pub fn location(&self, location_id: &str) -> Option<&Location> {
        self.locations.get(location_id)
    }

    /// 按配置顺序遍历地点
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// 全部地点的餐厅总数
    pub fn restaurant_count(&self) -> usize {
        self.locations.values().map(|l| l.restaurants.len()).sum()
    }
}
