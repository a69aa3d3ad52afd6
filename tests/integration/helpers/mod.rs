// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lunch_scraper::config::settings::DatabaseSettings;
use lunch_scraper::domain::models::location::{LocationConfig, RestaurantConfig, ScrapeTargets};
use lunch_scraper::domain::repositories::scrape_result_repository::ScrapeResultRepository;
use lunch_scraper::domain::services::extraction_service::LlmExtractionService;
use lunch_scraper::domain::services::llm_service::{LLMService, LLMServiceTrait};
use lunch_scraper::domain::services::scrape_service::{ScrapeOptions, ScrapeService};
use lunch_scraper::engines::reqwest_engine::{ReqwestDocumentSource, DEFAULT_USER_AGENT};
use lunch_scraper::infrastructure::repositories::create_scrape_result_repository;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

pub type Pages = Arc<Mutex<HashMap<String, String>>>;

#[allow(dead_code)]
pub struct TestApp {
    pub pages: Pages,
    pub llm_calls: Arc<AtomicUsize>,
    pub repository: Arc<dyn ScrapeResultRepository>,
    pub service: Arc<ScrapeService>,
}

#[allow(dead_code)]
impl TestApp {
    pub fn set_page(&self, name: &str, html: &str) {
        self.pages.lock().insert(name.to_string(), html.to_string());
    }

    pub fn llm_calls(&self) -> usize {
        self.llm_calls.load(Ordering::SeqCst)
    }
}

pub fn restaurant(id: &str, pages: &[&str]) -> RestaurantConfig {
    RestaurantConfig {
        id: id.to_string(),
        name: None,
        urls: pages.iter().map(|p| p.to_string()).collect(),
        hint: None,
    }
}

pub fn location(id: &str, restaurants: Vec<RestaurantConfig>) -> LocationConfig {
    LocationConfig {
        id: id.to_string(),
        name: None,
        restaurants,
    }
}

/// 启动菜单页面服务器，页面内容可在测试中修改
async fn start_page_server(pages: Pages) -> String {
    let app = Router::new()
        .route(
            "/{page}",
            get(
                |State(pages): State<Pages>, Path(page): Path<String>| async move {
                    let html = pages.lock().get(&page).cloned();
                    match html {
                        Some(html) => (StatusCode::OK, html),
                        None => (StatusCode::NOT_FOUND, String::new()),
                    }
                },
            ),
        )
        .with_state(pages);

    serve(app).await
}

/// 启动 OpenAI 兼容的假 LLM 服务器
async fn start_llm_server(calls: Arc<AtomicUsize>) -> String {
    let app = Router::new().route(
        "/chat/completions",
        post(move |Json(_): Json<Value>| {
            let calls = calls.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                Json(json!({
                    "choices": [{
                        "message": {
                            "role": "assistant",
                            "content": format!("```json\n{{\"menus\": [], \"call\": {}}}\n```", n)
                        }
                    }],
                    "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
                }))
            }
        }),
    );

    serve(app).await
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// 使用真实的 HTTP 文档来源、LLM 提取服务和数据库仓库组装抓取服务
///
/// 餐厅配置中的 URL 写页面名即可，会自动加上页面服务器地址。
pub async fn create_test_app(locations: Vec<LocationConfig>, database_url: &str) -> TestApp {
    let pages: Pages = Arc::new(Mutex::new(HashMap::new()));
    let llm_calls = Arc::new(AtomicUsize::new(0));

    let page_base = start_page_server(pages.clone()).await;
    let llm_base = start_llm_server(llm_calls.clone()).await;

    let locations = locations
        .into_iter()
        .map(|mut location| {
            for restaurant in &mut location.restaurants {
                for url in &mut restaurant.urls {
                    *url = format!("{}/{}", page_base, url);
                }
            }
            location
        })
        .collect();
    let targets = Arc::new(ScrapeTargets::from_configs(locations).unwrap());

    let database = DatabaseSettings {
        url: database_url.to_string(),
        max_connections: Some(5),
        min_connections: None,
        connect_timeout: Some(5),
        idle_timeout: None,
    };
    let repository = create_scrape_result_repository(&database).await.unwrap();

    let document_source =
        Arc::new(ReqwestDocumentSource::new(DEFAULT_USER_AGENT, Duration::from_secs(5)).unwrap());
    let llm: Arc<dyn LLMServiceTrait> = Arc::new(LLMService::new_with_config(
        "test-key".to_string(),
        "gpt-4o-mini".to_string(),
        llm_base,
    ));
    let extraction_service = Arc::new(LlmExtractionService::new(llm));

    let service = Arc::new(ScrapeService::new(
        targets,
        document_source,
        extraction_service,
        repository.clone(),
        ScrapeOptions {
            save_document: true,
            fetch_timeout: Duration::from_secs(5),
            extraction_timeout: Duration::from_secs(5),
            ..ScrapeOptions::default()
        },
    ));

    TestApp {
        pages,
        llm_calls,
        repository,
        service,
    }
}
