// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, location, restaurant};
use lunch_scraper::workers::{ScrapeScheduler, SchedulerOptions};
use std::time::Duration;

#[tokio::test]
async fn test_scheduler_drives_scrape_service() {
    let app = create_test_app(
        vec![location("L1", vec![restaurant("R1", &["a.html"])])],
        "sqlite::memory:",
    )
    .await;
    app.set_page("a.html", "<html><body><p>Pe: Pizza</p></body></html>");

    let scheduler = ScrapeScheduler::new(
        app.service.clone(),
        SchedulerOptions {
            interval: Duration::from_secs(3600),
            run_on_start: true,
        },
    );
    scheduler.start().unwrap();
    assert!(scheduler.is_running());

    let mut stored = None;
    for _ in 0..100 {
        stored = app.repository.find_current("L1", "R1").await.unwrap();
        if stored.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    scheduler.shutdown().await;
    assert!(!scheduler.is_running());

    let stored = stored.expect("scheduled scrape should persist a result");
    assert_eq!(stored.document.as_deref(), Some("Pe: Pizza"));
    assert_eq!(app.llm_calls(), 1);
}
