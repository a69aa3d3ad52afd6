// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, location, restaurant};
use lunch_scraper::domain::models::scrape_outcome::ScrapeStatus;
use lunch_scraper::domain::models::scrape_result::WeekStamp;
use lunch_scraper::engines::traits::FetchError;
use lunch_scraper::utils::content_hash::content_hash;
use lunch_scraper::utils::errors::ScrapeError;

const A_HTML: &str = "<html><body><h1>Ravintola A</h1><p>Ma: Lohikeitto</p></body></html>";
const B_HTML: &str = "<html><body><h1>Ravintola B</h1><p>Viikko 1</p></body></html>";
const C_HTML: &str = "<html><body><p>Ti: Kasvislasagne</p></body></html>";
const C_HTML_CHANGED: &str = "<html><body><p>Ti: Broileripasta</p></body></html>";

#[tokio::test]
async fn test_weekly_scrape_skips_unchanged_restaurants() {
    let app = create_test_app(
        vec![location(
            "L1",
            vec![
                restaurant("R1", &["a.html"]),
                restaurant("R2", &["b.html", "c.html"]),
            ],
        )],
        "sqlite::memory:",
    )
    .await;
    app.set_page("a.html", A_HTML);
    app.set_page("b.html", B_HTML);
    app.set_page("c.html", C_HTML);

    // Run 1: nothing stored yet
    let report = app.service.scrape_location("L1").await;
    assert_eq!(report.updated(), 2);
    assert_eq!(app.llm_calls(), 2);

    let r1 = app.repository.find_current("L1", "R1").await.unwrap().unwrap();
    let r2 = app.repository.find_current("L1", "R2").await.unwrap().unwrap();
    assert_eq!(r1.week_stamp(), WeekStamp::current());
    assert_eq!(r2.week_stamp(), WeekStamp::current());
    assert_eq!(r1.document.as_deref(), Some("Ravintola A\nMa: Lohikeitto"));
    assert_eq!(
        r2.document.as_deref(),
        Some("Ravintola B\nViikko 1\nTi: Kasvislasagne")
    );
    assert_eq!(
        r2.document_hash,
        content_hash("Ravintola B\nViikko 1\nTi: Kasvislasagne")
    );

    // Run 2: nothing changed
    let report = app.service.scrape_location("L1").await;
    assert_eq!(report.skipped(), 2);
    assert_eq!(app.llm_calls(), 2);

    // Run 3: only c.html changed
    app.set_page("c.html", C_HTML_CHANGED);
    let report = app.service.scrape_location("L1").await;

    assert!(matches!(
        report.outcome("L1", "R1").unwrap().status,
        ScrapeStatus::Skipped { .. }
    ));
    assert!(matches!(
        report.outcome("L1", "R2").unwrap().status,
        ScrapeStatus::Updated { .. }
    ));
    assert_eq!(app.llm_calls(), 3);

    let r1_after = app.repository.find_current("L1", "R1").await.unwrap().unwrap();
    let r2_after = app.repository.find_current("L1", "R2").await.unwrap().unwrap();
    assert_eq!(r1_after, r1);
    assert_ne!(r2_after.document_hash, r2.document_hash);
    assert_eq!(
        r2_after.document_hash,
        content_hash("Ravintola B\nViikko 1\nTi: Broileripasta")
    );
    assert_eq!(r2_after.extraction_result["call"], 3);
}

#[tokio::test]
async fn test_failures_do_not_affect_other_locations() {
    let app = create_test_app(
        vec![
            location("L1", vec![restaurant("R1", &["missing.html"])]),
            location("L2", vec![restaurant("R1", &["a.html"])]),
        ],
        "sqlite::memory:",
    )
    .await;
    app.set_page("a.html", A_HTML);

    let report = app.service.scrape_all().await;

    assert_eq!(report.len(), 2);
    match &report.outcome("L1", "R1").unwrap().status {
        ScrapeStatus::Failed {
            error: ScrapeError::Fetch { engine, source, .. },
        } => {
            assert_eq!(*engine, "reqwest");
            assert!(matches!(source, FetchError::HttpStatus { status: 404 }));
        }
        other => panic!("expected fetch failure, got {:?}", other),
    }
    assert!(matches!(
        report.outcome("L2", "R1").unwrap().status,
        ScrapeStatus::Updated { .. }
    ));

    assert!(app.repository.find_current("L1", "R1").await.unwrap().is_none());
    assert!(app.repository.find_current("L2", "R1").await.unwrap().is_some());
    assert_eq!(app.llm_calls(), 1);
}

#[tokio::test]
async fn test_in_memory_store_supports_skip_policy() {
    let app = create_test_app(
        vec![location("L1", vec![restaurant("R1", &["a.html"])])],
        "memory://",
    )
    .await;
    app.set_page("a.html", A_HTML);

    let first = app.service.scrape_restaurant("L1", "R1").await.unwrap();
    let second = app.service.scrape_restaurant("L1", "R1").await.unwrap();

    assert!(matches!(first.status, ScrapeStatus::Updated { .. }));
    assert!(matches!(second.status, ScrapeStatus::Skipped { .. }));
    assert_eq!(app.llm_calls(), 1);
}

#[tokio::test]
async fn test_unknown_restaurant_is_ignored() {
    let app = create_test_app(
        vec![location("L1", vec![restaurant("R1", &["a.html"])])],
        "memory://",
    )
    .await;

    assert!(app.service.scrape_restaurant("L1", "R2").await.is_none());
    assert!(app.service.scrape_location("L9").await.is_empty());
    assert_eq!(app.llm_calls(), 0);
}
