// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Context;
use metrics::{describe_counter, describe_histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;

/// 初始化 Prometheus 指标导出
///
/// 在 `listen_addr` 上提供 `/metrics`，并注册抓取相关的指标说明
pub fn init_metrics(listen_addr: &str) -> anyhow::Result<()> {
    let addr: SocketAddr = listen_addr
        .parse()
        .with_context(|| format!("Invalid metrics address: {}", listen_addr))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus recorder")?;

    describe_metrics();
    info!("Metrics exporter listening on {}", addr);
    Ok(())
}

fn describe_metrics() {
    describe_counter!(
        "menu_scrapes_total",
        "Restaurant scrapes by outcome (updated, skipped, failed)"
    );
    describe_counter!(
        "menu_fetches_total",
        "Menu page fetches by document source engine and result (ok, error)"
    );
    describe_histogram!(
        "menu_scrape_cycle_duration_seconds",
        Unit::Seconds,
        "Duration of a full scrape of all locations"
    );
}
