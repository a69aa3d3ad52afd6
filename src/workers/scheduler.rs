// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::config::settings::SchedulerSettings;
use crate::domain::models::scrape_outcome::ScrapeReport;
use crate::domain::services::scrape_service::ScrapeService;
use crate::utils::errors::SchedulerError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// 一次完整的抓取
#[async_trait]
pub trait ScrapeCycle: Send + Sync {
    async fn run_cycle(&self) -> ScrapeReport;
}

#[async_trait]
impl ScrapeCycle for ScrapeService {
    async fn run_cycle(&self) -> ScrapeReport {
        self.scrape_all().await
    }
}

/// 调度选项
#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    /// 两次抓取之间的间隔
    pub interval: Duration,
    /// 启动后立即执行第一次抓取，否则等待一个间隔
    pub run_on_start: bool,
}

impl From<&SchedulerSettings> for SchedulerOptions {
    fn from(settings: &SchedulerSettings) -> Self {
        Self {
            interval: settings.interval(),
            run_on_start: settings.run_on_start,
        }
    }
}

struct RunningScheduler {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// 调度器状态，`Stopping` 持续到循环任务退出为止
enum SchedulerState {
    Stopped,
    Running(RunningScheduler),
    Stopping,
}

/// 抓取调度器
///
/// 按固定间隔触发抓取。停止时不会中断正在进行的抓取，
/// `shutdown` 会等待它完成后才返回。
pub struct ScrapeScheduler {
    cycle: Arc<dyn ScrapeCycle>,
    options: SchedulerOptions,
    state: Mutex<SchedulerState>,
}

impl ScrapeScheduler {
    /// 创建新的调度器实例，创建后处于停止状态
    ///
    /// # 参数
    ///
    /// * `cycle` - 每次触发时执行的抓取
    /// * `options` - 调度选项
    pub fn new(cycle: Arc<dyn ScrapeCycle>, options: SchedulerOptions) -> Self {
        Self {
            cycle,
            options,
            state: Mutex::new(SchedulerState::Stopped),
        }
    }

    /// 启动调度器
    ///
    /// 必须在 tokio 运行时中调用
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 启动成功
    /// * `Err(SchedulerError::AlreadyRunning)` - 调度器已在运行，状态不变
    /// * `Err(SchedulerError::Stopping)` - 上一次 `shutdown` 仍在等待抓取完成
    /// * `Err(SchedulerError::InvalidInterval)` - 调度间隔为零或过大
    pub fn start(&self) -> Result<(), SchedulerError> {
        let interval = self.options.interval;
        if interval.is_zero() {
            return Err(SchedulerError::InvalidInterval);
        }
        let Some(start_at) = first_tick(Instant::now(), interval, self.options.run_on_start) else {
            return Err(SchedulerError::InvalidInterval);
        };

        let mut state = self.state.lock();
        match *state {
            SchedulerState::Running(_) => {
                warn!("Scrape scheduler is already running");
                return Err(SchedulerError::AlreadyRunning);
            }
            SchedulerState::Stopping => {
                warn!("Scrape scheduler is still stopping");
                return Err(SchedulerError::Stopping);
            }
            SchedulerState::Stopped => {}
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run_loop(self.cycle.clone(), start_at, interval, stop_rx));
        *state = SchedulerState::Running(RunningScheduler { stop_tx, handle });

        info!(
            interval_secs = self.options.interval.as_secs(),
            run_on_start = self.options.run_on_start,
            "Scrape scheduler started"
        );
        Ok(())
    }

    /// 停止调度器
    ///
    /// 不再触发新的抓取；若有抓取正在进行，等待其完成。
    /// 等待期间调度器处于停止中状态，`start` 会被拒绝。未运行时不做任何事。
    pub async fn shutdown(&self) {
        let running = {
            let mut state = self.state.lock();
            match std::mem::replace(&mut *state, SchedulerState::Stopping) {
                SchedulerState::Running(running) => running,
                other => {
                    *state = other;
                    debug!("Scrape scheduler is not running or already stopping");
                    return;
                }
            }
        };

        info!("Stopping scrape scheduler");
        let _ = running.stop_tx.send(true);
        if let Err(e) = running.handle.await {
            error!("Scrape scheduler task ended abnormally: {}", e);
        }

        *self.state.lock() = SchedulerState::Stopped;
        info!("Scrape scheduler stopped");
    }

    /// 调度器是否在运行，停止中也算运行
    pub fn is_running(&self) -> bool {
        !matches!(*self.state.lock(), SchedulerState::Stopped)
    }
}

/// 计算首次触发时间，间隔超出时钟范围时返回 `None`
fn first_tick(now: Instant, interval: Duration, run_on_start: bool) -> Option<Instant> {
    // 后续触发时间按 now + interval 递推，也必须可表示
    let next = now.checked_add(interval)?;
    next.checked_add(interval)?;
    Some(if run_on_start { now } else { next })
}

async fn run_loop(
    cycle: Arc<dyn ScrapeCycle>,
    start_at: Instant,
    interval: Duration,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = interval_at(start_at, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = stop_rx.changed() => break,
        }

        if *stop_rx.borrow() {
            break;
        }

        info!("Scheduled scrape triggered");
        let report = cycle.run_cycle().await;
        info!(
            updated = report.updated(),
            skipped = report.skipped(),
            failed = report.failed(),
            "Scheduled scrape finished"
        );
    }

    debug!("Scrape scheduler loop exited");
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod tests;
