//! 定时任务
//!
//! 任务是否到期由系统设置 `scheduler.<task>.last_run` 决定，
//! 因此 cron 入口被频繁调用时每个任务仍只在到期后执行一次。

pub mod check_links;
pub mod trash_cleanup;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::{error, info};

use crate::config::get_config;
use crate::errors::Result;
use crate::services::{AppServices, SettingsService};

pub use check_links::{CheckLinksTask, HttpProbe, UrlProbe};
pub use trash_cleanup::TrashCleanupTask;

#[async_trait]
pub trait ScheduledTask: Send + Sync {
    fn name(&self) -> &'static str;

    fn interval(&self) -> Duration;

    /// 执行一次，返回简短的结果描述
    async fn run(&self) -> Result<String>;
}

/// 任务是否到期：从未运行过，或距上次运行已超过间隔
pub fn is_due(last_run: Option<DateTime<Utc>>, interval: Duration, now: DateTime<Utc>) -> bool {
    match last_run {
        None => true,
        Some(last) => now - last >= interval,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Ran(String),
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub tasks: Vec<(&'static str, TaskOutcome)>,
}

impl RunReport {
    pub fn ran(&self) -> usize {
        self.tasks
            .iter()
            .filter(|(_, o)| matches!(o, TaskOutcome::Ran(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.tasks
            .iter()
            .filter(|(_, o)| matches!(o, TaskOutcome::Failed(_)))
            .count()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, outcome) in &self.tasks {
            match outcome {
                TaskOutcome::Ran(summary) => writeln!(f, "{}: {}", name, summary)?,
                TaskOutcome::Skipped => writeln!(f, "{}: not due", name)?,
                TaskOutcome::Failed(msg) => writeln!(f, "{}: failed ({})", name, msg)?,
            }
        }
        Ok(())
    }
}

pub struct TaskRunner {
    settings: Arc<SettingsService>,
    tasks: Vec<Box<dyn ScheduledTask>>,
}

impl TaskRunner {
    pub fn new(settings: Arc<SettingsService>, tasks: Vec<Box<dyn ScheduledTask>>) -> Self {
        Self { settings, tasks }
    }

    /// 注册内置任务
    pub fn with_default_tasks(services: &AppServices) -> Self {
        let config = get_config();
        let tasks: Vec<Box<dyn ScheduledTask>> = vec![
            Box::new(CheckLinksTask::new(
                services.storage.clone(),
                Arc::new(HttpProbe::new(config.scheduler.check_timeout_secs)),
                config.scheduler.check_batch_size,
            )),
            Box::new(TrashCleanupTask::new(
                services.trash.clone(),
                config.scheduler.trash_retention_days,
            )),
        ];
        Self::new(services.settings.clone(), tasks)
    }

    pub fn task_names(&self) -> Vec<&'static str> {
        self.tasks.iter().map(|t| t.name()).collect()
    }

    /// 依次执行所有到期任务
    ///
    /// 单个任务失败不影响其他任务，失败的任务不更新 last_run，下次调用会重试。
    pub async fn run_due(&self, now: DateTime<Utc>) -> Result<RunReport> {
        let mut report = RunReport::default();

        for task in &self.tasks {
            let last_run = self.settings.last_run(task.name()).await?;
            if !is_due(last_run, task.interval(), now) {
                report.tasks.push((task.name(), TaskOutcome::Skipped));
                continue;
            }

            match task.run().await {
                Ok(summary) => {
                    self.settings.set_last_run(task.name(), now).await?;
                    info!("Scheduler: task {} finished: {}", task.name(), summary);
                    report.tasks.push((task.name(), TaskOutcome::Ran(summary)));
                }
                Err(e) => {
                    error!("Scheduler: task {} failed: {}", task.name(), e);
                    report
                        .tasks
                        .push((task.name(), TaskOutcome::Failed(e.message())));
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_due() {
        let now = Utc::now();
        let hour = Duration::minutes(60);
        assert!(is_due(None, hour, now));
        assert!(is_due(Some(now - Duration::minutes(61)), hour, now));
        assert!(is_due(Some(now - hour), hour, now));
        assert!(!is_due(Some(now - Duration::minutes(5)), hour, now));
    }

    #[test]
    fn test_report_display() {
        let report = RunReport {
            tasks: vec![
                ("check_links", TaskOutcome::Ran("checked 3 links".into())),
                ("trash_cleanup", TaskOutcome::Skipped),
                ("other", TaskOutcome::Failed("boom".into())),
            ],
        };
        let text = report.to_string();
        assert!(text.contains("check_links: checked 3 links"));
        assert!(text.contains("trash_cleanup: not due"));
        assert!(text.contains("other: failed (boom)"));
        assert_eq!(report.ran(), 1);
        assert_eq!(report.failed(), 1);
    }
}
