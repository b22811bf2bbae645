mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use common::{create_user, link, setup};
use linkace::errors::{LinkaceError, Result};
use linkace::scheduler::{CheckLinksTask, ScheduledTask, TaskOutcome, TaskRunner, UrlProbe};
use linkace::storage::{LinkStatus, OwnerScope};

/// 按 URL 返回固定状态，不发起网络请求
struct FakeProbe;

#[async_trait]
impl UrlProbe for FakeProbe {
    async fn probe(&self, url: &str) -> LinkStatus {
        if url.contains("gone") {
            LinkStatus::Broken
        } else if url.contains("old") {
            LinkStatus::Moved
        } else {
            LinkStatus::Ok
        }
    }
}

struct CountingTask {
    runs: Arc<AtomicUsize>,
    fail: bool,
}

#[async_trait]
impl ScheduledTask for CountingTask {
    fn name(&self) -> &'static str {
        if self.fail { "always_fails" } else { "counting" }
    }

    fn interval(&self) -> Duration {
        Duration::hours(1)
    }

    async fn run(&self) -> Result<String> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(LinkaceError::scheduler("boom"))
        } else {
            Ok("done".to_string())
        }
    }
}

#[tokio::test]
async fn test_check_links_updates_status() {
    let env = setup().await;
    let (user, _) = create_user(&env.services, "alice").await;
    let scope = OwnerScope::User(user.id);

    let mut ids = Vec::new();
    for url in [
        "https://example.com",
        "https://gone.example.com",
        "https://old.example.com",
    ] {
        let created = env.services.links.create(user.id, link(url)).await.unwrap();
        ids.push(created.link.link.id);
    }

    let task = CheckLinksTask::new(env.services.storage.clone(), Arc::new(FakeProbe), 10);
    let summary = task.run().await.unwrap();
    assert_eq!(summary, "checked 3 links (1 moved, 1 broken)");

    let statuses: Vec<LinkStatus> = {
        let mut out = Vec::new();
        for id in &ids {
            let details = env.services.links.show(scope, *id).await.unwrap();
            assert!(details.link.last_checked_at.is_some());
            out.push(details.link.status);
        }
        out
    };
    assert_eq!(
        statuses,
        vec![LinkStatus::Ok, LinkStatus::Broken, LinkStatus::Moved]
    );
}

#[tokio::test]
async fn test_check_links_respects_batch_size() {
    let env = setup().await;
    let (user, _) = create_user(&env.services, "alice").await;
    for url in ["https://a.example.com", "https://b.example.com"] {
        env.services.links.create(user.id, link(url)).await.unwrap();
    }

    let task = CheckLinksTask::new(env.services.storage.clone(), Arc::new(FakeProbe), 1);
    assert!(task.run().await.unwrap().starts_with("checked 1 links"));
    // 第二轮先取从未检查过的链接
    assert!(task.run().await.unwrap().starts_with("checked 1 links"));

    let due = env.services.storage.links_due_for_check(10).await.unwrap();
    assert!(due.iter().all(|l| l.last_checked_at.is_some()));
}

#[tokio::test]
async fn test_runner_skips_tasks_that_are_not_due() {
    let env = setup().await;
    let runs = Arc::new(AtomicUsize::new(0));
    let runner = TaskRunner::new(
        env.services.settings.clone(),
        vec![Box::new(CountingTask {
            runs: runs.clone(),
            fail: false,
        })],
    );

    let now = Utc::now();
    let report = runner.run_due(now).await.unwrap();
    assert_eq!(report.ran(), 1);

    let report = runner.run_due(now + Duration::minutes(10)).await.unwrap();
    assert_eq!(report.tasks[0].1, TaskOutcome::Skipped);
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    let report = runner.run_due(now + Duration::minutes(61)).await.unwrap();
    assert_eq!(report.ran(), 1);
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_task_is_retried() {
    let env = setup().await;
    let runs = Arc::new(AtomicUsize::new(0));
    let runner = TaskRunner::new(
        env.services.settings.clone(),
        vec![
            Box::new(CountingTask {
                runs: runs.clone(),
                fail: true,
            }),
            Box::new(CountingTask {
                runs: runs.clone(),
                fail: false,
            }),
        ],
    );

    let now = Utc::now();
    let report = runner.run_due(now).await.unwrap();
    assert_eq!(report.failed(), 1);
    assert_eq!(report.ran(), 1);
    assert!(
        env.services
            .settings
            .last_run("always_fails")
            .await
            .unwrap()
            .is_none()
    );

    // 失败的任务下次仍然到期
    let report = runner.run_due(now + Duration::minutes(1)).await.unwrap();
    assert!(matches!(report.tasks[0].1, TaskOutcome::Failed(_)));
    assert_eq!(report.tasks[1].1, TaskOutcome::Skipped);
    assert_eq!(runs.load(Ordering::SeqCst), 3);
}
