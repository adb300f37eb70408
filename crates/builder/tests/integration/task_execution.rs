//! Orchestration tests with a scripted process runner

use super::support::ScriptedRunner;
use ntask_builder::*;
use ntask_errors::{BuildError, Error, UserFacingError};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use tokio_util::sync::CancellationToken;

fn integration(root: &std::path::Path) -> IntegrationResult {
    let work = root.join("work");
    let artifacts = root.join("artifacts");
    std::fs::create_dir_all(&work).unwrap();
    std::fs::create_dir_all(&artifacts).unwrap();
    IntegrationResult::new("widgets", work, artifacts).with_label("12")
}

fn task(config: TaskConfig, runner: &Arc<ScriptedRunner>) -> NAntTask {
    NAntTask::with_runner(config, runner.clone())
}

#[tokio::test]
async fn test_successful_build() {
    let temp = tempdir().unwrap();
    let mut ctx = integration(temp.path());
    let runner = Arc::new(ScriptedRunner::exiting(0));

    let outcome = task(TaskConfig::default(), &runner)
        .run(&mut ctx, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome, TaskOutcome::Success);
    assert_eq!(ctx.task_results().len(), 1);
    assert!(matches!(
        ctx.task_results()[0],
        TaskResultFragment::Process(_)
    ));
}

#[tokio::test]
async fn test_failed_build_is_not_an_error() {
    let temp = tempdir().unwrap();
    let mut ctx = integration(temp.path());
    let runner = Arc::new(ScriptedRunner::exiting(1));

    let ok = task(TaskConfig::default(), &runner)
        .execute(&mut ctx)
        .await
        .unwrap();

    assert!(!ok);
    match &ctx.task_results()[0] {
        TaskResultFragment::Process(process) => {
            assert_eq!(process.outcome.exit_code, Some(1));
            assert!(!process.succeeded());
        }
        TaskResultFragment::File(_) => panic!("expected a process fragment"),
    }
}

#[tokio::test]
async fn test_timeout_is_fatal() {
    let temp = tempdir().unwrap();
    let mut ctx = integration(temp.path());
    let runner = Arc::new(ScriptedRunner::timing_out());
    let config = TaskConfig::default().with_timeout(5);

    let outcome = task(config.clone(), &runner)
        .run(&mut ctx, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(outcome, TaskOutcome::FatalTimeout { timeout_seconds: 5 });
    // output captured before the kill is still reported
    assert!(matches!(
        &ctx.task_results()[0],
        TaskResultFragment::Process(p) if p.outcome.stdout == "partial output"
    ));

    let mut ctx = integration(temp.path());
    let err = task(config, &runner).execute(&mut ctx).await.unwrap_err();
    assert!(matches!(err, Error::Build(BuildError::Timeout { seconds: 5 })));
    assert_eq!(
        err.user_message(),
        "NAnt process timed out (after 5 seconds)"
    );
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_timeout_configuration_reaches_runner() {
    let temp = tempdir().unwrap();
    let runner = Arc::new(ScriptedRunner::exiting(0));

    let mut ctx = integration(temp.path());
    task(TaskConfig::default().with_timeout(90), &runner)
        .execute(&mut ctx)
        .await
        .unwrap();
    let mut ctx = integration(temp.path());
    task(TaskConfig::default().with_timeout(0), &runner)
        .execute(&mut ctx)
        .await
        .unwrap();

    let calls = runner.calls();
    assert_eq!(calls[0].timeout(), Some(Duration::from_secs(90)));
    assert_eq!(calls[1].timeout(), None);
}

#[tokio::test]
async fn test_log_file_is_attached_before_process_output() {
    let temp = tempdir().unwrap();
    let mut ctx = integration(temp.path());
    let log = output_file(&temp.path().join("artifacts"));
    let runner = Arc::new(ScriptedRunner::exiting(0).writing_log(log.clone(), "<buildresults/>"));

    task(TaskConfig::default(), &runner)
        .execute(&mut ctx)
        .await
        .unwrap();

    let results = ctx.task_results();
    assert_eq!(results.len(), 2);
    match &results[0] {
        TaskResultFragment::File(file) => {
            assert_eq!(file.path, log);
            assert_eq!(file.contents, "<buildresults/>");
        }
        TaskResultFragment::Process(_) => panic!("expected the log file first"),
    }
    assert!(matches!(results[1], TaskResultFragment::Process(_)));
}

#[tokio::test]
async fn test_log_file_is_attached_after_timeout() {
    let temp = tempdir().unwrap();
    let mut ctx = integration(temp.path());
    let log = output_file(&temp.path().join("artifacts"));
    let runner = Arc::new(ScriptedRunner::timing_out().writing_log(log, "<partial"));

    let outcome = task(TaskConfig::default(), &runner)
        .run(&mut ctx, &CancellationToken::new())
        .await
        .unwrap();

    assert!(outcome.is_fatal());
    assert_eq!(ctx.task_results().len(), 2);
}

#[tokio::test]
async fn test_invocation_uses_context() {
    let temp = tempdir().unwrap();
    let mut ctx = integration(temp.path());
    ctx.set_property("configuration", Some(PropertyValue::from("Release")));
    let runner = Arc::new(ScriptedRunner::exiting(0));
    let config = TaskConfig::default()
        .with_executable("/opt/nant/bin/nant")
        .with_base_directory("src")
        .with_build_file("widgets.build")
        .with_targets(["clean", "package"]);

    task(config, &runner).execute(&mut ctx).await.unwrap();

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    let info = &calls[0];
    assert_eq!(info.program(), "/opt/nant/bin/nant");
    assert_eq!(info.working_dir(), temp.path().join("work").join("src"));
    let args = info.arguments();
    assert!(args.starts_with("-nologo -buildfile:widgets.build -logger:NAnt.Core.XmlLogger"));
    assert!(args.contains("-D:CCNetLabel=12"));
    assert!(args.contains("-D:CCNetNumericLabel=12"));
    assert!(args.contains("-D:CCNetProject=widgets"));
    assert!(args.contains("-D:configuration=Release"));
    assert!(args.ends_with("clean package"));
}

#[tokio::test]
async fn test_progress_description_is_signalled() {
    let temp = tempdir().unwrap();
    let runner = Arc::new(ScriptedRunner::exiting(0));

    let mut ctx = integration(temp.path());
    task(
        TaskConfig::default()
            .with_build_file("a.build")
            .with_targets(["t1", "t2"]),
        &runner,
    )
    .execute(&mut ctx)
    .await
    .unwrap();
    assert_eq!(
        ctx.progress_messages(),
        ["Executing Nant :BuildFile: a.build Targets: t1, t2 ".to_string()]
    );

    let mut ctx = integration(temp.path());
    task(TaskConfig::default().with_description("Nightly build"), &runner)
        .execute(&mut ctx)
        .await
        .unwrap();
    assert_eq!(ctx.progress_messages(), ["Nightly build".to_string()]);
}

#[tokio::test]
async fn test_cancelled_run_attaches_nothing() {
    let temp = tempdir().unwrap();
    let mut ctx = integration(temp.path());
    let runner = Arc::new(ScriptedRunner::exiting(0));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = task(TaskConfig::default(), &runner)
        .run(&mut ctx, &cancel)
        .await;

    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(ctx.task_results().is_empty());
}

#[tokio::test]
async fn test_blank_executable_is_rejected_before_running() {
    let temp = tempdir().unwrap();
    let mut ctx = integration(temp.path());
    let runner = Arc::new(ScriptedRunner::exiting(0));

    let result = task(TaskConfig::default().with_executable("  "), &runner)
        .execute(&mut ctx)
        .await;

    assert!(matches!(result, Err(Error::Config(_))));
    assert!(runner.calls().is_empty());
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_unreadable_log_does_not_hide_timeout() {
    let temp = tempdir().unwrap();
    let mut ctx = integration(temp.path());
    let log = output_file(&temp.path().join("artifacts"));
    std::os::unix::fs::symlink("/proc/self/mem", &log).unwrap();
    let runner = Arc::new(ScriptedRunner::timing_out());
    let task = task(TaskConfig::default().with_timeout(5), &runner);

    let outcome = task
        .run(&mut ctx, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(outcome, TaskOutcome::FatalTimeout { timeout_seconds: 5 });
    assert_eq!(ctx.task_results().len(), 1);
    assert!(matches!(
        ctx.task_results()[0],
        TaskResultFragment::Process(_)
    ));

    let mut ctx = integration(temp.path());
    let err = task.execute(&mut ctx).await.unwrap_err();
    assert!(err.is_timeout());
}
