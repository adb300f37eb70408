//! End-to-end runs against a stand-in build tool script

use ntask_builder::*;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::tempdir;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

// Writing an executable while another test forks can fail with ETXTBSY.
static SPAWN_LOCK: Mutex<()> = Mutex::const_new(());

/// Write a fake build tool that records its log file and ends with `tail`
fn fake_nant(dir: &Path, tail: &str) -> PathBuf {
    let script = dir.join("fake-nant");
    let body = format!(
        "#!/bin/sh\n\
         for arg in \"$@\"; do\n\
           case \"$arg\" in -logfile:*) log=\"${{arg#-logfile:}}\";; esac\n\
         done\n\
         echo \"<buildresults args=\\\"$#\\\"/>\" > \"$log\"\n\
         echo \"building in $(pwd)\"\n\
         {tail}\n"
    );
    std::fs::write(&script, body).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

fn integration(root: &Path) -> IntegrationResult {
    let work = root.join("work");
    let artifacts = root.join("artifacts");
    std::fs::create_dir_all(&work).unwrap();
    std::fs::create_dir_all(&artifacts).unwrap();
    IntegrationResult::new("widgets", work, artifacts)
}

#[tokio::test]
async fn test_real_build_success() {
    let _guard = SPAWN_LOCK.lock().await;
    let temp = tempdir().unwrap();
    let script = fake_nant(temp.path(), "exit 0");
    let mut ctx = integration(temp.path());
    let task = NAntTask::new(
        TaskConfig::default()
            .with_executable(script.display().to_string())
            .with_targets(["compile"]),
    );

    let outcome = task
        .run(&mut ctx, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome, TaskOutcome::Success);
    let results = ctx.task_results();
    assert_eq!(results.len(), 2);
    match &results[0] {
        TaskResultFragment::File(file) => assert!(file.contents.starts_with("<buildresults")),
        TaskResultFragment::Process(_) => panic!("expected the log file first"),
    }
    match &results[1] {
        TaskResultFragment::Process(process) => {
            assert!(process.outcome.stdout.contains("building in"));
            assert_eq!(process.outcome.exit_code, Some(0));
        }
        TaskResultFragment::File(_) => panic!("expected process output last"),
    }
}

#[tokio::test]
async fn test_real_build_failure() {
    let _guard = SPAWN_LOCK.lock().await;
    let temp = tempdir().unwrap();
    let script = fake_nant(temp.path(), "echo 'BUILD FAILED' 1>&2; exit 1");
    let mut ctx = integration(temp.path());
    let task = NAntTask::new(TaskConfig::default().with_executable(script.display().to_string()));

    let ok = task.execute(&mut ctx).await.unwrap();

    assert!(!ok);
    match ctx.task_results().last().unwrap() {
        TaskResultFragment::Process(process) => {
            assert_eq!(process.outcome.exit_code, Some(1));
            assert!(process.data().ends_with("BUILD FAILED"));
        }
        TaskResultFragment::File(_) => panic!("expected process output last"),
    }
}

#[tokio::test]
async fn test_real_build_timeout() {
    let _guard = SPAWN_LOCK.lock().await;
    let temp = tempdir().unwrap();
    let script = fake_nant(temp.path(), "sleep 30");
    let mut ctx = integration(temp.path());
    let task = NAntTask::new(
        TaskConfig::default()
            .with_executable(script.display().to_string())
            .with_timeout(1),
    );

    let outcome = task
        .run(&mut ctx, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome, TaskOutcome::FatalTimeout { timeout_seconds: 1 });
    // the log was written before the hang, so it is still attached
    assert_eq!(ctx.task_results().len(), 2);
}
