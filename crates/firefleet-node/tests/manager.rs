//! Node manager integration tests against stub hypervisor executables.
//!
//! Each test writes a small shell script standing in for the hypervisor
//! CLI. The script appends its argv to a log file so tests can assert
//! exactly which invocations were issued.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use firefleet_core::{NodeKind, NodeSpec};
use firefleet_node::{HypervisorCli, NodeError, NodeManager};

fn stub(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("hypervisor-stub");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

fn manager_for(stub_path: &Path) -> NodeManager {
    NodeManager::new(HypervisorCli::new(stub_path.to_str().unwrap(), false))
}

fn worker_spec(cluster: &str, count: u32) -> NodeSpec {
    NodeSpec {
        cluster: cluster.to_string(),
        image: "img".to_string(),
        kernel_image: "kern".to_string(),
        kernel_args: String::new(),
        count,
        cpus: 2,
        memory: "2GB".to_string(),
        disk_size: "10GB".to_string(),
    }
}

fn logged_lines(log: &Path) -> Vec<String> {
    fs::read_to_string(log)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn create_is_best_effort_and_names_every_ordinal() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("invocations.log");
    let stub_path = stub(
        dir.path(),
        &format!(
            r#"echo "$@" >> "{}"
case "$*" in *c1-worker-2*) exit 1 ;; esac
exit 0"#,
            log.display()
        ),
    );

    let manager = manager_for(&stub_path);
    // One replica fails; the bulk call still succeeds.
    manager
        .create_nodes(NodeKind::Worker, &worker_spec("c1", 3))
        .await
        .unwrap();

    let lines = logged_lines(&log);
    assert_eq!(lines.len(), 3);
    for ordinal in 1..=3 {
        let name = format!("--name=c1-worker-{ordinal}");
        assert_eq!(
            lines.iter().filter(|l| l.contains(&name)).count(),
            1,
            "expected exactly one invocation for {name}"
        );
    }
}

#[tokio::test]
async fn create_with_single_permit_still_creates_all() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("invocations.log");
    let stub_path = stub(
        dir.path(),
        &format!(r#"echo "$@" >> "{}""#, log.display()),
    );

    let manager = manager_for(&stub_path).with_create_permits(1);
    manager
        .create_nodes(NodeKind::Worker, &worker_spec("c1", 4))
        .await
        .unwrap();

    assert_eq!(logged_lines(&log).len(), 4);
}

#[tokio::test]
async fn delete_is_sequential_and_fail_fast() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("invocations.log");
    let stub_path = stub(
        dir.path(),
        &format!(
            r#"echo "$@" >> "{}"
case "$*" in *c1-worker-2*) exit 1 ;; esac
exit 0"#,
            log.display()
        ),
    );

    let manager = manager_for(&stub_path);
    let err = manager
        .delete_nodes(NodeKind::Worker, &worker_spec("c1", 3))
        .await
        .unwrap_err();
    assert!(matches!(err, NodeError::Process { .. }));

    // Ordinal 3 must never have been attempted.
    let lines = logged_lines(&log);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("c1-worker-1"));
    assert!(lines[1].contains("c1-worker-2"));
}

#[tokio::test]
async fn get_missing_node_skips_field_fetches() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("invocations.log");
    let stub_path = stub(
        dir.path(),
        &format!(
            r#"echo "$@" >> "{}"
exit 1"#,
            log.display()
        ),
    );

    let manager = manager_for(&stub_path);
    let err = manager.get_node("ghost-worker-1").await.unwrap_err();
    assert!(matches!(err, NodeError::NotFound(name) if name == "ghost-worker-1"));

    // Only the presence check ran.
    assert_eq!(logged_lines(&log).len(), 1);
}

#[tokio::test]
async fn get_populates_every_tracked_field() {
    let dir = TempDir::new().unwrap();
    let stub_path = stub(
        dir.path(),
        r#"case "$*" in
  *"{{.Spec.CPUs}}"*) echo 2 ;;
  *"{{.Spec.Memory}}"*) echo 2GB ;;
  *"{{.Spec.DiskSize}}"*) echo 10GB ;;
  *"{{.Status.Running}}"*) echo true ;;
  *) exit 0 ;;
esac"#,
    );

    let manager = manager_for(&stub_path);
    let record = manager.get_node("c1-worker-1").await.unwrap();
    assert_eq!(record.name, "c1-worker-1");
    assert_eq!(record.cpus, 2);
    assert_eq!(record.memory, "2GB");
    assert_eq!(record.disk_size, "10GB");
    assert!(record.status.running);
}

#[tokio::test]
async fn get_tolerates_unparsable_field_values() {
    let dir = TempDir::new().unwrap();
    let stub_path = stub(
        dir.path(),
        r#"case "$*" in
  *"{{.Spec.CPUs}}"*) echo plenty ;;
  *"{{.Spec.Memory}}"*) echo 2GB ;;
  *"{{.Spec.DiskSize}}"*) echo 10GB ;;
  *"{{.Status.Running}}"*) echo maybe ;;
  *) exit 0 ;;
esac"#,
    );

    let manager = manager_for(&stub_path);
    let record = manager.get_node("c1-worker-1").await.unwrap();
    assert_eq!(record.cpus, 0);
    assert!(!record.status.running);
    assert_eq!(record.memory, "2GB");
}

#[tokio::test]
async fn get_propagates_field_fetch_failures() {
    let dir = TempDir::new().unwrap();
    let stub_path = stub(
        dir.path(),
        r#"case "$*" in
  *"{{.Spec.CPUs}}"*) echo "query failed" >&2; exit 1 ;;
  *) exit 0 ;;
esac"#,
    );

    let manager = manager_for(&stub_path);
    let err = manager.get_node("c1-worker-1").await.unwrap_err();
    match err {
        NodeError::Process { stderr, .. } => assert_eq!(stderr.trim(), "query failed"),
        other => panic!("expected Process error, got {other}"),
    }
}

#[tokio::test]
async fn list_returns_full_records_and_honors_filter() {
    let dir = TempDir::new().unwrap();
    let stub_path = stub(
        dir.path(),
        r#"case "$*" in
  *"{{.Spec.CPUs}}"*) echo 2 ;;
  *"{{.Spec.Memory}}"*) echo 2GB ;;
  *"{{.Spec.DiskSize}}"*) echo 10GB ;;
  *"{{.Status.Running}}"*) echo true ;;
  *"=~web"*) printf '%s\n' web-worker-1 web-worker-2 ;;
  *"-t {{.ObjectMeta.Name}}"*) printf '%s\n' web-worker-1 web-worker-2 db-master-1 ;;
  *) exit 0 ;;
esac"#,
    );

    let manager = manager_for(&stub_path);

    let all = manager.list_nodes("").await.unwrap();
    let names: Vec<_> = all.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["web-worker-1", "web-worker-2", "db-master-1"]);
    assert!(all.iter().all(|r| r.status.running && r.cpus == 2));

    let filtered = manager.list_nodes("web").await.unwrap();
    let names: Vec<_> = filtered.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["web-worker-1", "web-worker-2"]);
}

#[tokio::test]
async fn list_of_empty_fleet_is_empty() {
    let dir = TempDir::new().unwrap();
    let stub_path = stub(dir.path(), "exit 0");

    let manager = manager_for(&stub_path);
    assert!(manager.list_nodes("").await.unwrap().is_empty());
}
