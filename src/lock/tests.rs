//! Tests for sweep marker acquisition and release

use super::*;
use crate::config::SweepConfig;
use filetime::FileTime;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

const HOUR: Duration = Duration::from_secs(60 * 60);

fn backdate(path: &std::path::Path, age: Duration) {
    let mtime = FileTime::from_system_time(SystemTime::now() - age);
    filetime::set_file_mtime(path, mtime).unwrap();
}

#[tokio::test]
async fn test_acquire_creates_marker() {
    let temp_dir = TempDir::new().unwrap();
    let config = SweepConfig::default();

    let acquisition = acquire_marker(temp_dir.path(), &config).await.unwrap();
    assert_eq!(acquisition.state(), Some(LockState::Granted));

    let marker = marker_path(temp_dir.path(), &config);
    assert!(marker.exists());

    let info = read_marker_info(temp_dir.path(), &config).await.unwrap().unwrap();
    assert_eq!(info.process_id, std::process::id());
}

#[tokio::test]
async fn test_acquire_denied_while_marker_fresh() {
    let temp_dir = TempDir::new().unwrap();
    let config = SweepConfig::default();

    let _held = acquire_marker(temp_dir.path(), &config)
        .await
        .unwrap()
        .into_lock()
        .unwrap();

    match acquire_marker(temp_dir.path(), &config).await.unwrap() {
        LockAcquisition::Denied { age, holder } => {
            assert!(age < HOUR);
            assert_eq!(holder.unwrap().process_id, std::process::id());
        }
        other => panic!("expected denial, got {:?}", other),
    }
}

#[tokio::test]
async fn test_acquire_denied_for_foreign_empty_marker() {
    let temp_dir = TempDir::new().unwrap();
    let config = SweepConfig::default();
    let marker = marker_path(temp_dir.path(), &config);
    std::fs::write(&marker, "").unwrap();

    let acquisition = acquire_marker(temp_dir.path(), &config).await.unwrap();
    match acquisition {
        LockAcquisition::Denied { holder, .. } => assert!(holder.is_none()),
        other => panic!("expected denial, got {:?}", other),
    }

    // A denied attempt never removes someone else's marker
    assert!(marker.exists());
}

#[tokio::test]
async fn test_stale_marker_is_reclaimed() {
    let temp_dir = TempDir::new().unwrap();
    let config = SweepConfig::default();
    let marker = marker_path(temp_dir.path(), &config);
    std::fs::write(&marker, "").unwrap();
    backdate(&marker, 25 * HOUR);

    let acquisition = acquire_marker(temp_dir.path(), &config).await.unwrap();
    assert_eq!(acquisition.state(), Some(LockState::Reclaimed));

    // The replacement marker is fresh and carries our metadata
    let info = read_marker_info(temp_dir.path(), &config).await.unwrap();
    assert!(info.is_some());
    let age = SystemTime::now()
        .duration_since(std::fs::metadata(&marker).unwrap().modified().unwrap())
        .unwrap_or_default();
    assert!(age < HOUR);
}

#[tokio::test]
async fn test_marker_at_threshold_is_stale() {
    let temp_dir = TempDir::new().unwrap();
    let config = SweepConfig::default().with_retention(HOUR);
    let marker = marker_path(temp_dir.path(), &config);
    std::fs::write(&marker, "").unwrap();
    backdate(&marker, HOUR);

    let acquisition = acquire_marker(temp_dir.path(), &config).await.unwrap();
    assert_eq!(acquisition.state(), Some(LockState::Reclaimed));
}

#[tokio::test]
async fn test_future_marker_counts_as_fresh() {
    let temp_dir = TempDir::new().unwrap();
    let config = SweepConfig::default();
    let marker = marker_path(temp_dir.path(), &config);
    std::fs::write(&marker, "").unwrap();
    let future = FileTime::from_system_time(SystemTime::now() + HOUR);
    filetime::set_file_mtime(&marker, future).unwrap();

    match acquire_marker(temp_dir.path(), &config).await.unwrap() {
        LockAcquisition::Denied { age, .. } => assert_eq!(age, Duration::ZERO),
        other => panic!("expected denial, got {:?}", other),
    }
}

#[tokio::test]
async fn test_release_removes_marker() {
    let temp_dir = TempDir::new().unwrap();
    let config = SweepConfig::default();

    let lock = acquire_marker(temp_dir.path(), &config)
        .await
        .unwrap()
        .into_lock()
        .unwrap();
    let marker = lock.path().to_path_buf();

    lock.release().await.unwrap();
    assert!(!marker.exists());

    // Root can be claimed again straight away
    let again = acquire_marker(temp_dir.path(), &config).await.unwrap();
    assert_eq!(again.state(), Some(LockState::Granted));
}

#[tokio::test]
async fn test_drop_removes_marker() {
    let temp_dir = TempDir::new().unwrap();
    let config = SweepConfig::default();
    let marker = marker_path(temp_dir.path(), &config);

    {
        let _lock = acquire_marker(temp_dir.path(), &config).await.unwrap();
        assert!(marker.exists());
    }

    assert!(!marker.exists());
}

#[tokio::test]
async fn test_release_reports_missing_marker() {
    let temp_dir = TempDir::new().unwrap();
    let config = SweepConfig::default();

    let lock = acquire_marker(temp_dir.path(), &config)
        .await
        .unwrap()
        .into_lock()
        .unwrap();
    std::fs::remove_file(lock.path()).unwrap();

    let err = lock.release().await.unwrap_err();
    assert!(matches!(err, crate::SweepError::LockRelease { .. }));
}

#[tokio::test]
async fn test_create_failure_is_lock_create_error() {
    let temp_dir = TempDir::new().unwrap();
    let config = SweepConfig::default();
    let missing_root = temp_dir.path().join("gone");

    let err = acquire_marker(&missing_root, &config).await.unwrap_err();
    assert!(matches!(err, crate::SweepError::LockCreate { .. }));
}

#[tokio::test]
async fn test_unremovable_stale_marker_is_lock_reclaim_error() {
    let temp_dir = TempDir::new().unwrap();
    let config = SweepConfig::default();
    let marker = marker_path(temp_dir.path(), &config);
    std::fs::create_dir(&marker).unwrap();
    std::fs::write(marker.join("contents"), "").unwrap();
    backdate(&marker, 25 * HOUR);

    let err = acquire_marker(temp_dir.path(), &config).await.unwrap_err();

    assert!(matches!(err, crate::SweepError::LockReclaim { .. }));
    assert_eq!(err.path(), Some(&marker));
    assert!(marker.is_dir());
}

#[cfg(unix)]
#[tokio::test]
async fn test_unreadable_marker_is_lock_check_error() {
    let temp_dir = TempDir::new().unwrap();
    let config = SweepConfig::default();
    let marker = marker_path(temp_dir.path(), &config);
    // Points at itself, so it exists but cannot be stat'ed
    std::os::unix::fs::symlink(&config.marker_name, &marker).unwrap();

    let err = acquire_marker(temp_dir.path(), &config).await.unwrap_err();

    assert!(matches!(err, crate::SweepError::LockCheck { .. }));
    assert!(err.is_lock_error());
    assert!(std::fs::symlink_metadata(&marker).is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_acquisitions_grant_exactly_one() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let root = root.clone();
            tokio::spawn(async move { acquire_marker(&root, &SweepConfig::default()).await })
        })
        .collect();

    // Keep every acquisition alive until all attempts have finished
    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap().unwrap());
    }

    let granted = results.iter().filter(|a| !a.is_denied()).count();
    assert_eq!(granted, 1);
}

#[test]
fn test_marker_info_display_and_parse() {
    let info = MarkerInfo::current();
    let json = info.to_json().unwrap();

    assert_eq!(MarkerInfo::parse(&json), Some(info.clone()));
    assert!(MarkerInfo::parse("not json").is_none());
    assert!(info.to_string().starts_with(&format!("PID {}", std::process::id())));
}
