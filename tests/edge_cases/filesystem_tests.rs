//! Edge case tests for on-disk state

use crate::common::{sample_data, CliTestRunner, TestFixture};
use dataver::VersionId;
use std::fs;

#[test]
fn test_versions_listed_in_numeric_order() {
    let fixture = TestFixture::new().unwrap();
    let store = fixture.store();
    for n in [10, 2, 9, 1] {
        fs::create_dir_all(store.version_dir(VersionId::new(n))).unwrap();
    }

    let versions: Vec<String> = store
        .get_all_versions()
        .unwrap()
        .iter()
        .map(|v| v.to_string())
        .collect();
    assert_eq!(versions, vec!["v1", "v2", "v9", "v10"]);
}

#[test]
fn test_foreign_entries_are_ignored() {
    let fixture = TestFixture::new().unwrap();
    let store = fixture.store();
    let versions_dir = store.storage().versions_dir.clone();
    fs::create_dir_all(versions_dir.join(".staging-1234")).unwrap();
    fs::create_dir_all(versions_dir.join("archive")).unwrap();
    fs::create_dir_all(versions_dir.join("v2a")).unwrap();
    fs::write(versions_dir.join("v3"), "file, not directory").unwrap();
    fs::write(versions_dir.join("README"), "notes").unwrap();

    assert!(store.get_all_versions().unwrap().is_empty());
}

#[test]
fn test_next_version_follows_highest_directory() {
    let runner = CliTestRunner::new().unwrap();
    let versions_dir = runner.fixture().store().storage().versions_dir.clone();
    fs::create_dir_all(versions_dir.join("v5")).unwrap();

    runner.create_version("data.csv", &sample_data::simple_csv_data());

    runner.fixture().assert_version_exists(6);
    assert_eq!(runner.fixture().current_version(), Some(VersionId::new(6)));
}

#[test]
fn test_missing_store_state_reads_empty() {
    let runner = CliTestRunner::new_empty().unwrap();

    runner.expect_success(&["list"]);
    runner.expect_success(&["history"]);

    let store = runner.fixture().store();
    assert!(store.get_all_versions().unwrap().is_empty());
    assert_eq!(store.get_current_version().unwrap(), None);
    assert!(store.version_history().unwrap().is_empty());
}

#[test]
fn test_empty_marker_means_no_current_version() {
    let fixture = TestFixture::new().unwrap();
    let store = fixture.store();
    fs::write(&store.storage().current_version_file, "  \n").unwrap();

    assert_eq!(store.get_current_version().unwrap(), None);
}

#[test]
fn test_marker_is_trimmed() {
    let fixture = TestFixture::new().unwrap();
    let store = fixture.store();
    fs::write(&store.storage().current_version_file, "v3\n").unwrap();

    assert_eq!(store.get_current_version().unwrap(), Some(VersionId::new(3)));
}

#[test]
fn test_corrupted_metadata_is_parse_error() {
    let runner = CliTestRunner::new().unwrap();
    runner.create_version("data.csv", &sample_data::simple_csv_data());
    fs::write(runner.fixture().version_dir(1).join("metadata.json"), "{ broken").unwrap();

    let error = runner.expect_failure(&["info", "v1"]);
    assert!(matches!(error, dataver::DataverError::Json(_)));
}

#[test]
fn test_list_survives_corrupted_metadata() {
    let runner = CliTestRunner::new().unwrap();
    runner.create_version("a.csv", &sample_data::simple_csv_data());
    runner.create_version("b.csv", &sample_data::updated_csv_data());
    fs::write(runner.fixture().version_dir(1).join("metadata.json"), "{ broken").unwrap();

    runner.expect_success(&["list"]);
    runner.expect_success(&["list", "--format", "json"]);
}

#[test]
fn test_corrupted_index_blocks_create_without_side_effects() {
    let runner = CliTestRunner::new().unwrap();
    runner.create_version("data.csv", &sample_data::simple_csv_data());
    let store = runner.fixture().store();
    fs::write(&store.storage().index_file, "not json").unwrap();

    let input = runner
        .fixture()
        .create_csv("next.csv", &sample_data::simple_csv_data())
        .unwrap();
    runner.expect_failure(&["create", input.to_str().unwrap()]);

    assert_eq!(store.get_all_versions().unwrap(), vec![VersionId::FIRST]);
    assert_eq!(store.get_current_version().unwrap(), Some(VersionId::FIRST));
    let leftovers: Vec<_> = fs::read_dir(&store.storage().versions_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with(".staging-"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_compare_with_missing_dataset_fails() {
    let runner = CliTestRunner::new().unwrap();
    runner.create_version("a.csv", &sample_data::simple_csv_data());
    runner.create_version("b.csv", &sample_data::simple_csv_data());
    fs::remove_file(runner.fixture().version_dir(2).join("b.csv")).unwrap();

    let error = runner.expect_failure(&["compare", "v1", "v2"]);
    assert!(error.is_not_found());
}

#[test]
fn test_workspace_flag_targets_other_directory() {
    let runner = CliTestRunner::new().unwrap();
    let other = TestFixture::new().unwrap();
    let input = other
        .create_csv("data.csv", &sample_data::simple_csv_data())
        .unwrap();

    runner.expect_success(&[
        "create",
        input.to_str().unwrap(),
        "--workspace",
        other.root().to_str().unwrap(),
    ]);

    other.assert_version_exists(1);
    runner.fixture().assert_version_not_exists(1);
}
