//! Functional tests for end-to-end dataver workflows

use crate::common::{assertions, sample_data, CliTestRunner};
use dataver::compare::Direction;
use dataver::rollback::RollbackManager;
use dataver::VersionId;
use std::fs;

#[test]
fn test_basic_workflow() {
    let runner = CliTestRunner::new_empty().unwrap();

    // 1. Initialize workspace
    runner.expect_success(&["init"]);
    assertions::assert_dir_exists(&runner.fixture().root().join("data").join("versions"));

    // 2. Version the first dataset
    runner.create_version("sales.csv", &sample_data::simple_csv_data());
    runner.expect_success(&["list"]);
    runner.expect_success(&["info", "v1"]);

    // 3. Version an update
    runner.create_version("sales_update.csv", &sample_data::updated_csv_data());

    // 4. Compare and save the report
    let report_path = runner.fixture().root().join("reports").join("v1_v2.json");
    runner.expect_success(&[
        "compare",
        "v1",
        "v2",
        "--output",
        report_path.to_str().unwrap(),
    ]);
    assertions::assert_file_exists_and_not_empty(&report_path);

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["row_count_comparison"]["difference"], 2);
    assert_eq!(report["row_count_comparison"]["direction"], "increase");

    // 5. Roll back and verify the pointer moved
    runner.expect_success(&["rollback", "v1", "--force"]);
    assert_eq!(runner.fixture().current_version(), Some(VersionId::FIRST));
    runner.expect_success(&["history"]);

    // Both version directories survive the rollback
    runner.fixture().assert_version_exists(1);
    runner.fixture().assert_version_exists(2);
}

#[test]
fn test_create_after_rollback_continues_numbering() {
    let runner = CliTestRunner::new().unwrap();
    for name in ["a.csv", "b.csv", "c.csv"] {
        runner.create_version(name, &sample_data::simple_csv_data());
    }

    runner.expect_success(&["rollback", "v1", "--force"]);
    runner.create_version("d.csv", &sample_data::updated_csv_data());

    let fixture = runner.fixture();
    fixture.assert_version_exists(4);
    assert_eq!(fixture.current_version(), Some(VersionId::new(4)));

    let indexed: Vec<VersionId> = fixture
        .store()
        .version_history()
        .unwrap()
        .iter()
        .map(|entry| entry.version)
        .collect();
    assert_eq!(indexed, (1..=4).map(VersionId::new).collect::<Vec<_>>());
}

#[test]
fn test_schema_evolution_workflow() {
    let runner = CliTestRunner::new().unwrap();
    runner.create_version("products.csv", &sample_data::simple_csv_data());
    runner.create_version("products_v2.csv", &sample_data::schema_changed_csv_data());
    runner.create_version("products_v3.csv", &sample_data::simple_csv_data());

    let store = runner.fixture().store();
    let comparator = dataver::VersionComparator::new(&store, runner.fixture().config().comparison);

    let forward = comparator.compare(VersionId::new(1), VersionId::new(2)).unwrap();
    let columns = forward.column_comparison.unwrap();
    assert_eq!(columns.removed_columns, vec!["price"]);

    let back = comparator.compare(VersionId::new(2), VersionId::new(3)).unwrap();
    let columns = back.column_comparison.unwrap();
    assert_eq!(columns.added_columns, vec!["price"]);
    assert_eq!(columns.removed_columns, vec!["category", "in_stock"]);

    let round_trip = comparator.compare(VersionId::new(1), VersionId::new(3)).unwrap();
    assert_eq!(round_trip.summary.total_differences, 0);
    assert_eq!(
        round_trip.row_count_comparison.unwrap().direction,
        Direction::NoChange
    );
}

#[test]
fn test_rollback_back_and_forth() {
    let runner = CliTestRunner::new().unwrap();
    runner.create_version("a.csv", &sample_data::simple_csv_data());
    runner.create_version("b.csv", &sample_data::updated_csv_data());
    runner.create_version("c.csv", &sample_data::schema_changed_csv_data());

    runner.expect_success(&["rollback", "v1", "--force"]);
    runner.expect_success(&["rollback", "v3", "--force"]);
    runner.expect_success(&["rollback", "v2", "--force"]);

    let fixture = runner.fixture();
    assert_eq!(fixture.current_version(), Some(VersionId::new(2)));

    let store = fixture.store();
    let manager = RollbackManager::new(&store, fixture.config().version_management);
    let moves: Vec<(Option<VersionId>, VersionId)> = manager
        .get_rollback_history()
        .iter()
        .map(|r| (r.from_version, r.to_version))
        .collect();
    assert_eq!(
        moves,
        vec![
            (Some(VersionId::new(3)), VersionId::new(1)),
            (Some(VersionId::new(1)), VersionId::new(3)),
            (Some(VersionId::new(3)), VersionId::new(2)),
        ]
    );

    // v3 was left twice, so it carries two backup notes
    let backups = store.get_version_metadata(VersionId::new(3)).unwrap().backups;
    assert_eq!(backups.len(), 2);
    assert!(backups.iter().all(|b| b.backed_up_version == VersionId::new(3)));
}

#[test]
fn test_large_dataset_workflow() {
    let runner = CliTestRunner::new().unwrap();
    let small = runner.fixture().create_large_csv("small.csv", 1_000, 8).unwrap();
    let large = runner.fixture().create_large_csv("large.csv", 5_000, 8).unwrap();

    runner.expect_success(&["create", small.to_str().unwrap()]);
    runner.expect_success(&["create", large.to_str().unwrap()]);

    let store = runner.fixture().store();
    let metadata = store.get_version_metadata(VersionId::new(2)).unwrap();
    assert_eq!(metadata.row_count, Some(5_000));
    assert_eq!(metadata.column_count, Some(8));

    let report = dataver::VersionComparator::new(&store, runner.fixture().config().comparison)
        .compare(VersionId::new(1), VersionId::new(2))
        .unwrap();
    let rows = report.row_count_comparison.unwrap();
    assert_eq!(rows.difference, 4_000);
    assert_eq!(rows.percentage_change, 400.0);
    assert_eq!(report.summary.key_changes, vec!["Row count changed by 4000 (400.0%)"]);

    let stats = store.stats().unwrap();
    assert_eq!(stats.version_count, 2);
    assert!(stats.total_bytes > fs::metadata(&large).unwrap().len());
}
