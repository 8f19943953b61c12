//! End-to-end incremental training scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use homeval::testing::{synthetic_records, write_csv};
use homeval::training::{IncrementalTrainer, RunOutcome, TrainConfig, TrainError};
use homeval::{ArtifactStore, HousingRecord, Ledger, StaticListing};

// =============================================================================
// Helpers
// =============================================================================

struct Setup {
    _dir: tempfile::TempDir,
    data_dir: PathBuf,
    state_dir: PathBuf,
}

fn setup() -> Setup {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let state_dir = dir.path().join("state");
    fs::create_dir_all(&data_dir).unwrap();
    Setup {
        _dir: dir,
        data_dir,
        state_dir,
    }
}

fn trainer(setup: &Setup) -> IncrementalTrainer {
    IncrementalTrainer::new(TrainConfig::new(&setup.data_dir, &setup.state_dir))
}

fn artifact_bytes(state_dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files: Vec<(String, Vec<u8>)> = fs::read_dir(state_dir)
        .unwrap()
        .map(|entry| {
            let entry = entry.unwrap();
            (
                entry.file_name().to_string_lossy().into_owned(),
                fs::read(entry.path()).unwrap(),
            )
        })
        .collect();
    files.sort_by(|a, b| a.0.cmp(&b.0));
    files
}

fn expect_trained(outcome: RunOutcome) -> homeval::TrainReport {
    match outcome {
        RunOutcome::Trained(report) => report,
        other => panic!("expected a trained outcome, got {other:?}"),
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn first_run_ingests_all_rows_and_fits() {
    let setup = setup();
    write_csv(
        &setup.data_dir.join("batch1.csv"),
        &synthetic_records(100, 1),
    )
    .unwrap();

    let report = expect_trained(trainer(&setup).run().unwrap());

    assert_eq!(report.ingested_files, vec!["batch1.csv"]);
    assert_eq!(report.n_rows_delta, 100);
    assert_eq!(report.n_rows_total, 100);
    assert_eq!(report.n_updates, 1);
    assert_eq!(report.skipped_files, 0);
    assert_eq!(report.skipped_rows, 0);

    // Noiseless linear data: near-perfect fit on the holdout.
    assert!(report.holdout);
    assert!(report.metrics.r2 > 0.999, "r2 = {}", report.metrics.r2);

    let store = ArtifactStore::open(&setup.state_dir).unwrap();
    assert!(store.load_pair().unwrap().is_some());
    assert_eq!(
        Ledger::load(&store.ledger_path()).names(),
        vec!["batch1.csv"]
    );
}

#[test]
fn second_run_sees_only_the_delta_and_trains_cumulatively() {
    let setup = setup();
    write_csv(
        &setup.data_dir.join("batch1.csv"),
        &synthetic_records(100, 1),
    )
    .unwrap();
    expect_trained(trainer(&setup).run().unwrap());

    write_csv(
        &setup.data_dir.join("batch2.csv"),
        &synthetic_records(50, 2),
    )
    .unwrap();
    let report = expect_trained(trainer(&setup).run().unwrap());

    assert_eq!(report.ingested_files, vec!["batch2.csv"]);
    assert_eq!(report.n_rows_delta, 50);
    assert_eq!(report.n_rows_total, 150);
    assert_eq!(report.n_updates, 2);
    assert!(report.metrics.r2 > 0.999);

    let store = ArtifactStore::open(&setup.state_dir).unwrap();
    assert_eq!(
        Ledger::load(&store.ledger_path()).names(),
        vec!["batch1.csv", "batch2.csv"]
    );
    assert_eq!(store.load_rows().unwrap().n_rows(), 150);
}

#[test]
fn rerun_without_new_files_is_byte_for_byte_idempotent() {
    let setup = setup();
    write_csv(
        &setup.data_dir.join("batch1.csv"),
        &synthetic_records(60, 5),
    )
    .unwrap();
    expect_trained(trainer(&setup).run().unwrap());

    let before = artifact_bytes(&setup.state_dir);

    match trainer(&setup).run().unwrap() {
        RunOutcome::NoNewData { skipped_files: 0 } => {}
        other => panic!("expected NoNewData, got {other:?}"),
    }

    assert_eq!(artifact_bytes(&setup.state_dir), before);
}

#[test]
fn scaler_is_fitted_once_and_never_refitted() {
    let setup = setup();
    write_csv(
        &setup.data_dir.join("batch1.csv"),
        &synthetic_records(80, 3),
    )
    .unwrap();
    expect_trained(trainer(&setup).run().unwrap());

    let store = ArtifactStore::open(&setup.state_dir).unwrap();
    let (_, _, scaler_before) = store.load_pair().unwrap().unwrap();

    let probe = [70_000.0, 6.0, 7.0, 4.0, 30_000.0];
    let scaled_before = scaler_before.transform_row(&probe);

    // Second batch from a shifted distribution: a refit would change the
    // scaler parameters.
    write_csv(
        &setup.data_dir.join("batch2.csv"),
        &synthetic_records(80, 99),
    )
    .unwrap();
    expect_trained(trainer(&setup).run().unwrap());

    let (_, _, scaler_after) = store.load_pair().unwrap().unwrap();
    assert_eq!(scaler_after.means(), scaler_before.means());
    assert_eq!(scaler_after.scales(), scaler_before.scales());
    assert_eq!(scaler_after.transform_row(&probe), scaled_before);
}

#[test]
fn bad_file_is_skipped_without_aborting_the_batch() {
    let setup = setup();
    write_csv(
        &setup.data_dir.join("batch1.csv"),
        &synthetic_records(40, 4),
    )
    .unwrap();
    fs::write(setup.data_dir.join("junk.csv"), "not,a,housing,file\n1,2,3,4\n").unwrap();

    let report = expect_trained(trainer(&setup).run().unwrap());
    assert_eq!(report.ingested_files, vec!["batch1.csv"]);
    assert_eq!(report.skipped_files, 1);

    // The rejected file is ledgered too: inputs are immutable, so it would
    // never succeed on retry.
    let store = ArtifactStore::open(&setup.state_dir).unwrap();
    assert_eq!(
        Ledger::load(&store.ledger_path()).names(),
        vec!["batch1.csv", "junk.csv"]
    );

    match trainer(&setup).run().unwrap() {
        RunOutcome::NoNewData { skipped_files: 0 } => {}
        other => panic!("expected a clean NoNewData, got {other:?}"),
    }
}

#[test]
fn delta_with_no_usable_rows_trains_nothing() {
    let setup = setup();
    fs::write(setup.data_dir.join("junk.csv"), "wrong,header\n1,2\n").unwrap();

    match trainer(&setup).run().unwrap() {
        RunOutcome::NoNewData { skipped_files: 1 } => {}
        other => panic!("expected NoNewData with one skip, got {other:?}"),
    }

    let store = ArtifactStore::open(&setup.state_dir).unwrap();
    assert!(store.load_pair().unwrap().is_none());
    assert_eq!(Ledger::load(&store.ledger_path()).names(), vec!["junk.csv"]);
}

#[test]
fn failed_fit_persists_nothing() {
    let setup = setup();

    // A batch of identical rows makes every scaled feature zero, which
    // leaves the normal equations singular.
    let constant: Vec<HousingRecord> = std::iter::repeat(synthetic_records(1, 8)[0])
        .take(50)
        .collect();
    write_csv(&setup.data_dir.join("batch1.csv"), &constant).unwrap();

    let err = trainer(&setup).run().unwrap_err();
    assert!(matches!(err, TrainError::Fit(_)), "got {err:?}");

    // No artifacts were written and the file was not ledgered, so a later
    // run (with fixed data) would pick it up again.
    let store = ArtifactStore::open(&setup.state_dir).unwrap();
    assert!(store.load_pair().unwrap().is_none());
    assert_eq!(store.load_rows().unwrap().n_rows(), 0);
    assert!(Ledger::load(&store.ledger_path()).is_empty());
}

#[test]
fn injected_listing_controls_discovery() {
    let setup = setup();
    write_csv(
        &setup.data_dir.join("batch1.csv"),
        &synthetic_records(30, 10),
    )
    .unwrap();
    write_csv(
        &setup.data_dir.join("batch2.csv"),
        &synthetic_records(30, 11),
    )
    .unwrap();

    let listing = StaticListing::new(["batch1.csv"]);
    let report = expect_trained(trainer(&setup).run_with_listing(&listing).unwrap());

    assert_eq!(report.ingested_files, vec!["batch1.csv"]);
    assert_eq!(report.n_rows_total, 30);
}
