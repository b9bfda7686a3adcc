//! End-to-end integration tests: raw UCR file -> clean -> export -> read back -> metrics log.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tsad_eval::compute_binary_metrics;
use tsad_io::{
    prepare_method_ready, CleanedReader, ColumnReader, DataLayout, DatasetName, DatasetWriter,
    ExportConfig, IoError, MetricsLog, MetricsRow, RawSeriesReader, UcrMetadata, Variant,
};
use tsad_prep::{clean, LabelMode, WindowConfig};

/// Path to the test fixture directory.
fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

const FIXTURE: &str = "001_UCR_Anomaly_toy_40_52_56.txt";

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

// ---------------------------------------------------------------------------
// Cleaning
// ---------------------------------------------------------------------------

#[test]
fn clean_round_trip() {
    // 1. Read raw file and its boundaries
    let path = fixture_path(FIXTURE);
    let raw = RawSeriesReader::new(&path).read().expect("fixture should parse");
    let meta = UcrMetadata::from_path(&path).unwrap();
    assert_eq!(raw.len(), 80);
    assert_eq!((meta.train_end, meta.anomaly_start, meta.anomaly_end), (40, 52, 56));

    // 2. Sanitize
    let (series, report) = clean(&raw).unwrap();
    assert_eq!(report.inf_count, 1);
    assert_eq!(report.nan_count, 2);
    assert!(report.was_modified);
    let labels = meta.point_labels(series.len());

    // 3. Write cleaned artifacts
    let dir = TempDir::new().unwrap();
    let layout = DataLayout::new(&dir.path().join("data"), &dir.path().join("results"));
    let dataset = DatasetName::new("toy".into()).unwrap();
    let writer = DatasetWriter::new(&layout, dataset.clone());
    let cleaned_dir = writer.write_cleaned(&series, &labels, &meta, &report).unwrap();
    assert_eq!(cleaned_dir, layout.cleaned_dir(&dataset));

    // 4. Read back and verify
    let back = CleanedReader::new(&cleaned_dir.join("cleaned.csv")).read().unwrap();
    assert_eq!(back.series, series);
    assert_eq!(back.labels, labels);
    assert_eq!(back.labels.iter().filter(|&&l| l == 1).count(), 4);

    let json = read_json(&cleaned_dir.join("metadata.json"));
    assert_eq!(json["dataset"], "toy");
    assert_eq!(json["source_file"], FIXTURE);
    assert_eq!(json["train_end"], 40);
    assert_eq!(json["n_anomalous_points"], 4);
    let cleaning = json["cleaning"].as_object().unwrap();
    for key in ["initial_len", "nan_count", "inf_count", "was_modified"] {
        assert!(cleaning.contains_key(key), "missing {key}");
    }
    assert_eq!(cleaning["initial_len"], 80);
}

#[test]
fn mismatched_labels_are_not_written() {
    let dir = TempDir::new().unwrap();
    let layout = DataLayout::new(dir.path(), dir.path());
    let writer = DatasetWriter::new(&layout, DatasetName::new("x".into()).unwrap());
    let (series, report) = clean(&[1.0, 2.0, 3.0]).unwrap();
    let meta = UcrMetadata {
        source_file: "x.txt".into(),
        train_end: 1,
        anomaly_start: 1,
        anomaly_end: 2,
    };
    let err = writer
        .write_cleaned(&series, &[0, 1], &meta, &report)
        .unwrap_err();
    assert!(matches!(err, IoError::LengthMismatch { .. }));
    assert!(!dir.path().join("x").exists());
}

// ---------------------------------------------------------------------------
// Method-ready export
// ---------------------------------------------------------------------------

#[test]
fn method_ready_round_trip() {
    let path = fixture_path(FIXTURE);
    let meta = UcrMetadata::from_path(&path).unwrap();
    let (series, _) = clean(&RawSeriesReader::new(&path).read().unwrap()).unwrap();
    let labels = meta.point_labels(series.len());

    let window = WindowConfig::new(8, 4).unwrap().with_mode(LabelMode::Any);
    let export = ExportConfig::new().with_max_train_windows(Some(5)).with_seed(42);
    let bundle = prepare_method_ready(&series, &labels, meta.train_end, &window, &export).unwrap();

    let dir = TempDir::new().unwrap();
    let layout = DataLayout::new(dir.path(), &dir.path().join("results"));
    let writer = DatasetWriter::new(&layout, DatasetName::new("toy".into()).unwrap());
    let mr_dir = writer.write_method_ready(&bundle).unwrap();

    // per-variant segments
    for v in Variant::ALL {
        let train = ColumnReader::new(&mr_dir.join(format!("train_{v}.csv")))
            .with_column("value")
            .read()
            .unwrap();
        let test = ColumnReader::new(&mr_dir.join(format!("test_{v}.csv")))
            .read()
            .unwrap();
        assert_eq!(train.len(), 40);
        assert_eq!(test.len(), 40);
    }

    // window labels: the anomaly sits at test offsets 12..16
    let test_labels = ColumnReader::new(&mr_dir.join("test_win_labels.csv"))
        .read()
        .unwrap();
    assert_eq!(test_labels, vec![0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    let test_starts = ColumnReader::new(&mr_dir.join("test_win_starts.csv"))
        .read()
        .unwrap();
    assert_eq!(test_starts.len(), 9);
    assert_eq!(test_starts[2], 8.0);

    // train windows capped at 5 of 9
    let train_starts = ColumnReader::new(&mr_dir.join("train_win_starts.csv"))
        .read()
        .unwrap();
    assert_eq!(train_starts.len(), 5);
    assert!(train_starts.windows(2).all(|w| w[0] < w[1]));

    let json = read_json(&mr_dir.join("method_ready_metadata.json"));
    assert_eq!(json["window"]["window_size"], 8);
    assert_eq!(json["window"]["mode"], "any");
    assert_eq!(json["n_train_windows"], 5);
    assert_eq!(json["n_train_windows_total"], 9);
    assert_eq!(json["n_test_anomalous_windows"], 2);
    assert_eq!(json["variants"][0]["name"], "raw");
    assert!(json["variants"][0]["state"].is_null());
    assert!(json["variants"][1]["state"]["scale"].as_f64().unwrap() > 0.0);
}

#[test]
fn subsampling_is_reproducible() {
    let path = fixture_path(FIXTURE);
    let meta = UcrMetadata::from_path(&path).unwrap();
    let (series, _) = clean(&RawSeriesReader::new(&path).read().unwrap()).unwrap();
    let labels = meta.point_labels(series.len());
    let window = WindowConfig::new(4, 1).unwrap();
    let export = ExportConfig::new().with_max_train_windows(Some(10));

    let a = prepare_method_ready(&series, &labels, 40, &window, &export).unwrap();
    let b = prepare_method_ready(&series, &labels, 40, &window, &export).unwrap();
    assert_eq!(a.train_win_starts, b.train_win_starts);
    assert_eq!(a.train_windows(&a.variants[1]), b.train_windows(&b.variants[1]));
}

// ---------------------------------------------------------------------------
// Metrics log
// ---------------------------------------------------------------------------

#[test]
fn metrics_accumulate_under_one_header() {
    let dir = TempDir::new().unwrap();
    let layout = DataLayout::new(dir.path(), &dir.path().join("results"));
    let method = DatasetName::new("baseline".into()).unwrap();
    let log = MetricsLog::new(&layout.results_dir(&method, None).join("metrics.csv"));

    let truth = [0u8, 0, 1, 1, 0];
    let m1 = compute_binary_metrics(&truth, &[0u8, 0, 1, 0, 0]).unwrap();
    let m2 = compute_binary_metrics(&truth, &[0u8, 1, 1, 1, 0]).unwrap();
    log.append(&MetricsRow::new("baseline", "toy", &m1)).unwrap();
    log.append(&MetricsRow::new("baseline", "other", &m2)).unwrap();

    let content = fs::read_to_string(log.path()).unwrap();
    assert_eq!(content.lines().count(), 3);
    assert!(content.starts_with("method,dataset,precision,recall,f1,accuracy,tn,fp,fn,tp,eval_len\n"));

    let rows = log.read_all().unwrap();
    assert_eq!(rows[0].dataset, "toy");
    assert_eq!(rows[0].recall, 0.5);
    assert_eq!(rows[1].fp, 1);
    assert_eq!(rows[1].eval_len, 5);
}
