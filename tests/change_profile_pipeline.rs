//! Integration tests for the change-profile pipeline.

use protein_change_profiles::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write a screen TSV from (protein, values) rows.
fn write_screen<S: AsRef<str>>(path: &Path, features: &[&str], rows: &[(S, Vec<f64>)]) {
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "ID\t{}", features.join("\t")).unwrap();
    for (protein, values) in rows {
        let cells: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        writeln!(file, "{}\t{}", protein.as_ref(), cells.join("\t")).unwrap();
    }
}

/// Synthetic screens with 40 proteins in 4 well-separated clusters.
///
/// The condition screen shifts the first feature of proteins in cluster 0,
/// and one protein (`prot_03`) much more strongly than its neighbours.
fn write_synthetic_screens(dir: &Path) -> (PathBuf, PathBuf) {
    let n_proteins = 40;
    let mut rng_seed = 42u64;
    let simple_rand = |seed: &mut u64| -> f64 {
        *seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        ((*seed >> 16) & 0x7FFF) as f64 / 32768.0
    };

    let mut reference = Vec::new();
    let mut condition = Vec::new();
    for i in 0..n_proteins {
        let cluster = (i / 10) as f64;
        let ref_values: Vec<f64> = (0..3)
            .map(|f| cluster * 10.0 + f as f64 + simple_rand(&mut rng_seed))
            .collect();
        let mut cond_values: Vec<f64> = ref_values
            .iter()
            .map(|v| v + 0.5 * (simple_rand(&mut rng_seed) - 0.5))
            .collect();
        if i < 10 {
            cond_values[0] -= 1.0;
        }
        if i == 3 {
            cond_values[0] -= 20.0;
        }
        reference.push((format!("prot_{:02}", i), ref_values));
        condition.push((format!("prot_{:02}", i), cond_values));
    }
    // proteins only present in one screen
    reference.push(("ref_only".to_string(), vec![0.0, 0.0, 0.0]));
    condition.push(("cond_only".to_string(), vec![0.0, 0.0, 0.0]));
    // condition listed in reverse order
    condition.reverse();

    let ref_path = dir.join("wild_type.tsv");
    let cond_path = dir.join("treated.tsv");
    let features = ["size", "intensity", "eccentricity"];
    write_screen(&ref_path, &features, &reference);
    write_screen(&cond_path, &features, &condition);
    (ref_path, cond_path)
}

#[test]
fn test_synthetic_pipeline_flags_shifted_protein() {
    let dir = TempDir::new().unwrap();
    let (ref_path, cond_path) = write_synthetic_screens(dir.path());
    let out_path = dir.path().join("zscores.tsv");

    let profile = ChangeProfilePipeline::new()
        .k(5)
        .progress_interval(10)
        .run_files(&ref_path, &cond_path, &out_path)
        .unwrap();

    assert_eq!(profile.n_proteins(), 40);
    assert_eq!(profile.proteins[0], "prot_00");
    assert_eq!(profile.proteins[39], "prot_39");

    // neighbours of cluster-0 proteins stay within cluster 0
    for p in 0..10 {
        assert!(profile.robust.neighbors.neighbors(p).iter().all(|&n| n < 10));
    }

    // prot_03 changed by +20 in reference-minus-condition on feature 0
    let z = profile.scores[(3, 0)];
    assert!(z.is_finite());
    assert!(z > 10.0, "expected a large positive score, got {}", z);

    let written = GeneMatrix::from_tsv(&out_path).unwrap();
    assert_eq!(written.headers(), &["ID", "size", "intensity", "eccentricity"]);
    assert_eq!(written.n_proteins(), 40);

    let summary = summarize_scores(&written, 3.5).unwrap();
    assert_eq!(summary.n_proteins, 40);
    assert!(summary.outlier_scores >= 1);
}

#[test]
fn test_pipeline_idempotent() {
    let dir = TempDir::new().unwrap();
    let (ref_path, cond_path) = write_synthetic_screens(dir.path());
    let out_a = dir.path().join("a.tsv");
    let out_b = dir.path().join("b.tsv");

    let pipeline = ChangeProfilePipeline::new().k(7).metric(Metric::Manhattan);
    pipeline.run_files(&ref_path, &cond_path, &out_a).unwrap();
    pipeline.run_files(&ref_path, &cond_path, &out_b).unwrap();

    let a = std::fs::read_to_string(&out_a).unwrap();
    let b = std::fs::read_to_string(&out_b).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_degenerate_scenario_writes_nan() {
    let dir = TempDir::new().unwrap();
    let ref_path = dir.path().join("ref.tsv");
    let cond_path = dir.path().join("cond.tsv");
    let out_path = dir.path().join("out.tsv");
    write_screen(
        &ref_path,
        &["f1", "f2"],
        &[("A", vec![1.0, 2.0]), ("B", vec![2.0, 4.0]), ("C", vec![3.0, 6.0])],
    );
    write_screen(
        &cond_path,
        &["f1", "f2"],
        &[("A", vec![1.0, 1.0]), ("B", vec![2.0, 3.0]), ("C", vec![3.0, 5.0])],
    );

    let profile = ChangeProfilePipeline::new()
        .k(1)
        .run_files(&ref_path, &cond_path, &out_path)
        .unwrap();
    assert!(profile.scores.iter().all(|z| z.is_nan()));

    let text = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(text, "ID\tf1\tf2\nA\tnan\tnan\nB\tnan\tnan\nC\tnan\tnan\n");
}

#[test]
fn test_empty_intersection_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let ref_path = dir.path().join("ref.tsv");
    let cond_path = dir.path().join("cond.tsv");
    let out_path = dir.path().join("out.tsv");
    write_screen(&ref_path, &["f1"], &[("X", vec![1.0])]);
    write_screen(&cond_path, &["f1"], &[("Y", vec![1.0])]);

    let err = ChangeProfilePipeline::new()
        .k(1)
        .run_files(&ref_path, &cond_path, &out_path)
        .unwrap_err();
    assert!(matches!(err.root(), ProfileError::EmptyIntersection));
    assert!(!out_path.exists());
}

#[test]
fn test_failed_run_leaves_previous_output() {
    let dir = TempDir::new().unwrap();
    let (ref_path, cond_path) = write_synthetic_screens(dir.path());
    let out_path = dir.path().join("zscores.tsv");
    std::fs::write(&out_path, "previous\n").unwrap();

    let err = ChangeProfilePipeline::new()
        .k(100)
        .run_files(&ref_path, &cond_path, &out_path)
        .unwrap_err();
    assert!(matches!(err.root(), ProfileError::InvalidParameter(_)));
    assert_eq!(std::fs::read_to_string(&out_path).unwrap(), "previous\n");
}

#[test]
fn test_unsupported_metric_name() {
    let result = "braycurtis".parse::<Metric>();
    assert!(matches!(result, Err(ProfileError::UnsupportedMetric(_))));
}

#[test]
fn test_concat_screens_output() {
    let dir = TempDir::new().unwrap();
    let wt_path = dir.path().join("wt.tsv");
    let hu_path = dir.path().join("hu.tsv");
    write_screen(&wt_path, &["size"], &[("A", vec![1.0]), ("B", vec![2.0])]);
    write_screen(&hu_path, &["size"], &[("B", vec![5.0]), ("C", vec![6.0])]);

    let screens = vec![
        (screen_name(&wt_path), GeneMatrix::from_tsv(&wt_path).unwrap()),
        (screen_name(&hu_path), GeneMatrix::from_tsv(&hu_path).unwrap()),
    ];
    let proteins = vec!["A".to_string(), "B".to_string(), "C".to_string()];
    let merged = concat_screens(&screens, &proteins).unwrap();

    let out_path = dir.path().join("merged.tsv");
    merged.to_tsv(&out_path).unwrap();
    let text = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(text, "PROTEIN\twt_size\thu_size\nA\t1\tnan\nB\t2\t5\nC\tnan\t6\n");
}
