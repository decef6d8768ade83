//! Basic example demonstrating a change-profile run.
//!
//! This example shows how to:
//! 1. Create synthetic reference and perturbation screens
//! 2. Run the change-profile pipeline
//! 3. Examine neighbours, scores and a summary

use nalgebra::DMatrix;
use protein_change_profiles::prelude::*;

fn main() -> Result<()> {
    println!("=== Protein Change Profile Example ===\n");

    let (reference, condition) = create_example_screens()?;

    println!("Screen dimensions:");
    println!("  Reference: {} proteins x {} features", reference.n_proteins(), reference.n_features());
    println!("  Condition: {} proteins x {} features", condition.n_proteins(), condition.n_features());
    println!();

    println!("=== Running Pipeline ===\n");

    let profile = ChangeProfilePipeline::new()
        .name("example")
        .k(5)
        .metric(Metric::Euclidean)
        .location(Location::Median)
        .run_with_observer(&reference, &condition, &mut NoProgress)?;

    println!("Scored {} shared proteins\n", profile.n_proteins());

    let target = 3;
    println!("Neighbours of {}:", profile.proteins[target]);
    for &n in profile.robust.neighbors.neighbors(target) {
        println!("  {}", profile.proteins[n]);
    }
    println!();

    println!("Scores for {}:", profile.proteins[target]);
    for (col, name) in profile.headers.iter().skip(1).enumerate() {
        println!(
            "  {:<12} diff = {:>7.3}  median = {:>7.3}  MAD = {:>6.3}  z = {:>8.2}",
            name,
            profile.difference[(target, col)],
            profile.robust.medians[(target, col)],
            profile.robust.mad[(target, col)],
            profile.scores[(target, col)]
        );
    }
    println!();

    let scores = profile.to_gene_matrix()?;
    let summary = summarize_scores(&scores, 3.5)?;
    println!("{}", summary);

    Ok(())
}

/// Two screens of 30 proteins in three clusters; the first cluster loses
/// size under the perturbation, and `prot_03` loses much more.
fn create_example_screens() -> Result<(GeneMatrix, GeneMatrix)> {
    let n_proteins = 30;
    let features = ["size", "intensity", "eccentricity"];
    let mut seed = 7u64;
    let mut next = || {
        seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        ((seed >> 16) & 0x7FFF) as f64 / 32768.0
    };

    let mut ref_values = Vec::with_capacity(n_proteins * features.len());
    let mut cond_values = Vec::with_capacity(n_proteins * features.len());
    for i in 0..n_proteins {
        let cluster = (i / 10) as f64;
        for f in 0..features.len() {
            let value = cluster * 10.0 + f as f64 + next();
            let mut changed = value + 0.2 * (next() - 0.5);
            if i < 10 && f == 0 {
                changed -= 1.0;
            }
            if i == 3 && f == 0 {
                changed -= 8.0;
            }
            ref_values.push(value);
            cond_values.push(changed);
        }
    }

    let mut headers = vec!["ID".to_string()];
    headers.extend(features.iter().map(|f| f.to_string()));
    let proteins: Vec<String> = (0..n_proteins).map(|i| format!("prot_{:02}", i)).collect();

    let reference = GeneMatrix::new(
        headers.clone(),
        proteins.clone(),
        DMatrix::from_row_slice(n_proteins, features.len(), &ref_values),
    )?;
    let condition = GeneMatrix::new(
        headers,
        proteins,
        DMatrix::from_row_slice(n_proteins, features.len(), &cond_values),
    )?;
    Ok((reference, condition))
}
