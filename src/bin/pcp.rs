//! PCP - Protein Change Profiles CLI
//!
//! Command-line interface for computing kNN-robust protein change profiles.

use clap::{Parser, Subcommand, ValueEnum};
use protein_change_profiles::align::{concat_screens, read_protein_list, screen_name};
use protein_change_profiles::data::GeneMatrix;
use protein_change_profiles::error::Result;
use protein_change_profiles::neighbors::Metric;
use protein_change_profiles::pipeline::{ChangeProfilePipeline, ProfileConfig};
use protein_change_profiles::profile::{summarize_scores, DEFAULT_OUTLIER_THRESHOLD};
use protein_change_profiles::score::Location;
use std::path::PathBuf;

/// CLI-friendly location enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLocation {
    /// Centre scores on the neighbour median
    Median,
    /// Centre scores on the neighbour mean
    Mean,
}

impl From<CliLocation> for Location {
    fn from(location: CliLocation) -> Self {
        match location {
            CliLocation::Median => Location::Median,
            CliLocation::Mean => Location::Mean,
        }
    }
}

/// Protein localization change profiles between two screens
#[derive(Parser)]
#[command(name = "pcp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate z-scores for each feature in each protein
    Run {
        /// Reference untreated wild-type screen
        reference: PathBuf,

        /// Perturbation screen
        condition: PathBuf,

        /// Output to write to
        output: PathBuf,

        /// k parameter for kNN normalization (default: 50)
        #[arg(long)]
        k: Option<usize>,

        /// Distance metric for neighbour selection (default: euclidean)
        #[arg(long)]
        metric: Option<String>,

        /// Statistic to centre scores on (default: median)
        #[arg(long, value_enum)]
        location: Option<CliLocation>,

        /// Path to a run configuration YAML; flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Concatenate screens onto a master protein list
    Concat {
        /// Screens to concatenate
        #[arg(long, num_args = 1.., required = true)]
        files: Vec<PathBuf>,

        /// File listing all proteins, one per line
        #[arg(long)]
        reference: PathBuf,

        /// Output to write to
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Summarize a z-score table
    Summarize {
        /// Path to z-score TSV
        scores: PathBuf,

        /// Output format: text, json, or yaml
        #[arg(short, long, default_value = "text")]
        format: String,

        /// |z| above which a score counts as an outlier
        #[arg(long, default_value_t = DEFAULT_OUTLIER_THRESHOLD)]
        threshold: f64,
    },

    /// Generate an example run configuration
    Example {
        /// Output path for the example YAML
        #[arg(short, long, default_value = "profile.yaml")]
        output: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            reference,
            condition,
            output,
            k,
            metric,
            location,
            config,
        } => cmd_run(
            &reference,
            &condition,
            &output,
            k,
            metric.as_deref(),
            location,
            config.as_ref(),
        ),
        Commands::Concat {
            files,
            reference,
            output,
        } => cmd_concat(&files, &reference, &output),
        Commands::Summarize {
            scores,
            format,
            threshold,
        } => cmd_summarize(&scores, &format, threshold),
        Commands::Example { output } => cmd_example(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Compute change profiles for a reference/condition pair
fn cmd_run(
    reference: &PathBuf,
    condition: &PathBuf,
    output: &PathBuf,
    k: Option<usize>,
    metric: Option<&str>,
    location: Option<CliLocation>,
    config_path: Option<&PathBuf>,
) -> Result<()> {
    let config = match config_path {
        Some(path) => {
            log::info!("Loading run configuration from {:?}...", path);
            ProfileConfig::from_yaml(&std::fs::read_to_string(path)?)?
        }
        None => ProfileConfig::default(),
    };

    let mut pipeline = ChangeProfilePipeline::from_config(&config);
    if let Some(k) = k {
        pipeline = pipeline.k(k);
    }
    if let Some(metric) = metric {
        pipeline = pipeline.metric(metric.parse::<Metric>()?);
    }
    if let Some(location) = location {
        pipeline = pipeline.location(location.into());
    }

    log::info!("Calculating protein localization change profiles...");
    let profile = pipeline.run_files(reference, condition, output)?;

    let undefined = profile.scores.iter().filter(|z| !z.is_finite()).count();
    log::info!(
        "Done! {} proteins x {} features scored",
        profile.n_proteins(),
        profile.scores.ncols()
    );
    if undefined > 0 {
        log::info!("  {} undefined scores (zero neighbour MAD)", undefined);
    }

    Ok(())
}

/// Concatenate screens by a master protein list
fn cmd_concat(files: &[PathBuf], reference: &PathBuf, output: &PathBuf) -> Result<()> {
    log::info!("Loading protein list from {:?}...", reference);
    let proteins = read_protein_list(reference)?;

    let mut screens = Vec::with_capacity(files.len());
    for path in files {
        log::info!("Loading screen {:?}...", path);
        screens.push((screen_name(path), GeneMatrix::from_tsv(path)?));
    }

    let merged = concat_screens(&screens, &proteins)?;
    log::info!(
        "Concatenated {} screens: {} proteins x {} features",
        screens.len(),
        merged.n_proteins(),
        merged.n_features()
    );
    merged.to_tsv(output)
}

/// Summarize a z-score table
fn cmd_summarize(scores_path: &PathBuf, format: &str, threshold: f64) -> Result<()> {
    log::info!("Loading z-scores...");
    let scores = GeneMatrix::from_tsv(scores_path)?;
    let summary = summarize_scores(&scores, threshold)?;

    match format {
        "json" => println!("{}", summary.to_json()?),
        "yaml" => println!("{}", summary.to_yaml()?),
        _ => println!("{}", summary),
    }

    Ok(())
}

/// Generate an example configuration
fn cmd_example(output: &PathBuf) -> Result<()> {
    let config = ChangeProfilePipeline::new()
        .name("rapamycin-vs-wt")
        .k(50)
        .metric(Metric::Euclidean)
        .location(Location::Median)
        .to_config(Some("kNN-robust change profiles against the wild-type screen"));

    std::fs::write(output, config.to_yaml()?)?;
    log::info!("Example configuration written to {:?}", output);
    Ok(())
}
