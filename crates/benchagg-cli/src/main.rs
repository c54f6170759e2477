// Benchmark result aggregation front end

use std::path::PathBuf;

use anyhow::{Context, Result};
use benchagg::chart::{ChartSink, PlotCsvSink};
use benchagg::config::{BenchConfig, load_config_file};
use benchagg::pipeline::run_pipeline;
use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Render SVG charts
    #[cfg(feature = "plots")]
    Svg,
    /// Write chart data as CSV
    Csv,
}

#[cfg(feature = "plots")]
const DEFAULT_FORMAT: &str = "svg";
#[cfg(not(feature = "plots"))]
const DEFAULT_FORMAT: &str = "csv";

#[derive(Parser, Debug)]
#[command(author, version, about = "Aggregate repeated benchmark results into quartiles, speedups and charts", long_about = None)]
struct Args {
    /// Configuration file (.toml / .yaml / .yml / .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory containing result-<category>-<iteration>.<ext> files
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Directory for generated charts
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Result file extension (without the leading dot)
    #[arg(long)]
    extension: Option<String>,

    /// Chart output format
    #[arg(long, value_enum, default_value = DEFAULT_FORMAT)]
    format: OutputFormat,

    /// Write the run summary as JSON instead of printing a table
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let args = Args::parse();

    use std::io::Write;
    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    )
    .format(|buf, record| writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args()))
    .write_style(env_logger::WriteStyle::Never)
    .target(env_logger::Target::Stderr)
    .init();

    if let Err(e) = run(args) {
        log::error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

fn build_config(args: &Args) -> Result<BenchConfig> {
    let mut config = match &args.config {
        Some(path) => load_config_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => BenchConfig::default(),
    };
    if let Some(dir) = &args.input_dir {
        config.input_dir = dir.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(ext) = &args.extension {
        config.extension = ext.clone();
    }
    Ok(config)
}

fn run(args: Args) -> Result<()> {
    let config = build_config(&args)?;
    log::info!(
        "Aggregating {} categories from {} into {}",
        config.categories.len(),
        config.input_dir.display(),
        config.output_dir.display()
    );

    let mut sink: Box<dyn ChartSink> = match args.format {
        #[cfg(feature = "plots")]
        OutputFormat::Svg => Box::new(benchagg::plot::SvgChartSink::new(&config.output_dir)),
        OutputFormat::Csv => Box::new(PlotCsvSink::new(&config.output_dir)),
    };
    let summary = run_pipeline(&config, sink.as_mut()).context("benchmark aggregation failed")?;

    match &args.summary_json {
        Some(path) => {
            summary
                .save_json(path)
                .with_context(|| format!("failed to write summary {}", path.display()))?;
            log::info!("Summary written to {}", path.display());
        }
        None => summary.print_summary(),
    }
    Ok(())
}
