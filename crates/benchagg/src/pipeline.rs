//! 発見 → パース/分類 → 検証 → 集計 → 速度向上率 → 出力
//!
//! すべて逐次処理。どこかで失敗したらその時点で中断し、部分的な出力は
//! 確定させない（チャートは検証と集計が全部通った後にだけ依頼する）。

use std::fs;
use std::path::{Path, PathBuf};

use crate::aggregate::Groupings;
use crate::category::{CategoryRegistry, FileClassifier};
use crate::chart::ChartSink;
use crate::config::BenchConfig;
use crate::error::{BenchError, BenchResult};
use crate::parser::ResultParser;
use crate::report::{ChartSummary, ReportEmitter, RunSummary, summarize_categories};
use crate::sample::Sample;
use crate::speedup::speedups_from;
use crate::validate::ConsistencyValidator;

/// 入力ディレクトリ直下の通常ファイルをファイル名順に列挙する
pub fn discover(dir: &Path) -> BenchResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| BenchError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BenchError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| BenchError::io(entry.path(), e))?;
        if file_type.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// 読み込み結果
#[derive(Debug)]
pub struct Collected {
    pub samples: Vec<Sample>,
    pub skipped: usize,
}

/// 分類とパースを行い、サンプルを発見順（カテゴリ内は反復番号順）に並べる
pub fn collect_samples(
    files: &[PathBuf],
    registry: &CategoryRegistry,
    config: &BenchConfig,
) -> BenchResult<Collected> {
    let classifier = FileClassifier::new(config.file_pattern(), registry);
    let parser = ResultParser::new(config.elapsed_match);

    let mut samples = Vec::new();
    let mut skipped = 0;
    for path in files {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            skipped += 1;
            continue;
        };
        let Some(classified) = classifier.classify(name)? else {
            skipped += 1;
            continue;
        };
        let text = fs::read_to_string(path).map_err(|e| BenchError::io(path, e))?;
        let parsed = parser.parse(name, &text)?;
        log::debug!(
            "{name}: category={} iteration={} elapsed={} ms",
            registry.name(classified.category),
            classified.iteration,
            parsed.elapsed_ms
        );
        samples.push(Sample {
            category: classified.category,
            iteration: classified.iteration,
            file: name.to_owned(),
            elapsed_ms: parsed.elapsed_ms,
            fingerprint: parsed.fingerprint,
        });
    }
    samples.sort_by(|a, b| {
        (a.category, a.iteration, &a.file).cmp(&(b.category, b.iteration, &b.file))
    });
    Ok(Collected { samples, skipped })
}

/// 検証・集計済みの結果
#[derive(Debug)]
pub struct Aggregated {
    pub registry: CategoryRegistry,
    pub groupings: Groupings,
    pub files_parsed: usize,
    pub files_skipped: usize,
}

/// パース・検証・集計まで（チャートなし）
pub fn aggregate_dir(config: &BenchConfig) -> BenchResult<Aggregated> {
    config.validate()?;
    let registry = config.registry()?;
    let files = discover(&config.input_dir)?;
    let collected = collect_samples(&files, &registry, config)?;
    let files_parsed = collected.samples.len();

    let groups = ConsistencyValidator::new(&registry).validate(collected.samples)?;
    let groupings = Groupings::new(groups);
    if let Some(expected) = config.expected_iterations {
        groupings.warn_iteration_mismatch(expected);
    }
    Ok(Aggregated {
        registry,
        groupings,
        files_parsed,
        files_skipped: collected.skipped,
    })
}

/// 設定に従ってパイプライン全体を実行する
pub fn run_pipeline(config: &BenchConfig, sink: &mut dyn ChartSink) -> BenchResult<RunSummary> {
    let Aggregated {
        registry,
        groupings,
        files_parsed,
        files_skipped,
    } = aggregate_dir(config)?;
    log::info!("Results: {}", format_results(&groupings));

    // チャート依頼より前に、失敗しうる計算をすべて済ませておく
    let mut selections = Vec::with_capacity(config.charts.len());
    for chart in &config.charts {
        let selection = if chart.categories.is_empty() {
            groupings.clone()
        } else {
            let ids = registry.resolve(&chart.categories, &format!("chart {}", chart.title))?;
            groupings.select(&ids)
        };
        selections.push((chart.title.as_str(), selection));
    }
    let speedups = match config.speedup_mapping(&registry)? {
        Some(mapping) => speedups_from(&registry, &groupings, &mapping)?,
        None => Vec::new(),
    };

    let mut emitter = ReportEmitter::new(sink, config.x_label.as_str());
    let mut charts = Vec::with_capacity(selections.len());
    for (title, selection) in &selections {
        emitter.emit_distribution(title, selection)?;
        charts.push(ChartSummary {
            title: (*title).to_owned(),
            categories: summarize_categories(selection),
        });
    }
    if let Some(spec) = &config.speedup {
        emitter.emit_speedups(&spec.title, &speedups)?;
    }

    Ok(RunSummary {
        generated_at: chrono::Utc::now().to_rfc3339(),
        files_parsed,
        files_skipped,
        categories: summarize_categories(&groupings),
        charts,
        speedups,
    })
}

fn format_results(groupings: &Groupings) -> String {
    groupings
        .iter()
        .map(|g| format!("{}: {:?}", g.name(), g.values()))
        .collect::<Vec<_>>()
        .join(", ")
}
