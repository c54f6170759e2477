//! 集計結果のログ出力とチャート依頼
//!
//! 分布 1 つにつき箱ひげ図・バイオリン図・誤差棒の 3 種類を同じデータから作る。

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::aggregate::{GroupStats, Groupings};
use crate::chart::{ChartRequest, ChartSink};
use crate::error::{BenchError, BenchResult};
use crate::speedup::SpeedupEntry;

/// 速度向上率の折れ線は常にこの名前で出す
pub const SPEEDUP_STEM: &str = "result-speedup";

pub const TIME_AXIS_LABEL: &str = "Time (ms)";

pub fn boxplot_stem(title: &str) -> String {
    format!("result-{title}-boxplot")
}

pub fn violinplot_stem(title: &str) -> String {
    format!("result-{title}-violinplot")
}

pub fn errorbars_stem(title: &str) -> String {
    format!("result-{title}-errorbars")
}

pub struct ReportEmitter<'a, S: ChartSink + ?Sized> {
    sink: &'a mut S,
    x_label: String,
}

impl<'a, S: ChartSink + ?Sized> ReportEmitter<'a, S> {
    pub fn new(sink: &'a mut S, x_label: impl Into<String>) -> Self {
        Self {
            sink,
            x_label: x_label.into(),
        }
    }

    /// 四分位数をログに出し、3 種類のチャートを依頼する
    pub fn emit_distribution(&mut self, title: &str, groupings: &Groupings) -> BenchResult<()> {
        let quartiles = groupings.quantiles();
        for (name, q) in &quartiles {
            log::info!(
                "[{title}] {name}: q1={:.6} median={:.6} q3={:.6}",
                q.p25,
                q.p50,
                q.p75
            );
        }
        if groupings.is_empty() {
            log::warn!("[{title}] no samples for any requested category, skipping charts");
            return Ok(());
        }

        let series = groupings.series();
        let request = |stem: String| {
            ChartRequest::new(stem, title, self.x_label.as_str(), TIME_AXIS_LABEL, series.clone())
        };
        let boxplot = request(boxplot_stem(title));
        let violin = request(violinplot_stem(title));
        let errorbars = request(errorbars_stem(title));

        self.sink.boxplot(&boxplot)?;
        self.sink.violinplot(&violin)?;
        self.sink.errorbars(&errorbars)?;
        Ok(())
    }

    /// 対応表の順に速度向上率の折れ線を 1 枚出す
    ///
    /// 出力名はタイトルに関係なく常に [`SPEEDUP_STEM`]。呼び出し側は対応表が
    /// 設定されているときだけ呼ぶ（対応表がなければ描く値がない）。
    pub fn emit_speedups(&mut self, title: &str, speedups: &[SpeedupEntry]) -> BenchResult<()> {
        for e in speedups {
            log::info!(
                "[{title}] {} -> {}: speedup {:.4}",
                e.baseline,
                e.comparison,
                e.speedup
            );
        }
        let series = speedups.iter().map(|e| (e.baseline.clone(), vec![e.speedup])).collect();
        let req = ChartRequest::new(SPEEDUP_STEM, title, self.x_label.as_str(), "Speedup", series);
        self.sink.lineplot(&req)
    }
}

/// 1 チャート分の要約
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSummary {
    pub title: String,
    pub categories: Vec<CategorySummary>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    /// 先頭 5 行のパラメータ
    pub parameters: Vec<String>,
    #[serde(flatten)]
    pub stats: GroupStats,
}

/// 実行全体の要約（JSON 保存用）
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    /// RFC 3339 形式の生成時刻
    pub generated_at: String,
    pub files_parsed: usize,
    pub files_skipped: usize,
    pub categories: Vec<CategorySummary>,
    pub charts: Vec<ChartSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub speedups: Vec<SpeedupEntry>,
}

pub fn summarize_categories(groupings: &Groupings) -> Vec<CategorySummary> {
    groupings
        .iter()
        .filter_map(|g| {
            GroupStats::from_values(&g.values()).map(|stats| CategorySummary {
                category: g.name().to_owned(),
                parameters: g.fingerprint().lines().to_vec(),
                stats,
            })
        })
        .collect()
}

impl RunSummary {
    /// 人間可読な形式で結果を出力
    pub fn print_summary(&self) {
        println!("\n=== Benchmark Summary ===");
        println!("Files: {} parsed, {} skipped\n", self.files_parsed, self.files_skipped);
        println!(
            "{:<20} {:>6} {:>12} {:>12} {:>12} {:>12}",
            "Category", "Runs", "Mean", "Q1", "Median", "Q3"
        );
        println!("{}", "-".repeat(79));
        for c in &self.categories {
            println!(
                "{:<20} {:>6} {:>12.3} {:>12.3} {:>12.3} {:>12.3}",
                c.category,
                c.stats.count,
                c.stats.mean,
                c.stats.quartiles.p25,
                c.stats.quartiles.p50,
                c.stats.quartiles.p75,
            );
        }
        if !self.speedups.is_empty() {
            println!("\n{:<20} {:<20} {:>10}", "Baseline", "Comparison", "Speedup");
            println!("{}", "-".repeat(52));
            for e in &self.speedups {
                println!("{:<20} {:<20} {:>10.3}", e.baseline, e.comparison, e.speedup);
            }
        }
        println!();
    }

    /// JSON形式で保存
    pub fn save_json(&self, path: &Path) -> BenchResult<()> {
        let file = File::create(path).map_err(|e| BenchError::io(path, e))?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| BenchError::io(path, std::io::Error::other(e)))
    }
}
