//! ベンチマーク結果の集計ツール
//!
//! `result-<category>-<iteration>.<ext>` 形式の結果ファイル群を読み込み、
//! 実行パラメータの一致を確認したうえでカテゴリごとの四分位数・速度向上率を求め、
//! チャートとして出力します。

pub mod aggregate;
pub mod category;
pub mod chart;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod grammar;
pub mod parser;
pub mod pipeline;
#[cfg(feature = "plots")]
pub mod plot;
pub mod report;
pub mod sample;
pub mod speedup;
pub mod validate;

pub use aggregate::{GroupStats, Groupings, QuantileSummary};
pub use category::{CategoryId, CategoryRegistry, Classified, FileClassifier};
pub use chart::{ChartRequest, ChartSink, PlotCsvSink};
pub use config::{BenchConfig, ChartSpec, SpeedupSpec, load_config_file};
pub use error::{BenchError, BenchResult};
pub use fingerprint::ParameterFingerprint;
pub use grammar::FileNamePattern;
pub use parser::{ElapsedPolicy, ParsedResult, ResultParser};
pub use pipeline::{discover, run_pipeline};
#[cfg(feature = "plots")]
pub use plot::SvgChartSink;
pub use report::{ReportEmitter, RunSummary};
pub use sample::Sample;
pub use speedup::{SpeedupEntry, SpeedupMapping, compute_speedups};
pub use validate::{CategoryGroup, ConsistencyValidator};
