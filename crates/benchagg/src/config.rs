//! 集計設定
//!
//! カテゴリレジストリ・チャート用サブセット・速度向上率の対応表はすべて
//! ここで静的に与える。入力から推測はしない。

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::category::CategoryRegistry;
use crate::error::{BenchError, BenchResult};
use crate::grammar::FileNamePattern;
use crate::parser::ElapsedPolicy;
use crate::speedup::SpeedupMapping;

/// 1 回のチャート生成要求（タイトルと対象カテゴリ）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChartSpec {
    pub title: String,
    /// 空ならレジストリ全体
    #[serde(default)]
    pub categories: Vec<String>,
}

/// 速度向上率の対応表
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeedupSpec {
    #[serde(default = "default_speedup_title")]
    pub title: String,
    /// `[baseline, comparison]` の並び
    pub pairs: Vec<(String, String)>,
}

fn default_speedup_title() -> String {
    "speedup".to_owned()
}

fn default_extension() -> String {
    "txt".to_owned()
}

fn default_expected_iterations() -> Option<usize> {
    Some(30)
}

fn default_x_label() -> String {
    "Input file".to_owned()
}

fn default_categories() -> Vec<String> {
    ["simple", "random", "simple-thirsty", "random-thirsty"].map(str::to_owned).to_vec()
}

fn default_charts() -> Vec<ChartSpec> {
    vec![ChartSpec {
        title: "inputs".to_owned(),
        categories: Vec::new(),
    }]
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BenchConfig {
    /// 結果ファイルを探すディレクトリ
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,
    /// チャート出力先（入力ディレクトリとは別）
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// 結果ファイルの拡張子（`.` なし）
    #[serde(default = "default_extension")]
    pub extension: String,
    /// カテゴリレジストリ（宣言順がそのまま出力順になる）
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    /// カテゴリあたりの想定反復回数。ずれていれば警告する
    #[serde(default = "default_expected_iterations")]
    pub expected_iterations: Option<usize>,
    #[serde(default)]
    pub elapsed_match: ElapsedPolicy,
    /// チャートのカテゴリ軸ラベル
    #[serde(default = "default_x_label")]
    pub x_label: String,
    #[serde(default = "default_charts")]
    pub charts: Vec<ChartSpec>,
    #[serde(default)]
    pub speedup: Option<SpeedupSpec>,
}

fn default_input_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("plots")
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            extension: default_extension(),
            categories: default_categories(),
            expected_iterations: default_expected_iterations(),
            elapsed_match: ElapsedPolicy::default(),
            x_label: default_x_label(),
            charts: default_charts(),
            speedup: None,
        }
    }
}

impl BenchConfig {
    pub fn registry(&self) -> BenchResult<CategoryRegistry> {
        CategoryRegistry::new(self.categories.iter().cloned())
    }

    pub fn file_pattern(&self) -> FileNamePattern {
        FileNamePattern::new(self.extension.clone())
    }

    pub fn speedup_mapping(&self, registry: &CategoryRegistry) -> BenchResult<Option<SpeedupMapping>> {
        self.speedup
            .as_ref()
            .map(|spec| SpeedupMapping::from_names(registry, &spec.pairs))
            .transpose()
    }

    /// 実行前の整合性チェック
    pub fn validate(&self) -> BenchResult<()> {
        let registry = self.registry()?;
        if self.extension.is_empty() || self.extension.starts_with('.') {
            return Err(BenchError::Config(format!(
                "extension must be non-empty and given without a leading dot: {:?}",
                self.extension
            )));
        }
        if self.input_dir == self.output_dir {
            return Err(BenchError::Config(format!(
                "output directory must differ from the input directory ({})",
                self.input_dir.display()
            )));
        }
        for chart in &self.charts {
            if chart.title.is_empty() {
                return Err(BenchError::Config("chart title must not be empty".to_owned()));
            }
            if chart.title.contains(['/', '\\']) || chart.title.contains("..") {
                return Err(BenchError::Config(format!(
                    "chart title {:?} must not contain path separators or \"..\"",
                    chart.title
                )));
            }
            registry.resolve(&chart.categories, &format!("chart {}", chart.title))?;
        }
        if let Some(spec) = &self.speedup {
            if spec.pairs.is_empty() {
                return Err(BenchError::Config("speedup mapping has no pairs".to_owned()));
            }
            self.speedup_mapping(&registry)?;
        }
        Ok(())
    }
}

/// 拡張子で書式を選んで設定ファイルを読む
///
/// `.toml` / `.yaml` / `.yml` / `.json`。それ以外は TOML → YAML の順に試す。
pub fn load_config_file<P: AsRef<Path>>(path: P) -> BenchResult<BenchConfig> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path).map_err(|e| BenchError::io(path, e))?;
    let ext = path.extension().and_then(|s| s.to_str()).map(|s| s.to_ascii_lowercase());
    let bad = |msg: String| BenchError::Config(format!("{}: {msg}", path.display()));
    match ext.as_deref() {
        Some("toml") => toml::from_str(&data).map_err(|e| bad(e.to_string())),
        Some("yaml") | Some("yml") => serde_yaml::from_str(&data).map_err(|e| bad(e.to_string())),
        Some("json") => serde_json::from_str(&data).map_err(|e| bad(e.to_string())),
        _ => toml::from_str(&data)
            .or_else(|_| serde_yaml::from_str(&data))
            .map_err(|e| bad(e.to_string())),
    }
}
