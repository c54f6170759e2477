//! チャート描画の受け口
//!
//! 集計側は `(ラベル, 値列)` の並びと軸情報を [`ChartRequest`] にまとめて渡すだけ。
//! 実際の描画は [`ChartSink`] の実装に任せる。

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::aggregate::QuantileSummary;
use crate::error::{BenchError, BenchResult};

/// 値軸の上限は観測最大値のこの倍率
pub const Y_HEADROOM: f64 = 1.1;

#[derive(Clone, Debug, PartialEq)]
pub struct ChartRequest {
    /// 出力ファイル名（拡張子なし）。例: `result-inputs-boxplot`
    pub stem: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// カテゴリ軸の並び順どおりの `(ラベル, 値列)`
    pub series: Vec<(String, Vec<f64>)>,
    /// 値軸の上限
    pub y_max: f64,
}

impl ChartRequest {
    /// `y_max` を観測最大値の [`Y_HEADROOM`] 倍で埋める
    pub fn new(
        stem: impl Into<String>,
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
        series: Vec<(String, Vec<f64>)>,
    ) -> Self {
        let observed = series
            .iter()
            .flat_map(|(_, v)| v.iter().copied())
            .fold(0.0_f64, f64::max);
        Self {
            stem: stem.into(),
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            series,
            y_max: observed * Y_HEADROOM,
        }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.series.iter().map(|(l, _)| l.as_str()).collect()
    }
}

/// 描画先
pub trait ChartSink {
    fn boxplot(&mut self, req: &ChartRequest) -> BenchResult<()>;
    fn violinplot(&mut self, req: &ChartRequest) -> BenchResult<()>;
    /// 中央値を点、25/75 パーセンタイルを誤差棒の端にする
    fn errorbars(&mut self, req: &ChartRequest) -> BenchResult<()>;
    /// 各ラベルにつき値 1 つの折れ線
    fn lineplot(&mut self, req: &ChartRequest) -> BenchResult<()>;
}

/// 出力ディレクトリを作る（既にあれば何もしない）
pub(crate) fn ensure_dir(dir: &Path) -> BenchResult<()> {
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir).map_err(|e| BenchError::io(dir, e))?;
    }
    Ok(())
}

/// 描画用データを CSV で書き出す
///
/// 外部ツールでプロットする前提の出力。ファイル名は `<stem>.csv`。
pub struct PlotCsvSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl PlotCsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn write(&mut self, req: &ChartRequest, header: &[&str], rows: Vec<Vec<String>>) -> BenchResult<()> {
        ensure_dir(&self.dir)?;
        let path = self.dir.join(format!("{}.csv", req.stem));
        let file = File::create(&path).map_err(|e| BenchError::io(&path, e))?;
        let mut writer = BufWriter::new(file);
        let io = |e| BenchError::io(&path, e);
        write_csv_row(&mut writer, header).map_err(io)?;
        for row in &rows {
            write_csv_row(&mut writer, &row[..]).map_err(io)?;
        }
        writer.flush().map_err(io)?;
        log::debug!("wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }

    fn sample_rows(req: &ChartRequest) -> Vec<Vec<String>> {
        req.series
            .iter()
            .flat_map(|(label, values)| {
                values.iter().map(move |v| vec![label.clone(), fmt_float(*v)])
            })
            .collect()
    }
}

impl ChartSink for PlotCsvSink {
    fn boxplot(&mut self, req: &ChartRequest) -> BenchResult<()> {
        let rows = Self::sample_rows(req);
        self.write(req, &["category", "elapsed_ms"], rows)
    }

    fn violinplot(&mut self, req: &ChartRequest) -> BenchResult<()> {
        let rows = Self::sample_rows(req);
        self.write(req, &["category", "elapsed_ms"], rows)
    }

    fn errorbars(&mut self, req: &ChartRequest) -> BenchResult<()> {
        let rows = req
            .series
            .iter()
            .filter_map(|(label, values)| {
                let q = QuantileSummary::from_values(values)?;
                Some(vec![
                    label.clone(),
                    fmt_float(q.p50),
                    fmt_float(q.p50 - q.p25),
                    fmt_float(q.p75 - q.p50),
                ])
            })
            .collect();
        self.write(req, &["category", "median", "error_down", "error_up"], rows)
    }

    fn lineplot(&mut self, req: &ChartRequest) -> BenchResult<()> {
        let rows = req
            .series
            .iter()
            .filter_map(|(label, values)| {
                values.first().map(|v| vec![label.clone(), fmt_float(*v)])
            })
            .collect();
        self.write(req, &["category", "value"], rows)
    }
}

fn fmt_float(value: f64) -> String {
    format!("{value:.6}")
}

fn write_csv_row<W: Write>(writer: &mut W, row: &[impl AsRef<str>]) -> std::io::Result<()> {
    for (idx, value) in row.iter().enumerate() {
        if idx > 0 {
            writer.write_all(b",")?;
        }
        write_csv_value(writer, value.as_ref())?;
    }
    writer.write_all(b"\n")
}

fn write_csv_value<W: Write>(writer: &mut W, value: &str) -> std::io::Result<()> {
    let needs_quote = value.contains(',') || value.contains('"') || value.contains('\n');
    if !needs_quote {
        return writer.write_all(value.as_bytes());
    }
    writer.write_all(b"\"")?;
    writer.write_all(value.replace('"', "\"\"").as_bytes())?;
    writer.write_all(b"\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(stem: &str) -> ChartRequest {
        ChartRequest::new(
            stem,
            "inputs",
            "Input file",
            "Time (ms)",
            vec![
                ("simple".to_owned(), vec![10.0, 12.0, 14.0]),
                ("random".to_owned(), vec![20.0]),
            ],
        )
    }

    #[test]
    fn y_max_has_ten_percent_headroom() {
        let req = request("x");
        assert!((req.y_max - 22.0).abs() < 1e-12);
        assert_eq!(req.labels(), vec!["simple", "random"]);
    }

    #[test]
    fn csv_sink_writes_samples_and_error_bars() {
        let tmp = tempfile::tempdir().unwrap();
        let mut sink = PlotCsvSink::new(tmp.path().join("plots"));
        sink.boxplot(&request("result-inputs-boxplot")).unwrap();
        sink.errorbars(&request("result-inputs-errorbars")).unwrap();
        assert_eq!(sink.written().len(), 2);

        let box_csv = fs::read_to_string(tmp.path().join("plots/result-inputs-boxplot.csv")).unwrap();
        let lines: Vec<_> = box_csv.lines().collect();
        assert_eq!(lines[0], "category,elapsed_ms");
        assert_eq!(lines[1], "simple,10.000000");
        assert_eq!(lines.len(), 5);

        let err_csv =
            fs::read_to_string(tmp.path().join("plots/result-inputs-errorbars.csv")).unwrap();
        let lines: Vec<_> = err_csv.lines().collect();
        assert_eq!(lines[1], "simple,12.000000,1.000000,1.000000");
        assert_eq!(lines[2], "random,20.000000,0.000000,0.000000");
    }

    #[test]
    fn csv_values_are_quoted_when_needed() {
        let mut out = Vec::new();
        write_csv_row(&mut out, &["a,b", "c\"d", "e"]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\"a,b\",\"c\"\"d\",e\n");
    }
}
