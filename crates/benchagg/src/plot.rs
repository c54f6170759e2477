//! plotters による SVG 描画
//!
//! カテゴリ軸は `1..=n` の整数位置に置き、目盛りラベルをカテゴリ名に差し替える。

use std::path::{Path, PathBuf};

use crate::chart::{ChartRequest, ChartSink, ensure_dir};
use crate::error::{BenchError, BenchResult};

const CHART_SIZE: (u32, u32) = (1000, 500);

/// バイオリン図の最大半幅（カテゴリ間隔 1 に対する比率）
const VIOLIN_HALF_WIDTH: f64 = 0.4;

/// 密度を評価する y 方向の分割数
const VIOLIN_STEPS: usize = 64;

type DrawResult = Result<(), Box<dyn std::error::Error>>;

pub struct SvgChartSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl SvgChartSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn render(&mut self, req: &ChartRequest, draw: fn(&Path, &ChartRequest) -> DrawResult) -> BenchResult<()> {
        if !req.y_max.is_finite() {
            return Err(BenchError::Chart {
                stem: req.stem.clone(),
                message: format!("value axis upper bound is not finite ({})", req.y_max),
            });
        }
        ensure_dir(&self.dir)?;
        let path = self.dir.join(format!("{}.svg", req.stem));
        draw(&path, req).map_err(|e| BenchError::Chart {
            stem: req.stem.clone(),
            message: e.to_string(),
        })?;
        log::debug!("wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }
}

impl ChartSink for SvgChartSink {
    fn boxplot(&mut self, req: &ChartRequest) -> BenchResult<()> {
        self.render(req, draw_boxplot)
    }

    fn violinplot(&mut self, req: &ChartRequest) -> BenchResult<()> {
        self.render(req, draw_violinplot)
    }

    fn errorbars(&mut self, req: &ChartRequest) -> BenchResult<()> {
        self.render(req, draw_errorbars)
    }

    fn lineplot(&mut self, req: &ChartRequest) -> BenchResult<()> {
        self.render(req, draw_lineplot)
    }
}

/// 整数位置 `1..=n` ならカテゴリ名、それ以外は空文字
fn category_label(labels: &[&str], x: f32) -> String {
    let rounded = x.round();
    if (x - rounded).abs() > 1e-3 || rounded < 1.0 {
        return String::new();
    }
    labels.get(rounded as usize - 1).map(|s| (*s).to_owned()).unwrap_or_default()
}

fn x_range(req: &ChartRequest) -> std::ops::Range<f32> {
    0.5..(req.series.len() as f32 + 0.5)
}

fn y_range(req: &ChartRequest) -> std::ops::Range<f32> {
    let top = if req.y_max > 0.0 { req.y_max } else { 1.0 };
    0.0..top as f32
}

fn draw_boxplot(path: &Path, req: &ChartRequest) -> DrawResult {
    use plotters::data::Quartiles;
    use plotters::prelude::*;

    let labels = req.labels();
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(&req.title, ("sans-serif", 22))
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range(req), y_range(req))?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len() + 1)
        .x_label_formatter(&|x| category_label(&labels, *x))
        .x_desc(req.x_label.as_str())
        .y_desc(req.y_label.as_str())
        .draw()?;
    chart.draw_series(req.series.iter().enumerate().filter(|(_, (_, v))| !v.is_empty()).map(
        |(i, (_, values))| {
            Boxplot::new_vertical(i as f32 + 1.0, &Quartiles::new(values.as_slice()))
                .width(30)
                .style(BLUE)
        },
    ))?;
    root.present()?;
    Ok(())
}

fn draw_violinplot(path: &Path, req: &ChartRequest) -> DrawResult {
    use plotters::prelude::*;

    let labels = req.labels();
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(&req.title, ("sans-serif", 22))
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range(req), y_range(req))?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len() + 1)
        .x_label_formatter(&|x| category_label(&labels, *x))
        .x_desc(req.x_label.as_str())
        .y_desc(req.y_label.as_str())
        .draw()?;

    for (i, (_, values)) in req.series.iter().enumerate() {
        let center = i as f64 + 1.0;
        let outline = violin_outline(values);
        if outline.is_empty() {
            continue;
        }
        let mut points: Vec<(f32, f32)> = outline
            .iter()
            .map(|(y, w)| ((center + w) as f32, *y as f32))
            .collect();
        points.extend(outline.iter().rev().map(|(y, w)| ((center - w) as f32, *y as f32)));
        chart.draw_series(std::iter::once(Polygon::new(points, BLUE.mix(0.3).filled())))?;

        if let Some(median) = crate::aggregate::quantile(values, 0.5) {
            let m = median as f32;
            let c = center as f32;
            chart.draw_series(std::iter::once(PathElement::new(
                vec![(c - 0.15, m), (c + 0.15, m)],
                BLACK.stroke_width(2),
            )))?;
        }
    }
    root.present()?;
    Ok(())
}

fn draw_errorbars(path: &Path, req: &ChartRequest) -> DrawResult {
    use plotters::prelude::*;

    use crate::aggregate::QuantileSummary;

    let labels = req.labels();
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(&req.title, ("sans-serif", 22))
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range(req), y_range(req))?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len() + 1)
        .x_label_formatter(&|x| category_label(&labels, *x))
        .x_desc(req.x_label.as_str())
        .y_desc(req.y_label.as_str())
        .draw()?;
    chart.draw_series(req.series.iter().enumerate().filter_map(|(i, (_, values))| {
        let q = QuantileSummary::from_values(values)?;
        Some(ErrorBar::new_vertical(
            i as f32 + 1.0,
            q.p25 as f32,
            q.p50 as f32,
            q.p75 as f32,
            BLUE.filled(),
            12,
        ))
    }))?;
    root.present()?;
    Ok(())
}

fn draw_lineplot(path: &Path, req: &ChartRequest) -> DrawResult {
    use plotters::prelude::*;

    let labels = req.labels();
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(&req.title, ("sans-serif", 22))
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range(req), y_range(req))?;
    chart
        .configure_mesh()
        .x_labels(labels.len() + 1)
        .x_label_formatter(&|x| category_label(&labels, *x))
        .x_desc(req.x_label.as_str())
        .y_desc(req.y_label.as_str())
        .draw()?;
    let points: Vec<(f32, f32)> = req
        .series
        .iter()
        .enumerate()
        .filter_map(|(i, (_, v))| v.first().map(|y| (i as f32 + 1.0, *y as f32)))
        .collect();
    chart.draw_series(LineSeries::new(points.iter().copied(), &BLUE))?;
    chart.draw_series(points.iter().map(|p| Circle::new(*p, 4, BLUE.filled())))?;
    root.present()?;
    Ok(())
}

/// ガウスカーネル密度推定によるバイオリンの輪郭
///
/// `(y, 半幅)` を y 昇順で返す。半幅は最大密度で [`VIOLIN_HALF_WIDTH`] になる
/// よう正規化する。帯域幅は Silverman の目安。
fn violin_outline(values: &[f64]) -> Vec<(f64, f64)> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    let sd = var.sqrt();
    let bw = if sd > 0.0 {
        1.06 * sd * (n as f64).powf(-0.2)
    } else {
        (mean.abs() * 0.01).max(1e-6)
    };

    let lo = values.iter().copied().fold(f64::INFINITY, f64::min) - 2.0 * bw;
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max) + 2.0 * bw;
    let lo = lo.max(0.0);
    let step = (hi - lo) / VIOLIN_STEPS as f64;

    let density: Vec<(f64, f64)> = (0..=VIOLIN_STEPS)
        .map(|k| {
            let y = lo + step * k as f64;
            let d = values
                .iter()
                .map(|v| {
                    let z = (y - v) / bw;
                    (-0.5 * z * z).exp()
                })
                .sum::<f64>();
            (y, d)
        })
        .collect();
    let peak = density.iter().map(|(_, d)| *d).fold(0.0_f64, f64::max);
    if peak <= 0.0 {
        return Vec::new();
    }
    density.into_iter().map(|(y, d)| (y, d / peak * VIOLIN_HALF_WIDTH)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_only_at_integer_positions() {
        let labels = ["simple", "random"];
        assert_eq!(category_label(&labels, 1.0), "simple");
        assert_eq!(category_label(&labels, 2.0), "random");
        assert_eq!(category_label(&labels, 1.5), "");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, 3.0), "");
    }

    #[test]
    fn outline_is_normalized_and_sorted() {
        let outline = violin_outline(&[10.0, 11.0, 11.5, 12.0, 30.0]);
        assert_eq!(outline.len(), VIOLIN_STEPS + 1);
        assert!(outline.windows(2).all(|w| w[0].0 < w[1].0));
        let widest = outline.iter().map(|(_, w)| *w).fold(0.0_f64, f64::max);
        assert!((widest - VIOLIN_HALF_WIDTH).abs() < 1e-9);
        assert!(outline.iter().all(|(y, _)| *y >= 0.0));
    }

    #[test]
    fn constant_samples_still_have_an_outline() {
        let outline = violin_outline(&[5.0, 5.0, 5.0]);
        assert!(!outline.is_empty());
        assert!(violin_outline(&[]).is_empty());
    }

    #[test]
    fn non_finite_axis_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let mut sink = SvgChartSink::new(tmp.path().join("plots"));
        let req = ChartRequest::new(
            "result-speedup",
            "speedup",
            "Input file",
            "Speedup",
            vec![("seq".to_owned(), vec![f64::INFINITY])],
        );
        let err = sink.lineplot(&req).unwrap_err();
        assert!(matches!(err, BenchError::Chart { ref stem, .. } if stem == "result-speedup"));
        assert!(sink.written().is_empty());
        assert!(!tmp.path().join("plots").exists());
    }

    #[test]
    fn svg_sink_writes_all_encodings() {
        let tmp = tempfile::tempdir().unwrap();
        let mut sink = SvgChartSink::new(tmp.path());
        let series = vec![
            ("simple".to_owned(), vec![10.0, 12.0, 14.0, 13.0]),
            ("random".to_owned(), vec![20.0, 22.0, 21.0]),
        ];
        let req = ChartRequest::new("result-t-boxplot", "t", "Input file", "Time (ms)", series);
        sink.boxplot(&req).unwrap();
        sink.violinplot(&ChartRequest {
            stem: "result-t-violinplot".to_owned(),
            ..req.clone()
        })
        .unwrap();
        sink.errorbars(&ChartRequest {
            stem: "result-t-errorbars".to_owned(),
            ..req.clone()
        })
        .unwrap();
        assert_eq!(sink.written().len(), 3);
        for name in ["result-t-boxplot.svg", "result-t-violinplot.svg", "result-t-errorbars.svg"] {
            let svg = std::fs::read_to_string(tmp.path().join(name)).unwrap();
            assert!(svg.contains("<svg"), "{name}");
        }
    }
}
