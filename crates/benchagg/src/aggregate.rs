//! カテゴリ別の集計（四分位数・平均）とサブセット選択

use std::collections::BTreeMap;

use serde::Serialize;

use crate::category::CategoryId;
use crate::validate::CategoryGroup;

/// 昇順ソート済みの値から線形補間で分位点を求める
///
/// 位置 `h = (n - 1) * q` の前後 2 点を補間する（numpy の既定 `linear` と同じ）。
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let frac = h - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// 入力順に依存しない分位点
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut v = values.to_vec();
    v.sort_by(f64::total_cmp);
    quantile_sorted(&v, q)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// 第 1 四分位数・中央値・第 3 四分位数
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct QuantileSummary {
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
}

impl QuantileSummary {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut v = values.to_vec();
        v.sort_by(f64::total_cmp);
        Some(Self {
            p25: quantile_sorted(&v, 0.25)?,
            p50: quantile_sorted(&v, 0.50)?,
            p75: quantile_sorted(&v, 0.75)?,
        })
    }
}

/// レポート用の要約統計
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GroupStats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub quartiles: QuantileSummary,
}

impl GroupStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let quartiles = QuantileSummary::from_values(values)?;
        Some(Self {
            count: values.len(),
            mean: mean(values)?,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            quartiles,
        })
    }
}

/// カテゴリ → サンプル列の順序付き写像
///
/// 走査順は常にレジストリの宣言順。ファイルの発見順には依存しない。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Groupings {
    groups: BTreeMap<CategoryId, CategoryGroup>,
}

impl Groupings {
    pub fn new(groups: impl IntoIterator<Item = CategoryGroup>) -> Self {
        Self {
            groups: groups.into_iter().map(|g| (g.category(), g)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, id: CategoryId) -> Option<&CategoryGroup> {
        self.groups.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryGroup> {
        self.groups.values()
    }

    /// 要求されたカテゴリだけに絞る
    ///
    /// 結果の順序は `requested` の並びではなくレジストリ順。サンプルの無い
    /// カテゴリは黙って落とす（検証段階で警告済み）。
    pub fn select(&self, requested: &[CategoryId]) -> Groupings {
        Groupings {
            groups: self
                .groups
                .iter()
                .filter(|(id, _)| requested.contains(id))
                .map(|(id, g)| (*id, g.clone()))
                .collect(),
        }
    }

    /// `(ラベル, 値列)` の一覧。チャートに渡す形
    pub fn series(&self) -> Vec<(String, Vec<f64>)> {
        self.iter().map(|g| (g.name().to_owned(), g.values())).collect()
    }

    pub fn quantiles(&self) -> Vec<(String, QuantileSummary)> {
        self.iter()
            .filter_map(|g| QuantileSummary::from_values(&g.values()).map(|q| (g.name().to_owned(), q)))
            .collect()
    }

    /// 全カテゴリを通した最大サンプル値
    pub fn max_value(&self) -> Option<f64> {
        self.iter().flat_map(|g| g.values()).reduce(f64::max)
    }

    /// 期待反復数と実際の件数が違うカテゴリを警告する
    pub fn warn_iteration_mismatch(&self, expected: usize) {
        for g in self.iter() {
            if g.len() != expected {
                log::warn!(
                    "category {} has {} iterations, expected {expected}",
                    g.name(),
                    g.len()
                );
            }
        }
    }
}
