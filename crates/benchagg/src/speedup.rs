//! 対になるカテゴリ間の速度向上率
//!
//! `speedup = mean(baseline) / mean(comparison)`。1 より大きければ比較側が速い。

use serde::Serialize;

use crate::aggregate::{Groupings, mean, quantile};
use crate::category::{CategoryId, CategoryRegistry};
use crate::error::{BenchError, BenchResult};

/// ベースライン → 比較先の明示的な対応表（宣言順を保持）
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeedupMapping {
    pairs: Vec<MappedPair>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct MappedPair {
    baseline: CategoryId,
    comparison: CategoryId,
    comparison_name: String,
}

impl SpeedupMapping {
    /// 名前の対から作る。レジストリ外の名前と重複したベースラインは拒否する
    pub fn from_names<S: AsRef<str>>(
        registry: &CategoryRegistry,
        pairs: &[(S, S)],
    ) -> BenchResult<Self> {
        let mut resolved: Vec<MappedPair> = Vec::with_capacity(pairs.len());
        for (base, cmp) in pairs {
            let ids = registry.resolve(&[base.as_ref(), cmp.as_ref()], "speedup mapping")?;
            if resolved.iter().any(|p| p.baseline == ids[0]) {
                return Err(BenchError::Config(format!(
                    "baseline category {:?} appears twice in the speedup mapping",
                    base.as_ref()
                )));
            }
            resolved.push(MappedPair {
                baseline: ids[0],
                comparison: ids[1],
                comparison_name: cmp.as_ref().to_owned(),
            });
        }
        Ok(Self { pairs: resolved })
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn baselines(&self) -> Vec<CategoryId> {
        self.pairs.iter().map(|p| p.baseline).collect()
    }

    pub fn comparisons(&self) -> Vec<CategoryId> {
        self.pairs.iter().map(|p| p.comparison).collect()
    }

    fn position(&self, baseline: CategoryId) -> Option<usize> {
        self.pairs.iter().position(|p| p.baseline == baseline)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpeedupEntry {
    pub baseline: String,
    pub comparison: String,
    pub speedup: f64,
}

/// ベースライン集合の各カテゴリについて速度向上率を求める
///
/// 結果は対応表の宣言順。
pub fn compute_speedups(
    baseline: &Groupings,
    comparison: &Groupings,
    mapping: &SpeedupMapping,
) -> BenchResult<Vec<SpeedupEntry>> {
    let mut ranked = Vec::with_capacity(baseline.len());
    for group in baseline.iter() {
        let position = mapping.position(group.category()).ok_or_else(|| {
            BenchError::UnmappedCategory {
                category: group.name().to_owned(),
            }
        })?;
        let target = &mapping.pairs[position];
        let cmp = comparison.get(target.comparison).ok_or_else(|| BenchError::MissingCategory {
            category: target.comparison_name.clone(),
        })?;

        let (Some(base_mean), Some(cmp_mean)) = (mean(&group.values()), mean(&cmp.values())) else {
            return Err(BenchError::MissingCategory {
                category: cmp.name().to_owned(),
            });
        };
        if cmp_mean == 0.0 {
            return Err(BenchError::ZeroElapsed {
                category: cmp.name().to_owned(),
            });
        }
        ranked.push((
            position,
            SpeedupEntry {
                baseline: group.name().to_owned(),
                comparison: cmp.name().to_owned(),
                speedup: base_mean / cmp_mean,
            },
        ));
    }
    ranked.sort_by_key(|(position, _)| *position);
    Ok(ranked.into_iter().map(|(_, e)| e).collect())
}

/// 対応表の全ベースラインが揃っているか確認してから計算する
///
/// 1 つのグルーピングからベースライン側・比較側の両方を切り出す。
pub fn speedups_from(
    registry: &CategoryRegistry,
    groupings: &Groupings,
    mapping: &SpeedupMapping,
) -> BenchResult<Vec<SpeedupEntry>> {
    for pair in &mapping.pairs {
        for id in [pair.baseline, pair.comparison] {
            if groupings.get(id).is_none() {
                return Err(BenchError::MissingCategory {
                    category: registry.name(id).to_owned(),
                });
            }
        }
    }
    let baseline = groupings.select(&mapping.baselines());
    let comparison = groupings.select(&mapping.comparisons());
    compute_speedups(&baseline, &comparison, mapping)
}

/// 基準カテゴリの中央値に対する各サンプルの速度向上率
///
/// 各値は `median(base) / t`。ライブラリ利用者向けで、パイプラインからは呼ばない。
/// 経過時間 0 のサンプルがあれば `ZeroElapsed`。
pub fn relative_speedups(
    registry: &CategoryRegistry,
    groupings: &Groupings,
    base: CategoryId,
) -> BenchResult<Vec<(String, Vec<f64>)>> {
    let missing = || BenchError::MissingCategory {
        category: registry.name(base).to_owned(),
    };
    let base_group = groupings.get(base).ok_or_else(missing)?;
    let base_median = quantile(&base_group.values(), 0.5).ok_or_else(missing)?;
    groupings
        .iter()
        .map(|g| {
            let values = g.values();
            if values.contains(&0.0) {
                return Err(BenchError::ZeroElapsed {
                    category: g.name().to_owned(),
                });
            }
            let ratios: Vec<f64> = values.iter().map(|t| base_median / t).collect();
            Ok((g.name().to_owned(), ratios))
        })
        .collect()
}
