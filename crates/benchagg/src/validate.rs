//! カテゴリ内のパラメータ一貫性検証
//!
//! 同じカテゴリ名の下に別構成で走らせた結果が混ざると、その後の統計が
//! すべて壊れる。ここを通過したものだけが [`CategoryGroup`] になる。

use std::collections::BTreeMap;

use crate::category::{CategoryId, CategoryRegistry};
use crate::error::{BenchError, BenchResult};
use crate::fingerprint::ParameterFingerprint;
use crate::sample::Sample;

/// 検証済みのカテゴリ単位のサンプル列
///
/// 全サンプルが同一の [`ParameterFingerprint`] を持つ。並びは発見順。
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryGroup {
    category: CategoryId,
    name: String,
    fingerprint: ParameterFingerprint,
    samples: Vec<Sample>,
}

impl CategoryGroup {
    pub fn category(&self) -> CategoryId {
        self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fingerprint(&self) -> &ParameterFingerprint {
        &self.fingerprint
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// 経過時間を発見順で返す
    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.elapsed_ms).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 全サンプルに同じ係数を掛けた複製（単位換算用）
    pub fn scaled(&self, factor: f64) -> Self {
        let mut out = self.clone();
        for s in &mut out.samples {
            s.elapsed_ms *= factor;
        }
        out
    }
}

pub struct ConsistencyValidator<'a> {
    registry: &'a CategoryRegistry,
}

impl<'a> ConsistencyValidator<'a> {
    pub fn new(registry: &'a CategoryRegistry) -> Self {
        Self { registry }
    }

    /// サンプルをカテゴリごとに分け、各カテゴリの先頭サンプルと全員を比較する
    ///
    /// 戻り値はレジストリ順。サンプルが 1 件もないカテゴリは警告して除外する。
    pub fn validate(&self, samples: Vec<Sample>) -> BenchResult<Vec<CategoryGroup>> {
        let mut partitioned: BTreeMap<CategoryId, Vec<Sample>> = BTreeMap::new();
        for sample in samples {
            partitioned.entry(sample.category).or_default().push(sample);
        }

        let mut groups = Vec::with_capacity(partitioned.len());
        for (id, name) in self.registry.iter() {
            let Some(samples) = partitioned.remove(&id) else {
                log::warn!("no result files found for category {name}");
                continue;
            };
            let fingerprint = samples[0].fingerprint.clone();
            if let Some(bad) = samples.iter().find(|s| s.fingerprint != fingerprint) {
                return Err(BenchError::InconsistentParameters {
                    category: name.to_owned(),
                    file: bad.file.clone(),
                    expected: fingerprint,
                    actual: bad.fingerprint.clone(),
                });
            }
            log::info!("Parameters for {name}:\n{fingerprint}");
            groups.push(CategoryGroup {
                category: id,
                name: name.to_owned(),
                fingerprint,
                samples,
            });
        }
        Ok(groups)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    fn registry() -> CategoryRegistry {
        CategoryRegistry::new(["simple", "random"]).unwrap()
    }

    #[test]
    fn identical_fingerprints_pass() {
        let reg = registry();
        let samples = (1..=30).map(|i| sample(&reg, "simple", i, i as f64)).collect();
        let groups = ConsistencyValidator::new(&reg).validate(samples).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name(), "simple");
        assert_eq!(groups[0].len(), 30);
    }

    #[test]
    fn any_differing_line_fails() {
        let reg = registry();
        for line in 0..5 {
            let mut lines: Vec<String> = HEADER.split('\n').map(str::to_owned).collect();
            lines[line].push('!');
            let mut odd = sample(&reg, "simple", 2, 1.0);
            odd.fingerprint = ParameterFingerprint::from_text(&lines.join("\n"));
            let samples = vec![sample(&reg, "simple", 1, 1.0), odd];
            let err = ConsistencyValidator::new(&reg).validate(samples).unwrap_err();
            match err {
                BenchError::InconsistentParameters {
                    category,
                    file,
                    expected,
                    actual,
                } => {
                    assert_eq!(category, "simple");
                    assert_eq!(file, "result-simple-2.txt");
                    assert_ne!(expected, actual);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn categories_are_checked_independently() {
        let reg = registry();
        let mut other = sample(&reg, "random", 1, 3.0);
        other.fingerprint = ParameterFingerprint::from_text("a\nb\nc\nd\ne");
        let samples = vec![sample(&reg, "simple", 1, 1.0), other, sample(&reg, "simple", 2, 2.0)];
        let groups = ConsistencyValidator::new(&reg).validate(samples).unwrap();
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn groups_come_out_in_registry_order() {
        let reg = registry();
        let samples = vec![sample(&reg, "random", 1, 3.0), sample(&reg, "simple", 1, 1.0)];
        let groups = ConsistencyValidator::new(&reg).validate(samples).unwrap();
        let names: Vec<_> = groups.iter().map(|g| g.name()).collect();
        assert_eq!(names, vec!["simple", "random"]);
        assert_eq!(groups[1].samples()[0].file, "result-random-1.txt");
    }

    #[test]
    fn discovery_order_is_kept_within_a_group() {
        let reg = registry();
        let samples = vec![
            sample(&reg, "simple", 3, 30.0),
            sample(&reg, "simple", 1, 10.0),
            sample(&reg, "simple", 2, 20.0),
        ];
        let groups = ConsistencyValidator::new(&reg).validate(samples).unwrap();
        assert_eq!(groups[0].values(), vec![30.0, 10.0, 20.0]);
    }
}
