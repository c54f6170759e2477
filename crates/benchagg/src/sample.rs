use crate::category::CategoryId;
use crate::fingerprint::ParameterFingerprint;

/// 1 回の実行から得た計測値
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub category: CategoryId,
    pub iteration: u32,
    /// 元ファイル名（診断用）
    pub file: String,
    pub elapsed_ms: f64,
    pub fingerprint: ParameterFingerprint,
}
