//! 集計パイプラインのエラー型
//!
//! どのエラーも実行全体を中断させる。部分的な成功は扱わない。

use std::path::PathBuf;

use crate::fingerprint::ParameterFingerprint;

#[derive(thiserror::Error, Debug)]
pub enum BenchError {
    /// 分類済みファイルに経過時間行が存在しない
    #[error("could not find elapsed-time result in file {file}")]
    MissingResult { file: String },

    /// 経過時間行は見つかったが数値として解釈できない
    #[error("malformed elapsed-time value {raw:?} in file {file}")]
    MalformedResult { file: String, raw: String },

    /// 一意性を要求しているのに経過時間行が複数ある
    #[error("expected exactly one elapsed-time result in file {file}, found {count}")]
    DuplicateResult { file: String, count: usize },

    /// 命名規則には合致するがカテゴリがレジストリ外
    #[error("unexpected benchmark category {category:?} in file {file}")]
    UnknownCategory { category: String, file: String },

    /// 同一カテゴリ内で実行パラメータが一致しない
    #[error(
        "parameters do not match for all iterations of category {category} (file {file}):\n{actual} != {expected}"
    )]
    InconsistentParameters {
        category: String,
        file: String,
        expected: ParameterFingerprint,
        actual: ParameterFingerprint,
    },

    /// ベースラインカテゴリに対応する比較先がマッピングにない
    #[error("baseline category {category} has no entry in the speedup mapping")]
    UnmappedCategory { category: String },

    /// マッピングが参照するカテゴリのグループが存在しない
    #[error("category {category} is referenced by the speedup mapping but has no samples")]
    MissingCategory { category: String },

    /// 比較側の平均が 0 で速度向上率が定義できない
    #[error("category {category} has a mean elapsed time of zero; speedup is undefined")]
    ZeroElapsed { category: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("chart rendering failed for {stem}: {message}")]
    Chart { stem: String, message: String },
}

impl BenchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BenchError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for the aggregation pipeline
pub type BenchResult<T> = Result<T, BenchError>;
