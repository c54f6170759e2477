//! 結果ファイル本文のパース

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, BenchResult};
use crate::fingerprint::ParameterFingerprint;
use crate::grammar::find_elapsed;

/// 経過時間行が複数あった場合の扱い
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElapsedPolicy {
    /// 最初の一致を採用し、残りは警告のみ
    #[default]
    First,
    /// 2 件以上あればエラー
    Unique,
}

/// 1 ファイル分のパース結果
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedResult {
    /// 経過時間（ミリ秒）
    pub elapsed_ms: f64,
    pub fingerprint: ParameterFingerprint,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ResultParser {
    policy: ElapsedPolicy,
}

impl ResultParser {
    pub fn new(policy: ElapsedPolicy) -> Self {
        Self { policy }
    }

    /// `file` はエラーメッセージ用の名前
    pub fn parse(&self, file: &str, text: &str) -> BenchResult<ParsedResult> {
        let fingerprint = ParameterFingerprint::from_text(text);

        let matches = find_elapsed(text);
        let first = matches.first().ok_or_else(|| BenchError::MissingResult {
            file: file.to_owned(),
        })?;
        if matches.len() > 1 {
            match self.policy {
                ElapsedPolicy::First => log::warn!(
                    "{file}: found {} elapsed-time lines, using the first ({})",
                    matches.len(),
                    first.raw
                ),
                ElapsedPolicy::Unique => {
                    return Err(BenchError::DuplicateResult {
                        file: file.to_owned(),
                        count: matches.len(),
                    });
                }
            }
        }

        let elapsed_ms = first.value().ok_or_else(|| BenchError::MalformedResult {
            file: file.to_owned(),
            raw: first.raw.to_owned(),
        })?;

        Ok(ParsedResult {
            elapsed_ms,
            fingerprint,
        })
    }
}
