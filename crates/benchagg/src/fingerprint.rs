//! 実行パラメータのフィンガープリント

use std::fmt;

use serde::Serialize;

/// 結果ファイル先頭から取り出すパラメータ行数
pub const FINGERPRINT_LINES: usize = 5;

/// 結果ファイル先頭 5 行をそのまま保持したもの
///
/// トリムや正規化は一切行わない。`\r` を含む行もそのまま比較対象になる。
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParameterFingerprint(Vec<String>);

impl ParameterFingerprint {
    /// テキストを `\n` で分割し、先頭 [`FINGERPRINT_LINES`] 行を取り出す
    ///
    /// 行数が足りないファイルでは取れた分だけを保持する。
    pub fn from_text(text: &str) -> Self {
        Self(text.split('\n').take(FINGERPRINT_LINES).map(str::to_owned).collect())
    }

    pub fn lines(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for ParameterFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" - "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_first_five_lines_verbatim() {
        let fp = ParameterFingerprint::from_text("a\n b \nc\r\nd\ne\nf\n");
        assert_eq!(fp.lines(), &["a", " b ", "c\r", "d", "e"]);
    }

    #[test]
    fn short_text_keeps_available_lines() {
        let fp = ParameterFingerprint::from_text("only\ntwo");
        assert_eq!(fp.lines().len(), 2);
        assert_eq!(fp.to_string(), "only - two");
    }
}
