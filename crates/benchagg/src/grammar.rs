//! 結果ファイル名と経過時間行の文法
//!
//! 認識する書式は次の 2 つだけ。
//!
//! - ファイル名: `result-<category>-<iteration>.<ext>`
//! - 経過時間行: `"Elapsed time: <number> msecs"` の直後に改行
//!
//! `<category>` 自体に `-` を含められるよう、`<iteration>` は `.<ext>` 直前の
//! 最後の `-` 以降の数字列として切り出す。

/// ファイル名の先頭固定部分
pub const FILE_NAME_PREFIX: &str = "result-";

/// 経過時間行の数値より前の固定部分
pub const ELAPSED_PREFIX: &str = "\"Elapsed time: ";

/// 経過時間行の数値より後の固定部分（改行まで含む）
pub const ELAPSED_SUFFIX: &str = " msecs\"\n";

/// 命名規則に合致したファイル名の分解結果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResultFileName<'a> {
    pub category: &'a str,
    pub iteration: u32,
}

/// `result-<category>-<iteration>.<ext>` パターン
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileNamePattern {
    extension: String,
}

impl FileNamePattern {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// ファイル名全体が規則に一致すればカテゴリと反復番号を返す
    pub fn parse<'a>(&self, file_name: &'a str) -> Option<ResultFileName<'a>> {
        let rest = file_name.strip_prefix(FILE_NAME_PREFIX)?;
        let stem = rest.strip_suffix(self.extension.as_str())?.strip_suffix('.')?;
        let (category, iteration) = stem.rsplit_once('-')?;
        if category.is_empty() || iteration.is_empty() {
            return None;
        }
        if !iteration.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let iteration = iteration.parse::<u32>().ok()?;
        Some(ResultFileName {
            category,
            iteration,
        })
    }

    /// 出力ファイル名などの組み立て用
    pub fn file_name(&self, category: &str, iteration: u32) -> String {
        format!("{FILE_NAME_PREFIX}{category}-{iteration}.{}", self.extension)
    }
}

/// 経過時間行の 1 件分の一致
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElapsedMatch<'a> {
    /// 数値部分の生文字列（`[0-9.]+`）
    pub raw: &'a str,
}

impl ElapsedMatch<'_> {
    /// 有限の値として読めなければ `None`（桁数が多すぎて無限大になる場合も含む）
    pub fn value(&self) -> Option<f64> {
        self.raw.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

/// テキスト中の経過時間行を出現順にすべて列挙する
pub fn find_elapsed(text: &str) -> Vec<ElapsedMatch<'_>> {
    let mut found = Vec::new();
    for (offset, _) in text.match_indices(ELAPSED_PREFIX) {
        let after = &text[offset + ELAPSED_PREFIX.len()..];
        let len = after.bytes().take_while(|b| b.is_ascii_digit() || *b == b'.').count();
        if len == 0 {
            continue;
        }
        if !after[len..].starts_with(ELAPSED_SUFFIX) {
            continue;
        }
        found.push(ElapsedMatch {
            raw: &after[..len],
        });
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_name() {
        let p = FileNamePattern::new("txt");
        assert_eq!(
            p.parse("result-simple-3.txt"),
            Some(ResultFileName {
                category: "simple",
                iteration: 3
            })
        );
    }

    #[test]
    fn category_may_contain_dashes() {
        let p = FileNamePattern::new("txt");
        let parsed = p.parse("result-random-thirsty-17.txt").unwrap();
        assert_eq!(parsed.category, "random-thirsty");
        assert_eq!(parsed.iteration, 17);
    }

    #[test]
    fn rejects_non_matching_names() {
        let p = FileNamePattern::new("txt");
        for name in [
            "results.txt",
            "result-simple.txt",
            "result--3.txt",
            "result-simple-.txt",
            "result-simple-3a.txt",
            "result-simple-3.log",
            "result-simple-3txt",
            "prefix-result-simple-3.txt",
            "README.md",
        ] {
            assert_eq!(p.parse(name), None, "{name}");
        }
    }

    #[test]
    fn file_name_round_trips_through_parse() {
        let p = FileNamePattern::new("out");
        let name = p.file_name("simple-thirsty", 4);
        assert_eq!(name, "result-simple-thirsty-4.out");
        assert_eq!(p.parse(&name).map(|r| r.iteration), Some(4));
    }

    #[test]
    fn finds_quoted_elapsed_line() {
        let text = "p1\np2\n\"Elapsed time: 67.322677 msecs\"\ntrailer\n";
        let found = find_elapsed(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].raw, "67.322677");
        assert_eq!(found[0].value(), Some(67.322677));
    }

    #[test]
    fn requires_quotes_and_line_break() {
        assert!(find_elapsed("Elapsed time: 1.0 msecs\n").is_empty());
        assert!(find_elapsed("\"Elapsed time: 1.0 msecs\"").is_empty());
        assert!(find_elapsed("\"Elapsed time:  1.0 msecs\"\n").is_empty());
        assert!(find_elapsed("\"Elapsed time: -1.0 msecs\"\n").is_empty());
    }

    #[test]
    fn lists_every_occurrence_in_order() {
        let text = "\"Elapsed time: 1 msecs\"\nx\n\"Elapsed time: 2.5 msecs\"\n";
        let raws: Vec<_> = find_elapsed(text).iter().map(|m| m.raw).collect();
        assert_eq!(raws, vec!["1", "2.5"]);
    }

    #[test]
    fn malformed_number_is_matched_but_not_parsed() {
        let found = find_elapsed("\"Elapsed time: 1.2.3 msecs\"\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value(), None);
    }
}
