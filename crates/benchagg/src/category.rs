//! カテゴリレジストリとファイル分類

use crate::error::{BenchError, BenchResult};
use crate::grammar::FileNamePattern;

/// レジストリ内の宣言順インデックス
///
/// `Ord` が宣言順と一致するので、`BTreeMap<CategoryId, _>` を走査すれば
/// 常にレジストリ順になる。
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CategoryId(usize);

/// 認識するカテゴリの閉じた集合
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryRegistry {
    names: Vec<String>,
}

impl CategoryRegistry {
    pub fn new<I, S>(names: I) -> BenchResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(BenchError::Config("category registry is empty".to_owned()));
        }
        for (i, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(BenchError::Config("category name must not be empty".to_owned()));
            }
            if names[..i].contains(name) {
                return Err(BenchError::Config(format!("duplicate category {name:?}")));
            }
        }
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn lookup(&self, name: &str) -> Option<CategoryId> {
        self.names.iter().position(|n| n == name).map(CategoryId)
    }

    pub fn name(&self, id: CategoryId) -> &str {
        &self.names[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (CategoryId, &str)> {
        self.names.iter().enumerate().map(|(i, n)| (CategoryId(i), n.as_str()))
    }

    /// 設定中のカテゴリ名一覧を ID に変換する。`context` はエラー表示用
    pub fn resolve<S: AsRef<str>>(&self, names: &[S], context: &str) -> BenchResult<Vec<CategoryId>> {
        names
            .iter()
            .map(|n| {
                let n = n.as_ref();
                self.lookup(n).ok_or_else(|| {
                    BenchError::Config(format!("{context}: category {n:?} is not in the registry"))
                })
            })
            .collect()
    }
}

/// 分類済みファイル
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classified {
    pub category: CategoryId,
    pub iteration: u32,
}

/// ファイル名からカテゴリを決める
pub struct FileClassifier<'a> {
    pattern: FileNamePattern,
    registry: &'a CategoryRegistry,
}

impl<'a> FileClassifier<'a> {
    pub fn new(pattern: FileNamePattern, registry: &'a CategoryRegistry) -> Self {
        Self { pattern, registry }
    }

    /// 命名規則に合わないファイルは `Ok(None)`（無関係なファイルとして無視）。
    /// 規則に合うのにカテゴリがレジストリ外なら `UnknownCategory`。
    pub fn classify(&self, file_name: &str) -> BenchResult<Option<Classified>> {
        let Some(parsed) = self.pattern.parse(file_name) else {
            log::debug!("skipping {file_name}: does not match the result naming pattern");
            return Ok(None);
        };
        let category =
            self.registry.lookup(parsed.category).ok_or_else(|| BenchError::UnknownCategory {
                category: parsed.category.to_owned(),
                file: file_name.to_owned(),
            })?;
        Ok(Some(Classified {
            category,
            iteration: parsed.iteration,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> CategoryRegistry {
        CategoryRegistry::new(["simple", "random", "simple-thirsty", "random-thirsty"]).unwrap()
    }

    #[test]
    fn classifies_known_category() {
        let reg = registry();
        let c = FileClassifier::new(FileNamePattern::new("txt"), &reg);
        let got = c.classify("result-simple-3.txt").unwrap().unwrap();
        assert_eq!(reg.name(got.category), "simple");
        assert_eq!(got.iteration, 3);
    }

    #[test]
    fn unknown_category_is_fatal() {
        let reg = registry();
        let c = FileClassifier::new(FileNamePattern::new("txt"), &reg);
        let err = c.classify("result-bogus-3.txt").unwrap_err();
        match err {
            BenchError::UnknownCategory { category, file } => {
                assert_eq!(category, "bogus");
                assert_eq!(file, "result-bogus-3.txt");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unrelated_files_are_skipped() {
        let reg = registry();
        let c = FileClassifier::new(FileNamePattern::new("txt"), &reg);
        assert_eq!(c.classify("notes.txt").unwrap(), None);
        assert_eq!(c.classify("result-simple-3.csv").unwrap(), None);
    }

    #[test]
    fn dashed_category_resolves_to_registry_entry() {
        let reg = registry();
        let c = FileClassifier::new(FileNamePattern::new("txt"), &reg);
        let got = c.classify("result-random-thirsty-30.txt").unwrap().unwrap();
        assert_eq!(reg.name(got.category), "random-thirsty");
    }

    #[test]
    fn registry_order_defines_id_order() {
        let reg = registry();
        let ids: Vec<_> = ["random-thirsty", "simple", "random"]
            .iter()
            .map(|n| reg.lookup(n).unwrap())
            .collect();
        let mut sorted = ids.clone();
        sorted.sort();
        let names: Vec<_> = sorted.iter().map(|id| reg.name(*id)).collect();
        assert_eq!(names, vec!["simple", "random", "random-thirsty"]);
    }

    #[test]
    fn rejects_duplicate_or_empty_registry() {
        assert!(CategoryRegistry::new(Vec::<String>::new()).is_err());
        assert!(CategoryRegistry::new(["a", "b", "a"]).is_err());
        assert!(CategoryRegistry::new(["a", ""]).is_err());
    }

    #[test]
    fn resolve_reports_unknown_names() {
        let reg = registry();
        assert_eq!(reg.resolve(&["random"], "chart").unwrap().len(), 1);
        let err = reg.resolve(&["random", "nope"], "chart inputs").unwrap_err();
        assert!(err.to_string().contains("nope"));
    }
}
