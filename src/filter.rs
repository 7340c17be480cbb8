//! Include/exclude glob filtering of repository file listings.
//!
//! Patterns use shell-style globs matched against the full
//! repository-relative path. `*` also matches `/`, so `*.json` selects JSON
//! files in every sub-directory.
//!
//! ```rust
//! use hubfetch::filter::PatternFilter;
//!
//! # fn main() -> hubfetch::Result<()> {
//! let filter = PatternFilter::new(&["*.json".into()], &["tokenizer*".into()])?;
//! let files = vec!["config.json".to_string(), "tokenizer.json".to_string(), "model.bin".to_string()];
//! assert_eq!(filter.apply(&files), vec!["config.json".to_string()]);
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

/// Retains files matching at least one include glob and none of the exclude globs.
///
/// An empty include list means "everything", an empty exclude list means
/// "nothing is excluded".
#[derive(Debug, Clone, Default)]
pub struct PatternFilter {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl PatternFilter {
    /// Compiles the include and exclude globs.
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        Ok(Self {
            include: build_globset(include)?,
            exclude: build_globset(exclude)?,
        })
    }

    /// Whether a single repository path survives the filter.
    pub fn matches(&self, path: &str) -> bool {
        let included = match &self.include {
            Some(set) => set.is_match(path),
            None => true,
        };
        if !included {
            return false;
        }
        match &self.exclude {
            Some(set) => !set.is_match(path),
            None => true,
        }
    }

    /// Filters `files`, keeping their relative order.
    pub fn apply(&self, files: &[String]) -> Vec<String> {
        files
            .iter()
            .filter(|f| self.matches(f))
            .cloned()
            .collect()
    }
}

fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(false)
            .build()
            .map_err(|source| Error::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        builder.add(glob);
    }
    builder
        .build()
        .map(Some)
        .map_err(|source| Error::InvalidPattern {
            pattern: patterns.join(","),
            source,
        })
}

/// Splits a comma-separated pattern list, trimming blanks and dropping empty items.
pub fn parse_pattern_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files() -> Vec<String> {
        [
            "README.md",
            "config.json",
            "model-00001-of-00002.safetensors",
            "model-00002-of-00002.safetensors",
            "onnx/model.onnx",
            "onnx/config.json",
            "pytorch_model.bin",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_patterns_keeps_everything() {
        let filter = PatternFilter::default();
        assert_eq!(filter.apply(&files()), files());
    }

    #[test]
    fn test_include_matches_nested_paths() {
        let filter = PatternFilter::new(&strings(&["*.json"]), &[]).unwrap();
        assert_eq!(
            filter.apply(&files()),
            strings(&["config.json", "onnx/config.json"])
        );
    }

    #[test]
    fn test_exclude_only() {
        let filter = PatternFilter::new(&[], &strings(&["*.safetensors", "*.bin"])).unwrap();
        assert_eq!(
            filter.apply(&files()),
            strings(&["README.md", "config.json", "onnx/model.onnx", "onnx/config.json"])
        );
    }

    #[test]
    fn test_include_then_exclude() {
        let filter =
            PatternFilter::new(&strings(&["onnx/*", "*.md"]), &strings(&["*.json"])).unwrap();
        assert_eq!(
            filter.apply(&files()),
            strings(&["README.md", "onnx/model.onnx"])
        );
    }

    #[test]
    fn test_filter_is_order_preserving_subset_and_idempotent() {
        let filter = PatternFilter::new(&strings(&["*model*"]), &strings(&["onnx/*"])).unwrap();
        let all = files();
        let once = filter.apply(&all);
        assert!(once.iter().all(|f| all.contains(f)));
        let positions: Vec<usize> = once
            .iter()
            .map(|f| all.iter().position(|a| a == f).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(filter.apply(&once), once);
    }

    #[test]
    fn test_character_classes_and_question_mark() {
        let filter =
            PatternFilter::new(&strings(&["model-0000[1]-of-?????.safetensors"]), &[]).unwrap();
        assert_eq!(
            filter.apply(&files()),
            strings(&["model-00001-of-00002.safetensors"])
        );
    }

    #[test]
    fn test_invalid_pattern() {
        let err = PatternFilter::new(&strings(&["[unclosed"]), &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { ref pattern, .. } if pattern == "[unclosed"));
    }

    #[test]
    fn test_parse_pattern_list() {
        assert_eq!(
            parse_pattern_list(" *.json, *.md ,,"),
            strings(&["*.json", "*.md"])
        );
        assert!(parse_pattern_list("   ").is_empty());
    }
}
