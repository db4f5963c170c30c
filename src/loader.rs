//! Discovers and reads the JSON shards of the organization export.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::info;

use crate::organization::OrganizationRecord;

/// Default file-name pattern for registry export shards.
pub const DEFAULT_SHARD_PATTERN: &str = "organizations_part_*.json";

/// Glob matched against the file names of a single directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardPattern(Pattern);

impl ShardPattern {
    /// Compiles a glob such as `organizations_part_*.json`.
    ///
    /// The pattern applies to bare file names, so path separators are rejected.
    pub fn new(pattern: &str) -> Result<Self, LoadError> {
        let pattern = pattern.trim();
        if pattern.is_empty() || pattern.contains(['/', '\\']) {
            return Err(LoadError::InvalidPattern(
                pattern.to_string(),
                "expected a file name glob".to_string(),
            ));
        }
        Pattern::new(pattern)
            .map(Self)
            .map_err(|err| LoadError::InvalidPattern(pattern.to_string(), err.to_string()))
    }

    /// Whether `file_name` matches the pattern.
    pub fn matches(&self, file_name: &str) -> bool {
        self.0.matches(file_name)
    }

    /// The glob as written.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for ShardPattern {
    fn default() -> Self {
        // DEFAULT_SHARD_PATTERN is a well-formed glob.
        Self(Pattern::new(DEFAULT_SHARD_PATTERN).unwrap_or_default())
    }
}

/// Failures while locating or reading shards. All of them are fatal for a run.
#[derive(Debug)]
pub enum LoadError {
    /// The shard pattern was empty, contained a path separator, or is not a valid glob.
    InvalidPattern(String, String),
    /// The input directory does not exist or is not a directory.
    MissingDirectory(PathBuf),
    /// The directory holds no file matching the pattern.
    NoShards(PathBuf),
    /// A directory or shard could not be read.
    Io(PathBuf, io::Error),
    /// A shard is not a JSON array of organization objects.
    Parse(PathBuf, serde_json::Error),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::InvalidPattern(pattern, reason) => {
                write!(f, "invalid shard pattern {pattern:?}: {reason}")
            }
            LoadError::MissingDirectory(dir) => {
                write!(f, "input directory {} does not exist", dir.display())
            }
            LoadError::NoShards(dir) => write!(f, "no JSON shards found in {}", dir.display()),
            LoadError::Io(path, err) => write!(f, "failed to read {}: {err}", path.display()),
            LoadError::Parse(path, err) => {
                write!(f, "invalid organization shard {}: {err}", path.display())
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(_, err) => Some(err),
            LoadError::Parse(_, err) => Some(err),
            _ => None,
        }
    }
}

/// Lists the shards in `dir` matching `pattern`, sorted by file name.
pub fn discover_shards(dir: &Path, pattern: &ShardPattern) -> Result<Vec<PathBuf>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::MissingDirectory(dir.to_path_buf()));
    }
    let entries = fs::read_dir(dir).map_err(|err| LoadError::Io(dir.to_path_buf(), err))?;

    let mut shards = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| LoadError::Io(dir.to_path_buf(), err))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matched = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| pattern.matches(name));
        if matched {
            shards.push(path);
        }
    }

    if shards.is_empty() {
        return Err(LoadError::NoShards(dir.to_path_buf()));
    }
    shards.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(shards)
}

/// Reads one shard: a JSON array of organization objects.
pub fn read_shard(path: &Path) -> Result<Vec<OrganizationRecord>, LoadError> {
    let bytes = fs::read(path).map_err(|err| LoadError::Io(path.to_path_buf(), err))?;
    serde_json::from_slice(&bytes).map_err(|err| LoadError::Parse(path.to_path_buf(), err))
}

/// Loads every matching shard in `dir` and concatenates them in file-name order.
pub fn load_shards(dir: &Path, pattern: &ShardPattern) -> Result<Vec<OrganizationRecord>, LoadError> {
    let shards = discover_shards(dir, pattern)?;
    let mut organizations = Vec::new();
    for shard in &shards {
        let records = read_shard(shard)?;
        info!(
            shard = %shard.display(),
            records = records.len(),
            "loaded organization shard"
        );
        organizations.extend(records);
    }
    Ok(organizations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_pattern_matches_prefix_and_suffix() {
        let pattern = ShardPattern::new(DEFAULT_SHARD_PATTERN).expect("pattern");
        assert_eq!(pattern, ShardPattern::default());
        assert!(pattern.matches("organizations_part_001.json"));
        assert!(pattern.matches("organizations_part_.json"));
        assert!(!pattern.matches("organizations_part_001.json.bak"));
        assert!(!pattern.matches("people_part_001.json"));
    }

    #[test]
    fn literal_pattern_requires_exact_name() {
        let pattern = ShardPattern::new("orgs.json").expect("pattern");
        assert!(pattern.matches("orgs.json"));
        assert!(!pattern.matches("orgs.json.gz"));
    }

    #[test]
    fn several_wildcards_are_accepted() {
        let pattern = ShardPattern::new("organizations_part_*_*.json").expect("pattern");
        assert!(pattern.matches("organizations_part_2024_001.json"));
        assert!(!pattern.matches("organizations_part_001.json"));
    }

    #[test]
    fn question_mark_matches_one_character() {
        let pattern = ShardPattern::new("organizations_part_?.json").expect("pattern");
        assert!(pattern.matches("organizations_part_1.json"));
        assert!(!pattern.matches("organizations_part_12.json"));
        assert!(!pattern.matches("organizations_part_?x.json"));
    }

    #[test]
    fn character_classes_are_honoured() {
        let pattern = ShardPattern::new("organizations_part_[0-4]*.json").expect("pattern");
        assert!(pattern.matches("organizations_part_3.json"));
        assert!(!pattern.matches("organizations_part_7.json"));
    }

    #[test]
    fn rejects_bad_patterns() {
        assert!(matches!(
            ShardPattern::new("organizations_part_[.json"),
            Err(LoadError::InvalidPattern(_, _))
        ));
        assert!(matches!(
            ShardPattern::new("dir/*.json"),
            Err(LoadError::InvalidPattern(_, _))
        ));
        assert!(matches!(
            ShardPattern::new("  "),
            Err(LoadError::InvalidPattern(_, _))
        ));
    }

    #[test]
    fn missing_directory_is_reported() {
        let err = discover_shards(Path::new("/definitely/not/here"), &ShardPattern::default())
            .expect_err("missing dir");
        assert!(matches!(err, LoadError::MissingDirectory(_)));
        assert!(err.to_string().contains("/definitely/not/here"));
    }
}
