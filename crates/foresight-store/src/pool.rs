//! The fixed list of foresight texts.

use foresight_core::error::ForesightError;
use std::path::Path;
use tracing::info;

/// Immutable, non-empty, ordered list of foresight texts.
#[derive(Debug, Clone)]
pub struct ForesightPool {
    entries: Vec<String>,
}

impl ForesightPool {
    /// Read a newline-delimited file, one foresight per line.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ForesightError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ForesightError::Pool(format!("failed to read {}: {e}", path.display()))
        })?;
        let pool = Self::from_text(&content)?;
        info!("Loaded {} foresights from {}", pool.len(), path.display());
        Ok(pool)
    }

    /// Build a pool from raw text. Blank lines (including a trailing one) are dropped.
    pub fn from_text(text: &str) -> Result<Self, ForesightError> {
        Self::from_entries(text.split('\n'))
    }

    /// Build a pool from individual entries, skipping blank ones.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, ForesightError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries: Vec<String> = entries
            .into_iter()
            .map(|e| e.as_ref().trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();

        if entries.is_empty() {
            return Err(ForesightError::EmptyPool);
        }
        Ok(Self { entries })
    }

    /// Text at `index`.
    ///
    /// Indices only ever come from the assignment store, which validates them
    /// against [`len`](Self::len), so an out-of-range index is a bug.
    pub fn get(&self, index: usize) -> &str {
        assert!(
            index < self.entries.len(),
            "foresight index {index} out of range for pool of {}",
            self.entries.len()
        );
        &self.entries[index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: an empty pool cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_splits_lines() {
        let pool = ForesightPool::from_text("one\ntwo\nthree").unwrap();
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.get(0), "one");
        assert_eq!(pool.get(2), "three");
    }

    #[test]
    fn test_trailing_newline_and_blank_lines_dropped() {
        let pool = ForesightPool::from_text("one\n\n  \ntwo\n").unwrap();
        assert_eq!(pool.iter().collect::<Vec<_>>(), vec!["one", "two"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let pool = ForesightPool::from_text("alpha\r\nbeta\r\n").unwrap();
        assert_eq!(pool.get(0), "alpha");
        assert_eq!(pool.get(1), "beta");
    }

    #[test]
    fn test_empty_text_is_empty_pool() {
        assert!(matches!(
            ForesightPool::from_text(""),
            Err(ForesightError::EmptyPool)
        ));
        assert!(matches!(
            ForesightPool::from_text("\n\n \n"),
            Err(ForesightError::EmptyPool)
        ));
    }

    #[test]
    fn test_from_entries() {
        let pool = ForesightPool::from_entries(["a", "", "b"]).unwrap();
        assert_eq!(pool.len(), 2);
        assert!(!pool.is_empty());
    }

    #[test]
    fn test_last_index_is_valid() {
        let pool = ForesightPool::from_entries(["x", "y", "z"]).unwrap();
        assert_eq!(pool.get(2), "z");
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_panics() {
        let pool = ForesightPool::from_entries(["x", "y", "z"]).unwrap();
        let _ = pool.get(3);
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let err = ForesightPool::load(tmp.path().join("foresights")).unwrap_err();
        assert!(matches!(err, ForesightError::Pool(_)));
    }

    #[test]
    fn test_load_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("foresights");
        std::fs::write(&path, "Good luck\nStay home\n").unwrap();
        let pool = ForesightPool::load(&path).unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(1), "Stay home");
    }

    #[test]
    fn test_load_empty_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("foresights");
        std::fs::write(&path, "\n").unwrap();
        assert!(matches!(
            ForesightPool::load(&path),
            Err(ForesightError::EmptyPool)
        ));
    }
}
