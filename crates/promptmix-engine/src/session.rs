use std::collections::{HashMap, HashSet};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use promptmix_core::{Library, LibraryValue};

/// Mutable state threaded through a sequence of generation calls.
///
/// Owns the dedup set, the per-library sequential cursors, the
/// image-description cache, and the RNG. Nothing here is shared or global;
/// dropping the session discards all of it.
#[derive(Debug, Clone)]
pub struct Session {
    rng: ChaCha8Rng,
    seen: HashSet<String>,
    cursors: HashMap<String, usize>,
    describe_cache: HashMap<String, String>,
}

impl Session {
    /// Session seeded from thread-local entropy.
    pub fn new() -> Self {
        Self::from_rng(ChaCha8Rng::from_rng(&mut rand::rng()))
    }

    /// Deterministic session for reproducible batches.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_rng(rng: ChaCha8Rng) -> Self {
        Self {
            rng,
            seen: HashSet::new(),
            cursors: HashMap::new(),
            describe_cache: HashMap::new(),
        }
    }

    /// Combinations produced so far under this session's uniqueness scope.
    pub fn seen(&self) -> &HashSet<String> {
        &self.seen
    }

    /// Record a combination; returns false when it was already present.
    pub fn mark_seen(&mut self, combination: &str) -> bool {
        self.seen.insert(combination.to_string())
    }

    /// Clear the uniqueness scope at the start of a fresh batch.
    pub fn reset_dedup(&mut self) {
        self.seen.clear();
    }

    /// Take the next value of a sequential library and advance its cursor,
    /// wrapping at the end of the value list.
    pub fn next_sequential<'a>(&mut self, library: &'a Library) -> Option<&'a LibraryValue> {
        if library.values.is_empty() {
            return None;
        }
        let cursor = self.cursors.entry(library.name.clone()).or_insert(0);
        let index = *cursor % library.values.len();
        *cursor = cursor.wrapping_add(1);
        Some(&library.values[index])
    }

    pub fn cached_description(&self, url: &str) -> Option<&str> {
        self.describe_cache.get(url).map(String::as_str)
    }

    pub fn cache_description(&mut self, url: &str, description: String) {
        self.describe_cache.insert(url.to_string(), description);
    }

    pub(crate) fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_cursor_wraps() {
        let library = Library::new(
            "序列",
            vec![LibraryValue::plain("a"), LibraryValue::plain("b")],
        );
        let mut session = Session::with_seed(1);

        assert_eq!(session.next_sequential(&library).map(LibraryValue::text), Some("a"));
        assert_eq!(session.next_sequential(&library).map(LibraryValue::text), Some("b"));
        assert_eq!(session.next_sequential(&library).map(LibraryValue::text), Some("a"));
    }

    #[test]
    fn empty_sequential_library_yields_nothing() {
        let library = Library::new("空", Vec::new());
        let mut session = Session::with_seed(1);
        assert!(session.next_sequential(&library).is_none());
    }

    #[test]
    fn reset_dedup_clears_only_the_seen_set() {
        let mut session = Session::with_seed(1);
        session.mark_seen("组合");
        session.cache_description("https://example.com/a.png", "a cat".to_string());

        session.reset_dedup();
        assert!(session.seen().is_empty());
        assert_eq!(
            session.cached_description("https://example.com/a.png"),
            Some("a cat")
        );
    }
}
