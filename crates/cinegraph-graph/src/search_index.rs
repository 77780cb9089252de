//! Search index for case-insensitive substring matching over review text.
//!
//! Reviews are broken into overlapping n-grams so a keyword lookup only
//! touches reviews sharing every n-gram of the keyword, instead of scanning
//! all review text.

use crate::graph::NodeId;
use std::collections::{HashMap, HashSet};

/// Minimum n-gram length for indexing.
const MIN_NGRAM_LEN: usize = 2;

/// Maximum n-gram length for indexing.
const MAX_NGRAM_LEN: usize = 4;

/// An inverted n-gram index from text fragments to nodes.
#[derive(Debug, Default, Clone)]
pub struct SearchIndex {
    /// Lowercased full text per node, used to confirm candidate matches.
    texts: HashMap<NodeId, String>,
    /// Maps lowercased n-grams to the nodes whose text contains them.
    ngram_index: HashMap<String, HashSet<NodeId>>,
}

impl SearchIndex {
    /// Creates a new empty search index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes a node's text, replacing anything indexed for it before.
    pub fn insert(&mut self, text: &str, id: NodeId) {
        self.remove(id);

        let lower = text.to_lowercase();
        for ngram in generate_ngrams(&lower) {
            self.ngram_index.entry(ngram).or_default().insert(id);
        }
        self.texts.insert(id, lower);
    }

    /// Removes a node from the index.
    pub fn remove(&mut self, id: NodeId) {
        let Some(lower) = self.texts.remove(&id) else {
            return;
        };

        for ngram in generate_ngrams(&lower) {
            if let Some(ids) = self.ngram_index.get_mut(&ngram) {
                ids.remove(&id);
                if ids.is_empty() {
                    self.ngram_index.remove(&ngram);
                }
            }
        }
    }

    /// Finds nodes whose text contains `query`, ignoring case.
    ///
    /// Returns matching NodeIds sorted for deterministic output.
    pub fn search(&self, query: &str) -> Vec<NodeId> {
        let query_lower = query.to_lowercase();
        if query_lower.is_empty() {
            return Vec::new();
        }

        // Too short to have n-grams: scan every text.
        if query_lower.chars().count() < MIN_NGRAM_LEN {
            let mut results: Vec<NodeId> = self
                .texts
                .iter()
                .filter(|(_, text)| text.contains(&query_lower))
                .map(|(id, _)| *id)
                .collect();
            results.sort();
            return results;
        }

        let mut candidates: Option<HashSet<NodeId>> = None;
        for ngram in generate_ngrams(&query_lower) {
            match self.ngram_index.get(&ngram) {
                Some(ids) => match &mut candidates {
                    None => candidates = Some(ids.clone()),
                    Some(c) => c.retain(|id| ids.contains(id)),
                },
                None => return Vec::new(),
            }
        }

        // Shared n-grams do not guarantee a contiguous match.
        let mut results: Vec<NodeId> = candidates
            .unwrap_or_default()
            .into_iter()
            .filter(|id| {
                self.texts
                    .get(id)
                    .is_some_and(|text| text.contains(&query_lower))
            })
            .collect();

        results.sort();
        results
    }
}

/// Generates n-grams for a lowercased string.
fn generate_ngrams(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut ngrams = Vec::new();

    for n in MIN_NGRAM_LEN..=MAX_NGRAM_LEN {
        if chars.len() >= n {
            for i in 0..=(chars.len() - n) {
                ngrams.push(chars[i..i + n].iter().collect());
            }
        }
    }

    ngrams
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::graph::NodeIndex;

    fn node_id(n: u32) -> NodeId {
        NodeIndex::new(n as usize)
    }

    #[test]
    fn test_search_case_insensitive() {
        let mut index = SearchIndex::new();
        index.insert("Great movie!", node_id(0));
        index.insert("Not for me", node_id(1));

        assert_eq!(index.search("great"), vec![node_id(0)]);
        assert_eq!(index.search("GREAT"), vec![node_id(0)]);
    }

    #[test]
    fn test_search_middle_substring() {
        let mut index = SearchIndex::new();
        index.insert("An unforgettable ending", node_id(0));

        assert_eq!(index.search("forget"), vec![node_id(0)]);
    }

    #[test]
    fn test_scattered_ngrams_do_not_match() {
        let mut index = SearchIndex::new();
        // Contains "gr", "re", "ea", "at" but never "great".
        index.insert("grey area at dusk", node_id(0));

        assert!(index.search("great").is_empty());
    }

    #[test]
    fn test_reinsert_replaces_text() {
        let mut index = SearchIndex::new();
        index.insert("boring", node_id(0));
        index.insert("thrilling", node_id(0));

        assert!(index.search("boring").is_empty());
        assert_eq!(index.search("thrill"), vec![node_id(0)]);
        assert_eq!(index.search("t"), vec![node_id(0)]);
    }

    #[test]
    fn test_remove_from_index() {
        let mut index = SearchIndex::new();
        index.insert("good fun", node_id(0));
        index.insert("good grief", node_id(1));

        index.remove(node_id(0));

        assert_eq!(index.search("good"), vec![node_id(1)]);
    }

    #[test]
    fn test_single_char_query_scans() {
        let mut index = SearchIndex::new();
        index.insert("a classic", node_id(0));
        index.insert("xyz", node_id(1));

        assert_eq!(index.search("c"), vec![node_id(0)]);
    }

    #[test]
    fn test_search_no_match() {
        let mut index = SearchIndex::new();
        index.insert("hello", node_id(0));

        assert!(index.search("world").is_empty());
        assert!(index.search("").is_empty());
    }
}
