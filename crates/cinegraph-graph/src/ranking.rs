//! Aggregation and ranking of traversal results.
//!
//! Two shapes of output are supported. [`aggregate_and_rank`] collapses
//! candidates into one score per group (popularity). [`collect_provenance`]
//! keeps every (group, contributor, degree) triple so callers can show who
//! led to each result and how closely.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A group and its score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranked<G> {
    pub group: G,
    pub score: usize,
}

/// Groups candidates and scores each group by its number of distinct
/// contributors.
///
/// `group_key` maps a candidate to `(group, contributor)`. A contributor
/// seen several times for the same group counts once. Results are ordered
/// by score descending, then group ascending, and cut to `limit`.
pub fn aggregate_and_rank<T, G, C, F>(
    candidates: impl IntoIterator<Item = T>,
    group_key: F,
    limit: usize,
) -> Vec<Ranked<G>>
where
    F: Fn(&T) -> (G, C),
    G: Ord,
    C: Ord,
{
    let mut groups: BTreeMap<G, BTreeSet<C>> = BTreeMap::new();
    for candidate in candidates {
        let (group, contributor) = group_key(&candidate);
        groups.entry(group).or_default().insert(contributor);
    }

    let mut ranked: Vec<Ranked<G>> = groups
        .into_iter()
        .map(|(group, contributors)| Ranked {
            group,
            score: contributors.len(),
        })
        .collect();

    // Stable sort: score desc → group asc
    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.group.cmp(&b.group))
    });
    ranked.truncate(limit);

    ranked
}

/// One way a group was reached: through which contributor, at what degree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Provenance<G, P> {
    pub group: G,
    pub contributor: P,
    pub degree: u32,
}

/// Deduplicates triples and orders them by (group, contributor, degree).
pub fn collect_provenance<G, P>(
    triples: impl IntoIterator<Item = (G, P, u32)>,
) -> Vec<Provenance<G, P>>
where
    G: Ord,
    P: Ord,
{
    triples
        .into_iter()
        .map(|(group, contributor, degree)| Provenance {
            group,
            contributor,
            degree,
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_contributors_counted_once() {
        let pairs = vec![
            ("F1", "Heat"),
            ("F1", "Heat"),
            ("F2", "Heat"),
            ("F1", "Ronin"),
        ];

        let ranked = aggregate_and_rank(pairs, |(friend, movie)| (*movie, *friend), 10);
        assert_eq!(
            ranked,
            vec![
                Ranked { group: "Heat", score: 2 },
                Ranked { group: "Ronin", score: 1 },
            ]
        );
    }

    #[test]
    fn test_ties_broken_by_group() {
        let pairs = vec![("F1", "Zodiac"), ("F2", "Alien"), ("F3", "Memento")];

        let ranked = aggregate_and_rank(pairs, |(friend, movie)| (*movie, *friend), 10);
        let order: Vec<&str> = ranked.iter().map(|r| r.group).collect();
        assert_eq!(order, vec!["Alien", "Memento", "Zodiac"]);
    }

    #[test]
    fn test_limit_truncates() {
        let pairs: Vec<(u32, u32)> = (0..25).map(|i| (i, i)).collect();
        let ranked = aggregate_and_rank(pairs, |(friend, movie)| (*movie, *friend), 10);
        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].group, 0);
    }

    #[test]
    fn test_provenance_ordered_and_deduplicated() {
        let triples = vec![
            ("Ronin", "bob", 1),
            ("Heat", "dan", 2),
            ("Heat", "bob", 1),
            ("Heat", "bob", 1),
        ];

        let rows = collect_provenance(triples);
        let flat: Vec<(&str, &str, u32)> = rows
            .iter()
            .map(|p| (p.group, p.contributor, p.degree))
            .collect();
        assert_eq!(
            flat,
            vec![("Heat", "bob", 1), ("Heat", "dan", 2), ("Ronin", "bob", 1)]
        );
    }

    #[test]
    fn test_empty_input() {
        let ranked = aggregate_and_rank(Vec::<(u8, u8)>::new(), |p| *p, 10);
        assert!(ranked.is_empty());
        assert!(collect_provenance(Vec::<(u8, u8, u32)>::new()).is_empty());
    }
}
