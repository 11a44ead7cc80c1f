use indexmap::IndexMap;

use crate::error::ProjectionError;
use crate::model::PriceSeries;
use crate::pattern::encoder::{encode, Movement};

pub const DEFAULT_MIN_PATTERN_LEN: usize = 6;
pub const DEFAULT_MAX_PATTERN_LEN: usize = 8;

/// Candidate offsets (into the most-recent-first view) mapped to the pattern
/// length that matched there, longest lengths first.
pub type Candidates = IndexMap<usize, usize>;

/// Every start offset of `needle` in `haystack`, overlaps included.
pub fn occurrences(haystack: &[Movement], needle: &[Movement]) -> Vec<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return Vec::new();
    }
    haystack
        .windows(needle.len())
        .enumerate()
        .filter_map(|(i, w)| (w == needle).then_some(i))
        .collect()
}

/// Search a most-recent-first movement string for repeats of its own prefix.
pub fn locate_in(recent_first: &[Movement], min_len: usize, max_len: usize) -> Candidates {
    let mut candidates = Candidates::new();
    let min_len = min_len.max(1);
    // lengths beyond the string cannot match
    let max_len = max_len.min(recent_first.len());
    if min_len > max_len {
        return candidates;
    }
    for len in (min_len..=max_len).rev() {
        let hits = occurrences(recent_first, &recent_first[..len]);
        // offset 0 is the pattern itself
        if hits.len() > 2 {
            for &offset in &hits[1..] {
                candidates.entry(offset).or_insert(len);
            }
        }
    }
    candidates
}

pub fn locate(
    series: &PriceSeries,
    min_len: usize,
    max_len: usize,
) -> Result<Candidates, ProjectionError> {
    let moves = encode(series)?.reversed();
    Ok(locate_in(moves.as_slice(), min_len, max_len))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moves(s: &str) -> Vec<Movement> {
        s.chars()
            .map(|c| match c {
                'U' => Movement::Up,
                _ => Movement::Down,
            })
            .collect()
    }

    #[test]
    fn occurrences_include_overlaps() {
        assert_eq!(occurrences(&moves("UUUU"), &moves("UU")), vec![0, 1, 2]);
        assert_eq!(occurrences(&moves("UDUDU"), &moves("UDU")), vec![0, 2]);
        assert!(occurrences(&moves("UD"), &moves("UDU")).is_empty());
    }

    #[test]
    fn two_occurrences_are_not_enough() {
        // prefix "UUD" occurs at 0 and 5 only
        let found = locate_in(&moves("UUDDDUUDD"), 3, 3);
        assert!(found.is_empty());
    }

    #[test]
    fn longest_length_wins_per_offset() {
        let r = moves("UDUDUDUDUDUD");
        let found = locate_in(&r, 2, 4);
        // length 4 registers 2, 4, 6, 8; length 2 adds 10 but keeps earlier lengths
        let expected: Vec<(usize, usize)> = vec![(2, 4), (4, 4), (6, 4), (8, 4), (10, 2)];
        assert_eq!(found.into_iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn self_match_is_never_registered() {
        let found = locate_in(&moves("UUUUUUUUUUUU"), 1, 6);
        assert!(!found.contains_key(&0));
        assert_eq!(found.get(&1), Some(&6));
    }

    #[test]
    fn unbounded_max_length_is_capped_to_the_string() {
        let r = moves("UDUDUDUDUDUD");
        assert_eq!(locate_in(&r, 2, usize::MAX), locate_in(&r, 2, r.len()));
        assert!(locate_in(&r, usize::MAX, usize::MAX).is_empty());
    }

    #[test]
    fn inverted_range_finds_nothing() {
        assert!(locate_in(&moves("UUUUUUUU"), 5, 3).is_empty());
    }
}
