//! Address similarity scoring.
//!
//! Scores are the gestalt pattern matching ratio (Ratcliff/Obershelp): find
//! the longest common block, recurse on both sides of it, and report
//! `2 * matched / total_length`. The block search follows the classic
//! sequence matcher, including its heuristic that ignores very frequent
//! characters of long second sequences when seeding matches, so scores agree
//! with the values reviewers are used to seeing.

use std::collections::HashMap;

/// Minimum score for a billing address to count as the customer's address.
pub const DEFAULT_ADDRESS_THRESHOLD: f64 = 0.8;

/// Second sequences at least this long get the popular-element heuristic.
const AUTOJUNK_MIN_LEN: usize = 200;

/// A run of equal elements: `a[a_start..a_start + size] == b[b_start..b_start + size]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingBlock {
    pub a_start: usize,
    pub b_start: usize,
    pub size: usize,
}

/// Longest-matching-block comparison of two character sequences.
#[derive(Debug, Clone)]
pub struct SequenceMatcher {
    a: Vec<char>,
    b: Vec<char>,
    /// Positions of every usable element of `b`, ascending.
    b2j: HashMap<char, Vec<usize>>,
}

impl SequenceMatcher {
    pub fn new(a: &str, b: &str) -> Self {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();

        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, ch) in b.iter().enumerate() {
            b2j.entry(*ch).or_default().push(j);
        }

        let n = b.len();
        if n >= AUTOJUNK_MIN_LEN {
            let ntest = n / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= ntest);
        }

        Self { a, b, b2j }
    }

    /// Longest matching block in `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Among blocks of maximal size, the one starting earliest in `a` wins,
    /// and of those the one starting earliest in `b`.
    fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> MatchingBlock {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0usize);

        // Length of the match ending at a[i - 1] and b[j], keyed by j.
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next_j2len: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_j2len.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = next_j2len;
        }

        // Extend with elements the popularity filter kept out of b2j.
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && self.a[best_i + best_size] == self.b[best_j + best_size]
        {
            best_size += 1;
        }

        MatchingBlock {
            a_start: best_i,
            b_start: best_j,
            size: best_size,
        }
    }

    /// All matching blocks, ordered by position.
    pub fn matching_blocks(&self) -> Vec<MatchingBlock> {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let block = self.find_longest_match(alo, ahi, blo, bhi);
            if block.size == 0 {
                continue;
            }
            let (i, j, k) = (block.a_start, block.b_start, block.size);
            blocks.push(block);
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }

        blocks.sort_by_key(|block| (block.a_start, block.b_start));
        blocks
    }

    /// Similarity in `[0, 1]`; two empty sequences are identical.
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        let matched: usize = self.matching_blocks().iter().map(|b| b.size).sum();
        2.0 * matched as f64 / total as f64
    }
}

/// Case-insensitive similarity of two strings.
///
/// Only case is folded; punctuation and whitespace count as written.
pub fn similarity(a: &str, b: &str) -> f64 {
    SequenceMatcher::new(&a.to_lowercase(), &b.to_lowercase()).ratio()
}

/// Applies the match threshold (inclusive).
pub fn is_address_match(score: f64, threshold: f64) -> bool {
    score >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    #[test]
    fn test_identical_and_empty() {
        assert_eq!(similarity("Oslo, 0150, Norway", "oslo, 0150, norway"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("abc", ""), 0.0);
    }

    #[test]
    fn test_known_ratios() {
        assert!(approx(similarity("abcd", "bcde"), 0.75));
        assert!(approx(similarity("abcde", "abcdx"), 0.8));
        assert!(approx(
            similarity(
                "private Thread currentThread;",
                "private volatile Thread currentThread;"
            ),
            58.0 / 67.0
        ));
    }

    #[test]
    fn test_matching_blocks_prefer_earliest() {
        let matcher = SequenceMatcher::new("abxab", "ab");
        assert_eq!(
            matcher.matching_blocks(),
            vec![MatchingBlock {
                a_start: 0,
                b_start: 0,
                size: 2
            }]
        );
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let score = similarity("abcde", "abcdx");
        assert!(is_address_match(score, DEFAULT_ADDRESS_THRESHOLD));
        assert!(!is_address_match(0.79999, DEFAULT_ADDRESS_THRESHOLD));
        assert!(!is_address_match(similarity("abcd", "bcde"), DEFAULT_ADDRESS_THRESHOLD));
    }

    #[test]
    fn test_long_identical_strings() {
        let address = "Strandveien 50, 1366 Lysaker, Norway; ".repeat(8);
        assert!(address.chars().count() >= AUTOJUNK_MIN_LEN);
        assert_eq!(similarity(&address, &address), 1.0);
    }

    proptest! {
        #[test]
        fn ratio_stays_in_unit_interval(a in "\\PC{0,40}", b in "\\PC{0,40}") {
            let score = similarity(&a, &b);
            prop_assert!((0.0..=1.0).contains(&score));
        }

        #[test]
        fn string_matches_itself(a in "[a-zA-Z0-9 ,.]{1,60}") {
            prop_assert_eq!(similarity(&a, &a), 1.0);
        }
    }
}
