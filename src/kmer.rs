use std::collections::HashMap;

/// Exact k-mer match between query and reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KmerMatch {
    pub query_pos: usize,
    pub ref_pos: usize,
    pub len: usize,
}

/// All exact k-mer matches between query and reference, ordered by query
/// position, then by reference position. An unusable k (zero, or longer than
/// either sequence) yields no matches.
pub fn find_exact_matches(query: &[u8], reference: &[u8], k: usize) -> Vec<KmerMatch> {
    if k == 0 || k > reference.len() || k > query.len() {
        return vec![];
    }

    let mut index: HashMap<&[u8], Vec<usize>> = HashMap::new();
    for (ref_pos, kmer) in reference.windows(k).enumerate() {
        index.entry(kmer).or_default().push(ref_pos);
    }

    let mut matches = vec![];
    for (query_pos, kmer) in query.windows(k).enumerate() {
        if let Some(positions) = index.get(kmer) {
            for &ref_pos in positions {
                matches.push(KmerMatch {
                    query_pos,
                    ref_pos,
                    len: k,
                });
            }
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_exact_matches() {
        let matches = find_exact_matches(b"ACGTACG", b"TACGT", 3);
        let expected = [(0, 1), (1, 2), (3, 0), (4, 1)];
        assert_eq!(matches.len(), expected.len());
        for (m, (query_pos, ref_pos)) in matches.iter().zip(expected) {
            assert_eq!((m.query_pos, m.ref_pos, m.len), (query_pos, ref_pos, 3));
        }
    }

    #[test]
    fn test_repeated_kmer_positions_are_sorted() {
        let matches = find_exact_matches(b"AAA", b"AAAAA", 3);
        let ref_positions: Vec<usize> = matches.iter().map(|m| m.ref_pos).collect();
        assert_eq!(ref_positions, [0, 1, 2]);
    }

    #[test]
    fn test_invalid_k() {
        assert!(find_exact_matches(b"ACGT", b"ACGT", 0).is_empty());
        assert!(find_exact_matches(b"ACGT", b"ACGT", 5).is_empty());
        assert!(find_exact_matches(b"AC", b"ACGT", 3).is_empty());
        assert!(find_exact_matches(b"ACGT", b"AC", 3).is_empty());
    }

    #[test]
    fn test_no_matches() {
        assert!(find_exact_matches(b"AAAA", b"CCCC", 2).is_empty());
    }
}
