//! Anchor chaining as a longest path through a query-ordered DAG

use crate::anchor::Anchor;

/// Edge in the chaining DAG; the weight is the score of the target anchor
#[derive(Debug, Clone, Copy)]
struct Edge {
    to: usize,
    weight: f64,
}

/// Select the maximum-weight collinear subset of anchors.
///
/// The DAG has a source node, one node per anchor (anchors must be sorted by
/// query start) and a sink node. An edge connects anchor u to anchor v iff u
/// ends strictly before v starts in query coordinates, so the graph is
/// acyclic by construction. Returns the indices of the anchors on the best
/// source-to-sink path, in query order. Ties are resolved in favor of the
/// first relaxation: a predecessor is only replaced on strict improvement.
pub fn chain_anchors(anchors: &[Anchor]) -> Vec<usize> {
    let n = anchors.len();
    if n == 0 {
        return vec![];
    }
    // node ids: 0 = source, 1..=n = anchors, n + 1 = sink
    let source = 0;
    let sink = n + 1;

    let mut edges: Vec<Vec<Edge>> = vec![Vec::new(); n + 2];
    edges[source] = (0..n)
        .map(|i| Edge {
            to: i + 1,
            weight: anchors[i].score,
        })
        .collect();
    for i in 0..n {
        for j in i + 1..n {
            if anchors[j].query_start > anchors[i].query_end {
                edges[i + 1].push(Edge {
                    to: j + 1,
                    weight: anchors[j].score,
                });
            }
        }
        edges[i + 1].push(Edge {
            to: sink,
            weight: 0.0,
        });
    }

    // Longest-path DP in topological order (node ids are already topological)
    let mut dist = vec![f64::NEG_INFINITY; n + 2];
    let mut pred: Vec<Option<usize>> = vec![None; n + 2];
    dist[source] = 0.0;
    for u in 0..n + 2 {
        if dist[u] == f64::NEG_INFINITY {
            continue;
        }
        for edge in &edges[u] {
            if dist[u] + edge.weight > dist[edge.to] {
                dist[edge.to] = dist[u] + edge.weight;
                pred[edge.to] = Some(u);
            }
        }
    }

    let mut path = Vec::new();
    let mut node = sink;
    while let Some(p) = pred[node] {
        if p != source {
            path.push(p - 1);
        }
        node = p;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::Orientation;

    fn anchor(query_start: usize, query_end: usize, score: f64) -> Anchor {
        Anchor {
            query_start,
            query_end,
            ref_start: query_start,
            ref_end: query_end,
            score,
            identity: 1.0,
            orientation: Orientation::Forward,
        }
    }

    #[test]
    fn test_empty() {
        assert!(chain_anchors(&[]).is_empty());
    }

    #[test]
    fn test_single_anchor() {
        assert_eq!(chain_anchors(&[anchor(0, 9, 10.0)]), [0]);
    }

    #[test]
    fn test_two_disjoint_anchors_are_chained() {
        let anchors = [anchor(0, 9, 10.0), anchor(20, 29, 10.0)];
        assert_eq!(chain_anchors(&anchors), [0, 1]);
    }

    #[test]
    fn test_overlap_forces_choice_of_heavier_anchor() {
        let anchors = [anchor(0, 9, 10.0), anchor(5, 14, 12.0), anchor(20, 29, 5.0)];
        // the best path takes the overlapping anchor with the higher score
        assert_eq!(chain_anchors(&anchors), [1, 2]);
    }

    #[test]
    fn test_adjacent_anchors_are_not_chained() {
        // query_end == query_start of the successor is still an overlap
        let anchors = [anchor(0, 10, 10.0), anchor(10, 20, 10.0)];
        assert_eq!(chain_anchors(&anchors), [0]);
    }

    #[test]
    fn test_tie_keeps_first_relaxation() {
        let anchors = [anchor(0, 9, 10.0), anchor(0, 9, 10.0)];
        assert_eq!(chain_anchors(&anchors), [0]);
    }

    #[test]
    fn test_path_is_strictly_increasing_in_query() {
        let anchors = [
            anchor(0, 50, 30.0),
            anchor(40, 90, 45.0),
            anchor(60, 100, 20.0),
            anchor(120, 200, 60.0),
        ];
        let path = chain_anchors(&anchors);
        for pair in path.windows(2) {
            assert!(anchors[pair[0]].query_end < anchors[pair[1]].query_start);
        }
    }
}
