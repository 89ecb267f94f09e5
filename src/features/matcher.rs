//! Brute-force Hamming matching with cross-check

use crate::features::Descriptor;

/// A mutually consistent correspondence between two descriptor sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorMatch {
    /// Index into the query set
    pub query: usize,
    /// Index into the train set
    pub train: usize,
    pub distance: u32,
}

/// Index of the nearest `train` descriptor for every `query` descriptor
///
/// Equal distances resolve to the lowest train index.
fn nearest(query: &[Descriptor], train: &[Descriptor]) -> Vec<(usize, u32)> {
    query
        .iter()
        .map(|q| {
            let mut best = (0usize, u32::MAX);
            for (index, t) in train.iter().enumerate() {
                let distance = q.hamming(t);
                if distance < best.1 {
                    best = (index, distance);
                }
            }
            best
        })
        .collect()
}

/// Matches where each descriptor is the other's nearest neighbour
pub fn cross_check_matches(query: &[Descriptor], train: &[Descriptor]) -> Vec<DescriptorMatch> {
    if query.is_empty() || train.is_empty() {
        return Vec::new();
    }

    let forward = nearest(query, train);
    let backward = nearest(train, query);

    forward
        .into_iter()
        .enumerate()
        .filter(|&(query_index, (train_index, _))| backward[train_index].0 == query_index)
        .map(|(query_index, (train_index, distance))| DescriptorMatch {
            query: query_index,
            train: train_index,
            distance,
        })
        .collect()
}

/// Number of cross-checked matches; the classifier's match score
pub fn cross_check_count(query: &[Descriptor], train: &[Descriptor]) -> u32 {
    cross_check_matches(query, train).len() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(bits: u64) -> Descriptor {
        Descriptor([bits, 0, 0, 0])
    }

    #[test]
    fn test_identical_sets_match_fully() {
        let set = vec![d(0b0001), d(0b1110_0000), d(u64::MAX)];
        let matches = cross_check_matches(&set, &set);
        assert_eq!(matches.len(), 3);
        assert!(matches.iter().all(|m| m.query == m.train && m.distance == 0));
    }

    #[test]
    fn test_non_mutual_match_is_rejected() {
        // Both query descriptors are nearest to train[0], but train[0] only
        // points back at query[0].
        let query = vec![d(0b0000), d(0b0011)];
        let train = vec![d(0b0001), d(u64::MAX)];

        let matches = cross_check_matches(&query, &train);
        assert_eq!(
            matches,
            vec![DescriptorMatch {
                query: 0,
                train: 0,
                distance: 1
            }]
        );
    }

    #[test]
    fn test_ties_resolve_to_lowest_index() {
        let query = vec![d(0b0000)];
        let train = vec![d(0b0001), d(0b0010)];
        let matches = cross_check_matches(&query, &train);
        assert_eq!(matches[0].train, 0);
    }

    #[test]
    fn test_empty_sets() {
        assert_eq!(cross_check_count(&[], &[d(1)]), 0);
        assert_eq!(cross_check_count(&[d(1)], &[]), 0);
    }

    #[test]
    fn test_count_is_symmetric() {
        let a = vec![d(0b0001), d(0b0110), d(0b1000_0000), d(0xFF00)];
        let b = vec![d(0b0011), d(0xF000), d(0b0100)];
        assert_eq!(cross_check_count(&a, &b), cross_check_count(&b, &a));
    }
}
