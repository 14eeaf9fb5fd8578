use arbores_arg::{GenomeData, PathState};
use arbores_core::errors::{ArgError, ErrorInfo};
use serde::{Deserialize, Serialize};

/// Ordered partition of the genome into the windows scanned by the segment
/// sampler.
///
/// Segregating sites `target_len`, `2 * target_len`, ... (counted from zero)
/// open new windows, so each segment carries `target_len` informative sites
/// except possibly the last. The first window starts at
/// site 0 and the last one ends at `n_sites`; together they cover the genome
/// without gaps or overlaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeSegmentation {
    points: Vec<usize>,
}

impl BridgeSegmentation {
    /// Splits the site range of `path` using the segregating sites of `data`.
    pub fn segment(
        path: &PathState,
        data: &GenomeData,
        target_len: usize,
    ) -> Result<Self, ArgError> {
        if target_len == 0 {
            return Err(ArgError::Config(
                ErrorInfo::new("invalid-config", "segments must span at least one site")
                    .with_context("field", "bridge_length"),
            ));
        }
        let n_sites = path.n_sites();
        let mut points = vec![0];
        points.extend(
            data.segregating_sites()
                .iter()
                .copied()
                .enumerate()
                .filter(|&(rank, site)| rank > 0 && rank % target_len == 0 && site < n_sites)
                .map(|(_, site)| site),
        );
        points.push(n_sites.max(1));
        Ok(Self { points })
    }

    /// Boundary markers, starting at 0 and ending at the site count.
    pub fn points(&self) -> &[usize] {
        &self.points
    }

    /// Number of segments.
    pub fn segment_count(&self) -> usize {
        self.points.len() - 1
    }

    /// Half-open site window `[start, end)` of segment `index`.
    pub fn window(&self, index: usize) -> (usize, usize) {
        (self.points[index], self.points[index + 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbores_arg::LocalTree;

    fn data(columns: &[[u8; 3]]) -> GenomeData {
        let matrix: Vec<Vec<u8>> = (0..3)
            .map(|row| columns.iter().map(|column| column[row]).collect())
            .collect();
        GenomeData::new("toy", vec!["a".into(), "b".into(), "c".into()], matrix).unwrap()
    }

    fn path(n_sites: usize) -> PathState {
        PathState::from_tree(n_sites, LocalTree::caterpillar(&[0, 1, 2], &[0.5, 1.0]))
    }

    #[test]
    fn windows_cover_the_genome() {
        let columns = [[1, 0, 0], [0, 0, 0], [1, 1, 0], [0, 1, 0], [0, 0, 0], [1, 0, 1]];
        let genome = data(&columns);
        let bridges = BridgeSegmentation::segment(&path(6), &genome, 2).unwrap();
        // segregating sites 0, 2, 3, 5
        assert_eq!(bridges.points(), &[0, 3, 6]);
        assert_eq!(bridges.segment_count(), 2);
        assert_eq!(bridges.window(1), (3, 6));
        let single = BridgeSegmentation::segment(&path(6), &genome, 1).unwrap();
        assert_eq!(single.points(), &[0, 2, 3, 5, 6]);
    }

    #[test]
    fn monomorphic_data_is_one_segment() {
        let genome = data(&[[0, 0, 0], [1, 1, 1]]);
        let bridges = BridgeSegmentation::segment(&path(2), &genome, 3).unwrap();
        assert_eq!(bridges.points(), &[0, 2]);
    }

    #[test]
    fn zero_target_length_is_a_config_error() {
        let genome = data(&[[0, 1, 0]]);
        let err = BridgeSegmentation::segment(&path(1), &genome, 0).unwrap_err();
        assert!(matches!(err, ArgError::Config(_)));
    }
}
