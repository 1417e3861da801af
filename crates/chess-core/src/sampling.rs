//! Phase segmentation and move sampling.
//!
//! A game is cut into three contiguous thirds (opening, middlegame,
//! endgame) by floor division. Each third is sampled independently with a
//! stride sampler so only a handful of positions per phase reach the
//! engine. The same thirds rule is applied a second time to the list of
//! evaluated moves when building output, see [`partition_by_phase`].

use std::collections::BTreeSet;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Default number of positions sampled per phase.
pub const DEFAULT_OPENING_SAMPLES: usize = 3;
pub const DEFAULT_MIDDLEGAME_SAMPLES: usize = 4;
pub const DEFAULT_ENDGAME_SAMPLES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Opening,
    Middlegame,
    Endgame,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Opening, Phase::Middlegame, Phase::Endgame];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Opening => "opening",
            Phase::Middlegame => "middlegame",
            Phase::Endgame => "endgame",
        }
    }
}

/// Half-open range `[start, end)` of move indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseWindow {
    pub start: usize,
    pub end: usize,
}

impl PhaseWindow {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseWindows {
    pub opening: PhaseWindow,
    pub middlegame: PhaseWindow,
    pub endgame: PhaseWindow,
}

impl PhaseWindows {
    pub fn get(&self, phase: Phase) -> PhaseWindow {
        match phase {
            Phase::Opening => self.opening,
            Phase::Middlegame => self.middlegame,
            Phase::Endgame => self.endgame,
        }
    }
}

/// Per-phase sample targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleTargets {
    pub opening: usize,
    pub middlegame: usize,
    pub endgame: usize,
}

impl Default for SampleTargets {
    fn default() -> Self {
        Self {
            opening: DEFAULT_OPENING_SAMPLES,
            middlegame: DEFAULT_MIDDLEGAME_SAMPLES,
            endgame: DEFAULT_ENDGAME_SAMPLES,
        }
    }
}

impl SampleTargets {
    pub fn get(&self, phase: Phase) -> usize {
        match phase {
            Phase::Opening => self.opening,
            Phase::Middlegame => self.middlegame,
            Phase::Endgame => self.endgame,
        }
    }
}

/// Split `total` moves into thirds using floor division. Any remainder
/// lands in the middlegame and endgame.
pub fn build_phase_windows(total: usize) -> PhaseWindows {
    let first = total / 3;
    let second = 2 * total / 3;
    PhaseWindows {
        opening: PhaseWindow { start: 0, end: first },
        middlegame: PhaseWindow { start: first, end: second },
        endgame: PhaseWindow { start: second, end: total },
    }
}

/// Stride-sample `[start, end)`.
///
/// Ranges no longer than `n_samples` are returned whole. Otherwise the
/// stride is `max(1, len / n_samples)` and every stride-th index from
/// `start` is taken, so a range that is not a multiple of the stride yields
/// more than `n_samples` indices (`(3, 0, 10)` gives `{0, 3, 6, 9}`).
/// A target of zero on a non-empty range selects nothing.
pub fn sample_indices(n_samples: usize, start: usize, end: usize) -> BTreeSet<usize> {
    let len = end.saturating_sub(start);
    if len <= n_samples {
        return (start..end).collect();
    }
    if n_samples == 0 {
        return BTreeSet::new();
    }
    let step = (len / n_samples).max(1);
    (start..end).step_by(step).collect()
}

/// Union of the per-phase samples over a game of `total` moves.
pub fn build_sample_set(total: usize, targets: &SampleTargets) -> BTreeSet<usize> {
    let windows = build_phase_windows(total);
    Phase::ALL
        .iter()
        .flat_map(|&phase| {
            let window = windows.get(phase);
            sample_indices(targets.get(phase), window.start, window.end)
        })
        .collect()
}

/// Split an ordered list into thirds with the same rule as
/// [`build_phase_windows`], applied to the list's own length.
pub fn partition_by_phase<T>(mut items: Vec<T>) -> (Vec<T>, Vec<T>, Vec<T>) {
    let windows = build_phase_windows(items.len());
    let endgame = items.split_off(windows.endgame.start);
    let middlegame = items.split_off(windows.middlegame.start);
    (items, middlegame, endgame)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(indices: &[usize]) -> BTreeSet<usize> {
        indices.iter().copied().collect()
    }

    #[test]
    fn test_windows_for_thirty_moves() {
        let w = build_phase_windows(30);
        assert_eq!(w.opening.range(), 0..10);
        assert_eq!(w.middlegame.range(), 10..20);
        assert_eq!(w.endgame.range(), 20..30);
    }

    #[test]
    fn test_windows_remainder_goes_late() {
        // 31: 10 / 10 / 11, 32: 10 / 11 / 11
        let w = build_phase_windows(31);
        assert_eq!((w.opening.len(), w.middlegame.len(), w.endgame.len()), (10, 10, 11));
        let w = build_phase_windows(32);
        assert_eq!((w.opening.len(), w.middlegame.len(), w.endgame.len()), (10, 11, 11));
    }

    #[test]
    fn test_windows_partition_every_total() {
        for total in 0..200 {
            let w = build_phase_windows(total);
            assert_eq!(w.opening.start, 0);
            assert_eq!(w.opening.end, w.middlegame.start);
            assert_eq!(w.middlegame.end, w.endgame.start);
            assert_eq!(w.endgame.end, total);
            assert_eq!(w.opening.len() + w.middlegame.len() + w.endgame.len(), total);
        }
    }

    #[test]
    fn test_small_range_is_dense() {
        assert_eq!(sample_indices(4, 0, 2), set(&[0, 1]));
        assert_eq!(sample_indices(3, 5, 8), set(&[5, 6, 7]));
        assert_eq!(sample_indices(3, 4, 4), set(&[]));
    }

    #[test]
    fn test_stride_overcounts() {
        assert_eq!(sample_indices(3, 0, 10), set(&[0, 3, 6, 9]));
        assert_eq!(sample_indices(4, 10, 20), set(&[10, 12, 14, 16, 18]));
        assert_eq!(sample_indices(3, 20, 29), set(&[20, 23, 26]));
    }

    #[test]
    fn test_zero_target() {
        assert_eq!(sample_indices(0, 0, 0), set(&[]));
        assert_eq!(sample_indices(0, 0, 10), set(&[]));
    }

    #[test]
    fn test_sample_set_thirty_moves() {
        let samples = build_sample_set(30, &SampleTargets::default());
        assert_eq!(
            samples,
            set(&[0, 3, 6, 9, 10, 12, 14, 16, 18, 20, 23, 26, 29])
        );
    }

    #[test]
    fn test_sample_set_short_game() {
        // 5 moves: windows [0,1) [1,3) [3,5), all dense
        let samples = build_sample_set(5, &SampleTargets::default());
        assert_eq!(samples, set(&[0, 1, 2, 3, 4]));
        assert!(build_sample_set(0, &SampleTargets::default()).is_empty());
    }

    #[test]
    fn test_partition_by_phase() {
        let (opening, middlegame, endgame) = partition_by_phase((0..7).collect::<Vec<_>>());
        assert_eq!(opening, vec![0, 1]);
        assert_eq!(middlegame, vec![2, 3]);
        assert_eq!(endgame, vec![4, 5, 6]);

        let (opening, middlegame, endgame) = partition_by_phase(Vec::<u8>::new());
        assert!(opening.is_empty() && middlegame.is_empty() && endgame.is_empty());
    }
}
