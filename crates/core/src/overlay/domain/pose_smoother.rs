use std::collections::{HashMap, HashSet};

use crate::shared::constants::DEFAULT_SMOOTHING_FACTOR;

/// Smoothing parameters: [x, y, rotation, size].
pub type PoseParams = [f64; 4];

/// Per-identity temporal smoothing of overlay poses.
pub trait PoseSmoother: Send {
    fn smooth(&mut self, id: u64, raw: PoseParams) -> PoseParams;

    /// Forget every identity not in `active`.
    fn retain(&mut self, active: &HashSet<u64>);

    fn clear(&mut self);

    fn cached_ids(&self) -> Vec<u64>;
}

/// EMA smoother keyed by track identity.
///
/// Formula: `next = prev + (raw - prev) * alpha`. The first observation of
/// an identity passes through unchanged.
pub struct EmaPoseSmoother {
    alpha: f64,
    state: HashMap<u64, PoseParams>,
}

impl EmaPoseSmoother {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            state: HashMap::new(),
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Default for EmaPoseSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING_FACTOR)
    }
}

impl PoseSmoother for EmaPoseSmoother {
    fn smooth(&mut self, id: u64, raw: PoseParams) -> PoseParams {
        let smoothed = match self.state.get(&id) {
            None => raw,
            Some(prev) => {
                let mut result = [0.0; 4];
                for i in 0..4 {
                    result[i] = prev[i] + (raw[i] - prev[i]) * self.alpha;
                }
                result
            }
        };

        self.state.insert(id, smoothed);
        smoothed
    }

    fn retain(&mut self, active: &HashSet<u64>) {
        self.state.retain(|id, _| active.contains(id));
    }

    fn clear(&mut self) {
        self.state.clear();
    }

    fn cached_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.state.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
