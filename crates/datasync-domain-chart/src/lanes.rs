use datasync_ports::types::{Lane, LaneStrategy, Seconds};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// What the detector knows about a committed onset when a lane is chosen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OnsetFeatures {
    pub time: Seconds,
    pub rms: f32,
    pub window_index: usize,
}

/// Picks the lane for each committed note.
///
/// The detector's control flow never depends on the choice, so a spectral or
/// pattern-based mapping can replace the random one without touching it.
pub trait LaneAssigner {
    fn assign_lane(&mut self, features: &OnsetFeatures) -> Lane;
}

/// Uniformly random lane per note.
pub struct RandomLaneAssigner {
    rng: StdRng,
}

impl RandomLaneAssigner {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomLaneAssigner {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl LaneAssigner for RandomLaneAssigner {
    fn assign_lane(&mut self, _features: &OnsetFeatures) -> Lane {
        let idx = self.rng.gen_range(0..Lane::ALL.len());
        Lane::ALL[idx]
    }
}

/// Round-robin over `Lane::ALL`, starting at `Lane::Left`.
#[derive(Default)]
pub struct CyclicLaneAssigner {
    next: usize,
}

impl LaneAssigner for CyclicLaneAssigner {
    fn assign_lane(&mut self, _features: &OnsetFeatures) -> Lane {
        let lane = Lane::ALL[self.next % Lane::ALL.len()];
        self.next = self.next.wrapping_add(1);
        lane
    }
}

pub fn lane_assigner_for(strategy: LaneStrategy, seed: Option<u64>) -> Box<dyn LaneAssigner + Send> {
    match strategy {
        LaneStrategy::Random => match seed {
            Some(seed) => Box::new(RandomLaneAssigner::seeded(seed)),
            None => Box::new(RandomLaneAssigner::from_entropy()),
        },
        LaneStrategy::Cyclic => Box::new(CyclicLaneAssigner::default()),
    }
}
