use crate::spikes::state::SpikeStripState;

/// Infers that a target went around a strip: once it has closed in, a distance that grows back
/// by more than the tolerance means it passed without touching.
#[derive(Clone, Debug, PartialEq)]
pub struct BypassHeuristic {
    tolerance: f32,
    closest: Option<f32>,
}

impl BypassHeuristic {
    pub fn new(tolerance: f32) -> Self {
        Self {
            tolerance,
            closest: None,
        }
    }

    pub fn closest(&self) -> Option<f32> {
        self.closest
    }

    pub fn reset(&mut self) {
        self.closest = None;
    }

    /// Feeds one tick's distance between target and strip. `None` means the target is no longer
    /// valid. Returns true when the target is judged to have bypassed the strip.
    pub fn observe(&mut self, state: SpikeStripState, distance: Option<f32>) -> bool {
        if state.is_resolved() {
            return false;
        }

        let Some(distance) = distance else {
            return false;
        };

        let closest = match self.closest {
            Some(closest) if closest <= distance => closest,
            _ => {
                self.closest = Some(distance);
                distance
            }
        };

        (distance - closest).abs() >= self.tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(distances: &[f32]) -> Vec<bool> {
        let mut heuristic = BypassHeuristic::new(20.0);
        distances
            .iter()
            .map(|distance| heuristic.observe(SpikeStripState::Deployed, Some(*distance)))
            .collect()
    }

    #[test]
    fn target_pulling_away_is_a_bypass() {
        assert_eq!(run(&[30.0, 25.0, 20.0, 15.0, 10.0, 30.0]), vec![false, false, false, false, false, true]);
    }

    #[test]
    fn small_recoil_is_not_a_bypass() {
        assert_eq!(run(&[30.0, 25.0, 20.0, 15.0, 10.0, 18.0]), vec![false; 6]);
    }

    #[test]
    fn far_first_sighting_is_not_a_bypass() {
        assert_eq!(run(&[80.0, 79.0, 85.0]), vec![false; 3]);
    }

    #[test]
    fn resolved_states_are_skipped() {
        let mut heuristic = BypassHeuristic::new(20.0);
        heuristic.observe(SpikeStripState::Deployed, Some(5.0));

        assert!(!heuristic.observe(SpikeStripState::Hit, Some(50.0)));
        assert!(!heuristic.observe(SpikeStripState::Bypassed, Some(50.0)));
        assert_eq!(heuristic.closest(), Some(5.0));
    }

    #[test]
    fn invalid_target_is_skipped() {
        let mut heuristic = BypassHeuristic::new(20.0);
        heuristic.observe(SpikeStripState::Deployed, Some(5.0));

        assert!(!heuristic.observe(SpikeStripState::Deployed, None));
        assert_eq!(heuristic.closest(), Some(5.0));
        assert!(heuristic.observe(SpikeStripState::Deployed, Some(25.0)));
    }

    #[test]
    fn reset_forgets_the_minimum() {
        let mut heuristic = BypassHeuristic::new(20.0);
        heuristic.observe(SpikeStripState::Deployed, Some(5.0));
        heuristic.reset();

        assert!(!heuristic.observe(SpikeStripState::Deployed, Some(40.0)));
        assert_eq!(heuristic.closest(), Some(40.0));
    }
}
