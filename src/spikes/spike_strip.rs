use crate::{
    config::SpikeStripSettings,
    geometry::{heading, lane::Lane, road::Road},
    spikes::{
        bypass::BypassHeuristic,
        state::{SpikeStripState, StateTransition},
    },
};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum PlacementSide {
    Left,
    Middle,
    #[default]
    Right,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    #[error("lane {index} does not exist on a road with {lanes} lanes")]
    LaneOutOfRange { index: usize, lanes: usize },
    #[error("target {0:?} is not a live ground vehicle")]
    InvalidTarget(Entity),
}

/// Where on a road a strip goes: which lane and which side of it.
#[derive(Clone, Debug, PartialEq)]
pub struct SpikeStripPlacement {
    road: Road,
    lane_index: usize,
    side: PlacementSide,
}

impl SpikeStripPlacement {
    pub fn new(road: Road, lane_index: usize, side: PlacementSide) -> Result<Self, PlacementError> {
        if road.lane(lane_index).is_none() {
            return Err(PlacementError::LaneOutOfRange {
                index: lane_index,
                lanes: road.lanes().len(),
            });
        }

        Ok(Self {
            road,
            lane_index,
            side,
        })
    }

    pub fn road(&self) -> &Road {
        &self.road
    }

    pub fn lane(&self) -> &Lane {
        &self.road.lanes()[self.lane_index]
    }

    pub fn side(&self) -> PlacementSide {
        self.side
    }

    /// Heading of the strip itself, pointing across the lane from where it is laid.
    pub fn heading(&self) -> f32 {
        let lane_heading = self.lane().heading();
        match self.side {
            PlacementSide::Left => heading::normalize(lane_heading - 90.0),
            PlacementSide::Middle | PlacementSide::Right => heading::normalize(lane_heading + 90.0),
        }
    }

    /// Center of a strip of the given length.
    pub fn position(&self, strip_length: f32) -> Vec3 {
        let lane = self.lane();
        let across = heading::direction(self.heading()) * (strip_length / 2.0);

        match self.side {
            PlacementSide::Left => lane.left_edge() + across,
            PlacementSide::Middle => lane.center(),
            PlacementSide::Right => lane.right_edge() + across,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PropAnimationKind {
    Deploy,
    Undeploy,
}

#[derive(Clone, Debug)]
pub struct PropAnimation {
    pub kind: PropAnimationKind,
    pub timer: Timer,
}

impl PropAnimation {
    fn new(kind: PropAnimationKind, seconds: f32) -> Self {
        Self {
            kind,
            timer: Timer::from_seconds(seconds.max(0.0), TimerMode::Once),
        }
    }
}

/// One spike strip and its lifecycle. The physical prop is a separate entity owned by the strip.
#[derive(Component, Debug)]
pub struct SpikeStrip {
    road: Road,
    lane: Lane,
    side: PlacementSide,
    position: Vec3,
    heading: f32,
    state: SpikeStripState,
    prop: Option<Entity>,
    animation: Option<PropAnimation>,
    deploy_requested: bool,
    preview: bool,
}

impl SpikeStrip {
    pub fn new(placement: &SpikeStripPlacement, strip_length: f32) -> Self {
        Self {
            road: placement.road().clone(),
            lane: placement.lane().clone(),
            side: placement.side(),
            position: placement.position(strip_length),
            heading: placement.heading(),
            state: SpikeStripState::Preparing,
            prop: None,
            animation: None,
            deploy_requested: false,
            preview: false,
        }
    }

    pub fn road(&self) -> &Road {
        &self.road
    }

    pub fn lane(&self) -> &Lane {
        &self.lane
    }

    pub fn side(&self) -> PlacementSide {
        self.side
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn state(&self) -> SpikeStripState {
        self.state
    }

    pub fn prop(&self) -> Option<Entity> {
        self.prop
    }

    pub fn is_spawned(&self) -> bool {
        self.prop.is_some()
    }

    pub fn is_preview(&self) -> bool {
        self.preview
    }

    /// How far the strip is rolled out across the lane, 0 (stowed) to 1 (fully deployed).
    pub fn extension(&self) -> f32 {
        match &self.animation {
            Some(PropAnimation {
                kind: PropAnimationKind::Deploy,
                timer,
            }) => timer.fraction(),
            Some(PropAnimation {
                kind: PropAnimationKind::Undeploy,
                timer,
            }) => 1.0 - timer.fraction(),
            None if self.state.is_monitored() => 1.0,
            None => 0.0,
        }
    }

    pub(crate) fn set_preview(&mut self, preview: bool) {
        self.preview = preview && !self.state.is_terminal();
    }

    fn set_state(&mut self, state: SpikeStripState) -> Option<StateTransition> {
        if self.state == state {
            return None;
        }

        let transition = StateTransition {
            previous: self.state,
            current: state,
        };
        self.state = state;
        Some(transition)
    }

    /// Takes ownership of a freshly spawned prop and starts stowing it.
    pub(crate) fn attach_prop(&mut self, prop: Entity, settings: &SpikeStripSettings) {
        self.prop = Some(prop);
        self.animation = Some(PropAnimation::new(PropAnimationKind::Undeploy, settings.undeploy_duration_secs));
    }

    /// Queues a deploy that starts once the strip is fully undeployed, including a strip still
    /// being stowed. Returns false when the request has nothing to do.
    pub(crate) fn request_deploy(&mut self) -> bool {
        let stowing = matches!(
            self.animation,
            Some(PropAnimation {
                kind: PropAnimationKind::Undeploy,
                ..
            })
        );

        match self.state {
            SpikeStripState::Preparing | SpikeStripState::Undeployed => {}
            state if state.is_monitored() && stowing => {}
            _ => return false,
        }

        self.deploy_requested = true;
        true
    }

    pub(crate) fn request_undeploy(&mut self, settings: &SpikeStripSettings) -> bool {
        if !self.state.can_undeploy() || self.animation.is_some() {
            return false;
        }

        self.animation = Some(PropAnimation::new(PropAnimationKind::Undeploy, settings.undeploy_duration_secs));
        true
    }

    /// Moves to `Disposed` and hands back the prop for despawning.
    pub(crate) fn dispose(&mut self) -> (Option<StateTransition>, Option<Entity>) {
        self.preview = false;
        self.deploy_requested = false;
        self.animation = None;
        (self.set_state(SpikeStripState::Disposed), self.prop.take())
    }

    pub(crate) fn fail(&mut self) -> Option<StateTransition> {
        if self.state.is_terminal() {
            return None;
        }

        self.deploy_requested = false;
        self.animation = None;
        self.set_state(SpikeStripState::Error)
    }

    /// Applies a state decided by the monitor. Ignored once the strip is stowed or gone.
    pub(crate) fn resolve(&mut self, state: SpikeStripState) -> Option<StateTransition> {
        if !self.state.is_monitored() {
            return None;
        }
        self.set_state(state)
    }

    /// Advances the running animation by one tick and starts a queued deploy once the strip is
    /// undeployed.
    pub(crate) fn advance(&mut self, delta: Duration, settings: &SpikeStripSettings) -> Vec<StateTransition> {
        let mut transitions = Vec::new();

        if self.state.is_terminal() {
            return transitions;
        }

        if let Some(animation) = &mut self.animation {
            animation.timer.tick(delta);

            if animation.timer.finished() {
                let finished = animation.kind;
                self.animation = None;

                let next = match finished {
                    PropAnimationKind::Deploy => SpikeStripState::Deployed,
                    PropAnimationKind::Undeploy => SpikeStripState::Undeployed,
                };
                transitions.extend(self.set_state(next));
            }
        }

        if self.deploy_requested && self.state == SpikeStripState::Undeployed && self.animation.is_none() {
            self.deploy_requested = false;
            self.animation = Some(PropAnimation::new(PropAnimationKind::Deploy, settings.deploy_duration_secs));
            transitions.extend(self.set_state(SpikeStripState::Deploying));
        }

        transitions
    }
}

/// The physical strip lying on the road.
#[derive(Component, Debug, Clone)]
pub struct SpikeStripProp {
    pub strip: Entity,
    pub model: String,
    /// Width, height and length; length runs along the strip heading.
    pub dimensions: Vec3,
}

/// Marks a strip laid for one specific vehicle.
#[derive(Component, Debug, Clone)]
pub struct TrackedTarget {
    pub vehicle: Entity,
    pub bypass: BypassHeuristic,
}

impl TrackedTarget {
    pub fn new(vehicle: Entity, settings: &SpikeStripSettings) -> Self {
        Self {
            vehicle,
            bypass: BypassHeuristic::new(settings.bypass_tolerance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{edge_locator::LocateEdge, road_builder::RoadGeometryBuilder, road_node::RoadNode};

    struct FourUnits;

    impl LocateEdge for FourUnits {
        fn locate(&self, position: Vec3, heading: f32) -> Vec3 {
            position + heading::direction(heading) * 4.0
        }
    }

    fn road(lanes_same: u32, lanes_opposite: u32) -> Road {
        RoadGeometryBuilder::new(&FourUnits)
            .build(RoadNode::new(Vec3::ZERO, 0.0, lanes_same, lanes_opposite))
            .unwrap()
    }

    fn settings() -> SpikeStripSettings {
        SpikeStripSettings {
            deploy_duration_secs: 1.0,
            undeploy_duration_secs: 0.5,
            ..default()
        }
    }

    #[test]
    fn lane_index_is_checked_up_front() {
        let result = SpikeStripPlacement::new(road(1, 1), 2, PlacementSide::Left);
        assert_eq!(result, Err(PlacementError::LaneOutOfRange { index: 2, lanes: 2 }));
    }

    #[test]
    fn side_decides_the_strip_heading() {
        let left = SpikeStripPlacement::new(road(1, 1), 0, PlacementSide::Left).unwrap();
        let middle = SpikeStripPlacement::new(road(1, 1), 0, PlacementSide::Middle).unwrap();
        let right = SpikeStripPlacement::new(road(1, 1), 0, PlacementSide::Right).unwrap();

        assert_eq!(left.heading(), 270.0);
        assert_eq!(middle.heading(), 90.0);
        assert_eq!(right.heading(), 90.0);
    }

    #[test]
    fn strips_extend_into_the_lane_from_their_side() {
        // lane 0 spans x = 4 (right edge) to x = 0 (left edge), heading 0
        let right = SpikeStripPlacement::new(road(1, 1), 0, PlacementSide::Right).unwrap();
        assert!(right.position(4.0).abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-5));

        let left = SpikeStripPlacement::new(road(1, 1), 0, PlacementSide::Left).unwrap();
        assert!(left.position(2.0).abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-5));

        let middle = SpikeStripPlacement::new(road(1, 1), 0, PlacementSide::Middle).unwrap();
        assert!(middle.position(4.0).abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn spawn_stows_then_deploy_runs_to_completion() {
        let settings = settings();
        let placement = SpikeStripPlacement::new(road(2, 0), 1, PlacementSide::Right).unwrap();
        let mut strip = SpikeStrip::new(&placement, 4.0);
        strip.attach_prop(Entity::from_raw(7), &settings);
        assert!(strip.request_deploy());

        let transitions = strip.advance(Duration::from_secs_f32(0.5), &settings);
        let states: Vec<_> = transitions.iter().map(|t| t.current).collect();
        assert_eq!(states, vec![SpikeStripState::Undeployed, SpikeStripState::Deploying]);
        assert!(strip.extension() < 0.01);

        strip.advance(Duration::from_secs_f32(0.5), &settings);
        assert_eq!(strip.state(), SpikeStripState::Deploying);
        assert!((strip.extension() - 0.5).abs() < 1e-3);

        let transitions = strip.advance(Duration::from_secs_f32(0.5), &settings);
        assert_eq!(transitions.len(), 1);
        assert_eq!(strip.state(), SpikeStripState::Deployed);
        assert_eq!(strip.extension(), 1.0);
    }

    #[test]
    fn undeploy_is_ignored_unless_out_on_the_road() {
        let settings = settings();
        let placement = SpikeStripPlacement::new(road(1, 0), 0, PlacementSide::Middle).unwrap();
        let mut strip = SpikeStrip::new(&placement, 4.0);
        strip.attach_prop(Entity::from_raw(1), &settings);
        strip.advance(Duration::from_secs(1), &settings);

        assert_eq!(strip.state(), SpikeStripState::Undeployed);
        assert!(!strip.request_undeploy(&settings));
        assert!(strip.advance(Duration::from_secs(1), &settings).is_empty());
        assert_eq!(strip.state(), SpikeStripState::Undeployed);
    }

    #[test]
    fn deploy_while_stowing_waits_for_the_stow_to_finish() {
        let settings = settings();
        let placement = SpikeStripPlacement::new(road(1, 0), 0, PlacementSide::Middle).unwrap();
        let mut strip = SpikeStrip::new(&placement, 4.0);
        strip.attach_prop(Entity::from_raw(5), &settings);
        strip.request_deploy();
        strip.advance(Duration::from_secs(1), &settings);
        strip.advance(Duration::from_secs(1), &settings);
        assert_eq!(strip.state(), SpikeStripState::Deployed);

        // already out and idle
        assert!(!strip.request_deploy());

        assert!(strip.request_undeploy(&settings));
        assert!(strip.request_deploy());

        let transitions = strip.advance(Duration::from_secs_f32(0.5), &settings);
        let states: Vec<_> = transitions.iter().map(|t| t.current).collect();
        assert_eq!(states, vec![SpikeStripState::Undeployed, SpikeStripState::Deploying]);

        strip.advance(Duration::from_secs(1), &settings);
        assert_eq!(strip.state(), SpikeStripState::Deployed);
    }

    #[test]
    fn dispose_is_idempotent_and_releases_the_prop_once() {
        let settings = settings();
        let placement = SpikeStripPlacement::new(road(1, 0), 0, PlacementSide::Middle).unwrap();
        let mut strip = SpikeStrip::new(&placement, 4.0);
        strip.attach_prop(Entity::from_raw(3), &settings);
        strip.set_preview(true);

        let (transition, prop) = strip.dispose();
        assert_eq!(transition.map(|t| t.current), Some(SpikeStripState::Disposed));
        assert_eq!(prop, Some(Entity::from_raw(3)));
        assert!(!strip.is_preview());

        assert_eq!(strip.dispose(), (None, None));
        assert!(!strip.request_deploy());
    }

    #[test]
    fn monitor_results_only_apply_while_out_on_the_road() {
        let settings = settings();
        let placement = SpikeStripPlacement::new(road(1, 0), 0, PlacementSide::Middle).unwrap();
        let mut strip = SpikeStrip::new(&placement, 4.0);

        assert_eq!(strip.resolve(SpikeStripState::Hit), None);

        strip.attach_prop(Entity::from_raw(3), &settings);
        strip.request_deploy();
        strip.advance(Duration::from_secs(1), &settings);
        strip.advance(Duration::from_secs(1), &settings);
        assert_eq!(strip.state(), SpikeStripState::Deployed);

        assert!(strip.resolve(SpikeStripState::Bypassed).is_some());
        assert!(strip.resolve(SpikeStripState::Hit).is_some());
        assert!(strip.resolve(SpikeStripState::Hit).is_none());
    }
}
