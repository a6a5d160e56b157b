pub mod bypass;
pub mod collision;
pub mod dispatcher;
pub mod events;
pub mod lifecycle;
pub mod monitor;
pub mod spike_strip;
pub mod state;

use crate::{
    config::SpikeStripSettings,
    schedule::{SchedulePlugin, UpdateStage},
};
use bevy::prelude::*;
use dispatcher::SpikeStripRegistry;
use events::*;
use lifecycle::*;
use monitor::monitor_deployed_strips;

pub struct SpikeStripPlugin;

impl Plugin for SpikeStripPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<SchedulePlugin>() {
            app.add_plugins(SchedulePlugin);
        }

        app.init_resource::<SpikeStripSettings>()
            .init_resource::<SpikeStripRegistry>()
            .add_event::<RequestSpawn>()
            .add_event::<RequestDeploy>()
            .add_event::<RequestUndeploy>()
            .add_event::<RequestDispose>()
            .add_event::<RequestDisposeAll>()
            .add_event::<RequestPreview>()
            .add_event::<SpikeStripStateChanged>()
            .add_event::<OnTireBurst>()
            .add_systems(
                Update,
                (
                    handle_spawn_requests,
                    handle_deploy_requests,
                    handle_undeploy_requests,
                    handle_preview_requests,
                )
                    .chain()
                    .in_set(UpdateStage::Spawning),
            )
            .add_systems(Update, (advance_strips, detect_lost_props).chain().in_set(UpdateStage::Animate))
            .add_systems(Update, monitor_deployed_strips.in_set(UpdateStage::Monitor))
            .add_systems(Update, handle_dispose_requests.in_set(UpdateStage::DestroyEntities));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geometry::{edge_locator::LocateEdge, heading, road::Road, road_builder::RoadGeometryBuilder, road_node::RoadNode},
        spikes::{
            dispatcher::SpikeStripDispatcher,
            spike_strip::{PlacementError, PlacementSide, SpikeStrip, SpikeStripPlacement, SpikeStripProp, TrackedTarget},
            state::SpikeStripState,
        },
        types::vehicle::{GroundVehicle, VEHICLE_HEIGHT},
    };
    use bevy::{ecs::system::RunSystemOnce, time::TimeUpdateStrategy};
    use std::time::Duration;

    struct FourUnits;

    impl LocateEdge for FourUnits {
        fn locate(&self, position: Vec3, heading: f32) -> Vec3 {
            position + heading::direction(heading) * 4.0
        }
    }

    // heading 0, lane 0 runs from x = 4 (right edge) to x = 0
    fn road() -> Road {
        RoadGeometryBuilder::new(&FourUnits)
            .build(RoadNode::new(Vec3::ZERO, 0.0, 1, 1))
            .unwrap()
    }

    #[derive(Resource, Default)]
    struct Recorded {
        transitions: Vec<SpikeStripStateChanged>,
        bursts: Vec<OnTireBurst>,
    }

    fn record(
        mut transitions: EventReader<SpikeStripStateChanged>,
        mut bursts: EventReader<OnTireBurst>,
        mut recorded: ResMut<Recorded>,
    ) {
        recorded.transitions.extend(transitions.read().copied());
        recorded.bursts.extend(bursts.read().copied());
    }

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)))
            .insert_resource(SpikeStripSettings {
                deploy_duration_secs: 0.25,
                undeploy_duration_secs: 0.15,
                ..default()
            })
            .add_plugins(SpikeStripPlugin)
            .init_resource::<Recorded>()
            .add_systems(Update, record.after(UpdateStage::Visualize));

        // the first tick only starts the clock
        app.update();
        app
    }

    fn place(app: &mut App, target: Option<Entity>) -> Result<Entity, PlacementError> {
        let placement = SpikeStripPlacement::new(road(), 0, PlacementSide::Right).unwrap();
        app.world_mut()
            .run_system_once(move |mut dispatcher: SpikeStripDispatcher| dispatcher.place(&placement, target))
    }

    fn run(app: &mut App, ticks: usize) {
        for _ in 0..ticks {
            app.update();
        }
    }

    fn state(app: &App, strip: Entity) -> SpikeStripState {
        app.world().get::<SpikeStrip>(strip).unwrap().state()
    }

    fn states(app: &App) -> Vec<SpikeStripState> {
        app.world()
            .resource::<Recorded>()
            .transitions
            .iter()
            .map(|transition| transition.current)
            .collect()
    }

    fn car(app: &mut App, x: f32, z: f32) -> Entity {
        app.world_mut()
            .spawn((Transform::from_xyz(x, VEHICLE_HEIGHT / 2.0, z), GroundVehicle::car()))
            .id()
    }

    fn deployed(app: &mut App, target: Option<Entity>) -> Entity {
        let strip = place(app, target).unwrap();
        app.world_mut().send_event(RequestDeploy(strip));
        run(app, 6);
        assert_eq!(state(app, strip), SpikeStripState::Deployed);
        strip
    }

    #[test]
    fn spawn_settles_in_undeployed() {
        let mut app = app();
        let strip = place(&mut app, None).unwrap();
        assert_eq!(app.world().resource::<SpikeStripRegistry>().len(), 1);

        app.world_mut().send_event(RequestSpawn(strip));
        run(&mut app, 4);

        assert_eq!(state(&app, strip), SpikeStripState::Undeployed);
        assert_eq!(states(&app), vec![SpikeStripState::Undeployed]);

        let prop = app.world().get::<SpikeStrip>(strip).unwrap().prop().unwrap();
        let prop_transform = app.world().get::<Transform>(prop).unwrap();
        assert!(prop_transform.translation.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-5));
        assert_eq!(app.world().get::<SpikeStripProp>(prop).unwrap().strip, strip);
    }

    #[test]
    fn deploy_spawns_first_and_runs_through() {
        let mut app = app();
        let strip = deployed(&mut app, None);

        assert_eq!(
            states(&app),
            vec![SpikeStripState::Undeployed, SpikeStripState::Deploying, SpikeStripState::Deployed]
        );
        assert_eq!(app.world().get::<SpikeStrip>(strip).unwrap().extension(), 1.0);
    }

    #[test]
    fn duplicate_deploys_collapse_into_one() {
        let mut app = app();
        let strip = place(&mut app, None).unwrap();
        app.world_mut().send_event(RequestDeploy(strip));
        app.world_mut().send_event(RequestDeploy(strip));
        run(&mut app, 3);
        app.world_mut().send_event(RequestDeploy(strip));
        run(&mut app, 6);

        let states = states(&app);
        assert_eq!(states.iter().filter(|state| **state == SpikeStripState::Deploying).count(), 1);
        assert_eq!(states.iter().filter(|state| **state == SpikeStripState::Deployed).count(), 1);
        let mut props = app.world_mut().query::<&SpikeStripProp>();
        assert_eq!(props.iter(app.world()).count(), 1);
    }

    #[test]
    fn undeploy_only_acts_on_a_deployed_strip() {
        let mut app = app();
        let strip = place(&mut app, None).unwrap();
        app.world_mut().send_event(RequestSpawn(strip));
        run(&mut app, 4);

        app.world_mut().send_event(RequestUndeploy(strip));
        run(&mut app, 4);
        assert_eq!(states(&app), vec![SpikeStripState::Undeployed]);

        app.world_mut().send_event(RequestDeploy(strip));
        run(&mut app, 5);
        app.world_mut().send_event(RequestUndeploy(strip));
        run(&mut app, 3);

        assert_eq!(state(&app, strip), SpikeStripState::Undeployed);
        assert_eq!(states(&app).last(), Some(&SpikeStripState::Undeployed));
    }

    #[test]
    fn deploy_during_undeploy_redeploys_afterwards() {
        let mut app = app();
        let strip = deployed(&mut app, None);
        let before = states(&app).len();

        app.world_mut().send_event(RequestUndeploy(strip));
        run(&mut app, 1);
        assert_eq!(state(&app, strip), SpikeStripState::Deployed);

        app.world_mut().send_event(RequestDeploy(strip));
        run(&mut app, 6);

        assert_eq!(state(&app, strip), SpikeStripState::Deployed);
        assert_eq!(
            states(&app).split_off(before),
            vec![SpikeStripState::Undeployed, SpikeStripState::Deploying, SpikeStripState::Deployed]
        );
    }

    #[test]
    fn dispose_is_idempotent() {
        let mut app = app();
        let strip = place(&mut app, None).unwrap();
        app.world_mut().send_event(RequestSpawn(strip));
        run(&mut app, 2);
        let prop = app.world().get::<SpikeStrip>(strip).unwrap().prop().unwrap();

        app.world_mut().send_event(RequestDispose(strip));
        app.world_mut().send_event(RequestDispose(strip));
        app.world_mut().send_event(RequestDisposeAll);
        run(&mut app, 1);
        app.world_mut().send_event(RequestDispose(strip));
        run(&mut app, 1);

        let disposed = states(&app)
            .into_iter()
            .filter(|state| *state == SpikeStripState::Disposed)
            .count();
        assert_eq!(disposed, 1);
        assert!(app.world().get_entity(strip).is_none());
        assert!(app.world().get_entity(prop).is_none());
        assert!(app.world().resource::<SpikeStripRegistry>().is_empty());
    }

    #[test]
    fn dispose_all_clears_every_strip() {
        let mut app = app();
        let first = place(&mut app, None).unwrap();
        let second = place(&mut app, None).unwrap();
        app.world_mut().send_event(RequestSpawn(first));
        run(&mut app, 1);

        app.world_mut().send_event(RequestDisposeAll);
        run(&mut app, 1);

        assert!(app.world().get_entity(first).is_none());
        assert!(app.world().get_entity(second).is_none());
        assert!(app.world().resource::<SpikeStripRegistry>().is_empty());
        let mut props = app.world_mut().query::<&SpikeStripProp>();
        assert_eq!(props.iter(app.world()).count(), 0);
    }

    #[test]
    fn dispatcher_disposes_every_registered_strip() {
        let mut app = app();
        let strip = place(&mut app, None).unwrap();

        app.world_mut()
            .run_system_once(|mut dispatcher: SpikeStripDispatcher| dispatcher.dispose_all());
        run(&mut app, 1);
        assert!(app.world().get_entity(strip).is_none());
        assert_eq!(states(&app), vec![SpikeStripState::Disposed]);

        // nothing left to dispose
        app.world_mut()
            .run_system_once(|mut dispatcher: SpikeStripDispatcher| dispatcher.dispose_all());
        run(&mut app, 1);
        assert_eq!(states(&app), vec![SpikeStripState::Disposed]);
    }

    #[test]
    fn lost_prop_puts_the_strip_in_error() {
        let mut app = app();
        let strip = place(&mut app, None).unwrap();
        app.world_mut().send_event(RequestSpawn(strip));
        run(&mut app, 1);

        let prop = app.world().get::<SpikeStrip>(strip).unwrap().prop().unwrap();
        app.world_mut().despawn(prop);
        run(&mut app, 1);
        assert_eq!(state(&app, strip), SpikeStripState::Error);

        app.world_mut().send_event(RequestDeploy(strip));
        run(&mut app, 5);
        assert_eq!(state(&app, strip), SpikeStripState::Error);
    }

    #[test]
    fn preview_flag_follows_requests() {
        let mut app = app();
        let strip = place(&mut app, None).unwrap();
        app.world_mut().send_event(RequestPreview::new(strip, true));
        run(&mut app, 1);
        assert!(app.world().get::<SpikeStrip>(strip).unwrap().is_preview());

        app.world_mut().send_event(RequestPreview::new(strip, false));
        run(&mut app, 1);
        assert!(!app.world().get::<SpikeStrip>(strip).unwrap().is_preview());
    }

    #[test]
    fn bystander_tyres_burst_without_resolving() {
        let mut app = app();
        let strip = deployed(&mut app, None);

        // front wheels land on the strip (z = 0), rear wheels are clear
        let vehicle = car(&mut app, 2.0, 1.5);
        run(&mut app, 2);

        let recorded = app.world().resource::<Recorded>();
        assert_eq!(recorded.bursts.len(), 2);
        assert!(recorded.bursts.iter().all(|burst| burst.vehicle == vehicle && burst.strip == strip));
        assert_eq!(app.world().get::<GroundVehicle>(vehicle).unwrap().burst_count(), 2);
        assert_eq!(state(&app, strip), SpikeStripState::Deployed);
    }

    #[test]
    fn target_contact_is_a_hit() {
        let mut app = app();
        let target = car(&mut app, 2.0, 12.0);
        let strip = deployed(&mut app, Some(target));

        app.world_mut().get_mut::<Transform>(target).unwrap().translation.z = 1.5;
        run(&mut app, 1);

        assert_eq!(state(&app, strip), SpikeStripState::Hit);
        assert_eq!(states(&app).last(), Some(&SpikeStripState::Hit));
    }

    #[test]
    fn target_pulling_away_is_bypassed() {
        let mut app = app();
        let target = car(&mut app, 2.0, 10.0);
        let strip = deployed(&mut app, Some(target));
        run(&mut app, 2);
        assert_eq!(state(&app, strip), SpikeStripState::Deployed);

        app.world_mut().get_mut::<Transform>(target).unwrap().translation.z = -35.0;
        run(&mut app, 1);

        assert_eq!(state(&app, strip), SpikeStripState::Bypassed);
        assert_eq!(app.world().get::<GroundVehicle>(target).unwrap().burst_count(), 0);
    }

    #[test]
    fn vanished_target_stops_being_tracked() {
        let mut app = app();
        let target = car(&mut app, 2.0, 10.0);
        let strip = deployed(&mut app, Some(target));

        app.world_mut().despawn(target);
        run(&mut app, 2);

        assert!(app.world().get::<TrackedTarget>(strip).is_none());
        assert_eq!(state(&app, strip), SpikeStripState::Deployed);
    }

    #[test]
    fn placing_for_a_non_vehicle_fails() {
        let mut app = app();
        let bystander = app.world_mut().spawn(Transform::default()).id();

        assert_eq!(place(&mut app, Some(bystander)), Err(PlacementError::InvalidTarget(bystander)));
        assert!(app.world().resource::<SpikeStripRegistry>().is_empty());

        let target = car(&mut app, 0.0, 20.0);
        let strip = place(&mut app, Some(target)).unwrap();
        assert_eq!(app.world().get::<TrackedTarget>(strip).unwrap().vehicle, target);
    }
}
