use crate::{
    config::SpikeStripSettings,
    spikes::{
        collision::{is_touching, OrientedBox},
        events::{OnTireBurst, SpikeStripStateChanged},
        spike_strip::{SpikeStrip, SpikeStripProp, TrackedTarget},
        state::SpikeStripState,
    },
    types::vehicle::GroundVehicle,
};
use bevy::prelude::*;

fn ground_distance(a: Vec3, b: Vec3) -> f32 {
    a.with_y(0.0).distance(b.with_y(0.0))
}

/// Checks every strip lying on the road against nearby vehicles, bursting tyres that touch it and
/// deciding whether a tracked target hit or went around it.
pub fn monitor_deployed_strips(
    mut commands: Commands,
    mut strip_query: Query<(Entity, &mut SpikeStrip, Option<&mut TrackedTarget>)>,
    prop_query: Query<(&Transform, &SpikeStripProp), Without<GroundVehicle>>,
    mut vehicle_query: Query<(Entity, &Transform, &mut GroundVehicle)>,
    mut state_writer: EventWriter<SpikeStripStateChanged>,
    mut burst_writer: EventWriter<OnTireBurst>,
    settings: Res<SpikeStripSettings>,
) {
    for (entity, mut strip, tracked) in &mut strip_query {
        if !strip.state().is_monitored() {
            continue;
        }

        let Some((prop_transform, prop)) = strip.prop().and_then(|prop| prop_query.get(prop).ok()) else {
            continue;
        };

        let prop_box = OrientedBox::from_transform(prop_transform, prop.dimensions);
        let target = tracked.as_ref().map(|tracked| tracked.vehicle);
        let mut target_hit = false;

        for (vehicle_entity, transform, mut vehicle) in &mut vehicle_query {
            if ground_distance(transform.translation, prop_box.center) > settings.scan_radius {
                continue;
            }

            for index in 0..vehicle.wheels.len() {
                if vehicle.wheels[index].burst {
                    continue;
                }
                let Some(wheel) = vehicle.wheel_position(transform, index) else {
                    continue;
                };
                if !is_touching(&prop_box, wheel) {
                    continue;
                }

                vehicle.wheels[index].burst = true;
                log::info!("spike strip {:?} burst wheel {} of {:?}", entity, index, vehicle_entity);
                burst_writer.send(OnTireBurst {
                    strip: entity,
                    vehicle: vehicle_entity,
                    wheel: index,
                });

                if target == Some(vehicle_entity) {
                    target_hit = true;
                }
            }
        }

        let Some(mut tracked) = tracked else {
            continue;
        };

        let distance = vehicle_query
            .get(tracked.vehicle)
            .ok()
            .map(|(_, transform, _)| ground_distance(transform.translation, strip.position()));

        if distance.is_none() {
            log::info!("target {:?} of spike strip {:?} is gone, no longer tracking", tracked.vehicle, entity);
            commands.entity(entity).remove::<TrackedTarget>();
            continue;
        }

        let outcome = if target_hit {
            Some(SpikeStripState::Hit)
        } else if tracked.bypass.observe(strip.state(), distance) {
            Some(SpikeStripState::Bypassed)
        } else {
            None
        };

        if let Some(transition) = outcome.and_then(|state| strip.resolve(state)) {
            log::info!("spike strip {:?}: {:?} -> {:?}", entity, transition.previous, transition.current);
            state_writer.send(SpikeStripStateChanged {
                strip: entity,
                previous: transition.previous,
                current: transition.current,
            });
        }
    }
}
