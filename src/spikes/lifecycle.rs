use crate::{
    config::SpikeStripSettings,
    geometry::heading,
    spikes::{
        dispatcher::SpikeStripRegistry,
        events::*,
        spike_strip::{SpikeStrip, SpikeStripProp, TrackedTarget},
        state::{SpikeStripState, StateTransition},
    },
};
use bevy::prelude::*;

fn notify(writer: &mut EventWriter<SpikeStripStateChanged>, strip: Entity, transition: StateTransition) {
    log::debug!("spike strip {:?}: {:?} -> {:?}", strip, transition.previous, transition.current);
    writer.send(SpikeStripStateChanged {
        strip,
        previous: transition.previous,
        current: transition.current,
    });
}

fn spawn_prop(commands: &mut Commands, entity: Entity, strip: &mut SpikeStrip, settings: &SpikeStripSettings) {
    if strip.is_spawned() || strip.state().is_terminal() {
        return;
    }

    let transform = Transform::from_translation(strip.position()).with_rotation(heading::rotation(strip.heading()));
    let prop = commands
        .spawn((
            SpikeStripProp {
                strip: entity,
                model: settings.prop_model.clone(),
                dimensions: settings.prop_dimensions,
            },
            SpatialBundle::from_transform(transform),
            Name::new(format!("{} prop", settings.prop_model)),
        ))
        .id();

    strip.attach_prop(prop, settings);
}

pub fn handle_spawn_requests(
    mut commands: Commands,
    mut requests: EventReader<RequestSpawn>,
    mut strip_query: Query<&mut SpikeStrip>,
    settings: Res<SpikeStripSettings>,
) {
    for &RequestSpawn(entity) in requests.read() {
        if let Ok(mut strip) = strip_query.get_mut(entity) {
            spawn_prop(&mut commands, entity, &mut strip, &settings);
        } else {
            log::warn!("spawn requested for {:?}, which is not a spike strip", entity);
        }
    }
}

pub fn handle_deploy_requests(
    mut commands: Commands,
    mut requests: EventReader<RequestDeploy>,
    mut strip_query: Query<&mut SpikeStrip>,
    settings: Res<SpikeStripSettings>,
) {
    for &RequestDeploy(entity) in requests.read() {
        let Ok(mut strip) = strip_query.get_mut(entity) else {
            log::warn!("deploy requested for {:?}, which is not a spike strip", entity);
            continue;
        };

        if strip.request_deploy() {
            spawn_prop(&mut commands, entity, &mut strip, &settings);
        } else {
            log::debug!("ignoring deploy of {:?} in state {:?}", entity, strip.state());
        }
    }
}

pub fn handle_undeploy_requests(
    mut requests: EventReader<RequestUndeploy>,
    mut strip_query: Query<&mut SpikeStrip>,
    settings: Res<SpikeStripSettings>,
) {
    for &RequestUndeploy(entity) in requests.read() {
        if let Ok(mut strip) = strip_query.get_mut(entity) {
            if !strip.request_undeploy(&settings) {
                log::debug!("ignoring undeploy of {:?} in state {:?}", entity, strip.state());
            }
        }
    }
}

pub fn handle_preview_requests(mut requests: EventReader<RequestPreview>, mut strip_query: Query<&mut SpikeStrip>) {
    for &RequestPreview { strip, enabled } in requests.read() {
        if let Ok(mut strip) = strip_query.get_mut(strip) {
            strip.set_preview(enabled);
        }
    }
}

pub fn advance_strips(
    mut strip_query: Query<(Entity, &mut SpikeStrip, Option<&mut TrackedTarget>)>,
    mut writer: EventWriter<SpikeStripStateChanged>,
    settings: Res<SpikeStripSettings>,
    time: Res<Time>,
) {
    for (entity, mut strip, mut tracked) in &mut strip_query {
        for transition in strip.advance(time.delta(), &settings) {
            if transition.current == SpikeStripState::Deployed {
                if let Some(tracked) = tracked.as_mut() {
                    tracked.bypass.reset();
                }
            }
            notify(&mut writer, entity, transition);
        }
    }
}

/// A prop that vanished without the strip being disposed leaves the strip unusable.
pub fn detect_lost_props(
    mut strip_query: Query<(Entity, &mut SpikeStrip)>,
    prop_query: Query<(), With<SpikeStripProp>>,
    mut writer: EventWriter<SpikeStripStateChanged>,
) {
    for (entity, mut strip) in &mut strip_query {
        let Some(prop) = strip.prop() else {
            continue;
        };

        if prop_query.contains(prop) {
            continue;
        }

        if let Some(transition) = strip.fail() {
            log::error!("prop {:?} of spike strip {:?} disappeared", prop, entity);
            notify(&mut writer, entity, transition);
        }
    }
}

fn dispose_strip(
    commands: &mut Commands,
    entity: Entity,
    strip: &mut SpikeStrip,
    registry: &mut SpikeStripRegistry,
    writer: &mut EventWriter<SpikeStripStateChanged>,
) {
    let (transition, prop) = strip.dispose();

    if let Some(prop) = prop {
        commands.entity(prop).despawn_recursive();
    }

    if let Some(transition) = transition {
        notify(writer, entity, transition);
        registry.remove(entity);
        commands.entity(entity).despawn_recursive();
    }
}

pub fn handle_dispose_requests(
    mut commands: Commands,
    mut requests: EventReader<RequestDispose>,
    mut dispose_all: EventReader<RequestDisposeAll>,
    mut strip_query: Query<&mut SpikeStrip>,
    mut registry: ResMut<SpikeStripRegistry>,
    mut writer: EventWriter<SpikeStripStateChanged>,
) {
    let mut targets: Vec<Entity> = requests.read().map(|&RequestDispose(entity)| entity).collect();

    if dispose_all.read().count() > 0 {
        targets.extend(registry.snapshot());
    }

    for entity in targets {
        if let Ok(mut strip) = strip_query.get_mut(entity) {
            dispose_strip(&mut commands, entity, &mut strip, &mut registry, &mut writer);
        }
    }
}
