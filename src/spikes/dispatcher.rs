use crate::{
    config::SpikeStripSettings,
    spikes::{
        events::*,
        spike_strip::{PlacementError, SpikeStrip, SpikeStripPlacement, TrackedTarget},
    },
    types::vehicle::GroundVehicle,
};
use bevy::{ecs::system::SystemParam, prelude::*};

/// Every strip that has been placed and not yet disposed.
#[derive(Resource, Default, Debug)]
pub struct SpikeStripRegistry {
    strips: Vec<Entity>,
}

impl SpikeStripRegistry {
    pub fn add(&mut self, strip: Entity) {
        if !self.contains(strip) {
            self.strips.push(strip);
        }
    }

    pub fn remove(&mut self, strip: Entity) -> bool {
        let before = self.strips.len();
        self.strips.retain(|entity| *entity != strip);
        self.strips.len() != before
    }

    pub fn contains(&self, strip: Entity) -> bool {
        self.strips.contains(&strip)
    }

    pub fn len(&self) -> usize {
        self.strips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strips.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.strips.iter().copied()
    }

    /// Copy of the current contents, safe to walk while strips are being removed.
    pub fn snapshot(&self) -> Vec<Entity> {
        self.strips.clone()
    }
}

/// Front door for placing and driving spike strips from any system.
#[derive(SystemParam)]
pub struct SpikeStripDispatcher<'w, 's> {
    commands: Commands<'w, 's>,
    registry: ResMut<'w, SpikeStripRegistry>,
    settings: Res<'w, SpikeStripSettings>,
    vehicles: Query<'w, 's, (), With<GroundVehicle>>,
    spawn_writer: EventWriter<'w, RequestSpawn>,
    deploy_writer: EventWriter<'w, RequestDeploy>,
    undeploy_writer: EventWriter<'w, RequestUndeploy>,
    dispose_writer: EventWriter<'w, RequestDispose>,
    dispose_all_writer: EventWriter<'w, RequestDisposeAll>,
    preview_writer: EventWriter<'w, RequestPreview>,
}

impl<'w, 's> SpikeStripDispatcher<'w, 's> {
    /// Creates a strip in `Preparing`, optionally watching one vehicle for hits and bypasses.
    pub fn place(&mut self, placement: &SpikeStripPlacement, target: Option<Entity>) -> Result<Entity, PlacementError> {
        if let Some(target) = target {
            if !self.vehicles.contains(target) {
                return Err(PlacementError::InvalidTarget(target));
            }
        }

        let strip = SpikeStrip::new(placement, self.settings.prop_dimensions.z);
        let position = strip.position();

        let mut entity = self.commands.spawn((strip, Name::new("Spike strip")));
        if let Some(target) = target {
            entity.insert(TrackedTarget::new(target, &self.settings));
        }

        let id = entity.id();
        self.registry.add(id);
        log::info!("placed spike strip {:?} at {} (target {:?})", id, position, target);

        Ok(id)
    }

    pub fn spawn(&mut self, strip: Entity) {
        self.spawn_writer.send(RequestSpawn(strip));
    }

    pub fn deploy(&mut self, strip: Entity) {
        self.deploy_writer.send(RequestDeploy(strip));
    }

    pub fn undeploy(&mut self, strip: Entity) {
        self.undeploy_writer.send(RequestUndeploy(strip));
    }

    pub fn dispose(&mut self, strip: Entity) {
        self.dispose_writer.send(RequestDispose(strip));
    }

    pub fn dispose_all(&mut self) {
        if self.registry.is_empty() {
            log::debug!("no spike strips to dispose");
            return;
        }
        self.dispose_all_writer.send(RequestDisposeAll);
    }

    pub fn set_preview(&mut self, strip: Entity, enabled: bool) {
        self.preview_writer.send(RequestPreview::new(strip, enabled));
    }

    pub fn strips(&self) -> impl Iterator<Item = Entity> + '_ {
        self.registry.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_ignores_duplicates() {
        let mut registry = SpikeStripRegistry::default();
        registry.add(Entity::from_raw(1));
        registry.add(Entity::from_raw(2));
        registry.add(Entity::from_raw(1));

        assert_eq!(registry.len(), 2);
        assert!(registry.remove(Entity::from_raw(1)));
        assert!(!registry.remove(Entity::from_raw(1)));
        assert_eq!(registry.snapshot(), vec![Entity::from_raw(2)]);
    }
}
