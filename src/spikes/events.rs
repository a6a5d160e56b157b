use crate::spikes::state::SpikeStripState;
use bevy::prelude::*;

#[derive(Event, Debug, Clone, Copy)]
pub struct RequestSpawn(pub Entity);

#[derive(Event, Debug, Clone, Copy)]
pub struct RequestDeploy(pub Entity);

#[derive(Event, Debug, Clone, Copy)]
pub struct RequestUndeploy(pub Entity);

#[derive(Event, Debug, Clone, Copy)]
pub struct RequestDispose(pub Entity);

#[derive(Event, Debug, Clone, Copy)]
pub struct RequestDisposeAll;

#[derive(Event, Debug, Clone, Copy)]
pub struct RequestPreview {
    pub strip: Entity,
    pub enabled: bool,
}

impl RequestPreview {
    pub fn new(strip: Entity, enabled: bool) -> Self {
        Self { strip, enabled }
    }
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpikeStripStateChanged {
    pub strip: Entity,
    pub previous: SpikeStripState,
    pub current: SpikeStripState,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnTireBurst {
    pub strip: Entity,
    pub vehicle: Entity,
    pub wheel: usize,
}
