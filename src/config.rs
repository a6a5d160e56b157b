use crate::geometry::edge_locator::EdgeStrategy;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SETTINGS_FILE: &str = "config/settings.json";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("could not read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Installs every settings resource, reading overrides from a JSON file when one exists.
pub struct SettingsPlugin {
    pub path: PathBuf,
}

impl Default for SettingsPlugin {
    fn default() -> Self {
        Self {
            path: PathBuf::from(SETTINGS_FILE),
        }
    }
}

impl Plugin for SettingsPlugin {
    fn build(&self, app: &mut App) {
        let settings = match load_settings(&self.path) {
            Ok(settings) => {
                log::info!("Loaded settings from {:?}", self.path);
                settings
            }
            Err(SettingsError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings at {:?}, using defaults", self.path);
                Settings::default()
            }
            Err(err) => {
                log::warn!("Ignoring settings at {:?}: {}", self.path, err);
                Settings::default()
            }
        };

        app.insert_resource(settings.road_geometry)
            .insert_resource(settings.intersection)
            .insert_resource(settings.spike_strips);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub road_geometry: RoadGeometrySettings,
    pub intersection: IntersectionSettings,
    pub spike_strips: SpikeStripSettings,
}

pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadGeometrySettings {
    /// Strategies tried in order when locating a road edge.
    pub edge_strategies: Vec<EdgeStrategy>,
    pub ray_trace_initial_step: f32,
    pub ray_trace_min_step: f32,
    pub max_search_distance: f32,
    pub min_edge_distance: f32,
    pub road_walk_step: f32,
    pub road_walk_max_attempts: u32,
    pub fallback_offset: f32,
}

impl Default for RoadGeometrySettings {
    fn default() -> Self {
        Self {
            edge_strategies: vec![EdgeStrategy::RayTrace, EdgeStrategy::NativeBoundary, EdgeStrategy::RoadWalk],
            ray_trace_initial_step: 2.0,
            ray_trace_min_step: 0.2,
            max_search_distance: 35.0,
            min_edge_distance: 3.0,
            road_walk_step: 1.0,
            road_walk_max_attempts: 20,
            fallback_offset: 5.0,
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntersectionSettings {
    pub sample_directions: u32,
    pub sample_radius: f32,
    pub initial_search_distance: f32,
    pub search_growth: f32,
    pub max_search_attempts: u32,
    /// Max heading deviation of a connecting node from its direction node.
    pub heading_tolerance: f32,
    /// Roads closer than this in heading are considered the same carriageway.
    pub duplicate_road_tolerance: f32,
}

impl Default for IntersectionSettings {
    fn default() -> Self {
        Self {
            sample_directions: 8,
            sample_radius: 1.0,
            initial_search_distance: 5.0,
            search_growth: 1.5,
            max_search_attempts: 6,
            heading_tolerance: 10.0,
            duplicate_road_tolerance: 30.0,
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpikeStripSettings {
    pub prop_model: String,
    /// Width, height and length of the prop; length runs along the strip heading.
    pub prop_dimensions: Vec3,
    pub deploy_duration_secs: f32,
    pub undeploy_duration_secs: f32,
    pub scan_radius: f32,
    pub bypass_tolerance: f32,
}

impl Default for SpikeStripSettings {
    fn default() -> Self {
        Self {
            prop_model: String::from("p_ld_stinger_s"),
            prop_dimensions: Vec3::new(0.6, 0.25, 4.0),
            deploy_duration_secs: 1.5,
            undeploy_duration_secs: 1.0,
            scan_radius: 8.0,
            bypass_tolerance: 20.0,
        }
    }
}
