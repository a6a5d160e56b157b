use crate::{
    config::SpikeStripSettings,
    geometry::{heading, road::Road},
    schedule::UpdateStage,
    spikes::{collision::OrientedBox, spike_strip::SpikeStrip},
    tools::pursuit_tool::RoadSurvey,
};
use bevy::{color::palettes::css, prelude::*};

const EDGE_HALF_LENGTH: f32 = 6.0;
const LANE_ARROW_LENGTH: f32 = 3.0;
const OVERLAY_LIFT: f32 = 0.1;

pub struct OverlayPlugin;

impl Plugin for OverlayPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (draw_survey, draw_previews).in_set(UpdateStage::Visualize));
    }
}

fn draw_road(gizmos: &mut Gizmos, road: &Road) {
    let along = heading::direction(road.heading()) * EDGE_HALF_LENGTH;
    let lift = Vec3::Y * OVERLAY_LIFT;
    let edge_color = if road.is_single_direction() { css::AQUA } else { css::WHITE };

    for edge in [road.right_edge(), road.left_edge()] {
        gizmos.line(edge - along + lift, edge + along + lift, edge_color);
    }

    for lane in road.lanes().iter().map(|lane| lane.translated(lift)) {
        let color = if lane.is_opposite() { css::TOMATO } else { css::LIME };
        let forward = heading::direction(lane.heading());
        gizmos.arrow(lane.center(), lane.center() + forward * LANE_ARROW_LENGTH, color);
        gizmos.line(
            lane.left_edge() - forward * EDGE_HALF_LENGTH,
            lane.left_edge() + forward * EDGE_HALF_LENGTH,
            css::GRAY,
        );
    }
}

fn draw_survey(mut gizmos: Gizmos, survey: Res<RoadSurvey>) {
    for road in &survey.roads {
        draw_road(&mut gizmos, road);
    }

    if let Some(junction) = survey.junction {
        gizmos.circle(junction + Vec3::Y * OVERLAY_LIFT, Dir3::Y, 2.0, css::YELLOW);
    }
}

fn draw_previews(mut gizmos: Gizmos, strip_query: Query<&SpikeStrip>, settings: Res<SpikeStripSettings>) {
    for strip in strip_query.iter().filter(|strip| strip.is_preview()) {
        draw_road(&mut gizmos, strip.road());

        let outline = OrientedBox::new(
            strip.position() + Vec3::Y * settings.prop_dimensions.y / 2.0,
            heading::rotation(strip.heading()),
            settings.prop_dimensions,
        );
        let corners = outline.corners();

        // corners differing in one axis bit share an edge
        for (index, corner) in corners.iter().enumerate() {
            for bit in [1, 2, 4] {
                if index & bit == 0 {
                    gizmos.line(*corner, corners[index | bit], css::ORANGE);
                }
            }
        }
    }
}
