use crate::{
    schedule::UpdateStage,
    spikes::{
        dispatcher::SpikeStripDispatcher,
        spike_strip::{PlacementSide, SpikeStrip, TrackedTarget},
        state::SpikeStripState,
    },
    tools::pursuit_tool::{PursuitRequest, PursuitTool},
    types::vehicle::{Driver, GroundVehicle, PursuedVehicle},
};
use bevy::prelude::*;
use bevy_egui::egui::{epaint, Align2};
use bevy_egui::{egui, EguiContexts, EguiPlugin};
use if_chain::if_chain;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin).init_state::<MouseOver>().add_systems(Startup, ui_theme_selection).add_systems(
            Update,
            (
                update_ui_state,
                update_pursuit_window,
                update_strips_window,
            )
                .in_set(UpdateStage::UpdateView),
        );
    }
}

#[derive(States, Default, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MouseOver {
    #[default]
    Ui,
    World,
}

fn update_ui_state(mut contexts: EguiContexts, mut next_state: ResMut<NextState<MouseOver>>) {
    if let Some(ctx) = contexts.try_ctx_mut() {
        next_state.set(match ctx.is_pointer_over_area() {
            true => MouseOver::Ui,
            false => MouseOver::World,
        });
    };
}

fn ui_theme_selection(mut contexts: EguiContexts) {
    catppuccin_egui::set_theme(contexts.ctx_mut(), catppuccin_egui::MOCHA);

    let old = contexts.ctx_mut().style().visuals.clone();

    contexts.ctx_mut().set_visuals(egui::Visuals {
        window_shadow: epaint::Shadow {
            offset: [0.0, 0.0].into(),
            blur: 0.0,
            spread: 0.0,
            color: catppuccin_egui::MOCHA.base,
        },
        window_rounding: 0.0.into(),
        ..old
    });
}

fn update_pursuit_window(
    mut contexts: EguiContexts,
    mut requests: EventWriter<PursuitRequest>,
    mut tool: ResMut<PursuitTool>,
    target_query: Query<(&Driver, &GroundVehicle), With<PursuedVehicle>>,
) {
    let Some(ctx) = contexts.try_ctx_mut() else {
        return;
    };

    egui::Window::new("Pursuit")
        .resizable(false)
        .collapsible(true)
        .anchor(Align2::LEFT_TOP, (0.0, 0.0))
        .constrain(true)
        .movable(false)
        .show(ctx, |ui| {
            let button_size = egui::Vec2::new(140.0, 10.0);

            if_chain! {
                if let Ok((driver, vehicle)) = target_query.get_single();
                then {
                    ui.label(format!("Target speed: {:.1}", driver.speed));
                    ui.label(format!("Burst tyres: {} / {}", vehicle.burst_count(), vehicle.wheels.len()));
                } else {
                    ui.label("No target");
                }
            }
            ui.add_space(10.0);

            ui.add(egui::Slider::new(&mut tool.ahead_distance, 10.0..=80.0).text("Lay ahead"));
            ui.checkbox(&mut tool.preview, "Preview before spawning");
            ui.add_space(10.0);

            for (key, side) in [("1", PlacementSide::Left), ("2", PlacementSide::Middle), ("3", PlacementSide::Right)] {
                let label = format!("[ {} ] Lay strip ({:?})", key, side);
                if ui.add(egui::Button::new(label).min_size(button_size)).clicked() {
                    requests.send(PursuitRequest::PlaceAhead(side));
                }
            }

            if ui.add(egui::Button::new("[ J ] Survey junction").min_size(button_size)).clicked() {
                requests.send(PursuitRequest::SurveyJunction);
            }
            ui.add_space(10.0);

            ui.label("[F]: Follow target");
            ui.label("[WASD]: Pan");
            ui.label("[Scroll Wheel]: Zoom");
        });
}

fn update_strips_window(
    mut contexts: EguiContexts,
    strip_query: Query<(Entity, &SpikeStrip, Option<&TrackedTarget>)>,
    mut dispatcher: SpikeStripDispatcher,
) {
    let Some(ctx) = contexts.try_ctx_mut() else {
        return;
    };

    egui::Window::new("Spike Strips")
        .resizable(false)
        .collapsible(true)
        .anchor(Align2::RIGHT_TOP, (0.0, 0.0))
        .constrain(true)
        .movable(false)
        .show(ctx, |ui| {
            let strips: Vec<Entity> = dispatcher.strips().collect();

            ui.horizontal(|ui| {
                if ui.button("Deploy all").clicked() {
                    strips.iter().for_each(|strip| dispatcher.deploy(*strip));
                }
                if ui.button("Undeploy all").clicked() {
                    strips.iter().for_each(|strip| dispatcher.undeploy(*strip));
                }
                if ui.button("Dispose all").clicked() {
                    dispatcher.dispose_all();
                }
            });
            ui.separator();

            for (entity, strip, tracked) in strip_query.iter_many(&strips) {
                ui.horizontal(|ui| {
                    ui.label(format!(
                        "{:?} {:?} {:?} ({:.0}°)",
                        entity,
                        strip.side(),
                        strip.state(),
                        strip.lane().heading()
                    ));

                    if let Some(closest) = tracked.and_then(|tracked| tracked.bypass.closest()) {
                        ui.label(format!("closest {:.1}", closest));
                    }

                    if strip.is_preview() && ui.button("Spawn").clicked() {
                        dispatcher.set_preview(entity, false);
                        dispatcher.spawn(entity);
                    }
                    if matches!(strip.state(), SpikeStripState::Preparing | SpikeStripState::Undeployed)
                        && ui.button("Deploy").clicked()
                    {
                        dispatcher.set_preview(entity, false);
                        dispatcher.deploy(entity);
                    }
                    if strip.state().can_undeploy() && ui.button("Undeploy").clicked() {
                        dispatcher.undeploy(entity);
                    }
                    if ui.button("Dispose").clicked() {
                        dispatcher.dispose(entity);
                    }
                });
            }

            ui.separator();
            ui.label(format!("Strips: {}", strips.len()));
        });
}
