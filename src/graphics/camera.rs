use crate::{schedule::UpdateStage, types::vehicle::PursuedVehicle, ui::egui::MouseOver};
use bevy::{core_pipeline::tonemapping::Tonemapping, input::mouse::MouseWheel, prelude::*};

const KEYBOARD_PAN_SPEED: f32 = 20.0;
const SCROLL_SPEED: f32 = 0.1;
const FREE_ZOOM_STEP: f32 = 2.0;
const FOLLOW_STIFFNESS: f32 = 4.0;
const MIN_FOLLOW_DISTANCE: f32 = 8.0;
const MAX_FOLLOW_DISTANCE: f32 = 120.0;

/// Free-flying camera that can latch onto the pursued vehicle.
#[derive(Component, Debug)]
pub struct ChaseCamera {
    pub following: bool,
    offset: Vec3,
}

impl ChaseCamera {
    fn new() -> Self {
        Self {
            following: true,
            offset: Vec3::new(18.0, 22.0, 18.0),
        }
    }
}

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera).add_systems(
            Update,
            (
                (toggle_following, keyboard_panning).in_set(UpdateStage::UserInput),
                mouse_zoom.in_set(UpdateStage::UserInput).run_if(in_state(MouseOver::World)),
                follow_pursued_vehicle.in_set(UpdateStage::Visualize),
            ),
        );
    }
}

fn spawn_camera(mut commands: Commands) {
    let clear = Color::srgb(0.25, 0.25, 0.28);
    let controller = ChaseCamera::new();

    commands.spawn((
        Camera3dBundle {
            camera: Camera {
                clear_color: ClearColorConfig::Custom(clear),
                ..default()
            },
            tonemapping: Tonemapping::BlenderFilmic,
            transform: Transform::from_translation(controller.offset).looking_at(Vec3::ZERO, Vec3::Y),
            ..default()
        },
        FogSettings {
            color: clear,
            falloff: FogFalloff::Linear {
                start: 80.0,
                end: 200.0,
            },
            ..default()
        },
        controller,
    ));
}

fn toggle_following(mut query: Query<&mut ChaseCamera>, keyboard: Res<ButtonInput<KeyCode>>) {
    if keyboard.just_pressed(KeyCode::KeyF) {
        for mut controller in &mut query {
            controller.following = !controller.following;
        }
    }
}

fn keyboard_panning(mut query: Query<(&mut Transform, &mut ChaseCamera)>, keyboard: Res<ButtonInput<KeyCode>>, time: Res<Time>) {
    let Ok((mut transform, mut controller)) = query.get_single_mut() else {
        return;
    };

    let mut delta = Vec3::ZERO;

    if keyboard.pressed(KeyCode::KeyW) {
        delta += transform.forward().as_vec3().with_y(0.0).normalize_or_zero();
    }
    if keyboard.pressed(KeyCode::KeyS) {
        delta += transform.back().as_vec3().with_y(0.0).normalize_or_zero();
    }
    if keyboard.pressed(KeyCode::KeyA) {
        delta += transform.left().as_vec3().with_y(0.0).normalize_or_zero();
    }
    if keyboard.pressed(KeyCode::KeyD) {
        delta += transform.right().as_vec3().with_y(0.0).normalize_or_zero();
    }

    if delta != Vec3::ZERO {
        // manual panning lets go of the target
        controller.following = false;
        transform.translation += delta * KEYBOARD_PAN_SPEED * time.delta_seconds();
    }
}

fn mouse_zoom(mut query: Query<(&mut Transform, &mut ChaseCamera)>, mut mouse_wheel: EventReader<MouseWheel>) {
    let Ok((mut transform, mut controller)) = query.get_single_mut() else {
        return;
    };

    for scroll in mouse_wheel.read() {
        let factor = 1.0 - scroll.y * SCROLL_SPEED;

        if controller.following {
            let distance = (controller.offset.length() * factor).clamp(MIN_FOLLOW_DISTANCE, MAX_FOLLOW_DISTANCE);
            controller.offset = controller.offset.normalize_or_zero() * distance;
        } else {
            let forward = transform.forward().as_vec3();
            transform.translation += forward * scroll.y * FREE_ZOOM_STEP;
        }
    }
}

fn follow_pursued_vehicle(
    mut camera_query: Query<(&mut Transform, &ChaseCamera), Without<PursuedVehicle>>,
    target_query: Query<&Transform, With<PursuedVehicle>>,
    time: Res<Time>,
) {
    let (Ok((mut transform, controller)), Ok(target)) = (camera_query.get_single_mut(), target_query.get_single()) else {
        return;
    };

    if !controller.following {
        return;
    }

    let goal = target.translation + controller.offset;
    let blend = (FOLLOW_STIFFNESS * time.delta_seconds()).min(1.0);
    transform.translation = transform.translation.lerp(goal, blend);
    transform.look_at(target.translation, Vec3::Y);
}
