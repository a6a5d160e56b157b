use crate::{geometry::heading, schedule::UpdateStage};
use bevy::prelude::*;
use rand::seq::SliceRandom;

pub const VEHICLE_WIDTH: f32 = 1.8;
pub const VEHICLE_HEIGHT: f32 = 1.4;
pub const VEHICLE_LENGTH: f32 = 4.2;
const WHEEL_INSET: f32 = 0.15;
const BURST_SLOWDOWN: f32 = 0.2;
const LATERAL_SPEED: f32 = 1.5;
const SWERVE_OFFSETS: [f32; 3] = [-1.5, 0.0, 1.5];
const SWERVE_INTERVAL_SECS: f32 = 4.0;

pub struct VehiclePlugin;

impl Plugin for VehiclePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (swerve_pursued_vehicle, drive_vehicles).chain().in_set(UpdateStage::Simulate));
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wheel {
    /// Contact point relative to the vehicle origin.
    pub offset: Vec3,
    pub burst: bool,
}

/// Anything on wheels that a strip can puncture.
#[derive(Component, Debug, Clone)]
pub struct GroundVehicle {
    pub dimensions: Vec3,
    pub wheels: Vec<Wheel>,
}

impl GroundVehicle {
    pub fn car() -> Self {
        let half = Vec3::new(VEHICLE_WIDTH, VEHICLE_HEIGHT, VEHICLE_LENGTH) / 2.0;
        let wheels = [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)]
            .into_iter()
            .map(|(side, end)| Wheel {
                offset: Vec3::new(side * (half.x - WHEEL_INSET), -half.y, end * (half.z - WHEEL_INSET * 4.0)),
                burst: false,
            })
            .collect();

        Self {
            dimensions: half * 2.0,
            wheels,
        }
    }

    pub fn burst_count(&self) -> usize {
        self.wheels.iter().filter(|wheel| wheel.burst).count()
    }

    pub fn wheel_position(&self, transform: &Transform, index: usize) -> Option<Vec3> {
        self.wheels.get(index).map(|wheel| transform.transform_point(wheel.offset))
    }
}

/// The vehicle being chased.
#[derive(Component, Debug)]
pub struct PursuedVehicle;

#[derive(Component, Debug)]
pub struct Driver {
    pub heading: f32,
    pub cruise_speed: f32,
    pub speed: f32,
    lateral: f32,
    lateral_goal: f32,
    swerve: Timer,
}

impl Driver {
    pub fn new(heading: f32, cruise_speed: f32) -> Self {
        Self {
            heading,
            cruise_speed,
            speed: cruise_speed,
            lateral: 0.0,
            lateral_goal: 0.0,
            swerve: Timer::from_seconds(SWERVE_INTERVAL_SECS, TimerMode::Repeating),
        }
    }
}

/// Where the demo world ends; vehicles leaving it re-enter from the other side.
#[derive(Resource, Debug, Clone, Copy)]
pub struct DriveBounds(pub f32);

fn swerve_pursued_vehicle(mut query: Query<&mut Driver, With<PursuedVehicle>>, time: Res<Time>) {
    let mut rng = rand::thread_rng();

    for mut driver in &mut query {
        if driver.swerve.tick(time.delta()).just_finished() {
            if let Some(goal) = SWERVE_OFFSETS.choose(&mut rng) {
                driver.lateral_goal = *goal;
            }
        }
    }
}

fn drive_vehicles(
    mut query: Query<(&mut Transform, &mut Driver, &GroundVehicle)>,
    bounds: Option<Res<DriveBounds>>,
    time: Res<Time>,
) {
    let dt = time.delta_seconds();

    for (mut transform, mut driver, vehicle) in &mut query {
        let slowdown = (1.0 - BURST_SLOWDOWN * vehicle.burst_count() as f32).max(0.0);
        let target_speed = driver.cruise_speed * slowdown;
        driver.speed = driver.speed.lerp(target_speed, (dt * 0.5).min(1.0));

        let lateral_step = (driver.lateral_goal - driver.lateral).clamp(-LATERAL_SPEED * dt, LATERAL_SPEED * dt);
        driver.lateral += lateral_step;

        let forward = heading::direction(driver.heading);
        let right = heading::direction(driver.heading - 90.0);
        transform.translation += forward * driver.speed * dt + right * lateral_step;
        transform.rotation = heading::rotation(driver.heading);

        if let Some(bounds) = &bounds {
            let extent = bounds.0;
            if transform.translation.x.abs() > extent || transform.translation.z.abs() > extent {
                transform.translation -= forward * (extent * 2.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn car_wheels_touch_the_ground_inside_the_body() {
        let car = GroundVehicle::car();
        let transform = Transform::from_xyz(3.0, VEHICLE_HEIGHT / 2.0, -2.0).with_rotation(heading::rotation(90.0));

        assert_eq!(car.wheels.len(), 4);
        for index in 0..car.wheels.len() {
            let wheel = car.wheel_position(&transform, index).unwrap();
            assert!(wheel.y.abs() < 1e-5);
            assert!(wheel.with_y(0.0).distance(transform.translation.with_y(0.0)) < VEHICLE_LENGTH / 2.0);
        }
        assert_eq!(car.wheel_position(&transform, 4), None);
    }

    #[test]
    fn burst_tyres_slow_the_vehicle_down() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(std::time::Duration::from_millis(100)))
            .add_plugins((crate::schedule::SchedulePlugin, VehiclePlugin));

        let mut car = GroundVehicle::car();
        car.wheels[0].burst = true;
        car.wheels[1].burst = true;
        let burst = app.world_mut().spawn((Transform::default(), Driver::new(0.0, 10.0), car)).id();
        let intact = app
            .world_mut()
            .spawn((Transform::default(), Driver::new(0.0, 10.0), GroundVehicle::car()))
            .id();

        for _ in 0..20 {
            app.update();
        }

        let world = app.world();
        assert!(world.get::<Driver>(burst).unwrap().speed < 10.0);
        assert!((world.get::<Driver>(intact).unwrap().speed - 10.0).abs() < 1e-4);
        assert!(world.get::<Transform>(intact).unwrap().translation.z < -10.0);
    }
}
