//! Physics controller contract plus a simple kinematic implementation.
//!
//! The full movement simulation is an external collaborator. Each dynamic
//! entity exclusively owns one controller; it is never shared.

use orrery_common::{Point, Vector, geom};
use orrery_destiny::MovementMode;
use std::fmt;

/// Movement simulation owned by a dynamic entity.
pub trait PhysicsController: fmt::Debug {
    /// Simulated position.
    fn position(&self) -> Point;
    /// Simulated velocity.
    fn velocity(&self) -> Vector;
    /// Current movement mode. Transitions are owned by the controller.
    fn movement_mode(&self) -> MovementMode;
    /// Advance the simulation by `dt` seconds.
    fn advance(&mut self, dt: f64);
}

/// Straight-line kinematics: stop, go to a point, warp to a point.
///
/// Follow and orbit need positions of other entities, which this controller
/// cannot see; it holds position while in those modes.
#[derive(Debug, Clone)]
pub struct KinematicController {
    position: Point,
    velocity: Vector,
    mode: MovementMode,
    max_velocity: f64,
    warp_speed: f64,
}

impl KinematicController {
    /// Default warp speed, metres per second (3 AU/s).
    pub const DEFAULT_WARP_SPEED: f64 = 3.0 * 149_597_870_700.0;

    pub fn new(position: Point, max_velocity: f64) -> Self {
        Self {
            position,
            velocity: Vector::ZERO,
            mode: MovementMode::Stopped,
            max_velocity,
            warp_speed: Self::DEFAULT_WARP_SPEED,
        }
    }

    pub fn with_warp_speed(mut self, warp_speed: f64) -> Self {
        self.warp_speed = warp_speed;
        self
    }

    pub fn stop(&mut self) {
        self.mode = MovementMode::Stopped;
        self.velocity = Vector::ZERO;
    }

    pub fn goto(&mut self, target: Point) {
        self.mode = MovementMode::Goto { target };
    }

    pub fn warp_to(&mut self, target: Point) {
        self.mode = MovementMode::Warping { target };
    }

    /// Set any mode directly, e.g. follow or orbit.
    pub fn set_mode(&mut self, mode: MovementMode) {
        self.mode = mode;
    }

    fn travel(&mut self, target: Point, speed: f64, dt: f64) {
        let remaining = geom::distance(self.position, target);
        let step = speed * dt;
        if step >= remaining {
            tracing::debug!(destination = ?target, "arrived");
            self.position = target;
            self.stop();
        } else {
            self.velocity = geom::heading(self.position, target) * speed;
            self.position += self.velocity * dt;
        }
    }
}

impl PhysicsController for KinematicController {
    fn position(&self) -> Point {
        self.position
    }

    fn velocity(&self) -> Vector {
        self.velocity
    }

    fn movement_mode(&self) -> MovementMode {
        self.mode
    }

    fn advance(&mut self, dt: f64) {
        match self.mode {
            MovementMode::Stopped => self.velocity = Vector::ZERO,
            MovementMode::Goto { target } => self.travel(target, self.max_velocity, dt),
            MovementMode::Warping { target } => self.travel(target, self.warp_speed, dt),
            MovementMode::Follow { .. } | MovementMode::Orbit { .. } => {
                self.velocity = Vector::ZERO;
            }
        }
    }
}
