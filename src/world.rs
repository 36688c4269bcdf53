//! Seam between the maze core and whatever simulates and draws it.

use log::debug;

use crate::game::{Effect, GameState, WinTracker};
use crate::geometry::{BodyTag, Circle, Layout, Rect};
use crate::grid::Dir;
use crate::input::steer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub usize);

/// Physics/render engine the session drives. Bodies are built first, then
/// handed over with `add_body`, which returns the handle used afterwards.
pub trait PhysicsWorld {
    type Body;

    fn create_static_rectangle(&mut self, rect: &Rect) -> Self::Body;
    fn create_dynamic_circle(&mut self, circle: &Circle) -> Self::Body;
    fn add_body(&mut self, body: Self::Body) -> BodyHandle;

    fn add_bodies(&mut self, bodies: Vec<Self::Body>) -> Vec<BodyHandle> {
        bodies.into_iter().map(|b| self.add_body(b)).collect()
    }

    fn body_velocity(&self, body: BodyHandle) -> (f64, f64);
    fn set_body_velocity(&mut self, body: BodyHandle, vx: f64, vy: f64);
    fn set_body_static(&mut self, body: BodyHandle, is_static: bool);
    fn set_gravity_y(&mut self, value: f64);
    fn bodies_tagged(&self, tag: BodyTag) -> Vec<BodyHandle>;

    /// Collision-start pairs since the last call.
    fn drain_collisions(&mut self) -> Vec<(BodyTag, BodyTag)>;
}

pub trait WinBanner {
    fn reveal(&mut self);
}

/// One game over one world: owns the win tracker and the ball handle.
#[derive(Debug)]
pub struct Session {
    tracker: WinTracker,
    ball: BodyHandle,
    velocity_step: f64,
}

impl Session {
    /// Adds arena edges, maze walls, goal and ball to `world`.
    pub fn spawn<W: PhysicsWorld>(
        world: &mut W,
        layout: &Layout,
        velocity_step: f64,
        collapse_gravity: f64,
    ) -> Self {
        let mut statics: Vec<W::Body> = layout
            .boundaries
            .iter()
            .chain(&layout.walls)
            .map(|r| world.create_static_rectangle(r))
            .collect();
        statics.push(world.create_static_rectangle(&layout.goal));
        let count = statics.len();
        world.add_bodies(statics);

        let ball = world.create_dynamic_circle(&layout.ball);
        let ball = world.add_body(ball);
        debug!("spawned {} static bodies and the ball", count);

        Self {
            tracker: WinTracker::new(collapse_gravity),
            ball,
            velocity_step,
        }
    }

    #[inline]
    pub fn state(&self) -> GameState {
        self.tracker.state()
    }

    #[inline]
    pub fn ball(&self) -> BodyHandle {
        self.ball
    }

    pub fn steer(&self, world: &mut impl PhysicsWorld, dir: Dir) {
        let (vx, vy) = steer(world.body_velocity(self.ball), dir, self.velocity_step);
        world.set_body_velocity(self.ball, vx, vy);
    }

    /// Handles one collision pair and applies any resulting effects.
    pub fn on_collision(
        &mut self,
        world: &mut impl PhysicsWorld,
        banner: &mut impl WinBanner,
        a: BodyTag,
        b: BodyTag,
    ) {
        for effect in self.tracker.on_collision(a, b) {
            apply(world, banner, effect);
        }
    }

    /// Drains pending collisions from `world` and feeds them through.
    pub fn pump_collisions(
        &mut self,
        world: &mut impl PhysicsWorld,
        banner: &mut impl WinBanner,
    ) -> GameState {
        for (a, b) in world.drain_collisions() {
            self.on_collision(world, banner, a, b);
        }
        self.state()
    }
}

fn apply(world: &mut impl PhysicsWorld, banner: &mut impl WinBanner, effect: Effect) {
    match effect {
        Effect::RevealBanner => banner.reveal(),
        Effect::SetGravityY(g) => world.set_gravity_y(g),
        Effect::ReleaseWalls => {
            for body in world.bodies_tagged(BodyTag::Wall) {
                world.set_body_static(body, false);
            }
        }
    }
}
