//! Rigid-body world backed by rapier2d. Positions are in play-area pixels;
//! velocities and gravity cross the `PhysicsWorld` seam in pixels per tick so
//! the steering step and collapse gravity keep their tick-based meaning.

use crossbeam::channel::{unbounded, Receiver};
use rapier2d::prelude::*;

use crate::geometry::{BodyTag, Circle, Rect};
use crate::world::{BodyHandle, PhysicsWorld};

pub const TICKS_PER_SECOND: f64 = 60.0;
/// Pixels per second² of acceleration for one unit of world gravity.
const GRAVITY_SCALE: f64 = 1000.0;
/// Velocity damping per second; loses about 1% of speed per tick.
const AIR_DAMPING: f32 = 0.6;
const FRICTION: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Rect { width: f64, height: f64 },
    Circle { radius: f64 },
}

/// Snapshot of one body after the latest step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyState {
    pub tag: BodyTag,
    pub shape: Shape,
    pub x: f64,
    pub y: f64,
    /// Rotation in radians.
    pub angle: f64,
    pub is_static: bool,
}

/// A body built but not yet inserted.
pub struct PendingBody {
    tag: BodyTag,
    shape: Shape,
    body: RigidBody,
    collider: Collider,
}

struct Entry {
    tag: BodyTag,
    shape: Shape,
    body: RigidBodyHandle,
}

pub struct RapierWorld {
    gravity_y: f64,
    entries: Vec<Entry>,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    integration_params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    events: ChannelEventCollector,
    collision_recv: Receiver<CollisionEvent>,
    // contact forces are unused; drained every step
    force_recv: Receiver<ContactForceEvent>,
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl RapierWorld {
    pub fn new() -> Self {
        let (collision_send, collision_recv) = unbounded();
        let (force_send, force_recv) = unbounded();
        let integration_params = IntegrationParameters {
            dt: (1.0 / TICKS_PER_SECOND) as Real,
            ..IntegrationParameters::default()
        };
        Self {
            gravity_y: 0.0,
            entries: Vec::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            integration_params,
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            events: ChannelEventCollector::new(collision_send, force_send),
            collision_recv,
            force_recv,
        }
    }

    /// World gravity in the units passed to `set_gravity_y`.
    pub fn gravity_y(&self) -> f64 {
        self.gravity_y
    }

    pub fn body(&self, handle: BodyHandle) -> Option<BodyState> {
        let entry = self.entries.get(handle.0)?;
        let body = self.bodies.get(entry.body)?;
        let pos = body.translation();
        Some(BodyState {
            tag: entry.tag,
            shape: entry.shape,
            x: pos.x as f64,
            y: pos.y as f64,
            angle: body.rotation().angle() as f64,
            is_static: body.is_fixed(),
        })
    }

    /// Every body in insertion order.
    pub fn bodies(&self) -> Vec<BodyState> {
        (0..self.entries.len())
            .filter_map(|i| self.body(BodyHandle(i)))
            .collect()
    }

    /// Advances one tick.
    pub fn step(&mut self) {
        let gravity = vector![0.0, (self.gravity_y * GRAVITY_SCALE) as Real];
        self.pipeline.step(
            &gravity,
            &self.integration_params,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &self.events,
        );
        while self.force_recv.try_recv().is_ok() {}
    }

    fn tag_of(&self, collider: ColliderHandle) -> Option<BodyTag> {
        let index = self.colliders.get(collider)?.user_data as usize;
        self.entries.get(index).map(|e| e.tag)
    }

    fn rigid_body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        let entry = self.entries.get(handle.0)?;
        self.bodies.get_mut(entry.body)
    }
}

impl PhysicsWorld for RapierWorld {
    type Body = PendingBody;

    fn create_static_rectangle(&mut self, rect: &Rect) -> PendingBody {
        PendingBody {
            tag: rect.tag,
            shape: Shape::Rect {
                width: rect.width,
                height: rect.height,
            },
            body: RigidBodyBuilder::fixed()
                .translation(vector![rect.x as Real, rect.y as Real])
                .linear_damping(AIR_DAMPING)
                .angular_damping(AIR_DAMPING)
                .ccd_enabled(true)
                .build(),
            collider: ColliderBuilder::cuboid((rect.width / 2.0) as Real, (rect.height / 2.0) as Real)
                .friction(FRICTION)
                .active_events(ActiveEvents::COLLISION_EVENTS)
                .build(),
        }
    }

    fn create_dynamic_circle(&mut self, circle: &Circle) -> PendingBody {
        PendingBody {
            tag: circle.tag,
            shape: Shape::Circle {
                radius: circle.radius,
            },
            body: RigidBodyBuilder::dynamic()
                .translation(vector![circle.x as Real, circle.y as Real])
                .linear_damping(AIR_DAMPING)
                .ccd_enabled(true)
                .build(),
            collider: ColliderBuilder::ball(circle.radius as Real)
                .friction(FRICTION)
                .active_events(ActiveEvents::COLLISION_EVENTS)
                .build(),
        }
    }

    fn add_body(&mut self, pending: PendingBody) -> BodyHandle {
        let index = self.entries.len();
        let PendingBody {
            tag,
            shape,
            body,
            mut collider,
        } = pending;
        collider.user_data = index as u128;
        let body = self.bodies.insert(body);
        self.colliders
            .insert_with_parent(collider, body, &mut self.bodies);
        self.entries.push(Entry { tag, shape, body });
        BodyHandle(index)
    }

    fn body_velocity(&self, body: BodyHandle) -> (f64, f64) {
        self.entries
            .get(body.0)
            .and_then(|e| self.bodies.get(e.body))
            .map(|b| {
                let v = b.linvel();
                (
                    v.x as f64 / TICKS_PER_SECOND,
                    v.y as f64 / TICKS_PER_SECOND,
                )
            })
            .unwrap_or_default()
    }

    fn set_body_velocity(&mut self, body: BodyHandle, vx: f64, vy: f64) {
        if let Some(b) = self.rigid_body_mut(body) {
            let v = vector![
                (vx * TICKS_PER_SECOND) as Real,
                (vy * TICKS_PER_SECOND) as Real
            ];
            b.set_linvel(v, true);
        }
    }

    fn set_body_static(&mut self, body: BodyHandle, is_static: bool) {
        if let Some(b) = self.rigid_body_mut(body) {
            let kind = if is_static {
                RigidBodyType::Fixed
            } else {
                RigidBodyType::Dynamic
            };
            b.set_body_type(kind, true);
        }
    }

    fn set_gravity_y(&mut self, value: f64) {
        self.gravity_y = value;
        for (_, body) in self.bodies.iter_mut() {
            body.wake_up(true);
        }
    }

    fn bodies_tagged(&self, tag: BodyTag) -> Vec<BodyHandle> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.tag == tag)
            .map(|(i, _)| BodyHandle(i))
            .collect()
    }

    fn drain_collisions(&mut self) -> Vec<(BodyTag, BodyTag)> {
        let mut pairs = Vec::new();
        while let Ok(event) = self.collision_recv.try_recv() {
            if !event.started() {
                continue;
            }
            if let (Some(a), Some(b)) = (self.tag_of(event.collider1()), self.tag_of(event.collider2())) {
                pairs.push((a, b));
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f64, y: f64, width: f64, height: f64, tag: BodyTag) -> Rect {
        Rect {
            x,
            y,
            width,
            height,
            tag,
        }
    }

    fn ball_at(world: &mut RapierWorld, x: f64, y: f64) -> BodyHandle {
        let body = world.create_dynamic_circle(&Circle {
            x,
            y,
            radius: 5.0,
            tag: BodyTag::Ball,
        });
        world.add_body(body)
    }

    fn add_static(world: &mut RapierWorld, r: Rect) -> BodyHandle {
        let body = world.create_static_rectangle(&r);
        world.add_body(body)
    }

    fn has_pair(pairs: &[(BodyTag, BodyTag)], a: BodyTag, b: BodyTag) -> bool {
        pairs.iter().any(|&p| p == (a, b) || p == (b, a))
    }

    #[test]
    fn wall_stops_ball_and_reports_contact() {
        let mut world = RapierWorld::new();
        let wall = add_static(&mut world, rect(30.0, 0.0, 3.0, 100.0, BodyTag::Wall));
        let ball = ball_at(&mut world, 0.0, 0.0);
        world.set_body_velocity(ball, 5.0, 0.0);

        for _ in 0..30 {
            world.step();
        }
        let b = world.body(ball).unwrap();
        assert!(b.x < 30.0, "ball passed the wall at {}", b.x);
        assert!(b.x > 15.0, "ball stopped early at {}", b.x);
        assert!(world.body(wall).unwrap().is_static);
        assert!(has_pair(&world.drain_collisions(), BodyTag::Wall, BodyTag::Ball));
    }

    #[test]
    fn fast_ball_cannot_tunnel() {
        let mut world = RapierWorld::new();
        add_static(&mut world, rect(50.0, 0.0, 3.0, 100.0, BodyTag::Wall));
        let ball = ball_at(&mut world, 0.0, 0.0);
        world.set_body_velocity(ball, 30.0, 0.0);
        for _ in 0..10 {
            world.step();
        }
        assert!(world.body(ball).unwrap().x < 50.0);
    }

    #[test]
    fn touching_goal_reports_pair() {
        let mut world = RapierWorld::new();
        let ball = ball_at(&mut world, 0.0, 0.0);
        add_static(&mut world, rect(0.0, 20.0, 10.0, 10.0, BodyTag::Goal));
        world.set_body_velocity(ball, 0.0, 4.0);
        for _ in 0..10 {
            world.step();
        }
        assert!(has_pair(&world.drain_collisions(), BodyTag::Ball, BodyTag::Goal));
        assert!(world.drain_collisions().is_empty());
    }

    #[test]
    fn released_wall_stays_solid() {
        let mut world = RapierWorld::new();
        let wall = add_static(&mut world, rect(30.0, 0.0, 3.0, 40.0, BodyTag::Wall));
        let ball = ball_at(&mut world, 0.0, 0.0);
        world.set_body_static(wall, false);
        assert!(!world.body(wall).unwrap().is_static);

        world.set_body_velocity(ball, 10.0, 0.0);
        for _ in 0..10 {
            world.step();
        }
        let (b, w) = (world.body(ball).unwrap(), world.body(wall).unwrap());
        assert!(b.x < w.x, "ball at {} went through wall at {}", b.x, w.x);
        assert!(w.x > 30.0, "wall was not pushed");
        assert!(has_pair(&world.drain_collisions(), BodyTag::Wall, BodyTag::Ball));
    }

    #[test]
    fn released_wall_falls_onto_floor() {
        let mut world = RapierWorld::new();
        add_static(&mut world, rect(50.0, 100.0, 100.0, 2.0, BodyTag::Boundary));
        let wall = add_static(&mut world, rect(50.0, 10.0, 20.0, 3.0, BodyTag::Wall));
        world.set_body_static(wall, false);
        world.set_gravity_y(1.0);
        for _ in 0..120 {
            world.step();
        }
        let w = world.body(wall).unwrap();
        assert!(w.y > 90.0 && w.y < 100.0, "wall at {}", w.y);
        assert!(has_pair(&world.drain_collisions(), BodyTag::Boundary, BodyTag::Wall));
    }

    #[test]
    fn damping_slows_free_ball() {
        let mut world = RapierWorld::new();
        let ball = ball_at(&mut world, 0.0, 0.0);
        world.set_body_velocity(ball, 10.0, 0.0);
        world.step();
        let (vx, vy) = world.body_velocity(ball);
        assert!(vx < 10.0 && vx > 9.0, "vx = {vx}");
        assert!(vy.abs() < 1e-6);
    }

    #[test]
    fn tags_are_queryable() {
        let mut world = RapierWorld::new();
        add_static(&mut world, rect(0.0, 0.0, 1.0, 1.0, BodyTag::Wall));
        ball_at(&mut world, 10.0, 10.0);
        add_static(&mut world, rect(5.0, 0.0, 1.0, 1.0, BodyTag::Wall));
        assert_eq!(
            world.bodies_tagged(BodyTag::Wall),
            vec![BodyHandle(0), BodyHandle(2)]
        );
        assert_eq!(world.body_velocity(BodyHandle(99)), (0.0, 0.0));
        assert!(world.body(BodyHandle(99)).is_none());
    }
}
