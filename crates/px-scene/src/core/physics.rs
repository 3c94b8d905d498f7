use glam::Vec2;
use rapier2d::prelude::*;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Conversion helpers (private) between glam and nalgebra
// ---------------------------------------------------------------------------

fn vec2_to_na(v: Vec2) -> nalgebra::Vector2<f32> {
    nalgebra::Vector2::new(v.x, v.y)
}

fn na_to_vec2(v: &nalgebra::Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Radius used in place of a convex polygon whose points have no area.
const DEGENERATE_RADIUS: f32 = 1.0e-3;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// How a body's mass participates in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MassClass {
    /// Mass from density and shape; subject to gravity and contacts.
    #[default]
    Dynamic,
    /// Never moves.
    Fixed,
    /// Unmovable by contacts or gravity, but can still be repositioned.
    Infinite,
}

impl MassClass {
    fn to_rapier(self) -> RigidBodyType {
        match self {
            MassClass::Dynamic => RigidBodyType::Dynamic,
            MassClass::Fixed => RigidBodyType::Fixed,
            MassClass::Infinite => RigidBodyType::KinematicPositionBased,
        }
    }
}

/// Convex collision shape in body-local world units.
#[derive(Debug, Clone, PartialEq)]
pub enum ColliderShape {
    Ball { radius: f32 },
    Cuboid { half_width: f32, half_height: f32 },
    /// Convex hull of the given points. Winding does not matter.
    ConvexPolygon { points: Vec<Vec2> },
}

impl ColliderShape {
    pub fn rectangle(width: f32, height: f32) -> Self {
        ColliderShape::Cuboid {
            half_width: width / 2.0,
            half_height: height / 2.0,
        }
    }

    fn build_collider(&self) -> ColliderBuilder {
        match self {
            ColliderShape::Ball { radius } => ColliderBuilder::ball(*radius),
            ColliderShape::Cuboid { half_width, half_height } => {
                ColliderBuilder::cuboid(*half_width, *half_height)
            }
            ColliderShape::ConvexPolygon { points } => {
                let points: Vec<nalgebra::Point2<f32>> = points
                    .iter()
                    .map(|p| nalgebra::Point2::new(p.x, p.y))
                    .collect();
                ColliderBuilder::convex_hull(&points).unwrap_or_else(|| {
                    log::warn!(
                        "convex polygon with {} points has no area, using a point collider",
                        points.len()
                    );
                    ColliderBuilder::ball(DEGENERATE_RADIUS)
                })
            }
        }
    }

    /// Width and height of the axis-aligned box around the shape rotated by `rotation`.
    pub fn extents(&self, rotation: f32) -> Vec2 {
        match self {
            ColliderShape::Ball { radius } => Vec2::splat(2.0 * radius),
            ColliderShape::Cuboid { half_width, half_height } => {
                let (sin, cos) = rotation.sin_cos();
                Vec2::new(
                    2.0 * (half_width * cos.abs() + half_height * sin.abs()),
                    2.0 * (half_width * sin.abs() + half_height * cos.abs()),
                )
            }
            ColliderShape::ConvexPolygon { points } => {
                if points.is_empty() {
                    return Vec2::ZERO;
                }
                let rot = Vec2::from_angle(rotation);
                let (min, max) = points.iter().map(|p| rot.rotate(*p)).fold(
                    (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
                    |(min, max), p| (min.min(p), max.max(p)),
                );
                max - min
            }
        }
    }
}

/// Surface and mass properties of a collider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            density: 1.0,
            friction: 0.5,
            restitution: 0.2,
        }
    }
}

impl Material {
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }
}

/// Everything needed to (re)create a rigid body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    pub shape: ColliderShape,
    pub mass: MassClass,
    pub position: Vec2,
    pub rotation: f32,
    pub velocity: Vec2,
    pub angular_velocity: f32,
    pub material: Material,
}

impl BodyDesc {
    pub fn new(shape: ColliderShape, mass: MassClass) -> Self {
        Self {
            shape,
            mass,
            position: Vec2::ZERO,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            material: Material::default(),
        }
    }

    pub fn dynamic(shape: ColliderShape) -> Self {
        Self::new(shape, MassClass::Dynamic)
    }

    pub fn fixed(shape: ColliderShape) -> Self {
        Self::new(shape, MassClass::Fixed)
    }

    pub fn infinite(shape: ColliderShape) -> Self {
        Self::new(shape, MassClass::Infinite)
    }

    pub fn with_position(mut self, pos: Vec2) -> Self {
        self.position = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.velocity = vel;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }
}

/// Handle pair referencing Rapier internals for one registered body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyHandle {
    pub(crate) body: RigidBodyHandle,
    pub(crate) collider: ColliderHandle,
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Rapier pipeline plus the body and collider sets it steps.
pub struct PhysicsWorld {
    gravity: nalgebra::Vector2<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
}

impl PhysicsWorld {
    /// Create an empty world. With a Y-up scene, `Vec2::new(0.0, -9.81)` is earth gravity.
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: vec2_to_na(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    pub fn gravity(&self) -> Vec2 {
        na_to_vec2(&self.gravity)
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = vec2_to_na(gravity);
    }

    /// Create a rigid body plus its collider from `desc`.
    pub fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let rb = RigidBodyBuilder::new(desc.mass.to_rapier())
            .translation(vec2_to_na(desc.position))
            .rotation(desc.rotation)
            .linvel(vec2_to_na(desc.velocity))
            .angvel(desc.angular_velocity)
            .build();

        let body = self.bodies.insert(rb);

        let collider = desc
            .shape
            .build_collider()
            .density(desc.material.density)
            .friction(desc.material.friction)
            .restitution(desc.material.restitution)
            .build();

        let collider = self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies);

        BodyHandle { body, collider }
    }

    /// Remove a body and its collider. Unknown handles are ignored.
    pub fn remove_body(&mut self, handle: BodyHandle) {
        self.bodies.remove(
            handle.body,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.get(handle.body).is_some()
    }

    /// Advance the simulation by `dt` seconds. Non-positive steps are skipped.
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 || !dt.is_finite() {
            return;
        }
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Current position and rotation of a body.
    pub fn pose(&self, handle: BodyHandle) -> Option<(Vec2, f32)> {
        self.bodies.get(handle.body).map(|rb| {
            let iso = rb.position();
            (na_to_vec2(&iso.translation.vector), iso.rotation.angle())
        })
    }

    /// Teleport a body and zero its velocity.
    pub fn set_pose(&mut self, handle: BodyHandle, position: Vec2, rotation: f32) {
        if let Some(rb) = self.bodies.get_mut(handle.body) {
            rb.set_position(nalgebra::Isometry2::new(vec2_to_na(position), rotation), true);
            rb.set_linvel(nalgebra::Vector2::zeros(), true);
            rb.set_angvel(0.0, true);
        }
    }

    pub fn velocity(&self, handle: BodyHandle) -> Vec2 {
        self.bodies
            .get(handle.body)
            .map(|rb| na_to_vec2(rb.linvel()))
            .unwrap_or(Vec2::ZERO)
    }

    pub fn angular_velocity(&self, handle: BodyHandle) -> f32 {
        self.bodies
            .get(handle.body)
            .map(|rb| rb.angvel())
            .unwrap_or(0.0)
    }

    pub fn set_velocity(&mut self, handle: BodyHandle, vel: Vec2) {
        if let Some(rb) = self.bodies.get_mut(handle.body) {
            rb.set_linvel(vec2_to_na(vel), true);
        }
    }

    /// Apply an instantaneous impulse. Only dynamic bodies respond.
    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec2) {
        if let Some(rb) = self.bodies.get_mut(handle.body) {
            rb.apply_impulse(vec2_to_na(impulse), true);
        }
    }

    /// Replace a collider's material.
    pub fn set_material(&mut self, handle: BodyHandle, material: Material) {
        if let Some(collider) = self.colliders.get_mut(handle.collider) {
            collider.set_density(material.density);
            collider.set_friction(material.friction);
            collider.set_restitution(material.restitution);
        }
    }

    /// Width and height of a collider's world-space AABB.
    pub fn aabb_extents(&self, handle: BodyHandle) -> Option<Vec2> {
        self.colliders.get(handle.collider).map(|collider| {
            let extents = collider.compute_aabb().extents();
            Vec2::new(extents.x, extents.y)
        })
    }

    /// Number of rigid bodies in the simulation.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 64.0;

    fn ball(radius: f32) -> ColliderShape {
        ColliderShape::Ball { radius }
    }

    #[test]
    fn create_and_remove_body() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let body = world.create_body(&BodyDesc::dynamic(ball(0.5)));
        assert_eq!(world.body_count(), 1);
        assert!(world.contains(body));
        world.remove_body(body);
        assert_eq!(world.body_count(), 0);
        assert!(!world.contains(body));
        // Removing twice is harmless.
        world.remove_body(body);
    }

    #[test]
    fn gravity_pulls_dynamic_body_down() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, -9.81));
        let body = world.create_body(&BodyDesc::dynamic(ball(0.5)));
        for _ in 0..10 {
            world.step(DT);
        }
        let (pos, _) = world.pose(body).unwrap();
        assert!(pos.y < 0.0, "body should fall in a Y-up world: y={}", pos.y);
    }

    #[test]
    fn fixed_and_infinite_bodies_ignore_gravity() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, -9.81));
        let floor = world.create_body(
            &BodyDesc::fixed(ColliderShape::rectangle(6.0, 0.2)).with_position(Vec2::new(0.0, -2.5)),
        );
        let platform = world.create_body(
            &BodyDesc::infinite(ColliderShape::rectangle(1.0, 0.2)).with_position(Vec2::new(3.0, 1.0)),
        );
        for _ in 0..10 {
            world.step(DT);
        }
        assert_relative_eq!(world.pose(floor).unwrap().0.y, -2.5, epsilon = 1e-5);
        assert_relative_eq!(world.pose(platform).unwrap().0.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn infinite_body_can_be_repositioned() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, -9.81));
        let platform = world.create_body(&BodyDesc::infinite(ColliderShape::rectangle(1.0, 0.2)));
        world.set_pose(platform, Vec2::new(2.0, 3.0), 0.5);
        world.step(DT);
        let (pos, rot) = world.pose(platform).unwrap();
        assert_relative_eq!(pos.x, 2.0, epsilon = 1e-5);
        assert_relative_eq!(pos.y, 3.0, epsilon = 1e-5);
        assert_relative_eq!(rot, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn set_pose_zeroes_velocity() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let body = world.create_body(
            &BodyDesc::dynamic(ball(0.5)).with_velocity(Vec2::new(4.0, -1.0)),
        );
        assert_relative_eq!(world.velocity(body).x, 4.0);
        world.set_pose(body, Vec2::new(1.0, 1.0), 0.0);
        assert_eq!(world.velocity(body), Vec2::ZERO);
        assert_eq!(world.angular_velocity(body), 0.0);
        assert_eq!(world.pose(body).unwrap().0, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn impulse_changes_velocity() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let body = world.create_body(&BodyDesc::dynamic(ball(0.5)));
        world.apply_impulse(body, Vec2::new(1.0, 0.0));
        world.step(DT);
        let vel = world.velocity(body);
        assert!(vel.x > 0.0, "velocity should be positive X: {vel:?}");
    }

    #[test]
    fn zero_dt_step_is_a_no_op() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, -9.81));
        let body = world.create_body(&BodyDesc::dynamic(ball(0.5)));
        world.step(0.0);
        world.step(-1.0);
        assert_eq!(world.pose(body).unwrap().0, Vec2::ZERO);
        assert_eq!(world.velocity(body), Vec2::ZERO);
    }

    #[test]
    fn aabb_extents_follow_rotation() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let upright = world.create_body(&BodyDesc::dynamic(ColliderShape::rectangle(2.0, 1.0)));
        let turned = world.create_body(
            &BodyDesc::dynamic(ColliderShape::rectangle(2.0, 1.0))
                .with_rotation(std::f32::consts::FRAC_PI_2),
        );
        let e = world.aabb_extents(upright).unwrap();
        assert_relative_eq!(e.x, 2.0, epsilon = 1e-3);
        assert_relative_eq!(e.y, 1.0, epsilon = 1e-3);
        let e = world.aabb_extents(turned).unwrap();
        assert_relative_eq!(e.x, 1.0, epsilon = 1e-3);
        assert_relative_eq!(e.y, 2.0, epsilon = 1e-3);
    }

    #[test]
    fn local_extents_match_shape() {
        assert_eq!(ball(0.5).extents(1.0), Vec2::splat(1.0));
        let rect = ColliderShape::rectangle(2.0, 1.0).extents(std::f32::consts::FRAC_PI_2);
        assert_relative_eq!(rect.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(rect.y, 2.0, epsilon = 1e-5);
        let tri = ColliderShape::ConvexPolygon {
            points: vec![Vec2::new(0.0, 1.0), Vec2::new(-1.0, -1.0), Vec2::new(1.0, -1.0)],
        };
        assert_eq!(tri.extents(0.0), Vec2::new(2.0, 2.0));
        let empty = ColliderShape::ConvexPolygon { points: vec![] };
        assert_eq!(empty.extents(0.3), Vec2::ZERO);
    }

    #[test]
    fn degenerate_polygon_still_creates_a_body() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let line = ColliderShape::ConvexPolygon {
            points: vec![Vec2::ZERO, Vec2::X, Vec2::new(2.0, 0.0)],
        };
        let body = world.create_body(&BodyDesc::fixed(line));
        assert!(world.contains(body));
    }

    #[test]
    fn material_defaults() {
        let mat = Material::default();
        assert_relative_eq!(mat.density, 1.0);
        assert_relative_eq!(mat.friction, 0.5);
        assert_relative_eq!(mat.restitution, 0.2);
    }

    #[test]
    fn builder_pattern() {
        let desc = BodyDesc::dynamic(ball(0.25))
            .with_position(Vec2::new(1.0, 2.0))
            .with_rotation(0.5)
            .with_velocity(Vec2::new(3.0, 0.0))
            .with_material(Material::default().with_restitution(0.0));
        assert_eq!(desc.mass, MassClass::Dynamic);
        assert_eq!(desc.position, Vec2::new(1.0, 2.0));
        assert_eq!(desc.velocity, Vec2::new(3.0, 0.0));
        assert_eq!(desc.material.restitution, 0.0);
    }

    #[test]
    fn ball_comes_to_rest_on_floor() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, -9.81));
        world.create_body(
            &BodyDesc::fixed(ColliderShape::rectangle(6.0, 0.2)).with_position(Vec2::new(0.0, -2.5)),
        );
        let ball = world.create_body(
            &BodyDesc::dynamic(ball(0.2))
                .with_material(Material::default().with_restitution(0.0)),
        );
        for _ in 0..180 {
            world.step(DT);
        }
        let (pos, _) = world.pose(ball).unwrap();
        // Floor top is at -2.4; ball radius 0.2.
        assert!((pos.y - -2.2).abs() < 0.05, "ball rests at y={}", pos.y);
    }
}
