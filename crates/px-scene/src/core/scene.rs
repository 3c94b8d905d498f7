use glam::Vec2;
use slotmap::SlotMap;

use crate::api::config::SceneConfig;
use crate::api::diagnostics::{Diagnostic, DiagnosticSink, NullSink};
use crate::api::types::{EntityId, Pose};
use crate::components::entity::Entity;
use crate::core::physics::{Material, PhysicsWorld};
use crate::extensions::animation::Animation;
use crate::renderer::camera::{Camera, ViewTransform};
use crate::renderer::traits::Surface;

/// Entity registry plus the physics world, camera and running animations.
///
/// Entities live in an arena and are referenced by [`EntityId`]. Membership
/// in the live sequence is separate from existence: `spawn` stores a detached
/// entity, `add` makes it live, `remove` marks it for detachment at the start
/// of the next `update`. Insertion order is draw order and update order.
pub struct Scene {
    config: SceneConfig,
    entities: SlotMap<EntityId, Entity>,
    live: Vec<EntityId>,
    pending_removal: Vec<EntityId>,
    animations: Vec<Box<dyn Animation>>,
    physics: PhysicsWorld,
    camera: Camera,
    diagnostics: Box<dyn DiagnosticSink>,
    frame_count: u64,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        Self::with_diagnostics(config, NullSink)
    }

    pub fn with_diagnostics(config: SceneConfig, sink: impl DiagnosticSink + 'static) -> Self {
        Self {
            physics: PhysicsWorld::new(config.gravity),
            camera: Camera::new(config.viewport(), config.default_view_scale),
            entities: SlotMap::with_key(),
            live: Vec::with_capacity(256),
            pending_removal: Vec::new(),
            animations: Vec::new(),
            diagnostics: Box::new(sink),
            frame_count: 0,
            config,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.report(diagnostic);
    }

    // -- Registry --

    /// Store an entity without making it live.
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        self.entities.insert(entity)
    }

    /// Spawn and add in one call.
    pub fn insert(&mut self, entity: Entity) -> EntityId {
        let id = self.spawn(entity);
        self.add(id);
        id
    }

    /// Make an entity live: append it, fire its added hook and register its
    /// body. Adding a live entity (pending removal included) or an unknown id
    /// does nothing.
    pub fn add(&mut self, id: EntityId) {
        if !self.entities.contains_key(id) {
            log::debug!("add ignored, unknown entity {id:?}");
            return;
        }
        if self.live.contains(&id) {
            return;
        }
        self.live.push(id);

        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        entity.on_added();
        let pose = entity.pose();
        if let Some(body) = entity.body_mut() {
            if body.handle.is_none() {
                body.desc.position = pose.position;
                body.desc.rotation = pose.rotation;
                body.handle = Some(self.physics.create_body(&body.desc));
            }
        }
        if let Some(reason) = entity.visual().fallback_reason() {
            let diagnostic = Diagnostic::AssetFallback {
                entity: id,
                reason: reason.to_string(),
            };
            self.diagnostics.report(diagnostic);
        }
        log::debug!("entity {id:?} added ({} live)", self.live.len());
    }

    /// Add several entities, preserving their order.
    pub fn add_all(&mut self, ids: impl IntoIterator<Item = EntityId>) {
        for id in ids {
            self.add(id);
        }
    }

    /// Mark a live entity for removal at the start of the next `update`.
    /// It stops being drawn and updated immediately.
    pub fn remove(&mut self, id: EntityId) {
        if !self.live.contains(&id) || self.pending_removal.contains(&id) {
            return;
        }
        self.pending_removal.push(id);
    }

    pub fn remove_all(&mut self, ids: impl IntoIterator<Item = EntityId>) {
        for id in ids {
            self.remove(id);
        }
    }

    /// Remove every live entity matching `pred`.
    pub fn remove_where(&mut self, mut pred: impl FnMut(EntityId, &Entity) -> bool) {
        let doomed: Vec<EntityId> = self
            .live
            .iter()
            .copied()
            .filter(|id| {
                self.entities
                    .get(*id)
                    .is_some_and(|entity| pred(*id, entity))
            })
            .collect();
        self.remove_all(doomed);
    }

    /// Remove every live entity.
    pub fn clear(&mut self) {
        self.remove_where(|_, _| true);
    }

    /// Detach immediately and drop the entity from the arena.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        if self.live.contains(&id) {
            self.detach(id);
            self.live.retain(|live| *live != id);
            self.pending_removal.retain(|pending| *pending != id);
        }
        self.entities.remove(id)
    }

    /// The entity is stored in the arena, live or not.
    pub fn exists(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// The entity is in the live sequence. Stays true while pending removal.
    pub fn contains(&self, id: EntityId) -> bool {
        self.live.contains(&id)
    }

    pub fn is_pending_removal(&self, id: EntityId) -> bool {
        self.pending_removal.contains(&id)
    }

    /// Number of live entities, pending removals included.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Live entities in draw order.
    pub fn live_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.live.iter().copied()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// First live entity with the given tag.
    pub fn find_by_tag(&self, tag: &str) -> Option<EntityId> {
        self.live
            .iter()
            .copied()
            .find(|id| self.entities.get(*id).is_some_and(|e| e.tag == tag))
    }

    // -- Animations --

    pub fn play(&mut self, animation: impl Animation + 'static) {
        self.animations.push(Box::new(animation));
    }

    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    // -- Frame cycle --

    /// Advance one frame: flush removals, run animations, step physics,
    /// then update every live entity in order. Negative or non-finite `dt`
    /// is treated as zero.
    pub fn update(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.flush_removals();
        self.advance_animations(dt);
        self.step_physics(dt);
        for id in &self.live {
            if self.pending_removal.contains(id) {
                continue;
            }
            if let Some(entity) = self.entities.get_mut(*id) {
                entity.update(dt);
            }
        }
    }

    /// Clear, apply the camera, and draw visible live entities back to front.
    pub fn draw(&mut self, surface: &mut dyn Surface) {
        let y_axis = self.config.y_axis;
        surface.begin_frame();
        surface.set_background(self.config.background);
        surface.push_transform();
        self.camera.apply(surface, y_axis);
        for id in &self.live {
            if self.pending_removal.contains(id) {
                continue;
            }
            match self.entities.get(*id) {
                Some(entity) if entity.visible => entity.draw(surface, y_axis),
                _ => {}
            }
        }
        surface.pop_transform();
        surface.end_frame();
        self.frame_count += 1;
    }

    /// Number of completed `draw` calls.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn flush_removals(&mut self) {
        if self.pending_removal.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending_removal);
        self.live.retain(|id| !pending.contains(id));
        for id in pending {
            self.detach(id);
        }
    }

    /// Fire the removed hook and unregister the body, keeping its state.
    fn detach(&mut self, id: EntityId) {
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        if let Some(body) = entity.body_mut() {
            if let Some(handle) = body.handle.take() {
                body.desc.velocity = self.physics.velocity(handle);
                body.desc.angular_velocity = self.physics.angular_velocity(handle);
                self.physics.remove_body(handle);
            }
        }
        entity.on_removed();
        log::debug!("entity {id:?} detached");
    }

    fn advance_animations(&mut self, dt: f32) {
        if self.animations.is_empty() {
            return;
        }
        let mut running = std::mem::take(&mut self.animations);
        for animation in running.iter_mut() {
            animation.update(dt, self);
        }
        running.retain(|a| !a.is_finished());
        // Played during the pass; first update next tick.
        running.append(&mut self.animations);
        self.animations = running;
    }

    fn step_physics(&mut self, dt: f32) {
        self.physics.step(dt);
        for id in &self.live {
            let Some(entity) = self.entities.get_mut(*id) else {
                continue;
            };
            let Some(handle) = entity.body().and_then(|b| b.handle()) else {
                continue;
            };
            if let Some((position, rotation)) = self.physics.pose(handle) {
                entity.set_pose(Pose::new(position, rotation));
            }
        }
    }

    // -- Pose and physics --

    pub fn position(&self, id: EntityId) -> Option<Vec2> {
        self.entities.get(id).map(Entity::position)
    }

    pub fn rotation(&self, id: EntityId) -> Option<f32> {
        self.entities.get(id).map(Entity::rotation)
    }

    /// Teleport an entity. A physics body follows and loses its velocity.
    pub fn set_pose(&mut self, id: EntityId, position: Vec2, rotation: f32) {
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        entity.set_pose(Pose::new(position, rotation));
        if let Some(body) = entity.body_mut() {
            body.desc.velocity = Vec2::ZERO;
            body.desc.angular_velocity = 0.0;
            if let Some(handle) = body.handle {
                self.physics.set_pose(handle, position, rotation);
            }
        }
    }

    pub fn set_position(&mut self, id: EntityId, position: Vec2) {
        if let Some(rotation) = self.rotation(id) {
            self.set_pose(id, position, rotation);
        }
    }

    pub fn set_rotation(&mut self, id: EntityId, rotation: f32) {
        if let Some(position) = self.position(id) {
            self.set_pose(id, position, rotation);
        }
    }

    /// Rotate relative to the current angle.
    pub fn rotate_by(&mut self, id: EntityId, delta: f32) {
        if let Some(pose) = self.entities.get(id).map(Entity::pose) {
            self.set_pose(id, pose.position, pose.rotation + delta);
        }
    }

    pub fn opacity(&self, id: EntityId) -> Option<f32> {
        self.entities.get(id).and_then(Entity::opacity)
    }

    /// Returns `false` if the entity is unknown or its visual has no opacity.
    pub fn set_opacity(&mut self, id: EntityId, opacity: f32) -> bool {
        self.entities
            .get_mut(id)
            .is_some_and(|entity| entity.set_opacity(opacity))
    }

    pub fn render_scale(&self, id: EntityId) -> Option<f32> {
        self.entities.get(id).map(Entity::scale)
    }

    pub fn set_render_scale(&mut self, id: EntityId, scale: f32) {
        if let Some(entity) = self.entities.get_mut(id) {
            entity.set_scale(scale);
        }
    }

    /// Linear velocity; the stored velocity for detached bodies, zero without a body.
    pub fn velocity(&self, id: EntityId) -> Vec2 {
        let Some(body) = self.entities.get(id).and_then(Entity::body) else {
            return Vec2::ZERO;
        };
        match body.handle() {
            Some(handle) => self.physics.velocity(handle),
            None => body.desc().velocity,
        }
    }

    pub fn set_velocity(&mut self, id: EntityId, velocity: Vec2) {
        let Some(body) = self.entities.get_mut(id).and_then(Entity::body_mut) else {
            return;
        };
        match body.handle {
            Some(handle) => self.physics.set_velocity(handle, velocity),
            None => body.desc.velocity = velocity,
        }
    }

    /// Apply an impulse to a live dynamic body.
    pub fn apply_impulse(&mut self, id: EntityId, impulse: Vec2) {
        if let Some(handle) = self
            .entities
            .get(id)
            .and_then(Entity::body)
            .and_then(|b| b.handle())
        {
            self.physics.apply_impulse(handle, impulse);
        }
    }

    pub fn set_material(&mut self, id: EntityId, material: Material) {
        let Some(body) = self.entities.get_mut(id).and_then(Entity::body_mut) else {
            return;
        };
        body.desc.material = material;
        if let Some(handle) = body.handle {
            self.physics.set_material(handle, material);
        }
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    /// Width and height of the entity's bounds: the collider AABB while its
    /// body is registered, otherwise computed from its shape or visual.
    pub fn extents(&self, id: EntityId) -> Option<Vec2> {
        let entity = self.entities.get(id)?;
        let registered = entity
            .body()
            .and_then(|b| b.handle())
            .and_then(|h| self.physics.aabb_extents(h));
        Some(registered.unwrap_or_else(|| entity.local_extents()))
    }

    /// Larger side of [`Scene::extents`].
    pub fn bounding_size(&self, id: EntityId) -> Option<f32> {
        self.extents(id).map(|e| e.max_element())
    }

    // -- Camera --

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Current world↔pixel mapping.
    pub fn view(&self) -> ViewTransform {
        self.camera.view(self.config.y_axis)
    }

    pub fn reset_camera(&mut self) {
        self.camera.reset();
    }

    /// Frame every live physics-backed entity. Does nothing if there are none.
    pub fn fit_to_all(&mut self) {
        let mut bounds: Option<(Vec2, Vec2)> = None;
        for id in &self.live {
            if self.pending_removal.contains(id) {
                continue;
            }
            let Some(entity) = self.entities.get(*id) else {
                continue;
            };
            if !entity.is_physics_backed() {
                continue;
            }
            let half = Vec2::splat(self.bounding_size(*id).unwrap_or(0.0) / 2.0);
            let (lo, hi) = (entity.position() - half, entity.position() + half);
            bounds = Some(match bounds {
                Some((min, max)) => (min.min(lo), max.max(hi)),
                None => (lo, hi),
            });
        }
        let Some((min, max)) = bounds else {
            return;
        };
        if !self.camera.fit_bounds(min, max, self.config.fit_padding) {
            log::warn!("scene bounds have no extent, camera at default scale");
            self.report(Diagnostic::DegenerateFit { entity: None });
        }
    }

    /// Center on one entity, zoomed so its bounds times the fit margin fill the view.
    pub fn fit_to_object(&mut self, id: EntityId) {
        let (Some(position), Some(size)) = (self.position(id), self.bounding_size(id)) else {
            return;
        };
        if !self.camera.fit_object(position, size, self.config.fit_margin) {
            log::warn!("entity {id:?} has no extent, camera at default scale");
            self.report(Diagnostic::DegenerateFit { entity: Some(id) });
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}
