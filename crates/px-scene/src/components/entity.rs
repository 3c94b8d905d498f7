use std::fmt;

use glam::Vec2;

use crate::api::config::YAxis;
use crate::api::types::Pose;
use crate::core::physics::{BodyDesc, BodyHandle};
use crate::renderer::traits::Surface;

/// How an entity looks. Drawn in the entity's local frame: world units,
/// origin at the entity's position, already rotated and scaled.
pub trait Visual: Send + fmt::Debug {
    fn draw(&self, surface: &mut dyn Surface, y_axis: YAxis);

    /// Advance per-frame state such as sprite playback.
    fn update(&mut self, _dt: f32) {}

    /// Unrotated width and height in local units.
    fn extents(&self) -> Vec2;

    fn on_added(&mut self) {}
    fn on_removed(&mut self) {}

    fn as_opacity(&self) -> Option<&dyn HasOpacity> {
        None
    }

    fn as_opacity_mut(&mut self) -> Option<&mut dyn HasOpacity> {
        None
    }

    fn as_playback_mut(&mut self) -> Option<&mut dyn Playback> {
        None
    }

    /// Why the visual is drawing a placeholder instead of its asset, if it is.
    fn fallback_reason(&self) -> Option<&str> {
        None
    }
}

/// Capability: the visual has an opacity in [0, 1].
pub trait HasOpacity {
    fn opacity(&self) -> f32;
    fn set_opacity(&mut self, opacity: f32);
}

/// Capability: the visual is an animation that can be started and stopped.
pub trait Playback {
    fn play(&mut self, looping: bool);
    fn stop(&mut self);
    fn is_playing(&self) -> bool;
}

/// A visual that draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Invisible;

impl Visual for Invisible {
    fn draw(&self, _surface: &mut dyn Surface, _y_axis: YAxis) {}

    fn extents(&self) -> Vec2 {
        Vec2::ZERO
    }
}

/// Rigid body attached to an entity. The description persists while the
/// entity is detached; the handle exists only while it is live in a scene.
#[derive(Debug, Clone)]
pub struct PhysicsBody {
    pub(crate) desc: BodyDesc,
    pub(crate) handle: Option<BodyHandle>,
}

impl PhysicsBody {
    pub fn desc(&self) -> &BodyDesc {
        &self.desc
    }

    pub fn handle(&self) -> Option<BodyHandle> {
        self.handle
    }

    pub fn is_registered(&self) -> bool {
        self.handle.is_some()
    }
}

/// A scene object: pose, scale and tag, an optional rigid body, and the
/// visual that draws it.
#[derive(Debug)]
pub struct Entity {
    /// String tag for finding entities by name.
    pub tag: String,
    /// Hidden entities stay in the scene but are not drawn.
    pub visible: bool,
    pose: Pose,
    scale: f32,
    body: Option<PhysicsBody>,
    visual: Box<dyn Visual>,
    attached: bool,
}

impl Entity {
    pub fn new(visual: impl Visual + 'static) -> Self {
        Self {
            tag: String::new(),
            visible: true,
            pose: Pose::default(),
            scale: 1.0,
            body: None,
            visual: Box::new(visual),
            attached: false,
        }
    }

    // -- Builder pattern --

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.pose.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.pose.rotation = rotation;
        self
    }

    /// Render-only scale. Colliders keep their described size.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Attach a rigid body. The entity's pose becomes the description's pose.
    pub fn with_body(mut self, desc: BodyDesc) -> Self {
        self.pose = Pose::new(desc.position, desc.rotation);
        self.body = Some(PhysicsBody { desc, handle: None });
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    // -- Accessors --

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn position(&self) -> Vec2 {
        self.pose.position
    }

    pub fn rotation(&self) -> f32 {
        self.pose.rotation
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    /// True between the scene's add and the removal flush.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_physics_backed(&self) -> bool {
        self.body.is_some()
    }

    pub fn body(&self) -> Option<&PhysicsBody> {
        self.body.as_ref()
    }

    pub fn visual(&self) -> &dyn Visual {
        self.visual.as_ref()
    }

    pub fn visual_mut(&mut self) -> &mut dyn Visual {
        self.visual.as_mut()
    }

    pub fn opacity(&self) -> Option<f32> {
        self.visual.as_opacity().map(|o| o.opacity())
    }

    /// Returns `false` when the visual has no opacity.
    pub fn set_opacity(&mut self, opacity: f32) -> bool {
        match self.visual.as_opacity_mut() {
            Some(o) => {
                o.set_opacity(opacity.clamp(0.0, 1.0));
                true
            }
            None => false,
        }
    }

    /// Axis-aligned width and height at the current rotation, computed
    /// without consulting the physics world.
    pub fn local_extents(&self) -> Vec2 {
        match &self.body {
            Some(body) => body.desc.shape.extents(self.pose.rotation),
            None => {
                let e = self.visual.extents() * self.scale.abs();
                let (sin, cos) = self.pose.rotation.sin_cos();
                Vec2::new(
                    e.x * cos.abs() + e.y * sin.abs(),
                    e.x * sin.abs() + e.y * cos.abs(),
                )
            }
        }
    }

    // -- Scene-managed state --

    pub(crate) fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    pub(crate) fn body_mut(&mut self) -> Option<&mut PhysicsBody> {
        self.body.as_mut()
    }

    pub(crate) fn on_added(&mut self) {
        self.attached = true;
        self.visual.on_added();
    }

    pub(crate) fn on_removed(&mut self) {
        self.attached = false;
        self.visual.on_removed();
    }

    pub(crate) fn update(&mut self, dt: f32) {
        self.visual.update(dt);
    }

    pub(crate) fn draw(&self, surface: &mut dyn Surface, y_axis: YAxis) {
        surface.push_transform();
        surface.translate(self.pose.position);
        surface.rotate(self.pose.rotation);
        if self.scale != 1.0 {
            surface.scale(Vec2::splat(self.scale));
        }
        self.visual.draw(surface, y_axis);
        surface.pop_transform();
    }
}
