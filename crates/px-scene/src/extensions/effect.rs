//! Time-bounded effects on a single entity.
//!
//! An [`Effect`] drives an [`EffectBehavior`] through a fixed lifecycle:
//! `initialize` on the first update, `apply(t)` on every update with
//! normalized progress, and `finalize` once when progress reaches 1.
//! Behaviors sample their start values at `initialize`, not at construction.

use glam::Vec2;

use crate::api::diagnostics::Diagnostic;
use crate::api::types::EntityId;
use crate::core::scene::Scene;
use crate::extensions::animation::{Animation, TIME_EPSILON};
use crate::extensions::easing::{lerp, lerp_vec2, Easing};

/// Vertical distance covered by [`MoveIn`] and [`MoveOut`], in world units.
pub const ENTRANCE_RISE: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EffectPhase {
    #[default]
    Pending,
    Running,
    Finished,
}

/// The property-specific half of an effect.
///
/// All hooks must tolerate a target that is detached or unknown to the
/// scene; the scene's accessors ignore such ids.
pub trait EffectBehavior: Send {
    fn initialize(&mut self, scene: &mut Scene, target: EntityId);
    /// `t` is eased progress in [0, 1] (curves like `BackOut` may overshoot).
    fn apply(&mut self, scene: &mut Scene, target: EntityId, t: f32);
    fn finalize(&mut self, scene: &mut Scene, target: EntityId);
}

/// A one-shot interpolation of one entity property over `duration` seconds.
pub struct Effect {
    target: EntityId,
    duration: f32,
    elapsed: f32,
    phase: EffectPhase,
    easing: Easing,
    behavior: Box<dyn EffectBehavior>,
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("target", &self.target)
            .field("duration", &self.duration)
            .field("elapsed", &self.elapsed)
            .field("phase", &self.phase)
            .field("easing", &self.easing)
            .finish_non_exhaustive()
    }
}

impl Effect {
    /// A duration that is not positive and finite completes on the first update.
    pub fn new(target: EntityId, duration: f32, behavior: impl EffectBehavior + 'static) -> Self {
        let duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            0.0
        };
        Self {
            target,
            duration,
            elapsed: 0.0,
            phase: EffectPhase::Pending,
            easing: Easing::Linear,
            behavior: Box::new(behavior),
        }
    }

    /// Drop in from [`ENTRANCE_RISE`] above `end` while fading in; adds the target.
    pub fn move_in(target: EntityId, end: Vec2, duration: f32) -> Self {
        Self::new(target, duration, MoveIn::new(end))
    }

    /// Sink by [`ENTRANCE_RISE`] while fading out; removes the target at the end.
    pub fn move_out(target: EntityId, duration: f32) -> Self {
        Self::new(target, duration, MoveOut::default())
    }

    pub fn shift(target: EntityId, end: Vec2, duration: f32) -> Self {
        Self::new(target, duration, Shift::new(end))
    }

    pub fn transform(target: EntityId, end: Vec2, end_rotation: f32, duration: f32) -> Self {
        Self::new(target, duration, Transform::new(end, end_rotation))
    }

    pub fn fade(target: EntityId, to: f32, duration: f32) -> Self {
        Self::new(target, duration, Fade::new(to))
    }

    pub fn grow(target: EntityId, to: f32, duration: f32) -> Self {
        Self::new(target, duration, Grow::new(to))
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn target(&self) -> EntityId {
        self.target
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn phase(&self) -> EffectPhase {
        self.phase
    }

    /// Linear progress in [0, 1].
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 || self.elapsed + TIME_EPSILON >= self.duration {
            return 1.0;
        }
        (self.elapsed / self.duration).min(1.0)
    }
}

impl Animation for Effect {
    fn update(&mut self, dt: f32, scene: &mut Scene) {
        match self.phase {
            EffectPhase::Finished => return,
            EffectPhase::Pending => {
                if !scene.exists(self.target) {
                    scene.report(Diagnostic::MissingTarget {
                        entity: self.target,
                    });
                }
                self.behavior.initialize(scene, self.target);
                self.phase = EffectPhase::Running;
            }
            EffectPhase::Running => {}
        }

        self.elapsed += dt.max(0.0);
        let t = self.progress();
        self.behavior.apply(scene, self.target, self.easing.apply(t));
        if t >= 1.0 {
            self.behavior.finalize(scene, self.target);
            self.phase = EffectPhase::Finished;
        }
    }

    fn is_finished(&self) -> bool {
        self.phase == EffectPhase::Finished
    }
}

fn ensure_added(scene: &mut Scene, target: EntityId) {
    if !scene.contains(target) {
        scene.add(target);
    }
}

// ---------------------------------------------------------------------------
// Behaviors
// ---------------------------------------------------------------------------

/// Entrance: from `end + (0, rise)` at opacity 0 to `end` at opacity 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveIn {
    end: Vec2,
    rise: f32,
}

impl MoveIn {
    pub fn new(end: Vec2) -> Self {
        Self {
            end,
            rise: ENTRANCE_RISE,
        }
    }

    pub fn with_rise(mut self, rise: f32) -> Self {
        self.rise = rise;
        self
    }

    fn start(&self) -> Vec2 {
        self.end + Vec2::new(0.0, self.rise)
    }
}

impl EffectBehavior for MoveIn {
    fn initialize(&mut self, scene: &mut Scene, target: EntityId) {
        scene.set_position(target, self.start());
        scene.set_opacity(target, 0.0);
        ensure_added(scene, target);
    }

    fn apply(&mut self, scene: &mut Scene, target: EntityId, t: f32) {
        scene.set_position(target, lerp_vec2(self.start(), self.end, t));
        scene.set_opacity(target, t);
    }

    fn finalize(&mut self, scene: &mut Scene, target: EntityId) {
        scene.set_position(target, self.end);
        scene.set_opacity(target, 1.0);
    }
}

/// Exit: sinks by `rise` while fading to 0, then removes the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOut {
    rise: f32,
    start: Vec2,
}

impl Default for MoveOut {
    fn default() -> Self {
        Self {
            rise: ENTRANCE_RISE,
            start: Vec2::ZERO,
        }
    }
}

impl MoveOut {
    fn end(&self) -> Vec2 {
        self.start - Vec2::new(0.0, self.rise)
    }
}

impl EffectBehavior for MoveOut {
    fn initialize(&mut self, scene: &mut Scene, target: EntityId) {
        self.start = scene.position(target).unwrap_or(Vec2::ZERO);
        scene.set_opacity(target, 1.0);
        ensure_added(scene, target);
    }

    fn apply(&mut self, scene: &mut Scene, target: EntityId, t: f32) {
        scene.set_position(target, lerp_vec2(self.start, self.end(), t));
        scene.set_opacity(target, 1.0 - t);
    }

    fn finalize(&mut self, scene: &mut Scene, target: EntityId) {
        scene.set_position(target, self.end());
        scene.set_opacity(target, 0.0);
        scene.remove(target);
    }
}

/// Moves the target to `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shift {
    end: Vec2,
    start: Vec2,
}

impl Shift {
    pub fn new(end: Vec2) -> Self {
        Self {
            end,
            start: Vec2::ZERO,
        }
    }
}

impl EffectBehavior for Shift {
    fn initialize(&mut self, scene: &mut Scene, target: EntityId) {
        self.start = scene.position(target).unwrap_or(self.end);
        ensure_added(scene, target);
    }

    fn apply(&mut self, scene: &mut Scene, target: EntityId, t: f32) {
        scene.set_position(target, lerp_vec2(self.start, self.end, t));
    }

    fn finalize(&mut self, scene: &mut Scene, target: EntityId) {
        scene.set_position(target, self.end);
    }
}

/// Moves and rotates the target together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    end: Vec2,
    end_rotation: f32,
    start: Vec2,
    start_rotation: f32,
}

impl Transform {
    pub fn new(end: Vec2, end_rotation: f32) -> Self {
        Self {
            end,
            end_rotation,
            start: Vec2::ZERO,
            start_rotation: 0.0,
        }
    }
}

impl EffectBehavior for Transform {
    fn initialize(&mut self, scene: &mut Scene, target: EntityId) {
        self.start = scene.position(target).unwrap_or(self.end);
        self.start_rotation = scene.rotation(target).unwrap_or(self.end_rotation);
        ensure_added(scene, target);
    }

    fn apply(&mut self, scene: &mut Scene, target: EntityId, t: f32) {
        scene.set_pose(
            target,
            lerp_vec2(self.start, self.end, t),
            lerp(self.start_rotation, self.end_rotation, t),
        );
    }

    fn finalize(&mut self, scene: &mut Scene, target: EntityId) {
        scene.set_pose(target, self.end, self.end_rotation);
    }
}

/// Fades opacity from its current value to `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    to: f32,
    from: f32,
}

impl Fade {
    pub fn new(to: f32) -> Self {
        Self {
            to: to.clamp(0.0, 1.0),
            from: 1.0,
        }
    }
}

impl EffectBehavior for Fade {
    fn initialize(&mut self, scene: &mut Scene, target: EntityId) {
        self.from = scene.opacity(target).unwrap_or(1.0);
    }

    fn apply(&mut self, scene: &mut Scene, target: EntityId, t: f32) {
        scene.set_opacity(target, lerp(self.from, self.to, t));
    }

    fn finalize(&mut self, scene: &mut Scene, target: EntityId) {
        scene.set_opacity(target, self.to);
    }
}

/// Scales the target's rendering from its current scale to `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grow {
    to: f32,
    from: f32,
}

impl Grow {
    pub fn new(to: f32) -> Self {
        Self { to, from: 1.0 }
    }
}

impl EffectBehavior for Grow {
    fn initialize(&mut self, scene: &mut Scene, target: EntityId) {
        self.from = scene.render_scale(target).unwrap_or(1.0);
    }

    fn apply(&mut self, scene: &mut Scene, target: EntityId, t: f32) {
        scene.set_render_scale(target, lerp(self.from, self.to, t));
    }

    fn finalize(&mut self, scene: &mut Scene, target: EntityId) {
        scene.set_render_scale(target, self.to);
    }
}
