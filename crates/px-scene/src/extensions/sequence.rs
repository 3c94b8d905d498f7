//! Delay-gated timelines of scene actions.
//!
//! ```ignore
//! let timeline = Sequence::new()
//!     .add(floor)
//!     .add_with_effect(ball, 0.0, Effect::move_in(ball, Vec2::ZERO, 1.0))
//!     .wait_seconds(2.0)
//!     .reposition(ball, Vec2::new(0.0, 3.0));
//! scene.play(timeline);
//! ```

use glam::Vec2;

use crate::api::diagnostics::Diagnostic;
use crate::api::types::EntityId;
use crate::core::scene::Scene;
use crate::extensions::animation::{Animation, TIME_EPSILON};
use crate::extensions::effect::Effect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Make the entity live and start its playback, if any.
    Add,
    /// Teleport the entity, zeroing its velocity.
    Reposition,
    /// Rotate relative to the current rotation.
    Rotate,
}

#[derive(Debug)]
enum Step {
    Add,
    MoveTo(Vec2),
    RotateBy(f32),
    /// The effect alone governs the motion.
    Effect(Effect),
    Spent,
}

#[derive(Debug)]
struct Action {
    kind: ActionKind,
    entity: EntityId,
    /// Seconds to wait after the action becomes current.
    delay: f32,
    step: Step,
}

/// Runs its actions one at a time; each fires once its delay has elapsed
/// since the previous one fired.
#[derive(Debug, Default)]
pub struct Sequence {
    actions: Vec<Action>,
    cursor: usize,
    elapsed: f32,
    finished: bool,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, kind: ActionKind, entity: EntityId, delay: f32, step: Step) -> Self {
        self.actions.push(Action {
            kind,
            entity,
            delay: delay.max(0.0),
            step,
        });
        self
    }

    pub fn add(self, entity: EntityId) -> Self {
        self.add_after(entity, 0.0)
    }

    pub fn add_after(self, entity: EntityId, delay: f32) -> Self {
        self.push(ActionKind::Add, entity, delay, Step::Add)
    }

    /// The effect is handed to the scene instead of adding directly; it is
    /// responsible for inserting the entity. Playback still starts when the
    /// action fires.
    pub fn add_with_effect(self, entity: EntityId, delay: f32, effect: Effect) -> Self {
        self.push(ActionKind::Add, entity, delay, Step::Effect(effect))
    }

    pub fn reposition(self, entity: EntityId, position: Vec2) -> Self {
        self.reposition_after(entity, position, 0.0)
    }

    pub fn reposition_after(self, entity: EntityId, position: Vec2, delay: f32) -> Self {
        self.push(ActionKind::Reposition, entity, delay, Step::MoveTo(position))
    }

    /// The destination is whatever the effect moves the entity to.
    pub fn reposition_with_effect(self, entity: EntityId, delay: f32, effect: Effect) -> Self {
        self.push(ActionKind::Reposition, entity, delay, Step::Effect(effect))
    }

    pub fn rotate(self, entity: EntityId, angle: f32) -> Self {
        self.rotate_after(entity, angle, 0.0)
    }

    pub fn rotate_after(self, entity: EntityId, angle: f32, delay: f32) -> Self {
        self.push(ActionKind::Rotate, entity, delay, Step::RotateBy(angle))
    }

    pub fn rotate_with_effect(self, entity: EntityId, delay: f32, effect: Effect) -> Self {
        self.push(ActionKind::Rotate, entity, delay, Step::Effect(effect))
    }

    /// Lengthen the delay of the last appended action. Does nothing on an
    /// empty sequence.
    pub fn wait_seconds(mut self, seconds: f32) -> Self {
        if let Some(last) = self.actions.last_mut() {
            last.delay += seconds.max(0.0);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Index of the next action to fire.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn delay_of(&self, index: usize) -> Option<f32> {
        self.actions.get(index).map(|a| a.delay)
    }

    pub fn kind_of(&self, index: usize) -> Option<ActionKind> {
        self.actions.get(index).map(|a| a.kind)
    }

    pub fn target_of(&self, index: usize) -> Option<EntityId> {
        self.actions.get(index).map(|a| a.entity)
    }

    fn execute(action: &mut Action, scene: &mut Scene) {
        let entity = action.entity;
        log::trace!("sequence {:?} on {:?}", action.kind, entity);
        match std::mem::replace(&mut action.step, Step::Spent) {
            // Effects report a missing target themselves.
            Step::Effect(effect) => scene.play(effect),
            Step::Spent => return,
            _ if !scene.exists(entity) => {
                scene.report(Diagnostic::MissingTarget { entity });
                return;
            }
            Step::Add => scene.add(entity),
            Step::MoveTo(position) => scene.set_position(entity, position),
            Step::RotateBy(angle) => scene.rotate_by(entity, angle),
        }
        if action.kind == ActionKind::Add {
            if let Some(playback) = scene
                .get_mut(entity)
                .and_then(|e| e.visual_mut().as_playback_mut())
            {
                playback.play(true);
            }
        }
    }
}

impl Animation for Sequence {
    fn update(&mut self, dt: f32, scene: &mut Scene) {
        if self.finished {
            return;
        }
        if let Some(action) = self.actions.get_mut(self.cursor) {
            self.elapsed += dt.max(0.0);
            if self.elapsed + TIME_EPSILON >= action.delay {
                Self::execute(action, scene);
                self.cursor += 1;
                self.elapsed = 0.0;
            }
        }
        self.finished = self.cursor >= self.actions.len();
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}
