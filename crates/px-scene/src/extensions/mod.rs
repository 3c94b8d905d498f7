// extensions/mod.rs
//
// Timed behavior layered on top of the scene: easing curves, effects that
// interpolate one entity, and sequences that schedule scene actions.

pub mod animation;
pub mod easing;
pub mod effect;
pub mod sequence;

pub use animation::Animation;
pub use easing::{lerp, lerp_vec2, Easing};
pub use effect::{Effect, EffectBehavior, EffectPhase};
pub use sequence::{ActionKind, Sequence};
