use crate::core::scene::Scene;

/// Slack for comparing accumulated frame times against delays and durations,
/// so sixty ticks of 1/60 s count as one full second.
pub(crate) const TIME_EPSILON: f32 = 1e-4;

/// Anything the scene advances once per update until it reports finished.
///
/// The scene takes its animation list out of itself for the pass, so an
/// animation may freely mutate the scene, including playing new animations.
/// Those join after the pass and first update on the next tick.
pub trait Animation: Send {
    fn update(&mut self, dt: f32, scene: &mut Scene);

    /// Once true, the animation is dropped and never updated again.
    fn is_finished(&self) -> bool;
}
