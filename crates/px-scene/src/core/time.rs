/// Fixed-step accumulator for driving the scene at a constant simulation
/// rate from variable frame times.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedTimestep {
    dt: f32,
    accumulator: f32,
    max_steps: u32,
}

impl FixedTimestep {
    /// Default cap on steps run for a single frame.
    pub const DEFAULT_MAX_STEPS: u32 = 10;

    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            max_steps: Self::DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Add a frame's elapsed time and return how many fixed steps are due.
    /// Time beyond `max_steps` steps is dropped.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        if !(self.dt > 0.0) || !frame_dt.is_finite() {
            return 0;
        }
        self.accumulator += frame_dt.max(0.0);
        self.accumulator = self.accumulator.min(self.dt * self.max_steps as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// Fraction of a step left in the accumulator, in [0, 1).
    pub fn alpha(&self) -> f32 {
        if self.dt > 0.0 {
            self.accumulator / self.dt
        } else {
            0.0
        }
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }
}
