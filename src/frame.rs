//! Per-frame timing.
//!
//! Animation constants are expressed per reference frame (1/60 s). A tick
//! converts the real frame time into a `scale` of reference frames, so a
//! 60 Hz display advances every petal by exactly the constant each frame.

use instant::Duration;

/// At most this many reference frames are applied in one tick.
pub const MAX_FRAME_SCALE: f32 = 15.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTick {
    /// Zero-based number of this tick.
    pub index: u64,
    /// Seconds accumulated over all ticks, including this one.
    pub elapsed: f32,
    pub dt: Duration,
    /// `dt` in reference frames, clamped to [`MAX_FRAME_SCALE`].
    pub scale: f32,
}

#[derive(Clone, Debug)]
pub struct FrameClock {
    reference_fps: f32,
    elapsed: f32,
    ticks: u64,
}

impl FrameClock {
    pub fn new(reference_fps: f32) -> Self {
        Self {
            reference_fps: reference_fps.max(1.0),
            elapsed: 0.0,
            ticks: 0,
        }
    }

    pub fn tick(&mut self, dt: Duration) -> FrameTick {
        let secs = dt.as_secs_f32();
        self.elapsed += secs;
        let tick = FrameTick {
            index: self.ticks,
            elapsed: self.elapsed,
            dt,
            scale: (secs * self.reference_fps).clamp(0.0, MAX_FRAME_SCALE),
        };
        self.ticks += 1;
        tick
    }

    /// Number of ticks so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(60.0)
    }
}
