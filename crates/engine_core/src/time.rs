//! Time management for the render loop.

use std::time::{Duration, Instant};

/// Manages frame timing and delta time calculation.
#[derive(Debug)]
pub struct Time {
    /// Time when the engine started.
    start_time: Instant,
    /// Time of the last frame.
    last_frame: Instant,
    /// Duration of the last frame.
    delta: Duration,
    /// Total elapsed time since start.
    elapsed: Duration,
    /// Frame count since start.
    frame_count: u64,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_frame: now,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Update timing at the start of a new frame.
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_frame;
        self.last_frame = now;
        self.elapsed = now - self.start_time;
        self.frame_count += 1;
    }

    /// Get the delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get the delta time as a Duration.
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Get total elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Get total elapsed time as Duration.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the current FPS (averaged over last frame).
    pub fn fps(&self) -> f32 {
        if self.delta.as_secs_f32() > 0.0 {
            1.0 / self.delta.as_secs_f32()
        } else {
            0.0
        }
    }
}

/// Crude frame limiter: measures how long a frame took (encode + GPU) and
/// sleeps only the remainder of the target interval. Frames that blow the
/// budget are not slept at all; there is no catch-up or vsync matching.
#[derive(Debug)]
pub struct FramePacer {
    target: Duration,
    frame_start: Instant,
}

impl FramePacer {
    /// Create a pacer with the given target frame interval.
    pub fn new(target: Duration) -> Self {
        Self {
            target,
            frame_start: Instant::now(),
        }
    }

    /// Create a pacer targeting the given frames-per-second rate.
    pub fn from_fps(fps: u32) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / f64::from(fps.max(1))))
    }

    /// Mark the start of a frame's work.
    pub fn begin_frame(&mut self) {
        self.frame_start = Instant::now();
    }

    /// Get the target frame interval.
    pub fn target(&self) -> Duration {
        self.target
    }

    /// Time spent since `begin_frame`.
    pub fn elapsed(&self) -> Duration {
        self.frame_start.elapsed()
    }

    /// Sleep out the remainder of the frame budget, if any. Returns the
    /// duration actually slept.
    pub fn pace(&self) -> Duration {
        let worked = self.frame_start.elapsed();
        if let Some(remainder) = self.target.checked_sub(worked) {
            std::thread::sleep(remainder);
            remainder
        } else {
            Duration::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_advances_per_update() {
        let mut time = Time::new();
        std::thread::sleep(Duration::from_millis(2));
        time.update();
        assert_eq!(time.frame_count(), 1);
        assert!(time.delta() >= Duration::from_millis(1));
        assert!(time.elapsed() >= time.delta());
    }

    /// The fps and frame-count accessors feed the render loop's periodic
    /// log line; fps must be the reciprocal of the last delta.
    #[test]
    fn fps_reflects_last_delta() {
        let mut time = Time::new();
        std::thread::sleep(Duration::from_millis(4));
        time.update();
        std::thread::sleep(Duration::from_millis(4));
        time.update();
        assert_eq!(time.frame_count(), 2);
        let expected = 1.0 / time.delta_seconds();
        assert!((time.fps() - expected).abs() < 1e-3);
        assert!(time.fps() > 0.0);
    }

    /// A frame that finishes early must not hand control back before the
    /// target interval has elapsed (within scheduler tolerance).
    #[test]
    fn pacer_holds_fast_frames_to_target() {
        let target = Duration::from_millis(20);
        let mut pacer = FramePacer::new(target);
        pacer.begin_frame();
        // Near-instant frame: the pacer should sleep almost the full budget.
        let slept = pacer.pace();
        let total = pacer.elapsed();
        assert!(slept > Duration::ZERO);
        assert!(
            total >= target - Duration::from_millis(1),
            "frame released after {total:?}, target {target:?}"
        );
    }

    #[test]
    fn pacer_does_not_sleep_over_budget_frames() {
        let mut pacer = FramePacer::new(Duration::from_millis(5));
        pacer.begin_frame();
        std::thread::sleep(Duration::from_millis(8));
        assert_eq!(pacer.pace(), Duration::ZERO);
    }

    #[test]
    fn from_fps_matches_interval() {
        let pacer = FramePacer::from_fps(60);
        let secs = pacer.target().as_secs_f64();
        assert!((secs - 1.0 / 60.0).abs() < 1e-9);
    }
}
