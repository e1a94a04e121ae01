use std::time::{Duration, Instant};

/// Frames per second over one reporting window.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FpsSample {
    pub fps: f64,
    pub frame_ms: f64,
}

impl FpsSample {
    /// Window title with the rate prepended.
    pub fn title(&self, base: &str) -> String {
        format!("[{:.1} fps  {:.3} ms] {base}", self.fps, self.frame_ms)
    }
}

/// Counts presented frames and reports the rate about once per second.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
    period: Duration,
}

impl FpsCounter {
    pub fn new(start: Instant) -> Self {
        Self {
            window_start: start,
            frames: 0,
            period: Duration::from_secs(1),
        }
    }

    /// Counts a frame presented at `now`.
    ///
    /// Returns a sample once at least one period has elapsed since the last
    /// one, then starts a new window.
    pub fn frame(&mut self, now: Instant) -> Option<FpsSample> {
        self.frames += 1;

        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.period {
            return None;
        }

        let fps = f64::from(self.frames) / elapsed.as_secs_f64();
        let sample = FpsSample {
            fps,
            frame_ms: 1000.0 / fps,
        };

        self.frames = 0;
        self.window_start = now;
        Some(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_reported_within_the_first_second() {
        let start = Instant::now();
        let mut fps = FpsCounter::new(start);
        for i in 1..=59 {
            assert_eq!(fps.frame(start + Duration::from_millis(i * 16)), None);
        }
    }

    #[test]
    fn rate_covers_the_whole_window() {
        let start = Instant::now();
        let mut fps = FpsCounter::new(start);

        for i in 1..60 {
            fps.frame(start + Duration::from_millis(i * 10));
        }
        let sample = fps.frame(start + Duration::from_secs(1)).unwrap();

        assert!((sample.fps - 60.0).abs() < 1e-9);
        assert!((sample.frame_ms - 1000.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn counter_restarts_after_a_sample() {
        let start = Instant::now();
        let mut fps = FpsCounter::new(start);
        assert!(fps.frame(start + Duration::from_secs(2)).is_some());

        let next = fps.frame(start + Duration::from_secs(4)).unwrap();
        assert!((next.fps - 0.5).abs() < 1e-9);
    }

    #[test]
    fn title_format() {
        let sample = FpsSample {
            fps: 144.0,
            frame_ms: 1000.0 / 144.0,
        };
        assert_eq!(sample.title("Triangle"), "[144.0 fps  6.944 ms] Triangle");
    }
}
