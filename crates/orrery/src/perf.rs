use crate::config::PerformanceConfig;

/// Frame-rate sampler with a hysteresis band, so quality does not flap around one threshold.
#[derive(Debug, Clone)]
pub struct PerformanceMonitor {
    window: f64,
    low_fps: f64,
    high_fps: f64,
    frames: u32,
    elapsed: f64,
    fps: Option<f64>,
    adaptive_quality: bool,
}

impl PerformanceMonitor {
    pub fn new(cfg: &PerformanceConfig) -> Self {
        Self {
            window: cfg.window_ms as f64 / 1000.0,
            low_fps: cfg.low_fps,
            high_fps: cfg.high_fps,
            frames: 0,
            elapsed: 0.0,
            fps: None,
            adaptive_quality: false,
        }
    }

    pub fn reconfigure(&mut self, cfg: &PerformanceConfig) {
        self.window = cfg.window_ms as f64 / 1000.0;
        self.low_fps = cfg.low_fps;
        self.high_fps = cfg.high_fps;
    }

    pub fn adaptive_quality(&self) -> bool {
        self.adaptive_quality
    }

    /// Last completed measurement, if a full window has elapsed.
    pub fn fps(&self) -> Option<f64> {
        self.fps
    }

    /// Counts one frame. Returns the new flag when a closed window flips it.
    pub fn record_frame(&mut self, dt: f64) -> Option<bool> {
        self.frames += 1;
        self.elapsed += dt.max(0.0);
        if self.elapsed < self.window {
            return None;
        }

        let fps = self.frames as f64 / self.elapsed;
        self.fps = Some(fps);
        self.frames = 0;
        self.elapsed = 0.0;

        let next = if fps < self.low_fps {
            true
        } else if fps > self.high_fps {
            false
        } else {
            self.adaptive_quality
        };

        (next != self.adaptive_quality).then(|| {
            self.adaptive_quality = next;
            next
        })
    }
}
