// src/pointer.rs

/// Visibility gate epsilon.
const VISIBLE_EPSILON: f64 = 1e-3;

/// Continuous normalized hand control: x,y in [-1,1], z in [0,1] (zoom).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Pointer {
    pub const ORIGIN: Pointer = Pointer { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Low-pass filter mapping the raw pointer to a smoothed one at display
/// rate: `s <- s + alpha * (raw - s)` per component, with
/// `alpha` calibrated at 60 Hz and scaled for other render rates so the
/// effective per-second convergence is rate-invariant.
#[derive(Debug, Clone)]
pub struct PointerSmoother {
    state: Pointer,
    alpha_60hz: f64,
    visible: bool,
    no_hand_origin_decay_ms: f64,
    ms_since_last_sample: f64,
}

impl PointerSmoother {
    pub fn new(alpha_60hz: f64, no_hand_origin_decay_ms: f64) -> Self {
        Self {
            state: Pointer::ORIGIN,
            alpha_60hz,
            visible: false,
            no_hand_origin_decay_ms,
            ms_since_last_sample: 0.0,
        }
    }

    /// Rate-invariant alpha: `1 - (1 - alpha_60hz)^(rate_hz / 60)` is held
    /// constant across render rates.
    fn alpha_for_rate(&self, rate_hz: f64) -> f64 {
        1.0 - (1.0 - self.alpha_60hz).powf(rate_hz / 60.0)
    }

    /// Record that a new raw sample did (or, via the orchestrator's decay
    /// path, did not) arrive this tick; advances the no-hand-timeout clock.
    pub fn note_frame_elapsed(&mut self, dt: f64, hand_present: bool) {
        if hand_present {
            self.ms_since_last_sample = 0.0;
        } else {
            self.ms_since_last_sample += dt * 1000.0;
        }
    }

    /// Advance the smoother by `dt` seconds toward `raw`. If no hand has
    /// been seen for >= `no_hand_origin_decay_ms`, `raw` is overridden to
    /// collapse to the origin regardless of the caller-supplied value.
    pub fn update(&mut self, raw: Pointer, dt: f64, render_rate_hz: f64) -> Pointer {
        let target = if self.ms_since_last_sample >= self.no_hand_origin_decay_ms {
            Pointer::ORIGIN
        } else {
            raw
        };

        let alpha = self.alpha_for_rate(render_rate_hz).clamp(0.0, 1.0);
        // A single Euler step per tick; dt informs the caller's render rate
        // but the calibrated alpha already encodes the time constant, so we
        // apply the rate-adjusted alpha directly rather than re-deriving it
        // from dt (dt and render_rate_hz are expected to be consistent).
        let _ = dt;
        self.state.x += alpha * (target.x - self.state.x);
        self.state.y += alpha * (target.y - self.state.y);
        self.state.z += alpha * (target.z - self.state.z);

        self.visible = self.state.x.abs() > VISIBLE_EPSILON || self.state.y.abs() > VISIBLE_EPSILON;
        self.state
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn state(&self) -> Pointer {
        self.state
    }
}
