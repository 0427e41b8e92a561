// src/landmarks.rs
use nalgebra::Vector3;
use tracing::debug;

/// Canonical MediaPipe-style hand landmark indices used throughout the core.
pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_TIP: usize = 20;

pub const LANDMARK_COUNT: usize = 21;

/// One of 21 canonical hand keypoints: normalized image coordinates
/// (x, y in [0,1], origin top-left) and a relative depth hint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn as_vector3(self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Which hand produced a sample. Accepted but unused by the core, per
/// the landmark source contract below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handedness {
    Left,
    Right,
}

/// A single timestamped hand sample from the detector.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSample {
    /// Monotonic capture timestamp in milliseconds.
    pub timestamp_ms: f64,
    pub landmarks: Vec<Landmark>,
    pub handedness: Option<Handedness>,
}

impl LandmarkSample {
    pub fn new(timestamp_ms: f64, landmarks: Vec<Landmark>, handedness: Option<Handedness>) -> Self {
        Self {
            timestamp_ms,
            landmarks,
            handedness,
        }
    }

    /// True iff this sample has exactly 21 finite landmarks. Malformed
    /// samples (too few points, NaN coordinates) are coerced to NONE by the
    /// classifier rather than rejected with an error.
    pub fn is_well_formed(&self) -> bool {
        self.landmarks.len() >= LANDMARK_COUNT && self.landmarks.iter().all(|l| l.is_finite())
    }
}

/// The landmark detector, treated as an external collaborator. Mirrors
/// `mediapipe_bridge::MediaPipeWrapper`, which plays the identical
/// "black-box external producer of landmarks" role.
///
/// The call is synchronous from the core's perspective: an adapter wrapping
/// an asynchronous detector should block on its future inside `detect`, so
/// that the orchestrator's detector tick never itself awaits or polls a
/// runtime.
pub trait LandmarkSource {
    /// Run one inference for the frame captured at `timestamp_ms`. `Ok(None)`
    /// means no hand was found this frame; an `Err` means the detector
    /// itself failed (distinct from "no hand").
    fn detect(&mut self, timestamp_ms: f64) -> anyhow::Result<Option<LandmarkSample>>;
}

/// Deterministic synthetic hand trajectory, used by the demo binary and by
/// tests that need a driveable hand without a real detector attached.
/// Grounded directly in `ArmTracker::generate_simulation_data`
/// (`tracking.rs:260`), which exists for the same purpose.
pub struct SimulatedSource {
    t: f64,
    dt_ms: f64,
}

impl SimulatedSource {
    pub fn new(dt_ms: f64) -> Self {
        Self { t: 0.0, dt_ms }
    }

    /// Build a sample with the palm centered at `(cx, cy)` (image coords,
    /// [0,1]) and a given thumb-index distance, holding all other landmarks
    /// at a relaxed open-hand pose. Useful for hysteresis/pick tests.
    pub fn sample_with_pinch_distance(timestamp_ms: f64, cx: f64, cy: f64, pinch_distance: f64) -> LandmarkSample {
        let mut lm = vec![Landmark::new(cx, cy, 0.0); LANDMARK_COUNT];
        // Wrist and middle MCP straddle the palm center so their midpoint is (cx, cy).
        lm[WRIST] = Landmark::new(cx, cy + 0.05, 0.0);
        lm[MIDDLE_MCP] = Landmark::new(cx, cy - 0.05, 0.0);
        // Open fingers: tips further from the wrist than their PIPs.
        for (tip, pip) in [(INDEX_TIP, 6usize), (MIDDLE_TIP, 10), (RING_TIP, 14), (PINKY_TIP, 18)] {
            lm[tip] = Landmark::new(cx, cy - 0.25, 0.0);
            lm[pip] = Landmark::new(cx, cy - 0.15, 0.0);
        }
        // Thumb tip placed `pinch_distance` away from the index tip.
        lm[THUMB_TIP] = Landmark::new(lm[INDEX_TIP].x + pinch_distance, lm[INDEX_TIP].y, 0.0);
        LandmarkSample::new(timestamp_ms, lm, None)
    }
}

impl LandmarkSource for SimulatedSource {
    fn detect(&mut self, timestamp_ms: f64) -> anyhow::Result<Option<LandmarkSample>> {
        self.t += self.dt_ms / 1000.0;
        let cx = 0.5 + 0.15 * (self.t * 0.5).cos();
        let cy = 0.5 + 0.1 * self.t.sin();
        let pinch = 0.15 + 0.05 * (self.t * 0.3).sin();
        debug!(t = self.t, "simulated landmark sample");
        Ok(Some(SimulatedSource::sample_with_pinch_distance(
            timestamp_ms,
            cx,
            cy,
            pinch,
        )))
    }
}
