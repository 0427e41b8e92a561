// src/gesture.rs
use crate::landmarks::{
    LandmarkSample, INDEX_MCP, INDEX_TIP, MIDDLE_MCP, MIDDLE_TIP, PINKY_MCP, PINKY_TIP, RING_MCP,
    RING_TIP, THUMB_TIP, WRIST,
};
use crate::pointer::Pointer;

/// Closed enumeration of gesture symbols. NONE means no hand; PINCH
/// dominates OPEN when both fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureSymbol {
    Fist,
    Open,
    Pinch,
    None,
}

/// The output of one classifier tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierOutput {
    pub symbol: GestureSymbol,
    pub pinch_latched: bool,
    pub raw_pointer: Pointer,
}

/// Boolean latch with hysteresis: enters `true` below `enter`, returns
/// `false` only above `exit > enter`. Idempotent under repeated samples with
/// the same distance.
#[derive(Debug, Clone, Copy)]
struct PinchLatch {
    latched: bool,
    enter: f64,
    exit: f64,
}

impl PinchLatch {
    fn new(enter: f64, exit: f64) -> Self {
        debug_assert!(enter < exit, "PINCH_ENTER must be strictly less than PINCH_EXIT");
        Self {
            latched: false,
            enter,
            exit,
        }
    }

    /// Returns true if this update produced a rising edge.
    fn update(&mut self, distance: f64) -> bool {
        if !self.latched && distance < self.enter {
            self.latched = true;
            return true;
        }
        if self.latched && distance > self.exit {
            self.latched = false;
        }
        false
    }

    fn force_clear(&mut self) {
        self.latched = false;
    }
}

/// Per-sample pure function: landmarks -> gesture symbol, with hysteresis
/// state for the pinch latch. Grounded in the finger-curl / palm-normal
/// geometry `tracking.rs::calculate_palm_normal` and `process_hand_landmarks`
/// use, adapted to a single-hand symbol decision instead of
/// pronation/supination classification.
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    latch: PinchLatch,
    mirror_input: bool,
}

impl GestureClassifier {
    pub fn new(pinch_enter: f64, pinch_exit: f64, mirror_input: bool) -> Self {
        Self {
            latch: PinchLatch::new(pinch_enter, pinch_exit),
            mirror_input,
        }
    }

    pub fn pinch_latched(&self) -> bool {
        self.latch.latched
    }

    /// Classify one sample. Returns `None` symbol (and leaves the latch and
    /// last pointer untouched) when the sample is absent or malformed.
    pub fn classify(&mut self, sample: Option<&LandmarkSample>) -> ClassifierOutput {
        let Some(sample) = sample else {
            return ClassifierOutput {
                symbol: GestureSymbol::None,
                pinch_latched: self.latch.latched,
                raw_pointer: Pointer::ORIGIN,
            };
        };

        if !sample.is_well_formed() {
            return ClassifierOutput {
                symbol: GestureSymbol::None,
                pinch_latched: self.latch.latched,
                raw_pointer: Pointer::ORIGIN,
            };
        }

        let lm = &sample.landmarks;
        let raw_pointer = self.derive_pointer(lm);

        let curled = [
            (INDEX_TIP, INDEX_MCP),
            (MIDDLE_TIP, MIDDLE_MCP),
            (RING_TIP, RING_MCP),
            (PINKY_TIP, PINKY_MCP),
        ]
        .iter()
        .all(|&(tip, pip)| {
            let wrist = lm[WRIST].as_vector3();
            let d_tip = (lm[tip].as_vector3() - wrist).norm_squared();
            let d_pip = (lm[pip].as_vector3() - wrist).norm_squared();
            d_tip < d_pip
        });

        let pinch_distance = (lm[THUMB_TIP].as_vector3() - lm[INDEX_TIP].as_vector3()).norm();
        let _rising_edge = self.latch.update(pinch_distance);

        let symbol = if curled {
            // A fist is never a pinch.
            self.latch.force_clear();
            GestureSymbol::Fist
        } else if self.latch.latched {
            GestureSymbol::Pinch
        } else {
            GestureSymbol::Open
        };

        ClassifierOutput {
            symbol,
            pinch_latched: self.latch.latched,
            raw_pointer,
        }
    }

    fn derive_pointer(&self, lm: &[crate::landmarks::Landmark]) -> Pointer {
        let wrist = lm[WRIST].as_vector3();
        let middle_mcp = lm[MIDDLE_MCP].as_vector3();
        let c = (wrist + middle_mcp) / 2.0;

        let x = if self.mirror_input {
            (0.5 - c.x) * 2.0
        } else {
            (c.x - 0.5) * 2.0
        };
        let y = (0.5 - c.y) * 2.0;

        let palm_size = (wrist - middle_mcp).norm();
        let z = ((palm_size - 0.10) * 3.33).clamp(0.0, 1.0);

        Pointer::new(x, y, z)
    }
}
