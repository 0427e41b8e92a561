//! Deterministic gesture-to-scene control core for a single-hand,
//! webcam-driven interactive experience: classifies hand landmarks into
//! gestures, drives a mode state machine, smooths a continuous pointer,
//! morphs a particle formation, and resolves photo picks. Camera capture,
//! landmark detection itself, and all rendering are out of scope; this
//! crate only computes the state a renderer would draw.

pub mod camera;
pub mod config;
pub mod error;
pub mod events;
pub mod gesture;
pub mod landmarks;
pub mod mode;
pub mod morph;
pub mod orchestrator;
pub mod pick;
pub mod pointer;

pub use camera::{CameraController, CameraPose};
pub use config::Config;
pub use error::CoreError;
pub use events::{CoreEvent, EventLog, EventSink};
pub use gesture::{ClassifierOutput, GestureClassifier, GestureSymbol};
pub use landmarks::{Landmark, LandmarkSample, LandmarkSource, SimulatedSource};
pub use mode::{Mode, ModeStateMachine, TickOutcome};
pub use morph::{Formation, MorphController, ParticleAttributes, ParticleTransform, Rgb};
pub use orchestrator::Orchestrator;
pub use pick::{PhotoSlot, PickResolver};
pub use pointer::{Pointer, PointerSmoother};
