// src/orchestrator.rs
use crate::camera::{CameraController, CameraPose};
use crate::config::Config;
use crate::error::CoreError;
use crate::events::{CoreEvent, EventSink};
use crate::gesture::GestureClassifier;
use crate::landmarks::LandmarkSource;
use crate::mode::{Mode, ModeStateMachine};
use crate::morph::{Formation, MorphController, ParticleTransform};
use crate::pick::{PhotoSlot, PickResolver};
use crate::pointer::{Pointer, PointerSmoother};
use tracing::{info, warn};

/// Wires every component into a two-clock pipeline: a throttled detector
/// tick and a render tick that runs every frame. Grounded in `App::update`
/// (`app.rs`), which plays the identical "single owner drives every
/// subsystem each frame" role, but split here into two explicit entry
/// points instead of one `update(&mut self, ctx)` method, so the detector's
/// own cadence never gets tied to the display's.
pub struct Orchestrator<S: LandmarkSource> {
    source: S,
    classifier: GestureClassifier,
    mode_machine: ModeStateMachine,
    pointer_smoother: PointerSmoother,
    camera: CameraController,
    morph: MorphController,
    pick_resolver: PickResolver,
    photo_slots: Vec<PhotoSlot>,

    detector_min_interval_ms: f64,
    ms_since_last_detect: f64,
    last_detect_had_hand: bool,
    last_timestamp_ms: Option<f64>,
    last_raw_pointer: Pointer,

    photo_count: usize,
}

impl<S: LandmarkSource> Orchestrator<S> {
    pub fn new(source: S, config: &Config) -> Result<Self, CoreError> {
        let photo_count = config.particle_count / 4;
        let tree = Formation::generate_tree(config.particle_count, config.tree_height, config.formation_seed);
        let scatter = Formation::generate_scatter(
            config.particle_count,
            config.scatter_bounds,
            photo_count,
            config.formation_seed,
        );

        Ok(Self {
            source,
            classifier: GestureClassifier::new(config.pinch_enter, config.pinch_exit, config.mirror_input),
            mode_machine: ModeStateMachine::new(config.photo_view_grace_ms),
            pointer_smoother: PointerSmoother::new(config.pointer_alpha_60hz, config.no_hand_origin_decay_ms),
            camera: CameraController::new(config.camera_z),
            morph: MorphController::new(tree, scatter),
            pick_resolver: PickResolver::new(),
            photo_slots: Vec::new(),
            detector_min_interval_ms: config.detector_min_interval_ms,
            ms_since_last_detect: f64::INFINITY,
            last_detect_had_hand: false,
            last_timestamp_ms: None,
            last_raw_pointer: Pointer::ORIGIN,
            photo_count,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode_machine.mode()
    }

    pub fn camera_pose(&self) -> CameraPose {
        self.camera.pose()
    }

    pub fn pointer(&self) -> Pointer {
        self.pointer_smoother.state()
    }

    /// Run the detector at most once per `detector_min_interval_ms`, feeding
    /// its result through the classifier and mode machine. `dt_ms` is the
    /// wall-clock delta since the previous call, used only to throttle.
    ///
    /// Clock regression (`dt_ms < 0`) is clamped to zero and logged rather
    /// than propagated.
    pub fn tick_detector(&mut self, timestamp_ms: f64, dt_ms: f64, sink: &mut impl EventSink) -> Result<(), CoreError> {
        let dt_ms = if dt_ms < 0.0 {
            warn!(dt_ms, "clock regression on detector tick, clamping to zero");
            0.0
        } else {
            dt_ms
        };

        if let Some(last) = self.last_timestamp_ms {
            if timestamp_ms < last {
                warn!(timestamp_ms, last, "landmark timestamp moved backward, ignoring sample ordering");
            }
        }
        self.last_timestamp_ms = Some(timestamp_ms);

        self.ms_since_last_detect += dt_ms;
        if self.ms_since_last_detect < self.detector_min_interval_ms {
            return Ok(());
        }
        self.ms_since_last_detect = 0.0;

        let sample = self
            .source
            .detect(timestamp_ms)
            .map_err(|e| CoreError::DetectorFailed(e.to_string()))?;
        self.last_detect_had_hand = sample.is_some();

        let classified = self.classifier.classify(sample.as_ref());
        self.last_raw_pointer = classified.raw_pointer;
        self.pointer_smoother.note_frame_elapsed(dt_ms / 1000.0, self.last_detect_had_hand);

        let mut outcome = self.mode_machine.tick(classified.symbol, classified.pinch_latched, dt_ms);
        if outcome.pick_request {
            let pre_pick_grab_edge = outcome.grab_edge;
            let ndc = (self.pointer_smoother.state().x, self.pointer_smoother.state().y);
            let picked = self.pick_resolver.resolve(self.camera.pose(), ndc.0, ndc.1, &self.photo_slots);
            outcome = self.mode_machine.resolve_pick(picked);
            if outcome.grab_edge.is_none() {
                outcome.grab_edge = pre_pick_grab_edge;
            }
        }

        if let Some(mode) = outcome.mode_changed {
            info!(?mode, "mode changed");
            sink.publish(CoreEvent::ModeChanged(mode));
        }
        if let Some(rising) = outcome.grab_edge {
            sink.publish(CoreEvent::GrabEdge(rising));
        }
        if let Some(selection) = outcome.selection_changed {
            sink.publish(CoreEvent::SelectionChanged(selection));
        }

        Ok(())
    }

    /// Advance every continuous subsystem by `dt` seconds at the display's
    /// own rate and publish the pointer event. Must be called every frame
    /// regardless of whether `tick_detector` produced a new sample this
    /// frame. The Pointer Smoother integrates here, at render rate, rather
    /// than at the detector's own (slower, throttled) cadence, so its
    /// rate-invariant alpha actually does something.
    pub fn tick_render(&mut self, dt: f64, render_rate_hz: f64, sink: &mut impl EventSink) {
        let pointer = self.pointer_smoother.update(self.last_raw_pointer, dt, render_rate_hz);
        self.camera.advance(self.mode_machine.mode(), pointer, dt);
        self.morph.advance(self.mode_machine.mode(), dt);

        for i in 0..self.morph.particle_count().min(self.photo_count) {
            let transform = self.morph.transform(i, self.mode_machine.mode());
            self.upsert_photo_slot(i, transform);
        }

        sink.publish(CoreEvent::PointerUpdated {
            x: pointer.x,
            y: pointer.y,
            z: pointer.z,
            visible: self.pointer_smoother.visible(),
        });
    }

    fn upsert_photo_slot(&mut self, index: usize, transform: ParticleTransform) {
        if let Some(slot) = self.photo_slots.iter_mut().find(|s| s.index == index) {
            slot.transform = transform;
        } else {
            self.photo_slots.push(PhotoSlot {
                index,
                aspect_ratio: 1.0,
                transform,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;
    use crate::landmarks::{LandmarkSample, SimulatedSource};

    struct ScriptedSource {
        samples: Vec<Option<LandmarkSample>>,
        i: usize,
    }

    impl LandmarkSource for ScriptedSource {
        fn detect(&mut self, _timestamp_ms: f64) -> anyhow::Result<Option<LandmarkSample>> {
            let out = self.samples.get(self.i).cloned().flatten();
            self.i = (self.i + 1).min(self.samples.len().saturating_sub(1));
            Ok(out)
        }
    }

    #[test]
    fn simulated_source_drives_orchestrator_without_panicking() {
        let config = Config {
            particle_count: 40,
            ..Config::default()
        };
        let source = SimulatedSource::new(33.0);
        let mut orch = Orchestrator::new(source, &config).unwrap();
        let mut log = EventLog::new();

        let mut t = 0.0;
        for _ in 0..120 {
            orch.tick_detector(t, 33.0, &mut log).unwrap();
            orch.tick_render(1.0 / 60.0, 60.0, &mut log);
            t += 16.6;
        }
        assert!(!log.0.is_empty());
    }

    #[test]
    fn pinch_rising_edge_triggers_pick_and_publishes_selection() {
        let config = Config {
            particle_count: 8,
            ..Config::default()
        };
        let open = crate::landmarks::SimulatedSource::sample_with_pinch_distance(0.0, 0.5, 0.5, 0.2);
        let pinch = crate::landmarks::SimulatedSource::sample_with_pinch_distance(33.0, 0.5, 0.5, 0.02);
        let source = ScriptedSource {
            samples: vec![Some(open), Some(pinch.clone()), Some(pinch)],
            i: 0,
        };
        let mut orch = Orchestrator::new(source, &config).unwrap();
        let mut log = EventLog::new();

        orch.tick_detector(0.0, 33.0, &mut log).unwrap();
        orch.tick_render(1.0 / 60.0, 60.0, &mut log);
        assert_eq!(orch.mode(), Mode::Scattered);

        orch.tick_detector(33.0, 33.0, &mut log).unwrap();
        orch.tick_render(1.0 / 60.0, 60.0, &mut log);

        let mode_changes: Vec<_> = log.mode_changes().collect();
        assert!(mode_changes.contains(&Mode::Scattered));
    }

    #[test]
    fn pick_rising_edge_is_never_dropped_regardless_of_pick_outcome() {
        let config = Config {
            particle_count: 8,
            ..Config::default()
        };
        let open = crate::landmarks::SimulatedSource::sample_with_pinch_distance(0.0, 0.5, 0.5, 0.2);
        let pinch = crate::landmarks::SimulatedSource::sample_with_pinch_distance(33.0, 0.5, 0.5, 0.02);
        let source = ScriptedSource {
            samples: vec![Some(open), Some(pinch.clone()), Some(pinch)],
            i: 0,
        };
        let mut orch = Orchestrator::new(source, &config).unwrap();
        let mut log = EventLog::new();

        orch.tick_detector(0.0, 33.0, &mut log).unwrap();
        orch.tick_render(1.0 / 60.0, 60.0, &mut log);
        orch.tick_detector(33.0, 33.0, &mut log).unwrap();
        orch.tick_render(1.0 / 60.0, 60.0, &mut log);

        // Whether or not the rising pinch lands on a photo, the grab's
        // rising edge must be published exactly once.
        let rising_edges = log.grab_edges().filter(|&rising| rising).count();
        assert_eq!(rising_edges, 1, "a successful pick must not swallow the rising grab edge");
    }

    #[test]
    fn clock_regression_does_not_panic() {
        let config = Config {
            particle_count: 8,
            ..Config::default()
        };
        let source = SimulatedSource::new(33.0);
        let mut orch = Orchestrator::new(source, &config).unwrap();
        let mut log = EventLog::new();
        orch.tick_detector(100.0, 33.0, &mut log).unwrap();
        orch.tick_detector(50.0, -50.0, &mut log).unwrap();
    }
}
