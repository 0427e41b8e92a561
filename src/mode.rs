// src/mode.rs
use crate::gesture::GestureSymbol;
use tracing::warn;

/// Exactly one mode is in effect at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Mode {
    Tree,
    Scattered,
    PhotoView,
}

/// Result of one state-machine tick. `pick_request` is set exactly when the
/// orchestrator must call the Pick Resolver before the transition can be
/// finalized via [`ModeStateMachine::resolve_pick`] — this is the only two-
/// phase tick in the pipeline, because picking is the only transition that
/// needs a collaborator outside the state machine itself.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickOutcome {
    pub grab: bool,
    pub grab_edge: Option<bool>,
    pub mode_changed: Option<Mode>,
    pub selection_changed: Option<Option<usize>>,
    pub pick_request: bool,
}

/// Ingests gesture symbols and a pinch latch; emits mode transitions and
/// grab events per the mode transition table.
#[derive(Debug, Clone)]
pub struct ModeStateMachine {
    mode: Mode,
    selection: Option<usize>,
    prev_grab: bool,
    prev_pinch_latched: bool,
    none_elapsed_ms: f64,
    photo_view_grace_ms: f64,
    awaiting_pick: bool,
}

impl ModeStateMachine {
    pub fn new(photo_view_grace_ms: f64) -> Self {
        Self {
            mode: Mode::Tree,
            selection: None,
            prev_grab: false,
            prev_pinch_latched: false,
            none_elapsed_ms: 0.0,
            photo_view_grace_ms,
            awaiting_pick: false,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    fn emit_grab(&mut self, grab: bool, mode_changed: Option<Mode>, selection_changed: Option<Option<usize>>) -> TickOutcome {
        let grab_edge = if grab != self.prev_grab { Some(grab) } else { None };
        self.prev_grab = grab;
        TickOutcome {
            grab,
            grab_edge,
            mode_changed,
            selection_changed,
            pick_request: false,
        }
    }

    /// Advance one tick. `dt_ms` is used only to track the PHOTO_VIEW NONE
    /// grace period. If the returned outcome has `pick_request = true`, the
    /// caller must call [`Self::resolve_pick`] before publishing events for
    /// this tick — until then, `mode_changed`/`selection_changed` on the
    /// returned outcome are not yet final for the SCATTERED+PINCH case.
    pub fn tick(&mut self, symbol: GestureSymbol, pinch_latched: bool, dt_ms: f64) -> TickOutcome {
        if self.awaiting_pick {
            warn!("state machine ticked while a pick resolution was pending; coercing by dropping the stale request");
            self.awaiting_pick = false;
        }

        let rising_edge = pinch_latched && !self.prev_pinch_latched;
        self.prev_pinch_latched = pinch_latched;

        let outcome = match (self.mode, symbol) {
            (Mode::Tree, GestureSymbol::Fist) => self.emit_grab(false, None, None),
            (Mode::Tree, GestureSymbol::Open) | (Mode::Tree, GestureSymbol::Pinch) => {
                self.mode = Mode::Scattered;
                let grab = symbol == GestureSymbol::Pinch;
                self.emit_grab(grab, Some(Mode::Scattered), None)
            }
            (Mode::Tree, GestureSymbol::None) => self.emit_grab(false, None, None),

            (Mode::Scattered, GestureSymbol::Fist) => {
                self.mode = Mode::Tree;
                let had_selection = self.selection.take();
                let sel_changed = had_selection.map(|_| None);
                self.emit_grab(false, Some(Mode::Tree), sel_changed)
            }
            (Mode::Scattered, GestureSymbol::Pinch) => {
                if rising_edge && self.selection.is_none() {
                    self.awaiting_pick = true;
                    let mut out = self.emit_grab(true, None, None);
                    out.pick_request = true;
                    out
                } else {
                    self.emit_grab(true, None, None)
                }
            }
            (Mode::Scattered, GestureSymbol::Open) | (Mode::Scattered, GestureSymbol::None) => {
                self.emit_grab(false, None, None)
            }

            (Mode::PhotoView, GestureSymbol::Pinch) => {
                self.none_elapsed_ms = 0.0;
                self.emit_grab(true, None, None)
            }
            (Mode::PhotoView, GestureSymbol::Open) | (Mode::PhotoView, GestureSymbol::Fist) => {
                self.mode = Mode::Scattered;
                self.none_elapsed_ms = 0.0;
                let had_selection = self.selection.take();
                let sel_changed = had_selection.map(|_| None);
                self.emit_grab(false, Some(Mode::Scattered), sel_changed)
            }
            (Mode::PhotoView, GestureSymbol::None) => {
                self.none_elapsed_ms += dt_ms;
                if self.none_elapsed_ms > self.photo_view_grace_ms {
                    self.mode = Mode::Scattered;
                    self.none_elapsed_ms = 0.0;
                    let had_selection = self.selection.take();
                    let sel_changed = had_selection.map(|_| None);
                    self.emit_grab(false, Some(Mode::Scattered), sel_changed)
                } else {
                    self.emit_grab(false, None, None)
                }
            }
        };

        outcome
    }

    /// Finalize a pending pick request raised by [`Self::tick`]. `picked` is
    /// the Pick Resolver's answer for this rising edge.
    pub fn resolve_pick(&mut self, picked: Option<usize>) -> TickOutcome {
        if !self.awaiting_pick {
            warn!("resolve_pick called with no pending request; coercing to a no-op");
            return TickOutcome::default();
        }
        self.awaiting_pick = false;

        match picked {
            Some(i) => {
                self.mode = Mode::PhotoView;
                self.selection = Some(i);
                TickOutcome {
                    grab: true,
                    grab_edge: None,
                    mode_changed: Some(Mode::PhotoView),
                    selection_changed: Some(Some(i)),
                    pick_request: false,
                }
            }
            None => TickOutcome::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fist_to_open_scenario() {
        let mut sm = ModeStateMachine::new(1000.0);
        assert_eq!(sm.mode(), Mode::Tree);

        let mut mode_changes = 0;
        for _ in 0..30 {
            let out = sm.tick(GestureSymbol::Fist, false, 33.0);
            assert!(!out.grab);
            if out.mode_changed.is_some() {
                mode_changes += 1;
            }
        }
        assert_eq!(mode_changes, 0);

        for i in 0..30 {
            let out = sm.tick(GestureSymbol::Open, false, 33.0);
            assert!(!out.grab);
            if i == 0 {
                assert_eq!(out.mode_changed, Some(Mode::Scattered));
                mode_changes += 1;
            } else {
                assert_eq!(out.mode_changed, None);
            }
        }
        assert_eq!(mode_changes, 1);
        assert_eq!(sm.mode(), Mode::Scattered);
    }

    #[test]
    fn pinch_pick_then_release_scenario() {
        let mut sm = ModeStateMachine::new(1000.0);
        // Enter SCATTERED with OPEN first.
        sm.tick(GestureSymbol::Open, false, 33.0);
        assert_eq!(sm.mode(), Mode::Scattered);

        // Rising edge of pinch requests a pick.
        let out = sm.tick(GestureSymbol::Pinch, true, 33.0);
        assert!(out.grab);
        assert_eq!(out.grab_edge, Some(true));
        assert!(out.pick_request);

        // Resolver finds photo 0.
        let resolved = sm.resolve_pick(Some(0));
        assert_eq!(resolved.mode_changed, Some(Mode::PhotoView));
        assert_eq!(resolved.selection_changed, Some(Some(0)));
        assert_eq!(sm.mode(), Mode::PhotoView);
        assert_eq!(sm.selection(), Some(0));

        // Continuing to pinch: no further transitions.
        for _ in 0..5 {
            let out = sm.tick(GestureSymbol::Pinch, true, 33.0);
            assert!(out.grab);
            assert_eq!(out.mode_changed, None);
        }

        // Release: falling edge, back to SCATTERED, selection cleared.
        let out = sm.tick(GestureSymbol::Open, false, 33.0);
        assert_eq!(out.grab_edge, Some(false));
        assert_eq!(out.mode_changed, Some(Mode::Scattered));
        assert_eq!(out.selection_changed, Some(None));
        assert_eq!(sm.mode(), Mode::Scattered);
        assert_eq!(sm.selection(), None);
    }

    #[test]
    fn pinch_with_no_pick_hit_stays_scattered() {
        let mut sm = ModeStateMachine::new(1000.0);
        sm.tick(GestureSymbol::Open, false, 33.0);

        let out = sm.tick(GestureSymbol::Pinch, true, 33.0);
        assert!(out.pick_request);
        let resolved = sm.resolve_pick(None);
        assert_eq!(resolved, TickOutcome::default());
        assert_eq!(sm.mode(), Mode::Scattered);

        // Continued pinching does not re-request a pick (no rising edge).
        let out2 = sm.tick(GestureSymbol::Pinch, true, 33.0);
        assert!(!out2.pick_request);
    }

    #[test]
    fn fist_resets_to_tree_from_any_mode() {
        let mut sm = ModeStateMachine::new(1000.0);
        sm.tick(GestureSymbol::Open, false, 33.0);
        sm.tick(GestureSymbol::Pinch, true, 33.0);
        sm.resolve_pick(Some(2));
        assert_eq!(sm.mode(), Mode::PhotoView);

        let out = sm.tick(GestureSymbol::Fist, false, 33.0);
        // PHOTO_VIEW + Fist -> Scattered this tick (matches Open/Fist row);
        // the next tick sees Scattered + Fist -> Tree.
        assert_eq!(out.mode_changed, Some(Mode::Scattered));
        assert_eq!(out.selection_changed, Some(None));

        let out2 = sm.tick(GestureSymbol::Fist, false, 33.0);
        assert_eq!(out2.mode_changed, Some(Mode::Tree));
        assert_eq!(sm.mode(), Mode::Tree);
    }

    #[test]
    fn no_hand_grace_in_photo_view() {
        let mut sm = ModeStateMachine::new(1000.0);
        sm.tick(GestureSymbol::Open, false, 33.0);
        sm.tick(GestureSymbol::Pinch, true, 33.0);
        sm.resolve_pick(Some(0));
        assert_eq!(sm.mode(), Mode::PhotoView);

        // 40 NONE samples at 25 Hz (40ms apart) = 1.6s.
        let mut mode_changes = vec![];
        let mut falling_edges = 0;
        for _ in 0..40 {
            let out = sm.tick(GestureSymbol::None, false, 40.0);
            if !out.grab && out.grab_edge == Some(false) {
                falling_edges += 1;
            }
            if let Some(m) = out.mode_changed {
                mode_changes.push(m);
            }
        }
        assert_eq!(falling_edges, 1, "falling edge should fire exactly once, at entry to the NONE window");
        assert_eq!(mode_changes, vec![Mode::Scattered]);
        assert_eq!(sm.mode(), Mode::Scattered);
        assert_eq!(sm.selection(), None);
    }

    #[test]
    fn grab_edges_emitted_exactly_once_per_transition() {
        let mut sm = ModeStateMachine::new(1000.0);
        sm.tick(GestureSymbol::Open, false, 33.0);
        let mut edges = 0;
        for _ in 0..5 {
            let out = sm.tick(GestureSymbol::Pinch, true, 33.0);
            if out.grab_edge.is_some() {
                edges += 1;
            }
        }
        assert_eq!(edges, 1);
    }
}
