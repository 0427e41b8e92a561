// src/events.rs
use crate::mode::Mode;
use serde::Serialize;

/// An event published by the orchestrator. Consumers (the outer rendering
/// shell) observe the pipeline only through this enum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum CoreEvent {
    /// Fired on every mode transition.
    ModeChanged(Mode),
    /// Fired on the rising or falling edge of grab. `true` = rising.
    GrabEdge(bool),
    /// Fired at render rate with the smoothed pointer.
    PointerUpdated { x: f64, y: f64, z: f64, visible: bool },
    /// Fired on selection enter/clear.
    SelectionChanged(Option<usize>),
}

/// Owner-writer discipline: the orchestrator is the only publisher, and a
/// sink is the only way to observe events. Keeps the core decoupled from any
/// concrete transport: no scattered mutation, one write path.
pub trait EventSink {
    fn publish(&mut self, event: CoreEvent);
}

impl<F: FnMut(CoreEvent)> EventSink for F {
    fn publish(&mut self, event: CoreEvent) {
        (self)(event)
    }
}

/// Simple `Vec`-backed sink, convenient for tests and the demo binary.
#[derive(Debug, Default, Clone)]
pub struct EventLog(pub Vec<CoreEvent>);

impl EventSink for EventLog {
    fn publish(&mut self, event: CoreEvent) {
        self.0.push(event);
    }
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode_changes(&self) -> impl Iterator<Item = Mode> + '_ {
        self.0.iter().filter_map(|e| match e {
            CoreEvent::ModeChanged(m) => Some(*m),
            _ => None,
        })
    }

    pub fn grab_edges(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().filter_map(|e| match e {
            CoreEvent::GrabEdge(rising) => Some(*rising),
            _ => None,
        })
    }
}
