#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that proposes waypoint steps for units.

use route_defence_core::{Command, Event, UnitView};

/// Pure system that reacts to movement ticks and emits advance commands.
#[derive(Debug, Default)]
pub struct Movement;

impl Movement {
    /// Creates a new movement system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Consumes world events and the unit view to emit movement commands.
    ///
    /// Nothing is emitted unless the batch contains [`Event::MovementTicked`].
    /// Units are visited in identifier order, so commands are deterministic.
    pub fn handle(&mut self, events: &[Event], unit_view: &UnitView, out: &mut Vec<Command>) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::MovementTicked))
        {
            return;
        }

        out.extend(
            unit_view
                .iter()
                .filter(|unit| unit.ready_for_step)
                .map(|unit| Command::AdvanceUnit { unit: unit.id }),
        );
    }
}
