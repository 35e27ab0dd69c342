//! Mutation log between the presentation layer and the engine.
//!
//! The presentation layer appends [`Event`]s through an [`EventSender`]
//! while drawing a frame; the engine drains them once, in order, at the
//! start of the next reconciliation pass.

mod events;
mod queue;

pub use events::{DefinitionEdit, Event, Intent};
pub use queue::{EventQueue, EventSender};
