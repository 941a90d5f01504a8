//! SDEP grammar decoding.
//!
//! Layered structure:
//! - `layout`: byte constants of the grammar (source of truth)
//! - `message`: the message-type table and field kinds
//! - `machine`: the per-channel resynchronizing state machine
//!
//! The machine is pure state and arithmetic; it performs no I/O and has no
//! error path. Channel wiring and presentation categories live in
//! `dispatch`.

mod layout;
mod machine;
mod message;

pub use machine::{ChannelCounters, ChannelMachine, FieldEvent};
pub use message::{FieldKind, MessageType};
