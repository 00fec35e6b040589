//! Per-agent behavior loops.
//!
//! Every living agent runs on its own thread: a fixed-period tick preceded by
//! a random startup jitter. Agents never wait for events — mailbox checks are
//! non-blocking — and the only blocking points are the tick sleep and the
//! travel/break-in pauses, neither of which holds the graph lock.
//!
//! Death is single-entry: the only way a loop ends is by observing a kill
//! event in its own mailbox, whether queued by an attacker, by an infection,
//! or by the agent itself when a survival counter crosses its threshold.

mod person;
mod zombie;

pub use person::PersonAgent;
pub use zombie::ZombieAgent;

/// Outcome of a single behavior tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The agent lives on; schedule another tick.
    Continue,
    /// The agent observed its kill event and has left the world.
    Dead,
}
