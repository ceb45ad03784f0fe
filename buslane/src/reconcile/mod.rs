//! Identity reconciliation across anonymous arrival snapshots.
//!
//! Every poll returns a fresh snapshot with no stable vehicle identifiers.
//! To animate continuous motion instead of teleporting icons, each
//! observation must be linked to the bus it described one poll earlier. The
//! only usable signals are the bus's static trip metadata and how far its
//! ETA moved between polls.
//!
//! # Architecture
//!
//! ```text
//! previous tracked list ──┐
//!                         ├──► reconcile() ──► new tracked list
//! incoming observations ──┘        │
//!                                  └── IdAllocator (fresh identities)
//! ```
//!
//! [`reconcile`] is a pure function of its inputs (plus the injected
//! identity counter); [`LaneReconciler`] wraps it with the per-lane state
//! that persists between polls.

mod identity;
mod lane;
mod matching;

pub use identity::IdAllocator;
pub use lane::LaneReconciler;
pub use matching::{reconcile, MatchWindow, DEFAULT_WINDOW_LOWER_MIN, DEFAULT_WINDOW_UPPER_MIN};
