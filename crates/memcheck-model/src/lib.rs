//! Reference memory model for load-store unit traces.
//!
//! A flat RAM window is replayed in trace order: stores are merged into it,
//! loads are compared against the value the model predicts. Replay stops at
//! the first divergence.

mod value;
mod verify;
mod window;

pub use value::{byte_match_mask, cmp_result, load_result, store_result};
pub use verify::{Mismatch, Verifier, VerifyStats, check};
pub use window::{
    CMP_WINDOW_WORDS, DEFAULT_RAM_BASE, DEFAULT_RAM_SIZE, MemoryWindow, WindowConfig, WindowError,
};
