//! Background Tasks Module
//!
//! Contains the background work owned by each cache.
//!
//! # Tasks
//! - Flusher: discards the whole entry table once per flush cycle

mod flusher;

pub(crate) use flusher::spawn_flusher;
pub use flusher::{FlusherHandle, FLUSHER_THREAD_NAME, MIN_FLUSH_CYCLE};
