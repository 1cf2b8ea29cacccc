//! Persisted key-value store for the trail progress engine.
//!
//! Progress lives in a handful of string blobs under fixed keys. The store
//! offers no transactions and no compare-and-swap; callers that need
//! read-modify-write consistency serialize their own access.
//!
//! # Architecture
//!
//! ```text
//! Progress engine
//!     |
//!     +-- Blobs (JSON / counter encoding, I/O timeout)
//!           |
//!           +-- StoreBackend::Dragonfly  --> Dragonfly (Redis protocol)
//!           +-- StoreBackend::Memory     --> process memory
//! ```
//!
//! # Modules
//!
//! - [`backend`] -- Backend selection ([`StoreBackend`])
//! - [`blobs`] -- Typed blob access with I/O timeout ([`Blobs`])
//! - [`dragonfly`] -- `Dragonfly` (Redis-compatible) adapter
//! - [`memory`] -- In-memory store with failure injection
//! - [`keys`] -- Persisted key names
//! - [`error`] -- Shared error types

pub mod backend;
pub mod blobs;
pub mod dragonfly;
pub mod error;
pub mod keys;
pub mod memory;

// Re-export primary types for convenience.
pub use backend::StoreBackend;
pub use blobs::{Blobs, DEFAULT_IO_TIMEOUT};
pub use dragonfly::DragonflyStore;
pub use error::StoreError;
pub use memory::MemoryStore;
