//! Storage abstractions for AgriAid.
//!
//! `TtlCache` is the port every piece of shared state goes through.
//! `MemoryTtlCache` is the in-process implementation used by the server and
//! by tests.

pub mod cache;
pub mod memory;

pub use cache::TtlCache;
pub use memory::MemoryTtlCache;
