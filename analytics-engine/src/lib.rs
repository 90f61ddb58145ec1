//! Aggregations and filters over fetched record snapshots.
//!
//! Everything here is pure: inputs are borrowed, never mutated, and the same
//! input always yields the same output.

pub mod coerce;
pub mod community;
pub mod cost;
pub mod distribution;
pub mod filter;
pub mod summary;
pub mod timeline;

pub use coerce::*;
pub use community::*;
pub use cost::*;
pub use distribution::*;
pub use filter::*;
pub use summary::*;
pub use timeline::*;
