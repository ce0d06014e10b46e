//! Services layer (ports + adapters).
//!
//! - `ports`: pure contracts/types used by the store.
//! - `adapters`: OS specific implementations (disk IO, data directories).

pub mod adapters;
pub mod ports;
