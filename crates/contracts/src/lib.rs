//! # Contracts
//!
//! Frozen interface contracts, defining the data model and traits shared by
//! the dispatcher and every backend adapter.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Sensitivity Model
//! - Every data point carries a [`PiiLevel`]; an event carries the highest
//!   level among its points
//! - Backends declare the levels they handle (and, dangerously, bypass);
//!   forwarding is decided by set membership only

mod blueprint;
mod capability;
mod error;
mod level_set;
mod pii_level;
mod policy;
mod recording;
mod trackable;

pub use blueprint::*;
pub use capability::*;
pub use error::*;
pub use level_set::LevelSet;
pub use pii_level::PiiLevel;
pub use policy::*;
pub use recording::*;
pub use trackable::*;
