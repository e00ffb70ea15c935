//! Liked-songs pipeline: model, remote source traits, snapshot cache,
//! pagination, orchestration, CSV export and taste analysis.

pub mod analysis;
pub mod export;
pub mod fetch;
pub mod load;
pub mod model;
pub mod source;
pub mod store;

pub use load::{load, LoadOutcome, Provenance};
pub use model::{LikedEntry, TrackRecord, UserProfile};
pub use store::SnapshotStore;
