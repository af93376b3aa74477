//! Snapshot source: the coin360 ranking endpoint.

pub mod coin360;

pub use coin360::{CategoryInfo, CoinRecord, MarketSnapshot, SnapshotFetcher};
