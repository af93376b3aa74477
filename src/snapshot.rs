//! Flattens a snapshot into one row per (asset, category) pair.

use crate::feed::{CoinRecord, MarketSnapshot};

pub const OTHERS: &str = "Others";

#[derive(Debug, Clone, PartialEq)]
pub struct AssetRow {
    pub category: String,
    pub symbol: String,
    pub name: String,
    pub price: Option<f64>,
    pub change: Option<f64>,
    pub market_cap: Option<f64>,
    pub volume: Option<f64>,
    pub total_supply: Option<f64>,
}

impl AssetRow {
    fn from_record(rec: &CoinRecord, category: String) -> Self {
        Self {
            category,
            symbol: rec.symbol.clone(),
            name: rec.display_name().to_string(),
            price: rec.price,
            change: rec.change,
            market_cap: rec.market_cap,
            volume: rec.volume,
            total_supply: rec.total_supply,
        }
    }
}

/// Resolve a category id to its title; unknown ids land in `Others`.
pub fn category_title<'a>(snapshot: &'a MarketSnapshot, id: &str) -> &'a str {
    snapshot
        .categories
        .get(id)
        .map(|c| c.title.as_str())
        .unwrap_or(OTHERS)
}

/// One row per category an asset belongs to. Every row keeps the asset's full
/// market cap, so a multi-category asset is counted once per category. A
/// record without `ca` lands in `Others`; an empty `ca` yields no rows.
pub fn expand(snapshot: &MarketSnapshot) -> Vec<AssetRow> {
    let mut rows = Vec::with_capacity(snapshot.data.len());
    for rec in &snapshot.data {
        match rec.categories.as_deref() {
            Some(ids) => {
                for id in ids {
                    let title = category_title(snapshot, id).to_string();
                    rows.push(AssetRow::from_record(rec, title));
                }
            }
            None => {
                let title = category_title(snapshot, OTHERS).to_string();
                rows.push(AssetRow::from_record(rec, title));
            }
        }
    }
    rows
}
