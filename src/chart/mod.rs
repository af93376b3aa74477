//! Category → asset hierarchy sized by market cap.

pub mod color;
pub mod layout;
pub mod svg;

use crate::label::Label;
use crate::logging::log_skipped;
use crate::snapshot::AssetRow;

#[derive(Debug, Clone)]
pub struct AssetNode {
    pub name: String,
    pub symbol: String,
    pub category: String,
    /// Market cap, always finite and positive
    pub value: f64,
    pub change: Option<f64>,
    pub price: Option<f64>,
    pub volume: Option<f64>,
    pub total_supply: Option<f64>,
    pub label: Label,
}

#[derive(Debug, Clone)]
pub struct CategoryNode {
    pub title: String,
    pub value: f64,
    /// Market-cap-weighted mean change of the assets
    pub change: Option<f64>,
    pub assets: Vec<AssetNode>,
}

#[derive(Debug, Clone, Default)]
pub struct Treemap {
    pub categories: Vec<CategoryNode>,
}

/// Running sums for a value-weighted mean that ignores missing samples.
#[derive(Debug, Clone, Copy, Default)]
struct WeightedMean {
    weighted: f64,
    weight: f64,
}

impl WeightedMean {
    fn add(&mut self, value: Option<f64>, weight: f64) {
        if let Some(v) = value.filter(|v| v.is_finite()) {
            self.weighted += v * weight;
            self.weight += weight;
        }
    }

    fn get(&self) -> Option<f64> {
        if self.weight > 0.0 {
            Some(self.weighted / self.weight)
        } else {
            None
        }
    }
}

impl Treemap {
    pub fn build(rows: &[AssetRow]) -> Self {
        let mut categories: Vec<CategoryNode> = Vec::new();

        for row in rows {
            let value = match row.market_cap {
                Some(v) if v.is_finite() && v > 0.0 => v,
                Some(_) => {
                    log_skipped(&row.symbol, &row.category, "non_positive_market_cap");
                    continue;
                }
                None => {
                    log_skipped(&row.symbol, &row.category, "missing_market_cap");
                    continue;
                }
            };

            let idx = match categories.iter().position(|c| c.title == row.category) {
                Some(i) => i,
                None => {
                    categories.push(CategoryNode {
                        title: row.category.clone(),
                        value: 0.0,
                        change: None,
                        assets: Vec::new(),
                    });
                    categories.len() - 1
                }
            };
            let cat = &mut categories[idx];

            match cat.assets.iter_mut().find(|a| a.name == row.name) {
                Some(existing) => {
                    // Same (category, name) path: one tile, values summed.
                    let mut mean = WeightedMean::default();
                    mean.add(existing.change, existing.value);
                    mean.add(row.change, value);
                    existing.value += value;
                    existing.change = mean.get();
                    existing.label = Label::new(&existing.symbol, existing.price, existing.change);
                }
                None => cat.assets.push(AssetNode {
                    name: row.name.clone(),
                    symbol: row.symbol.clone(),
                    category: row.category.clone(),
                    value,
                    change: row.change,
                    price: row.price,
                    volume: row.volume,
                    total_supply: row.total_supply,
                    label: Label::for_row(row),
                }),
            }
        }

        for cat in &mut categories {
            let mut mean = WeightedMean::default();
            cat.value = 0.0;
            for asset in &cat.assets {
                cat.value += asset.value;
                mean.add(asset.change, asset.value);
            }
            cat.change = mean.get();
            cat.assets.sort_by(|a, b| {
                b.value
                    .total_cmp(&a.value)
                    .then_with(|| a.name.cmp(&b.name))
            });
        }
        categories.sort_by(|a, b| {
            b.value
                .total_cmp(&a.value)
                .then_with(|| a.title.cmp(&b.title))
        });

        Self { categories }
    }

    pub fn total_value(&self) -> f64 {
        self.categories.iter().map(|c| c.value).sum()
    }

    pub fn asset_count(&self) -> usize {
        self.categories.iter().map(|c| c.assets.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
