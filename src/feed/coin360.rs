use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

use crate::config::Config;
use crate::logging::log_fetch;
use crate::snapshot::OTHERS;

/// One asset of the ranking, as returned by `site-api/coins`.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct CoinRecord {
    /// Ticker symbol
    #[serde(rename = "s", default)]
    pub symbol: String,
    #[serde(rename = "n", default)]
    pub name: String,
    /// Price in the requested currency
    #[serde(rename = "p", default)]
    pub price: Option<f64>,
    /// Price change over the period, in percent
    #[serde(rename = "ch", default)]
    pub change: Option<f64>,
    #[serde(rename = "mc", default)]
    pub market_cap: Option<f64>,
    #[serde(rename = "v", default)]
    pub volume: Option<f64>,
    #[serde(rename = "ts", default)]
    pub total_supply: Option<f64>,
    /// Category ids; `None` when the field is absent or null
    #[serde(rename = "ca", default, deserialize_with = "deserialize_category_ids")]
    pub categories: Option<Vec<String>>,
}

impl CoinRecord {
    /// Name used for the tile; falls back to the symbol for unnamed records.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.symbol
        } else {
            &self.name
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct CategoryInfo {
    pub title: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct MarketSnapshot {
    pub data: Vec<CoinRecord>,
    #[serde(default)]
    pub categories: HashMap<String, CategoryInfo>,
}

impl MarketSnapshot {
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).context("malformed coin snapshot")
    }
}

/// Category ids arrive either as strings or as integers; any other element
/// becomes the `Others` id.
fn deserialize_category_ids<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrInt {
        String(String),
        Int(i64),
        Other(IgnoredAny),
    }

    let raw: Option<Vec<StringOrInt>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|ids| {
        ids.into_iter()
            .map(|id| match id {
                StringOrInt::String(s) => s,
                StringOrInt::Int(i) => i.to_string(),
                StringOrInt::Other(_) => OTHERS.to_string(),
            })
            .collect()
    }))
}

/// Fetches a single snapshot. No caching, no retry.
pub struct SnapshotFetcher {
    client: Client,
    endpoint: Url,
}

impl SnapshotFetcher {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.http_timeout_secs))
            .user_agent(concat!("coinmap/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            client,
            endpoint: cfg.endpoint()?,
        })
    }

    pub async fn fetch(&self) -> Result<MarketSnapshot> {
        let resp = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.endpoint))?;

        let status = resp.status();
        if !status.is_success() {
            bail!("{} returned HTTP {}", self.endpoint, status);
        }

        let body = resp.text().await.context("failed to read snapshot body")?;
        let snapshot = MarketSnapshot::from_json(&body)?;

        log_fetch(
            self.endpoint.as_str(),
            status.as_u16(),
            body.len(),
            &body_digest(&body),
            snapshot.data.len(),
        );
        Ok(snapshot)
    }
}

fn body_digest(body: &str) -> String {
    hex::encode(Sha256::digest(body.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_mixed_category_ids() {
        let body = r#"{
            "data": [
                {"s": "BTC", "n": "Bitcoin", "p": 65000.5, "ch": 1.234, "mc": 1.2e12, "v": 3.1e10, "ts": 19700000, "ca": ["1", 7]},
                {"s": "XYZ", "n": "Xyz", "p": null, "mc": 10.0}
            ],
            "categories": {"1": {"title": "Currency"}, "7": {"title": "Store of Value"}}
        }"#;
        let snap = MarketSnapshot::from_json(body).unwrap();
        assert_eq!(snap.data.len(), 2);
        assert_eq!(
            snap.data[0].categories.as_deref(),
            Some(&["1".to_string(), "7".to_string()][..])
        );
        assert_eq!(snap.data[0].total_supply, Some(19_700_000.0));
        assert!(snap.data[1].categories.is_none());
        assert!(snap.data[1].price.is_none());
        assert!(snap.data[1].change.is_none());
        assert_eq!(snap.categories["7"].title, "Store of Value");
    }

    #[test]
    fn test_unrecognized_category_element_maps_to_others() {
        let body = r#"{"data": [{"s": "A", "n": "A", "ca": ["1", null, {"id": 3}, 2]}]}"#;
        let snap = MarketSnapshot::from_json(body).unwrap();
        assert_eq!(
            snap.data[0].categories.as_deref(),
            Some(&["1".to_string(), "Others".to_string(), "Others".to_string(), "2".to_string()][..])
        );
    }

    #[test]
    fn test_null_categories_is_none() {
        let body = r#"{"data": [{"s": "A", "n": "A", "ca": null}]}"#;
        let snap = MarketSnapshot::from_json(body).unwrap();
        assert!(snap.data[0].categories.is_none());
        assert!(snap.categories.is_empty());
    }

    #[test]
    fn test_missing_data_is_error() {
        assert!(MarketSnapshot::from_json(r#"{"categories": {}}"#).is_err());
        assert!(MarketSnapshot::from_json("<html>").is_err());
    }

    #[test]
    fn test_display_name_falls_back_to_symbol() {
        let rec = CoinRecord {
            symbol: "ABC".to_string(),
            ..CoinRecord::default()
        };
        assert_eq!(rec.display_name(), "ABC");
    }

    #[test]
    fn test_body_digest_is_sha256_hex() {
        assert_eq!(
            body_digest(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
