use anyhow::{bail, Result};
use serde_json::json;
use std::path::Path;

use crate::chart::color::ColorScale;
use crate::chart::layout::ChartLayout;
use crate::chart::svg::render_svg;
use crate::chart::Treemap;
use crate::config::Config;
use crate::export;
use crate::feed::{MarketSnapshot, SnapshotFetcher};
use crate::logging::{log, obj, v_num, Domain, Level, ProfileScope};
use crate::snapshot::expand;

/// Reshape a snapshot and render it to an SVG document.
pub fn render_snapshot(snapshot: &MarketSnapshot, cfg: &Config) -> Result<String> {
    let rows = {
        let _p = ProfileScope::new("expand");
        expand(snapshot)
    };
    let tree = Treemap::build(&rows);
    if tree.is_empty() {
        bail!("snapshot has no assets with a positive market cap");
    }
    log(
        Level::Info,
        Domain::Transform,
        "treemap_built",
        obj(&[
            ("rows", json!(rows.len())),
            ("categories", json!(tree.categories.len())),
            ("assets", json!(tree.asset_count())),
            ("total_market_cap", v_num(tree.total_value())),
        ]),
    );

    let _p = ProfileScope::with_context(
        "render_svg",
        &[("width", json!(cfg.width)), ("height", json!(cfg.height))],
    );
    let scale = ColorScale::red_grey_green(cfg.color_range)?;
    let layout = ChartLayout::compute(&tree, cfg.width, cfg.height);
    Ok(render_svg(&tree, &layout, &scale))
}

/// Write the HTML page, optionally the PNG, and optionally open the page.
pub fn publish(svg: &str, cfg: &Config) -> Result<()> {
    let html_path = Path::new(&cfg.html_path);
    export::write_html(svg, html_path)?;

    if cfg.save_img {
        let _p = ProfileScope::new("write_png");
        export::write_png(svg, Path::new(&cfg.img_path), cfg.width, cfg.height)?;
    }

    if cfg.show {
        export::show(html_path)?;
    }
    Ok(())
}

/// Fetch, reshape, render, export.
pub async fn run(cfg: &Config) -> Result<()> {
    let fetcher = SnapshotFetcher::new(cfg)?;
    let snapshot = {
        let _p = ProfileScope::new("fetch");
        fetcher.fetch().await?
    };
    let svg = render_snapshot(&snapshot, cfg)?;
    publish(&svg, cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot_is_error() {
        let snap = MarketSnapshot::from_json(r#"{"data": []}"#).unwrap();
        assert!(render_snapshot(&snap, &Config::default()).is_err());
    }

    #[test]
    fn test_invalid_color_range_is_error() {
        let snap = MarketSnapshot::from_json(r#"{"data": [{"s": "A", "n": "A", "mc": 1.0}]}"#).unwrap();
        let cfg = Config {
            color_range: -1.0,
            ..Config::default()
        };
        assert!(render_snapshot(&snap, &cfg).is_err());
    }
}
