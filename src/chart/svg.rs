use std::fmt::Write as _;

use super::color::ColorScale;
use super::layout::{ChartLayout, Rect};
use super::{AssetNode, CategoryNode, Treemap};
use crate::label::{approx_text_width, fmt_rounded, Label, SYMBOL_FONT_PX};

const FONT_FAMILY: &str = "Arial, Helvetica, sans-serif";
const MIN_FONT_PX: f64 = 6.0;
const TEXT_PAD_PX: f64 = 4.0;
const LINE_HEIGHT: f64 = 1.2;

pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `1.23T`, `45.6B`, `789.0M`, `12.3K`; missing values print as `n/a`.
pub fn fmt_compact(value: Option<f64>) -> String {
    let v = match value {
        Some(v) if v.is_finite() => v,
        _ => return "n/a".to_string(),
    };
    let abs = v.abs();
    let (div, suffix) = if abs >= 1e12 {
        (1e12, "T")
    } else if abs >= 1e9 {
        (1e9, "B")
    } else if abs >= 1e6 {
        (1e6, "M")
    } else if abs >= 1e3 {
        (1e3, "K")
    } else {
        (1.0, "")
    };
    format!("{:.2}{}", v / div, suffix)
}

fn asset_tooltip(asset: &AssetNode) -> String {
    format!(
        "{}\n{}\n{}\nMarket cap: {}\nVolume: {}\nTotal supply: {}",
        asset.name,
        asset.label.plain(),
        asset.category,
        fmt_compact(Some(asset.value)),
        fmt_compact(asset.volume),
        fmt_compact(asset.total_supply),
    )
}

fn category_tooltip(cat: &CategoryNode) -> String {
    format!(
        "{}\nMarket cap: {}\nAssets: {}\nChange: {}%",
        cat.title,
        fmt_compact(Some(cat.value)),
        cat.assets.len(),
        fmt_rounded(cat.change),
    )
}

fn write_rect(svg: &mut String, rect: &Rect, fill: &str) {
    let _ = writeln!(
        svg,
        "    <rect x='{:.2}' y='{:.2}' width='{:.2}' height='{:.2}' fill='{}' stroke='black' stroke-width='1'/>",
        rect.x, rect.y, rect.w, rect.h, fill
    );
}

/// Shrink factor so the label fits the tile, or `None` when it would be unreadable.
fn label_scale(label: &Label, rect: &Rect) -> Option<f64> {
    let avail_w = rect.w - 2.0 * TEXT_PAD_PX;
    let avail_h = rect.h - 2.0 * TEXT_PAD_PX;
    if avail_w <= 0.0 || avail_h <= 0.0 {
        return None;
    }
    let scale = (avail_w / label.block_width())
        .min(avail_h / label.block_height())
        .min(1.0);
    if SYMBOL_FONT_PX * scale < MIN_FONT_PX {
        None
    } else {
        Some(scale)
    }
}

fn write_label(svg: &mut String, label: &Label, rect: &Rect) {
    let Some(scale) = label_scale(label, rect) else {
        return;
    };
    let mut y = rect.cy() - label.block_height() * scale / 2.0;
    let _ = writeln!(
        svg,
        "    <text x='{:.2}' text-anchor='middle' fill='white' font-family='{}'>",
        rect.cx(),
        FONT_FAMILY
    );
    for line in &label.lines {
        let size = line.font_px * scale;
        let step = size * LINE_HEIGHT;
        // baseline sits ~80% down the line box
        let baseline = y + step * 0.8;
        let weight = if line.bold { " font-weight='700'" } else { "" };
        let _ = writeln!(
            svg,
            "      <tspan x='{:.2}' y='{:.2}' font-size='{:.1}'{}>{}</tspan>",
            rect.cx(),
            baseline,
            size,
            weight,
            escape_text(&line.text)
        );
        y += step;
    }
    let _ = writeln!(svg, "    </text>");
}

fn write_header(svg: &mut String, title: &str, header: &Rect) {
    let avail = header.w - 2.0 * TEXT_PAD_PX;
    let natural = approx_text_width(title, SYMBOL_FONT_PX, false);
    if avail <= 0.0 || natural <= 0.0 {
        return;
    }
    let size = SYMBOL_FONT_PX * (avail / natural).min(1.0);
    if size < MIN_FONT_PX {
        return;
    }
    let _ = writeln!(
        svg,
        "    <text x='{:.2}' y='{:.2}' fill='white' font-family='{}' font-size='{:.1}'>{}</text>",
        header.x + TEXT_PAD_PX,
        header.y + header.h / 2.0 + size * 0.35,
        FONT_FAMILY,
        size,
        escape_text(title)
    );
}

/// Render the treemap as a standalone SVG document with a transparent background.
pub fn render_svg(tree: &Treemap, layout: &ChartLayout, scale: &ColorScale) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg xmlns='http://www.w3.org/2000/svg' width='{:.0}' height='{:.0}' viewBox='0 0 {:.0} {:.0}' role='img'>",
        layout.width, layout.height, layout.width, layout.height
    );

    for (cat, tile) in tree.categories.iter().zip(&layout.categories) {
        let _ = writeln!(svg, "  <g class='category'>");
        let _ = writeln!(svg, "    <title>{}</title>", escape_text(&category_tooltip(cat)));
        write_rect(&mut svg, &tile.rect, &scale.color_for(cat.change).to_hex());
        if let Some(header) = &tile.header {
            write_header(&mut svg, &cat.title, header);
        }
        let _ = writeln!(svg, "  </g>");

        for (asset, rect) in cat.assets.iter().zip(&tile.assets) {
            if rect.area() <= 0.0 {
                continue;
            }
            let _ = writeln!(svg, "  <g class='asset'>");
            let _ = writeln!(svg, "    <title>{}</title>", escape_text(&asset_tooltip(asset)));
            write_rect(&mut svg, rect, &scale.color_for(asset.change).to_hex());
            write_label(&mut svg, &asset.label, rect);
            let _ = writeln!(svg, "  </g>");
        }
    }

    let _ = writeln!(svg, "</svg>");
    svg
}
