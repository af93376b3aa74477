use crate::snapshot::AssetRow;

pub const SYMBOL_FONT_PX: f64 = 20.0;
pub const DETAIL_FONT_PX: f64 = 16.0;

#[derive(Debug, Clone, PartialEq)]
pub struct LabelLine {
    pub text: String,
    pub font_px: f64,
    pub bold: bool,
}

/// Text drawn inside an asset tile: symbol, price, change.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub lines: Vec<LabelLine>,
}

impl Label {
    pub fn for_row(row: &AssetRow) -> Self {
        Self::new(&row.symbol, row.price, row.change)
    }

    pub fn new(symbol: &str, price: Option<f64>, change: Option<f64>) -> Self {
        Self {
            lines: vec![
                LabelLine {
                    text: symbol.to_string(),
                    font_px: SYMBOL_FONT_PX,
                    bold: true,
                },
                LabelLine {
                    text: affixed("$", price, ""),
                    font_px: DETAIL_FONT_PX,
                    bold: false,
                },
                LabelLine {
                    text: affixed("", change, "%"),
                    font_px: DETAIL_FONT_PX,
                    bold: false,
                },
            ],
        }
    }

    pub fn plain(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Height of the text block at scale 1.0, with 1.2 line spacing.
    pub fn block_height(&self) -> f64 {
        self.lines.iter().map(|l| l.font_px * 1.2).sum()
    }

    /// Rough width of the widest line at scale 1.0.
    pub fn block_width(&self) -> f64 {
        self.lines
            .iter()
            .map(|l| approx_text_width(&l.text, l.font_px, l.bold))
            .fold(0.0, f64::max)
    }
}

/// Average glyph advance for a sans-serif face, as a fraction of font size.
pub fn approx_text_width(text: &str, font_px: f64, bold: bool) -> f64 {
    let advance = if bold { 0.62 } else { 0.56 };
    text.chars().count() as f64 * font_px * advance
}

fn affixed(prefix: &str, value: Option<f64>, suffix: &str) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{}{}{}", prefix, fmt_rounded(value), suffix),
        _ => fmt_rounded(None),
    }
}

/// Two-decimal rounding, ties to even, that keeps at least one fractional
/// digit (`65000` -> `65000.0`, `1.50` -> `1.5`, `0.125` -> `0.12`).
pub fn fmt_rounded(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => {
            let rounded = (v * 100.0).round_ties_even() / 100.0;
            let mut s = format!("{}", rounded);
            if !s.contains('.') {
                s.push_str(".0");
            }
            s
        }
        _ => "n/a".to_string(),
    }
}
