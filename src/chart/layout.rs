//! Squarified treemap layout (Bruls, Huizing, van Wijk).

use super::Treemap;

pub const MARGIN_TOP: f64 = 30.0;
pub const MARGIN_LEFT: f64 = 10.0;
pub const MARGIN_RIGHT: f64 = 10.0;
pub const MARGIN_BOTTOM: f64 = 10.0;
/// Height reserved above a category's assets for its title
pub const HEADER_PX: f64 = 26.0;
pub const PAD_PX: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x,
            y,
            w: w.max(0.0),
            h: h.max(0.0),
        }
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    pub fn cx(&self) -> f64 {
        self.x + self.w / 2.0
    }

    pub fn cy(&self) -> f64 {
        self.y + self.h / 2.0
    }

    pub fn inset(&self, top: f64, right: f64, bottom: f64, left: f64) -> Rect {
        Rect::new(
            self.x + left,
            self.y + top,
            self.w - left - right,
            self.h - top - bottom,
        )
    }

    pub fn contains(&self, other: &Rect) -> bool {
        const EPS: f64 = 1e-6;
        other.x >= self.x - EPS
            && other.y >= self.y - EPS
            && other.x + other.w <= self.x + self.w + EPS
            && other.y + other.h <= self.y + self.h + EPS
    }
}

/// Worst aspect ratio of a row of areas laid along a side of length `side`.
fn worst(row: &[f64], side: f64) -> f64 {
    let sum: f64 = row.iter().sum();
    if sum <= 0.0 || side <= 0.0 {
        return f64::INFINITY;
    }
    let max = row.iter().cloned().fold(f64::MIN, f64::max);
    let min = row.iter().cloned().fold(f64::MAX, f64::min);
    let s2 = sum * sum;
    let w2 = side * side;
    (w2 * max / s2).max(s2 / (w2 * min))
}

/// Tile `bounds` with one rect per value, areas proportional to the values.
/// Output order matches input order; values should be sorted descending for
/// the best aspect ratios.
pub fn squarify(values: &[f64], bounds: Rect) -> Vec<Rect> {
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    if total <= 0.0 || bounds.area() <= 0.0 {
        return vec![Rect::new(bounds.x, bounds.y, 0.0, 0.0); values.len()];
    }

    let scale = bounds.area() / total;
    let areas: Vec<f64> = values.iter().map(|v| v.max(0.0) * scale).collect();
    let mut out = Vec::with_capacity(values.len());
    let mut free = bounds;
    let mut i = 0;

    while i < areas.len() {
        let side = free.w.min(free.h);
        let mut j = i + 1;
        let mut best = worst(&areas[i..j], side);
        while j < areas.len() {
            let candidate = worst(&areas[i..=j], side);
            if candidate > best {
                break;
            }
            best = candidate;
            j += 1;
        }

        let row = &areas[i..j];
        let row_sum: f64 = row.iter().sum();
        if free.w >= free.h {
            // column on the left edge
            let thick = if free.h > 0.0 { row_sum / free.h } else { 0.0 };
            let mut y = free.y;
            for a in row {
                let h = if thick > 0.0 { a / thick } else { 0.0 };
                out.push(Rect::new(free.x, y, thick, h));
                y += h;
            }
            free = Rect::new(free.x + thick, free.y, free.w - thick, free.h);
        } else {
            // row along the top edge
            let thick = if free.w > 0.0 { row_sum / free.w } else { 0.0 };
            let mut x = free.x;
            for a in row {
                let w = if thick > 0.0 { a / thick } else { 0.0 };
                out.push(Rect::new(x, free.y, w, thick));
                x += w;
            }
            free = Rect::new(free.x, free.y + thick, free.w, free.h - thick);
        }
        i = j;
    }
    out
}

#[derive(Debug, Clone)]
pub struct CategoryTile {
    pub rect: Rect,
    /// Title band; `None` when the tile is too small to carry one
    pub header: Option<Rect>,
    pub assets: Vec<Rect>,
}

/// Positions for every node of a [`Treemap`], parallel to its categories.
#[derive(Debug, Clone)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub plot: Rect,
    pub categories: Vec<CategoryTile>,
}

impl ChartLayout {
    pub fn compute(tree: &Treemap, width: u32, height: u32) -> Self {
        let (width, height) = (width as f64, height as f64);
        let plot = Rect::new(
            MARGIN_LEFT,
            MARGIN_TOP,
            width - MARGIN_LEFT - MARGIN_RIGHT,
            height - MARGIN_TOP - MARGIN_BOTTOM,
        );

        let values: Vec<f64> = tree.categories.iter().map(|c| c.value).collect();
        let cat_rects = squarify(&values, plot);

        let categories = tree
            .categories
            .iter()
            .zip(cat_rects)
            .map(|(cat, rect)| {
                let has_header = rect.h > HEADER_PX + 2.0 * PAD_PX && rect.w > 2.0 * PAD_PX;
                let (header, inner) = if has_header {
                    (
                        Some(Rect::new(rect.x, rect.y, rect.w, HEADER_PX)),
                        rect.inset(HEADER_PX, PAD_PX, PAD_PX, PAD_PX),
                    )
                } else {
                    (None, rect)
                };
                let asset_values: Vec<f64> = cat.assets.iter().map(|a| a.value).collect();
                CategoryTile {
                    rect,
                    header,
                    assets: squarify(&asset_values, inner),
                }
            })
            .collect();

        Self {
            width,
            height,
            plot,
            categories,
        }
    }
}
