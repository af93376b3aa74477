use anyhow::{anyhow, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const GREY: Rgb = Rgb { r: 0x80, g: 0x80, b: 0x80 };

    /// Parse `#rrggbb`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(anyhow!("expected #rrggbb, got {:?}", hex));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| anyhow!("bad hex color {:?}", hex))
        };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    fn lerp(a: Rgb, b: Rgb, t: f64) -> Rgb {
        let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
        Rgb {
            r: mix(a.r, b.r),
            g: mix(a.g, b.g),
            b: mix(a.b, b.b),
        }
    }
}

/// Continuous color scale over `[lo, hi]`; stop positions are in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct ColorScale {
    stops: Vec<(f64, Rgb)>,
    lo: f64,
    hi: f64,
}

impl ColorScale {
    pub fn new(stops: Vec<(f64, Rgb)>, lo: f64, hi: f64) -> Result<Self> {
        if stops.len() < 2 {
            return Err(anyhow!("color scale needs at least two stops"));
        }
        if stops.windows(2).any(|w| w[1].0 < w[0].0) {
            return Err(anyhow!("color stops must be ascending"));
        }
        if !(lo < hi) {
            return Err(anyhow!("empty color range [{}, {}]", lo, hi));
        }
        Ok(Self { stops, lo, hi })
    }

    /// Red below zero, grey at zero, green above; saturates at `±range`.
    pub fn red_grey_green(range: f64) -> Result<Self> {
        Self::new(
            vec![
                (0.0, Rgb::from_hex("#ed7171")?),
                (0.5, Rgb::GREY),
                (1.0, Rgb::from_hex("#80c47c")?),
            ],
            -range,
            range,
        )
    }

    /// Missing values take the color at the middle of the range.
    pub fn color_for(&self, value: Option<f64>) -> Rgb {
        let t = match value {
            Some(v) if v.is_finite() => ((v - self.lo) / (self.hi - self.lo)).clamp(0.0, 1.0),
            _ => 0.5,
        };
        self.at(t)
    }

    fn at(&self, t: f64) -> Rgb {
        let first = self.stops[0];
        if t <= first.0 {
            return first.1;
        }
        for w in self.stops.windows(2) {
            let (t0, c0) = w[0];
            let (t1, c1) = w[1];
            if t <= t1 {
                let span = t1 - t0;
                let local = if span > 0.0 { (t - t0) / span } else { 1.0 };
                return Rgb::lerp(c0, c1, local);
            }
        }
        self.stops[self.stops.len() - 1].1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parse() {
        assert_eq!(Rgb::from_hex("#ed7171").unwrap(), Rgb { r: 0xed, g: 0x71, b: 0x71 });
        assert_eq!(Rgb::from_hex("80c47c").unwrap().to_hex(), "#80c47c");
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#zzzzzz").is_err());
    }

    #[test]
    fn test_scale_endpoints_and_midpoint() {
        let scale = ColorScale::red_grey_green(1.0).unwrap();
        assert_eq!(scale.color_for(Some(-1.0)).to_hex(), "#ed7171");
        assert_eq!(scale.color_for(Some(0.0)), Rgb::GREY);
        assert_eq!(scale.color_for(Some(1.0)).to_hex(), "#80c47c");
    }

    #[test]
    fn test_scale_clamps_out_of_range() {
        let scale = ColorScale::red_grey_green(1.0).unwrap();
        assert_eq!(scale.color_for(Some(-12.0)), scale.color_for(Some(-1.0)));
        assert_eq!(scale.color_for(Some(40.0)), scale.color_for(Some(1.0)));
    }

    #[test]
    fn test_missing_value_is_grey() {
        let scale = ColorScale::red_grey_green(5.0).unwrap();
        assert_eq!(scale.color_for(None), Rgb::GREY);
        assert_eq!(scale.color_for(Some(f64::NAN)), Rgb::GREY);
    }

    #[test]
    fn test_interpolates_between_stops() {
        let scale = ColorScale::red_grey_green(1.0).unwrap();
        // halfway between grey (0x80) and green (0x80,0xc4,0x7c)
        let c = scale.color_for(Some(0.5));
        assert_eq!(c, Rgb { r: 0x80, g: 0xa2, b: 0x7e });
    }

    #[test]
    fn test_new_rejects_bad_input() {
        assert!(ColorScale::new(vec![(0.0, Rgb::GREY)], -1.0, 1.0).is_err());
        assert!(ColorScale::new(vec![(0.0, Rgb::GREY), (1.0, Rgb::GREY)], 1.0, 1.0).is_err());
    }
}
