use anyhow::{bail, Context, Result};
use url::Url;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base: String,
    pub currency: String,
    pub period: String,
    pub ranking: String,
    pub http_timeout_secs: u64,
    pub save_img: bool,
    pub show: bool,
    pub img_path: String,
    pub html_path: String,
    pub width: u32,
    pub height: u32,
    /// Change (in percent) at which block color saturates
    pub color_range: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "https://coin360.com/site-api".to_string(),
            currency: "USD".to_string(),
            period: "24h".to_string(),
            ranking: "top100".to_string(),
            http_timeout_secs: 10,
            save_img: false,
            show: true,
            img_path: "img/treemap.png".to_string(),
            html_path: "out/treemap.html".to_string(),
            width: 1920,
            height: 1080,
            color_range: 1.0,
        }
    }
}

fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

impl Config {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            api_base: std::env::var("COINMAP_API_BASE").unwrap_or(d.api_base),
            currency: std::env::var("COINMAP_CURRENCY").unwrap_or(d.currency),
            period: std::env::var("COINMAP_PERIOD").unwrap_or(d.period),
            ranking: std::env::var("COINMAP_RANKING").unwrap_or(d.ranking),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(d.http_timeout_secs),
            save_img: env_flag("SAVE_IMG").unwrap_or(d.save_img),
            show: env_flag("SHOW").unwrap_or(d.show),
            img_path: std::env::var("IMG_PATH").unwrap_or(d.img_path),
            html_path: std::env::var("HTML_PATH").unwrap_or(d.html_path),
            width: std::env::var("IMG_WIDTH").ok().and_then(|v| v.parse().ok()).unwrap_or(d.width),
            height: std::env::var("IMG_HEIGHT").ok().and_then(|v| v.parse().ok()).unwrap_or(d.height),
            color_range: std::env::var("COLOR_RANGE").ok().and_then(|v| v.parse().ok()).unwrap_or(d.color_range),
        }
    }

    /// Apply command-line flags on top of the environment.
    pub fn apply_args<I>(mut self, args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--save-img" => self.save_img = true,
                "--no-show" => self.show = false,
                "--img" => {
                    self.img_path = args.next().context("--img requires a path")?;
                    self.save_img = true;
                }
                "--html" => self.html_path = args.next().context("--html requires a path")?,
                other => bail!("unknown argument: {}", other),
            }
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!("canvas size must be non-zero, got {}x{}", self.width, self.height);
        }
        if !(self.color_range.is_finite() && self.color_range > 0.0) {
            bail!("COLOR_RANGE must be a positive number, got {}", self.color_range);
        }
        Ok(())
    }

    /// Full ranking endpoint, e.g. `.../coins?currency=USD&period=24h&ranking=top100`.
    pub fn endpoint(&self) -> Result<Url> {
        let base = format!("{}/coins", self.api_base.trim_end_matches('/'));
        Url::parse_with_params(
            &base,
            &[
                ("currency", self.currency.as_str()),
                ("period", self.period.as_str()),
                ("ranking", self.ranking.as_str()),
            ],
        )
        .with_context(|| format!("invalid api base: {}", self.api_base))
    }
}
