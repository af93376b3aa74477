use anyhow::Result;
use coinmap::app;
use coinmap::config::Config;
use coinmap::logging::{log, obj, v_str, Domain, Level};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env().apply_args(std::env::args().skip(1))?;

    let endpoint = cfg.endpoint()?;
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("endpoint", v_str(endpoint.as_str())),
            ("save_img", json!(cfg.save_img)),
            ("show", json!(cfg.show)),
            ("size", json!([cfg.width, cfg.height])),
        ]),
    );

    if let Err(err) = app::run(&cfg).await {
        log(
            Level::Error,
            Domain::System,
            "run_failed",
            obj(&[("msg", v_str(&format!("{:#}", err)))]),
        );
        return Err(err);
    }

    log(Level::Info, Domain::System, "done", obj(&[("path", v_str(&cfg.html_path))]));
    Ok(())
}
