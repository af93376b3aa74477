use anyhow::{anyhow, Context, Result};
use resvg::{tiny_skia, usvg};
use std::fs;
use std::path::Path;

use crate::logging::log_written;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }
    Ok(())
}

pub fn html_page(svg: &str, title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset='utf-8'>\n<title>{}</title>\n<style>\n  body {{ margin: 0; background: #111; }}\n  svg {{ display: block; width: 100vw; height: auto; }}\n  g.asset:hover rect {{ stroke: white; stroke-width: 2; }}\n</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        crate::chart::svg::escape_text(title),
        svg
    )
}

pub fn write_html(svg: &str, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let page = html_page(svg, "Crypto market treemap");
    fs::write(path, &page).with_context(|| format!("failed to write {}", path.display()))?;
    log_written("html", &path.to_string_lossy(), page.len());
    Ok(())
}

/// Rasterize `svg` to a `width` x `height` PNG.
pub fn render_png(svg: &str, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_data(svg.as_bytes(), &options).context("SVG parse failed")?;

    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or_else(|| anyhow!("pixmap allocation failed"))?;
    let size = tree.size();
    let transform = tiny_skia::Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    pixmap.encode_png().context("PNG encode failed")
}

pub fn write_png(svg: &str, path: &Path, width: u32, height: u32) -> Result<()> {
    let png = render_png(svg, width, height)?;
    ensure_parent(path)?;
    fs::write(path, &png).with_context(|| format!("failed to write {}", path.display()))?;
    log_written("png", &path.to_string_lossy(), png.len());
    Ok(())
}

/// Open the rendered page in the default browser.
pub fn show(path: &Path) -> Result<()> {
    open::that(path).with_context(|| format!("failed to open {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SVG: &str = "<svg xmlns='http://www.w3.org/2000/svg' width='40' height='20' viewBox='0 0 40 20'>\
        <rect x='0' y='0' width='20' height='20' fill='#ed7171' stroke='black' stroke-width='1'/></svg>";

    #[test]
    fn test_html_page_embeds_svg() {
        let page = html_page(SVG, "A & B");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains(SVG));
        assert!(page.contains("<title>A &amp; B</title>"));
    }

    #[test]
    fn test_render_png_signature() {
        let png = render_png(SVG, 80, 40).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_render_png_rejects_garbage() {
        assert!(render_png("not svg", 10, 10).is_err());
        assert!(render_png(SVG, 0, 10).is_err());
    }

    #[test]
    fn test_write_outputs_create_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let png_path = dir.path().join("img/nested/treemap.png");
        let html_path = dir.path().join("out/treemap.html");
        write_png(SVG, &png_path, 40, 20).unwrap();
        write_html(SVG, &html_path).unwrap();
        assert!(fs::metadata(&png_path).unwrap().len() > 8);
        assert!(fs::read_to_string(&html_path).unwrap().contains("<svg"));
    }
}
