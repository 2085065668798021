//! Dashboard page
//!
//! Panels are laid out in rows on a static HTML page, with an optional
//! sidebar selector linking to the sibling pages.
//! A crosshair follows the pointer and is mirrored on every panel of the page,
//! with a readout of the image value under the pointer.
//! Panels sharing a view zoom (mouse wheel) and pan (drag) together.

use crate::panel::{RenderedPanel, View};
use std::{fmt::Write as _, fs, path::Path};

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("failed to write the dashboard page")]
    Io(#[from] std::io::Error),
    #[error("failed to format the dashboard page")]
    Fmt(#[from] std::fmt::Error),
}
type Result<T> = std::result::Result<T, DashboardError>;

const STYLE: &str = r#"
body { margin: 0; font-family: sans-serif; display: flex; }
aside { width: 14rem; min-height: 100vh; padding: 1rem; background: #f0f2f6; box-sizing: border-box; }
aside select { width: 100%; font-size: 1rem; }
main { padding: 1rem; }
.row { display: flex; flex-wrap: wrap; gap: 1rem; margin-bottom: 1rem; }
.figure { position: relative; }
.figure img { display: block; }
.plot { position: absolute; overflow: hidden; cursor: crosshair; }
.plot img { position: absolute; max-width: none; }
.hline { position: absolute; border-top: 2px dashed #000; pointer-events: none; display: none; }
.vline { position: absolute; border-left: 2px dotted #000; pointer-events: none; display: none; }
.readout, .extent { font-size: 0.8rem; height: 1.2em; }
"#;

// Zoom and pan are expressed in fractions of the plotting area and shared by the
// panels with the same view; the crosshair is mirrored on every panel at the same
// sky position.
const SCRIPT: &str = r#"
const MAX_ZOOM = 20;
const panels = Array.from(document.querySelectorAll('.panel'));
const num = (p, keys) => keys.map((k) => parseFloat(p.dataset[k]));
const zooms = new Map();
panels.forEach((p) => {
  if (!zooms.has(p.dataset.view)) zooms.set(p.dataset.view, { k: 1, u0: 0, v0: 0, panels: [] });
  p.zoom = zooms.get(p.dataset.view);
  p.zoom.panels.push(p);
  p.values = JSON.parse(p.dataset.values);
});
function toSky(p, fx, fy) {
  const [x0, x1, y0, y1] = num(p, ['x0', 'x1', 'y0', 'y1']);
  const z = p.zoom;
  return [x0 + (z.u0 + fx / z.k) * (x1 - x0), y1 - (z.v0 + fy / z.k) * (y1 - y0)];
}
function toScreen(p, x, y) {
  const [x0, x1, y0, y1] = num(p, ['x0', 'x1', 'y0', 'y1']);
  const z = p.zoom;
  return [((x - x0) / (x1 - x0) - z.u0) * z.k, ((y1 - y) / (y1 - y0) - z.v0) * z.k];
}
function valueAt(p, x, y) {
  const [x0, x1, y0, y1, nx, ny] = num(p, ['x0', 'x1', 'y0', 'y1', 'nx', 'ny']);
  const i = Math.floor((x - x0) / (x1 - x0) * nx), j = Math.floor((y1 - y) / (y1 - y0) * ny);
  if (i < 0 || i >= nx || j < 0 || j >= ny) return null;
  return p.values[j * nx + i];
}
function crosshair(sky) {
  panels.forEach((p) => {
    if (p.dataset.crosshair !== 'true') return;
    const [l, t, r, b] = num(p, ['left', 'top', 'right', 'bottom']);
    const h = p.querySelector('.hline'), v = p.querySelector('.vline'), o = p.querySelector('.readout');
    const [fx, fy] = sky === null ? [-1, -1] : toScreen(p, sky[0], sky[1]);
    if (fx < 0 || fx > 1 || fy < 0 || fy > 1) { h.style.display = v.style.display = 'none'; o.textContent = ''; return; }
    h.style.display = v.style.display = 'block';
    h.style.left = l + 'px'; h.style.width = (r - l) + 'px'; h.style.top = (t + fy * (b - t)) + 'px';
    v.style.top = t + 'px'; v.style.height = (b - t) + 'px'; v.style.left = (l + fx * (r - l)) + 'px';
    const value = valueAt(p, sky[0], sky[1]);
    const shown = value === null ? 'NaN' : value.toExponential(3);
    o.textContent = `x: ${sky[0].toFixed(3)}", y: ${sky[1].toFixed(3)}", ${p.dataset.name}: ${shown} ${p.dataset.unit}`;
  });
}
function transform(z) {
  z.panels.forEach((p) => {
    const [l, t, r, b] = num(p, ['left', 'top', 'right', 'bottom']);
    p.querySelector('.plot img').style.transform =
      `translate(${-z.u0 * (r - l) * z.k}px, ${-z.v0 * (b - t) * z.k}px) scale(${z.k})`;
    const [xa, ya] = toSky(p, 0, 0), [xb, yb] = toSky(p, 1, 1);
    p.querySelector('.extent').textContent =
      z.k > 1 ? `x: [${xa.toFixed(2)}, ${xb.toFixed(2)}]", y: [${yb.toFixed(2)}, ${ya.toFixed(2)}]"` : '';
  });
}
const clamp = (u, k) => Math.min(Math.max(u, 0), 1 - 1 / k);
let drag = null;
window.addEventListener('mouseup', () => { drag = null; });
panels.forEach((p) => {
  const plot = p.querySelector('.plot');
  const fraction = (e) => {
    const rect = plot.getBoundingClientRect();
    return [(e.clientX - rect.left) / rect.width, (e.clientY - rect.top) / rect.height];
  };
  plot.addEventListener('mousemove', (e) => {
    const [fx, fy] = fraction(e);
    const z = p.zoom;
    if (drag !== null && drag.zoom === z) {
      z.u0 = clamp(drag.u0 - (fx - drag.fx) / z.k, z.k);
      z.v0 = clamp(drag.v0 - (fy - drag.fy) / z.k, z.k);
      transform(z);
    }
    crosshair(toSky(p, fx, fy));
  });
  plot.addEventListener('mousedown', (e) => {
    e.preventDefault();
    const [fx, fy] = fraction(e);
    drag = { zoom: p.zoom, fx, fy, u0: p.zoom.u0, v0: p.zoom.v0 };
  });
  plot.addEventListener('mouseleave', () => crosshair(null));
  plot.addEventListener('wheel', (e) => {
    e.preventDefault();
    const [fx, fy] = fraction(e);
    const z = p.zoom;
    const u = z.u0 + fx / z.k, v = z.v0 + fy / z.k;
    z.k = Math.min(Math.max(z.k * (e.deltaY < 0 ? 1.25 : 0.8), 1), MAX_ZOOM);
    z.u0 = clamp(u - fx / z.k, z.k);
    z.v0 = clamp(v - fy / z.k, z.k);
    transform(z);
    crosshair(toSky(p, fx, fy));
  }, { passive: false });
  plot.addEventListener('dblclick', () => {
    Object.assign(p.zoom, { k: 1, u0: 0, v0: 0 });
    transform(p.zoom);
  });
});
"#;

/// JSON array of the sampled values, NaN written as `null`
fn values_json(values: &[f64]) -> String {
    let values: Vec<String> = values
        .iter()
        .map(|x| {
            if x.is_finite() {
                format!("{:e}", x)
            } else {
                "null".to_string()
            }
        })
        .collect();
    format!("[{}]", values.join(","))
}

/// Escapes the HTML special characters of `text`
pub fn escape(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            c => c.to_string(),
        })
        .collect()
}

/// Sidebar selector
#[derive(Debug, Clone, PartialEq)]
pub struct Sidebar {
    pub label: String,
    /// option label and the page it links to
    pub options: Vec<(String, String)>,
    pub selected: String,
}
impl Sidebar {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            options: vec![],
            selected: String::new(),
        }
    }
    pub fn option(mut self, label: impl Into<String>, href: impl Into<String>) -> Self {
        self.options.push((label.into(), href.into()));
        self
    }
    pub fn selected(self, selected: impl Into<String>) -> Self {
        Self {
            selected: selected.into(),
            ..self
        }
    }
}

/// Dashboard page
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    title: String,
    sidebar: Option<Sidebar>,
    rows: Vec<Vec<RenderedPanel>>,
}
impl Dashboard {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
    pub fn sidebar(self, sidebar: Sidebar) -> Self {
        Self {
            sidebar: Some(sidebar),
            ..self
        }
    }
    /// Appends a row of panels
    pub fn row(mut self, panels: Vec<RenderedPanel>) -> Self {
        self.rows.push(panels);
        self
    }
    pub fn n_panel(&self) -> usize {
        self.rows.iter().map(|row| row.len()).sum()
    }
    fn panel_html(html: &mut String, panel: &RenderedPanel) -> std::fmt::Result {
        let src = escape(
            &panel
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
        let area = panel.plot_area;
        let View { x, y, .. } = panel.view;
        writeln!(
            html,
            r#"<div class="panel" data-crosshair="{}" data-left="{}" data-top="{}" data-right="{}" data-bottom="{}" data-x0="{}" data-x1="{}" data-y0="{}" data-y1="{}" data-view="{},{},{},{}" data-name="{}" data-unit="{}" data-nx="{}" data-ny="{}" data-values="{}">"#,
            panel.crosshair,
            area.left,
            area.top,
            area.right,
            area.bottom,
            x.0,
            x.1,
            y.0,
            y.1,
            x.0,
            x.1,
            y.0,
            y.1,
            escape(&panel.quantity.name),
            escape(&panel.quantity.unit),
            panel.values.nx,
            panel.values.ny,
            values_json(&panel.values.values)
        )?;
        if !panel.title.is_empty() {
            writeln!(html, "<h3>{}</h3>", escape(&panel.title))?;
        }
        let (width, height) = panel.size;
        writeln!(
            html,
            r#"<div class="figure" style="width:{}px;height:{}px">"#,
            width, height
        )?;
        writeln!(
            html,
            r#"<img src="{}" width="{}" height="{}" alt="{}" title="{}: {} [{:.3e}, {:.3e}]">"#,
            src,
            width,
            height,
            escape(&panel.title),
            escape(&panel.quantity.name),
            escape(&panel.quantity.unit),
            panel.range.0,
            panel.range.1
        )?;
        writeln!(
            html,
            r#"<div class="plot" style="left:{}px;top:{}px;width:{}px;height:{}px"><img src="{}" width="{}" height="{}" alt="" style="left:-{}px;top:-{}px;transform-origin:{}px {}px"></div>"#,
            area.left,
            area.top,
            area.width(),
            area.height(),
            src,
            width,
            height,
            area.left,
            area.top,
            area.left,
            area.top
        )?;
        writeln!(html, r#"<div class="hline"></div><div class="vline"></div>"#)?;
        writeln!(html, "</div>")?;
        writeln!(html, r#"<div class="readout"></div><div class="extent"></div>"#)?;
        writeln!(html, "</div>")
    }
    /// Returns the page HTML
    pub fn to_html(&self) -> Result<String> {
        let mut html = String::new();
        writeln!(html, "<!DOCTYPE html>")?;
        writeln!(html, r#"<html lang="en">"#)?;
        writeln!(
            html,
            r#"<head><meta charset="utf-8"><title>{}</title><style>{}</style></head>"#,
            escape(&self.title),
            STYLE
        )?;
        writeln!(html, "<body>")?;
        if let Some(sidebar) = &self.sidebar {
            writeln!(html, "<aside>")?;
            writeln!(html, "<label for=\"selector\">{}</label>", escape(&sidebar.label))?;
            writeln!(
                html,
                r#"<select id="selector" onchange="location.href=this.value">"#
            )?;
            for (label, href) in &sidebar.options {
                writeln!(
                    html,
                    r#"<option value="{}"{}>{}</option>"#,
                    escape(href),
                    if *label == sidebar.selected {
                        " selected"
                    } else {
                        ""
                    },
                    escape(label)
                )?;
            }
            writeln!(html, "</select>")?;
            writeln!(html, "</aside>")?;
        }
        writeln!(html, "<main>")?;
        writeln!(html, "<h1>{}</h1>", escape(&self.title))?;
        for row in &self.rows {
            writeln!(html, r#"<div class="row">"#)?;
            for panel in row {
                Self::panel_html(&mut html, panel)?;
            }
            writeln!(html, "</div>")?;
        }
        writeln!(html, "</main>")?;
        writeln!(html, "<script>{}</script>", SCRIPT)?;
        writeln!(html, "</body>")?;
        writeln!(html, "</html>")?;
        Ok(html)
    }
    /// Writes the page to `path`, creating the parent directories if needed
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_html()?)?;
        log::info!("{:?} written with {} panel(s)", path, self.n_panel());
        Ok(())
    }
}
