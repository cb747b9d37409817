//! SVG backend for [`Scene`]s.

use crate::projector::{Grid, Scene};
use crate::renderer::{GridStyle, RenderResult, Renderer};
use flowcanvas_core::workflow::StepKind;
use kurbo::{Point, Rect};
use peniko::Color;
use std::fmt::Write;

/// Corner radius of step boxes, in screen pixels.
const STEP_RADIUS: f64 = 8.0;
const GRID_COLOR: &str = "#c8c8c8";
const GRID_STROKE: &str = r##"stroke="#c8c8c8" stroke-width="0.5""##;
const PREVIEW_STROKE: &str = r#"stroke-width="2" stroke-dasharray="6 4""#;
const TEXT_CENTERED: &str = r#"text-anchor="middle" dominant-baseline="middle""#;
const FONT_FAMILY: &str = "Inter, system-ui, sans-serif";

fn css(color: Color) -> String {
    let rgba = color.to_rgba8();
    if rgba.a == 255 {
        format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
    } else {
        format!("rgba({},{},{},{:.3})", rgba.r, rgba.g, rgba.b, rgba.a as f64 / 255.0)
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Fill color per step kind.
fn kind_fill(kind: StepKind) -> &'static str {
    match kind {
        StepKind::Task => "#eff6ff",
        StepKind::Approval => "#fef9c3",
        StepKind::Notification => "#ecfdf5",
        StepKind::Condition => "#fdf2f8",
        StepKind::Automation => "#f5f3ff",
    }
}

/// Renders scenes to an SVG document held in memory.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    output: String,
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last rendered document.
    pub fn svg(&self) -> &str {
        &self.output
    }

    pub fn into_svg(self) -> String {
        self.output
    }

    fn write_grid(&mut self, grid: &Grid, scene: &Scene) -> std::fmt::Result {
        let (width, height) = (scene.viewport.width, scene.viewport.height);
        match grid.style {
            GridStyle::None => {}
            GridStyle::Lines => {
                for x in &grid.xs {
                    writeln!(
                        self.output,
                        r#"  <line x1="{x:.1}" y1="0" x2="{x:.1}" y2="{height:.1}" {} />"#,
                        GRID_STROKE
                    )?;
                }
                for y in &grid.ys {
                    writeln!(
                        self.output,
                        r#"  <line x1="0" y1="{y:.1}" x2="{width:.1}" y2="{y:.1}" {GRID_STROKE} />"#
                    )?;
                }
            }
            GridStyle::CrossPlus => {
                let mut d = String::new();
                for x in &grid.xs {
                    for y in &grid.ys {
                        write!(d, "M{:.1},{:.1}h6M{:.1},{:.1}v6", x - 3.0, y, x, y - 3.0)?;
                    }
                }
                writeln!(
                    self.output,
                    r#"  <path d="{d}" stroke="{GRID_COLOR}" stroke-width="1" />"#
                )?;
            }
            GridStyle::Dots => {
                for x in &grid.xs {
                    for y in &grid.ys {
                        writeln!(
                            self.output,
                            r#"  <circle cx="{x:.1}" cy="{y:.1}" r="1.5" fill="{GRID_COLOR}" />"#
                        )?;
                    }
                }
            }
        }
        Ok(())
    }

    fn write_rect(
        &mut self,
        rect: Rect,
        fill: &str,
        stroke: &str,
        extra: &str,
    ) -> std::fmt::Result {
        write!(
            self.output,
            r#"  <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" "#,
            rect.x0,
            rect.y0,
            rect.width(),
            rect.height(),
        )?;
        writeln!(
            self.output,
            r#"rx="{STEP_RADIUS}" ry="{STEP_RADIUS}" fill="{fill}" stroke="{stroke}" {extra}/>"#
        )
    }

    fn write_text(&mut self, at: Point, text: &str, class: &str) -> std::fmt::Result {
        writeln!(
            self.output,
            r#"  <text x="{:.1}" y="{:.1}" class="{class}" {TEXT_CENTERED}>{}</text>"#,
            at.x,
            at.y,
            escape(text),
        )
    }

    fn write_scene(&mut self, scene: &Scene) -> std::fmt::Result {
        let (width, height) = (scene.viewport.width, scene.viewport.height);
        let stroke = css(scene.stroke_color);
        let highlight = css(scene.selection_color);

        writeln!(
            self.output,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width:.0}" height="{height:.0}" "#
        )?;
        writeln!(
            self.output,
            r#"  viewBox="0 0 {width:.0} {height:.0}" font-family="{FONT_FAMILY}">"#
        )?;
        let background = css(scene.background);
        writeln!(self.output, r#"  <rect width="100%" height="100%" fill="{background}" />"#)?;

        if let Some(grid) = &scene.grid {
            self.write_grid(grid, scene)?;
        }

        for transition in &scene.transitions {
            let color = if transition.selected { &highlight } else { &stroke };
            let width = if transition.selected { 3.0 } else { 2.0 };
            writeln!(
                self.output,
                r#"  <path d="{}" fill="none" stroke="{color}" stroke-width="{width}" />"#,
                transition.path.to_svg()
            )?;
            let arrow = transition.arrow.to_svg();
            writeln!(self.output, r#"  <path d="{arrow}" fill="{color}" />"#)?;
            if let Some((text, at)) = &transition.label {
                self.write_text(*at, text, "condition")?;
            }
        }

        for step in &scene.steps {
            let outline = if step.selected { &highlight } else { &stroke };
            let extra = if step.selected {
                r#"stroke-width="3" "#
            } else {
                r#"stroke-width="1.5" "#
            };
            self.write_rect(step.rect, kind_fill(step.kind), outline, extra)?;
            if step.is_start {
                writeln!(
                    self.output,
                    r#"  <circle cx="{:.1}" cy="{:.1}" r="5" fill="{highlight}" />"#,
                    step.rect.x0 + 10.0,
                    step.rect.y0 + 10.0
                )?;
            }
            self.write_text(step.rect.center(), &step.label, "step")?;
        }

        if let Some(preview) = &scene.preview {
            writeln!(
                self.output,
                r#"  <path d="{}" fill="none" stroke="{highlight}" {PREVIEW_STROKE} />"#,
                preview.to_svg()
            )?;
        }

        if let Some(ghost) = &scene.ghost {
            let fill = kind_fill(ghost.kind);
            let extra = r#"opacity="0.5" stroke-dasharray="4 4" "#;
            self.write_rect(ghost.rect, fill, &highlight, extra)?;
        }

        self.output.push_str("</svg>\n");
        Ok(())
    }
}

impl Renderer for SvgRenderer {
    fn render(&mut self, scene: &Scene) -> RenderResult<()> {
        self.output.clear();
        self.write_scene(scene)?;
        log::debug!(
            "Rendered SVG frame with {} steps and {} transitions",
            scene.steps.len(),
            scene.transitions.len()
        );
        Ok(())
    }
}
