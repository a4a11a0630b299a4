//! SVG output.
//!
//! [`SvgEncoder`] is a small builder for vector documents. [`SvgRenderer`]
//! implements the chart's [`Renderer`] port on top of it: it keeps the
//! geometry currently on screen, jumps straight to the end state of every
//! transition, and serializes the result as an SVG document.

use crate::color::Rgba;
use crate::error::Result;
use crate::geometry::{ChartGeometry, GeometryTransition};
use crate::render::{Renderer, Surface};
use crate::scale::{ColorScale, Scale};
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// SVG encoder for vector output.
#[derive(Debug, Clone)]
pub struct SvgEncoder {
    /// SVG width
    width: u32,
    /// SVG height
    height: u32,
    /// SVG elements
    elements: Vec<SvgElement>,
}

/// An SVG element.
///
/// Field names are self-documenting and match SVG attribute names.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum SvgElement {
    /// Rectangle
    Rect { x: f32, y: f32, width: f32, height: f32, fill: Rgba, stroke: Option<Rgba>, stroke_width: f32 },
    /// Line
    Line { x1: f32, y1: f32, x2: f32, y2: f32, stroke: Rgba, stroke_width: f32 },
    /// Text
    Text { x: f32, y: f32, text: String, font_size: f32, fill: Rgba, anchor: TextAnchor },
    /// Group translated by `(dx, dy)`
    Group { id: Option<String>, dx: f32, dy: f32, children: Vec<SvgElement> },
}

/// Text anchor position for SVG text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum TextAnchor {
    /// Align text start at position (left-aligned for LTR)
    #[default]
    Start,
    /// Center text at position
    Middle,
    /// Align text end at position (right-aligned for LTR)
    End,
}

impl SvgEncoder {
    /// Create a new SVG encoder with given dimensions and a white background.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, elements: Vec::new() }
    }

    /// Add a raw element.
    pub fn add_element(&mut self, element: SvgElement) {
        self.elements.push(element);
    }

    /// Render to SVG string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut svg = String::with_capacity(4096);

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            self.width, self.height, self.width, self.height
        );

        let _ = writeln!(svg, r#"  <rect width="100%" height="100%" fill="{}"/>"#, rgba_to_css(&Rgba::WHITE));

        for element in &self.elements {
            write_element(&mut svg, element, 1);
        }

        svg.push_str("</svg>\n");
        svg
    }

    /// Write to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if file writing fails.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.render().as_bytes())?;
        Ok(())
    }
}

/// Convert RGBA to CSS color string.
fn rgba_to_css(color: &Rgba) -> String {
    if color.a == 255 {
        format!("rgb({},{},{})", color.r, color.g, color.b)
    } else {
        format!("rgba({},{},{},{:.3})", color.r, color.g, color.b, f32::from(color.a) / 255.0)
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

fn write_element(svg: &mut String, element: &SvgElement, depth: usize) {
    let indent = "  ".repeat(depth);
    match element {
        SvgElement::Group { id, dx, dy, children } => {
            let id_attr = id.as_ref().map(|id| format!(r#" id="{}""#, escape_xml(id))).unwrap_or_default();
            let _ = writeln!(svg, r#"{indent}<g{id_attr} transform="translate({dx},{dy})">"#);
            for child in children {
                write_element(svg, child, depth + 1);
            }
            let _ = writeln!(svg, "{indent}</g>");
        }
        other => {
            let _ = writeln!(svg, "{indent}{}", element_to_svg(other));
        }
    }
}

/// Convert a leaf SVG element to its string representation.
fn element_to_svg(element: &SvgElement) -> String {
    match element {
        SvgElement::Rect { x, y, width, height, fill, stroke, stroke_width } => {
            let stroke_attr = stroke
                .map(|s| format!(r#" stroke="{}" stroke-width="{}""#, rgba_to_css(&s), stroke_width))
                .unwrap_or_default();
            format!(
                r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{}"{stroke_attr}/>"#,
                rgba_to_css(fill)
            )
        }
        SvgElement::Line { x1, y1, x2, y2, stroke, stroke_width } => {
            format!(
                r#"<line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke="{}" stroke-width="{stroke_width}"/>"#,
                rgba_to_css(stroke)
            )
        }
        SvgElement::Text { x, y, text, font_size, fill, anchor } => {
            let anchor_str = match anchor {
                TextAnchor::Start => "start",
                TextAnchor::Middle => "middle",
                TextAnchor::End => "end",
            };
            format!(
                r#"<text x="{x}" y="{y}" font-size="{font_size}" fill="{}" text-anchor="{anchor_str}" dominant-baseline="hanging" font-family="sans-serif">{}</text>"#,
                rgba_to_css(fill),
                escape_xml(text)
            )
        }
        SvgElement::Group { children, .. } => {
            let mut nested = String::new();
            for child in children {
                write_element(&mut nested, child, 0);
            }
            nested
        }
    }
}

/// [`Renderer`] that turns chart geometry into an SVG document.
///
/// Series are filled from light to dark purple by their group id, with a
/// darker outline. The tick at 0 is drawn in black, the other gridlines in
/// light gray.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    width: u32,
    height: u32,
    font_size: f32,
    geometry: Option<ChartGeometry>,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl SvgRenderer {
    /// Create a renderer for a `width` by `height` surface.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, font_size: 11.0, geometry: None }
    }

    /// Set the label font size.
    #[must_use]
    pub fn font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    /// Geometry currently drawn.
    #[must_use]
    pub fn geometry(&self) -> Option<&ChartGeometry> {
        self.geometry.as_ref()
    }

    /// Build the SVG document for the current geometry.
    #[must_use]
    pub fn encoder(&self) -> SvgEncoder {
        let mut encoder = SvgEncoder::new(self.width, self.height);
        let Some(geometry) = &self.geometry else {
            return encoder;
        };

        let palette = ColorScale::series_palette(geometry.layers.len());
        let mut plot = Vec::new();

        for gridline in &geometry.gridlines {
            let stroke = if gridline.is_baseline { Rgba::BLACK } else { Rgba::GRID };
            plot.push(SvgElement::Line {
                x1: gridline.span.0,
                y1: gridline.y,
                x2: gridline.span.1,
                y2: gridline.y,
                stroke,
                stroke_width: 1.0,
            });
            plot.push(SvgElement::Text {
                x: gridline.label_position.x,
                y: gridline.label_position.y - self.font_size / 2.0,
                text: gridline.label.clone(),
                font_size: self.font_size,
                fill: Rgba::BLACK,
                anchor: TextAnchor::Start,
            });
        }

        for layer in &geometry.layers {
            let fill = palette.scale(layer.id.0 as f32);
            let stroke = fill.darker(0.3);
            let bars = layer
                .bars
                .iter()
                .map(|bar| SvgElement::Rect {
                    x: bar.rect.x,
                    y: bar.rect.y,
                    width: bar.rect.width,
                    height: bar.rect.height,
                    fill,
                    stroke: Some(stroke),
                    stroke_width: 1.0,
                })
                .collect();
            plot.push(SvgElement::Group {
                id: Some(format!("layer-{}", layer.id.0)),
                dx: 0.0,
                dy: 0.0,
                children: bars,
            });
        }

        for label in &geometry.labels {
            plot.push(SvgElement::Text {
                x: label.position.x,
                y: label.position.y,
                text: label.text.clone(),
                font_size: self.font_size,
                fill: Rgba::BLACK,
                anchor: TextAnchor::Middle,
            });
        }

        encoder.add_element(SvgElement::Group {
            id: None,
            dx: geometry.origin.x,
            dy: geometry.origin.y,
            children: plot,
        });
        encoder
    }

    /// Render the current geometry to an SVG string.
    #[must_use]
    pub fn render_svg(&self) -> String {
        self.encoder().render()
    }

    /// Write the current geometry to an SVG file.
    ///
    /// # Errors
    ///
    /// Returns an error if file writing fails.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.encoder().write_to_file(path)
    }
}

impl Surface for SvgRenderer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

impl batuta_common::display::WithDimensions for SvgRenderer {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

impl Renderer for SvgRenderer {
    fn render(&mut self, geometry: &ChartGeometry) {
        self.geometry = Some(geometry.clone());
    }

    fn transition(&mut self, transition: &GeometryTransition) {
        if let Some(geometry) = self.geometry.as_mut() {
            geometry.apply(transition);
        }
    }

    fn clear(&mut self) {
        self.geometry = None;
    }
}
