//! SVG serialization of a scene.
//!
//! Image hrefs are written exactly as stored, matching what browser-side
//! engines emit; callers that need well-formed XML escape them afterwards.

use super::BackgroundImage;
use crate::shapes::{ImageRegion, Shape, ShapeStyle, ShapeTrait, Text};
use kurbo::Size;
use std::fmt::Write;

/// Blur standard deviation per unit of filter intensity.
const BLUR_DEVIATION_SCALE: f64 = 25.0;

/// Render the scene to a standalone SVG document.
pub fn write_svg(size: Size, background: Option<&BackgroundImage>, objects: &[Shape]) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_document(&mut out, size, background, objects);
    out
}

fn write_document(
    out: &mut String,
    size: Size,
    background: Option<&BackgroundImage>,
    objects: &[Shape],
) -> std::fmt::Result {
    writeln!(
        out,
        r#"<?xml version="1.0" encoding="UTF-8" standalone="no" ?>"#
    )?;
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" version="1.1" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = size.width,
        h = size.height
    )?;

    write_defs(out, objects)?;

    if let Some(bg) = background {
        let shown = bg.display_size();
        writeln!(
            out,
            r#"  <image xlink:href="{}" x="0" y="0" width="{}" height="{}" preserveAspectRatio="none"/>"#,
            bg.src, shown.width, shown.height
        )?;
    }

    for shape in objects {
        match shape {
            Shape::Text(text) => write_text(out, text)?,
            Shape::ImageRegion(region) => write_region(out, region)?,
            Shape::Image(image) => {
                let rect = image.as_rect();
                writeln!(
                    out,
                    r#"  <image id="image-{}" xlink:href="{}" x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="none"/>"#,
                    image.id(),
                    image.src,
                    rect.x0,
                    rect.y0,
                    rect.width(),
                    rect.height()
                )?;
            }
            Shape::Arrow(arrow) => {
                writeln!(out, r#"  <g id="arrow-{}">"#, arrow.id())?;
                write_path(out, &arrow.line.to_path().to_svg(), &arrow.line.style, None)?;
                write_path(out, &arrow.head.to_path().to_svg(), &arrow.head.style, None)?;
                writeln!(out, "  </g>")?;
            }
            other => {
                let glow = other.style().shadow.map(|_| other.id());
                write_path(out, &other.to_path().to_svg(), other.style(), glow)?;
            }
        }
    }

    writeln!(out, "</svg>")
}

fn write_defs(out: &mut String, objects: &[Shape]) -> std::fmt::Result {
    let needs_defs = objects
        .iter()
        .any(|s| s.is_region() || s.style().shadow.is_some());
    if !needs_defs {
        return Ok(());
    }

    writeln!(out, "  <defs>")?;
    for shape in objects {
        if let Some(region) = shape.as_region() {
            writeln!(
                out,
                r#"    <filter id="blur-{}"><feGaussianBlur stdDeviation="{}"/></filter>"#,
                region.id(),
                region.blur.intensity * BLUR_DEVIATION_SCALE
            )?;
        }
        if let Some(shadow) = shape.style().shadow {
            writeln!(
                out,
                r#"    <filter id="glow-{}" x="-50%" y="-50%" width="200%" height="200%"><feDropShadow dx="0" dy="0" stdDeviation="{}" flood-color="{}"/></filter>"#,
                shape.id(),
                shadow.blur / 2.0,
                shadow.color.to_css()
            )?;
        }
    }
    writeln!(out, "  </defs>")
}

fn write_path(
    out: &mut String,
    d: &str,
    style: &ShapeStyle,
    glow: Option<crate::shapes::ShapeId>,
) -> std::fmt::Result {
    write!(
        out,
        r#"  <path d="{}" stroke="{}" stroke-width="{}" stroke-linecap="{}" fill="{}""#,
        d,
        style.stroke_color.to_css(),
        style.stroke_width,
        style.line_cap.as_str(),
        style
            .fill_color
            .map(|c| c.to_css())
            .unwrap_or_else(|| "none".to_string())
    )?;
    if let Some(dash) = &style.dash {
        let pattern: Vec<String> = dash.iter().map(|v| v.to_string()).collect();
        write!(out, r#" stroke-dasharray="{}""#, pattern.join(" "))?;
    }
    if style.opacity < 1.0 {
        write!(out, r#" opacity="{}""#, style.opacity)?;
    }
    if let Some(id) = glow {
        write!(out, r#" filter="url(#glow-{})""#, id)?;
    }
    writeln!(out, "/>")
}

fn write_text(out: &mut String, text: &Text) -> std::fmt::Result {
    let fill = text
        .style
        .fill_color
        .unwrap_or(text.style.stroke_color)
        .to_css();
    let bounds = text.bounds();
    let line_height = text.font_size * Text::LINE_HEIGHT;
    writeln!(
        out,
        r#"  <text id="text-{}" font-family="{}" font-size="{}" fill="{}">"#,
        text.id(),
        escape_xml(&text.font_family),
        text.font_size,
        fill
    )?;
    for (i, line) in text.content.lines().enumerate() {
        writeln!(
            out,
            r#"    <tspan x="{}" y="{}">{}</tspan>"#,
            bounds.x0,
            bounds.y0 + line_height * (i as f64 + 1.0) - (line_height - text.font_size),
            escape_xml(line)
        )?;
    }
    writeln!(out, "  </text>")
}

fn write_region(out: &mut String, region: &ImageRegion) -> std::fmt::Result {
    let shown = region.display_rect();
    writeln!(
        out,
        r#"  <svg id="region-{id}" x="{}" y="{}" width="{}" height="{}" viewBox="{} {} {} {}" preserveAspectRatio="none"><image xlink:href="{}" filter="url(#blur-{id})"/></svg>"#,
        shown.x0,
        shown.y0,
        shown.width(),
        shown.height(),
        region.crop_x,
        region.crop_y,
        region.width,
        region.height,
        region.src,
        id = region.id()
    )
}

/// Escape text for use in XML content or attribute values.
pub(crate) fn escape_xml(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Freehand, Rectangle, SerializableColor, Shadow};
    use kurbo::{Point, Rect};

    #[test]
    fn test_empty_scene() {
        let svg = write_svg(Size::new(200.0, 100.0), None, &[]);
        assert!(svg.contains(r#"width="200" height="100""#));
        assert!(svg.contains("xmlns:xlink"));
        assert!(!svg.contains("<defs>"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_background_href_is_verbatim() {
        let bg = BackgroundImage::fit(
            "http://x/a.png?w=1&h=2",
            100.0,
            100.0,
            Size::new(50.0, 50.0),
        );
        let svg = write_svg(Size::new(50.0, 50.0), Some(&bg), &[]);
        assert!(svg.contains(r#"xlink:href="http://x/a.png?w=1&h=2""#));
        assert!(svg.contains(r#"width="50" height="50" preserveAspectRatio"#));
    }

    #[test]
    fn test_shapes_and_filters() {
        let mut rect = Rectangle::new(Point::new(0.0, 0.0), 10.0, 10.0);
        rect.style.dash = Some(vec![10.0, 10.0]);
        let color = SerializableColor::new(255, 0, 0, 77);
        let mut stroke = Freehand::from_points(
            vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)],
            ShapeStyle::stroke(color, 15.0),
        );
        stroke.style.shadow = Some(Shadow { color, blur: 10.0 });
        let region = ImageRegion::new(Rect::new(0.0, 0.0, 20.0, 20.0), "bg.png", 0.2);
        let region_id = region.id();

        let objects = vec![
            Shape::Rectangle(rect),
            Shape::Freehand(stroke),
            Shape::ImageRegion(region),
        ];
        let svg = write_svg(Size::new(100.0, 100.0), None, &objects);

        assert!(svg.contains(r#"stroke-dasharray="10 10""#));
        assert!(svg.contains(&format!(r#"<filter id="blur-{}""#, region_id)));
        assert!(svg.contains(r#"stdDeviation="5""#));
        assert!(svg.contains("feDropShadow"));
        assert!(svg.contains("rgba(255, 0, 0, 0.302)"));
    }

    #[test]
    fn test_text_is_escaped() {
        let text = Text::new(Point::new(100.0, 100.0), "a < b & c");
        let svg = write_svg(Size::new(200.0, 200.0), None, &[Shape::Text(text)]);
        assert!(svg.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml(r#"<"x" & 'y'>"#), "&lt;&quot;x&quot; &amp; &apos;y&apos;&gt;");
    }
}
