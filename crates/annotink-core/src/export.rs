//! Export of the composed scene as raster data URIs or SVG markup.

use crate::scene::{RasterFormat, RasterRequest, Scene, SceneError};
use crate::shapes::ShapeStyle;
use crate::source::encode_data_uri;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No image loaded")]
    NoScene,
    #[error("Invalid export options: {0}")]
    InvalidOptions(String),
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}

/// Output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg,
    Svg,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Svg => "svg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Svg => "image/svg+xml",
        }
    }

    fn raster(&self) -> Option<RasterFormat> {
        match self {
            ExportFormat::Png => Some(RasterFormat::Png),
            ExportFormat::Jpeg => Some(RasterFormat::Jpeg),
            ExportFormat::Svg => None,
        }
    }
}

/// Raster export parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Lossy quality, 0.0..=1.0.
    pub quality: f64,
    /// Output size multiplier, at least 1.
    pub scale: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            quality: 0.92,
            scale: 1.0,
        }
    }
}

impl ExportOptions {
    pub fn with_quality(quality: f64) -> Self {
        Self {
            quality,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ExportError> {
        if !(0.0..=1.0).contains(&self.quality) {
            return Err(ExportError::InvalidOptions(format!(
                "quality {} outside 0..=1",
                self.quality
            )));
        }
        if !self.scale.is_finite() || self.scale < 1.0 {
            return Err(ExportError::InvalidOptions(format!(
                "scale {} below 1",
                self.scale
            )));
        }
        Ok(())
    }
}

/// An exported image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutput {
    pub format: ExportFormat,
    /// A `data:` URI for raster formats, SVG markup for vector.
    pub data: String,
}

impl ExportOutput {
    /// Suggested download name.
    pub fn file_name(&self) -> String {
        format!("annotation.{}", self.format.extension())
    }
}

/// Export the scene in `format`.
pub fn export_scene(
    scene: &mut dyn Scene,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<ExportOutput, ExportError> {
    options.validate()?;
    let data = match format.raster() {
        Some(raster) => {
            let request = RasterRequest {
                format: raster,
                quality: options.quality,
                multiplier: options.scale,
            };
            let bytes = scene.to_raster_data(&request)?;
            encode_data_uri(raster.mime_type(), &bytes)
        }
        None => escape_hrefs(&vector_markup(scene)?),
    };
    log::info!("Exported {} ({} bytes)", format.extension(), data.len());
    Ok(ExportOutput { format, data })
}

/// Capture SVG markup with highlighter strokes flattened.
///
/// Highlighter strokes are emitted as opaque color with element opacity and
/// no shadow. The scene is restored before returning, on success or not.
fn vector_markup(scene: &mut dyn Scene) -> Result<String, ExportError> {
    let mut originals: Vec<(usize, ShapeStyle)> = Vec::new();
    for (index, shape) in scene.objects_mut().iter_mut().enumerate() {
        let Some(freehand) = shape.as_freehand_mut() else {
            continue;
        };
        if !freehand.is_highlight() {
            continue;
        }
        originals.push((index, freehand.style.clone()));
        let style = &mut freehand.style;
        style.opacity = style.stroke_color.alpha();
        style.stroke_color = style.stroke_color.with_alpha(1.0);
        style.shadow = None;
    }

    let markup = scene.to_vector_markup();

    let objects = scene.objects_mut();
    for (index, style) in originals {
        if let Some(freehand) = objects.get_mut(index).and_then(|s| s.as_freehand_mut()) {
            freehand.style = style;
        }
    }
    Ok(markup?)
}

/// Escape `&` inside `xlink:href` attribute values.
pub fn escape_hrefs(markup: &str) -> String {
    const ATTR: &str = "xlink:href=\"";
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;
    while let Some(start) = rest.find(ATTR) {
        let value_start = start + ATTR.len();
        out.push_str(&rest[..value_start]);
        rest = &rest[value_start..];
        let end = rest.find('"').unwrap_or(rest.len());
        out.push_str(&rest[..end].replace('&', "&amp;"));
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}
