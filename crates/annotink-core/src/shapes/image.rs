//! Image objects: plain images and blurred crops of the background.

use super::{Interaction, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An image placed on the scene, referenced by URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub(crate) id: ShapeId,
    /// Top-left corner position.
    pub position: Point,
    /// Source URL (`http…`, `data:image/…` or `blob:…`).
    pub src: String,
    /// Intrinsic width in pixels.
    pub width: f64,
    /// Intrinsic height in pixels.
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub style: ShapeStyle,
    #[serde(default)]
    pub interaction: Interaction,
}

impl Image {
    pub fn new(position: Point, src: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            src: src.into(),
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
            style: ShapeStyle::default(),
            interaction: Interaction::default(),
        }
    }

    /// Displayed rectangle after scaling.
    pub fn as_rect(&self) -> Rect {
        Rect::from_origin_size(
            self.position,
            (self.width * self.scale_x, self.height * self.scale_y),
        )
    }
}

impl ShapeTrait for Image {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.as_rect().inflate(tolerance, tolerance).contains(point)
    }

    fn to_path(&self) -> BezPath {
        self.as_rect().to_path(0.1)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn interaction(&self) -> Interaction {
        self.interaction
    }

    fn set_interaction(&mut self, interaction: Interaction) {
        self.interaction = interaction;
    }
}

/// Gaussian blur applied to a region, intensity in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlurFilter {
    pub intensity: f64,
}

/// Crop window in the background image's own pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A blurred, cropped copy of the background image covering part of it.
///
/// `width`/`height` are in source-image pixels (the crop size once a crop has
/// been applied); the displayed size is `width * scale_x` by
/// `height * scale_y`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRegion {
    pub(crate) id: ShapeId,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub crop_x: f64,
    pub crop_y: f64,
    /// Source of the background image this region duplicates.
    pub src: String,
    pub blur: BlurFilter,
    pub style: ShapeStyle,
    #[serde(default)]
    pub interaction: Interaction,
}

impl ImageRegion {
    /// Region over `rect` at scale 1 with no crop applied yet.
    pub fn new(rect: Rect, src: impl Into<String>, blur_intensity: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            left: rect.x0,
            top: rect.y0,
            width: rect.width(),
            height: rect.height(),
            scale_x: 1.0,
            scale_y: 1.0,
            crop_x: 0.0,
            crop_y: 0.0,
            src: src.into(),
            blur: BlurFilter {
                intensity: blur_intensity,
            },
            style: ShapeStyle::default(),
            interaction: Interaction::default(),
        }
    }

    /// Displayed rectangle in scene coordinates.
    pub fn display_rect(&self) -> Rect {
        Rect::from_origin_size(
            (self.left, self.top),
            (self.width * self.scale_x, self.height * self.scale_y),
        )
    }

    /// Crop window matching the region's current placement over a background
    /// drawn at `(bg_scale_x, bg_scale_y)`.
    ///
    /// Returns `None` when the window would be empty.
    pub fn crop_for(&self, bg_scale_x: f64, bg_scale_y: f64) -> Option<CropBox> {
        let crop = CropBox {
            x: self.left / bg_scale_x,
            y: self.top / bg_scale_y,
            width: self.width * self.scale_x / bg_scale_x,
            height: self.height * self.scale_y / bg_scale_y,
        };
        // A zero background scale yields infinite or NaN sizes.
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if valid(crop.width) && valid(crop.height) {
            Some(crop)
        } else {
            None
        }
    }

    /// Apply a crop window and adopt the background's scale.
    pub fn apply_crop(&mut self, crop: CropBox, bg_scale_x: f64, bg_scale_y: f64) {
        self.crop_x = crop.x;
        self.crop_y = crop.y;
        self.width = crop.width;
        self.height = crop.height;
        self.scale_x = bg_scale_x;
        self.scale_y = bg_scale_y;
    }

    /// Recompute the crop for the given background scale.
    ///
    /// Returns false (and leaves the region untouched) when the crop is empty.
    pub fn update_crop(&mut self, bg_scale_x: f64, bg_scale_y: f64) -> bool {
        match self.crop_for(bg_scale_x, bg_scale_y) {
            Some(crop) => {
                self.apply_crop(crop, bg_scale_x, bg_scale_y);
                true
            }
            None => false,
        }
    }
}

impl ShapeTrait for ImageRegion {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.display_rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.display_rect()
            .inflate(tolerance, tolerance)
            .contains(point)
    }

    fn to_path(&self) -> BezPath {
        self.display_rect().to_path(0.1)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn interaction(&self) -> Interaction {
        self.interaction
    }

    fn set_interaction(&mut self, interaction: Interaction) {
        self.interaction = interaction;
    }
}
