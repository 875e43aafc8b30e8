//! AnnotInk Core Library
//!
//! Platform-agnostic editing core for the AnnotInk image annotator: drawing
//! tools, the annotation object model and undo/redo history over a
//! host-provided [`Scene`].

pub mod config;
pub mod debounce;
pub mod export;
pub mod history;
pub mod input;
pub mod palette;
pub mod scene;
pub mod session;
pub mod shapes;
pub mod source;
pub mod style;
pub mod tools;

#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;

pub use config::{HighlighterConfig, SessionConfig, TextDefaults};
pub use debounce::Debouncer;
pub use export::{ExportError, ExportFormat, ExportOptions, ExportOutput};
pub use history::{History, HistoryError, Transition};
pub use input::{Key, KeyEvent, MouseButton, PointerEvent};
pub use scene::{
    BackgroundImage, BackgroundRef, BrushSettings, MemoryScene, Scene, SceneError, SceneEvent,
    SceneResult, Snapshot,
};
pub use session::{AnnotationSession, BackgroundRequest, SessionError, SessionResult, SessionView};
pub use shapes::{SerializableColor, Shape, ShapeId, ShapeStyle};
pub use source::{BlobStore, DataUriDecoder, DecodedImage, ImageDecoder, ImageSource, SourceError};
pub use style::{LineKind, ShapeKind, StrokeStyle, StyleSettings, resolve_dash};
pub use tools::{ToolController, ToolKind, ToolResponse};
