//! Inkboard Render Library
//!
//! Render surface abstraction for Inkboard sessions, a software raster
//! surface, and the image export adapter.

mod export;
mod raster;
mod renderer;

pub use export::{
    ExportError, ExportFormat, ExportResult, ExportedImage, Exporter, PixelBuffer, RasterSource,
    download_file_name, encode_jpeg, encode_png, flatten_onto_white,
};
pub use raster::PixelCanvas;
pub use renderer::{
    DrawCommand, DrawStyle, RecordingSurface, RenderContext, RenderSurface, STROKE_TENSION,
    render_frame, smooth_path,
};
