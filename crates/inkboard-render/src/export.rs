//! Export adapter: composite the rendered surface over white and encode it.

use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;
use rand::Rng;
use rand::distr::Alphanumeric;
use thiserror::Error;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No render surface to export")]
    MissingSurface,
    #[error("Render surface is empty ({width}x{height})")]
    EmptySurface { width: u32, height: u32 },
    #[error("Pixel buffer has {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("Encoding failed: {0}")]
    Encode(String),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Raw RGBA pixel data read back from a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    /// RGBA pixel data (4 bytes per pixel).
    pub rgba: Vec<u8>,
}

impl PixelBuffer {
    fn check(&self) -> ExportResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ExportError::EmptySurface {
                width: self.width,
                height: self.height,
            });
        }
        let expected = self.width as usize * self.height as usize * 4;
        if self.rgba.len() != expected {
            return Err(ExportError::BufferSize {
                expected,
                actual: self.rgba.len(),
            });
        }
        Ok(())
    }
}

/// Something that can read its rendered pixels back.
pub trait RasterSource {
    /// Current pixels, or `None` when nothing has been rendered yet.
    fn snapshot(&self) -> Option<PixelBuffer>;
}

/// Output image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Jpeg,
    Png,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Png => "png",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Png => "image/png",
        }
    }
}

/// An encoded image ready to be saved or downloaded.
#[derive(Debug, Clone)]
pub struct ExportedImage {
    pub file_name: String,
    pub format: ExportFormat,
    pub data: Vec<u8>,
}

/// Composite RGBA pixels over opaque white. Every output alpha is 255.
pub fn flatten_onto_white(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4)
        .flat_map(|px| {
            let a = px[3] as u32;
            let over = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
            [over(px[0]), over(px[1]), over(px[2]), 255]
        })
        .collect()
}

/// Drop the alpha channel of opaque RGBA pixels.
fn rgba_to_rgb(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect()
}

/// Encode RGBA pixels as PNG.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> ExportResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| ExportError::Encode(format!("PNG header: {}", e)))?;
        writer
            .write_image_data(rgba_data)
            .map_err(|e| ExportError::Encode(format!("PNG data: {}", e)))?;
    }
    Ok(png_data)
}

/// Encode opaque RGBA pixels as JPEG.
pub fn encode_jpeg(rgba_data: &[u8], width: u32, height: u32, quality: u8) -> ExportResult<Vec<u8>> {
    let rgb = rgba_to_rgb(rgba_data);
    let mut jpeg_data = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg_data, quality)
        .encode(&rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| ExportError::Encode(format!("JPEG: {}", e)))?;
    Ok(jpeg_data)
}

const NAME_LEN: usize = 20;

/// Random 20-character alphanumeric file name with the format's extension.
pub fn download_file_name(format: ExportFormat) -> String {
    let stem: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(NAME_LEN)
        .map(char::from)
        .collect();
    format!("{}.{}", stem, format.extension())
}

/// Turns a rendered surface into a downloadable image.
#[derive(Debug, Clone, Copy)]
pub struct Exporter {
    pub format: ExportFormat,
    /// JPEG quality, 1..=100.
    pub jpeg_quality: u8,
}

impl Default for Exporter {
    fn default() -> Self {
        Self {
            format: ExportFormat::Jpeg,
            // Browser default for canvas JPEG export
            jpeg_quality: 92,
        }
    }
}

impl Exporter {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Read the surface, flatten it over white and encode it.
    pub fn export(&self, source: Option<&dyn RasterSource>) -> ExportResult<ExportedImage> {
        let buffer = source
            .and_then(|s| s.snapshot())
            .ok_or(ExportError::MissingSurface)?;
        buffer.check()?;

        let opaque = flatten_onto_white(&buffer.rgba);
        let data = match self.format {
            ExportFormat::Png => encode_png(&opaque, buffer.width, buffer.height)?,
            ExportFormat::Jpeg => {
                encode_jpeg(&opaque, buffer.width, buffer.height, self.jpeg_quality.clamp(1, 100))?
            }
        };
        let file_name = download_file_name(self.format);
        log::info!(
            "Exported {}x{} {} ({} bytes) as {}",
            buffer.width,
            buffer.height,
            self.format.mime_type(),
            data.len(),
            file_name
        );
        Ok(ExportedImage {
            file_name,
            format: self.format,
            data,
        })
    }

    /// Like [`Exporter::export`], but failures are only logged.
    pub fn export_or_log(&self, source: Option<&dyn RasterSource>) -> Option<ExportedImage> {
        match self.export(source) {
            Ok(image) => Some(image),
            Err(e) => {
                log::error!("Failed to export image: {}", e);
                None
            }
        }
    }
}
