use image::{
    guess_format,
    imageops::FilterType,
    io::{Limits, Reader},
    DynamicImage, ImageFormat, ImageOutputFormat,
};
use std::io::{BufWriter, Cursor};

use crate::error::ServiceError;

/// One queued "fill" transform: pins the named axis to an exact value
/// and leaves the other axis at whatever it currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeDirective {
    Width(u32),
    Height(u32),
}

/// Decode the fetched bytes. A payload that is not a decodable image
/// fails here, before any format or resize decision is made.
pub fn inspect(bytes: &[u8]) -> Result<DynamicImage, ServiceError> {
    let mut reader = Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ServiceError::Decode(image::ImageError::IoError(e)))?;

    // set allocator limit to 1gb
    let mut limits = Limits::no_limits();
    limits.max_alloc = Some(1024 * 1024 * 1024);
    reader.limits(limits);

    reader.decode().map_err(ServiceError::Decode)
}

/// The output format is always the source's native format, read from
/// the magic bytes.
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ServiceError> {
    guess_format(bytes).map_err(|_| ServiceError::UnsupportedImageFormat)
}

/// Select resize directives by comparing the requested bounds against
/// the native dimensions. An axis only shrinks: a requested dimension
/// not smaller than the native one queues nothing.
pub fn plan_resizes(
    native_width: u32,
    native_height: u32,
    requested_width: u32,
    requested_height: u32,
) -> Vec<ResizeDirective> {
    let mut plan = Vec::new();
    if native_width > requested_width {
        plan.push(ResizeDirective::Width(requested_width));
    }
    if native_height > requested_height {
        plan.push(ResizeDirective::Height(requested_height));
    }
    plan
}

/// Apply the queued directives in order. Each one is a separate exact
/// resize pinning a single axis, so two directives run as two passes
/// rather than one combined width+height resize.
pub fn apply(image: DynamicImage, plan: &[ResizeDirective]) -> DynamicImage {
    plan.iter().fold(image, |img, directive| match *directive {
        ResizeDirective::Width(width) => {
            let height = img.height();
            img.resize_exact(width, height, FilterType::Nearest)
        }
        ResizeDirective::Height(height) => {
            let width = img.width();
            img.resize_exact(width, height, FilterType::Nearest)
        }
    })
}

/// Encode to the output format. Quality only has a knob for JPEG in
/// this codec stack; for every other format it is ignored.
pub fn encode(
    image: &DynamicImage,
    format: ImageFormat,
    quality: Option<u8>,
) -> Result<Vec<u8>, ServiceError> {
    let output_format = match (format, quality) {
        (ImageFormat::Jpeg, Some(quality)) => ImageOutputFormat::Jpeg(quality),
        _ => format.into(),
    };

    let mut buffer = BufWriter::new(Cursor::new(Vec::new()));
    image
        .write_to(&mut buffer, output_format)
        .map_err(ServiceError::Encode)?;

    let bytes = buffer
        .into_inner()
        .map_err(|e| ServiceError::Encode(image::ImageError::IoError(e.into_error())))?
        .into_inner();

    Ok(bytes)
}

pub fn content_type_for(format: ImageFormat) -> String {
    let extension = format.extensions_str().first().copied().unwrap_or_default();
    mime_guess::from_ext(extension)
        .first()
        .map(|mime| mime.to_string())
        .unwrap_or_else(|| format!("image/{extension}"))
}
