//! Image decoding — the `Decoder` collaborator contract and the built-in
//! implementation backed by the `image` crate.

use image::DynamicImage;

use crate::error::DecodeError;

/// Trait for turning fetched bytes into a ready-to-display image
///
/// The associated `Image` type is what the Listener ultimately receives; the
/// coordinator is generic over it and never inspects it.
pub trait Decoder: Send + Sync + 'static {
    /// The decoded image type handed to the Listener
    type Image: Send + 'static;

    /// Decode raw bytes into an image
    ///
    /// Runs on the worker task; implementations should be plain synchronous
    /// CPU work (thumbnails are small).
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when the bytes are not a decodable image.
    fn decode(&self, bytes: &[u8]) -> Result<Self::Image, DecodeError>;
}

/// Decoder producing [`DynamicImage`] values via format auto-detection
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageDecoder;

impl Decoder for ImageDecoder {
    type Image = DynamicImage;

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        Ok(image::load_from_memory(bytes)?)
    }
}
