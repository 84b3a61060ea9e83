//! Signature bitmaps as PDF image XObjects

use crate::capture::SignatureImage;
use crate::error::SignError;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;

fn deflate(data: &[u8]) -> Result<Vec<u8>, SignError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| SignError::Operation(format!("Failed to compress image: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| SignError::Operation(format!("Failed to compress image: {}", e)))
}

/// Add the image to the document as a DeviceRGB XObject. The alpha channel
/// becomes a DeviceGray soft mask so transparent pen strokes stay transparent.
pub(crate) fn add_image_xobject(
    doc: &mut Document,
    image: &SignatureImage,
) -> Result<ObjectId, SignError> {
    let pixels = image.decode_rgba()?;

    let mut rgb = Vec::with_capacity(pixels.data.len() / 4 * 3);
    let mut alpha = Vec::with_capacity(pixels.data.len() / 4);
    for px in pixels.data.chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
        alpha.push(px[3]);
    }

    let width = pixels.width as i64;
    let height = pixels.height as i64;

    let smask = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        deflate(&alpha)?,
    )
    .with_compression(false);
    let smask_id = doc.add_object(smask);

    let image_stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
            "SMask" => Object::Reference(smask_id),
        },
        deflate(&rgb)?,
    )
    .with_compression(false);

    Ok(doc.add_object(image_stream))
}
