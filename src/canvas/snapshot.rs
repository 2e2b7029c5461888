//! PNG data-URL snapshots of the drawing surface

use super::Raster;
use crate::voice::encode_base64;
use crate::{Error, Result};

/// Prefix of every exported snapshot
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Encode a raster as PNG bytes
///
/// # Errors
///
/// Returns error if the encoder rejects the image
pub fn encode_png(raster: &Raster) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, raster.width(), raster.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| Error::Canvas(format!("png header: {e}")))?;
        writer
            .write_image_data(raster.as_bytes())
            .map_err(|e| Error::Canvas(format!("png data: {e}")))?;
        writer
            .finish()
            .map_err(|e| Error::Canvas(format!("png finish: {e}")))?;
    }
    Ok(buf)
}

/// Wrap PNG bytes in a data URL
#[must_use]
pub fn png_data_url(png: &[u8]) -> String {
    format!("{PNG_DATA_URL_PREFIX}{}", encode_base64(png))
}

/// The base64 portion of a data URL, i.e. everything after the first comma
#[must_use]
pub fn data_url_payload(data_url: &str) -> Option<&str> {
    data_url
        .split_once(',')
        .map(|(_, payload)| payload)
        .filter(|payload| !payload.is_empty())
}
