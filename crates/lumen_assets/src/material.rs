use std::path::Path;

use crate::error::AssetError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureFormat {
    R8Unorm,    // Grayscale (used for Roughness/Metallic masks)
    Rg8Unorm,   // Two-channel (e.g. grey + alpha)
    Rgba8Unorm, // Standard 32-bit color (0-255)
}

impl TextureFormat {
    /// Devices only take 1, 2 and 4 channel 8-bit layouts; 3 channels have no format.
    pub fn from_channels(channels: u8) -> Option<Self> {
        match channels {
            1 => Some(TextureFormat::R8Unorm),
            2 => Some(TextureFormat::Rg8Unorm),
            4 => Some(TextureFormat::Rgba8Unorm),
            _ => None,
        }
    }

    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            TextureFormat::R8Unorm => 1,
            TextureFormat::Rg8Unorm => 2,
            TextureFormat::Rgba8Unorm => 4,
        }
    }
}

/// Pixels straight out of the decoder.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

impl DecodedImage {
    /// Pads RGB to RGBA with opaque alpha. Other channel counts pass through.
    pub fn expand_rgb_to_rgba(mut self) -> Self {
        if self.channels != 3 {
            return self;
        }

        // We must convert 3 bytes -> 4 bytes manually
        let pixel_count = (self.width * self.height) as usize;
        let mut rgba_data = Vec::with_capacity(pixel_count * 4);
        for chunk in self.pixels.chunks_exact(3) {
            rgba_data.extend_from_slice(chunk); // Copy R, G, B
            rgba_data.push(255); // Add A (Full Opacity)
        }

        self.pixels = rgba_data;
        self.channels = 4;
        self
    }

    pub fn flip_vertically(&mut self) {
        let row = (self.width * self.channels as u32) as usize;
        if row == 0 {
            return;
        }
        let height = self.height as usize;
        for y in 0..height / 2 {
            let (top, bottom) = self.pixels.split_at_mut((height - 1 - y) * row);
            top[y * row..(y + 1) * row].swap_with_slice(&mut bottom[..row]);
        }
    }
}

/// Pixel data ready for a device texture.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub name: String,
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

impl TextureData {
    /// Fails with the offending channel count when the image has no device format.
    pub fn from_decoded(name: impl Into<String>, image: DecodedImage) -> Result<Self, u8> {
        let format = TextureFormat::from_channels(image.channels).ok_or(image.channels)?;
        Ok(Self {
            name: name.into(),
            pixels: image.pixels,
            width: image.width,
            height: image.height,
            format,
        })
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.width * self.format.bytes_per_pixel()
    }
}

/// The image decode collaborator: path in, pixels out.
pub trait ImageLoader {
    fn load(&self, path: &Path) -> Result<DecodedImage, AssetError>;
}

/// Decodes PNG/JPEG/etc. from disk with the `image` crate.
#[derive(Clone, Debug, Default)]
pub struct FileImageLoader {
    pub flip_vertically: bool,
}

impl FileImageLoader {
    pub fn new(flip_vertically: bool) -> Self {
        Self { flip_vertically }
    }
}

impl ImageLoader for FileImageLoader {
    fn load(&self, path: &Path) -> Result<DecodedImage, AssetError> {
        let img = image::open(path)?;

        let width = img.width();
        let height = img.height();

        // Keep the native channel count for 8-bit layouts, everything else goes to RGBA8.
        let (pixels, channels) = match img {
            image::DynamicImage::ImageLuma8(buf) => (buf.into_raw(), 1),
            image::DynamicImage::ImageLumaA8(buf) => (buf.into_raw(), 2),
            image::DynamicImage::ImageRgb8(buf) => (buf.into_raw(), 3),
            other => (other.to_rgba8().into_raw(), 4),
        };

        let mut decoded = DecodedImage {
            pixels,
            width,
            height,
            channels,
        };
        if self.flip_vertically {
            decoded.flip_vertically();
        }
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb_2x2() -> DecodedImage {
        DecodedImage {
            pixels: vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12],
            width: 2,
            height: 2,
            channels: 3,
        }
    }

    #[test]
    fn test_rgb_expands_to_rgba() {
        let rgba = rgb_2x2().expand_rgb_to_rgba();
        assert_eq!(rgba.channels, 4);
        assert_eq!(rgba.pixels, vec![1, 2, 3, 255, 4, 5, 6, 255, 7, 8, 9, 255, 10, 11, 12, 255]);
    }

    #[test]
    fn test_three_channels_have_no_format() {
        assert_eq!(TextureData::from_decoded("x", rgb_2x2()), Err(3));
        let data = TextureData::from_decoded("x", rgb_2x2().expand_rgb_to_rgba()).unwrap();
        assert_eq!(data.format, TextureFormat::Rgba8Unorm);
        assert_eq!(data.bytes_per_row(), 8);
    }

    #[test]
    fn test_flip_vertically_swaps_rows() {
        let mut image = rgb_2x2();
        image.flip_vertically();
        assert_eq!(image.pixels, vec![7, 8, 9, 10, 11, 12, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_file_loader_reads_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.png");
        let img = image::RgbImage::from_fn(2, 2, |x, y| {
            if (x + y) % 2 == 0 { image::Rgb([255, 0, 0]) } else { image::Rgb([0, 0, 255]) }
        });
        img.save(&path).unwrap();

        let decoded = FileImageLoader::new(false).load(&path).unwrap();
        assert_eq!((decoded.width, decoded.height, decoded.channels), (2, 2, 3));
        assert_eq!(&decoded.pixels[..3], &[255, 0, 0]);
    }

    #[test]
    fn test_file_loader_missing_file() {
        let err = FileImageLoader::default().load(Path::new("does/not/exist.png"));
        assert!(matches!(err, Err(AssetError::Image(_))));
    }
}
