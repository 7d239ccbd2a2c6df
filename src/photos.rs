// Photo library: decoding uploads into RGBA pixels ready for the GPU.
//
// Photos arrive from the command line or as files dropped onto the window.
// They are decoded once, downscaled if oversized, and kept until reset.

use image::imageops::FilterType;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{path} has no pixels")]
    Empty { path: PathBuf },
    #[error("photo library is full ({max} photos)")]
    LibraryFull { max: usize },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhotoConfig {
    /// Longest side after downscaling, pixels.
    pub max_photo_side: u32,
    /// Upload cap. Each photo holds a GPU texture.
    pub max_photos: usize,
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            max_photo_side: 1024,
            max_photos: 24,
        }
    }
}

/// One decoded photo.
#[derive(Debug)]
pub struct PhotoImage {
    pub source: PathBuf,
    pub width:  u32,
    pub height: u32,
    /// Tightly packed RGBA8, row-major, top row first.
    pub rgba:   Vec<u8>,
}

impl PhotoImage {
    pub fn aspect(&self) -> f32 {
        aspect_ratio(self.width, self.height)
    }
}

/// width / height, or 1.0 for degenerate sizes.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    if width == 0 || height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

/// Target size that fits inside `max_side` while keeping the aspect ratio.
/// Never upscales.
pub fn fit_within(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_side || max_side == 0 {
        return (width, height);
    }
    let k = max_side as f64 / longest as f64;
    let w = ((width as f64 * k).round() as u32).max(1);
    let h = ((height as f64 * k).round() as u32).max(1);
    (w, h)
}

/// Longest side a photo is decoded at: `max_photo_side` (0 = unlimited),
/// never larger than the GPU's texture limit.
pub fn decode_side(max_photo_side: u32, texture_limit: u32) -> u32 {
    match max_photo_side {
        0 => texture_limit,
        side => side.min(texture_limit),
    }
}

/// Decode an in-memory image.
pub fn decode_photo(source: &Path, bytes: &[u8], max_side: u32) -> Result<PhotoImage, PhotoError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| PhotoError::Decode {
        path: source.to_path_buf(),
        source: e,
    })?;
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(PhotoError::Empty { path: source.to_path_buf() });
    }

    let (w, h) = fit_within(decoded.width(), decoded.height(), max_side);
    let decoded = if (w, h) != (decoded.width(), decoded.height()) {
        decoded.resize_exact(w, h, FilterType::Triangle)
    } else {
        decoded
    };

    let rgba = decoded.to_rgba8();
    Ok(PhotoImage {
        source: source.to_path_buf(),
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

/// Read and decode a photo from disk.
pub fn load_photo(path: &Path, max_side: u32) -> Result<PhotoImage, PhotoError> {
    let bytes = std::fs::read(path).map_err(|e| PhotoError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    decode_photo(path, &bytes, max_side)
}

/// Uploaded photos, in upload order. Index = scene slot = focus index.
pub struct PhotoLibrary {
    photos: Vec<PhotoImage>,
    config: PhotoConfig,
    /// Largest 2D texture side the device accepts.
    texture_limit: u32,
}

impl PhotoLibrary {
    pub fn new(config: PhotoConfig, texture_limit: u32) -> Self {
        Self { photos: Vec::new(), config, texture_limit: texture_limit.max(1) }
    }

    pub fn len(&self) -> usize { self.photos.len() }
    pub fn is_empty(&self) -> bool { self.photos.is_empty() }
    pub fn get(&self, slot: usize) -> Option<&PhotoImage> { self.photos.get(slot) }

    /// Load `path` and append it. Returns the new slot.
    pub fn add_from_path(&mut self, path: &Path) -> Result<usize, PhotoError> {
        self.check_capacity()?;
        let photo = load_photo(path, decode_side(self.config.max_photo_side, self.texture_limit))?;
        self.add(photo)
    }

    /// Append an already decoded photo. Returns the new slot.
    pub fn add(&mut self, photo: PhotoImage) -> Result<usize, PhotoError> {
        self.check_capacity()?;
        Ok(self.push(photo))
    }

    pub fn clear(&mut self) {
        self.photos.clear();
    }

    fn check_capacity(&self) -> Result<(), PhotoError> {
        if self.photos.len() >= self.config.max_photos {
            Err(PhotoError::LibraryFull { max: self.config.max_photos })
        } else {
            Ok(())
        }
    }

    fn push(&mut self, photo: PhotoImage) -> usize {
        log::info!(
            "photo added: {} ({}x{})",
            photo.source.display(),
            photo.width,
            photo.height
        );
        self.photos.push(photo);
        self.photos.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, image::Rgba([200, 30, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn photo(w: u32, h: u32) -> PhotoImage {
        PhotoImage {
            source: PathBuf::from("mem.png"),
            width: w,
            height: h,
            rgba: vec![0; (w * h * 4) as usize],
        }
    }

    #[test]
    fn aspect_and_fit() {
        assert_eq!(aspect_ratio(400, 200), 2.0);
        assert_eq!(aspect_ratio(0, 200), 1.0);
        assert_eq!(fit_within(4000, 2000, 1000), (1000, 500));
        assert_eq!(fit_within(300, 200, 1000), (300, 200));
        assert_eq!(fit_within(10, 5000, 100), (1, 100));
    }

    #[test]
    fn decodes_and_downscales() {
        let bytes = png_bytes(64, 32);
        let photo = decode_photo(Path::new("mem.png"), &bytes, 16).unwrap();
        assert_eq!((photo.width, photo.height), (16, 8));
        assert_eq!(photo.rgba.len(), 16 * 8 * 4);
        assert_eq!(photo.aspect(), 2.0);
        assert_eq!(&photo.rgba[..4], &[200, 30, 30, 255]);
    }

    #[test]
    fn rejects_garbage() {
        let err = decode_photo(Path::new("x.png"), b"definitely not a png", 64).unwrap_err();
        assert!(matches!(err, PhotoError::Decode { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_photo(Path::new("/nonexistent/memory-tree/photo.png"), 64).unwrap_err();
        assert!(matches!(err, PhotoError::Io { .. }));
    }

    #[test]
    fn library_enforces_cap_and_clears() {
        let mut lib = PhotoLibrary::new(PhotoConfig { max_photos: 2, ..Default::default() }, 8192);
        assert_eq!(lib.add(photo(2, 2)).unwrap(), 0);
        assert_eq!(lib.add(photo(4, 2)).unwrap(), 1);
        assert!(matches!(lib.add(photo(1, 1)), Err(PhotoError::LibraryFull { max: 2 })));
        assert_eq!(lib.get(1).map(|p| p.aspect()), Some(2.0));
        lib.clear();
        assert!(lib.is_empty());
        assert_eq!(lib.add(photo(1, 1)).unwrap(), 0);
    }

    #[test]
    fn decode_side_respects_texture_limit() {
        assert_eq!(decode_side(1024, 8192), 1024);
        assert_eq!(decode_side(0, 8192), 8192);
        assert_eq!(decode_side(16384, 8192), 8192);
    }

    #[test]
    fn unlimited_config_still_fits_the_device() {
        let path = std::env::temp_dir().join(format!("memory_tree_big_{}.png", std::process::id()));
        std::fs::write(&path, png_bytes(64, 32)).unwrap();

        let config = PhotoConfig { max_photo_side: 0, ..Default::default() };
        let mut lib = PhotoLibrary::new(config, 16);
        let slot = lib.add_from_path(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        let photo = lib.get(slot).unwrap();
        assert_eq!((photo.width, photo.height), (16, 8));
    }
}
