use std::fs;
use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;

use crate::app::Sprite;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to open image {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("decoded image {0} has an inconsistent pixel buffer")]
    Malformed(PathBuf),
    #[error("failed to read image directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Decodes an image into an RGBA sprite. Pixels matching `color_key` become
/// transparent.
pub fn load_image(path: &Path, color_key: Option<[u8; 3]>) -> Result<Sprite, AssetError> {
    let reader = ImageReader::open(path).map_err(|source| AssetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let image = decoded.to_rgba8();
    let (width, height) = (image.width(), image.height());
    let mut sprite = Sprite::from_rgba(width, height, image.into_raw())
        .ok_or_else(|| AssetError::Malformed(path.to_path_buf()))?;
    if let Some(key) = color_key {
        sprite.apply_color_key(key);
    }
    Ok(sprite)
}

/// Loads every file in `dir` in file-name order. Frame order of animations
/// depends on this ordering.
pub fn load_images(dir: &Path, color_key: Option<[u8; 3]>) -> Result<Vec<Sprite>, AssetError> {
    let read_dir_error = |source| AssetError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_dir_error)? {
        let entry = entry.map_err(read_dir_error)?;
        let path = entry.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    paths
        .iter()
        .map(|path| load_image(path, color_key))
        .collect()
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    use super::*;

    fn write_png(path: &Path, color: [u8; 4]) {
        let mut image = RgbaImage::new(2, 2);
        for pixel in image.pixels_mut() {
            *pixel = Rgba(color);
        }
        image.save(path).expect("write png");
    }

    #[test]
    fn load_image_applies_color_key() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("black.png");
        write_png(&path, [0, 0, 0, 255]);

        let keyed = load_image(&path, Some([0, 0, 0])).expect("load");
        assert_eq!(keyed.pixel(0, 0), Some([0, 0, 0, 0]));

        let unkeyed = load_image(&path, None).expect("load");
        assert_eq!(unkeyed.pixel(0, 0), Some([0, 0, 0, 255]));
    }

    #[test]
    fn load_images_is_sorted_by_file_name() {
        let temp = TempDir::new().expect("temp dir");
        write_png(&temp.path().join("1.png"), [20, 0, 0, 255]);
        write_png(&temp.path().join("0.png"), [10, 0, 0, 255]);

        let frames = load_images(temp.path(), None).expect("load");
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].pixel(0, 0), Some([10, 0, 0, 255]));
        assert_eq!(frames[1].pixel(0, 0), Some([20, 0, 0, 255]));
    }

    #[test]
    fn missing_file_reports_open_error() {
        let temp = TempDir::new().expect("temp dir");
        let error = load_image(&temp.path().join("nope.png"), None).expect_err("missing");
        assert!(matches!(error, AssetError::Open { .. }));
    }

    #[test]
    fn missing_directory_reports_read_dir_error() {
        let temp = TempDir::new().expect("temp dir");
        let error = load_images(&temp.path().join("nope"), None).expect_err("missing");
        assert!(matches!(error, AssetError::ReadDir { .. }));
    }
}
