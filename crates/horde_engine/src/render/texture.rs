//! Texture service
//!
//! The simulation never holds pixel data; it asks a [`TextureService`] for a
//! handle and stores that in mesh materials.

use std::path::{Path, PathBuf};

use super::RenderError;

/// Handle for a texture resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Texture creation from image files
pub trait TextureService {
    /// Create a texture from the image at `path`
    fn create_texture(&mut self, path: &Path) -> Result<TextureHandle, RenderError>;
}

/// Information about a registered texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    /// Source file
    pub path: PathBuf,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Texture service that validates image files with the `image` crate
///
/// Only the header is decoded; pixels are left to the renderer that
/// eventually uploads them.
#[derive(Debug, Default)]
pub struct ImageTextureService {
    textures: Vec<TextureInfo>,
}

impl ImageTextureService {
    /// Create an empty service
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a registered texture
    pub fn info(&self, handle: TextureHandle) -> Option<&TextureInfo> {
        self.textures.get(handle.0 as usize)
    }

    /// Number of registered textures
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

impl TextureService for ImageTextureService {
    fn create_texture(&mut self, path: &Path) -> Result<TextureHandle, RenderError> {
        let (width, height) = image::image_dimensions(path).map_err(|source| RenderError::TextureLoad {
            path: path.to_path_buf(),
            source,
        })?;

        let id = u32::try_from(self.textures.len()).map_err(|_| RenderError::OutOfHandles)?;
        self.textures.push(TextureInfo {
            path: path.to_path_buf(),
            width,
            height,
        });
        log::debug!("Registered texture {:?} {}x{} from {:?}", TextureHandle(id), width, height, path);
        Ok(TextureHandle(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("horde_engine_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_registers_valid_png() {
        let path = scratch_file("valid.png");
        image::RgbaImage::new(4, 2).save(&path).unwrap();

        let mut service = ImageTextureService::new();
        let handle = service.create_texture(&path).unwrap();
        let info = service.info(handle).unwrap();

        assert_eq!((info.width, info.height), (4, 2));
        assert_eq!(service.texture_count(), 1);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file_fails() {
        let mut service = ImageTextureService::new();
        let result = service.create_texture(&scratch_file("missing.png"));
        assert!(matches!(result, Err(RenderError::TextureLoad { .. })));
        assert_eq!(service.texture_count(), 0);
    }

    #[test]
    fn test_corrupt_file_fails() {
        let path = scratch_file("corrupt.png");
        std::fs::write(&path, b"not an image").unwrap();

        let mut service = ImageTextureService::new();
        assert!(service.create_texture(&path).is_err());
        std::fs::remove_file(path).ok();
    }
}
