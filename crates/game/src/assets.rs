//! Startup asset preload.
//!
//! Models and textures are loaded on parallel threads joined once, before
//! the first tick. Anything that fails is recorded. The game then degrades:
//! primitive creatures, invisible weapons, no truck, no ghosts.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Models the game knows how to use.
pub const MODELS: [&str; 5] = ["zombie", "truck", "ugv", "pistol", "rifle"];
/// Ghost billboard textures.
pub const GHOST_TEXTURES: usize = 8;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset file not found: {0}")]
    Missing(PathBuf),
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model {name} is not valid glTF: {source}")]
    Model {
        name: String,
        #[source]
        source: gltf::Error,
    },
    #[error("texture {name} failed to decode: {source}")]
    Texture {
        name: String,
        #[source]
        source: image::ImageError,
    },
}

/// Files to preload.
#[derive(Debug, Clone)]
pub struct AssetManifest {
    pub models: Vec<(&'static str, PathBuf)>,
    pub textures: Vec<(String, PathBuf)>,
}

impl AssetManifest {
    /// Standard layout under `root`: `models/<name>.glb` and
    /// `textures/<name>.jpg`.
    pub fn standard(root: &Path) -> Self {
        let models = MODELS
            .iter()
            .map(|name| (*name, root.join("models").join(format!("{name}.glb"))))
            .collect();
        let mut textures = vec![("floor".to_string(), root.join("textures").join("floor.jpg"))];
        for i in 1..=GHOST_TEXTURES {
            let name = format!("ghost{i}");
            let path = root.join("textures").join(format!("{name}.jpg"));
            textures.push((name, path));
        }
        Self { models, textures }
    }
}

/// Decoded texture metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
}

/// Result of the preload: what is available and what failed.
#[derive(Debug, Default)]
pub struct AssetCatalog {
    models: HashSet<&'static str>,
    textures: HashMap<String, TextureInfo>,
    pub failures: Vec<AssetError>,
}

impl AssetCatalog {
    /// Nothing loaded. Every fallback applies.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Mark a model as available.
    pub fn with_model(mut self, name: &'static str) -> Self {
        self.models.insert(name);
        self
    }

    pub fn with_texture(mut self, name: impl Into<String>, info: TextureInfo) -> Self {
        self.textures.insert(name.into(), info);
        self
    }

    pub fn has_model(&self, name: &str) -> bool {
        self.models.contains(name)
    }

    pub fn texture(&self, name: &str) -> Option<TextureInfo> {
        self.textures.get(name).copied()
    }

    /// Names of the ghost textures that loaded, in order.
    pub fn ghost_textures(&self) -> Vec<String> {
        (1..=GHOST_TEXTURES)
            .map(|i| format!("ghost{i}"))
            .filter(|name| self.textures.contains_key(name))
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

fn read(path: &Path) -> Result<Vec<u8>, AssetError> {
    if !path.exists() {
        return Err(AssetError::Missing(path.to_path_buf()));
    }
    std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a glTF/GLB document to make sure the model is usable.
pub fn validate_model(name: &str, bytes: &[u8]) -> Result<(), AssetError> {
    gltf::Gltf::from_slice(bytes).map_err(|source| AssetError::Model {
        name: name.to_string(),
        source,
    })?;
    Ok(())
}

/// Decode an image and report its size.
pub fn decode_texture(name: &str, bytes: &[u8]) -> Result<TextureInfo, AssetError> {
    let img = image::load_from_memory(bytes).map_err(|source| AssetError::Texture {
        name: name.to_string(),
        source,
    })?;
    Ok(TextureInfo {
        width: img.width(),
        height: img.height(),
    })
}

fn load_model(name: &'static str, path: &Path) -> Result<&'static str, AssetError> {
    let bytes = read(path)?;
    validate_model(name, &bytes)?;
    Ok(name)
}

fn load_texture(name: String, path: &Path) -> Result<(String, TextureInfo), AssetError> {
    let bytes = read(path)?;
    let info = decode_texture(&name, &bytes)?;
    Ok((name, info))
}

/// Load every entry of `manifest` on its own thread and join them all,
/// collecting failures instead of stopping. Failures keep manifest order.
pub fn load_all(manifest: AssetManifest) -> AssetCatalog {
    let (models, textures) = std::thread::scope(|s| {
        let models: Vec<_> = manifest
            .models
            .iter()
            .map(|(name, path)| {
                let name: &'static str = *name;
                s.spawn(move || load_model(name, path))
            })
            .collect();
        let textures: Vec<_> = manifest
            .textures
            .iter()
            .map(|(name, path)| s.spawn(move || load_texture(name.clone(), path)))
            .collect();
        (join_all(models, "model"), join_all(textures, "texture"))
    });

    let mut catalog = AssetCatalog::empty();
    for result in models {
        match result {
            Ok(name) => {
                catalog.models.insert(name);
            }
            Err(e) => {
                log::warn!("Model load failed: {}", e);
                catalog.failures.push(e);
            }
        }
    }
    for result in textures {
        match result {
            Ok((name, info)) => {
                catalog.textures.insert(name, info);
            }
            Err(e) => {
                log::warn!("Texture load failed: {}", e);
                catalog.failures.push(e);
            }
        }
    }
    log::info!(
        "Assets ready: {} models, {} textures, {} failures",
        catalog.models.len(),
        catalog.textures.len(),
        catalog.failures.len()
    );
    catalog
}

fn join_all<T>(
    handles: Vec<std::thread::ScopedJoinHandle<'_, Result<T, AssetError>>>,
    kind: &str,
) -> Vec<Result<T, AssetError>> {
    handles
        .into_iter()
        .filter_map(|handle| match handle.join() {
            Ok(result) => Some(result),
            Err(_) => {
                log::error!("A {} loader thread panicked", kind);
                None
            }
        })
        .collect()
}

/// Run the preload. This is the single join point before the game starts.
pub fn preload(root: &Path) -> AssetCatalog {
    load_all(AssetManifest::standard(root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_lists_models_floor_and_ghosts() {
        let m = AssetManifest::standard(Path::new("assets"));
        assert_eq!(m.models.len(), MODELS.len());
        assert_eq!(m.textures.len(), 1 + GHOST_TEXTURES);
        assert!(m.textures[1].1.ends_with("textures/ghost1.jpg"));
    }

    #[test]
    fn missing_directory_degrades_to_empty_catalog() {
        let catalog = preload(Path::new("/definitely/not/here"));
        assert!(!catalog.has_model("truck"));
        assert!(catalog.ghost_textures().is_empty());
        assert_eq!(catalog.failures.len(), MODELS.len() + 1 + GHOST_TEXTURES);
        assert!(matches!(catalog.failures[0], AssetError::Missing(_)));
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(matches!(validate_model("truck", b"not a model"), Err(AssetError::Model { .. })));
        assert!(matches!(decode_texture("floor", b"not an image"), Err(AssetError::Texture { .. })));
    }

    #[test]
    fn png_texture_decodes() {
        let img = image::RgbaImage::new(4, 2);
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        assert_eq!(decode_texture("ghost1", &bytes).unwrap(), TextureInfo { width: 4, height: 2 });
    }

    #[test]
    fn partial_manifest_keeps_what_loaded() {
        let dir = std::env::temp_dir().join(format!("liminal-assets-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let png = dir.join("ghost2.png");
        image::RgbaImage::new(3, 5).save(&png).unwrap();
        let junk = dir.join("ghost4.png");
        std::fs::write(&junk, b"not an image").unwrap();

        let manifest = AssetManifest {
            models: vec![("truck", dir.join("truck.glb"))],
            textures: vec![
                ("ghost1".to_string(), dir.join("ghost1.png")),
                ("ghost2".to_string(), png),
                ("ghost4".to_string(), junk),
            ],
        };
        let catalog = load_all(manifest);
        std::fs::remove_dir_all(&dir).unwrap();

        assert!(!catalog.has_model("truck"));
        assert_eq!(catalog.texture("ghost2"), Some(TextureInfo { width: 3, height: 5 }));
        assert_eq!(catalog.ghost_textures(), vec!["ghost2".to_string()]);
        assert_eq!(catalog.failures.len(), 3);
        assert!(matches!(catalog.failures[0], AssetError::Missing(_)));
        assert!(matches!(catalog.failures[1], AssetError::Missing(_)));
        assert!(matches!(catalog.failures[2], AssetError::Texture { .. }));
    }

    #[test]
    fn ghost_textures_only_lists_loaded_ones() {
        let info = TextureInfo { width: 1, height: 1 };
        let catalog = AssetCatalog::empty()
            .with_texture("ghost3", info)
            .with_texture("ghost1", info)
            .with_texture("floor", info);
        assert_eq!(catalog.ghost_textures(), vec!["ghost1".to_string(), "ghost3".to_string()]);
    }
}
