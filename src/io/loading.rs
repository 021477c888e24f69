//! Directory scanning and parallel bulk decoding of tile and source images

use image::{DynamicImage, RgbaImage};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::io::configuration::IMAGE_EXTENSIONS;
use crate::io::error::{MosaicError, Result, invalid_parameter};
use crate::spatial::source::{SourceCatalog, SourceEntry};

/// Check whether a path carries a recognized image extension
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
}

/// List the image files of a directory, sorted by file name
///
/// # Errors
///
/// Returns an error if the directory cannot be read
pub fn scan_image_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_error = |source| MosaicError::FileSystem {
        path: dir.to_path_buf(),
        operation: "read directory",
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        if path.is_file() && is_image_file(&path) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Decode one image file
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded
pub fn decode_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|source| MosaicError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode every tile image of a directory in parallel
///
/// Files that fail to decode are skipped with a warning.
///
/// # Errors
///
/// Returns an error if the directory cannot be read or yields no tile
pub fn load_tiles(dir: &Path) -> Result<Vec<RgbaImage>> {
    let paths = scan_image_dir(dir)?;

    let tiles: Vec<RgbaImage> = paths
        .par_iter()
        .filter_map(|path| match decode_image(path) {
            Ok(image) => Some(image.to_rgba8()),
            Err(error) => {
                log::warn!("Skipping tile: {error}");
                None
            }
        })
        .collect();

    if tiles.is_empty() {
        return Err(MosaicError::EmptyTilePalette {
            origin: dir.display().to_string(),
        });
    }

    log::info!("Loaded {} grid images", tiles.len());
    Ok(tiles)
}

/// Decode every source image of a directory on a bounded worker pool
///
/// Failed files stay in the catalog as missing entries so navigation can skip
/// them. Blocks until every file has been attempted.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be read
/// - The worker pool cannot be created
/// - No source image decodes
pub fn load_sources(dir: &Path, workers: usize) -> Result<SourceCatalog> {
    let paths = scan_image_dir(dir)?;
    if paths.is_empty() {
        return Err(MosaicError::EmptySourceSet {
            origin: dir.display().to_string(),
        });
    }

    log::info!("Loading {} files in {}", paths.len(), dir.display());

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
        .map_err(|error| invalid_parameter("workers", &workers, &error))?;

    let entries: Vec<SourceEntry> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| {
                let name = path
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .to_string();
                match decode_image(path) {
                    Ok(image) => SourceEntry::loaded(name, image.to_rgb8()),
                    Err(error) => {
                        log::warn!("Source marked missing: {error}");
                        SourceEntry::missing(name)
                    }
                }
            })
            .collect()
    });

    if entries.iter().all(|entry| entry.image.is_none()) {
        return Err(MosaicError::EmptySourceSet {
            origin: dir.display().to_string(),
        });
    }
    let catalog = SourceCatalog::new(entries)?;

    log::info!(
        "Loaded {} of {} input images",
        catalog.loadable_count(),
        catalog.len()
    );
    Ok(catalog)
}
