//! Fat/water dataset directory loading.

use std::path::{Path, PathBuf};

use crate::constants::DATASET_CONFIG_FILE;
use crate::data::source::SubvolumeSource;
use crate::data::stitch_config::StitchConfig;
use crate::data::volume::Volume;
use crate::error::{Result, TraceError};

/// Resolved file locations inside a dataset directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub fat_upper: PathBuf,
    pub fat_lower: PathBuf,
    pub water_upper: PathBuf,
    pub water_lower: PathBuf,
    pub config: PathBuf,
}

impl DatasetPaths {
    /// Locate the four scans and `config.xml` in `dir`.
    ///
    /// Each scan is looked up with every extension the source accepts, in
    /// order. A scan not found under any extension resolves to the first one
    /// so the read reports a `FileNotFound` naming it.
    pub fn resolve(dir: &Path, source: &dyn SubvolumeSource) -> Self {
        let find = |stem: &str| -> PathBuf {
            let extensions = source.extensions();
            extensions
                .iter()
                .map(|ext| dir.join(format!("{}.{}", stem, ext)))
                .find(|path| path.exists())
                .unwrap_or_else(|| {
                    let ext = extensions.first().copied().unwrap_or("nii");
                    dir.join(format!("{}.{}", stem, ext))
                })
        };

        Self {
            fat_upper: find("fatUpper"),
            fat_lower: find("fatLower"),
            water_upper: find("waterUpper"),
            water_lower: find("waterLower"),
            config: dir.join(DATASET_CONFIG_FILE),
        }
    }
}

/// Both stitched channels of one subject.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub fat: Volume,
    pub water: Volume,
    pub config: StitchConfig,
    pub dir: PathBuf,
}

impl Dataset {
    /// Load and stitch a dataset directory.
    ///
    /// All four scans and the configuration must load, and the stitched fat
    /// and water volumes must be compatible. Nothing is returned otherwise.
    pub fn load(dir: &Path, source: &dyn SubvolumeSource) -> Result<Self> {
        let paths = DatasetPaths::resolve(dir, source);
        log::info!("Loading dataset {:?} with {} reader", dir, source.name());

        let config = StitchConfig::from_file(&paths.config)?;

        let fat = Volume::stitch(
            &source.read(&paths.fat_upper)?,
            &source.read(&paths.fat_lower)?,
            &config,
        )?;
        let water = Volume::stitch(
            &source.read(&paths.water_upper)?,
            &source.read(&paths.water_lower)?,
            &config,
        )?;

        if !fat.compatible(&water) {
            return Err(TraceError::incompatible(fat.mismatches(&water)));
        }

        log::info!(
            "Loaded dataset {:?}: {}x{}x{}",
            dir,
            fat.x_dim(),
            fat.y_dim(),
            fat.z_dim()
        );

        Ok(Self {
            fat,
            water,
            config,
            dir: dir.to_path_buf(),
        })
    }

    /// Extents as `[x, y, z]`.
    pub fn dims(&self) -> [usize; 3] {
        self.fat.dims()
    }
}
