//! File-backed target overrides (`targets.generated.toml`).
//!
//! The file holds only the weights that differ from the universe file, plus
//! metadata for tickers the universe does not list (added through
//! `strategy add`/`rotate`). A missing file means no overrides.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sleevebook::strategy::TargetStore;
use sleevebook::{AssetBook, TargetWeights, Ticker};

use crate::config::AssetEntry;
use crate::error::{Error, Result};

pub const DEFAULT_STORE_PATH: &str = "config/targets.generated.toml";

#[derive(Debug, Default, Deserialize, Serialize)]
struct GeneratedFile {
    #[serde(default)]
    targets: TargetWeights,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    assets: BTreeMap<Ticker, AssetEntry>,
}

/// Target store persisted as a TOML file.
#[derive(Debug, Clone)]
pub struct FileTargetStore {
    path: PathBuf,
}

impl FileTargetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Metadata recorded for tickers added outside the universe file.
    pub fn load_assets(&self) -> Result<AssetBook> {
        Ok(self
            .read()?
            .assets
            .into_iter()
            .map(|(ticker, entry)| (ticker, entry.to_meta(ticker)))
            .collect())
    }

    /// Replace the overrides and record metadata for a newly added ticker
    /// in a single write.
    pub fn save_edit(
        &mut self,
        overrides: &TargetWeights,
        asset: Option<(Ticker, AssetEntry)>,
    ) -> Result<()> {
        let mut file = self.read()?;
        file.targets = overrides.clone();
        if let Some((ticker, entry)) = asset {
            file.assets.insert(ticker, entry);
        }
        self.write(&file)
    }

    fn read(&self) -> Result<GeneratedFile> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(GeneratedFile::default());
            }
            Err(source) => {
                return Err(Error::StoreRead {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        toml::from_str(&contents).map_err(|source| Error::StoreParse {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, file: &GeneratedFile) -> Result<()> {
        let body = toml::to_string(file).map_err(|e| Error::StoreWrite(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = format!(
            "# Generated by `rebalancer strategy`. Overrides the universe targets.\n{body}"
        );
        std::fs::write(&self.path, contents).map_err(|e| Error::StoreWrite(e.to_string()))?;
        log::debug!("wrote {}", self.path.display());
        Ok(())
    }
}

impl TargetStore for FileTargetStore {
    type Error = Error;

    fn load(&self) -> Result<TargetWeights> {
        Ok(self.read()?.targets)
    }

    fn save(&mut self, overrides: &TargetWeights) -> Result<()> {
        let mut file = self.read()?;
        file.targets = overrides.clone();
        self.write(&file)
    }
}
