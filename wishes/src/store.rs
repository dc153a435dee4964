use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use fs_err::File;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::Product;
use crate::parse::{RawProduct, parse};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to access product snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] crate::parse::Error),
    #[error("Failed to write product snapshot: {0}")]
    Write(#[from] serde_json::Error),
}

/// A local JSON snapshot of the product table.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads all products. A missing snapshot is an empty wishlist.
    pub fn load(&self) -> Result<Vec<Product>, Error> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No product snapshot at {:?}, starting empty", self.path);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let products = parse(BufReader::new(file))?;
        log::debug!("Loaded {} products from {:?}", products.len(), self.path);
        Ok(products)
    }

    /// Replaces the snapshot, writing through a temporary file in the same directory.
    ///
    /// On failure the old snapshot is untouched and the temporary file is removed.
    pub fn save(&self, products: &[Product]) -> Result<(), Error> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs_err::create_dir_all(dir)?;
        let rows = products.iter().map(RawProduct::from).collect::<Vec<_>>();
        let mut temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, &rows)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        temp.persist(&self.path).map_err(|e| e.error)?;
        log::debug!("Saved {} products to {:?}", products.len(), self.path);
        Ok(())
    }
}
