//! In-memory EEPROM.
//!
//! Cells start erased (`0xFF`). Clones share the same cells, so a test can
//! drop a node, build a fresh one over a clone of the store, and observe what
//! survived the "power cycle".

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{HardwareError, NvStore, Result};
use latchkey_core::constants::IDLE_BYTE;

/// Size of the emulated device (1 KiB, as on the deployed controller).
pub const DEFAULT_EEPROM_SIZE: usize = 1024;

/// On-disk image format.
#[derive(Debug, Serialize, Deserialize)]
struct EepromImage {
    cells: Vec<u8>,
}

/// Shared, erasable byte store.
#[derive(Debug, Clone)]
pub struct MockEeprom {
    cells: Arc<Mutex<Vec<u8>>>,
}

impl MockEeprom {
    /// Create an erased store of [`DEFAULT_EEPROM_SIZE`] bytes.
    pub fn new() -> Self {
        Self::with_size(DEFAULT_EEPROM_SIZE)
    }

    pub fn with_size(size: usize) -> Self {
        Self::from_bytes(vec![IDLE_BYTE; size])
    }

    pub fn from_bytes(cells: Vec<u8>) -> Self {
        Self {
            cells: Arc::new(Mutex::new(cells)),
        }
    }

    fn cells(&self) -> MutexGuard<'_, Vec<u8>> {
        self.cells.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn size(&self) -> usize {
        self.cells().len()
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Vec<u8> {
        self.cells().clone()
    }

    /// Read `len` bytes starting at `address` without going through the trait.
    pub fn peek(&self, address: u16, len: usize) -> Result<Vec<u8>> {
        let cells = self.cells();
        let start = usize::from(address);
        cells
            .get(start..start + len)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| HardwareError::invalid_address(address, cells.len()))
    }

    /// Load an image previously written by [`save`](Self::save).
    ///
    /// A missing file yields an erased store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No EEPROM image at {}, starting erased", path.display());
            return Ok(Self::new());
        }

        let text = std::fs::read_to_string(path)?;
        let image: EepromImage = serde_json::from_str(&text)
            .map_err(|e| HardwareError::invalid_data(format!("EEPROM image: {e}")))?;
        Ok(Self::from_bytes(image.cells))
    }

    /// Persist the current contents as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let image = EepromImage {
            cells: self.snapshot(),
        };
        let text = serde_json::to_string(&image)
            .map_err(|e| HardwareError::invalid_data(format!("EEPROM image: {e}")))?;
        std::fs::write(path, text)?;
        debug!("Saved EEPROM image to {}", path.display());
        Ok(())
    }
}

impl Default for MockEeprom {
    fn default() -> Self {
        Self::new()
    }
}

impl NvStore for MockEeprom {
    async fn read_byte(&mut self, address: u16) -> Result<u8> {
        let cells = self.cells();
        cells
            .get(usize::from(address))
            .copied()
            .ok_or_else(|| HardwareError::invalid_address(address, cells.len()))
    }

    async fn write_byte(&mut self, address: u16, value: u8) -> Result<()> {
        let mut cells = self.cells();
        let size = cells.len();
        let cell = cells
            .get_mut(usize::from(address))
            .ok_or_else(|| HardwareError::invalid_address(address, size))?;
        *cell = value;
        Ok(())
    }
}
