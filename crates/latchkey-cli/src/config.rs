//! Simulator configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use latchkey_core::{Error, Result};
use latchkey_node::LcdGeometry;
use latchkey_protocol::LinkConfig;

/// Smallest panel the frontend's messages fit on.
const MIN_ROWS: u8 = 2;
const MIN_COLUMNS: u8 = 16;

/// Simulator configuration, read from a JSON file.
///
/// Every field is optional in the file; missing ones take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulatorConfig {
    /// JSON image backing the authority's store. `None` keeps it in memory.
    pub eeprom_path: Option<PathBuf>,

    /// Give up on a silent authority after this long (milliseconds).
    pub receive_timeout_ms: Option<u64>,

    pub lcd_rows: u8,
    pub lcd_columns: u8,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        let geometry = LcdGeometry::default();
        Self {
            eeprom_path: None,
            receive_timeout_ms: None,
            lcd_rows: geometry.rows,
            lcd_columns: geometry.columns,
        }
    }
}

impl SimulatorConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_eeprom_path(mut self, path: PathBuf) -> Self {
        self.eeprom_path = Some(path);
        self
    }

    pub fn with_receive_timeout_ms(mut self, ms: u64) -> Self {
        self.receive_timeout_ms = Some(ms);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.lcd_rows < MIN_ROWS || self.lcd_columns < MIN_COLUMNS {
            return Err(Error::Config(format!(
                "LCD must be at least {MIN_ROWS}x{MIN_COLUMNS}, got {}x{}",
                self.lcd_rows, self.lcd_columns
            )));
        }
        if self.receive_timeout_ms == Some(0) {
            return Err(Error::Config(
                "receive_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn geometry(&self) -> LcdGeometry {
        LcdGeometry::new(self.lcd_rows, self.lcd_columns)
    }

    pub fn link_config(&self) -> LinkConfig {
        match self.receive_timeout_ms {
            Some(ms) => LinkConfig::default().with_receive_timeout(Duration::from_millis(ms)),
            None => LinkConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    fn write_config(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = SimulatorConfig::default();
        assert_eq!(config.geometry(), LcdGeometry::new(2, 16));
        assert_eq!(config.link_config().receive_timeout, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let file = write_config(r#"{ "eeprom_path": "lock.json", "receive_timeout_ms": 90000 }"#);

        let config = SimulatorConfig::load(file.path()).unwrap();
        assert_eq!(config.eeprom_path, Some(PathBuf::from("lock.json")));
        assert_eq!(
            config.link_config().receive_timeout,
            Some(Duration::from_secs(90))
        );
        assert_eq!(config.lcd_columns, 16);
    }

    #[rstest]
    #[case(r#"{ "lcd_rows": 1 }"#)]
    #[case(r#"{ "lcd_columns": 8 }"#)]
    #[case(r#"{ "receive_timeout_ms": 0 }"#)]
    #[case(r#"{ "baud": 9600 }"#)]
    #[case("not json")]
    fn test_load_rejects(#[case] text: &str) {
        let file = write_config(text);
        assert!(SimulatorConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = SimulatorConfig::default()
            .with_eeprom_path(PathBuf::from("/tmp/a.json"))
            .with_receive_timeout_ms(500);

        assert_eq!(config.eeprom_path, Some(PathBuf::from("/tmp/a.json")));
        assert_eq!(config.receive_timeout_ms, Some(500));
    }
}
