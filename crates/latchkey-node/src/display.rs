//! Virtual character LCD for the frontend node.
//!
//! Emulates a 2-line × 16-column HD44780-style display: a character grid with
//! a cursor, where writes start at the cursor and characters past the end of
//! a row are lost. The node drives it through the [`CharacterDisplay`] trait;
//! observers (tests, the terminal simulator) read it through an [`LcdHandle`].
//!
//! # Character Encoding - ASCII Only
//!
//! The display controller's character ROM only covers printable ASCII
//! (0x20-0x7E). Non-ASCII text is rejected rather than transliterated, so a
//! message that would garble on the real panel fails in the emulator too.
//!
//! # Examples
//!
//! ```
//! use latchkey_hardware::CharacterDisplay;
//! use latchkey_node::VirtualLcd;
//!
//! # async fn example() -> latchkey_hardware::Result<()> {
//! let (mut lcd, handle) = VirtualLcd::new();
//! lcd.display_string("ENTER PASS: ").await?;
//! lcd.move_cursor(1, 0).await?;
//! lcd.display_character('*').await?;
//!
//! assert_eq!(handle.lines(), vec!["ENTER PASS:", "*"]);
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use latchkey_hardware::{CharacterDisplay, HardwareError, Result};

/// Number of rows on the fitted panel.
const DEFAULT_ROWS: u8 = 2;

/// Number of columns on the fitted panel.
const DEFAULT_COLUMNS: u8 = 16;

/// Panel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LcdGeometry {
    pub rows: u8,
    pub columns: u8,
}

impl LcdGeometry {
    pub fn new(rows: u8, columns: u8) -> Self {
        Self { rows, columns }
    }
}

impl Default for LcdGeometry {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLUMNS)
    }
}

#[derive(Debug)]
struct Panel {
    geometry: LcdGeometry,
    cells: Vec<Vec<char>>,
    cursor: (u8, u8),
    transcript: Vec<String>,
}

impl Panel {
    fn new(geometry: LcdGeometry) -> Self {
        Self {
            geometry,
            cells: vec![vec![' '; usize::from(geometry.columns)]; usize::from(geometry.rows)],
            cursor: (0, 0),
            transcript: Vec::new(),
        }
    }

    fn put(&mut self, c: char) {
        let (row, column) = self.cursor;
        if column < self.geometry.columns {
            self.cells[usize::from(row)][usize::from(column)] = c;
        }
        self.cursor.1 = column.saturating_add(1);
    }

    fn lines(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|row| row.iter().collect::<String>().trim_end().to_string())
            .collect()
    }
}

fn lock(panel: &Mutex<Panel>) -> MutexGuard<'_, Panel> {
    panel.lock().unwrap_or_else(PoisonError::into_inner)
}

fn validate(c: char) -> Result<()> {
    if c.is_ascii() && !c.is_ascii_control() {
        Ok(())
    } else {
        Err(HardwareError::invalid_data(format!(
            "Character {c:?} is not printable ASCII"
        )))
    }
}

/// Emulated character LCD.
#[derive(Debug)]
pub struct VirtualLcd {
    panel: Arc<Mutex<Panel>>,
    revision: watch::Sender<u64>,
}

impl VirtualLcd {
    /// Create a 2×16 panel.
    pub fn new() -> (Self, LcdHandle) {
        Self::with_geometry(LcdGeometry::default())
    }

    pub fn with_geometry(geometry: LcdGeometry) -> (Self, LcdHandle) {
        let panel = Arc::new(Mutex::new(Panel::new(geometry)));
        let (revision, changes) = watch::channel(0);
        let handle = LcdHandle {
            panel: Arc::clone(&panel),
            changes,
        };
        (Self { panel, revision }, handle)
    }

    fn touched(&self) {
        self.revision.send_modify(|r| *r += 1);
    }
}

impl CharacterDisplay for VirtualLcd {
    async fn clear(&mut self) -> Result<()> {
        {
            let mut panel = lock(&self.panel);
            let geometry = panel.geometry;
            let transcript = std::mem::take(&mut panel.transcript);
            *panel = Panel::new(geometry);
            panel.transcript = transcript;
        }
        self.touched();
        Ok(())
    }

    async fn move_cursor(&mut self, row: u8, column: u8) -> Result<()> {
        {
            let mut panel = lock(&self.panel);
            if row >= panel.geometry.rows || column >= panel.geometry.columns {
                return Err(HardwareError::invalid_data(format!(
                    "Cursor ({row}, {column}) outside {}x{} panel",
                    panel.geometry.rows, panel.geometry.columns
                )));
            }
            panel.cursor = (row, column);
        }
        Ok(())
    }

    async fn display_string(&mut self, text: &str) -> Result<()> {
        text.chars().try_for_each(validate)?;
        debug!("LCD: {:?}", text);
        {
            let mut panel = lock(&self.panel);
            text.chars().for_each(|c| panel.put(c));
            panel.transcript.push(text.to_string());
        }
        self.touched();
        Ok(())
    }

    async fn display_character(&mut self, c: char) -> Result<()> {
        validate(c)?;
        lock(&self.panel).put(c);
        self.touched();
        Ok(())
    }
}

/// Read-only view of a [`VirtualLcd`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct LcdHandle {
    panel: Arc<Mutex<Panel>>,
    changes: watch::Receiver<u64>,
}

impl LcdHandle {
    /// Visible rows with trailing blanks trimmed.
    pub fn lines(&self) -> Vec<String> {
        lock(&self.panel).lines()
    }

    /// One visible row, trimmed.
    pub fn line(&self, row: usize) -> Option<String> {
        self.lines().into_iter().nth(row)
    }

    pub fn geometry(&self) -> LcdGeometry {
        lock(&self.panel).geometry
    }

    pub fn cursor(&self) -> (u8, u8) {
        lock(&self.panel).cursor
    }

    /// Every string written with `display_string`, oldest first.
    ///
    /// Survives `clear`, so tests can assert on messages that were shown and
    /// later wiped.
    pub fn transcript(&self) -> Vec<String> {
        lock(&self.panel).transcript.clone()
    }

    /// Returns `true` if `text` has ever been written.
    pub fn has_shown(&self, text: &str) -> bool {
        lock(&self.panel).transcript.iter().any(|t| t == text)
    }

    /// Wait until the panel changes.
    ///
    /// Returns `false` once the display has been dropped.
    pub async fn changed(&mut self) -> bool {
        self.changes.changed().await.is_ok()
    }

    /// Render the panel inside a box.
    pub fn render(&self) -> String {
        let panel = lock(&self.panel);
        let width = usize::from(panel.geometry.columns);
        let border = format!("+{}+", "-".repeat(width));

        let mut out = String::with_capacity((width + 3) * (panel.cells.len() + 2));
        out.push_str(&border);
        out.push('\n');
        for row in &panel.cells {
            out.push('|');
            out.extend(row.iter());
            out.push_str("|\n");
        }
        out.push_str(&border);
        out
    }
}
