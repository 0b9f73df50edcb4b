use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::utils::error::{ReportError, ReportResult};

/// Millimetres per PDF point
pub const MM_PER_PT: f32 = 25.4 / 72.0;

/// Main report configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    pub reader: ReaderConfig,
    pub layout: PageLayout,
    pub database: DatabaseConfig,
}

/// Source reader configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub csv_chunk_size: usize,
    pub csv_delimiter: char,
    pub show_progress: bool,
}

/// Page geometry, all lengths in millimetres except `font_size` (points)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PageLayout {
    pub page_size: PageSize,
    pub margin_left: f32,
    pub margin_top: f32,
    pub break_margin: f32,
    pub row_height: f32,
    pub column_margin: f32,
    pub cell_padding: f32,
    pub font_size: f32,
    pub line_width: f32,
}

/// Supported page sizes (portrait)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub enum PageSize {
    A4,
    Letter,
    Legal,
    Custom { width: f32, height: f32 },
}

/// Database connector configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub timeout_secs: Option<u64>, // seconds, none = wait indefinitely
}

impl ReportConfig {
    /// Load a configuration from a JSON file; absent fields keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> ReportResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ReportError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: ReportConfig = serde_json::from_str(&content).map_err(|e| {
            ReportError::Configuration(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the reader or renderer cannot work with
    pub fn validate(&self) -> ReportResult<()> {
        if self.reader.csv_chunk_size == 0 {
            return Err(ReportError::Configuration("reader.csv_chunk_size must be at least 1".to_string()));
        }
        if !self.reader.csv_delimiter.is_ascii() {
            return Err(ReportError::Configuration("reader.csv_delimiter must be an ASCII character".to_string()));
        }
        self.layout.validate()
    }
}

impl PageLayout {
    /// Page width and height in millimetres
    pub fn page_dimensions(&self) -> (f32, f32) {
        match self.page_size {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
            PageSize::Custom { width, height } => (width, height),
        }
    }

    /// Lowest y a row may reach before a page break is forced
    pub fn page_break_trigger(&self) -> f32 {
        self.page_dimensions().1 - self.break_margin
    }

    /// Font size converted to millimetres
    pub fn font_size_mm(&self) -> f32 {
        self.font_size * MM_PER_PT
    }

    fn validate(&self) -> ReportResult<()> {
        let (width, height) = self.page_dimensions();
        let positive = [
            ("page width", width),
            ("page height", height),
            ("row_height", self.row_height),
            ("font_size", self.font_size),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ReportError::Configuration(format!("layout {} must be positive", name)));
            }
        }
        if self.margin_top + self.row_height > self.page_break_trigger() {
            return Err(ReportError::Configuration(
                "layout margins leave no room for a single row".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            csv_chunk_size: 1000,
            csv_delimiter: ',',
            show_progress: true,
        }
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            margin_left: 10.0,
            margin_top: 10.0,
            break_margin: 15.0,
            row_height: 10.0,
            column_margin: 1.0,
            cell_padding: 1.0,
            font_size: 10.0,
            line_width: 0.2,
        }
    }
}
