use async_trait::async_trait;
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::connectors::{check_extension, Connector};
use crate::utils::{
    config::ReaderConfig,
    error::{ReportError, ReportResult},
    progress::row_spinner,
    types::{ColumnMetadata, ConnectorType, DataType, Row, TabularData, Value},
};

/// Reads one worksheet of an `.xlsx` workbook; the first row holds the column names
pub struct ExcelConnector {
    path: PathBuf,
    sheet: Option<String>,
    show_progress: bool,
}

impl ExcelConnector {
    /// Create a new Excel connector. Without a sheet name the first worksheet is
    /// read: calamine does not report which sheet was active when the file was saved.
    pub fn new(path: impl Into<PathBuf>, sheet: Option<String>, config: &ReaderConfig) -> Self {
        Self {
            path: path.into(),
            sheet,
            show_progress: config.show_progress,
        }
    }

    fn load_range(&self) -> ReportResult<Range<Data>> {
        let mut workbook: Xlsx<_> = open_workbook(&self.path).map_err(|e| read_error(&e))?;

        match &self.sheet {
            Some(name) => {
                debug!("Reading worksheet '{}'", name);
                workbook.worksheet_range(name).map_err(|e| read_error(&e))
            }
            None => workbook
                .worksheet_range_at(0)
                .ok_or_else(|| ReportError::read_failure("Error reading Excel file: workbook has no worksheets"))?
                .map_err(|e| read_error(&e)),
        }
    }

    fn range_to_table(&self, range: &Range<Data>) -> ReportResult<TabularData> {
        let mut rows = range.rows();
        let header = match rows.next() {
            Some(header) => header,
            None => return Ok(TabularData::default()),
        };

        let columns: Vec<ColumnMetadata> = header
            .iter()
            .enumerate()
            .map(|(index, cell)| ColumnMetadata::new(header_name(index, cell), DataType::Text))
            .collect();
        let mut table = TabularData::new(columns);

        let spinner = row_spinner("Reading Excel", self.show_progress);
        for cells in rows {
            let row = Row::new(cells.iter().map(convert_cell).collect());
            if let Err(e) = table.push_row(row) {
                spinner.finish_and_clear();
                return Err(e);
            }
            spinner.inc(1);
        }
        spinner.finish_and_clear();

        Ok(table)
    }
}

fn header_name(index: usize, cell: &Data) -> String {
    match cell {
        Data::Empty => format!("Unnamed: {}", index),
        other => other.to_string(),
    }
}

/// Convert a worksheet cell. Excel stores every number as a float, so integral
/// numbers come back as integers.
fn convert_cell(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => Value::Text(s.clone()),
        Data::Int(i) => Value::Integer(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Value::Integer(*f as i64),
        Data::Float(f) => Value::Float(*f),
        Data::Bool(b) => Value::Boolean(*b),
        Data::DateTime(excel_dt) => match excel_dt.as_datetime() {
            Some(dt) => Value::DateTime(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Value::Text(cell.to_string()),
        },
        Data::DateTimeIso(s) => Value::DateTime(s.clone()),
        Data::DurationIso(s) => Value::Text(s.clone()),
        Data::Error(e) => Value::Text(e.to_string()),
    }
}

fn read_error(e: &dyn std::fmt::Display) -> ReportError {
    ReportError::read_failure(format!("Error reading Excel file: {}", e))
}

#[async_trait]
impl Connector for ExcelConnector {
    async fn read(&mut self) -> ReportResult<TabularData> {
        check_extension(&self.path, "xlsx", "an Excel (.xlsx)")?;

        info!("Fetching data from Excel...");
        let range = self.load_range()?;
        let table = self.range_to_table(&range)?;
        info!("Successfully read data from {}", self.path.display());

        Ok(table)
    }

    fn get_connector_type(&self) -> ConnectorType {
        ConnectorType::Excel
    }
}
