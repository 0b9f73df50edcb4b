use async_trait::async_trait;
use csv::{Reader, ReaderBuilder, StringRecord};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::connectors::{check_extension, Connector};
use crate::utils::{
    config::ReaderConfig,
    error::{ReportError, ReportResult},
    progress::row_spinner,
    types::{ColumnMetadata, ConnectorType, DataType, Row, TabularData, Value},
};

/// Reads a CSV file in bounded chunks and concatenates them in file order
pub struct CsvConnector {
    path: PathBuf,
    chunk_size: usize,
    delimiter: char,
    show_progress: bool,
}

impl CsvConnector {
    /// Create a new CSV connector for the given file
    pub fn new(path: impl Into<PathBuf>, config: &ReaderConfig) -> Self {
        Self {
            path: path.into(),
            chunk_size: config.csv_chunk_size.max(1),
            delimiter: config.csv_delimiter,
            show_progress: config.show_progress,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// The csv reader splits on a single byte, so only ASCII delimiters are usable
    fn delimiter_byte(&self) -> ReportResult<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                ReportError::Configuration(format!("CSV delimiter {:?} must be an ASCII character", self.delimiter))
            })
    }

    fn read_file(&self) -> ReportResult<TabularData> {
        let delimiter = self.delimiter_byte()?;
        let file = File::open(&self.path).map_err(|e| read_error(&e))?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .from_reader(file);

        let headers = reader.headers().map_err(|e| read_error(&e))?.clone();
        if headers.is_empty() {
            return Err(ReportError::read_failure("Error reading CSV file: No columns to parse from file"));
        }

        let columns: Vec<ColumnMetadata> = headers
            .iter()
            .map(|header| ColumnMetadata::new(header, DataType::Text))
            .collect();
        let mut table = TabularData::new(columns);

        let spinner = row_spinner("Reading CSV", self.show_progress);
        let mut chunk_index = 0;
        let result = loop {
            let chunk = match read_chunk(&mut reader, &table.columns, self.chunk_size) {
                Ok(chunk) => chunk,
                Err(e) => break Err(e),
            };
            if chunk.is_empty() {
                break Ok(());
            }

            chunk_index += 1;
            debug!("Read CSV chunk {} ({} rows)", chunk_index, chunk.row_count());
            spinner.inc(chunk.row_count() as u64);

            if let Err(e) = table.append(chunk) {
                break Err(e);
            }
        };
        spinner.finish_and_clear();

        result.map(|_| table)
    }
}

/// Read up to `chunk_size` records into a fresh table sharing `columns`
fn read_chunk<R: io::Read>(
    reader: &mut Reader<R>,
    columns: &[ColumnMetadata],
    chunk_size: usize,
) -> ReportResult<TabularData> {
    let mut chunk = TabularData::new(columns.to_vec());
    let mut record = StringRecord::new();

    while chunk.row_count() < chunk_size {
        if !reader.read_record(&mut record).map_err(|e| read_error(&e))? {
            break;
        }
        chunk.push_row(Row::new(record.iter().map(Value::infer).collect()))?;
    }

    Ok(chunk)
}

fn read_error(e: &dyn std::fmt::Display) -> ReportError {
    ReportError::read_failure(format!("Error reading CSV file: {}", e))
}

#[async_trait]
impl Connector for CsvConnector {
    async fn read(&mut self) -> ReportResult<TabularData> {
        check_extension(&self.path, "csv", "a CSV")?;

        info!("Fetching data from CSV...");
        let table = self.read_file()?;
        info!("Successfully read data from {}", self.path.display());

        Ok(table)
    }

    fn get_connector_type(&self) -> ConnectorType {
        ConnectorType::Csv
    }
}
