use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::connectors::{CsvConnector, ExcelConnector, PostgresConnector, SqlServerConnector};
use crate::utils::{
    config::ReportConfig,
    error::{ReportError, ReportResult},
    types::{ConnectorType, TabularData},
};

/// Base trait for all data source connectors
#[async_trait]
pub trait Connector: Send + Sync {
    /// Read the whole source into memory
    async fn read(&mut self) -> ReportResult<TabularData>;

    /// Get the type of this connector
    fn get_connector_type(&self) -> ConnectorType;
}

/// The single data source selected for a run
#[derive(Debug, Clone, PartialEq)]
pub enum SourceDescriptor {
    Csv { path: PathBuf },
    Excel { path: PathBuf, sheet: Option<String> },
    Database { connection_string: String, query: String },
}

/// Database backends recognised from a connection string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseKind {
    PostgreSQL,
    SqlServer,
}

impl DatabaseKind {
    /// Detect the backend from a URL scheme or from the keys of a key/value string
    pub fn detect(connection_string: &str) -> Option<Self> {
        let lower = connection_string.trim().to_ascii_lowercase();

        if let Some((scheme, _)) = lower.split_once("://") {
            // SQLAlchemy URLs carry the driver after a '+', e.g. postgresql+psycopg2
            let base = scheme.split('+').next().unwrap_or(scheme);
            return match base {
                "postgres" | "postgresql" => Some(DatabaseKind::PostgreSQL),
                "jdbc:sqlserver" => Some(DatabaseKind::SqlServer),
                _ => None,
            };
        }

        let pairs: Vec<&str> = if lower.contains(';') {
            lower.split(';').collect()
        } else {
            lower.split_whitespace().collect()
        };
        let keys: Vec<&str> = pairs
            .iter()
            .filter_map(|pair| pair.split_once('=').map(|(key, _)| key.trim()))
            .collect();

        if keys.iter().any(|k| *k == "server" || *k == "data source") {
            Some(DatabaseKind::SqlServer)
        } else if keys.iter().any(|k| *k == "host" || *k == "hostaddr" || *k == "dbname") {
            Some(DatabaseKind::PostgreSQL)
        } else {
            None
        }
    }
}

impl fmt::Display for SourceDescriptor {
    // Connection strings may hold credentials and are never printed
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceDescriptor::Csv { path } => write!(f, "CSV file {}", path.display()),
            SourceDescriptor::Excel { path, sheet: Some(sheet) } => {
                write!(f, "Excel file {} (sheet {})", path.display(), sheet)
            }
            SourceDescriptor::Excel { path, sheet: None } => write!(f, "Excel file {}", path.display()),
            SourceDescriptor::Database { connection_string, .. } => match DatabaseKind::detect(connection_string) {
                Some(DatabaseKind::PostgreSQL) => write!(f, "PostgreSQL query"),
                Some(DatabaseKind::SqlServer) => write!(f, "SQL Server query"),
                None => write!(f, "database query"),
            },
        }
    }
}

/// Build the connector for a source descriptor
pub fn open_connector(source: &SourceDescriptor, config: &ReportConfig) -> ReportResult<Box<dyn Connector>> {
    match source {
        SourceDescriptor::Csv { path } => Ok(Box::new(CsvConnector::new(path, &config.reader))),
        SourceDescriptor::Excel { path, sheet } => {
            Ok(Box::new(ExcelConnector::new(path, sheet.clone(), &config.reader)))
        }
        SourceDescriptor::Database { connection_string, query } => {
            let timeout = config.database.timeout_secs.map(Duration::from_secs);
            match DatabaseKind::detect(connection_string) {
                Some(DatabaseKind::PostgreSQL) => Ok(Box::new(
                    PostgresConnector::new(connection_string, query).with_timeout(timeout),
                )),
                Some(DatabaseKind::SqlServer) => Ok(Box::new(
                    SqlServerConnector::new(connection_string, query).with_timeout(timeout),
                )),
                None => Err(ReportError::read_failure(
                    "Unsupported connection string: expected a postgresql:// URL, a libpq key/value string, \
                     a jdbc:sqlserver:// URL or an ADO string with server=",
                )),
            }
        }
    }
}

/// Fail with `InvalidFormat` unless the path has the given extension (ASCII case-insensitive)
pub fn check_extension(path: &Path, extension: &str, label: &str) -> ReportResult<()> {
    let matches = path
        .extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false);

    if matches {
        Ok(())
    } else {
        Err(ReportError::invalid_format(path, label))
    }
}

/// Run a database fetch, bounded by a timeout when one is configured
pub(crate) async fn with_optional_timeout<F>(timeout: Option<Duration>, fetch: F) -> ReportResult<TabularData>
where
    F: std::future::Future<Output = ReportResult<TabularData>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fetch).await.map_err(|_| {
            ReportError::read_failure(format!("Database operation timed out after {} seconds", limit.as_secs()))
        })?,
        None => fetch.await,
    }
}
