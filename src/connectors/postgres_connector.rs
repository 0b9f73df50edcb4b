use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio_postgres::{NoTls, SimpleQueryMessage};
use tracing::{debug, error, info, instrument::WithSubscriber};

use crate::connectors::connector_trait::{with_optional_timeout, Connector};
use crate::utils::{
    error::{ReportError, ReportResult},
    types::{ColumnMetadata, ConnectorType, DataType, Row, TabularData, Value},
};

/// PostgreSQL connector using tokio-postgres
#[derive(Debug)]
pub struct PostgresConnector {
    connection_string: String,
    query: String,
    timeout: Option<Duration>,
}

impl PostgresConnector {
    /// Create a new PostgreSQL connector for one query
    pub fn new(connection_string: &str, query: &str) -> Self {
        Self {
            connection_string: normalize_connection_string(connection_string),
            query: query.to_string(),
            timeout: None,
        }
    }

    /// Bound connect and query time; `None` waits indefinitely
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    async fn fetch(&self) -> ReportResult<TabularData> {
        let (client, connection) = tokio_postgres::connect(&self.connection_string, NoTls)
            .await
            .map_err(|e| ReportError::read_failure(format!("Error reading from database: failed to connect: {}", e)))?;

        tokio::spawn(
            async move {
                if let Err(e) = connection.await {
                    error!("PostgreSQL connection error: {}", e);
                }
            }
            .with_current_subscriber(),
        );

        let start_time = Instant::now();

        // The prepared statement supplies column names and types even when no rows come back
        let statement = client
            .prepare(&self.query)
            .await
            .map_err(|e| query_error(&e))?;
        let columns: Vec<ColumnMetadata> = statement
            .columns()
            .iter()
            .map(|col| ColumnMetadata::new(col.name(), pg_type_to_data_type(col.type_().oid())))
            .collect();

        // The simple query protocol returns every value as text, whatever its type
        let messages = client
            .simple_query(&self.query)
            .await
            .map_err(|e| query_error(&e))?;

        let mut table = TabularData::new(columns);
        for message in messages {
            if let SimpleQueryMessage::Row(row) = message {
                let values: Vec<Value> = (0..row.len())
                    .map(|i| {
                        let data_type = table.columns.get(i).map(|c| c.data_type).unwrap_or(DataType::Text);
                        match row.get(i) {
                            Some(raw) => Value::from_text(raw, data_type),
                            None => Value::Null,
                        }
                    })
                    .collect();
                table.push_row(Row::new(values))?;
            }
        }

        debug!("PostgreSQL query returned {} rows in {:?}", table.row_count(), start_time.elapsed());
        Ok(table)
    }
}

/// Strip an SQLAlchemy driver suffix (`postgresql+psycopg2://`) from a URL scheme
pub fn normalize_connection_string(connection_string: &str) -> String {
    let trimmed = connection_string.trim();
    match trimmed.split_once("://") {
        Some((scheme, rest)) if scheme.contains('+') => {
            let base = scheme.split('+').next().unwrap_or(scheme);
            format!("{}://{}", base, rest)
        }
        _ => trimmed.to_string(),
    }
}

/// Convert PostgreSQL type OID to internal DataType
pub fn pg_type_to_data_type(type_oid: u32) -> DataType {
    match type_oid {
        25 | 1043 | 1042 => DataType::Text,     // TEXT, VARCHAR, CHAR
        23 | 20 | 21 => DataType::Integer,      // INT4, INT8, INT2
        700 | 701 => DataType::Float,           // FLOAT4, FLOAT8
        16 => DataType::Boolean,                // BOOL
        1082 => DataType::Date,                 // DATE
        1114 | 1184 => DataType::DateTime,      // TIMESTAMP, TIMESTAMPTZ
        17 => DataType::Binary,                 // BYTEA
        _ => DataType::Text,                    // NUMERIC, JSON and the rest keep their text form
    }
}

fn query_error(e: &tokio_postgres::Error) -> ReportError {
    ReportError::read_failure(format!("Error reading from database: {}", e))
}

#[async_trait]
impl Connector for PostgresConnector {
    async fn read(&mut self) -> ReportResult<TabularData> {
        info!("Connecting to the database and fetching data...");
        let table = with_optional_timeout(self.timeout, self.fetch()).await?;
        info!("Successfully fetched data from the database.");
        Ok(table)
    }

    fn get_connector_type(&self) -> ConnectorType {
        ConnectorType::PostgreSQL
    }
}
