use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use std::time::{Duration, Instant};
use tiberius::{Client, ColumnData, Config, FromSql};
use tokio::net::TcpStream;
use tokio_util::compat::TokioAsyncWriteCompatExt;
use tracing::{debug, info};

use crate::connectors::connector_trait::{with_optional_timeout, Connector};
use crate::utils::{
    error::{ReportError, ReportResult},
    types::{ColumnMetadata, ConnectorType, DataType, Row, TabularData, Value},
};

/// SQL Server connector using tiberius
#[derive(Debug)]
pub struct SqlServerConnector {
    connection_string: String,
    query: String,
    timeout: Option<Duration>,
}

impl SqlServerConnector {
    /// Create a new SQL Server connector for one query
    pub fn new(connection_string: &str, query: &str) -> Self {
        Self {
            connection_string: connection_string.trim().to_string(),
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
        let config = parse_config(&self.connection_string)?;

        let tcp = TcpStream::connect(config.get_addr())
            .await
            .map_err(|e| connect_error(&e))?;
        tcp.set_nodelay(true).map_err(|e| connect_error(&e))?;

        let mut client = Client::connect(config, tcp.compat_write())
            .await
            .map_err(|e| connect_error(&e))?;

        let start_time = Instant::now();
        let mut stream = client
            .simple_query(self.query.as_str())
            .await
            .map_err(|e| query_error(&e))?;

        let columns: Vec<ColumnMetadata> = stream
            .columns()
            .await
            .map_err(|e| query_error(&e))?
            .map(|cols| {
                cols.iter()
                    .map(|col| {
                        let type_name = format!("{:?}", col.column_type());
                        ColumnMetadata::new(col.name(), sqlserver_type_to_data_type(&type_name))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let rows = stream.into_first_result().await.map_err(|e| query_error(&e))?;

        let mut table = TabularData::new(columns);
        for row in rows {
            let values: Vec<Value> = row.into_iter().map(convert_column_data).collect();
            table.push_row(Row::new(values))?;
        }

        debug!("SQL Server query returned {} rows in {:?}", table.row_count(), start_time.elapsed());
        Ok(table)
    }
}

/// Parse a JDBC (`jdbc:sqlserver://`) or ADO.NET (`server=...;`) connection string
pub fn parse_config(connection_string: &str) -> ReportResult<Config> {
    let parsed = if connection_string.to_ascii_lowercase().starts_with("jdbc:") {
        Config::from_jdbc_string(connection_string)
    } else {
        Config::from_ado_string(connection_string)
    };

    parsed.map_err(|e| ReportError::read_failure(format!("Error reading from database: invalid connection string: {}", e)))
}

/// Convert a TDS column type name to internal DataType
pub fn sqlserver_type_to_data_type(sql_type: &str) -> DataType {
    match sql_type.to_lowercase().as_str() {
        "bigvarchar" | "bigchar" | "nvarchar" | "nchar" | "text" | "ntext" | "xml" | "guid" => DataType::Text,
        "int1" | "int2" | "int4" | "int8" | "intn" => DataType::Integer,
        "float4" | "float8" | "floatn" | "money" | "money4" => DataType::Float,
        "bit" | "bitn" => DataType::Boolean,
        "daten" => DataType::Date,
        "datetime" | "datetime4" | "datetimen" | "datetime2" | "datetimeoffsetn" => DataType::DateTime,
        "bigvarbin" | "bigbinary" | "image" => DataType::Binary,
        // DECIMAL/NUMERIC keep their exact text form
        _ => DataType::Text,
    }
}

/// Convert one TDS value to internal Value representation
fn convert_column_data(data: ColumnData<'static>) -> Value {
    let value = match data {
        ColumnData::U8(v) => v.map(|x| Value::Integer(x as i64)),
        ColumnData::I16(v) => v.map(|x| Value::Integer(x as i64)),
        ColumnData::I32(v) => v.map(|x| Value::Integer(x as i64)),
        ColumnData::I64(v) => v.map(Value::Integer),
        ColumnData::F32(v) => v.map(|x| Value::Float(x as f64)),
        ColumnData::F64(v) => v.map(Value::Float),
        ColumnData::Bit(v) => v.map(Value::Boolean),
        ColumnData::String(v) => v.map(|s| Value::Text(s.into_owned())),
        ColumnData::Guid(v) => v.map(|g| Value::Text(g.to_string())),
        ColumnData::Binary(v) => v.map(|b| Value::Binary(b.into_owned())),
        ColumnData::Numeric(v) => v.map(|n| Value::Text(n.to_string())),
        ColumnData::Xml(v) => v.map(|x| Value::Text(x.into_owned().into_string())),
        other => convert_temporal(&other),
    };

    value.unwrap_or(Value::Null)
}

fn convert_temporal(data: &ColumnData<'static>) -> Option<Value> {
    if let Ok(Some(dt)) = NaiveDateTime::from_sql(data) {
        return Some(Value::DateTime(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()));
    }
    if let Ok(Some(date)) = NaiveDate::from_sql(data) {
        return Some(Value::Date(date.to_string()));
    }
    if let Ok(Some(time)) = NaiveTime::from_sql(data) {
        return Some(Value::Text(time.to_string()));
    }
    if let Ok(Some(dt)) = DateTime::<FixedOffset>::from_sql(data) {
        return Some(Value::DateTime(dt.to_rfc3339()));
    }
    None
}

fn connect_error(e: &dyn std::fmt::Display) -> ReportError {
    ReportError::read_failure(format!("Error reading from database: failed to connect: {}", e))
}

fn query_error(e: &tiberius::error::Error) -> ReportError {
    ReportError::read_failure(format!("Error reading from database: {}", e))
}

#[async_trait]
impl Connector for SqlServerConnector {
    async fn read(&mut self) -> ReportResult<TabularData> {
        info!("Connecting to the database and fetching data...");
        let table = with_optional_timeout(self.timeout, self.fetch()).await?;
        info!("Successfully fetched data from the database.");
        Ok(table)
    }

    fn get_connector_type(&self) -> ConnectorType {
        ConnectorType::SqlServer
    }
}
