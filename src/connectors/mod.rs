// Source readers
pub mod connector_trait;
pub mod csv_connector;
pub mod excel_connector;
pub mod postgres_connector;
pub mod sqlserver_connector;

pub use connector_trait::*;
pub use csv_connector::*;
pub use excel_connector::*;
pub use postgres_connector::*;
pub use sqlserver_connector::*;
