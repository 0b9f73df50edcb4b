use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "tabrep")]
#[command(about = "Generate PDF report from CSV, Excel, or database")]
#[command(version)]
pub struct CliArgs {
    /// Path to the CSV file
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Path to the Excel (.xlsx) file
    #[arg(long, value_name = "PATH")]
    pub excel: Option<PathBuf>,

    /// Worksheet to read from the Excel file (default: first sheet)
    #[arg(long, value_name = "NAME")]
    pub sheet: Option<String>,

    /// Database connection string
    #[arg(long, value_name = "CONNECTION_STRING")]
    pub db: Option<String>,

    /// SQL query for database
    #[arg(long, value_name = "SQL")]
    pub query: Option<String>,

    /// Output PDF file name (default: report_<YYYYMMDD_HHMMSS>.pdf)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Number of CSV records read per chunk
    #[arg(long, value_name = "ROWS")]
    pub chunk_size: Option<usize>,

    /// JSON configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable progress spinners
    #[arg(long)]
    pub no_progress: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_database_arguments() {
        let args = CliArgs::parse_from([
            "tabrep",
            "--db",
            "postgresql://localhost/sales",
            "--query",
            "SELECT * FROM orders",
            "--output",
            "orders.pdf",
        ]);

        assert_eq!(args.db.as_deref(), Some("postgresql://localhost/sales"));
        assert_eq!(args.query.as_deref(), Some("SELECT * FROM orders"));
        assert_eq!(args.output, Some(PathBuf::from("orders.pdf")));
        assert!(args.csv.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_parse_reader_options() {
        let args = CliArgs::parse_from(["tabrep", "--csv", "data.csv", "--chunk-size", "250", "--no-progress", "-v"]);

        assert_eq!(args.csv, Some(PathBuf::from("data.csv")));
        assert_eq!(args.chunk_size, Some(250));
        assert!(args.no_progress);
        assert!(args.verbose);
    }
}
