use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use tabrep::connectors::{Connector, ExcelConnector};
use tabrep::utils::{
    config::ReaderConfig,
    error::{ReportError, SourceError},
    types::{ConnectorType, Value},
};
use tempfile::TempDir;

fn reader_config() -> ReaderConfig {
    ReaderConfig {
        show_progress: false,
        ..ReaderConfig::default()
    }
}

/// Two-sheet workbook: "Inventory" first, "Archive" second
fn create_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("inventory.xlsx");
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Inventory").unwrap();
    sheet.write_string(0, 0, "item").unwrap();
    sheet.write_string(0, 1, "quantity").unwrap();
    sheet.write_string(0, 2, "unit_cost").unwrap();
    sheet.write_string(0, 3, "in_stock").unwrap();
    let items = [("bolt", 120.0, 0.25, true), ("nut", 80.0, 0.1, true), ("gear", 0.0, 12.5, false)];
    for (index, (item, quantity, cost, in_stock)) in items.iter().enumerate() {
        let row = index as u32 + 1;
        sheet.write_string(row, 0, *item).unwrap();
        sheet.write_number(row, 1, *quantity).unwrap();
        sheet.write_number(row, 2, *cost).unwrap();
        sheet.write_boolean(row, 3, *in_stock).unwrap();
    }

    let archive = workbook.add_worksheet();
    archive.set_name("Archive").unwrap();
    archive.write_string(0, 0, "year").unwrap();
    archive.write_number(1, 0, 2019.0).unwrap();

    workbook.save(&path).unwrap();
    path
}

#[tokio::test]
async fn test_first_row_becomes_header() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = create_workbook(temp_dir.path());

    let mut connector = ExcelConnector::new(&path, None, &reader_config());
    let table = connector.read().await.unwrap();

    assert_eq!(
        table.column_names().collect::<Vec<_>>(),
        vec!["item", "quantity", "unit_cost", "in_stock"]
    );
    assert_eq!(table.row_count(), 3);
    assert_eq!(connector.get_connector_type(), ConnectorType::Excel);
}

#[tokio::test]
async fn test_rows_keep_sheet_order_and_types() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = create_workbook(temp_dir.path());

    let table = ExcelConnector::new(&path, None, &reader_config()).read().await.unwrap();

    let items: Vec<String> = table.column_values("item").unwrap().map(|v| v.to_string()).collect();
    assert_eq!(items, vec!["bolt", "nut", "gear"]);

    assert_eq!(table.rows[0].get(1), Some(&Value::Integer(120)));
    assert_eq!(table.rows[0].get(2), Some(&Value::Float(0.25)));
    assert_eq!(table.rows[2].get(3), Some(&Value::Boolean(false)));
}

#[tokio::test]
async fn test_named_sheet() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = create_workbook(temp_dir.path());

    let table = ExcelConnector::new(&path, Some("Archive".to_string()), &reader_config())
        .read()
        .await
        .unwrap();

    assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["year"]);
    assert_eq!(table.rows[0].get(0), Some(&Value::Integer(2019)));
}

#[tokio::test]
async fn test_unknown_sheet_is_read_failure() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = create_workbook(temp_dir.path());

    let result = ExcelConnector::new(&path, Some("Missing".to_string()), &reader_config())
        .read()
        .await;

    match result {
        Err(ReportError::Source(SourceError::ReadFailure(message))) => {
            assert!(message.starts_with("Error reading Excel file:"), "{}", message);
        }
        other => panic!("Expected ReadFailure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_wrong_extension_is_invalid_format() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("inventory.xls");
    std::fs::write(&path, b"not a workbook").unwrap();

    let result = ExcelConnector::new(&path, None, &reader_config()).read().await;

    match result {
        Err(e @ ReportError::Source(SourceError::InvalidFormat { .. })) => {
            assert!(e.to_string().contains("Please provide an Excel (.xlsx) file."), "{}", e);
        }
        other => panic!("Expected InvalidFormat, got {:?}", other),
    }
}

#[tokio::test]
async fn test_corrupt_workbook_is_read_failure() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("broken.xlsx");
    std::fs::write(&path, b"definitely not a zip archive").unwrap();

    let result = ExcelConnector::new(&path, None, &reader_config()).read().await;
    assert!(matches!(result, Err(ReportError::Source(SourceError::ReadFailure(_)))));
}

#[tokio::test]
async fn test_empty_sheet_has_no_rows() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("blank.xlsx");
    let mut workbook = Workbook::new();
    workbook.add_worksheet();
    workbook.save(&path).unwrap();

    let table = ExcelConnector::new(&path, None, &reader_config()).read().await.unwrap();
    assert!(table.is_empty());
}
