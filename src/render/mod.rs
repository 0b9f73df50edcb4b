// PDF report rendering
pub mod layout;
pub mod pdf_writer;

pub use layout::*;
pub use pdf_writer::*;

use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::utils::{config::PageLayout, error::ReportError, types::TabularData};

/// What the renderer did with a table
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Written { path: PathBuf, pages: usize },
    NoData,
    Failed,
}

/// Render `data` as a PDF table at `output`.
///
/// Absent or empty data is a warning and writes nothing. Write failures are
/// logged and swallowed; whatever the filesystem kept stays in place.
pub fn render_report(data: Option<&TabularData>, output: &Path, layout: &PageLayout) -> RenderOutcome {
    let data = match data {
        Some(data) if !data.is_empty() && data.column_count() > 0 => data,
        _ => {
            warn!("{}", ReportError::NoData);
            return RenderOutcome::NoData;
        }
    };

    let document = layout_report(data, layout);
    match PdfReportWriter::new(layout).write(&document, output) {
        Ok(()) => {
            info!("PDF report saved as {}", output.display());
            RenderOutcome::Written {
                path: output.to_path_buf(),
                pages: document.page_count(),
            }
        }
        Err(e) => {
            error!("Error generating PDF: {}", ReportError::from(e));
            RenderOutcome::Failed
        }
    }
}
