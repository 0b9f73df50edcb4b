use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::render::layout::{PageRow, ReportDocument};
use crate::utils::config::{PageLayout, MM_PER_PT};
use crate::utils::error::RenderError;

/// Resource name of the single font used for every cell
const FONT_NAME: &str = "F1";

/// Serializes a laid-out `ReportDocument` with `lopdf`.
/// The whole object graph is built in memory; the output file is only created
/// once the document is complete.
pub struct PdfReportWriter<'a> {
    layout: &'a PageLayout,
}

impl<'a> PdfReportWriter<'a> {
    pub fn new(layout: &'a PageLayout) -> Self {
        Self { layout }
    }

    /// Build the PDF and write it to `path`
    pub fn write(&self, report: &ReportDocument, path: &Path) -> Result<(), RenderError> {
        let mut document = self.build(report)?;

        let file = File::create(path)
            .map_err(|e| RenderError::WriteFailed(format!("{}: {}", path.display(), e)))?;
        let mut writer = BufWriter::new(file);
        document
            .save_to(&mut writer)
            .map_err(|e| RenderError::WriteFailed(format!("{}: {}", path.display(), e)))?;
        writer.flush()?;

        Ok(())
    }

    /// Build the in-memory PDF object graph
    pub fn build(&self, report: &ReportDocument) -> Result<Document, RenderError> {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();

        let font_id = document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = document.add_object(dictionary! {
            "Font" => dictionary! { FONT_NAME => font_id },
        });

        let media_box: Vec<Object> = vec![
            0.into(),
            0.into(),
            to_pt(report.page_width).into(),
            to_pt(report.page_height).into(),
        ];

        let mut page_ids: Vec<ObjectId> = Vec::with_capacity(report.pages.len());
        for (index, page) in report.pages.iter().enumerate() {
            let content = self.page_content(report.page_height, &page.rows);
            let content_id = document.add_object(compress(&content)?);

            let page_id = document.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box.clone(),
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            page_ids.push(page_id);
            debug!("Rendered page {} ({} rows)", index + 1, page.rows.len());
        }

        let kids: Vec<Object> = page_ids.iter().map(|id| Object::from(*id)).collect();
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_ids.len() as i64,
            }),
        );

        let catalog_id = document.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        document.trailer.set("Root", catalog_id);

        let info_id = document.add_object(dictionary! {
            "Producer" => Object::string_literal(concat!("tabrep ", env!("CARGO_PKG_VERSION"))),
        });
        document.trailer.set("Info", info_id);

        Ok(document)
    }

    fn page_content(&self, page_height: f32, rows: &[PageRow]) -> Content {
        let layout = self.layout;
        let font_size_mm = layout.font_size_mm();
        let mut ops = vec![Operation::new("w", vec![to_pt(layout.line_width).into()])];

        for row in rows {
            // PDF space grows upwards from the bottom-left corner
            let bottom = to_pt(page_height - (row.y + row.height));
            let height = to_pt(row.height);
            let baseline = to_pt(page_height - (row.y + 0.5 * row.height + 0.3 * font_size_mm));

            for cell in &row.cells {
                let rect: Vec<Object> = vec![to_pt(cell.x).into(), bottom.into(), to_pt(cell.width).into(), height.into()];
                ops.push(Operation::new("re", rect.clone()));
                ops.push(Operation::new("S", vec![]));

                if cell.text.is_empty() {
                    continue;
                }

                // Clip to the cell so long values do not spill into their neighbours
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new("re", rect));
                ops.push(Operation::new("W", vec![]));
                ops.push(Operation::new("n", vec![]));
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new("Tf", vec![FONT_NAME.into(), layout.font_size.into()]));
                ops.push(Operation::new(
                    "Td",
                    vec![to_pt(cell.x + layout.cell_padding).into(), baseline.into()],
                ));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_win_ansi(&cell.text), StringFormat::Literal)],
                ));
                ops.push(Operation::new("ET", vec![]));
                ops.push(Operation::new("Q", vec![]));
            }
        }

        Content { operations: ops }
    }
}

fn to_pt(mm: f32) -> f32 {
    mm / MM_PER_PT
}

fn compress(content: &Content) -> Result<Stream, RenderError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&content.encode()?)?;
    let compressed = encoder.finish()?;
    Ok(Stream::new(dictionary! { "Filter" => "FlateDecode" }, compressed))
}

/// Encode text for the standard WinAnsi font encoding; anything it cannot
/// represent becomes `?`
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => c as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            '\t' | '\n' | '\r' => b' ',
            _ => b'?',
        })
        .collect()
}
