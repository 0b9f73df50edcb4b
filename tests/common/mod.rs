#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tabrep::utils::config::ReportConfig;
use tabrep::utils::logging::dispatch_with_writer;
use tabrep::cli::ReportRunner;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Log sink shared between a runner and the test inspecting its output
#[derive(Clone, Default)]
pub struct CapturedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).to_string()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn assert_contains(&self, expected: &str) {
        let contents = self.contents();
        assert!(
            contents.contains(expected),
            "Logs did not contain expected text.\nExpected: {}\nActual logs:\n{}",
            expected,
            contents
        );
    }
}

pub struct CapturedWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CapturedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CapturedWriter {
            buffer: Arc::clone(&self.buffer),
        }
    }
}

/// Runner with progress disabled whose logs land in the returned sink
pub fn captured_runner() -> (ReportRunner, CapturedLogs) {
    captured_runner_with(ReportConfig::default())
}

pub fn captured_runner_with(mut config: ReportConfig) -> (ReportRunner, CapturedLogs) {
    config.reader.show_progress = false;
    let logs = CapturedLogs::default();
    let dispatch = dispatch_with_writer(EnvFilter::new("tabrep=debug"), logs.clone());
    (ReportRunner::new(config, dispatch), logs)
}

/// Write `content` to `name` inside `dir` and return the path
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write fixture");
    path
}

/// `columns` x `rows` CSV whose cells read `r<row>c<column>`
pub fn numbered_csv(columns: usize, rows: usize) -> String {
    let mut content = (0..columns).map(|c| format!("col{}", c)).collect::<Vec<_>>().join(",");
    content.push('\n');
    for r in 0..rows {
        let line = (0..columns).map(|c| format!("r{}c{}", r, c)).collect::<Vec<_>>().join(",");
        content.push_str(&line);
        content.push('\n');
    }
    content
}

/// Sales fixture used across the CSV and CLI tests
pub const SALES_CSV: &str = "region,product,units,price\n\
North,Widget,12,19.99\n\
South,Gadget,7,29.5\n\
East,Widget,3,19.99\n";
