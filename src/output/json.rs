//! JSON report writer

use crate::model::FinalReport;
use crate::output::OutputResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes the report as pretty-printed JSON
///
/// The JSON shape is the same one served by the HTTP boundary and stored in
/// the report cache.
pub fn write_json_report(report: &FinalReport, output_path: &Path) -> OutputResult<()> {
    let mut writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
