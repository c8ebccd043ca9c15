use crate::error::ExportError;
use crate::exporter::cell::{formatted_value, is_blank};
use crate::exporter::csv_writer::{CsvOptions, DelimitedWriter};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Result of converting one workbook.
#[derive(Debug, Clone, Serialize)]
pub struct ExportOutcome {
    pub source: PathBuf,
    pub sheet_name: String,
    /// `None` when the sheet was streamed into a caller-supplied writer.
    pub output_path: Option<PathBuf>,
    pub records: usize,
}

pub struct SheetExporter {
    options: CsvOptions,
}

impl SheetExporter {
    pub fn new(options: CsvOptions) -> Self {
        Self { options }
    }

    /// Converts the selected sheet of `file_path` into `<output_dir>/<SheetName>.csv`.
    ///
    /// The output directory must already exist. An existing output file is
    /// truncated. Nothing is created when the workbook or the index is invalid.
    pub fn export(
        &self,
        output_dir: &Path,
        file_path: &Path,
        sheet_index: usize,
    ) -> Result<ExportOutcome, ExportError> {
        let (sheet_name, range) = load_sheet(file_path, sheet_index)?;

        let output_path = output_dir.join(output_file_name(&sheet_name));
        let file = File::create(&output_path).map_err(|source| ExportError::OutputCreate {
            path: output_path.clone(),
            source,
        })?;

        let mut writer = self.options.writer(file);
        write_sheet(&range, &mut writer)?;
        writer.flush()?;
        let records = writer.records_written();

        debug!(
            source = %file_path.display(),
            output = %output_path.display(),
            sheet = %sheet_name,
            records,
            "sheet exported"
        );

        Ok(ExportOutcome {
            source: file_path.to_path_buf(),
            sheet_name,
            output_path: Some(output_path),
            records,
        })
    }

    /// Streams the selected sheet of `file_path` into `writer`.
    pub fn export_to_writer<W: Write>(
        &self,
        writer: W,
        file_path: &Path,
        sheet_index: usize,
    ) -> Result<ExportOutcome, ExportError> {
        let (sheet_name, range) = load_sheet(file_path, sheet_index)?;

        let mut writer = self.options.writer(writer);
        write_sheet(&range, &mut writer)?;
        writer.flush()?;

        Ok(ExportOutcome {
            source: file_path.to_path_buf(),
            sheet_name,
            output_path: None,
            records: writer.records_written(),
        })
    }
}

/// One-shot form of [`SheetExporter::export`].
pub fn export(
    output_dir: &Path,
    file_path: &Path,
    sheet_index: usize,
    options: &CsvOptions,
) -> Result<ExportOutcome, ExportError> {
    SheetExporter::new(*options).export(output_dir, file_path, sheet_index)
}

/// Picks the sheet name at `sheet_index`, failing when the workbook has no
/// sheets or the index is past the last one.
pub fn resolve_sheet<'a>(
    sheet_names: &'a [String],
    sheet_index: usize,
    path: &Path,
) -> Result<&'a str, ExportError> {
    if sheet_names.is_empty() {
        return Err(ExportError::NoSheets {
            path: path.to_path_buf(),
        });
    }

    sheet_names
        .get(sheet_index)
        .map(String::as_str)
        .ok_or(ExportError::InvalidSheetIndex {
            index: sheet_index,
            max: sheet_names.len() - 1,
        })
}

pub fn output_file_name(sheet_name: &str) -> String {
    format!("{}.csv", sheet_name)
}

fn load_sheet(file_path: &Path, sheet_index: usize) -> Result<(String, Range<Data>), ExportError> {
    let mut workbook = open_workbook::<Xlsx<_>, _>(file_path).map_err(|source| {
        ExportError::Open {
            path: file_path.to_path_buf(),
            source,
        }
    })?;

    let sheet_names = workbook.sheet_names();
    let sheet_name = resolve_sheet(&sheet_names, sheet_index, file_path)?.to_string();

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|source| ExportError::SheetRead {
            sheet: sheet_name.clone(),
            source,
        })?;

    Ok((sheet_name, range))
}

/// Writes one record per sheet row, keeping absolute row and column positions.
///
/// The used range may start below row 0 or right of column 0; the gap is
/// filled with empty records and leading empty fields. Rows without any value
/// become empty records.
pub fn write_sheet<W: Write>(
    range: &Range<Data>,
    writer: &mut DelimitedWriter<W>,
) -> Result<(), ExportError> {
    let (start_row, start_col) = match range.start() {
        Some((row, col)) => (row as usize, col as usize),
        None => return Ok(()),
    };

    let mut values: Vec<String> = Vec::new();

    for _ in 0..start_row {
        writer.write_record(&values)?;
    }

    for (offset, row) in range.rows().enumerate() {
        values.clear();

        if !row.iter().all(is_blank) {
            values.resize(start_col, String::new());
            for (col, cell) in row.iter().enumerate() {
                values.push(formatted_value(cell, start_row + offset, start_col + col)?);
            }
            // a lone empty field is a blank line, not `""`
            if values.len() == 1 && values[0].is_empty() {
                values.clear();
            }
        }

        writer.write_record(&values)?;
    }

    Ok(())
}
