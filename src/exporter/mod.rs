pub mod cell;
pub mod csv_writer;
pub mod sheet_exporter;

pub use csv_writer::{CsvOptions, DelimitedWriter};
pub use sheet_exporter::{export, resolve_sheet, ExportOutcome, SheetExporter};
