pub mod file_filter;
pub mod workbook_scanner;

pub use file_filter::{WorkbookFilter, WORKBOOK_EXTENSION};
pub use workbook_scanner::{ScanStatistics, WorkbookScanner};
