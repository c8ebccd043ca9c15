use std::path::Path;
use walkdir::DirEntry;

/// Extension of the workbooks the walker selects, without the dot.
pub const WORKBOOK_EXTENSION: &str = "xlsx";

#[derive(Debug, Clone)]
pub struct WorkbookFilter {
    suffix: String,
}

impl WorkbookFilter {
    pub fn new() -> Self {
        Self {
            suffix: format!(".{}", WORKBOOK_EXTENSION),
        }
    }

    /// Exact, case-sensitive match on the text after the last dot of the
    /// file name. `report.XLSX` and `report.xlsx.bak` are rejected.
    pub fn is_workbook_file(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy().ends_with(&self.suffix))
            .unwrap_or(false)
    }

    /// Directories are descended into but never selected.
    pub fn accepts(&self, entry: &DirEntry) -> bool {
        !entry.file_type().is_dir() && self.is_workbook_file(entry.path())
    }
}

impl Default for WorkbookFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workbook_detection() {
        let filter = WorkbookFilter::new();

        assert!(filter.is_workbook_file(Path::new("report.xlsx")));
        assert!(filter.is_workbook_file(Path::new("nested/dir/data.xlsx")));
        assert!(filter.is_workbook_file(Path::new("archive.tar.xlsx")));
        assert!(filter.is_workbook_file(Path::new(".xlsx")));

        assert!(!filter.is_workbook_file(Path::new("report.xls")));
        assert!(!filter.is_workbook_file(Path::new("report.xlsm")));
        assert!(!filter.is_workbook_file(Path::new("report.csv")));
        assert!(!filter.is_workbook_file(Path::new("report.xlsx.bak")));
        assert!(!filter.is_workbook_file(Path::new("xlsx")));
        assert!(!filter.is_workbook_file(Path::new("README")));
    }

    #[test]
    fn test_extension_is_case_sensitive() {
        let filter = WorkbookFilter::new();

        assert!(!filter.is_workbook_file(Path::new("REPORT.XLSX")));
        assert!(!filter.is_workbook_file(Path::new("report.Xlsx")));
        assert!(!filter.is_workbook_file(Path::new("report.xlsX")));
    }
}
