use crate::error::ScanError;
use crate::scanner::file_filter::WorkbookFilter;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub struct WorkbookScanner {
    filter: WorkbookFilter,
    max_depth: Option<usize>,
}

impl WorkbookScanner {
    pub fn new() -> Self {
        Self {
            filter: WorkbookFilter::new(),
            max_depth: None,
        }
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Lazily yields every workbook under `root`, depth-first and pre-order,
    /// siblings in file-name order. Listing failures are yielded as errors
    /// and the walk goes on with the next entry.
    pub fn walk<P: AsRef<Path>>(&self, root: P) -> impl Iterator<Item = Result<PathBuf, ScanError>> {
        let mut walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name();

        if let Some(max_depth) = self.max_depth {
            walker = walker.max_depth(max_depth);
        }

        let filter = self.filter.clone();
        walker.into_iter().filter_map(move |entry| match entry {
            Ok(entry) if filter.accepts(&entry) => Some(Ok(entry.into_path())),
            Ok(_) => None,
            Err(err) => Some(Err(ScanError::from(err))),
        })
    }
}

impl Default for WorkbookScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
pub struct ScanStatistics {
    pub total_files: usize,
    pub total_size: u64,
    pub largest_file_size: u64,
    pub largest_file_path: PathBuf,
}

impl ScanStatistics {
    /// Files whose metadata cannot be read count with a size of zero.
    pub fn from_paths(paths: &[PathBuf]) -> Self {
        let mut stats = Self {
            total_files: paths.len(),
            ..Self::default()
        };

        for path in paths {
            let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
            stats.total_size += size;
            if size > stats.largest_file_size {
                stats.largest_file_size = size;
                stats.largest_file_path = path.clone();
            }
        }

        stats
    }

    pub fn display_summary(&self) -> String {
        let mut summary = format!(
            "Scan Results:\n  Workbooks: {}\n  Total size: {}\n",
            self.total_files,
            format_bytes(self.total_size)
        );

        if self.largest_file_size > 0 {
            summary.push_str(&format!(
                "  Largest workbook: {} ({})\n",
                self.largest_file_path.display(),
                format_bytes(self.largest_file_size)
            ));
        }

        summary
    }
}

pub(crate) fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}
