use crate::error::ExportError;
use calamine::{Data, ExcelDateTime};
use chrono::Timelike;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Serial of 9999-12-31, the last day a workbook can represent.
const MAX_DATE_SERIAL: f64 = 2_958_466.0;

/// Display text of a cell as a spreadsheet would show it in a plain column.
///
/// `row` and `column` are the absolute zero-based position, used for errors.
pub fn formatted_value(cell: &Data, row: usize, column: usize) -> Result<String, ExportError> {
    let text = match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::Error(e) => e.to_string(),
        Data::DateTime(dt) => format_excel_datetime(dt).ok_or_else(|| ExportError::CellFormat {
            row,
            column,
            message: format!("date serial {} is out of range", dt.as_f64()),
        })?,
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    };

    Ok(text)
}

/// True for cells that carry no value at all.
pub fn is_blank(cell: &Data) -> bool {
    matches!(cell, Data::Empty)
}

fn format_float(value: f64) -> String {
    if value == 0.0 {
        // no "-0"
        return "0".to_string();
    }
    value.to_string()
}

fn format_excel_datetime(dt: &ExcelDateTime) -> Option<String> {
    if dt.is_duration() {
        return Some(format_duration(dt.as_f64()));
    }

    let serial = dt.as_f64();
    if !(0.0..MAX_DATE_SERIAL).contains(&serial) {
        return None;
    }

    let datetime = dt.as_datetime()?;
    if serial < 1.0 {
        // time of day without a date part
        return Some(datetime.format("%H:%M:%S").to_string());
    }
    if datetime.num_seconds_from_midnight() == 0 && datetime.nanosecond() == 0 {
        Some(datetime.format("%Y-%m-%d").to_string())
    } else {
        Some(datetime.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

fn format_duration(days: f64) -> String {
    let total = (days.abs() * SECONDS_PER_DAY).round() as u64;
    let sign = if days < 0.0 && total > 0 { "-" } else { "" };
    format!(
        "{}{}:{:02}:{:02}",
        sign,
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
