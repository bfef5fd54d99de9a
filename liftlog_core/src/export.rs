//! Flat tabular export of aggregated history.
//!
//! One row per day, one column triple (`kg`, `rep`, `PV`) per lift slot,
//! plus a free-text column for assistance work. The projection only
//! flattens; ranking and truncation already happened during aggregation.

use crate::aggregate::{filter_by_range, DayRange};
use crate::{DayGroup, Error, Lift, Result};
use rust_xlsxwriter::Workbook;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// UTF-8 byte-order mark so spreadsheet apps detect the encoding
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const DATE_COLUMN_WIDTH: f64 = 12.0;
const SLOT_COLUMN_WIDTH: f64 = 10.0;
const OTHERS_COLUMN_WIDTH: f64 = 60.0;

/// Output format for [`export`]
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            other => Err(Error::Other(format!("Unknown export format: {}", other))),
        }
    }
}

/// Row-oriented projection of day groups
#[derive(Clone, Debug, PartialEq)]
pub struct ExportTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    slots: usize,
}

impl ExportTable {
    /// Flatten `groups` using `slots` columns per lift.
    ///
    /// `slots` should match the selection policy limit the groups were
    /// aggregated with; surplus sets (if any) are not emitted.
    pub fn project(groups: &[DayGroup], slots: usize) -> Self {
        let mut header = vec!["Date".to_string()];
        for lift in Lift::ALL {
            for slot in 1..=slots {
                header.push(format!("{}{}_kg", lift.label(), slot));
                header.push(format!("{}{}_rep", lift.label(), slot));
                header.push(format!("{}{}_PV", lift.label(), slot));
            }
        }
        header.push("Others".to_string());

        let rows = groups
            .iter()
            .map(|group| {
                let mut row = Vec::with_capacity(header.len());
                row.push(group.date.to_string());
                for lift in Lift::ALL {
                    let sets = group.lift(lift);
                    for slot in 0..slots {
                        match sets.get(slot) {
                            Some(set) => {
                                row.push(set.weight.to_string());
                                row.push(set.reps.to_string());
                                row.push(set.strength_index.to_string());
                            }
                            None => row.extend(std::iter::repeat(String::new()).take(3)),
                        }
                    }
                }
                row.push(others_cell(group));
                row
            })
            .collect();

        Self {
            header,
            rows,
            slots,
        }
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Width hint per column, in spreadsheet character units
    pub fn column_widths(&self) -> Vec<f64> {
        let last = self.header.len() - 1;
        (0..self.header.len())
            .map(|i| match i {
                0 => DATE_COLUMN_WIDTH,
                i if i == last => OTHERS_COLUMN_WIDTH,
                _ => SLOT_COLUMN_WIDTH,
            })
            .collect()
    }
}

fn others_cell(group: &DayGroup) -> String {
    group
        .others
        .iter()
        .map(|o| format!("{}: {}kg x {}", o.name, o.weight, o.reps))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Write the table as CSV, prefixed with a UTF-8 BOM
pub fn write_csv<W: Write>(table: &ExportTable, mut writer: W) -> Result<()> {
    writer.write_all(UTF8_BOM)?;

    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
    csv_writer.write_record(&table.header)?;
    for row in &table.rows {
        csv_writer.write_record(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the table as a single-sheet XLSX workbook with column widths set
pub fn write_xlsx(table: &ExportTable, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("History")?;

    for (col, (title, width)) in table
        .header
        .iter()
        .zip(table.column_widths())
        .enumerate()
    {
        let col = col as u16;
        sheet.set_column_width(col, width)?;
        sheet.write_string(0, col, title)?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let r = r as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            if cell.is_empty() {
                continue;
            }
            // Date and Others stay text; slot cells are numeric
            match cell.parse::<f64>() {
                Ok(n) if col != 0 && col as usize != row.len() - 1 => {
                    sheet.write_number(r, col, n)?;
                }
                _ => {
                    sheet.write_string(r, col, cell)?;
                }
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

/// Filter, project and write history to `path`.
///
/// Fails with [`Error::NoDataForRange`] (writing nothing) when no day
/// group falls inside `range`. Returns the number of exported rows.
pub fn export(
    groups: Vec<DayGroup>,
    range: &DayRange,
    slots: usize,
    format: ExportFormat,
    path: &Path,
) -> Result<usize> {
    let groups = filter_by_range(groups, range);
    if groups.is_empty() {
        return Err(Error::NoDataForRange(range.to_string()));
    }

    let table = ExportTable::project(&groups, slots);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    match format {
        ExportFormat::Csv => {
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            write_csv(&table, &mut writer)?;
            writer.flush()?;
        }
        ExportFormat::Xlsx => write_xlsx(&table, path)?,
    }

    tracing::info!(
        "Exported {} days to {:?} ({:?})",
        table.rows.len(),
        path,
        format
    );

    Ok(table.rows.len())
}
