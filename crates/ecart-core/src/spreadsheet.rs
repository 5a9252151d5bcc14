//! XLSX rendering of report tables
//!
//! The renderer works on plain [`Table`]s (column names + rows of cells) and
//! knows nothing about budgets or expenses. It always produces a workbook
//! with two sheets: the variance analysis and the quarterly expense ledger.

use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet};
use serde::Serialize;
use tracing::debug;

use crate::error::Result;

/// Name of the first sheet
pub const VARIANCE_SHEET: &str = "Variance Analysis";

/// Name of the second sheet
pub const LEDGER_SHEET: &str = "Quarterly Expenses";

/// Download name of the export
pub const EXPORT_FILENAME: &str = "Analyse_Budgets_Depenses.xlsx";

/// MIME type of the export
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Extra characters added to the widest value of each column
pub const DEFAULT_COLUMN_PADDING: usize = 2;

/// A single table value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Number(f64),
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Column names plus ordered rows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Widest stringified value (header or data) per column, plus padding
    pub fn column_widths(&self, padding: usize) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let widest = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.to_string().chars().count())
                    .fold(header.chars().count(), usize::max);
                widest + padding
            })
            .collect()
    }
}

/// Renders the variance export workbook
#[derive(Debug, Clone, Copy)]
pub struct WorkbookRenderer {
    column_padding: usize,
}

impl Default for WorkbookRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMN_PADDING)
    }
}

impl WorkbookRenderer {
    pub fn new(column_padding: usize) -> Self {
        Self { column_padding }
    }

    /// Render both tables into an in-memory XLSX document
    pub fn render(&self, analysis: &Table, ledger: &Table) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold().set_align(FormatAlign::Center);

        let sheet = workbook.add_worksheet();
        sheet.set_name(VARIANCE_SHEET)?;
        self.write_sheet(sheet, analysis, &header)?;

        let sheet = workbook.add_worksheet();
        sheet.set_name(LEDGER_SHEET)?;
        self.write_sheet(sheet, ledger, &header)?;

        let bytes = workbook.save_to_buffer()?;
        debug!(
            analysis_rows = analysis.rows.len(),
            ledger_rows = ledger.rows.len(),
            bytes = bytes.len(),
            "Rendered variance workbook"
        );
        Ok(bytes)
    }

    fn write_sheet(&self, sheet: &mut Worksheet, table: &Table, header: &Format) -> Result<()> {
        for (col, name) in table.columns.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, name, header)?;
        }

        for (r, row) in table.rows.iter().enumerate() {
            let row_idx = r as u32 + 1;
            for (col, cell) in row.iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Text(s) => sheet.write_string(row_idx, col, s)?,
                    Cell::Integer(i) => sheet.write_number(row_idx, col, *i as f64)?,
                    Cell::Number(n) => sheet.write_number(row_idx, col, *n)?,
                };
            }
        }

        for (col, width) in table.column_widths(self.column_padding).iter().enumerate() {
            sheet.set_column_width(col as u16, *width as f64)?;
        }

        Ok(())
    }
}

/// Render with the default column padding
pub fn render_workbook(analysis: &Table, ledger: &Table) -> Result<Vec<u8>> {
    WorkbookRenderer::default().render(analysis, ledger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
    use std::io::Cursor;

    fn sample_table() -> Table {
        let mut table = Table::new(&["Centre", "Amount"]);
        table.push_row(vec!["Finance".into(), Cell::Number(1200.5)]);
        table.push_row(vec!["Human Resources".into(), Cell::Integer(7)]);
        table
    }

    fn read_back(bytes: Vec<u8>) -> Xlsx<Cursor<Vec<u8>>> {
        open_workbook_from_rs(Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn test_column_widths_use_widest_value() {
        let widths = sample_table().column_widths(2);
        // "Human Resources" is 15 chars; "Amount" (6) beats "1200.5" (6) and "7"
        assert_eq!(widths, vec![17, 8]);
    }

    #[test]
    fn test_column_widths_count_chars_not_bytes() {
        let mut table = Table::new(&["Année"]);
        table.push_row(vec!["économie".into()]);
        assert_eq!(table.column_widths(0), vec![8]);
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Integer(4).to_string(), "4");
        assert_eq!(Cell::Number(20.5).to_string(), "20.5");
        assert_eq!(Cell::from("x").to_string(), "x");
    }

    #[test]
    fn test_render_two_sheets_with_headers() {
        let analysis = sample_table();
        let ledger = Table::new(&["Quarter", "Centre", "Expense Type"]);

        let bytes = WorkbookRenderer::default()
            .render(&analysis, &ledger)
            .unwrap();
        let mut workbook = read_back(bytes);

        assert_eq!(
            workbook.sheet_names(),
            vec![VARIANCE_SHEET.to_string(), LEDGER_SHEET.to_string()]
        );

        let range = workbook.worksheet_range(VARIANCE_SHEET).unwrap();
        assert_eq!(range.height(), analysis.rows.len() + 1);
        let rows: Vec<_> = range.rows().collect();
        assert_eq!(rows[0][0], Data::String("Centre".to_string()));
        assert_eq!(rows[0][1], Data::String("Amount".to_string()));
        assert_eq!(rows[1][0], Data::String("Finance".to_string()));
        assert_eq!(rows[1][1], Data::Float(1200.5));
        assert_eq!(rows[2][1], Data::Float(7.0));

        let range = workbook.worksheet_range(LEDGER_SHEET).unwrap();
        assert_eq!(range.height(), 1);
        let rows: Vec<_> = range.rows().collect();
        assert_eq!(rows[0][2], Data::String("Expense Type".to_string()));
    }
}
