use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::dao::Entity;

/// Render entities as a single-sheet workbook: bold header row, sized
/// columns, one row per document.
pub fn export<T: Entity>(items: &[T]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let header_format = Format::new().set_bold();

    for (col, (header, width)) in T::export_columns().iter().enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, *header, &header_format)?;
        worksheet.set_column_width(col, *width)?;
    }

    for (i, item) in items.iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, cell) in item.export_row().iter().enumerate() {
            worksheet.write_string(row, col as u16, cell)?;
        }
    }

    workbook.save_to_buffer()
}
