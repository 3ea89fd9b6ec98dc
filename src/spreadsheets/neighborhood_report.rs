// src/spreadsheets/neighborhood_report.rs
use crate::analytics::turnover::{TurnoverReport, ValueChangeRow};
use crate::errors::ServerError;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};

fn xlsx_err(what: &str) -> impl Fn(XlsxError) -> ServerError + '_ {
    move |e| ServerError::XlsxError(format!("Failed to write {what}: {e}"))
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str]) -> Result<(), ServerError> {
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string(0, col as u16, *header)
            .map_err(xlsx_err(header))?;
    }
    Ok(())
}

/// Two sheets: sale turnover per neighborhood, and year-over-year value change.
pub fn export_neighborhood_report(
    turnover: &TurnoverReport,
    value_change: &[ValueChangeRow],
) -> Result<Vec<u8>, ServerError> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet
        .set_name("Turnover")
        .map_err(xlsx_err("sheet name"))?;
    write_headers(
        sheet,
        &["Neighborhood", "Parcels", "Sold", "Turnover %", "Window Start", "As Of"],
    )?;
    for (i, row) in turnover.rows.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_string(r, 0, &row.name).map_err(xlsx_err("name"))?;
        sheet
            .write_number(r, 1, row.total_parcels as f64)
            .map_err(xlsx_err("parcel count"))?;
        sheet
            .write_number(r, 2, row.sold_parcels as f64)
            .map_err(xlsx_err("sold count"))?;
        if let Some(pct) = row.turnover_percent {
            sheet.write_number(r, 3, pct).map_err(xlsx_err("turnover"))?;
        }
        sheet
            .write_string(r, 4, turnover.window_start.to_string())
            .map_err(xlsx_err("window start"))?;
        sheet
            .write_string(r, 5, turnover.as_of.to_string())
            .map_err(xlsx_err("as-of date"))?;
    }

    let sheet = workbook.add_worksheet();
    sheet
        .set_name("Value Change")
        .map_err(xlsx_err("sheet name"))?;
    write_headers(
        sheet,
        &["Neighborhood", "Current Total", "Prior Total", "Change", "Change %"],
    )?;
    for (i, row) in value_change.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet
            .write_string(r, 0, &row.neighborhood)
            .map_err(xlsx_err("neighborhood"))?;
        sheet
            .write_number(r, 1, row.current_total)
            .map_err(xlsx_err("current total"))?;
        sheet
            .write_number(r, 2, row.prior_total)
            .map_err(xlsx_err("prior total"))?;
        sheet
            .write_number(r, 3, row.value_change)
            .map_err(xlsx_err("change"))?;
        sheet
            .write_number(r, 4, row.percent_change)
            .map_err(xlsx_err("change percent"))?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| ServerError::XlsxError(format!("Failed to save workbook: {e}")))
}
