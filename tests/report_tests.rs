//! Report rendering tests against fixed fixtures: exact title block, column
//! widths, and CSV layout.
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};

use loan_simulation_api::models::SimulationExportRow;
use loan_simulation_api::reports::{render_csv_report, render_txt_report, CSV_HEADER};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, s)
        .unwrap()
}

fn fixture(id: i64, recorded_at: NaiveDateTime) -> SimulationExportRow {
    SimulationExportRow {
        id,
        customer_id: 3,
        recorded_at,
        requested_amount: BigDecimal::from(300_000).with_scale(2),
        collateral_amount: BigDecimal::from(1_000_000).with_scale(2),
        term_months: 150,
        monthly_interest_rate: BigDecimal::from(2).with_scale(2),
        customer_name: "João Teste".to_string(),
        customer_cpf: "12345678901".to_string(),
    }
}

#[test]
fn txt_report_names_first_rows_customer_and_count() {
    let rows = vec![
        fixture(1, at(2024, 6, 15, 10, 30, 26)),
        fixture(2, at(2024, 7, 1, 8, 0, 0)),
        fixture(3, at(2024, 7, 2, 9, 15, 45)),
    ];
    let report = render_txt_report(&rows).unwrap();

    assert!(report.contains("Cliente: João Teste\n"));
    assert!(report.contains("CPF: 12345678901\n"));
    assert!(report.contains("Total de simulações: 3\n"));
}

#[test]
fn txt_report_formats_timestamps_and_decimals() {
    let rows = vec![fixture(9, at(2024, 6, 15, 10, 30, 26))];
    let report = render_txt_report(&rows).unwrap();

    assert!(report.contains("15/06/2024 10:30:26"));
    assert!(report.contains("300000.00"));
    assert!(report.contains("1000000.00"));
    assert!(report.contains("2.00"));
}

#[test]
fn txt_report_requires_at_least_one_row() {
    assert_eq!(render_txt_report(&[]), None);
}

#[test]
fn csv_report_has_one_header_and_one_line_per_row() {
    let rows = vec![
        fixture(1, at(2024, 6, 15, 10, 30, 26)),
        fixture(2, at(2024, 7, 1, 8, 0, 0)),
    ];
    let csv = render_csv_report(&rows);
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], CSV_HEADER);
    assert_eq!(
        lines[1],
        "1,15/06/2024,10:30:26,300000.00,1000000.00,150,2.00,3,\"João Teste\",12345678901"
    );
    assert_eq!(
        lines[2],
        "2,01/07/2024,08:00:00,300000.00,1000000.00,150,2.00,3,\"João Teste\",12345678901"
    );
}

#[test]
fn csv_report_keeps_store_decimal_form() {
    // A value stored with scale 1 stays in that form; the CSV does not
    // re-normalize to 2 decimal places.
    let mut row = fixture(5, at(2024, 1, 2, 3, 4, 5));
    row.requested_amount = BigDecimal::from(1500).with_scale(1);
    let csv = render_csv_report(&[row]);
    assert!(csv.contains(",1500.0,"));
}
