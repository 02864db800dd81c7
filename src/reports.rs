use crate::models::SimulationExportRow;

const DATE_FORMAT: &str = "%d/%m/%Y";
const TIME_FORMAT: &str = "%H:%M:%S";
const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

pub const CSV_HEADER: &str =
    "ID,Data,Hora,ValorSolicitado,ValorGarantia,Meses,TaxaJuros,ClienteID,ClienteNome,ClienteCPF";

/// Renders the fixed-width plain-text report for one customer's simulations.
///
/// Returns `None` for an empty slice; the customer named in the title block
/// is taken from the first row, so callers hand in simulations of a single
/// customer.
pub fn render_txt_report(rows: &[SimulationExportRow]) -> Option<String> {
    let first = rows.first()?;

    let mut out = String::new();
    out.push_str("RELATÓRIO DE SIMULAÇÕES\n");
    out.push_str("========================\n\n");
    out.push_str(&format!("Cliente: {}\n", first.customer_name));
    out.push_str(&format!("CPF: {}\n", first.customer_cpf));
    out.push_str(&format!("Total de simulações: {}\n\n", rows.len()));

    out.push_str(&format!(
        "{:<5} | {:<20} | {:<15} | {:<15} | {:<10} | {:<10}\n",
        "ID", "Data/Hora", "Valor Solicitado", "Valor Garantia", "Meses", "Taxa %"
    ));
    out.push_str(&"-".repeat(88));
    out.push('\n');

    for row in rows {
        out.push_str(&format!(
            "{:<5} | {:<20} | {:<15} | {:<15} | {:<10} | {:<10}\n",
            row.id,
            row.recorded_at.format(DATE_TIME_FORMAT).to_string(),
            row.requested_amount.with_scale(2).to_string(),
            row.collateral_amount.with_scale(2).to_string(),
            row.term_months,
            row.monthly_interest_rate.with_scale(2).to_string(),
        ));
    }

    Some(out)
}

/// Renders the CSV report: one header line plus one line per simulation.
///
/// The timestamp is split into separate date and time columns. Decimal
/// values keep the store's default string form; the only quoting applied is
/// the literal double quotes around the customer name (names containing a
/// quote or comma are not escaped further).
pub fn render_csv_report(rows: &[SimulationExportRow]) -> String {
    let mut out = String::with_capacity(64 * (rows.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');

    for row in rows {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},\"{}\",{}\n",
            row.id,
            row.recorded_at.format(DATE_FORMAT),
            row.recorded_at.format(TIME_FORMAT),
            row.requested_amount,
            row.collateral_amount,
            row.term_months,
            row.monthly_interest_rate,
            row.customer_id,
            row.customer_name,
            row.customer_cpf,
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn row(id: i64) -> SimulationExportRow {
        SimulationExportRow {
            id,
            customer_id: 7,
            recorded_at: NaiveDate::from_ymd_opt(2024, 6, 15)
                .unwrap()
                .and_hms_opt(10, 30, 26)
                .unwrap(),
            requested_amount: BigDecimal::from(300_000).with_scale(2),
            collateral_amount: BigDecimal::from(1_000_000).with_scale(2),
            term_months: 150,
            monthly_interest_rate: BigDecimal::from(2).with_scale(2),
            customer_name: "João Teste".to_string(),
            customer_cpf: "12345678901".to_string(),
        }
    }

    #[test]
    fn txt_report_is_none_for_empty_input() {
        assert!(render_txt_report(&[]).is_none());
    }

    #[test]
    fn txt_report_title_block() {
        let report = render_txt_report(&[row(1), row(2)]).unwrap();
        assert!(report.starts_with(
            "RELATÓRIO DE SIMULAÇÕES\n\
             ========================\n\n\
             Cliente: João Teste\n\
             CPF: 12345678901\n\
             Total de simulações: 2\n\n"
        ));
    }

    #[test]
    fn txt_report_columns_are_left_justified_fixed_width() {
        let report = render_txt_report(&[row(1)]).unwrap();
        let lines: Vec<&str> = report.lines().collect();

        let header: Vec<&str> = lines[7].split(" | ").collect();
        assert_eq!(header[0], "ID   ");
        assert_eq!(header[1], "Data/Hora           ");
        // "Valor Solicitado" is 16 chars, wider than its column minimum.
        assert_eq!(header[2], "Valor Solicitado");
        assert_eq!(header[3], "Valor Garantia ");
        assert_eq!(header[4], "Meses     ");
        assert_eq!(header[5], "Taxa %    ");

        assert_eq!(lines[8], "-".repeat(88));

        let data: Vec<&str> = lines[9].split(" | ").collect();
        assert_eq!(data[0], "1    ");
        assert_eq!(data[1], "15/06/2024 10:30:26 ");
        assert_eq!(data[2], "300000.00      ");
        assert_eq!(data[3], "1000000.00     ");
        assert_eq!(data[4], "150       ");
        assert_eq!(data[5], "2.00      ");
    }

    #[test]
    fn txt_report_one_line_per_simulation() {
        let report = render_txt_report(&[row(1), row(2), row(3)]).unwrap();
        // 7 title lines + header + rule + 3 data rows
        assert_eq!(report.lines().count(), 12);
    }

    #[test]
    fn csv_report_exact_output() {
        let csv = render_csv_report(&[row(1)]);
        assert_eq!(
            csv,
            "ID,Data,Hora,ValorSolicitado,ValorGarantia,Meses,TaxaJuros,ClienteID,ClienteNome,ClienteCPF\n\
             1,15/06/2024,10:30:26,300000.00,1000000.00,150,2.00,7,\"João Teste\",12345678901\n"
        );
    }

    #[test]
    fn csv_report_splits_timestamp_into_date_and_time() {
        let csv = render_csv_report(&[row(42)]);
        let data_line = csv.lines().nth(1).unwrap();
        let fields: Vec<&str> = data_line.split(',').collect();
        assert_eq!(fields[1], "15/06/2024");
        assert_eq!(fields[2], "10:30:26");
    }

    #[test]
    fn csv_report_header_only_for_empty_input() {
        let csv = render_csv_report(&[]);
        assert_eq!(csv, format!("{}\n", CSV_HEADER));
    }

    #[test]
    fn csv_name_is_quoted_but_not_escaped() {
        let mut r = row(1);
        r.customer_name = "Ana \"Banana\", Ltda".to_string();
        let csv = render_csv_report(&[r]);
        assert!(csv.contains("\"Ana \"Banana\", Ltda\""));
    }
}
