//! Property-based tests using proptest
//! Tests invariants of report rendering and the city/state name filter.
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use proptest::prelude::*;

use loan_simulation_api::customers::filter_names_by_city_state;
use loan_simulation_api::models::{AddressResponse, CustomerResponse, SimulationExportRow};
use loan_simulation_api::reports::{render_csv_report, render_txt_report};

fn simulation_row(
    id: i64,
    day: u32,
    hour: u32,
    amount: i64,
    months: i32,
    name: String,
) -> SimulationExportRow {
    SimulationExportRow {
        id,
        customer_id: 1,
        recorded_at: NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(hour, 30, 26)
            .unwrap(),
        requested_amount: BigDecimal::from(amount).with_scale(2),
        collateral_amount: BigDecimal::from(amount * 3).with_scale(2),
        term_months: months,
        monthly_interest_rate: BigDecimal::from(2).with_scale(2),
        customer_name: name,
        customer_cpf: "12345678901".to_string(),
    }
}

proptest! {
    #[test]
    fn csv_has_exactly_one_header_plus_n_data_lines(
        n in 0usize..50,
        day in 1u32..=28u32,
        amount in 1i64..9_999_999_999i64,
    ) {
        let rows: Vec<_> = (0..n)
            .map(|i| simulation_row(i as i64 + 1, day, 10, amount, 12, "Cliente".to_string()))
            .collect();
        let csv = render_csv_report(&rows);
        prop_assert_eq!(csv.lines().count(), n + 1);
    }

    #[test]
    fn csv_date_and_time_columns_split_the_timestamp(
        day in 1u32..=28u32,
        hour in 0u32..=23u32,
    ) {
        let rows = vec![simulation_row(1, day, hour, 1000, 12, "Cliente".to_string())];
        let csv = render_csv_report(&rows);
        let line = csv.lines().nth(1).unwrap();
        let fields: Vec<&str> = line.split(',').collect();
        let expected_date = format!("{:02}/06/2024", day);
        let expected_time = format!("{:02}:30:26", hour);
        prop_assert_eq!(fields[1], expected_date.as_str());
        prop_assert_eq!(fields[2], expected_time.as_str());
    }

    #[test]
    fn txt_report_never_panics_and_counts_rows(n in 1usize..40) {
        let rows: Vec<_> = (0..n)
            .map(|i| simulation_row(i as i64 + 1, 15, 10, 500, 12, "Cliente".to_string()))
            .collect();
        let report = render_txt_report(&rows).unwrap();
        let expected_total = format!("Total de simulações: {}", n);
        prop_assert!(report.contains(&expected_total));
        // title block (7 lines) + header + rule + data rows
        prop_assert_eq!(report.lines().count(), 9 + n);
    }
}

fn customer(name: &str, city: &str, state: &str) -> CustomerResponse {
    CustomerResponse {
        id: 1,
        cpf: "12345678901".to_string(),
        name: name.to_string(),
        address: Some(AddressResponse {
            id: 1,
            street: "Rua A".to_string(),
            number: "1".to_string(),
            neighborhood: "Centro".to_string(),
            zip_code: "80000-000".to_string(),
            city: city.to_string(),
            state: state.to_string(),
        }),
    }
}

proptest! {
    #[test]
    fn filter_result_is_an_ordered_subset_of_input_names(
        names in prop::collection::vec("[A-Za-z]{1,12}", 0..20),
        mask in prop::collection::vec(proptest::bool::ANY, 0..20),
    ) {
        let customers: Vec<_> = names
            .iter()
            .zip(mask.iter().chain(std::iter::repeat(&false)))
            .map(|(name, &matches)| {
                if matches {
                    customer(name, "Curitiba", "PR")
                } else {
                    customer(name, "Sao Paulo", "SP")
                }
            })
            .collect();

        let result = filter_names_by_city_state(&customers, "Curitiba", "PR");

        let expected: Vec<String> = customers
            .iter()
            .filter(|c| c.address.as_ref().unwrap().city == "Curitiba")
            .map(|c| c.name.clone())
            .collect();
        prop_assert_eq!(result, expected);
    }

    #[test]
    fn filter_ignores_case_of_query(
        city in "[A-Za-z]{1,12}",
        state in "[A-Za-z]{2}",
    ) {
        let customers = vec![customer("Joao", &city, &state)];
        let upper = filter_names_by_city_state(&customers, &city.to_uppercase(), &state.to_uppercase());
        let lower = filter_names_by_city_state(&customers, &city.to_lowercase(), &state.to_lowercase());
        prop_assert_eq!(upper.len(), 1);
        prop_assert_eq!(lower.len(), 1);
    }
}
