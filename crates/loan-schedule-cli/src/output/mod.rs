pub mod csv_out;
pub mod minimal;
pub mod table;

use loan_schedule_core::export::{NOT_APPLICABLE, RECORD_FIELDS};
use serde_json::Value;

use crate::OutputFormat;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}

/// Period records of a schedule result, when the output carries one.
fn schedule_periods(value: &Value) -> Option<&Vec<Value>> {
    value.get("result")?.get("periods")?.as_array()
}

/// One period as text cells, in sheet column order.
fn period_row(period: &Value) -> Vec<String> {
    RECORD_FIELDS
        .iter()
        .map(|field| match period.get(*field) {
            None | Some(Value::Null) => NOT_APPLICABLE.to_string(),
            Some(v) => scalar_text(v),
        })
        .collect()
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_period_row_marks_missing_amounts() {
        let period = json!({
            "period": 0,
            "date": "09/01/2023",
            "opening_balance": "0",
            "payment": null,
            "prepayment": null,
            "interest": null,
            "principal": "0",
            "closing_balance": "35000"
        });
        assert_eq!(
            period_row(&period),
            vec!["0", "09/01/2023", "0", "-", "-", "-", "0", "35000"]
        );
    }

    #[test]
    fn test_schedule_periods_only_for_schedules() {
        let value = json!({"result": {"periods": [{"period": 0}]}});
        assert_eq!(schedule_periods(&value).map(|p| p.len()), Some(1));
        assert!(schedule_periods(&json!({"result": {"payment": "1"}})).is_none());
    }
}
