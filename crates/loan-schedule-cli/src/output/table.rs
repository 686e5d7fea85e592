use loan_schedule_core::export::SHEET_HEADERS;
use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{period_row, scalar_text};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_field_table(map);
            }
        }
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &serde_json::Map<String, Value>) {
    if let Value::Object(res_map) = result {
        let mut fields = res_map.clone();
        fields.remove("periods");
        // Lift summary totals into the headline table.
        if let Some(Value::Object(summary)) = fields.remove("summary") {
            fields.extend(summary);
        }
        print_field_table(&fields);
    }

    if let Some(Value::Array(periods)) = result.get("periods") {
        let mut builder = Builder::default();
        builder.push_record(SHEET_HEADERS);
        for period in periods {
            builder.push_record(period_row(period));
        }
        println!("\n{}", Table::from(builder));
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_field_table(map: &serde_json::Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.clone(), format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        other => scalar_text(other),
    }
}
