use loan_schedule_core::export::SHEET_HEADERS;
use serde_json::Value;
use std::io;

use super::{period_row, scalar_text, schedule_periods};

/// Write output as CSV to stdout.
///
/// Schedules are written row per period under the sheet headers; anything else
/// becomes a two-column `field,value` listing of the result.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    if let Some(periods) = schedule_periods(value) {
        let _ = wtr.write_record(SHEET_HEADERS);
        for period in periods {
            let _ = wtr.write_record(period_row(period));
        }
    } else {
        let fields = value
            .get("result")
            .and_then(Value::as_object)
            .or_else(|| value.as_object());
        match fields {
            Some(map) => {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &scalar_text(val)]);
                }
            }
            None => {
                let _ = wtr.write_record([scalar_text(value)]);
            }
        }
    }

    let _ = wtr.flush();
}
