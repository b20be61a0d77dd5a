use serde_json::json;

use log_colada::style::{ColorMode, StyleConfig};
use log_colada::Prettifier;

// Formats records in-process, without going through a text pipeline.
fn main() {
    let prettifier = Prettifier::new(StyleConfig::from_mode(ColorMode::Auto));

    let records = [
        json!({"level": 30, "time": 1_700_000_000_000i64, "msg": "hello"}),
        json!({
            "level": "info",
            "message": "incoming request",
            "req": {"method": "POST", "url": "/login"},
            "responseBody": {"token": "abc"},
            "elapsed": 42
        }),
        json!({"level": 40, "message": "slow query", "namespace": "db", "durationMs": 1800}),
        json!({"level": 60, "message": "shutting down", "err": {"message": "out of memory", "code": "ENOMEM"}}),
    ];

    for record in &records {
        print!("{}", prettifier.process(record));
    }
    print!("{}", prettifier.process("not json at all"));
}
