use std::sync::Arc;
use std::time::Instant;

use log_colada::noop_sink::NoopSink;
use log_colada::pipeline::run;
use log_colada::style::StyleConfig;
use log_colada::Prettifier;

#[tokio::main]
async fn main() {
    let n: u64 = 100_000;

    let mut input = String::new();
    for i in 0..n {
        match i % 4 {
            0 => input.push_str(&format!(
                r#"{{"level":30,"time":1700000000000,"msg":"request completed","req":{{"method":"GET","url":"/items/{}"}},"res":{{"statusCode":200}},"responseTime":{}}}"#,
                i,
                i % 900
            )),
            1 => input.push_str(&format!(
                r#"{{"level":50,"time":1700000000000,"message":"failed","err":{{"message":"boom","stack":"Error: boom\n    at handler"}},"iteration":{}}}"#,
                i
            )),
            2 => input.push_str(&format!(r#"{{"level":"debug","namespace":"db","name":"pool","message":"acquired","id":{}}}"#, i)),
            _ => input.push_str("plain text line from a child process"),
        }
        input.push('\n');
    }

    let sink = Arc::new(NoopSink);
    let prettifier = Prettifier::new(StyleConfig::colored());

    let start = Instant::now();
    let stats = run(input.as_bytes(), sink, prettifier, 256)
        .await
        .expect("pipeline run");
    let elapsed = start.elapsed();

    println!("processed {} lines ({} structured, {} opaque) in {:?} (~{:.0} lines/s)",
        stats.total,
        stats.structured,
        stats.opaque,
        elapsed,
        stats.total as f64 / elapsed.as_secs_f64()
    );
}
