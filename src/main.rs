//! callscribe CLI entrypoint
//!
//! Prints exactly one JSON report line on stdout and always exits 0;
//! diagnostics go to stderr.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    // Initialize tracing on stderr so stdout carries only the report
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let report = callscribe::cli::invoke(std::env::args_os()).await;
    println!("{}", report.to_json_line());
}
