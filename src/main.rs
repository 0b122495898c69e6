use std::env;
use std::net::SocketAddr;
use std::process;
use std::time::Duration;

use clap::{Arg, Command};
use tracing::error;

mod error;
mod handlers;
mod http;
mod utils;

use http::server::{serve, ServerConfig};

#[tokio::main]
async fn main() {
    // Parse command line arguments first
    let matches = Command::new("pdftext-server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("HTTP service that downloads a PDF by URL and returns its text as JSON")
        .long_about(
            "Exposes a single route:\n\
            - GET /?fileURL=<url> or POST / with {\"fileURL\": \"<url>\"}\n\
            downloads the PDF at <url>, extracts its embedded text and\n\
            answers {\"ok\": true, \"text\": \"...\"}.",
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("ADDR")
                .help("Address to bind")
                .default_value("0.0.0.0"),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .short('p')
                .value_name("PORT")
                .help("Port to listen on (falls back to the PORT env variable, then 8080)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("fetch-timeout")
                .long("fetch-timeout")
                .value_name("SECONDS")
                .help("Outbound fetch timeout in seconds")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("30"),
        )
        .arg(
            Arg::new("max-pdf-mb")
                .long("max-pdf-mb")
                .value_name("MIB")
                .help("Largest accepted PDF download, in MiB")
                .value_parser(clap::value_parser!(usize))
                .default_value("500"),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Only log errors")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    // RUST_LOG, when set, wins over the --quiet flag
    let log_level = if env::var("RUST_LOG").is_ok() {
        None
    } else if matches.get_flag("quiet") {
        Some("error")
    } else {
        Some("info")
    };

    if let Some(level) = log_level {
        env::set_var("RUST_LOG", level);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let host = matches
        .get_one::<String>("host")
        .cloned()
        .unwrap_or_else(|| "0.0.0.0".to_string());

    let port = matches
        .get_one::<String>("port")
        .cloned()
        .or_else(|| env::var("PORT").ok())
        .unwrap_or_else(|| "8080".to_string());

    let addr: SocketAddr = match format!("{}:{}", host, port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Invalid listen address {}:{}: {}", host, port, e);
            process::exit(2);
        }
    };

    let fetch_timeout_secs = *matches
        .get_one::<u64>("fetch-timeout")
        .expect("has a default");
    let max_pdf_mb = *matches.get_one::<usize>("max-pdf-mb").expect("has a default");

    let config = ServerConfig {
        addr,
        fetch_timeout: Duration::from_secs(fetch_timeout_secs),
        max_pdf_bytes: max_pdf_mb * 1024 * 1024,
    };

    if let Err(e) = serve(config).await {
        error!("Failed to start server: {}", e);
        process::exit(1);
    }
}
