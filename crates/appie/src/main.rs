// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;
use tracing::debug;

use appie::config::{Cli, Settings};
use appie::error::{error_json, kind_of};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli.settings.validate() {
        eprintln!("{}", error_json(&e));
        std::process::exit(2);
    }

    init_tracing(&cli.settings);
    appie::ensure_crypto();

    let result = match appie::command::run(cli).await {
        Ok(output) => output.print(),
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        debug!(kind = ?kind_of(&e), "fatal: {e:#}");
        eprintln!("{}", error_json(&e));
        std::process::exit(1);
    }
}

fn init_tracing(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    match settings.log_format.as_str() {
        "json" => {
            fmt::fmt().with_env_filter(filter).with_writer(std::io::stderr).json().init();
        }
        _ => {
            fmt::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
        }
    }
}
