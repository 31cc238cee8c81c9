//! dnsperf command-line entry point

use clap::Parser;
use dnsperf::{app::App, cli::Cli, config::EnvManager, error::AppError};
use std::process;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(1);
    }));

    let cli = Cli::parse();
    let use_color = cli.color_override().unwrap_or(true);

    if let Err(message) = cli.validate() {
        report_error(&AppError::validation(message), use_color);
    }

    if cli.env_help {
        print!("{}", EnvManager::display_env_help());
        return;
    }

    if let Some(path) = &cli.init_env {
        match EnvManager::save_example_env_file(path) {
            Ok(()) => {
                println!("Wrote example configuration to {}", path.display());
                return;
            }
            Err(e) => report_error(&e, use_color),
        }
    }

    let app = match App::from_cli(cli) {
        Ok(app) => app,
        Err(e) => report_error(&e, use_color),
    };
    let use_color = app.config().enable_color;

    match app.run().await {
        Ok(summary) => {
            if let Some(message) = summary.collaborator_error {
                report_error(&AppError::metrics(message), use_color);
            }
        }
        Err(e) => report_error(&e, use_color),
    }
}

fn report_error(error: &AppError, use_color: bool) -> ! {
    eprintln!("Error: {}", error.format_for_console(use_color));
    print_error_suggestions(error);
    process::exit(error.exit_code());
}

/// Print suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) | AppError::Validation(_) | AppError::Parse(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Check your .env file and DNSPERF_* variables");
            eprintln!("  - --rps must be between 1 and 1000000");
            eprintln!("  - Durations look like 500ms, 1s, 1m30s");
            eprintln!("  - Ensure DNS server IPs are valid");
        }
        AppError::DnsResolution(_) => {
            eprintln!();
            eprintln!("DNS resolution help:");
            eprintln!("  - Check /etc/resolv.conf or pass --dns-servers");
            eprintln!("  - Test resolution manually with 'dig' or 'nslookup'");
        }
        AppError::Metrics(_) => {
            eprintln!();
            eprintln!("Metrics help:");
            eprintln!("  - Another process may already listen on the metric address");
            eprintln!("  - Pick another port with --metric-addr");
        }
        _ => {}
    }
}
