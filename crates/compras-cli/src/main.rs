// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;

use anyhow::{Context, Result, bail};
use compras_app::PurchaseReport;
use config::Config;
use std::env;
use std::path::PathBuf;

fn main() {
    env_logger::init();
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `compras --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let gateway = config.gateway_config();
    if options.print_db_path {
        println!("{}", gateway.database_path.display());
        return Ok(());
    }

    if options.check_only {
        if compras_db::check_schema(&gateway)? {
            println!(
                "ok: {} is reachable and has {}",
                gateway.database_path.display(),
                compras_db::PURCHASES_RELATION
            );
            return Ok(());
        }
        bail!(
            "company database {} has no {} relation",
            gateway.database_path.display(),
            compras_db::PURCHASES_RELATION
        );
    }

    // The UI collaborator reads exactly one JSON document from stdout:
    // the report on success, `{"error": …}` on failure. Stderr carries
    // the human-readable rendition of the same failure.
    match compras_db::fetch_purchases(&gateway) {
        Ok(report) => {
            println!("{}", render_report(&report, options.pretty)?);
            Ok(())
        }
        Err(error) => {
            println!("{}", serde_json::json!({ "error": error.to_string() }));
            Err(error.into())
        }
    }
}

fn render_report(report: &PurchaseReport, pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    };
    rendered.context("serialize purchase report")
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_db_path: bool,
    print_example: bool,
    check_only: bool,
    pretty: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_db_path: false,
        print_example: false,
        check_only: false,
        pretty: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--pretty" => {
                options.pretty = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("compras");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved company database path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Verify the database is reachable and has the ledger");
    println!("  --pretty                 Pretty-print the JSON report");
    println!("  --help                   Show this help");
}
