// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use devdex_api::{CatalogFetcher, Client};
use devdex_app::{AppState, Location};
use devdex_tui::UiOptions;
use runtime::ClientRuntime;
use std::env;
use std::path::PathBuf;
use tracing::info;

fn main() {
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
            "load config {}; run `devdex --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let log_path = logging::init(&config).with_context(|| {
        format!(
            "set up logging for {}; set [log].file to a writable path",
            options.config_path.display()
        )
    })?;
    info!(
        config = %options.config_path.display(),
        log = %log_path.display(),
        "devdex starting"
    );

    let client = Client::new(config.base_url(), config.timeout()?).with_context(|| {
        format!(
            "invalid [source] config in {}; fix base_url/timeout values",
            options.config_path.display()
        )
    })?;

    if options.check_only {
        let endpoint = client.endpoint();
        let mut fetcher = CatalogFetcher::new(client);
        let catalog = fetcher
            .load()
            .with_context(|| format!("fetch catalog from {endpoint}"))?;
        println!("{} devices from {endpoint}", catalog.len());
        return Ok(());
    }

    let location = options
        .location
        .as_deref()
        .map(Location::parse)
        .unwrap_or_default();
    let mut state = AppState::from_location(location, config.default_view());
    let mut runtime = ClientRuntime::new(client);
    let ui = UiOptions {
        suggestion_limit: config.suggestion_limit(),
        overscan: config.overscan(),
        images: config.image_urls(),
    };
    devdex_tui::run_app(&mut state, &mut runtime, ui)?;

    if options.print_location {
        println!("{}", state.location());
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    location: Option<String>,
    print_config_path: bool,
    print_example: bool,
    print_location: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        location: None,
        print_config_path: false,
        print_example: false,
        print_location: false,
        check_only: false,
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
            "--location" => {
                let value = iter.next().ok_or_else(|| {
                    anyhow::anyhow!("--location requires a value such as \"/?search=switch\"")
                })?;
                options.location = Some(value.as_ref().to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--print-location" => {
                options.print_location = true;
            }
            "--check" => {
                options.check_only = true;
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
    println!("devdex: browse the device fingerprint catalog");
    println!("  --config <path>          Use a specific config path");
    println!("  --location <loc>         Start at a location, e.g. \"/?search=switch&productLines=UniFi\"");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --print-location         Print the final location on exit");
    println!("  --check                  Validate config and fetch the catalog once");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args};
    use anyhow::Result;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/devdex-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                location: None,
                print_config_path: false,
                print_example: false,
                print_location: false,
                check_only: false,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_reads_location() -> Result<()> {
        let options = parse_cli_args(
            vec!["--location", "/?search=switch&productLines=UniFi", "--print-location"],
            default_options_path(),
        )?;
        assert_eq!(
            options.location.as_deref(),
            Some("/?search=switch&productLines=UniFi")
        );
        assert!(options.print_location);
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));

        let error = parse_cli_args(vec!["--location"], default_options_path())
            .expect_err("missing location should fail");
        assert!(error.to_string().contains("--location requires a value"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.print_location);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }
}
