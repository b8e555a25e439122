//! Heofon CLI: run page-object navigation scenarios
//!
//! ## Usage
//!
//! ```bash
//! heofon routes                                  # Show routing tables and menus
//! heofon run --dry-run                           # All scenarios on the scripted site
//! heofon run -s linear -b headless-chromium      # One scenario in chromium
//! heofon run --tier qa --tracing on -o output    # Screenshot after every click
//! ```

use clap::Parser;
use heofon::apps::sweetshop;
use heofon_cli::{
    execute, routes, Cli, CliConfig, CliResult, ColorChoice, Commands, RoutesArgs, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);

    match cli.command {
        Commands::Routes(args) => run_routes(&args),
        Commands::Run(args) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let summary = runtime.block_on(execute(config, &args))?;
            if !config.verbosity.is_quiet() {
                println!("{}", summary.run_dir.display());
            }
            Ok(())
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.into();
    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

fn run_routes(args: &RoutesArgs) -> CliResult<()> {
    let app = sweetshop::application(args.tier.into())?;
    let listing = if args.json {
        routes::render_json(&app)?
    } else {
        routes::render_text(&app)
    };
    print!("{listing}");
    if args.json {
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use heofon_cli::CliError;

    #[test]
    fn test_build_config() {
        let cli = Cli::try_parse_from(["heofon", "-v", "--color", "never", "routes"]).unwrap();
        let config = build_config(&cli);
        assert_eq!(config.verbosity, Verbosity::Verbose);
        assert_eq!(config.color, ColorChoice::Never);
    }

    #[test]
    fn test_cases_failed_is_an_error() {
        let err = CliError::CasesFailed {
            failed: 1,
            total: 8,
        };
        assert!(err.to_string().starts_with("1 of 8"));
    }
}
