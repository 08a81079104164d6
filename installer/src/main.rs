//! Third-party installer CLI entrypoint.
//!
//! This binary installs the vendored libraries selected by the inclusion
//! patterns into a local repository and writes the aggregate descriptor.
//! Progress is logged to stderr; `RUST_LOG` overrides the verbosity flags.

use clap::Parser;
use std::io::Write;
use thirdparty_installer::cli::Cli;
use thirdparty_installer::config::InstallSettings;
use thirdparty_installer::error::Result;
use thirdparty_installer::output::{DryRunInfo, success_message, write_stderr_line};
use thirdparty_installer::pipeline::InstallPipeline;
use thirdparty_installer::repository::{LocalRepository, default_repository_root};
use thirdparty_installer::validation::ModelValidator;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(cli.quiet, cli.verbosity)));
    // Fails only if a global subscriber is already set.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

const fn default_log_level(quiet: bool, verbosity: u8) -> &'static str {
    if quiet {
        return "error";
    }
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let settings = cli.load_config()?.resolve(default_repository_root())?;
    let repository = LocalRepository::new(settings.repository.clone());
    let pipeline = InstallPipeline::new(&settings, &ModelValidator, &repository);

    if cli.dry_run {
        return run_dry(&settings, &pipeline, stderr);
    }

    let summary = pipeline.run()?;
    if !cli.quiet {
        write_stderr_line(stderr, success_message(&summary));
    }
    Ok(())
}

/// Prints the install plan without touching the repository.
fn run_dry(
    settings: &InstallSettings,
    pipeline: &InstallPipeline<'_>,
    stderr: &mut dyn Write,
) -> Result<()> {
    let plan = pipeline.plan()?;
    write_stderr_line(
        stderr,
        DryRunInfo {
            settings,
            plan: &plan,
        }
        .display_text(),
    );
    Ok(())
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use thirdparty_installer::error::InstallerError;

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(()), &mut stderr);
        assert_eq!(exit_code, 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn exit_code_for_run_result_prints_error_and_returns_one() {
        let err = InstallerError::Consistency {
            dependencies: 1,
            installed: 2,
        };

        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Err(err), &mut stderr);
        assert_eq!(exit_code, 1);

        let stderr_text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(stderr_text.contains("differs from number of installations"));
    }

    #[rstest]
    #[case::quiet(true, 0, "error")]
    #[case::default(false, 0, "info")]
    #[case::verbose(false, 1, "debug")]
    #[case::very_verbose(false, 3, "trace")]
    fn default_log_level_follows_flags(
        #[case] quiet: bool,
        #[case] verbosity: u8,
        #[case] expected: &str,
    ) {
        assert_eq!(default_log_level(quiet, verbosity), expected);
    }

    #[test]
    fn run_reports_missing_configuration() {
        let cli = Cli::parse_from(["thirdparty-installer", "--group-prefix", "com.example"]);
        let mut stderr = Vec::new();
        let err = run(&cli, &mut stderr).expect_err("lib_dir is required");
        assert!(err.to_string().contains("lib_dir"));
    }
}
