//! CLI entry point for blockguard.
//!
//! Argument parsing, I/O and exit codes only. The use cases live in `blockguard-app`.

use anyhow::Context;
use blockguard_app::{
    CheckInput, ExplainOutput, checks_file_schema_json, format_explanation, format_not_found,
    format_validation, load_registry, run_check, run_explain, runtime_error_report,
    validate_checks, verdict_exit_code, write_report,
};
use blockguard_settings::{DEFAULT_CHECKS_DIR, Overrides};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "blockguard",
    version,
    about = "Declarative custom checks for Terraform configurations"
)]
struct Cli {
    /// Directory to scan (the root module).
    #[arg(long, default_value = ".", global = true)]
    repo_root: Utf8PathBuf,

    /// Path to the blockguard config TOML, relative to the repo root.
    #[arg(long, default_value = "blockguard.toml", global = true)]
    config: Utf8PathBuf,

    /// Override profile (strict|warn).
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Override maximum findings to emit.
    #[arg(long, global = true)]
    max_findings: Option<u32>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load custom checks, scan the configuration and write a report.
    Check {
        /// Directory holding `*_tfchecks.{json,yaml,yml}` files, relative to the repo root.
        #[arg(long)]
        checks_dir: Option<String>,

        /// Override the severity that fails the run (LOW|MEDIUM|HIGH|CRITICAL).
        #[arg(long)]
        fail_on: Option<String>,

        /// Where to write the JSON report.
        #[arg(long, default_value = "artifacts/blockguard/report.json")]
        report_out: Utf8PathBuf,
    },

    /// Validate one checks file without scanning anything.
    Validate {
        /// Path to the checks file.
        file: Utf8PathBuf,
    },

    /// Describe a loaded custom check.
    Explain {
        /// The check code, e.g. "CUS001".
        code: String,

        /// Directory holding the checks files, relative to the repo root.
        #[arg(long, default_value = DEFAULT_CHECKS_DIR)]
        checks_dir: String,
    },

    /// Print the JSON Schema of the checks-file format.
    Schema,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Check {
            ref checks_dir,
            ref fail_on,
            ref report_out,
        } => cmd_check(&cli, checks_dir.clone(), fail_on.clone(), report_out),
        Commands::Validate { ref file } => cmd_validate(file),
        Commands::Explain {
            ref code,
            ref checks_dir,
        } => cmd_explain(&cli, code, checks_dir),
        Commands::Schema => {
            print!("{}", checks_file_schema_json()?);
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_check(
    cli: &Cli,
    checks_dir: Option<String>,
    fail_on: Option<String>,
    report_out: &Utf8PathBuf,
) -> anyhow::Result<()> {
    let repo_root = cli
        .repo_root
        .canonicalize_utf8()
        .unwrap_or_else(|_| cli.repo_root.clone());

    let result = (|| -> anyhow::Result<i32> {
        if !repo_root.is_dir() {
            anyhow::bail!("repo root does not exist: {repo_root}");
        }
        // Missing config file is allowed (defaults apply).
        let cfg_path = repo_root.join(&cli.config);
        let cfg_text = std::fs::read_to_string(&cfg_path).unwrap_or_default();

        let output = run_check(CheckInput {
            repo_root: &repo_root,
            config_text: &cfg_text,
            overrides: Overrides {
                profile: cli.profile.clone(),
                fail_on,
                max_findings: cli.max_findings,
                checks_dir,
            },
        })?;

        write_report(report_out, &output.report).context("write report json")?;
        Ok(verdict_exit_code(&output.report.verdict))
    })();

    match result {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(err) => {
            let report = runtime_error_report(&format!("{err:#}"));
            if let Err(write_err) = write_report(report_out, &report) {
                tracing::error!(error = %write_err, "could not write runtime-error report");
            }
            eprintln!("blockguard error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn cmd_validate(file: &Utf8PathBuf) -> anyhow::Result<()> {
    match validate_checks(file) {
        Ok(output) => {
            print!("{}", format_validation(&output));
            Ok(())
        }
        Err(err) => {
            eprintln!("blockguard error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn cmd_explain(cli: &Cli, code: &str, checks_dir: &str) -> anyhow::Result<()> {
    let registry = load_registry(&cli.repo_root, checks_dir)?;
    match run_explain(&registry, code) {
        ExplainOutput::Found(check) => {
            print!("{}", format_explanation(&check));
            Ok(())
        }
        ExplainOutput::NotFound {
            code,
            available_codes,
        } => {
            eprint!("{}", format_not_found(&code, &available_codes));
            std::process::exit(1);
        }
    }
}
