//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::control;
use serde_json::{Value, json};
use thiserror::Error;

use sim_fleet_monitor::core::config::Config;
use sim_fleet_monitor::core::errors::SfmError;
use sim_fleet_monitor::tui;

/// Sim Fleet Monitor — terminal dashboard over simulated transaction processors.
#[derive(Debug, Parser)]
#[command(
    name = "sfm",
    author,
    version,
    about = "Sim Fleet Monitor - Transaction Fleet Dashboard",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Increase verbosity.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet mode (errors only).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Launch the live fleet dashboard.
    Run(RunArgs),
    /// View and validate configuration state.
    Config(ConfigArgs),
    /// Show version and optional build metadata.
    Version(VersionArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args, Default)]
struct RunArgs {
    /// Number of simulated instances (0 picks a random count at startup).
    #[arg(long, value_name = "N")]
    instances: Option<usize>,
    /// Dashboard refresh period in milliseconds.
    #[arg(long, value_name = "MILLISECONDS")]
    refresh_ms: Option<u64>,
}

#[derive(Debug, Clone, Args, Default)]
struct ConfigArgs {
    /// Config operation to run.
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Subcommand)]
enum ConfigCommand {
    /// Print resolved config file path.
    Path,
    /// Print effective merged configuration.
    Show,
    /// Validate configuration and exit.
    Validate,
}

#[derive(Debug, Clone, Args, Default)]
struct VersionArgs {
    /// Include additional build metadata fields.
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input at runtime.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// Internal bug or invariant violation.
    #[error("{0}")]
    Internal(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Internal(_) | Self::Json(_) => 3,
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::Run(args) => run_dashboard(cli, args),
        Command::Config(args) => run_config(cli, args),
        Command::Version(args) => emit_version(cli, args),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

fn run_dashboard(cli: &Cli, args: &RunArgs) -> Result<(), CliError> {
    if cli.json {
        return Err(CliError::User(
            "run renders an interactive terminal and has no JSON output".to_string(),
        ));
    }

    let mut config = Config::load(cli.config.as_deref()).map_err(map_core_error)?;
    if let Some(instances) = args.instances {
        config.fleet.instances = instances;
    }
    if let Some(refresh_ms) = args.refresh_ms {
        config.timing.tick_ms = refresh_ms;
    }
    // Flag overrides bypass the load-time checks, so re-validate.
    config.validate().map_err(map_core_error)?;

    let summary = tui::run(&config).map_err(map_core_error)?;

    // The drop counter is the only trace of bus overflow; losing it to a
    // non-verbose run would make the drops silent.
    if summary.dropped_events > 0 && !cli.quiet {
        eprintln!(
            "[SFM-RUN] WARNING: bus overflow dropped {} events during the session",
            summary.dropped_events
        );
    }
    if cli.verbose {
        println!(
            "run summary: instances={} ticks={} dropped_events={} ignored_events={}",
            summary.fleet_size, summary.ticks, summary.dropped_events, summary.ignored_events
        );
    }
    Ok(())
}

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match &args.command {
        None | Some(ConfigCommand::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            let exists = path.exists();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists && !cli.quiet {
                        println!("  (file does not exist; defaults will be used)");
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config path",
                        "path": path.to_string_lossy(),
                        "exists": exists,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Show) => {
            let config = Config::load(cli.config.as_deref()).map_err(map_core_error)?;

            match output_mode(cli) {
                OutputMode::Human => {
                    let toml_str = toml::to_string_pretty(&config)
                        .map_err(|e| CliError::Internal(format!("serialize config: {e}")))?;
                    println!("{toml_str}");
                }
                OutputMode::Json => {
                    let value = serde_json::to_value(&config)?;
                    let payload = json!({
                        "command": "config show",
                        "config": value,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Validate) => match Config::load(cli.config.as_deref()) {
            Ok(config) => {
                let hash = config
                    .stable_hash()
                    .map_err(|e| CliError::Internal(e.to_string()))?;
                let source = cli.config.clone().unwrap_or_else(Config::default_path);

                match output_mode(cli) {
                    OutputMode::Human => {
                        println!("Configuration is valid.");
                        println!("  Source: {}", source.display());
                        println!("  Hash: {hash}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": true,
                            "path": source.to_string_lossy(),
                            "hash": hash,
                        });
                        write_json_line(&payload)?;
                    }
                }
                Ok(())
            }
            Err(e) => {
                match output_mode(cli) {
                    OutputMode::Human => {
                        eprintln!("Configuration is INVALID: {e}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": false,
                            "error": e.to_string(),
                        });
                        write_json_line(&payload)?;
                    }
                }
                Err(CliError::User(format!("invalid config: {e}")))
            }
        },
    }
}

fn emit_version(cli: &Cli, args: &VersionArgs) -> Result<(), CliError> {
    let version = env!("CARGO_PKG_VERSION");
    let package = env!("CARGO_PKG_NAME");
    let target = option_env!("TARGET").unwrap_or("unknown");
    let profile = option_env!("PROFILE").unwrap_or("unknown");
    let git_sha = option_env!("VERGEN_GIT_SHA")
        .or(option_env!("GIT_SHA"))
        .unwrap_or("unknown");
    let build_timestamp = option_env!("VERGEN_BUILD_TIMESTAMP")
        .or(option_env!("BUILD_TIMESTAMP"))
        .unwrap_or("unknown");

    match output_mode(cli) {
        OutputMode::Human => {
            println!("sfm {version}");
            if args.verbose {
                println!("package: {package}");
                println!("target: {target}");
                println!("profile: {profile}");
                println!("git_sha: {git_sha}");
                println!("build_timestamp: {build_timestamp}");
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "binary": "sfm",
                "version": version,
                "package": package,
                "build": {
                    "target": target,
                    "profile": profile,
                    "git_sha": git_sha,
                    "timestamp": build_timestamp,
                }
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

/// Map library errors onto the CLI exit-code classes: config problems are
/// the operator's to fix (usage), everything else is a runtime failure.
fn map_core_error(error: SfmError) -> CliError {
    match &error {
        SfmError::InvalidConfig { .. }
        | SfmError::MissingConfig { .. }
        | SfmError::ConfigParse { .. } => CliError::User(error.to_string()),
        _ => CliError::Runtime(error.to_string()),
    }
}

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("SFM_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    let fallback = if stdout_is_tty {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        Some("auto") | None => fallback,
        Some(_) => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_before_and_after_subcommand() {
        let before = Cli::try_parse_from([
            "sfm",
            "--config",
            "/tmp/sfm.toml",
            "--json",
            "--no-color",
            "-v",
            "version",
        ]);
        assert!(before.is_ok());

        let after = Cli::try_parse_from(["sfm", "version", "--json", "--no-color", "-v"]);
        assert!(after.is_ok());
    }

    #[test]
    fn parses_command_surface() {
        let cases = [
            vec!["sfm", "run"],
            vec!["sfm", "run", "--instances", "12"],
            vec!["sfm", "run", "--refresh-ms", "250"],
            vec!["sfm", "run", "--instances", "0", "--refresh-ms", "500"],
            vec!["sfm", "config"],
            vec!["sfm", "config", "path"],
            vec!["sfm", "config", "show"],
            vec!["sfm", "config", "validate"],
            vec!["sfm", "version", "--verbose"],
            vec!["sfm", "completions", "bash"],
        ];

        for case in cases {
            let parsed = Cli::try_parse_from(case.clone());
            assert!(parsed.is_ok(), "failed to parse case: {case:?}");
        }
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["sfm", "run", "-v", "-q"]).is_err());
        assert!(Cli::try_parse_from(["sfm", "-v", "run"]).is_ok());
        assert!(Cli::try_parse_from(["sfm", "-q", "run"]).is_ok());
    }

    #[test]
    fn bare_invocation_requires_subcommand() {
        assert!(Cli::try_parse_from(["sfm"]).is_err());
    }

    #[test]
    fn completions_support_bash_zsh_and_fish() {
        for shell in ["bash", "zsh", "fish"] {
            let parsed = Cli::try_parse_from(["sfm", "completions", shell]);
            assert!(parsed.is_ok(), "failed shell parse for {shell}");
        }
    }

    #[test]
    fn run_rejects_json_mode() {
        let cli = Cli::try_parse_from(["sfm", "--json", "run"]).expect("parse");
        let Command::Run(args) = &cli.command else {
            panic!("expected run command");
        };
        let err = run_dashboard(&cli, args).expect_err("json mode should be rejected");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn exit_codes_follow_error_class() {
        assert_eq!(CliError::User(String::new()).exit_code(), 1);
        assert_eq!(CliError::Runtime(String::new()).exit_code(), 2);
        assert_eq!(CliError::Internal(String::new()).exit_code(), 3);
    }

    #[test]
    fn config_errors_map_to_usage_class() {
        let invalid = map_core_error(SfmError::InvalidConfig {
            details: "bad".to_string(),
        });
        assert_eq!(invalid.exit_code(), 1);

        let missing = map_core_error(SfmError::MissingConfig {
            path: PathBuf::from("/nonexistent/sfm.toml"),
        });
        assert_eq!(missing.exit_code(), 1);

        let terminal = map_core_error(SfmError::Terminal {
            source: io::Error::other("no tty"),
        });
        assert_eq!(terminal.exit_code(), 2);

        let channel = map_core_error(SfmError::ChannelClosed { component: "bus" });
        assert_eq!(channel.exit_code(), 2);
    }

    #[test]
    fn output_mode_resolution_honors_precedence() {
        assert_eq!(
            resolve_output_mode(true, Some("human"), true),
            OutputMode::Json
        );
        assert_eq!(
            resolve_output_mode(false, Some("json"), true),
            OutputMode::Json
        );
        assert_eq!(
            resolve_output_mode(false, Some("human"), false),
            OutputMode::Human
        );
        assert_eq!(
            resolve_output_mode(false, Some("auto"), true),
            OutputMode::Human
        );
        assert_eq!(resolve_output_mode(false, None, false), OutputMode::Json);
    }

    #[test]
    fn help_includes_command_surface() {
        let mut cmd = Cli::command();
        let help = cmd.render_long_help().to_string();
        for keyword in ["run", "config", "version", "completions"] {
            assert!(
                help.contains(keyword),
                "help output missing command: {keyword}"
            );
        }
    }
}
