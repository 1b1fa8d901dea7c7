use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use optree_config::{ConfigDiagnostics, OptreeConfig};
use optree_ir::{dump_with, lower_body, ArgumentOrder, LowerResult};
use optree_syntax::SyntaxBody;
use optree_types::{Diagnostic, Severity};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "optree", version, about = "Build and inspect semantic operation trees")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the canonical operation-tree dump of a bound body
    Dump(DumpArgs),
    /// Report lowering diagnostics; exits 1 when the tree contains errors
    Check(CheckArgs),
}

#[derive(Args)]
struct CommonArgs {
    /// Bound syntax body, as JSON
    body: PathBuf,
    /// Config file (defaults to `$OPTREE_CONFIG` or `./optree.toml`)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Order of argument nodes under calls
    #[arg(long, value_name = "evaluation|parameter")]
    order: Option<ArgumentOrder>,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct DumpArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Append source spans to every line
    #[arg(long)]
    spans: bool,
}

#[derive(Args)]
struct CheckArgs {
    #[command(flatten)]
    common: CommonArgs,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Dump(args) => {
            let (config, body, result) = lower(&args.common)?;
            let mut options = config.dump_options();
            options.show_spans |= args.spans;
            let dump = dump_with(&result.tree, &options);
            if args.common.json {
                print_json(&DumpReport {
                    dump,
                    has_errors: result.has_errors(),
                    diagnostics: report_diagnostics(&body, &result.diagnostics),
                })?;
            } else {
                print!("{dump}");
            }
            Ok(0)
        }
        Command::Check(args) => {
            let (_, body, result) = lower(&args.common)?;
            let exit = if result.has_errors() { 1 } else { 0 };
            let diagnostics = report_diagnostics(&body, &result.diagnostics);
            if args.common.json {
                print_json(&CheckReport {
                    has_errors: result.has_errors(),
                    diagnostics,
                })?;
            } else {
                for d in &diagnostics {
                    println!(
                        "{}:{}:{}: {}[{}] {}",
                        args.common.body.display(),
                        d.line,
                        d.column,
                        d.severity,
                        d.code,
                        d.message
                    );
                }
                println!(
                    "summary: {} diagnostics, {} operations",
                    diagnostics.len(),
                    result.tree.len()
                );
            }
            Ok(exit)
        }
    }
}

fn lower(args: &CommonArgs) -> Result<(OptreeConfig, SyntaxBody, LowerResult)> {
    let config = load_config(args.config.as_deref())?;
    optree_config::init_tracing(&config.logging);

    let text = std::fs::read_to_string(&args.body)
        .with_context(|| format!("failed to read {}", args.body.display()))?;
    let body: SyntaxBody = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse syntax body {}", args.body.display()))?;

    let mut lower_config = config.lower_config();
    if let Some(order) = args.order {
        lower_config.argument_order = order;
    }
    tracing::debug!(
        target: "optree.cli",
        body = %args.body.display(),
        order = lower_config.argument_order.as_str(),
        "lowering body"
    );
    let result = lower_body(&body, &lower_config);
    Ok((config, body, result))
}

fn load_config(explicit: Option<&Path>) -> Result<OptreeConfig> {
    let (config, path, diagnostics) = match explicit {
        Some(path) => {
            let (config, diagnostics) = OptreeConfig::load_from_path_with_diagnostics(path)?;
            (config, Some(path.to_path_buf()), diagnostics)
        }
        None => {
            let cwd = std::env::current_dir().context("failed to determine current directory")?;
            optree_config::load_for_dir(&cwd)?
        }
    };
    if let Some(path) = &path {
        report_config_diagnostics(path, &diagnostics);
    }
    Ok(config)
}

/// Config problems go to stderr before logging is set up.
fn report_config_diagnostics(path: &Path, diagnostics: &ConfigDiagnostics) {
    for key in &diagnostics.unknown_keys {
        eprintln!("{}: warning: unknown key `{key}`", path.display());
    }
    for warning in &diagnostics.warnings {
        eprintln!("{}: warning: {warning}", path.display());
    }
}

#[derive(Serialize)]
struct ReportedDiagnostic {
    severity: &'static str,
    code: &'static str,
    message: String,
    line: usize,
    column: usize,
    start: Option<usize>,
    end: Option<usize>,
}

#[derive(Serialize)]
struct DumpReport {
    dump: String,
    has_errors: bool,
    diagnostics: Vec<ReportedDiagnostic>,
}

#[derive(Serialize)]
struct CheckReport {
    has_errors: bool,
    diagnostics: Vec<ReportedDiagnostic>,
}

fn report_diagnostics(body: &SyntaxBody, diagnostics: &[Diagnostic]) -> Vec<ReportedDiagnostic> {
    diagnostics
        .iter()
        .map(|d| {
            let offset = d.span.map_or(0, |span| span.start);
            let (line, column) = line_column(&body.source, offset);
            ReportedDiagnostic {
                severity: match d.severity {
                    Severity::Error => "error",
                    Severity::Warning => "warning",
                    Severity::Info => "info",
                },
                code: d.code,
                message: d.message.clone(),
                line,
                column,
                start: d.span.map(|span| span.start),
                end: d.span.map(|span| span.end),
            }
        })
        .collect()
}

/// One-based line and column of a byte offset.
fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map_or(before.chars().count(), |nl| before[nl + 1..].chars().count())
        + 1;
    (line, column)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{out}");
    Ok(())
}
