//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::Colorize;
use colored::control;

use windows_maintenance_helper::core::config::Config;
use windows_maintenance_helper::core::errors::{Result, WmhError};
use windows_maintenance_helper::inventory::InventoryAdapter;
use windows_maintenance_helper::logger::{self, DiagEvent, DiagLoggerHandle};
use windows_maintenance_helper::net::NetAdapter;
use windows_maintenance_helper::platform::procs::SysinfoProcesses;
use windows_maintenance_helper::platform::registry::{RegistryProvider, detect_registry};
use windows_maintenance_helper::procs::snapshot::top;
use windows_maintenance_helper::procs::terminate::{self, terminate_all};
use windows_maintenance_helper::startup::mutator::{RootDisposition, StartupMutator, summarize};
use windows_maintenance_helper::startup::policy::CriticalityPolicy;
use windows_maintenance_helper::startup::roots::autostart_roots;
use windows_maintenance_helper::startup::scanner::scan;
use windows_maintenance_helper::sweeper::deletion::TempSweeper;
use windows_maintenance_helper::sweeper::walker::TempWalker;
use windows_maintenance_helper::system;
use windows_maintenance_helper::tasks;

/// Windows Maintenance Helper — startup, process, and temp-file upkeep.
#[derive(Debug, Parser)]
#[command(
    name = "wmh",
    author,
    version,
    about = "Windows Maintenance Helper - startup, process, and temp-file upkeep",
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
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Show CPU, memory, and disk gauges.
    Status,
    /// Inspect and disable startup registrations.
    Startup(StartupArgs),
    /// List processes ranked by CPU then memory.
    Ps(PsArgs),
    /// Request termination of one or more pids.
    Kill(KillArgs),
    /// Enumerate (and optionally delete) temp files.
    Temp(TempArgs),
    /// List active network connections.
    Net,
    /// Query the external software inventory.
    Software(SoftwareArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args)]
struct StartupArgs {
    #[command(subcommand)]
    action: StartupAction,
}

#[derive(Debug, Clone, Subcommand)]
enum StartupAction {
    /// List startup entries across all autostart roots.
    List {
        /// Include entries the criticality policy protects.
        #[arg(long)]
        all: bool,
    },
    /// Delete the named entries from every writable root.
    Disable {
        /// Entry names, attempted independently in the given order.
        #[arg(required = true)]
        names: Vec<String>,
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Args)]
struct PsArgs {
    /// Number of ranked processes to show (default from config).
    #[arg(long, value_name = "K")]
    top: Option<usize>,
}

#[derive(Debug, Clone, Args)]
struct KillArgs {
    /// Process identifiers, attempted independently in the given order.
    #[arg(required = true)]
    pids: Vec<u32>,
    /// Skip the confirmation prompt.
    #[arg(short, long)]
    yes: bool,
}

#[derive(Debug, Clone, Args)]
struct TempArgs {
    /// Delete the enumerated files instead of only listing them.
    #[arg(long)]
    delete: bool,
    /// Skip the confirmation prompt.
    #[arg(short, long)]
    yes: bool,
}

#[derive(Debug, Clone, Args)]
struct SoftwareArgs {
    #[command(subcommand)]
    action: SoftwareAction,
}

#[derive(Debug, Clone, Subcommand)]
enum SoftwareAction {
    /// List installed software via the external collaborator.
    List,
    /// Uninstall a program by exact name.
    Uninstall {
        name: String,
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum)]
    shell: CompletionShell,
}

/// Entry point called by `main`.
pub fn run(cli: &Cli) -> Result<()> {
    if cli.no_color || !io::stdout().is_terminal() {
        control::set_override(false);
    }

    if let Command::Completions(args) = &cli.command {
        generate(args.shell, &mut Cli::command(), "wmh", &mut io::stdout());
        return Ok(());
    }

    let config = Config::load_or_default(cli.config.as_deref())?;
    let (logger, logger_join) = logger::spawn(&config.logging);

    let outcome = dispatch(cli, &config, &logger);
    if let Err(err) = &outcome {
        logger.send(DiagEvent::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        });
    }

    logger.shutdown();
    let _ = logger_join.join();
    outcome
}

fn dispatch(cli: &Cli, config: &Config, logger: &DiagLoggerHandle) -> Result<()> {
    match &cli.command {
        Command::Status => cmd_status(cli.json),
        Command::Startup(args) => match &args.action {
            StartupAction::List { all } => cmd_startup_list(cli.json, config, logger, *all),
            StartupAction::Disable { names, yes } => {
                cmd_startup_disable(cli.json, logger, names, *yes)
            }
        },
        Command::Ps(args) => cmd_ps(cli.json, config, args.top),
        Command::Kill(args) => cmd_kill(cli.json, logger, &args.pids, args.yes),
        Command::Temp(args) => cmd_temp(cli.json, config, logger, args.delete, args.yes),
        Command::Net => cmd_net(cli.json, config, logger),
        Command::Software(args) => match &args.action {
            SoftwareAction::List => cmd_software_list(cli.json, config, logger),
            SoftwareAction::Uninstall { name, yes } => {
                cmd_software_uninstall(config, logger, name, *yes)
            }
        },
        Command::Completions(_) => Ok(()),
    }
}

// ──────────────────── status ────────────────────

fn cmd_status(json: bool) -> Result<()> {
    let cpu = system::cpu_percent();
    let memory = system::memory();
    let disks = system::disks();

    if json {
        let payload = serde_json::json!({
            "cpu_percent": cpu,
            "memory": memory,
            "disks": disks,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("{}", "System status".bold());
    println!("  CPU usage:    {cpu:.1}%");
    println!(
        "  Memory usage: {:.1}% of {:.2} GB",
        memory.used_percent,
        gigabytes(memory.total_bytes)
    );
    for disk in disks {
        println!(
            "  {}: {:.2} GB free of {:.2} GB ({:.1}% used)",
            disk.mount_point,
            gigabytes(disk.available_bytes),
            gigabytes(disk.total_bytes),
            disk.used_percent
        );
    }
    Ok(())
}

// ──────────────────── startup ────────────────────

fn cmd_startup_list(
    json: bool,
    config: &Config,
    logger: &DiagLoggerHandle,
    all: bool,
) -> Result<()> {
    let registry = detect_registry()?;
    let roots = autostart_roots();
    let report = scan(registry.as_ref(), &roots);
    logger.send(DiagEvent::ScanCompleted {
        roots: roots.len(),
        entries: report.entries.len(),
        warnings: report.warnings.len(),
    });

    for warning in &report.warnings {
        eprintln!(
            "{} cannot read {}: {}",
            "warning:".yellow(),
            warning.root,
            warning.kind
        );
    }

    let policy = CriticalityPolicy::new(config.startup.critical.clone());
    let entries = if all {
        report.entries
    } else {
        policy.filter(report.entries)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No startup entries found.");
        return Ok(());
    }
    let heading = if all {
        "Startup entries"
    } else {
        "Non-critical startup entries"
    };
    println!("{}", heading.bold());
    for entry in &entries {
        let marker = if policy.is_critical(&entry.name) {
            " [critical]".red().to_string()
        } else {
            String::new()
        };
        println!("  {}{marker}", entry.name.bold());
        println!("    root:    {}", entry.root);
        println!("    command: {}", entry.command);
    }
    Ok(())
}

fn cmd_startup_disable(
    json: bool,
    logger: &DiagLoggerHandle,
    names: &[String],
    yes: bool,
) -> Result<()> {
    let registry: Arc<dyn RegistryProvider> = detect_registry()?;
    if !confirm(
        &format!("Disable {} startup entr(ies)?", names.len()),
        yes,
    )? {
        println!("Aborted.");
        return Ok(());
    }

    let mutator = StartupMutator::new(registry.as_ref(), Some(logger.clone()));
    let reports = mutator.disable_all(names);
    let summary = summarize(&reports);

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for report in &reports {
        let badge = if report.ok() {
            "ok".green()
        } else {
            "failed".red()
        };
        println!("{} {}", badge, report.name.bold());
        for outcome in &report.roots {
            let label = match outcome.disposition {
                RootDisposition::Deleted => "deleted".to_string(),
                RootDisposition::NotPresent => "not present".to_string(),
                RootDisposition::Failed(kind) => kind.to_string(),
            };
            println!("    {}: {label}", outcome.root);
        }
    }
    println!(
        "{} succeeded, {} failed",
        summary.succeeded,
        summary.failed.len()
    );
    Ok(())
}

// ──────────────────── processes ────────────────────

fn cmd_ps(json: bool, config: &Config, top_k: Option<usize>) -> Result<()> {
    let provider = SysinfoProcesses::new();
    let k = top_k.unwrap_or(config.procs.top_k);
    let rows = top(&provider, k);

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{}", format!("Top {k} processes by CPU, then memory").bold());
    println!("{:>8}  {:>6}  {:>6}  name", "pid", "cpu%", "mem%");
    for row in &rows {
        println!(
            "{:>8}  {:>6.1}  {:>6.1}  {}",
            row.pid, row.cpu_percent, row.mem_percent, row.name
        );
    }
    Ok(())
}

fn cmd_kill(json: bool, logger: &DiagLoggerHandle, pids: &[u32], yes: bool) -> Result<()> {
    if !confirm(&format!("Terminate {} process(es)?", pids.len()), yes)? {
        println!("Aborted.");
        return Ok(());
    }

    let provider = SysinfoProcesses::new();
    let outcomes = terminate_all(&provider, pids, Some(logger));
    let summary = terminate::summarize(&outcomes);

    if json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
        return Ok(());
    }

    for outcome in &outcomes {
        match outcome.error {
            None => println!("{} pid {}", "terminated".green(), outcome.target),
            Some(kind) => println!("{} pid {}: {kind}", "failed".red(), outcome.target),
        }
    }
    println!(
        "{} succeeded, {} failed",
        summary.succeeded,
        summary.failed.len()
    );
    Ok(())
}

// ──────────────────── temp sweep ────────────────────

fn cmd_temp(
    json: bool,
    config: &Config,
    logger: &DiagLoggerHandle,
    delete: bool,
    yes: bool,
) -> Result<()> {
    // Enumeration can take a while on large temp trees; run it off-thread
    // and block on the completion channel.
    let walker_config = config.sweeper.clone();
    let rx = tasks::run_background(move || TempWalker::new(walker_config).enumerate());
    let paths = tasks::wait(&rx)?;

    if !delete {
        if json {
            println!("{}", serde_json::to_string_pretty(&paths)?);
        } else {
            println!("Found {} temporary files.", paths.len());
        }
        return Ok(());
    }

    if paths.is_empty() {
        println!("No temporary files to delete.");
        return Ok(());
    }
    if !confirm(&format!("Delete {} temporary files?", paths.len()), yes)? {
        println!("Aborted.");
        return Ok(());
    }

    let report = TempSweeper::new(Some(logger.clone())).delete(&paths);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} deleted, {} failed",
        report.succeeded.to_string().green(),
        report.failed.len()
    );
    for path in &report.failed {
        println!("  {} {}", "kept:".yellow(), path.display());
    }
    Ok(())
}

// ──────────────────── network connections ────────────────────

fn cmd_net(json: bool, config: &Config, logger: &DiagLoggerHandle) -> Result<()> {
    let adapter = NetAdapter::new(config.net.clone(), Some(logger.clone()));
    let rx = tasks::run_background(move || adapter.list_connections());
    let entries = tasks::wait(&rx)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No active connections reported.");
        return Ok(());
    }
    println!(
        "{:<6} {:<26} {:<26} {:<12} pid",
        "proto", "local", "remote", "state"
    );
    for entry in &entries {
        let pid = entry
            .pid
            .map_or_else(|| "-".to_string(), |pid| pid.to_string());
        println!(
            "{:<6} {:<26} {:<26} {:<12} {pid}",
            entry.proto, entry.local_addr, entry.remote_addr, entry.state
        );
    }
    Ok(())
}

// ──────────────────── software inventory ────────────────────

fn cmd_software_list(json: bool, config: &Config, logger: &DiagLoggerHandle) -> Result<()> {
    let adapter = InventoryAdapter::new(config.inventory.clone(), Some(logger.clone()));
    // The WMI query behind the collaborator is notoriously slow.
    let rx = tasks::run_background(move || adapter.list_installed());
    let entries = tasks::wait(&rx)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No installed software reported.");
        return Ok(());
    }
    println!("{:<50} {:<15} install date", "name", "version");
    for entry in &entries {
        println!(
            "{:<50} {:<15} {}",
            entry.name, entry.version, entry.install_date
        );
    }
    Ok(())
}

fn cmd_software_uninstall(
    config: &Config,
    logger: &DiagLoggerHandle,
    name: &str,
    yes: bool,
) -> Result<()> {
    if !confirm(&format!("Uninstall `{name}`?"), yes)? {
        println!("Aborted.");
        return Ok(());
    }
    let adapter = InventoryAdapter::new(config.inventory.clone(), Some(logger.clone()));
    adapter.uninstall(name)?;
    println!("{} {name}", "uninstalled".green());
    Ok(())
}

// ──────────────────── helpers ────────────────────

/// Ask for confirmation unless `--yes` was passed. In a non-interactive
/// session without `--yes`, destructive actions are refused.
fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(WmhError::Runtime {
            details: "refusing destructive action without --yes in a non-interactive session"
                .to_string(),
        });
    }
    print!("{prompt} [y/N] ");
    io::stdout()
        .flush()
        .map_err(|source| WmhError::io("stdout", source))?;
    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .map_err(|source| WmhError::io("stdin", source))?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

#[allow(clippy::cast_precision_loss)]
fn gigabytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0 * 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_startup_disable() {
        let cli = Cli::try_parse_from(["wmh", "startup", "disable", "Updater", "--yes"]).unwrap();
        match cli.command {
            Command::Startup(StartupArgs {
                action: StartupAction::Disable { names, yes },
            }) => {
                assert_eq!(names, vec!["Updater".to_string()]);
                assert!(yes);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_rejects_kill_without_pids() {
        assert!(Cli::try_parse_from(["wmh", "kill"]).is_err());
    }

    #[test]
    fn cli_parses_global_json_flag() {
        let cli = Cli::try_parse_from(["wmh", "ps", "--json", "--top", "3"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Command::Ps(args) => assert_eq!(args.top, Some(3)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn confirm_with_yes_skips_prompt() {
        assert!(confirm("anything", true).unwrap());
    }
}
