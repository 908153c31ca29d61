//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::services::PhaseReport;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::render::TreeRenderer;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{PersonStat, PreAllocationBreakdown, ProjectData};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.data_dir.as_deref())?;
    let container = ServiceContainer::new(settings);

    match &cli.command {
        Some(Commands::Calc {
            file,
            phase,
            expand,
        }) => cmd_calc(&container, file, phase.as_deref(), *expand),
        Some(Commands::Rest { file }) => cmd_rest(&container, file),
        Some(Commands::Stats {
            paths,
            sources,
            json,
        }) => cmd_stats(&container, paths, *sources, *json),
        Some(Commands::Check { file, phase }) => cmd_check(&container, file, phase.as_deref()),
        Some(Commands::Config { command }) => cmd_config(&container, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "splittree", &mut io::stdout());
            Ok(())
        }
        None => {
            Cli::command()
                .print_help()
                .map_err(|e| InfraError::io("print help", e))?;
            Ok(())
        }
    }
}

#[instrument(skip(container))]
fn cmd_calc(
    container: &ServiceContainer,
    file: &Path,
    phase: Option<&str>,
    expand: bool,
) -> CliResult<()> {
    let project = container.allocation.load_project(file)?;
    let reports = container.allocation.report(&project, phase)?;
    let display = &container.settings.display;

    for report in &reports {
        let phase = report.phase;
        output::header(&format!("{} / {}", project.name, phase.name));
        print_breakdown(&report.pre_allocations, container);

        let renderer = TreeRenderer {
            results: &report.results,
            view: &phase.view,
            display,
            expand: expand || display.expand_collapsed,
        };
        output::info(&renderer.render(&phase.root_node, &phase.name));

        for issue in &report.issues {
            output::warning(issue);
        }
        println!();
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_rest(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let project = container.allocation.load_project(file)?;
    for report in container.allocation.report(&project, None)? {
        output::header(&format!("{} / {}", project.name, report.phase.name));
        print_breakdown(&report.pre_allocations, container);
    }
    Ok(())
}

fn print_breakdown(breakdown: &PreAllocationBreakdown, container: &ServiceContainer) {
    let display = &container.settings.display;
    output::detail(&format!(
        "phase value  {}",
        output::format_money(breakdown.phase_value, display)
    ));
    for line in &breakdown.lines {
        output::detail(&format!(
            "- {}  {} ({})",
            line.name,
            output::format_money(line.amount, display),
            output::format_percent(line.share)
        ));
    }
    output::action(
        "rest value",
        &output::format_money(breakdown.rest_value, display),
    );
}

#[instrument(skip(container))]
fn cmd_stats(
    container: &ServiceContainer,
    paths: &[std::path::PathBuf],
    sources: bool,
    json: bool,
) -> CliResult<()> {
    let stats = container.allocation.stats(paths)?;
    debug!("cmd_stats: {} recipients", stats.len());

    if json {
        let text = serde_json::to_string_pretty(&stats).map_err(InfraError::from)?;
        output::info(&text);
        return Ok(());
    }
    if stats.is_empty() {
        output::warning("no recipients found");
        return Ok(());
    }

    let width = stats.iter().map(|s| s.name.chars().count()).max().unwrap_or(0);
    for stat in &stats {
        print_stat(stat, width, sources, container);
    }
    Ok(())
}

fn print_stat(stat: &PersonStat, width: usize, sources: bool, container: &ServiceContainer) {
    let display = &container.settings.display;
    output::info(&format!(
        "{:<width$}  {}",
        stat.name,
        output::format_money(stat.total_amount, display)
    ));
    if !sources {
        return;
    }
    for source in &stat.sources {
        let path = if source.path.is_empty() {
            "-".to_string()
        } else {
            source.path.join(" / ")
        };
        output::detail(&format!(
            "{}/{}  {}  {}",
            source.project_id,
            source.phase_id,
            path,
            output::format_money(source.amount, display)
        ));
    }
}

#[instrument(skip(container))]
fn cmd_check(container: &ServiceContainer, file: &Path, phase: Option<&str>) -> CliResult<()> {
    let project = container.allocation.load_project(file)?;
    let reports = container.allocation.report(&project, phase)?;

    print_findings(&project, &reports, container);
    let problems: usize = reports.iter().map(PhaseReport::problem_count).sum();
    if problems > 0 {
        return Err(CliError::Findings(problems));
    }
    output::success(&format!("{}: no problems found", project.name));
    Ok(())
}

/// Print issues as failures, error nodes as failures and warning nodes as cautions.
fn print_findings(project: &ProjectData, reports: &[PhaseReport], container: &ServiceContainer) {
    let display = &container.settings.display;

    for report in reports {
        if report.issues.is_empty() && report.flagged.is_empty() {
            continue;
        }
        output::header(&format!("{} / {}", project.name, report.phase.name));
        for issue in &report.issues {
            output::failure(issue);
        }
        for node in &report.flagged {
            let mut location = node.path.clone();
            location.push(node.name.clone());
            let msg = format!(
                "{} receives {}, unallocated {}",
                location.join(" / "),
                output::format_money(node.result.amount, display),
                output::format_money(node.result.unallocated, display)
            );
            if node.result.is_error {
                output::failure(&msg);
            } else {
                output::caution(&msg);
            }
        }
    }
}

fn cmd_config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path()
                    .ok_or_else(|| CliError::Usage("cannot determine config directory".into()))?
            } else {
                local_config_path(&container.settings.data_dir)
            };
            if container.fs.exists(&path) {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                container
                    .fs
                    .create_dir_all(parent)
                    .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
            }
            container
                .fs
                .write(&path, &Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(p) => output::info(&format!("global: {}", p.display())),
                None => output::info("global: (unavailable)"),
            }
            output::info(&format!(
                "local:  {}",
                local_config_path(&container.settings.data_dir).display()
            ));
            Ok(())
        }
    }
}
