//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::application::services::ImportReport;
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands, PolicyArg};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{FilterKind, FilterNode};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Import {
            dest,
            source,
            dir,
            on_unresolved,
        }) => import(container, dest, source.as_deref(), dir.as_deref(), *on_unresolved),
        Some(Commands::Template {
            dest,
            on_unresolved,
        }) => template(container, dest, *on_unresolved),
        Some(Commands::Tree { file }) => tree(container, file),
        Some(Commands::Layers { file }) => layers(container, file),
        Some(Commands::Config { command }) => config(container, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

#[instrument(skip(container))]
fn import(
    container: &ServiceContainer,
    dest: &Path,
    source: Option<&Path>,
    dir: Option<&Path>,
    policy: Option<PolicyArg>,
) -> CliResult<()> {
    let source = match source {
        Some(path) => path.to_path_buf(),
        None => {
            let search_dir = dir.unwrap_or(&container.settings.search_dir);
            match pick_source(container, search_dir, dest)? {
                Some(path) => path,
                // User cancellation is recoverable: nothing was touched.
                None => {
                    output::info("Cancelled.");
                    return Ok(());
                }
            }
        }
    };

    let service = container.import_service(policy.map(Into::into));
    let report = service.import(dest, &source)?;
    print_report(&report);
    Ok(())
}

#[instrument(skip(container))]
fn template(container: &ServiceContainer, dest: &Path, policy: Option<PolicyArg>) -> CliResult<()> {
    let service = container.import_service(policy.map(Into::into));
    match service.import_default_template(dest, &container.settings) {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        // Missing configuration is a user-facing message, not a failure.
        Err(ApplicationError::TemplateNotConfigured) => {
            output::warning(
                "no default template configured; set 'default_template' in the config \
                 (lfmerge config init)",
            );
            Ok(())
        }
        Err(ApplicationError::TemplateMissing(path)) => {
            output::warning(&format!(
                "default template not found: {}",
                path.display()
            ));
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Scan for candidate documents and let the user pick one.
fn pick_source(
    container: &ServiceContainer,
    search_dir: &Path,
    dest: &Path,
) -> CliResult<Option<PathBuf>> {
    let candidates = scan_documents(search_dir, dest);
    debug!("found {} candidate documents", candidates.len());
    if candidates.is_empty() {
        output::warning(&format!(
            "no documents found in {}",
            search_dir.display()
        ));
        return Ok(None);
    }
    container
        .selector
        .pick(&candidates, "source document> ")
        .map_err(|message| CliError::Infra(InfraError::Selector { message }))
}

/// Document files under `dir`, excluding the destination itself.
fn scan_documents(dir: &Path, dest: &Path) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().map(|ext| ext == "toml").unwrap_or(false))
        .filter(|p| p != dest)
        .collect();
    candidates.sort();
    candidates
}

fn print_report(report: &ImportReport) {
    output::success(&format!(
        "imported layer filters from {} into {}",
        report.source.display(),
        report.dest.display()
    ));
    output::detail(&format!(
        "{} filters and {} groups created, {} layer ids remapped",
        report.stats.filters_created, report.stats.groups_created, report.stats.members_mapped
    ));
    if report.stats.members_dropped > 0 {
        output::warning(&format!(
            "{} group member(s) had no destination layer and were dropped",
            report.stats.members_dropped
        ));
    }
}

#[instrument(skip(container))]
fn tree(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let document = container.store.load(file)?;
    let label = document
        .name
        .clone()
        .unwrap_or_else(|| file.display().to_string());
    let mut root = termtree::Tree::new(label);
    for node in &document.filters.nodes {
        root.push(render_node(node));
    }
    output::info(&root);
    Ok(())
}

fn render_node(node: &FilterNode) -> termtree::Tree<String> {
    let label = match &node.kind {
        FilterKind::Expression(expr) if expr.is_empty() => node.name.clone(),
        FilterKind::Expression(expr) => format!("{} [{}]", node.name, expr),
        FilterKind::Group(members) => format!("{} ({} layers)", node.name, members.len()),
    };
    let mut tree = termtree::Tree::new(label);
    for child in &node.children {
        tree.push(render_node(child));
    }
    tree
}

#[instrument(skip(container))]
fn layers(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let document = container.store.load(file)?;
    output::header(&format!("{} layers", document.layers.len()));
    for (id, record) in document.layers.iter() {
        let mut flags = String::new();
        if record.frozen {
            flags.push_str(" frozen");
        }
        if record.locked {
            flags.push_str(" locked");
        }
        output::info(&format!(
            "{:>6}  {:<24} color={:<3} linetype={}{}",
            id.to_string(),
            record.name,
            record.color,
            record.linetype,
            flags
        ));
    }
    Ok(())
}

fn config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let toml = container.settings.to_toml()?;
            output::info(&toml);
            Ok(())
        }
        ConfigCommands::Init => {
            let path = global_config_path().ok_or_else(|| {
                CliError::InvalidArgs("cannot determine config directory".to_string())
            })?;
            if path.exists() {
                output::warning(&format!("config already exists: {}", path.display()));
                return Ok(());
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CliError::from(ApplicationError::Config {
                        message: format!("create {}: {}", parent.display(), e),
                    })
                })?;
            }
            std::fs::write(&path, Settings::template()).map_err(|e| {
                CliError::from(ApplicationError::Config {
                    message: format!("write {}: {}", path.display(), e),
                })
            })?;
            output::action("created", &path.display());
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => {
                    let marker = if path.exists() { "" } else { " (not created)" };
                    output::info(&format!("{}{}", path.display(), marker));
                }
                None => output::warning("cannot determine config directory"),
            }
            Ok(())
        }
    }
}
