use crate::shell::Shell;
use anyhow::{Context, Result};
use novea_interfaces::{FileSystem, Payload, Pid, ProcessSpawner, SettingsStore, SpawnOptions};
use serde_json::Value;

pub const INIT_DIR: &str = "/usr/init";
pub const STARTUP_KEY: &str = "startup";

#[derive(Debug, Default)]
pub struct BootReport {
    pub repositories: usize,
    /// Init scripts in the order they were started.
    pub init_scripts: Vec<(String, Pid)>,
    /// Startup packages that were opened.
    pub started: Vec<(String, Pid)>,
    /// Init scripts and startup packages that failed, with the reason.
    pub failed: Vec<(String, String)>,
}

/// Bring the shell up: repositories, then init scripts, then startup apps.
///
/// Only a repository failure aborts boot. A broken init script or startup
/// package is logged and recorded in the report.
pub async fn boot(shell: &Shell) -> Result<BootReport> {
    let mut report = BootReport::default();

    let repos = shell
        .repos
        .init()
        .await
        .context("Failed to initialize repositories")?;
    report.repositories = repos.len();

    run_init_scripts(shell, &mut report).await?;
    open_startup_packages(shell, &mut report).await?;

    tracing::info!(
        "Boot complete: {} init scripts, {} startup packages, {} failures",
        report.init_scripts.len(),
        report.started.len(),
        report.failed.len()
    );
    Ok(report)
}

async fn run_init_scripts(shell: &Shell, report: &mut BootReport) -> Result<()> {
    if !shell.fs.exists(INIT_DIR).await? {
        tracing::debug!("No {} directory, skipping init scripts", INIT_DIR);
        return Ok(());
    }

    for entry in shell.fs.list(INIT_DIR).await? {
        if !entry.is_file {
            continue;
        }

        let path = format!("{}/{}", INIT_DIR, entry.name);
        let result = match shell.fs.read_text(&path).await {
            Ok(source) => shell
                .processes
                .spawn(Payload::Script(source), SpawnOptions::direct())
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match result {
            Ok(pid) => {
                tracing::info!("Started init script {} as process {}", path, pid);
                report.init_scripts.push((entry.name, pid));
            }
            Err(e) => {
                tracing::warn!("Init script {} failed: {}", path, e);
                report.failed.push((path, e));
            }
        }
    }

    Ok(())
}

async fn open_startup_packages(shell: &Shell, report: &mut BootReport) -> Result<()> {
    for id in startup_ids(shell.settings.get(STARTUP_KEY)?) {
        match shell.packages.open(&id, &[], None).await {
            Ok(pid) => report.started.push((id, pid)),
            Err(e) => {
                tracing::warn!("Startup package {} failed to open: {}", id, e);
                report.failed.push((id, e.to_string()));
            }
        }
    }
    Ok(())
}

fn startup_ids(value: Option<Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(id) => Some(id),
            other => {
                tracing::warn!("Ignoring non-string startup entry {}", other);
                None
            }
        })
        .collect()
}
