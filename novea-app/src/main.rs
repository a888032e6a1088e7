use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use novea_app::{boot, Shell, ShellConfig};
use novea_process::{ProcessKind, ProcessStatus};
use novea_repository::{AddOutcome, InstallOutcome, MatchKey, PackageList, ProtocolType};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "novea", version, about = "Novea shell package runtime")]
struct Cli {
    /// Shell configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize repositories, run init scripts and open startup packages.
    Boot,
    /// Manage and browse package repositories.
    Repo {
        #[command(subcommand)]
        command: RepoCommand,
    },
    /// Install a package from a repository.
    Install {
        repo: String,
        id: String,
        /// Defaults to the type the repository was registered with.
        #[arg(long = "type")]
        protocol: Option<ProtocolType>,
        /// Match anura listings by `id` or `name`.
        #[arg(long = "match")]
        match_key: Option<MatchKey>,
    },
    /// Inspect or override policy documents.
    Policy {
        #[command(subcommand)]
        command: PolicyCommand,
    },
    /// Open an installed package.
    Launch {
        id: String,
        /// Launch argument as key=value; repeatable.
        #[arg(long = "arg", value_parser = parse_arg)]
        args: Vec<(String, String)>,
    },
    /// List installed apps.
    Apps,
}

#[derive(Subcommand, Debug)]
enum RepoCommand {
    List,
    Add {
        url: String,
        #[arg(long = "type", default_value = "novea")]
        protocol: ProtocolType,
    },
    Remove {
        url: String,
    },
    Packages {
        url: String,
        /// Defaults to the type the repository was registered with.
        #[arg(long = "type")]
        protocol: Option<ProtocolType>,
    },
    Manifest {
        url: String,
    },
    Package {
        url: String,
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum PolicyCommand {
    /// Print the effective policy of a domain.
    Show { domain: String },
    /// Write a policy document into a domain.
    Set {
        domain: String,
        file: String,
        /// JSON object.
        json: String,
    },
}

fn parse_arg(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got {}", raw))
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ShellConfig::load(cli.config.as_deref())?;
    init_tracing(&config.log_level);

    let shell = Shell::open(config)?;

    match cli.command {
        Command::Boot => {
            let report = boot(&shell).await?;
            println!("✅ {} repositories", report.repositories);
            for (name, pid) in &report.init_scripts {
                println!("  init  {} (pid {})", name, pid);
            }
            for (id, pid) in &report.started {
                println!("  start {} (pid {})", id, pid);
            }
            for (what, reason) in &report.failed {
                println!("  ✗ {}: {}", what, reason);
            }
            settle(&shell).await;
            print_windows(&shell);
        }
        Command::Repo { command } => repo(&shell, command).await?,
        Command::Install {
            repo,
            id,
            protocol,
            match_key,
        } => match shell
            .resolver
            .install(&repo, &id, shell.protocol_for(&repo, protocol)?, match_key)
            .await?
        {
            InstallOutcome::Installed(artifact) => {
                println!("✅ Queued {} from {}", id, artifact.url)
            }
            InstallOutcome::Blocked(reason) => println!("⛔ Blocked: {}", reason),
        },
        Command::Policy { command } => policy(&shell, command).await?,
        Command::Launch { id, args } => {
            let pid = shell.packages.open(&id, &args, None).await?;
            println!("✅ {} running as process {}", id, pid);
            settle(&shell).await;
            print_windows(&shell);
        }
        Command::Apps => {
            for id in shell.packages.list().await? {
                println!("{}", id);
            }
        }
    }

    Ok(())
}

async fn repo(shell: &Shell, command: RepoCommand) -> Result<()> {
    match command {
        RepoCommand::List => {
            for entry in shell.repos.list()? {
                println!("{:<6} {}", entry.protocol, entry.url);
            }
        }
        RepoCommand::Add { url, protocol } => match shell.repos.add_repo(&url, protocol).await? {
            AddOutcome::Added => println!("✅ Added {}", url),
            AddOutcome::Blocked(reason) => println!("⛔ Blocked: {}", reason),
        },
        RepoCommand::Remove { url } => {
            shell.repos.remove_repo(&url).await?;
            println!("✅ Removed {}", url);
        }
        RepoCommand::Packages { url, protocol } => {
            let protocol = shell.protocol_for(&url, protocol)?;
            match shell.resolver.list_packages(&url, protocol).await? {
                PackageList::Ids(ids) => ids.iter().for_each(|id| println!("{}", id)),
                PackageList::Listing(listing) => {
                    for entry in listing.apps.iter().chain(listing.libs.iter()) {
                        println!("{:<24} {}", entry.package, entry.name);
                    }
                }
            }
        }
        RepoCommand::Manifest { url } => {
            let manifest = shell.resolver.get_manifest(&url).await?;
            println!("{}", serde_json::to_string_pretty(&manifest)?);
        }
        RepoCommand::Package { url, id } => {
            let package = shell.resolver.get_package(&url, &id).await?;
            println!("{}", serde_json::to_string_pretty(&package)?);
        }
    }
    Ok(())
}

async fn policy(shell: &Shell, command: PolicyCommand) -> Result<()> {
    match command {
        PolicyCommand::Show { domain } => {
            let doc = shell.policies.get_policy(&domain).await?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        PolicyCommand::Set { domain, file, json } => {
            let doc = serde_json::from_str(&json).context("Policy must be a JSON object")?;
            shell.policies.set_policy(&domain, &file, &doc).await?;
            println!("✅ Wrote {}/{}", domain, file);
        }
    }
    Ok(())
}

// Give window bootstraps a moment to finish, then report the ones that
// failed and drop finished entries.
async fn settle(shell: &Shell) {
    for _ in 0..50 {
        let pending = shell.processes.list().await.iter().any(|p| {
            p.kind == ProcessKind::Program && p.status == ProcessStatus::Running
        });
        if !pending {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    for info in shell.processes.reap().await {
        if let Some(error) = info.error {
            println!("  ✗ process {} ({}): {}", info.pid, info.name, error);
        }
    }
}

fn print_windows(shell: &Shell) {
    for (id, spec) in shell.windows.list() {
        println!(
            "  window {} \"{}\" {}x{} {}",
            id, spec.title, spec.width, spec.height, spec.url
        );
    }
}
