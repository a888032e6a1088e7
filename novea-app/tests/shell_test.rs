use async_trait::async_trait;
use novea_app::{boot, Shell, ShellConfig, INIT_DIR, STARTUP_KEY};
use novea_interfaces::{FileSystem, HttpFetch, NetError, SettingsStore};
use novea_policy::PolicyValue;
use novea_repository::{builtin_repos, AddOutcome, InstallOutcome, ProtocolType};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use url::Url;

struct OfflineFetch;

#[async_trait]
impl HttpFetch for OfflineFetch {
    async fn fetch_text(&self, url: &Url) -> Result<String, NetError> {
        Err(NetError::Request {
            url: url.to_string(),
            message: "offline".to_string(),
        })
    }
}

fn open_shell(dir: &TempDir) -> Shell {
    let config = ShellConfig {
        root_dir: dir.path().join("root"),
        settings_file: dir.path().join("settings.json"),
        spool_dir: dir.path().join("spool"),
        ..Default::default()
    };
    Shell::with_fetcher(config, Arc::new(OfflineFetch)).unwrap()
}

#[tokio::test]
async fn test_boot_on_fresh_root() {
    let dir = TempDir::new().unwrap();
    let shell = open_shell(&dir);

    let report = boot(&shell).await.unwrap();

    assert_eq!(report.repositories, builtin_repos().len());
    assert!(report.init_scripts.is_empty());
    assert!(report.started.is_empty());
    assert!(report.failed.is_empty());
}

#[tokio::test]
async fn test_boot_runs_init_scripts_and_startup() {
    let dir = TempDir::new().unwrap();
    let shell = open_shell(&dir);

    shell
        .fs
        .write(&format!("{}/10-motd.js", INIT_DIR), "console.log('hi')")
        .await
        .unwrap();
    shell
        .fs
        .write(&format!("{}/20-sync.js", INIT_DIR), "sync()")
        .await
        .unwrap();
    shell
        .fs
        .write(
            "/usr/apps/files/manifest.json",
            r#"{"name": "Files", "id": "files", "type": "app", "source": "index.html"}"#,
        )
        .await
        .unwrap();
    shell
        .settings
        .set(STARTUP_KEY, json!(["files", "missing"]))
        .unwrap();

    let report = boot(&shell).await.unwrap();

    let scripts: Vec<&str> = report
        .init_scripts
        .iter()
        .map(|(name, _)| name.as_str())
        .collect();
    assert_eq!(scripts, vec!["10-motd.js", "20-sync.js"]);
    assert_eq!(
        shell
            .processes
            .script(report.init_scripts[0].1)
            .await
            .unwrap()
            .as_deref(),
        Some("console.log('hi')")
    );

    assert_eq!(report.started.len(), 1);
    assert_eq!(report.started[0].0, "files");
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "missing");
}

#[tokio::test]
async fn test_boot_twice_keeps_one_copy_of_builtins() {
    let dir = TempDir::new().unwrap();
    let shell = open_shell(&dir);

    boot(&shell).await.unwrap();
    boot(&shell).await.unwrap();

    assert_eq!(shell.repos.list().unwrap().len(), builtin_repos().len());
}

#[tokio::test]
async fn test_settings_survive_restart() {
    let dir = TempDir::new().unwrap();
    {
        let shell = open_shell(&dir);
        let outcome = shell
            .repos
            .add_repo("https://apps.example.com/", ProtocolType::Novea)
            .await
            .unwrap();
        assert_eq!(outcome, AddOutcome::Added);
    }

    let shell = open_shell(&dir);
    let repos = shell.repos.list().unwrap();
    assert_eq!(repos.len(), 1);
    assert_eq!(repos[0].url, "https://apps.example.com/");
}

#[tokio::test]
async fn test_policy_override_on_disk_blocks_repo() {
    let dir = TempDir::new().unwrap();
    let shell = open_shell(&dir);
    shell.policies.get_policy("repo").await.unwrap();

    let doc = serde_json::from_value(json!({"denylist": ["apps.example.com"]})).unwrap();
    shell.policies.set_policy("repo", "user.json", &doc).await.unwrap();

    let effective = shell.policies.get_policy("repo").await.unwrap();
    assert_eq!(
        effective["denylist"],
        PolicyValue::from(json!(["apps.example.com"]))
    );
    assert!(
        shell
            .fs
            .exists("/usr/policies/repo/default.json")
            .await
            .unwrap()
    );

    let outcome = shell
        .repos
        .add_repo("https://apps.example.com/", ProtocolType::Novea)
        .await
        .unwrap();
    assert!(matches!(outcome, AddOutcome::Blocked(_)));
}

#[tokio::test]
async fn test_protocol_follows_registration() {
    let dir = TempDir::new().unwrap();
    let shell = open_shell(&dir);
    boot(&shell).await.unwrap();

    assert_eq!(
        shell.protocol_for("https://games.anura.pro", None).unwrap(),
        ProtocolType::Anura
    );
    assert_eq!(
        shell
            .protocol_for("https://repos.xen-os.dev/apps/", None)
            .unwrap(),
        ProtocolType::Xen
    );
    assert_eq!(
        shell
            .protocol_for("https://games.anura.pro", Some(ProtocolType::Novea))
            .unwrap(),
        ProtocolType::Novea
    );

    let err = shell
        .protocol_for("https://unknown.example/", None)
        .unwrap_err();
    assert!(err.to_string().contains("https://unknown.example/"));
}

#[tokio::test]
async fn test_enforcing_shell_blocks_install_from_denied_repo() {
    let dir = TempDir::new().unwrap();
    let config = ShellConfig {
        root_dir: dir.path().join("root"),
        settings_file: dir.path().join("settings.json"),
        spool_dir: dir.path().join("spool"),
        enforce_policy_on_install: true,
        ..Default::default()
    };
    let shell = Shell::with_fetcher(config, Arc::new(OfflineFetch)).unwrap();
    let doc = serde_json::from_value(json!({"denylist": ["repos.example.com"]})).unwrap();
    shell.policies.set_policy("repo", "user.json", &doc).await.unwrap();

    let outcome = shell
        .resolver
        .install(
            "https://repos.example.com/apps/",
            "calc",
            ProtocolType::Xen,
            None,
        )
        .await
        .unwrap();

    assert!(matches!(outcome, InstallOutcome::Blocked(_)));
    assert!(shell.installer.pending().await.unwrap().is_empty());
}
