#![allow(dead_code)]

use async_trait::async_trait;
use novea_interfaces::*;
use novea_policy::PolicyEngine;
use novea_repository::{RepoResolver, RepoStore};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use url::Url;

#[derive(Default)]
pub struct MemoryFs {
    files: Mutex<BTreeMap<String, String>>,
    dirs: Mutex<BTreeSet<String>>,
}

#[async_trait]
impl FileSystem for MemoryFs {
    async fn list(&self, path: &str) -> Result<Vec<DirEntry>, FsError> {
        let prefix = format!("{}/", path);
        Ok(self
            .files
            .lock()
            .keys()
            .filter_map(|k| k.strip_prefix(&prefix))
            .filter(|rest| !rest.contains('/'))
            .map(|name| DirEntry {
                name: name.to_string(),
                is_file: true,
            })
            .collect())
    }

    async fn read_text(&self, path: &str) -> Result<String, FsError> {
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| FsError::NotFound(path.to_string()))
    }

    async fn write(&self, path: &str, content: &str) -> Result<(), FsError> {
        self.files
            .lock()
            .insert(path.to_string(), content.to_string());
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool, FsError> {
        Ok(self.dirs.lock().contains(path) || self.files.lock().contains_key(path))
    }

    async fn mkdir(&self, path: &str) -> Result<(), FsError> {
        self.dirs.lock().insert(path.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<String, Value>>,
    pub writes: Mutex<usize>,
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Result<Option<Value>, SettingsError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), SettingsError> {
        self.values.lock().insert(key.to_string(), value);
        *self.writes.lock() += 1;
        Ok(())
    }
}

#[derive(Default)]
pub struct MockFetch {
    responses: Mutex<HashMap<String, String>>,
    pub requested: Mutex<Vec<String>>,
}

impl MockFetch {
    pub fn respond(&self, url: &str, body: &str) {
        self.responses
            .lock()
            .insert(url.to_string(), body.to_string());
    }
}

#[async_trait]
impl HttpFetch for MockFetch {
    async fn fetch_text(&self, url: &Url) -> Result<String, NetError> {
        self.requested.lock().push(url.to_string());
        self.responses
            .lock()
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| NetError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

pub struct TagEncoder;

impl UrlEncoder for TagEncoder {
    fn encode(&self, url: &str) -> String {
        format!("enc:{}", url)
    }
}

#[derive(Default)]
pub struct RecordingInstaller {
    pub installs: Mutex<Vec<(InstallerKind, String)>>,
}

#[async_trait]
impl PackageInstaller for RecordingInstaller {
    async fn install(&self, kind: InstallerKind, reference: &str) -> Result<(), InstallError> {
        self.installs.lock().push((kind, reference.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notifications: Mutex<Vec<Notification>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) {
        self.notifications.lock().push(notification);
    }
}

pub struct Harness {
    pub fs: Arc<MemoryFs>,
    pub settings: Arc<MemorySettings>,
    pub fetch: Arc<MockFetch>,
    pub installer: Arc<RecordingInstaller>,
    pub notifier: Arc<RecordingNotifier>,
    pub policies: Arc<PolicyEngine>,
    pub store: RepoStore,
    pub resolver: RepoResolver,
}

impl Harness {
    pub fn new() -> Self {
        let fs = Arc::new(MemoryFs::default());
        let settings = Arc::new(MemorySettings::default());
        let fetch = Arc::new(MockFetch::default());
        let installer = Arc::new(RecordingInstaller::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let policies = Arc::new(PolicyEngine::new(fs.clone()));

        let store = RepoStore::new(settings.clone(), policies.clone(), notifier.clone());
        let resolver = RepoResolver::new(
            fetch.clone(),
            Arc::new(TagEncoder),
            installer.clone(),
            policies.clone(),
            notifier.clone(),
        );

        Self {
            fs,
            settings,
            fetch,
            installer,
            notifier,
            policies,
            store,
            resolver,
        }
    }

    /// A resolver sharing this harness's collaborators that re-checks the
    /// repository policy on install.
    pub fn enforcing_resolver(&self) -> RepoResolver {
        RepoResolver::new(
            self.fetch.clone(),
            Arc::new(TagEncoder),
            self.installer.clone(),
            self.policies.clone(),
            self.notifier.clone(),
        )
        .enforce_on_install(true)
    }

    pub async fn override_repo_policy(&self, file: &str, json: Value) {
        let doc = serde_json::from_value(json).unwrap();
        self.policies.set_policy("repo", file, &doc).await.unwrap();
    }
}
