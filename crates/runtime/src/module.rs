use async_trait::async_trait;
use novea_interfaces::{BlobUrl, LoadedModule, ModuleError, ModuleLoader};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

pub const JS_MIME: &str = "application/javascript";

const BLOB_SCHEME: &str = "blob:novea/";

struct Blob {
    mime: String,
    source: String,
}

/// In-memory blob store backing library imports.
#[derive(Default)]
pub struct BlobModuleLoader {
    blobs: Mutex<HashMap<String, Blob>>,
}

impl BlobModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blobs created and not yet revoked.
    pub fn live_blobs(&self) -> usize {
        self.blobs.lock().len()
    }
}

#[async_trait]
impl ModuleLoader for BlobModuleLoader {
    fn create_blob(&self, source: String, mime: &str) -> BlobUrl {
        let url = format!("{}{}", BLOB_SCHEME, Uuid::new_v4());
        self.blobs.lock().insert(
            url.clone(),
            Blob {
                mime: mime.to_string(),
                source,
            },
        );
        debug!("Created blob {}", url);
        BlobUrl(url)
    }

    fn revoke(&self, blob: &BlobUrl) {
        if self.blobs.lock().remove(&blob.0).is_some() {
            debug!("Revoked blob {}", blob);
        }
    }

    async fn load(&self, blob: &BlobUrl) -> Result<LoadedModule, ModuleError> {
        let source = {
            let blobs = self.blobs.lock();
            let entry = blobs
                .get(&blob.0)
                .ok_or_else(|| ModuleError::UnknownBlob(blob.0.clone()))?;
            if entry.mime != JS_MIME {
                return Err(ModuleError::Evaluation(format!(
                    "unsupported module type {}",
                    entry.mime
                )));
            }
            entry.source.clone()
        };

        Ok(LoadedModule {
            specifier: blob.0.clone(),
            exports: scan_exports(&source),
            source,
        })
    }
}

/// Revokes its blob when dropped, whether or not the load succeeded.
pub struct BlobGuard<'a> {
    loader: &'a dyn ModuleLoader,
    url: BlobUrl,
}

impl<'a> BlobGuard<'a> {
    pub fn new(loader: &'a dyn ModuleLoader, source: String, mime: &str) -> Self {
        let url = loader.create_blob(source, mime);
        Self { loader, url }
    }

    pub fn url(&self) -> &BlobUrl {
        &self.url
    }
}

impl Drop for BlobGuard<'_> {
    fn drop(&mut self) {
        self.loader.revoke(&self.url);
    }
}

/// Names exported by top-level `export` statements.
fn scan_exports(source: &str) -> Vec<String> {
    let mut exports = Vec::new();

    for line in source.lines() {
        let Some(rest) = line.trim_start().strip_prefix("export ") else {
            continue;
        };
        let mut words = rest
            .split(|c: char| c.is_whitespace() || c == '(' || c == '=' || c == '{' || c == ';')
            .filter(|w| !w.is_empty());

        let name = match words.next() {
            Some("default") => Some("default"),
            Some("async") => words.nth(1),
            Some("function") | Some("function*") | Some("class") | Some("const")
            | Some("let") | Some("var") => words.next(),
            _ => None,
        };

        if let Some(name) = name {
            let name = name.trim_start_matches('*').to_string();
            if !name.is_empty() && !exports.contains(&name) {
                exports.push(name);
            }
        }
    }

    exports
}
