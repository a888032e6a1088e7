//! Headless window table: tracks open windows and their close observers.

use async_trait::async_trait;
use novea_interfaces::{CloseObserver, WindowError, WindowId, WindowManager, WindowSpec};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

struct OpenWindow {
    spec: WindowSpec,
    observers: Vec<CloseObserver>,
}

pub struct WindowTable {
    next_id: AtomicU64,
    windows: Mutex<BTreeMap<WindowId, OpenWindow>>,
}

impl WindowTable {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            windows: Mutex::new(BTreeMap::new()),
        }
    }

    /// Open windows in creation order.
    pub fn list(&self) -> Vec<(WindowId, WindowSpec)> {
        self.windows
            .lock()
            .iter()
            .map(|(id, window)| (*id, window.spec.clone()))
            .collect()
    }

    pub fn observer_count(&self, window: WindowId) -> usize {
        self.windows
            .lock()
            .get(&window)
            .map(|w| w.observers.len())
            .unwrap_or(0)
    }

    /// Close `window` and fire its observers once each.
    pub fn close(&self, window: WindowId) -> Result<(), WindowError> {
        // Observers run outside the lock so they may touch the table.
        let closed = self
            .windows
            .lock()
            .remove(&window)
            .ok_or(WindowError::NotFound(window))?;

        tracing::info!("Closed window {} ({})", window, closed.spec.title);
        for observer in closed.observers {
            observer(window);
        }
        Ok(())
    }
}

impl Default for WindowTable {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WindowManager for WindowTable {
    async fn create(&self, spec: WindowSpec) -> Result<WindowId, WindowError> {
        if spec.url.trim().is_empty() {
            return Err(WindowError::CreationFailed("window url is empty".to_string()));
        }

        let id = WindowId(self.next_id.fetch_add(1, Ordering::SeqCst));
        tracing::info!(
            "Created window {} \"{}\" {}x{} -> {}",
            id,
            spec.title,
            spec.width,
            spec.height,
            spec.url
        );

        self.windows.lock().insert(
            id,
            OpenWindow {
                spec,
                observers: Vec::new(),
            },
        );
        Ok(id)
    }

    fn on_close(&self, window: WindowId, observer: CloseObserver) -> Result<(), WindowError> {
        let mut windows = self.windows.lock();
        let open = windows
            .get_mut(&window)
            .ok_or(WindowError::NotFound(window))?;
        open.observers.push(observer);
        Ok(())
    }
}
