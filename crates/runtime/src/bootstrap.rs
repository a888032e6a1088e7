use async_trait::async_trait;
use novea_interfaces::{
    CloseObserver, Pid, ProcessContext, ProcessSpawner, Program, ProgramError, WindowManager,
    WindowSpec,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Program run by an app or webview process: opens its window and, when
/// launched on behalf of another process, ties that process to the window.
pub struct WindowBootstrap {
    spec: WindowSpec,
    caller: Option<Pid>,
    windows: Arc<dyn WindowManager>,
    spawner: Arc<dyn ProcessSpawner>,
}

impl WindowBootstrap {
    pub fn new(
        spec: WindowSpec,
        caller: Option<Pid>,
        windows: Arc<dyn WindowManager>,
        spawner: Arc<dyn ProcessSpawner>,
    ) -> Self {
        Self {
            spec,
            caller,
            windows,
            spawner,
        }
    }
}

#[async_trait]
impl Program for WindowBootstrap {
    fn name(&self) -> &str {
        "window-bootstrap"
    }

    async fn run(self: Box<Self>, ctx: ProcessContext) -> Result<(), ProgramError> {
        let Self {
            spec,
            caller,
            windows,
            spawner,
        } = *self;

        let title = spec.title.clone();
        let window = windows.create(spec).await?;
        info!("Process {} opened window {} ({})", ctx.pid, window, title);

        let Some(owner) = caller else {
            return Ok(());
        };

        spawner.associate_window(owner, window).await?;
        windows.on_close(window, kill_on_close(owner, spawner))?;
        Ok(())
    }
}

// Killing happens on a later turn of the scheduler so the window manager
// finishes its close bookkeeping first.
fn kill_on_close(owner: Pid, spawner: Arc<dyn ProcessSpawner>) -> CloseObserver {
    Box::new(move |window| {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(
                "Window {} closed outside the runtime; process {} left running",
                window, owner
            );
            return;
        };

        handle.spawn(async move {
            tokio::task::yield_now().await;
            if let Err(e) = spawner.kill(owner).await {
                warn!("Failed to kill process {} after window {} closed: {}", owner, window, e);
            }
        });
    })
}
