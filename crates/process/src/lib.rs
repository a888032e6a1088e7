//! In-memory process table for the shell.

use async_trait::async_trait;
use novea_interfaces::{
    Payload, Pid, ProcessContext, ProcessSpawner, ProgramError, SpawnError, SpawnOptions,
    WindowId,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum ProcessKind {
    Script,
    Program,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub enum ProcessStatus {
    Running,
    Exited,
    Failed,
    Killed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessInfo {
    pub pid: Pid,
    pub kind: ProcessKind,
    pub name: String,
    pub status: ProcessStatus,
    pub windows: Vec<WindowId>,
    pub started_at: i64,
    pub updated_at: i64,
    pub error: Option<String>,
}

struct ProcessEntry {
    info: ProcessInfo,
    source: Option<String>,
    handle: Option<JoinHandle<Result<(), ProgramError>>>,
}

/// Supervises spawned processes and the windows they own.
///
/// Scripts are recorded and their text kept for the host interpreter, and
/// stay `Running` until killed. Programs run on their own tokio task.
/// Finished entries stay listed until [`ProcessTable::reap`] removes them.
pub struct ProcessTable {
    next_pid: AtomicU32,
    processes: Arc<RwLock<HashMap<Pid, Arc<Mutex<ProcessEntry>>>>>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self {
            next_pid: AtomicU32::new(1),
            processes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn status(&self, pid: Pid) -> Result<ProcessInfo, SpawnError> {
        let entry = self.entry(pid).await?;
        let mut guard = entry.lock().await;
        Self::refresh(&mut guard).await;
        Ok(guard.info.clone())
    }

    /// Script text of a `Script` process.
    pub async fn script(&self, pid: Pid) -> Result<Option<String>, SpawnError> {
        let entry = self.entry(pid).await?;
        let guard = entry.lock().await;
        Ok(guard.source.clone())
    }

    pub async fn list(&self) -> Vec<ProcessInfo> {
        let processes = self.processes.read().await;
        let mut result = Vec::with_capacity(processes.len());

        for entry in processes.values() {
            let mut guard = entry.lock().await;
            Self::refresh(&mut guard).await;
            result.push(guard.info.clone());
        }

        result.sort_by_key(|info| info.pid);
        result
    }

    /// Drop every process that is no longer running and return what was
    /// removed, ordered by pid.
    pub async fn reap(&self) -> Vec<ProcessInfo> {
        let mut processes = self.processes.write().await;
        let mut finished = Vec::new();

        for (pid, entry) in processes.iter() {
            let mut guard = entry.lock().await;
            Self::refresh(&mut guard).await;
            if guard.info.status != ProcessStatus::Running {
                finished.push((*pid, guard.info.clone()));
            }
        }

        for (pid, _) in &finished {
            processes.remove(pid);
        }

        let mut reaped: Vec<ProcessInfo> = finished.into_iter().map(|(_, info)| info).collect();
        reaped.sort_by_key(|info| info.pid);
        if !reaped.is_empty() {
            tracing::debug!("Reaped {} finished processes", reaped.len());
        }
        reaped
    }

    async fn entry(&self, pid: Pid) -> Result<Arc<Mutex<ProcessEntry>>, SpawnError> {
        let processes = self.processes.read().await;
        processes
            .get(&pid)
            .cloned()
            .ok_or(SpawnError::NoSuchProcess(pid))
    }

    // Collect the result of a finished program.
    async fn refresh(entry: &mut ProcessEntry) {
        let finished = entry
            .handle
            .as_ref()
            .map(|handle| handle.is_finished())
            .unwrap_or(false);
        if !finished {
            return;
        }

        let Some(handle) = entry.handle.take() else {
            return;
        };

        match handle.await {
            Ok(Ok(())) => entry.info.status = ProcessStatus::Exited,
            Ok(Err(e)) => {
                entry.info.status = ProcessStatus::Failed;
                entry.info.error = Some(e.to_string());
            }
            Err(e) => {
                entry.info.status = ProcessStatus::Failed;
                entry.info.error = Some(e.to_string());
            }
        }
        entry.info.updated_at = chrono::Utc::now().timestamp();
    }
}

impl Default for ProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessSpawner for ProcessTable {
    async fn spawn(&self, payload: Payload, options: SpawnOptions) -> Result<Pid, SpawnError> {
        let pid = Pid(self.next_pid.fetch_add(1, Ordering::SeqCst));
        let now = chrono::Utc::now().timestamp();

        let (kind, name, source, program) = match payload {
            Payload::Script(source) => (ProcessKind::Script, "script".to_string(), Some(source), None),
            Payload::Program(program) => {
                (ProcessKind::Program, program.name().to_string(), None, Some(program))
            }
        };

        let entry = Arc::new(Mutex::new(ProcessEntry {
            info: ProcessInfo {
                pid,
                kind,
                name,
                status: ProcessStatus::Running,
                windows: Vec::new(),
                started_at: now,
                updated_at: now,
                error: None,
            },
            source,
            handle: None,
        }));

        // Registered before the program starts so it can reach its own entry.
        self.processes.write().await.insert(pid, entry.clone());

        if let Some(program) = program {
            let ctx = ProcessContext { pid };
            let handle = tokio::spawn(program.run(ctx));
            let mut guard = entry.lock().await;
            if guard.info.status == ProcessStatus::Killed {
                handle.abort();
            } else {
                guard.handle = Some(handle);
            }
        }

        tracing::info!(
            "Spawned process {} ({:?}, async={})",
            pid,
            kind,
            options.asynchronous
        );
        Ok(pid)
    }

    async fn kill(&self, pid: Pid) -> Result<(), SpawnError> {
        let entry = self.entry(pid).await?;
        let mut guard = entry.lock().await;

        if let Some(handle) = guard.handle.take() {
            handle.abort();
        }
        if guard.info.status == ProcessStatus::Running {
            guard.info.status = ProcessStatus::Killed;
            guard.info.updated_at = chrono::Utc::now().timestamp();
            tracing::info!("Killed process {}", pid);
        }

        Ok(())
    }

    async fn associate_window(&self, pid: Pid, window: WindowId) -> Result<(), SpawnError> {
        let entry = self.entry(pid).await?;
        let mut guard = entry.lock().await;

        if !guard.info.windows.contains(&window) {
            guard.info.windows.push(window);
        }
        tracing::debug!("Window {} associated with process {}", window, pid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use novea_interfaces::Program;
    use tokio::time::{sleep, Duration};

    struct Sleeper(u64);

    #[async_trait]
    impl Program for Sleeper {
        fn name(&self) -> &str {
            "sleeper"
        }

        async fn run(self: Box<Self>, _ctx: ProcessContext) -> Result<(), ProgramError> {
            sleep(Duration::from_millis(self.0)).await;
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl Program for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn run(self: Box<Self>, ctx: ProcessContext) -> Result<(), ProgramError> {
            Err(SpawnError::Rejected(format!("pid {}", ctx.pid)).into())
        }
    }

    #[tokio::test]
    async fn test_pids_are_sequential() {
        let table = ProcessTable::new();
        let a = table
            .spawn(Payload::Script("a()".into()), SpawnOptions::direct())
            .await
            .unwrap();
        let b = table
            .spawn(Payload::Script("b()".into()), SpawnOptions::direct())
            .await
            .unwrap();

        assert_eq!(a, Pid(1));
        assert_eq!(b, Pid(2));
        assert_eq!(table.script(b).await.unwrap(), Some("b()".to_string()));
        assert_eq!(table.list().await.len(), 2);
    }

    #[tokio::test]
    async fn test_program_exits() {
        let table = ProcessTable::new();
        let pid = table
            .spawn(Payload::Program(Box::new(Sleeper(5))), SpawnOptions::direct())
            .await
            .unwrap();

        sleep(Duration::from_millis(50)).await;

        let info = table.status(pid).await.unwrap();
        assert_eq!(info.status, ProcessStatus::Exited);
        assert_eq!(info.name, "sleeper");
    }

    #[tokio::test]
    async fn test_program_failure_recorded() {
        let table = ProcessTable::new();
        let pid = table
            .spawn(Payload::Program(Box::new(Failing)), SpawnOptions::direct())
            .await
            .unwrap();

        sleep(Duration::from_millis(20)).await;

        let info = table.status(pid).await.unwrap();
        assert_eq!(info.status, ProcessStatus::Failed);
        assert!(info.error.unwrap().contains("pid 1"));
    }

    #[tokio::test]
    async fn test_kill_running_program() {
        let table = ProcessTable::new();
        let pid = table
            .spawn(Payload::Program(Box::new(Sleeper(10_000))), SpawnOptions::direct())
            .await
            .unwrap();

        table.kill(pid).await.unwrap();
        assert_eq!(table.status(pid).await.unwrap().status, ProcessStatus::Killed);

        // Killing twice is harmless.
        table.kill(pid).await.unwrap();
    }

    #[tokio::test]
    async fn test_reap_removes_finished_processes() {
        let table = ProcessTable::new();
        let script = table
            .spawn(Payload::Script("loop()".into()), SpawnOptions::direct())
            .await
            .unwrap();
        let exited = table
            .spawn(Payload::Program(Box::new(Sleeper(1))), SpawnOptions::direct())
            .await
            .unwrap();
        let killed = table
            .spawn(Payload::Program(Box::new(Sleeper(10_000))), SpawnOptions::direct())
            .await
            .unwrap();
        table.kill(killed).await.unwrap();

        sleep(Duration::from_millis(50)).await;

        let reaped: Vec<Pid> = table.reap().await.iter().map(|info| info.pid).collect();
        assert_eq!(reaped, vec![exited, killed]);

        let remaining = table.list().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].pid, script);
        assert!(matches!(
            table.status(exited).await,
            Err(SpawnError::NoSuchProcess(_))
        ));
        assert!(table.reap().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_pid() {
        let table = ProcessTable::new();
        assert!(matches!(
            table.kill(Pid(42)).await,
            Err(SpawnError::NoSuchProcess(Pid(42)))
        ));
        assert!(matches!(
            table.associate_window(Pid(42), WindowId(1)).await,
            Err(SpawnError::NoSuchProcess(_))
        ));
    }

    #[tokio::test]
    async fn test_associate_window_once() {
        let table = ProcessTable::new();
        let pid = table
            .spawn(Payload::Script(String::new()), SpawnOptions::direct())
            .await
            .unwrap();

        table.associate_window(pid, WindowId(7)).await.unwrap();
        table.associate_window(pid, WindowId(7)).await.unwrap();

        assert_eq!(table.status(pid).await.unwrap().windows, vec![WindowId(7)]);
    }
}
