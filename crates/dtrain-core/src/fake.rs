//! In-memory stand-ins for the process, probe, coordinator and descriptor seams.
use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use dtrain_model::{ClusterDescriptor, CommandLine, ExitCode, LaunchEnv, RendezvousInfo};
use tempfile::TempDir;

use crate::{
    BoxedHandle, ClusterSource, Coordinator, Deadline, LaunchConfig, LaunchError, ProcessHandle,
    ProcessSpawner, ReadinessProbe,
};

pub fn descriptor(addrs: &[&str], rank: usize) -> ClusterDescriptor {
    ClusterDescriptor {
        master_url: "localhost".into(),
        cluster_id: "clusterId".into(),
        agent_id: "agentId".into(),
        slot_ids: vec![0, 1, 2, 3],
        task_id: "taskId".into(),
        allocation_id: "allocationId".into(),
        session_token: "sessionToken".into(),
        task_type: "TRIAL".into(),
        rendezvous: RendezvousInfo::new(addrs.iter().copied(), rank),
    }
}

/// Temporary directory removed when the returned guard drops; keep it alive for the whole test.
pub fn scratch_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Config whose generated files land inside `dir`.
pub fn test_config(dir: &TempDir) -> LaunchConfig {
    LaunchConfig {
        hostfile_path: dir.path().join("hostfile.txt"),
        runtime_env_path: dir.path().join(".deepspeed_env"),
        resources_id: Some("containerId".into()),
        ..Default::default()
    }
}

#[derive(Debug, Default)]
pub struct HandleLog {
    kills: AtomicUsize,
    waits: AtomicUsize,
    start_kills: AtomicUsize,
}

impl HandleLog {
    pub fn kills(&self) -> usize {
        self.kills.load(Ordering::SeqCst)
    }
    pub fn waits(&self) -> usize {
        self.waits.load(Ordering::SeqCst)
    }
    pub fn start_kills(&self) -> usize {
        self.start_kills.load(Ordering::SeqCst)
    }
}

pub struct FakeHandle {
    exit_code: ExitCode,
    fail_kill: bool,
    fail_wait: bool,
    log: Arc<HandleLog>,
}

impl FakeHandle {
    pub fn new(exit_code: ExitCode) -> (Self, Arc<HandleLog>) {
        let log = Arc::new(HandleLog::default());
        let handle = Self {
            exit_code,
            fail_kill: false,
            fail_wait: false,
            log: log.clone(),
        };
        (handle, log)
    }

    pub fn with_failing_kill(mut self) -> Self {
        self.fail_kill = true;
        self
    }

    pub fn with_failing_wait(mut self) -> Self {
        self.fail_wait = true;
        self
    }
}

#[async_trait]
impl ProcessHandle for FakeHandle {
    async fn wait(&mut self) -> Result<ExitCode, LaunchError> {
        self.log.waits.fetch_add(1, Ordering::SeqCst);
        if self.fail_wait {
            return Err(LaunchError::Wait("fake wait failure".into()));
        }
        Ok(self.exit_code)
    }

    async fn kill(&mut self) -> Result<(), LaunchError> {
        self.log.kills.fetch_add(1, Ordering::SeqCst);
        if self.fail_kill {
            return Err(LaunchError::Kill("fake kill failure".into()));
        }
        Ok(())
    }

    fn start_kill(&mut self) -> Result<(), LaunchError> {
        self.log.start_kills.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Clone)]
pub struct Spawned {
    pub cmd: CommandLine,
    pub env: LaunchEnv,
    pub log: Arc<HandleLog>,
}

/// Records every spawn; exit codes and failures are scripted per command line.
#[derive(Default)]
pub struct FakeSpawner {
    spawned: Mutex<Vec<Spawned>>,
    exit_codes: HashMap<CommandLine, ExitCode>,
    fail_spawn: HashSet<CommandLine>,
    fail_wait: HashSet<CommandLine>,
}

impl FakeSpawner {
    pub fn exit_code_of(mut self, cmd: CommandLine, code: ExitCode) -> Self {
        self.exit_codes.insert(cmd, code);
        self
    }

    pub fn fail_spawn_of(mut self, cmd: CommandLine) -> Self {
        self.fail_spawn.insert(cmd);
        self
    }

    pub fn fail_wait_of(mut self, cmd: CommandLine) -> Self {
        self.fail_wait.insert(cmd);
        self
    }

    pub fn spawned(&self) -> Vec<Spawned> {
        self.spawned.lock().unwrap().clone()
    }

    pub fn spawned_of(&self, cmd: &CommandLine) -> Vec<Spawned> {
        self.spawned()
            .into_iter()
            .filter(|s| &s.cmd == cmd)
            .collect()
    }
}

#[async_trait]
impl ProcessSpawner for FakeSpawner {
    async fn spawn(&self, cmd: &CommandLine, env: &LaunchEnv) -> Result<BoxedHandle, LaunchError> {
        if self.fail_spawn.contains(cmd) {
            return Err(LaunchError::Spawn(format!("fake spawn failure: {cmd}")));
        }
        let (mut handle, log) = FakeHandle::new(self.exit_codes.get(cmd).copied().unwrap_or(0));
        handle.fail_wait = self.fail_wait.contains(cmd);

        self.spawned.lock().unwrap().push(Spawned {
            cmd: cmd.clone(),
            env: env.clone(),
            log,
        });
        Ok(Box::new(handle))
    }
}

/// Records `(addr, deadline, port)` per check; fails with a connectivity error on one address.
#[derive(Default)]
pub struct FakeProbe {
    calls: Mutex<Vec<(String, Deadline, u16)>>,
    fail_on: Option<String>,
}

impl FakeProbe {
    pub fn failing_on(addr: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: Some(addr.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Deadline, u16)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReadinessProbe for FakeProbe {
    async fn check(&self, addr: &str, deadline: Deadline, port: u16) -> Result<(), LaunchError> {
        self.calls
            .lock()
            .unwrap()
            .push((addr.to_string(), deadline, port));
        if self.fail_on.as_deref() == Some(addr) {
            return Err(LaunchError::Connectivity {
                addr: addr.to_string(),
                port,
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeCoordinator {
    calls: AtomicUsize,
    last_resources_id: Mutex<Option<String>>,
    fail: bool,
}

impl FakeCoordinator {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_resources_id(&self) -> Option<String> {
        self.last_resources_id.lock().unwrap().clone()
    }
}

#[async_trait]
impl Coordinator for FakeCoordinator {
    async fn notify_daemon_ready(
        &self,
        _descriptor: &ClusterDescriptor,
        resources_id: &str,
    ) -> Result<(), LaunchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_resources_id.lock().unwrap() = Some(resources_id.to_string());
        if self.fail {
            return Err(LaunchError::Coordination("fake: 503 Service Unavailable".into()));
        }
        Ok(())
    }
}

pub struct FakeSource {
    descriptor: ClusterDescriptor,
    loads: AtomicUsize,
}

impl FakeSource {
    pub fn new(descriptor: ClusterDescriptor) -> Self {
        Self {
            descriptor,
            loads: AtomicUsize::new(0),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ClusterSource for FakeSource {
    fn load(&self) -> Result<ClusterDescriptor, LaunchError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.descriptor.validate()?;
        Ok(self.descriptor.clone())
    }
}
