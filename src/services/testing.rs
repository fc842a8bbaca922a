//! Fakes for the display server, the process table and delegates.

use crate::error::{Result, ScreenshotError};
use crate::model::{WindowGeometry, WindowId};
use crate::services::override_engine::{DelegateEnvironment, DelegateRunner};
use crate::services::process_resolver::{ProcessNode, ProcessTable};
use crate::services::window_locator::{PointerQuery, WindowSystem};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct FakeWindow {
    parent: Option<WindowId>,
    frame: WindowGeometry,
    pid: Option<u32>,
    name: Option<String>,
}

impl FakeWindow {
    pub fn new(parent: Option<WindowId>, x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            parent,
            frame: WindowGeometry { x, y, width, height },
            pid: None,
            name: None,
        }
    }

    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub struct FakeWindowSystem {
    root: WindowId,
    active: Option<WindowId>,
    pointer: PointerQuery,
    windows: HashMap<WindowId, FakeWindow>,
}

impl FakeWindowSystem {
    pub fn new(root: WindowId) -> Self {
        Self {
            root,
            active: None,
            pointer: PointerQuery { x: 0, y: 0, window: None },
            windows: HashMap::new(),
        }
    }

    pub fn with_window(mut self, id: WindowId, window: FakeWindow) -> Self {
        self.windows.insert(id, window);
        self
    }

    pub fn with_active(mut self, id: WindowId) -> Self {
        self.active = Some(id);
        self
    }

    pub fn with_pointer(mut self, x: i32, y: i32, window: Option<WindowId>) -> Self {
        self.pointer = PointerQuery { x, y, window };
        self
    }
}

impl WindowSystem for FakeWindowSystem {
    fn root(&self) -> WindowId {
        self.root
    }

    fn active_window(&self) -> Result<WindowId> {
        self.active
            .ok_or_else(|| ScreenshotError::Display("нет активного окна".to_string()))
    }

    fn pointer(&self) -> Result<PointerQuery> {
        Ok(self.pointer)
    }

    fn window_pid(&self, window: WindowId) -> Result<Option<u32>> {
        Ok(self.windows.get(&window).and_then(|w| w.pid))
    }

    fn window_name(&self, window: WindowId) -> Result<Option<String>> {
        Ok(self.windows.get(&window).and_then(|w| w.name.clone()))
    }

    fn frame(&self, window: WindowId) -> Result<WindowGeometry> {
        self.windows
            .get(&window)
            .map(|w| w.frame)
            .ok_or_else(|| ScreenshotError::Display(format!("BadWindow 0x{:x}", window)))
    }

    fn parent(&self, window: WindowId) -> Option<WindowId> {
        self.windows.get(&window).and_then(|w| w.parent)
    }
}

#[derive(Debug, Clone)]
pub struct FakeProcess {
    exe: PathBuf,
    cmdline: String,
    start_time: u64,
    parent: Option<u32>,
    env: HashMap<String, String>,
}

impl FakeProcess {
    pub fn new(exe: &str, start_time: u64) -> Self {
        Self {
            exe: PathBuf::from(exe),
            cmdline: exe.to_string(),
            start_time,
            parent: None,
            env: HashMap::new(),
        }
    }

    pub fn child_of(mut self, parent: u32) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_cmdline(mut self, cmdline: &str) -> Self {
        self.cmdline = cmdline.to_string();
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }
}

#[derive(Debug, Default)]
pub struct FakeProcessTable {
    processes: BTreeMap<u32, FakeProcess>,
    environment_reads: AtomicUsize,
}

impl FakeProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, pid: u32, process: FakeProcess) -> Self {
        self.processes.insert(pid, process);
        self
    }

    pub fn environment_reads(&self) -> usize {
        self.environment_reads.load(Ordering::Relaxed)
    }

    fn get(&self, pid: u32) -> Result<&FakeProcess> {
        self.processes
            .get(&pid)
            .ok_or_else(|| ScreenshotError::ProcessLookup(format!("pid {}", pid)))
    }
}

impl ProcessTable for FakeProcessTable {
    fn lookup(&self, pid: u32) -> Result<ProcessNode> {
        let process = self.get(pid)?;
        Ok(ProcessNode {
            pid,
            start_time: process.start_time,
        })
    }

    fn executable(&self, node: &ProcessNode) -> Result<PathBuf> {
        Ok(self.get(node.pid)?.exe.clone())
    }

    fn command_line(&self, node: &ProcessNode) -> Result<String> {
        Ok(self.get(node.pid)?.cmdline.clone())
    }

    fn children(&self, node: &ProcessNode) -> Result<Vec<ProcessNode>> {
        Ok(self
            .processes
            .iter()
            .filter(|(_, process)| process.parent == Some(node.pid))
            .map(|(&pid, process)| ProcessNode {
                pid,
                start_time: process.start_time,
            })
            .collect())
    }

    fn environment_value(&self, node: &ProcessNode, key: &str) -> Option<String> {
        self.environment_reads.fetch_add(1, Ordering::Relaxed);
        self.processes.get(&node.pid)?.env.get(key).cloned()
    }
}

/// Делегаты с заранее заданными ответами; неизвестный делегат отказывается
#[derive(Debug, Default)]
pub struct FakeDelegateRunner {
    answers: HashMap<PathBuf, Option<String>>,
    calls: Mutex<Vec<DelegateEnvironment>>,
}

impl FakeDelegateRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answering(mut self, delegate: &str, dir: &str) -> Self {
        self.answers.insert(PathBuf::from(delegate), Some(dir.to_string()));
        self
    }

    pub fn declining(mut self, delegate: &str) -> Self {
        self.answers.insert(PathBuf::from(delegate), None);
        self
    }

    /// Окружение, которое видел каждый вызов
    pub fn calls(&self) -> Vec<DelegateEnvironment> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

impl DelegateRunner for FakeDelegateRunner {
    fn run(&self, delegate: &Path, env: &DelegateEnvironment) -> Option<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(env.clone());
        }
        self.answers.get(delegate).cloned().flatten()
    }
}
