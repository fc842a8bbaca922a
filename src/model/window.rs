use serde::{Deserialize, Serialize};
use std::fmt;

/// Идентификатор окна X11
pub type WindowId = u32;

/// Окно, для которого ищется приложение.
///
/// Создаётся один раз за запуск и дальше не меняется. `pid` берётся из
/// `_NET_WM_PID`; имя окна читается только когда pid отсутствует.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetWindow {
    pub id: WindowId,
    pub pid: Option<u32>,
    pub name: Option<String>,
}

impl TargetWindow {
    pub fn new(id: WindowId) -> Self {
        Self {
            id,
            pid: None,
            name: None,
        }
    }

    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }
}

impl fmt::Display for TargetWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.pid, &self.name) {
            (Some(pid), _) => write!(f, "0x{:x} (pid {})", self.id, pid),
            (None, Some(name)) => write!(f, "0x{:x} \"{}\"", self.id, name),
            (None, None) => write!(f, "0x{:x}", self.id),
        }
    }
}

/// Геометрия окна в абсолютных координатах экрана
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for WindowGeometry {
    /// Формат `WxH+X+Y`, как у slop и xdotool
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}{:+}{:+}", self.width, self.height, self.x, self.y)
    }
}

/// Положение курсора и окно под ним (если есть)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerLocation {
    pub x: i32,
    pub y: i32,
    pub window: Option<TargetWindow>,
}
