use crate::error::Result;
use crate::model::{PointerLocation, TargetWindow, WindowGeometry, WindowId};
use tracing::debug;

use super::r#trait::WindowSystem;
use super::x11::X11WindowSystem;

/// Находит целевое окно для каждого режима и считает его абсолютную геометрию
pub struct WindowLocator {
    system: Box<dyn WindowSystem>,
}

impl WindowLocator {
    pub fn new(system: Box<dyn WindowSystem>) -> Self {
        Self { system }
    }

    pub fn connect() -> Result<Self> {
        Ok(Self::new(Box::new(X11WindowSystem::connect()?)))
    }

    /// Окно с фокусом
    pub fn locate_active(&self) -> Result<TargetWindow> {
        let window = self.system.active_window()?;
        self.describe(window)
    }

    /// Окно под курсором. Курсор над рабочим столом даёт `window: None`, это не ошибка.
    pub fn locate_under_pointer(&self) -> Result<PointerLocation> {
        let pointer = self.system.pointer()?;
        debug!("Курсор: {},{} окно {:?}", pointer.x, pointer.y, pointer.window);

        let window = match pointer.window {
            Some(id) if id != self.system.root() => Some(self.describe(id)?),
            _ => None,
        };

        Ok(PointerLocation {
            x: pointer.x,
            y: pointer.y,
            window,
        })
    }

    /// Корневое окно (рабочий стол)
    pub fn locate_root(&self) -> Result<TargetWindow> {
        self.describe(self.system.root())
    }

    /// Абсолютные координаты окна без декораций, как их показывает slop.
    ///
    /// Координаты родителей складываются до корня. Если родителя узнать нельзя,
    /// обход останавливается на том, что уже накоплено.
    pub fn geometry(&self, window: &TargetWindow) -> Result<WindowGeometry> {
        let own = self.system.frame(window.id)?;
        let root = self.system.root();
        let (mut x, mut y) = (own.x, own.y);
        let mut current = window.id;

        while current != root {
            let Some(parent) = self.system.parent(current) else {
                debug!("Родитель окна 0x{:x} недоступен, геометрия неполная", current);
                break;
            };

            match self.system.frame(parent) {
                Ok(frame) => {
                    x += frame.x;
                    y += frame.y;
                }
                Err(e) => {
                    debug!("Геометрия родителя 0x{:x} недоступна: {}", parent, e);
                    break;
                }
            }

            current = parent;
        }

        Ok(WindowGeometry { x, y, ..own })
    }

    fn describe(&self, id: WindowId) -> Result<TargetWindow> {
        let window = TargetWindow::new(id);

        if let Some(pid) = self.system.window_pid(id)? {
            return Ok(window.with_pid(pid));
        }

        Ok(match self.system.window_name(id)? {
            Some(name) => window.with_name(name),
            None => window,
        })
    }
}
