use crate::error::Result;
use crate::model::{WindowGeometry, WindowId};

/// Ответ на запрос положения курсора
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerQuery {
    pub x: i32,
    pub y: i32,
    /// Клиентское окно под курсором; `None` если курсор над корневым окном
    pub window: Option<WindowId>,
}

/// Низкоуровневые запросы к дисплейному серверу.
///
/// Ошибки соединения возвращаются как `Err`; отсутствие свойства у окна
/// возвращается как `Ok(None)`.
pub trait WindowSystem: Send {
    /// Корневое окно (рабочий стол)
    fn root(&self) -> WindowId;

    /// Окно с фокусом по `_NET_ACTIVE_WINDOW`
    fn active_window(&self) -> Result<WindowId>;

    fn pointer(&self) -> Result<PointerQuery>;

    /// `_NET_WM_PID`
    fn window_pid(&self, window: WindowId) -> Result<Option<u32>>;

    /// `_NET_WM_NAME`, затем `WM_NAME`
    fn window_name(&self, window: WindowId) -> Result<Option<String>>;

    /// Прямоугольник окна относительно родителя
    fn frame(&self, window: WindowId) -> Result<WindowGeometry>;

    /// Родитель окна; `None` если окно корневое или родителя узнать нельзя
    fn parent(&self, window: WindowId) -> Option<WindowId>;
}
