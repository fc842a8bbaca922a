use crate::error::{Result, ScreenshotError};
use crate::model::{WindowGeometry, WindowId};
use crate::screenshot_error;
use tracing::{debug, info};
use x11rb::connection::Connection;
use x11rb::errors::ReplyError;
use x11rb::protocol::xproto::{Atom, AtomEnum, ConnectionExt, GetPropertyReply, Window};
use x11rb::rust_connection::RustConnection;

use super::r#trait::{PointerQuery, WindowSystem};

// Глубина поиска клиентского окна под рамкой оконного менеджера
const MAX_CLIENT_SEARCH_DEPTH: usize = 8;
const NAME_LENGTH_LIMIT: u32 = 1024;

struct Atoms {
    net_active_window: Atom,
    net_wm_pid: Atom,
    net_wm_name: Atom,
    utf8_string: Atom,
    wm_state: Atom,
}

/// Запросы к X-серверу через x11rb
pub struct X11WindowSystem {
    conn: RustConnection,
    root: Window,
    atoms: Atoms,
}

impl X11WindowSystem {
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None)?;

        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .map(|screen| screen.root)
            .ok_or_else(|| screenshot_error!(display, "экран {} не найден", screen_num))?;

        let atoms = Atoms {
            net_active_window: intern_atom(&conn, "_NET_ACTIVE_WINDOW")?,
            net_wm_pid: intern_atom(&conn, "_NET_WM_PID")?,
            net_wm_name: intern_atom(&conn, "_NET_WM_NAME")?,
            utf8_string: intern_atom(&conn, "UTF8_STRING")?,
            wm_state: intern_atom(&conn, "WM_STATE")?,
        };

        info!("Подключено к X-серверу, корневое окно 0x{:x}", root);
        Ok(Self { conn, root, atoms })
    }

    /// Прочитать свойство окна. X11-ошибка (например, BadWindow) означает "свойства нет".
    fn property(
        &self,
        window: Window,
        property: Atom,
        type_: impl Into<Atom>,
        length: u32,
    ) -> Result<Option<GetPropertyReply>> {
        let cookie = self.conn.get_property(false, window, property, type_, 0, length)?;
        match cookie.reply() {
            Ok(reply) if reply.type_ == x11rb::NONE => Ok(None),
            Ok(reply) => Ok(Some(reply)),
            Err(ReplyError::X11Error(e)) => {
                debug!("Свойство {} окна 0x{:x} недоступно: {:?}", property, window, e.error_kind);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn cardinal(&self, window: Window, property: Atom, type_: impl Into<Atom>) -> Result<Option<u32>> {
        Ok(self
            .property(window, property, type_, 1)?
            .and_then(|reply| reply.value32().and_then(|mut values| values.next())))
    }

    fn has_wm_state(&self, window: Window) -> bool {
        matches!(self.property(window, self.atoms.wm_state, AtomEnum::ANY, 0), Ok(Some(_)))
    }

    /// Рамка оконного менеджера не несёт `_NET_WM_PID`; ищем под ней окно с `WM_STATE`
    fn find_client(&self, window: Window) -> Window {
        if self.has_wm_state(window) {
            return window;
        }
        self.find_client_below(window, 0).unwrap_or(window)
    }

    fn find_client_below(&self, window: Window, depth: usize) -> Option<Window> {
        if depth >= MAX_CLIENT_SEARCH_DEPTH {
            return None;
        }

        let tree = self.conn.query_tree(window).ok()?.reply().ok()?;

        if let Some(&client) = tree.children.iter().find(|&&child| self.has_wm_state(child)) {
            return Some(client);
        }

        tree.children
            .iter()
            .find_map(|&child| self.find_client_below(child, depth + 1))
    }
}

/// STRING в Latin-1, всё остальное читаем как UTF-8
fn decode_text(type_: Atom, value: &[u8]) -> String {
    if type_ == Atom::from(AtomEnum::STRING) {
        value.iter().map(|&b| char::from(b)).collect()
    } else {
        String::from_utf8_lossy(value).into_owned()
    }
}

fn intern_atom(conn: &RustConnection, name: &str) -> Result<Atom> {
    Ok(conn.intern_atom(false, name.as_bytes())?.reply()?.atom)
}

impl WindowSystem for X11WindowSystem {
    fn root(&self) -> WindowId {
        self.root
    }

    fn active_window(&self) -> Result<WindowId> {
        self.cardinal(self.root, self.atoms.net_active_window, AtomEnum::WINDOW)?
            .filter(|&window| window != x11rb::NONE)
            .ok_or_else(|| {
                ScreenshotError::Display(
                    "_NET_ACTIVE_WINDOW не задан, оконный менеджер не поддерживает EWMH".to_string(),
                )
            })
    }

    fn pointer(&self) -> Result<PointerQuery> {
        let reply = self.conn.query_pointer(self.root)?.reply()?;

        let window = if reply.child == x11rb::NONE {
            None
        } else {
            Some(self.find_client(reply.child))
        };

        Ok(PointerQuery {
            x: i32::from(reply.root_x),
            y: i32::from(reply.root_y),
            window,
        })
    }

    fn window_pid(&self, window: WindowId) -> Result<Option<u32>> {
        self.cardinal(window, self.atoms.net_wm_pid, AtomEnum::CARDINAL)
    }

    fn window_name(&self, window: WindowId) -> Result<Option<String>> {
        if let Some(reply) =
            self.property(window, self.atoms.net_wm_name, self.atoms.utf8_string, NAME_LENGTH_LIMIT)?
        {
            let name = String::from_utf8_lossy(&reply.value).into_owned();
            if !name.is_empty() {
                return Ok(Some(name));
            }
        }

        // WM_NAME бывает STRING, UTF8_STRING или COMPOUND_TEXT
        let legacy = self
            .property(window, AtomEnum::WM_NAME.into(), AtomEnum::ANY, NAME_LENGTH_LIMIT)?
            .map(|reply| decode_text(reply.type_, &reply.value))
            .filter(|name| !name.is_empty());

        Ok(legacy)
    }

    fn frame(&self, window: WindowId) -> Result<WindowGeometry> {
        let reply = self.conn.get_geometry(window)?.reply()?;
        Ok(WindowGeometry {
            x: i32::from(reply.x),
            y: i32::from(reply.y),
            width: u32::from(reply.width),
            height: u32::from(reply.height),
        })
    }

    fn parent(&self, window: WindowId) -> Option<WindowId> {
        let tree = self.conn.query_tree(window).ok()?.reply().ok()?;
        (tree.parent != x11rb::NONE).then_some(tree.parent)
    }
}
