//! WindowLocator service: responsibility and boundaries
//!
//! This module and its submodules are responsible ONLY for talking to the display
//! server: finding the focused window, the window under the pointer or the root
//! window, and computing absolute geometry. It MUST NOT look at processes or
//! override rules; that belongs to ProcessResolver and OverrideEngine.

mod locator;
mod r#trait;
mod x11;

pub use self::locator::WindowLocator;
#[cfg(test)]
pub use self::r#trait::{PointerQuery, WindowSystem};
