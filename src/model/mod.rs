pub mod application;
pub mod mode;
pub mod window;

pub use application::ResolvedApplication;
pub use mode::CaptureMode;
pub use window::{PointerLocation, TargetWindow, WindowGeometry, WindowId};
