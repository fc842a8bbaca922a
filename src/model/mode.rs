use clap::ValueEnum;
use std::fmt;

/// Что снимаем
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum CaptureMode {
    /// Окно с фокусом
    Window,
    /// Область, выделенная мышью
    Region,
    /// Весь рабочий стол
    Desktop,
}

impl CaptureMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureMode::Window => "window",
            CaptureMode::Region => "region",
            CaptureMode::Desktop => "desktop",
        }
    }
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
