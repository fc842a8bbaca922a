use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScreenshotError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Не удалось подключиться к X-серверу: {0}")]
    X11Connect(#[from] x11rb::errors::ConnectError),

    #[error("Соединение с X-сервером прервано: {0}")]
    X11Connection(#[from] x11rb::errors::ConnectionError),

    #[error("X-сервер вернул ошибку: {0}")]
    X11Reply(#[from] x11rb::errors::ReplyError),

    #[error("Ошибка чтения /proc: {0}")]
    Process(#[from] procfs::ProcError),

    #[error("Ошибка дисплея: {0}")]
    Display(String),

    #[error("Процесс не найден: {0}")]
    ProcessLookup(String),

    #[error("Не найдена утилита: {0}")]
    ToolMissing(String),

    #[error("Не удалось сделать скриншот: {0}")]
    Capture(String),

    #[error("Ошибка шаблона имени: {0}")]
    Template(String),

    #[error("Имя приложения пустое")]
    EmptyDirectory,

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl ScreenshotError {
    /// Ошибки, которые лечатся правкой настроек, а не повтором
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ScreenshotError::Config(_) | ScreenshotError::Template(_) | ScreenshotError::EmptyDirectory
        )
    }
}

pub type Result<T> = std::result::Result<T, ScreenshotError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! screenshot_error {
    (display, $($arg:tt)*) => {
        $crate::error::ScreenshotError::Display(format!($($arg)*))
    };
    (process_lookup, $($arg:tt)*) => {
        $crate::error::ScreenshotError::ProcessLookup(format!($($arg)*))
    };
    (capture, $($arg:tt)*) => {
        $crate::error::ScreenshotError::Capture(format!($($arg)*))
    };
    (template, $($arg:tt)*) => {
        $crate::error::ScreenshotError::Template(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::ScreenshotError::Internal(format!($($arg)*))
    };
}
