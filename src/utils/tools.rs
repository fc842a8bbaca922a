use crate::error::{Result, ScreenshotError};
use std::env;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Утилита для снимка экрана
pub const SCREENSHOT_TOOL: &str = "gnome-screenshot";
/// Утилита для выделения области
pub const REGION_TOOL: &str = "slop";
/// Утилита для конвертации изображений
pub const CONVERT_TOOL: &str = "convert";

/// Проверить, что все внешние утилиты для выбранного режима доступны в PATH
pub fn check_tools(tools: &[&str]) -> Result<()> {
    info!("Проверка внешних утилит...");

    for tool in tools {
        match find_in_path(tool) {
            Some(path) => debug!("{} найден: {:?}", tool, path),
            None => {
                return Err(ScreenshotError::ToolMissing(format!(
                    "{} не найден в PATH, установите его",
                    tool
                )))
            }
        }
    }

    info!("Все утилиты найдены");
    Ok(())
}

/// Найти исполняемый файл в PATH
pub fn find_in_path(tool: &str) -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .map(|dir| dir.join(tool))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    match path.metadata() {
        Ok(metadata) => metadata.is_file() && metadata.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}
