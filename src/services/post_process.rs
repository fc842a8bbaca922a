use crate::services::override_engine::FrozenEnvironment;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, warn};

/// Вызвать callback с путём итогового файла. Ошибки только логируются.
pub async fn run_callback(callback: &Path, file: &Path, env: &FrozenEnvironment) {
    debug!("Вызываем callback {:?} для {:?}", callback, file);

    match Command::new(callback).arg(file).envs(env.vars()).status().await {
        Ok(status) if status.success() => {}
        Ok(status) => warn!("Callback {:?} завершился с {}", callback, status),
        Err(e) => warn!("Не удалось запустить callback {:?}: {}", callback, e),
    }
}

/// Уведомление на рабочем столе. Ошибки только логируются.
pub async fn notify(summary: &str, body: &str, icon: &Path) {
    let result = Command::new("notify-send")
        .arg("--icon")
        .arg(icon)
        .arg(summary)
        .arg(body)
        .status()
        .await;

    match result {
        Ok(status) if status.success() => {}
        Ok(status) => warn!("notify-send завершился с {}", status),
        Err(e) => warn!("Не удалось отправить уведомление: {}", e),
    }
}
