use crate::error::Result;
use crate::screenshot_error;
use crate::utils::tools::{CONVERT_TOOL, REGION_TOOL, SCREENSHOT_TOOL};
use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Что снимать
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureTarget {
    /// Окно с фокусом, без рамки оконного менеджера
    ActiveWindow,
    /// Весь экран
    Desktop,
}

/// Снимок экрана во временный файл
#[async_trait::async_trait]
pub trait CaptureService: Send + Sync {
    async fn capture(&self, target: CaptureTarget, output: &Path) -> Result<()>;
}

/// Factory function: реальный снимок или пустой dry-run
pub fn create_capture_service(dry_run: bool) -> Box<dyn CaptureService> {
    if dry_run {
        Box::new(DryRunCapture)
    } else {
        Box::new(GnomeScreenshotCapture::new())
    }
}

/// gnome-screenshot: scrot не умеет одно окно, import -window теряет эффекты композитора
pub struct GnomeScreenshotCapture {
    program: PathBuf,
}

impl GnomeScreenshotCapture {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from(SCREENSHOT_TOOL),
        }
    }

    #[cfg(test)]
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }
}

#[async_trait::async_trait]
impl CaptureService for GnomeScreenshotCapture {
    async fn capture(&self, target: CaptureTarget, output: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        if target == CaptureTarget::ActiveWindow {
            cmd.args(["-w", "-B"]);
        }
        // Отменённая съёмка не должна дописать файл после выхода
        cmd.arg("-f").arg(output).kill_on_drop(true);

        debug!("Снимаем {:?} в {:?}", target, output);
        let status = cmd
            .status()
            .await
            .map_err(|e| screenshot_error!(capture, "{:?} не запустился: {}", self.program, e))?;

        if !status.success() {
            return Err(screenshot_error!(capture, "{:?} завершился с {}", self.program, status));
        }
        Ok(())
    }
}

/// Съёмка, идущая параллельно с распознаванием
pub struct CaptureJob {
    /// Момент съёмки, по нему строится имя файла
    pub captured_at: NaiveDateTime,
    handle: JoinHandle<Result<()>>,
}

impl CaptureJob {
    pub fn start(service: Box<dyn CaptureService>, target: CaptureTarget, output: PathBuf) -> Self {
        let captured_at = Local::now().naive_local();
        let handle = tokio::spawn(async move { service.capture(target, &output).await });
        Self { captured_at, handle }
    }

    pub async fn finish(self) -> Result<()> {
        self.handle
            .await
            .map_err(|e| screenshot_error!(internal, "задача съёмки прервана: {}", e))?
    }

    /// Прервать съёмку и дождаться, пока утилита будет убита
    pub async fn cancel(self) {
        self.handle.abort();
        if let Err(e) = self.handle.await {
            debug!("Съёмка отменена: {}", e);
        }
    }
}

/// Ничего не снимает
pub struct DryRunCapture;

#[async_trait::async_trait]
impl CaptureService for DryRunCapture {
    async fn capture(&self, target: CaptureTarget, output: &Path) -> Result<()> {
        info!("Dry-run: пропускаем снимок {:?} в {:?}", target, output);
        Ok(())
    }
}

/// Интерактивное выделение области через slop. `None` если пользователь отменил выделение.
pub async fn select_region() -> Result<Option<String>> {
    let output = Command::new(REGION_TOOL)
        .args(["-n", "-f", "%g", "-l", "-c", "0,0,1,0.1"])
        .output()
        .await
        .map_err(|e| screenshot_error!(capture, "{} не запустился: {}", REGION_TOOL, e))?;

    if !output.status.success() {
        return Ok(None);
    }

    let geometry = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok((!geometry.is_empty()).then_some(geometry))
}

/// Параметры конвертации временного снимка в итоговый файл
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub compression: u8,
    pub background: Option<String>,
    /// Для области снимается весь экран, обрезка здесь
    pub crop: Option<String>,
}

impl ConvertOptions {
    pub fn args(&self, source: &Path, destination: &Path) -> Vec<PathBuf> {
        let mut args: Vec<PathBuf> = vec![
            source.to_path_buf(),
            "-define".into(),
            format!("png:compression-level={}", self.compression).into(),
        ];

        if let Some(crop) = &self.crop {
            args.push("-crop".into());
            args.push(crop.into());
        }

        if let Some(background) = &self.background {
            args.push("-background".into());
            args.push(background.into());
            args.push("-flatten".into());
        }

        args.push(destination.to_path_buf());
        args
    }
}

pub async fn convert_image(source: &Path, destination: &Path, options: &ConvertOptions) -> Result<()> {
    let status = Command::new(CONVERT_TOOL)
        .args(options.args(source, destination))
        .status()
        .await
        .map_err(|e| screenshot_error!(capture, "{} не запустился: {}", CONVERT_TOOL, e))?;

    if !status.success() {
        return Err(screenshot_error!(capture, "{} завершился с {}", CONVERT_TOOL, status));
    }
    Ok(())
}
