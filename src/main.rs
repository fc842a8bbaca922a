use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
mod config;
mod error;
mod model;
mod services;
mod utils;

use config::Config;
use model::CaptureMode;
use services::{
    convert_image, create_capture_service, destination_path, relative_to_root, select_region,
    CaptureJob, CaptureTarget, CommandDelegateRunner, ConvertOptions, ProcfsTable, ResolutionPipeline,
    ResolutionRequest, WindowLocator, OUTPUT_EXTENSION,
};
use utils::tools::{CONVERT_TOOL, REGION_TOOL, SCREENSHOT_TOOL};

#[derive(Parser, Debug)]
#[command(name = "screenshotter")]
#[command(about = "Скриншоты, разложенные по каталогам приложений")]
struct Args {
    /// Что снимать
    #[arg(value_enum)]
    mode: CaptureMode,

    /// Путь к файлу конфигурации
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Режим сухого запуска: только распознать и напечатать путь
    #[arg(long)]
    dry_run: bool,

    /// Отладочный вывод (то же, что --log-level debug)
    #[arg(short, long)]
    debug: bool,

    /// Уровень логирования, по умолчанию из конфигурации
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let config = Arc::new(Config::load(&config_path)?);

    // Инициализация системы логирования
    let level = if args.debug {
        "debug"
    } else {
        args.log_level.as_deref().unwrap_or(&config.logging.level)
    };
    init_tracing(level)?;

    info!("Запуск screenshotter v{}", env!("CARGO_PKG_VERSION"));
    debug!("Конфигурация загружена из: {:?}", config_path);

    if args.dry_run {
        warn!("Режим сухого запуска - снимок и конвертация отключены");
    }

    utils::tools::check_tools(&required_tools(args.mode, args.dry_run))?;

    let region = match args.mode {
        CaptureMode::Region => match select_region().await? {
            Some(geometry) => Some(geometry),
            None => {
                info!("Выделение отменено");
                return Ok(());
            }
        },
        _ => None,
    };

    let temp = tempfile::Builder::new()
        .prefix("screenshotter")
        .suffix(".bmp")
        .tempfile()
        .context("Не удалось создать временный файл")?;

    // Распознавание и съёмка идут параллельно
    let pending = ResolutionPipeline::new(
        config.clone(),
        WindowLocator::connect()?,
        Box::new(ProcfsTable::new()),
        Box::new(CommandDelegateRunner::new()),
    )
    .spawn(ResolutionRequest {
        mode: args.mode,
        region: region.clone(),
    });

    let target = match args.mode {
        CaptureMode::Window => CaptureTarget::ActiveWindow,
        CaptureMode::Region | CaptureMode::Desktop => CaptureTarget::Desktop,
    };
    let capture = CaptureJob::start(create_capture_service(args.dry_run), target, temp.path().to_path_buf());
    let captured_at = capture.captured_at;

    let resolution = match pending.outcome().await {
        Ok(resolution) => resolution,
        Err(e) => {
            // Ничего не пишем: утилита съёмки убивается до удаления временного файла
            capture.cancel().await;
            if e.is_configuration() {
                return Err(anyhow::Error::new(e).context("Проверьте настройки"));
            }
            return Err(e.into());
        }
    };

    capture.finish().await?;

    let destination = destination_path(&config.root_dir, &resolution.application, &captured_at, OUTPUT_EXTENSION);

    if args.dry_run {
        println!("{}", destination.display());
        return Ok(());
    }

    let captured = std::fs::metadata(temp.path())
        .with_context(|| format!("Не удалось прочитать {:?}", temp.path()))?;
    if captured.len() == 0 {
        println!("No Screenshot was taken");
        return Ok(());
    }

    if let Some(dir) = destination.parent() {
        std::fs::create_dir_all(dir).with_context(|| format!("Не удалось создать каталог {:?}", dir))?;
    }

    let options = ConvertOptions {
        compression: config.compression,
        background: config.background.clone(),
        crop: region,
    };
    convert_image(temp.path(), &destination, &options).await?;
    info!("Скриншот сохранён: {:?}", destination);

    if let Some(callback) = &resolution.application.callback {
        services::post_process::run_callback(callback, &destination, &resolution.environment).await;
    }

    let relative = relative_to_root(&config.root_dir, &destination);
    services::post_process::notify("Screenshot Taken", &relative.display().to_string(), &destination).await;

    println!("{}", destination.display());
    Ok(())
}

/// Внешние утилиты, без которых запуск бессмыслен
fn required_tools(mode: CaptureMode, dry_run: bool) -> Vec<&'static str> {
    let mut tools = Vec::new();
    if matches!(mode, CaptureMode::Region) {
        tools.push(REGION_TOOL);
    }
    if !dry_run {
        tools.push(SCREENSHOT_TOOL);
        tools.push(CONVERT_TOOL);
    }
    tools
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_mode_and_flags() {
        let args = Args::try_parse_from(["screenshotter", "region", "--dry-run", "-d"]).unwrap();
        assert!(matches!(args.mode, CaptureMode::Region));
        assert!(args.dry_run);
        assert!(args.debug);
        assert!(args.config.is_none());

        assert!(Args::try_parse_from(["screenshotter", "fullscreen"]).is_err());
    }

    #[test]
    fn test_required_tools() {
        assert_eq!(required_tools(CaptureMode::Window, false), vec![SCREENSHOT_TOOL, CONVERT_TOOL]);
        assert_eq!(required_tools(CaptureMode::Region, true), vec![REGION_TOOL]);
        assert!(required_tools(CaptureMode::Desktop, true).is_empty());
    }
}
