use crate::config::Config;
use crate::error::{Result, ScreenshotError};
use crate::model::{CaptureMode, ResolvedApplication, TargetWindow};
use crate::screenshot_error;
use crate::services::override_engine::environment::{GEOMETRY, MODE, MOUSE_X, MOUSE_Y, PID, WINDOW_ID};
use crate::services::override_engine::{
    DelegateEnvironment, DelegateRunner, FrozenEnvironment, OverrideEngine,
};
use crate::services::process_resolver::{ProcessResolver, ProcessTable, WindowIdState};
use crate::services::window_locator::WindowLocator;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, info};

/// Что распознавать
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    pub mode: CaptureMode,
    /// Геометрия выделенной области (`WxH+X+Y`), только для режима region
    pub region: Option<String>,
}

/// Успешный итог распознавания
#[derive(Debug, Clone)]
pub struct Resolution {
    pub application: ResolvedApplication,
    /// Окружение для callback-ов, отражает итоговое имя и каталог
    pub environment: FrozenEnvironment,
}

/// Поиск окна, процесса и применение правил.
///
/// Работает одной блокирующей задачей параллельно со съёмкой. Состояние
/// `WINDOWID` живёт ровно один запуск.
pub struct ResolutionPipeline {
    config: Arc<Config>,
    locator: WindowLocator,
    processes: Box<dyn ProcessTable>,
    delegates: Box<dyn DelegateRunner>,
    window_ids: WindowIdState,
}

impl ResolutionPipeline {
    pub fn new(
        config: Arc<Config>,
        locator: WindowLocator,
        processes: Box<dyn ProcessTable>,
        delegates: Box<dyn DelegateRunner>,
    ) -> Self {
        let window_ids = WindowIdState::initial(config.check_window_id);
        Self {
            config,
            locator,
            processes,
            delegates,
            window_ids,
        }
    }

    /// Запустить распознавание в отдельной задаче; результат или ошибка придут ровно один раз
    pub fn spawn(self, request: ResolutionRequest) -> PendingResolution {
        let (tx, rx) = oneshot::channel();

        tokio::task::spawn_blocking(move || {
            let mut pipeline = self;
            let outcome = pipeline.resolve(&request);
            if tx.send(outcome).is_err() {
                debug!("Результат распознавания больше никому не нужен");
            }
        });

        PendingResolution { rx }
    }

    pub fn resolve(&mut self, request: &ResolutionRequest) -> Result<Resolution> {
        info!("Распознаём приложение, режим {}", request.mode);

        let mut env = DelegateEnvironment::new();
        env.set(MODE, request.mode.as_str());

        let application = match request.mode {
            CaptureMode::Window => {
                let window = self.locator.locate_active()?;
                self.describe_full_window(&window, &mut env)?;
                self.resolve_window(&window, &mut env)?
            }
            CaptureMode::Region => {
                if let Some(region) = &request.region {
                    env.set(GEOMETRY, region.as_str());
                }

                let pointer = self.locator.locate_under_pointer()?;
                env.set(MOUSE_X, pointer.x.to_string());
                env.set(MOUSE_Y, pointer.y.to_string());

                match pointer.window {
                    Some(window) => {
                        env.set(WINDOW_ID, window.id.to_string());
                        self.resolve_window(&window, &mut env)?
                    }
                    None => {
                        debug!("Под курсором нет окна, используем fallback");
                        self.apply_overrides_to_fallback(&mut env)?
                    }
                }
            }
            CaptureMode::Desktop => {
                let window = self.locator.locate_root()?;
                self.describe_full_window(&window, &mut env)?;
                self.apply_overrides_to_fallback(&mut env)?
            }
        };

        if application.dir.is_empty() {
            return Err(ScreenshotError::EmptyDirectory);
        }

        info!("Приложение: {}", application);
        Ok(Resolution {
            application,
            environment: env.finish(),
        })
    }

    /// Геометрия, id окна и положение курсора для делегатов
    fn describe_full_window(&self, window: &TargetWindow, env: &mut DelegateEnvironment) -> Result<()> {
        let geometry = self.locator.geometry(window)?;
        env.set(WINDOW_ID, window.id.to_string());
        env.set(GEOMETRY, geometry.to_string());

        let pointer = self.locator.locate_under_pointer()?;
        env.set(MOUSE_X, pointer.x.to_string());
        env.set(MOUSE_Y, pointer.y.to_string());
        Ok(())
    }

    fn resolve_window(
        &mut self,
        window: &TargetWindow,
        env: &mut DelegateEnvironment,
    ) -> Result<ResolvedApplication> {
        let resolver = ProcessResolver::new(self.processes.as_ref(), &self.config);
        let (name, process) = resolver.resolve(window, &mut self.window_ids)?;

        if let Some(process) = &process {
            env.set(PID, process.pid.to_string());
        }

        OverrideEngine::new(&self.config, self.processes.as_ref(), self.delegates.as_ref())
            .apply(&name, process.as_ref(), env)
    }

    fn apply_overrides_to_fallback(&self, env: &mut DelegateEnvironment) -> Result<ResolvedApplication> {
        let fallback = self.config.fallback_name();
        OverrideEngine::new(&self.config, self.processes.as_ref(), self.delegates.as_ref())
            .apply(&fallback, None, env)
    }
}

/// Ожидание результата распознавания
pub struct PendingResolution {
    rx: oneshot::Receiver<Result<Resolution>>,
}

impl PendingResolution {
    pub async fn outcome(self) -> Result<Resolution> {
        self.rx
            .await
            .map_err(|_| screenshot_error!(internal, "задача распознавания завершилась без результата"))?
    }
}
