use crate::config::Config;
use crate::debug_if_enabled;
use crate::error::Result;
use crate::model::{TargetWindow, WindowId};
use crate::utils::sanitize;
use std::path::Path;
use tracing::debug;

use super::process_table::{ProcessNode, ProcessTable};

/// Переменная окружения, которую терминалы выставляют своим потомкам
pub const WINDOW_ID_MARKER: &str = "WINDOWID";

const DELETED_SUFFIX: &str = " (deleted)";

/// Видели ли мы хоть одного потомка с `WINDOWID` в окружении.
///
/// Живёт один запуск. `Present` и `Absent` не меняются после установки:
/// `Present` оставляет в поиске только помеченных потомков, `Absent`
/// отключает чтение окружения совсем.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowIdState {
    #[default]
    Unknown,
    Present,
    Absent,
}

impl WindowIdState {
    pub fn initial(check_window_id: bool) -> Self {
        if check_window_id {
            WindowIdState::Unknown
        } else {
            WindowIdState::Absent
        }
    }
}

/// Находит процесс, который на самом деле рисует окно
pub struct ProcessResolver<'a> {
    processes: &'a dyn ProcessTable,
    config: &'a Config,
}

impl<'a> ProcessResolver<'a> {
    pub fn new(processes: &'a dyn ProcessTable, config: &'a Config) -> Self {
        Self { processes, config }
    }

    /// Имя приложения (уже очищенное) и его процесс, если окно сообщило pid.
    ///
    /// Любая ошибка поиска процесса по pid из `_NET_WM_PID` фатальна.
    pub fn resolve(
        &self,
        window: &TargetWindow,
        state: &mut WindowIdState,
    ) -> Result<(String, Option<ProcessNode>)> {
        let Some(pid) = window.pid else {
            let name = window
                .name
                .as_deref()
                .map(sanitize)
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| self.config.fallback_name());
            debug!("Окно {} без pid, имя: {}", window, name);
            return Ok((name, None));
        };

        let mut process = self.processes.lookup(pid)?;
        let mut name = self.executable_name(&process)?;

        while self.config.is_ignored_parent(&name) {
            let Some(child) = self.find_descendant(&process, window.id, state)? else {
                debug!("У {} ({}) нет подходящих потомков", name, process);
                break;
            };

            debug!("Пропускаем {} ({}), спускаемся в {}", name, process, child);
            process = child;
            name = self.executable_name(&process)?;
        }

        Ok((name, Some(process)))
    }

    /// Самый молодой потомок; если хоть у кого-то есть `WINDOWID` нашего окна,
    /// выбираются только такие.
    pub fn find_descendant(
        &self,
        parent: &ProcessNode,
        window: WindowId,
        state: &mut WindowIdState,
    ) -> Result<Option<ProcessNode>> {
        let children = self.processes.children(parent)?;
        if children.is_empty() {
            return Ok(None);
        }

        let expected = window.to_string();
        let mut best: Option<ProcessNode> = None;

        for child in children {
            if *state != WindowIdState::Absent {
                let marked = self
                    .processes
                    .environment_value(&child, WINDOW_ID_MARKER)
                    .is_some_and(|value| value == expected);

                if marked {
                    if *state != WindowIdState::Present {
                        debug!("{} несёт {}={}, дальше ищем только таких", child, WINDOW_ID_MARKER, expected);
                        *state = WindowIdState::Present;
                        best = None;
                    }
                } else if *state == WindowIdState::Present {
                    continue;
                }
            }

            if best.map_or(true, |current| child.start_time > current.start_time) {
                best = Some(child);
            }
        }

        if *state == WindowIdState::Unknown {
            // Ни одного потомка с WINDOWID, больше не проверяем
            *state = WindowIdState::Absent;
        }

        Ok(best)
    }

    fn executable_name(&self, process: &ProcessNode) -> Result<String> {
        let executable = self.processes.executable(process)?;
        let executable = executable.to_string_lossy();
        let executable = executable.strip_suffix(DELETED_SUFFIX).unwrap_or(&executable);

        debug_if_enabled!(
            "{}: executable={} cmdline={:?}",
            process,
            executable,
            self.processes.command_line(process).ok()
        );

        let base = Path::new(executable)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(sanitize(&base))
    }
}
