use crate::error::{Result, ScreenshotError};
use std::ffi::OsStr;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Процесс ОС. Узлы создаются лениво по pid и не кэшируются между запусками.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessNode {
    pub pid: u32,
    /// Время создания в тиках с момента загрузки
    pub start_time: u64,
}

impl fmt::Display for ProcessNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pid {}", self.pid)
    }
}

/// Доступ к таблице процессов
pub trait ProcessTable: Send {
    /// Найти процесс; ошибка если процесса нет или нет прав
    fn lookup(&self, pid: u32) -> Result<ProcessNode>;

    /// Путь к исполняемому файлу (может оканчиваться на " (deleted)")
    fn executable(&self, node: &ProcessNode) -> Result<PathBuf>;

    /// Командная строка, аргументы через пробел
    fn command_line(&self, node: &ProcessNode) -> Result<String>;

    /// Непосредственные потомки
    fn children(&self, node: &ProcessNode) -> Result<Vec<ProcessNode>>;

    /// Значение переменной окружения процесса; `None` если окружение не прочитать
    fn environment_value(&self, node: &ProcessNode, key: &str) -> Option<String>;
}

/// Таблица процессов Linux через procfs
#[derive(Debug, Default)]
pub struct ProcfsTable;

impl ProcfsTable {
    pub fn new() -> Self {
        Self
    }

    fn process(pid: u32) -> Result<procfs::process::Process> {
        let pid = i32::try_from(pid)
            .map_err(|_| ScreenshotError::ProcessLookup(format!("pid {} вне диапазона", pid)))?;
        Ok(procfs::process::Process::new(pid)?)
    }
}

impl ProcessTable for ProcfsTable {
    fn lookup(&self, pid: u32) -> Result<ProcessNode> {
        let stat = Self::process(pid)?.stat()?;
        Ok(ProcessNode {
            pid,
            start_time: stat.starttime,
        })
    }

    fn executable(&self, node: &ProcessNode) -> Result<PathBuf> {
        Ok(Self::process(node.pid)?.exe()?)
    }

    fn command_line(&self, node: &ProcessNode) -> Result<String> {
        Ok(Self::process(node.pid)?.cmdline()?.join(" "))
    }

    fn children(&self, node: &ProcessNode) -> Result<Vec<ProcessNode>> {
        let mut children = Vec::new();

        for process in procfs::process::all_processes()? {
            // Процессы могут завершиться во время обхода
            let Ok(process) = process else { continue };
            let Ok(stat) = process.stat() else { continue };

            if u32::try_from(stat.ppid).ok() == Some(node.pid) {
                if let Ok(pid) = u32::try_from(stat.pid) {
                    children.push(ProcessNode {
                        pid,
                        start_time: stat.starttime,
                    });
                }
            }
        }

        Ok(children)
    }

    fn environment_value(&self, node: &ProcessNode, key: &str) -> Option<String> {
        let environ = match Self::process(node.pid).and_then(|p| Ok(p.environ()?)) {
            Ok(environ) => environ,
            Err(e) => {
                debug!("Окружение {} недоступно: {}", node, e);
                return None;
            }
        };

        environ
            .get(OsStr::new(key))
            .map(|value| value.to_string_lossy().into_owned())
    }
}
