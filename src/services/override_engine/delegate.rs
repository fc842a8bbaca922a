use crate::{debug_if_enabled, trace_if_enabled};
use crate::utils::sanitize;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

use super::environment::DelegateEnvironment;

/// Запускает делегата правила.
///
/// `None` означает "делегат отказался": ненулевой код выхода или запуск не удался.
pub trait DelegateRunner: Send {
    fn run(&self, delegate: &Path, env: &DelegateEnvironment) -> Option<String>;
}

/// Делегат как внешняя программа: без аргументов, окружение = наше + DelegateEnvironment
#[derive(Debug, Default)]
pub struct CommandDelegateRunner;

impl CommandDelegateRunner {
    pub fn new() -> Self {
        Self
    }
}

impl DelegateRunner for CommandDelegateRunner {
    fn run(&self, delegate: &Path, env: &DelegateEnvironment) -> Option<String> {
        debug!("Вызываем делегата {:?}", delegate);
        for (key, value) in env.vars() {
            trace_if_enabled!("  {}={}", key, value);
        }

        let output = match Command::new(delegate)
            .envs(env.vars())
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                warn!("Не удалось запустить делегата {:?}: {}", delegate, e);
                return None;
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.is_empty() {
            debug_if_enabled!("Сырой вывод делегата:\n{}", stdout);
        }

        if !output.status.success() {
            debug!("Делегат {:?} отказался: {}", delegate, output.status);
            return None;
        }

        let dir = parse_delegate_output(&stdout);
        debug!("Каталог от делегата: {:?}", dir);
        Some(dir)
    }
}

/// Каждая непустая после очистки строка становится сегментом пути
pub fn parse_delegate_output(stdout: &str) -> String {
    stdout
        .lines()
        .map(sanitize)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::override_engine::environment::{DIR, NAME};

    #[test]
    fn test_parse_delegate_output() {
        assert_eq!(parse_delegate_output("Games\n\n  Factorio 1.1 \n"), "games/factorio-1-1");
        assert_eq!(parse_delegate_output("../etc/passwd\n"), "etc-passwd");
        assert_eq!(parse_delegate_output("!!!\n\n"), "");
        assert_eq!(parse_delegate_output(""), "");
    }

    #[test]
    fn test_exit_status_decides() {
        let runner = CommandDelegateRunner::new();
        let env = DelegateEnvironment::new();

        assert_eq!(runner.run(Path::new("true"), &env), Some(String::new()));
        assert_eq!(runner.run(Path::new("false"), &env), None);
        assert_eq!(runner.run(Path::new("/nonexistent/delegate"), &env), None);
    }

    #[test]
    fn test_delegate_sees_environment() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("delegate.sh");
        std::fs::write(&script, "#!/bin/sh\necho \"$SCREENSHOTTER_NAME\"\necho \"$SCREENSHOTTER_DIR\"\n").unwrap();
        std::fs::set_permissions(&script, std::os::unix::fs::PermissionsExt::from_mode(0o755)).unwrap();

        let mut env = DelegateEnvironment::new();
        env.set(NAME, "Firefox");
        env.set(DIR, "Work Stuff");

        let runner = CommandDelegateRunner::new();
        assert_eq!(runner.run(&script, &env), Some("firefox/work-stuff".to_string()));
    }
}
