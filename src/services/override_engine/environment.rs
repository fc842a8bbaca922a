use std::collections::BTreeMap;
use std::sync::Arc;

pub const MODE: &str = "SCREENSHOTTER_MODE";
pub const GEOMETRY: &str = "SCREENSHOTTER_GEOMETRY";
pub const WINDOW_ID: &str = "SCREENSHOTTER_WINDOWID";
pub const MOUSE_X: &str = "SCREENSHOTTER_MOUSEX";
pub const MOUSE_Y: &str = "SCREENSHOTTER_MOUSEY";
pub const PID: &str = "SCREENSHOTTER_PID";
pub const NAME: &str = "SCREENSHOTTER_NAME";
pub const DIR: &str = "SCREENSHOTTER_DIR";

/// Переменные для делегатов, собираемые по ходу распознавания.
///
/// Принадлежит задаче распознавания; после неё замораживается через [`finish`](Self::finish).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelegateEnvironment {
    vars: BTreeMap<&'static str, String>,
}

impl DelegateEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &'static str, value: impl Into<String>) {
        self.vars.insert(key, value.into());
    }

    /// Имя и каталог меняются всегда вместе, кроме ответа делегата
    pub fn set_identity(&mut self, name: &str, dir: &str) {
        self.set(NAME, name);
        self.set(DIR, dir);
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn vars(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.vars.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn finish(self) -> FrozenEnvironment {
        FrozenEnvironment {
            vars: Arc::new(self.vars),
        }
    }
}

/// Окончательное окружение для callback-ов, только чтение
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrozenEnvironment {
    vars: Arc<BTreeMap<&'static str, String>>,
}

impl FrozenEnvironment {
    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn vars(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.vars.iter().map(|(k, v)| (*k, v.as_str()))
    }
}
