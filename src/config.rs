use crate::services::override_engine::template;
use crate::utils::sanitize;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,
    #[serde(default = "default_fallback")]
    pub fallback: String,
    #[serde(default)]
    pub ignored_parents: Vec<String>,
    #[serde(default = "default_true")]
    pub check_window_id: bool,
    #[serde(default = "default_compression")]
    pub compression: u8,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub callback: Option<PathBuf>,
    #[serde(default)]
    pub yearly_applications: Vec<String>,
    #[serde(default)]
    pub monthly_applications: Vec<String>,
    #[serde(default)]
    pub overrides: Vec<OverrideRule>,
    // Оптимизационные индексы - не сериализуются, строятся после загрузки
    #[serde(skip)]
    ignored_parent_set: HashSet<String>, // O(1) lookup, имена уже очищены
    #[serde(skip)]
    override_patterns: Vec<Option<Regex>>, // скомпилированные regex по индексу правила
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Правило переопределения. Правила проверяются по порядку, первое совпавшее побеждает.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OverrideRule {
    /// Точное совпадение с очищенным именем приложения
    #[serde(default)]
    pub name: Option<String>,
    /// Регулярное выражение по командной строке процесса
    #[serde(default)]
    pub regex: Option<String>,
    /// Шаблон имени каталога, группы захвата подставляются как аргументы
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub yearly: bool,
    #[serde(default)]
    pub monthly: bool,
    #[serde(default)]
    pub callback: Option<PathBuf>,
    /// Внешняя программа, которая может вернуть имя каталога
    #[serde(default)]
    pub delegate: Option<PathBuf>,
}

fn default_root_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Screenshots")
}

fn default_fallback() -> String {
    "desktop".to_string()
}

fn default_true() -> bool {
    true
}

fn default_compression() -> u8 {
    9
}

impl Default for Config {
    fn default() -> Self {
        let mut config = Self {
            logging: LoggingConfig::default(),
            root_dir: default_root_dir(),
            fallback: default_fallback(),
            ignored_parents: Vec::new(),
            check_window_id: true,
            compression: default_compression(),
            background: None,
            callback: None,
            yearly_applications: Vec::new(),
            monthly_applications: Vec::new(),
            overrides: Vec::new(),
            ignored_parent_set: HashSet::new(),
            override_patterns: Vec::new(),
        };
        // Без правил индексы строятся без ошибок
        let _ = config.build_optimization_indexes();
        config
    }
}

impl Config {
    /// Путь по умолчанию: `$XDG_CONFIG_HOME/screenshotter/screenshotter.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("screenshotter")
            .join("screenshotter.toml")
    }

    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("SCREENSHOTTER_"));

        Self::from_figment(figment)
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let mut config: Config = figment.extract()?;

        config.validate()?;
        config.build_optimization_indexes()?;

        Ok(config)
    }

    /// Строит оптимизационные индексы: множество игнорируемых родителей и скомпилированные regex
    pub fn build_optimization_indexes(&mut self) -> Result<()> {
        self.ignored_parent_set = self
            .ignored_parents
            .iter()
            .map(|name| sanitize(name))
            .filter(|name| !name.is_empty())
            .collect();

        // Сравнение идёт с уже очищенным именем приложения
        for rule in &mut self.overrides {
            if let Some(name) = rule.name.as_mut() {
                *name = sanitize(name);
            }
        }
        for list in [&mut self.yearly_applications, &mut self.monthly_applications] {
            for name in list.iter_mut() {
                *name = sanitize(name);
            }
        }

        self.override_patterns = self
            .overrides
            .iter()
            .enumerate()
            .map(|(i, rule)| {
                rule.regex
                    .as_deref()
                    .map(|pattern| {
                        Regex::new(pattern).with_context(|| {
                            format!("Неверное регулярное выражение в правиле #{}", i + 1)
                        })
                    })
                    .transpose()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        if self.compression > 9 {
            anyhow::bail!("compression должно быть от 0 до 9, получено {}", self.compression);
        }

        if sanitize(&self.fallback).is_empty() {
            anyhow::bail!("fallback \"{}\" пустой после очистки", self.fallback);
        }

        // Валидация правил переопределения
        for (i, rule) in self.overrides.iter().enumerate() {
            if let Some(name) = &rule.name {
                if sanitize(name).is_empty() {
                    anyhow::bail!("name \"{}\" в правиле #{} пустой после очистки", name, i + 1);
                }
            }

            let groups = match &rule.regex {
                Some(pattern) => Regex::new(pattern)
                    .with_context(|| format!("Неверное регулярное выражение в правиле #{}", i + 1))?
                    .captures_len(),
                None => 0,
            };

            if let Some(format) = &rule.format {
                let required = template::required_arguments(format)
                    .with_context(|| format!("Неверный format в правиле #{}", i + 1))?;
                if required > groups {
                    anyhow::bail!(
                        "format \"{}\" в правиле #{} ссылается на {} групп, а regex даёт {}",
                        format,
                        i + 1,
                        required,
                        groups
                    );
                }
            }
        }

        Ok(())
    }

    pub fn is_ignored_parent(&self, name: &str) -> bool {
        self.ignored_parent_set.contains(name)
    }

    pub fn override_pattern(&self, index: usize) -> Option<&Regex> {
        self.override_patterns.get(index).and_then(Option::as_ref)
    }

    /// Fallback-имя в виде сегмента пути
    pub fn fallback_name(&self) -> String {
        sanitize(&self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fallback_name(), "desktop");
        assert!(config.check_window_id);
    }

    #[test]
    fn test_load_from_toml() {
        let toml = r#"
            root_dir = "/tmp/shots"
            fallback = "Desktop"
            ignored_parents = ["Bash", "steam"]
            compression = 6

            [[overrides]]
            name = "java"
            regex = "-jar (\\w+)\\.jar"
            format = "%[2]s"
            yearly = true

            [[overrides]]
            name = "desktop"
            monthly = true
        "#;

        let config = Config::from_figment(Figment::from(Toml::string(toml))).unwrap();

        assert_eq!(config.root_dir, PathBuf::from("/tmp/shots"));
        assert_eq!(config.fallback_name(), "desktop");
        assert!(config.is_ignored_parent("bash"));
        assert!(config.is_ignored_parent("steam"));
        assert!(!config.is_ignored_parent("firefox"));
        assert_eq!(config.overrides.len(), 2);
        assert!(config.override_pattern(0).is_some());
        assert!(config.override_pattern(1).is_none());
        assert!(config.overrides[0].yearly);
        assert!(!config.overrides[0].monthly);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_rule_names_and_grouping_lists_are_sanitized() {
        let toml = r#"
            yearly_applications = ["GIMP", "Krita 5"]
            monthly_applications = ["Telegram Desktop"]

            [[overrides]]
            name = "Firefox"
            yearly = true
        "#;

        let config = Config::from_figment(Figment::from(Toml::string(toml))).unwrap();

        assert_eq!(config.overrides[0].name.as_deref(), Some("firefox"));
        assert_eq!(config.yearly_applications, vec!["gimp", "krita-5"]);
        assert_eq!(config.monthly_applications, vec!["telegram-desktop"]);

        let empty_name = r#"
            [[overrides]]
            name = "***"
        "#;
        assert!(Config::from_figment(Figment::from(Toml::string(empty_name))).is_err());
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        let toml = r#"
            [[overrides]]
            regex = "(unclosed"
        "#;
        assert!(Config::from_figment(Figment::from(Toml::string(toml))).is_err());
    }

    #[test]
    fn test_format_referencing_missing_group_is_rejected() {
        let toml = r#"
            [[overrides]]
            regex = "python (\\w+)"
            format = "%[3]s"
        "#;
        let err = Config::from_figment(Figment::from(Toml::string(toml))).unwrap_err();
        assert!(err.to_string().contains("правиле #1"));

        let no_regex = r#"
            [[overrides]]
            name = "wine"
            format = "%s"
        "#;
        assert!(Config::from_figment(Figment::from(Toml::string(no_regex))).is_err());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = Config::default();
        config.compression = 10;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.fallback = "!!!".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }
}
