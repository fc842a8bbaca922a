use crate::config::{Config, OverrideRule};
use crate::error::Result;
use crate::model::ResolvedApplication;
use crate::services::process_resolver::{ProcessNode, ProcessTable};
use crate::utils::sanitize;
use tracing::{debug, info};

use super::delegate::DelegateRunner;
use super::environment::{DelegateEnvironment, DIR};
use super::template;

/// Применяет правила переопределения к распознанному имени
pub struct OverrideEngine<'a> {
    config: &'a Config,
    processes: &'a dyn ProcessTable,
    delegates: &'a dyn DelegateRunner,
}

impl<'a> OverrideEngine<'a> {
    pub fn new(
        config: &'a Config,
        processes: &'a dyn ProcessTable,
        delegates: &'a dyn DelegateRunner,
    ) -> Self {
        Self {
            config,
            processes,
            delegates,
        }
    }

    /// Первое полностью совпавшее правило задаёт каталог, группировку и callback.
    ///
    /// Без совпадений остаётся исходное имя и группировка по умолчанию. Ошибкой
    /// считаются только неверный шаблон и сбой чтения командной строки.
    pub fn apply(
        &self,
        name: &str,
        process: Option<&ProcessNode>,
        env: &mut DelegateEnvironment,
    ) -> Result<ResolvedApplication> {
        debug!("Имя до переопределений: {}", name);
        env.set_identity(name, name);

        for (index, rule) in self.config.overrides.iter().enumerate() {
            env.set_identity(name, name);

            if let Some(application) = self.apply_rule(index, rule, name, process, env)? {
                info!("Сработало правило #{}: {}", index + 1, application);
                return Ok(application);
            }
        }

        Ok(self.default_application(name))
    }

    fn apply_rule(
        &self,
        index: usize,
        rule: &OverrideRule,
        name: &str,
        process: Option<&ProcessNode>,
        env: &mut DelegateEnvironment,
    ) -> Result<Option<ResolvedApplication>> {
        if rule.name.as_deref().is_some_and(|expected| expected != name) {
            return Ok(None);
        }

        let groups: Vec<String> = match self.config.override_pattern(index) {
            Some(pattern) => {
                let Some(process) = process else {
                    return Ok(None);
                };
                let command_line = self.processes.command_line(process)?;
                let Some(captures) = pattern.captures(&command_line) else {
                    return Ok(None);
                };
                captures
                    .iter()
                    .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                    .collect()
            }
            None => Vec::new(),
        };

        let formatted = match &rule.format {
            Some(format) => sanitize(&template::render(format, &groups)?),
            None => String::new(),
        };
        if !formatted.is_empty() {
            debug!("Правило #{}: format дал {}", index + 1, formatted);
            env.set_identity(&formatted, &formatted);
        }

        let mut delegated = String::new();
        if let Some(delegate) = &rule.delegate {
            match self.delegates.run(delegate, env) {
                Some(dir) => delegated = dir,
                // Отказ делегата отменяет правило целиком, даже при удачном format
                None => return Ok(None),
            }
        }

        let dir = [delegated.as_str(), formatted.as_str(), name]
            .into_iter()
            .find(|candidate| !candidate.is_empty())
            .unwrap_or_default()
            .to_string();
        env.set(DIR, dir.as_str());

        Ok(Some(ResolvedApplication {
            dir,
            yearly: rule.yearly,
            monthly: rule.monthly,
            callback: rule.callback.clone().or_else(|| self.config.callback.clone()),
        }))
    }

    fn default_application(&self, name: &str) -> ResolvedApplication {
        let contains = |list: &[String]| list.iter().any(|entry| entry == name);

        ResolvedApplication {
            yearly: contains(&self.config.yearly_applications),
            monthly: contains(&self.config.monthly_applications),
            callback: self.config.callback.clone(),
            ..ResolvedApplication::new(name)
        }
    }
}
