use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Итог распознавания: куда класть скриншот и что делать после
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedApplication {
    /// Сегмент(ы) пути относительно корня, уже очищенные; `/` только от делегата
    pub dir: String,
    pub yearly: bool,
    pub monthly: bool,
    pub callback: Option<PathBuf>,
}

impl ResolvedApplication {
    pub fn new(dir: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            yearly: false,
            monthly: false,
            callback: None,
        }
    }
}

impl fmt::Display for ResolvedApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.dir)?;
        if self.yearly {
            write!(f, " [yearly]")?;
        }
        if self.monthly {
            write!(f, " [monthly]")?;
        }
        if let Some(callback) = &self.callback {
            write!(f, " -> {}", callback.display())?;
        }
        Ok(())
    }
}
