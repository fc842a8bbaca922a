use crate::model::ResolvedApplication;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Расширение итогового файла
pub const OUTPUT_EXTENSION: &str = "png";

/// Путь итогового файла.
///
/// | yearly | monthly | шаблон |
/// |---|---|---|
/// | нет | нет | `<dir>/YYYY-MM-DD_hh-mm-ss` |
/// | да | нет | `<dir>/YYYY/MM-DD_hh-mm-ss` |
/// | да | да | `<dir>/YYYY/MM/DD_hh-mm-ss` |
/// | нет | да | `<dir>/YYYY-MM/DD_hh-mm-ss` |
///
/// Время берётся из момента съёмки, а не распознавания.
pub fn destination_path(
    root: &Path,
    application: &ResolvedApplication,
    captured_at: &NaiveDateTime,
    extension: &str,
) -> PathBuf {
    let base = root.join(&application.dir);

    let (dir, file_format) = match (application.yearly, application.monthly) {
        (false, false) => (base, "%Y-%m-%d_%H-%M-%S"),
        (true, false) => (base.join(captured_at.format("%Y").to_string()), "%m-%d_%H-%M-%S"),
        (true, true) => (
            base.join(captured_at.format("%Y").to_string())
                .join(captured_at.format("%m").to_string()),
            "%d_%H-%M-%S",
        ),
        (false, true) => (base.join(captured_at.format("%Y-%m").to_string()), "%d_%H-%M-%S"),
    };

    dir.join(format!("{}.{}", captured_at.format(file_format), extension))
}

/// Путь относительно корня для уведомления
pub fn relative_to_root<'a>(root: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}
