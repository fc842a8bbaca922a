use once_cell::sync::Lazy;
use regex::Regex;

// Буквы, цифры и `-_+=`; всё остальное схлопывается в один дефис
static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\-_+=]+").unwrap());
static REPEATED_HYPHENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"--+").unwrap());

/// Превращает произвольный текст в безопасный сегмент пути.
///
/// Результат в нижнем регистре, без `/`, без ведущих/хвостовых дефисов
/// и без повторяющихся дефисов. Пустая строка означает "имени нет".
pub fn sanitize(input: &str) -> String {
    let lower = input.to_lowercase();
    let replaced = UNSAFE_CHARS.replace_all(&lower, "-");
    let collapsed = REPEATED_HYPHENS.replace_all(&replaced, "-");
    collapsed.trim_matches('-').to_string()
}
