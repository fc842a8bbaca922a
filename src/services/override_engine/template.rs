//! Name-format templates for override rules.
//!
//! Supported verbs mirror the printf style used by existing configuration files:
//! `%s` / `%v` take the next argument, `%[n]s` takes the n-th argument (1-based,
//! so `%[1]s` is capture group 0), `%%` is a literal percent sign. After
//! `%[n]s` the next plain `%s` continues with argument n + 1.

use crate::error::{Result, ScreenshotError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Argument(usize),
}

fn parse(template: &str) -> Result<Vec<Piece>> {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut next_argument = 0usize;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            literal.push(c);
            continue;
        }

        let index = match chars.next() {
            Some('%') => {
                literal.push('%');
                continue;
            }
            Some('s') | Some('v') => next_argument,
            Some('[') => {
                let mut digits = String::new();
                loop {
                    match chars.next() {
                        Some(']') => break,
                        Some(d) if d.is_ascii_digit() => digits.push(d),
                        _ => {
                            return Err(ScreenshotError::Template(format!(
                                "незакрытый индекс аргумента в \"{}\"",
                                template
                            )))
                        }
                    }
                }
                let position: usize = digits.parse().map_err(|_| {
                    ScreenshotError::Template(format!("пустой индекс аргумента в \"{}\"", template))
                })?;
                if position == 0 {
                    return Err(ScreenshotError::Template(format!(
                        "индексы аргументов начинаются с 1: \"{}\"",
                        template
                    )));
                }
                match chars.next() {
                    Some('s') | Some('v') => position - 1,
                    other => {
                        return Err(ScreenshotError::Template(format!(
                            "неподдерживаемый формат {:?} в \"{}\"",
                            other, template
                        )))
                    }
                }
            }
            other => {
                return Err(ScreenshotError::Template(format!(
                    "неподдерживаемый формат {:?} в \"{}\"",
                    other, template
                )))
            }
        };

        if !literal.is_empty() {
            pieces.push(Piece::Literal(std::mem::take(&mut literal)));
        }
        pieces.push(Piece::Argument(index));
        next_argument = index + 1;
    }

    if !literal.is_empty() {
        pieces.push(Piece::Literal(literal));
    }
    Ok(pieces)
}

/// Сколько аргументов (групп захвата, считая группу 0) нужно шаблону
pub fn required_arguments(template: &str) -> Result<usize> {
    Ok(parse(template)?
        .iter()
        .filter_map(|piece| match piece {
            Piece::Argument(index) => Some(index + 1),
            Piece::Literal(_) => None,
        })
        .max()
        .unwrap_or(0))
}

/// Подставить группы захвата в шаблон
pub fn render<S: AsRef<str>>(template: &str, arguments: &[S]) -> Result<String> {
    let mut output = String::with_capacity(template.len());

    for piece in parse(template)? {
        match piece {
            Piece::Literal(text) => output.push_str(&text),
            Piece::Argument(index) => match arguments.get(index) {
                Some(value) => output.push_str(value.as_ref()),
                None => {
                    return Err(ScreenshotError::Template(format!(
                        "\"{}\" ссылается на группу {}, а доступно групп: {}",
                        template,
                        index,
                        arguments.len()
                    )))
                }
            },
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_sequential_and_indexed() {
        let groups = ["steam_app_42 -game factorio", "42", "factorio"];
        assert_eq!(render("%s", &groups).unwrap(), groups[0]);
        assert_eq!(render("game-%[3]s", &groups).unwrap(), "game-factorio");
        assert_eq!(render("%[2]s/%s", &groups).unwrap(), "42/factorio");
        assert_eq!(render("100%% %v", &groups[1..]).unwrap(), "100% 42");
    }

    #[test]
    fn test_render_static_template_without_groups() {
        let none: [&str; 0] = [];
        assert_eq!(render("games", &none).unwrap(), "games");
        assert_eq!(required_arguments("games").unwrap(), 0);
    }

    #[test]
    fn test_missing_group_is_an_error() {
        let groups = ["whole"];
        let err = render("%s-%s", &groups).unwrap_err();
        assert!(matches!(err, ScreenshotError::Template(_)));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_required_arguments() {
        assert_eq!(required_arguments("%s").unwrap(), 1);
        assert_eq!(required_arguments("%[3]s-%s").unwrap(), 4);
        assert_eq!(required_arguments("%%s").unwrap(), 0);
    }

    #[test]
    fn test_malformed_templates_are_rejected() {
        for bad in ["%d", "%[", "%[0]s", "%[]s", "%[2]x", "trailing %"] {
            assert!(required_arguments(bad).is_err(), "{}", bad);
        }
    }
}
