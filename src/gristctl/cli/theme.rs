//! Styled template rendering.
//!
//! Templates are minijinja sources that apply named styles through a `style` filter:
//!
//! ```jinja
//! {{ doc.name | style("title") }}
//! ```
//!
//! Styles are `console::Style`s registered by name in a [`Theme`]. When stdout does
//! not support colors (pipes, `TERM=dumb`) the filter returns the plain text. Unknown
//! style names are prefixed with `(!?)` so typos in templates show up immediately.

use console::{Style, Term};
use minijinja::{Environment, Error, Value};
use serde::Serialize;
use std::collections::HashMap;

pub const MISSING_STYLE_INDICATOR: &str = "(!?)";

#[derive(Clone, Default)]
pub struct Theme {
    styles: HashMap<String, Style>,
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a named style.
    pub fn add(mut self, name: &str, style: Style) -> Self {
        self.styles.insert(name.to_string(), style);
        self
    }

    pub fn apply(&self, name: &str, text: &str, use_color: bool) -> String {
        match self.styles.get(name) {
            Some(style) if use_color => style.apply_to(text).to_string(),
            Some(_) => text.to_string(),
            None => format!("{} {}", MISSING_STYLE_INDICATOR, text),
        }
    }
}

/// Render with colors when stdout supports them.
pub fn render<T: Serialize>(template: &str, data: &T, theme: &Theme) -> Result<String, Error> {
    let use_color = Term::stdout().features().colors_supported();
    render_with_color(template, data, theme, use_color)
}

pub fn render_with_color<T: Serialize>(
    template: &str,
    data: &T,
    theme: &Theme,
    use_color: bool,
) -> Result<String, Error> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);

    let styles = theme.clone();
    env.add_filter("style", move |value: Value, name: String| -> String {
        styles.apply(&name, &value.to_string(), use_color)
    });

    env.add_template_owned("_inline".to_string(), template.to_string())?;
    env.get_template("_inline")?.render(data)
}

/// Nearest ANSI 256-color palette index for an RGB triplet.
pub fn rgb_to_ansi256((r, g, b): (u8, u8, u8)) -> u8 {
    if r == g && g == b {
        if r < 8 {
            16
        } else if r > 248 {
            231
        } else {
            232 + ((r as u16 - 8) * 24 / 247) as u8
        }
    } else {
        let red = (r as u16 * 5 / 255) as u8;
        let green = (g as u16 * 5 / 255) as u8;
        let blue = (b as u16 * 5 / 255) as u8;
        16 + 36 * red + 6 * green + blue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Data {
        name: String,
    }

    fn theme() -> Theme {
        Theme::new().add("ok", Style::new().green().force_styling(true))
    }

    #[test]
    fn plain_output_without_color() {
        let out = render_with_color(
            r#"{{ name | style("ok") }}"#,
            &Data { name: "done".into() },
            &theme(),
            false,
        )
        .unwrap();
        assert_eq!(out, "done");
    }

    #[test]
    fn colored_output_contains_ansi() {
        let out = render_with_color(
            r#"{{ name | style("ok") }}"#,
            &Data { name: "done".into() },
            &theme(),
            true,
        )
        .unwrap();
        assert!(out.contains("\x1b["));
        assert!(out.contains("done"));
    }

    #[test]
    fn unknown_style_is_flagged() {
        assert_eq!(theme().apply("typo", "x", false), "(!?) x");
    }

    #[test]
    fn gray_maps_to_grayscale_ramp() {
        assert_eq!(rgb_to_ansi256((0, 0, 0)), 16);
        assert_eq!(rgb_to_ansi256((255, 255, 255)), 231);
        assert!(rgb_to_ansi256((154, 154, 154)) >= 232);
    }
}
