//! Bracket markup for free-form output.
//!
//! `[bold green]ok[/bold green]` and `[red]x[/]` style tags, in the spirit of
//! terminal markup languages. A bracketed run is a tag only when every word
//! in it is a known style word; anything else (`[1/3]`, `[INFO]`) stays
//! literal. `\[` always produces a literal `[`.

use std::sync::OnceLock;

use console::Style;
use regex::Regex;

const COLORS: [&str; 8] = [
    "black", "red", "green", "yellow", "blue", "magenta", "cyan", "white",
];

const ATTRIBUTES: [&str; 10] = [
    "bold",
    "dim",
    "italic",
    "underline",
    "underlined",
    "blink",
    "reverse",
    "hidden",
    "strike",
    "strikethrough",
];

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| {
        Regex::new(r"\\\[|\[(/?)([A-Za-z0-9_ ]*)\]").expect("markup tag pattern is valid")
    })
}

fn is_style_word(word: &str) -> bool {
    let word = word.to_ascii_lowercase();
    let color = word
        .strip_prefix("on_")
        .unwrap_or(&word)
        .trim_start_matches("bright_")
        .to_string();
    ATTRIBUTES.contains(&word.as_str())
        || COLORS.contains(&color.as_str())
        || color.parse::<u8>().is_ok()
}

fn apply_word(style: Style, word: &str) -> Style {
    let word = word.to_ascii_lowercase();
    if let Some(bg) = word.strip_prefix("on_") {
        let (bright, name) = match bg.strip_prefix("bright_") {
            Some(name) => (true, name),
            None => (false, bg),
        };
        let style = match name {
            "black" => style.on_black(),
            "red" => style.on_red(),
            "green" => style.on_green(),
            "yellow" => style.on_yellow(),
            "blue" => style.on_blue(),
            "magenta" => style.on_magenta(),
            "cyan" => style.on_cyan(),
            "white" => style.on_white(),
            other => match other.parse::<u8>() {
                Ok(n) => style.on_color256(n),
                Err(_) => style,
            },
        };
        return if bright { style.on_bright() } else { style };
    }

    let (bright, name) = match word.strip_prefix("bright_") {
        Some(name) => (true, name),
        None => (false, word.as_str()),
    };
    let style = match name {
        "black" => style.black(),
        "red" => style.red(),
        "green" => style.green(),
        "yellow" => style.yellow(),
        "blue" => style.blue(),
        "magenta" => style.magenta(),
        "cyan" => style.cyan(),
        "white" => style.white(),
        "bold" => style.bold(),
        "dim" => style.dim(),
        "italic" => style.italic(),
        "underline" | "underlined" => style.underlined(),
        "blink" => style.blink(),
        "reverse" => style.reverse(),
        "hidden" => style.hidden(),
        "strike" | "strikethrough" => style.strikethrough(),
        other => match other.parse::<u8>() {
            Ok(n) => style.color256(n),
            Err(_) => style,
        },
    };
    if bright { style.bright() } else { style }
}

/// Build a style from space-separated style words (`"bold red on_white"`).
#[must_use]
pub fn style_from_words(words: &str) -> Style {
    words.split_whitespace().fold(Style::new(), apply_word)
}

/// A run of text and the tags open over it, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub tags: Vec<String>,
}

impl Segment {
    /// Combined style of every open tag.
    #[must_use]
    pub fn style(&self) -> Style {
        style_from_words(&self.tags.join(" "))
    }
}

/// Split markup into styled segments.
#[must_use]
pub fn parse(markup: &str) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut last = 0;

    for caps in tag_pattern().captures_iter(markup) {
        let Some(whole) = caps.get(0) else { continue };
        text.push_str(&markup[last..whole.start()]);
        last = whole.end();

        if whole.as_str() == "\\[" {
            text.push('[');
            continue;
        }

        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let body = caps.get(2).map_or("", |m| m.as_str()).trim();

        if closing {
            let position = if body.is_empty() {
                open.len().checked_sub(1)
            } else {
                open.iter().rposition(|tag| tag == body)
            };
            match position {
                Some(index) => {
                    flush(&mut text, &open, &mut segments);
                    open.remove(index);
                }
                None => text.push_str(whole.as_str()),
            }
        } else if !body.is_empty() && body.split_whitespace().all(is_style_word) {
            flush(&mut text, &open, &mut segments);
            open.push(body.to_string());
        } else {
            text.push_str(whole.as_str());
        }
    }

    text.push_str(&markup[last..]);
    flush(&mut text, &open, &mut segments);
    segments
}

fn flush(text: &mut String, open: &[String], segments: &mut Vec<Segment>) {
    if !text.is_empty() {
        segments.push(Segment {
            text: std::mem::take(text),
            tags: open.to_vec(),
        });
    }
}

/// Render markup to a string, with ANSI styling when `styled` is set.
#[must_use]
pub fn render(markup: &str, styled: bool) -> String {
    parse(markup)
        .into_iter()
        .map(|segment| {
            if styled && !segment.tags.is_empty() {
                segment
                    .style()
                    .force_styling(true)
                    .apply_to(&segment.text)
                    .to_string()
            } else {
                segment.text
            }
        })
        .collect()
}

/// Remove markup tags, keeping the text.
#[must_use]
pub fn strip_markup(markup: &str) -> String {
    render(markup, false)
}

/// Escape text so it renders literally when passed through [`render`].
#[must_use]
pub fn escape(text: &str) -> String {
    text.replace('[', "\\[")
}
