use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::trace;

use crate::utils::error::{AppError, Result};

/// Placeholder the site shows for parameters the advertiser left empty.
const NO_INFORMATION: &str = "brak informacji";

/// A listing page viewed both as raw markup and as visible text.
///
/// The visible text holds one trimmed text node per line and skips
/// `script`/`style` content, so label/value pairs rendered in separate
/// elements end up on consecutive lines.
pub struct PageView<'a> {
    markup: &'a str,
    document: Html,
    text: String,
}

impl<'a> PageView<'a> {
    pub fn parse(markup: &'a str) -> Self {
        let document = Html::parse_document(markup);
        let text = visible_text(&document);
        Self {
            markup,
            document,
            text,
        }
    }

    pub fn markup(&self) -> &str {
        self.markup
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

fn visible_text(document: &Html) -> String {
    let mut lines = Vec::new();

    for node in document.tree.root().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element())
            .map(|element| matches!(element.name(), "script" | "style" | "noscript" | "template"))
            .unwrap_or(false);
        if hidden {
            continue;
        }

        let line = collapse_whitespace(text);
        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines.join("\n")
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|_| AppError::InvalidSelector {
        selector: selector.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Haystack {
    Text,
    Markup,
}

/// One way of locating a field's raw value on a page.
pub enum Matcher {
    /// Text of each element matching the selector, in document order.
    Element(Selector),
    /// An attribute of each element matching the selector.
    Attribute(Selector, &'static str),
    /// First capture group of every match of the pattern.
    Pattern(Haystack, Regex),
}

impl Matcher {
    pub fn element(selector: &str) -> Result<Self> {
        Ok(Matcher::Element(parse_selector(selector)?))
    }

    pub fn attribute(selector: &str, attribute: &'static str) -> Result<Self> {
        Ok(Matcher::Attribute(parse_selector(selector)?, attribute))
    }

    pub fn text(pattern: &str) -> Result<Self> {
        Ok(Matcher::Pattern(Haystack::Text, Regex::new(pattern)?))
    }

    pub fn markup(pattern: &str) -> Result<Self> {
        Ok(Matcher::Pattern(Haystack::Markup, Regex::new(pattern)?))
    }

    fn candidates(&self, page: &PageView<'_>) -> Vec<String> {
        match self {
            Matcher::Element(selector) => page
                .document()
                .select(selector)
                .map(element_text)
                .filter(|text| !text.is_empty())
                .collect(),
            Matcher::Attribute(selector, attribute) => page
                .document()
                .select(selector)
                .filter_map(|element| element.value().attr(attribute))
                .map(collapse_whitespace)
                .filter(|value| !value.is_empty())
                .collect(),
            Matcher::Pattern(Haystack::Text, regex) => captures(regex, page.text()),
            Matcher::Pattern(Haystack::Markup, regex) => captures(regex, page.markup()),
        }
    }

    fn text_candidates(&self, text: &str) -> Vec<String> {
        match self {
            Matcher::Pattern(Haystack::Text, regex) => captures(regex, text),
            _ => Vec::new(),
        }
    }
}

fn captures(regex: &Regex, haystack: &str) -> Vec<String> {
    regex
        .captures_iter(haystack)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Ordered fallback matchers for a single field plus the conversion applied
/// to each candidate. The first candidate that converts wins; a candidate that
/// fails to convert only moves on to the next one.
pub struct FieldRule<T> {
    name: &'static str,
    matchers: Vec<Matcher>,
    convert: fn(&str) -> Option<T>,
}

impl<T> FieldRule<T> {
    pub fn new(name: &'static str, convert: fn(&str) -> Option<T>) -> Self {
        Self {
            name,
            matchers: Vec::new(),
            convert,
        }
    }

    pub fn with(mut self, matcher: Matcher) -> Self {
        self.matchers.push(matcher);
        self
    }

    pub fn extract(&self, page: &PageView<'_>) -> Option<T> {
        self.first_match(|matcher| matcher.candidates(page))
    }

    /// Like [`FieldRule::extract`] but over a bare text region; only text
    /// patterns take part.
    pub fn extract_text(&self, text: &str) -> Option<T> {
        self.first_match(|matcher| matcher.text_candidates(text))
    }

    fn first_match<F>(&self, candidates: F) -> Option<T>
    where
        F: Fn(&Matcher) -> Vec<String>,
    {
        for (index, matcher) in self.matchers.iter().enumerate() {
            for candidate in candidates(matcher) {
                if let Some(value) = (self.convert)(&candidate) {
                    trace!(field = self.name, matcher = index, "field matched");
                    return Some(value);
                }
            }
        }
        None
    }
}

/// Integer from whatever digits the text contains: `"350 000 zł"` → 350000.
pub fn parse_integer(text: &str) -> Option<i64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Listing price; a zero placeholder from embedded data is not a price.
pub fn parse_price(text: &str) -> Option<i64> {
    parse_integer(text).filter(|price| *price > 0)
}

/// Decimal with a comma or dot separator: `"52,5 m²"` → 52.5.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let number: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect::<String>()
        .replace(',', ".");
    number.parse::<f64>().ok().filter(|value| value.is_finite())
}

pub fn parse_text(text: &str) -> Option<String> {
    let value = collapse_whitespace(text);
    if value.is_empty() || value.eq_ignore_ascii_case(NO_INFORMATION) {
        return None;
    }
    Some(value)
}

/// Text after a label. A value that is itself a label means the parameter
/// was left empty.
pub fn parse_value(text: &str) -> Option<String> {
    parse_text(text).filter(|value| !value.ends_with(':'))
}

/// `tak` / `nie` → true / false; anything else is unknown.
pub fn parse_yes_no(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "tak" => Some(true),
        "nie" => Some(false),
        _ => None,
    }
}
