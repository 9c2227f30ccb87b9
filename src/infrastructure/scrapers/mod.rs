use crate::error::{Result, SteamerError};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::str::FromStr;

pub(crate) mod chart;
pub(crate) mod filters;
pub(crate) mod game_page;
pub(crate) mod search;

/// Extracts a typed value from a parsed page.
pub trait PageScraper {
    type Output;

    fn scrape(&self, document: &Html, url: &str) -> Result<Self::Output>;
}

static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]").unwrap());

pub fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| SteamerError::Selector(format!("{css}: {e}")))
}

/// All text below the element, trimmed.
pub fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Trimmed text of the first match below `scope`, empty when nothing matches.
pub fn first_text(scope: &ElementRef, selector: &Selector) -> String {
    scope
        .select(selector)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default()
}

pub fn attr(element: &ElementRef, name: &str) -> Option<String> {
    element.value().attr(name).map(|v| v.trim().to_string())
}

/// Drops every character that is not an ASCII letter or digit.
pub fn alphanumeric(text: &str) -> String {
    NON_ALPHANUMERIC.replace_all(text.trim(), "").to_string()
}

/// Parses a number as printed on a page: `"+1,234"`, `"12.5%"`, `" 42 "`.
pub fn parse_number<T: FromStr>(text: &str) -> Option<T> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '+' | '%') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}
