use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const STEAM_SEARCH_URL: &str = "https://store.steampowered.com/search/";

static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]+").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());
static INPUT_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s,|]+").unwrap());

/// Turns display text into a lookup key: `"Free to Play"` becomes `FREE-TO-PLAY`.
pub fn normalize_key(key: &str) -> String {
    let key = NON_ALPHANUMERIC.replace_all(key.trim(), " ");
    let key = WHITESPACE_RUN.replace_all(&key, " ");
    key.trim().to_uppercase().replace(' ', "-")
}

/// The filter options the search page offers, grouped by query parameter
/// (`tags`, `category1`, `os`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    categories: BTreeMap<String, BTreeMap<String, String>>,
    reverse: BTreeMap<String, String>,
}

impl SearchFilters {
    /// Registers one filter option. `loc` is the human readable label.
    pub fn add(&mut self, param: &str, loc: &str, value: &str) {
        let key = normalize_key(loc);
        if key.is_empty() {
            return;
        }
        self.categories
            .entry(param.to_string())
            .or_default()
            .insert(key.clone(), value.to_string());
        self.reverse.insert(key, param.to_string());
    }

    pub fn categories(&self) -> &BTreeMap<String, BTreeMap<String, String>> {
        &self.categories
    }

    pub fn param_for(&self, key: &str) -> Option<&str> {
        self.reverse.get(key).map(String::as_str)
    }

    pub fn value_for(&self, param: &str, key: &str) -> Option<&str> {
        self.categories
            .get(param)
            .and_then(|options| options.get(key))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Resolves free-form user input into a query. Returns the query and the
    /// input keys no filter matched.
    pub fn resolve<S: AsRef<str>>(&self, inputs: &[S]) -> (SearchQuery, Vec<String>) {
        let mut query = SearchQuery::default();
        let mut unknown = Vec::new();

        for input in inputs {
            let input = input.as_ref();

            // Multi-word labels like "free to play" match as a whole first.
            if let Some((param, value)) = self.lookup(&normalize_key(input)) {
                query.add(param, value);
                continue;
            }

            for word in INPUT_SEPARATOR.split(input) {
                let key = normalize_key(word);
                if key.is_empty() {
                    continue;
                }
                match self.lookup(&key) {
                    Some((param, value)) => query.add(param, value),
                    None => unknown.push(key),
                }
            }
        }

        (query, unknown)
    }

    fn lookup(&self, key: &str) -> Option<(&str, &str)> {
        let param = self.param_for(key)?;
        let value = self.value_for(param, key)?;
        Some((param, value))
    }
}

/// Query parameters for the store search, param to values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    params: BTreeMap<String, Vec<String>>,
}

impl SearchQuery {
    pub fn add(&mut self, param: &str, value: &str) {
        let values = self.params.entry(param.to_string()).or_default();
        if !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .map(|(param, values)| format!("{}={}", param, values.join("%2C")))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// One page of this query on the search endpoint, normally
    /// `STEAM_SEARCH_URL`.
    pub fn page_url(&self, search_url: &str, page: u32) -> String {
        if self.is_empty() {
            format!("{}?page={}", search_url, page)
        } else {
            format!("{}?{}&page={}", search_url, self.to_query_string(), page)
        }
    }
}
