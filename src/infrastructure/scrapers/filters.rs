use super::{attr, parse_selector, PageScraper};
use crate::domain::SearchFilters;
use crate::error::Result;
use scraper::{Html, Selector};

pub struct FilterScraper {
    control: Selector,
}

impl FilterScraper {
    pub fn new() -> Result<Self> {
        Ok(Self {
            control: parse_selector("#additional_search_options div.tab_filter_control")?,
        })
    }
}

impl PageScraper for FilterScraper {
    type Output = SearchFilters;

    fn scrape(&self, document: &Html, _url: &str) -> Result<SearchFilters> {
        let mut filters = SearchFilters::default();

        for element in document.select(&self.control) {
            let (Some(param), Some(value), Some(loc)) = (
                attr(&element, "data-param"),
                attr(&element, "data-value"),
                attr(&element, "data-loc"),
            ) else {
                continue;
            };
            if param.eq_ignore_ascii_case("hide") {
                continue;
            }
            filters.add(&param, &loc, &value);
        }

        Ok(filters)
    }
}
