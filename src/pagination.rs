//! Paging for long lists such as the transactions table.

use maud::{Markup, html};
use serde::Deserialize;

use crate::html::LINK_STYLE;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The maximum number of rows to display per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a request may ask for.
    pub max_page_size: u64,
    /// The maximum number of pages to show in the pagination indicator.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 20,
            max_page_size: 100,
            max_pages: 5,
        }
    }
}

/// The page requested via the query string, e.g. `?page=2&per_page=50`.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// The page number to display. Starts from 1.
    pub page: Option<u64>,
    /// The maximum number of rows to display per page.
    pub per_page: Option<u64>,
}

/// A resolved page request with the limit and offset to use in a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u64,
    pub size: u64,
}

impl Page {
    /// Fill in missing or invalid values in `query` from `config`.
    ///
    /// Requested page sizes are capped at `config.max_page_size`.
    pub fn resolve(query: &PageQuery, config: &PaginationConfig) -> Self {
        let number = query.page.filter(|&page| page > 0).unwrap_or(config.default_page);
        let size = query
            .per_page
            .filter(|&size| size > 0)
            .map(|size| size.min(config.max_page_size))
            .unwrap_or(config.default_page_size);

        Self { number, size }
    }

    /// This page, or the last page if the page number is past `page_count`.
    pub fn clamp_to(self, page_count: u64) -> Self {
        Self {
            number: self.number.clamp(1, page_count.max(1)),
            ..self
        }
    }

    pub fn limit(&self) -> u64 {
        self.size
    }

    pub fn offset(&self) -> u64 {
        self.number.saturating_sub(1).saturating_mul(self.size)
    }
}

/// The number of pages needed to show `row_count` rows, at least one.
pub fn page_count(row_count: u64, page_size: u64) -> u64 {
    row_count.div_ceil(page_size.max(1)).max(1)
}

#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    Page(u64),
    CurrPage(u64),
    Ellipsis,
    NextButton(u64),
    BackButton(u64),
}

pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let map_page = |page| {
        if page == curr_page {
            PaginationIndicator::CurrPage(page)
        } else {
            PaginationIndicator::Page(page)
        }
    };

    let mut indicators: Vec<PaginationIndicator> = if page_count <= max_pages {
        (1..=page_count).map(map_page).collect()
    } else if curr_page <= (max_pages / 2) {
        (1..=max_pages).map(map_page).collect()
    } else if curr_page > (page_count - max_pages / 2) {
        ((page_count - max_pages + 1)..=page_count)
            .map(map_page)
            .collect()
    } else {
        ((curr_page - max_pages / 2)..=(curr_page + max_pages / 2))
            .map(map_page)
            .collect()
    };

    if page_count > max_pages {
        if curr_page > (max_pages / 2) + 1 {
            indicators.insert(0, PaginationIndicator::Page(1));
            indicators.insert(1, PaginationIndicator::Ellipsis);
        }

        if curr_page < (page_count - max_pages / 2) {
            indicators.push(PaginationIndicator::Ellipsis);
            indicators.push(PaginationIndicator::Page(page_count));
        }
    }

    if curr_page > 1 {
        indicators.insert(0, PaginationIndicator::BackButton(curr_page - 1));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}

/// Render `indicators` as a list of page links.
///
/// `page_url` builds the link for a page number.
pub fn pagination_nav(
    indicators: &[PaginationIndicator],
    page_url: impl Fn(u64) -> String,
) -> Markup {
    html! {
        nav class="pagination flex justify-center my-4" aria-label="Pagination"
        {
            ul class="pagination flex items-center gap-3"
            {
                @for indicator in indicators
                {
                    li
                    {
                        @match indicator
                        {
                            PaginationIndicator::Page(page) => {
                                a href=(page_url(*page)) class=(LINK_STYLE) { (page) }
                            }
                            PaginationIndicator::CurrPage(page) => {
                                p aria-current="page" class="font-bold" { (page) }
                            }
                            PaginationIndicator::Ellipsis => { "..." }
                            PaginationIndicator::BackButton(page) => {
                                a href=(page_url(*page)) role="button" class=(LINK_STYLE) { "Back" }
                            }
                            PaginationIndicator::NextButton(page) => {
                                a href=(page_url(*page)) role="button" class=(LINK_STYLE) { "Next" }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::{
        Page, PageQuery, PaginationConfig, PaginationIndicator, create_pagination_indicators,
        page_count, pagination_nav,
    };

    #[test]
    fn shows_all_pages() {
        let max_pages = 5;
        let page_count = 5;
        let curr_page = 1;
        let want = [
            PaginationIndicator::CurrPage(1),
            PaginationIndicator::Page(2),
            PaginationIndicator::Page(3),
            PaginationIndicator::Page(4),
            PaginationIndicator::Page(5),
            PaginationIndicator::NextButton(2),
        ];

        let got = create_pagination_indicators(curr_page, page_count, max_pages);

        assert_eq!(want, got.as_slice());
    }

    #[test]
    fn shows_page_subset_on_left() {
        let max_pages = 5;
        let page_count = 10;
        let curr_page = 1;
        let want = [
            PaginationIndicator::CurrPage(1),
            PaginationIndicator::Page(2),
            PaginationIndicator::Page(3),
            PaginationIndicator::Page(4),
            PaginationIndicator::Page(5),
            PaginationIndicator::Ellipsis,
            PaginationIndicator::Page(10),
            PaginationIndicator::NextButton(2),
        ];

        let got = create_pagination_indicators(curr_page, page_count, max_pages);

        assert_eq!(want, got.as_slice());
    }

    #[test]
    fn shows_page_subset_on_right() {
        let max_pages = 5;
        let page_count = 10;
        let curr_page = 10;
        let want = [
            PaginationIndicator::BackButton(9),
            PaginationIndicator::Page(1),
            PaginationIndicator::Ellipsis,
            PaginationIndicator::Page(6),
            PaginationIndicator::Page(7),
            PaginationIndicator::Page(8),
            PaginationIndicator::Page(9),
            PaginationIndicator::CurrPage(10),
        ];

        let got = create_pagination_indicators(curr_page, page_count, max_pages);

        assert_eq!(want, got.as_slice());
    }

    #[test]
    fn pagination_indicator_shows_page_subset_in_center() {
        let max_pages = 5;
        let page_count = 10;
        let curr_page = 5;
        let want = [
            PaginationIndicator::BackButton(4),
            PaginationIndicator::Page(1),
            PaginationIndicator::Ellipsis,
            PaginationIndicator::Page(3),
            PaginationIndicator::Page(4),
            PaginationIndicator::CurrPage(5),
            PaginationIndicator::Page(6),
            PaginationIndicator::Page(7),
            PaginationIndicator::Ellipsis,
            PaginationIndicator::Page(10),
            PaginationIndicator::NextButton(6),
        ];

        let got = create_pagination_indicators(curr_page, page_count, max_pages);

        assert_eq!(want, got.as_slice());
    }

    #[test]
    fn resolve_page_uses_defaults_for_missing_and_zero_values() {
        let config = PaginationConfig::default();

        let got = Page::resolve(
            &PageQuery {
                page: Some(0),
                per_page: None,
            },
            &config,
        );

        assert_eq!(got, Page { number: 1, size: 20 });
        assert_eq!(got.offset(), 0);
    }

    #[test]
    fn resolve_page_caps_huge_page_sizes() {
        let config = PaginationConfig::default();

        let got = Page::resolve(
            &PageQuery {
                page: Some(10_000_000_000),
                per_page: Some(10_000_000_000),
            },
            &config,
        );

        assert_eq!(
            got,
            Page {
                number: 10_000_000_000,
                size: config.max_page_size
            }
        );
        assert_eq!(got.clamp_to(3), Page { number: 3, size: 100 });
    }

    #[test]
    fn page_offset_saturates_instead_of_overflowing() {
        let page = Page {
            number: u64::MAX,
            size: u64::MAX,
        };

        assert_eq!(page.offset(), u64::MAX);
    }

    #[test]
    fn clamp_keeps_pages_in_range() {
        let page = Page { number: 2, size: 10 };

        assert_eq!(page.clamp_to(5), page);
        assert_eq!(page.clamp_to(0), Page { number: 1, size: 10 });
        assert_eq!(Page { number: 0, size: 10 }.clamp_to(5).offset(), 0);
    }

    #[test]
    fn page_offset_skips_previous_pages() {
        let page = Page { number: 3, size: 10 };

        assert_eq!(page.limit(), 10);
        assert_eq!(page.offset(), 20);
    }

    #[test]
    fn page_count_rounds_up_and_is_at_least_one() {
        assert_eq!(page_count(0, 20), 1);
        assert_eq!(page_count(20, 20), 1);
        assert_eq!(page_count(21, 20), 2);
    }

    #[test]
    fn nav_links_to_pages_and_marks_current_page() {
        let indicators = create_pagination_indicators(2, 3, 5);

        let markup = pagination_nav(&indicators, |page| format!("/transactions?page={page}"));
        let html = Html::parse_fragment(&markup.into_string());

        let links: Vec<&str> = html
            .select(&Selector::parse("a").unwrap())
            .filter_map(|link| link.value().attr("href"))
            .collect();
        assert_eq!(
            links,
            [
                "/transactions?page=1",
                "/transactions?page=1",
                "/transactions?page=3",
                "/transactions?page=3"
            ]
        );
        let current = html
            .select(&Selector::parse("[aria-current='page']").unwrap())
            .next()
            .expect("No current page indicator");
        assert_eq!(current.text().collect::<String>(), "2");
    }
}
