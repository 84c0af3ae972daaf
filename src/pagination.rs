//! This modules defines the common functionality for paging data.

use std::num::IntErrorKind;

use maud::{Markup, html};

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The number of items to display per page.
    pub page_size: u64,
    /// The maximum number of pages to show in the pagination indicator.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: 5,
            max_pages: 5,
        }
    }
}

/// The page to show and how many pages there are in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSelection {
    /// The 1-based page number to display.
    pub page: u64,
    /// The total number of pages, at least one even when there are no items.
    pub page_count: u64,
}

impl PageSelection {
    /// The number of items to skip to reach the selected page.
    pub fn offset(&self, page_size: u64) -> u64 {
        (self.page - 1) * page_size
    }
}

/// Pick the page to display from the raw `page` query parameter.
///
/// A missing or non-integer page gives the first page. A page outside the
/// valid range, including zero, negative numbers and integers too large to
/// parse, gives the last page.
pub fn select_page(raw_page: Option<&str>, item_count: u64, page_size: u64) -> PageSelection {
    let page_size = page_size.max(1);
    let page_count = item_count.div_ceil(page_size).max(1);

    let page = match raw_page.map(|page| page.trim().parse::<i64>()) {
        Some(Ok(page)) if page >= 1 && (page as u64) <= page_count => page as u64,
        Some(Ok(_)) => page_count,
        Some(Err(error))
            if matches!(
                error.kind(),
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow
            ) =>
        {
            page_count
        }
        None | Some(Err(_)) => 1,
    };

    PageSelection { page, page_count }
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

const PAGE_LINK_STYLE: &str = "flex items-center justify-center px-3 h-8 leading-tight \
    text-gray-500 bg-white border border-gray-300 hover:bg-gray-100 hover:text-gray-700 \
    dark:bg-gray-800 dark:border-gray-700 dark:text-gray-400 dark:hover:bg-gray-700 \
    dark:hover:text-white";
const CURRENT_PAGE_STYLE: &str = "flex items-center justify-center px-3 h-8 \
    text-blue-600 border border-gray-300 bg-blue-50 dark:border-gray-700 \
    dark:bg-gray-700 dark:text-white";

/// Render the pagination indicators as a list of links.
///
/// `page_url` maps a page number to the URL that displays it.
pub fn pagination_nav(
    indicators: &[PaginationIndicator],
    page_url: impl Fn(u64) -> String,
) -> Markup {
    html! {
        nav class="pagination" aria-label="Pagination"
        {
            ul class="flex items-center -space-x-px h-8 text-sm"
            {
                @for indicator in indicators {
                    li
                    {
                        @match indicator {
                            PaginationIndicator::Page(page) => {
                                a href=(page_url(*page)) class=(PAGE_LINK_STYLE) { (page) }
                            }
                            PaginationIndicator::CurrPage(page) => {
                                span aria-current="page" class=(CURRENT_PAGE_STYLE) { (page) }
                            }
                            PaginationIndicator::Ellipsis => {
                                span class=(PAGE_LINK_STYLE) { "..." }
                            }
                            PaginationIndicator::BackButton(page) => {
                                a href=(page_url(*page)) class=(PAGE_LINK_STYLE) { "Previous" }
                            }
                            PaginationIndicator::NextButton(page) => {
                                a href=(page_url(*page)) class=(PAGE_LINK_STYLE) { "Next" }
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
    use crate::pagination::{
        PageSelection, PaginationIndicator, create_pagination_indicators, pagination_nav,
        select_page,
    };

    #[test]
    fn select_page_defaults_to_first_page() {
        assert_eq!(
            select_page(None, 12, 5),
            PageSelection {
                page: 1,
                page_count: 3
            }
        );
        assert_eq!(select_page(Some("abc"), 12, 5).page, 1);
    }

    #[test]
    fn select_page_out_of_range_gives_last_page() {
        assert_eq!(select_page(Some("0"), 12, 5).page, 3);
        assert_eq!(select_page(Some("-2"), 12, 5).page, 3);
        assert_eq!(select_page(Some("99"), 12, 5).page, 3);
    }

    #[test]
    fn select_page_too_large_to_parse_gives_last_page() {
        assert_eq!(
            select_page(Some("99999999999999999999"), 12, 5),
            PageSelection {
                page: 3,
                page_count: 3
            }
        );
        assert_eq!(select_page(Some("-99999999999999999999"), 12, 5).page, 3);
    }

    #[test]
    fn select_page_on_empty_list_has_one_page() {
        assert_eq!(
            select_page(Some("4"), 0, 5),
            PageSelection {
                page: 1,
                page_count: 1
            }
        );
    }

    #[test]
    fn page_offset() {
        let selection = select_page(Some("3"), 12, 5);

        assert_eq!(selection.offset(5), 10);
    }

    #[test]
    fn pagination_nav_links_to_pages() {
        let indicators = create_pagination_indicators(2, 3, 5);

        let html = pagination_nav(&indicators, |page| format!("/expenses?page={page}"));

        let document = scraper::Html::parse_fragment(&html.into_string());
        let selector = scraper::Selector::parse("a").unwrap();
        let hrefs = document
            .select(&selector)
            .filter_map(|link| link.value().attr("href"))
            .collect::<Vec<_>>();
        assert_eq!(
            hrefs,
            [
                "/expenses?page=1",
                "/expenses?page=1",
                "/expenses?page=3",
                "/expenses?page=3"
            ]
        );
    }

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
    fn shows_both_buttons_and_trailing_ellipsis() {
        let max_pages = 5;
        let page_count = 10;
        let curr_page = 3;
        let want = [
            PaginationIndicator::BackButton(2),
            PaginationIndicator::Page(1),
            PaginationIndicator::Page(2),
            PaginationIndicator::CurrPage(3),
            PaginationIndicator::Page(4),
            PaginationIndicator::Page(5),
            PaginationIndicator::Ellipsis,
            PaginationIndicator::Page(10),
            PaginationIndicator::NextButton(4),
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
    fn shows_both_buttons_and_leading_ellipsis() {
        let max_pages = 5;
        let page_count = 10;
        let curr_page = 8;
        let want = [
            PaginationIndicator::BackButton(7),
            PaginationIndicator::Page(1),
            PaginationIndicator::Ellipsis,
            PaginationIndicator::Page(6),
            PaginationIndicator::Page(7),
            PaginationIndicator::CurrPage(8),
            PaginationIndicator::Page(9),
            PaginationIndicator::Page(10),
            PaginationIndicator::NextButton(9),
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
}
