//! Server-rendered page shells. Charts and tables are filled in by the
//! page scripts from the JSON API.

const LAYOUT_HTML: &str = include_str!("../../templates/layout.html");
const NAV_HTML: &str = include_str!("../../templates/nav.html");
const HOME_HTML: &str = include_str!("../../templates/home.html");
const SEARCH_HTML: &str = include_str!("../../templates/search.html");
const CHARTS_JS: &str = include_str!("../../templates/charts.js");
const HOME_JS: &str = include_str!("../../templates/home.js");
const SEARCH_JS: &str = include_str!("../../templates/search.js");

pub const SEARCH_PATH: &str = "/page-2";

/// Which layout a path renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Search,
}

impl Page {
    /// `/page-2` is the search table; every other path is the home page.
    pub fn from_path(path: &str) -> Self {
        if path == SEARCH_PATH {
            Page::Search
        } else {
            Page::Home
        }
    }
}

fn nav(active: Page) -> String {
    let mark = |page: Page| if page == active { " active" } else { "" };
    NAV_HTML
        .replace("{{HOME_ACTIVE}}", mark(Page::Home))
        .replace("{{SEARCH_ACTIVE}}", mark(Page::Search))
}

fn layout(page: Page, title: &str, content: &str, script: &str) -> String {
    LAYOUT_HTML
        .replace("{{TITLE}}", title)
        .replace("{{NAV}}", &nav(page))
        .replace("{{CONTENT}}", content)
        .replace("{{CHARTS_JS}}", CHARTS_JS)
        .replace("{{PAGE_JS}}", script)
}

/// Home page: year dropdown (first year preselected), search box, the two
/// charts and the search-results list.
pub fn home_page(years: &[i64], selected: Option<i64>) -> String {
    let options: String = years
        .iter()
        .map(|year| {
            let attr = if Some(*year) == selected { " selected" } else { "" };
            format!("                <option value=\"{year}\"{attr}>{year}</option>\n")
        })
        .collect();
    let content = HOME_HTML.replace("{{YEAR_OPTIONS}}\n", &options);
    layout(Page::Home, "Home", &content, HOME_JS)
}

/// Search page: free-text box over the paginated data table.
pub fn search_page(page_size: usize) -> String {
    let content = SEARCH_HTML.replace("{{PAGE_SIZE}}", &page_size.to_string());
    layout(Page::Search, "Search", &content, SEARCH_JS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_falls_back_to_home() {
        assert_eq!(Page::from_path("/"), Page::Home);
        assert_eq!(Page::from_path("/page-2"), Page::Search);
        assert_eq!(Page::from_path("/page-3"), Page::Home);
    }

    #[test]
    fn test_home_page_lists_years_with_first_selected() {
        let html = home_page(&[2023, 2022], Some(2023));
        assert!(html.contains(r#"<option value="2023" selected>2023</option>"#));
        assert!(html.contains(r#"<option value="2022">2022</option>"#));
        assert!(html.contains(r#"id="month-bar-chart""#));
        assert!(html.contains(r#"id="playlist-scatter-plot""#));
        assert!(html.contains(r#"id="search-results""#));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_search_page_carries_page_size() {
        let html = search_page(10);
        assert!(html.contains(r#"data-page-size="10""#));
        assert!(html.contains(r#"id="data-table-container""#));
        assert!(html.contains(r#"class="nav-link active" href="/page-2""#));
        assert!(!html.contains("{{"));
    }
}
