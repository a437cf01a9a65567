//! Data table component.
//!
//! Every admin listing is a sortable, searchable, paginated table driven by
//! query parameters (`?q=&sort=&dir=&page=&status=`). A collection opts in by
//! implementing [`TableRow`]; [`TableQuery::apply`] does the rest and
//! returns the rows for one page plus the state the template needs to build
//! header and pagination links.

use std::cmp::Ordering;

use serde::Deserialize;
use url::form_urlencoded;

/// Rows per page.
pub const PAGE_SIZE: usize = 10;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    fn parse(raw: Option<&str>) -> Option<Self> {
        match raw? {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// A collection item that can be listed in a data table.
pub trait TableRow {
    /// Sort keys accepted in `?sort=`.
    const SORT_COLUMNS: &'static [&'static str];

    /// Sort used when the query names none (or an unknown one).
    const DEFAULT_SORT: (&'static str, SortDir);

    /// Whether the row matches a lowercase search term.
    fn matches(&self, term: &str) -> bool;

    /// Compare two rows by one of [`Self::SORT_COLUMNS`].
    fn compare(&self, other: &Self, column: &str) -> Ordering;

    /// Status value used by the `?status=` filter, for tables that have one.
    fn status(&self) -> Option<&str> {
        None
    }
}

/// Column definition for a data table.
#[derive(Debug, Clone)]
pub struct TableColumn {
    /// Sort key for the column.
    pub key: &'static str,
    /// Display label for the column header.
    pub label: &'static str,
    /// Whether the column is sortable.
    pub sortable: bool,
}

impl TableColumn {
    /// Create a new sortable column.
    #[must_use]
    pub const fn sortable(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            sortable: true,
        }
    }

    /// Create a new non-sortable column.
    #[must_use]
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            sortable: false,
        }
    }
}

/// Option for the status filter dropdown.
#[derive(Debug, Clone)]
pub struct FilterOption {
    /// Option value.
    pub value: &'static str,
    /// Display label.
    pub label: &'static str,
}

impl FilterOption {
    /// Create a new filter option.
    #[must_use]
    pub const fn new(value: &'static str, label: &'static str) -> Self {
        Self { value, label }
    }
}

/// Configuration for a data table.
#[derive(Debug, Clone)]
pub struct DataTableConfig {
    /// Listing path the table links back to.
    pub path: &'static str,
    /// Column definitions.
    pub columns: Vec<TableColumn>,
    /// Status filter options; empty hides the filter.
    pub status_options: Vec<FilterOption>,
    /// Search placeholder text.
    pub search_placeholder: &'static str,
    /// Message for an empty result.
    pub empty_title: &'static str,
}

impl DataTableConfig {
    /// Create a new data table configuration.
    #[must_use]
    pub const fn new(path: &'static str) -> Self {
        Self {
            path,
            columns: Vec::new(),
            status_options: Vec::new(),
            search_placeholder: "Search...",
            empty_title: "No items found",
        }
    }

    /// Add a column.
    #[must_use]
    pub fn column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Add a status filter option.
    #[must_use]
    pub fn status_option(mut self, option: FilterOption) -> Self {
        self.status_options.push(option);
        self
    }

    /// Set search placeholder.
    #[must_use]
    pub const fn search_placeholder(mut self, placeholder: &'static str) -> Self {
        self.search_placeholder = placeholder;
        self
    }

    /// Set empty state message.
    #[must_use]
    pub const fn empty_title(mut self, title: &'static str) -> Self {
        self.empty_title = title;
        self
    }

    #[must_use]
    pub fn has_status_filter(&self) -> bool {
        !self.status_options.is_empty()
    }
}

/// Table query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableQuery {
    pub q: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub page: Option<usize>,
    pub status: Option<String>,
}

impl TableQuery {
    /// Filter, sort and paginate `rows`.
    ///
    /// Unknown sort keys fall back to the row type's default sort; a page
    /// past the end is clamped to the last page.
    pub fn apply<T: TableRow>(&self, config: &DataTableConfig, rows: Vec<T>) -> Page<T> {
        let q = self.q.as_deref().map(str::trim).unwrap_or_default().to_string();
        let term = q.to_lowercase();
        let status = self
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let (default_column, default_dir) = T::DEFAULT_SORT;
        let (sort, dir) = match self.sort.as_deref() {
            Some(column) if T::SORT_COLUMNS.contains(&column) => (
                column.to_string(),
                SortDir::parse(self.dir.as_deref()).unwrap_or(SortDir::Asc),
            ),
            _ => (
                default_column.to_string(),
                SortDir::parse(self.dir.as_deref()).unwrap_or(default_dir),
            ),
        };

        let mut rows: Vec<T> = rows
            .into_iter()
            .filter(|row| term.is_empty() || row.matches(&term))
            .filter(|row| status.as_deref().is_none_or(|s| row.status() == Some(s)))
            .collect();
        rows.sort_by(|a, b| {
            let ordering = a.compare(b, &sort);
            match dir {
                SortDir::Asc => ordering,
                SortDir::Desc => ordering.reverse(),
            }
        });

        let total = rows.len();
        let total_pages = total.div_ceil(PAGE_SIZE).max(1);
        let page = self.page.unwrap_or(1).clamp(1, total_pages);
        let rows = rows
            .into_iter()
            .skip((page - 1) * PAGE_SIZE)
            .take(PAGE_SIZE)
            .collect();

        Page {
            rows,
            state: TableState {
                path: config.path,
                q,
                status,
                sort,
                dir,
                page,
                total_pages,
                total,
            },
        }
    }
}

/// One page of rows.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub state: TableState,
}

impl<T> Page<T> {
    /// Convert the rows (typically into template views).
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            rows: self.rows.into_iter().map(f).collect(),
            state: self.state,
        }
    }
}

/// Resolved query state, used to build links.
#[derive(Debug, Clone)]
pub struct TableState {
    pub path: &'static str,
    pub q: String,
    pub status: Option<String>,
    pub sort: String,
    pub dir: SortDir,
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}

impl TableState {
    /// Header link: sorts by `column`, flipping direction when it is already
    /// the sort column. Always returns to page 1.
    #[must_use]
    pub fn sort_href(&self, column: &str) -> String {
        let dir = if self.sort == column {
            self.dir.flip()
        } else {
            SortDir::Asc
        };
        self.href(column, dir, 1)
    }

    /// Pagination link keeping search, filter and sort.
    #[must_use]
    pub fn page_href(&self, page: usize) -> String {
        self.href(&self.sort, self.dir, page)
    }

    /// Arrow shown next to the active sort column.
    #[must_use]
    pub fn sort_marker(&self, column: &str) -> &'static str {
        match (self.sort == column, self.dir) {
            (false, _) => "",
            (true, SortDir::Asc) => " ▲",
            (true, SortDir::Desc) => " ▼",
        }
    }

    #[must_use]
    pub fn is_status(&self, value: &str) -> bool {
        self.status.as_deref() == Some(value)
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    fn href(&self, sort: &str, dir: SortDir, page: usize) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if !self.q.is_empty() {
            query.append_pair("q", &self.q);
        }
        if let Some(status) = &self.status {
            query.append_pair("status", status);
        }
        query.append_pair("sort", sort);
        query.append_pair("dir", dir.as_str());
        if page > 1 {
            query.append_pair("page", &page.to_string());
        }
        format!("{}?{}", self.path, query.finish())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Row {
        name: &'static str,
        amount: u32,
        status: &'static str,
    }

    impl TableRow for Row {
        const SORT_COLUMNS: &'static [&'static str] = &["name", "amount"];
        const DEFAULT_SORT: (&'static str, SortDir) = ("amount", SortDir::Desc);

        fn matches(&self, term: &str) -> bool {
            self.name.to_lowercase().contains(term)
        }

        fn compare(&self, other: &Self, column: &str) -> Ordering {
            match column {
                "name" => self.name.cmp(other.name),
                _ => self.amount.cmp(&other.amount),
            }
        }

        fn status(&self) -> Option<&str> {
            Some(self.status)
        }
    }

    fn rows(n: u32) -> Vec<Row> {
        (1..=n)
            .map(|i| Row {
                name: if i % 2 == 0 { "Even" } else { "Odd" },
                amount: i,
                status: if i % 3 == 0 { "closed" } else { "open" },
            })
            .collect()
    }

    fn config() -> DataTableConfig {
        DataTableConfig::new("/things")
    }

    #[test]
    fn test_default_sort_and_pagination() {
        let page = TableQuery::default().apply(&config(), rows(25));
        assert_eq!(page.rows.len(), PAGE_SIZE);
        assert_eq!(page.rows[0].amount, 25);
        assert_eq!(page.state.total, 25);
        assert_eq!(page.state.total_pages, 3);
        assert!(page.state.has_next());
        assert!(!page.state.has_previous());
    }

    #[test]
    fn test_page_is_clamped() {
        let query = TableQuery {
            page: Some(9),
            ..TableQuery::default()
        };
        let page = query.apply(&config(), rows(25));
        assert_eq!(page.state.page, 3);
        assert_eq!(page.rows.len(), 5);

        let empty = TableQuery::default().apply(&config(), Vec::<Row>::new());
        assert_eq!(empty.state.page, 1);
        assert_eq!(empty.state.total_pages, 1);
    }

    #[test]
    fn test_search_and_status_filter() {
        let query = TableQuery {
            q: Some(" EVEN ".to_string()),
            status: Some("closed".to_string()),
            ..TableQuery::default()
        };
        let page = query.apply(&config(), rows(12));
        let amounts: Vec<u32> = page.rows.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![12, 6]);
        assert_eq!(page.state.q, "EVEN");
    }

    #[test]
    fn test_unknown_sort_falls_back() {
        let query = TableQuery {
            sort: Some("password".to_string()),
            ..TableQuery::default()
        };
        let page = query.apply(&config(), rows(3));
        assert_eq!(page.state.sort, "amount");
        assert_eq!(page.rows[0].amount, 3);
    }

    #[test]
    fn test_sort_href_flips_direction() {
        let query = TableQuery {
            q: Some("odd".to_string()),
            sort: Some("name".to_string()),
            dir: Some("asc".to_string()),
            page: Some(2),
            ..TableQuery::default()
        };
        let state = query.apply(&config(), rows(40)).state;
        assert_eq!(state.sort_href("name"), "/things?q=odd&sort=name&dir=desc");
        assert_eq!(state.sort_href("amount"), "/things?q=odd&sort=amount&dir=asc");
        assert_eq!(state.page_href(2), "/things?q=odd&sort=name&dir=asc&page=2");
        assert_eq!(state.sort_marker("name"), " ▲");
        assert_eq!(state.sort_marker("amount"), "");
    }
}
