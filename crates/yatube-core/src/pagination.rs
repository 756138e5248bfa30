//! Page-number pagination over post listings.
//!
//! Pages are 1-based. Requests past the last page are clamped to the last
//! page, and anything that is not a positive integer means the first page.

/// Records per page on every listing.
pub const PAGE_SIZE: usize = 10;

/// A requested page number, already normalised to `>= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    number: usize,
}

impl PageRequest {
    pub fn new(number: usize) -> Self {
        Self {
            number: number.max(1),
        }
    }

    /// Parse the raw `page` query value.
    pub fn parse(raw: Option<&str>) -> Self {
        let number = raw
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|n| *n > 0)
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(1);
        Self::new(number)
    }

    pub fn number(&self) -> usize {
        self.number
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Splits `total` records into pages of `per_page`.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    total: u64,
    per_page: usize,
}

impl Paginator {
    pub fn new(total: u64, per_page: usize) -> Self {
        Self {
            total,
            per_page: per_page.max(1),
        }
    }

    /// Number of pages; an empty listing still has one (empty) page.
    pub fn num_pages(&self) -> usize {
        let per_page = self.per_page as u64;
        let pages = self.total.div_ceil(per_page).max(1);
        usize::try_from(pages).unwrap_or(usize::MAX)
    }

    /// The page that will actually be served for `request`.
    pub fn clamp(&self, request: PageRequest) -> usize {
        request.number().min(self.num_pages())
    }

    /// `(offset, limit)` of the served page.
    pub fn window(&self, request: PageRequest) -> (u64, u64) {
        let number = self.clamp(request) as u64;
        let per_page = self.per_page as u64;
        ((number - 1) * per_page, per_page)
    }

    /// Wrap the records of the served page.
    pub fn page<T>(&self, request: PageRequest, items: Vec<T>) -> Page<T> {
        Page {
            items,
            number: self.clamp(request),
            num_pages: self.num_pages(),
            total: self.total,
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub num_pages: usize,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn previous_page_number(&self) -> Option<usize> {
        self.has_previous().then(|| self.number - 1)
    }

    pub fn next_page_number(&self) -> Option<usize> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
        }
    }
}
