use crate::utils::error::CustomError;

pub const POSTS_PER_PAGE: u64 = 10;

/// Slice of an ordered collection to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub skip: u64,
    pub limit: u64,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub per_page: u64,
}

impl Page {
    /// Resolves the raw `page` query value against the result count.
    ///
    /// Missing means page 1, `last` means the final page. The first page
    /// always exists, even when `total` is zero.
    pub fn resolve(raw: Option<&str>, total: u64, per_page: u64) -> Result<Self, CustomError> {
        let num_pages = total.div_ceil(per_page).max(1);
        let number = match raw.map(str::trim) {
            None | Some("") => 1,
            Some("last") => num_pages,
            Some(value) => value
                .parse::<u64>()
                .map_err(|_| CustomError::NotFoundError("Invalid page".into()))?,
        };

        if number == 0 || number > num_pages {
            return Err(CustomError::NotFoundError(format!(
                "Page {} does not exist",
                number
            )));
        }

        Ok(Self {
            number,
            num_pages,
            total,
            per_page,
        })
    }

    pub fn window(&self) -> PageWindow {
        PageWindow {
            skip: (self.number - 1) * self.per_page,
            limit: self.per_page,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }
}
