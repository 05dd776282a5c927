mod analytics;
mod client;
mod interface;
mod mac;
mod network;
mod security;
mod session;

pub use analytics::*;
pub use client::*;
pub use interface::*;
pub use mac::*;
pub use network::*;
pub use security::*;
pub use session::*;

use serde::{Deserialize, Serialize};

/// One page of a sorted listing plus the exact total it was cut from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn pages(&self) -> u64 {
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(self.per_page as u64)
    }

    pub fn has_next(&self) -> bool {
        (self.page as u64) < self.pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Cuts a page out of an already sorted collection. Pages past the end are empty.
    pub fn slice(sorted: Vec<T>, page: u32, per_page: u32) -> Self {
        let total = sorted.len() as u64;
        let start = (page.saturating_sub(1) as usize).saturating_mul(per_page as usize);
        let items = sorted
            .into_iter()
            .skip(start)
            .take(per_page as usize)
            .collect();

        Self {
            items,
            page,
            per_page,
            total,
        }
    }
}
