//! Subcommand implementations, one module per area.

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod util;

use bookstore_core::pagination::{DEFAULT_PAGE_SIZE, PageRequest};
use clap::Args;

/// `--page`/`--size` shared by list commands.
#[derive(Debug, Clone, Copy, Args)]
pub struct PageArgs {
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Items per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub size: u32,
}

impl PageArgs {
    #[must_use]
    pub fn request(self) -> PageRequest {
        PageRequest::from_page_number(self.page, self.size)
    }
}
