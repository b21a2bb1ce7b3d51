mod request;
mod response;
mod wrapper;

pub use request::*;
pub use response::*;
pub use wrapper::*;

use serde::{Deserialize, Serialize};

/// Listing endpoints take a 1-based `?page=N`. The raw value is kept as a
/// string so junk like `?page=abc` or `?page=-1` falls back to the first
/// page instead of failing extraction; out-of-range numbers clamp later.
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct PageQueryParams {
    #[serde(default)]
    page: Option<String>,
}

impl PageQueryParams {
    pub fn page(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|value| value.parse().ok())
            .filter(|page| *page >= 1)
            .unwrap_or(1)
    }
}
