use serde::{Deserialize, Serialize};

use super::links::PageLinks;
use super::pagination::Pagination;

/// Wire envelope for every list endpoint:
/// `{ total, limit, offset, data, links }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub data: Vec<T>,
    pub links: PageLinks,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>, total: i64, page: Pagination, links: PageLinks) -> Self {
        Self {
            total,
            limit: page.limit,
            offset: page.offset,
            data,
            links,
        }
    }
}
