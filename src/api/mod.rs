pub mod format;
pub mod links;
pub mod pagination;

pub use format::ListResponse;
pub use links::{query_pairs, PageLinks};
pub use pagination::Pagination;
