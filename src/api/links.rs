//! HATEOAS navigation links for paginated list responses.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use super::pagination::Pagination;

/// Navigation links attached to every list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub first: String,
    pub last: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

impl PageLinks {
    /// Build links for a page of `total` rows.
    ///
    /// `query` is the request's query string split into pairs in original
    /// order. `limit` and `offset` are rewritten in place (or appended when
    /// missing); every other pair is carried over untouched.
    pub fn build(total: i64, page: Pagination, base_url: &str, query: &[(String, String)]) -> Self {
        let Pagination { limit, offset } = page;
        let link = |offset: i64| page_url(base_url, query, limit, offset);

        // limit and offset are unbounded, so the next window may not exist
        let next = offset
            .checked_add(limit)
            .filter(|next| *next < total)
            .map(|next| link(next));
        let prev = (offset > 0).then(|| link(offset.saturating_sub(limit).max(0)));

        Self {
            self_link: link(offset),
            first: link(0),
            last: link(last_offset(total, limit)),
            next,
            prev,
        }
    }
}

/// Offset of the final page. Always a multiple of `limit`, `0` for an
/// empty collection.
pub fn last_offset(total: i64, limit: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    ((total - 1) / limit) * limit
}

fn page_url(base_url: &str, query: &[(String, String)], limit: i64, offset: i64) -> String {
    let limit = limit.to_string();
    let offset = offset.to_string();
    let mut seen_limit = false;
    let mut seen_offset = false;

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in query {
        match key.as_str() {
            "limit" if !seen_limit => {
                serializer.append_pair(key, &limit);
                seen_limit = true;
            }
            "offset" if !seen_offset => {
                serializer.append_pair(key, &offset);
                seen_offset = true;
            }
            // Drop repeated pagination keys so the effective values win
            "limit" | "offset" => {}
            _ => {
                serializer.append_pair(key, value);
            }
        }
    }
    if !seen_offset {
        serializer.append_pair("offset", &offset);
    }
    if !seen_limit {
        serializer.append_pair("limit", &limit);
    }

    format!("{}?{}", base_url, serializer.finish())
}

/// Split a raw query string into ordered, percent-decoded pairs.
pub fn query_pairs(raw: Option<&str>) -> Vec<(String, String)> {
    raw.map(|q| {
        form_urlencoded::parse(q.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    })
    .unwrap_or_default()
}
