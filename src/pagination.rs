use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Query parameters shared by every list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_order")]
    pub order: String,
}

fn default_limit() -> i64 {
    10
}
fn default_sort_by() -> String {
    "created_at".to_string()
}
fn default_order() -> String {
    "desc".to_string()
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
            sort_by: default_sort_by(),
            order: default_order(),
        }
    }
}

/// A validated ORDER BY clause. `column` is always one of the caller's
/// whitelisted identifiers, never raw client input.
#[derive(Debug, Clone, Copy)]
pub struct SortSpec {
    pub column: &'static str,
    pub direction: &'static str,
}

impl ListParams {
    pub fn sort_spec(&self, allowed: &[&'static str]) -> Result<SortSpec, ApiError> {
        if self.skip < 0 || self.limit < 1 {
            return Err(ApiError::validation(
                "skip must be non-negative and limit at least 1",
            ));
        }
        let column = allowed
            .iter()
            .copied()
            .find(|c| *c == self.sort_by)
            .ok_or_else(|| ApiError::validation("The specified sort field is invalid."))?;
        let direction = match self.order.as_str() {
            "asc" => "ASC",
            "desc" => "DESC",
            _ => return Err(ApiError::validation("The specified sort order is invalid.")),
        };
        Ok(SortSpec { column, direction })
    }
}

/// List response envelope: items plus the paging metadata the web client
/// uses to render page controls.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub total: i64,
    pub skip: i64,
    pub limit: i64,
    pub sort_by: String,
    pub sort_order: String,
    pub total_pages: i64,
    pub current_page: i64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(total: i64, params: &ListParams, items: Vec<T>) -> Self {
        Self {
            total,
            skip: params.skip,
            limit: params.limit,
            sort_by: params.sort_by.clone(),
            sort_order: params.order.clone(),
            total_pages: (total + params.limit - 1) / params.limit,
            current_page: params.skip / params.limit + 1,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(skip: i64, limit: i64, sort_by: &str, order: &str) -> ListParams {
        ListParams {
            skip,
            limit,
            sort_by: sort_by.to_string(),
            order: order.to_string(),
        }
    }

    #[test]
    fn accepts_whitelisted_sort() {
        let spec = params(0, 10, "email", "asc")
            .sort_spec(&["email", "created_at"])
            .expect("valid params");
        assert_eq!(spec.column, "email");
        assert_eq!(spec.direction, "ASC");
    }

    #[test]
    fn rejects_unknown_sort_field() {
        let err = params(0, 10, "password_hash", "asc")
            .sort_spec(&["email", "created_at"])
            .unwrap_err();
        assert!(err.to_string().contains("sort field"));
    }

    #[test]
    fn rejects_unknown_sort_order() {
        let err = params(0, 10, "email", "sideways")
            .sort_spec(&["email"])
            .unwrap_err();
        assert!(err.to_string().contains("sort order"));
    }

    #[test]
    fn rejects_bad_window() {
        assert!(params(-1, 10, "email", "asc").sort_spec(&["email"]).is_err());
        assert!(params(0, 0, "email", "asc").sort_spec(&["email"]).is_err());
    }

    #[test]
    fn page_math() {
        let p = params(20, 10, "created_at", "desc");
        let page: Page<i32> = Page::new(25, &p, vec![]);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 3);

        let p = params(0, 10, "created_at", "desc");
        let page: Page<i32> = Page::new(0, &p, vec![]);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.current_page, 1);
    }
}
