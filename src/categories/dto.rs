use serde::{Deserialize, Serialize};

use crate::categories::repo::Category;
use crate::pagination::ListParams;

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// List parameters plus the optional name search. Kept flat because the
/// urlencoded deserializer does not cope with flattened numeric fields.
#[derive(Debug, Deserialize)]
pub struct CategoryListParams {
    pub search: Option<String>,
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

impl CategoryListParams {
    pub fn page_params(&self) -> ListParams {
        ListParams {
            skip: self.skip,
            limit: self.limit,
            sort_by: self.sort_by.clone(),
            order: self.order.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
        }
    }
}
