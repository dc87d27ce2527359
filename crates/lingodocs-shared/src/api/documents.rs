use serde::{Deserialize, Serialize};

use crate::models::DocumentStatus;

/// One slice of a paginated listing, shaped like the page object the
/// dashboard consumes: current page, rows, total row count, last page
/// number and the page size that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub current_page: u32,
    pub data: Vec<T>,
    pub total: i64,
    pub last_page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, current_page: u32, per_page: u32, total: i64) -> Self {
        Self {
            current_page,
            data,
            total,
            last_page: last_page(total, per_page),
            per_page,
        }
    }
}

/// An empty listing still reports page 1 as its last page.
pub fn last_page(total: i64, per_page: u32) -> u32 {
    if per_page == 0 || total <= 0 {
        return 1;
    }
    ((total as u64).div_ceil(per_page as u64)).max(1) as u32
}

/// Query parameters accepted by the document listing endpoint. Every field
/// is optional; the server applies defaults and allow-lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// Scalar fields of the create/update form. The file itself travels as a
/// separate multipart part named `document`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFields {
    pub name: String,
    pub current_language: String,
    pub process_language: String,
    pub status: DocumentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_page_rounds_up() {
        assert_eq!(last_page(12, 5), 3);
        assert_eq!(last_page(10, 5), 2);
        assert_eq!(last_page(1, 10), 1);
    }

    #[test]
    fn last_page_is_one_when_empty() {
        assert_eq!(last_page(0, 10), 1);
        assert_eq!(last_page(0, 0), 1);
    }

    #[test]
    fn page_envelope_reports_slice_metadata() {
        let page = Page::new(vec![1, 2, 3, 4, 5], 1, 5, 12);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.last_page, 3);
        assert_eq!(page.total, 12);
        assert_eq!(page.per_page, 5);
        assert_eq!(page.data.len(), 5);
    }
}
