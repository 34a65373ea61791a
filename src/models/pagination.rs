use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginationParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub current_page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub pagination: PaginationInfo,
}

impl PaginationParams {
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self { page, per_page }
    }

    pub fn get_page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn get_per_page(&self) -> u32 {
        self.per_page.unwrap_or(20).clamp(1, 100)
    }

    pub fn get_offset(&self) -> u32 {
        (self.get_page() - 1) * self.get_per_page()
    }
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, current_page: u32, per_page: u32, total: i64) -> Self {
        let total_pages = if total == 0 {
            1
        } else {
            ((total as f64) / (per_page as f64)).ceil() as u32
        };
        Self {
            items,
            pagination: PaginationInfo {
                current_page,
                per_page,
                total,
                total_pages,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults_and_clamps() {
        let p = PaginationParams::new(None, None);
        assert_eq!(p.get_page(), 1);
        assert_eq!(p.get_per_page(), 20);
        assert_eq!(p.get_offset(), 0);

        let p = PaginationParams::new(Some(3), Some(500));
        assert_eq!(p.get_per_page(), 100);
        assert_eq!(p.get_offset(), 200);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let r: PaginatedResponse<i64> = PaginatedResponse::new(vec![], 1, 20, 41);
        assert_eq!(r.pagination.total_pages, 3);
        let r: PaginatedResponse<i64> = PaginatedResponse::new(vec![], 1, 20, 0);
        assert_eq!(r.pagination.total_pages, 1);
    }
}
