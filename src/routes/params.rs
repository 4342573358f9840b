use serde::Deserialize;
use utoipa::ToSchema;

use crate::entity::orders::OrderStatus;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Default, Clone, Copy, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    /// `(page, limit, offset)` with page floored at 1 and limit clamped.
    /// A page far past the end saturates the offset and yields an empty page.
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = (page - 1).saturating_mul(limit);
        (page, limit, offset)
    }
}

/// Kept flat: query-string decoding cannot flatten numeric fields.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<OrderStatus>,
}

impl OrderListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_ten() {
        assert_eq!(Pagination::default().normalize(), (1, 10, 0));
    }

    #[test]
    fn clamps_limit_and_floors_page() {
        let p = Pagination {
            page: Some(0),
            limit: Some(10_000),
        };
        assert_eq!(p.normalize(), (1, MAX_LIMIT, 0));

        let p = Pagination {
            page: Some(3),
            limit: Some(-5),
        };
        assert_eq!(p.normalize(), (3, 1, 2));
    }

    #[test]
    fn huge_page_saturates_offset() {
        let p = Pagination {
            page: Some(i64::MAX),
            limit: Some(100),
        };
        assert_eq!(p.normalize(), (i64::MAX, 100, i64::MAX));
    }
}
