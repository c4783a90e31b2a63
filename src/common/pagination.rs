// src/common/pagination.rs

use serde::Serialize;
use utoipa::ToSchema;

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

/// Janela de paginação já normalizada (página, limite e offset do SQL).
#[derive(Debug, Clone, Copy)]
pub struct PageWindow {
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Normaliza os parâmetros `page`/`limit` vindos da query string.
/// Página mínima é 1; o limite é limitado a 100 para proteger o banco.
pub fn window(page: Option<i64>, limit: Option<i64>) -> PageWindow {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    PageWindow {
        page,
        limit,
        offset: (page - 1) * limit,
    }
}

/// Envelope padrão das listagens: `{ items, total, page, totalPages }`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, window: PageWindow) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + window.limit - 1) / window.limit
        };
        Self {
            items,
            total,
            page: window.page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_applies_defaults() {
        let w = window(None, None);
        assert_eq!(w.page, 1);
        assert_eq!(w.limit, 20);
        assert_eq!(w.offset, 0);
    }

    #[test]
    fn window_clamps_out_of_range_values() {
        let w = window(Some(0), Some(1000));
        assert_eq!(w.page, 1);
        assert_eq!(w.limit, 100);

        let w = window(Some(-3), Some(0));
        assert_eq!(w.page, 1);
        assert_eq!(w.limit, 1);
    }

    #[test]
    fn window_computes_offset() {
        let w = window(Some(3), Some(25));
        assert_eq!(w.offset, 50);
    }

    #[test]
    fn envelope_rounds_total_pages_up() {
        let w = window(Some(1), Some(20));
        let p = Paginated::new(vec![1, 2, 3], 41, w);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.total, 41);
        assert_eq!(p.page, 1);

        let empty: Paginated<i32> = Paginated::new(vec![], 0, w);
        assert_eq!(empty.total_pages, 0);
    }
}
