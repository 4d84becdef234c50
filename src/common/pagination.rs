// src/common/pagination.rs

use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: i64 = 10;
pub const MAX_PER_PAGE: i64 = 100;

/// Query string comum das listagens: `?search=&page=&per_page=`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.per_page)
    }

    /// Padrão ILIKE para a busca, ou None se não houver termo.
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_deref().and_then(search_pattern)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// Página de resultados no formato que o frontend já conhece.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub current_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub last_page: i64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, request: PageRequest, total: i64) -> Self {
        let last_page = if total <= 0 {
            1
        } else {
            (total + request.per_page - 1) / request.per_page
        };
        Self {
            data,
            current_page: request.page,
            per_page: request.per_page,
            total,
            last_page,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            current_page: self.current_page,
            per_page: self.per_page,
            total: self.total,
            last_page: self.last_page,
        }
    }
}

/// Monta `%termo%` escapando os curingas do LIKE, para busca literal.
pub fn search_pattern(term: &str) -> Option<String> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    Some(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_ten() {
        let req = PageRequest::new(None, None);
        assert_eq!(req, PageRequest { page: 1, per_page: 10 });
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn clamps_page_and_page_size() {
        let req = PageRequest::new(Some(0), Some(1_000));
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, MAX_PER_PAGE);

        let req = PageRequest::new(Some(3), Some(-5));
        assert_eq!(req.per_page, 1);
        assert_eq!(req.offset(), 2);
    }

    #[test]
    fn last_page_rounds_up() {
        let page = Paginated::new(vec![1, 2, 3], PageRequest::new(Some(1), Some(10)), 21);
        assert_eq!(page.last_page, 3);

        let empty: Paginated<i32> = Paginated::new(vec![], PageRequest::new(None, None), 0);
        assert_eq!(empty.last_page, 1);
    }

    #[test]
    fn blank_search_is_ignored() {
        assert_eq!(search_pattern("   "), None);
        let q = ListQuery { search: Some(String::new()), ..Default::default() };
        assert_eq!(q.search_pattern(), None);
    }

    #[test]
    fn search_escapes_like_wildcards() {
        assert_eq!(search_pattern("acme").as_deref(), Some("%acme%"));
        assert_eq!(search_pattern("50%_off").as_deref(), Some("%50\\%\\_off%"));
        assert_eq!(search_pattern("a\\b").as_deref(), Some("%a\\\\b%"));
    }
}
