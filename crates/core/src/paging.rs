//! Paging and sorting parameters for Find operations.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Sort direction over record ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            other => Err(DomainError::validation(format!(
                "sort_order must be one of: asc, desc (got '{other}')"
            ))),
        }
    }
}

/// `start` / `result_count` / `sort_order` as received from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingSortingParameters {
    pub start: usize,
    pub result_count: usize,
    pub sort_order: SortOrder,
}

impl Default for PagingSortingParameters {
    fn default() -> Self {
        Self {
            start: 0,
            result_count: DEFAULT_PAGE_SIZE,
            sort_order: SortOrder::Ascending,
        }
    }
}

impl PagingSortingParameters {
    pub fn new(start: usize, result_count: usize, sort_order: SortOrder) -> Self {
        Self {
            start,
            result_count,
            sort_order,
        }
    }

    /// Cap `result_count` at `max`; a zero count falls back to `default_count`.
    pub fn normalized(self, default_count: usize, max: usize) -> Self {
        let result_count = match self.result_count {
            0 => default_count,
            n => n,
        };
        Self {
            result_count: result_count.min(max),
            ..self
        }
    }

    /// Sort `items` by `key` in the requested direction, then take one page.
    pub fn sort_and_page<T, K, F>(&self, mut items: Vec<T>, key: F) -> Vec<T>
    where
        K: Ord,
        F: Fn(&T) -> K,
    {
        items.sort_by_key(|item| key(item));
        if self.sort_order == SortOrder::Descending {
            items.reverse();
        }
        items
            .into_iter()
            .skip(self.start)
            .take(self.result_count)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_after_sorting() {
        let params = PagingSortingParameters::new(1, 2, SortOrder::Descending);
        let page = params.sort_and_page(vec![3, 1, 5, 4, 2], |v| *v);
        assert_eq!(page, vec![4, 3]);
    }

    #[test]
    fn start_past_end_yields_empty_page() {
        let params = PagingSortingParameters::new(10, 5, SortOrder::Ascending);
        assert!(params.sort_and_page(vec![1, 2, 3], |v| *v).is_empty());
    }

    #[test]
    fn normalized_applies_default_and_cap() {
        let zero = PagingSortingParameters::new(0, 0, SortOrder::Ascending).normalized(25, 100);
        assert_eq!(zero.result_count, 25);
        let big = PagingSortingParameters::new(0, 5000, SortOrder::Ascending).normalized(25, 100);
        assert_eq!(big.result_count, 100);
    }

    #[test]
    fn sort_order_parses_loosely() {
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Descending);
        assert_eq!("".parse::<SortOrder>().unwrap(), SortOrder::Ascending);
        assert!("sideways".parse::<SortOrder>().is_err());
    }
}
