//! Fixed-size paging over a shuffled round.

use crate::error::QuizError;

/// Result of asking the paginator for the next page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAdvance {
    /// Moved to the page with this index.
    Next(usize),
    /// The last page was already current; the round is over.
    Finished,
}

/// Slices a round into pages of `page_size` items and tracks the current one.
#[derive(Debug, Clone)]
pub struct Paginator<T> {
    items: Vec<T>,
    page_size: usize,
    current: usize,
}

impl<T> Paginator<T> {
    pub fn new(items: Vec<T>, page_size: usize) -> Result<Self, QuizError> {
        if page_size == 0 {
            return Err(QuizError::InvalidPageSize(page_size));
        }
        Ok(Self {
            items,
            page_size,
            current: 0,
        })
    }

    /// `ceil(n / page_size)`, never less than 1.
    pub fn total_pages(&self) -> usize {
        self.items.len().div_ceil(self.page_size).max(1)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Items of page `index`; empty past the end.
    pub fn page_items(&self, index: usize) -> &[T] {
        let start = index.saturating_mul(self.page_size).min(self.items.len());
        let end = start.saturating_add(self.page_size).min(self.items.len());
        &self.items[start..end]
    }

    pub fn current_page(&self) -> usize {
        self.current
    }

    pub fn current_items(&self) -> &[T] {
        self.page_items(self.current)
    }

    pub fn is_last_page(&self) -> bool {
        self.current + 1 >= self.total_pages()
    }

    pub fn advance(&mut self) -> PageAdvance {
        if self.current < self.total_pages() - 1 {
            self.current += 1;
            PageAdvance::Next(self.current)
        } else {
            PageAdvance::Finished
        }
    }

    /// Replace the items and rewind to the first page. The page size stays.
    pub fn reload(&mut self, items: Vec<T>) {
        self.items = items;
        self.current = 0;
    }

    /// All items of the round, in round order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_lengths_sum_to_n() {
        for n in 0..30usize {
            for k in 1..8usize {
                let p = Paginator::new((0..n).collect::<Vec<_>>(), k).unwrap();
                assert_eq!(p.total_pages(), n.div_ceil(k).max(1), "n={n} k={k}");
                let sum: usize = (0..p.total_pages()).map(|i| p.page_items(i).len()).sum();
                assert_eq!(sum, n, "n={n} k={k}");
            }
        }
    }

    #[test]
    fn empty_round_has_one_empty_page() {
        let p: Paginator<u32> = Paginator::new(vec![], 5).unwrap();
        assert_eq!(p.total_pages(), 1);
        assert!(p.current_items().is_empty());
        assert!(p.is_last_page());
    }

    #[test]
    fn last_page_is_partial() {
        let p = Paginator::new((1..=12).collect::<Vec<_>>(), 5).unwrap();
        assert_eq!(p.total_pages(), 3);
        assert_eq!(p.page_items(0), &[1, 2, 3, 4, 5]);
        assert_eq!(p.page_items(2), &[11, 12]);
        assert!(p.page_items(3).is_empty());
        assert!(p.page_items(usize::MAX).is_empty());
    }

    #[test]
    fn advance_stops_at_last_page() {
        let mut p = Paginator::new((0..7).collect::<Vec<_>>(), 5).unwrap();
        assert!(!p.is_last_page());
        assert_eq!(p.advance(), PageAdvance::Next(1));
        assert!(p.is_last_page());
        assert_eq!(p.current_items(), &[5, 6]);
        assert_eq!(p.advance(), PageAdvance::Finished);
        assert_eq!(p.current_page(), 1);
    }

    #[test]
    fn reload_rewinds_and_keeps_page_size() {
        let mut p = Paginator::new((0..7).collect::<Vec<_>>(), 3).unwrap();
        p.advance();
        p.advance();
        assert_eq!(p.current_page(), 2);

        p.reload((10..14).collect());
        assert_eq!(p.current_page(), 0);
        assert_eq!(p.page_size(), 3);
        assert_eq!(p.total_pages(), 2);
        assert_eq!(p.current_items(), &[10, 11, 12]);
    }

    #[test]
    fn zero_page_size_rejected() {
        let err = Paginator::new(vec![1, 2], 0).unwrap_err();
        assert_eq!(err, QuizError::InvalidPageSize(0));
    }
}
