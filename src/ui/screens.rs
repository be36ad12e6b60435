use std::cmp::min;

use anyhow::Result;

use crate::library::Library;
use crate::models::{Book, BorrowRecord, Member};

/// Top-level tabs, in the order `Tab` cycles through them.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Tab {
    Books,
    Members,
    Borrows,
}

impl Tab {
    pub(crate) const ALL: [Tab; 3] = [Tab::Books, Tab::Members, Tab::Borrows];

    pub(crate) fn title(self) -> &'static str {
        match self {
            Tab::Books => "Books",
            Tab::Members => "Members",
            Tab::Borrows => "Borrows",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Tab::Books => 0,
            Tab::Members => 1,
            Tab::Borrows => 2,
        }
    }

    pub(crate) fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub(crate) fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// A loaded list plus the highlighted row.
pub(crate) struct ListScreen<T> {
    pub(crate) items: Vec<T>,
    pub(crate) selected: usize,
}

impl<T> Default for ListScreen<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selected: 0,
        }
    }
}

impl<T> ListScreen<T> {
    /// Swap in freshly loaded items, keeping the cursor on screen.
    pub(crate) fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.ensure_in_bounds();
    }

    pub(crate) fn current(&self) -> Option<&T> {
        self.items.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.items.is_empty() {
            self.selected = 0;
            return;
        }
        let max_index = self.items.len() as isize - 1;
        let next = (self.selected as isize + offset).clamp(0, max_index);
        self.selected = next as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.items.len().saturating_sub(1);
    }

    /// Move the cursor to the first item matching `pred`. Returns whether one
    /// was found.
    pub(crate) fn focus(&mut self, pred: impl Fn(&T) -> bool) -> bool {
        match self.items.iter().position(pred) {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }

    fn ensure_in_bounds(&mut self) {
        self.selected = min(self.selected, self.items.len().saturating_sub(1));
    }
}

/// Which slice of the catalogue the books tab shows.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum BookView {
    All,
    Available,
    Borrowed,
}

impl BookView {
    pub(crate) fn next(self) -> Self {
        match self {
            BookView::All => BookView::Available,
            BookView::Available => BookView::Borrowed,
            BookView::Borrowed => BookView::All,
        }
    }

    pub(crate) fn title(self) -> &'static str {
        match self {
            BookView::All => "All Books",
            BookView::Available => "Available Books",
            BookView::Borrowed => "Borrowed Books",
        }
    }

    pub(crate) fn empty_message(self) -> &'static str {
        match self {
            BookView::All => "No books registered.",
            BookView::Available => "No books are currently available.",
            BookView::Borrowed => "No books are currently borrowed.",
        }
    }
}

pub(crate) struct BookScreen {
    pub(crate) list: ListScreen<Book>,
    pub(crate) view: BookView,
}

impl BookScreen {
    pub(crate) fn new() -> Self {
        Self {
            list: ListScreen::default(),
            view: BookView::All,
        }
    }

    pub(crate) fn reload(&mut self, library: &Library) -> Result<()> {
        let books = match self.view {
            BookView::All => library.list_books()?,
            BookView::Available => library.list_available_books()?,
            BookView::Borrowed => library.list_borrowed_books()?,
        };
        self.list.replace(books);
        Ok(())
    }
}

pub(crate) struct MemberScreen {
    pub(crate) list: ListScreen<Member>,
}

impl MemberScreen {
    pub(crate) fn new() -> Self {
        Self {
            list: ListScreen::default(),
        }
    }

    pub(crate) fn reload(&mut self, library: &Library) -> Result<()> {
        self.list.replace(library.list_members()?);
        Ok(())
    }
}

pub(crate) struct BorrowScreen {
    pub(crate) list: ListScreen<BorrowRecord>,
    pub(crate) open_only: bool,
}

impl BorrowScreen {
    pub(crate) fn new() -> Self {
        Self {
            list: ListScreen::default(),
            open_only: false,
        }
    }

    pub(crate) fn reload(&mut self, library: &Library) -> Result<()> {
        let records = if self.open_only {
            library.list_open_borrows()?
        } else {
            library.list_borrows()?
        };
        self.list.replace(records);
        Ok(())
    }

    pub(crate) fn title(&self) -> &'static str {
        if self.open_only {
            "Open Borrows"
        } else {
            "All Borrow Records"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_is_clamped() {
        let mut list = ListScreen::default();
        list.replace(vec![1, 2, 3]);
        list.move_selection(10);
        assert_eq!(list.current(), Some(&3));
        list.move_selection(-10);
        assert_eq!(list.current(), Some(&1));

        list.select_last();
        list.replace(vec![1]);
        assert_eq!(list.selected, 0);
    }

    #[test]
    fn focus_finds_matching_item() {
        let mut list = ListScreen::default();
        list.replace(vec![10, 20, 30]);
        assert!(list.focus(|&n| n == 20));
        assert_eq!(list.current(), Some(&20));
        assert!(!list.focus(|&n| n == 99));
        assert_eq!(list.current(), Some(&20));
    }

    #[test]
    fn tabs_cycle_both_ways() {
        assert_eq!(Tab::Books.next(), Tab::Members);
        assert_eq!(Tab::Borrows.next(), Tab::Books);
        assert_eq!(Tab::Books.previous(), Tab::Borrows);
    }

    #[test]
    fn book_view_cycles_through_reports() {
        assert_eq!(BookView::All.next(), BookView::Available);
        assert_eq!(BookView::Available.next(), BookView::Borrowed);
        assert_eq!(BookView::Borrowed.next(), BookView::All);
    }
}
