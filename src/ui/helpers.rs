use anyhow::Error;
use chrono::Local;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Book, BookStatus, BorrowRecord, Member};

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Flatten an error chain into one footer-sized sentence, so a storage failure
/// still names the file it was writing.
pub(crate) fn surface_error(err: &Error) -> String {
    format!("{err:#}")
}

/// Today's date in the `dd/mm/yyyy` shape the ledger has always used.
pub(crate) fn today() -> String {
    Local::now().format("%d/%m/%Y").to_string()
}

fn status_style(status: BookStatus) -> Style {
    match status {
        BookStatus::Available => Style::default().fg(Color::Green),
        BookStatus::Borrowed => Style::default().fg(Color::Yellow),
    }
}

pub(crate) fn book_line(book: &Book) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("[{}] ", book.id), Style::default().fg(Color::Cyan)),
        Span::raw(format!("{} - {} ", book.title, book.author)),
        Span::styled(format!("({})", book.status), status_style(book.status)),
    ])
}

pub(crate) fn member_line(member: &Member) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("[{}] ", member.id), Style::default().fg(Color::Cyan)),
        Span::raw(format!("{} - {}", member.name, member.phone)),
    ])
}

pub(crate) fn borrow_line(record: &BorrowRecord) -> Line<'static> {
    let returned = match &record.return_date {
        Some(date) => Span::raw(date.clone()),
        None => Span::styled("still out", status_style(BookStatus::Borrowed)),
    };
    Line::from(vec![
        Span::styled(format!("Book {} ", record.book_id), Style::default().fg(Color::Cyan)),
        Span::raw(format!(
            "| Member {} | Borrowed: {} | Returned: ",
            record.member_id, record.borrow_date
        )),
        returned,
    ])
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    #[test]
    fn surfaced_errors_keep_the_whole_chain() {
        let err = Err::<(), _>(std::io::Error::other("disk full"))
            .context("Failed to write books.txt")
            .unwrap_err();
        assert_eq!(surface_error(&err), "Failed to write books.txt: disk full");
    }

    #[test]
    fn today_uses_day_month_year() {
        let date = today();
        assert_eq!(date.len(), 10);
        assert_eq!(date.as_bytes()[2], b'/');
        assert_eq!(date.as_bytes()[5], b'/');
    }
}
