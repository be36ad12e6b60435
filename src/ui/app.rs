use std::mem;

use anyhow::{anyhow, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use ratatui::Frame;
use tracing::warn;

use crate::library::Library;

use super::forms::{ConfirmBookDelete, Form, FormInput};
use super::helpers::{book_line, borrow_line, centered_rect, member_line, surface_error};
use super::screens::{BookScreen, BorrowScreen, ListScreen, MemberScreen, Tab};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height of the tab bar above the list.
const TAB_BAR_HEIGHT: u16 = 3;
/// Rows skipped by PageUp/PageDown.
const PAGE_STEP: isize = 10;

/// Fine-grained modes layered over the current tab.
enum Mode {
    Normal,
    Editing(Form),
    ConfirmBookDelete(ConfirmBookDelete),
    Searching(SearchState),
    AuditReport(Vec<String>),
}

/// State for an active find-by-ID prompt.
struct SearchState {
    target: Tab,
    query: String,
}

impl SearchState {
    fn prompt(&self) -> &'static str {
        match self.target {
            Tab::Members => "Member ID: ",
            _ => "Book ID: ",
        }
    }
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    library: Library,
    tab: Tab,
    books: BookScreen,
    members: MemberScreen,
    borrows: BorrowScreen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Build the UI state and load every tab. A store that cannot be read is
    /// reported in the footer rather than aborting start-up.
    pub fn new(library: Library) -> Self {
        let mut app = Self {
            library,
            tab: Tab::Books,
            books: BookScreen::new(),
            members: MemberScreen::new(),
            borrows: BorrowScreen::new(),
            mode: Mode::Normal,
            status: None,
        };
        app.refresh();
        app
    }

    /// Process one key press. Returns `true` once the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::Editing(form) => self.handle_form(code, form),
            Mode::ConfirmBookDelete(confirm) => self.handle_confirm_delete(code, confirm),
            Mode::Searching(state) => self.handle_search(code, state),
            Mode::AuditReport(lines) => match code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => Mode::Normal,
                _ => Mode::AuditReport(lines),
            },
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') => {
                *exit = true;
                return Mode::Normal;
            }
            KeyCode::Esc => self.clear_status(),
            KeyCode::Tab => self.switch_tab(self.tab.next()),
            KeyCode::BackTab => self.switch_tab(self.tab.previous()),
            KeyCode::Char('1') => self.switch_tab(Tab::Books),
            KeyCode::Char('2') => self.switch_tab(Tab::Members),
            KeyCode::Char('3') => self.switch_tab(Tab::Borrows),
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.move_selection(PAGE_STEP),
            KeyCode::Home => self.with_current_list(ListScreenOp::First),
            KeyCode::End => self.with_current_list(ListScreenOp::Last),
            KeyCode::Char('f') if self.tab != Tab::Borrows => {
                self.clear_status();
                return Mode::Searching(SearchState {
                    target: self.tab,
                    query: String::new(),
                });
            }
            _ => {
                return match self.tab {
                    Tab::Books => self.handle_books_key(code),
                    Tab::Members => self.handle_members_key(code),
                    Tab::Borrows => self.handle_borrows_key(code),
                }
            }
        }
        Mode::Normal
    }

    fn handle_books_key(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Char('+') => {
                self.clear_status();
                return Mode::Editing(Form::add_book());
            }
            KeyCode::Char('-') => match self.books.list.current() {
                Some(book) => {
                    let confirm = ConfirmBookDelete::from(book);
                    self.clear_status();
                    return Mode::ConfirmBookDelete(confirm);
                }
                None => self.set_status("No book selected to delete.", StatusKind::Error),
            },
            KeyCode::Char('o') => {
                self.clear_status();
                return Mode::Editing(Form::borrow(self.books.list.current()));
            }
            KeyCode::Char('r') => {
                self.clear_status();
                let book_id = self.books.list.current().map(|book| book.id);
                return Mode::Editing(Form::return_book(book_id));
            }
            KeyCode::Char('v') => {
                self.books.view = self.books.view.next();
                self.books.list.select_first();
                self.reload_books();
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_members_key(&mut self, code: KeyCode) -> Mode {
        if code == KeyCode::Char('+') {
            self.clear_status();
            return Mode::Editing(Form::add_member());
        }
        Mode::Normal
    }

    fn handle_borrows_key(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Char('o') => {
                self.clear_status();
                return Mode::Editing(Form::borrow(None));
            }
            KeyCode::Char('r') => {
                self.clear_status();
                let book_id = self
                    .borrows
                    .list
                    .current()
                    .filter(|record| record.is_open())
                    .map(|record| record.book_id);
                return Mode::Editing(Form::return_book(book_id));
            }
            KeyCode::Char('v') => {
                self.borrows.open_only = !self.borrows.open_only;
                self.borrows.list.select_first();
                self.reload_borrows();
            }
            KeyCode::Char('c') => return self.run_audit(),
            _ => {}
        }
        Mode::Normal
    }

    fn handle_form(&mut self, code: KeyCode, mut form: Form) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status(format!("{} cancelled.", form.title()), StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.submit(&form) {
                Ok(()) => return Mode::Normal,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::Editing(form)
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmBookDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.library.delete_book(confirm.id) {
                    Ok(book) => {
                        self.reload_books();
                        self.set_status(
                            format!("Deleted book {} ({}).", book.id, book.title),
                            StatusKind::Info,
                        );
                    }
                    Err(err) => self.set_status(surface_error(&err.into()), StatusKind::Error),
                }
                Mode::Normal
            }
            _ => Mode::ConfirmBookDelete(confirm),
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Mode {
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Char(ch) if ch.is_ascii_digit() => state.query.push(ch),
            KeyCode::Enter => {
                if let Err(err) = self.find(&state) {
                    self.set_status(surface_error(&err), StatusKind::Error);
                }
                return Mode::Normal;
            }
            _ => {}
        }
        Mode::Searching(state)
    }

    /// Run a form's operation and refresh whatever it touched.
    fn submit(&mut self, form: &Form) -> Result<()> {
        match form.parse_inputs()? {
            FormInput::Book { id, title, author } => {
                let book = self.library.add_book(id, &title, &author)?;
                self.reload_books();
                self.books.list.focus(|b| b.id == book.id);
                self.set_status(format!("Added book {}.", book.id), StatusKind::Info);
            }
            FormInput::Member { id, name, phone } => {
                let member = self.library.add_member(&id, &name, &phone)?;
                self.reload_members();
                self.members.list.focus(|m| m.id == member.id);
                self.set_status(format!("Added member {}.", member.name), StatusKind::Info);
            }
            FormInput::Borrow {
                book_id,
                member_id,
                date,
            } => {
                self.library.borrow(book_id, &member_id, &date)?;
                self.reload_books();
                self.reload_borrows();
                self.set_status(
                    format!("Book {book_id} lent to member {member_id}."),
                    StatusKind::Info,
                );
            }
            FormInput::Return { book_id, date } => {
                self.library.return_book(book_id, &date)?;
                self.reload_books();
                self.reload_borrows();
                self.set_status(format!("Book {book_id} returned."), StatusKind::Info);
            }
        }
        Ok(())
    }

    /// Look up an ID, show what was found, and move the cursor onto it when it
    /// is part of the current list.
    fn find(&mut self, state: &SearchState) -> Result<()> {
        let query = state.query.trim();
        if query.is_empty() {
            return Err(anyhow!("Enter an ID to search for."));
        }

        match state.target {
            Tab::Members => {
                let member = self
                    .library
                    .search_member(query)?
                    .ok_or_else(|| anyhow!("No member found with ID {query}."))?;
                self.members.list.focus(|m| m.id == member.id);
                self.set_status(
                    format!("Member {}: {} - {}", member.id, member.name, member.phone),
                    StatusKind::Info,
                );
            }
            _ => {
                let id: i64 = query
                    .parse()
                    .map_err(|_| anyhow!("Book ID must be an integer."))?;
                let book = self
                    .library
                    .search_book(id)?
                    .ok_or_else(|| anyhow!("No book found with ID {id}."))?;
                self.books.list.focus(|b| b.id == book.id);
                self.set_status(
                    format!(
                        "Book {}: {} by {} ({})",
                        book.id, book.title, book.author, book.status
                    ),
                    StatusKind::Info,
                );
            }
        }
        Ok(())
    }

    fn run_audit(&mut self) -> Mode {
        match self.library.audit() {
            Ok(findings) if findings.is_empty() => {
                self.set_status("Books and borrow records agree.", StatusKind::Info);
                Mode::Normal
            }
            Ok(findings) => {
                for finding in &findings {
                    warn!(%finding, "audit finding");
                }
                Mode::AuditReport(findings.iter().map(ToString::to_string).collect())
            }
            Err(err) => {
                self.set_status(surface_error(&err.into()), StatusKind::Error);
                Mode::Normal
            }
        }
    }

    fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.clear_status();
        match tab {
            Tab::Books => self.reload_books(),
            Tab::Members => self.reload_members(),
            Tab::Borrows => self.reload_borrows(),
        }
    }

    fn move_selection(&mut self, offset: isize) {
        match self.tab {
            Tab::Books => self.books.list.move_selection(offset),
            Tab::Members => self.members.list.move_selection(offset),
            Tab::Borrows => self.borrows.list.move_selection(offset),
        }
    }

    fn with_current_list(&mut self, op: ListScreenOp) {
        fn apply<T>(list: &mut ListScreen<T>, op: ListScreenOp) {
            match op {
                ListScreenOp::First => list.select_first(),
                ListScreenOp::Last => list.select_last(),
            }
        }
        match self.tab {
            Tab::Books => apply(&mut self.books.list, op),
            Tab::Members => apply(&mut self.members.list, op),
            Tab::Borrows => apply(&mut self.borrows.list, op),
        }
    }

    fn refresh(&mut self) {
        self.reload_books();
        self.reload_members();
        self.reload_borrows();
    }

    fn reload_books(&mut self) {
        if let Err(err) = self.books.reload(&self.library) {
            self.set_status(surface_error(&err), StatusKind::Error);
        }
    }

    fn reload_members(&mut self) {
        if let Err(err) = self.members.reload(&self.library) {
            self.set_status(surface_error(&err), StatusKind::Error);
        }
    }

    fn reload_borrows(&mut self) {
        if let Err(err) = self.borrows.reload(&self.library) {
            self.set_status(surface_error(&err), StatusKind::Error);
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(TAB_BAR_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_tabs(frame, chunks[0]);
        match self.tab {
            Tab::Books => self.draw_list(
                frame,
                chunks[1],
                self.books.view.title(),
                self.books.view.empty_message(),
                self.books.list.items.iter().map(book_line).collect(),
                self.books.list.selected,
            ),
            Tab::Members => self.draw_list(
                frame,
                chunks[1],
                "All Members",
                "No members registered.",
                self.members.list.items.iter().map(member_line).collect(),
                self.members.list.selected,
            ),
            Tab::Borrows => self.draw_list(
                frame,
                chunks[1],
                self.borrows.title(),
                "No borrow records found.",
                self.borrows.list.items.iter().map(borrow_line).collect(),
                self.borrows.list.selected,
            ),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::Editing(form) => self.draw_form(frame, area, form),
            Mode::ConfirmBookDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::AuditReport(lines) => self.draw_audit_report(frame, area, lines),
            Mode::Normal => {}
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = Tab::ALL
            .iter()
            .enumerate()
            .map(|(i, tab)| Line::from(format!("{} {}", i + 1, tab.title())))
            .collect();
        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL).title("Library"))
            .select(self.tab.index())
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_list(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        empty: &str,
        lines: Vec<Line<'static>>,
        selected: usize,
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("{title} ({})", lines.len()));

        if lines.is_empty() {
            let paragraph = Paragraph::new(Span::styled(
                empty.to_string(),
                Style::default().fg(Color::DarkGray),
            ))
            .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let items: Vec<ListItem> = lines.into_iter().map(ListItem::new).collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected(Some(selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match (&self.mode, self.tab) {
            (Mode::Editing(_), _) => &[
                ("[Tab]", "Next field"),
                ("[Enter]", "Save"),
                ("[Esc]", "Cancel"),
            ],
            (Mode::ConfirmBookDelete(_), _) => &[("[y]", "Delete"), ("[n]", "Keep")],
            (Mode::Searching(_), _) => &[("[Enter]", "Find"), ("[Esc]", "Cancel")],
            (Mode::AuditReport(_), _) => &[("[Esc]", "Close")],
            (Mode::Normal, Tab::Books) => &[
                ("[+]", "Add"),
                ("[-]", "Delete"),
                ("[f]", "Find"),
                ("[o]", "Lend"),
                ("[r]", "Return"),
                ("[v]", "View"),
                ("[Tab]", "Next tab"),
                ("[q]", "Quit"),
            ],
            (Mode::Normal, Tab::Members) => &[
                ("[+]", "Add"),
                ("[f]", "Find"),
                ("[Tab]", "Next tab"),
                ("[q]", "Quit"),
            ],
            (Mode::Normal, Tab::Borrows) => &[
                ("[o]", "Lend"),
                ("[r]", "Return"),
                ("[v]", "Open only"),
                ("[c]", "Check"),
                ("[Tab]", "Next tab"),
                ("[q]", "Quit"),
            ],
        };

        let mut spans = Vec::with_capacity(keys.len() * 2);
        for (key, action) in keys {
            spans.push(Span::styled(key.to_string(), key_style));
            spans.push(Span::raw(format!(" {action}   ")));
        }
        Line::from(spans)
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, form: &Form) {
        let popup_area = centered_rect(70, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(form.title()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = (0..form.fields.len()).map(|i| form.build_line(i)).collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        frame.render_widget(Paragraph::new(lines), inner);

        let field = form.active_field();
        let cursor_x = inner.x + (field.prefix().chars().count() + field.value_len()) as u16;
        let cursor_y = inner.y + form.active as u16;
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmBookDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Delete Book").borders(Borders::ALL);
        let text = vec![
            Line::from(format!("Delete book {} ({})?", confirm.id, confirm.title)),
            Line::from(""),
            Line::from(Span::styled(
                "Borrow history for this book is kept.",
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                "y to delete • n or Esc to keep",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let title = format!("Find {}", state.target.title().trim_end_matches('s'));
        let block = Block::default().borders(Borders::ALL).title(title);
        let paragraph = Paragraph::new(Span::raw(format!("{}{}", state.prompt(), state.query)))
            .block(block.clone());
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x =
            inner.x + state.prompt().len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_audit_report(&self, frame: &mut Frame, area: Rect, findings: &[String]) {
        let popup_area = centered_rect(80, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(format!("Consistency Check ({} issues)", findings.len()))
            .borders(Borders::ALL);
        let lines: Vec<Line> = findings
            .iter()
            .map(|finding| {
                Line::from(Span::styled(
                    format!("• {finding}"),
                    Style::default().fg(Color::Yellow),
                ))
            })
            .collect();
        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }
}

#[derive(Copy, Clone)]
enum ListScreenOp {
    First,
    Last,
}
