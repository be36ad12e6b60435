use anyhow::{anyhow, Context, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Book, MEMBER_ID_LEN, NAME_MAX_CHARS, PHONE_MAX_CHARS, TITLE_MAX_CHARS};
use crate::store::codec::OPEN_SENTINEL;

use super::helpers::today;

/// Enough digits for any book number the catalogue realistically uses while
/// staying inside `i64`.
const BOOK_ID_MAX_DIGITS: usize = 18;
/// `dd/mm/yyyy`.
const DATE_MAX_CHARS: usize = 10;

/// One editable line inside a popup form.
#[derive(Clone)]
pub(crate) struct TextField {
    pub(crate) label: &'static str,
    pub(crate) value: String,
    max_chars: usize,
    digits_only: bool,
}

impl TextField {
    fn text(label: &'static str, max_chars: usize) -> Self {
        Self {
            label,
            value: String::new(),
            max_chars,
            digits_only: false,
        }
    }

    fn digits(label: &'static str, max_chars: usize) -> Self {
        Self {
            digits_only: true,
            ..Self::text(label, max_chars)
        }
    }

    fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Append a character if the field accepts it and still has room.
    fn push_char(&mut self, ch: char) -> bool {
        let allowed = if self.digits_only {
            ch.is_ascii_digit()
        } else {
            !ch.is_control()
        };
        if allowed && self.value.chars().count() < self.max_chars {
            self.value.push(ch);
            true
        } else {
            false
        }
    }

    pub(crate) fn value_len(&self) -> usize {
        self.value.chars().count()
    }

    /// Text left of the value, which is also where the cursor offset starts.
    pub(crate) fn prefix(&self) -> String {
        format!("{}: ", self.label)
    }

    fn trimmed(&self) -> &str {
        self.value.trim()
    }

    fn required(&self) -> Result<&str> {
        let value = self.trimmed();
        if value.is_empty() {
            Err(anyhow!("{} is required.", self.label))
        } else {
            Ok(value)
        }
    }

    fn book_id(&self) -> Result<i64> {
        self.required()?
            .parse::<i64>()
            .with_context(|| format!("{} must be an integer.", self.label))
    }
}

/// Which operation a form collects arguments for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum FormKind {
    AddBook,
    AddMember,
    Borrow,
    Return,
}

/// Parsed, trimmed arguments ready to hand to the library.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum FormInput {
    Book {
        id: i64,
        title: String,
        author: String,
    },
    Member {
        id: String,
        name: String,
        phone: String,
    },
    Borrow {
        book_id: i64,
        member_id: String,
        date: String,
    },
    Return {
        book_id: i64,
        date: String,
    },
}

/// State for a modal input form.
#[derive(Clone)]
pub(crate) struct Form {
    pub(crate) kind: FormKind,
    pub(crate) fields: Vec<TextField>,
    pub(crate) active: usize,
    pub(crate) error: Option<String>,
}

impl Form {
    fn new(kind: FormKind, fields: Vec<TextField>) -> Self {
        Self {
            kind,
            fields,
            active: 0,
            error: None,
        }
    }

    pub(crate) fn add_book() -> Self {
        Self::new(
            FormKind::AddBook,
            vec![
                TextField::digits("Book ID", BOOK_ID_MAX_DIGITS),
                TextField::text("Title", TITLE_MAX_CHARS),
                TextField::text("Author", TITLE_MAX_CHARS),
            ],
        )
    }

    pub(crate) fn add_member() -> Self {
        Self::new(
            FormKind::AddMember,
            vec![
                TextField::digits("Member ID", MEMBER_ID_LEN),
                TextField::text("Name", NAME_MAX_CHARS),
                TextField::text("Phone", PHONE_MAX_CHARS),
            ],
        )
    }

    /// Lending form. When opened from a selected book the ID is filled in and
    /// focus starts on the member.
    pub(crate) fn borrow(book: Option<&Book>) -> Self {
        let mut form = Self::new(
            FormKind::Borrow,
            vec![
                TextField::digits("Book ID", BOOK_ID_MAX_DIGITS)
                    .with_value(book.map(|b| b.id.to_string()).unwrap_or_default()),
                TextField::digits("Member ID", MEMBER_ID_LEN),
                TextField::text("Borrow date", DATE_MAX_CHARS).with_value(today()),
            ],
        );
        if book.is_some() {
            form.active = 1;
        }
        form
    }

    pub(crate) fn return_book(book_id: Option<i64>) -> Self {
        let mut form = Self::new(
            FormKind::Return,
            vec![
                TextField::digits("Book ID", BOOK_ID_MAX_DIGITS)
                    .with_value(book_id.map(|id| id.to_string()).unwrap_or_default()),
                TextField::text("Return date", DATE_MAX_CHARS).with_value(today()),
            ],
        );
        if book_id.is_some() {
            form.active = 1;
        }
        form
    }

    pub(crate) fn title(&self) -> &'static str {
        match self.kind {
            FormKind::AddBook => "Add Book",
            FormKind::AddMember => "Add Member",
            FormKind::Borrow => "Borrow Book",
            FormKind::Return => "Return Book",
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = (self.active + 1) % self.fields.len();
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = (self.active + self.fields.len() - 1) % self.fields.len();
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        self.fields[self.active].push_char(ch)
    }

    pub(crate) fn backspace(&mut self) {
        self.fields[self.active].value.pop();
    }

    pub(crate) fn active_field(&self) -> &TextField {
        &self.fields[self.active]
    }

    /// Validate the inputs and return typed values. Only presence and the
    /// integer shape of book IDs are checked here; member ID rules belong to
    /// the library.
    pub(crate) fn parse_inputs(&self) -> Result<FormInput> {
        let f = &self.fields;
        match self.kind {
            FormKind::AddBook => Ok(FormInput::Book {
                id: f[0].book_id()?,
                title: f[1].required()?.to_string(),
                author: f[2].required()?.to_string(),
            }),
            FormKind::AddMember => Ok(FormInput::Member {
                id: f[0].required()?.to_string(),
                name: f[1].required()?.to_string(),
                phone: f[2].required()?.to_string(),
            }),
            FormKind::Borrow => Ok(FormInput::Borrow {
                book_id: f[0].book_id()?,
                member_id: f[1].required()?.to_string(),
                date: f[2].required()?.to_string(),
            }),
            FormKind::Return => {
                let date = f[1].required()?;
                if date == OPEN_SENTINEL {
                    return Err(anyhow!("Return date cannot be \"{OPEN_SENTINEL}\"."));
                }
                Ok(FormInput::Return {
                    book_id: f[0].book_id()?,
                    date: date.to_string(),
                })
            }
        }
    }

    /// Render one field, highlighting it when focused.
    pub(crate) fn build_line(&self, index: usize) -> Line<'static> {
        let field = &self.fields[index];
        let is_active = index == self.active;

        let display = if field.value.is_empty() {
            "<required>".to_string()
        } else {
            field.value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if field.value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![Span::raw(field.prefix()), Span::styled(display, style)])
    }
}

#[derive(Clone)]
pub(crate) struct ConfirmBookDelete {
    pub(crate) id: i64,
    pub(crate) title: String,
}

impl From<&Book> for ConfirmBookDelete {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_into(form: &mut Form, text: &str) {
        for ch in text.chars() {
            form.push_char(ch);
        }
    }

    #[test]
    fn add_book_form_parses_trimmed_values() {
        let mut form = Form::add_book();
        type_into(&mut form, "42");
        form.next_field();
        type_into(&mut form, "  Dune ");
        form.next_field();
        type_into(&mut form, "Herbert");

        assert_eq!(
            form.parse_inputs().unwrap(),
            FormInput::Book {
                id: 42,
                title: "Dune".into(),
                author: "Herbert".into(),
            }
        );
    }

    #[test]
    fn id_fields_only_take_digits() {
        let mut form = Form::add_member();
        type_into(&mut form, "12a34-5");
        assert_eq!(form.fields[0].value, "12345");
    }

    #[test]
    fn fields_stop_at_their_limit() {
        let mut form = Form::add_member();
        type_into(&mut form, "1234567890123");
        assert_eq!(form.fields[0].value, "12345678901");

        form.next_field();
        type_into(&mut form, &"n".repeat(80));
        assert_eq!(form.fields[1].value_len(), NAME_MAX_CHARS);
    }

    #[test]
    fn missing_values_are_reported_by_label() {
        let form = Form::add_book();
        let err = form.parse_inputs().unwrap_err();
        assert_eq!(err.to_string(), "Book ID is required.");
    }

    #[test]
    fn borrow_form_prefills_selected_book_and_focuses_member() {
        let book = Book::new(7, "Emma", "Austen");
        let mut form = Form::borrow(Some(&book));
        assert_eq!(form.fields[0].value, "7");
        assert_eq!(form.active, 1);
        assert_eq!(form.fields[2].value_len(), 10);

        type_into(&mut form, "12345678901");
        match form.parse_inputs().unwrap() {
            FormInput::Borrow { book_id, member_id, .. } => {
                assert_eq!(book_id, 7);
                assert_eq!(member_id, "12345678901");
            }
            other => panic!("unexpected input {other:?}"),
        }
    }

    #[test]
    fn return_date_cannot_be_the_open_marker() {
        let mut form = Form::return_book(Some(3));
        form.fields[1].value = "-".into();
        assert!(form.parse_inputs().is_err());

        form.fields[1].value = "02/01/2024".into();
        assert_eq!(
            form.parse_inputs().unwrap(),
            FormInput::Return {
                book_id: 3,
                date: "02/01/2024".into(),
            }
        );
    }

    #[test]
    fn focus_wraps_in_both_directions() {
        let mut form = Form::add_book();
        form.previous_field();
        assert_eq!(form.active, 2);
        form.next_field();
        assert_eq!(form.active, 0);
    }

    #[test]
    fn delete_confirmation_names_the_selected_book() {
        let book = Book::new(7, "Emma", "Austen");
        let confirm = ConfirmBookDelete::from(&book);
        assert_eq!(confirm.id, 7);
        assert_eq!(confirm.title, "Emma");
    }
}
