use unicode_segmentation::UnicodeSegmentation;

use crate::journal::{validate, InvalidFields};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Body,
}

impl FormField {
    fn marker(self) -> InvalidFields {
        match self {
            FormField::Title => InvalidFields::TITLE,
            FormField::Body => InvalidFields::BODY,
        }
    }
}

/// The create-entry dialog: visibility, field contents, focus and the
/// per-field invalid markers set by the last submit.
#[derive(Debug, Clone)]
pub struct EntryForm {
    state: DialogState,
    title: String,
    body: String,
    focus: FormField,
    invalid: InvalidFields,
}

impl Default for EntryForm {
    fn default() -> Self {
        Self {
            state: DialogState::Closed,
            title: String::new(),
            body: String::new(),
            focus: FormField::Title,
            invalid: InvalidFields::empty(),
        }
    }
}

impl EntryForm {
    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == DialogState::Open
    }

    pub fn open(&mut self) {
        self.state = DialogState::Open;
        self.focus = FormField::Title;
    }

    /// Closing always clears both fields and both markers.
    pub fn close(&mut self) {
        self.state = DialogState::Closed;
        self.title.clear();
        self.body.clear();
        self.focus = FormField::Title;
        self.invalid = InvalidFields::empty();
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    pub fn set_focus(&mut self, field: FormField) {
        self.focus = field;
    }

    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            FormField::Title => FormField::Body,
            FormField::Body => FormField::Title,
        };
    }

    pub fn invalid(&self) -> InvalidFields {
        self.invalid
    }

    pub fn is_invalid(&self, field: FormField) -> bool {
        self.invalid.contains(field.marker())
    }

    pub fn set_field(&mut self, field: FormField, value: &str) {
        let target = self.field_mut(field);
        target.clear();
        target.push_str(value);
        self.invalid.remove(field.marker());
    }

    pub fn insert_char(&mut self, ch: char) {
        let field = self.focus;
        self.field_mut(field).push(ch);
        self.invalid.remove(field.marker());
    }

    /// Enter in the title moves on to the body; in the body it breaks the line.
    pub fn insert_newline(&mut self) {
        match self.focus {
            FormField::Title => self.focus = FormField::Body,
            FormField::Body => self.insert_char('\n'),
        }
    }

    pub fn backspace(&mut self) {
        let field = self.focus;
        let target = self.field_mut(field);
        if let Some((idx, _)) = target.grapheme_indices(true).next_back() {
            target.truncate(idx);
        }
        self.invalid.remove(field.marker());
    }

    /// Validates the current contents and updates the markers to match.
    pub fn check(&mut self) -> Result<(), InvalidFields> {
        match validate(&self.title, &self.body) {
            Ok(()) => {
                self.invalid = InvalidFields::empty();
                Ok(())
            }
            Err(invalid) => {
                self.invalid = invalid;
                if invalid.contains(InvalidFields::TITLE) {
                    self.focus = FormField::Title;
                } else {
                    self.focus = FormField::Body;
                }
                Err(invalid)
            }
        }
    }

    fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Title => &mut self.title,
            FormField::Body => &mut self.body,
        }
    }
}
