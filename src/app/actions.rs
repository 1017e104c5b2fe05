use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    OpenDialog,
    ToggleTheme,
    ScrollDown,
    ScrollUp,
    ScrollTop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Close,
    Submit,
    NextField,
    Newline,
    Backspace,
    Input(char),
}

pub fn action_for_key(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('n') | KeyCode::Char('a') => Some(Action::OpenDialog),
        KeyCode::Char('t') => Some(Action::ToggleTheme),
        KeyCode::Char('j') | KeyCode::Down => Some(Action::ScrollDown),
        KeyCode::Char('k') | KeyCode::Up => Some(Action::ScrollUp),
        KeyCode::Char('g') | KeyCode::Home => Some(Action::ScrollTop),
        _ => None,
    }
}

pub fn form_action_for_key(key: KeyEvent) -> Option<FormAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('s') => Some(FormAction::Submit),
            KeyCode::Char('c') => Some(FormAction::Close),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Esc => Some(FormAction::Close),
        KeyCode::Tab | KeyCode::BackTab => Some(FormAction::NextField),
        KeyCode::Enter => Some(FormAction::Newline),
        KeyCode::Backspace => Some(FormAction::Backspace),
        KeyCode::Char(ch)
            if !key
                .modifiers
                .intersects(KeyModifiers::ALT | KeyModifiers::SUPER) =>
        {
            Some(FormAction::Input(ch))
        }
        _ => None,
    }
}
