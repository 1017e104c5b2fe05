use std::str::FromStr;

use anyhow::Result;

use crate::config::Theme;
use crate::storage::KeyValueStore;

pub const THEME_KEY: &str = "theme";

/// Tracks the active theme and mirrors every change to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeController {
    current: Theme,
}

impl Default for ThemeController {
    fn default() -> Self {
        Self {
            current: Theme::default(),
        }
    }
}

impl ThemeController {
    /// Reads the stored preference (dark when unset or unrecognised) and
    /// applies it.
    ///
    /// Only a failed read is an error. If writing the resolved theme back
    /// fails, the controller is still returned with that theme active, paired
    /// with the write error for the caller to report.
    pub fn init<S: KeyValueStore>(store: &S) -> Result<(Self, Option<anyhow::Error>)> {
        let theme = match store.get(THEME_KEY)? {
            Some(raw) => Theme::from_str(raw.trim()).unwrap_or_else(|_| {
                tracing::warn!(stored = %raw, "unknown theme preference, falling back to dark");
                Theme::Dark
            }),
            None => Theme::default(),
        };
        let mut controller = Self { current: theme };
        let persist_error = controller.apply(store, theme).err();
        Ok((controller, persist_error))
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    /// The active theme changes even when persisting it fails; the error is
    /// still returned so the caller can report it.
    pub fn apply<S: KeyValueStore>(&mut self, store: &S, theme: Theme) -> Result<()> {
        self.current = theme;
        store.set(THEME_KEY, theme.as_ref())?;
        tracing::debug!(%theme, "theme applied");
        Ok(())
    }

    pub fn toggle<S: KeyValueStore>(&mut self, store: &S) -> Result<Theme> {
        let next = self.current.opposite();
        self.apply(store, next)?;
        tracing::info!(theme = %next, "theme toggled");
        Ok(next)
    }

    /// Label for the toggle control: the theme it would switch to.
    pub fn toggle_label(&self) -> String {
        let next = self.current.opposite();
        format!("{} {}", next.icon(), next.label())
    }
}
