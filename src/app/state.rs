use std::time::Instant;

use anyhow::{Context, Result};
use time::UtcOffset;

use crate::app::form::{EntryForm, FormField};
use crate::app::theme::ThemeController;
use crate::config::Theme;
use crate::journal::{EntryStore, InvalidFields, JournalError};
use crate::render::{render, Rendered};
use crate::storage::KeyValueStore;
use crate::toast::{ToastKind, ToastNotifier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created,
    Invalid(InvalidFields),
    /// Validation passed but the entry could not be stored.
    Failed(String),
}

/// Everything the UI layer talks to: entries, the dialog, the theme and the
/// toast slot. Owned by the event loop and passed around explicitly.
pub struct Journal<S> {
    entries: EntryStore<S>,
    form: EntryForm,
    theme: ThemeController,
    toast: ToastNotifier,
    offset: UtcOffset,
}

impl<S: KeyValueStore> Journal<S> {
    /// Loads entries and the theme preference. Only read failures abort; a
    /// theme that cannot be written back is reported through the toast.
    pub fn open(store: S, toast: ToastNotifier, offset: UtcOffset) -> Result<Self> {
        let entries = EntryStore::open(store).context("loading journal entries")?;
        let (theme, persist_error) =
            ThemeController::init(entries.store()).context("initialising theme")?;
        let mut journal = Self {
            entries,
            form: EntryForm::default(),
            theme,
            toast,
            offset,
        };
        if let Some(err) = persist_error {
            tracing::error!(?err, "failed to persist theme preference");
            journal.notify("Theme could not be saved", ToastKind::Error, Instant::now());
        }
        Ok(journal)
    }

    pub fn entries(&self) -> &EntryStore<S> {
        &self.entries
    }

    pub fn form(&self) -> &EntryForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut EntryForm {
        &mut self.form
    }

    pub fn theme(&self) -> &ThemeController {
        &self.theme
    }

    pub fn toast(&self) -> &ToastNotifier {
        &self.toast
    }

    pub fn toast_mut(&mut self) -> &mut ToastNotifier {
        &mut self.toast
    }

    pub fn open_dialog(&mut self) {
        if !self.form.is_open() {
            self.form.open();
            tracing::debug!("log create dialog opened");
        }
    }

    pub fn close_dialog(&mut self) {
        self.form.close();
        tracing::debug!("log create dialog closed and inputs cleared");
    }

    /// Fills the dialog with `title`/`body` and submits it. A closed dialog is
    /// opened first, so rejected input stays on screen with its markers.
    pub fn submit_entry(&mut self, title: &str, body: &str, now: Instant) -> SubmitOutcome {
        self.open_dialog();
        self.form.set_field(FormField::Title, title);
        self.form.set_field(FormField::Body, body);
        self.submit_form(now)
    }

    /// Submits whatever the dialog currently holds. Invalid input marks the
    /// offending fields; a storage failure keeps the dialog open with its
    /// contents so nothing typed is lost.
    pub fn submit_form(&mut self, now: Instant) -> SubmitOutcome {
        if let Err(invalid) = self.form.check() {
            tracing::debug!(?invalid, "entry rejected by validation");
            return SubmitOutcome::Invalid(invalid);
        }

        let title = self.form.title().to_owned();
        let body = self.form.body().to_owned();
        match self.entries.append(&title, &body) {
            Ok(_) => {
                self.close_dialog();
                self.notify("Log created", ToastKind::Success, now);
                SubmitOutcome::Created
            }
            Err(JournalError::Invalid(invalid)) => SubmitOutcome::Invalid(invalid),
            Err(err) => {
                tracing::error!(?err, "failed to save entry");
                self.notify("Failed to save log", ToastKind::Error, now);
                SubmitOutcome::Failed(err.to_string())
            }
        }
    }

    pub fn render_all(&self) -> Rendered {
        render(self.entries.all(), self.offset)
    }

    pub fn toggle_theme(&mut self, now: Instant) -> Theme {
        if let Err(err) = self.theme.toggle(self.entries.store()) {
            tracing::error!(?err, "failed to persist theme preference");
            self.notify("Theme changed but could not be saved", ToastKind::Error, now);
        }
        self.theme.current()
    }

    pub fn notify<M: Into<String>>(&mut self, message: M, kind: ToastKind, now: Instant) {
        self.toast.show(message, kind, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::form::DialogState;
    use crate::app::theme::THEME_KEY;
    use crate::journal::{decode_entries, ENTRIES_KEY};
    use crate::render::EMPTY_PLACEHOLDER;
    use crate::storage::MemoryStore;
    use crate::toast::ToastPhase;
    use anyhow::bail;
    use assert_matches::assert_matches;

    fn open_journal(store: &MemoryStore) -> Result<Journal<&MemoryStore>> {
        Journal::open(store, ToastNotifier::default(), UtcOffset::UTC)
    }

    fn rendered_titles<S: KeyValueStore>(journal: &Journal<S>) -> Vec<String> {
        journal
            .render_all()
            .blocks()
            .iter()
            .map(|block| block.title.clone())
            .collect()
    }

    #[test]
    fn valid_submit_appends_closes_and_confirms() -> Result<()> {
        let store = MemoryStore::new();
        let mut journal = open_journal(&store)?;
        let now = Instant::now();

        journal.open_dialog();
        let outcome = journal.submit_entry("Day 1", "Went well", now);
        assert_eq!(outcome, SubmitOutcome::Created);
        assert_eq!(journal.entries().len(), 1);
        assert_eq!(journal.form().state(), DialogState::Closed);
        assert!(journal.form().title().is_empty());

        let (toast, phase) = journal.toast().current(now).expect("toast shown");
        assert_eq!(toast.kind, ToastKind::Success);
        assert_eq!(phase, ToastPhase::Visible);
        Ok(())
    }

    #[test]
    fn two_submits_render_newest_first_and_store_oldest_first() -> Result<()> {
        let store = MemoryStore::new();
        let mut journal = open_journal(&store)?;
        let now = Instant::now();

        journal.open_dialog();
        journal.submit_entry("Day 1", "Went well", now);
        journal.open_dialog();
        journal.submit_entry("Day 2", "Also well", now);

        assert_eq!(rendered_titles(&journal), ["Day 2", "Day 1"]);
        let stored = decode_entries(&store.get(ENTRIES_KEY)?.unwrap_or_default())?;
        let titles: Vec<_> = stored.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["Day 1", "Day 2"]);
        Ok(())
    }

    #[test]
    fn empty_submit_marks_both_fields_and_keeps_placeholder() -> Result<()> {
        let store = MemoryStore::new();
        let mut journal = open_journal(&store)?;

        journal.open_dialog();
        let outcome = journal.submit_entry("", "", Instant::now());
        assert_eq!(
            outcome,
            SubmitOutcome::Invalid(InvalidFields::TITLE | InvalidFields::BODY)
        );
        assert!(journal.form().is_open());
        assert!(journal.entries().is_empty());
        assert_eq!(journal.render_all(), Rendered::Placeholder(EMPTY_PLACEHOLDER));
        assert!(journal.toast().current(Instant::now()).is_none());
        Ok(())
    }

    #[test]
    fn partially_empty_submit_marks_only_the_empty_field() -> Result<()> {
        let store = MemoryStore::new();
        let mut journal = open_journal(&store)?;
        let now = Instant::now();

        journal.open_dialog();
        assert_matches!(
            journal.submit_entry("", "body", now),
            SubmitOutcome::Invalid(fields) if fields == InvalidFields::TITLE
        );
        assert!(journal.form().is_invalid(FormField::Title));
        assert!(!journal.form().is_invalid(FormField::Body));

        assert_matches!(
            journal.submit_entry("title", "", now),
            SubmitOutcome::Invalid(fields) if fields == InvalidFields::BODY
        );
        assert!(journal.form().is_open());
        assert!(journal.entries().is_empty());
        Ok(())
    }

    #[test]
    fn entries_survive_reopening_the_journal() -> Result<()> {
        let store = MemoryStore::new();
        let expected = {
            let mut journal = open_journal(&store)?;
            journal.open_dialog();
            journal.submit_entry("Day 1", "<p>Went well</p>", Instant::now());
            journal.entries().all().to_vec()
        };
        let reopened = open_journal(&store)?;
        assert_eq!(reopened.entries().all(), expected.as_slice());
        Ok(())
    }

    #[test]
    fn theme_toggle_is_remembered() -> Result<()> {
        let store = MemoryStore::new();
        {
            let mut journal = open_journal(&store)?;
            assert_eq!(journal.theme().current(), Theme::Dark);
            assert_eq!(journal.toggle_theme(Instant::now()), Theme::Light);
        }
        let reopened = open_journal(&store)?;
        assert_eq!(reopened.theme().current(), Theme::Light);
        Ok(())
    }

    struct FrozenStore(MemoryStore);

    impl KeyValueStore for FrozenStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            if key == ENTRIES_KEY {
                bail!("storage quota exceeded");
            }
            self.0.set(key, value)
        }
    }

    #[test]
    fn submit_on_closed_dialog_opens_it_for_corrections() -> Result<()> {
        let store = MemoryStore::new();
        let mut journal = open_journal(&store)?;
        assert!(!journal.form().is_open());

        let outcome = journal.submit_entry("Day 1", "", Instant::now());
        assert_matches!(outcome, SubmitOutcome::Invalid(fields) if fields == InvalidFields::BODY);
        assert!(journal.form().is_open());
        assert_eq!(journal.form().title(), "Day 1");

        assert_eq!(
            journal.submit_entry("Day 1", "Went well", Instant::now()),
            SubmitOutcome::Created
        );
        assert!(!journal.form().is_open());
        Ok(())
    }

    struct ThemeLockedStore(MemoryStore);

    impl KeyValueStore for ThemeLockedStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            if key == THEME_KEY {
                bail!("theme key is read-only");
            }
            self.0.set(key, value)
        }
    }

    #[test]
    fn unwritable_theme_key_still_opens_with_error_toast() -> Result<()> {
        let now = Instant::now();
        let mut journal = Journal::open(
            ThemeLockedStore(MemoryStore::new()),
            ToastNotifier::default(),
            UtcOffset::UTC,
        )?;
        assert_eq!(journal.theme().current(), Theme::Dark);
        let (toast, _) = journal.toast().current(now).expect("error toast");
        assert_eq!(toast.kind, ToastKind::Error);

        assert_eq!(
            journal.submit_entry("Day 1", "Went well", now),
            SubmitOutcome::Created
        );
        assert_eq!(journal.entries().len(), 1);
        Ok(())
    }

    #[test]
    fn storage_failure_keeps_dialog_and_shows_error() -> Result<()> {
        let mut journal = Journal::open(
            FrozenStore(MemoryStore::new()),
            ToastNotifier::default(),
            UtcOffset::UTC,
        )?;
        let now = Instant::now();

        journal.open_dialog();
        let outcome = journal.submit_entry("Day 1", "Went well", now);
        assert_matches!(outcome, SubmitOutcome::Failed(_));
        assert!(journal.form().is_open());
        assert_eq!(journal.form().title(), "Day 1");
        assert!(journal.entries().is_empty());
        let (toast, _) = journal.toast().current(now).expect("error toast");
        assert_eq!(toast.kind, ToastKind::Error);
        Ok(())
    }
}
