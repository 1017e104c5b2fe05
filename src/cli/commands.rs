use std::io::{self, Read};

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use time::UtcOffset;

use crate::app::{App, ThemeController};
use crate::config::Theme;
use crate::journal::{EntryStore, JournalError};
use crate::render::render;
use crate::storage::KeyValueStore;

#[derive(Args, Debug, Clone)]
pub struct NewArgs {
    /// Title for the entry (prompted if omitted)
    #[arg()]
    pub title: Option<String>,
    /// Provide the entry body inline. If omitted, reads from stdin.
    #[arg(long)]
    pub body: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ThemeCommand {
    /// Print the active theme
    Show,
    /// Switch to the other theme
    Toggle,
    /// Choose a theme explicitly
    Set {
        /// `light` or `dark`
        theme: Theme,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ThemeArgs {
    #[command(subcommand)]
    pub command: Option<ThemeCommand>,
}

pub fn run_tui(app: &mut App) -> Result<()> {
    app.run()
}

pub fn new_entry<S: KeyValueStore>(storage: &S, args: NewArgs) -> Result<()> {
    let title = match args.title {
        Some(t) => t,
        None => prompt("Title")?,
    };
    let body = match args.body {
        Some(body) => body,
        None => match read_stdin()? {
            Some(body) => body,
            None => prompt("Body")?,
        },
    };
    let message = create_entry(storage, &title, &body)?;
    println!("{message}");
    Ok(())
}

pub fn list_entries<S: KeyValueStore>(storage: &S, offset: UtcOffset) -> Result<()> {
    print!("{}", render_list(storage, offset)?);
    Ok(())
}

pub fn handle_theme_command<S: KeyValueStore>(storage: &S, args: ThemeArgs) -> Result<()> {
    let output = run_theme(storage, args.command.unwrap_or(ThemeCommand::Show))?;
    println!("{output}");
    Ok(())
}

fn create_entry<S: KeyValueStore>(storage: &S, title: &str, body: &str) -> Result<String> {
    let mut journal = EntryStore::open(storage).context("loading journal entries")?;
    match journal.append(title, body) {
        Ok(_) => Ok(format!("Created log \"{title}\" ({} total)", journal.len())),
        Err(JournalError::Invalid(invalid)) => bail!("{}", invalid.describe()),
        Err(err) => Err(err).context("saving entry"),
    }
}

fn render_list<S: KeyValueStore>(storage: &S, offset: UtcOffset) -> Result<String> {
    let journal = EntryStore::open(storage).context("loading journal entries")?;
    Ok(render(journal.all(), offset).to_string())
}

fn run_theme<S: KeyValueStore>(storage: &S, command: ThemeCommand) -> Result<String> {
    let (mut controller, persist_error) =
        ThemeController::init(storage).context("reading theme preference")?;
    if let Some(err) = persist_error {
        return Err(err).context("saving theme preference");
    }
    match command {
        ThemeCommand::Show => {}
        ThemeCommand::Toggle => {
            controller.toggle(storage).context("saving theme preference")?;
        }
        ThemeCommand::Set { theme } => {
            controller
                .apply(storage, theme)
                .context("saving theme preference")?;
        }
    }
    Ok(format!(
        "theme: {} (toggle: {})",
        controller.current(),
        controller.toggle_label()
    ))
}

fn prompt(label: &str) -> Result<String> {
    use std::io::Write;
    let mut stdout = io::stdout();
    write!(stdout, "{}: ", label)?;
    stdout.flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_owned())
}

fn read_stdin() -> Result<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(Some(buf))
}
