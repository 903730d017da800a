//! Interactive session. Owns the client for its whole lifetime, reads one
//! command per line and redraws the screen after anything that can change
//! it.

use std::io::{BufRead, Write};

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::api::Backend;
use crate::client::BookmarkClient;
use crate::error::ClientError;
use crate::formatting::{FormatContext, TimeFormatter};
use crate::model::{BookmarkId, TagId};
use crate::render;

const PROMPT: &str = "linkvault> ";

const HELP: &str = "\
Commands:
  filter <id>        toggle a tag in the filter
  clear              clear the filter
  search [text]      set or clear the search text
  refresh            reload tags and bookmarks
  url|title|notes <text>
                     fill the new bookmark form
  pick <id>          toggle a tag on the new bookmark form
  save               create the bookmark
  newtag             open or close the new tag form
  tagname <text>     new tag name
  tagcolor <#hex>    new tag color
  createtag          create the tag
  manage             toggle manage mode
  deltag <id>        delete a tag (manage mode only)
  edit <id>          edit a bookmark
  etitle|enotes <text>
                     change the edited title or notes
  etag <id>          toggle a tag on the edited bookmark
  esave | ecancel    save or discard the edit
  delete <id>        delete a bookmark
  show [id]          redraw, or show one bookmark in full
  help               this text
  quit               leave";

#[derive(Parser, Debug)]
#[command(
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug, PartialEq)]
enum ShellCommand {
    Filter { id: TagId },
    Clear,
    Search {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    Refresh,
    Url {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    Title {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    Notes {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    Pick { id: TagId },
    Save,
    Newtag,
    Tagname {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    Tagcolor { color: String },
    Createtag,
    Deltag { id: TagId },
    Manage,
    Edit { id: BookmarkId },
    Etitle {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    Enotes {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    Etag { id: TagId },
    Esave,
    Ecancel,
    Delete { id: BookmarkId },
    Show { id: Option<BookmarkId> },
    Help,
    #[command(alias = "exit")]
    Quit,
}

enum Flow {
    Redraw,
    Stay,
    Quit,
}

pub struct Shell<B: Backend, R: BufRead, W: Write> {
    client: BookmarkClient<B>,
    input: R,
    out: W,
    ctx: FormatContext,
}

impl<B: Backend, R: BufRead, W: Write> Shell<B, R, W> {
    pub fn new(client: BookmarkClient<B>, input: R, out: W, ctx: FormatContext) -> Self {
        Self { client, input, out, ctx }
    }

    #[cfg(test)]
    fn into_parts(self) -> (BookmarkClient<B>, W) {
        (self.client, self.out)
    }

    /// Mount, draw, then process lines until `quit` or end of input.
    pub fn run(&mut self) -> Result<(), ClientError> {
        settle(self.client.mount());
        self.redraw()?;
        loop {
            write!(self.out, "{PROMPT}")?;
            self.out.flush()?;
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.out)?;
                break;
            }
            let words = match split_words(&line) {
                Ok(words) if words.is_empty() => continue,
                Ok(words) => words,
                Err(msg) => {
                    writeln!(self.out, "{msg}")?;
                    continue;
                }
            };
            let command = match ShellLine::try_parse_from(&words) {
                Ok(parsed) => parsed.command,
                Err(err) => {
                    let msg = err.to_string();
                    let first = msg.lines().next().unwrap_or("invalid command");
                    writeln!(self.out, "{first} (type `help`)")?;
                    continue;
                }
            };
            match self.dispatch(command)? {
                Flow::Redraw => self.redraw()?,
                Flow::Stay => {}
                Flow::Quit => break,
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, command: ShellCommand) -> Result<Flow, ClientError> {
        debug!(?command, "shell command");
        let client = &mut self.client;
        match command {
            ShellCommand::Filter { id } => settle(client.toggle_filter(id)),
            ShellCommand::Clear => settle(client.clear_filter()),
            ShellCommand::Search { text } => {
                let text = text.join(" ");
                settle(client.set_search(Some(&text)));
            }
            ShellCommand::Refresh => settle(client.refresh()),
            ShellCommand::Url { text } => {
                client.state_mut().bookmark_form.url = text.join(" ");
            }
            ShellCommand::Title { text } => {
                client.state_mut().bookmark_form.title = text.join(" ");
            }
            ShellCommand::Notes { text } => {
                client.state_mut().bookmark_form.notes = text.join(" ");
            }
            ShellCommand::Pick { id } => {
                client.toggle_create_tag(id);
            }
            ShellCommand::Save => settle(client.create_bookmark()),
            ShellCommand::Newtag => {
                client.toggle_tag_form();
            }
            ShellCommand::Tagname { text } => {
                client.state_mut().tag_form.name = text.join(" ");
            }
            ShellCommand::Tagcolor { color } => {
                client.state_mut().tag_form.color = color;
            }
            ShellCommand::Createtag => settle(client.create_tag()),
            ShellCommand::Manage => {
                client.toggle_manage_tags();
            }
            ShellCommand::Deltag { id } => {
                if !client.state().manage_tags {
                    writeln!(self.out, "Turn on manage mode first (manage).")?;
                    return Ok(Flow::Stay);
                }
                let (input, out) = (&mut self.input, &mut self.out);
                let mut confirm = |prompt: &str| ask(&mut *input, &mut *out, prompt);
                if let Ok(false) = client.delete_tag(id, &mut confirm) {
                    writeln!(self.out, "Cancelled.")?;
                }
            }
            ShellCommand::Edit { id } => settle(client.start_edit(id)),
            ShellCommand::Etitle { text } => match client.state_mut().editing.as_mut() {
                Some(edit) => edit.title = text.join(" "),
                None => return not_editing(&mut self.out),
            },
            ShellCommand::Enotes { text } => match client.state_mut().editing.as_mut() {
                Some(edit) => edit.notes = text.join(" "),
                None => return not_editing(&mut self.out),
            },
            ShellCommand::Etag { id } => {
                if client.toggle_edit_tag(id).is_none() {
                    return not_editing(&mut self.out);
                }
            }
            ShellCommand::Esave => settle(client.save_edit()),
            ShellCommand::Ecancel => client.cancel_edit(),
            ShellCommand::Delete { id } => {
                let (input, out) = (&mut self.input, &mut self.out);
                let mut confirm = |prompt: &str| ask(&mut *input, &mut *out, prompt);
                if let Ok(false) = client.delete_bookmark(id, &mut confirm) {
                    writeln!(self.out, "Cancelled.")?;
                }
            }
            ShellCommand::Show { id: None } => {}
            ShellCommand::Show { id: Some(id) } => {
                match client.state().bookmark(id) {
                    Some(b) => {
                        let text = render::bookmark_detail(b, &self.ctx, &TimeFormatter::now_local());
                        writeln!(self.out, "{text}")?;
                    }
                    None => writeln!(self.out, "Bookmark {id} is not in the current list.")?,
                }
                return Ok(Flow::Stay);
            }
            ShellCommand::Help => {
                writeln!(self.out, "{HELP}")?;
                return Ok(Flow::Stay);
            }
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Redraw)
    }

    fn redraw(&mut self) -> Result<(), ClientError> {
        let screen = render::screen(self.client.state(), &self.ctx, &TimeFormatter::now_local());
        writeln!(self.out, "\n{screen}\n")?;
        Ok(())
    }
}

fn not_editing<W: Write>(out: &mut W) -> Result<Flow, ClientError> {
    writeln!(out, "No bookmark is being edited (edit <id>).")?;
    Ok(Flow::Stay)
}

// Failures are already on the banner, which the next redraw shows.
fn settle<T>(result: Result<T, ClientError>) {
    if let Err(err) = result {
        debug!(
            validation = err.is_validation(),
            status = ?err.status(),
            error = %err,
            "operation failed"
        );
    }
}

/// Print `prompt` and read one line; `y` or `yes` confirms. End of input
/// declines.
pub(crate) fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> bool {
    if write!(out, "{prompt} [y/N] ").and_then(|()| out.flush()).is_err() {
        return false;
    }
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => false,
        Ok(_) => matches!(line.trim().to_lowercase().as_str(), "y" | "yes"),
    }
}

/// Split a command line into words. Single and double quotes group words;
/// a backslash escapes the next character outside single quotes.
pub fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some('\''), c) => current.push(c),
            (_, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                in_word = true;
            }
            (Some(_), c) => current.push(c),
            (None, '"') | (None, '\'') => {
                quote = Some(ch);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err("Unterminated quote.".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
