//! Command-line surface: argument definitions and the one-shot commands.
//! Each command mounts only what it needs, runs one client operation and
//! prints the result.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::api::Backend;
use crate::client::{BookmarkClient, Confirm};
use crate::error::ClientError;
use crate::formatting::{FormatContext, TimeFormatter};
use crate::model::{BookmarkId, TagId};
use crate::render;
use crate::selection::Selection;

#[derive(Parser, Debug)]
#[command(
    name = "linkvault",
    version,
    about = "Tag-organized bookmarks on a LinkVault server"
)]
pub struct Cli {
    /// Config file (default: ~/.config/linkvault/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Server base URL, overrides config and LINKVAULT_API
    #[arg(long, global = true, value_name = "URL")]
    pub api: Option<String>,

    /// Disable colors
    #[arg(long, global = true)]
    pub plain: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// List tags
    Tags,
    /// Create or delete a tag
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },
    /// List bookmarks carrying every given tag
    List {
        #[arg(short = 't', long = "tag", value_name = "ID")]
        tags: Vec<TagId>,
        #[arg(short, long, value_name = "TEXT")]
        search: Option<String>,
    },
    /// Show one bookmark with its notes rendered
    Show { id: BookmarkId },
    /// Create a bookmark
    Add {
        #[arg(long, default_value = "")]
        url: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        notes: String,
        #[arg(short = 't', long = "tag", value_name = "ID")]
        tags: Vec<TagId>,
    },
    /// Change a bookmark's title, notes or tags
    Edit {
        id: BookmarkId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Replace the tag set
        #[arg(short = 't', long = "tag", value_name = "ID")]
        tags: Vec<TagId>,
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
    },
    /// Delete a bookmark
    Delete {
        id: BookmarkId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Interactive session
    Shell,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum TagAction {
    Add {
        name: String,
        /// #RRGGBB, defaults to the configured tag color
        #[arg(long)]
        color: Option<String>,
    },
    Delete {
        id: TagId,
        #[arg(short, long)]
        yes: bool,
    },
}

/// Run a one-shot command. `prompt` is asked before deletions unless
/// `--yes` was given. `shell` is handled by the caller.
pub fn execute<B: Backend, W: Write>(
    command: Command,
    client: &mut BookmarkClient<B>,
    ctx: &FormatContext,
    out: &mut W,
    prompt: &mut dyn Confirm,
) -> Result<(), ClientError> {
    let time = TimeFormatter::now_local();
    match command {
        Command::Tags => {
            client.reload_tags()?;
            writeln!(out, "{}", render::tags_table(&client.state().tags, ctx))?;
        }
        Command::Tag { action: TagAction::Add { name, color } } => {
            let form = &mut client.state_mut().tag_form;
            form.name = name;
            if let Some(color) = color {
                form.color = color;
            }
            let tag = client.create_tag()?;
            writeln!(out, "Created tag {} {} ({})", tag.id, tag.name, tag.color)?;
        }
        Command::Tag { action: TagAction::Delete { id, yes } } => {
            let deleted = if yes {
                client.delete_tag(id, &mut |_: &str| true)?
            } else {
                client.delete_tag(id, prompt)?
            };
            report(out, deleted, &format!("Deleted tag {id}."))?;
        }
        Command::List { tags, search } => {
            client.state_mut().filter = Selection::from_ids(tags);
            client.set_search(search.as_deref())?;
            writeln!(out, "{}", render::bookmark_list(client.state(), ctx, &time))?;
        }
        Command::Show { id } => {
            client.reload_bookmarks()?;
            let bookmark = client
                .state()
                .bookmark(id)
                .ok_or(ClientError::NotFound { kind: "Bookmark", id })?;
            writeln!(out, "{}", render::bookmark_detail(bookmark, ctx, &time))?;
        }
        Command::Add { url, title, notes, tags } => {
            let form = &mut client.state_mut().bookmark_form;
            form.url = url;
            form.title = title;
            form.notes = notes;
            form.tag_ids = Selection::from_ids(tags);
            client.create_bookmark()?;
            writeln!(out, "Saved bookmark.")?;
        }
        Command::Edit { id, title, notes, tags, clear_tags } => {
            client.reload_bookmarks()?;
            client.start_edit(id)?;
            if let Some(edit) = client.state_mut().editing.as_mut() {
                if let Some(title) = title {
                    edit.title = title;
                }
                if let Some(notes) = notes {
                    edit.notes = notes;
                }
                if clear_tags {
                    edit.tag_ids.clear();
                } else if !tags.is_empty() {
                    edit.tag_ids = Selection::from_ids(tags);
                }
            }
            client.save_edit()?;
            writeln!(out, "Updated bookmark {id}.")?;
        }
        Command::Delete { id, yes } => {
            let deleted = if yes {
                client.delete_bookmark(id, &mut |_: &str| true)?
            } else {
                client.delete_bookmark(id, prompt)?
            };
            report(out, deleted, &format!("Deleted bookmark {id}."))?;
        }
        Command::Shell => {
            return Err(ClientError::validation(
                "shell must be started from the entry point",
            ));
        }
    }
    Ok(())
}

fn report<W: Write>(out: &mut W, done: bool, message: &str) -> Result<(), ClientError> {
    if done {
        writeln!(out, "{message}")?;
    } else {
        writeln!(out, "Cancelled.")?;
    }
    Ok(())
}
