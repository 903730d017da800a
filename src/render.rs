//! Text rendering of the client state. Everything here is a pure function of
//! its inputs; painting is skipped when the context has color disabled so
//! tests can match plain output.

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag as MdTag, TagEnd};
use yansi::Paint;

use crate::formatting::{FormatContext, TimeFormatter};
use crate::model::{Bookmark, Tag};
use crate::selection::Selection;
use crate::shared::table::{render_table, truncate_with_ellipsis};
use crate::state::{AppState, BookmarkForm, EditSession, TagForm};

const INDENT: &str = "    ";

/// One selectable tag: `[3 ✓ uw ×]`. The check marks selection, the cross
/// is shown only where the tag can be deleted.
pub fn tag_chip(
    tag: &Tag,
    selected: bool,
    deletable: bool,
    ctx: &FormatContext,
) -> String {
    let mut out = String::from("[");
    out.push_str(&ctx.format_id(tag.id));
    out.push(' ');
    if ctx.use_color {
        out.push_str(&ctx.format_tag_text(tag, "●"));
        out.push(' ');
    }
    if selected {
        out.push_str("✓ ");
        out.push_str(&ctx.format_tag_text(tag, &tag.name));
    } else {
        out.push_str(&tag.name);
    }
    if deletable {
        out.push_str(" ×");
    }
    out.push(']');
    out
}

/// Every known tag as a chip, marking those in `selection`.
pub fn chip_row(
    tags: &[Tag],
    selection: &Selection,
    deletable: bool,
    ctx: &FormatContext,
) -> String {
    if tags.is_empty() {
        return ctx.format_muted("No tags yet.");
    }
    tags.iter()
        .map(|t| tag_chip(t, selection.contains(t.id), deletable, ctx))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Read-only tag label shown on a bookmark.
pub fn tag_pill(tag: &Tag, ctx: &FormatContext) -> String {
    ctx.format_tag_text(tag, &format!("#{}", tag.name))
}

pub fn error_banner(state: &AppState, ctx: &FormatContext) -> Option<String> {
    state
        .error
        .as_deref()
        .map(|e| ctx.format_error(&format!("! {e}")))
}

pub fn bookmark_form(
    form: &BookmarkForm,
    tag_form: &TagForm,
    tags: &[Tag],
    ctx: &FormatContext,
) -> String {
    let field = |label: &str, value: &str| {
        let shown = if value.is_empty() {
            ctx.format_muted("(empty)")
        } else {
            value.to_string()
        };
        format!("{INDENT}{label:<6} {shown}")
    };
    let mut lines = vec![
        ctx.format_header("Add a bookmark"),
        field("url", &form.url),
        field("title", &form.title),
        field("notes", &form.notes),
        format!("{INDENT}Select tags: {}", chip_row(tags, &form.tag_ids, false, ctx)),
    ];
    if tag_form.open {
        let color = if ctx.use_color {
            let (r, g, b) =
                crate::tags::parse_hex_color(&tag_form.color).unwrap_or((148, 163, 184));
            format!("{} {}", Paint::rgb("●", r, g, b), tag_form.color)
        } else {
            tag_form.color.clone()
        };
        let name = if tag_form.name.is_empty() {
            ctx.format_muted("(e.g. uw)")
        } else {
            tag_form.name.clone()
        };
        lines.push(format!("{INDENT}New tag: {name} {color}"));
    }
    lines.join("\n")
}

pub fn filter_section(state: &AppState, ctx: &FormatContext) -> String {
    let mut hint = String::from(
        "Toggle tags to filter. Bookmarks must contain all selected tags.",
    );
    if state.manage_tags {
        hint.push_str(" (Manage mode: deltag <id> deletes a tag)");
    }
    let mut lines = vec![
        ctx.format_header("Filter"),
        format!("{INDENT}{}", ctx.format_muted(&hint)),
        format!(
            "{INDENT}{}",
            chip_row(&state.tags, &state.filter, state.manage_tags, ctx)
        ),
    ];
    if let Some(q) = &state.search {
        lines.push(format!("{INDENT}search: {q}"));
    }
    lines.join("\n")
}

/// Compact card used in lists: title line, url, tags with age, first line
/// of the notes.
pub fn bookmark_card(
    b: &Bookmark,
    ctx: &FormatContext,
    time: &TimeFormatter,
    search: Option<&str>,
) -> String {
    let room = ctx.width.saturating_sub(INDENT.len() + 2).max(20);
    let title = truncate_with_ellipsis(&b.title, room);
    let mut lines = vec![format!(
        "{} {}",
        ctx.format_id(b.id),
        ctx.highlight_match(&title, search)
    )];
    lines.push(format!(
        "{INDENT}{}",
        ctx.format_url(&truncate_with_ellipsis(&b.url, room))
    ));

    let mut meta: Vec<String> = b.tags.iter().map(|t| tag_pill(t, ctx)).collect();
    if let Some(updated) = b.updated_at {
        meta.push(ctx.format_muted(&format!(
            "updated {}",
            time.format_relative(updated)
        )));
    }
    if !meta.is_empty() {
        lines.push(format!("{INDENT}{}", meta.join(" ")));
    }

    if let Some(first) = b.notes.lines().find(|l| !l.trim().is_empty()) {
        let preview = truncate_with_ellipsis(first.trim(), room);
        lines.push(format!("{INDENT}{}", ctx.highlight_match(&preview, search)));
    }
    lines.join("\n")
}

/// Card shown in place of a bookmark while it is being edited.
pub fn edit_card(
    edit: &EditSession,
    tags: &[Tag],
    ctx: &FormatContext,
) -> String {
    let notes = if edit.notes.is_empty() {
        ctx.format_muted("(empty)")
    } else {
        edit.notes.replace('\n', &format!("\n{INDENT}       "))
    };
    [
        format!("{} {}", ctx.format_id(edit.id), ctx.format_header("editing")),
        format!("{INDENT}title  {}", edit.title),
        format!("{INDENT}notes  {notes}"),
        format!("{INDENT}Edit tags: {}", chip_row(tags, &edit.tag_ids, false, ctx)),
        format!("{INDENT}{}", ctx.format_muted("esave to save, ecancel to discard")),
    ]
    .join("\n")
}

pub fn bookmark_list(
    state: &AppState,
    ctx: &FormatContext,
    time: &TimeFormatter,
) -> String {
    let mut header = ctx.format_header(&format!("Bookmarks ({})", state.bookmarks.len()));
    if state.loading {
        header.push_str("  ");
        header.push_str(&ctx.format_muted("Loading…"));
    }
    let mut blocks = vec![header];
    for b in &state.bookmarks {
        match &state.editing {
            Some(edit) if edit.id == b.id => {
                blocks.push(edit_card(edit, &state.tags, ctx));
            }
            _ => blocks.push(bookmark_card(b, ctx, time, state.search.as_deref())),
        }
    }
    if state.bookmarks.is_empty() && !state.loading {
        blocks.push(ctx.format_muted("No bookmarks match this filter."));
    }
    blocks.join("\n")
}

/// The whole view: banner, creation form, filter, list.
pub fn screen(state: &AppState, ctx: &FormatContext, time: &TimeFormatter) -> String {
    let mut sections = Vec::new();
    if let Some(banner) = error_banner(state, ctx) {
        sections.push(banner);
    }
    sections.push(bookmark_form(
        &state.bookmark_form,
        &state.tag_form,
        &state.tags,
        ctx,
    ));
    sections.push(filter_section(state, ctx));
    sections.push(bookmark_list(state, ctx, time));
    sections.join("\n\n")
}

/// Full view of one bookmark with rendered notes.
pub fn bookmark_detail(b: &Bookmark, ctx: &FormatContext, time: &TimeFormatter) -> String {
    let mut out = vec![
        format!("# {} ({})", ctx.format_header(&b.title), b.id),
        ctx.format_url(&b.url),
    ];
    if !b.tags.is_empty() {
        let pills: Vec<String> = b.tags.iter().map(|t| tag_pill(t, ctx)).collect();
        out.push(format!("Tags: {}", pills.join(" ")));
    }
    if let Some(created) = b.created_at {
        out.push(format!("Created: {} ({})", created.to_rfc3339(), time.format_relative(created)));
    }
    if let Some(updated) = b.updated_at {
        out.push(format!("Updated: {} ({})", updated.to_rfc3339(), time.format_relative(updated)));
    }
    if !b.notes.trim().is_empty() {
        out.push(String::new());
        out.push(render_notes(&b.notes, ctx.use_color));
    }
    out.join("\n")
}

pub fn tags_table(tags: &[Tag], ctx: &FormatContext) -> String {
    if tags.is_empty() {
        return "No tags yet.".to_string();
    }
    let rows: Vec<Vec<String>> = tags
        .iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                ctx.format_tag_text(t, &t.name),
                t.color.clone(),
            ]
        })
        .collect();
    render_table(&["ID", "NAME", "COLOR"], &rows, 40)
}

/// Minimal styling categories used when coloring markdown output.
#[derive(Clone, Copy)]
enum Style {
    Heading,
    Bullet,
    Rule,
    Link,
    Body,
}

/// Render bookmark notes written in markdown as terminal text: heading
/// marks kept, list items bulleted, link targets appended in parentheses.
pub fn render_notes(input: &str, use_color: bool) -> String {
    let mut rendered = String::new();
    let mut list_depth: usize = 0;
    let mut link_target: Option<String> = None;

    for event in Parser::new(input) {
        match event {
            Event::Start(MdTag::Heading { level, .. }) => {
                let mark = match level {
                    HeadingLevel::H1 => "# ",
                    HeadingLevel::H2 => "## ",
                    HeadingLevel::H3 => "### ",
                    _ => "#### ",
                };
                push_styled(&mut rendered, mark, Style::Heading, use_color);
            }
            Event::End(TagEnd::Heading(_)) | Event::End(TagEnd::Paragraph) => {
                rendered.push('\n');
            }
            Event::Start(MdTag::List(_)) => list_depth += 1,
            Event::End(TagEnd::List(_)) => {
                list_depth = list_depth.saturating_sub(1);
            }
            Event::Start(MdTag::Item) => {
                rendered.push_str(&"  ".repeat(list_depth.saturating_sub(1)));
                push_styled(&mut rendered, "- ", Style::Bullet, use_color);
            }
            Event::End(TagEnd::Item) => {
                if !rendered.ends_with('\n') {
                    rendered.push('\n');
                }
            }
            Event::Start(MdTag::Link { dest_url, .. }) => {
                link_target = Some(dest_url.to_string());
            }
            Event::End(TagEnd::Link) => {
                if let Some(url) = link_target.take() {
                    push_styled(&mut rendered, &format!(" ({url})"), Style::Link, use_color);
                }
            }
            Event::Text(t) | Event::Code(t) => {
                push_styled(&mut rendered, &t, Style::Body, use_color)
            }
            Event::SoftBreak | Event::HardBreak => rendered.push('\n'),
            Event::Rule => {
                push_styled(&mut rendered, "---\n", Style::Rule, use_color);
            }
            _ => {}
        }
    }

    rendered.trim().to_string()
}

fn push_styled(buf: &mut String, text: &str, style: Style, use_color: bool) {
    if use_color {
        let painted = match style {
            Style::Heading => Paint::cyan(text).bold(),
            Style::Bullet => Paint::yellow(text).bold(),
            Style::Rule => Paint::new(text).dim(),
            Style::Link => Paint::blue(text),
            Style::Body => Paint::new(text),
        };
        buf.push_str(&painted.to_string());
    } else {
        buf.push_str(text);
    }
}
