// Static HTML rendering of a board snapshot.
//
// The page mirrors the board layout: page heading, recommendations table,
// teams list, live scores table. Failed panels render exactly like empty
// ones; failures are only visible in the diagnostic log.

use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::model::Record;
use crate::panel::PanelSnapshot;
use crate::protocol::{BoardSnapshot, PanelLayout};

/// Page-level settings that are not part of the board itself.
#[derive(Debug, Clone)]
pub struct PageOptions {
    pub title: String,
    /// Render time shown in the footer. `None` omits the footer.
    pub generated_at: Option<DateTime<Utc>>,
}

impl PageOptions {
    pub fn new(title: impl Into<String>) -> Self {
        PageOptions {
            title: title.into(),
            generated_at: None,
        }
    }

    pub fn generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }
}

/// Render the full HTML document for `snapshot`.
pub fn render_page(snapshot: &BoardSnapshot, options: &PageOptions) -> String {
    let title = escape_html(&options.title);
    let mut out = String::with_capacity(4096);

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n");
    let _ = writeln!(out, "<title>{title}</title>");
    out.push_str("</head>\n<body>\n<div style=\"margin: 2rem\">\n");
    let _ = writeln!(out, "<h1>{title}</h1>");

    render_panel(&mut out, &snapshot.recommendations);
    render_panel(&mut out, &snapshot.teams);
    render_panel(&mut out, &snapshot.live_scores);

    if let Some(at) = options.generated_at {
        let _ = writeln!(
            out,
            "<footer><small>Rendered {}</small></footer>",
            at.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
    }

    out.push_str("</div>\n</body>\n</html>\n");
    out
}

/// Render one panel section (heading plus table or list).
pub fn render_panel<R: Record>(out: &mut String, panel: &PanelSnapshot<R>) {
    if let Some(heading) = R::PANEL.heading() {
        let _ = writeln!(out, "<h2>{}</h2>", escape_html(heading));
    }
    match R::PANEL.layout() {
        PanelLayout::Table => render_table(out, panel),
        PanelLayout::List => render_list(out, panel),
    }
}

fn render_table<R: Record>(out: &mut String, panel: &PanelSnapshot<R>) {
    out.push_str("<table border=\"1\" cellpadding=\"6\" cellspacing=\"0\">\n<thead>\n<tr>");
    for header in R::PANEL.headers() {
        let _ = write!(out, "<th>{}</th>", escape_html(header));
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");
    for row in &panel.rows {
        out.push_str("<tr>");
        for cell in row.cells() {
            let _ = write!(out, "<td>{}</td>", escape_html(&cell));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
}

fn render_list<R: Record>(out: &mut String, panel: &PanelSnapshot<R>) {
    out.push_str("<ul>\n");
    for row in &panel.rows {
        let _ = writeln!(out, "<li>{}</li>", escape_html(&row.list_item()));
    }
    out.push_str("</ul>\n");
}

/// Escape text for use in HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
