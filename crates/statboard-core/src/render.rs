// HTML fragments for the four display regions.
//
// Payload text is untrusted: every label, value, name, explanation and error
// message goes through `escape_text` before it is placed in markup. `Html`
// can only be built by the functions in this module, so anything handed to a
// `Page` has crossed that boundary.

use std::fmt::Write as _;

use crate::payload::{PositionAnalysis, RosterEntry, StatMap};

/// An escaped HTML fragment ready to replace a region's content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Html(String);

impl Html {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Escape text for use in element content and double- or single-quoted
/// attribute values.
pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Region renderers
// ---------------------------------------------------------------------------

/// One `stat-row` per entry, in map order.
pub fn render_stat_rows(stats: &StatMap) -> Html {
    let mut out = String::new();
    push_stat_rows(&mut out, stats);
    Html(out)
}

/// Content of the `career-stats-grid` region.
pub fn render_career_stats(stats: &StatMap) -> Html {
    render_stat_rows(stats)
}

/// Content of the `team-stats-grid` region.
pub fn render_team_stats(stats: &StatMap) -> Html {
    render_stat_rows(stats)
}

/// Content of the `position-recommendation` region: the explanation text
/// ahead of the position's stat rows.
pub fn render_position_analysis(analysis: &PositionAnalysis) -> Html {
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<p class="position-explanation">{}</p>"#,
        escape_text(&analysis.explanation)
    );
    out.push_str(r#"<div class="position-stats">"#);
    push_stat_rows(&mut out, &analysis.stats);
    out.push_str("</div>");
    Html(out)
}

/// Content of the `team-comparison-grid` region: one `player-card` per roster
/// entry, in roster order.
pub fn render_roster(roster: &[RosterEntry]) -> Html {
    let mut out = String::new();
    for player in roster {
        let _ = write!(
            out,
            r#"<div class="player-card"><h4 class="player-name">{}</h4><div class="player-stats">"#,
            escape_text(&player.name)
        );
        push_stat_rows(&mut out, &player.stats);
        out.push_str("</div></div>");
    }
    Html(out)
}

/// Visible failure state for a region whose load failed.
pub fn render_error(message: &str) -> Html {
    Html(format!(
        r#"<div class="stats-error" role="alert">{}</div>"#,
        escape_text(message)
    ))
}

/// Placeholder shown while a fetch is in flight.
pub fn render_loading() -> Html {
    Html(r#"<div class="stats-loading" aria-busy="true">Loading&hellip;</div>"#.to_string())
}

fn push_stat_rows(out: &mut String, stats: &StatMap) {
    for (label, value) in stats.iter() {
        let _ = write!(
            out,
            r#"<div class="stat-row"><span class="stat-label">{}</span><span class="stat-value">{}</span></div>"#,
            escape_text(label),
            escape_text(&value.to_string())
        );
    }
}
