//! Proportional life-cycle timeline for a single initiative: events are
//! placed along a horizontal track at a percentage proportional to elapsed
//! time, with gap indicators where the process stalled.

use crate::models::LegislativeEvent;
use crate::status::{classify, StatusCategory};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Clamp bounds keep the first and last markers inside the track.
const POSITION_MIN: f64 = 2.0;
const POSITION_MAX: f64 = 98.0;

/// Gaps longer than this many days get a duration indicator.
const GAP_THRESHOLD_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize)]
pub struct TimelineMarker {
    pub phase: String,
    pub short_label: String,
    pub date: NaiveDate,
    pub short_date: String, // D/M, matching the compact marker caption
    pub position: f64,      // percent along the track, in [2, 98]
    pub category: StatusCategory,
    pub color: &'static str,
}

/// Duration badge rendered between two markers separated by a long pause.
#[derive(Debug, Clone, Serialize)]
pub struct GapIndicator {
    pub position: f64,
    pub label: String, // "3m", "2a", ...
}

/// Layout result. Events without a parseable date cannot be positioned; if
/// none have one, the caller renders a plain list instead of a track.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TimelineLayout {
    Track {
        start: NaiveDate,
        end: NaiveDate,
        markers: Vec<TimelineMarker>,
        gaps: Vec<GapIndicator>,
    },
    List {
        phases: Vec<String>,
    },
}

/// Lay out an initiative's events along a proportional time axis.
///
/// Events are sorted by date ascending (stable, so same-day multi-phase
/// entries keep their logged order). Position is elapsed days over total
/// span, clamped to [2, 98]; a single date collapses everything to 50.
pub fn layout(events: &[LegislativeEvent]) -> TimelineLayout {
    let mut dated: Vec<&LegislativeEvent> =
        events.iter().filter(|e| e.date.is_some()).collect();
    dated.sort_by_key(|e| e.date);

    if dated.is_empty() {
        return TimelineLayout::List {
            phases: events.iter().map(|e| e.phase.clone()).collect(),
        };
    }

    let first = dated[0].date.unwrap_or_default();
    let last = dated[dated.len() - 1].date.unwrap_or_default();
    let total_days = (last - first).num_days().max(1) as f64;
    let same_day = first == last;

    let position_of = |date: NaiveDate| -> f64 {
        if same_day {
            50.0
        } else {
            let days = (date - first).num_days() as f64;
            (days / total_days * 100.0).clamp(POSITION_MIN, POSITION_MAX)
        }
    };

    let mut markers = Vec::with_capacity(dated.len());
    let mut gaps = Vec::new();
    for (idx, evt) in dated.iter().enumerate() {
        let date = evt.date.unwrap_or_default();
        let position = position_of(date);
        let status = classify(Some(&evt.phase));
        markers.push(TimelineMarker {
            phase: evt.phase.clone(),
            short_label: shorten_phase_name(&evt.phase),
            date,
            short_date: format!("{}/{}", date.day(), date.month()),
            position,
            category: status.category,
            color: status.color,
        });

        if let Some(next) = dated.get(idx + 1).and_then(|e| e.date) {
            let gap_days = (next - date).num_days();
            if gap_days > GAP_THRESHOLD_DAYS {
                gaps.push(GapIndicator {
                    position: (position + position_of(next)) / 2.0,
                    label: gap_label(gap_days),
                });
            }
        }
    }

    TimelineLayout::Track {
        start: first,
        end: last,
        markers,
        gaps,
    }
}

/// Compact duration: years past one year, months past one month, else days.
fn gap_label(days: i64) -> String {
    if days > 365 {
        format!("{}a", ((days as f64) / 365.0).round() as i64)
    } else if days > 30 {
        format!("{}m", ((days as f64) / 30.0).round() as i64)
    } else {
        format!("{}d", days)
    }
}

/// Marker captions for the most common phases; anything unlisted is
/// truncated to 8 characters.
pub fn shorten_phase_name(phase: &str) -> String {
    const SHORTCUTS: &[(&str, &str)] = &[
        ("entrada", "Ent."),
        ("admissao", "Adm."),
        ("anuncio", "Anun."),
        ("baixa comissao para nova apreciacao", "Baixa"),
        ("discussao na generalidade", "Disc."),
        ("votacao na generalidade", "Vot.Gen."),
        ("votacao final global", "Vot.Final"),
        ("envio para promulgacao", "Env.Prom."),
        ("promulgacao", "Prom."),
        ("referenda", "Ref."),
        ("publicacao", "Pub."),
    ];
    let folded = crate::status::fold_text(phase);
    for (pattern, short) in SHORTCUTS {
        if folded.contains(pattern) {
            return (*short).to_string();
        }
    }
    if phase.chars().count() > 8 {
        let head: String = phase.chars().take(8).collect();
        format!("{head}.")
    } else {
        phase.to_string()
    }
}
