//! Agenda layout: classify parliamentary agenda events, lay them out on a
//! multi-track day timeline (one row per calendar day, events stacked to
//! avoid overlap) and on a coarser week grid of (day, hour) cells.

use crate::models::AgendaEvent;
use chrono::{Datelike, Duration, NaiveDate, Timelike, Weekday};
use serde::Serialize;

/// Visible hour window of the day timeline, inclusive on both ends.
pub const TIMELINE_START_HOUR: u32 = 8;
pub const TIMELINE_END_HOUR: u32 = 22;
const TIMELINE_TOTAL_HOURS: u32 = TIMELINE_END_HOUR - TIMELINE_START_HOUR + 1;

/// Height of one event track in pixels.
pub const EVENT_HEIGHT: u32 = 18;

/// Events narrower than this are widened so their label stays readable.
const MIN_WIDTH_PERCENT: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Plenary,
    Committee,
    Groups,
    Visits,
    Conference,
    Workgroup,
    Assistances,
    Other,
}

impl EventType {
    pub fn label(self) -> &'static str {
        match self {
            EventType::Plenary => "Plenário",
            EventType::Committee => "Comissões",
            EventType::Groups => "Grupos Parlamentares",
            EventType::Visits => "Visitas",
            EventType::Conference => "Conf. Líderes",
            EventType::Workgroup => "Grupos Trabalho",
            EventType::Assistances => "Assistências",
            EventType::Other => "Outros",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            EventType::Plenary => "#16a34a",
            EventType::Committee => "#2563eb",
            EventType::Groups => "#9333ea",
            EventType::Visits => "#f59e0b",
            EventType::Conference => "#06b6d4",
            EventType::Workgroup => "#ec4899",
            EventType::Assistances => "#6b7280",
            EventType::Other => "#94a3b8",
        }
    }
}

/// Classify an agenda event from its section and title. Section patterns
/// take precedence; the title only disambiguates hearings, which the section
/// files under the owning committee or group.
pub fn classify_event(section: &str, title: &str) -> EventType {
    if section.contains("Visitas") {
        return EventType::Visits;
    }
    if section.contains("Assistências") {
        return EventType::Assistances;
    }
    if section.contains("Conferência") {
        return EventType::Conference;
    }
    if section.contains("Grupo de Trabalho") {
        return EventType::Workgroup;
    }
    if title.contains("Audiência") {
        return EventType::Groups;
    }
    if section.contains("Plenário") || section.contains("Plenario") {
        return EventType::Plenary;
    }
    if section.contains("Grupos") || section.contains("Partidos") || section.contains("DURP") {
        return EventType::Groups;
    }
    if section.contains("Comiss") {
        return EventType::Committee;
    }
    EventType::Other
}

/// Scheduling metadata rows published alongside real events; excluded from
/// every agenda view.
pub fn is_metadata_event(event: &AgendaEvent) -> bool {
    event.title.contains("Calendarização")
}

/// Compress institutional boilerplate so titles fit an 18px event bar.
pub fn shorten_agenda_title(title: &str) -> String {
    title
        .replace("Comissão Parlamentar de Inquérito", "CPI")
        .replace("Comissão de ", "")
        .replace("Audiências do Grupo Parlamentar", "Audiências GP")
        .replace("Audiências do Grupo parlamentar", "Audiências GP")
        .replace("Grupo de Trabalho", "GT")
        .replace("Conferência de Líderes", "Conf. Líderes")
}

/// Position within the hour window in percent. Times before the window
/// start clamp to 0 so early events stay on-track.
fn time_to_percent(hour: u32, minute: u32) -> f64 {
    let minutes = i64::from(hour) * 60 + i64::from(minute)
        - i64::from(TIMELINE_START_HOUR) * 60;
    minutes.max(0) as f64 / (TIMELINE_TOTAL_HOURS * 60) as f64 * 100.0
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacedEvent {
    pub id: i64,
    pub title: String,
    pub short_title: String,
    pub event_type: EventType,
    pub time_display: String, // "HH:MM", empty for all-day events
    pub left: f64,            // percent
    pub width: f64,           // percent
    pub track: usize,
    pub top_px: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayRow {
    pub date: NaiveDate,
    pub weekend: bool,
    pub tracks: usize,
    pub row_height_px: u32,
    pub events: Vec<PlacedEvent>,
}

/// Lay out agenda events as one row per calendar day. The day range runs
/// from the earliest to the latest event date inclusive, weekends and empty
/// days included, so the vertical axis is a real calendar.
pub fn day_timeline(events: &[AgendaEvent]) -> Vec<DayRow> {
    let real: Vec<&AgendaEvent> =
        events.iter().filter(|e| !is_metadata_event(e)).collect();

    let Some(first) = real.iter().map(|e| e.start_date).min() else {
        return Vec::new();
    };
    let last = real.iter().map(|e| e.start_date).max().unwrap_or(first);

    let mut rows = Vec::new();
    let mut day = first;
    while day <= last {
        let mut day_events: Vec<&AgendaEvent> =
            real.iter().copied().filter(|e| e.start_date == day).collect();
        day_events.sort_by_key(|e| e.start_time.map(|t| t.hour()).unwrap_or(0));

        rows.push(layout_day(day, &day_events));
        day += Duration::days(1);
    }
    rows
}

/// Greedy first-fit stacking of one day's events: scan existing tracks in
/// order and place the event in the first one where its interval does not
/// overlap anything already there, opening a new track when none fits.
fn layout_day(date: NaiveDate, day_events: &[&AgendaEvent]) -> DayRow {
    // Intervals already committed per track, as (left, right) percents.
    let mut tracks: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut placed = Vec::with_capacity(day_events.len());

    for event in day_events {
        let (left, width) = event_extent(event);
        let right = left + width;

        let track = tracks
            .iter()
            .position(|t| t.iter().all(|&(l, r)| left >= r || right <= l))
            .unwrap_or(tracks.len());
        if track == tracks.len() {
            tracks.push(Vec::new());
        }
        tracks[track].push((left, right));

        placed.push(PlacedEvent {
            id: event.id,
            title: event.title.clone(),
            short_title: shorten_agenda_title(&event.title),
            event_type: classify_event(&event.section, &event.title),
            time_display: event
                .start_time
                .map(|t| format!("{:02}:{:02}", t.hour(), t.minute()))
                .unwrap_or_default(),
            left,
            width,
            track,
            top_px: track as u32 * EVENT_HEIGHT + 1,
        });
    }

    let track_count = tracks.len().max(1);
    DayRow {
        date,
        weekend: matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
        tracks: track_count,
        row_height_px: track_count as u32 * EVENT_HEIGHT,
        events: placed,
    }
}

/// (left, width) of an event within the hour window. All-day events span the
/// full window; a missing or 23h end time clamps to the window end; an end
/// at or before the start is bumped to one hour.
fn event_extent(event: &AgendaEvent) -> (f64, f64) {
    let all_day = event.start_time.is_none();

    let (start_hour, start_min) = match event.start_time {
        Some(t) => (t.hour(), t.minute()),
        None => (TIMELINE_START_HOUR, 0),
    };

    let (mut end_hour, mut end_min) = match event.end_time {
        Some(t) if t.hour() != 23 && !all_day => (t.hour(), t.minute()),
        _ => (TIMELINE_END_HOUR, 59),
    };

    if end_hour <= start_hour && !all_day {
        end_hour = (start_hour + 1).min(TIMELINE_END_HOUR);
        end_min = 0;
    }

    let left = time_to_percent(start_hour, start_min);
    let right = time_to_percent(end_hour, end_min);
    (left, (right - left).max(MIN_WIDTH_PERCENT))
}

#[derive(Debug, Clone, Serialize)]
pub struct GridCell {
    pub date: NaiveDate,
    pub hour: u32,
    pub events: Vec<PlacedGridEvent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacedGridEvent {
    pub id: i64,
    pub title: String,
    pub short_title: String,
    pub event_type: EventType,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridCalendar {
    pub days: Vec<NaiveDate>,
    pub min_hour: u32,
    pub max_hour: u32,
    pub cells: Vec<GridCell>,
}

/// Coarse week view: bucket events into (day, hour) cells without sub-hour
/// positioning. Shows at most the first 7 distinct event days; the hour
/// range is derived from the events' start hours, defaulting to 9-18 when
/// nothing is timed. All-day events land in the first hour row.
pub fn grid_calendar(events: &[AgendaEvent]) -> GridCalendar {
    let real: Vec<&AgendaEvent> =
        events.iter().filter(|e| !is_metadata_event(e)).collect();

    let mut days: Vec<NaiveDate> = real.iter().map(|e| e.start_date).collect();
    days.sort();
    days.dedup();
    days.truncate(7);

    let mut min_hour = 24u32;
    let mut max_hour = 0u32;
    for event in &real {
        if !days.contains(&event.start_date) {
            continue;
        }
        if let Some(t) = event.start_time {
            min_hour = min_hour.min(t.hour());
            max_hour = max_hour.max(t.hour());
        }
    }
    if min_hour > max_hour {
        min_hour = 9;
        max_hour = 18;
    }

    let mut cells = Vec::new();
    for hour in min_hour..=max_hour {
        for &day in &days {
            let mut cell_events: Vec<PlacedGridEvent> = real
                .iter()
                .filter(|e| {
                    e.start_date == day
                        && e.start_time.map(|t| t.hour()) == Some(hour)
                })
                .map(|e| grid_event(e))
                .collect();
            if hour == min_hour {
                cell_events.extend(
                    real.iter()
                        .filter(|e| e.start_date == day && e.start_time.is_none())
                        .map(|e| grid_event(e)),
                );
            }
            cells.push(GridCell {
                date: day,
                hour,
                events: cell_events,
            });
        }
    }

    GridCalendar {
        days,
        min_hour,
        max_hour,
        cells,
    }
}

fn grid_event(event: &AgendaEvent) -> PlacedGridEvent {
    PlacedGridEvent {
        id: event.id,
        title: event.title.clone(),
        short_title: shorten_agenda_title(&event.title),
        event_type: classify_event(&event.section, &event.title),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn event(id: i64, date: &str, start: Option<&str>, end: Option<&str>) -> AgendaEvent {
        AgendaEvent {
            id,
            title: format!("Evento {id}"),
            subtitle: String::new(),
            section: "Comissões".into(),
            theme: String::new(),
            start_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            end_date: None,
            start_time: start.map(|s| NaiveTime::parse_from_str(s, "%H:%M").unwrap()),
            end_time: end.map(|s| NaiveTime::parse_from_str(s, "%H:%M").unwrap()),
            room: String::new(),
        }
    }

    #[test]
    fn overlapping_events_get_distinct_tracks() {
        let events = vec![
            event(1, "2025-03-10", Some("09:00"), Some("10:00")),
            event(2, "2025-03-10", Some("09:30"), Some("11:00")),
        ];
        let rows = day_timeline(&events);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].events[0].track, 0);
        assert_eq!(rows[0].events[1].track, 1);
        assert_eq!(rows[0].tracks, 2);
        assert_eq!(rows[0].row_height_px, 36);
    }

    #[test]
    fn non_overlapping_events_share_a_track() {
        let events = vec![
            event(1, "2025-03-10", Some("09:00"), Some("10:00")),
            event(2, "2025-03-10", Some("11:00"), Some("12:00")),
        ];
        let rows = day_timeline(&events);
        assert_eq!(rows[0].events[0].track, 0);
        assert_eq!(rows[0].events[1].track, 0);
        assert_eq!(rows[0].tracks, 1);
    }

    #[test]
    fn same_track_intervals_never_overlap() {
        let events = vec![
            event(1, "2025-03-10", Some("09:00"), Some("12:00")),
            event(2, "2025-03-10", Some("09:30"), Some("10:00")),
            event(3, "2025-03-10", Some("10:30"), Some("11:00")),
            event(4, "2025-03-10", Some("11:15"), Some("13:00")),
            event(5, "2025-03-10", Some("12:30"), Some("14:00")),
        ];
        let rows = day_timeline(&events);
        let placed = &rows[0].events;
        for a in placed {
            for b in placed {
                if a.id != b.id && a.track == b.track {
                    let disjoint =
                        a.left >= b.left + b.width || a.left + a.width <= b.left;
                    assert!(disjoint, "events {} and {} overlap on track {}", a.id, b.id, a.track);
                }
            }
        }
    }

    #[test]
    fn day_range_includes_empty_days_between_events() {
        let events = vec![
            event(1, "2025-03-07", Some("10:00"), Some("11:00")), // Friday
            event(2, "2025-03-10", Some("10:00"), Some("11:00")), // Monday
        ];
        let rows = day_timeline(&events);
        assert_eq!(rows.len(), 4);
        assert!(rows[1].weekend && rows[2].weekend);
        assert!(rows[1].events.is_empty());
        // Empty days still reserve one track of height.
        assert_eq!(rows[1].row_height_px, EVENT_HEIGHT);
    }

    #[test]
    fn all_day_event_spans_the_window() {
        let events = vec![event(1, "2025-03-10", None, None)];
        let rows = day_timeline(&events);
        let e = &rows[0].events[0];
        assert!((e.left - 0.0).abs() < 1e-9);
        assert!(e.left + e.width > 99.0);
        assert!(e.time_display.is_empty());
    }

    #[test]
    fn missing_or_late_end_clamps_to_window_end() {
        let events = vec![
            event(1, "2025-03-10", Some("15:00"), None),
            event(2, "2025-03-10", Some("15:00"), Some("23:00")),
        ];
        let rows = day_timeline(&events);
        for e in &rows[0].events {
            let right = e.left + e.width;
            assert!(right > 99.0, "event {} should reach the window end", e.id);
        }
    }

    #[test]
    fn inverted_end_time_bumps_to_one_hour() {
        let events = vec![event(1, "2025-03-10", Some("10:00"), Some("09:00"))];
        let rows = day_timeline(&events);
        let e = &rows[0].events[0];
        let expected_width = time_to_percent(11, 0) - time_to_percent(10, 0);
        assert!((e.width - expected_width).abs() < 1e-9);
    }

    #[test]
    fn tiny_events_get_minimum_width() {
        // End hour is past the start hour, so the one-hour bump does not
        // apply and the raw 15-minute width (~1.67%) gets floored.
        let events = vec![event(1, "2025-03-10", Some("10:50"), Some("11:05"))];
        let rows = day_timeline(&events);
        assert!((rows[0].events[0].width - MIN_WIDTH_PERCENT).abs() < 1e-9);
    }

    #[test]
    fn pre_window_starts_pin_to_window_start() {
        let events = vec![event(1, "2025-03-10", Some("07:30"), Some("09:00"))];
        let rows = day_timeline(&events);
        let e = &rows[0].events[0];
        assert!(e.left.abs() < 1e-9);
        assert!((e.left + e.width - time_to_percent(9, 0)).abs() < 1e-9);
    }

    #[test]
    fn metadata_rows_are_dropped() {
        let mut meta = event(1, "2025-03-10", Some("09:00"), Some("10:00"));
        meta.title = "Calendarização dos trabalhos".into();
        let events = vec![meta, event(2, "2025-03-10", Some("10:00"), Some("11:00"))];
        let rows = day_timeline(&events);
        assert_eq!(rows[0].events.len(), 1);
        assert_eq!(rows[0].events[0].id, 2);
    }

    #[test]
    fn classify_follows_section_precedence() {
        assert_eq!(classify_event("Visitas ao Parlamento", ""), EventType::Visits);
        assert_eq!(classify_event("Conferência de Líderes", ""), EventType::Conference);
        assert_eq!(
            classify_event("Comissão de Saúde - Grupo de Trabalho", ""),
            EventType::Workgroup
        );
        assert_eq!(
            classify_event("Comissão de Saúde", "Audiência com a Ordem dos Médicos"),
            EventType::Groups
        );
        assert_eq!(classify_event("Sessão Plenária - Plenário", ""), EventType::Plenary);
        assert_eq!(classify_event("Comissões Parlamentares", ""), EventType::Committee);
        assert_eq!(classify_event("Gabinete do Presidente", ""), EventType::Other);
    }

    #[test]
    fn titles_shorten_institutional_boilerplate() {
        assert_eq!(
            shorten_agenda_title("Comissão de Assuntos Constitucionais"),
            "Assuntos Constitucionais"
        );
        assert_eq!(
            shorten_agenda_title("Comissão Parlamentar de Inquérito à TAP"),
            "CPI à TAP"
        );
        assert_eq!(shorten_agenda_title("Grupo de Trabalho - Habitação"), "GT - Habitação");
    }

    #[test]
    fn grid_hour_range_follows_event_hours() {
        let events = vec![
            event(1, "2025-03-10", Some("10:00"), Some("11:00")),
            event(2, "2025-03-11", Some("15:00"), Some("16:00")),
        ];
        let grid = grid_calendar(&events);
        assert_eq!((grid.min_hour, grid.max_hour), (10, 15));
        assert_eq!(grid.days.len(), 2);
    }

    #[test]
    fn grid_defaults_to_business_hours_without_times() {
        let events = vec![event(1, "2025-03-10", None, None)];
        let grid = grid_calendar(&events);
        assert_eq!((grid.min_hour, grid.max_hour), (9, 18));
        // All-day events land in the first hour row.
        let first = grid
            .cells
            .iter()
            .find(|c| c.hour == 9 && c.date == events[0].start_date)
            .unwrap();
        assert_eq!(first.events.len(), 1);
    }

    #[test]
    fn grid_caps_at_seven_days() {
        let events: Vec<AgendaEvent> = (1..=9)
            .map(|d| event(d, &format!("2025-03-{d:02}"), Some("10:00"), Some("11:00")))
            .collect();
        let grid = grid_calendar(&events);
        assert_eq!(grid.days.len(), 7);
    }
}
