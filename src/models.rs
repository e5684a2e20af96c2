use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One procedural step an initiative has passed through. Upstream dates are
/// inconsistent (ISO, DD/MM/YYYY, sometimes with a time suffix), so the raw
/// string is kept alongside the parsed date; layout code skips events whose
/// date failed to parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegislativeEvent {
    pub phase: String,
    pub date_raw: String,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Initiative {
    pub id: i64,
    pub number: i64,
    pub type_code: String, // J | P | R | S | D | I | A
    pub type_description: String,
    pub title: String,
    pub legislature: String,
    pub legislature_start: Option<NaiveDate>,
    pub events: Vec<LegislativeEvent>,
    pub author_parties: Vec<String>,
    pub author_other: Option<String>,
    pub current_status: Option<String>,
    pub is_completed: bool,
    pub text_link: Option<String>,
}

impl Initiative {
    /// The Government authors through a sentinel name in the "other author"
    /// field rather than a parliamentary group entry.
    pub fn is_government_authored(&self) -> bool {
        self.author_other.as_deref() == Some("Governo")
    }

    /// Display list of authors: Governo, then parliamentary groups, then the
    /// raw other-author name only when nothing else matched.
    pub fn authors(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.is_government_authored() {
            out.push("Governo".to_string());
        }
        for gp in &self.author_parties {
            if !out.contains(gp) {
                out.push(gp.clone());
            }
        }
        if out.is_empty() {
            if let Some(name) = &self.author_other {
                out.push(name.clone());
            }
        }
        out
    }

    /// Events sorted by parsed date ascending, undated events last; ties keep
    /// their original order (same-day multi-phase entries are common). The
    /// parsed date is authoritative since upstream mixes ISO and DD/MM/YYYY
    /// raw strings, which do not compare lexicographically.
    pub fn sorted_events(&self) -> Vec<LegislativeEvent> {
        let mut events = self.events.clone();
        events.sort_by_key(|e| (e.date.is_none(), e.date));
        events
    }

    /// Date of the earliest event (typically "Entrada"), used for month
    /// bucketing and date sorting.
    pub fn entry_date(&self) -> Option<NaiveDate> {
        self.sorted_events().iter().find_map(|e| e.date)
    }

    /// YYYY-MM bucket of the earliest event.
    pub fn month_key(&self) -> Option<String> {
        self.entry_date().map(|d| d.format("%Y-%m").to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgendaEvent {
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    pub section: String,
    pub theme: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub room: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Committee {
    pub org_id: i64,
    pub name: String,
    pub total_members: u32,
    pub parties: BTreeMap<String, u32>,
    pub ini_authored: u32,
    pub ini_in_progress: u32,
    pub ini_approved: u32,
    pub ini_rejected: u32,
}

impl Committee {
    pub fn short_name(&self) -> String {
        self.name
            .replace("Comissão Parlamentar de Inquérito", "Inquérito:")
            .replace("Comissão de ", "")
            .replace("Comissão ", "")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitteeRole {
    Lead,
    Secondary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedInitiative {
    pub ini_id: i64,
    pub title: String,
    pub type_code: String,
    pub type_description: String,
    pub number: Option<i64>,
    pub current_status: Option<String>,
    pub author_name: Option<String>,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitteeInitiative {
    pub initiative: LinkedInitiative,
    pub link_type: CommitteeRole,
    pub has_vote: bool,
    pub vote_result: Option<String>,
    pub has_rapporteur: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitteeDetail {
    pub initiatives: Vec<CommitteeInitiative>,
    pub meetings: Vec<AgendaEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitteeMembership {
    pub name: String,
    pub acronym: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deputy {
    pub dep_id: i64,
    pub name: String,
    pub party: String,
    pub circle: String,
    pub gender: Option<String>, // "M" | "F"
    pub age: Option<u32>,
    pub committees: Vec<CommitteeMembership>,
}

/// Roster plus the API's precomputed breakdowns. The invariant that
/// party_composition sums to total is upstream's to keep; the hemicycle only
/// needs proportionality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeputiesData {
    pub deputies: Vec<Deputy>,
    pub total: u32,
    pub party_composition: BTreeMap<String, u32>,
    pub gender_breakdown: BTreeMap<String, u32>,
    pub circle_breakdown: BTreeMap<String, u32>,
}

/// Parse the date formats the Parliament API actually emits: ISO
/// ("2025-01-10", possibly with a T-suffixed time) and Portuguese
/// "10/01/2025".
pub fn parse_flexible_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let date_part = s.split('T').next().unwrap_or(s);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%d/%m/%Y"))
        .ok()
}

/// "HH:MM" or "HH:MM:SS".
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

pub fn type_label(type_code: &str) -> &str {
    match type_code {
        "J" => "Proj. Lei",
        "P" => "Prop. Lei",
        "R" => "Proj. Res.",
        "S" => "Prop. Res.",
        "D" => "Deliberação",
        "I" => "Inquérito",
        "A" => "Apreciação",
        other => other,
    }
}

pub fn type_full_name(type_code: &str) -> &str {
    match type_code {
        "J" => "Projetos de Lei",
        "P" => "Propostas de Lei",
        "R" => "Projetos de Resolução",
        "S" => "Propostas de Resolução",
        "D" => "Proj. Deliberação",
        "I" => "Inquéritos Parl.",
        "A" => "Apreciações Parl.",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(phase: &str, date: &str) -> LegislativeEvent {
        LegislativeEvent {
            phase: phase.to_string(),
            date_raw: date.to_string(),
            date: parse_flexible_date(date),
        }
    }

    fn initiative(events: Vec<LegislativeEvent>) -> Initiative {
        Initiative {
            id: 1,
            number: 42,
            type_code: "J".into(),
            type_description: "Projeto de Lei".into(),
            title: "Teste".into(),
            legislature: "XVII".into(),
            legislature_start: None,
            events,
            author_parties: vec![],
            author_other: None,
            current_status: None,
            is_completed: false,
            text_link: None,
        }
    }

    #[test]
    fn parses_iso_and_portuguese_dates() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        assert_eq!(parse_flexible_date("2025-01-10"), Some(expected));
        assert_eq!(parse_flexible_date("10/01/2025"), Some(expected));
        assert_eq!(parse_flexible_date("2025-01-10T14:00:00"), Some(expected));
        assert_eq!(parse_flexible_date("not a date"), None);
        assert_eq!(parse_flexible_date(""), None);
    }

    #[test]
    fn entry_date_is_earliest_event() {
        let ini = initiative(vec![
            event("Anúncio", "2025-03-05"),
            event("Entrada", "2025-01-10"),
        ]);
        assert_eq!(ini.entry_date(), NaiveDate::from_ymd_opt(2025, 1, 10));
        assert_eq!(ini.month_key().as_deref(), Some("2025-01"));
    }

    #[test]
    fn government_author_comes_from_sentinel_name() {
        let mut ini = initiative(vec![]);
        ini.author_other = Some("Governo".into());
        assert!(ini.is_government_authored());
        assert_eq!(ini.authors(), vec!["Governo".to_string()]);

        ini.author_other = Some("Comissão de Trabalho".into());
        assert!(!ini.is_government_authored());
        assert_eq!(ini.authors(), vec!["Comissão de Trabalho".to_string()]);
    }

    #[test]
    fn authors_lists_parties_without_duplicates() {
        let mut ini = initiative(vec![]);
        ini.author_parties = vec!["PS".into(), "PS".into(), "BE".into()];
        assert_eq!(ini.authors(), vec!["PS".to_string(), "BE".to_string()]);
    }

    #[test]
    fn sorted_events_keep_same_day_order() {
        let ini = initiative(vec![
            event("Entrada", "2025-01-10"),
            event("Admissão", "2025-01-10"),
        ]);
        let sorted = ini.sorted_events();
        assert_eq!(sorted[0].phase, "Entrada");
        assert_eq!(sorted[1].phase, "Admissão");
    }

    #[test]
    fn events_sort_by_parsed_date_not_raw_string() {
        // DD/MM/YYYY raw strings compare lexicographically by day first.
        let ini = initiative(vec![
            event("Votação", "02/03/2025"),
            event("Entrada", "15/01/2025"),
        ]);
        let sorted = ini.sorted_events();
        assert_eq!(sorted[0].phase, "Entrada");
        assert_eq!(ini.entry_date(), NaiveDate::from_ymd_opt(2025, 1, 15));
        assert_eq!(ini.month_key().as_deref(), Some("2025-01"));
    }

    #[test]
    fn undated_events_sort_last() {
        let ini = initiative(vec![
            event("Baixa comissão", "sem data"),
            event("Entrada", "2025-01-10"),
        ]);
        let sorted = ini.sorted_events();
        assert_eq!(sorted[0].phase, "Entrada");
        assert_eq!(sorted[1].phase, "Baixa comissão");
        assert_eq!(ini.entry_date(), NaiveDate::from_ymd_opt(2025, 1, 10));
    }
}
