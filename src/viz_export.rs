// src/viz_export.rs
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use std::{collections::HashMap, fs, path::Path};

use crate::agenda::{self, EventType};
use crate::filters;
use crate::funnel;
use crate::hemicycle::{self, Geometry};
use crate::models::{
    type_full_name, type_label, Committee, CommitteeDetail, CommitteeRole,
    DeputiesData, Initiative,
};
use crate::status::classify;
use crate::timeline;

fn write_json<P: AsRef<Path>, T: ?Sized + Serialize>(path: P, value: &T) -> Result<()> {
    fs::write(path, serde_json::to_vec_pretty(value)?)
        .map(|_| ())
        .map_err(|e| e.into())
}

pub fn ensure_out_dir(out_dir_for_date: &Path) -> Result<()> {
    fs::create_dir_all(out_dir_for_date)
        .with_context(|| format!("create {:?}", out_dir_for_date))
}

/* -------------------------------------------------------------------------- */
/* 1) Lifecycle funnels                                                       */
/* -------------------------------------------------------------------------- */

#[derive(Serialize)]
struct VFunnel {
    title: &'static str,
    types: Vec<&'static str>,
    total: usize,
    steps: Vec<funnel::FunnelStep>,
}

pub fn write_funnels(out_dir: &Path, initiatives: &[Initiative]) -> Result<()> {
    let laws = funnel::laws_funnel(initiatives);
    let resolutions = funnel::resolutions_funnel(initiatives);
    let bundle = json!({
        "funnels": [
            VFunnel {
                title: "Leis",
                types: vec!["J", "P"],
                total: laws.total(),
                steps: laws.steps(),
            },
            VFunnel {
                title: "Resoluções",
                types: vec!["R", "S"],
                total: resolutions.total(),
                steps: resolutions.steps(),
            },
        ],
    });
    write_json(out_dir.join("viz.funnels.json"), &bundle)
}

/* -------------------------------------------------------------------------- */
/* 2) Initiative cards + analytics widgets                                    */
/* -------------------------------------------------------------------------- */

#[derive(Serialize)]
struct VInitiative {
    id: i64,
    number: i64,
    type_code: String,
    type_label: String,
    type_name: String,
    title: String,
    legislature: String,
    authors: Vec<String>,
    status_category: &'static str,
    status_label: &'static str,
    status_color: &'static str,
    entry_date: Option<String>,
    event_count: usize,
    is_completed: bool,
    text_link: Option<String>,
    timeline: timeline::TimelineLayout,
}

fn card(ini: &Initiative) -> VInitiative {
    let status = classify(ini.current_status.as_deref());
    VInitiative {
        id: ini.id,
        number: ini.number,
        type_code: ini.type_code.clone(),
        type_label: type_label(&ini.type_code).to_string(),
        type_name: type_full_name(&ini.type_code).to_string(),
        title: ini.title.clone(),
        legislature: ini.legislature.clone(),
        authors: ini.authors(),
        status_category: status.category.key(),
        status_label: status.label,
        status_color: status.color,
        entry_date: ini.entry_date().map(|d| d.to_string()),
        event_count: ini.events.len(),
        is_completed: ini.is_completed,
        text_link: ini.text_link.clone(),
        timeline: timeline::layout(&ini.events),
    }
}

pub fn write_initiatives(out_dir: &Path, initiatives: &[Initiative]) -> Result<()> {
    let cards: Vec<VInitiative> = initiatives.iter().map(card).collect();

    let bundle = json!({
        "initiatives": cards,
        "widgets": {
            "authors": filters::author_counts(initiatives),
            "months": filters::month_counts(initiatives)
                .into_iter()
                .map(|(month, count)| json!({ "month": month, "count": count }))
                .collect::<Vec<_>>(),
            "types": filters::type_counts(initiatives)
                .into_iter()
                .map(|(code, count)| json!({
                    "code": code,
                    "label": type_label(&code),
                    "count": count,
                }))
                .collect::<Vec<_>>(),
        },
    });
    write_json(out_dir.join("viz.initiatives.json"), &bundle)
}

/// Search results as cards, most recent first. `matches` holds only the
/// initiatives recovered from the loaded dataset; ids the search returned
/// but the dataset lacks are already gone by this point.
pub fn write_search(out_dir: &Path, query: &str, matches: &[&Initiative]) -> Result<()> {
    let bundle = json!({
        "query": query,
        "count": matches.len(),
        "initiatives": matches.iter().map(|i| card(i)).collect::<Vec<_>>(),
    });
    write_json(out_dir.join("viz.search.json"), &bundle)
}

/* -------------------------------------------------------------------------- */
/* 3) Agenda day timeline + week grid                                         */
/* -------------------------------------------------------------------------- */

pub fn write_agenda(out_dir: &Path, events: &[crate::models::AgendaEvent]) -> Result<()> {
    let legend: Vec<_> = [
        EventType::Plenary,
        EventType::Committee,
        EventType::Groups,
        EventType::Conference,
        EventType::Workgroup,
        EventType::Visits,
        EventType::Assistances,
        EventType::Other,
    ]
    .iter()
    .map(|t| json!({ "type": t, "label": t.label(), "color": t.color() }))
    .collect();

    let bundle = json!({
        "timeline": {
            "start_hour": agenda::TIMELINE_START_HOUR,
            "end_hour": agenda::TIMELINE_END_HOUR,
            "event_height_px": agenda::EVENT_HEIGHT,
            "days": agenda::day_timeline(events),
        },
        "grid": agenda::grid_calendar(events),
        "legend": legend,
    });
    write_json(out_dir.join("viz.agenda.json"), &bundle)
}

/* -------------------------------------------------------------------------- */
/* 4) Hemicycle                                                               */
/* -------------------------------------------------------------------------- */

#[derive(Serialize)]
struct VHemicycle {
    geometry: Geometry,
    segments: Vec<hemicycle::Segment>,
}

pub fn write_hemicycle(out_dir: &Path, deputies: &DeputiesData) -> Result<()> {
    let female = deputies.gender_breakdown.get("F").copied().unwrap_or(0);
    let female_percent = if deputies.total > 0 {
        female as f64 / deputies.total as f64 * 100.0
    } else {
        0.0
    };
    let bundle = json!({
        "total": deputies.total,
        "party_composition": deputies.party_composition,
        "gender_breakdown": deputies.gender_breakdown,
        "female_percent": female_percent,
        "circle_breakdown": deputies.circle_breakdown,
        "large": VHemicycle {
            geometry: Geometry::LARGE,
            segments: hemicycle::build_segments(
                &deputies.party_composition,
                deputies.total,
                &Geometry::LARGE,
            ),
        },
        "small": VHemicycle {
            geometry: Geometry::SMALL,
            segments: hemicycle::build_segments(
                &deputies.party_composition,
                deputies.total,
                &Geometry::SMALL,
            ),
        },
        "deputies": deputies.deputies,
    });
    write_json(out_dir.join("viz.hemicycle.json"), &bundle)
}

/* -------------------------------------------------------------------------- */
/* 5) Committees                                                              */
/* -------------------------------------------------------------------------- */

#[derive(Serialize)]
struct VCommittee<'a> {
    org_id: i64,
    name: &'a str,
    short_name: String,
    total_members: u32,
    parties: Vec<VCommitteeParty>,
    ini_authored: u32,
    ini_in_progress: u32,
    ini_approved: u32,
    ini_rejected: u32,
    status_bars: Vec<funnel::StatusBar>,
    hemicycle: Vec<hemicycle::Segment>,
    meetings: Vec<VMeeting>,
}

#[derive(Serialize)]
struct VCommitteeParty {
    party: String,
    count: u32,
    color: &'static str,
}

#[derive(Serialize)]
struct VMeeting {
    title: String,
    date: String,
    time: Option<String>,
    room: String,
}

/// Per-committee card: membership mini-hemicycle plus the status bar chart
/// of its lead-linked initiatives (committees without a detail record get an
/// all-zero chart).
pub fn write_committees(
    out_dir: &Path,
    committees: &[Committee],
    details: &HashMap<i64, CommitteeDetail>,
) -> Result<()> {
    let cards: Vec<VCommittee> = committees
        .iter()
        .map(|c| {
            let lead_counts = details
                .get(&c.org_id)
                .map(|d| {
                    let mut counts = funnel::FunnelCounts::default();
                    for ci in &d.initiatives {
                        if ci.link_type == CommitteeRole::Lead {
                            counts.add(
                                classify(ci.initiative.current_status.as_deref())
                                    .category,
                            );
                        }
                    }
                    counts
                })
                .unwrap_or_default();

            let mut parties: Vec<String> = c.parties.keys().cloned().collect();
            hemicycle::sort_by_spectrum(&mut parties);

            VCommittee {
                org_id: c.org_id,
                name: &c.name,
                short_name: c.short_name(),
                total_members: c.total_members,
                parties: parties
                    .into_iter()
                    .map(|p| VCommitteeParty {
                        count: c.parties.get(&p).copied().unwrap_or(0),
                        color: hemicycle::party_color(&p),
                        party: p,
                    })
                    .collect(),
                ini_authored: c.ini_authored,
                ini_in_progress: c.ini_in_progress,
                ini_approved: c.ini_approved,
                ini_rejected: c.ini_rejected,
                status_bars: funnel::status_bars(&lead_counts),
                hemicycle: hemicycle::build_segments(
                    &c.parties,
                    c.total_members,
                    &Geometry::SMALL,
                ),
                meetings: details
                    .get(&c.org_id)
                    .map(|d| {
                        d.meetings
                            .iter()
                            .map(|m| VMeeting {
                                title: m.title.clone(),
                                date: m.start_date.format("%Y-%m-%d").to_string(),
                                time: m.start_time.map(|t| t.format("%H:%M").to_string()),
                                room: m.room.clone(),
                            })
                            .collect()
                    })
                    .unwrap_or_default(),
            }
        })
        .collect();

    write_json(
        out_dir.join("viz.committees.json"),
        &json!({ "committees": cards }),
    )
}

/* -------------------------------------------------------------------------- */
/* 6) Per-day index                                                           */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Serialize)]
pub struct ViewStatus {
    pub view: &'static str,
    pub file: &'static str,
    pub ok: bool,
    pub error: Option<String>,
}

pub fn write_index(
    out_dir: &Path,
    date: &str,
    legislature: &str,
    views: &[ViewStatus],
) -> Result<()> {
    let idx = json!({
        "date": date,
        "legislature": legislature,
        "version": 1,
        "views": views,
        "files": views
            .iter()
            .filter(|v| v.ok)
            .map(|v| v.file)
            .collect::<Vec<_>>(),
    });
    write_json(out_dir.join("viz.index.json"), &idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_flexible_date, LegislativeEvent};
    use tempfile::tempdir;

    fn initiative(id: i64, type_code: &str, status: &str, entry: &str) -> Initiative {
        Initiative {
            id,
            number: id,
            type_code: type_code.into(),
            type_description: String::new(),
            title: format!("Iniciativa {id}"),
            legislature: "XVII".into(),
            legislature_start: None,
            events: vec![LegislativeEvent {
                phase: "Entrada".into(),
                date_raw: entry.into(),
                date: parse_flexible_date(entry),
            }],
            author_parties: vec!["PS".into()],
            author_other: None,
            current_status: Some(status.into()),
            is_completed: false,
            text_link: None,
        }
    }

    #[test]
    fn funnels_bundle_has_both_funnels_with_all_steps() {
        let dir = tempdir().unwrap();
        let data = vec![
            initiative(1, "J", "Entrada", "2025-01-10"),
            initiative(2, "R", "Votação na generalidade", "2025-01-12"),
        ];
        write_funnels(dir.path(), &data).unwrap();

        let raw = fs::read_to_string(dir.path().join("viz.funnels.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let funnels = parsed["funnels"].as_array().unwrap();
        assert_eq!(funnels.len(), 2);
        assert_eq!(funnels[0]["steps"].as_array().unwrap().len(), 7);
        assert_eq!(funnels[0]["total"], 1);
        assert_eq!(funnels[1]["total"], 1);
    }

    #[test]
    fn initiatives_bundle_carries_cards_and_widgets() {
        let dir = tempdir().unwrap();
        let data = vec![initiative(1, "J", "Entrada", "2025-01-10")];
        write_initiatives(dir.path(), &data).unwrap();

        let raw = fs::read_to_string(dir.path().join("viz.initiatives.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["initiatives"].as_array().unwrap().len(), 1);
        let card = &parsed["initiatives"][0];
        assert_eq!(card["status_category"], "submitted");
        assert_eq!(card["type_label"], "Proj. Lei");
        assert_eq!(card["timeline"]["mode"], "track");
        assert_eq!(parsed["widgets"]["authors"][0]["name"], "PS");
    }

    #[test]
    fn index_lists_only_successful_views() {
        let dir = tempdir().unwrap();
        let views = vec![
            ViewStatus {
                view: "funnels",
                file: "viz.funnels.json",
                ok: true,
                error: None,
            },
            ViewStatus {
                view: "agenda",
                file: "viz.agenda.json",
                ok: false,
                error: Some("HTTP error".into()),
            },
        ];
        write_index(dir.path(), "2026-08-29", "XVII", &views).unwrap();

        let raw = fs::read_to_string(dir.path().join("viz.index.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["files"].as_array().unwrap().len(), 1);
        assert_eq!(parsed["views"].as_array().unwrap().len(), 2);
        assert_eq!(parsed["views"][1]["ok"], false);
    }
}
