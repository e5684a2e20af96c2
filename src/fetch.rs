use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::api_types::*;
use crate::models::*;

fn convert_initiative(raw: ApiInitiative) -> Initiative {
    let author_parties: Vec<String> = raw
        .ini_autor_grupos
        .map(|g| g.into_vec())
        .unwrap_or_default()
        .into_iter()
        .filter_map(|g| g.gp)
        .collect();

    Initiative {
        id: raw.ini_id,
        number: raw.ini_nr,
        type_code: raw.ini_tipo,
        type_description: raw.ini_desc_tipo,
        title: raw.ini_titulo.trim().to_string(),
        legislature: raw.ini_leg,
        legislature_start: parse_flexible_date(&raw.data_inicio_leg),
        events: raw
            .ini_eventos
            .into_iter()
            .map(|e| LegislativeEvent {
                date: parse_flexible_date(&e.data_fase),
                phase: e.fase,
                date_raw: e.data_fase,
            })
            .collect(),
        author_parties,
        author_other: raw.ini_autor_outros.and_then(|a| a.nome),
        current_status: raw.current_status.filter(|s| !s.is_empty()),
        is_completed: raw.is_completed,
        text_link: raw.ini_link_texto,
    }
}

/// Initiatives for one legislature, converted to domain models. Events with
/// unparseable dates are kept (the timeline excludes them locally).
pub async fn fetch_initiatives(
    client: &Client,
    base_url: &str,
    legislature: &str,
) -> Result<Vec<Initiative>> {
    let url = format!("{base_url}/api/iniciativas?legislature={legislature}");
    let start = std::time::Instant::now();

    debug!("Fetching initiatives - legislature={}", legislature);

    let raw: Vec<ApiInitiative> = get_json(client, &url).await?;
    let count = raw.len();
    let initiatives: Vec<Initiative> =
        raw.into_iter().map(convert_initiative).collect();

    info!(
        "Initiatives fetch completed - legislature={}, duration={:.2}s, initiatives={}",
        legislature,
        start.elapsed().as_secs_f32(),
        count
    );
    Ok(initiatives)
}

/// Full-text search; the query is shaped by the caller (see
/// `filters::to_search_query`). Returns the matched ids only.
pub async fn search_initiatives(
    client: &Client,
    base_url: &str,
    ts_query: &str,
    legislature: Option<&str>,
) -> Result<Vec<i64>> {
    let mut url = format!(
        "{base_url}/api/search?q={}&limit=100",
        urlencode(ts_query)
    );
    if let Some(leg) = legislature {
        url.push_str(&format!("&legislature={leg}"));
    }
    let results: Vec<ApiSearchResult> = get_json(client, &url).await?;
    Ok(results.into_iter().map(|r| r.ini_id).collect())
}

fn convert_agenda_event(raw: ApiAgendaEvent) -> Option<AgendaEvent> {
    let start_date = parse_flexible_date(&raw.event_start_date)?;
    Some(AgendaEvent {
        id: raw.id,
        title: raw.title,
        subtitle: raw.subtitle,
        section: raw.section,
        theme: raw.theme,
        start_date,
        end_date: parse_flexible_date(&raw.event_end_date),
        start_time: parse_time(&raw.event_start_time),
        end_time: parse_time(&raw.event_end_time),
        room: raw.local,
    })
}

pub async fn fetch_agenda(client: &Client, base_url: &str) -> Result<Vec<AgendaEvent>> {
    let url = format!("{base_url}/api/agenda");
    let start = std::time::Instant::now();

    let raw: Vec<ApiAgendaEvent> = get_json(client, &url).await?;
    let total = raw.len();
    let events: Vec<AgendaEvent> =
        raw.into_iter().filter_map(convert_agenda_event).collect();
    if events.len() < total {
        warn!(
            "Dropped agenda events with unparseable start dates - dropped={}",
            total - events.len()
        );
    }

    info!(
        "Agenda fetch completed - duration={:.2}s, events={}",
        start.elapsed().as_secs_f32(),
        events.len()
    );
    Ok(events)
}

pub async fn fetch_committees(client: &Client, base_url: &str) -> Result<Vec<Committee>> {
    let url = format!("{base_url}/api/orgaos/summary");
    let start = std::time::Instant::now();

    let raw: Vec<ApiCommittee> = get_json(client, &url).await?;
    let committees: Vec<Committee> = raw
        .into_iter()
        .map(|c| Committee {
            org_id: c.org_id,
            name: c.name,
            total_members: c.total_members,
            parties: c.parties,
            ini_authored: c.ini_authored,
            ini_in_progress: c.ini_in_progress,
            ini_approved: c.ini_approved,
            ini_rejected: c.ini_rejected,
        })
        .collect();

    info!(
        "Committees fetch completed - duration={:.2}s, committees={}",
        start.elapsed().as_secs_f32(),
        committees.len()
    );
    Ok(committees)
}

/// One committee's linked initiatives and upcoming meetings. Returns
/// Ok(None) on 404 (committee with no detail record).
pub async fn fetch_committee_detail(
    client: &Client,
    base_url: &str,
    org_id: i64,
) -> Result<Option<CommitteeDetail>> {
    let url = format!("{base_url}/api/orgaos/{org_id}");

    let resp = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("Request failed for {url}"))?;

    if resp.status() == reqwest::StatusCode::NOT_FOUND {
        warn!("Committee detail not found (404) - org_id={}", org_id);
        return Ok(None);
    }

    let resp = resp
        .error_for_status()
        .with_context(|| format!("HTTP error for {url}"))?;
    let raw: ApiCommitteeDetail = resp
        .json()
        .await
        .with_context(|| format!("Decoding JSON for {url}"))?;

    let initiatives = raw
        .initiatives
        .into_iter()
        .map(|ci| CommitteeInitiative {
            link_type: if ci.link_type == "lead" {
                CommitteeRole::Lead
            } else {
                CommitteeRole::Secondary
            },
            initiative: LinkedInitiative {
                ini_id: ci.initiative.ini_id,
                title: ci.initiative.title,
                type_code: ci.initiative.type_code,
                type_description: ci.initiative.type_description,
                number: ci.initiative.number,
                current_status: ci.initiative.current_status,
                author_name: ci.initiative.author_name,
                is_completed: ci.initiative.is_completed,
            },
            has_vote: ci.has_vote,
            vote_result: ci.vote_result,
            has_rapporteur: ci.has_rapporteur,
        })
        .collect();
    let meetings = raw
        .agenda_events
        .into_iter()
        .filter_map(convert_agenda_event)
        .collect();

    Ok(Some(CommitteeDetail {
        initiatives,
        meetings,
    }))
}

pub async fn fetch_deputies(client: &Client, base_url: &str) -> Result<DeputiesData> {
    let url = format!("{base_url}/api/deputados");
    let start = std::time::Instant::now();

    let raw: ApiDeputiesResponse = get_json(client, &url).await?;
    let deputies: Vec<Deputy> = raw
        .deputados
        .into_iter()
        .map(|d| Deputy {
            dep_id: d.dep_id,
            name: d.name,
            party: d.party,
            circle: d.circulo,
            gender: d.gender,
            age: d.age,
            committees: d
                .comissoes
                .into_iter()
                .map(|m| CommitteeMembership {
                    name: m.name,
                    acronym: m.acronym,
                    role: m.role,
                })
                .collect(),
        })
        .collect();

    info!(
        "Deputies fetch completed - duration={:.2}s, deputies={}",
        start.elapsed().as_secs_f32(),
        deputies.len()
    );
    Ok(DeputiesData {
        deputies,
        total: raw.summary.total,
        party_composition: raw.summary.party_composition,
        gender_breakdown: raw.summary.gender_breakdown,
        circle_breakdown: raw.summary.circulo_breakdown,
    })
}

async fn get_json<T: serde::de::DeserializeOwned>(client: &Client, url: &str) -> Result<T> {
    client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Request failed for {url}"))?
        .error_for_status()
        .with_context(|| format!("HTTP error for {url}"))?
        .json()
        .await
        .with_context(|| format!("Decoding JSON for {url}"))
}

/// Minimal percent-encoding for query values: the search endpoint only needs
/// spaces, '&' and '+' escaped beyond what reqwest passes through.
fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            ' ' => out.push_str("%20"),
            '&' => out.push_str("%26"),
            '+' => out.push_str("%2B"),
            '#' => out.push_str("%23"),
            _ => out.push(c),
        }
    }
    out
}
