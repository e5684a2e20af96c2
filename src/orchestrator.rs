use anyhow::{anyhow, bail, Context, Result};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, error, info, warn};

use crate::fetch::{
    fetch_agenda, fetch_committee_detail, fetch_committees, fetch_deputies,
    fetch_initiatives, search_initiatives,
};
use crate::filters::{self, InitiativeFilters, SortOrder};
use crate::models::{CommitteeDetail, Initiative};
use crate::viz_export::{
    ensure_out_dir, write_agenda, write_committees, write_funnels,
    write_hemicycle, write_index, write_initiatives, write_search, ViewStatus,
};

/// Committee detail requests in flight at once.
const DETAIL_CONCURRENCY: usize = 8;

pub struct RunOptions {
    pub base_url: String,
    pub legislature: String,
    pub output_dir: String,
    /// Restrict the initiative views to these type codes (empty = all).
    pub types: Vec<String>,
    /// Free-text search; adds a viz.search.json bundle when set.
    pub search: Option<String>,
    /// Export only these views (empty = all).
    pub views: Vec<String>,
    /// Per-request HTTP timeout.
    pub timeout_secs: u64,
}

fn view_enabled(views: &[String], name: &str) -> bool {
    views.is_empty() || views.iter().any(|v| v == name)
}

/// Fetch every dataset and write the D3-ready bundles into
/// `<output_dir>/<date>/`. Each view fetches and exports independently: a
/// failed view is logged and marked in the index, and the run only fails
/// when no view succeeded.
pub async fn run_export(opts: &RunOptions, date: &str) -> Result<()> {
    let pipeline_start = std::time::Instant::now();
    info!(
        "Export started - date={}, legislature={}, output_dir={}",
        date, opts.legislature, opts.output_dir
    );

    // Upstream occasionally stalls; a hard client timeout keeps one dead
    // view from hanging the whole export run.
    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(opts.timeout_secs))
        .build()?;

    let out_dir = Path::new(&opts.output_dir).join(date);
    ensure_out_dir(&out_dir)?;

    let mut views = Vec::new();

    // Initiatives feed the funnels, cards and search views, so one fetch
    // covers all three.
    if view_enabled(&opts.views, "initiatives") {
        let initiatives_result =
            export_initiatives(&client, opts, &out_dir).await;
        match &initiatives_result {
            Ok(initiatives) => {
                debug!(
                    "Initiatives view exported - initiatives={}",
                    initiatives.len()
                )
            }
            Err(e) => error!("Initiatives view failed - error={:#}", e),
        }
        views.push(view_status(
            "funnels",
            "viz.funnels.json",
            &initiatives_result,
        ));
        views.push(view_status(
            "initiatives",
            "viz.initiatives.json",
            &initiatives_result,
        ));

        // Search is its own view: a failed search request must not mark the
        // already-written funnels and initiatives bundles as failed.
        if let Some(query) = opts.search.as_deref() {
            let search_result = match &initiatives_result {
                Ok(initiatives) => {
                    export_search(&client, opts, &out_dir, query, initiatives)
                        .await
                }
                Err(_) => Err(anyhow!("initiatives dataset unavailable")),
            };
            match &search_result {
                Ok(count) => debug!("Search view exported - matches={}", count),
                Err(e) => error!("Search view failed - error={:#}", e),
            }
            views.push(view_status("search", "viz.search.json", &search_result));
        }
    }

    if view_enabled(&opts.views, "agenda") {
        let agenda_result = fetch_agenda(&client, &opts.base_url)
            .await
            .and_then(|events| {
                write_agenda(&out_dir, &events)
                    .context("writing agenda bundle")?;
                Ok(events.len())
            });
        match &agenda_result {
            Ok(count) => debug!("Agenda view exported - events={}", count),
            Err(e) => error!("Agenda view failed - error={:#}", e),
        }
        views.push(view_status("agenda", "viz.agenda.json", &agenda_result));
    }

    if view_enabled(&opts.views, "hemicycle") {
        let hemicycle_result = fetch_deputies(&client, &opts.base_url)
            .await
            .and_then(|deputies| {
                write_hemicycle(&out_dir, &deputies)
                    .context("writing hemicycle bundle")?;
                Ok(deputies.deputies.len())
            });
        match &hemicycle_result {
            Ok(count) => debug!("Hemicycle view exported - deputies={}", count),
            Err(e) => error!("Hemicycle view failed - error={:#}", e),
        }
        views.push(view_status(
            "hemicycle",
            "viz.hemicycle.json",
            &hemicycle_result,
        ));
    }

    if view_enabled(&opts.views, "committees") {
        let committees_result = export_committees(&client, opts, &out_dir).await;
        match &committees_result {
            Ok(count) => {
                debug!("Committees view exported - committees={}", count)
            }
            Err(e) => error!("Committees view failed - error={:#}", e),
        }
        views.push(view_status(
            "committees",
            "viz.committees.json",
            &committees_result,
        ));
    }

    let succeeded = views.iter().filter(|v| v.ok).count();
    write_index(&out_dir, date, &opts.legislature, &views)?;

    info!(
        "Export completed - duration={:.2}s, views_ok={}/{}",
        pipeline_start.elapsed().as_secs_f32(),
        succeeded,
        views.len()
    );

    if succeeded == 0 {
        bail!("All views failed; nothing exported to {:?}", out_dir);
    }
    Ok(())
}

async fn export_initiatives(
    client: &Client,
    opts: &RunOptions,
    out_dir: &Path,
) -> Result<Vec<Initiative>> {
    let initiatives =
        fetch_initiatives(client, &opts.base_url, &opts.legislature).await?;

    let initiatives: Vec<Initiative> = if opts.types.is_empty() {
        initiatives
    } else {
        let type_filter = InitiativeFilters {
            types: opts.types.iter().cloned().collect(),
            ..Default::default()
        };
        let kept: Vec<Initiative> = filters::apply(&initiatives, &type_filter, None)
            .into_iter()
            .cloned()
            .collect();
        info!(
            "Type filter applied - types={:?}, kept={}/{}",
            opts.types,
            kept.len(),
            initiatives.len()
        );
        kept
    };

    write_funnels(out_dir, &initiatives).context("writing funnels bundle")?;
    write_initiatives(out_dir, &initiatives)
        .context("writing initiatives bundle")?;

    Ok(initiatives)
}

async fn export_search(
    client: &Client,
    opts: &RunOptions,
    out_dir: &Path,
    query: &str,
    initiatives: &[Initiative],
) -> Result<usize> {
    let ts_query = filters::to_search_query(query);
    let ids = search_initiatives(
        client,
        &opts.base_url,
        &ts_query,
        Some(&opts.legislature),
    )
    .await?;
    let matched_ids = ids.into_iter().collect();
    let mut matches = filters::search_subset(initiatives, &matched_ids);
    filters::sort(&mut matches, SortOrder::DateDesc);
    info!(
        "Search completed - query={:?}, matches={}",
        query,
        matches.len()
    );
    write_search(out_dir, query, &matches).context("writing search bundle")?;
    Ok(matches.len())
}

/// Committee summaries plus per-committee detail. A missing or failing
/// detail record degrades that committee's card, not the whole view.
async fn export_committees(
    client: &Client,
    opts: &RunOptions,
    out_dir: &Path,
) -> Result<usize> {
    let committees = fetch_committees(client, &opts.base_url).await?;

    // Detail fetches are independent; run a few in flight at once.
    let fetched: Vec<(i64, Result<Option<CommitteeDetail>>)> =
        stream::iter(committees.iter().map(|c| c.org_id))
            .map(|org_id| async move {
                (
                    org_id,
                    fetch_committee_detail(client, &opts.base_url, org_id).await,
                )
            })
            .buffer_unordered(DETAIL_CONCURRENCY)
            .collect()
            .await;

    let mut details: HashMap<i64, CommitteeDetail> = HashMap::new();
    for (org_id, result) in fetched {
        match result {
            Ok(Some(detail)) => {
                details.insert(org_id, detail);
            }
            Ok(None) => {
                debug!("No detail record - org_id={}", org_id);
            }
            Err(e) => {
                warn!(
                    "Committee detail fetch failed - org_id={}, error={:#}",
                    org_id, e
                );
            }
        }
    }

    write_committees(out_dir, &committees, &details)
        .context("writing committees bundle")?;
    Ok(committees.len())
}

fn view_status<T>(
    view: &'static str,
    file: &'static str,
    result: &Result<T>,
) -> ViewStatus {
    ViewStatus {
        view,
        file,
        ok: result.is_ok(),
        error: result.as_ref().err().map(|e| format!("{e:#}")),
    }
}
