//! Filter and sort composition over the initiative and deputy datasets.
//! Filters are conjunctive across categories and disjunctive within one:
//! an item passes if, for every category with at least one active value,
//! it matches at least one of that category's values.

use crate::models::{Deputy, Initiative};
use crate::status::{classify, fold_text, StatusCategory};
use itertools::Itertools;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Synthetic author bucket for Government-authored initiatives.
pub const AUTHOR_GOVERNMENT: &str = "Governo";
/// Synthetic author bucket for initiatives with neither a government author
/// nor any parliamentary group. Mutually exclusive with [`AUTHOR_GOVERNMENT`].
pub const AUTHOR_OTHER: &str = "Outros";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    DateAsc,
    DateDesc,
    /// Most advanced phase first, by the pipeline's progress ranking.
    ProgressDesc,
}

#[derive(Debug, Clone, Default)]
pub struct InitiativeFilters {
    pub types: BTreeSet<String>,
    pub authors: BTreeSet<String>,
    pub months: BTreeSet<String>, // "YYYY-MM" buckets
    pub phases: BTreeSet<StatusCategory>,
    pub title: Option<String>,
}

impl InitiativeFilters {
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
            && self.authors.is_empty()
            && self.months.is_empty()
            && self.phases.is_empty()
            && self.title.as_deref().map_or(true, str::is_empty)
    }

    pub fn matches(&self, ini: &Initiative) -> bool {
        if !self.types.is_empty() && !self.types.contains(&ini.type_code) {
            return false;
        }
        if !self.authors.is_empty()
            && !self.authors.iter().any(|a| author_matches(ini, a))
        {
            return false;
        }
        if !self.months.is_empty() {
            match ini.month_key() {
                Some(key) if self.months.contains(&key) => {}
                _ => return false,
            }
        }
        if !self.phases.is_empty()
            && !self
                .phases
                .contains(&classify(ini.current_status.as_deref()).category)
        {
            return false;
        }
        if let Some(text) = self.title.as_deref().filter(|t| !t.is_empty()) {
            if !fold_text(&ini.title).contains(&fold_text(text)) {
                return false;
            }
        }
        true
    }
}

fn author_matches(ini: &Initiative, author: &str) -> bool {
    match author {
        AUTHOR_GOVERNMENT => ini.is_government_authored(),
        AUTHOR_OTHER => {
            !ini.is_government_authored() && ini.author_parties.is_empty()
        }
        party => ini.author_parties.iter().any(|p| p == party),
    }
}

/// Filter and sort a borrowed view of the dataset.
pub fn apply<'a>(
    initiatives: &'a [Initiative],
    filters: &InitiativeFilters,
    order: Option<SortOrder>,
) -> Vec<&'a Initiative> {
    let mut out: Vec<&Initiative> =
        initiatives.iter().filter(|i| filters.matches(i)).collect();
    if let Some(order) = order {
        sort(&mut out, order);
    }
    out
}

/// Sort in place. Date sorts put undated initiatives last; all sorts are
/// stable so equal keys keep dataset order.
pub fn sort(initiatives: &mut [&Initiative], order: SortOrder) {
    match order {
        SortOrder::DateAsc => initiatives.sort_by_key(|i| {
            (i.entry_date().is_none(), i.entry_date())
        }),
        SortOrder::DateDesc => initiatives.sort_by_key(|i| {
            (i.entry_date().is_none(), std::cmp::Reverse(i.entry_date()))
        }),
        SortOrder::ProgressDesc => initiatives.sort_by_key(|i| {
            std::cmp::Reverse(
                classify(i.current_status.as_deref()).category.progress_rank(),
            )
        }),
    }
}

/// Recover full initiative records for a set of search-matched ids. Search
/// results only carry ids; event history comes from the loaded dataset, so
/// the displayed set is the intersection of the two.
pub fn search_subset<'a>(
    initiatives: &'a [Initiative],
    matched_ids: &HashSet<i64>,
) -> Vec<&'a Initiative> {
    initiatives
        .iter()
        .filter(|i| matched_ids.contains(&i.id))
        .collect()
}

/// Shape a free-text query for the backend's prefix-matching full-text
/// search: each word gets a prefix marker, words are ANDed.
pub fn to_search_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(|word| format!("{word}:*"))
        .join(" & ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorKind {
    Government,
    Party,
    Other,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorBucket {
    pub name: String,
    pub count: usize,
    pub kind: AuthorKind,
}

/// Author breakdown for the widget: Government first, then parties by count
/// descending, then the Outros bucket. Buckets with zero count are omitted.
pub fn author_counts(initiatives: &[Initiative]) -> Vec<AuthorBucket> {
    let mut government = 0usize;
    let mut other = 0usize;
    let mut parties: BTreeMap<String, usize> = BTreeMap::new();

    for ini in initiatives {
        if ini.is_government_authored() {
            government += 1;
        }
        for party in &ini.author_parties {
            *parties.entry(party.clone()).or_default() += 1;
        }
        if !ini.is_government_authored() && ini.author_parties.is_empty() {
            other += 1;
        }
    }

    let mut out = Vec::new();
    if government > 0 {
        out.push(AuthorBucket {
            name: AUTHOR_GOVERNMENT.to_string(),
            count: government,
            kind: AuthorKind::Government,
        });
    }
    out.extend(
        parties
            .into_iter()
            .sorted_by_key(|(_, count)| std::cmp::Reverse(*count))
            .map(|(name, count)| AuthorBucket {
                name,
                count,
                kind: AuthorKind::Party,
            }),
    );
    if other > 0 {
        out.push(AuthorBucket {
            name: AUTHOR_OTHER.to_string(),
            count: other,
            kind: AuthorKind::Other,
        });
    }
    out
}

/// Initiatives per "YYYY-MM" bucket of their earliest event, in month order.
pub fn month_counts(initiatives: &[Initiative]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for ini in initiatives {
        if let Some(key) = ini.month_key() {
            *counts.entry(key).or_default() += 1;
        }
    }
    counts.into_iter().collect()
}

/// Initiatives per type code, count descending.
pub fn type_counts(initiatives: &[Initiative]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for ini in initiatives {
        *counts.entry(ini.type_code.clone()).or_default() += 1;
    }
    counts
        .into_iter()
        .sorted_by_key(|(_, count)| std::cmp::Reverse(*count))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct DeputyFilters {
    pub party: Option<String>,
    pub name: Option<String>,
    pub circle: Option<String>,
    pub gender: Option<String>,
}

impl DeputyFilters {
    pub fn matches(&self, deputy: &Deputy) -> bool {
        if let Some(party) = self.party.as_deref().filter(|p| !p.is_empty()) {
            if deputy.party != party {
                return false;
            }
        }
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            if !fold_text(&deputy.name).contains(&fold_text(name)) {
                return false;
            }
        }
        if let Some(circle) = self.circle.as_deref().filter(|c| !c.is_empty()) {
            if deputy.circle != circle {
                return false;
            }
        }
        if let Some(gender) = self.gender.as_deref().filter(|g| !g.is_empty()) {
            if deputy.gender.as_deref() != Some(gender) {
                return false;
            }
        }
        true
    }
}

pub fn filter_deputies<'a>(
    deputies: &'a [Deputy],
    filters: &DeputyFilters,
) -> Vec<&'a Deputy> {
    deputies.iter().filter(|d| filters.matches(d)).collect()
}
