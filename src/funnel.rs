//! Funnel aggregation: bucket initiatives into the seven pipeline stages and
//! produce the D3-ready step lists, plus the per-committee status bar chart.

use crate::models::Initiative;
use crate::status::{classify, StatusCategory};
use serde::Serialize;

/// Counts for every pipeline stage, always carrying all seven categories so
/// empty stages render as zero-height bars instead of disappearing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunnelCounts {
    counts: [usize; StatusCategory::ALL.len()],
}

impl FunnelCounts {
    pub fn get(&self, cat: StatusCategory) -> usize {
        self.counts[cat as usize]
    }

    pub fn add(&mut self, cat: StatusCategory) {
        self.counts[cat as usize] += 1;
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Steps in pipeline order, one per category.
    pub fn steps(&self) -> Vec<FunnelStep> {
        StatusCategory::ALL
            .iter()
            .map(|&cat| FunnelStep {
                category: cat.key(),
                label: cat.label(),
                count: self.get(cat),
                color: cat.color(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FunnelStep {
    pub category: &'static str,
    pub label: &'static str,
    pub count: usize,
    pub color: &'static str,
}

/// Classify each initiative by its current status. Every initiative lands in
/// exactly one bucket, so the funnel total equals the input size.
pub fn aggregate<'a, I>(initiatives: I) -> FunnelCounts
where
    I: IntoIterator<Item = &'a Initiative>,
{
    let mut counts = FunnelCounts::default();
    for ini in initiatives {
        counts.add(classify(ini.current_status.as_deref()).category);
    }
    counts
}

/// Funnel restricted to law-type initiatives (Projetos and Propostas de Lei).
pub fn laws_funnel(initiatives: &[Initiative]) -> FunnelCounts {
    aggregate(
        initiatives
            .iter()
            .filter(|i| matches!(i.type_code.as_str(), "J" | "P")),
    )
}

/// Funnel restricted to resolution-type initiatives.
pub fn resolutions_funnel(initiatives: &[Initiative]) -> FunnelCounts {
    aggregate(
        initiatives
            .iter()
            .filter(|i| matches!(i.type_code.as_str(), "R" | "S")),
    )
}

/// One bar of the committee status mini-chart.
#[derive(Debug, Clone, Serialize)]
pub struct StatusBar {
    pub category: &'static str,
    pub label: &'static str,
    pub count: usize,
    pub color: &'static str,
    /// Bar height in px: proportional to the tallest bar, with a visible
    /// minimum for non-zero counts and a 4px stub for zero.
    pub height: f64,
}

/// Per-status bar chart for a committee's lead-linked initiatives. Heights
/// scale against the tallest bar (floored at 1 so an all-zero chart does not
/// divide by zero).
pub fn status_bars(counts: &FunnelCounts) -> Vec<StatusBar> {
    let max = counts.counts.iter().copied().max().unwrap_or(0).max(1);
    StatusCategory::ALL
        .iter()
        .map(|&cat| {
            let count = counts.get(cat);
            let height = if count > 0 {
                ((count as f64 / max as f64) * 80.0).max(8.0)
            } else {
                4.0
            };
            StatusBar {
                category: cat.key(),
                label: cat.label(),
                count,
                color: cat.color(),
                height,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initiative(type_code: &str, status: Option<&str>) -> Initiative {
        Initiative {
            id: 1,
            number: 1,
            type_code: type_code.into(),
            type_description: String::new(),
            title: String::new(),
            legislature: "XVII".into(),
            legislature_start: None,
            events: vec![],
            author_parties: vec![],
            author_other: None,
            current_status: status.map(str::to_string),
            is_completed: false,
            text_link: None,
        }
    }

    #[test]
    fn funnel_total_equals_input_size() {
        let inis = vec![
            initiative("J", Some("Entrada")),
            initiative("J", Some("Votação na generalidade")),
            initiative("P", Some("Rejeitado")),
            initiative("R", None),
            initiative("J", Some("fase inventada")),
        ];
        let counts = aggregate(&inis);
        assert_eq!(counts.total(), inis.len());
    }

    #[test]
    fn empty_input_yields_all_zero_steps() {
        let counts = aggregate(&[]);
        let steps = counts.steps();
        assert_eq!(steps.len(), 7);
        assert!(steps.iter().all(|s| s.count == 0));
    }

    #[test]
    fn laws_and_resolutions_split_by_type() {
        let inis = vec![
            initiative("J", Some("Entrada")),
            initiative("P", Some("Entrada")),
            initiative("R", Some("Entrada")),
            initiative("S", Some("Entrada")),
            initiative("D", Some("Entrada")),
        ];
        assert_eq!(laws_funnel(&inis).total(), 2);
        assert_eq!(resolutions_funnel(&inis).total(), 2);
    }

    #[test]
    fn steps_follow_pipeline_order() {
        let steps = FunnelCounts::default().steps();
        assert_eq!(steps[0].category, "submitted");
        assert_eq!(steps[6].category, "rejected");
    }

    #[test]
    fn bar_heights_scale_with_floor() {
        let inis = vec![
            initiative("J", Some("Entrada")),
            initiative("J", Some("Entrada")),
            initiative("J", Some("Entrada")),
            initiative("J", Some("Entrada")),
            initiative("J", Some("Entrada")),
            initiative("J", Some("Entrada")),
            initiative("J", Some("Entrada")),
            initiative("J", Some("Entrada")),
            initiative("J", Some("Entrada")),
            initiative("J", Some("Entrada")),
            initiative("J", Some("Entrada")),
            initiative("J", Some("Entrada")),
            initiative("J", Some("Entrada")),
            initiative("J", Some("Entrada")),
            initiative("J", Some("Entrada")),
            initiative("J", Some("Entrada")),
            initiative("J", Some("Entrada")),
            initiative("J", Some("Entrada")),
            initiative("J", Some("Entrada")),
            initiative("J", Some("Entrada")),
            initiative("J", Some("Rejeitado")),
        ];
        let bars = status_bars(&aggregate(&inis));
        let submitted = bars.iter().find(|b| b.category == "submitted").unwrap();
        let rejected = bars.iter().find(|b| b.category == "rejected").unwrap();
        let voting = bars.iter().find(|b| b.category == "voting").unwrap();
        assert!((submitted.height - 80.0).abs() < 1e-9);
        // 1/20 of the max would be 4px; the visible floor lifts it to 8.
        assert!((rejected.height - 8.0).abs() < 1e-9);
        assert!((voting.height - 4.0).abs() < 1e-9);
    }

    #[test]
    fn all_zero_chart_does_not_divide_by_zero() {
        let bars = status_bars(&FunnelCounts::default());
        assert!(bars.iter().all(|b| (b.height - 4.0).abs() < 1e-9));
    }
}
