//! Hemicycle geometry: turn a party-seat composition into the SVG annular
//! wedge paths of the semicircular seating chart.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::f64::consts::PI;

/// Political spectrum order, right to left, CH at center. Parties missing
/// from this list sort last, keeping their relative order.
pub const PARTY_ORDER: [&str; 10] = [
    "CDS-PP", "IL", "PSD", "JPP", "CH", "PS", "PAN", "L", "BE", "PCP",
];

/// Official party colors.
static PARTY_COLORS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("CDS-PP", "#0071BC"),
        ("IL", "#00abe4"),
        ("PSD", "#FF6500"),
        ("JPP", "#00ab85"),
        ("CH", "#0f3468"),
        ("PS", "#FF66FF"),
        ("PAN", "#00798f"),
        ("L", "#C4D600"),
        ("BE", "#EE4655"),
        ("PCP", "#FF0000"),
    ])
});

pub const FALLBACK_COLOR: &str = "#888888";

pub fn party_color(party: &str) -> &'static str {
    PARTY_COLORS.get(party).copied().unwrap_or(FALLBACK_COLOR)
}

fn spectrum_index(party: &str) -> usize {
    PARTY_ORDER
        .iter()
        .position(|p| *p == party)
        .unwrap_or(PARTY_ORDER.len() + 89)
}

/// Sort party names by political spectrum; unknown parties go last, stable
/// among themselves.
pub fn sort_by_spectrum(parties: &mut Vec<String>) {
    parties.sort_by_key(|p| spectrum_index(p));
}

/// Geometry constants for one rendering size. Only the constants differ
/// between presets; the segment math is shared.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Geometry {
    pub cx: f64,
    pub cy: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub view_box: &'static str,
    pub stroke_width: f64,
}

impl Geometry {
    pub const LARGE: Geometry = Geometry {
        cx: 200.0,
        cy: 190.0,
        inner_radius: 70.0,
        outer_radius: 180.0,
        view_box: "0 0 400 200",
        stroke_width: 1.0,
    };

    pub const SMALL: Geometry = Geometry {
        cx: 100.0,
        cy: 95.0,
        inner_radius: 35.0,
        outer_radius: 90.0,
        view_box: "0 0 200 100",
        stroke_width: 0.5,
    };
}

#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    pub party: String,
    pub count: u32,
    pub sweep: f64, // degrees
    pub path: String,
    pub color: &'static str,
}

/// Build the hemicycle segments for a composition. Sweep is proportional to
/// seat share over `total`; segments are laid contiguously from -90° (left
/// edge) in spectrum order. Zero-count parties are skipped.
pub fn build_segments(
    composition: &BTreeMap<String, u32>,
    total: u32,
    geometry: &Geometry,
) -> Vec<Segment> {
    if total == 0 {
        return Vec::new();
    }

    let mut parties: Vec<String> = composition.keys().cloned().collect();
    sort_by_spectrum(&mut parties);

    let mut current_angle = -90.0_f64;
    let mut segments = Vec::new();
    for party in parties {
        let count = composition.get(&party).copied().unwrap_or(0);
        if count == 0 {
            continue;
        }
        let sweep = (count as f64 / total as f64) * 180.0;
        let end_angle = current_angle + sweep;
        segments.push(Segment {
            path: arc_path(current_angle, end_angle, geometry),
            color: party_color(&party),
            party,
            count,
            sweep,
        });
        current_angle = end_angle;
    }
    segments
}

/// Annular wedge between `inner_radius` and `outer_radius` spanning
/// `[start_angle, end_angle]`: outer arc forward, radial line in, inner arc
/// back, close. Angles are in the chart's convention where -90° points left
/// and 90° points right.
pub fn arc_path(start_angle: f64, end_angle: f64, g: &Geometry) -> String {
    let start_rad = (start_angle - 90.0) * PI / 180.0;
    let end_rad = (end_angle - 90.0) * PI / 180.0;

    let x1 = g.cx + g.outer_radius * start_rad.cos();
    let y1 = g.cy + g.outer_radius * start_rad.sin();
    let x2 = g.cx + g.outer_radius * end_rad.cos();
    let y2 = g.cy + g.outer_radius * end_rad.sin();
    let x3 = g.cx + g.inner_radius * end_rad.cos();
    let y3 = g.cy + g.inner_radius * end_rad.sin();
    let x4 = g.cx + g.inner_radius * start_rad.cos();
    let y4 = g.cy + g.inner_radius * start_rad.sin();

    // Never true for a single party inside a 180° total, computed anyway so
    // the helper works for arbitrary sub-ranges.
    let large_arc = if end_angle - start_angle > 180.0 { 1 } else { 0 };

    format!(
        "M {x1} {y1} A {or} {or} 0 {large_arc} 1 {x2} {y2} L {x3} {y3} A {ir} {ir} 0 {large_arc} 0 {x4} {y4} Z",
        or = g.outer_radius,
        ir = g.inner_radius,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composition(pairs: &[(&str, u32)]) -> BTreeMap<String, u32> {
        pairs
            .iter()
            .map(|(p, c)| (p.to_string(), *c))
            .collect()
    }

    #[test]
    fn sweeps_sum_to_half_circle() {
        let comp = composition(&[("PS", 78), ("PSD", 80), ("CH", 50), ("IL", 8), ("BE", 5), ("PCP", 4), ("L", 4), ("PAN", 1)]);
        let total: u32 = comp.values().sum();
        let segments = build_segments(&comp, total, &Geometry::LARGE);
        let sweep_sum: f64 = segments.iter().map(|s| s.sweep).sum();
        assert!((sweep_sum - 180.0).abs() < 1e-6);
    }

    #[test]
    fn segments_follow_spectrum_order() {
        let comp = composition(&[("PS", 5), ("PSD", 3), ("CH", 2)]);
        let segments = build_segments(&comp, 10, &Geometry::LARGE);
        let order: Vec<&str> = segments.iter().map(|s| s.party.as_str()).collect();
        assert_eq!(order, vec!["PSD", "CH", "PS"]);
        assert!((segments[0].sweep - 54.0).abs() < 1e-9);
        assert!((segments[1].sweep - 36.0).abs() < 1e-9);
        assert!((segments[2].sweep - 90.0).abs() < 1e-9);
    }

    #[test]
    fn zero_count_parties_are_skipped() {
        let comp = composition(&[("PS", 10), ("PAN", 0)]);
        let segments = build_segments(&comp, 10, &Geometry::LARGE);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].party, "PS");
    }

    #[test]
    fn unknown_parties_sort_last() {
        let mut parties = vec![
            "NOVO".to_string(),
            "PS".to_string(),
            "CDS-PP".to_string(),
        ];
        sort_by_spectrum(&mut parties);
        assert_eq!(parties, vec!["CDS-PP", "PS", "NOVO"]);
    }

    #[test]
    fn empty_total_yields_no_segments() {
        let comp = composition(&[("PS", 3)]);
        assert!(build_segments(&comp, 0, &Geometry::LARGE).is_empty());
    }

    #[test]
    fn full_width_segment_starts_at_left_edge() {
        let comp = composition(&[("PS", 10)]);
        let segments = build_segments(&comp, 10, &Geometry::LARGE);
        let g = Geometry::LARGE;
        // Start angle -90° maps to the leftmost point of the outer arc.
        let expected_x = g.cx + g.outer_radius * ((-180.0_f64) * PI / 180.0).cos();
        let first_coord: f64 = segments[0]
            .path
            .split_whitespace()
            .nth(1)
            .unwrap()
            .parse()
            .unwrap();
        assert!((first_coord - expected_x).abs() < 1e-6);
    }

    #[test]
    fn unknown_party_gets_fallback_color() {
        assert_eq!(party_color("NOVO"), FALLBACK_COLOR);
        assert_eq!(party_color("PCP"), "#FF0000");
    }
}
