use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// The 7 simplified categories the 60+ raw legislative phases map onto,
/// in funnel display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    Submitted,
    Announced,
    Discussion,
    Voting,
    Finalizing,
    Approved,
    Rejected,
}

impl StatusCategory {
    pub const ALL: [StatusCategory; 7] = [
        StatusCategory::Submitted,
        StatusCategory::Announced,
        StatusCategory::Discussion,
        StatusCategory::Voting,
        StatusCategory::Finalizing,
        StatusCategory::Approved,
        StatusCategory::Rejected,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatusCategory::Submitted => "Submetida",
            StatusCategory::Announced => "Anunciada",
            StatusCategory::Discussion => "Em discussão",
            StatusCategory::Voting => "Em votação",
            StatusCategory::Finalizing => "A finalizar",
            StatusCategory::Approved => "Aprovada",
            StatusCategory::Rejected => "Rejeitada",
        }
    }

    /// Stable machine-readable identifier used as the JSON key for this
    /// category in exported bundles.
    pub fn key(self) -> &'static str {
        match self {
            StatusCategory::Submitted => "submitted",
            StatusCategory::Announced => "announced",
            StatusCategory::Discussion => "discussion",
            StatusCategory::Voting => "voting",
            StatusCategory::Finalizing => "finalizing",
            StatusCategory::Approved => "approved",
            StatusCategory::Rejected => "rejected",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            StatusCategory::Submitted => "status-submitted",
            StatusCategory::Announced => "status-announced",
            StatusCategory::Discussion => "status-discussion",
            StatusCategory::Voting => "status-voting",
            StatusCategory::Finalizing => "status-finalizing",
            StatusCategory::Approved => "status-approved",
            StatusCategory::Rejected => "status-rejected",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            StatusCategory::Submitted => "#9ca3af",
            StatusCategory::Announced => "#38bdf8",
            StatusCategory::Discussion => "#3b82f6",
            StatusCategory::Voting => "#f97316",
            StatusCategory::Finalizing => "#8b5cf6",
            StatusCategory::Approved => "#10b981",
            StatusCategory::Rejected => "#ef4444",
        }
    }

    /// Position in the legislative process, used for "most advanced first" sorting.
    pub fn progress_rank(self) -> usize {
        Self::ALL.iter().position(|&c| c == self).unwrap_or(0)
    }
}

/// Classification result: the category plus the label actually displayed,
/// which for the catch-all fallback differs from the category's own label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusInfo {
    pub category: StatusCategory,
    pub label: &'static str,
    pub css_class: &'static str,
    pub color: &'static str,
}

impl StatusInfo {
    fn of(category: StatusCategory) -> Self {
        StatusInfo {
            category,
            label: category.label(),
            css_class: category.css_class(),
            color: category.color(),
        }
    }
}

/// Lowercase and strip combining marks, so accented and unaccented upstream
/// spellings ("Votação" / "Votacao") match the same patterns.
pub fn fold_text(s: &str) -> String {
    s.nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

// Substring rules tested in order, first match wins. The precedence matters:
// "votação" appears inside several finalizing-stage phase names, and
// "publicação" alone is an initial-stage marker but the "(publicacao dr)"
// compounds are terminal.
const RULES: &[(&[&str], StatusCategory)] = &[
    (
        &[
            "lei (publicacao dr)",
            "resolucao da ar (publicacao dr)",
            "deliberacao (publicacao dr)",
        ],
        StatusCategory::Approved,
    ),
    (&["rejeitad", "retirada", "caducad"], StatusCategory::Rejected),
    (
        &[
            "promulgacao",
            "referenda",
            "redacao final",
            "redaccao final",
            "envio incm",
            "decreto (publicacao)",
            "resolucao (publicacao dar)",
            "envio a comissao para fixacao",
        ],
        StatusCategory::Finalizing,
    ),
    (&["votacao"], StatusCategory::Voting),
    (
        &["discussao", "apreciacao", "parecer"],
        StatusCategory::Discussion,
    ),
    (
        &["anuncio", "baixa comissao", "separata"],
        StatusCategory::Announced,
    ),
    (
        &["entrada", "publicacao", "admissao"],
        StatusCategory::Submitted,
    ),
];

/// Map a free-text phase name to its simplified category. Total: absent,
/// empty and unknown inputs all resolve to a category, never an error.
pub fn classify(phase: Option<&str>) -> StatusInfo {
    let phase = match phase {
        Some(p) if !p.is_empty() && p != "Desconhecido" => p,
        _ => return StatusInfo::of(StatusCategory::Submitted),
    };

    let folded = fold_text(phase);
    for (patterns, category) in RULES {
        if patterns.iter().any(|p| folded.contains(p)) {
            return StatusInfo::of(*category);
        }
    }

    // Unknown active phase. Kept as a distinct label on purpose: these are
    // initiatives somewhere mid-process whose phase vocabulary we have not
    // mapped yet.
    StatusInfo {
        category: StatusCategory::Announced,
        label: "Em progresso",
        css_class: StatusCategory::Announced.css_class(),
        color: StatusCategory::Announced.color(),
    }
}
