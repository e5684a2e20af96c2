//! Raw JSON shapes as the Viriato API returns them. Initiative payloads keep
//! the Parliament's original PascalCase field names; the flattened endpoints
//! (committees, deputies, search) are already snake_case. Conversion to the
//! domain models happens in `fetch`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fields that arrive as either a single object or an array depending on how
/// many entries the upstream XML had.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(x) => vec![x],
            OneOrMany::Many(xs) => xs,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiInitiativeEvent {
    #[serde(rename = "Fase", default)]
    pub fase: String,
    #[serde(rename = "DataFase", default)]
    pub data_fase: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiParliamentaryGroup {
    #[serde(rename = "GP", default)]
    pub gp: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiOtherAuthor {
    #[serde(default)]
    pub nome: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiInitiative {
    #[serde(rename = "IniId")]
    pub ini_id: i64,
    #[serde(rename = "IniNr", default)]
    pub ini_nr: i64,
    #[serde(rename = "IniTipo", default)]
    pub ini_tipo: String,
    #[serde(rename = "IniDescTipo", default)]
    pub ini_desc_tipo: String,
    #[serde(rename = "IniTitulo", default)]
    pub ini_titulo: String,
    #[serde(rename = "IniLeg", default)]
    pub ini_leg: String,
    #[serde(rename = "DataInicioleg", default)]
    pub data_inicio_leg: String,
    #[serde(rename = "IniEventos", default)]
    pub ini_eventos: Vec<ApiInitiativeEvent>,
    #[serde(rename = "IniAutorGruposParlamentares", default)]
    pub ini_autor_grupos: Option<OneOrMany<ApiParliamentaryGroup>>,
    #[serde(rename = "IniAutorOutros", default)]
    pub ini_autor_outros: Option<ApiOtherAuthor>,
    #[serde(rename = "IniLinkTexto", default)]
    pub ini_link_texto: Option<String>,
    // Derived fields the backend precomputes: the phase of the most recent
    // event, and whether the initiative reached a terminal state.
    #[serde(rename = "_currentStatus", default)]
    pub current_status: Option<String>,
    #[serde(rename = "_isCompleted", default)]
    pub is_completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiAgendaEvent {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Subtitle", default)]
    pub subtitle: String,
    #[serde(rename = "EventStartDate", default)]
    pub event_start_date: String, // DD/MM/YYYY
    #[serde(rename = "EventEndDate", default)]
    pub event_end_date: String,
    #[serde(rename = "EventStartTime", default)]
    pub event_start_time: String, // empty on all-day events
    #[serde(rename = "EventEndTime", default)]
    pub event_end_time: String,
    #[serde(rename = "Local", default)]
    pub local: String,
    #[serde(rename = "Theme", default)]
    pub theme: String,
    #[serde(rename = "Section", default)]
    pub section: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCommittee {
    pub org_id: i64,
    pub name: String,
    pub total_members: u32,
    #[serde(default)]
    pub parties: BTreeMap<String, u32>,
    #[serde(default)]
    pub ini_authored: u32,
    #[serde(default)]
    pub ini_in_progress: u32,
    #[serde(default)]
    pub ini_approved: u32,
    #[serde(default)]
    pub ini_rejected: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiLinkedInitiative {
    pub ini_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub type_code: String,
    #[serde(default)]
    pub type_description: String,
    #[serde(default)]
    pub number: Option<i64>,
    #[serde(default)]
    pub current_status: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCommitteeInitiative {
    pub initiative: ApiLinkedInitiative,
    #[serde(default)]
    pub link_type: String, // "lead" | "secondary"
    #[serde(default)]
    pub has_vote: bool,
    #[serde(default)]
    pub vote_result: Option<String>,
    #[serde(default)]
    pub has_rapporteur: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCommitteeDetail {
    #[serde(default)]
    pub initiatives: Vec<ApiCommitteeInitiative>,
    #[serde(default)]
    pub agenda_events: Vec<ApiAgendaEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMembership {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub acronym: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiDeputy {
    pub dep_id: i64,
    pub name: String,
    #[serde(default)]
    pub party: String,
    #[serde(default)]
    pub circulo: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub comissoes: Vec<ApiMembership>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiDeputiesSummary {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub party_composition: BTreeMap<String, u32>,
    #[serde(default)]
    pub gender_breakdown: BTreeMap<String, u32>,
    #[serde(default)]
    pub circulo_breakdown: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiDeputiesResponse {
    #[serde(default)]
    pub deputados: Vec<ApiDeputy>,
    #[serde(default)]
    pub summary: ApiDeputiesSummary,
}

/// Full-text search returns ranked matches; only the id is needed to recover
/// the full initiative from the already-loaded dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSearchResult {
    pub ini_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_or_many_accepts_both_shapes() {
        let one: OneOrMany<ApiParliamentaryGroup> =
            serde_json::from_str(r#"{"GP": "PS"}"#).unwrap();
        assert_eq!(one.into_vec().len(), 1);

        let many: OneOrMany<ApiParliamentaryGroup> =
            serde_json::from_str(r#"[{"GP": "PS"}, {"GP": "BE"}]"#).unwrap();
        assert_eq!(many.into_vec().len(), 2);
    }

    #[test]
    fn initiative_tolerates_missing_optional_fields() {
        let ini: ApiInitiative = serde_json::from_str(
            r#"{"IniId": 7, "IniTitulo": "Teste", "IniTipo": "J"}"#,
        )
        .unwrap();
        assert_eq!(ini.ini_id, 7);
        assert!(ini.ini_eventos.is_empty());
        assert!(ini.ini_autor_grupos.is_none());
        assert!(!ini.is_completed);
    }
}
