use crate::utils::error::{Result, ScrapeError};
use crate::utils::validation::parse_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};

/// Placeholder SEACE-facing clients expect when a tender has no detail link.
pub const NO_LINK: &str = "No disponible";

pub const DEFAULT_MAX_RESULTS: usize = 2000;

/// Body of `POST /scrape`. Field names follow the existing n8n integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeRequest {
    #[serde(rename = "fecha_inicio")]
    pub start_date: String,
    #[serde(rename = "fecha_fin")]
    pub end_date: String,
    #[serde(rename = "max_resultados", default = "default_max_results")]
    pub max_results: usize,
    #[serde(rename = "incluir_cubso", default)]
    pub include_cubso: bool,
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

impl ScrapeRequest {
    pub fn to_query(&self) -> Result<TenderQuery> {
        let start = parse_date(&self.start_date)?;
        let end = parse_date(&self.end_date)?;
        Ok(TenderQuery {
            range: DateRange::new(start, end),
            max_results: self.max_results,
            include_cubso: self.include_cubso,
        })
    }
}

/// Inclusive range of publication dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%d/%m/%Y"),
            self.end.format("%d/%m/%Y")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenderQuery {
    pub range: DateRange,
    pub max_results: usize,
    pub include_cubso: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TenderKind {
    Bien,
    Servicio,
    Obra,
    #[serde(rename = "Consultoría")]
    Consultoria,
    Otro,
}

impl TenderKind {
    /// Classifies a tender from its description prefix.
    pub fn classify(description: &str) -> Self {
        let d = description.to_lowercase();
        if d.starts_with("bien:") {
            TenderKind::Bien
        } else if d.starts_with("servicio:") {
            TenderKind::Servicio
        } else if d.starts_with("obra:") {
            TenderKind::Obra
        } else if d.contains("consultor") {
            TenderKind::Consultoria
        } else {
            TenderKind::Otro
        }
    }
}

/// Outcome of looking up the CUBSO catalogue code on a tender's detail page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CubsoLookup {
    #[default]
    NotRequested,
    Found(String),
    NotFound,
    NoLink,
    Failed,
}

impl CubsoLookup {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CubsoLookup::NotRequested => None,
            CubsoLookup::Found(code) => Some(code),
            CubsoLookup::NotFound => Some("No encontrado"),
            CubsoLookup::NoLink => Some("No enlace"),
            CubsoLookup::Failed => Some("Error"),
        }
    }
}

impl Serialize for CubsoLookup {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.as_str() {
            Some(value) => serializer.serialize_str(value),
            None => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tender {
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "entidad")]
    pub entity: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "tipo")]
    pub kind: TenderKind,
    #[serde(rename = "fecha_publicacion")]
    pub published: String,
    #[serde(rename = "enlace", serialize_with = "serialize_link")]
    pub link: Option<String>,
    pub cubso: CubsoLookup,
}

fn serialize_link<S: Serializer>(
    link: &Option<String>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(link.as_deref().unwrap_or(NO_LINK))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeResponse {
    #[serde(rename = "cantidad")]
    pub count: usize,
    #[serde(rename = "resultados")]
    pub results: Vec<Tender>,
}

impl From<Vec<Tender>> for ScrapeResponse {
    fn from(results: Vec<Tender>) -> Self {
        Self {
            count: results.len(),
            results,
        }
    }
}

impl TryFrom<&ScrapeRequest> for TenderQuery {
    type Error = ScrapeError;

    fn try_from(request: &ScrapeRequest) -> Result<Self> {
        request.to_query()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32, m: u32, y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_request_defaults() {
        let request: ScrapeRequest = serde_json::from_value(serde_json::json!({
            "fecha_inicio": "27/10/2025",
            "fecha_fin": "02/11/2025"
        }))
        .unwrap();

        assert_eq!(request.max_results, 2000);
        assert!(!request.include_cubso);

        let query = request.to_query().unwrap();
        assert_eq!(query.range, DateRange::new(date(27, 10, 2025), date(2, 11, 2025)));
    }

    #[test]
    fn test_request_rejects_bad_end_date() {
        let request = ScrapeRequest {
            start_date: "27/10/2025".to_string(),
            end_date: "2025/11/02".to_string(),
            max_results: 10,
            include_cubso: true,
        };
        assert!(matches!(
            TenderQuery::try_from(&request),
            Err(ScrapeError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let range = DateRange::new(date(27, 10, 2025), date(2, 11, 2025));
        assert!(range.contains(date(27, 10, 2025)));
        assert!(range.contains(date(2, 11, 2025)));
        assert!(!range.contains(date(26, 10, 2025)));
        assert!(!range.contains(date(3, 11, 2025)));
        assert_eq!(range.to_string(), "27/10/2025 - 02/11/2025");
    }

    #[test]
    fn test_classify_by_prefix() {
        assert_eq!(TenderKind::classify("BIEN: computadoras"), TenderKind::Bien);
        assert_eq!(TenderKind::classify("Servicio: limpieza"), TenderKind::Servicio);
        assert_eq!(TenderKind::classify("obra: puente"), TenderKind::Obra);
        assert_eq!(
            TenderKind::classify("Servicio de consultoría de obra"),
            TenderKind::Consultoria
        );
        assert_eq!(TenderKind::classify("Suministro de agua"), TenderKind::Otro);
        assert_eq!(TenderKind::classify(""), TenderKind::Otro);
    }

    #[test]
    fn test_tender_wire_format() {
        let tender = Tender {
            code: "LP-1-2025".to_string(),
            entity: "MUNICIPALIDAD".to_string(),
            description: "Consultoría de obra".to_string(),
            kind: TenderKind::Consultoria,
            published: "28/10/2025 10:15:00".to_string(),
            link: None,
            cubso: CubsoLookup::NotRequested,
        };

        let json = serde_json::to_value(&tender).unwrap();
        assert_eq!(json["codigo"], "LP-1-2025");
        assert_eq!(json["tipo"], "Consultoría");
        assert_eq!(json["enlace"], "No disponible");
        assert!(json["cubso"].is_null());
    }

    #[test]
    fn test_cubso_wire_values() {
        let as_json = |lookup: CubsoLookup| serde_json::to_value(lookup).unwrap();
        assert_eq!(as_json(CubsoLookup::Found("4321150100001234".into())), "4321150100001234");
        assert_eq!(as_json(CubsoLookup::NotFound), "No encontrado");
        assert_eq!(as_json(CubsoLookup::NoLink), "No enlace");
        assert_eq!(as_json(CubsoLookup::Failed), "Error");
    }

    #[test]
    fn test_response_counts_results() {
        let response = ScrapeResponse::from(Vec::new());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({"cantidad": 0, "resultados": []}));
    }
}
