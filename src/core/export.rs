use crate::domain::model::{ScrapeResponse, Tender};
use crate::domain::ports::Storage;
use crate::utils::error::{Result, ScrapeError};

pub const SUPPORTED_FORMATS: [&str; 2] = ["json", "csv"];

/// Column names of the CSV export, matching the JSON field names of [`Tender`].
pub const CSV_HEADERS: [&str; 7] = [
    "codigo",
    "entidad",
    "descripcion",
    "tipo",
    "fecha_publicacion",
    "enlace",
    "cubso",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Json => "tenders.json",
            ExportFormat::Csv => "tenders.csv",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(ScrapeError::InvalidConfigValueError {
                field: "formats".to_string(),
                value: other.to_string(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    SUPPORTED_FORMATS.join(", ")
                ),
            }),
        }
    }
}

/// Writes scrape results through a [`Storage`] backend.
pub struct ResultExporter<S: Storage> {
    storage: S,
}

impl<S: Storage> ResultExporter<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Writes one file per format and returns the written file names.
    pub async fn export(&self, tenders: &[Tender], formats: &[ExportFormat]) -> Result<Vec<String>> {
        let mut written = Vec::with_capacity(formats.len());

        for format in formats {
            let data = match format {
                ExportFormat::Json => render_json(tenders)?,
                ExportFormat::Csv => render_csv(tenders)?,
            };
            tracing::debug!("Writing {} ({} bytes)", format.file_name(), data.len());
            self.storage.write_file(format.file_name(), &data).await?;
            written.push(format.file_name().to_string());
        }

        Ok(written)
    }
}

pub fn render_json(tenders: &[Tender]) -> Result<Vec<u8>> {
    let response = ScrapeResponse::from(tenders.to_vec());
    Ok(serde_json::to_vec_pretty(&response)?)
}

/// Renders tenders as CSV; the header row is written even when there are none.
pub fn render_csv(tenders: &[Tender]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;
    for tender in tenders {
        writer.serialize(tender)?;
    }
    writer
        .into_inner()
        .map_err(|e| ScrapeError::IoError(e.into_error()))
}
