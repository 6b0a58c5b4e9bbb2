use anyhow::Result;
use seace_scraper::core::export::{ExportFormat, ResultExporter};
use seace_scraper::domain::model::{CubsoLookup, Tender, TenderKind};
use seace_scraper::LocalStorage;
use tempfile::TempDir;

fn tenders() -> Vec<Tender> {
    vec![
        Tender {
            code: "LP-SM-3-2025-MDSJL-1".to_string(),
            entity: "MUNICIPALIDAD DISTRITAL DE SAN JUAN DE LURIGANCHO".to_string(),
            description: "Bien: adquisición de computadoras".to_string(),
            kind: TenderKind::Bien,
            published: "28/10/2025 10:15:00".to_string(),
            link: Some(
                "https://prod6.seace.gob.pe/buscador-publico/contrataciones/1098765".to_string(),
            ),
            cubso: CubsoLookup::Found("4321150100001234".to_string()),
        },
        Tender {
            code: "CP-ABR-7-2025-GRL-1".to_string(),
            entity: "GOBIERNO REGIONAL DE LORETO".to_string(),
            description: "Consultoría de obra".to_string(),
            kind: TenderKind::Consultoria,
            published: "27/10/2025 16:40:00".to_string(),
            link: None,
            cubso: CubsoLookup::NoLink,
        },
    ]
}

#[tokio::test]
async fn test_export_writes_json_and_csv() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("output");
    let exporter = ResultExporter::new(LocalStorage::new(&output));

    let files = exporter
        .export(&tenders(), &[ExportFormat::Json, ExportFormat::Csv])
        .await?;
    assert_eq!(files, vec!["tenders.json", "tenders.csv"]);

    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(output.join("tenders.json"))?)?;
    assert_eq!(json["cantidad"], 2);
    assert_eq!(json["resultados"][0]["cubso"], "4321150100001234");
    assert_eq!(json["resultados"][1]["tipo"], "Consultoría");
    assert_eq!(json["resultados"][1]["enlace"], "No disponible");

    let mut reader = csv::Reader::from_path(output.join("tenders.csv"))?;
    let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[1][0], "CP-ABR-7-2025-GRL-1");
    assert_eq!(&rows[1][6], "No enlace");
    Ok(())
}

#[tokio::test]
async fn test_export_empty_result_set() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let exporter = ResultExporter::new(LocalStorage::new(temp_dir.path()));

    exporter.export(&[], &[ExportFormat::Json, ExportFormat::Csv]).await?;

    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(temp_dir.path().join("tenders.json"))?)?;
    assert_eq!(json, serde_json::json!({"cantidad": 0, "resultados": []}));

    let mut reader = csv::Reader::from_path(temp_dir.path().join("tenders.csv"))?;
    assert_eq!(reader.headers()?.len(), 7);
    assert_eq!(reader.records().count(), 0);
    Ok(())
}
