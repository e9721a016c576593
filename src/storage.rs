use crate::error::{LoadError, PersistError};
use crate::types::{Baseline, PointId, Polygon};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Formato de data do arquivo de estado (en-US, ex.: "10/18/2026").
const DATE_FORMAT: &str = "%-m/%-d/%Y";
const DATE_PARSE_FORMAT: &str = "%m/%d/%Y";

/// Registro gravado em disco.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotFile {
    initial_outages: Vec<(PointId, Polygon)>,
    last_reset_date: String,
}

/// Persistência do baseline num único arquivo JSON.
///
/// Cada gravação sobrescreve o arquivo inteiro. Não há garantia transacional:
/// uma queda do processo no meio da escrita pode perder o estado anterior.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Carrega o baseline salvo. Qualquer falha vira `None`.
    pub async fn load(&self) -> Option<Baseline> {
        match self.try_load().await {
            Ok(Some(baseline)) => {
                info!(
                    "Baseline carregado de {}: {} quedas, dia {}",
                    self.path.display(),
                    baseline.outages.len(),
                    baseline.date
                );
                Some(baseline)
            }
            Ok(None) => {
                info!("Nenhum snapshot em {}, iniciando sem baseline", self.path.display());
                None
            }
            Err(e) => {
                warn!(
                    "Ignorando snapshot ilegível em {}: {}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    async fn try_load(&self) -> Result<Option<Baseline>, LoadError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let file: SnapshotFile = serde_json::from_slice(&bytes)?;
        let date = NaiveDate::parse_from_str(&file.last_reset_date, DATE_PARSE_FORMAT)
            .map_err(|_| LoadError::Date(file.last_reset_date.clone()))?;
        Ok(Some(Baseline {
            outages: file.initial_outages.into_iter().collect(),
            date,
        }))
    }

    /// Grava o baseline, substituindo o arquivo inteiro.
    pub async fn save(&self, baseline: &Baseline) -> Result<(), PersistError> {
        let mut initial_outages: Vec<(PointId, Polygon)> = baseline
            .outages
            .iter()
            .map(|(id, coords)| (id.clone(), coords.clone()))
            .collect();
        initial_outages.sort_by(|a, b| a.0.cmp(&b.0));

        let file = SnapshotFile {
            initial_outages,
            last_reset_date: baseline.date.format(DATE_FORMAT).to_string(),
        };
        let json = serde_json::to_vec(&file)?;
        tokio::fs::write(&self.path, json).await?;
        debug!(
            "Snapshot gravado em {} ({} quedas)",
            self.path.display(),
            baseline.outages.len()
        );
        Ok(())
    }
}
