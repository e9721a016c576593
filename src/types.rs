use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identificador opaco do ponto de interesse afetado por uma queda.
///
/// A API pode mandar texto ou número; os dois viram a mesma chave de texto.
/// Nunca é interpretado, só comparado.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PointId(String);

impl PointId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PointId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => PointId(s),
            Raw::Number(n) => PointId(n.to_string()),
        })
    }
}

/// Vértice de um polígono (graus decimais).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lng: f64,
}

/// Sequência ordenada de vértices, mantida exatamente como veio (pode ser vazia).
pub type Polygon = Vec<Coord>;

/// Estado completo de um ciclo de coleta: id → polígono.
pub type OutageSet = HashMap<PointId, Polygon>;

/// Snapshot do "início do dia" usado como referência de comparação.
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    pub outages: OutageSet,
    pub date: NaiveDate,
}

/// Uma queda como é entregue ao cliente do mapa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outage {
    pub id: PointId,
    pub coords: Polygon,
}

/// Resultado da comparação do estado atual com o baseline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Presentes agora, ausentes do baseline.
    pub added: Vec<Outage>,
    /// Presentes no baseline, ausentes agora.
    pub ended: Vec<Outage>,
    /// Presentes nos dois (polígono atual).
    pub existing: Vec<Outage>,
}
