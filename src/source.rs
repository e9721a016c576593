//! source.rs — Coleta das quedas na API pública do mapa da PSE
//!
//! O formato bruto da API fica restrito a este módulo; o resto do sistema só
//! enxerga `OutageSet`.

use crate::error::FetchError;
use crate::types::{Coord, OutageSet, PointId, Polygon};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Endpoint da listagem anônima do mapa de quedas.
pub const DEFAULT_UPSTREAM_URL: &str =
    "https://www.pse.com/api/sitecore/OutageMap/AnonymoussMapListView";

/// Fonte de quedas consultada a cada ciclo.
#[async_trait]
pub trait OutageSource: Send + Sync {
    async fn fetch(&self) -> Result<OutageSet, FetchError>;
}

/// Cliente HTTP da API da PSE.
pub struct PseClient {
    client: reqwest::Client,
    url: String,
}

impl PseClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl OutageSource for PseClient {
    async fn fetch(&self) -> Result<OutageSet, FetchError> {
        debug!("GET {}", self.url);
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.bytes().await?;
        parse_outages(&body)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MapListView {
    pse_map: Vec<MapEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MapEntry {
    data_provider: DataProvider,
    #[serde(default)]
    polygon: Vec<Vertex>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DataProvider {
    point_of_interest: PointOfInterest,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PointOfInterest {
    id: PointId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Vertex {
    latitude: Decimal,
    longitude: Decimal,
}

/// A API manda coordenadas como texto decimal; números também são aceitos.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Decimal {
    Text(String),
    Number(f64),
}

impl Decimal {
    fn parse(&self, limit: f64, field: &str) -> Result<f64, FetchError> {
        let value = match self {
            Decimal::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| FetchError::Parse(format!("{field} inválida: {s:?}")))?,
            Decimal::Number(n) => *n,
        };
        if !value.is_finite() || value.abs() > limit {
            return Err(FetchError::Parse(format!("{field} fora do intervalo: {value}")));
        }
        Ok(value)
    }
}

/// Converte o corpo da resposta num `OutageSet`.
///
/// Ids repetidos ficam com o último polígono recebido.
pub fn parse_outages(body: &[u8]) -> Result<OutageSet, FetchError> {
    let view: MapListView =
        serde_json::from_slice(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    let mut outages = OutageSet::with_capacity(view.pse_map.len());
    for entry in view.pse_map {
        let polygon = entry
            .polygon
            .iter()
            .map(|v| {
                Ok(Coord {
                    lat: v.latitude.parse(90.0, "latitude")?,
                    lng: v.longitude.parse(180.0, "longitude")?,
                })
            })
            .collect::<Result<Polygon, FetchError>>()?;
        outages.insert(entry.data_provider.point_of_interest.id, polygon);
    }
    Ok(outages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_map_list_view() {
        let body = br#"{
            "PseMap": [
                {
                    "DataProvider": { "PointOfInterest": { "Id": "7001", "Title": "Bellevue" } },
                    "Polygon": [
                        { "Latitude": "47.61", "Longitude": "-122.20" },
                        { "Latitude": " 47.62 ", "Longitude": "-122.21" }
                    ]
                },
                {
                    "DataProvider": { "PointOfInterest": { "Id": 7002 } },
                    "Polygon": []
                }
            ]
        }"#;

        let outages = parse_outages(body).unwrap();
        assert_eq!(outages.len(), 2);
        assert_eq!(
            outages[&PointId::new("7001")],
            vec![
                Coord { lat: 47.61, lng: -122.20 },
                Coord { lat: 47.62, lng: -122.21 }
            ]
        );
        assert!(outages[&PointId::new("7002")].is_empty());
    }

    #[test]
    fn empty_map_is_an_empty_set() {
        assert!(parse_outages(br#"{"PseMap": []}"#).unwrap().is_empty());
    }

    #[test]
    fn non_numeric_coordinate_is_a_parse_error() {
        let body = br#"{"PseMap": [{
            "DataProvider": { "PointOfInterest": { "Id": "1" } },
            "Polygon": [{ "Latitude": "abc", "Longitude": "-122.2" }]
        }]}"#;
        assert!(matches!(parse_outages(body), Err(FetchError::Parse(_))));
    }

    #[test]
    fn out_of_range_coordinate_is_a_parse_error() {
        let body = br#"{"PseMap": [{
            "DataProvider": { "PointOfInterest": { "Id": "1" } },
            "Polygon": [{ "Latitude": "91.0", "Longitude": "-122.2" }]
        }]}"#;
        assert!(matches!(parse_outages(body), Err(FetchError::Parse(_))));
    }

    #[test]
    fn unexpected_shape_is_a_parse_error() {
        assert!(matches!(
            parse_outages(b"<html>manutencao</html>"),
            Err(FetchError::Parse(_))
        ));
        assert!(matches!(
            parse_outages(br#"{"Outages": []}"#),
            Err(FetchError::Parse(_))
        ));
    }
}
