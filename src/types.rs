use anyhow::{anyhow, Result};
use geo::Geometry;
use geojson::GeoJson;
use serde::Deserialize;
use std::fmt;

/// Identity used to match features across snapshots. The stable id is
/// preferred; the display name is the fallback when the backend omits ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OrgKey {
    Id(String),
    Name(String),
}

impl fmt::Display for OrgKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrgKey::Id(id) => write!(f, "{}", id),
            OrgKey::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Properties the core interprets. Everything else the backend sends rides
/// along in `extra` untouched.
#[derive(Debug, Clone, Default)]
pub struct OrgProperties {
    pub organization_id: Option<String>,
    pub organization_name: Option<String>,
    pub color: Option<String>,
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl OrgProperties {
    /// Two-step key resolution: prefer the stable id, fall back to the name.
    /// Features with neither cannot be tracked across snapshots.
    pub fn key(&self) -> Option<OrgKey> {
        if let Some(id) = &self.organization_id {
            return Some(OrgKey::Id(id.clone()));
        }
        self.organization_name.clone().map(OrgKey::Name)
    }

    fn from_map(props: Option<serde_json::Map<String, serde_json::Value>>) -> Self {
        let mut extra = props.unwrap_or_default();

        let organization_id = match extra.remove("organization_id") {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        let organization_name = match extra.remove("organization_name") {
            Some(serde_json::Value::String(s)) => Some(s),
            _ => None,
        };
        let color = match extra.remove("color") {
            Some(serde_json::Value::String(s)) => Some(s),
            _ => None,
        };

        OrgProperties {
            organization_id,
            organization_name,
            color,
            extra,
        }
    }
}

/// One drawable feature of a snapshot: a region (polygon) or a marker (point)
/// for a single organization.
#[derive(Debug, Clone)]
pub struct MapFeature {
    pub properties: OrgProperties,
    pub geometry: Geometry<f64>,
}

/// Map state for one country/category/week: an ordered collection of
/// features, at most one per organization.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub features: Vec<MapFeature>,
}

impl Snapshot {
    pub fn from_geojson(geojson: GeoJson) -> Result<Self> {
        let collection = match geojson {
            GeoJson::FeatureCollection(fc) => fc,
            _ => return Err(anyhow!("Map snapshot must be a FeatureCollection")),
        };

        let mut features = Vec::with_capacity(collection.features.len());

        for feature in collection.features {
            // Features without geometry, or whose geometry cannot be
            // converted, are dropped; one bad feature must not fail the
            // whole snapshot
            let geometry: Geometry<f64> = match feature.geometry {
                Some(geom) => match geom.value.try_into() {
                    Ok(converted) => converted,
                    Err(e) => {
                        tracing::debug!("dropping feature with unconvertible geometry: {:?}", e);
                        continue;
                    }
                },
                None => continue,
            };

            features.push(MapFeature {
                properties: OrgProperties::from_map(feature.properties),
                geometry,
            });
        }

        Ok(Snapshot { features })
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }
}

/// Per-url scan findings inside an organization report.
#[derive(Debug, Clone, Deserialize)]
pub struct UrlReport {
    pub url: String,
    #[serde(default)]
    pub high: u32,
    #[serde(default)]
    pub medium: u32,
    #[serde(default)]
    pub low: u32,
}

/// Scan report for one organization at one week. Rendered as-is; the core
/// does not interpret these fields beyond display.
#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationReport {
    #[serde(default)]
    pub organization_name: Option<String>,
    #[serde(default)]
    pub urls: Vec<UrlReport>,
    #[serde(default)]
    pub high: u32,
    #[serde(default)]
    pub medium: u32,
    #[serde(default)]
    pub low: u32,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub when: Option<String>,
    #[serde(default)]
    pub twitter_handle: Option<String>,
}

/// One row of a top-failing / top-improving ranking.
#[derive(Debug, Clone, Deserialize)]
pub struct RankedOrganization {
    #[serde(default)]
    pub organization_id: Option<i64>,
    pub organization_name: String,
    #[serde(default)]
    pub high: u32,
    #[serde(default)]
    pub medium: u32,
    #[serde(default)]
    pub low: u32,
}

/// Aggregate organization counts per color bucket.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BucketCounts {
    #[serde(default)]
    pub red: u64,
    #[serde(default)]
    pub orange: u64,
    #[serde(default)]
    pub yellow: u64,
    #[serde(default)]
    pub green: u64,
    #[serde(default)]
    pub unknown: u64,
}

/// One row of the vulnerability time series used for charting.
#[derive(Debug, Clone, Deserialize)]
pub struct VulnerabilityPoint {
    pub date: String,
    #[serde(default)]
    pub high: u64,
    #[serde(default)]
    pub medium: u64,
    #[serde(default)]
    pub low: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Snapshot {
        let geojson: GeoJson = json.parse().unwrap();
        Snapshot::from_geojson(geojson).unwrap()
    }

    #[test]
    fn numeric_organization_ids_are_normalized_to_strings() {
        let snapshot = parse(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature",
                 "properties":{"organization_id":42,"organization_name":"Alpha","color":"red"},
                 "geometry":{"type":"Point","coordinates":[4.9,52.3]}}]}"#,
        );
        assert_eq!(snapshot.len(), 1);
        let props = &snapshot.features[0].properties;
        assert_eq!(props.organization_id.as_deref(), Some("42"));
        assert_eq!(props.key(), Some(OrgKey::Id("42".to_string())));
    }

    #[test]
    fn key_falls_back_to_name_when_id_is_absent() {
        let props = OrgProperties {
            organization_name: Some("Beta".to_string()),
            ..Default::default()
        };
        assert_eq!(props.key(), Some(OrgKey::Name("Beta".to_string())));

        let empty = OrgProperties::default();
        assert_eq!(empty.key(), None);
    }

    #[test]
    fn features_without_geometry_are_skipped() {
        let snapshot = parse(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature",
                 "properties":{"organization_id":1},
                 "geometry":null},
                {"type":"Feature",
                 "properties":{"organization_id":2,"color":"green"},
                 "geometry":{"type":"Point","coordinates":[0.0,0.0]}}]}"#,
        );
        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot.features[0].properties.organization_id.as_deref(),
            Some("2")
        );
    }

    #[test]
    fn odd_geometries_do_not_fail_the_snapshot_parse() {
        // One bad feature never aborts the parse; the valid ones survive
        let snapshot = parse(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature",
                 "properties":{"organization_id":1,"color":"red"},
                 "geometry":{"type":"GeometryCollection","geometries":[]}},
                {"type":"Feature",
                 "properties":{"organization_id":2,"color":"green"},
                 "geometry":{"type":"Point","coordinates":[0.0,0.0]}}]}"#,
        );
        assert!(snapshot
            .features
            .iter()
            .any(|f| f.properties.organization_id.as_deref() == Some("2")));
    }

    #[test]
    fn non_collection_geojson_is_rejected() {
        let geojson: GeoJson = r#"{"type":"Point","coordinates":[0.0,0.0]}"#
            .parse()
            .unwrap();
        assert!(Snapshot::from_geojson(geojson).is_err());
    }
}
