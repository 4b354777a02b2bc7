use crate::types::{MapFeature, Snapshot};
use geo::Geometry;

/// Splits a snapshot into region features (Polygon/MultiPolygon) and point
/// features, preserving input order within each list. Regions and points are
/// rendered and interacted with differently. Any other geometry kind is
/// silently dropped.
pub fn partition(snapshot: &Snapshot) -> (Vec<&MapFeature>, Vec<&MapFeature>) {
    let mut regions = Vec::new();
    let mut points = Vec::new();

    for feature in &snapshot.features {
        match &feature.geometry {
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) => regions.push(feature),
            Geometry::Point(_) => points.push(feature),
            _ => {}
        }
    }

    (regions, points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrgProperties;
    use geo::{Geometry, LineString, Point, Polygon};

    fn feature(name: &str, geometry: Geometry<f64>) -> MapFeature {
        MapFeature {
            properties: OrgProperties {
                organization_name: Some(name.to_string()),
                ..Default::default()
            },
            geometry,
        }
    }

    fn square() -> Geometry<f64> {
        Geometry::Polygon(Polygon::new(
            LineString::from(vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]),
            vec![],
        ))
    }

    #[test]
    fn splits_on_geometry_type_preserving_order() {
        let snapshot = Snapshot {
            features: vec![
                feature("a", square()),
                feature("b", Geometry::Point(Point::new(0.5, 0.5))),
                feature("c", square()),
                feature("d", Geometry::Point(Point::new(0.1, 0.1))),
            ],
        };

        let (regions, points) = partition(&snapshot);
        let region_names: Vec<_> = regions
            .iter()
            .map(|f| f.properties.organization_name.as_deref().unwrap())
            .collect();
        let point_names: Vec<_> = points
            .iter()
            .map(|f| f.properties.organization_name.as_deref().unwrap())
            .collect();

        assert_eq!(region_names, vec!["a", "c"]);
        assert_eq!(point_names, vec!["b", "d"]);
    }

    #[test]
    fn other_geometry_kinds_are_dropped() {
        let snapshot = Snapshot {
            features: vec![
                feature("line", Geometry::LineString(LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]))),
                feature("a", square()),
            ],
        };

        let (regions, points) = partition(&snapshot);
        assert_eq!(regions.len(), 1);
        assert!(points.is_empty());
    }

    #[test]
    fn every_polygonal_or_point_feature_lands_in_exactly_one_list() {
        let snapshot = Snapshot {
            features: vec![
                feature("a", square()),
                feature("b", Geometry::Point(Point::new(0.0, 0.0))),
            ],
        };
        let (regions, points) = partition(&snapshot);
        assert_eq!(regions.len() + points.len(), snapshot.len());
    }
}
