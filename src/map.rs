use crate::color::{classify, color_code, marker_icon, MarkerIcon};
use crate::partition::partition;
use crate::types::{MapFeature, OrgKey, OrgProperties, Snapshot};
use geo::algorithm::bounding_rect::BoundingRect;
use geo::algorithm::contains::Contains;
use geo::{Coord, Geometry, Point, Rect};
use rstar::{RTree, RTreeObject, AABB};
use std::collections::{HashMap, HashSet};

const REGION_BORDER_WEIGHT: f32 = 1.0;
const HOVER_BORDER_WEIGHT: f32 = 3.0;

/// Handle to one drawable object on the rendering surface. Assigned by the
/// backend; a fresh id means a fresh layer instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

/// Interaction state per rendered layer. Dimming is orthogonal to this and
/// lives on the layer as a style flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Idle,
    Hovered,
    Selected,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerStyle {
    Region {
        fill: &'static str,
        border_weight: f32,
        dimmed: bool,
    },
    Marker {
        icon: MarkerIcon,
        dimmed: bool,
    },
}

/// The rendering surface the map state draws on. Real embedders wrap an
/// actual map widget; tests and the dry-run CLI use `RecordingBackend`.
pub trait RenderBackend {
    fn add_feature_layer(&mut self, feature: &MapFeature, style: &LayerStyle) -> LayerId;
    fn remove_layer(&mut self, id: LayerId);
    fn restyle_layer(&mut self, id: LayerId, style: &LayerStyle);
    fn bring_to_front(&mut self, id: LayerId);
    fn fit_bounds(&mut self, bounds: Rect<f64>);
}

/// One rendered layer: the feature it draws plus its interaction state.
#[derive(Debug, Clone)]
pub struct Layer {
    pub id: LayerId,
    pub feature: MapFeature,
    pub interaction: Interaction,
    pub dimmed: bool,
}

// Wrapper for RTree hit-testing of region layers
struct LayerEnvelope {
    key: OrgKey,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for LayerEnvelope {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

/// Owns the rendered layer set exclusively and keeps it consistent with the
/// latest snapshot without tearing the whole layer collection down.
pub struct MapState<B: RenderBackend> {
    backend: B,
    layers: HashMap<OrgKey, Layer>,
    search: Option<String>,
    spatial: Option<RTree<LayerEnvelope>>,
    loaded: bool,
}

impl<B: RenderBackend> MapState<B> {
    pub fn new(backend: B) -> Self {
        MapState {
            backend,
            layers: HashMap::new(),
            search: None,
            spatial: None,
            loaded: false,
        }
    }

    /// First plot: one layer per keyed feature, then fit the viewport to the
    /// bounding box of all region layers.
    pub fn initial_load(&mut self, snapshot: &Snapshot) {
        let (regions, points) = partition(snapshot);
        for feature in regions.into_iter().chain(points.into_iter()) {
            self.add_layer(feature);
        }
        if let Some(bounds) = self.region_bounds() {
            self.backend.fit_bounds(bounds);
        }
        self.loaded = true;
    }

    /// Merges a new snapshot into the live layer set: additions first, then
    /// removals, then in-place updates. Afterwards the rendered keys match
    /// the snapshot keys exactly; layers whose geometry did not change keep
    /// their identity.
    pub fn reconcile(&mut self, snapshot: &Snapshot) {
        self.spatial = None;

        let (regions, points) = partition(snapshot);
        let mut index: HashMap<OrgKey, &MapFeature> = HashMap::new();
        for feature in regions.into_iter().chain(points.into_iter()) {
            if let Some(key) = feature.properties.key() {
                index.entry(key).or_insert(feature);
            }
        }

        // Addition pass
        let mut added: HashSet<OrgKey> = HashSet::new();
        for (key, &feature) in &index {
            if !self.layers.contains_key(key) {
                self.add_layer(feature);
                added.insert(key.clone());
            }
        }

        // Removal pass
        let stale: Vec<OrgKey> = self
            .layers
            .keys()
            .filter(|key| !index.contains_key(*key))
            .cloned()
            .collect();
        for key in stale {
            if let Some(layer) = self.layers.remove(&key) {
                self.backend.remove_layer(layer.id);
            }
        }

        // Update pass
        for (key, &fresh) in &index {
            if added.contains(key) {
                continue;
            }
            let geometry_unchanged = match self.layers.get(key) {
                Some(layer) => layer.feature.geometry == fresh.geometry,
                None => continue,
            };

            if geometry_unchanged {
                // Color-only change: restyle in place, identity preserved
                let dimmed = dimmed_for(self.search.as_deref(), fresh);
                if let Some(layer) = self.layers.get_mut(key) {
                    layer.feature = fresh.clone();
                    layer.dimmed = dimmed;
                    let hovered = layer.interaction == Interaction::Hovered;
                    let style = style_for(&layer.feature, hovered, dimmed);
                    self.backend.restyle_layer(layer.id, &style);
                }
            } else {
                // Geometry replacement is not supported in place
                if let Some(old) = self.layers.remove(key) {
                    self.backend.remove_layer(old.id);
                }
                self.add_layer(fresh);
            }
        }
    }

    fn add_layer(&mut self, feature: &MapFeature) {
        // Unkeyed features cannot be matched on the next snapshot; skip them
        let Some(key) = feature.properties.key() else {
            return;
        };
        if self.layers.contains_key(&key) {
            return;
        }
        let dimmed = dimmed_for(self.search.as_deref(), feature);
        let style = style_for(feature, false, dimmed);
        let id = self.backend.add_feature_layer(feature, &style);
        self.spatial = None;
        self.layers.insert(
            key,
            Layer {
                id,
                feature: feature.clone(),
                interaction: Interaction::Idle,
                dimmed,
            },
        );
    }

    /// Pointer entered a layer: emphasize it (and raise regions to front) and
    /// hand its properties to the caller for the info panel.
    pub fn pointer_enter(&mut self, key: &OrgKey) -> Option<&OrgProperties> {
        if let Some(layer) = self.layers.get_mut(key) {
            if layer.interaction == Interaction::Idle {
                layer.interaction = Interaction::Hovered;
                let style = style_for(&layer.feature, true, layer.dimmed);
                let id = layer.id;
                let is_region = matches!(
                    layer.feature.geometry,
                    Geometry::Polygon(_) | Geometry::MultiPolygon(_)
                );
                self.backend.restyle_layer(id, &style);
                if is_region {
                    self.backend.bring_to_front(id);
                }
            }
        }
        self.layers.get(key).map(|layer| &layer.feature.properties)
    }

    pub fn pointer_leave(&mut self, key: &OrgKey) {
        if let Some(layer) = self.layers.get_mut(key) {
            if layer.interaction == Interaction::Hovered {
                layer.interaction = Interaction::Idle;
                let style = style_for(&layer.feature, false, layer.dimmed);
                self.backend.restyle_layer(layer.id, &style);
            }
        }
    }

    /// Click selects the layer's organization. At most one layer is selected
    /// at a time; the previous selection drops back to idle.
    pub fn click(&mut self, key: &OrgKey) -> Option<OrgKey> {
        if !self.layers.contains_key(key) {
            return None;
        }
        let previous: Option<OrgKey> = self
            .layers
            .iter()
            .find(|(k, layer)| layer.interaction == Interaction::Selected && *k != key)
            .map(|(k, _)| (*k).clone());
        if let Some(prev_key) = previous {
            if let Some(layer) = self.layers.get_mut(&prev_key) {
                layer.interaction = Interaction::Idle;
                let style = style_for(&layer.feature, false, layer.dimmed);
                self.backend.restyle_layer(layer.id, &style);
            }
        }
        if let Some(layer) = self.layers.get_mut(key) {
            layer.interaction = Interaction::Selected;
            let style = style_for(&layer.feature, false, layer.dimmed);
            self.backend.restyle_layer(layer.id, &style);
        }
        Some(key.clone())
    }

    /// Re-evaluates dimming across all layers. Pure style overlay: no layer
    /// is added or removed here.
    pub fn apply_search(&mut self, query: &str) {
        let query = query.trim();
        self.search = if query.is_empty() {
            None
        } else {
            Some(query.to_string())
        };
        let search = self.search.clone();
        for layer in self.layers.values_mut() {
            let dimmed = dimmed_for(search.as_deref(), &layer.feature);
            if dimmed != layer.dimmed {
                layer.dimmed = dimmed;
                let hovered = layer.interaction == Interaction::Hovered;
                let style = style_for(&layer.feature, hovered, dimmed);
                self.backend.restyle_layer(layer.id, &style);
            }
        }
    }

    /// Resolves a pointer coordinate to the region layer under it. Bounding
    /// boxes narrow the candidates, exact containment decides.
    pub fn hit_test(&mut self, lon: f64, lat: f64) -> Option<OrgKey> {
        if self.spatial.is_none() {
            self.spatial = Some(self.build_spatial_index());
        }
        let tree = self.spatial.as_ref()?;

        let point = Point::new(lon, lat);
        let envelope = AABB::from_point([lon, lat]);
        for candidate in tree.locate_in_envelope_intersecting(&envelope) {
            let contains = match self.layers.get(&candidate.key).map(|l| &l.feature.geometry) {
                Some(Geometry::Polygon(p)) => p.contains(&point),
                Some(Geometry::MultiPolygon(mp)) => mp.contains(&point),
                _ => false,
            };
            if contains {
                return Some(candidate.key.clone());
            }
        }
        None
    }

    fn build_spatial_index(&self) -> RTree<LayerEnvelope> {
        let items: Vec<LayerEnvelope> = self
            .layers
            .iter()
            .filter_map(|(key, layer)| {
                let rect = match &layer.feature.geometry {
                    Geometry::Polygon(p) => p.bounding_rect(),
                    Geometry::MultiPolygon(mp) => mp.bounding_rect(),
                    _ => None,
                }?;
                Some(LayerEnvelope {
                    key: key.clone(),
                    aabb: AABB::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                })
            })
            .collect();
        RTree::bulk_load(items)
    }

    fn region_bounds(&self) -> Option<Rect<f64>> {
        let mut bounds: Option<Rect<f64>> = None;
        for layer in self.layers.values() {
            let rect = match &layer.feature.geometry {
                Geometry::Polygon(p) => p.bounding_rect(),
                Geometry::MultiPolygon(mp) => mp.bounding_rect(),
                _ => None,
            };
            if let Some(rect) = rect {
                bounds = Some(match bounds {
                    Some(acc) => union_rect(acc, rect),
                    None => rect,
                });
            }
        }
        bounds
    }

    pub fn layer(&self, key: &OrgKey) -> Option<&Layer> {
        self.layers.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &OrgKey> {
        self.layers.keys()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

fn style_for(feature: &MapFeature, hovered: bool, dimmed: bool) -> LayerStyle {
    let bucket = classify(feature.properties.color.as_deref());
    match feature.geometry {
        Geometry::Point(_) => LayerStyle::Marker {
            icon: marker_icon(bucket),
            dimmed,
        },
        _ => LayerStyle::Region {
            fill: color_code(bucket),
            border_weight: if hovered {
                HOVER_BORDER_WEIGHT
            } else {
                REGION_BORDER_WEIGHT
            },
            dimmed,
        },
    }
}

fn dimmed_for(search: Option<&str>, feature: &MapFeature) -> bool {
    let Some(query) = search else {
        return false;
    };
    match &feature.properties.organization_name {
        Some(name) => !name.to_lowercase().contains(&query.to_lowercase()),
        None => true,
    }
}

fn union_rect(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        Coord {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}

/// Backend that records every draw call instead of rendering. Used by the
/// `timeline` dry-run command and by the test suite.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    next_id: u64,
    pub ops: Vec<RenderOp>,
    pub styles: HashMap<LayerId, LayerStyle>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderOp {
    Add(LayerId),
    Remove(LayerId),
    Restyle(LayerId),
    BringToFront(LayerId),
    FitBounds(Rect<f64>),
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// (adds, removes, restyles) recorded since the given op index.
    pub fn churn_since(&self, mark: usize) -> (usize, usize, usize) {
        let mut adds = 0;
        let mut removes = 0;
        let mut restyles = 0;
        for op in &self.ops[mark..] {
            match op {
                RenderOp::Add(_) => adds += 1,
                RenderOp::Remove(_) => removes += 1,
                RenderOp::Restyle(_) => restyles += 1,
                _ => {}
            }
        }
        (adds, removes, restyles)
    }
}

impl RenderBackend for RecordingBackend {
    fn add_feature_layer(&mut self, _feature: &MapFeature, style: &LayerStyle) -> LayerId {
        self.next_id += 1;
        let id = LayerId(self.next_id);
        self.ops.push(RenderOp::Add(id));
        self.styles.insert(id, style.clone());
        id
    }

    fn remove_layer(&mut self, id: LayerId) {
        self.ops.push(RenderOp::Remove(id));
        self.styles.remove(&id);
    }

    fn restyle_layer(&mut self, id: LayerId, style: &LayerStyle) {
        self.ops.push(RenderOp::Restyle(id));
        self.styles.insert(id, style.clone());
    }

    fn bring_to_front(&mut self, id: LayerId) {
        self.ops.push(RenderOp::BringToFront(id));
    }

    fn fit_bounds(&mut self, bounds: Rect<f64>) {
        self.ops.push(RenderOp::FitBounds(bounds));
    }
}
