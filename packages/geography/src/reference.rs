//! Boundary layers loaded from `GeoJSON` feature collections.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crime_dash_geography_models::{AreaSummary, GeoLayer};
use geo::{BoundingRect, MultiPolygon};
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject, JsonValue};

use crate::GeoError;

/// Where to read one layer from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSource {
    pub layer: GeoLayer,
    pub path: PathBuf,
    /// Feature property holding the numeric code.
    pub id_property: String,
    /// Feature property holding a display name, if any.
    pub name_property: Option<String>,
}

impl ReferenceSource {
    /// Source for `layer` at `path` using the layer's default property names.
    #[must_use]
    pub fn with_defaults(layer: GeoLayer, path: PathBuf) -> Self {
        Self {
            layer,
            path,
            id_property: layer.default_id_property().to_string(),
            name_property: layer.default_name_property().map(str::to_string),
        }
    }
}

/// A single administrative area.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceArea {
    pub layer: GeoLayer,
    pub id: i32,
    pub name: Option<String>,
    /// Boundary, when the feature had a polygon geometry.
    pub geometry: Option<MultiPolygon<f64>>,
}

impl ReferenceArea {
    #[must_use]
    pub fn summary(&self) -> AreaSummary {
        AreaSummary {
            layer: self.layer,
            id: self.id,
            name: self.name.clone(),
        }
    }

    fn to_feature(&self) -> Feature {
        let mut properties = JsonObject::new();
        properties.insert("layer".to_string(), JsonValue::from(self.layer.as_ref()));
        properties.insert("id".to_string(), JsonValue::from(self.id));
        properties.insert(
            "name".to_string(),
            self.name.clone().map_or(JsonValue::Null, JsonValue::from),
        );

        Feature {
            bbox: None,
            geometry: self
                .geometry
                .as_ref()
                .map(|mp| geojson::Geometry::new(geojson::Value::from(mp))),
            id: Some(geojson::feature::Id::Number(self.id.into())),
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

/// All areas of one layer, keyed by code.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLayer {
    layer: GeoLayer,
    areas: BTreeMap<i32, ReferenceArea>,
}

impl ReferenceLayer {
    /// Reads and parses the file named by `source`.
    ///
    /// # Errors
    ///
    /// * [`GeoError::MissingFile`] if the file does not exist
    /// * [`GeoError::Io`] if it cannot be read
    /// * [`GeoError::Parse`] if it is not a `GeoJSON` feature collection
    pub fn load(source: &ReferenceSource) -> Result<Self, GeoError> {
        if !source.path.is_file() {
            return Err(GeoError::MissingFile {
                path: source.path.clone(),
            });
        }

        let text = std::fs::read_to_string(&source.path)?;
        let layer = Self::from_geojson_str(
            source.layer,
            &text,
            &source.id_property,
            source.name_property.as_deref(),
        )?;

        log::info!(
            "Loaded {} {} areas from {}",
            layer.len(),
            source.layer,
            source.path.display()
        );

        Ok(layer)
    }

    /// Parses a `GeoJSON` feature collection.
    ///
    /// Features without a usable id are skipped with a warning. Features
    /// sharing an id are merged into one area.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Parse`] if `text` is not a feature collection.
    pub fn from_geojson_str(
        layer: GeoLayer,
        text: &str,
        id_property: &str,
        name_property: Option<&str>,
    ) -> Result<Self, GeoError> {
        let geojson: GeoJson = text.parse().map_err(|e: geojson::Error| GeoError::Parse {
            message: e.to_string(),
        })?;

        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(GeoError::Parse {
                message: format!("{layer} reference is not a FeatureCollection"),
            });
        };

        let mut areas: BTreeMap<i32, ReferenceArea> = BTreeMap::new();
        let mut skipped = 0u64;

        for feature in collection.features {
            let Some(id) = feature.property(id_property).and_then(parse_area_id) else {
                skipped += 1;
                continue;
            };

            let name = name_property
                .and_then(|p| feature.property(p))
                .and_then(JsonValue::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());

            let geometry = feature.geometry.and_then(to_multipolygon);

            match areas.get_mut(&id) {
                Some(existing) => {
                    if let Some(extra) = geometry {
                        match &mut existing.geometry {
                            Some(mp) => mp.0.extend(extra.0),
                            None => existing.geometry = Some(extra),
                        }
                    }
                    if existing.name.is_none() {
                        existing.name = name;
                    }
                }
                None => {
                    areas.insert(
                        id,
                        ReferenceArea {
                            layer,
                            id,
                            name,
                            geometry,
                        },
                    );
                }
            }
        }

        if skipped > 0 {
            log::warn!(
                "Skipped {skipped} {layer} features without a usable '{id_property}' property"
            );
        }

        Ok(Self { layer, areas })
    }

    #[must_use]
    pub const fn layer(&self) -> GeoLayer {
        self.layer
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: i32) -> bool {
        self.areas.contains_key(&id)
    }

    #[must_use]
    pub fn get(&self, id: i32) -> Option<&ReferenceArea> {
        self.areas.get(&id)
    }

    /// Areas in ascending code order.
    pub fn areas(&self) -> impl Iterator<Item = &ReferenceArea> {
        self.areas.values()
    }

    /// Bounding box `[min_x, min_y, max_x, max_y]` over every area with a
    /// geometry.
    #[must_use]
    pub fn bounds(&self) -> Option<[f64; 4]> {
        self.areas
            .values()
            .filter_map(|a| a.geometry.as_ref()?.bounding_rect())
            .fold(None, |acc: Option<[f64; 4]>, rect| {
                let (min, max) = (rect.min(), rect.max());
                Some(acc.map_or([min.x, min.y, max.x, max.y], |b| {
                    [
                        b[0].min(min.x),
                        b[1].min(min.y),
                        b[2].max(max.x),
                        b[3].max(max.y),
                    ]
                }))
            })
    }

    /// Re-serializes the layer for map overlays. Each feature carries
    /// `layer`, `id` and `name` properties.
    #[must_use]
    pub fn to_feature_collection(&self) -> FeatureCollection {
        FeatureCollection {
            bbox: self.bounds().map(|b| b.to_vec()),
            features: self.areas.values().map(ReferenceArea::to_feature).collect(),
            foreign_members: None,
        }
    }
}

/// The loaded reference layers.
///
/// A layer that was never loaded places no constraint on incident codes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceSet {
    layers: BTreeMap<GeoLayer, ReferenceLayer>,
}

impl ReferenceSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every source. The first failure aborts the load.
    ///
    /// # Errors
    ///
    /// Returns the first [`GeoError`] from [`ReferenceLayer::load`].
    pub fn load<'a>(
        sources: impl IntoIterator<Item = &'a ReferenceSource>,
    ) -> Result<Self, GeoError> {
        let mut set = Self::new();
        for source in sources {
            set.insert(ReferenceLayer::load(source)?);
        }
        Ok(set)
    }

    pub fn insert(&mut self, layer: ReferenceLayer) {
        self.layers.insert(layer.layer(), layer);
    }

    #[must_use]
    pub fn get(&self, layer: GeoLayer) -> Option<&ReferenceLayer> {
        self.layers.get(&layer)
    }

    /// Whether `id` is known for `layer`. Always `true` for layers that
    /// were not loaded.
    #[must_use]
    pub fn contains(&self, layer: GeoLayer, id: i32) -> bool {
        self.layers.get(&layer).is_none_or(|l| l.contains(id))
    }

    /// Loaded layers in [`GeoLayer`] order.
    pub fn layers(&self) -> impl Iterator<Item = &ReferenceLayer> {
        self.layers.values()
    }
}

/// Reads an area code from a feature property. Accepts integers, whole
/// floats and numeric strings.
#[allow(clippy::cast_possible_truncation)]
fn parse_area_id(value: &JsonValue) -> Option<i32> {
    match value {
        JsonValue::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(|n| i32::try_from(n).ok()),
        JsonValue::String(s) => {
            let s = s.trim();
            s.parse::<i32>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0)
                    .and_then(|f| i32::try_from(f as i64).ok())
            })
        }
        _ => None,
    }
}

fn to_multipolygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

/// Convenience for callers that only have a directory: the layer's default
/// file inside `dir`.
#[must_use]
pub fn default_source(layer: GeoLayer, dir: &Path) -> ReferenceSource {
    ReferenceSource::with_defaults(layer, dir.join(layer.default_file_name()))
}
