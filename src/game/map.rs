//! Level Geometry
//!
//! Brushes, entities and lights as produced by map loading. Brushes are
//! immutable once the map is built; their bounding boxes are derived from
//! vertex extents on every query rather than cached.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::aabb::Aabb;

/// Face-normal dot product above which a brush counts as floor or ceiling.
/// Roughly cos(45 degrees).
const SURFACE_THRESHOLD: f32 = 0.7;

/// Cross products shorter than this mark a degenerate triangle.
const DEGENERATE_NORMAL: f32 = 0.001;

/// Errors loading or validating a map.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// Reading the file failed.
    #[error("failed to read map: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid map JSON.
    #[error("failed to parse map: {0}")]
    Parse(#[from] serde_json::Error),

    /// Brush has no vertices.
    #[error("brush {id} has no vertices")]
    EmptyBrush {
        /// Brush id
        id: u32,
    },

    /// Brush has no triangle indices.
    #[error("brush {id} has no faces")]
    NoFaces {
        /// Brush id
        id: u32,
    },

    /// Triangle index points past the vertex list.
    #[error("brush {id} has invalid face index {index} (vertex count {vertex_count})")]
    InvalidFaceIndex {
        /// Brush id
        id: u32,
        /// Offending index
        index: u32,
        /// Number of vertices in the brush
        vertex_count: usize,
    },
}

// =============================================================================
// WORLD SETTINGS
// =============================================================================

/// Global environment settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    /// Gravity the level was authored for (informational)
    pub gravity: f32,
    /// Ambient light color
    pub ambient_light: Vec3,
    /// Clear color
    pub background_color: Vec3,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            gravity: -9.8,
            ambient_light: Vec3::new(0.2, 0.2, 0.3),
            background_color: Vec3::new(0.1, 0.1, 0.2),
        }
    }
}

// =============================================================================
// BRUSHES
// =============================================================================

/// Dominant orientation of a brush.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceType {
    /// Not classified yet, or not classifiable
    #[default]
    Unknown,
    /// Faces point mostly up
    Floor,
    /// Faces point mostly down
    Ceiling,
    /// Everything else
    Wall,
}

/// A piece of static level geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    /// Brush id
    pub id: u32,
    /// Vertex positions
    pub vertices: Vec<Vec3>,
    /// Triangle list indexing `vertices`
    #[serde(default)]
    pub faces: Vec<u32>,
    /// Material tag
    #[serde(default)]
    pub material: String,
    /// Surface classification
    #[serde(default)]
    pub surface_type: SurfaceType,
}

impl Brush {
    /// Closed box with outward-facing triangles.
    pub fn cuboid(id: u32, min: Vec3, max: Vec3, material: impl Into<String>) -> Self {
        let vertices = vec![
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(max.x, max.y, min.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(max.x, max.y, max.z),
            Vec3::new(min.x, max.y, max.z),
        ];
        let faces = vec![
            0, 3, 2, 0, 2, 1, // -Z
            4, 5, 6, 4, 6, 7, // +Z
            0, 4, 7, 0, 7, 3, // -X
            1, 2, 6, 1, 6, 5, // +X
            0, 1, 5, 0, 5, 4, // -Y
            3, 7, 6, 3, 6, 2, // +Y
        ];

        Self {
            id,
            vertices,
            faces,
            material: material.into(),
            surface_type: SurfaceType::Unknown,
        }
    }

    /// Same brush with an explicit surface tag.
    pub fn with_surface(mut self, surface_type: SurfaceType) -> Self {
        self.surface_type = surface_type;
        self
    }

    /// Bounding box of the vertices. `None` for an empty brush.
    #[inline]
    pub fn aabb(&self) -> Option<Aabb> {
        Aabb::from_points(&self.vertices)
    }

    /// Classify by the average of the valid triangle normals.
    pub fn classify(&self) -> SurfaceType {
        if self.vertices.len() < 3 || self.faces.len() < 3 {
            return SurfaceType::Unknown;
        }

        let mut sum = Vec3::ZERO;
        let mut valid = 0usize;
        for tri in self.faces.chunks_exact(3) {
            let corners = (
                self.vertices.get(tri[0] as usize),
                self.vertices.get(tri[1] as usize),
                self.vertices.get(tri[2] as usize),
            );
            if let (Some(a), Some(b), Some(c)) = corners {
                let normal = (*b - *a).cross(*c - *a);
                let len = normal.length();
                if len > DEGENERATE_NORMAL {
                    sum += normal / len;
                    valid += 1;
                }
            }
        }

        if valid == 0 {
            return SurfaceType::Unknown;
        }

        // Opposing faces cancel; a closed box averages to zero and reads as a wall
        let average = sum.normalize_or_zero();
        if average.dot(Vec3::Y) > SURFACE_THRESHOLD {
            SurfaceType::Floor
        } else if average.dot(Vec3::NEG_Y) > SURFACE_THRESHOLD {
            SurfaceType::Ceiling
        } else {
            SurfaceType::Wall
        }
    }
}

// =============================================================================
// ENTITIES AND LIGHTS
// =============================================================================

/// Kind of placed entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// Where the player spawns
    PlayerStart,
    /// Light placement
    Light,
    /// One enemy spawns here per room reset
    EnemySpawn,
    /// Pickup placement
    ItemPickup,
    /// Trigger volume
    Trigger,
}

/// Placement data read at map load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity kind
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// World position
    pub position: Vec3,
    /// Euler rotation (degrees)
    #[serde(default)]
    pub rotation: Vec3,
    /// Scale
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Free-form text payload (enemy type, item type)
    #[serde(default)]
    pub string_property: String,
    /// Free-form vector payload (light color)
    #[serde(default)]
    pub vec3_property: Vec3,
    /// Free-form float payload (intensity, health)
    #[serde(default)]
    pub float_property1: f32,
    /// Free-form float payload (range)
    #[serde(default)]
    pub float_property2: f32,
    /// Free-form integer payload (quantity)
    #[serde(default)]
    pub int_property: i32,
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

impl Entity {
    /// Entity with default payload fields.
    pub fn new(entity_type: EntityType, position: Vec3) -> Self {
        Self {
            entity_type,
            position,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            name: String::new(),
            string_property: String::new(),
            vec3_property: Vec3::ZERO,
            float_property1: 0.0,
            float_property2: 0.0,
            int_property: 0,
        }
    }
}

/// Kind of light source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightType {
    /// Parallel rays
    Directional,
    /// Omnidirectional
    #[default]
    Point,
    /// Cone
    Spot,
}

/// Static light.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Light {
    /// Light kind
    #[serde(rename = "type")]
    pub light_type: LightType,
    /// World position
    pub position: Vec3,
    /// Direction for directional and spot lights
    pub direction: Vec3,
    /// Color
    pub color: Vec3,
    /// Intensity
    pub intensity: f32,
    /// Falloff range
    pub range: f32,
    /// Spot inner cone (degrees)
    pub inner_cone_angle: f32,
    /// Spot outer cone (degrees)
    pub outer_cone_angle: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            light_type: LightType::Point,
            position: Vec3::ZERO,
            direction: Vec3::NEG_Y,
            color: Vec3::ONE,
            intensity: 1.0,
            range: 10.0,
            inner_cone_angle: 30.0,
            outer_cone_angle: 45.0,
        }
    }
}

// =============================================================================
// MAP
// =============================================================================

/// A loaded level.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Map {
    world: WorldSettings,
    brushes: Vec<Brush>,
    entities: Vec<Entity>,
    lights: Vec<Light>,
}

impl Map {
    /// Empty map with the given world settings.
    pub fn new(world: WorldSettings) -> Self {
        Self {
            world,
            ..Default::default()
        }
    }

    /// Parse a map from JSON, classify its brushes and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, MapError> {
        let mut map: Map = serde_json::from_str(json)?;
        map.classify_surfaces();
        map.validate()?;
        debug!(
            brushes = map.brushes.len(),
            entities = map.entities.len(),
            lights = map.lights.len(),
            "Map parsed"
        );
        Ok(map)
    }

    /// Load a map from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// World settings.
    pub fn world(&self) -> &WorldSettings {
        &self.world
    }

    /// All brushes.
    pub fn brushes(&self) -> &[Brush] {
        &self.brushes
    }

    /// All entities.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// All lights.
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Add a brush.
    pub fn add_brush(&mut self, brush: Brush) {
        self.brushes.push(brush);
    }

    /// Add an entity.
    pub fn add_entity(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// Add a light.
    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Bounding boxes of every well-formed brush. Empty brushes are skipped.
    pub fn brush_boxes(&self) -> impl Iterator<Item = Aabb> + '_ {
        self.brushes.iter().filter_map(Brush::aabb)
    }

    /// Brushes with the given classification.
    pub fn brushes_by_type(&self, surface_type: SurfaceType) -> Vec<&Brush> {
        self.brushes
            .iter()
            .filter(|b| b.surface_type == surface_type)
            .collect()
    }

    /// Floor brushes.
    pub fn floor_brushes(&self) -> Vec<&Brush> {
        self.brushes_by_type(SurfaceType::Floor)
    }

    /// Ceiling brushes.
    pub fn ceiling_brushes(&self) -> Vec<&Brush> {
        self.brushes_by_type(SurfaceType::Ceiling)
    }

    /// Wall brushes.
    pub fn wall_brushes(&self) -> Vec<&Brush> {
        self.brushes_by_type(SurfaceType::Wall)
    }

    /// First player start, if any.
    pub fn player_start(&self) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.entity_type == EntityType::PlayerStart)
    }

    /// Entities of the given kind, in map order.
    pub fn entities_by_type(&self, entity_type: EntityType) -> impl Iterator<Item = &Entity> + '_ {
        self.entities
            .iter()
            .filter(move |e| e.entity_type == entity_type)
    }

    /// Classify every brush still tagged `Unknown`. Explicit tags are kept.
    pub fn classify_surfaces(&mut self) {
        for brush in &mut self.brushes {
            if brush.surface_type == SurfaceType::Unknown {
                brush.surface_type = brush.classify();
            }
        }
    }

    /// Check brush integrity. A missing player start only warns.
    pub fn validate(&self) -> Result<(), MapError> {
        if self.player_start().is_none() {
            warn!("Map has no player start position");
        }

        for brush in &self.brushes {
            if brush.vertices.is_empty() {
                return Err(MapError::EmptyBrush { id: brush.id });
            }
            if brush.faces.is_empty() {
                return Err(MapError::NoFaces { id: brush.id });
            }
            if let Some(&index) = brush
                .faces
                .iter()
                .find(|&&i| i as usize >= brush.vertices.len())
            {
                return Err(MapError::InvalidFaceIndex {
                    id: brush.id,
                    index,
                    vertex_count: brush.vertices.len(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(id: u32, y: f32, up: bool) -> Brush {
        let vertices = vec![
            Vec3::new(-1.0, y, -1.0),
            Vec3::new(1.0, y, -1.0),
            Vec3::new(1.0, y, 1.0),
            Vec3::new(-1.0, y, 1.0),
        ];
        let faces = if up {
            vec![0, 2, 1, 0, 3, 2]
        } else {
            vec![0, 1, 2, 0, 2, 3]
        };
        Brush {
            id,
            vertices,
            faces,
            material: String::new(),
            surface_type: SurfaceType::Unknown,
        }
    }

    #[test]
    fn test_classify_quads() {
        assert_eq!(quad(1, 0.0, true).classify(), SurfaceType::Floor);
        assert_eq!(quad(2, 3.0, false).classify(), SurfaceType::Ceiling);
    }

    #[test]
    fn test_classify_cuboid_is_wall() {
        let brush = Brush::cuboid(1, Vec3::ZERO, Vec3::new(4.0, 1.0, 2.0), "stone");
        assert_eq!(brush.classify(), SurfaceType::Wall);
    }

    #[test]
    fn test_classify_degenerate_is_unknown() {
        let mut brush = quad(1, 0.0, true);
        brush.faces.truncate(2);
        assert_eq!(brush.classify(), SurfaceType::Unknown);

        // Collinear points only
        let line = Brush {
            id: 2,
            vertices: vec![Vec3::ZERO, Vec3::X, Vec3::X * 2.0],
            faces: vec![0, 1, 2],
            material: String::new(),
            surface_type: SurfaceType::Unknown,
        };
        assert_eq!(line.classify(), SurfaceType::Unknown);
    }

    #[test]
    fn test_cuboid_aabb() {
        let brush = Brush::cuboid(1, Vec3::new(-2.0, 0.0, -3.0), Vec3::new(2.0, 1.0, 3.0), "");
        let aabb = brush.aabb().unwrap();
        assert_eq!(aabb.min, Vec3::new(-2.0, 0.0, -3.0));
        assert_eq!(aabb.max, Vec3::new(2.0, 1.0, 3.0));
    }

    #[test]
    fn test_brush_boxes_skip_empty() {
        let mut map = Map::default();
        map.add_brush(Brush::cuboid(1, Vec3::ZERO, Vec3::ONE, ""));
        map.add_brush(Brush {
            id: 2,
            vertices: Vec::new(),
            faces: Vec::new(),
            material: String::new(),
            surface_type: SurfaceType::Unknown,
        });
        assert_eq!(map.brush_boxes().count(), 1);
    }

    #[test]
    fn test_classify_surfaces_keeps_explicit_tags() {
        let mut map = Map::default();
        map.add_brush(Brush::cuboid(1, Vec3::ZERO, Vec3::ONE, "").with_surface(SurfaceType::Floor));
        map.add_brush(quad(2, 0.0, true));
        map.classify_surfaces();

        assert_eq!(map.floor_brushes().len(), 2);
        assert!(map.wall_brushes().is_empty());
    }

    #[test]
    fn test_validate_errors() {
        let mut map = Map::default();
        map.add_brush(Brush {
            id: 7,
            vertices: vec![Vec3::ZERO],
            faces: vec![0, 0, 3],
            material: String::new(),
            surface_type: SurfaceType::Unknown,
        });
        let err = map.validate().unwrap_err();
        assert!(matches!(
            err,
            MapError::InvalidFaceIndex { id: 7, index: 3, vertex_count: 1 }
        ));

        let mut map = Map::default();
        map.add_brush(Brush {
            id: 8,
            vertices: vec![Vec3::ZERO],
            faces: Vec::new(),
            material: String::new(),
            surface_type: SurfaceType::Unknown,
        });
        assert!(matches!(map.validate(), Err(MapError::NoFaces { id: 8 })));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "brushes": [
                { "id": 1,
                  "vertices": [[-1, 0, -1], [1, 0, -1], [1, 0, 1], [-1, 0, 1]],
                  "faces": [0, 2, 1, 0, 3, 2],
                  "material": "floor" }
            ],
            "entities": [
                { "type": "player_start", "position": [0, 1, 0] },
                { "type": "enemy_spawn", "position": [5, 1, 5] },
                { "type": "enemy_spawn", "position": [-5, 1, 5] }
            ]
        }"#;

        let map = Map::from_json_str(json).unwrap();
        assert_eq!(map.brushes()[0].surface_type, SurfaceType::Floor);
        assert_eq!(map.player_start().unwrap().position, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(map.entities_by_type(EntityType::EnemySpawn).count(), 2);
        assert_eq!(map.entities()[1].scale, Vec3::ONE);
    }
}
