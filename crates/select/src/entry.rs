use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use worldview_common::{Aabb, EntityId, MeshHandle, Ray};

/// What kind of world object a selectable entry stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Structure,
    ZoneMarker,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Structure => write!(f, "structure"),
            EntityKind::ZoneMarker => write!(f, "zone marker"),
        }
    }
}

/// Pick volume. Structures use boxes, zone markers use spheres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitShape {
    Box(Aabb),
    Sphere { center: Vec3, radius: f32 },
}

impl HitShape {
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        match self {
            HitShape::Box(aabb) => ray.intersect_aabb(aabb),
            HitShape::Sphere { center, radius } => ray.intersect_sphere(*center, *radius),
        }
    }
}

/// A world object eligible for ray hit-testing. Immutable once registered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectableEntry {
    pub kind: EntityKind,
    pub id: EntityId,
    /// Renderable the editor highlights on selection.
    pub mesh: MeshHandle,
    pub shape: HitShape,
    /// Owning settlement, if any.
    pub parent: Option<EntityId>,
}

/// A settlement footprint used for membership tests on terrain picks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: EntityId,
    /// Centre of the settlement on the XZ plane.
    pub anchor: Vec2,
    pub radius: f32,
    pub name: String,
}

impl Settlement {
    pub fn contains_xz(&self, x: f32, z: f32) -> bool {
        self.anchor.distance_squared(Vec2::new(x, z)) <= self.radius * self.radius
    }
}
