use glam::Vec3;
use serde::{Deserialize, Serialize};
use worldview_common::{Aabb, EntityId};
use worldview_select::Settlement;

/// One generated building, road piece or landmark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StructureSpec {
    pub id: EntityId,
    /// Centre of the footprint at ground level; LOD distance is measured from here.
    pub anchor: Vec3,
    pub half_extent: Vec3,
    pub settlement: Option<EntityId>,
}

impl StructureSpec {
    /// Pick box resting on the anchor.
    pub fn bounds(&self) -> Aabb {
        let center = self.anchor + Vec3::Y * self.half_extent.y;
        Aabb::from_center_half_extent(center, self.half_extent)
    }
}

/// A spherical zone marker (spawn point, quest area, hazard).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneMarkerSpec {
    pub id: EntityId,
    pub center: Vec3,
    pub radius: f32,
    pub settlement: Option<EntityId>,
}

/// Immutable output of the structure generator, consumed once per scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneFoundation {
    pub settlements: Vec<Settlement>,
    pub structures: Vec<StructureSpec>,
    pub markers: Vec<ZoneMarkerSpec>,
}

impl SceneFoundation {
    pub fn entity_count(&self) -> usize {
        self.structures.len() + self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settlements.is_empty() && self.entity_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structure_box_sits_on_anchor() {
        let s = StructureSpec {
            id: EntityId::from_u128(1),
            anchor: Vec3::new(10.0, 5.0, 10.0),
            half_extent: Vec3::new(4.0, 3.0, 2.0),
            settlement: None,
        };
        let b = s.bounds();
        assert_eq!(b.min, Vec3::new(6.0, 5.0, 8.0));
        assert_eq!(b.max, Vec3::new(14.0, 11.0, 12.0));
    }

    #[test]
    fn counts() {
        let f = SceneFoundation::default();
        assert!(f.is_empty());
        assert_eq!(f.entity_count(), 0);
    }
}
