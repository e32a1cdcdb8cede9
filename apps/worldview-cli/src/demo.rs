//! Deterministic stand-in for the town generator: settlements, buildings and
//! zone markers scattered from a seed.

use glam::{Vec2, Vec3};
use worldview_common::{EntityId, WorldBounds};
use worldview_select::Settlement;
use worldview_terrain::{TerrainSampler, sample_checked};
use worldview_viewer::{SceneFoundation, StructureSpec, ZoneMarkerSpec};

const SETTLEMENT_NAMES: [&str; 8] = [
    "Ashford", "Brackenridge", "Coldwater", "Dunmere", "Elmstead", "Fenmoor", "Greyhaven",
    "Harrowby",
];

fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

struct DemoRng {
    state: u64,
}

impl DemoRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = splitmix64(self.state);
        self.state
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.unit()
    }
}

/// Ids are `seed` in the high half and a running counter in the low half, so
/// the same seed always yields the same ids.
struct IdSource {
    seed: u64,
    next: u64,
}

impl IdSource {
    fn next(&mut self) -> EntityId {
        self.next += 1;
        EntityId::from_u128((u128::from(self.seed) << 64) | u128::from(self.next))
    }
}

/// Build a foundation of `settlements` towns. Placements whose ground height
/// cannot be sampled, or that fall under water, are skipped.
pub fn demo_foundation(
    seed: u64,
    settlements: usize,
    bounds: &WorldBounds,
    sampler: &dyn TerrainSampler,
) -> SceneFoundation {
    let mut rng = DemoRng::new(seed);
    let mut ids = IdSource { seed, next: 0 };
    let extent = bounds.extent();
    let water = sampler.water_level();
    let mut foundation = SceneFoundation::default();

    let ground = |x: f32, z: f32| {
        sample_checked(sampler, x, z)
            .ok()
            .map(|s| s.height)
            .filter(|h| *h > water)
    };

    for i in 0..settlements {
        let anchor = Vec2::new(
            rng.range(0.1, 0.9) * extent.x,
            rng.range(0.1, 0.9) * extent.y,
        );
        let radius = rng.range(60.0, 140.0);
        let settlement_id = ids.next();
        foundation.settlements.push(Settlement {
            id: settlement_id,
            anchor,
            radius,
            name: SETTLEMENT_NAMES[i % SETTLEMENT_NAMES.len()].to_string(),
        });

        let buildings = 6 + (rng.next_u64() % 7) as usize;
        for _ in 0..buildings {
            let angle = rng.range(0.0, std::f32::consts::TAU);
            let dist = rng.range(0.0, radius);
            let x = anchor.x + angle.cos() * dist;
            let z = anchor.y + angle.sin() * dist;
            let Some(height) = ground(x, z) else {
                continue;
            };
            foundation.structures.push(StructureSpec {
                id: ids.next(),
                anchor: Vec3::new(x, height, z),
                half_extent: Vec3::new(
                    rng.range(3.0, 9.0),
                    rng.range(3.0, 12.0),
                    rng.range(3.0, 9.0),
                ),
                settlement: Some(settlement_id),
            });
        }

        if let Some(height) = ground(anchor.x, anchor.y) {
            foundation.markers.push(ZoneMarkerSpec {
                id: ids.next(),
                center: Vec3::new(anchor.x, height + 15.0, anchor.y),
                radius: 6.0,
                settlement: Some(settlement_id),
            });
        }
    }

    tracing::debug!(
        seed,
        settlements = foundation.settlements.len(),
        structures = foundation.structures.len(),
        markers = foundation.markers.len(),
        "demo foundation generated"
    );
    foundation
}

#[cfg(test)]
mod tests {
    use super::*;
    use worldview_terrain::{Biome, SamplerError, SurfaceSample};

    struct Plateau;

    impl TerrainSampler for Plateau {
        fn sample(&self, _x: f32, _z: f32) -> Result<SurfaceSample, SamplerError> {
            Ok(SurfaceSample {
                height: 12.0,
                biome: Biome::Grassland,
                normal: Vec3::Y,
            })
        }

        fn water_level(&self) -> f32 {
            0.0
        }
    }

    struct Sea;

    impl TerrainSampler for Sea {
        fn sample(&self, _x: f32, _z: f32) -> Result<SurfaceSample, SamplerError> {
            Ok(SurfaceSample {
                height: -30.0,
                biome: Biome::Ocean,
                normal: Vec3::Y,
            })
        }

        fn water_level(&self) -> f32 {
            0.0
        }
    }

    #[test]
    fn same_seed_same_foundation() {
        let bounds = WorldBounds::default();
        let a = demo_foundation(9, 4, &bounds, &Plateau);
        let b = demo_foundation(9, 4, &bounds, &Plateau);
        assert_eq!(a, b);
        assert_ne!(a, demo_foundation(10, 4, &bounds, &Plateau));
    }

    #[test]
    fn buildings_sit_inside_their_settlement() {
        let bounds = WorldBounds::default();
        let f = demo_foundation(3, 5, &bounds, &Plateau);
        assert_eq!(f.settlements.len(), 5);
        assert_eq!(f.markers.len(), 5);
        assert!(f.structures.len() >= 30);
        for s in &f.structures {
            let Some(parent) = f.settlements.iter().find(|t| Some(t.id) == s.settlement) else {
                panic!("orphan structure");
            };
            assert!(parent.contains_xz(s.anchor.x, s.anchor.z));
            assert_eq!(s.anchor.y, 12.0);
        }
    }

    #[test]
    fn ids_are_unique() {
        let f = demo_foundation(77, 8, &WorldBounds::default(), &Plateau);
        let mut ids: Vec<EntityId> = f
            .settlements
            .iter()
            .map(|s| s.id)
            .chain(f.structures.iter().map(|s| s.id))
            .chain(f.markers.iter().map(|m| m.id))
            .collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn nothing_is_built_under_water() {
        let f = demo_foundation(1, 3, &WorldBounds::default(), &Sea);
        assert_eq!(f.settlements.len(), 3);
        assert!(f.structures.is_empty());
        assert!(f.markers.is_empty());
    }

    #[test]
    fn unit_stays_in_range() {
        let mut rng = DemoRng::new(5);
        for _ in 0..1000 {
            let u = rng.unit();
            assert!((0.0..1.0).contains(&u));
        }
    }
}
