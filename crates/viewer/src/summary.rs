use glam::Vec3;
use serde::Serialize;
use worldview_lod::TierCounts;
use worldview_stream::{StreamMetrics, TileCoord};

/// Read-only snapshot of the viewer for debug overlays and the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct ViewerSummary {
    pub frame: u64,
    pub position: Vec3,
    pub speed: f32,
    pub viewpoint_tile: Option<TileCoord>,
    pub fly_mode: bool,
    pub stream: StreamMetrics,
    pub tiers: TierCounts,
    pub selectable: usize,
    pub settlements: usize,
    /// Short id of the selected entity, or `terrain` for a terrain pick.
    pub selected: Option<String>,
}

impl std::fmt::Display for ViewerSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tile = self
            .viewpoint_tile
            .map_or_else(|| "-".to_string(), |t| t.to_string());
        write!(
            f,
            "Viewer: frame={} pos=({:.1}, {:.1}, {:.1}) speed={:.1} tile={} resident={}/{} queued={} lod={}/{}/{} selectable={}",
            self.frame,
            self.position.x,
            self.position.y,
            self.position.z,
            self.speed,
            tile,
            self.stream.resident_tiles,
            self.stream.tile_budget,
            self.stream.queue_depth,
            self.tiers.full,
            self.tiers.simplified,
            self.tiers.minimal,
            self.selectable,
        )?;
        if let Some(selected) = &self.selected {
            write!(f, " selected={selected}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_streaming_state() {
        let summary = ViewerSummary {
            frame: 3,
            position: Vec3::new(1.0, 2.0, 3.0),
            speed: 0.0,
            viewpoint_tile: Some(TileCoord::new(4, 5)),
            fly_mode: false,
            stream: StreamMetrics {
                resident_tiles: 12,
                tile_budget: 400,
                queue_depth: 7,
                ..StreamMetrics::default()
            },
            tiers: TierCounts::default(),
            selectable: 0,
            settlements: 0,
            selected: None,
        };
        let s = summary.to_string();
        assert!(s.contains("frame=3"));
        assert!(s.contains("tile=(4, 5)"));
        assert!(s.contains("resident=12/400"));
        assert!(s.contains("queued=7"));
        assert!(!s.contains("selected="));
    }
}
