use crate::common::{DomainError, DomainResult};
use crate::domains::presence::{to_lat_lng, within_radius, AgentId, GeoHit, GeoIndex, Position};
use async_trait::async_trait;
use h3o::{CellIndex, LatLng, Resolution};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// Default H3 resolution (~174 m average edge).
pub const DEFAULT_H3_RESOLUTION: u8 = 9;

/// Queries needing a larger k-ring than this scan every entry instead.
const MAX_RING: u32 = 48;

#[derive(Debug, Clone, Copy)]
struct Entry {
    position: Position,
    point: LatLng,
    cell: CellIndex,
}

#[derive(Debug, Default)]
struct IndexState {
    entries: HashMap<AgentId, Entry>,
    cells: HashMap<CellIndex, HashSet<AgentId>>,
}

impl IndexState {
    fn bucket_insert(&mut self, cell: CellIndex, agent_id: &str) {
        self.cells
            .entry(cell)
            .or_insert_with(HashSet::new)
            .insert(agent_id.to_string());
    }

    fn bucket_remove(&mut self, cell: CellIndex, agent_id: &str) {
        if let Some(set) = self.cells.get_mut(&cell) {
            set.remove(agent_id);
            if set.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }
}

/// In-process position index. Agents are bucketed by H3 cell; radius queries
/// gather the k-ring around the centre cell and keep candidates whose
/// haversine distance is within the radius.
///
/// All mutations of both maps happen under one write guard, so an upsert and
/// a remove for the same agent never interleave.
#[derive(Debug)]
pub struct H3GeoIndex {
    resolution: Resolution,
    state: RwLock<IndexState>,
}

impl H3GeoIndex {
    pub fn new() -> Self {
        Self::with_resolution(Resolution::Nine)
    }

    pub fn with_resolution(resolution: Resolution) -> Self {
        Self {
            resolution,
            state: RwLock::new(IndexState::default()),
        }
    }

    /// Build from a numeric resolution (0..=15) as found in config files.
    pub fn from_level(level: u8) -> DomainResult<Self> {
        let resolution = Resolution::try_from(level)
            .map_err(|e| DomainError::invalid_input(format!("Invalid H3 resolution {}: {}", level, e)))?;
        Ok(Self::with_resolution(resolution))
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn position_of(&self, agent_id: &str) -> Option<Position> {
        self.state.read().await.entries.get(agent_id).map(|e| e.position)
    }


    /// Ring size that covers `radius_m` from anywhere inside the centre cell.
    /// Edge lengths vary across the grid, so half the average edge is used as
    /// the step.
    fn ring_for(&self, radius_m: f64) -> u32 {
        let step = self.resolution.edge_length_m() / 2.0;
        let rings = (radius_m.max(0.0) / step).ceil();
        if rings.is_finite() && rings < MAX_RING as f64 {
            rings as u32 + 1
        } else {
            u32::MAX
        }
    }
}

impl Default for H3GeoIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GeoIndex for H3GeoIndex {
    async fn upsert(&self, agent_id: &str, position: Position) -> DomainResult<()> {
        let point = to_lat_lng(position)?;
        let cell = point.to_cell(self.resolution);
        let mut state = self.state.write().await;

        let previous = state
            .entries
            .insert(agent_id.to_string(), Entry { position, point, cell });
        match previous {
            Some(old) if old.cell == cell => {}
            Some(old) => {
                state.bucket_remove(old.cell, agent_id);
                state.bucket_insert(cell, agent_id);
            }
            None => state.bucket_insert(cell, agent_id),
        }
        Ok(())
    }

    async fn remove(&self, agent_id: &str) -> DomainResult<()> {
        let mut state = self.state.write().await;
        if let Some(old) = state.entries.remove(agent_id) {
            state.bucket_remove(old.cell, agent_id);
        }
        Ok(())
    }

    async fn query_radius(&self, center: Position, radius_m: f64) -> DomainResult<Vec<GeoHit>> {
        let from = to_lat_lng(center)?;
        let origin = from.to_cell(self.resolution);
        let k = self.ring_for(radius_m);
        let state = self.state.read().await;

        let mut hits: Vec<(f64, GeoHit)> = Vec::new();
        let mut consider = |agent_id: &AgentId, entry: &Entry| {
            let distance = from.distance_m(entry.point);
            if within_radius(distance, radius_m) {
                hits.push((
                    distance,
                    GeoHit {
                        agent_id: agent_id.clone(),
                        position: entry.position,
                    },
                ));
            }
        };

        if k == u32::MAX {
            for (agent_id, entry) in state.entries.iter() {
                consider(agent_id, entry);
            }
        } else {
            for cell in origin.grid_disk_safe(k) {
                let Some(members) = state.cells.get(&cell) else { continue };
                for agent_id in members {
                    if let Some(entry) = state.entries.get(agent_id) {
                        consider(agent_id, entry);
                    }
                }
            }
        }

        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.agent_id.cmp(&b.1.agent_id)));
        Ok(hits.into_iter().map(|(_, hit)| hit).collect())
    }
}
