//! In-memory implementation of [`TileApi`] for testing.

use std::collections::HashMap;

use crate::chunk::{ChunkOffset, TILES_PER_CHUNK};
use crate::model::{Bounds, Point3D, TaskAssignment, Tile, TileError};
use crate::{TileApi, TileResult};

/// A tile source that does not touch the network.
///
/// It answers the task request with a fixed assignment and each chunk
/// request with whatever batch was registered for that offset. Offsets
/// with nothing registered fail like an unreachable server would.
#[derive(Clone, Debug, Default)]
pub struct MockTileApi {
    pub task: Option<TaskAssignment>,
    pub chunks: HashMap<ChunkOffset, Vec<Tile>>,
}

impl MockTileApi {
    pub fn new(task: TaskAssignment) -> Self {
        Self {
            task: Some(task),
            chunks: HashMap::new(),
        }
    }

    /// Registers a full, well-formed xy batch for every chunk of the task volume.
    pub fn with_all_chunks(mut self) -> Self {
        if let Some(task) = &self.task {
            for offset in ChunkOffset::ALL {
                let tiles = xy_chunk_tiles(&task.bounds, offset);
                self.chunks.insert(offset, tiles);
            }
        }
        self
    }

    pub fn with_chunk(mut self, offset: ChunkOffset, tiles: Vec<Tile>) -> Self {
        self.chunks.insert(offset, tiles);
        self
    }

    pub fn without_chunk(mut self, offset: ChunkOffset) -> Self {
        self.chunks.remove(&offset);
        self
    }
}

impl TileApi for MockTileApi {
    async fn assign_task(&self) -> TileResult<TaskAssignment> {
        self.task
            .clone()
            .ok_or_else(|| TileError::Unavailable("no task assigned".into()))
    }

    async fn fetch_tiles(&self, volume_id: u64, offset: ChunkOffset) -> TileResult<Vec<Tile>> {
        self.chunks.get(&offset).cloned().ok_or_else(|| {
            TileError::Unavailable(format!("volume {} has no chunk {}", volume_id, offset))
        })
    }
}

/// Synthesizes the xy tiles of one chunk: one per Z, each covering the
/// chunk's X/Y extent, with a payload naming its placeholder.
pub fn xy_chunk_tiles(volume: &Bounds, offset: ChunkOffset) -> Vec<Tile> {
    let Some(chunk) = offset.bounds_within(volume) else {
        return Vec::new();
    };
    (0..TILES_PER_CHUNK as i64)
        .map(|i| {
            let z = chunk.min.z + i;
            Tile {
                bounds: Bounds::new(
                    Point3D::new(chunk.min.x, chunk.min.y, z),
                    Point3D::new(chunk.max.x, chunk.max.y, z + 1),
                ),
                data: format!("data:text/plain,{}_{}_{}", chunk.min.x, chunk.min.y, z),
            }
        })
        .collect()
}
