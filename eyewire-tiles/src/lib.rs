pub mod chunk;
pub mod config;
pub mod http_client;
pub mod layout;
pub mod mock_api;
pub mod model;
pub mod pipeline;

pub use chunk::{ChunkOffset, Slicing};
pub use config::PipelineConfig;
pub use http_client::HttpTileApi;
pub use layout::{Layer, Layout, PlaceholderKey};
pub use model::{Bounds, Point3D, TaskAssignment, Tile, TileError};
pub use pipeline::{ChunkOutcome, Pipeline, PipelineOutput, RunReport};

pub type TileResult<T> = Result<T, TileError>;

/// Source of task assignments and chunk tile batches.
#[allow(async_fn_in_trait)]
pub trait TileApi {
    /// Asks the service for a new task.
    async fn assign_task(&self) -> TileResult<TaskAssignment>;
    /// Fetches every tile of one chunk of the volume `volume_id`.
    async fn fetch_tiles(&self, volume_id: u64, offset: ChunkOffset) -> TileResult<Vec<Tile>>;
}
