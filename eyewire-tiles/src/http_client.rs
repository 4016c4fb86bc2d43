//! HTTP implementation of [`TileApi`] against the EyeWire REST API.

use log::debug;

use crate::chunk::{tiles_url, ChunkOffset};
use crate::config::PipelineConfig;
use crate::model::{TaskAssignment, Tile};
use crate::{TileApi, TileResult};

pub struct HttpTileApi {
    client: reqwest::Client,
    pub config: PipelineConfig,
}

impl HttpTileApi {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: PipelineConfig) -> Self {
        Self { client, config }
    }

    pub fn tiles_url(&self, volume_id: u64, offset: ChunkOffset) -> String {
        tiles_url(
            &self.config.data_url,
            volume_id,
            self.config.mip_level,
            offset,
            self.config.slicing,
        )
    }

    async fn read_body(response: reqwest::Response) -> TileResult<String> {
        let response = response.error_for_status()?;
        Ok(response.text().await?)
    }
}

impl TileApi for HttpTileApi {
    async fn assign_task(&self) -> TileResult<TaskAssignment> {
        debug!("POST {}", self.config.task_url);
        let response = self.client.post(&self.config.task_url).send().await?;
        let body = Self::read_body(response).await?;
        debug!("Task response: {} bytes", body.len());
        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_tiles(&self, volume_id: u64, offset: ChunkOffset) -> TileResult<Vec<Tile>> {
        let url = self.tiles_url(volume_id, offset);
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        let body = Self::read_body(response).await?;
        debug!("Chunk {} response: {} bytes", offset, body.len());
        Ok(serde_json::from_str(&body)?)
    }
}
