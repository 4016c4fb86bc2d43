use crate::chunk::{Slicing, MIP_LEVEL};

pub const DEFAULT_TASK_URL: &str = "https://eyewire.org/2.0/tasks/testassign";
// The TLS certificate for data.eyewire.org is issued to eyewire.org, so plain HTTP.
pub const DEFAULT_DATA_URL: &str = "http://data.eyewire.org";

/// Endpoints and request parameters for one pipeline run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Endpoint that hands out a task assignment on `POST`.
    pub task_url: String,
    /// Base URL of the volume/tile data service.
    pub data_url: String,
    pub mip_level: u32,
    pub slicing: Slicing,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            task_url: DEFAULT_TASK_URL.into(),
            data_url: DEFAULT_DATA_URL.into(),
            mip_level: MIP_LEVEL,
            slicing: Slicing::default(),
        }
    }
}
