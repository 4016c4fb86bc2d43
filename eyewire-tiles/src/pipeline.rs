//! Task → layout → tiles, run once.

use futures_util::stream::FuturesUnordered;
use futures_util::StreamExt;
use log::{debug, error, info};

use crate::chunk::ChunkOffset;
use crate::layout::Layout;
use crate::model::{TaskAssignment, TileError};
use crate::{TileApi, TileResult};

/// What happened to one chunk request.
#[derive(Debug)]
pub enum ChunkOutcome {
    Applied { tiles_written: usize },
    Failed(TileError),
}

impl ChunkOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ChunkOutcome::Applied { .. })
    }
}

/// Per-chunk outcomes, in completion order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub chunks: Vec<(ChunkOffset, ChunkOutcome)>,
}

impl RunReport {
    pub fn applied_count(&self) -> usize {
        self.chunks.iter().filter(|(_, o)| o.is_applied()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = (ChunkOffset, &TileError)> + '_ {
        self.chunks.iter().filter_map(|(offset, outcome)| match outcome {
            ChunkOutcome::Failed(err) => Some((*offset, err)),
            ChunkOutcome::Applied { .. } => None,
        })
    }

    pub fn tiles_written(&self) -> usize {
        self.chunks
            .iter()
            .map(|(_, outcome)| match outcome {
                ChunkOutcome::Applied { tiles_written } => *tiles_written,
                ChunkOutcome::Failed(_) => 0,
            })
            .sum()
    }
}

#[derive(Debug)]
pub struct PipelineOutput {
    pub task: TaskAssignment,
    pub layout: Layout,
    pub report: RunReport,
}

pub struct Pipeline<A: TileApi> {
    pub api: A,
}

impl<A: TileApi> Pipeline<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub async fn run(&self) -> TileResult<PipelineOutput> {
        self.run_with_callback(|_, _| {}).await
    }

    /// Runs the whole pipeline, calling `on_chunk` as each chunk completes.
    ///
    /// Fails only when the task cannot be obtained or its volume is
    /// malformed; chunk failures are recorded in the report.
    pub async fn run_with_callback<F>(&self, on_chunk: F) -> TileResult<PipelineOutput>
    where
        F: FnMut(ChunkOffset, &ChunkOutcome),
    {
        info!("Requesting task assignment...");
        let task = match self.api.assign_task().await {
            Ok(task) => task,
            Err(e) => {
                error!("An error has been encountered while requesting a task: {}", e);
                return Err(e);
            }
        };
        self.run_task(task, on_chunk).await
    }

    /// Runs the layout and tile stages for an already known task.
    pub async fn run_task<F>(&self, task: TaskAssignment, on_chunk: F) -> TileResult<PipelineOutput>
    where
        F: FnMut(ChunkOffset, &ChunkOutcome),
    {
        info!("Task for volume {}: bounds {}", task.channel_id, task.bounds);

        let mut layout = match Layout::build(&task.bounds) {
            Ok(layout) => layout,
            Err(e) => {
                error!("{}", e);
                return Err(e);
            }
        };
        info!(
            "Built {} layers with {} placeholders",
            layout.layers().len(),
            layout.placeholder_count()
        );

        let report = self.fill_layout(task.channel_id, &mut layout, on_chunk).await;
        info!(
            "{}/{} chunks applied, {} tiles written",
            report.applied_count(),
            ChunkOffset::ALL.len(),
            report.tiles_written()
        );

        Ok(PipelineOutput {
            task,
            layout,
            report,
        })
    }

    /// Requests every chunk of `volume_id` at once and routes each batch
    /// into `layout` as it arrives.
    pub async fn fill_layout<F>(&self, volume_id: u64, layout: &mut Layout, mut on_chunk: F) -> RunReport
    where
        F: FnMut(ChunkOffset, &ChunkOutcome),
    {
        let volume = *layout.bounds();
        let mut pending: FuturesUnordered<_> = ChunkOffset::ALL
            .into_iter()
            .map(|offset| async move {
                if let Some(region) = offset.bounds_within(&volume) {
                    debug!("Requesting chunk {} covering {}", offset, region);
                }
                (offset, self.api.fetch_tiles(volume_id, offset).await)
            })
            .collect();

        let mut report = RunReport::default();
        while let Some((offset, result)) = pending.next().await {
            let outcome = match result.and_then(|tiles| layout.apply_chunk(offset, tiles)) {
                Ok(tiles_written) => {
                    debug!("Chunk {}: {} tiles written", offset, tiles_written);
                    ChunkOutcome::Applied { tiles_written }
                }
                Err(e) => {
                    error!("Chunk {} skipped: {}", offset, e);
                    ChunkOutcome::Failed(e)
                }
            };
            on_chunk(offset, &outcome);
            report.chunks.push((offset, outcome));
        }
        report
    }
}
