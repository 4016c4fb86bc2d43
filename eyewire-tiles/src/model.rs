use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::chunk::ChunkOffset;
use crate::layout::PlaceholderKey;

#[derive(Error, Debug)]
pub enum TileError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Validation check failure! Bounds {bounds} do not span {expected} on every axis")]
    InvalidVolumeSize { bounds: Bounds, expected: i64 },
    #[error("Validation check failure! Chunk {offset} returned {count} tiles instead of {expected}")]
    InvalidTileCount {
        offset: ChunkOffset,
        count: usize,
        expected: usize,
    },
    #[error("Chunk {offset} returned tile {key} lying outside the chunk")]
    TileOutsideChunk {
        offset: ChunkOffset,
        key: PlaceholderKey,
    },
    #[error("No placeholder for tile key {0}")]
    UnknownPlaceholder(PlaceholderKey),
    #[error("Unsupported slicing plane: {0}")]
    UnsupportedSlicing(String),
    #[error("Tile source unavailable: {0}")]
    Unavailable(String),
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point3D {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl Point3D {
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// Per-axis sum, `None` on overflow.
    pub fn checked_add(&self, other: Point3D) -> Option<Point3D> {
        Some(Point3D {
            x: self.x.checked_add(other.x)?,
            y: self.y.checked_add(other.y)?,
            z: self.z.checked_add(other.z)?,
        })
    }

    /// Per-axis difference, `None` on overflow.
    pub fn checked_sub(&self, other: Point3D) -> Option<Point3D> {
        Some(Point3D {
            x: self.x.checked_sub(other.x)?,
            y: self.y.checked_sub(other.y)?,
            z: self.z.checked_sub(other.z)?,
        })
    }
}

impl fmt::Display for Point3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Axis-aligned box; `max` is exclusive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point3D,
    pub max: Point3D,
}

impl Bounds {
    pub const fn new(min: Point3D, max: Point3D) -> Self {
        Self { min, max }
    }

    /// Extent of the box along each axis, `None` if it does not fit in an `i64`.
    pub fn size(&self) -> Option<Point3D> {
        self.max.checked_sub(self.min)
    }

    /// Whether `p` lies inside the box.
    pub fn contains(&self, p: Point3D) -> bool {
        (self.min.x..self.max.x).contains(&p.x)
            && (self.min.y..self.max.y).contains(&p.y)
            && (self.min.z..self.max.z).contains(&p.z)
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.min, self.max)
    }
}

/// Response of the task assignment endpoint.
///
/// Only the fields the viewer needs are kept; anything else the
/// service sends is ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAssignment {
    pub channel_id: u64,
    pub bounds: Bounds,
}

/// One 2D image slice of a chunk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub bounds: Bounds,
    /// Image payload as sent by the service, normally a base64 `data:` URI.
    pub data: String,
}
