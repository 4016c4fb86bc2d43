//! Partitioning of an assigned volume into chunks, and the tile URLs for them.

use std::fmt;
use std::str::FromStr;

use crate::model::{Bounds, Point3D, TileError};
use crate::TileResult;

/// Finest resolution level served by the data endpoint.
pub const MIP_LEVEL: u32 = 0;
pub const FIRST_TILE_INDEX: usize = 0;
/// Edge length of one chunk; also the number of tiles in a chunk.
pub const CHUNK_SIZE: i64 = 128;
/// Edge length of an assigned volume.
pub const VOLUME_SIZE: i64 = 256;

/// Number of tiles the data endpoint returns per chunk request.
pub const TILES_PER_CHUNK: usize = CHUNK_SIZE as usize;

/// Position of a chunk within the 2×2×2 subdivision of a volume.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkOffset {
    pub x: u8,
    pub y: u8,
    pub z: u8,
}

impl ChunkOffset {
    /// Every chunk of a volume, in request order.
    pub const ALL: [ChunkOffset; 8] = [
        ChunkOffset::new(0, 0, 0),
        ChunkOffset::new(0, 0, 1),
        ChunkOffset::new(0, 1, 0),
        ChunkOffset::new(0, 1, 1),
        ChunkOffset::new(1, 0, 0),
        ChunkOffset::new(1, 0, 1),
        ChunkOffset::new(1, 1, 0),
        ChunkOffset::new(1, 1, 1),
    ];

    pub const fn new(x: u8, y: u8, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Region of `volume` covered by this chunk, `None` if its corners
    /// fall outside the `i64` range.
    pub fn bounds_within(&self, volume: &Bounds) -> Option<Bounds> {
        let shift = Point3D::new(
            i64::from(self.x) * CHUNK_SIZE,
            i64::from(self.y) * CHUNK_SIZE,
            i64::from(self.z) * CHUNK_SIZE,
        );
        let min = volume.min.checked_add(shift)?;
        let max = min.checked_add(Point3D::new(CHUNK_SIZE, CHUNK_SIZE, CHUNK_SIZE))?;
        Some(Bounds::new(min, max))
    }
}

impl fmt::Display for ChunkOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.x, self.y, self.z)
    }
}

/// Plane along which tiles are cut from a chunk.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Slicing {
    #[default]
    Xy,
    Xz,
    Zy,
}

impl Slicing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Slicing::Xy => "xy",
            Slicing::Xz => "xz",
            Slicing::Zy => "zy",
        }
    }
}

impl fmt::Display for Slicing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Slicing {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xy" => Ok(Slicing::Xy),
            "xz" => Ok(Slicing::Xz),
            "zy" => Ok(Slicing::Zy),
            _ => Err(TileError::UnsupportedSlicing(s.into())),
        }
    }
}

/// Checks that `bounds` spans exactly [`VOLUME_SIZE`] on every axis.
///
/// A box whose extent overflows `i64` is rejected like any other size
/// mismatch.
pub fn validate_volume(bounds: &Bounds) -> TileResult<()> {
    match bounds.size() {
        Some(size) if size.x == VOLUME_SIZE && size.y == VOLUME_SIZE && size.z == VOLUME_SIZE => {
            Ok(())
        }
        _ => Err(TileError::InvalidVolumeSize {
            bounds: *bounds,
            expected: VOLUME_SIZE,
        }),
    }
}

/// Builds the URL serving all tiles of one chunk.
///
/// The shape is
/// `{data_url}/volume/{id}/chunk/{mip}/{cx}/{cy}/{cz}/tile/{slicing}/{start}:{count}`.
pub fn tiles_url(
    data_url: &str,
    volume_id: u64,
    mip_level: u32,
    offset: ChunkOffset,
    slicing: Slicing,
) -> String {
    format!(
        "{}/volume/{}/chunk/{}/{}/{}/{}/tile/{}/{}:{}",
        data_url.trim_end_matches('/'),
        volume_id,
        mip_level,
        offset.x,
        offset.y,
        offset.z,
        slicing,
        FIRST_TILE_INDEX,
        TILES_PER_CHUNK
    )
}
