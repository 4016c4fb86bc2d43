//! The placeholder registry that tile payloads are routed into.
//!
//! A [`Layout`] holds one [`Layer`] per Z coordinate of the assigned volume,
//! and each layer holds four placeholders arranged as a 2×2 grid of chunk
//! columns in X/Y. Placeholders are addressed by [`PlaceholderKey`], which
//! is computed from a tile's minimum corner alone, so the layout and the
//! tile fetcher agree on routing without sharing any other state.

use std::collections::HashMap;
use std::fmt;

use crate::chunk::{validate_volume, ChunkOffset, CHUNK_SIZE, TILES_PER_CHUNK, VOLUME_SIZE};
use crate::model::{Bounds, Point3D, Tile, TileError};
use crate::TileResult;

pub const TILE_IMG_ID_PREFIX: &str = "tileImg_";
pub const IMG_CONTAINER_ID_PREFIX: &str = "imgContainer_";

/// Address of one placeholder: the tile's minimum X and Y, and its Z.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceholderKey {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl PlaceholderKey {
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    pub fn for_tile(tile: &Tile) -> Self {
        let min = tile.bounds.min;
        Self::new(min.x, min.y, min.z)
    }

    /// Element id of the image holding this placeholder, e.g. `tileImg_0_128_7`.
    pub fn element_id(&self) -> String {
        format!("{}{}", TILE_IMG_ID_PREFIX, self)
    }
}

impl fmt::Display for PlaceholderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.x, self.y, self.z)
    }
}

/// All placeholders sharing one Z coordinate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layer {
    pub z: i64,
    pub slots: [PlaceholderKey; 4],
}

impl Layer {
    pub fn container_id(&self) -> String {
        format!("{}{}", IMG_CONTAINER_ID_PREFIX, self.z)
    }
}

#[derive(Debug, Clone)]
pub struct Layout {
    bounds: Bounds,
    layers: Vec<Layer>,
    slots: HashMap<PlaceholderKey, Option<String>>,
}

impl Layout {
    /// Creates every layer and placeholder for `bounds`, all empty.
    ///
    /// Fails without creating anything if the volume is not exactly
    /// [`crate::chunk::VOLUME_SIZE`] on each axis.
    pub fn build(bounds: &Bounds) -> TileResult<Self> {
        validate_volume(bounds)?;

        let (min, max) = (bounds.min, bounds.max);
        let far = min
            .checked_add(Point3D::new(CHUNK_SIZE, CHUNK_SIZE, 0))
            .ok_or(TileError::InvalidVolumeSize {
                bounds: *bounds,
                expected: VOLUME_SIZE,
            })?;
        let depth = VOLUME_SIZE as usize;
        let mut layers = Vec::with_capacity(depth);
        let mut slots = HashMap::with_capacity(depth * 4);

        for z in min.z..max.z {
            let layer = Layer {
                z,
                slots: [
                    PlaceholderKey::new(min.x, min.y, z),
                    PlaceholderKey::new(far.x, min.y, z),
                    PlaceholderKey::new(min.x, far.y, z),
                    PlaceholderKey::new(far.x, far.y, z),
                ],
            };
            for key in layer.slots {
                slots.insert(key, None);
            }
            layers.push(layer);
        }

        Ok(Self {
            bounds: *bounds,
            layers,
            slots,
        })
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Layers in ascending Z order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn placeholder_count(&self) -> usize {
        self.slots.len()
    }

    pub fn contains(&self, key: &PlaceholderKey) -> bool {
        self.slots.contains_key(key)
    }

    /// Payload written into `key`, if any.
    pub fn get(&self, key: &PlaceholderKey) -> Option<&str> {
        self.slots.get(key).and_then(|slot| slot.as_deref())
    }

    /// Writes `data` into an existing placeholder, replacing what was there.
    pub fn set(&mut self, key: &PlaceholderKey, data: String) -> TileResult<()> {
        match self.slots.get_mut(key) {
            Some(slot) => {
                *slot = Some(data);
                Ok(())
            }
            None => Err(TileError::UnknownPlaceholder(*key)),
        }
    }

    /// Routes one chunk's batch of tiles into their placeholders.
    ///
    /// The batch is checked as a whole first: it must hold exactly
    /// [`TILES_PER_CHUNK`] tiles, each tile's minimum corner must lie in the
    /// region of `offset`, and every tile must address an existing
    /// placeholder. On any failure nothing is written.
    /// Returns the number of placeholders written.
    pub fn apply_chunk(&mut self, offset: ChunkOffset, tiles: Vec<Tile>) -> TileResult<usize> {
        if tiles.len() != TILES_PER_CHUNK {
            return Err(TileError::InvalidTileCount {
                offset,
                count: tiles.len(),
                expected: TILES_PER_CHUNK,
            });
        }
        let region = offset
            .bounds_within(&self.bounds)
            .ok_or(TileError::InvalidVolumeSize {
                bounds: self.bounds,
                expected: VOLUME_SIZE,
            })?;
        if let Some(tile) = tiles.iter().find(|tile| !region.contains(tile.bounds.min)) {
            return Err(TileError::TileOutsideChunk {
                offset,
                key: PlaceholderKey::for_tile(tile),
            });
        }
        if let Some(tile) = tiles
            .iter()
            .find(|tile| !self.contains(&PlaceholderKey::for_tile(tile)))
        {
            return Err(TileError::UnknownPlaceholder(PlaceholderKey::for_tile(tile)));
        }

        let written = tiles.len();
        for tile in tiles {
            let key = PlaceholderKey::for_tile(&tile);
            self.set(&key, tile.data)?;
        }
        Ok(written)
    }

    pub fn filled_count(&self) -> usize {
        self.slots.values().filter(|slot| slot.is_some()).count()
    }

    /// Written placeholders, layer by layer in slot order.
    pub fn filled(&self) -> impl Iterator<Item = (PlaceholderKey, &str)> + '_ {
        self.layers
            .iter()
            .flat_map(|layer| layer.slots.iter())
            .filter_map(|key| self.get(key).map(|data| (*key, data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume_at(x: i64, y: i64, z: i64) -> Bounds {
        Bounds::new(Point3D::new(x, y, z), Point3D::new(x + 256, y + 256, z + 256))
    }

    fn xy_tiles(min_x: i64, min_y: i64, z0: i64, count: usize) -> Vec<Tile> {
        (0..count as i64)
            .map(|i| Tile {
                bounds: Bounds::new(
                    Point3D::new(min_x, min_y, z0 + i),
                    Point3D::new(min_x + 128, min_y + 128, z0 + i + 1),
                ),
                data: format!("tile-{}-{}-{}", min_x, min_y, z0 + i),
            })
            .collect()
    }

    #[test]
    fn test_build_creates_every_placeholder() {
        let layout = Layout::build(&volume_at(512, 1024, 64)).unwrap();
        assert_eq!(layout.layers().len(), 256);
        assert_eq!(layout.placeholder_count(), 1024);
        assert_eq!(layout.filled_count(), 0);

        for z in 64..320 {
            for x in [512, 640] {
                for y in [1024, 1152] {
                    assert!(layout.contains(&PlaceholderKey::new(x, y, z)));
                }
            }
        }
        assert!(!layout.contains(&PlaceholderKey::new(512, 1024, 320)));
        assert!(!layout.contains(&PlaceholderKey::new(513, 1024, 64)));
    }

    #[test]
    fn test_layer_naming_and_slot_order() {
        let layout = Layout::build(&volume_at(0, 0, 0)).unwrap();
        let layer = &layout.layers()[3];
        assert_eq!(layer.container_id(), "imgContainer_3");
        let ids: Vec<String> = layer.slots.iter().map(|k| k.element_id()).collect();
        assert_eq!(
            ids,
            ["tileImg_0_0_3", "tileImg_128_0_3", "tileImg_0_128_3", "tileImg_128_128_3"]
        );
    }

    #[test]
    fn test_build_rejects_wrong_size() {
        let bounds = Bounds::new(Point3D::new(0, 0, 0), Point3D::new(256, 256, 128));
        assert!(matches!(
            Layout::build(&bounds),
            Err(TileError::InvalidVolumeSize { .. })
        ));
    }

    #[test]
    fn test_apply_chunk_writes_only_its_placeholders() {
        let mut layout = Layout::build(&volume_at(0, 0, 0)).unwrap();
        let written = layout
            .apply_chunk(ChunkOffset::new(0, 0, 0), xy_tiles(0, 0, 0, 128))
            .unwrap();
        assert_eq!(written, 128);
        assert_eq!(layout.filled_count(), 128);
        assert_eq!(layout.get(&PlaceholderKey::new(0, 0, 0)), Some("tile-0-0-0"));
        assert_eq!(layout.get(&PlaceholderKey::new(0, 0, 127)), Some("tile-0-0-127"));
        assert_eq!(layout.get(&PlaceholderKey::new(0, 0, 128)), None);
        assert_eq!(layout.get(&PlaceholderKey::new(128, 0, 0)), None);
    }

    #[test]
    fn test_apply_chunk_wrong_count_writes_nothing() {
        let mut layout = Layout::build(&volume_at(0, 0, 0)).unwrap();
        let err = layout
            .apply_chunk(ChunkOffset::new(0, 0, 0), xy_tiles(0, 0, 0, 127))
            .unwrap_err();
        assert!(matches!(
            err,
            TileError::InvalidTileCount { count: 127, expected: 128, .. }
        ));
        assert_eq!(layout.filled_count(), 0);
    }

    #[test]
    fn test_apply_chunk_unknown_key_writes_nothing() {
        let mut layout = Layout::build(&volume_at(0, 0, 0)).unwrap();
        let mut tiles = xy_tiles(0, 0, 0, 128);
        tiles[77].bounds.min.x = 64;
        let err = layout
            .apply_chunk(ChunkOffset::new(0, 0, 0), tiles)
            .unwrap_err();
        match err {
            TileError::UnknownPlaceholder(key) => assert_eq!(key, PlaceholderKey::new(64, 0, 77)),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(layout.filled_count(), 0);
    }

    #[test]
    fn test_apply_chunk_rejects_tiles_of_another_chunk() {
        let mut layout = Layout::build(&volume_at(0, 0, 0)).unwrap();
        let err = layout
            .apply_chunk(ChunkOffset::new(0, 0, 0), xy_tiles(128, 128, 128, 128))
            .unwrap_err();
        match err {
            TileError::TileOutsideChunk { offset, key } => {
                assert_eq!(offset, ChunkOffset::new(0, 0, 0));
                assert_eq!(key, PlaceholderKey::new(128, 128, 128));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(layout.filled_count(), 0);

        // One stray tile is enough to reject the batch.
        let mut tiles = xy_tiles(0, 128, 0, 128);
        tiles[5].bounds.min.z = 130;
        assert!(matches!(
            layout.apply_chunk(ChunkOffset::new(0, 1, 0), tiles),
            Err(TileError::TileOutsideChunk { .. })
        ));
        assert_eq!(layout.filled_count(), 0);
    }

    #[test]
    fn test_build_near_top_of_range() {
        let top = i64::MAX - 256;
        let layout = Layout::build(&volume_at(top, top, top)).unwrap();
        let last = layout.layers().last().unwrap();
        assert_eq!(last.z, i64::MAX - 1);
        assert_eq!(last.slots[3], PlaceholderKey::new(top + 128, top + 128, i64::MAX - 1));
    }

    #[test]
    fn test_build_rejects_wrapping_bounds() {
        let bounds = Bounds::new(
            Point3D::new(i64::MAX - 100, 0, 0),
            Point3D::new(i64::MIN + 155, 256, 256),
        );
        assert!(matches!(
            Layout::build(&bounds),
            Err(TileError::InvalidVolumeSize { .. })
        ));
    }

    #[test]
    fn test_set_overwrites() {
        let mut layout = Layout::build(&volume_at(0, 0, 0)).unwrap();
        let key = PlaceholderKey::new(128, 128, 200);
        layout.set(&key, "first".into()).unwrap();
        layout.set(&key, "second".into()).unwrap();
        assert_eq!(layout.get(&key), Some("second"));
        assert_eq!(layout.filled_count(), 1);
        assert!(layout.set(&PlaceholderKey::new(1, 2, 3), "x".into()).is_err());
    }

    #[test]
    fn test_filled_iterates_in_layer_order() {
        let mut layout = Layout::build(&volume_at(0, 0, 0)).unwrap();
        layout.set(&PlaceholderKey::new(0, 128, 5), "b".into()).unwrap();
        layout.set(&PlaceholderKey::new(128, 0, 5), "a".into()).unwrap();
        layout.set(&PlaceholderKey::new(0, 0, 1), "first".into()).unwrap();
        let order: Vec<&str> = layout.filled().map(|(_, data)| data).collect();
        assert_eq!(order, ["first", "a", "b"]);
    }
}
