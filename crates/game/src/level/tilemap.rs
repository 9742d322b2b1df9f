use std::collections::BTreeMap;
use std::fmt;

use engine::{Rect, Surface, Vec2};
use serde::{Deserialize, Serialize};

use crate::assets::TileSet;

/// Tile material. `Grass` and `Stone` are solid and auto-tiled; the rest are
/// decoration or level markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Grass,
    Stone,
    Decor,
    LargeDecor,
    Spawners,
}

impl TileKind {
    pub const ALL: [TileKind; 5] = [
        TileKind::Grass,
        TileKind::Stone,
        TileKind::Decor,
        TileKind::LargeDecor,
        TileKind::Spawners,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TileKind::Grass => "grass",
            TileKind::Stone => "stone",
            TileKind::Decor => "decor",
            TileKind::LargeDecor => "large_decor",
            TileKind::Spawners => "spawners",
        }
    }

    /// Inverse of [`TileKind::as_str`].
    pub fn from_name(name: &str) -> Option<Self> {
        TileKind::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    pub fn is_solid(self) -> bool {
        matches!(self, TileKind::Grass | TileKind::Stone)
    }

    pub fn is_autotiled(self) -> bool {
        matches!(self, TileKind::Grass | TileKind::Stone)
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Integer grid cell. Serialized as the `"x;y"` key of the level document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn key(self) -> String {
        format!("{};{}", self.x, self.y)
    }

    pub fn parse_key(key: &str) -> Option<Self> {
        let (x, y) = key.split_once(';')?;
        Some(Self {
            x: x.trim().parse().ok()?,
            y: y.trim().parse().ok()?,
        })
    }

    fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub kind: TileKind,
    pub variant: usize,
    pub pos: GridPos,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffgridTile {
    pub kind: TileKind,
    pub variant: usize,
    pub pos: Vec2,
}

/// A tile returned by [`Tilemap::extract`], always in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractedTile {
    pub kind: TileKind,
    pub variant: usize,
    pub pos: Vec2,
}

/// 3x3 window around a cell. Iteration order is part of collision
/// resolution: rectangles are tested in this order.
const NEIGHBOR_OFFSETS: [(i32, i32); 9] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (0, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

const NEIGHBOR_RIGHT: u8 = 1;
const NEIGHBOR_LEFT: u8 = 1 << 1;
const NEIGHBOR_UP: u8 = 1 << 2;
const NEIGHBOR_DOWN: u8 = 1 << 3;

fn autotile_variant(mask: u8) -> Option<usize> {
    const RIGHT_DOWN: u8 = NEIGHBOR_RIGHT | NEIGHBOR_DOWN;
    const RIGHT_DOWN_LEFT: u8 = NEIGHBOR_RIGHT | NEIGHBOR_DOWN | NEIGHBOR_LEFT;
    const LEFT_DOWN: u8 = NEIGHBOR_LEFT | NEIGHBOR_DOWN;
    const LEFT_UP_DOWN: u8 = NEIGHBOR_LEFT | NEIGHBOR_UP | NEIGHBOR_DOWN;
    const LEFT_UP: u8 = NEIGHBOR_LEFT | NEIGHBOR_UP;
    const LEFT_UP_RIGHT: u8 = NEIGHBOR_LEFT | NEIGHBOR_UP | NEIGHBOR_RIGHT;
    const RIGHT_UP: u8 = NEIGHBOR_RIGHT | NEIGHBOR_UP;
    const RIGHT_UP_DOWN: u8 = NEIGHBOR_RIGHT | NEIGHBOR_UP | NEIGHBOR_DOWN;
    const ALL: u8 = NEIGHBOR_RIGHT | NEIGHBOR_LEFT | NEIGHBOR_UP | NEIGHBOR_DOWN;

    match mask {
        RIGHT_DOWN => Some(0),
        RIGHT_DOWN_LEFT => Some(1),
        LEFT_DOWN => Some(2),
        LEFT_UP_DOWN => Some(3),
        LEFT_UP => Some(4),
        LEFT_UP_RIGHT => Some(5),
        RIGHT_UP => Some(6),
        RIGHT_UP_DOWN => Some(7),
        ALL => Some(8),
        _ => None,
    }
}

/// Static level geometry: a sparse grid of tiles plus free-placed decoration.
#[derive(Debug, Clone, PartialEq)]
pub struct Tilemap {
    tile_size: u32,
    tiles: BTreeMap<GridPos, Tile>,
    offgrid: Vec<OffgridTile>,
}

impl Tilemap {
    pub const DEFAULT_TILE_SIZE: u32 = 16;

    pub fn new(tile_size: u32) -> Self {
        Self {
            tile_size: tile_size.max(1),
            tiles: BTreeMap::new(),
            offgrid: Vec::new(),
        }
    }

    pub(crate) fn from_parts(
        tile_size: u32,
        tiles: BTreeMap<GridPos, Tile>,
        offgrid: Vec<OffgridTile>,
    ) -> Self {
        Self {
            tile_size: tile_size.max(1),
            tiles,
            offgrid,
        }
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn tile_at(&self, pos: GridPos) -> Option<&Tile> {
        self.tiles.get(&pos)
    }

    pub fn offgrid_tiles(&self) -> &[OffgridTile] {
        &self.offgrid
    }

    /// Places a tile, replacing whatever occupied the cell.
    pub fn insert(&mut self, kind: TileKind, variant: usize, pos: GridPos) {
        self.tiles.insert(pos, Tile { kind, variant, pos });
    }

    pub fn remove(&mut self, pos: GridPos) -> Option<Tile> {
        self.tiles.remove(&pos)
    }

    pub fn push_offgrid(&mut self, kind: TileKind, variant: usize, pos: Vec2) {
        self.offgrid.push(OffgridTile { kind, variant, pos });
    }

    pub fn grid_pos_of(&self, point: Vec2) -> GridPos {
        let size = self.tile_size as f32;
        GridPos::new(
            (point.x / size).floor() as i32,
            (point.y / size).floor() as i32,
        )
    }

    fn cell_rect(&self, pos: GridPos) -> Rect {
        let size = self.tile_size as f32;
        Rect::new(pos.x as f32 * size, pos.y as f32 * size, size, size)
    }

    /// True when the cell containing `point` holds a solid tile.
    pub fn solid_check(&self, point: Vec2) -> bool {
        self.tiles
            .get(&self.grid_pos_of(point))
            .is_some_and(|tile| tile.kind.is_solid())
    }

    /// Solid tile rectangles in the 3x3 neighborhood of the cell containing
    /// `position`.
    pub fn physics_rects_around(&self, position: Vec2) -> Vec<Rect> {
        let center = self.grid_pos_of(position);
        NEIGHBOR_OFFSETS
            .iter()
            .map(|(dx, dy)| center.offset(*dx, *dy))
            .filter(|cell| {
                self.tiles
                    .get(cell)
                    .is_some_and(|tile| tile.kind.is_solid())
            })
            .map(|cell| self.cell_rect(cell))
            .collect()
    }

    /// Collects every tile whose `(kind, variant)` is listed in `id_pairs`,
    /// off-grid tiles first. Unless `keep` is set, matches are removed from
    /// both storages.
    pub fn extract(&mut self, id_pairs: &[(TileKind, usize)], keep: bool) -> Vec<ExtractedTile> {
        let wanted = |kind: TileKind, variant: usize| id_pairs.contains(&(kind, variant));
        let mut matches = Vec::new();

        for tile in &self.offgrid {
            if wanted(tile.kind, tile.variant) {
                matches.push(ExtractedTile {
                    kind: tile.kind,
                    variant: tile.variant,
                    pos: tile.pos,
                });
            }
        }
        if !keep {
            self.offgrid.retain(|tile| !wanted(tile.kind, tile.variant));
        }

        let size = self.tile_size as f32;
        for tile in self.tiles.values() {
            if wanted(tile.kind, tile.variant) {
                matches.push(ExtractedTile {
                    kind: tile.kind,
                    variant: tile.variant,
                    pos: Vec2::new(tile.pos.x as f32 * size, tile.pos.y as f32 * size),
                });
            }
        }
        if !keep {
            self.tiles.retain(|_, tile| !wanted(tile.kind, tile.variant));
        }

        matches
    }

    /// Picks border variants for grass and stone from same-kind cardinal
    /// neighbors. Neighbor shapes without a table entry keep their variant.
    pub fn autotile(&mut self) {
        let updates: Vec<(GridPos, usize)> = self
            .tiles
            .values()
            .filter(|tile| tile.kind.is_autotiled())
            .filter_map(|tile| {
                let mask = self.neighbor_mask(tile);
                autotile_variant(mask).map(|variant| (tile.pos, variant))
            })
            .collect();

        for (pos, variant) in updates {
            if let Some(tile) = self.tiles.get_mut(&pos) {
                tile.variant = variant;
            }
        }
    }

    fn neighbor_mask(&self, tile: &Tile) -> u8 {
        [
            (1, 0, NEIGHBOR_RIGHT),
            (-1, 0, NEIGHBOR_LEFT),
            (0, -1, NEIGHBOR_UP),
            (0, 1, NEIGHBOR_DOWN),
        ]
        .iter()
        .filter(|(dx, dy, _)| {
            self.tiles
                .get(&tile.pos.offset(*dx, *dy))
                .is_some_and(|neighbor| neighbor.kind == tile.kind)
        })
        .fold(0, |mask, (_, _, bit)| mask | bit)
    }

    /// Draws off-grid tiles, then the on-grid cells that can intersect the
    /// view. `offset` is the camera position in whole pixels.
    pub fn render(&self, surface: &mut Surface, offset: Vec2, tile_set: &TileSet) {
        for tile in &self.offgrid {
            if let Some(sprite) = tile_set.sprite(tile.kind, tile.variant) {
                surface.blit(sprite, tile.pos - offset);
            }
        }

        let size = self.tile_size as f32;
        let view = surface.size();
        let first = self.grid_pos_of(offset).offset(-1, -1);
        let last = self.grid_pos_of(offset + view).offset(1, 1);
        for y in first.y..=last.y {
            for x in first.x..=last.x {
                let Some(tile) = self.tiles.get(&GridPos::new(x, y)) else {
                    continue;
                };
                if let Some(sprite) = tile_set.sprite(tile.kind, tile.variant) {
                    let at = Vec2::new(x as f32 * size, y as f32 * size) - offset;
                    surface.blit(sprite, at);
                }
            }
        }
    }
}

impl Default for Tilemap {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TILE_SIZE)
    }
}
