use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use engine::Vec2;
use game::assets::TileSet;
use game::level::{
    GridPos, MapFormatError, TileKind, Tilemap, ENEMY_SPAWNER, PLAYER_SPAWNER,
};

pub enum CommandKind {
    New { path: PathBuf, tile_size: u32 },
    Info { path: PathBuf },
    Validate { path: PathBuf },
    Autotile { path: PathBuf },
    /// Places an on-grid tile, replacing the cell's current tile.
    Set {
        path: PathBuf,
        pos: GridPos,
        kind: TileKind,
        variant: usize,
    },
    Erase { path: PathBuf, pos: GridPos },
    /// Adds a free-placed tile at a pixel position.
    Offgrid {
        path: PathBuf,
        pos: Vec2,
        kind: TileKind,
        variant: usize,
    },
}

pub fn parse_grid_key(raw: &str) -> Result<GridPos, String> {
    GridPos::parse_key(raw).ok_or_else(|| format!("invalid cell '{raw}' (expected x;y)"))
}

pub fn parse_tile_kind(raw: &str) -> Result<TileKind, String> {
    TileKind::from_name(raw).ok_or_else(|| {
        let names = TileKind::ALL.map(TileKind::as_str).join(", ");
        format!("unknown tile type '{raw}' (expected one of {names})")
    })
}

pub fn parse_variant(raw: &str) -> Result<usize, String> {
    raw.parse::<usize>()
        .map_err(|_| format!("invalid variant '{raw}' (expected usize)"))
}

pub fn parse_coordinate(raw: &str) -> Result<f32, String> {
    raw.parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| format!("invalid coordinate '{raw}' (expected a finite number)"))
}

/// Per-kind tile counts and grid bounds of a level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelSummary {
    pub tile_size: u32,
    pub ongrid: BTreeMap<TileKind, usize>,
    pub offgrid: BTreeMap<TileKind, usize>,
    pub player_spawners: usize,
    pub enemy_spawners: usize,
    /// Inclusive `(min_x, min_y, max_x, max_y)` over on-grid tiles.
    pub bounds: Option<(i32, i32, i32, i32)>,
}

impl LevelSummary {
    fn count_spawner(&mut self, variant: usize) {
        match variant {
            PLAYER_SPAWNER => self.player_spawners += 1,
            ENEMY_SPAWNER => self.enemy_spawners += 1,
            _ => {}
        }
    }
}

pub fn summarize(map: &Tilemap) -> LevelSummary {
    let mut summary = LevelSummary {
        tile_size: map.tile_size(),
        ..LevelSummary::default()
    };

    for tile in map.tiles() {
        *summary.ongrid.entry(tile.kind).or_default() += 1;
        if tile.kind == TileKind::Spawners {
            summary.count_spawner(tile.variant);
        }
        let (x, y) = (tile.pos.x, tile.pos.y);
        summary.bounds = Some(match summary.bounds {
            None => (x, y, x, y),
            Some((min_x, min_y, max_x, max_y)) => {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            }
        });
    }
    for tile in map.offgrid_tiles() {
        *summary.offgrid.entry(tile.kind).or_default() += 1;
        if tile.kind == TileKind::Spawners {
            summary.count_spawner(tile.variant);
        }
    }

    summary
}

pub fn run<W: Write>(kind: CommandKind, stdout: &mut W) -> Result<(), String> {
    match kind {
        CommandKind::New { path, tile_size } => {
            if tile_size == 0 {
                return Err("tile size must be positive".to_string());
            }
            Tilemap::new(tile_size)
                .save(&path)
                .map_err(|error| error.to_string())?;
            emit(stdout, format_args!("created {} (tile size {tile_size})", path.display()))
        }
        CommandKind::Info { path } => {
            let map = Tilemap::load(&path).map_err(|error| error.to_string())?;
            write_summary(stdout, &path, &summarize(&map))
        }
        CommandKind::Validate { path } => {
            let map = Tilemap::load(&path).map_err(|error| error.to_string())?;
            let invalid =
                |error: MapFormatError| format!("{} is invalid: {error}", path.display());
            map.check_spawners().map_err(invalid)?;
            map.check_variants(&TileSet::placeholder()).map_err(invalid)?;
            emit(stdout, format_args!("{} ok", path.display()))
        }
        CommandKind::Autotile { path } => {
            let mut map = Tilemap::load_or_empty(&path, Tilemap::DEFAULT_TILE_SIZE)
                .map_err(|error| error.to_string())?;
            map.autotile();
            map.save(&path).map_err(|error| error.to_string())?;
            emit(stdout, format_args!("autotiled {}", path.display()))
        }
        CommandKind::Set {
            path,
            pos,
            kind,
            variant,
        } => {
            check_variant(kind, variant)?;
            edit(&path, |map| map.insert(kind, variant, pos))?;
            emit(stdout, format_args!("set {} to {kind} {variant}", pos.key()))
        }
        CommandKind::Erase { path, pos } => {
            let mut removed = None;
            edit(&path, |map| removed = map.remove(pos))?;
            match removed {
                Some(tile) => emit(
                    stdout,
                    format_args!("erased {} {} at {}", tile.kind, tile.variant, pos.key()),
                ),
                None => emit(stdout, format_args!("no tile at {}", pos.key())),
            }
        }
        CommandKind::Offgrid {
            path,
            pos,
            kind,
            variant,
        } => {
            check_variant(kind, variant)?;
            edit(&path, |map| map.push_offgrid(kind, variant, pos))?;
            emit(
                stdout,
                format_args!("placed {kind} {variant} at ({}, {})", pos.x, pos.y),
            )
        }
    }
}

/// Loads `path` the way the editor does (missing file starts empty), applies
/// `change` and saves atomically.
fn edit(path: &Path, change: impl FnOnce(&mut Tilemap)) -> Result<(), String> {
    let mut map = Tilemap::load_or_empty(path, Tilemap::DEFAULT_TILE_SIZE)
        .map_err(|error| error.to_string())?;
    change(&mut map);
    map.save(path).map_err(|error| error.to_string())
}

fn check_variant(kind: TileKind, variant: usize) -> Result<(), String> {
    let available = TileSet::placeholder().variant_count(kind);
    if variant < available {
        Ok(())
    } else {
        Err(format!(
            "{kind} variant {variant} is out of range (only {available} available)"
        ))
    }
}

fn write_summary<W: Write>(stdout: &mut W, path: &Path, summary: &LevelSummary) -> Result<(), String> {
    emit(stdout, format_args!("level: {}", path.display()))?;
    emit(stdout, format_args!("tile_size: {}", summary.tile_size))?;
    for kind in TileKind::ALL {
        let ongrid = summary.ongrid.get(&kind).copied().unwrap_or(0);
        let offgrid = summary.offgrid.get(&kind).copied().unwrap_or(0);
        if ongrid + offgrid > 0 {
            emit(stdout, format_args!("{kind}: ongrid={ongrid} offgrid={offgrid}"))?;
        }
    }
    emit(
        stdout,
        format_args!(
            "spawners: player={} enemy={}",
            summary.player_spawners, summary.enemy_spawners
        ),
    )?;
    match summary.bounds {
        Some((min_x, min_y, max_x, max_y)) => emit(
            stdout,
            format_args!("bounds: x {min_x}..={max_x} y {min_y}..={max_y}"),
        ),
        None => emit(stdout, format_args!("bounds: empty")),
    }
}

fn emit<W: Write>(stdout: &mut W, line: std::fmt::Arguments<'_>) -> Result<(), String> {
    writeln!(stdout, "{line}").map_err(|error| format!("failed to write output: {error}"))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn output(kind: CommandKind) -> Result<String, String> {
        let mut out = Vec::new();
        run(kind, &mut out)?;
        Ok(String::from_utf8(out).expect("utf8 output"))
    }

    fn sample_level() -> Tilemap {
        let mut map = Tilemap::new(16);
        for x in -2..3 {
            map.insert(TileKind::Grass, 0, GridPos::new(x, 4));
        }
        map.insert(TileKind::Spawners, PLAYER_SPAWNER, GridPos::new(0, 3));
        map.insert(TileKind::Spawners, ENEMY_SPAWNER, GridPos::new(2, 3));
        map.push_offgrid(TileKind::LargeDecor, 2, Vec2::new(5.5, 20.0));
        map
    }

    #[test]
    fn summary_counts_kinds_spawners_and_bounds() {
        let summary = summarize(&sample_level());

        assert_eq!(summary.tile_size, 16);
        assert_eq!(summary.ongrid.get(&TileKind::Grass), Some(&5));
        assert_eq!(summary.offgrid.get(&TileKind::LargeDecor), Some(&1));
        assert_eq!((summary.player_spawners, summary.enemy_spawners), (1, 1));
        assert_eq!(summary.bounds, Some((-2, 3, 2, 4)));
    }

    #[test]
    fn empty_level_has_no_bounds() {
        assert_eq!(summarize(&Tilemap::new(8)).bounds, None);
    }

    #[test]
    fn new_writes_loadable_empty_level() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("0.json");

        let text = output(CommandKind::New {
            path: path.clone(),
            tile_size: 24,
        })
        .expect("new");

        assert!(text.contains("tile size 24"));
        let map = Tilemap::load(&path).expect("load");
        assert_eq!(map.tile_size(), 24);
        assert_eq!(map.tiles().count(), 0);
    }

    #[test]
    fn new_rejects_zero_tile_size() {
        let temp = TempDir::new().expect("temp dir");
        let result = output(CommandKind::New {
            path: temp.path().join("0.json"),
            tile_size: 0,
        });
        assert!(result.is_err());
    }

    #[test]
    fn validate_reports_missing_player_spawner() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("1.json");
        Tilemap::new(16).save(&path).expect("save");

        let error = output(CommandKind::Validate { path }).expect_err("invalid");
        assert!(error.contains("no player spawner"), "{error}");
    }

    #[test]
    fn validate_accepts_sample_level() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("2.json");
        sample_level().save(&path).expect("save");

        let text = output(CommandKind::Validate { path }).expect("valid");
        assert!(text.ends_with("ok\n"));
    }

    #[test]
    fn info_prints_counts() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("3.json");
        sample_level().save(&path).expect("save");

        let text = output(CommandKind::Info { path }).expect("info");
        assert!(text.contains("grass: ongrid=5 offgrid=0"), "{text}");
        assert!(text.contains("spawners: player=1 enemy=1"));
        assert!(text.contains("bounds: x -2..=2 y 3..=4"));
    }

    #[test]
    fn info_on_missing_file_fails() {
        let temp = TempDir::new().expect("temp dir");
        let result = output(CommandKind::Info {
            path: temp.path().join("missing.json"),
        });
        assert!(result.is_err());
    }

    #[test]
    fn autotile_rewrites_variants_in_place() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("4.json");
        let mut map = sample_level();
        for x in -2..3 {
            map.insert(TileKind::Grass, 0, GridPos::new(x, 5));
        }
        map.save(&path).expect("save");

        output(CommandKind::Autotile { path: path.clone() }).expect("autotile");

        let map = Tilemap::load(&path).expect("reload");
        let left_end = map.tile_at(GridPos::new(-2, 4)).expect("tile");
        let middle = map.tile_at(GridPos::new(0, 4)).expect("tile");
        assert_eq!((left_end.variant, middle.variant), (0, 1));
    }

    #[test]
    fn autotile_on_missing_file_creates_empty_level() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("fresh.json");

        output(CommandKind::Autotile { path: path.clone() }).expect("autotile");

        let map = Tilemap::load(&path).expect("load");
        assert_eq!(map.tile_size(), Tilemap::DEFAULT_TILE_SIZE);
    }

    #[test]
    fn argument_parsers_accept_editor_values() {
        assert_eq!(parse_grid_key("3;-2"), Ok(GridPos::new(3, -2)));
        assert!(parse_grid_key("3,-2").is_err());
        assert_eq!(parse_tile_kind("large_decor"), Ok(TileKind::LargeDecor));
        assert!(parse_tile_kind("lava").unwrap_err().contains("grass"));
        assert_eq!(parse_variant("4"), Ok(4));
        assert!(parse_variant("-1").is_err());
        assert_eq!(parse_coordinate("12.5"), Ok(12.5));
        assert!(parse_coordinate("inf").is_err());
    }

    #[test]
    fn set_places_tile_in_missing_file() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("5.json");

        let text = output(CommandKind::Set {
            path: path.clone(),
            pos: GridPos::new(4, 7),
            kind: TileKind::Stone,
            variant: 3,
        })
        .expect("set");

        assert!(text.contains("set 4;7 to stone 3"), "{text}");
        let map = Tilemap::load(&path).expect("load");
        let tile = map.tile_at(GridPos::new(4, 7)).expect("tile");
        assert_eq!((tile.kind, tile.variant), (TileKind::Stone, 3));
    }

    #[test]
    fn set_replaces_existing_cell() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("6.json");
        sample_level().save(&path).expect("save");

        output(CommandKind::Set {
            path: path.clone(),
            pos: GridPos::new(0, 4),
            kind: TileKind::Decor,
            variant: 1,
        })
        .expect("set");

        let map = Tilemap::load(&path).expect("load");
        let tile = map.tile_at(GridPos::new(0, 4)).expect("tile");
        assert_eq!(tile.kind, TileKind::Decor);
        assert_eq!(map.tiles().count(), 7);
    }

    #[test]
    fn set_rejects_out_of_range_variant_without_writing() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("7.json");

        let error = output(CommandKind::Set {
            path: path.clone(),
            pos: GridPos::new(0, 0),
            kind: TileKind::Spawners,
            variant: 2,
        })
        .expect_err("out of range");

        assert!(error.contains("out of range"), "{error}");
        assert!(!path.exists());
    }

    #[test]
    fn erase_removes_only_the_named_cell() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("8.json");
        sample_level().save(&path).expect("save");

        let text = output(CommandKind::Erase {
            path: path.clone(),
            pos: GridPos::new(2, 3),
        })
        .expect("erase");
        assert!(text.contains("erased spawners 1 at 2;3"), "{text}");

        let map = Tilemap::load(&path).expect("load");
        assert!(map.tile_at(GridPos::new(2, 3)).is_none());
        assert_eq!(map.tiles().count(), 6);
        assert_eq!(map.offgrid_tiles().len(), 1);

        let text = output(CommandKind::Erase {
            path,
            pos: GridPos::new(2, 3),
        })
        .expect("erase empty cell");
        assert!(text.contains("no tile at 2;3"));
    }

    #[test]
    fn offgrid_appends_free_tile() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("9.json");
        sample_level().save(&path).expect("save");

        output(CommandKind::Offgrid {
            path: path.clone(),
            pos: Vec2::new(-12.5, 30.0),
            kind: TileKind::Decor,
            variant: 3,
        })
        .expect("offgrid");

        let map = Tilemap::load(&path).expect("load");
        let placed = map.offgrid_tiles().last().expect("offgrid tile");
        assert_eq!(placed.kind, TileKind::Decor);
        assert_eq!(placed.pos, Vec2::new(-12.5, 30.0));
        assert_eq!(map.offgrid_tiles().len(), 2);
    }
}
