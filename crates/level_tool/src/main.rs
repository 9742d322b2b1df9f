use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use engine::Vec2;
use game::level::Tilemap;
use level_tool::{
    parse_coordinate, parse_grid_key, parse_tile_kind, parse_variant, run, CommandKind,
};

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(1)
        }
    }
}

fn run_cli() -> Result<(), String> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    let Some(command) = args.first() else {
        return Err(usage_text());
    };
    if command == "-h" || command == "--help" {
        print_usage();
        return Ok(());
    }

    let path = args
        .get(1)
        .map(PathBuf::from)
        .ok_or_else(|| format!("{command} requires a level path"))?;
    let rest = &args[2..];

    let kind = match command.as_str() {
        "new" => {
            let mut tile_size = Tilemap::DEFAULT_TILE_SIZE;
            let mut index = 0usize;
            while index < rest.len() {
                match rest[index].as_str() {
                    "--tile-size" => {
                        let value = rest
                            .get(index + 1)
                            .ok_or_else(|| "missing value for --tile-size".to_string())?;
                        tile_size = value.parse::<u32>().map_err(|_| {
                            format!("invalid --tile-size value '{value}' (expected u32)")
                        })?;
                        index += 2;
                    }
                    other => return Err(format!("unknown new argument '{other}'")),
                }
            }
            CommandKind::New { path, tile_size }
        }
        "info" | "validate" | "autotile" => {
            if let Some(extra) = rest.first() {
                return Err(format!("{command} takes no options, got '{extra}'"));
            }
            match command.as_str() {
                "info" => CommandKind::Info { path },
                "validate" => CommandKind::Validate { path },
                _ => CommandKind::Autotile { path },
            }
        }
        "set" => {
            let [cell, kind, variant] = exact_args::<3>(command, rest, "<x;y> <type> <variant>")?;
            CommandKind::Set {
                path,
                pos: parse_grid_key(cell)?,
                kind: parse_tile_kind(kind)?,
                variant: parse_variant(variant)?,
            }
        }
        "erase" => {
            let [cell] = exact_args::<1>(command, rest, "<x;y>")?;
            CommandKind::Erase {
                path,
                pos: parse_grid_key(cell)?,
            }
        }
        "offgrid" => {
            let [x, y, kind, variant] = exact_args::<4>(command, rest, "<x> <y> <type> <variant>")?;
            CommandKind::Offgrid {
                path,
                pos: Vec2::new(parse_coordinate(x)?, parse_coordinate(y)?),
                kind: parse_tile_kind(kind)?,
                variant: parse_variant(variant)?,
            }
        }
        other => return Err(format!("unknown subcommand '{other}'")),
    };

    run(kind, &mut io::stdout())
}

fn exact_args<'a, const N: usize>(
    command: &str,
    rest: &'a [String],
    shape: &str,
) -> Result<[&'a str; N], String> {
    if rest.len() != N {
        return Err(format!("{command} expects <map.json> {shape}"));
    }
    Ok(std::array::from_fn(|index| rest[index].as_str()))
}

fn print_usage() {
    println!("{}", usage_text());
}

fn usage_text() -> String {
    [
        "level_tool - create and check Samurai Dash level files",
        "",
        "Usage:",
        "  level_tool new <map.json> [--tile-size <u32>]",
        "  level_tool info <map.json>",
        "  level_tool validate <map.json>",
        "  level_tool autotile <map.json>",
        "  level_tool set <map.json> <x;y> <type> <variant>",
        "  level_tool erase <map.json> <x;y>",
        "  level_tool offgrid <map.json> <x> <y> <type> <variant>",
        "",
        "Tile types: grass, stone, decor, large_decor, spawners",
        "Spawner variants: 0 player, 1 enemy",
        "",
        "Defaults:",
        "  --tile-size 16",
    ]
    .join("\n")
}
