use std::path::PathBuf;
use std::process::ExitCode;
use clap::Parser;
use tilemeta::{builtin, validate, AssetLoader, FileProtocol, Tileset, TsxLoader, ValidationConfig};

/// Inspects and validates Tiled tileset descriptors.
#[derive(Parser, Debug)]
#[command(name = "tilemeta", version)]
struct Args {
    /// Path to a .tsx file. Uses the embedded tileset when omitted.
    path: Option<String>,
    /// YAML file with extra validation rules.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Compare the atlas image on disk with its declared size.
    #[arg(long)]
    check_image: bool,
    /// Print the properties of a single tile.
    #[arg(long)]
    tile: Option<u32>,
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();
    #[cfg(feature = "profile")]
    let _guard = init_profiling()?;

    let args = Args::parse();
    let tileset = match args.path.as_deref() {
        Some(path) => TsxLoader.load_path(&FileProtocol, path)?,
        None => {
            log::info!("No path given, using embedded tileset");
            TsxLoader.load_path(&builtin::protocol(), builtin::TILESET_PATH)?
        },
    };
    let mut config = match &args.config {
        Some(path) => ValidationConfig::load(path)?,
        None => ValidationConfig::default(),
    };
    config.check_image |= args.check_image;

    print_summary(&tileset);
    if let Some(id) = args.tile {
        match tileset.tile(id) {
            Some(tile) => {
                println!("tile {id}: {}", tile.meta);
                for property in tile.properties.iter() {
                    println!("  {} ({}) = {}", property.name, property.value.type_name(), property.value);
                }
            },
            None => println!("tile {id}: no properties"),
        }
    }

    let report = validate(&tileset, &config);
    print!("{report}");
    if report.is_ok() {
        Ok(ExitCode::SUCCESS)
    }
    else {
        log::info!("{} issue(s) found", report.issues.len());
        Ok(ExitCode::FAILURE)
    }
}

fn print_summary(tileset: &Tileset) {
    println!(
        "{}: {} tiles of {}x{} in {} columns x {} rows",
        tileset.name,
        tileset.tile_count,
        tileset.tile_width,
        tileset.tile_height,
        tileset.columns,
        tileset.rows(),
    );
    if let Some(image) = &tileset.image {
        println!("image: {}", image.source);
    }
    for tile in tileset.tiles() {
        if !tile.meta.is_empty() {
            println!("  {:>4}  {}", tile.id, tile.meta);
        }
    }
    for animation in tileset.animations() {
        let keyframes: Vec<String> = animation.keyframes().map(|keyframe| keyframe.to_string()).collect();
        println!("entity {}: keyframes [{}], {}ms", animation.entity, keyframes.join(", "), animation.total_delay());
    }
    for kind in tileset.spawn_kinds() {
        println!("spawn {kind}: tiles {:?}", tileset.spawn_tiles(kind));
    }
}

#[cfg(feature = "profile")]
fn init_profiling() -> anyhow::Result<tracing_chrome::FlushGuard> {
    use tracing_subscriber::prelude::*;
    let (chrome_layer, guard) = tracing_chrome::ChromeLayerBuilder::new().build();
    let subscriber = tracing_subscriber::registry().with(chrome_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(guard)
}
