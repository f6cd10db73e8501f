use std::path::PathBuf;

use anyhow::Context;
use clap::Subcommand;
use compmap_core::{render, GeoJsonSink, MapSink, MapViewModel, DEFAULT_ZOOM};

#[derive(Debug, Subcommand)]
pub enum MapCommands {
    /// Render a map view JSON file into markers
    Render {
        /// Path to a JSON file with `center`, `competitors` and optional `yourLocation`
        #[arg(long)]
        input: PathBuf,
        /// Initial zoom level
        #[arg(
            long,
            default_value_t = DEFAULT_ZOOM,
            value_parser = clap::value_parser!(u8).range(1..=20)
        )]
        zoom: u8,
        /// Emit a GeoJSON FeatureCollection instead of the marker frame
        #[arg(long)]
        geojson: bool,
    },
}

pub fn run(command: MapCommands) -> anyhow::Result<()> {
    match command {
        MapCommands::Render {
            input,
            zoom,
            geojson,
        } => {
            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let view: MapViewModel = serde_json::from_str(&content)
                .with_context(|| format!("parsing map view from {}", input.display()))?;
            let frame = render(&view).with_zoom(zoom);

            let output = if geojson {
                GeoJsonSink.draw(&frame)?
            } else {
                serde_json::to_value(&frame)?
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
    }
}
