//! Wirecanvas terminal viewer
//!
//! Usage: wirecanvas-terminal [scene.obj]
//!
//! Without an argument the built-in example objects are shown. A
//! `material.mtl` next to the scene file extends the colour table.
//!
//! Controls:
//!   - Arrows / WASD: move (pan or rotate, see M), R/F: forward/back
//!   - +/-: zoom, Q/E: rotate the window
//!   - C: clipping algorithm, P: projection, M: movement mode
//!   - K: control points, X: export, Esc: quit

use std::env;
use std::error::Error;
use std::fs;
use std::path::Path;
use wirecanvas_core::scene_io::{read_scene, MTL_FILE};
use wirecanvas_core::ColorTable;
use wirecanvas_terminal::TerminalApp;

fn colors_for(scene: &Path) -> Result<ColorTable, Box<dyn Error>> {
    let mut colors = ColorTable::default();
    let mtl = scene.with_file_name(MTL_FILE);
    if mtl.exists() {
        colors.extend(ColorTable::parse_mtl(&fs::read_to_string(&mtl)?)?);
        log::info!("materials loaded from {}", mtl.display());
    }
    Ok(colors)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let scene = env::args().nth(1);
    let mut app = match scene.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let colors = colors_for(path)?;
            let outcome = read_scene(path, &colors, false)?;
            let mut app = TerminalApp::new(colors)?;
            app.load(outcome);
            app
        }
        None => {
            let mut app = TerminalApp::new(ColorTable::default())?;
            app.load_examples();
            app
        }
    };

    app.run()?;
    Ok(())
}
