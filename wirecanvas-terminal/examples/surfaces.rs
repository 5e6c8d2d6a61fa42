//! Example: a cube and a forward-difference B-spline surface in the terminal
//!
//! Usage: cargo run --example surfaces
//!
//! Press P for perspective and M to rotate the window with the arrow keys.

use std::error::Error;
use wirecanvas_core::{ColorTable, Point3D, Rgb, Surface, SurfaceKind, Wireframe3D};
use wirecanvas_terminal::TerminalApp;

fn cube(size: f64) -> Result<Wireframe3D, Box<dyn Error>> {
    let h = size / 2.0;
    let points = (0..8)
        .map(|i| {
            let pick = |bit: usize| if i & bit == 0 { -h } else { h };
            Point3D::new(pick(1), pick(2), pick(4))
        })
        .collect();
    let edges = (0..8usize)
        .flat_map(|i| [1, 2, 4].into_iter().map(move |bit| (i, i | bit)))
        .filter(|(a, b)| a != b)
        .collect();
    Ok(Wireframe3D::new("Cube", points, edges)?.with_color(Rgb::new(0, 255, 255)))
}

fn hill(rows: usize, cols: usize) -> Result<Surface, Box<dyn Error>> {
    let grid = (0..rows)
        .map(|i| {
            (0..cols)
                .map(|j| {
                    let x = i as f64 * 2.0 - 6.0;
                    let y = j as f64 * 2.0 - 6.0;
                    Point3D::new(x, y, 4.0 - 0.15 * (x * x + y * y))
                })
                .collect()
        })
        .collect();
    Ok(Surface::new("Hill", SurfaceKind::BSplineFD, grid, 6)?.with_color(Rgb::new(255, 165, 0)))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut app = TerminalApp::new(ColorTable::default())?;
    app.canvas_mut().add_object(cube(6.0)?)?;
    app.canvas_mut().add_object(hill(7, 7)?)?;
    app.canvas_mut().rotate_window(20.0, 30.0, 0.0)?;

    app.run()?;
    Ok(())
}
