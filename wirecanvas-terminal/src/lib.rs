//! Terminal front-end: draws a wirecanvas scene on a character grid
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use std::io::{self, stdout, Write};
use std::path::PathBuf;
use std::rc::Rc;
use wirecanvas_core::scene_io::write_scene;
use wirecanvas_core::{
    Canvas, CanvasConfig, ColorTable, ImportOutcome, MemoryReporter, MovementMode,
    Reporter, SceneError,
};

pub mod renderer;

pub use renderer::CharSurface;

/// Rows reserved below the drawing area for the status line.
const STATUS_ROWS: u16 = 1;

/// Settings suited to one-character pixels.
pub fn terminal_config() -> CanvasConfig {
    CanvasConfig {
        border_width: 1.0,
        dot_radius: 1.0,
        ..CanvasConfig::default()
    }
}

/// Main application struct for the terminal canvas
pub struct TerminalApp {
    canvas: Canvas,
    surface: CharSurface,
    reporter: Rc<MemoryReporter>,
    colors: ColorTable,
    export_dir: PathBuf,
    running: bool,
}

impl TerminalApp {
    /// Sized to the current terminal.
    pub fn new(colors: ColorTable) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(width, height.saturating_sub(STATUS_ROWS), colors))
    }

    pub fn with_size(width: u16, height: u16, colors: ColorTable) -> Self {
        let reporter = Rc::new(MemoryReporter::new());
        let canvas = Canvas::with_config(f64::from(width), f64::from(height), terminal_config())
            .with_reporter(Rc::clone(&reporter));
        Self {
            canvas,
            surface: CharSurface::new(usize::from(width), usize::from(height)),
            reporter,
            colors,
            export_dir: PathBuf::from("."),
            running: true,
        }
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn surface(&self) -> &CharSurface {
        &self.surface
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn load_examples(&mut self) {
        if let Err(e) = self.canvas.load_example_objects() {
            self.reporter.error(&e.to_string());
        }
    }

    pub fn load(&mut self, outcome: ImportOutcome) {
        let added = self.canvas.import(outcome);
        self.reporter.info(&format!("{added} objects loaded"));
    }

    /// Newest console message, if any.
    pub fn status_message(&self) -> Option<String> {
        self.reporter.last().map(|(_, m)| m)
    }

    pub fn status_line(&self) -> String {
        let config = self.canvas.config();
        let movement = match config.movement {
            MovementMode::Pan => "Pan",
            MovementMode::Rotate => "Rotate",
        };
        format!(
            "{} | {} | {} | {}",
            config.line_clipping.label(),
            config.projection.label(),
            movement,
            self.status_message().unwrap_or_default()
        )
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        self.redraw()?;
        while self.running {
            match event::read()? {
                Event::Key(KeyEvent {
                    code,
                    kind: KeyEventKind::Press,
                    ..
                }) => self.handle_key(code),
                Event::Resize(width, height) => self.resize(width, height.saturating_sub(STATUS_ROWS)),
                _ => continue,
            }
            self.redraw()?;
        }
        Ok(())
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.canvas.resize(f64::from(width), f64::from(height));
        self.surface.resize(usize::from(width), usize::from(height));
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        let step = self.canvas.config().rotation_step;
        let result: Result<(), SceneError> = match code {
            KeyCode::Esc => {
                self.running = false;
                Ok(())
            }
            KeyCode::Up | KeyCode::Char('w') => self.canvas.move_view(0.0, 1.0, 0.0),
            KeyCode::Down | KeyCode::Char('s') => self.canvas.move_view(0.0, -1.0, 0.0),
            KeyCode::Left | KeyCode::Char('a') => self.canvas.move_view(-1.0, 0.0, 0.0),
            KeyCode::Right | KeyCode::Char('d') => self.canvas.move_view(1.0, 0.0, 0.0),
            KeyCode::Char('r') => self.canvas.move_view(0.0, 0.0, 1.0),
            KeyCode::Char('f') => self.canvas.move_view(0.0, 0.0, -1.0),
            KeyCode::Char('+') | KeyCode::Char('=') => self.canvas.zoom_in(),
            KeyCode::Char('-') => self.canvas.zoom_out(),
            KeyCode::Char('q') => self.canvas.rotate_window(0.0, 0.0, step),
            KeyCode::Char('e') => self.canvas.rotate_window(0.0, 0.0, -step),
            KeyCode::Char('c') => {
                let next = self.canvas.config().line_clipping.toggled();
                self.canvas.set_line_clipping(next);
                Ok(())
            }
            KeyCode::Char('p') => {
                let next = self.canvas.config().projection.toggled();
                self.canvas.set_projection_mode(next);
                Ok(())
            }
            KeyCode::Char('m') => {
                let next = match self.canvas.config().movement {
                    MovementMode::Pan => MovementMode::Rotate,
                    MovementMode::Rotate => MovementMode::Pan,
                };
                self.canvas.set_movement_mode(next);
                Ok(())
            }
            KeyCode::Char('k') => {
                let show = !self.canvas.config().show_control_points;
                self.canvas.set_show_control_points(show);
                Ok(())
            }
            KeyCode::Char('x') => {
                self.export();
                Ok(())
            }
            _ => Ok(()),
        };
        if let Err(e) = result {
            self.reporter.warn(&e.to_string());
        }
    }

    fn export(&mut self) {
        match write_scene(&self.export_dir, self.canvas.objects(), &self.colors) {
            Ok(path) => self.reporter.info(&format!("scene exported to {}", path.display())),
            Err(e) => self.reporter.error(&format!("export failed: {e}")),
        }
    }

    /// Render the scene into the character grid without touching the terminal.
    pub fn render_frame(&mut self) {
        self.surface.clear();
        self.canvas.render(&mut self.surface);
    }

    fn redraw(&mut self) -> io::Result<()> {
        self.render_frame();

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.surface.present(&mut stdout)?;

        // Status line
        let row = u16::try_from(self.surface.height()).unwrap_or(u16::MAX);
        let status: String = self.status_line().chars().take(self.surface.width()).collect();
        queue!(
            stdout,
            cursor::MoveTo(0, row),
            SetForegroundColor(Color::Yellow),
            Print(status),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wirecanvas_core::{LineClipping, ProjectionMode, Rgb};

    fn app() -> TerminalApp {
        let mut app = TerminalApp::with_size(80, 40, ColorTable::default());
        app.load_examples();
        app
    }

    #[test]
    fn arrows_pan_the_window() {
        let mut app = app();
        app.handle_key(KeyCode::Right);
        assert!((app.canvas().window().xmin() + 9.0).abs() < 1e-9);
        app.handle_key(KeyCode::Char('s'));
        assert!((app.canvas().window().ymin() + 11.0).abs() < 1e-9);
    }

    #[test]
    fn toggles_switch_modes() {
        let mut app = app();
        app.handle_key(KeyCode::Char('c'));
        assert_eq!(app.canvas().config().line_clipping, LineClipping::LiangBarsky);
        app.handle_key(KeyCode::Char('p'));
        assert_eq!(app.canvas().config().projection, ProjectionMode::Perspective);
        app.handle_key(KeyCode::Char('m'));
        assert_eq!(app.canvas().config().movement, MovementMode::Rotate);
        app.handle_key(KeyCode::Char('k'));
        assert!(app.canvas().config().show_control_points);
        assert!(app.status_line().starts_with("Liang-Barsky | Perspective | Rotate"));
    }

    #[test]
    fn rotate_mode_routes_arrows_to_rotation() {
        let mut app = app();
        app.handle_key(KeyCode::Char('m'));
        app.handle_key(KeyCode::Up);
        assert!((app.canvas().window().rotation().x - 15.0).abs() < 1e-9);
        app.handle_key(KeyCode::Char('q'));
        assert!((app.canvas().window().rotation().z - 15.0).abs() < 1e-9);
    }

    #[test]
    fn status_shows_latest_message() {
        let mut app = app();
        app.handle_key(KeyCode::Char('c'));
        assert_eq!(app.status_message().as_deref(), Some("line clipping: Liang-Barsky"));
    }

    #[test]
    fn escape_stops_the_app() {
        let mut app = app();
        assert!(app.is_running());
        app.handle_key(KeyCode::Esc);
        assert!(!app.is_running());
    }

    #[test]
    fn frame_draws_example_objects() {
        let mut app = app();
        app.render_frame();
        // inside the filled square, below and right of the origin
        assert_eq!(app.surface().cell(48, 26), Some(('.', Rgb::YELLOW)));
        assert_eq!(app.surface().cell(1, 1).map(|c| c.0), Some('+'));
    }

    #[test]
    fn export_writes_scene_files() {
        let dir = std::env::temp_dir().join(format!("wirecanvas-term-{}", std::process::id()));
        let mut app = app().with_export_dir(&dir);
        app.handle_key(KeyCode::Char('x'));
        assert!(dir.join("export.obj").exists());
        assert!(app.status_message().unwrap().starts_with("scene exported"));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
