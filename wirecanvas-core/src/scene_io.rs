//! OBJ-style scene files and their material library.
//!
//! ```text
//! o Blue_Triangle
//! v 0.000000 0.000000 0.000000
//! v 5.000000 8.000000 0.000000
//! v -5.000000 8.000000 0.000000
//! usemtl blue
//! f -3 -2 -1
//! ```
//!
//! Element markers are `p` (dot), `l` (line or 3D edges), `f` (polygon),
//! `c` (Bézier curve), `b` (B-spline curve) and
//! `surf <bezier|bspline|bspline_fd> <rows> <cols> <resolution>` for surfaces,
//! whose vertices are the row-major control grid. Indices are 1-based and
//! file-global when positive, relative to the vertices read so far when
//! negative.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use nalgebra::Point2;
use nom::{
    bytes::complete::take_till1,
    character::complete::{i64 as index, space0, space1, u32 as count},
    combinator::{all_consuming, opt},
    multi::many1,
    number::complete::double,
    sequence::{preceded, terminated, tuple},
    IResult,
};

use crate::error::SceneIoError;
use crate::geometry::{Point3D, Rgb};
use crate::object::SceneObject;
use crate::surface::{Surface, SurfaceKind};
use crate::wireframe::{Wireframe, Wireframe3D, WireframeKind};

pub const OBJ_FILE: &str = "export.obj";
pub const MTL_FILE: &str = "material.mtl";

const HEADER: &str = "# wirecanvas scene";
const UNNAMED: &str = "unnamed_object";

/// Explicit material name ⇄ colour table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorTable {
    entries: Vec<(String, Rgb)>,
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::basic()
    }
}

impl ColorTable {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The basic CSS colour keywords plus `orange`.
    pub fn basic() -> Self {
        const BASIC: [(&str, Rgb); 19] = [
            ("black", Rgb::new(0, 0, 0)),
            ("silver", Rgb::new(192, 192, 192)),
            ("grey", Rgb::new(128, 128, 128)),
            ("gray", Rgb::new(128, 128, 128)),
            ("white", Rgb::new(255, 255, 255)),
            ("maroon", Rgb::new(128, 0, 0)),
            ("red", Rgb::new(255, 0, 0)),
            ("purple", Rgb::new(128, 0, 128)),
            ("fuchsia", Rgb::new(255, 0, 255)),
            ("green", Rgb::new(0, 128, 0)),
            ("lime", Rgb::new(0, 255, 0)),
            ("olive", Rgb::new(128, 128, 0)),
            ("yellow", Rgb::new(255, 255, 0)),
            ("navy", Rgb::new(0, 0, 128)),
            ("blue", Rgb::new(0, 0, 255)),
            ("teal", Rgb::new(0, 128, 128)),
            ("aqua", Rgb::new(0, 255, 255)),
            ("orange", Rgb::new(255, 165, 0)),
            ("brown", Rgb::new(165, 42, 42)),
        ];
        Self {
            entries: BASIC.iter().map(|(n, c)| ((*n).to_owned(), *c)).collect(),
        }
    }

    /// Add or replace a named colour.
    pub fn insert(&mut self, name: impl Into<String>, color: Rgb) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
            Some(entry) => entry.1 = color,
            None => self.entries.push((name, color)),
        }
    }

    pub fn extend(&mut self, other: ColorTable) {
        for (name, color) in other.entries {
            self.insert(name, color);
        }
    }

    /// Case-insensitive lookup; `#rrggbb` is accepted as a literal colour.
    pub fn color(&self, name: &str) -> Option<Rgb> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, c)| *c)
            .or_else(|| parse_hex(name))
    }

    /// First name registered for `color`.
    pub fn name_of(&self, color: Rgb) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, c)| *c == color)
            .map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One `newmtl` block per entry.
    pub fn to_mtl(&self) -> String {
        let mut out = String::new();
        for (name, color) in &self.entries {
            let (r, g, b) = color.to_unit();
            out.push_str(&format!("newmtl {name}\nKd {r:.6} {g:.6} {b:.6}\n\n"));
        }
        out
    }

    /// Read `newmtl` / `Kd` pairs; other statements are ignored.
    pub fn parse_mtl(text: &str) -> Result<Self, SceneIoError> {
        let mut table = Self::empty();
        let mut current: Option<String> = None;
        for (n, raw) in text.lines().enumerate() {
            let line = raw.trim();
            let line_no = n + 1;
            if let Some(name) = line.strip_prefix("newmtl ") {
                current = Some(name.trim().to_owned());
            } else if line.starts_with("Kd") {
                let name = current
                    .as_deref()
                    .ok_or_else(|| SceneIoError::parse(line_no, "Kd before newmtl"))?;
                let (r, g, b) = match all_consuming(kd_args)(&line[2..]) {
                    Ok((_, rgb)) => rgb,
                    Err(_) => return Err(SceneIoError::parse(line_no, "malformed Kd line")),
                };
                table.insert(name, Rgb::from_unit(r, g, b));
            }
        }
        Ok(table)
    }
}

fn parse_hex(name: &str) -> Option<Rgb> {
    let hex = name.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}

fn material_name(colors: &ColorTable, color: Rgb) -> String {
    colors
        .name_of(color)
        .map_or_else(|| color.hex(), str::to_owned)
}

// ---- export ----

/// The text of both files of an exported scene.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedScene {
    pub obj: String,
    pub mtl: String,
}

pub fn export_scene(objects: &[SceneObject], colors: &ColorTable) -> ExportedScene {
    let mut obj = format!("{HEADER}\nmtllib {MTL_FILE}\n\n");
    for object in objects {
        write_object(&mut obj, object, colors);
    }
    ExportedScene {
        obj,
        mtl: colors.to_mtl(),
    }
}

/// Write `export.obj` and `material.mtl` into `dir`; returns the obj path.
pub fn write_scene(
    dir: impl AsRef<Path>,
    objects: &[SceneObject],
    colors: &ColorTable,
) -> Result<PathBuf, SceneIoError> {
    let dir = dir.as_ref();
    let scene = export_scene(objects, colors);
    fs::create_dir_all(dir)?;
    let obj_path = dir.join(OBJ_FILE);
    fs::write(&obj_path, scene.obj)?;
    fs::write(dir.join(MTL_FILE), scene.mtl)?;
    log::info!("exported {} objects to {}", objects.len(), obj_path.display());
    Ok(obj_path)
}

fn push_vertex(out: &mut String, x: f64, y: f64, z: f64) {
    out.push_str(&format!("v {x:.6} {y:.6} {z:.6}\n"));
}

fn relative(n: usize) -> String {
    (1..=n)
        .rev()
        .map(|k| format!("-{k}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_object(out: &mut String, object: &SceneObject, colors: &ColorTable) {
    out.push_str(&format!("o {}\n", object.name().replace(' ', "_")));
    let material = material_name(colors, object.color());
    match object {
        SceneObject::Wireframe(w) => {
            for p in w.coordinates() {
                push_vertex(out, p.x, p.y, 0.0);
            }
            out.push_str(&format!("usemtl {material}\n"));
            let marker = match w.kind() {
                WireframeKind::Dot => 'p',
                WireframeKind::Line => 'l',
                WireframeKind::Polygon => 'f',
                WireframeKind::Curve => 'c',
                WireframeKind::CurveBSpline => 'b',
            };
            out.push_str(&format!("{marker} {}\n", relative(w.coordinates().len())));
        }
        SceneObject::Wireframe3D(w) => {
            for p in w.points() {
                push_vertex(out, p.x, p.y, p.z);
            }
            out.push_str(&format!("usemtl {material}\n"));
            let n = w.points().len();
            for &(a, b) in w.edges() {
                out.push_str(&format!("l -{} -{}\n", n - a, n - b));
            }
        }
        SceneObject::Surface(s) => {
            for p in s.control_points_flat() {
                push_vertex(out, p.x, p.y, p.z);
            }
            out.push_str(&format!("usemtl {material}\n"));
            let (rows, cols) = s.dimensions();
            out.push_str(&format!(
                "surf {} {rows} {cols} {}\n",
                surface_keyword(s.kind()),
                s.resolution()
            ));
        }
    }
    out.push('\n');
}

fn surface_keyword(kind: SurfaceKind) -> &'static str {
    match kind {
        SurfaceKind::Bezier => "bezier",
        SurfaceKind::BSpline => "bspline",
        SurfaceKind::BSplineFD => "bspline_fd",
    }
}

fn surface_kind(keyword: &str) -> Option<SurfaceKind> {
    match keyword {
        "bezier" => Some(SurfaceKind::Bezier),
        "bspline" => Some(SurfaceKind::BSpline),
        "bspline_fd" => Some(SurfaceKind::BSplineFD),
        _ => None,
    }
}

// ---- import ----

/// A problem that cost one object (or its colour) during import.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportIssue {
    pub line: usize,
    pub object: String,
    pub message: String,
}

impl fmt::Display for ImportIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} ({}): {}", self.line, self.object, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    pub objects: Vec<SceneObject>,
    pub issues: Vec<ImportIssue>,
}

/// Read a scene file from disk. Only I/O failures are errors; content
/// problems end up in [`ImportOutcome::issues`].
pub fn read_scene(
    path: impl AsRef<Path>,
    colors: &ColorTable,
    fill_polygons: bool,
) -> Result<ImportOutcome, SceneIoError> {
    let text = fs::read_to_string(path.as_ref())?;
    let outcome = import_scene(&text, colors, fill_polygons);
    log::info!(
        "imported {} objects from {} ({} issues)",
        outcome.objects.len(),
        path.as_ref().display(),
        outcome.issues.len()
    );
    Ok(outcome)
}

pub fn import_scene(text: &str, colors: &ColorTable, fill_polygons: bool) -> ImportOutcome {
    let mut importer = Importer {
        colors,
        fill_polygons,
        vertices: Vec::new(),
        unreadable: BTreeSet::new(),
        block: Block::new(UNNAMED.to_owned(), 0, 0),
        outcome: ImportOutcome::default(),
    };
    for (n, line) in text.lines().enumerate() {
        importer.line(n + 1, line.trim());
    }
    importer.finish()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Directive<'a> {
    Object(&'a str),
    Vertex(Point3D),
    Material(&'a str),
    Element(char),
    Surface(&'a str, u32, u32, u32),
    Ignored,
}

#[derive(Debug)]
enum Geometry {
    Points(WireframeKind, Vec<usize>),
    Edges(Vec<Vec<usize>>),
    Surface(SurfaceKind, usize, usize, usize),
}

#[derive(Debug)]
struct Block {
    name: String,
    line: usize,
    first_vertex: usize,
    material: Option<(usize, String)>,
    geometry: Option<Geometry>,
    error: Option<(usize, String)>,
}

impl Block {
    fn new(name: String, line: usize, first_vertex: usize) -> Self {
        Self {
            name,
            line,
            first_vertex,
            material: None,
            geometry: None,
            error: None,
        }
    }

    fn fail(&mut self, line: usize, message: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some((line, message.into()));
        }
    }
}

struct Importer<'c> {
    colors: &'c ColorTable,
    fill_polygons: bool,
    vertices: Vec<Point3D>,
    /// Positions of `v` lines that failed to parse; they hold a placeholder.
    unreadable: BTreeSet<usize>,
    block: Block,
    outcome: ImportOutcome,
}

impl Importer<'_> {
    fn line(&mut self, line_no: usize, line: &str) {
        if line.is_empty() || line.starts_with('#') {
            return;
        }
        let (rest, keyword) = match keyword(line) {
            Ok(parsed) => parsed,
            Err(_) => return,
        };
        let directive = match parse_directive(keyword, rest) {
            Some(d) => d,
            None => {
                if keyword == "v" {
                    self.unreadable.insert(self.vertices.len());
                    self.vertices.push(Point3D::default());
                }
                self.block.fail(line_no, format!("malformed {keyword} line"));
                return;
            }
        };

        match directive {
            Directive::Ignored => {}
            Directive::Object(name) => {
                let next = Block::new(name.to_owned(), line_no, self.vertices.len());
                let done = std::mem::replace(&mut self.block, next);
                self.finalize(done);
            }
            Directive::Vertex(p) => self.vertices.push(p),
            Directive::Material(name) => self.block.material = Some((line_no, name.to_owned())),
            Directive::Element(marker) => self.element(line_no, marker, rest),
            Directive::Surface(keyword, rows, cols, resolution) => match surface_kind(keyword) {
                Some(kind) => self.set_geometry(
                    line_no,
                    Geometry::Surface(kind, rows as usize, cols as usize, resolution as usize),
                ),
                None => self.block.fail(line_no, format!("unknown surface kind {keyword}")),
            },
        }
    }

    fn element(&mut self, line_no: usize, marker: char, args: &str) {
        let raw = match all_consuming(index_list)(args) {
            Ok((_, raw)) => raw,
            Err(_) => {
                self.block.fail(line_no, format!("malformed {marker} line"));
                return;
            }
        };
        let mut resolved = Vec::with_capacity(raw.len());
        for i in raw {
            match self.resolve(i) {
                Some(r) if self.unreadable.contains(&r) => {
                    self.block.fail(line_no, format!("vertex index {i} refers to a malformed v line"));
                    return;
                }
                Some(r) => resolved.push(r),
                None => {
                    self.block.fail(line_no, format!("vertex index {i} out of range"));
                    return;
                }
            }
        }

        if marker == 'l' {
            if let Some(Geometry::Edges(lines)) = &mut self.block.geometry {
                lines.push(resolved);
                return;
            }
            self.set_geometry(line_no, Geometry::Edges(vec![resolved]));
            return;
        }
        let kind = match marker {
            'p' => WireframeKind::Dot,
            'f' => WireframeKind::Polygon,
            'c' => WireframeKind::Curve,
            _ => WireframeKind::CurveBSpline,
        };
        self.set_geometry(line_no, Geometry::Points(kind, resolved));
    }

    fn set_geometry(&mut self, line_no: usize, geometry: Geometry) {
        if self.block.geometry.is_some() {
            self.block.fail(line_no, "more than one geometry element");
        } else {
            self.block.geometry = Some(geometry);
        }
    }

    fn resolve(&self, i: i64) -> Option<usize> {
        let len = self.vertices.len();
        let idx = match i {
            0 => return None,
            i if i > 0 => usize::try_from(i - 1).ok()?,
            i => len.checked_sub(usize::try_from(i.unsigned_abs()).ok()?)?,
        };
        (idx < len).then_some(idx)
    }

    fn finalize(&mut self, block: Block) {
        let name = block.name.clone();
        let issue = |line: usize, message: String| ImportIssue {
            line,
            object: name.clone(),
            message,
        };

        if let Some((line, message)) = block.error {
            self.outcome.issues.push(issue(line, message));
            return;
        }
        let own_vertices = &self.vertices[block.first_vertex..];
        let Some(geometry) = block.geometry else {
            if !own_vertices.is_empty() {
                self.outcome
                    .issues
                    .push(issue(block.line, "object has no geometry element".to_owned()));
            }
            return;
        };

        let built = build_object(&block.name, geometry, &self.vertices, own_vertices, self.fill_polygons);
        let mut object = match built {
            Ok(object) => object,
            Err(message) => {
                self.outcome.issues.push(issue(block.line, message));
                return;
            }
        };

        let color = match &block.material {
            None => Rgb::GREY,
            Some((line, material)) => self.colors.color(material).unwrap_or_else(|| {
                self.outcome
                    .issues
                    .push(issue(*line, format!("unknown material {material}, using grey")));
                Rgb::GREY
            }),
        };
        object.set_color(color);
        self.outcome.objects.push(object);
    }

    fn finish(mut self) -> ImportOutcome {
        let last = std::mem::replace(&mut self.block, Block::new(String::new(), 0, 0));
        self.finalize(last);
        self.outcome
    }
}

fn build_object(
    name: &str,
    geometry: Geometry,
    vertices: &[Point3D],
    own_vertices: &[Point3D],
    fill_polygons: bool,
) -> Result<SceneObject, String> {
    let planar = |indices: &[usize]| -> Vec<Point2<f64>> {
        indices
            .iter()
            .map(|&i| Point2::new(vertices[i].x, vertices[i].y))
            .collect()
    };

    let object: SceneObject = match geometry {
        Geometry::Points(kind, indices) => {
            let fill = fill_polygons && kind == WireframeKind::Polygon;
            Wireframe::new(name, kind, planar(&indices))
                .map_err(|e| e.to_string())?
                .with_fill(fill)
                .into()
        }
        Geometry::Edges(lines) => {
            let is_line = lines.len() == 1
                && lines[0].len() == 2
                && lines[0].iter().all(|&i| vertices[i].z == 0.0);
            if is_line {
                Wireframe::new(name, WireframeKind::Line, planar(&lines[0]))
                    .map_err(|e| e.to_string())?
                    .into()
            } else {
                let (points, edges) = edge_topology(&lines, vertices);
                Wireframe3D::new(name, points, edges)
                    .map_err(|e| e.to_string())?
                    .into()
            }
        }
        Geometry::Surface(kind, rows, cols, resolution) => {
            Surface::from_flat(name, kind, rows, cols, own_vertices, resolution)
                .map_err(|e| e.to_string())?
                .into()
        }
    };
    Ok(object)
}

/// Local vertex list (first-use order) and edges for a set of polylines.
fn edge_topology(lines: &[Vec<usize>], vertices: &[Point3D]) -> (Vec<Point3D>, Vec<(usize, usize)>) {
    let mut used: Vec<usize> = Vec::new();
    let mut local = |global: usize| match used.iter().position(|&g| g == global) {
        Some(i) => i,
        None => {
            used.push(global);
            used.len() - 1
        }
    };
    let mut edges = Vec::new();
    for line in lines {
        for pair in line.windows(2) {
            let a = local(pair[0]);
            let b = local(pair[1]);
            edges.push((a, b));
        }
    }
    let points = used.iter().map(|&g| vertices[g]).collect();
    (points, edges)
}

// ---- line grammar ----

fn keyword(line: &str) -> IResult<&str, &str> {
    take_till1(char::is_whitespace)(line)
}

fn parse_directive<'a>(keyword: &'a str, rest: &'a str) -> Option<Directive<'a>> {
    let directive = match keyword {
        "o" => {
            let name = rest.trim();
            Directive::Object(if name.is_empty() { UNNAMED } else { name })
        }
        "v" => all_consuming(vertex_args)(rest).ok()?.1,
        "usemtl" => {
            let name = rest.trim();
            if name.is_empty() {
                return None;
            }
            Directive::Material(name)
        }
        "p" | "l" | "f" | "c" | "b" => Directive::Element(keyword.chars().next()?),
        "surf" => all_consuming(surface_args)(rest).ok()?.1,
        _ => Directive::Ignored,
    };
    Some(directive)
}

fn vertex_args(input: &str) -> IResult<&str, Directive<'_>> {
    let (input, (x, y, z)) = terminated(
        tuple((
            preceded(space1, double),
            preceded(space1, double),
            opt(preceded(space1, double)),
        )),
        space0,
    )(input)?;
    Ok((input, Directive::Vertex(Point3D::new(x, y, z.unwrap_or(0.0)))))
}

fn surface_args(input: &str) -> IResult<&str, Directive<'_>> {
    let (input, (kind, rows, cols, resolution)) = terminated(
        tuple((
            preceded(space1, take_till1(char::is_whitespace)),
            preceded(space1, count),
            preceded(space1, count),
            preceded(space1, count),
        )),
        space0,
    )(input)?;
    Ok((input, Directive::Surface(kind, rows, cols, resolution)))
}

fn index_list(input: &str) -> IResult<&str, Vec<i64>> {
    terminated(many1(preceded(space1, index)), space0)(input)
}

fn kd_args(input: &str) -> IResult<&str, (f64, f64, f64)> {
    terminated(
        tuple((
            preceded(space1, double),
            preceded(space1, double),
            preceded(space1, double),
        )),
        space0,
    )(input)
}
