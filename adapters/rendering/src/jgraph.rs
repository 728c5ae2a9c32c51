//! Document model for the subset of the jgraph language the game draws with.
//!
//! Every optional attribute is an `Option`; unset attributes are simply not
//! emitted, leaving jgraph to apply its own defaults.

use std::fmt::{self, Write};

use crate::Color;

/// Point in graph units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point {
    /// Creates a point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Width and height pair used for mark and page sizes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size {
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Size {
    /// Creates a size whose sides are equal.
    #[must_use]
    pub const fn square(side: f32) -> Self {
        Self {
            width: side,
            height: side,
        }
    }
}

/// Bounding box in postscript points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Left edge.
    pub x: f32,
    /// Bottom edge.
    pub y: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

/// Top-level jgraph document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Canvas {
    /// Page size in inches.
    pub size: Option<Size>,
    /// Explicit bounding box of the emitted postscript.
    pub bounding_box: Option<BoundingBox>,
    /// Graphs drawn on the page, in order.
    pub graphs: Vec<Graph>,
}

impl Canvas {
    /// Serialises the canvas into jgraph source text.
    pub fn write_to<W: Write>(&self, out: &mut W) -> fmt::Result {
        if let Some(size) = self.size {
            writeln!(out, "X {} Y {}", Num(size.width), Num(size.height))?;
        }
        if let Some(bbox) = self.bounding_box {
            writeln!(
                out,
                "bbox {} {} {} {}",
                Num(bbox.x),
                Num(bbox.y),
                Num(bbox.x + bbox.width),
                Num(bbox.y + bbox.height)
            )?;
        }
        for graph in &self.graphs {
            writeln!(out, "newgraph")?;
            graph.write_to(out)?;
        }
        Ok(())
    }

    /// Serialises the canvas into a freshly allocated string.
    pub fn to_script(&self) -> Result<String, fmt::Error> {
        let mut script = String::new();
        self.write_to(&mut script)?;
        Ok(script)
    }
}

/// One graph: two axes and the curves plotted against them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
    /// Horizontal axis.
    pub x_axis: Axis,
    /// Vertical axis.
    pub y_axis: Axis,
    /// Curves in drawing order; later curves paint over earlier ones.
    pub curves: Vec<Curve>,
}

impl Graph {
    fn write_to<W: Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "xaxis")?;
        self.x_axis.write_to(out)?;
        writeln!(out, "yaxis")?;
        self.y_axis.write_to(out)?;
        for curve in &self.curves {
            curve.write_to(out)?;
        }
        Ok(())
    }
}

/// Axis configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Axis {
    /// Whether the axis line, hashes, and labels are drawn at all.
    pub draw: bool,
    /// Axis length in inches.
    pub size_inches: Option<f32>,
    /// Lowest value on the axis.
    pub min: Option<f32>,
    /// Highest value on the axis.
    pub max: Option<f32>,
    /// Spacing between major hash marks.
    pub hash_spacing: Option<f32>,
    /// Minor hash marks between each pair of major ones.
    pub minor_hashes: Option<u32>,
    /// Draws grid lines at every major hash.
    pub grid_lines: bool,
}

impl Default for Axis {
    fn default() -> Self {
        Self {
            draw: true,
            size_inches: None,
            min: None,
            max: None,
            hash_spacing: None,
            minor_hashes: None,
            grid_lines: false,
        }
    }
}

impl Axis {
    fn write_to<W: Write>(&self, out: &mut W) -> fmt::Result {
        if !self.draw {
            writeln!(out, "\tnodraw")?;
        }
        if let Some(size) = self.size_inches {
            writeln!(out, "\tsize {}", Num(size))?;
        }
        if self.min.is_some() || self.max.is_some() {
            write!(out, "\t")?;
            if let Some(min) = self.min {
                write!(out, "min {} ", Num(min))?;
            }
            if let Some(max) = self.max {
                write!(out, "max {} ", Num(max))?;
            }
            writeln!(out)?;
        }
        if let Some(spacing) = self.hash_spacing {
            writeln!(out, "\thash {}", Num(spacing))?;
        }
        if let Some(count) = self.minor_hashes {
            writeln!(out, "\tmhash {count}")?;
        }
        if self.grid_lines {
            writeln!(out, "\tgrid_lines")?;
        }
        Ok(())
    }
}

/// Curve: a set of unjoined points all drawn with the same mark.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Curve {
    /// Points in graph units.
    pub points: Vec<Point>,
    /// Mark drawn at every point.
    pub mark: Mark,
    /// Outline color of the marks.
    pub color: Option<Color>,
}

impl Curve {
    fn write_to<W: Write>(&self, out: &mut W) -> fmt::Result {
        write!(out, "newcurve pts ")?;
        for point in &self.points {
            write!(out, "{} {} ", Num(point.x), Num(point.y))?;
        }
        self.mark.write_to(out)?;
        write!(out, "linetype none ")?;
        if let Some(color) = self.color {
            write!(out, "color {} ", Rgb(color))?;
        }
        writeln!(out, "noclip")
    }
}

/// Built-in mark shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// Circle.
    Circle,
    /// Box.
    Box,
    /// Diamond.
    Diamond,
    /// Triangle.
    Triangle,
}

impl Shape {
    const fn keyword(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Box => "box",
            Self::Diamond => "diamond",
            Self::Triangle => "triangle",
        }
    }
}

/// Solid fill applied to a closed mark.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fill {
    /// Fill color.
    pub color: Color,
    /// Rotation of the fill pattern in degrees.
    pub rotation: f32,
}

impl Fill {
    /// Solid fill with no rotation.
    #[must_use]
    pub const fn solid(color: Color) -> Self {
        Self {
            color,
            rotation: 0.0,
        }
    }

    /// Solid fill rotated by the given angle.
    #[must_use]
    pub const fn rotated(color: Color, rotation: f32) -> Self {
        Self { color, rotation }
    }

    fn write_to<W: Write>(&self, out: &mut W) -> fmt::Result {
        write!(
            out,
            "cfill {} pattern solid {} ",
            Rgb(self.color),
            Num(self.rotation)
        )
    }
}

/// Mark drawn at each point of a curve.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Mark {
    /// No mark.
    #[default]
    None,
    /// Built-in shape.
    Shape {
        /// Which shape.
        shape: Shape,
        /// Mark size in graph units.
        size: Option<Size>,
        /// Optional fill.
        fill: Option<Fill>,
    },
    /// Closed polygon described relative to the mark centre in `-1..=1` units.
    General {
        /// Polygon outline.
        outline: Vec<Point>,
        /// Mark size in graph units.
        size: Option<Size>,
        /// Optional fill.
        fill: Option<Fill>,
    },
    /// Text label.
    Text(Text),
    /// Inline postscript drawn at each point.
    PostscriptRaw {
        /// Postscript source.
        script: String,
        /// Mark size in graph units.
        size: Option<Size>,
    },
    /// Postscript or encapsulated postscript file drawn at each point.
    PostscriptFile {
        /// File to embed.
        path: String,
        /// Whether the file is encapsulated postscript.
        encapsulated: bool,
        /// Mark size in graph units.
        size: Option<Size>,
    },
}

impl Mark {
    fn write_to<W: Write>(&self, out: &mut W) -> fmt::Result {
        match self {
            Self::None => write!(out, "marktype none "),
            Self::Shape { shape, size, fill } => {
                write!(out, "marktype {} ", shape.keyword())?;
                write_size(out, *size)?;
                if let Some(fill) = fill {
                    fill.write_to(out)?;
                }
                Ok(())
            }
            Self::General {
                outline,
                size,
                fill,
            } => {
                write!(out, "gmarks ")?;
                for point in outline {
                    write!(out, "{} {} ", Num(point.x), Num(point.y))?;
                }
                let keyword = if fill.is_some() { "general" } else { "general_nf" };
                write!(out, "marktype {keyword} ")?;
                if let Some(fill) = fill {
                    fill.write_to(out)?;
                }
                write_size(out, *size)
            }
            Self::Text(text) => {
                write!(out, "marktype text ")?;
                text.write_to(out)?;
                // Text content runs to the end of the line.
                writeln!(out)
            }
            Self::PostscriptRaw { script, size } => {
                write!(out, "postscript : {script} ")?;
                write_size(out, *size)
            }
            Self::PostscriptFile {
                path,
                encapsulated,
                size,
            } => {
                let keyword = if *encapsulated { "eps" } else { "postscript" };
                write!(out, "{keyword} {path} ")?;
                write_size(out, *size)
            }
        }
    }
}

/// Text attributes and content.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Text {
    /// Postscript font name.
    pub font: Option<String>,
    /// Font size in points.
    pub font_size: Option<f32>,
    /// Distance between lines in points.
    pub line_spacing: Option<f32>,
    /// Text color.
    pub color: Option<Color>,
    /// Text to draw; newlines start a new line.
    pub content: String,
}

impl Text {
    fn write_to<W: Write>(&self, out: &mut W) -> fmt::Result {
        if let Some(font) = &self.font {
            write!(out, "font {font} ")?;
        }
        if let Some(size) = self.font_size {
            write!(out, "fontsize {} ", Num(size))?;
        }
        if let Some(spacing) = self.line_spacing {
            write!(out, "linesep {} ", Num(spacing))?;
        }
        if let Some(color) = self.color {
            write!(out, "lcolor {} ", Rgb(color))?;
        }
        if !self.content.is_empty() {
            write!(out, ": ")?;
            for character in self.content.chars() {
                if character == '\n' {
                    out.write_char('\\')?;
                }
                out.write_char(character)?;
            }
        }
        Ok(())
    }
}

fn write_size<W: Write>(out: &mut W, size: Option<Size>) -> fmt::Result {
    match size {
        Some(size) => write!(out, "marksize {} {} ", Num(size.width), Num(size.height)),
        None => Ok(()),
    }
}

/// Number printed with at most four decimals and no trailing zeros.
struct Num(f32);

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = format!("{:.4}", self.0);
        let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
        match trimmed {
            "" | "-" | "-0" => f.write_str("0"),
            value => f.write_str(value),
        }
    }
}

struct Rgb(Color);

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            Num(self.0.red),
            Num(self.0.green),
            Num(self.0.blue)
        )
    }
}
