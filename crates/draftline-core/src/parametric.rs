//! Parametric sequence import: `R1000`, `D500`, ... chained tip to tail.

use crate::shapes::Primitive;
use crate::units::Calibration;
use kurbo::{Point, Vec2};

/// Errors from parametric import.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParametricError {
    #[error("No valid commands (expected lines such as R1000 or U800)")]
    NoValidCommands,
}

/// Drawing direction of one command. Screen convention: +y points down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Parse a direction letter: N/U, S/D, E/R, W/L (any case).
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'N' | 'U' => Some(Direction::Up),
            'S' | 'D' => Some(Direction::Down),
            'E' | 'R' => Some(Direction::Right),
            'W' | 'L' => Some(Direction::Left),
            _ => None,
        }
    }

    /// Unit vector in world space.
    pub fn unit_vector(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
        }
    }
}

/// One parsed line of input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Command {
    pub direction: Direction,
    /// Length in the active display unit.
    pub magnitude: f64,
}

impl Command {
    /// Parse `<dir><magnitude>`. Returns `None` for anything else.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let mut chars = line.chars();
        let direction = Direction::from_char(chars.next()?)?;
        let magnitude: f64 = chars.as_str().trim().parse().ok()?;
        if !magnitude.is_finite() || magnitude == 0.0 {
            return None;
        }
        Some(Self { direction, magnitude })
    }
}

/// Parse every valid line, skipping blank and malformed ones.
pub fn parse_commands(text: &str) -> Vec<Command> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let command = Command::parse(line);
            if command.is_none() {
                log::debug!("Skipping parametric line {line:?}");
            }
            command
        })
        .collect()
}

/// Build chained walls from `text`, starting at `start`.
///
/// Magnitudes are converted with [`Calibration::to_pixel_length`], so an
/// uncalibrated document uses one unit per pixel.
pub fn build_segments(
    text: &str,
    start: Point,
    calibration: &Calibration,
) -> Result<Vec<Primitive>, ParametricError> {
    let commands = parse_commands(text);
    if commands.is_empty() {
        return Err(ParametricError::NoValidCommands);
    }

    let mut cursor = start;
    let segments = commands
        .into_iter()
        .map(|command| {
            let length = calibration.to_pixel_length(command.magnitude);
            let end = cursor + command.direction.unit_vector() * length;
            let wall = Primitive::wall(cursor, end);
            cursor = end;
            wall
        })
        .collect();
    Ok(segments)
}
