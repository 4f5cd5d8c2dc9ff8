//! Rectangle math, resize handles and SVG path scaling.

use crate::selection::SelectArea;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Axis-aligned box in world coordinates, stored as origin plus size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Build a box from a kurbo rectangle, normalizing flipped corners.
    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::new(rect.x0, rect.y0, rect.width(), rect.height())
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    pub fn union(&self, other: &BBox) -> BBox {
        BBox::from_rect(self.to_rect().union(other.to_rect()))
    }

    pub fn is_zero_area(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Whether two boxes overlap. Boxes that only share an edge do not.
pub fn is_rect_intersect(a: &BBox, b: &BBox) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

/// Normalize a marquee drag into a box.
pub fn select_area_to_rect(area: &SelectArea) -> BBox {
    BBox::from_rect(Rect::from_points(area.anchor, area.focus))
}

/// One of the eight resize handles around a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandlePosition {
    #[serde(rename = "n")]
    North,
    #[serde(rename = "s")]
    South,
    #[serde(rename = "e")]
    East,
    #[serde(rename = "w")]
    West,
    #[serde(rename = "ne")]
    NorthEast,
    #[serde(rename = "nw")]
    NorthWest,
    #[serde(rename = "se")]
    SouthEast,
    #[serde(rename = "sw")]
    SouthWest,
}

impl HandlePosition {
    fn drags_left(self) -> bool {
        matches!(self, Self::West | Self::NorthWest | Self::SouthWest)
    }

    fn drags_right(self) -> bool {
        matches!(self, Self::East | Self::NorthEast | Self::SouthEast)
    }

    fn drags_top(self) -> bool {
        matches!(self, Self::North | Self::NorthEast | Self::NorthWest)
    }

    fn drags_bottom(self) -> bool {
        matches!(self, Self::South | Self::SouthEast | Self::SouthWest)
    }

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            Self::NorthEast | Self::NorthWest | Self::SouthEast | Self::SouthWest
        )
    }
}

/// Compute the box produced by dragging `handle` from `anchor` to `focus`.
///
/// The edge or corner opposite the handle stays fixed. Dragging past it
/// flips the box, and the result is always normalized to a non-negative
/// size. With `preserve_ratio` the original aspect ratio is kept: corners
/// follow whichever axis moved more relative to its size, edges grow the
/// other axis symmetrically around the original center. Degenerate boxes
/// (zero width or height) ignore `preserve_ratio`.
pub fn get_resized_bbox(
    bbox: &BBox,
    handle: HandlePosition,
    anchor: Point,
    focus: Point,
    preserve_ratio: bool,
) -> BBox {
    let dx = focus.x - anchor.x;
    let dy = focus.y - anchor.y;
    let (mut left, mut top, mut right, mut bottom) = (bbox.x, bbox.y, bbox.right(), bbox.bottom());
    if handle.drags_left() {
        left += dx;
    }
    if handle.drags_right() {
        right += dx;
    }
    if handle.drags_top() {
        top += dy;
    }
    if handle.drags_bottom() {
        bottom += dy;
    }

    if preserve_ratio && bbox.width > 0.0 && bbox.height > 0.0 {
        let ratio = bbox.width / bbox.height;
        let width = right - left;
        let height = bottom - top;
        let horizontal = handle.drags_left() || handle.drags_right();
        let vertical = handle.drags_top() || handle.drags_bottom();

        if horizontal && vertical {
            let width_driven = if dy == 0.0 {
                true
            } else if dx == 0.0 {
                false
            } else {
                dx.abs() / bbox.width >= dy.abs() / bbox.height
            };
            if width_driven {
                let new_height = width.abs() / ratio * sign(height);
                if handle.drags_top() {
                    top = bottom - new_height;
                } else {
                    bottom = top + new_height;
                }
            } else {
                let new_width = height.abs() * ratio * sign(width);
                if handle.drags_left() {
                    left = right - new_width;
                } else {
                    right = left + new_width;
                }
            }
        } else if horizontal {
            let half = width.abs() / ratio / 2.0;
            let center_y = bbox.center().y;
            top = center_y - half;
            bottom = center_y + half;
        } else {
            let half = height.abs() * ratio / 2.0;
            let center_x = bbox.center().x;
            left = center_x - half;
            right = center_x + half;
        }
    }

    BBox::new(
        left.min(right),
        top.min(bottom),
        (right - left).abs(),
        (bottom - top).abs(),
    )
}

fn sign(value: f64) -> f64 {
    if value < 0.0 { -1.0 } else { 1.0 }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PathToken {
    Command(char),
    Number(f64),
}

fn tokenize_path(data: &str) -> Vec<PathToken> {
    let chars: Vec<char> = data.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E') {
            tokens.push(PathToken::Command(c));
            i += 1;
        } else if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') {
            let start = i;
            let mut seen_dot = c == '.';
            let mut seen_exp = false;
            i += 1;
            while i < chars.len() {
                let ch = chars[i];
                if ch.is_ascii_digit() {
                    i += 1;
                } else if ch == '.' && !seen_dot && !seen_exp {
                    seen_dot = true;
                    i += 1;
                } else if matches!(ch, 'e' | 'E') && !seen_exp {
                    seen_exp = true;
                    i += 1;
                    if i < chars.len() && matches!(chars[i], '-' | '+') {
                        i += 1;
                    }
                } else {
                    break;
                }
            }
            let text: String = chars[start..i].iter().collect();
            match text.parse::<f64>() {
                Ok(value) => tokens.push(PathToken::Number(value)),
                Err(_) => log::warn!("Skipping malformed path number `{}`", text),
            }
        } else {
            // Separators: whitespace, commas.
            i += 1;
        }
    }
    tokens
}

/// Scale the coordinates of an SVG path string.
///
/// Coordinate pairs scale by `(scale_x, scale_y)`, `H`/`V` by one axis
/// each, and arcs only move their endpoint (radii, rotation and flags are
/// kept). Tokens in the output are separated by single spaces.
pub fn transform_path(data: &str, scale_x: f64, scale_y: f64) -> String {
    let mut out = Vec::new();
    let mut command = 'M';
    let mut index = 0usize;
    for token in tokenize_path(data) {
        match token {
            PathToken::Command(c) => {
                command = c;
                index = 0;
                out.push(c.to_string());
            }
            PathToken::Number(value) => {
                let scaled = match command.to_ascii_uppercase() {
                    'H' => value * scale_x,
                    'V' => value * scale_y,
                    'A' => match index % 7 {
                        5 => value * scale_x,
                        6 => value * scale_y,
                        _ => value,
                    },
                    'Z' => value,
                    _ if index % 2 == 0 => value * scale_x,
                    _ => value * scale_y,
                };
                index += 1;
                out.push(scaled.to_string());
            }
        }
    }
    out.join(" ")
}
