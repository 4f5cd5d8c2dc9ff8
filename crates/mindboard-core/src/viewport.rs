//! Viewport: the visible world rectangle and its mapping to the screen.
//!
//! The viewport stores its world-space origin and zoom. Its world-space size
//! is always the container size divided by the zoom.

use crate::board::{Board, BoardChange};
use crate::element::BoardElement;
use crate::geometry::BBox;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Default container size until the host reports one.
const DEFAULT_CONTAINER_SIZE: (f64, f64) = (800.0, 600.0);

/// The visible region of the board in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewPort {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
    pub zoom: f64,
}

impl Default for ViewPort {
    fn default() -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            width: DEFAULT_CONTAINER_SIZE.0,
            height: DEFAULT_CONTAINER_SIZE.1,
            zoom: 1.0,
        }
    }
}

impl ViewPort {
    /// The visible world rectangle.
    pub fn world_rect(&self) -> Rect {
        Rect::new(self.min_x, self.min_y, self.min_x + self.width, self.min_y + self.height)
    }

    /// World point shown at a container-relative screen point.
    pub fn container_to_world(&self, point: Point) -> Point {
        Point::new(self.min_x + point.x / self.zoom, self.min_y + point.y / self.zoom)
    }

    /// Container-relative screen point of a world point.
    pub fn world_to_container(&self, point: Point) -> Point {
        Point::new((point.x - self.min_x) * self.zoom, (point.y - self.min_y) * self.zoom)
    }
}

/// The host element's rectangle on screen, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for ContainerRect {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: DEFAULT_CONTAINER_SIZE.0,
            height: DEFAULT_CONTAINER_SIZE.1,
        }
    }
}

impl ContainerRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// Inclusive test for a client-space point.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.left + self.width
            && point.y >= self.top
            && point.y <= self.top + self.height
    }

    /// Client point relative to the container's top-left corner.
    pub fn relative(&self, point: Point) -> Point {
        Point::new(point.x - self.left, point.y - self.top)
    }
}

impl Board {
    /// Map a client-space point to world coordinates.
    pub fn screen_to_view_port(&self, screen: Point) -> Point {
        self.view_port.container_to_world(self.container.relative(screen))
    }

    /// Map a world point to client-space coordinates.
    pub fn view_port_to_screen(&self, world: Point) -> Point {
        let relative = self.view_port.world_to_container(world);
        Point::new(relative.x + self.container.left, relative.y + self.container.top)
    }

    /// Update the container rectangle, keeping origin and zoom.
    pub fn set_container(&mut self, container: ContainerRect) {
        self.container = container;
        self.sync_view_port_size();
        self.view_port_changed();
    }

    /// Move the viewport origin to a world point.
    pub fn move_view_port(&mut self, min_x: f64, min_y: f64) {
        self.view_port.min_x = min_x;
        self.view_port.min_y = min_y;
        self.view_port_changed();
    }

    /// Pan by a delta given in screen pixels.
    pub fn pan_by_screen(&mut self, delta: Vec2) {
        let zoom = self.view_port.zoom;
        let (min_x, min_y) = (self.view_port.min_x, self.view_port.min_y);
        self.move_view_port(min_x + delta.x / zoom, min_y + delta.y / zoom);
    }

    /// Set the zoom, keeping the world point under `anchor` fixed on screen.
    ///
    /// `anchor` is relative to the container's top-left corner and defaults
    /// to the container's center.
    pub fn update_zoom(&mut self, zoom: f64, anchor: Option<Point>) {
        let zoom = self.config.clamp_zoom(zoom);
        let anchor = anchor.unwrap_or_else(|| {
            Point::new(self.container.width / 2.0, self.container.height / 2.0)
        });
        let world = self.view_port.container_to_world(anchor);
        self.view_port.zoom = zoom;
        self.view_port.min_x = world.x - anchor.x / zoom;
        self.view_port.min_y = world.y - anchor.y / zoom;
        self.sync_view_port_size();
        self.view_port_changed();
    }

    /// Multiply the zoom by `factor` about an anchor.
    pub fn zoom_by(&mut self, factor: f64, anchor: Option<Point>) {
        self.update_zoom(self.view_port.zoom * factor, anchor);
    }

    /// Zoom and pan so `elements` (all root elements by default) fit inside
    /// the container with `padding` screen pixels to spare.
    ///
    /// Content with no area is centered at zoom 1. Does nothing when there is
    /// no content.
    pub fn fit_all_elements(&mut self, padding: f64, elements: Option<&[BoardElement]>) {
        let bounds = match elements {
            Some(elements) => self.registry.union_bounds(elements),
            None => self.registry.union_bounds(&self.children),
        };
        let Some(bounds) = bounds else {
            log::debug!("fit_all_elements: nothing to fit");
            return;
        };

        let zoom = if bounds.is_zero_area() {
            self.config.clamp_zoom(1.0)
        } else {
            let available_width = (self.container.width - padding * 2.0).max(1.0);
            let available_height = (self.container.height - padding * 2.0).max(1.0);
            self.config
                .clamp_zoom((available_width / bounds.width).min(available_height / bounds.height))
        };
        self.view_port.zoom = zoom;
        self.sync_view_port_size();
        self.center_view_port_on(bounds.center());
    }

    /// Pan so the center of `elements` is in the middle of the container, keeping the zoom.
    pub fn center_on_elements(&mut self, elements: &[BoardElement]) {
        if let Some(bounds) = self.registry.union_bounds(elements) {
            self.center_view_port_on(bounds.center());
        }
    }

    /// World bounds of `elements`, including descendants.
    pub fn elements_bounds(&self, elements: &[BoardElement]) -> Option<BBox> {
        self.registry.union_bounds(elements)
    }

    fn center_view_port_on(&mut self, center: Point) {
        let (width, height) = (self.view_port.width, self.view_port.height);
        self.move_view_port(center.x - width / 2.0, center.y - height / 2.0);
    }

    pub(crate) fn sync_view_port_size(&mut self) {
        self.view_port.width = self.container.width / self.view_port.zoom;
        self.view_port.height = self.container.height / self.view_port.zoom;
    }

    fn view_port_changed(&mut self) {
        self.notify(BoardChange::view_port());
    }
}
