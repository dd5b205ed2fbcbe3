//! Placement of the suggestion bubble next to the caret.
//!
//! All coordinates are document coordinates in CSS pixels. The viewport is
//! the visible window onto the document, so its origin is the scroll offset.

/// Distance from the caret to the bubble's top-left corner, on both axes.
pub const CARET_OFFSET: f64 = 8.0;
/// Minimum gap kept between the bubble and the viewport edges.
pub const EDGE_MARGIN: f64 = 10.0;
/// Size of the bubble when the host doesn't measure it.
pub const DEFAULT_BUBBLE_SIZE: Size = Size {
    width: 280.0,
    height: 240.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Everything needed to place the bubble for one caret position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BubbleGeometry {
    pub caret: Point,
    pub bubble: Size,
    pub viewport: Viewport,
}

impl BubbleGeometry {
    pub fn new(caret: Point, viewport: Viewport) -> Self {
        Self {
            caret,
            bubble: DEFAULT_BUBBLE_SIZE,
            viewport,
        }
    }

    pub fn place(&self) -> Point {
        place(self.caret, self.bubble, &self.viewport)
    }
}

/// Top-left corner for a bubble of `bubble` size shown at `caret`.
///
/// The bubble goes below and right of the caret. It is pulled left to stay
/// inside the right edge, flipped above the caret when it would run off the
/// bottom, and never placed past the left or top edge. A bubble larger than
/// the viewport overlaps the caret rather than being hidden.
pub fn place(caret: Point, bubble: Size, viewport: &Viewport) -> Point {
    let mut x = caret.x + CARET_OFFSET;
    let mut y = caret.y + CARET_OFFSET;

    if x + bubble.width > viewport.right() - EDGE_MARGIN {
        x = viewport.right() - bubble.width - EDGE_MARGIN;
    }
    if x < viewport.x + EDGE_MARGIN {
        x = viewport.x + EDGE_MARGIN;
    }

    if y + bubble.height > viewport.bottom() {
        y = caret.y - bubble.height - EDGE_MARGIN;
    }
    if y < viewport.y + EDGE_MARGIN {
        y = viewport.y + EDGE_MARGIN;
    }

    Point { x, y }
}
