//! Freehand drawing strokes.

use web_time::Instant;

use crate::annotation::Layer;
use crate::undo::MergeGroup;
use crate::view::ViewKind;

/// An in-progress stroke. All its points share one merge group.
#[derive(Debug, Clone)]
pub(crate) struct Stroke {
    pub view: ViewKind,
    pub layer: Layer,
    pub group: MergeGroup,
    /// Last voxel drawn, `None` after leaving the volume
    pub last: Option<[usize; 3]>,
    pub started: Instant,
}

/// Integer points of the segment `from..=to` (Bresenham).
pub(crate) fn line(from: (i64, i64), to: (i64, i64)) -> Vec<(i64, i64)> {
    let (mut x0, mut y0) = from;
    let (x1, y1) = to;
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut points = Vec::with_capacity(dx.max(-dy) as usize + 1);
    loop {
        points.push((x0, y0));
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
    points
}
