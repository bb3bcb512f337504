//! Outer-boundary extraction from binary images.
//!
//! Foreground pixels (non-zero) are grouped into 8-connected components and
//! background into 4-connected regions. Only components whose surrounding
//! background reaches the frame are reported; anything sitting inside a hole
//! of another component is skipped.

use crate::GrayImageView;
use nalgebra::Point2;
use std::collections::VecDeque;

/// Closed outer boundary of one foreground component.
///
/// Points are pixel centres, counter-clockwise on screen (y down), starting at
/// the raster-first pixel of the component. Runs of collinear steps are
/// collapsed to their end points.
#[derive(Clone, Debug, PartialEq)]
pub struct Contour {
    pub points: Vec<Point2<f32>>,
}

impl Contour {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// Moore neighbourhood, clockwise on screen starting from the top.
const DX: [i32; 8] = [0, 1, 1, 1, 0, -1, -1, -1];
const DY: [i32; 8] = [-1, -1, 0, 1, 1, 1, 0, -1];
const LEFT: usize = 6;

/// Trace the outer boundary of every external foreground component.
///
/// Contours are returned in raster order of their first pixel.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip(binary), fields(w = binary.width, h = binary.height))
)]
pub fn find_external_contours(binary: &GrayImageView<'_>) -> Vec<Contour> {
    let (w, h) = (binary.width, binary.height);
    if binary.is_empty() {
        return Vec::new();
    }

    let fg = |x: i32, y: i32| -> bool {
        x >= 0 && y >= 0 && (x as usize) < w && (y as usize) < h && binary.data[y as usize * w + x as usize] != 0
    };

    let outside = outer_background(binary);
    let mut visited = vec![false; w * h];
    let mut out = Vec::new();

    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            if visited[idx] || binary.data[idx] == 0 {
                continue;
            }
            mark_component(binary, &mut visited, x, y);

            // the pixel above the raster-first pixel belongs to the background
            // region that surrounds this component
            let external = y == 0 || outside[idx - w];
            if !external {
                continue;
            }

            let boundary = trace_boundary(&fg, x as i32, y as i32, 4 * w * h + 8);
            let ccw = reverse_keep_first(boundary);
            out.push(Contour {
                points: compress_collinear(&ccw),
            });
        }
    }

    log::trace!("traced {} external contours", out.len());
    out
}

/// Background pixels 4-connected to the frame border.
fn outer_background(binary: &GrayImageView<'_>) -> Vec<bool> {
    let (w, h) = (binary.width, binary.height);
    let mut outside = vec![false; w * h];
    let mut queue = VecDeque::new();

    let seed = |x: usize, y: usize, outside: &mut Vec<bool>, queue: &mut VecDeque<(usize, usize)>| {
        let idx = y * w + x;
        if binary.data[idx] == 0 && !outside[idx] {
            outside[idx] = true;
            queue.push_back((x, y));
        }
    };

    for x in 0..w {
        seed(x, 0, &mut outside, &mut queue);
        seed(x, h - 1, &mut outside, &mut queue);
    }
    for y in 0..h {
        seed(0, y, &mut outside, &mut queue);
        seed(w - 1, y, &mut outside, &mut queue);
    }

    while let Some((x, y)) = queue.pop_front() {
        if x > 0 {
            seed(x - 1, y, &mut outside, &mut queue);
        }
        if x + 1 < w {
            seed(x + 1, y, &mut outside, &mut queue);
        }
        if y > 0 {
            seed(x, y - 1, &mut outside, &mut queue);
        }
        if y + 1 < h {
            seed(x, y + 1, &mut outside, &mut queue);
        }
    }

    outside
}

/// Flood-fill the 8-connected foreground component containing `(x0, y0)`.
fn mark_component(binary: &GrayImageView<'_>, visited: &mut [bool], x0: usize, y0: usize) {
    let (w, h) = (binary.width, binary.height);
    let mut stack = vec![(x0, y0)];
    visited[y0 * w + x0] = true;

    while let Some((x, y)) = stack.pop() {
        for dir in 0..8 {
            let nx = x as i32 + DX[dir];
            let ny = y as i32 + DY[dir];
            if nx < 0 || ny < 0 || nx as usize >= w || ny as usize >= h {
                continue;
            }
            let nidx = ny as usize * w + nx as usize;
            if !visited[nidx] && binary.data[nidx] != 0 {
                visited[nidx] = true;
                stack.push((nx as usize, ny as usize));
            }
        }
    }
}

/// Radial sweep around the component, clockwise on screen.
///
/// Stops when the start pixel is about to be left along its first step
/// again, so boundaries passing through the start twice are walked fully.
fn trace_boundary(
    fg: &impl Fn(i32, i32) -> bool,
    start_x: i32,
    start_y: i32,
    max_steps: usize,
) -> Vec<(i32, i32)> {
    let start = (start_x, start_y);
    let mut points = vec![start];
    let mut curr = start;
    // the left neighbour of the raster-first pixel is always background
    let mut back = LEFT;
    let mut second: Option<(i32, i32)> = None;

    for _ in 0..max_steps {
        let Some(dir) = (1..=8)
            .map(|i| (back + i) % 8)
            .find(|&d| fg(curr.0 + DX[d], curr.1 + DY[d]))
        else {
            // isolated pixel
            break;
        };
        let next = (curr.0 + DX[dir], curr.1 + DY[dir]);

        if curr == start {
            match second {
                None => second = Some(next),
                Some(s) if s == next => break,
                Some(_) => {}
            }
        }

        points.push(next);
        back = (dir + 4) % 8;
        curr = next;
    }

    if points.len() > 1 && points.last() == Some(&start) {
        points.pop();
    }
    points
}

fn reverse_keep_first(mut points: Vec<(i32, i32)>) -> Vec<(i32, i32)> {
    if points.len() > 2 {
        points[1..].reverse();
    }
    points
}

/// Drop points lying on a straight run between their neighbours. The first
/// point is always kept.
fn compress_collinear(points: &[(i32, i32)]) -> Vec<Point2<f32>> {
    let n = points.len();
    if n < 3 {
        return points
            .iter()
            .map(|&(x, y)| Point2::new(x as f32, y as f32))
            .collect();
    }

    let mut out = Vec::with_capacity(n);
    out.push(Point2::new(points[0].0 as f32, points[0].1 as f32));
    for i in 1..n {
        let prev = points[i - 1];
        let curr = points[i];
        let next = points[(i + 1) % n];
        let cross = (curr.0 - prev.0) * (next.1 - curr.1) - (curr.1 - prev.1) * (next.0 - curr.0);
        let reverses = (curr.0 - prev.0) * (next.0 - curr.0) + (curr.1 - prev.1) * (next.1 - curr.1) < 0;
        if cross != 0 || reverses {
            out.push(Point2::new(curr.0 as f32, curr.1 as f32));
        }
    }
    out
}
