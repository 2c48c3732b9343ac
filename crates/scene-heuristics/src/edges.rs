//! Sobel edge map and edge-density grid regions

use image::{GrayImage, Luma};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

/// Gradient magnitude above which a pixel counts as an edge
const EDGE_MAGNITUDE: f32 = 50.0;
/// Fraction of edge pixels that makes a grid cell a candidate
const CELL_DENSITY: f32 = 0.15;

/// Edge-dense rectangle in the coordinates of the analysed image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub confidence: f32,
}

impl EdgeRegion {
    pub fn area(&self) -> u32 {
        self.width * self.height
    }

    /// Gap between the two regions along each axis; 0 when they touch or overlap
    fn gaps(&self, other: &EdgeRegion) -> (u32, u32) {
        let gap = |a0: u32, a1: u32, b0: u32, b1: u32| a0.max(b0).saturating_sub(a1.min(b1));
        (
            gap(self.x, self.x + self.width, other.x, other.x + other.width),
            gap(self.y, self.y + self.height, other.y, other.y + other.height),
        )
    }

    fn union(&self, other: &EdgeRegion) -> EdgeRegion {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        EdgeRegion {
            x,
            y,
            width: right - x,
            height: bottom - y,
            confidence: self.confidence.max(other.confidence),
        }
    }
}

/// Binary edge map (255 = edge). The one-pixel border is never an edge.
pub fn sobel_edges(gray: &GrayImage) -> GrayImage {
    let (width, height) = gray.dimensions();
    let gx = horizontal_sobel(gray);
    let gy = vertical_sobel(gray);

    GrayImage::from_fn(width, height, |x, y| {
        if x == 0 || y == 0 || x + 1 >= width || y + 1 >= height {
            return Luma([0]);
        }
        let dx = gx.get_pixel(x, y)[0] as f32;
        let dy = gy.get_pixel(x, y)[0] as f32;
        if (dx * dx + dy * dy).sqrt() > EDGE_MAGNITUDE {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Scan the edge map in `grid_size` cells and merge dense cells that lie
/// within one cell of each other on both axes
pub fn edge_regions(edges: &GrayImage, grid_size: u32) -> Vec<EdgeRegion> {
    let (width, height) = edges.dimensions();
    if grid_size == 0 || width == 0 || height == 0 {
        return Vec::new();
    }

    let mut cells = Vec::new();
    for y in (0..height).step_by(grid_size as usize) {
        for x in (0..width).step_by(grid_size as usize) {
            let cell_w = grid_size.min(width - x);
            let cell_h = grid_size.min(height - y);

            let edge_count = (y..y + cell_h)
                .flat_map(|cy| (x..x + cell_w).map(move |cx| (cx, cy)))
                .filter(|&(cx, cy)| edges.get_pixel(cx, cy)[0] > 0)
                .count();

            let density = edge_count as f32 / (cell_w * cell_h) as f32;
            if density > CELL_DENSITY {
                cells.push(EdgeRegion {
                    x,
                    y,
                    width: cell_w,
                    height: cell_h,
                    confidence: (density * 2.0).min(1.0),
                });
            }
        }
    }

    merge_regions(cells, grid_size)
}

/// Repeatedly fold regions whose gaps are within `threshold` on both axes
fn merge_regions(mut regions: Vec<EdgeRegion>, threshold: u32) -> Vec<EdgeRegion> {
    loop {
        let before = regions.len();
        let mut merged: Vec<EdgeRegion> = Vec::with_capacity(before);

        for region in regions {
            let near = merged.iter_mut().find(|kept| {
                let (gap_x, gap_y) = kept.gaps(&region);
                gap_x <= threshold && gap_y <= threshold
            });
            match near {
                Some(kept) => *kept = kept.union(&region),
                None => merged.push(region),
            }
        }

        if merged.len() == before {
            return merged;
        }
        regions = merged;
    }
}
