//! Two-threshold (Canny) edge detection

use image::{GrayImage, Luma};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

/// tan(22.5°) and tan(67.5°), used to bin gradient directions
const TAN_22_5: f32 = 0.414_213_56;
const TAN_67_5: f32 = 2.414_213_6;

const EDGE: u8 = 255;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Class {
    Suppressed,
    Weak,
    Strong,
}

/// Canny edge map of a GRAY image
///
/// Gradient magnitude is `|gx| + |gy|` from 3x3 Sobel operators. After
/// non-maximum suppression, pixels above `high` are strong edges, pixels at or
/// below `low` are dropped and pixels in between survive only when
/// 8-connected to a strong edge. If `low > high` the thresholds are swapped.
/// Output pixels are 255 on edges and 0 elsewhere.
#[must_use]
pub fn canny(image: &GrayImage, low: f32, high: f32) -> GrayImage {
    let (low, high) = if low > high { (high, low) } else { (low, high) };
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);
    if w == 0 || h == 0 {
        return GrayImage::new(width, height);
    }

    let gx = horizontal_sobel(image);
    let gy = vertical_sobel(image);

    let magnitude: Vec<i32> = gx
        .pixels()
        .zip(gy.pixels())
        .map(|(x, y)| i32::from(x.0[0]).abs() + i32::from(y.0[0]).abs())
        .collect();
    let mag_at = |x: i64, y: i64| -> i32 {
        if x < 0 || y < 0 || x >= w as i64 || y >= h as i64 {
            return 0;
        }
        magnitude.get(y as usize * w + x as usize).copied().unwrap_or(0)
    };

    let mut classes = vec![Class::Suppressed; w * h];
    let mut strong = Vec::new();

    for y in 0..h {
        for x in 0..w {
            let m = mag_at(x as i64, y as i64);
            if m as f32 <= low {
                continue;
            }

            let sx = i32::from(gx.get_pixel(x as u32, y as u32).0[0]);
            let sy = i32::from(gy.get_pixel(x as u32, y as u32).0[0]);
            let (ax, ay) = (sx.abs() as f32, sy.abs() as f32);
            let (xi, yi) = (x as i64, y as i64);

            let is_local_max = if ay < ax * TAN_22_5 {
                m > mag_at(xi - 1, yi) && m >= mag_at(xi + 1, yi)
            } else if ay > ax * TAN_67_5 {
                m > mag_at(xi, yi - 1) && m >= mag_at(xi, yi + 1)
            } else {
                let s = if (sx ^ sy) < 0 { -1 } else { 1 };
                m > mag_at(xi - s, yi - 1) && m > mag_at(xi + s, yi + 1)
            };
            if !is_local_max {
                continue;
            }

            let index = y * w + x;
            if m as f32 > high {
                if let Some(class) = classes.get_mut(index) {
                    *class = Class::Strong;
                }
                strong.push((x, y));
            } else if let Some(class) = classes.get_mut(index) {
                *class = Class::Weak;
            }
        }
    }

    // Hysteresis: grow strong edges into connected weak pixels.
    while let Some((x, y)) = strong.pop() {
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                    continue;
                }
                let index = ny as usize * w + nx as usize;
                if let Some(class) = classes.get_mut(index) {
                    if *class == Class::Weak {
                        *class = Class::Strong;
                        strong.push((nx as usize, ny as usize));
                    }
                }
            }
        }
    }

    GrayImage::from_fn(width, height, |x, y| {
        let index = y as usize * w + x as usize;
        match classes.get(index) {
            Some(Class::Strong) => Luma([EDGE]),
            _ => Luma([0]),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_image(width: u32, height: u32, split: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| Luma([if x < split { 20 } else { 220 }]))
    }

    #[test]
    fn test_constant_image_has_no_edges() {
        let img = GrayImage::from_pixel(16, 16, Luma([128]));
        let edges = canny(&img, 100.0, 150.0);
        assert!(edges.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_vertical_step_produces_vertical_edge() {
        let img = step_image(20, 12, 10);
        let edges = canny(&img, 100.0, 150.0);

        for y in 1..11 {
            let row_edges: Vec<u32> = (0..20)
                .filter(|&x| edges.get_pixel(x, y).0[0] == EDGE)
                .collect();
            assert_eq!(row_edges.len(), 1, "row {} edges: {:?}", y, row_edges);
            let x = row_edges[0];
            assert!(x == 9 || x == 10, "edge at unexpected column {}", x);
        }
        assert!(edges.pixels().all(|p| p.0[0] == 0 || p.0[0] == EDGE));
    }

    #[test]
    fn test_thresholds_above_gradient_suppress_everything() {
        let img = step_image(20, 12, 10);
        // Sobel response to a 200-level step peaks at 800.
        let edges = canny(&img, 900.0, 1000.0);
        assert!(edges.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_swapped_thresholds_behave_like_ordered() {
        let img = step_image(20, 12, 10);
        assert_eq!(canny(&img, 150.0, 100.0), canny(&img, 100.0, 150.0));
    }

    #[test]
    fn test_weak_edges_need_strong_neighbor() {
        // A faint step everywhere: gradient 4 * 40 = 160, between low and high.
        let faint = GrayImage::from_fn(20, 12, |x, _| Luma([if x < 10 { 100 } else { 140 }]));
        let edges = canny(&faint, 100.0, 300.0);
        assert!(edges.pixels().all(|p| p.0[0] == 0));

        let edges = canny(&faint, 100.0, 150.0);
        assert!(edges.pixels().any(|p| p.0[0] == EDGE));
    }
}
