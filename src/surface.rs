//! Per-cell surface state read and written by the flow automaton.
//!
//! The surface is a square grid of `size × size` cells lying in the x/y
//! plane; cell `(x, y)` maps to image pixel `(x, y)` (row `y`). Four maps
//! live here:
//!
//! - **affinity** `∈ [0, 1]`: how readily water sticks to the material
//! - **flow**: water mass parked on the cell (`≥ 0`)
//! - **obstacle**: cells water can never enter
//! - **normal**: unit surface normal, `+Z` on a flat surface
//!
//! Material maps can be imported from in-memory images; the flow map can
//! be exported as a grayscale image for display.

use crate::error::{Result, SimError};
use crate::grid::CellMap;
use glam::Vec3;
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbImage};

/// Material and flow maps of the surface.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceMaps {
    pub affinity: CellMap<f32>,
    pub flow: CellMap<f32>,
    pub obstacle: CellMap<bool>,
    pub normal: CellMap<Vec3>,
}

impl SurfaceMaps {
    /// Flat, dry surface with uniform `affinity`.
    pub fn new(size: usize, affinity: f32) -> Self {
        Self {
            affinity: CellMap::new(size, affinity.clamp(0.0, 1.0)),
            flow: CellMap::new(size, 0.0),
            obstacle: CellMap::new(size, false),
            normal: CellMap::new(size, Vec3::Z),
        }
    }

    pub fn size(&self) -> usize {
        self.affinity.size()
    }

    /// Replace the affinity map with a grayscale image (black = 0, white = 1),
    /// resampled to the surface size.
    pub fn affinity_from_image(&mut self, image: &GrayImage) -> Result<()> {
        let img = self.fit(image)?;
        let cells = img.pixels().map(|p| p.0[0] as f32 / 255.0).collect();
        self.affinity = CellMap::from_vec(self.size(), cells)?;
        Ok(())
    }

    /// Replace the normals with a tangent-space normal map (`n = rgb/255*2-1`).
    pub fn normals_from_image(&mut self, image: &RgbImage) -> Result<()> {
        if image.width() == 0 || image.height() == 0 {
            return Err(SimError::config("normal map image is empty"));
        }
        let size = self.size() as u32;
        let img = if image.dimensions() == (size, size) {
            image.clone()
        } else {
            imageops::resize(image, size, size, FilterType::Triangle)
        };
        let cells = img
            .pixels()
            .map(|p| {
                let n = Vec3::new(p.0[0] as f32, p.0[1] as f32, p.0[2] as f32) / 255.0 * 2.0 - 1.0;
                n.try_normalize().unwrap_or(Vec3::Z)
            })
            .collect();
        self.normal = CellMap::from_vec(self.size(), cells)?;
        Ok(())
    }

    /// Mark every pixel brighter than `threshold` as an obstacle.
    pub fn obstacles_from_image(&mut self, mask: &GrayImage, threshold: u8) -> Result<()> {
        let img = self.fit(mask)?;
        let cells = img.pixels().map(|p| p.0[0] > threshold).collect();
        self.obstacle = CellMap::from_vec(self.size(), cells)?;
        Ok(())
    }

    /// Flow normalized by `dripping_threshold` and clamped to `[0, 1]`, row-major.
    pub fn normalized_flow(&self, dripping_threshold: f32) -> Vec<f32> {
        self.flow
            .iter()
            .map(|m| (m / dripping_threshold).clamp(0.0, 1.0))
            .collect()
    }

    /// [`SurfaceMaps::normalized_flow`] as an 8-bit image.
    pub fn flow_image(&self, dripping_threshold: f32) -> GrayImage {
        let size = self.size() as u32;
        let flow = self.normalized_flow(dripping_threshold);
        GrayImage::from_fn(size, size, |x, y| {
            let v = flow[(y * size + x) as usize];
            Luma([(v * 255.0).round() as u8])
        })
    }

    /// Total mass parked on the surface.
    pub fn total_flow(&self) -> f32 {
        self.flow.iter().sum()
    }

    fn fit(&self, image: &GrayImage) -> Result<GrayImage> {
        if image.width() == 0 || image.height() == 0 {
            return Err(SimError::config("surface image is empty"));
        }
        let size = self.size() as u32;
        Ok(if image.dimensions() == (size, size) {
            image.clone()
        } else {
            imageops::resize(image, size, size, FilterType::Triangle)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_new_is_flat_and_dry() {
        let maps = SurfaceMaps::new(8, 1.5);
        assert_eq!(maps.size(), 8);
        assert!(maps.affinity.iter().all(|a| *a == 1.0));
        assert_eq!(maps.total_flow(), 0.0);
        assert!(maps.normal.iter().all(|n| *n == Vec3::Z));
    }

    #[test]
    fn test_affinity_from_image() {
        let mut maps = SurfaceMaps::new(4, 0.0);
        let img = GrayImage::from_fn(4, 4, |x, _| Luma([if x < 2 { 0 } else { 255 }]));
        maps.affinity_from_image(&img).unwrap();
        assert_eq!(maps.affinity.get_or(0, 3, -1.0), 0.0);
        assert_eq!(maps.affinity.get_or(3, 0, -1.0), 1.0);
    }

    #[test]
    fn test_affinity_image_is_resampled() {
        let mut maps = SurfaceMaps::new(4, 0.0);
        let img = GrayImage::from_pixel(16, 16, Luma([255]));
        maps.affinity_from_image(&img).unwrap();
        assert!(maps.affinity.iter().all(|a| *a > 0.99));
        assert!(maps.affinity_from_image(&GrayImage::new(0, 0)).is_err());
    }

    #[test]
    fn test_normals_from_image() {
        let mut maps = SurfaceMaps::new(2, 0.5);
        let img = RgbImage::from_fn(2, 2, |x, _| {
            if x == 0 {
                Rgb([128, 128, 255])
            } else {
                Rgb([255, 128, 128])
            }
        });
        maps.normals_from_image(&img).unwrap();
        let flat = maps.normal.get_or(0, 0, Vec3::ZERO);
        let side = maps.normal.get_or(1, 0, Vec3::ZERO);
        assert!(flat.z > 0.99);
        assert!(side.x > 0.99);
    }

    #[test]
    fn test_obstacles_from_image() {
        let mut maps = SurfaceMaps::new(2, 0.5);
        let img = GrayImage::from_fn(2, 2, |x, y| Luma([if x == y { 200 } else { 10 }]));
        maps.obstacles_from_image(&img, 127).unwrap();
        assert_eq!(maps.obstacle.as_slice(), &[true, false, false, true]);
    }

    #[test]
    fn test_flow_normalization_and_image() {
        let mut maps = SurfaceMaps::new(2, 0.5);
        *maps.flow.get_mut(0, 0).unwrap() = 5.0;
        *maps.flow.get_mut(1, 1).unwrap() = 50.0;
        assert_eq!(maps.normalized_flow(10.0), vec![0.5, 0.0, 0.0, 1.0]);
        let img = maps.flow_image(10.0);
        assert_eq!(img.get_pixel(0, 0).0[0], 128);
        assert_eq!(img.get_pixel(1, 1).0[0], 255);
        assert_eq!(img.get_pixel(1, 0).0[0], 0);
        assert_eq!(maps.total_flow(), 55.0);
    }
}
