//! # Grid Generation Module
//!
//! Scene generators that populate a whole [`VoxelGrid`] in one pass. They are used to
//! build demo scenes and stress inputs for the mesher; none of them keeps any state
//! after the grid is filled.

use cgmath::Point3;
use log::info;
use noise::{NoiseFn, Perlin};
use serde::Deserialize;
use web_time::Instant;

use crate::engine_state::voxels::block::Block;

use super::VoxelGrid;

/// Chance that a terrain column gets a decoration block on top of its surface.
pub const DECORATION_DENSITY: f64 = 0.1;
/// Default scaling applied to world coordinates when sampling terrain noise.
pub const DEFAULT_TERRAIN_SCALE: f64 = 0.05;

/// The blocks a generator places.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScenePalette {
    /// Top layer of terrain columns.
    pub surface: Block,
    /// Everything below the surface, and the only block of the simple patterns.
    pub filler: Block,
    /// Optional block scattered on top of terrain (for example foliage).
    pub decoration: Option<Block>,
}

/// How to fill a grid.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridGenerator {
    /// Leave every slot empty.
    Empty,
    /// Fill every slot with the filler block.
    Solid,
    /// 3D checkerboard: a slot is filled when the sum of its coordinates is even.
    Checkerboard,
    /// Fill each slot independently with probability `density`.
    Random {
        /// Fraction of filled slots, in `[0, 1]`.
        density: f64,
        /// Seed of the random sequence.
        seed: u64,
    },
    /// Perlin heightmap terrain: columns of filler capped with a surface block.
    Terrain {
        /// Noise seed.
        seed: u32,
        /// Scaling applied to world X and Z before sampling.
        #[serde(default = "default_terrain_scale")]
        scale: f64,
    },
}

fn default_terrain_scale() -> f64 {
    DEFAULT_TERRAIN_SCALE
}

impl VoxelGrid {
    /// Replaces the whole content of the grid with a generated scene.
    ///
    /// # Arguments
    /// * `generator` - The scene to build
    /// * `palette` - The blocks to build it from
    ///
    /// # Returns
    /// The number of occupied slots afterwards.
    pub fn generate(&mut self, generator: &GridGenerator, palette: &ScenePalette) -> usize {
        let start = Instant::now();
        self.clear_all();

        match generator {
            GridGenerator::Empty => {}
            GridGenerator::Solid => {
                self.slots.fill(Some(palette.filler));
            }
            GridGenerator::Checkerboard => {
                for index in 0..self.len() {
                    let position = self.position_of(index);
                    let parity =
                        i64::from(position.x) + i64::from(position.y) + i64::from(position.z);
                    if parity.rem_euclid(2) == 0 {
                        self.slots[index] = Some(palette.filler);
                    }
                }
            }
            GridGenerator::Random { density, seed } => {
                let mut rng = fastrand::Rng::with_seed(*seed);
                for slot in &mut self.slots {
                    if rng.f64() < *density {
                        *slot = Some(palette.filler);
                    }
                }
            }
            GridGenerator::Terrain { seed, scale } => self.generate_terrain(*seed, *scale, palette),
        }

        let occupied = self.occupied_count();
        info!(
            "Generated {:?} scene: {} of {} slots occupied in {:?}",
            generator,
            occupied,
            self.len(),
            start.elapsed()
        );
        occupied
    }

    fn generate_terrain(&mut self, seed: u32, scale: f64, palette: &ScenePalette) {
        let perlin = Perlin::new(seed);
        let mut rng = fastrand::Rng::with_seed(u64::from(seed));
        let height_limit = self.size.y;
        if self.is_empty() {
            return;
        }

        for z in 0..self.size.z {
            for x in 0..self.size.x {
                let world_x = self.base.x + x as i32;
                let world_z = self.base.z + z as i32;
                let sample = perlin.get([world_x as f64 * scale, world_z as f64 * scale]);
                // Perlin output is roughly [-1, 1]; every column keeps at least one block.
                let normalized = ((sample + 1.0) / 2.0).clamp(0.0, 1.0);
                let height = ((normalized * height_limit as f64) as usize).clamp(1, height_limit);

                for y in 0..height {
                    let block = if y + 1 == height {
                        palette.surface
                    } else {
                        palette.filler
                    };
                    self.put_local(x, y, z, block);
                }

                if let Some(decoration) = palette.decoration {
                    if height < height_limit && rng.f64() < DECORATION_DENSITY {
                        self.put_local(x, height, z, decoration);
                    }
                }
            }
        }
    }

    /// Writes a slot by base-relative coordinates known to be in range.
    fn put_local(&mut self, x: usize, y: usize, z: usize, block: Block) {
        let position = Point3::new(
            self.base.x + x as i32,
            self.base.y + y as i32,
            self.base.z + z as i32,
        );
        if let Some(index) = self.storage_location(position) {
            self.slots[index] = Some(block);
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Vector3;

    use crate::engine_state::voxels::block::BlockTypeId;

    use super::*;

    fn palette() -> ScenePalette {
        ScenePalette {
            surface: Block::new(BlockTypeId(0)),
            filler: Block::new(BlockTypeId(1)),
            decoration: Some(Block::new(BlockTypeId(2))),
        }
    }

    fn grid() -> VoxelGrid {
        VoxelGrid::new(Point3::new(-4, 0, -4), Vector3::new(8, 6, 8)).unwrap()
    }

    #[test]
    fn solid_and_empty_cover_extremes() {
        let mut grid = grid();
        assert_eq!(grid.generate(&GridGenerator::Solid, &palette()), grid.len());
        assert_eq!(grid.generate(&GridGenerator::Empty, &palette()), 0);
    }

    #[test]
    fn checkerboard_fills_half() {
        let mut grid = grid();
        assert_eq!(grid.generate(&GridGenerator::Checkerboard, &palette()), grid.len() / 2);
        assert!(grid.get(Point3::new(-4, 0, -4)).is_some());
        assert!(grid.get(Point3::new(-3, 0, -4)).is_none());
    }

    #[test]
    fn random_fill_is_seeded() {
        let generator = GridGenerator::Random {
            density: 0.3,
            seed: 7,
        };
        let mut first = grid();
        let mut second = grid();
        let placed = first.generate(&generator, &palette());

        assert_eq!(second.generate(&generator, &palette()), placed);
        assert_eq!(first, second);
        assert!(placed > 0 && placed < first.len());
    }

    #[test]
    fn terrain_columns_are_capped_with_surface() {
        let mut grid = grid();
        let palette = palette();
        grid.generate(&GridGenerator::Terrain { seed: 3, scale: 0.1 }, &palette);

        for z in -4..4 {
            for x in -4..4 {
                // the bottom layer is always solid
                assert!(grid.get(Point3::new(x, 0, z)).is_some());

                let top = (0..6)
                    .rev()
                    .map(|y| Point3::new(x, y, z))
                    .find(|&p| {
                        grid.get(p)
                            .is_some_and(|block| Some(*block) != palette.decoration)
                    })
                    .unwrap();
                assert_eq!(grid.get(top), Some(&palette.surface));
            }
        }
    }

    #[test]
    fn generator_reads_from_json() {
        let generator: GridGenerator =
            serde_json::from_str(r#"{ "kind": "terrain", "seed": 42 }"#).unwrap();
        assert_eq!(
            generator,
            GridGenerator::Terrain {
                seed: 42,
                scale: DEFAULT_TERRAIN_SCALE
            }
        );
    }
}
