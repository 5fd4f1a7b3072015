//! Uniform grid for neighbour lookups
//!
//! Positions are bucketed by their xy cell. A query only visits occupied cells
//! overlapping the search radius, so its cost is bounded by the number of
//! agents however large the radius gets.

use glam::Vec3;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

const MIN_CELL_SIZE: f32 = 1.0e-3;

/// Spatial hash of agent positions
#[derive(Debug, Clone)]
pub struct NeighbourGrid {
    cell_size: f32,
    cells: FxHashMap<(i32, i32), SmallVec<[usize; 8]>>,
    /// Inclusive cell range covering every indexed position
    bounds: Option<((i32, i32), (i32, i32))>,
    positions: Vec<Vec3>,
}

impl NeighbourGrid {
    /// Create an empty grid
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(MIN_CELL_SIZE),
            cells: FxHashMap::default(),
            bounds: None,
            positions: Vec::new(),
        }
    }

    /// Side length of a cell
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Change the cell size; takes effect on the next rebuild
    pub fn set_cell_size(&mut self, cell_size: f32) {
        self.cell_size = cell_size.max(MIN_CELL_SIZE);
    }

    /// Number of indexed positions
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True if nothing is indexed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of cells holding at least one position
    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Re-index all positions; index `i` in queries refers to the i-th item
    pub fn rebuild(&mut self, positions: impl IntoIterator<Item = Vec3>) {
        self.positions.clear();
        self.positions.extend(positions);

        // reuse buckets of cells that stay occupied
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }

        self.bounds = None;
        for (i, &pos) in self.positions.iter().enumerate() {
            let (cx, cy) = cell_of(pos, self.cell_size);
            self.cells.entry((cx, cy)).or_default().push(i);
            self.bounds = Some(match self.bounds {
                None => ((cx, cy), (cx, cy)),
                Some(((min_x, min_y), (max_x, max_y))) => (
                    (min_x.min(cx), min_y.min(cy)),
                    (max_x.max(cx), max_y.max(cy)),
                ),
            });
        }

        self.cells.retain(|_, bucket| !bucket.is_empty());
    }

    /// Indices within `radius` of the position at `index`, excluding `index`
    #[must_use]
    pub fn query(&self, index: usize, radius: f32) -> SmallVec<[usize; 16]> {
        match self.positions.get(index) {
            Some(&pos) => self.query_point(pos, radius, Some(index)),
            None => SmallVec::new(),
        }
    }

    /// Indices within `radius` of `point`, optionally skipping one index
    #[must_use]
    pub fn query_point(
        &self,
        point: Vec3,
        radius: f32,
        exclude: Option<usize>,
    ) -> SmallVec<[usize; 16]> {
        let mut found: SmallVec<[usize; 16]> = SmallVec::new();
        let Some(((occupied_min_x, occupied_min_y), (occupied_max_x, occupied_max_y))) =
            self.bounds
        else {
            return found;
        };
        if radius.is_nan() || radius < 0.0 {
            return found;
        }

        let radius_sq = radius * radius;
        let (min_x, min_y) = cell_of(point - Vec3::splat(radius), self.cell_size);
        let (max_x, max_y) = cell_of(point + Vec3::splat(radius), self.cell_size);
        let (min_x, min_y) = (min_x.max(occupied_min_x), min_y.max(occupied_min_y));
        let (max_x, max_y) = (max_x.min(occupied_max_x), max_y.min(occupied_max_y));
        if min_x > max_x || min_y > max_y {
            return found;
        }

        let mut visit = |bucket: &SmallVec<[usize; 8]>| {
            for &i in bucket {
                if Some(i) != exclude && self.positions[i].distance_squared(point) <= radius_sq {
                    found.push(i);
                }
            }
        };

        let box_cells = (i64::from(max_x) - i64::from(min_x) + 1)
            * (i64::from(max_y) - i64::from(min_y) + 1);
        if box_cells > self.cells.len() as i64 {
            // sparse grid: walk the occupied cells instead of the box
            for (&(cx, cy), bucket) in &self.cells {
                if (min_x..=max_x).contains(&cx) && (min_y..=max_y).contains(&cy) {
                    visit(bucket);
                }
            }
        } else {
            for cy in min_y..=max_y {
                for cx in min_x..=max_x {
                    if let Some(bucket) = self.cells.get(&(cx, cy)) {
                        visit(bucket);
                    }
                }
            }
        }

        found.sort_unstable();
        found
    }
}

fn cell_of(pos: Vec3, cell_size: f32) -> (i32, i32) {
    (
        (pos.x / cell_size).floor() as i32,
        (pos.y / cell_size).floor() as i32,
    )
}
