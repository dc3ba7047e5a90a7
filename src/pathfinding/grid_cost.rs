//! Lazily evaluated traversal cost of grid cells

use crate::components::SceneObject;
use crate::pathfinding::grid::{CellCoord, GridSpec};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Cost of a cell no obstacle touches
pub const DEFAULT_CELL_COST: f32 = 1.0;

/// Cost marking a cell as unusable
pub const IMPASSABLE_COST: f32 = -1.0;

/// How the mover is tested against obstacles at a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionMethod {
    /// Unrotated drawable rectangles rasterized to cell index ranges. Ignores the grid basis.
    #[default]
    Legacy,
    /// Rotated bounding boxes, with the mover's box placed on each cell center
    Aabb,
}

/// Snapshot of one registered obstacle, taken when a search starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleFootprint {
    /// Drawable top-left corner in world space
    pub min: Vec2,
    pub size: Vec2,
    /// Bounding box of the rotated drawable area
    pub aabb: Rect,
    pub cost: f32,
    pub impassable: bool,
}

impl ObstacleFootprint {
    /// Unrotated obstacle
    pub fn new(min: Vec2, size: Vec2, cost: f32, impassable: bool) -> Self {
        Self {
            min,
            size,
            aabb: Rect::from_corners(min, min + size),
            cost,
            impassable,
        }
    }

    pub fn from_object(object: &SceneObject, cost: f32, impassable: bool) -> Self {
        Self {
            aabb: object.aabb(),
            ..Self::new(object.drawable_position(), object.size, cost, impassable)
        }
    }
}

/// Distance from the mover's reference point to each edge of its footprint,
/// grown by the configured extra border
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoverInflation {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl MoverInflation {
    /// Edges of the unrotated drawable area
    pub fn from_object(object: &SceneObject, extra_border: f32) -> Self {
        Self {
            left: object.origin.x + extra_border,
            top: object.origin.y + extra_border,
            right: object.size.x - object.origin.x + extra_border,
            bottom: object.size.y - object.origin.y + extra_border,
        }
    }

    /// Edges of the rotated bounding box
    pub fn from_aabb(object: &SceneObject, extra_border: f32) -> Self {
        let aabb = object.aabb();
        Self {
            left: object.position.x - aabb.min.x + extra_border,
            top: object.position.y - aabb.min.y + extra_border,
            right: aabb.max.x - object.position.x + extra_border,
            bottom: aabb.max.y - object.position.y + extra_border,
        }
    }

    pub fn for_method(object: &SceneObject, extra_border: f32, method: CollisionMethod) -> Self {
        match method {
            CollisionMethod::Legacy => Self::from_object(object, extra_border),
            CollisionMethod::Aabb => Self::from_aabb(object, extra_border),
        }
    }

    /// The mover's box when its reference point sits at `center`
    fn stamp(&self, center: Vec2) -> Rect {
        Rect {
            min: center - Vec2::new(self.left, self.top),
            max: center + Vec2::new(self.right, self.bottom),
        }
    }
}

/// Exclusive cell bounds covered by an inflated obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellSpan {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

impl CellSpan {
    fn around(footprint: &ObstacleFootprint, grid: &GridSpec, inflation: &MoverInflation) -> Self {
        let local = footprint.min - grid.offset;
        let max = local + footprint.size;
        Self {
            min_x: ((local.x - inflation.right) / grid.cell_width).floor() as i32,
            min_y: ((local.y - inflation.bottom) / grid.cell_height).floor() as i32,
            max_x: ((max.x + inflation.left) / grid.cell_width).ceil() as i32,
            max_y: ((max.y + inflation.top) / grid.cell_height).ceil() as i32,
        }
    }

    fn contains(&self, cell: CellCoord) -> bool {
        self.min_x < cell.x && cell.x < self.max_x && self.min_y < cell.y && cell.y < self.max_y
    }
}

/// Strict overlap, so boxes sharing only an edge do not collide
fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.min.x < b.max.x && a.max.x > b.min.x && a.min.y < b.max.y && a.max.y > b.min.y
}

#[derive(Debug, Clone, Copy)]
enum Coverage {
    Cells(CellSpan),
    Area(Rect),
}

#[derive(Debug, Clone, Copy)]
struct InflatedObstacle {
    coverage: Coverage,
    cost: f32,
    impassable: bool,
}

/// Derives cell costs from a set of obstacle footprints for one mover.
///
/// With [`CollisionMethod::Legacy`] an obstacle rectangle is widened by the mover's
/// footprint so that testing the mover's reference point against it is the same as testing
/// the whole mover. With [`CollisionMethod::Aabb`] the mover's box is placed on the cell's
/// world center and tested against each obstacle's box.
///
/// A covered cell under an impassable obstacle costs [`IMPASSABLE_COST`]; otherwise the
/// costs of every passable obstacle covering it add up. Cells nothing covers cost
/// [`DEFAULT_CELL_COST`].
#[derive(Debug, Clone)]
pub struct GridCostModel {
    obstacles: Vec<InflatedObstacle>,
    grid: GridSpec,
    inflation: MoverInflation,
}

impl GridCostModel {
    pub fn new(
        footprints: &[ObstacleFootprint],
        grid: &GridSpec,
        inflation: MoverInflation,
    ) -> Self {
        Self::with_method(footprints, grid, inflation, CollisionMethod::Legacy)
    }

    pub fn with_method(
        footprints: &[ObstacleFootprint],
        grid: &GridSpec,
        inflation: MoverInflation,
        method: CollisionMethod,
    ) -> Self {
        let obstacles = footprints
            .iter()
            .map(|footprint| InflatedObstacle {
                coverage: match method {
                    CollisionMethod::Legacy => {
                        Coverage::Cells(CellSpan::around(footprint, grid, &inflation))
                    }
                    CollisionMethod::Aabb => Coverage::Area(footprint.aabb),
                },
                cost: footprint.cost,
                impassable: footprint.impassable,
            })
            .collect();

        Self {
            obstacles,
            grid: *grid,
            inflation,
        }
    }

    pub fn cell_cost(&self, cell: CellCoord) -> f32 {
        let mut stamp = None;
        let mut touched = false;
        let mut cost = 0.0;
        for obstacle in &self.obstacles {
            let covers = match &obstacle.coverage {
                Coverage::Cells(span) => span.contains(cell),
                Coverage::Area(area) => {
                    let stamp = stamp.get_or_insert_with(|| {
                        self.inflation.stamp(self.grid.cell_to_world(cell))
                    });
                    overlaps(area, stamp)
                }
            };
            if !covers {
                continue;
            }
            if obstacle.impassable {
                return IMPASSABLE_COST;
            }
            touched = true;
            cost += obstacle.cost;
        }

        if touched { cost } else { DEFAULT_CELL_COST }
    }

    pub fn is_blocked(&self, cell: CellCoord) -> bool {
        self.cell_cost(cell) < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridSpec {
        GridSpec::new(20.0, 20.0)
    }

    #[test]
    fn test_empty_cells_cost_one() {
        let model = GridCostModel::new(&[], &grid(), MoverInflation::default());
        assert_eq!(model.cell_cost(CellCoord::new(0, 0)), DEFAULT_CELL_COST);
        assert_eq!(model.cell_cost(CellCoord::new(-40, 900)), DEFAULT_CELL_COST);
    }

    #[test]
    fn test_impassable_covers_strict_interior() {
        // 32x32 at (300, 600): cells 15..17 by 30..32 exclusive
        let obstacle =
            ObstacleFootprint::new(Vec2::new(300.0, 600.0), Vec2::splat(32.0), 2.0, true);
        let model = GridCostModel::new(&[obstacle], &grid(), MoverInflation::default());

        assert!(model.is_blocked(CellCoord::new(16, 31)));
        assert!(!model.is_blocked(CellCoord::new(15, 31)));
        assert!(!model.is_blocked(CellCoord::new(17, 31)));
        assert!(!model.is_blocked(CellCoord::new(16, 30)));
        assert!(!model.is_blocked(CellCoord::new(16, 32)));
    }

    #[test]
    fn test_mover_footprint_inflates_obstacle() {
        let obstacle =
            ObstacleFootprint::new(Vec2::new(300.0, 600.0), Vec2::splat(32.0), 2.0, true);
        let mover = SceneObject::new(Vec2::ZERO, Vec2::splat(20.0)).with_origin(Vec2::splat(10.0));
        let inflation = MoverInflation::from_object(&mover, 0.0);
        let model = GridCostModel::new(&[obstacle], &grid(), inflation);

        // Span grows to 14..18 on x
        assert!(model.is_blocked(CellCoord::new(15, 31)));
        assert!(model.is_blocked(CellCoord::new(17, 31)));
        assert!(!model.is_blocked(CellCoord::new(14, 31)));
        assert!(!model.is_blocked(CellCoord::new(18, 31)));
    }

    #[test]
    fn test_extra_border_applies_on_every_side() {
        let mover = SceneObject::new(Vec2::new(50.0, 50.0), Vec2::new(10.0, 6.0))
            .with_origin(Vec2::new(2.0, 1.0));
        let inflation = MoverInflation::from_object(&mover, 3.0);
        assert_eq!(
            inflation,
            MoverInflation {
                left: 5.0,
                top: 4.0,
                right: 11.0,
                bottom: 8.0,
            }
        );
    }

    #[test]
    fn test_passable_costs_stack() {
        let area = Vec2::splat(100.0);
        let footprints = [
            ObstacleFootprint::new(Vec2::ZERO, area, 2.0, false),
            ObstacleFootprint::new(Vec2::ZERO, area, 3.5, false),
        ];
        let model = GridCostModel::new(&footprints, &grid(), MoverInflation::default());
        assert_eq!(model.cell_cost(CellCoord::new(2, 2)), 5.5);
    }

    #[test]
    fn test_zero_cost_obstacle_yields_free_cell() {
        let footprint = ObstacleFootprint::new(Vec2::ZERO, Vec2::splat(100.0), 0.0, false);
        let model = GridCostModel::new(&[footprint], &grid(), MoverInflation::default());
        assert_eq!(model.cell_cost(CellCoord::new(2, 2)), 0.0);
    }

    #[test]
    fn test_impassable_wins_over_passable() {
        let area = Vec2::splat(100.0);
        let footprints = [
            ObstacleFootprint::new(Vec2::ZERO, area, 4.0, false),
            ObstacleFootprint::new(Vec2::ZERO, area, 4.0, true),
        ];
        let model = GridCostModel::new(&footprints, &grid(), MoverInflation::default());
        assert_eq!(model.cell_cost(CellCoord::new(2, 2)), IMPASSABLE_COST);
    }

    #[test]
    fn test_grid_offset_moves_obstacle_cells() {
        let footprint =
            ObstacleFootprint::new(Vec2::new(310.0, 610.0), Vec2::splat(32.0), 1.0, true);
        let grid = grid().with_offset(Vec2::splat(10.0));
        let model = GridCostModel::new(&[footprint], &grid, MoverInflation::default());
        assert!(model.is_blocked(CellCoord::new(16, 31)));
    }

    #[test]
    fn test_aabb_matches_legacy_for_upright_obstacles() {
        let obstacle =
            ObstacleFootprint::new(Vec2::new(300.0, 600.0), Vec2::splat(32.0), 2.0, true);
        let mover = SceneObject::new(Vec2::ZERO, Vec2::splat(20.0)).with_origin(Vec2::splat(10.0));
        let legacy =
            GridCostModel::new(&[obstacle], &grid(), MoverInflation::from_object(&mover, 0.0));
        let aabb = GridCostModel::with_method(
            &[obstacle],
            &grid(),
            MoverInflation::from_aabb(&mover, 0.0),
            CollisionMethod::Aabb,
        );

        for x in 12..20 {
            for y in 28..34 {
                let cell = CellCoord::new(x, y);
                assert_eq!(legacy.cell_cost(cell), aabb.cell_cost(cell), "{cell:?}");
            }
        }
    }

    #[test]
    fn test_aabb_uses_rotated_boxes() {
        // A 100x10 plank stood upright spans x 145..155 and y 0..100
        let plank =
            SceneObject::new(Vec2::new(100.0, 45.0), Vec2::new(100.0, 10.0)).with_angle(90.0);
        let footprint = ObstacleFootprint::from_object(&plank, 2.0, true);
        let inflation = MoverInflation {
            left: 10.0,
            top: 10.0,
            right: 10.0,
            bottom: 10.0,
        };

        let aabb =
            GridCostModel::with_method(&[footprint], &grid(), inflation, CollisionMethod::Aabb);
        assert!(aabb.is_blocked(CellCoord::new(7, 0)));
        assert!(aabb.is_blocked(CellCoord::new(8, 5)));
        assert!(!aabb.is_blocked(CellCoord::new(6, 2)));
        assert!(!aabb.is_blocked(CellCoord::new(7, 6)));

        // The legacy rasterizer only sees the unrotated drawable rectangle
        let legacy = GridCostModel::new(&[footprint], &grid(), inflation);
        assert!(legacy.is_blocked(CellCoord::new(6, 2)));
        assert!(!legacy.is_blocked(CellCoord::new(7, 0)));
        assert!(!legacy.is_blocked(CellCoord::new(8, 5)));
    }

    #[test]
    fn test_aabb_inflation_follows_mover_rotation() {
        let mover = SceneObject::new(Vec2::ZERO, Vec2::new(40.0, 10.0))
            .with_origin(Vec2::new(20.0, 5.0))
            .with_angle(90.0);
        let inflation = MoverInflation::for_method(&mover, 1.0, CollisionMethod::Aabb);
        assert!((inflation.left - 6.0).abs() < 1e-4);
        assert!((inflation.right - 6.0).abs() < 1e-4);
        assert!((inflation.top - 21.0).abs() < 1e-4);
        assert!((inflation.bottom - 21.0).abs() < 1e-4);

        let legacy = MoverInflation::for_method(&mover, 1.0, CollisionMethod::Legacy);
        assert_eq!(legacy.left, 21.0);
        assert_eq!(legacy.top, 6.0);
    }

    #[test]
    fn test_aabb_follows_isometric_cell_centers() {
        let grid = GridSpec::isometric(64.0, 32.0).unwrap();
        // Small box around the screen center of cell (1, 0), at (32, 16)
        let footprint = ObstacleFootprint::new(Vec2::new(28.0, 12.0), Vec2::splat(8.0), 2.0, true);
        let model = GridCostModel::with_method(
            &[footprint],
            &grid,
            MoverInflation::default(),
            CollisionMethod::Aabb,
        );
        assert!(model.is_blocked(CellCoord::new(1, 0)));
        assert!(!model.is_blocked(CellCoord::new(0, 0)));
        assert!(!model.is_blocked(CellCoord::new(0, 1)));
    }
}
