//! Virtual grid geometry shared by the cost model and the search

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_4;

/// Largest cell index a world position may map to. Beyond it positions are off-grid.
pub const MAX_CELL_INDEX: f32 = 16_777_216.0;

/// Axis moves, in expansion order
pub const AXIS_NEIGHBORS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Diagonal moves, in expansion order
pub const DIAGONAL_NEIGHBORS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

/// Integer coordinate of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

impl CellCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Neighboring cell. Saturates at the edge of the index range, so an edge cell
    /// has itself as neighbor there.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// Straight-line distance in cell units
    pub fn euclidean_distance(&self, other: &CellCoord) -> f32 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        (dx * dx + dy * dy).sqrt() as f32
    }

    /// Taxi distance in cell units
    pub fn manhattan_distance(&self, other: &CellCoord) -> f32 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        (dx.abs() + dy.abs()) as f32
    }
}

/// Distance estimate used to order expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heuristic {
    Euclidean,
    Manhattan,
}

impl Heuristic {
    /// Euclidean when diagonal moves exist, Manhattan otherwise
    pub fn for_diagonals(allow_diagonals: bool) -> Self {
        if allow_diagonals {
            Self::Euclidean
        } else {
            Self::Manhattan
        }
    }

    pub fn distance(self, a: &CellCoord, b: &CellCoord) -> f32 {
        match self {
            Self::Euclidean => a.euclidean_distance(b),
            Self::Manhattan => a.manhattan_distance(b),
        }
    }
}

/// How the scene is looked at, which decides the shape of grid cells on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Viewpoint {
    /// Cells are axis-aligned rectangles
    #[default]
    TopDown,
    /// Cells are diamonds. The cell width and height give the diamond's screen extent.
    Isometry,
}

/// Linear map between screen space and the grid's own square basis
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridBasis {
    Identity,
    Isometric { to_screen: Mat2, to_grid: Mat2 },
}

impl GridBasis {
    /// Isometric projection whose x axis makes `angle` radians with the screen x axis.
    /// `angle` must lie in ]0, pi/4[.
    pub fn isometric(angle: f64) -> Option<Self> {
        let in_range = angle > 0.0 && angle < FRAC_PI_4;
        if !in_range {
            return None;
        }
        // Vertical squash, the sine of the view's tilt
        let sin_a = angle.tan();
        let (sin_b, cos_b) = FRAC_PI_4.sin_cos();
        let to_screen = Mat2::from_cols(
            Vec2::new(cos_b as f32, (sin_a * sin_b) as f32),
            Vec2::new(-sin_b as f32, (sin_a * cos_b) as f32),
        );
        let to_grid = Mat2::from_cols(
            Vec2::new(cos_b as f32, -sin_b as f32),
            Vec2::new((sin_b / sin_a) as f32, (cos_b / sin_a) as f32),
        );
        Some(Self::Isometric {
            to_screen,
            to_grid,
        })
    }

    fn to_grid(self, screen: Vec2) -> Vec2 {
        match self {
            Self::Identity => screen,
            Self::Isometric { to_grid, .. } => to_grid * screen,
        }
    }

    fn to_screen(self, grid: Vec2) -> Vec2 {
        match self {
            Self::Identity => grid,
            Self::Isometric { to_screen, .. } => to_screen * grid,
        }
    }
}

/// Cell dimensions, origin and basis of the virtual grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub cell_width: f32,
    pub cell_height: f32,
    pub offset: Vec2,
    pub basis: GridBasis,
}

impl GridSpec {
    pub fn new(cell_width: f32, cell_height: f32) -> Self {
        Self {
            cell_width,
            cell_height,
            offset: Vec2::ZERO,
            basis: GridBasis::Identity,
        }
    }

    /// Diamond cells spanning `cell_width` by `cell_height` on screen.
    ///
    /// Returns `None` unless `cell_height < cell_width`. Searching happens on square
    /// cells of side `cell_width / sqrt(2)` in the rotated basis.
    pub fn isometric(cell_width: f32, cell_height: f32) -> Option<Self> {
        if cell_height >= cell_width {
            return None;
        }
        let angle = (f64::from(cell_height) / f64::from(cell_width)).atan();
        let basis = GridBasis::isometric(angle)?;
        let side = (f64::from(cell_width) / std::f64::consts::SQRT_2) as f32;
        Some(Self {
            basis,
            ..Self::new(side, side)
        })
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Cell containing a world position (nearest cell center, halves round up).
    /// Indices saturate at the `i32` range; see [`GridSpec::try_world_to_cell`].
    pub fn world_to_cell(&self, world: Vec2) -> CellCoord {
        let local = self.basis.to_grid(world - self.offset);
        CellCoord::new(
            round_half_up(local.x / self.cell_width),
            round_half_up(local.y / self.cell_height),
        )
    }

    /// Like [`GridSpec::world_to_cell`], but `None` for positions off the grid
    /// (non-finite, or further than [`MAX_CELL_INDEX`] cells from the origin)
    pub fn try_world_to_cell(&self, world: Vec2) -> Option<CellCoord> {
        let local = self.basis.to_grid(world - self.offset);
        let index = Vec2::new(local.x / self.cell_width, local.y / self.cell_height);
        let on_grid = index.is_finite() && index.abs().max_element() <= MAX_CELL_INDEX;
        on_grid.then(|| self.world_to_cell(world))
    }

    /// World position of a cell's center
    pub fn cell_to_world(&self, cell: CellCoord) -> Vec2 {
        let local = Vec2::new(
            cell.x as f32 * self.cell_width,
            cell.y as f32 * self.cell_height,
        );
        self.basis.to_screen(local) + self.offset
    }
}

pub fn round_half_up(value: f32) -> i32 {
    (value + 0.5).floor() as i32
}
