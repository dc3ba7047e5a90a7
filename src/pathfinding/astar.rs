//! Bounded weighted-grid A* over lazily costed cells

use crate::pathfinding::grid::{
    AXIS_NEIGHBORS, CellCoord, DIAGONAL_NEIGHBORS, GridSpec, Heuristic,
};
use crate::pathfinding::grid_cost::{
    CollisionMethod, GridCostModel, MoverInflation, ObstacleFootprint,
};
use crate::pathfinding::open_set::OpenSet;
use bevy::prelude::*;
use std::collections::HashMap;

/// Default multiplier bounding expansions relative to the start heuristic
pub const MAX_COMPLEXITY_FACTOR: u32 = 50;

/// Edge weight multiplier for diagonal moves
pub const DIAGONAL_FACTOR: f32 = 1.414213562;

/// Why a search ended without a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// Every reachable cell was explored
    Exhausted,
    /// The expansion budget ran out first
    BudgetExceeded,
    /// The start or destination has no cell index
    OutOfGrid,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// World-space waypoints from the exact start to the exact destination
    Found(Vec<Vec2>),
    NotFound(NotFoundReason),
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Everything one search call needs besides the obstacles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchRequest {
    pub start: Vec2,
    pub destination: Vec2,
    pub grid: GridSpec,
    pub allow_diagonals: bool,
    pub inflation: MoverInflation,
    pub collision: CollisionMethod,
    pub max_complexity_factor: u32,
}

impl SearchRequest {
    pub fn new(start: Vec2, destination: Vec2, grid: GridSpec) -> Self {
        Self {
            start,
            destination,
            grid,
            allow_diagonals: true,
            inflation: MoverInflation::default(),
            collision: CollisionMethod::Legacy,
            max_complexity_factor: MAX_COMPLEXITY_FACTOR,
        }
    }

    pub fn with_diagonals(mut self, allow_diagonals: bool) -> Self {
        self.allow_diagonals = allow_diagonals;
        self
    }

    pub fn with_inflation(mut self, inflation: MoverInflation) -> Self {
        self.inflation = inflation;
        self
    }

    pub fn with_collision(mut self, collision: CollisionMethod) -> Self {
        self.collision = collision;
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct SearchNode {
    cell: CellCoord,
    cost: f32,
    best: Option<f32>,
    parent: Option<usize>,
    closed: bool,
}

/// Search-scoped node arena. Nodes are created on first visit and dropped with the search.
struct AStarSearch<'a> {
    costs: &'a GridCostModel,
    heuristic: Heuristic,
    allow_diagonals: bool,
    destination: CellCoord,
    nodes: Vec<SearchNode>,
    index: HashMap<CellCoord, usize>,
    open: OpenSet,
    expansions: usize,
}

impl<'a> AStarSearch<'a> {
    fn new(costs: &'a GridCostModel, allow_diagonals: bool, destination: CellCoord) -> Self {
        Self {
            costs,
            heuristic: Heuristic::for_diagonals(allow_diagonals),
            allow_diagonals,
            destination,
            nodes: Vec::new(),
            index: HashMap::new(),
            open: OpenSet::new(),
            expansions: 0,
        }
    }

    fn node_at(&mut self, cell: CellCoord) -> usize {
        if let Some(&id) = self.index.get(&cell) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(SearchNode {
            cell,
            cost: self.costs.cell_cost(cell),
            best: None,
            parent: None,
            closed: false,
        });
        self.index.insert(cell, id);
        id
    }

    fn run(&mut self, start: CellCoord, budget: usize) -> Result<Vec<CellCoord>, NotFoundReason> {
        let start_id = self.node_at(start);
        self.nodes[start_id].best = Some(0.0);
        self.open
            .push(start_id, self.heuristic.distance(&start, &self.destination));

        while !self.open.is_empty() {
            if self.expansions > budget {
                return Err(NotFoundReason::BudgetExceeded);
            }
            self.expansions += 1;

            let Some(current) = self.open.pop() else {
                break;
            };
            self.nodes[current].closed = true;

            if self.nodes[current].cell == self.destination {
                return Ok(self.reconstruct(current));
            }

            self.expand(current);
        }

        Err(NotFoundReason::Exhausted)
    }

    fn expand(&mut self, current: usize) {
        let cell = self.nodes[current].cell;
        for &(dx, dy) in &AXIS_NEIGHBORS {
            self.relax(current, cell.offset(dx, dy), 1.0);
        }
        if self.allow_diagonals {
            for &(dx, dy) in &DIAGONAL_NEIGHBORS {
                self.relax(current, cell.offset(dx, dy), DIAGONAL_FACTOR);
            }
        }
    }

    fn relax(&mut self, current: usize, cell: CellCoord, factor: f32) {
        let neighbor = self.node_at(cell);
        let from = self.nodes[current];
        let to = self.nodes[neighbor];
        if to.closed || to.cost < 0.0 {
            return;
        }

        let Some(from_best) = from.best else {
            return;
        };
        let candidate =
            f64::from(from_best) + f64::from(from.cost + to.cost) / 2.0 * f64::from(factor);
        if to.best.is_some_and(|best| f64::from(best) <= candidate) {
            return;
        }

        let best = candidate as f32;
        let node = &mut self.nodes[neighbor];
        node.best = Some(best);
        node.parent = Some(current);
        let estimate = best + self.heuristic.distance(&cell, &self.destination);
        self.open.push(neighbor, estimate);
    }

    fn reconstruct(&self, last: usize) -> Vec<CellCoord> {
        let mut cells = vec![self.nodes[last].cell];
        let mut current = last;
        while let Some(parent) = self.nodes[current].parent {
            cells.push(self.nodes[parent].cell);
            current = parent;
        }
        cells.reverse();
        cells
    }
}

/// Maximum number of expansions a search between two cells may perform
pub fn expansion_budget(
    start: &CellCoord,
    destination: &CellCoord,
    allow_diagonals: bool,
    max_complexity_factor: u32,
) -> usize {
    let distance = Heuristic::for_diagonals(allow_diagonals).distance(start, destination);
    (distance.ceil() as usize).saturating_mul(max_complexity_factor as usize)
}

/// Find a path between two world positions avoiding the given obstacles.
///
/// When both positions fall in the same cell no search runs and the result is the direct
/// two-point path. Running out of cells or out of budget is a normal [`SearchOutcome::NotFound`].
pub fn find_path(request: &SearchRequest, obstacles: &[ObstacleFootprint]) -> SearchOutcome {
    let cells = (
        request.grid.try_world_to_cell(request.start),
        request.grid.try_world_to_cell(request.destination),
    );
    let (Some(start_cell), Some(destination_cell)) = cells else {
        warn!(
            "Pathfinding: ({}, {}) -> ({}, {}) is off the grid",
            request.start.x, request.start.y, request.destination.x, request.destination.y
        );
        return SearchOutcome::NotFound(NotFoundReason::OutOfGrid);
    };

    if start_cell == destination_cell {
        return SearchOutcome::Found(vec![request.start, request.destination]);
    }

    let costs =
        GridCostModel::with_method(obstacles, &request.grid, request.inflation, request.collision);
    let budget = expansion_budget(
        &start_cell,
        &destination_cell,
        request.allow_diagonals,
        request.max_complexity_factor,
    );
    let mut search = AStarSearch::new(&costs, request.allow_diagonals, destination_cell);
    let result = search.run(start_cell, budget);

    debug!(
        "Pathfinding: ({},{}) -> ({},{}) expansions={}/{} nodes={} obstacles={}",
        start_cell.x,
        start_cell.y,
        destination_cell.x,
        destination_cell.y,
        search.expansions,
        budget,
        search.nodes.len(),
        obstacles.len()
    );

    match result {
        Ok(cells) => {
            let mut waypoints: Vec<Vec2> = cells
                .into_iter()
                .map(|cell| request.grid.cell_to_world(cell))
                .collect();
            if let Some(first) = waypoints.first_mut() {
                *first = request.start;
            }
            if let Some(last) = waypoints.last_mut() {
                *last = request.destination;
            }
            SearchOutcome::Found(waypoints)
        }
        Err(reason) => SearchOutcome::NotFound(reason),
    }
}
