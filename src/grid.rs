use std::collections::VecDeque;

use crate::error::{IndexKind, MazeError, Result};

/// Grid size in cells. Both counts are at least one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    cells_horizontal: usize,
    cells_vertical: usize,
}

impl Dimensions {
    pub fn new(cells_horizontal: usize, cells_vertical: usize) -> Result<Self> {
        if cells_horizontal == 0 || cells_vertical == 0 {
            return Err(MazeError::invalid(format!(
                "cell counts must be positive, got {cells_horizontal}x{cells_vertical}"
            )));
        }
        Ok(Self {
            cells_horizontal,
            cells_vertical,
        })
    }

    #[inline]
    pub const fn cells_horizontal(&self) -> usize {
        self.cells_horizontal
    }

    #[inline]
    pub const fn cells_vertical(&self) -> usize {
        self.cells_vertical
    }

    #[inline]
    pub const fn cell_count(&self) -> usize {
        self.cells_horizontal * self.cells_vertical
    }

    /// Number of inter-cell passages, open or closed.
    pub const fn passage_count(&self) -> usize {
        self.cells_vertical * (self.cells_horizontal - 1)
            + (self.cells_vertical - 1) * self.cells_horizontal
    }

    pub fn contains(&self, row: isize, col: isize) -> bool {
        row >= 0
            && col >= 0
            && (row as usize) < self.cells_vertical
            && (col as usize) < self.cells_horizontal
    }

    pub fn check_cell(&self, row: usize, col: usize) -> Result<()> {
        check(
            IndexKind::Cell,
            row,
            col,
            self.cells_vertical,
            self.cells_horizontal,
        )
    }
}

fn check(kind: IndexKind, row: usize, col: usize, rows: usize, cols: usize) -> Result<()> {
    if row < rows && col < cols {
        Ok(())
    } else {
        Err(MazeError::OutOfRange {
            kind,
            row: row as i64,
            col: col as i64,
            rows,
            cols,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub row: usize,
    pub col: usize,
}

impl CellCoord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Left, Dir::Down, Dir::Right];

    /// `(d_row, d_col)` offset of the neighbour in this direction.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (-1, 0),
            Dir::Down => (1, 0),
            Dir::Left => (0, -1),
            Dir::Right => (0, 1),
        }
    }
}

/// Identifies the wall slot between two orthogonally adjacent cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Passage {
    /// Between `(row, col)` and `(row, col + 1)`.
    Vertical { row: usize, col: usize },
    /// Between `(row, col)` and `(row + 1, col)`.
    Horizontal { row: usize, col: usize },
}

impl Passage {
    /// Passage crossed when stepping from `cell` in `dir`. `None` when the
    /// step would leave the grid on the top or left edge; bottom/right bounds
    /// are checked by the table that receives the passage.
    pub fn between(cell: CellCoord, dir: Dir) -> Option<Passage> {
        let CellCoord { row, col } = cell;
        match dir {
            Dir::Left => col.checked_sub(1).map(|col| Passage::Vertical { row, col }),
            Dir::Right => Some(Passage::Vertical { row, col }),
            Dir::Up => row.checked_sub(1).map(|row| Passage::Horizontal { row, col }),
            Dir::Down => Some(Passage::Horizontal { row, col }),
        }
    }
}

/// Mutable maze state used while carving: visited flags plus the open flag of
/// every vertical and horizontal passage. Everything starts closed and
/// unvisited.
#[derive(Clone, Debug)]
pub struct GridModel {
    dims: Dimensions,
    visited: Vec<bool>,
    verticals: Vec<bool>,
    horizontals: Vec<bool>,
}

impl GridModel {
    pub fn new(dims: Dimensions) -> Self {
        let rows = dims.cells_vertical;
        let cols = dims.cells_horizontal;
        Self {
            dims,
            visited: vec![false; rows * cols],
            verticals: vec![false; rows * (cols - 1)],
            horizontals: vec![false; (rows - 1) * cols],
        }
    }

    #[inline]
    pub fn dims(&self) -> Dimensions {
        self.dims
    }

    pub fn is_visited(&self, row: usize, col: usize) -> Result<bool> {
        self.dims.check_cell(row, col)?;
        Ok(self.visited[row * self.dims.cells_horizontal + col])
    }

    pub fn mark_visited(&mut self, row: usize, col: usize) -> Result<()> {
        self.dims.check_cell(row, col)?;
        self.visited[row * self.dims.cells_horizontal + col] = true;
        Ok(())
    }

    pub fn all_visited(&self) -> bool {
        self.visited.iter().all(|v| *v)
    }

    pub fn set_vertical_open(&mut self, row: usize, col: usize) -> Result<()> {
        let idx = vertical_index(self.dims, row, col)?;
        self.verticals[idx] = true;
        Ok(())
    }

    pub fn set_horizontal_open(&mut self, row: usize, col: usize) -> Result<()> {
        let idx = horizontal_index(self.dims, row, col)?;
        self.horizontals[idx] = true;
        Ok(())
    }

    pub fn open(&mut self, passage: Passage) -> Result<()> {
        match passage {
            Passage::Vertical { row, col } => self.set_vertical_open(row, col),
            Passage::Horizontal { row, col } => self.set_horizontal_open(row, col),
        }
    }

    /// Freezes the passage tables. Visited flags are dropped; nothing
    /// downstream of generation reads them.
    pub fn into_maze(self) -> Maze {
        Maze {
            dims: self.dims,
            verticals: self.verticals,
            horizontals: self.horizontals,
        }
    }
}

fn vertical_index(dims: Dimensions, row: usize, col: usize) -> Result<usize> {
    let cols = dims.cells_horizontal - 1;
    check(
        IndexKind::VerticalPassage,
        row,
        col,
        dims.cells_vertical,
        cols,
    )?;
    Ok(row * cols + col)
}

fn horizontal_index(dims: Dimensions, row: usize, col: usize) -> Result<usize> {
    let cols = dims.cells_horizontal;
    check(
        IndexKind::HorizontalPassage,
        row,
        col,
        dims.cells_vertical - 1,
        cols,
    )?;
    Ok(row * cols + col)
}

/// Finished passage tables. Read-only once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Maze {
    dims: Dimensions,
    verticals: Vec<bool>,
    horizontals: Vec<bool>,
}

impl Maze {
    /// Every passage closed.
    pub fn closed(dims: Dimensions) -> Self {
        GridModel::new(dims).into_maze()
    }

    /// Builds a maze from row-major passage tables: `verticals` is
    /// `cells_vertical` rows of `cells_horizontal - 1` flags, `horizontals`
    /// is `cells_vertical - 1` rows of `cells_horizontal` flags.
    pub fn from_tables(
        dims: Dimensions,
        verticals: &[Vec<bool>],
        horizontals: &[Vec<bool>],
    ) -> Result<Self> {
        let rows = dims.cells_vertical;
        let cols = dims.cells_horizontal;
        if verticals.len() != rows || verticals.iter().any(|r| r.len() != cols - 1) {
            return Err(MazeError::invalid(format!(
                "vertical passage table must be {rows}x{}",
                cols - 1
            )));
        }
        if horizontals.len() != rows - 1 || horizontals.iter().any(|r| r.len() != cols) {
            return Err(MazeError::invalid(format!(
                "horizontal passage table must be {}x{cols}",
                rows - 1
            )));
        }
        Ok(Self {
            dims,
            verticals: verticals.concat(),
            horizontals: horizontals.concat(),
        })
    }

    #[inline]
    pub fn dims(&self) -> Dimensions {
        self.dims
    }

    pub fn vertical_open(&self, row: usize, col: usize) -> Result<bool> {
        Ok(self.verticals[vertical_index(self.dims, row, col)?])
    }

    pub fn horizontal_open(&self, row: usize, col: usize) -> Result<bool> {
        Ok(self.horizontals[horizontal_index(self.dims, row, col)?])
    }

    /// `(row, col, open)` for every vertical passage, row-major.
    pub fn verticals(&self) -> impl Iterator<Item = (usize, usize, bool)> + '_ {
        let cols = self.dims.cells_horizontal - 1;
        self.verticals
            .iter()
            .enumerate()
            .map(move |(i, open)| (i / cols, i % cols, *open))
    }

    /// `(row, col, open)` for every horizontal passage, row-major.
    pub fn horizontals(&self) -> impl Iterator<Item = (usize, usize, bool)> + '_ {
        let cols = self.dims.cells_horizontal;
        self.horizontals
            .iter()
            .enumerate()
            .map(move |(i, open)| (i / cols, i % cols, *open))
    }

    pub fn open_passage_count(&self) -> usize {
        self.verticals.iter().chain(&self.horizontals).filter(|v| **v).count()
    }

    /// Whether the wall on the `dir` side of `cell` is open. Grid edges and
    /// out-of-range cells are always closed.
    pub fn is_open(&self, cell: CellCoord, dir: Dir) -> bool {
        if self.dims.check_cell(cell.row, cell.col).is_err() {
            return false;
        }
        match Passage::between(cell, dir) {
            Some(Passage::Vertical { row, col }) => self.vertical_open(row, col).unwrap_or(false),
            Some(Passage::Horizontal { row, col }) => {
                self.horizontal_open(row, col).unwrap_or(false)
            }
            None => false,
        }
    }

    pub fn open_neighbors(&self, cell: CellCoord) -> Vec<CellCoord> {
        Dir::ALL
            .iter()
            .filter(|dir| self.is_open(cell, **dir))
            .map(|dir| {
                let (dr, dc) = dir.delta();
                CellCoord::new(
                    (cell.row as isize + dr) as usize,
                    (cell.col as isize + dc) as usize,
                )
            })
            .collect()
    }

    /// Breadth-first step count from `start` to every cell, walking only open
    /// passages. Unreachable cells hold -1.
    pub fn distances_from(&self, start: CellCoord) -> Result<Vec<Vec<i32>>> {
        self.dims.check_cell(start.row, start.col)?;
        let mut dist = vec![vec![-1; self.dims.cells_horizontal]; self.dims.cells_vertical];
        let mut q = VecDeque::new();
        dist[start.row][start.col] = 0;
        q.push_back(start);

        while let Some(cell) = q.pop_front() {
            let base = dist[cell.row][cell.col];
            for next in self.open_neighbors(cell) {
                if dist[next.row][next.col] == -1 {
                    dist[next.row][next.col] = base + 1;
                    q.push_back(next);
                }
            }
        }
        Ok(dist)
    }

    /// Open passages form a spanning tree over the cells.
    pub fn is_perfect(&self) -> bool {
        if self.open_passage_count() != self.dims.cell_count() - 1 {
            return false;
        }
        match self.distances_from(CellCoord::new(0, 0)) {
            Ok(dist) => dist.iter().flatten().all(|d| *d >= 0),
            Err(_) => false,
        }
    }
}
