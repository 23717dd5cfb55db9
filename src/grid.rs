use std::{
    collections::VecDeque,
    fmt,
    ops::{Index, IndexMut},
    str::FromStr,
};

use crate::error::{Error, Result};

/// Grid coordinates as `(row, col)`
pub type Pos = (usize, usize);

/// Orthogonal unit offsets in `(row, col)` order: up, down, left, right
pub(crate) const OFFSETS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// The state of a single grid unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    Open,
    Wall,
}

impl Cell {
    /// The opposite state
    pub fn flipped(self) -> Self {
        match self {
            Cell::Open => Cell::Wall,
            Cell::Wall => Cell::Open,
        }
    }
}

/// A fixed-size rectangular occupancy grid stored in row-major order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Cell>,
    width: usize,
    height: usize,
}

impl Grid {
    /// Construct a `height` x `width` grid with every cell set to `cell`
    ///
    /// **Errors** if either dimension is zero
    pub fn filled(width: usize, height: usize, cell: Cell) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { height, width });
        }
        Ok(Self {
            cells: vec![cell; width * height],
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells, which is also the size of the state space
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.0 < self.height && pos.1 < self.width
    }

    pub fn get(&self, pos: Pos) -> Option<Cell> {
        self.contains(pos).then(|| self[pos])
    }

    /// `true` only for in-bounds open cells
    pub fn is_open(&self, pos: Pos) -> bool {
        self.get(pos) == Some(Cell::Open)
    }

    pub(crate) fn check_bounds(&self, pos: Pos) -> Result<()> {
        if self.contains(pos) {
            Ok(())
        } else {
            Err(Error::OutOfBounds {
                pos,
                height: self.height,
                width: self.width,
            })
        }
    }

    /// Map a position to its state index `row * width + col`
    pub fn state_index(&self, pos: Pos) -> usize {
        pos.0 * self.width + pos.1
    }

    /// Inverse of [`state_index`](Self::state_index)
    pub fn position_of(&self, state: usize) -> Pos {
        (state / self.width, state % self.width)
    }

    /// In-bounds orthogonal neighbors of `pos`
    pub fn neighbors(&self, pos: Pos) -> impl Iterator<Item = Pos> + '_ {
        OFFSETS.iter().filter_map(move |&(dr, dc)| {
            let row = pos.0.checked_add_signed(dr)?;
            let col = pos.1.checked_add_signed(dc)?;
            self.contains((row, col)).then_some((row, col))
        })
    }

    /// Count of open orthogonal neighbors of `pos`
    pub fn open_neighbors(&self, pos: Pos) -> usize {
        self.neighbors(pos).filter(|&n| self[n] == Cell::Open).count()
    }

    /// Length of the shortest path between two open cells, moving orthogonally through open cells
    ///
    /// **Returns** `None` if either cell is not open or `to` cannot be reached
    pub fn distance(&self, from: Pos, to: Pos) -> Option<usize> {
        if !self.is_open(from) || !self.is_open(to) {
            return None;
        }

        let mut dist: Vec<Option<usize>> = vec![None; self.len()];
        let mut queue = VecDeque::from([from]);
        dist[self.state_index(from)] = Some(0);

        while let Some(pos) = queue.pop_front() {
            let d = dist[self.state_index(pos)]?;
            if pos == to {
                return Some(d);
            }
            for next in self.neighbors(pos) {
                let ix = self.state_index(next);
                if dist[ix].is_none() && self[next] == Cell::Open {
                    dist[ix] = Some(d + 1);
                    queue.push_back(next);
                }
            }
        }

        None
    }

    /// Breadth-first search over open cells, testing whether `to` can be reached from `from`
    pub fn is_reachable(&self, from: Pos, to: Pos) -> bool {
        self.distance(from, to).is_some()
    }

    /// Iterate over the grid one row at a time
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }

    pub(crate) fn toggle(&mut self, pos: Pos) {
        let cell = &mut self[pos];
        *cell = cell.flipped();
    }
}

impl Index<Pos> for Grid {
    type Output = Cell;

    fn index(&self, pos: Pos) -> &Self::Output {
        assert!(self.contains(pos), "position {pos:?} out of bounds");
        &self.cells[pos.0 * self.width + pos.1]
    }
}

impl IndexMut<Pos> for Grid {
    fn index_mut(&mut self, pos: Pos) -> &mut Self::Output {
        assert!(self.contains(pos), "position {pos:?} out of bounds");
        &mut self.cells[pos.0 * self.width + pos.1]
    }
}

/// `#` for walls, `.` for open cells
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for cell in row {
                let c = match cell {
                    Cell::Open => '.',
                    Cell::Wall => '#',
                };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Parses the [`Display`](fmt::Display) format, one line per row
impl FromStr for Grid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lines: Vec<&str> = s.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        let height = lines.len();
        let width = lines.first().map_or(0, |l| l.chars().count());
        let mut grid = Grid::filled(width, height, Cell::Open)?;

        for (row, line) in lines.iter().enumerate() {
            if line.chars().count() != width {
                return Err(Error::InvalidDimensions {
                    height,
                    width: line.chars().count(),
                });
            }
            for (col, c) in line.chars().enumerate() {
                grid[(row, col)] = match c {
                    '.' => Cell::Open,
                    '#' => Cell::Wall,
                    other => return Err(Error::InvalidMapChar(other)),
                };
            }
        }

        Ok(grid)
    }
}
