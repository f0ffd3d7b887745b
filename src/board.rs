//! # Board
//!
//! Herein is the geometry of a square board: the position of every cell, and
//! which cells neighbor which. A word may move from any cell to any of its (up
//! to) eight neighbors, diagonals included.

use std::fmt::{self, Display, Formatter};

////////////////////////////////////////////////////////////////////////////////
//                                 Positions.                                 //
////////////////////////////////////////////////////////////////////////////////

/// The position of a cell. The origin is the top-left corner; `x` is the
/// column and `y` is the row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position
{
	/// The column.
	pub x: usize,

	/// The row.
	pub y: usize
}

impl Position
{
	/// Construct a position.
	#[inline]
	#[must_use]
	pub const fn new(x: usize, y: usize) -> Self { Self { x, y } }

	/// Check if two positions are neighbors, i.e., distinct and touching, even
	/// if only at a corner.
	#[inline]
	#[must_use]
	pub fn is_adjacent(&self, other: &Position) -> bool
	{
		self != other
			&& self.x.abs_diff(other.x) <= 1
			&& self.y.abs_diff(other.y) <= 1
	}
}

impl Display for Position
{
	fn fmt(&self, f: &mut Formatter) -> fmt::Result
	{
		write!(f, "({}, {})", self.x, self.y)
	}
}

/// A path is the sequence of positions that spells a word.
pub type Path = Vec<Position>;

////////////////////////////////////////////////////////////////////////////////
//                                   Board.                                   //
////////////////////////////////////////////////////////////////////////////////

/// A single cell of a [`Board`].
#[derive(Clone, Debug, PartialEq, Eq)]
struct Cell
{
	/// Where the cell is.
	position: Position,

	/// The indices of the neighboring cells.
	neighbors: Vec<usize>
}

/// The geometry of an N×N board. Cells are linearized in row-major order. The
/// adjacency is computed once, and is symmetric.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct Board
{
	/// The length of a side.
	size: usize,

	/// The cells, in row-major order.
	cells: Vec<Cell>
}

impl Board
{
	/// Construct a board with `size` cells to a side.
	///
	/// # Arguments
	///
	/// * `size` - The length of a side.
	///
	/// # Returns
	///
	/// A board whose every cell knows its neighbors.
	pub fn new(size: usize) -> Self
	{
		let mut cells = Vec::with_capacity(size * size);
		for y in 0..size
		{
			for x in 0..size
			{
				let position = Position::new(x, y);
				let mut neighbors = Vec::with_capacity(8);
				for ny in y.saturating_sub(1)..=(y + 1).min(size - 1)
				{
					for nx in x.saturating_sub(1)..=(x + 1).min(size - 1)
					{
						if (nx, ny) != (x, y)
						{
							neighbors.push(ny * size + nx);
						}
					}
				}
				cells.push(Cell { position, neighbors });
			}
		}
		Self { size, cells }
	}

	/// Get the length of a side.
	#[inline]
	#[must_use]
	pub fn size(&self) -> usize { self.size }

	/// Get the number of cells.
	#[inline]
	#[must_use]
	pub fn len(&self) -> usize { self.cells.len() }

	/// Check if the board has no cells.
	#[inline]
	#[must_use]
	pub fn is_empty(&self) -> bool { self.cells.is_empty() }

	/// Get the position of the cell at `index`.
	#[inline]
	#[must_use]
	pub fn position(&self, index: usize) -> Position
	{
		self.cells[index].position
	}

	/// Get the indices of the neighbors of the cell at `index`.
	#[inline]
	#[must_use]
	pub fn neighbors(&self, index: usize) -> &[usize]
	{
		&self.cells[index].neighbors
	}

	/// Get the index of the cell at `position`, if it is on the board.
	#[inline]
	#[must_use]
	pub fn index(&self, position: Position) -> Option<usize>
	{
		(position.x < self.size && position.y < self.size)
			.then(|| position.y * self.size + position.x)
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod test
{
	use crate::board::{Board, Position};

	/// Corners, edges, and interior cells have 3, 5, and 8 neighbors.
	#[test]
	fn test_neighbor_counts()
	{
		let board = Board::new(4);
		assert_eq!(board.len(), 16);
		assert_eq!(board.neighbors(0).len(), 3);
		assert_eq!(board.neighbors(1).len(), 5);
		assert_eq!(board.neighbors(5).len(), 8);
		assert_eq!(board.neighbors(15).len(), 3);
		assert_eq!(Board::new(1).neighbors(0).len(), 0);
	}

	/// In a 2×2 board, every cell neighbors every other.
	#[test]
	fn test_small_board()
	{
		let board = Board::new(2);
		for i in 0..4
		{
			let mut neighbors = board.neighbors(i).to_vec();
			neighbors.sort();
			let expected = (0..4).filter(|&j| j != i).collect::<Vec<_>>();
			assert_eq!(neighbors, expected);
		}
	}

	/// Adjacency is symmetric and agrees with [`Position::is_adjacent`].
	#[test]
	fn test_adjacency()
	{
		for size in 1..=5
		{
			let board = Board::new(size);
			for i in 0..board.len()
			{
				assert_eq!(board.index(board.position(i)), Some(i));
				for j in 0..board.len()
				{
					let adjacent = board.neighbors(i).contains(&j);
					assert_eq!(adjacent, board.neighbors(j).contains(&i));
					assert_eq!(
						adjacent,
						board.position(i).is_adjacent(&board.position(j)),
						"{} {}", i, j
					);
				}
			}
		}
		assert_eq!(Board::new(4).index(Position::new(4, 0)), None);
	}
}
