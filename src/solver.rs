//! # Solver
//!
//! Herein is the solver for word grids. The solver walks the board depth
//! first from every cell, descending the [`Trie`] in lockstep, so that a
//! branch is abandoned as soon as its letters stop being the prefix of some
//! word.

use std::{collections::BTreeMap, sync::Arc};

use log::trace;

use crate::{
	board::{Board, Path, Position},
	dice::Symbol,
	trie::{NodeId, Trie}
};

/// The words found on a board, in canonical spelling, each with the paths
/// that spell it.
pub type Solutions = BTreeMap<String, Vec<Path>>;

////////////////////////////////////////////////////////////////////////////////
//                                  Solver.                                   //
////////////////////////////////////////////////////////////////////////////////

/// The complete context of the word grid solver. A solver is bound to a board
/// size, and may [solve](Self::solve) any number of boards of that size.
#[derive(Clone, Debug)]
#[must_use]
pub struct Solver
{
	/// The words to look for.
	trie: Arc<Trie>,

	/// The geometry of the board.
	board: Board,

	/// The shortest word worth finding, in characters.
	minimum: usize,

	/// Whether to keep every path that spells a word, rather than just the
	/// first.
	track_positions: bool,

	/// The symbol showing in each cell.
	symbols: Vec<Symbol>,

	/// Which cells the current path passes through.
	in_use: Vec<bool>,

	/// The letters of the current path.
	word: String,

	/// The positions of the current path.
	positions: Path,

	/// The words found by the last solve.
	solutions: Solutions
}

impl Solver
{
	/// Construct a new solver.
	///
	/// # Arguments
	///
	/// * `trie` - The words to look for.
	/// * `size` - The length of a side of the board.
	/// * `minimum` - The shortest word worth finding.
	///
	/// # Returns
	///
	/// A new solver, with position tracking enabled.
	pub fn new(trie: Arc<Trie>, size: usize, minimum: usize) -> Self
	{
		let board = Board::new(size);
		let cells = board.len();
		Self
		{
			trie,
			board,
			minimum,
			track_positions: true,
			symbols: vec![Symbol::default(); cells],
			in_use: vec![false; cells],
			word: String::new(),
			positions: Vec::with_capacity(cells),
			solutions: Solutions::new()
		}
	}

	/// Get the words that the solver looks for.
	#[inline]
	#[must_use]
	pub fn trie(&self) -> &Arc<Trie> { &self.trie }

	/// Get the geometry of the board.
	#[inline]
	#[must_use]
	pub fn board(&self) -> &Board { &self.board }

	/// Get the length of a side of the board.
	#[inline]
	#[must_use]
	pub fn size(&self) -> usize { self.board.size() }

	/// Get the length of the shortest word worth finding.
	#[inline]
	#[must_use]
	pub fn minimum(&self) -> usize { self.minimum }

	/// Choose whether to keep every path that spells a word. With tracking
	/// disabled, the solver still finds every word, but keeps only the first
	/// path to each, which is all the generator needs to count words.
	#[inline]
	pub fn set_track_positions(&mut self, track_positions: bool)
	{
		self.track_positions = track_positions;
	}

	/// Find every word on the board. The solution replaces that of any
	/// previous solve.
	///
	/// # Arguments
	///
	/// * `letters` - The symbols of the cells, in row-major order. Cells
	///   beyond the end of `letters` are blank, and never part of a word.
	pub fn solve(&mut self, letters: &[Symbol])
	{
		for (i, symbol) in self.symbols.iter_mut().enumerate()
		{
			*symbol = letters.get(i).copied().unwrap_or_default();
		}
		self.in_use.fill(false);
		self.word.clear();
		self.positions.clear();
		self.solutions.clear();
		let root = self.trie.root();
		for cell in 0..self.board.len()
		{
			self.check_cell(cell, root);
		}
		trace!("solved board: {} words", self.solutions.len());
	}

	/// Extend the current path into `cell`, then onward into every unused
	/// neighbor.
	///
	/// # Arguments
	///
	/// * `cell` - The index of the cell to enter.
	/// * `node` - The trie node of the current path, before entering `cell`.
	fn check_cell(&mut self, cell: usize, node: NodeId)
	{
		let symbol = self.symbols[cell];
		let Some(node) = self.trie.descend(node, symbol.as_str()) else {
			return
		};

		self.in_use[cell] = true;
		self.word.push_str(symbol.as_str());
		self.positions.push(self.board.position(cell));

		if self.trie.is_terminal(node)
			&& self.word.chars().count() >= self.minimum
		{
			self.record();
		}

		for i in 0..self.board.neighbors(cell).len()
		{
			let next = self.board.neighbors(cell)[i];
			if !self.in_use[next]
			{
				self.check_cell(next, node);
			}
		}

		self.positions.pop();
		self.word.truncate(self.word.len() - symbol.len());
		self.in_use[cell] = false;
	}

	/// Record the current path as a solution.
	fn record(&mut self)
	{
		match self.solutions.get_mut(&self.word)
		{
			Some(paths) =>
			{
				if self.track_positions
				{
					paths.push(self.positions.clone());
				}
			},
			None =>
			{
				self.solutions.insert(
					self.word.clone(),
					vec![self.positions.clone()]
				);
			}
		}
	}

	/// Get the number of distinct words found by the last solve.
	#[inline]
	#[must_use]
	pub fn count(&self) -> usize { self.solutions.len() }

	/// Get the words found by the last solve, with their paths.
	#[inline]
	#[must_use]
	pub fn solutions(&self) -> &Solutions { &self.solutions }

	/// Take the words found by the last solve, leaving the solver empty.
	#[inline]
	#[must_use]
	pub fn take_solutions(&mut self) -> Solutions
	{
		std::mem::take(&mut self.solutions)
	}

	/// Compute the score of the words found by the last solve.
	///
	/// # Arguments
	///
	/// * `max_words` - If `Some(k)`, count only the `k` highest scoring words;
	///   ties go to the alphabetically earlier word. If `None`, count every
	///   word.
	///
	/// # Returns
	///
	/// The total score.
	#[must_use]
	pub fn score(&self, max_words: Option<usize>) -> u32
	{
		let mut scores = self.solutions.keys()
			.map(|word| score(word))
			.collect::<Vec<_>>();
		// Stable, so ties keep the order of the words.
		scores.sort_by(|a, b| b.cmp(a));
		scores.iter()
			.take(max_words.unwrap_or(usize::MAX))
			.sum()
	}
}

/// Compute the score of a single word, from its length alone. Every word of
/// eight or more letters is worth the same.
///
/// # Arguments
///
/// * `word` - The word.
///
/// # Returns
///
/// The score of the word. Words of fewer than three letters are worthless.
#[must_use]
pub fn score(word: &str) -> u32
{
	match word.chars().count()
	{
		0..=2 => 0,
		3 | 4 => 1,
		5 => 2,
		6 => 3,
		7 => 5,
		_ => 11
	}
}

/// Check that `path` is a legal way to spell `word` on a board showing
/// `letters`: its cells are distinct, each neighbors the next, and their
/// symbols spell `word`.
///
/// # Arguments
///
/// * `board` - The geometry of the board.
/// * `letters` - The symbols of the cells, in row-major order.
/// * `word` - The word.
/// * `path` - The path.
///
/// # Returns
///
/// `true` if the path spells the word, `false` otherwise.
#[must_use]
pub fn is_valid_path(
	board: &Board,
	letters: &[Symbol],
	word: &str,
	path: &[Position]
) -> bool
{
	let mut spelled = String::with_capacity(word.len());
	for (i, position) in path.iter().enumerate()
	{
		let Some(index) = board.index(*position) else { return false };
		if path[..i].contains(position)
		{
			return false
		}
		if i > 0 && !path[i - 1].is_adjacent(position)
		{
			return false
		}
		match letters.get(index)
		{
			Some(symbol) => spelled.push_str(symbol.as_str()),
			None => return false
		}
	}
	!path.is_empty() && spelled == word
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////
