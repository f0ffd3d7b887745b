//! # Dice
//!
//! Herein are the dice from which boards are rolled. A dice source holds one
//! die per line, as six comma-separated faces. The first 16 dice make up the
//! small (4×4) board, and the remaining 25 make up the large (5×5) board.

use std::{fs, io, path::{Path, PathBuf}};

use fixedstr::str8;
use log::trace;
use rand::{seq::SliceRandom, Rng};
use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
//                                 Constants.                                 //
////////////////////////////////////////////////////////////////////////////////

/// The number of faces on a die.
pub const FACES: usize = 6;

/// The number of dice for the small board.
pub const SMALL_DICE: usize = 16;

/// The number of dice for the large board.
pub const LARGE_DICE: usize = 25;

/// The symbol shown in every cell of a board that could not be generated.
pub const PLACEHOLDER: &str = "?";

/// The longest symbol, in bytes.
pub const SYMBOL_CAPACITY: usize = 7;

/// A symbol is what a single cell of the board shows: usually one letter, but
/// occasionally more, as with `QU`.
pub type Symbol = str8;

////////////////////////////////////////////////////////////////////////////////
//                                   Dice.                                    //
////////////////////////////////////////////////////////////////////////////////

/// A die has six faces. The first face is the one that is face up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct Die([Symbol; FACES]);

impl Die
{
	/// Construct a die from its faces.
	#[inline]
	pub fn new(faces: [Symbol; FACES]) -> Self { Self(faces) }

	/// Get the face that is up.
	#[inline]
	#[must_use]
	pub fn top(&self) -> Symbol { self.0[0] }

	/// Get all of the faces, top face first.
	#[inline]
	#[must_use]
	pub fn faces(&self) -> &[Symbol; FACES] { &self.0 }

	/// Roll the die, shuffling its faces so that a random face is up.
	#[inline]
	pub fn roll<R: Rng>(&mut self, rng: &mut R)
	{
		self.0.shuffle(rng);
	}
}

/// The complete dice of a language: one set for each board size.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct Dice
{
	/// The dice of the small board.
	small: Vec<Die>,

	/// The dice of the large board.
	large: Vec<Die>
}

impl Dice
{
	/// Parse dice from the text of a dice source. Faces are trimmed and
	/// uppercased. Lines that do not have exactly six faces are ignored.
	///
	/// # Arguments
	///
	/// * `source` - The text of the dice source.
	///
	/// # Returns
	///
	/// The dice.
	///
	/// # Errors
	///
	/// * [`DiceError::Count`] if the source does not contain exactly
	///   `SMALL_DICE + LARGE_DICE` dice.
	/// * [`DiceError::Face`] if a face does not fit in a [`Symbol`].
	pub fn parse(source: &str) -> Result<Self, DiceError>
	{
		let mut dice = Vec::with_capacity(SMALL_DICE + LARGE_DICE);
		for line in source.lines()
		{
			let faces = line.split(',')
				.map(str::trim)
				.filter(|face| !face.is_empty())
				.collect::<Vec<_>>();
			if faces.len() != FACES
			{
				continue
			}
			let mut die = [Symbol::default(); FACES];
			for (slot, face) in die.iter_mut().zip(faces)
			{
				let face = face.to_uppercase();
				if face.len() > SYMBOL_CAPACITY
				{
					return Err(DiceError::Face(face))
				}
				*slot = Symbol::from(face.as_str());
			}
			dice.push(Die(die));
		}
		if dice.len() != SMALL_DICE + LARGE_DICE
		{
			return Err(DiceError::Count(dice.len()))
		}
		let large = dice.split_off(SMALL_DICE);
		Ok(Self { small: dice, large })
	}

	/// Read dice from the dice source at `path`.
	///
	/// # Errors
	///
	/// * [`DiceError::Io`] if the file cannot be read.
	/// * Any error of [`parse`](Self::parse).
	pub fn read_from_file<T: AsRef<Path>>(path: T) -> Result<Self, DiceError>
	{
		let path = path.as_ref();
		let source = fs::read_to_string(path)
			.map_err(|e| DiceError::Io(path.to_path_buf(), e))?;
		let dice = Self::parse(&source)?;
		trace!("Read dice: {}", path.display());
		Ok(dice)
	}

	/// Get the dice for a board of the given size.
	///
	/// # Arguments
	///
	/// * `size` - The length of a side of the board.
	///
	/// # Returns
	///
	/// The dice, or `None` if no board of that size exists.
	#[must_use]
	pub fn for_size(&self, size: usize) -> Option<&[Die]>
	{
		let cells = size.checked_mul(size)?;
		[&self.small, &self.large]
			.into_iter()
			.find(|dice| dice.len() == cells)
			.map(Vec::as_slice)
	}
}

/// Check if a board of the given size can be rolled from a complete set of
/// dice.
///
/// # Arguments
///
/// * `size` - The length of a side of the board.
///
/// # Returns
///
/// `true` if the board has exactly [`SMALL_DICE`] or [`LARGE_DICE`] cells.
#[inline]
#[must_use]
pub fn is_supported_size(size: usize) -> bool
{
	size.checked_mul(size)
		.is_some_and(|cells| cells == SMALL_DICE || cells == LARGE_DICE)
}

/// Split the letters of a board into symbols. Letters separated by commas or
/// whitespace are taken as whole symbols, so that multi-letter faces like
/// `QU` can be given; otherwise each character is a symbol of its own.
///
/// # Arguments
///
/// * `letters` - The letters of the board, in row-major order.
///
/// # Returns
///
/// The symbols, uppercased.
///
/// # Errors
///
/// [`DiceError::Face`] if a symbol does not fit in a [`Symbol`].
pub fn parse_symbols(letters: &str) -> Result<Vec<Symbol>, DiceError>
{
	let letters = letters.to_uppercase();
	let is_separator = |c: char| c == ',' || c.is_whitespace();
	let tokens = if letters.contains(is_separator)
	{
		letters.split(is_separator)
			.filter(|s| !s.is_empty())
			.map(str::to_string)
			.collect::<Vec<_>>()
	}
	else
	{
		letters.chars().map(String::from).collect()
	};
	tokens.into_iter()
		.map(|token| {
			if token.len() > SYMBOL_CAPACITY
			{
				Err(DiceError::Face(token))
			}
			else
			{
				Ok(Symbol::from(token.as_str()))
			}
		})
		.collect()
}

/// The complete enumeration of dice errors.
#[derive(Debug, Error)]
pub enum DiceError
{
	/// The dice source could not be read.
	#[error("Unable to read dice from file: {0}: {1}")]
	Io(PathBuf, #[source] io::Error),

	/// The dice source has the wrong number of dice.
	#[error("Unable to read dice from file: expected 41 dice, found {0}")]
	Count(usize),

	/// A face has too many letters.
	#[error("Unable to read dice from file: face too long: {0}")]
	Face(String)
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////
