//! # Tangle
//!
//! Word grid solving and generation. A [`Trie`](trie::Trie) indexes the words
//! of a dictionary; a [`Solver`](solver::Solver) finds every word hidden in a
//! grid of letters; and a [`Generator`](generator::Generator) searches the
//! arrangements of a set of dice for a grid with the desired number of words.

pub mod board;
pub mod dice;
pub mod dictionary;
pub mod generator;
pub mod solver;
pub mod trie;
