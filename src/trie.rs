//! # Trie
//!
//! Herein is the prefix tree that indexes the valid words of a dictionary. All
//! board searches descend a [`Trie`] one symbol at a time, so that a partial
//! word that is not the prefix of any valid word can be abandoned at once.

use std::{
	fs::File,
	io::{self, BufReader, Read, Write},
	path::Path
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
//                                 Constants.                                 //
////////////////////////////////////////////////////////////////////////////////

/// The magic number that opens every serialized trie. Spells `TRIE`.
pub const MAGIC: u32 = 0x5452_4945;

/// The current version of the serialized trie format.
pub const VERSION: u32 = 1;

/// The shortest valid word, in characters.
pub const MIN_WORD_LENGTH: usize = 3;

/// The longest valid word, in characters.
pub const MAX_WORD_LENGTH: usize = 25;

////////////////////////////////////////////////////////////////////////////////
//                                   Trie.                                    //
////////////////////////////////////////////////////////////////////////////////

/// A handle to a node of a [`Trie`]. Handles are only meaningful for the trie
/// that produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

/// A single node of a [`Trie`]. The children are kept sorted by letter, so
/// that lookup is a binary search over a compact vector.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
struct Node
{
	/// The children of the node, sorted by letter.
	children: Vec<(char, u32)>,

	/// The display spellings of the word that terminates here, if any.
	spellings: Option<Vec<String>>
}

/// A prefix tree of words, each of which carries a list of alternate display
/// spellings. Words are stored in their canonical uppercase spelling. The
/// nodes live in a single arena, with the root always at index 0.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct Trie
{
	/// The arena of nodes. The root is the first node.
	nodes: Vec<Node>,

	/// The number of words in the trie.
	len: usize
}

impl Default for Trie
{
	fn default() -> Self
	{
		Self { nodes: vec![Node::default()], len: 0 }
	}
}

impl Trie
{
	/// Construct an empty trie. Same as [`Default::default`].
	#[inline]
	pub fn new() -> Self { Self::default() }

	/// Construct a trie from the given words and their display spellings.
	/// Words of invalid length are skipped.
	///
	/// # Arguments
	///
	/// * `words` - The words, paired with their display spellings.
	///
	/// # Returns
	///
	/// A trie containing every valid word.
	pub fn from_words<I, W>(words: I) -> Self
	where
		I: IntoIterator<Item = (W, Vec<String>)>,
		W: AsRef<str>
	{
		let mut trie = Self::new();
		for (word, spellings) in words
		{
			trie.insert(word.as_ref(), spellings);
		}
		trie
	}

	/// Check if the trie is empty.
	///
	/// # Returns
	///
	/// `true` if the trie contains no words, `false` otherwise.
	#[inline]
	#[must_use]
	pub fn is_empty(&self) -> bool { self.len == 0 }

	/// Get the number of words in the trie.
	#[inline]
	#[must_use]
	pub fn len(&self) -> usize { self.len }

	/// Get the root of the trie, which corresponds to the empty prefix.
	#[inline]
	#[must_use]
	pub fn root(&self) -> NodeId { NodeId(0) }

	/// Insert a word, replacing the spellings of any previous insertion of the
	/// same word.
	///
	/// # Arguments
	///
	/// * `word` - The canonical (uppercase) spelling of the word.
	/// * `spellings` - The display spellings of the word.
	///
	/// # Returns
	///
	/// `true` if the word was stored, `false` if its length is outside
	/// [`MIN_WORD_LENGTH`]..=[`MAX_WORD_LENGTH`].
	pub fn insert(&mut self, word: &str, spellings: Vec<String>) -> bool
	{
		let length = word.chars().count();
		if !(MIN_WORD_LENGTH..=MAX_WORD_LENGTH).contains(&length)
		{
			return false
		}
		let mut node = 0usize;
		for letter in word.chars()
		{
			let children = &self.nodes[node].children;
			node = match children.binary_search_by_key(&letter, |&(c, _)| c)
			{
				Ok(i) => children[i].1 as usize,
				Err(i) =>
				{
					let next = self.nodes.len();
					self.nodes.push(Node::default());
					self.nodes[node].children.insert(i, (letter, next as u32));
					next
				}
			};
		}
		if self.nodes[node].spellings.replace(spellings).is_none()
		{
			self.len += 1;
		}
		true
	}

	/// Follow the edge labeled with `letter` out of `node`.
	///
	/// # Returns
	///
	/// The child node, or `None` if no word continues with `letter`.
	#[inline]
	#[must_use]
	pub fn child(&self, node: NodeId, letter: char) -> Option<NodeId>
	{
		let children = &self.nodes[node.0 as usize].children;
		children.binary_search_by_key(&letter, |&(c, _)| c)
			.ok()
			.map(|i| NodeId(children[i].1))
	}

	/// Descend from `node` by a whole symbol. A multi-letter symbol, like the
	/// `QU` face of a die, descends once per letter.
	///
	/// # Arguments
	///
	/// * `node` - The starting node.
	/// * `symbol` - The symbol to follow.
	///
	/// # Returns
	///
	/// The node reached, or `None` if the symbol is empty or the extended
	/// prefix is not the prefix of any word.
	#[must_use]
	pub fn descend(&self, node: NodeId, symbol: &str) -> Option<NodeId>
	{
		if symbol.is_empty()
		{
			return None
		}
		symbol.chars().try_fold(node, |node, letter| self.child(node, letter))
	}

	/// Check if a word terminates at `node`.
	#[inline]
	#[must_use]
	pub fn is_terminal(&self, node: NodeId) -> bool
	{
		self.nodes[node.0 as usize].spellings.is_some()
	}

	/// Get the display spellings of the word that terminates at `node`.
	///
	/// # Returns
	///
	/// The spellings, or `None` if no word terminates at `node`.
	#[inline]
	#[must_use]
	pub fn spellings(&self, node: NodeId) -> Option<&[String]>
	{
		self.nodes[node.0 as usize].spellings.as_deref()
	}

	/// Find the node that spells `word`, if `word` is a valid prefix.
	#[must_use]
	pub fn find(&self, word: &str) -> Option<NodeId>
	{
		word.chars().try_fold(self.root(), |node, letter| self.child(node, letter))
	}

	/// Check if the trie contains the given word.
	#[inline]
	#[must_use]
	pub fn contains(&self, word: &str) -> bool
	{
		self.find(word).is_some_and(|node| self.is_terminal(node))
	}

	/// Enumerate every word in the trie, with its spellings, in lexicographic
	/// order.
	#[must_use]
	pub fn words(&self) -> Vec<(String, Vec<String>)>
	{
		let mut words = Vec::with_capacity(self.len);
		let mut stack = vec![(0usize, String::new())];
		while let Some((node, prefix)) = stack.pop()
		{
			let node = &self.nodes[node];
			if let Some(spellings) = &node.spellings
			{
				words.push((prefix.clone(), spellings.clone()));
			}
			// Push in reverse so that the smallest letter is visited first.
			for &(letter, child) in node.children.iter().rev()
			{
				let mut word = prefix.clone();
				word.push(letter);
				stack.push((child as usize, word));
			}
		}
		words
	}

	/// Serialize the trie into the cache format: the [magic](MAGIC) and the
	/// [version](VERSION), both big-endian, followed by the
	/// [`bincode`](bincode) encoding of the trie.
	///
	/// # Errors
	///
	/// [`CacheError::Corrupt`] if encoding fails.
	pub fn serialize(&self) -> Result<Vec<u8>, CacheError>
	{
		let mut content = Vec::new();
		content.extend_from_slice(&MAGIC.to_be_bytes());
		content.extend_from_slice(&VERSION.to_be_bytes());
		bincode::serialize_into(&mut content, self)?;
		Ok(content)
	}

	/// Deserialize a trie from the cache format. Any mismatch is reported as
	/// an error, and never yields a partially decoded trie.
	///
	/// # Errors
	///
	/// * [`CacheError::Truncated`] if the header is incomplete.
	/// * [`CacheError::BadMagic`] if the magic number is wrong.
	/// * [`CacheError::BadVersion`] if the version is not [`VERSION`].
	/// * [`CacheError::Corrupt`] if the payload cannot be decoded.
	/// * [`CacheError::Inconsistent`] if the decoded trie is malformed.
	pub fn deserialize(content: &[u8]) -> Result<Self, CacheError>
	{
		if content.len() < 8
		{
			return Err(CacheError::Truncated)
		}
		let (header, payload) = content.split_at(8);
		let magic = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
		if magic != MAGIC
		{
			return Err(CacheError::BadMagic(magic))
		}
		let version =
			u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
		if version != VERSION
		{
			return Err(CacheError::BadVersion(version))
		}
		let trie: Self = bincode::deserialize(payload)?;
		if trie.nodes.is_empty()
		{
			return Err(CacheError::Truncated)
		}
		trie.validate()?;
		Ok(trie)
	}

	/// Check the structure of a decoded arena: every child index refers to a
	/// node other than the root, every node but the root has exactly one
	/// parent, the children of each node are strictly sorted by letter, and
	/// the word count agrees with the number of terminal nodes.
	///
	/// # Errors
	///
	/// [`CacheError::Inconsistent`] if any of these fail.
	fn validate(&self) -> Result<(), CacheError>
	{
		let mut has_parent = vec![false; self.nodes.len()];
		for node in &self.nodes
		{
			for (i, &(letter, child)) in node.children.iter().enumerate()
			{
				let child = child as usize;
				if child == 0 || child >= self.nodes.len()
				{
					return Err(CacheError::Inconsistent("child index out of range"))
				}
				if has_parent[child]
				{
					return Err(CacheError::Inconsistent("node has two parents"))
				}
				has_parent[child] = true;
				if i > 0 && node.children[i - 1].0 >= letter
				{
					return Err(CacheError::Inconsistent("children out of order"))
				}
			}
		}
		if has_parent.iter().skip(1).any(|&p| !p)
		{
			return Err(CacheError::Inconsistent("orphaned node"))
		}
		let terminals = self.nodes.iter()
			.filter(|node| node.spellings.is_some())
			.count();
		if terminals != self.len
		{
			return Err(CacheError::Inconsistent("word count mismatch"))
		}
		Ok(())
	}

	/// Serialize the trie to the given file.
	///
	/// # Errors
	///
	/// If the file cannot be created or written, or encoding fails.
	pub fn serialize_to_file<T: AsRef<Path>>(
		&self,
		path: T
	) -> Result<(), CacheError>
	{
		let content = self.serialize()?;
		let mut file = File::create(path)?;
		file.write_all(&content)?;
		Ok(())
	}

	/// Deserialize a trie from the given file.
	///
	/// # Errors
	///
	/// If the file cannot be opened or read, or its content is not a
	/// serialized trie.
	pub fn deserialize_from_file<T: AsRef<Path>>(
		path: T
	) -> Result<Self, CacheError>
	{
		let file = File::open(path)?;
		let mut reader = BufReader::new(file);
		let mut content = Vec::new();
		reader.read_to_end(&mut content)?;
		Self::deserialize(&content)
	}
}

/// The complete enumeration of word cache errors. None of these is fatal: a
/// cache that cannot be read is simply rebuilt.
#[derive(Debug, Error)]
pub enum CacheError
{
	/// The cache file could not be read or written.
	#[error("word cache I/O error: {0}")]
	Io(#[from] io::Error),

	/// The cache is too short to hold a header.
	#[error("word cache is truncated")]
	Truncated,

	/// The cache does not start with [`MAGIC`].
	#[error("word cache has wrong magic number: {0:#010x}")]
	BadMagic(u32),

	/// The cache was written by an incompatible version.
	#[error("word cache has unsupported version: {0}")]
	BadVersion(u32),

	/// The payload could not be encoded or decoded.
	#[error("word cache is corrupt: {0}")]
	Corrupt(#[from] bincode::Error),

	/// The payload decoded, but does not describe a well-formed trie.
	#[error("word cache is inconsistent: {0}")]
	Inconsistent(&'static str)
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod test
{
	use crate::trie::{CacheError, Trie, MAGIC, VERSION};
	use tempfile::NamedTempFile;

	/// A handful of words with interesting spellings.
	fn sample() -> Trie
	{
		Trie::from_words([
			("CAT", vec!["cat".to_string()]),
			("CATS", vec!["cats".to_string()]),
			("COOPERATE", vec!["cooperate".to_string(), "coöperate".to_string()]),
			("QUIT", vec!["quit".to_string()]),
			("NAIVE", vec!["naive".to_string(), "naïve".to_string()])
		])
	}

	/// Test basic functionality:
	///
	/// * [`Trie::insert`]
	/// * [`Trie::contains`]
	/// * [`Trie::len`]
	#[test]
	fn test_insert()
	{
		let mut trie = Trie::new();
		assert!(trie.is_empty());
		assert!(!trie.contains("CAT"));
		assert!(trie.insert("CAT", vec!["cat".to_string()]));
		assert!(trie.insert("CAT", vec!["cat".to_string()]));
		assert_eq!(trie.len(), 1);
		assert!(trie.contains("CAT"));
		assert!(!trie.contains("CA"));
		assert!(!trie.contains("CATS"));

		// Too short and too long words are rejected.
		assert!(!trie.insert("AT", vec!["at".to_string()]));
		assert!(!trie.insert(&"A".repeat(26), vec![]));
		assert!(trie.insert(&"A".repeat(25), vec![]));
		assert_eq!(trie.len(), 2);
	}

	/// Re-inserting a word replaces its spellings without adding a word.
	#[test]
	fn test_insert_replaces_spellings()
	{
		let mut trie = Trie::new();
		trie.insert("COLOR", vec!["color".to_string()]);
		trie.insert("COLOR", vec!["color".to_string(), "colour".to_string()]);
		assert_eq!(trie.len(), 1);
		let node = trie.find("COLOR").unwrap();
		assert_eq!(
			trie.spellings(node).unwrap(),
			&["color".to_string(), "colour".to_string()]
		);
	}

	/// Test descent by single letters and by multi-letter symbols:
	///
	/// * [`Trie::child`]
	/// * [`Trie::descend`]
	/// * [`Trie::is_terminal`]
	#[test]
	fn test_descend()
	{
		let trie = sample();
		let root = trie.root();
		let c = trie.descend(root, "C").unwrap();
		let ca = trie.descend(c, "A").unwrap();
		assert!(!trie.is_terminal(ca));
		let cat = trie.descend(ca, "T").unwrap();
		assert!(trie.is_terminal(cat));
		assert_eq!(trie.spellings(cat).unwrap(), &["cat".to_string()]);
		assert_eq!(trie.child(root, 'C'), Some(c));

		// Multi-letter symbols descend once per letter.
		let qu = trie.descend(root, "QU").unwrap();
		assert_eq!(trie.child(trie.child(root, 'Q').unwrap(), 'U'), Some(qu));
		let quit = trie.descend(trie.descend(qu, "I").unwrap(), "T").unwrap();
		assert!(trie.is_terminal(quit));

		// Dead ends and empty symbols are not errors.
		assert_eq!(trie.descend(root, "X"), None);
		assert_eq!(trie.descend(cat, "Z"), None);
		assert_eq!(trie.descend(root, ""), None);
		assert_eq!(trie.descend(root, "QX"), None);
	}

	/// Words come back in lexicographic order, with their spellings.
	#[test]
	fn test_words()
	{
		let trie = sample();
		let words = trie.words()
			.into_iter()
			.map(|(w, _)| w)
			.collect::<Vec<_>>();
		assert_eq!(words, vec!["CAT", "CATS", "COOPERATE", "NAIVE", "QUIT"]);
	}

	/// Test the cache format round trip:
	///
	/// * [`Trie::serialize`]
	/// * [`Trie::deserialize`]
	#[test]
	fn test_serialize()
	{
		let trie = sample();
		let content = trie.serialize().unwrap();
		assert_eq!(&content[0..4], &MAGIC.to_be_bytes());
		assert_eq!(&content[4..8], &VERSION.to_be_bytes());
		let deserialized = Trie::deserialize(&content).unwrap();
		assert_eq!(trie, deserialized);
		assert_eq!(trie.words(), deserialized.words());
	}

	/// Every header mismatch is reported, never silently accepted.
	#[test]
	fn test_deserialize_rejects_bad_header()
	{
		let content = sample().serialize().unwrap();

		assert!(matches!(Trie::deserialize(&content[..5]), Err(CacheError::Truncated)));

		let mut bad_magic = content.clone();
		bad_magic[0] = b'X';
		assert!(matches!(
			Trie::deserialize(&bad_magic),
			Err(CacheError::BadMagic(_))
		));

		let mut bad_version = content.clone();
		bad_version[7] = 2;
		assert!(matches!(
			Trie::deserialize(&bad_version),
			Err(CacheError::BadVersion(2))
		));

		let truncated = &content[..content.len() - 3];
		assert!(matches!(
			Trie::deserialize(truncated),
			Err(CacheError::Corrupt(_))
		));
	}

	/// A payload that decodes but describes a malformed trie is rejected, so
	/// that a damaged cache never reaches a solver.
	#[test]
	fn test_deserialize_rejects_bad_structure()
	{
		let check = |trie: &Trie, reason: &str| {
			let content = trie.serialize().unwrap();
			match Trie::deserialize(&content)
			{
				Err(CacheError::Inconsistent(why)) => assert_eq!(why, reason),
				result => panic!("unexpected result: {:?}", result)
			}
		};

		// A child index far beyond the end of the arena.
		let mut trie = sample();
		trie.nodes[0].children[0].1 = 0xff00_0001;
		check(&trie, "child index out of range");

		// A child that points back at the root.
		let mut trie = sample();
		trie.nodes[0].children[0].1 = 0;
		check(&trie, "child index out of range");

		// Two edges into the same node.
		let mut trie = sample();
		let shared = trie.nodes[0].children[0].1;
		trie.nodes[0].children[1].1 = shared;
		check(&trie, "node has two parents");

		// Children that cannot be binary searched.
		let mut trie = sample();
		trie.nodes[0].children.reverse();
		check(&trie, "children out of order");

		// A word count that disagrees with the terminal nodes.
		let mut trie = sample();
		trie.len += 1;
		check(&trie, "word count mismatch");

		// Corrupting the serialized child index of the only word.
		let trie = Trie::from_words([("CAT", vec!["cat".to_string()])]);
		let content = trie.serialize().unwrap();
		let index = u32::to_le_bytes(1);
		let position = content
			.windows(5)
			.position(|w| w[0] == b'C' && w[1..] == index)
			.unwrap();
		let mut damaged = content.clone();
		damaged[position + 4] = 0xff;
		assert!(Trie::deserialize(&damaged).is_err());
	}

	/// Test serializing to and deserializing from a file:
	///
	/// * [`Trie::serialize_to_file`]
	/// * [`Trie::deserialize_from_file`]
	#[test]
	fn test_serialize_to_file()
	{
		let trie = sample();
		let file = NamedTempFile::new().unwrap();
		trie.serialize_to_file(file.path()).unwrap();
		let deserialized = Trie::deserialize_from_file(file.path()).unwrap();
		assert_eq!(trie, deserialized);
	}
}
