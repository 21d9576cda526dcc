// Stract is an open source web search engine.
// Copyright (C) 2024 Stract ApS
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Affix-stripping stemmer engine.
//!
//! Reduces inflected word forms to a common stem so that morphological
//! variants of a term hit the same entry in the index. This crate is the
//! generic half of that job: a cursor automaton over a mutable working
//! string ([`Context`]), a longest-match lookup over sorted pattern tables
//! ([`Context::find_among`] and [`Context::find_among_b`]), and a memoizing
//! driver ([`Stemmer`]). The affix tables and rule sequences for each
//! language are data, supplied by rule programs implementing [`Program`].
//!
//! The engine does not tokenize, normalize unicode, or understand language
//! semantics. It runs one word at a time to completion, and a word that no
//! rule touches comes back unchanged.
//!
//! # Example
//!
//! A rule program that strips two plural suffixes:
//!
//! ```
//! use stemmer::{Among, Context, Program, Stemmer};
//!
//! struct Plurals;
//!
//! // sorted by reversed pattern for backward lookup
//! static SUFFIXES: [Among<Plurals>; 2] =
//!     [Among::new("ies", -1, 2), Among::new("sses", -1, 1)];
//!
//! impl Program for Plurals {
//!     fn stem(&mut self, ctx: &mut Context) -> bool {
//!         ctx.set_cursor(ctx.limit());
//!         ctx.mark_ket();
//!
//!         let tag = ctx.find_among_b(&SUFFIXES, self);
//!         ctx.mark_bra();
//!
//!         match tag {
//!             1 => ctx.slice_from("ss"),
//!             2 => ctx.slice_from("i"),
//!             _ => false,
//!         }
//!     }
//! }
//!
//! let mut stemmer = Stemmer::new(Plurals);
//! assert_eq!(stemmer.stem("caresses"), "caress");
//! assert_eq!(stemmer.stem("ponies"), "poni");
//! assert_eq!(stemmer.stem("cat"), "cat");
//! ```

mod among;
mod context;
mod matcher;

pub use among::{check_table, Among, Guard, TableError};
pub use context::{Checkpoint, Context, Grouping, TailCheckpoint};

use fnv::FnvHashMap;

/// A per-language rule program driving the engine through its phases.
///
/// The program is handed a freshly loaded [`Context`] and runs its phases
/// (prelude normalization, region marking, suffix cascade, postlude) with
/// the engine's tests and splices. The return value reports whether any rule
/// applied; the driver reads the working string back either way, since a
/// word no rule touches is a valid stem.
pub trait Program {
    fn stem(&mut self, ctx: &mut Context) -> bool;
}

/// Runs a rule program over words, memoizing the results.
///
/// Stemming is a pure function of the word and the program's static tables,
/// so cached entries are never invalidated or recomputed for the lifetime of
/// the stemmer. The cache is unbounded by design; callers that stem across
/// threads use one stemmer per worker, sharing only the `'static` tables.
pub struct Stemmer<P> {
    program: P,
    ctx: Context,
    cache: FnvHashMap<String, String>,
}

impl<P> Stemmer<P>
where
    P: Program,
{
    pub fn new(program: P) -> Self {
        Self {
            program,
            ctx: Context::new(),
            cache: FnvHashMap::default(),
        }
    }

    /// Stems a single word. Never fails; the result is the word itself when
    /// no rule applies.
    pub fn stem(&mut self, word: &str) -> &str {
        if !self.cache.contains_key(word) {
            tracing::trace!(word, "stem cache miss");

            self.ctx.load(word);
            self.program.stem(&mut self.ctx);
            self.cache.insert(word.to_string(), self.ctx.text());
        }

        &self.cache[word]
    }

    /// Stems a batch of words, preserving input order. Repeated words are
    /// deduplicated through the cache.
    pub fn stem_all<'a, I>(&mut self, words: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        words
            .into_iter()
            .map(|word| self.stem(word).to_string())
            .collect()
    }

    pub fn program(&self) -> &P {
        &self.program
    }
}
