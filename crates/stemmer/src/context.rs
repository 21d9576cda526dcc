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

/// A character class over the code-point range `[min, max]`, encoded as a
/// bitset indexed by `code_point - min`.
///
/// `bits` must cover `(max - min) / 8 + 1` bytes. Classes are authored
/// alongside the pattern tables and shared as `'static` data.
pub struct Grouping {
    pub bits: &'static [u8],
    pub min: u32,
    pub max: u32,
}

impl Grouping {
    fn contains(&self, ch: char) -> bool {
        let code = ch as u32;
        if code < self.min || code > self.max {
            return false;
        }

        let bit = code - self.min;
        self.bits[(bit >> 3) as usize] & (1 << (bit & 7)) != 0
    }
}

/// Saved cursor position, restored with [`Context::restore`].
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint {
    cursor: usize,
}

/// Saved distance between cursor and limit.
///
/// Restoring re-anchors the cursor against the limit *at restore time*, so a
/// phase that narrows the limit between save and restore lands the cursor at
/// the equivalent distance from the new limit. Rule programs rely on this
/// when nested phases trim the working region.
#[derive(Debug, Clone, Copy)]
pub struct TailCheckpoint {
    tail: usize,
}

/// The working string and its position markers.
///
/// One instance runs one word at a time: [`Context::load`] resets the whole
/// state, the rule program then drives the cursor through the string with
/// the grouping/equality tests and rewrites slices with the splice
/// primitives. Test operations report failure as `false` and leave the
/// cursor untouched; none of them error.
///
/// Instances are single-owner mutable state and must not be shared between
/// concurrent stemming runs. Callers that stem in parallel use one context
/// per worker.
#[derive(Debug, Clone, Default)]
pub struct Context {
    text: Vec<char>,
    cursor: usize,
    limit: usize,
    limit_backward: usize,
    bra: usize,
    ket: usize,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the full state for a new input word: `bra = cursor = 0`,
    /// `ket = limit = length(word)`, `limit_backward = 0`.
    pub fn load(&mut self, word: &str) {
        self.text = word.chars().collect();
        self.cursor = 0;
        self.limit = self.text.len();
        self.limit_backward = 0;
        self.bra = 0;
        self.ket = self.limit;
    }

    /// The current working string.
    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn limit_backward(&self) -> usize {
        self.limit_backward
    }

    pub fn bra(&self) -> usize {
        self.bra
    }

    pub fn ket(&self) -> usize {
        self.ket
    }

    pub(crate) fn char_at(&self, pos: usize) -> char {
        self.text[pos]
    }

    pub fn set_cursor(&mut self, pos: usize) {
        debug_assert!(pos <= self.text.len());
        self.cursor = pos;
    }

    pub fn set_limit(&mut self, limit: usize) {
        debug_assert!(limit <= self.text.len());
        self.limit = limit;
    }

    pub fn set_limit_backward(&mut self, limit_backward: usize) {
        debug_assert!(limit_backward <= self.text.len());
        self.limit_backward = limit_backward;
    }

    pub fn set_bra(&mut self, bra: usize) {
        debug_assert!(bra <= self.text.len());
        self.bra = bra;
    }

    pub fn set_ket(&mut self, ket: usize) {
        debug_assert!(ket <= self.text.len());
        self.ket = ket;
    }

    /// Opens a slice at the cursor (`bra = cursor`).
    pub fn mark_bra(&mut self) {
        self.bra = self.cursor;
    }

    /// Closes a slice at the cursor (`ket = cursor`).
    pub fn mark_ket(&mut self) {
        self.ket = self.cursor;
    }

    /// Steps the cursor one character toward the limit. `false` at the
    /// limit.
    pub fn advance(&mut self) -> bool {
        if self.cursor >= self.limit {
            return false;
        }

        self.cursor += 1;
        true
    }

    /// Steps the cursor one character toward the backward limit. `false` at
    /// the backward limit.
    pub fn retreat(&mut self) -> bool {
        if self.cursor <= self.limit_backward {
            return false;
        }

        self.cursor -= 1;
        true
    }

    pub fn snapshot(&self) -> Checkpoint {
        Checkpoint {
            cursor: self.cursor,
        }
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        debug_assert!(checkpoint.cursor <= self.text.len());
        self.cursor = checkpoint.cursor;
    }

    pub fn tail_snapshot(&self) -> TailCheckpoint {
        TailCheckpoint {
            tail: self.limit - self.cursor,
        }
    }

    pub fn tail_restore(&mut self, checkpoint: TailCheckpoint) {
        debug_assert!(checkpoint.tail <= self.limit);
        self.cursor = self.limit - checkpoint.tail;
    }

    /// Tests that the character at the cursor is in the class and steps past
    /// it.
    pub fn in_grouping(&mut self, grouping: &Grouping) -> bool {
        if self.cursor >= self.limit {
            return false;
        }

        if !grouping.contains(self.text[self.cursor]) {
            return false;
        }

        self.cursor += 1;
        true
    }

    /// Tests that the character at the cursor is outside the class and steps
    /// past it. A character outside the class's `[min, max]` range counts as
    /// outside the class.
    pub fn out_grouping(&mut self, grouping: &Grouping) -> bool {
        if self.cursor >= self.limit {
            return false;
        }

        if grouping.contains(self.text[self.cursor]) {
            return false;
        }

        self.cursor += 1;
        true
    }

    pub fn in_grouping_b(&mut self, grouping: &Grouping) -> bool {
        if self.cursor <= self.limit_backward {
            return false;
        }

        if !grouping.contains(self.text[self.cursor - 1]) {
            return false;
        }

        self.cursor -= 1;
        true
    }

    pub fn out_grouping_b(&mut self, grouping: &Grouping) -> bool {
        if self.cursor <= self.limit_backward {
            return false;
        }

        if grouping.contains(self.text[self.cursor - 1]) {
            return false;
        }

        self.cursor -= 1;
        true
    }

    /// [`Context::in_grouping`] against a raw code-point range.
    pub fn in_range(&mut self, min: u32, max: u32) -> bool {
        if self.cursor >= self.limit {
            return false;
        }

        let code = self.text[self.cursor] as u32;
        if code < min || code > max {
            return false;
        }

        self.cursor += 1;
        true
    }

    pub fn out_range(&mut self, min: u32, max: u32) -> bool {
        if self.cursor >= self.limit {
            return false;
        }

        let code = self.text[self.cursor] as u32;
        if code >= min && code <= max {
            return false;
        }

        self.cursor += 1;
        true
    }

    pub fn in_range_b(&mut self, min: u32, max: u32) -> bool {
        if self.cursor <= self.limit_backward {
            return false;
        }

        let code = self.text[self.cursor - 1] as u32;
        if code < min || code > max {
            return false;
        }

        self.cursor -= 1;
        true
    }

    pub fn out_range_b(&mut self, min: u32, max: u32) -> bool {
        if self.cursor <= self.limit_backward {
            return false;
        }

        let code = self.text[self.cursor - 1] as u32;
        if code >= min && code <= max {
            return false;
        }

        self.cursor -= 1;
        true
    }

    /// Tests that the next characters equal `s` and steps past them.
    pub fn eq_s(&mut self, s: &str) -> bool {
        let n = s.chars().count();
        if self.limit - self.cursor < n {
            return false;
        }

        if !s
            .chars()
            .enumerate()
            .all(|(i, ch)| self.text[self.cursor + i] == ch)
        {
            return false;
        }

        self.cursor += n;
        true
    }

    /// Tests that the previous characters equal `s` and steps back past
    /// them.
    pub fn eq_s_b(&mut self, s: &str) -> bool {
        let n = s.chars().count();
        if self.cursor - self.limit_backward < n {
            return false;
        }

        if !s
            .chars()
            .enumerate()
            .all(|(i, ch)| self.text[self.cursor - n + i] == ch)
        {
            return false;
        }

        self.cursor -= n;
        true
    }

    /// Substitutes `text[bra_pos..ket_pos]` with `s` and returns the length
    /// delta.
    ///
    /// Every derived position stays consistent through one rule: the limit
    /// shifts by the delta, a cursor at or after `ket_pos` shifts with it,
    /// and a cursor strictly inside the replaced region collapses to
    /// `bra_pos`. All higher-level splices go through here.
    pub fn replace(&mut self, bra_pos: usize, ket_pos: usize, s: &str) -> isize {
        debug_assert!(bra_pos <= ket_pos && ket_pos <= self.text.len());

        let delta = s.chars().count() as isize - (ket_pos - bra_pos) as isize;
        self.text.splice(bra_pos..ket_pos, s.chars());
        self.limit = (self.limit as isize + delta) as usize;

        if self.cursor >= ket_pos {
            self.cursor = (self.cursor as isize + delta) as usize;
        } else if self.cursor > bra_pos {
            self.cursor = bra_pos;
        }

        delta
    }

    /// The `bra`/`ket` chain check evaluated before any slice-consuming
    /// operation: `bra <= ket <= limit <= length`.
    pub fn slice_valid(&self) -> bool {
        self.bra <= self.ket && self.ket <= self.limit && self.limit <= self.text.len()
    }

    /// Replaces the `bra..ket` slice with `s`. Returns `false` without
    /// mutating anything if the slice is invalid. On success `ket` is
    /// re-pinned to the end of the replacement, so the bracket keeps
    /// delimiting the spliced-in text.
    pub fn slice_from(&mut self, s: &str) -> bool {
        if !self.slice_valid() {
            return false;
        }

        let ket = self.ket;
        let delta = self.replace(self.bra, self.ket, s);
        self.ket = (ket as isize + delta) as usize;

        true
    }

    /// Deletes the `bra..ket` slice.
    pub fn slice_del(&mut self) -> bool {
        self.slice_from("")
    }

    /// Splices `s` in at `bra_pos..ket_pos` without consuming the engine's
    /// own slice: `bra` and `ket` shift by the delta when they sit at or
    /// after `bra_pos`.
    pub fn insert(&mut self, bra_pos: usize, ket_pos: usize, s: &str) {
        let delta = self.replace(bra_pos, ket_pos, s);

        if bra_pos <= self.bra {
            self.bra = (self.bra as isize + delta) as usize;
        }

        if bra_pos <= self.ket {
            self.ket = (self.ket as isize + delta) as usize;
        }
    }

    /// The substring delimited by `bra..ket`, or the empty string if the
    /// slice is invalid.
    pub fn slice_to(&self) -> String {
        if !self.slice_valid() {
            return String::new();
        }

        self.text[self.bra..self.ket].iter().collect()
    }
}
