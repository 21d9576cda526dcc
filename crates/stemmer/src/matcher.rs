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

//! Longest-match lookup over sorted pattern tables.
//!
//! The lookup is a generalized binary search: the probe interval keeps a
//! "common length" counter at each bound so character comparisons resume
//! where a previous probe left off instead of restarting at the pattern
//! head. The binary search locates the best structural candidate; the
//! fallback-chain walk afterwards finds the longest candidate whose guard
//! also accepts, which is what makes the longest *applicable* pattern win
//! rather than merely some matching one.

use crate::{Among, Context};

impl Context {
    /// Looks up the longest pattern matching forward from the cursor toward
    /// the limit.
    ///
    /// On a match the cursor has stepped past the matched pattern and the
    /// entry's tag is returned; `0` means no entry matched. The table must
    /// be sorted by pattern, with fallback links wired by its author.
    pub fn find_among<P>(&mut self, table: &[Among<P>], program: &mut P) -> i32 {
        debug_assert!(!table.is_empty());
        debug_assert!(self.cursor() <= self.limit());

        let start = self.cursor();
        let limit = self.limit();

        let mut i = 0;
        let mut j = table.len();
        let mut common_i = 0;
        let mut common_j = 0;
        let mut first_key_inspected = false;

        loop {
            let k = i + (j - i) / 2;
            let entry = &table[k];

            let mut diff = 0i32;
            let mut common = common_i.min(common_j);

            for pattern_char in entry.pattern.chars().skip(common) {
                if start + common == limit {
                    diff = -1;
                    break;
                }

                diff = self.char_at(start + common) as i32 - pattern_char as i32;
                if diff != 0 {
                    break;
                }

                common += 1;
            }

            if diff < 0 {
                j = k;
                common_j = common;
            } else {
                i = k;
                common_i = common;
            }

            if j - i <= 1 {
                if i > 0 {
                    break;
                }

                if j == i {
                    break;
                }

                // probe index 0 once before giving up; tables routinely
                // carry a sentinel or empty-pattern entry there
                if first_key_inspected {
                    break;
                }

                first_key_inspected = true;
            }
        }

        loop {
            let entry = &table[i];

            if common_i >= entry.len() {
                self.set_cursor(start + entry.len());

                let Some(guard) = entry.guard else {
                    return entry.tag;
                };

                let accepted = guard(self, program);
                // undo whatever the guard did to the cursor
                self.set_cursor(start + entry.len());

                if accepted {
                    return entry.tag;
                }
            }

            if entry.fallback < 0 {
                return 0;
            }

            i = entry.fallback as usize;
        }
    }

    /// Looks up the longest pattern matching backward from the cursor toward
    /// the backward limit.
    ///
    /// The mirror of [`Context::find_among`]: patterns are compared tail
    /// first against the text ending at the cursor, and the table must be
    /// sorted by *reversed* pattern.
    pub fn find_among_b<P>(&mut self, table: &[Among<P>], program: &mut P) -> i32 {
        debug_assert!(!table.is_empty());
        debug_assert!(self.cursor() >= self.limit_backward());

        let start = self.cursor();
        let limit_backward = self.limit_backward();

        let mut i = 0;
        let mut j = table.len();
        let mut common_i = 0;
        let mut common_j = 0;
        let mut first_key_inspected = false;

        loop {
            let k = i + (j - i) / 2;
            let entry = &table[k];

            let mut diff = 0i32;
            let mut common = common_i.min(common_j);

            for pattern_char in entry.pattern.chars().rev().skip(common) {
                if start - common == limit_backward {
                    diff = -1;
                    break;
                }

                diff = self.char_at(start - 1 - common) as i32 - pattern_char as i32;
                if diff != 0 {
                    break;
                }

                common += 1;
            }

            if diff < 0 {
                j = k;
                common_j = common;
            } else {
                i = k;
                common_i = common;
            }

            if j - i <= 1 {
                if i > 0 {
                    break;
                }

                if j == i {
                    break;
                }

                if first_key_inspected {
                    break;
                }

                first_key_inspected = true;
            }
        }

        loop {
            let entry = &table[i];

            if common_i >= entry.len() {
                self.set_cursor(start - entry.len());

                let Some(guard) = entry.guard else {
                    return entry.tag;
                };

                let accepted = guard(self, program);
                self.set_cursor(start - entry.len());

                if accepted {
                    return entry.tag;
                }
            }

            if entry.fallback < 0 {
                return 0;
            }

            i = entry.fallback as usize;
        }
    }
}
