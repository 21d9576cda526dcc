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

use crate::Context;

/// Predicate gating acceptance of an otherwise-matched pattern.
///
/// Receives the engine and the rule program, so it can run further cursor
/// tests and consult program-owned state such as region thresholds. When a
/// guard rejects, the matcher retries the entry's fallback chain.
pub type Guard<P> = fn(&mut Context, &mut P) -> bool;

/// One candidate pattern in a lookup table.
///
/// Tables are `'static` arrays authored by the rule compiler: sorted by
/// pattern (forward tables) or by reversed pattern (backward tables) so the
/// generalized binary search stays valid, with `fallback` linking each entry
/// to the next shorter candidate to probe when a guard rejects a structural
/// match. `-1` ends a chain. Tag `0` is reserved for "no match".
///
/// Tables are immutable after construction and may be read concurrently by
/// any number of engine instances.
pub struct Among<P> {
    pub pattern: &'static str,
    pub fallback: i32,
    pub tag: i32,
    pub guard: Option<Guard<P>>,
}

impl<P> Among<P> {
    pub const fn new(pattern: &'static str, fallback: i32, tag: i32) -> Self {
        Self {
            pattern,
            fallback,
            tag,
            guard: None,
        }
    }

    pub const fn guarded(
        pattern: &'static str,
        fallback: i32,
        tag: i32,
        guard: Guard<P>,
    ) -> Self {
        Self {
            pattern,
            fallback,
            tag,
            guard: Some(guard),
        }
    }

    /// Pattern length in characters.
    pub(crate) fn len(&self) -> usize {
        self.pattern.chars().count()
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TableError {
    #[error("entry {entry}: fallback {fallback} is out of bounds for a table of {len} entries")]
    FallbackOutOfBounds {
        entry: usize,
        fallback: i32,
        len: usize,
    },

    #[error("entry {entry}: fallback chain revisits entry {revisited}")]
    CyclicFallback { entry: usize, revisited: usize },
}

/// Checks the fallback wiring of a table: every link in bounds, every chain
/// acyclic.
///
/// A table that fails this check would send the matcher into an endless
/// fallback walk. That is a defect in the table, not a runtime condition, so
/// the check is meant to run once per table in the rule program's tests
/// rather than on the stemming path.
pub fn check_table<P>(table: &[Among<P>]) -> Result<(), TableError> {
    for entry in 0..table.len() {
        let mut visited = vec![false; table.len()];
        visited[entry] = true;

        let mut current = entry;
        loop {
            let fallback = table[current].fallback;
            if fallback < 0 {
                break;
            }

            let next = fallback as usize;
            if next >= table.len() {
                return Err(TableError::FallbackOutOfBounds {
                    entry: current,
                    fallback,
                    len: table.len(),
                });
            }

            if visited[next] {
                return Err(TableError::CyclicFallback {
                    entry,
                    revisited: next,
                });
            }

            visited[next] = true;
            current = next;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_table() {
        let table: [Among<()>; 4] = [
            Among::new("s", -1, 3),
            Among::new("ies", 0, 2),
            Among::new("sses", 0, 1),
            Among::new("ss", 0, -1),
        ];

        assert_eq!(check_table(&table), Ok(()));
    }

    #[test]
    fn test_fallback_out_of_bounds() {
        let table: [Among<()>; 2] = [Among::new("s", -1, 1), Among::new("es", 7, 2)];

        assert_eq!(
            check_table(&table),
            Err(TableError::FallbackOutOfBounds {
                entry: 1,
                fallback: 7,
                len: 2,
            })
        );
    }

    #[test]
    fn test_cyclic_fallback() {
        let table: [Among<()>; 3] = [
            Among::new("s", 2, 1),
            Among::new("es", 0, 2),
            Among::new("ses", 1, 3),
        ];

        assert_eq!(
            check_table(&table),
            Err(TableError::CyclicFallback {
                entry: 0,
                revisited: 0,
            })
        );
    }

    #[test]
    fn test_self_cycle() {
        let table: [Among<()>; 1] = [Among::new("s", 0, 1)];

        assert_eq!(
            check_table(&table),
            Err(TableError::CyclicFallback {
                entry: 0,
                revisited: 0,
            })
        );
    }
}
