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

//! Drives the engine through all phases of a small english-like rule
//! program: prelude normalization, region marking, and a guarded backward
//! suffix cascade.

use stemmer::{check_table, Among, Context, Grouping, Program, Stemmer};

const VOWELS: Grouping = Grouping {
    bits: &[17, 65, 16, 1],
    min: 'a' as u32,
    max: 'y' as u32,
};

struct EnglishLike {
    p1: usize,
    runs: usize,
}

impl EnglishLike {
    fn new() -> Self {
        Self { p1: 0, runs: 0 }
    }
}

fn in_r1(ctx: &mut Context, program: &mut EnglishLike) -> bool {
    ctx.cursor() >= program.p1
}

fn after_consonant(ctx: &mut Context, _program: &mut EnglishLike) -> bool {
    ctx.out_grouping_b(&VOWELS)
}

static SUFFIXES: [Among<EnglishLike>; 2] = [
    Among::guarded("ies", -1, 2, after_consonant),
    Among::guarded("sses", -1, 1, in_r1),
];

impl Program for EnglishLike {
    fn stem(&mut self, ctx: &mut Context) -> bool {
        self.runs += 1;

        self.prelude(ctx);
        self.mark_regions(ctx);

        ctx.set_cursor(ctx.limit());
        self.suffix_step(ctx)
    }
}

impl EnglishLike {
    /// Strips a leading apostrophe.
    fn prelude(&mut self, ctx: &mut Context) {
        ctx.mark_bra();
        if ctx.eq_s("'") {
            ctx.mark_ket();
            ctx.slice_del();
        }
        ctx.set_cursor(0);
    }

    /// R1 starts after the first consonant that follows a vowel.
    fn mark_regions(&mut self, ctx: &mut Context) {
        self.p1 = ctx.limit();
        ctx.set_cursor(0);

        loop {
            if ctx.in_grouping(&VOWELS) {
                break;
            }
            if !ctx.advance() {
                return;
            }
        }

        loop {
            if ctx.out_grouping(&VOWELS) {
                break;
            }
            if !ctx.advance() {
                return;
            }
        }

        self.p1 = ctx.cursor();
    }

    fn suffix_step(&mut self, ctx: &mut Context) -> bool {
        ctx.mark_ket();
        let tag = ctx.find_among_b(&SUFFIXES, self);
        ctx.mark_bra();

        match tag {
            1 => ctx.slice_from("ss"),
            2 => ctx.slice_from("i"),
            _ => false,
        }
    }
}

#[test]
fn test_table_wiring() {
    assert_eq!(check_table(&SUFFIXES), Ok(()));
}

#[test]
fn test_suffix_rules() {
    let mut stemmer = Stemmer::new(EnglishLike::new());

    assert_eq!(stemmer.stem("caresses"), "caress");
    assert_eq!(stemmer.stem("ponies"), "poni");
}

#[test]
fn test_word_without_applicable_rule() {
    let mut stemmer = Stemmer::new(EnglishLike::new());

    assert_eq!(stemmer.stem("cats"), "cats");
}

#[test]
fn test_prelude_normalization() {
    let mut stemmer = Stemmer::new(EnglishLike::new());

    assert_eq!(stemmer.stem("'ponies"), "poni");
    assert_eq!(stemmer.stem("'cat"), "cat");
}

#[test]
fn test_region_guard_rejects_short_word() {
    let mut stemmer = Stemmer::new(EnglishLike::new());

    // p1 covers the whole word, so the R1 guard rejects "sses" and no
    // shorter candidate exists
    assert_eq!(stemmer.stem("sses"), "sses");
}

#[test]
fn test_batch_preserves_order_and_dedups() {
    let mut stemmer = Stemmer::new(EnglishLike::new());

    let stems = stemmer.stem_all(["cats", "caresses", "cats"]);

    assert_eq!(stems, vec!["cats", "caress", "cats"]);
    assert_eq!(stemmer.program().runs, 2);
}

#[test]
fn test_repeated_calls_are_deterministic_and_cached() {
    let mut stemmer = Stemmer::new(EnglishLike::new());

    let first = stemmer.stem("caresses").to_string();
    let second = stemmer.stem("caresses").to_string();

    assert_eq!(first, second);
    assert_eq!(stemmer.program().runs, 1);
}
