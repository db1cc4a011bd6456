//! Whole-program assembly
//!
//! Lines are assembled in order, each starting where the previous one ended.
//! Some lines change length depending on the labels they reference, so label
//! offsets are worked out before anything is encoded:
//!
//!  1. Every label that sits after only fixed-length lines has a known offset.
//!     Knowing it may pin down the length of more lines, so this repeats until
//!     nothing new is learned.
//!  2. Any labels left over start at their lowest possible offset, and the
//!     layout is recomputed from those guesses until it stops changing.
//!  3. If the guesses keep cycling, every assignment within the labels'
//!     bounds is tried in turn, as long as there are not too many of them.

use crate::asm::line::{analyze_line, Line};
use crate::asm::{AsmError, Result, Target};
use crate::memory::{BitString, ProgramImage};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, trace};

/// How many times the layout may be recomputed before giving up.
pub const MAX_LAYOUT_PASSES: usize = 64;

/// Most label assignments tried once the guess pass stops converging.
const MAX_LAYOUT_CANDIDATES: u128 = 1 << 16;

/// Remove a `//` comment, unless it is inside a string operand.
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    let mut prev_slash = false;

    for (i, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '/' if !in_string && prev_slash => return &line[..i - 1],
            _ => {}
        }

        prev_slash = c == '/' && !in_string;
    }

    line
}

/// Split source text into numbered, non-empty lines of code.
fn source_lines(source: &str) -> Vec<(usize, &str)> {
    source
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let code = strip_comment(line).trim();

            if code.is_empty() {
                None
            } else {
                Some((i + 1, code))
            }
        })
        .collect()
}

/// One line of the assembled program.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ListingEntry {
    /// 1-based source line number.
    pub line: usize,

    /// Image offset of the first bit of the line.
    pub offset: u128,

    /// Encoded length in bits.
    pub len: usize,
    pub text: String,
}

/// An assembled program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assembly {
    pub bits: BitString,
    pub labels: BTreeMap<String, u128>,
    pub listing: Vec<ListingEntry>,
}

impl Assembly {
    pub fn image(&self) -> ProgramImage {
        ProgramImage::from_bits(&self.bits)
    }
}

/// Check that every label is declared exactly once.
fn check_labels(target: Target, lines: &[(usize, &str)]) -> Result<()> {
    let mut declared_at = HashMap::new();
    let mut referenced = Vec::new();

    for (number, text) in lines {
        let analysis = analyze_line(target, text).map_err(|e| e.at_line(*number))?;

        for name in analysis.declared {
            if declared_at.insert(name.clone(), *number).is_some() {
                return Err(AsmError::DuplicateLabel(name).at_line(*number));
            }
        }

        referenced.extend(analysis.referenced.into_iter().map(|name| (*number, name)));
    }

    for (number, name) in referenced {
        if !declared_at.contains_key(&name) {
            return Err(AsmError::UndefinedLabel(name).at_line(number));
        }
    }

    Ok(())
}

/// Lay out the program once, assuming the offsets in `labels`.
///
/// Returns the offset every label would land on.
fn measure(
    target: Target,
    lines: &[(usize, &str)],
    labels: &mut HashMap<String, u128>,
) -> Result<HashMap<String, u128>> {
    let mut offset = 0;
    let mut layout = HashMap::new();

    for (number, text) in lines {
        let line = Line::parse(text, labels).map_err(|e| e.at_line(*number))?;
        let size = line.size_range(target).map_err(|e| e.at_line(*number))?;
        let at = (offset + line.declaration_offset(target)) as u128;

        for name in line.declared() {
            layout.insert(name.clone(), at);
        }

        offset += size.max.unwrap_or(size.min);
    }

    Ok(layout)
}

/// Find an offset for every label in the program.
fn resolve_layout(target: Target, lines: &[(usize, &str)]) -> Result<HashMap<String, u128>> {
    let mut known = HashMap::new();
    let mut lowest = HashMap::new();
    let mut highest = HashMap::new();

    loop {
        let mut learned = false;
        let mut min = 0;
        let mut max = Some(0);

        for (number, text) in lines {
            let line = Line::parse(text, &mut known).map_err(|e| e.at_line(*number))?;
            let size = line.size_range(target).map_err(|e| e.at_line(*number))?;
            let at = line.declaration_offset(target);

            for name in line.declared() {
                lowest.insert(name.clone(), (min + at) as u128);
                match max {
                    Some(max) => highest.insert(name.clone(), (max + at) as u128),
                    None => highest.remove(name),
                };

                if max == Some(min) && !known.contains_key(name) {
                    known.insert(name.clone(), (min + at) as u128);
                    learned = true;
                }
            }

            min += size.min;
            max = match (max, size.max) {
                (Some(max), Some(len)) => Some(max + len),
                _ => None,
            };
        }

        trace!(known = known.len(), "label bounds pass");

        if !learned {
            break;
        }
    }

    if known.len() == lowest.len() {
        return Ok(known);
    }

    debug!(
        unresolved = lowest.len() - known.len(),
        "guessing remaining label offsets"
    );

    let mut unresolved: Vec<_> = lowest
        .iter()
        .filter(|(name, _)| !known.contains_key(*name))
        .map(|(name, lo)| (name.clone(), *lo, highest.get(name).copied()))
        .collect();
    unresolved.sort();

    let mut guess = lowest;
    guess.extend(known.clone());

    for pass in 0..MAX_LAYOUT_PASSES {
        let layout = measure(target, lines, &mut guess)?;

        if layout == guess {
            debug!(pass, "label layout settled");
            return Ok(layout);
        }

        guess = layout;
    }

    let bounds = unresolved
        .into_iter()
        .map(|(name, lo, hi)| Some((name, lo, hi?)))
        .collect::<Option<Vec<_>>>();

    if let Some(bounds) = bounds {
        if let Some(layout) = search_layout(target, lines, &known, &bounds)? {
            return Ok(layout);
        }
    }

    Err(AsmError::UnresolvedLayout(MAX_LAYOUT_PASSES))
}

/// Try assignments of the unresolved labels within their bounds, starting
/// from the lowest offsets, until one lays the program out consistently.
///
/// Gives up without searching if there are more than
/// `MAX_LAYOUT_CANDIDATES` assignments to try.
fn search_layout(
    target: Target,
    lines: &[(usize, &str)],
    known: &HashMap<String, u128>,
    bounds: &[(String, u128, u128)],
) -> Result<Option<HashMap<String, u128>>> {
    let candidates = bounds
        .iter()
        .try_fold(1u128, |total, (_, lo, hi)| total.checked_mul(hi - lo + 1));

    match candidates {
        Some(count) if count <= MAX_LAYOUT_CANDIDATES => {
            debug!(count, "searching label bounds for a consistent layout")
        }
        _ => return Ok(None),
    }

    let mut guess = known.clone();
    guess.extend(bounds.iter().map(|(name, lo, _)| (name.clone(), *lo)));

    loop {
        if measure(target, lines, &mut guess)? == guess {
            return Ok(Some(guess));
        }

        // Step the first label with room left and rewind the ones before it.
        let next = bounds
            .iter()
            .position(|(name, _, hi)| guess.get(name).map_or(false, |offset| offset < hi));

        match next {
            Some(index) => {
                for (name, lo, _) in &bounds[..index] {
                    guess.insert(name.clone(), *lo);
                }

                if let Some(offset) = guess.get_mut(&bounds[index].0) {
                    *offset += 1;
                }
            }
            None => return Ok(None),
        }
    }
}

/// Assemble a whole program.
///
/// Blank lines and `//` comments are skipped. Errors carry the 1-based number
/// of the line they happened on.
pub fn assemble(target: Target, source: &str) -> Result<Assembly> {
    let lines = source_lines(source);

    check_labels(target, &lines)?;

    let mut table = resolve_layout(target, &lines)?;
    let mut bits = BitString::new();
    let mut listing = Vec::with_capacity(lines.len());

    for (number, text) in lines {
        let origin = bits.len() as u128;
        let line = Line::parse(text, &mut table).map_err(|e| e.at_line(number))?;
        let evaluation = line.encode(target, origin).map_err(|e| e.at_line(number))?;

        for (name, offset) in evaluation.declared.iter() {
            debug_assert_eq!(table.get(name), Some(offset));
        }

        listing.push(ListingEntry {
            line: number,
            offset: origin,
            len: evaluation.bits.len(),
            text: text.to_string(),
        });
        bits.append(&evaluation.bits);
    }

    info!(
        arch = %target.arch,
        env = %target.env,
        bits = bits.len(),
        labels = table.len(),
        "assembled program"
    );

    Ok(Assembly {
        bits,
        labels: table.into_iter().collect(),
        listing,
    })
}
