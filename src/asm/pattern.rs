//! The instruction pattern table
//!
//! Every line of jaw assembly is matched against a fixed list of templates.
//! A template is literal text with typed placeholders in braces; each
//! placeholder lists the operand kinds it accepts, separated by `|`:
//!
//!  * `N` - an integer literal
//!  * `S` - the raw captured text
//!  * `X` - a label reference (`.name`) or an integer literal
//!  * `L` - a label declaration (`@.name`) or a label reference
//!  * `` `tok` `` - exactly the text `tok`
//!
//! Templates are tried in table order and the first one whose regex matches
//! the whole line is used.

use regex::Regex;

/// One kind of operand a placeholder will accept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamKind {
    Number,
    Text,
    Value,
    Label,
    Exact(String),
}

impl ParamKind {
    /// Parse the body of a placeholder, e.g. ``"`any`|X"``.
    ///
    /// Templates are static, so a malformed one is a programming error.
    fn parse_list(body: &str) -> Vec<ParamKind> {
        body.split('|')
            .map(|kind| match kind {
                "N" => ParamKind::Number,
                "S" => ParamKind::Text,
                "X" => ParamKind::Value,
                "L" => ParamKind::Label,
                tok if tok.len() > 2 && tok.starts_with('`') && tok.ends_with('`') => {
                    ParamKind::Exact(tok[1..tok.len() - 1].to_string())
                }
                other => panic!("Unknown placeholder kind {} in instruction template", other),
            })
            .collect()
    }
}

/// The capture group used for a placeholder.
///
/// Placeholders that only take exact tokens or labels get a narrower group
/// so that they cannot swallow unrelated lines.
fn capture_group(kinds: &[ParamKind]) -> String {
    if kinds.iter().all(|k| matches!(k, ParamKind::Exact(_))) {
        let alternatives: Vec<String> = kinds
            .iter()
            .filter_map(|k| match k {
                ParamKind::Exact(tok) => Some(regex::escape(tok)),
                _ => None,
            })
            .collect();

        format!("({})", alternatives.join("|"))
    } else if kinds.iter().all(|k| *k == ParamKind::Label) {
        "(@?\\..*)".to_string()
    } else {
        "(.*)".to_string()
    }
}

/// Every instruction shape the assembler knows how to encode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// A label on a line of its own.
    LabelDecl,
    SetMemBit,
    JumpIfMem,

    /// `JumpIfMem` that also places a label right after itself.
    JumpIfMemDecl,
    GotoIfMem,
    SetRegBit,
    JumpIfRegBit,

    /// `JumpIfRegBit` that also places a label right after itself.
    JumpIfRegBitDecl,
    GotoIfRegBit,

    /// Load a register with the difference of two values.
    SetRegisterDiff,
    SetRegister,

    /// Raw character data.
    Store,

    /// Code that outputs a string through the I/O addresses, assuming `reg1`
    /// and `reg2` hold 1 and 2.
    ///
    /// It does not halt afterwards, so several can run back to back. End the
    /// program with `mem[reg0] = 1` (with `reg0` holding 0) to stop.
    Print,
}

/// Templates in match order.
const TEMPLATES: &[(Shape, &str)] = &[
    (Shape::LabelDecl, "{L}"),
    (Shape::JumpIfMemDecl, "mem[reg{N}] ? pp += reg{N} {L}"),
    (Shape::JumpIfMem, "mem[reg{N}] ? pp += reg{N}"),
    (Shape::GotoIfMem, "mem[reg{N}] ? goto {X} via reg{N}"),
    (Shape::SetMemBit, "mem[reg{N}] = {N}"),
    (Shape::JumpIfRegBitDecl, "reg{N}[{N}] ? pp += reg{N} {L}"),
    (Shape::JumpIfRegBit, "reg{N}[{N}] ? pp += reg{N}"),
    (Shape::GotoIfRegBit, "reg{N}[{N}] ? goto {X} via reg{N}"),
    (Shape::SetRegBit, "reg{N}[{N}] = {N}"),
    (Shape::SetRegisterDiff, "reg{N}: {`any`|X} = const {X} - {X}"),
    (Shape::SetRegister, "reg{N}: {`any`|X} = const {X}"),
    (Shape::Store, "#store \"{S}\""),
    (Shape::Print, "#print \"{S}\""),
];

/// A compiled instruction template.
#[derive(Debug)]
pub struct Pattern {
    shape: Shape,
    regex: Regex,
    params: Vec<Vec<ParamKind>>,
}

impl Pattern {
    /// Compile a template into an anchored regex.
    pub fn compile(shape: Shape, template: &'static str) -> Self {
        let mut source = String::from("^");
        let mut params = Vec::new();
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            let end = start
                + rest[start..]
                    .find('}')
                    .expect("Unterminated placeholder in instruction template");
            let kinds = ParamKind::parse_list(&rest[start + 1..end]);

            source.push_str(&regex::escape(&rest[..start]));
            source.push_str(&capture_group(&kinds));
            params.push(kinds);
            rest = &rest[end + 1..];
        }

        source.push_str(&regex::escape(rest));
        source.push('$');

        Pattern {
            shape,
            regex: Regex::new(&source).expect("Instruction template is not a valid regex"),
            params,
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// The accepted kinds of each placeholder, in order.
    pub fn params(&self) -> &[Vec<ParamKind>] {
        &self.params
    }

    /// Match a whole line, returning the text of each placeholder.
    pub fn captures<'t>(&self, line: &'t str) -> Option<Vec<&'t str>> {
        let caps = self.regex.captures(line)?;

        Some(
            caps.iter()
                .skip(1)
                .map(|c| c.map(|m| m.as_str()).unwrap_or(""))
                .collect(),
        )
    }
}

lazy_static! {
    /// The pattern table, built on first use.
    pub static ref PATTERNS: Vec<Pattern> = TEMPLATES
        .iter()
        .map(|(shape, template)| Pattern::compile(*shape, *template))
        .collect();
}

/// Find the first pattern matching `line`, along with its placeholder text.
pub fn find_pattern(line: &str) -> Option<(&'static Pattern, Vec<&str>)> {
    PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(line).map(|caps| (pattern, caps)))
}
