//! Segmentation of compose template text using `nom`.
//!
//! Splits raw text into literal runs, escaped dollars (`$$`), and variable
//! references (`$NAME`, `${NAME}`, `${NAME:-default}`, `${NAME-default}`).
//! Anything that starts with `$` but is not a well-formed reference stays
//! literal text, so segmentation never fails.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_till, take_till1, take_while, take_while1},
    character::complete::char,
    combinator::{map, opt, recognize, value},
    sequence::{pair, preceded},
};

/// When an inline default applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultWhen {
    /// `${NAME-default}`: only when the variable has no value at all.
    Unset,
    /// `${NAME:-default}`: also when the value is empty.
    UnsetOrEmpty,
}

/// An inline default attached to a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineDefault<'a> {
    /// Default text, taken literally.
    pub value: &'a str,
    /// When it applies.
    pub when: DefaultWhen,
}

/// A variable reference inside the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'a> {
    /// Variable name.
    pub name: &'a str,
    /// Inline default, if any.
    pub default: Option<InlineDefault<'a>>,
    /// The exact source text of the reference.
    pub raw: &'a str,
}

/// A piece of template text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text copied through unchanged.
    Literal(&'a str),
    /// `$$`, which renders as a single `$`.
    EscapedDollar,
    /// A variable reference.
    Reference(Reference<'a>),
}

const fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

const fn is_name_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Braced names may also contain dots, so dotted parameters can be referenced.
const fn is_braced_name_continue(c: char) -> bool {
    is_name_continue(c) || c == '.'
}

fn literal(input: &str) -> IResult<&str, Segment<'_>> {
    map(take_till1(|c| c == '$'), Segment::Literal).parse(input)
}

fn escaped_dollar(input: &str) -> IResult<&str, Segment<'_>> {
    value(Segment::EscapedDollar, tag("$$")).parse(input)
}

fn inline_default(input: &str) -> IResult<&str, InlineDefault<'_>> {
    alt((
        map(preceded(tag(":-"), take_till(|c| c == '}')), |text| {
            InlineDefault {
                value: text,
                when: DefaultWhen::UnsetOrEmpty,
            }
        }),
        map(preceded(char('-'), take_till(|c| c == '}')), |text| {
            InlineDefault {
                value: text,
                when: DefaultWhen::Unset,
            }
        }),
    ))
    .parse(input)
}

fn braced_reference(input: &str) -> IResult<&str, Segment<'_>> {
    let (rest, _) = tag("${")(input)?;
    let (rest, name) =
        recognize(pair(take_while1(is_name_start), take_while(is_braced_name_continue)))
            .parse(rest)?;
    let (rest, default) = opt(inline_default).parse(rest)?;
    let (rest, _) = char('}')(rest)?;
    let raw = &input[..input.len() - rest.len()];
    Ok((rest, Segment::Reference(Reference { name, default, raw })))
}

fn bare_reference(input: &str) -> IResult<&str, Segment<'_>> {
    let (rest, _) = char('$')(input)?;
    let (rest, name) =
        recognize(pair(take_while1(is_name_start), take_while(is_name_continue))).parse(rest)?;
    let raw = &input[..input.len() - rest.len()];
    Ok((
        rest,
        Segment::Reference(Reference {
            name,
            default: None,
            raw,
        }),
    ))
}

fn lone_dollar(input: &str) -> IResult<&str, Segment<'_>> {
    map(tag("$"), Segment::Literal).parse(input)
}

fn segment(input: &str) -> IResult<&str, Segment<'_>> {
    alt((
        escaped_dollar,
        braced_reference,
        bare_reference,
        lone_dollar,
        literal,
    ))
    .parse(input)
}

/// Splits template text into segments.
///
/// Concatenating the source text of every segment reproduces `input`.
#[must_use]
pub fn segments(input: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut remaining = input;
    while !remaining.is_empty() {
        if let Ok((rest, seg)) = segment(remaining) {
            out.push(seg);
            remaining = rest;
        } else {
            out.push(Segment::Literal(remaining));
            break;
        }
    }
    out
}
