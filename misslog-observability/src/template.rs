//! `%name%` template rendering.
//!
//! Templates are scanned once, left to right. A `%name%` pair whose name is
//! a known [`Placeholder`] is replaced by its value; anything else between
//! percent signs is copied through untouched, and the scan resumes at the
//! closing `%` so it can still open the next token. Substituted values are
//! never scanned again.

use crate::vars::{Placeholder, VariableMap};

/// One piece of a scanned template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Var(Placeholder),
}

/// Iterator over the segments of a template.
pub struct Segments<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        let Some(start) = self.rest.find('%') else {
            let literal = self.rest;
            self.rest = "";
            return Some(Segment::Literal(literal));
        };

        if start > 0 {
            let literal = &self.rest[..start];
            self.rest = &self.rest[start..];
            return Some(Segment::Literal(literal));
        }

        // `rest` starts with '%'
        let after = &self.rest[1..];
        if let Some(end) = after.find('%')
            && let Some(placeholder) = Placeholder::from_name(&after[..end])
        {
            self.rest = &after[end + 1..];
            return Some(Segment::Var(placeholder));
        }

        let percent = &self.rest[..1];
        self.rest = after;
        Some(Segment::Literal(percent))
    }
}

pub fn segments(template: &str) -> Segments<'_> {
    Segments { rest: template }
}

/// Substitute every placeholder and wrap the result in line breaks.
pub fn render(template: &str, vars: &VariableMap) -> String {
    let mut out = String::with_capacity(template.len() + 128);
    out.push('\n');
    for segment in segments(template) {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Var(placeholder) => out.push_str(vars.get(placeholder)),
        }
    }
    out.push('\n');
    out
}

/// `%name%` tokens that look like variables but are not in the vocabulary.
///
/// They are rendered literally; callers use this to warn operators.
pub fn unknown_tokens(template: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut offset = 0;

    while let Some(start) = template[offset..].find('%').map(|i| i + offset) {
        let after = &template[start + 1..];
        let Some(end) = after.find('%') else { break };
        let name = &after[..end];
        let looks_like_var = !name.is_empty()
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

        if looks_like_var {
            if Placeholder::from_name(name).is_none() {
                found.push(&template[start..start + end + 2]);
            }
            offset = start + end + 2;
        } else {
            offset = start + 1;
        }
    }

    found
}
