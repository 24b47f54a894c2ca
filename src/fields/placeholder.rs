//! Scanner for `{{ ... }}` placeholders.

use std::ops::Range;

/// A `{{ body }}` occurrence inside a text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// Byte range of the whole placeholder, braces included
    pub range: Range<usize>,
    /// Text between the braces, surrounding whitespace trimmed
    pub body: &'a str,
}

/// Iterate over the placeholders of a text, left to right.
///
/// A placeholder body never contains `{` or `}`; in `{{{#PAGE#}}` the
/// placeholder starts at the second brace.
pub fn placeholders(text: &str) -> Placeholders<'_> {
    Placeholders { text, pos: 0 }
}

/// Iterator returned by [`placeholders`].
#[derive(Debug, Clone)]
pub struct Placeholders<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for Placeholders<'a> {
    type Item = Placeholder<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let start = self.pos + self.text.get(self.pos..)?.find("{{")?;
            let body_start = start + 2;
            let brace = body_start + self.text[body_start..].find(['{', '}'])?;

            if self.text[brace..].starts_with("}}") {
                self.pos = brace + 2;
                return Some(Placeholder {
                    range: start..brace + 2,
                    body: self.text[body_start..brace].trim(),
                });
            }

            // "{{{" restarts one brace later, a lone '}' right after it.
            let bytes = self.text.as_bytes();
            self.pos = match bytes[brace] {
                b'{' if bytes[brace - 1] == b'{' => brace - 1,
                b'{' => brace,
                _ => brace + 1,
            };
        }
    }
}
