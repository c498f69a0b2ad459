//! GLSL `#include` expansion.
//!
//! Directive syntax:
//!
//! ```glsl
//! #include <chunk>                 // plain expansion
//! #include <chunk> [POINT_LIGHTS]  // repeated POINT_LIGHTS times
//! ```
//!
//! A repeated chunk has the index token (`{i}` by default) replaced by the
//! repetition index. An undefined quantity variable expands to nothing.
//! The `#version` / `#define` prefix is only emitted by the outermost call;
//! nested chunks see the same defines but never re-emit them.

use std::fmt::Write;

use rustc_hash::FxHashMap;

use crate::errors::{KestrelError, Result};
use crate::resources::ShaderDefines;

const DIRECTIVE: &str = "#include";

/// One parsed `#include` occurrence.
#[derive(Debug, PartialEq, Eq)]
struct Directive<'s> {
    /// Byte range of the whole directive in the source.
    start: usize,
    end: usize,
    name: &'s str,
    quantity: Option<&'s str>,
}

pub struct Preprocessor<'a> {
    includes: &'a FxHashMap<String, String>,
    index_token: &'a str,
}

impl<'a> Preprocessor<'a> {
    #[must_use]
    pub fn new(includes: &'a FxHashMap<String, String>, index_token: &'a str) -> Self {
        Self {
            includes,
            index_token,
        }
    }

    /// Outermost expansion: `#version`, one `#define` per entry, then the
    /// expanded body.
    pub fn run(&self, source: &str, version: &str, defines: &ShaderDefines) -> Result<String> {
        let body = self.expand(source, defines, &mut Vec::new())?;

        let mut out = String::with_capacity(body.len() + 32 * (defines.len() + 1));
        let _ = writeln!(out, "#version {version}");
        for (key, value) in defines.iter() {
            let _ = writeln!(out, "#define {key} {value}");
        }
        out.push_str(&body);
        Ok(out)
    }

    fn expand(
        &self,
        source: &str,
        defines: &ShaderDefines,
        stack: &mut Vec<String>,
    ) -> Result<String> {
        let mut out = String::with_capacity(source.len());
        let mut cursor = 0;

        for directive in Directives::new(source) {
            out.push_str(&source[cursor..directive.start]);
            cursor = directive.end;

            let chunk = self
                .includes
                .get(directive.name)
                .ok_or_else(|| KestrelError::IncludeNotFound(directive.name.to_string()))?;

            if stack.iter().any(|open| open == directive.name) {
                return Err(KestrelError::IncludeCycle(directive.name.to_string()));
            }
            stack.push(directive.name.to_string());
            let expanded = self.expand(chunk, defines, stack);
            stack.pop();
            let expanded = expanded?;

            match directive.quantity {
                None => out.push_str(&expanded),
                Some(variable) => {
                    let Some(value) = defines.get(variable) else {
                        continue;
                    };
                    let count: u32 = value.trim().parse().map_err(|_| {
                        KestrelError::InvalidIncludeQuantity {
                            variable: variable.to_string(),
                            value: value.to_string(),
                        }
                    })?;
                    for index in 0..count {
                        out.push_str(&expanded.replace(self.index_token, &index.to_string()));
                    }
                }
            }
        }

        out.push_str(&source[cursor..]);
        Ok(out)
    }
}

/// Iterator over well-formed `#include` directives, in source order.
///
/// An occurrence without a `<name>` argument is left in the text.
struct Directives<'s> {
    source: &'s str,
    pos: usize,
}

impl<'s> Directives<'s> {
    fn new(source: &'s str) -> Self {
        Self { source, pos: 0 }
    }

    fn parse_at(&self, start: usize) -> Option<Directive<'s>> {
        let bytes = self.source.as_bytes();
        let mut i = skip_blanks(bytes, start + DIRECTIVE.len());
        if bytes.get(i) != Some(&b'<') {
            return None;
        }
        let name_start = i + 1;
        let name_len = self.source[name_start..].find(['>', '\n'])?;
        if bytes[name_start + name_len] != b'>' {
            return None;
        }
        let name = self.source[name_start..name_start + name_len].trim();
        if name.is_empty() {
            return None;
        }
        i = name_start + name_len + 1;
        let mut end = i;

        // optional [VAR] on the same line
        let mut quantity = None;
        let j = skip_blanks(bytes, i);
        if bytes.get(j) == Some(&b'[')
            && let Some(len) = self.source[j + 1..].find([']', '\n'])
            && bytes[j + 1 + len] == b']'
        {
            let variable = self.source[j + 1..j + 1 + len].trim();
            if !variable.is_empty() {
                quantity = Some(variable);
                end = j + 1 + len + 1;
            }
        }

        Some(Directive {
            start,
            end,
            name,
            quantity,
        })
    }
}

impl<'s> Iterator for Directives<'s> {
    type Item = Directive<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(offset) = self.source[self.pos..].find(DIRECTIVE) {
            let start = self.pos + offset;
            if let Some(directive) = self.parse_at(start) {
                self.pos = directive.end;
                return Some(directive);
            }
            self.pos = start + DIRECTIVE.len();
        }
        self.pos = self.source.len();
        None
    }
}

fn skip_blanks(bytes: &[u8], mut i: usize) -> usize {
    while matches!(bytes.get(i), Some(b' ' | b'\t')) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn includes(pairs: &[(&str, &str)]) -> FxHashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn parses_name_and_quantity() {
        let src = "a\n#include <lights> [POINT_LIGHTS]\nb";
        let found: Vec<_> = Directives::new(src).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "lights");
        assert_eq!(found[0].quantity, Some("POINT_LIGHTS"));
        assert_eq!(&src[found[0].end..], "\nb");
    }

    #[test]
    fn quantity_must_be_on_the_same_line() {
        let src = "#include <a>\n[N]";
        let found: Vec<_> = Directives::new(src).collect();
        assert_eq!(found[0].quantity, None);
        assert_eq!(found[0].end, "#include <a>".len());
    }

    #[test]
    fn malformed_directive_is_left_alone() {
        let map = includes(&[]);
        let pre = Preprocessor::new(&map, "{i}");
        let out = pre
            .expand("#include lights\n", &ShaderDefines::new(), &mut Vec::new())
            .unwrap();
        assert_eq!(out, "#include lights\n");
    }

    #[test]
    fn zero_quantity_expands_to_nothing() {
        let map = includes(&[("c", "X")]);
        let pre = Preprocessor::new(&map, "{i}");
        let mut defines = ShaderDefines::new();
        defines.set("N", 0);
        let out = pre
            .expand("[#include <c> [N]]", &defines, &mut Vec::new())
            .unwrap();
        assert_eq!(out, "[]");
    }

    #[test]
    fn self_include_is_rejected() {
        let map = includes(&[("loop", "#include <loop>")]);
        let pre = Preprocessor::new(&map, "{i}");
        let err = pre
            .expand("#include <loop>", &ShaderDefines::new(), &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, KestrelError::IncludeCycle(name) if name == "loop"));
    }

    #[test]
    fn same_chunk_twice_is_not_a_cycle() {
        let map = includes(&[("c", "x")]);
        let pre = Preprocessor::new(&map, "{i}");
        let out = pre
            .expand("#include <c>#include <c>", &ShaderDefines::new(), &mut Vec::new())
            .unwrap();
        assert_eq!(out, "xx");
    }
}
