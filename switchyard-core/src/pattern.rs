//! Route template parsing and pattern compilation.
//!
//! A template such as `/users/{id}/posts/{slug:[a-z-]+}` is parsed into
//! literal and parameter segments. Parameters without a custom expression
//! match one path segment (`[^/]+`).
//!
//! All parametrized templates registered for one HTTP method are compiled
//! into a single alternation so a request path is tested with one regex
//! evaluation:
//!
//! ```text
//! ^(?:(?P<__r0>/users/(?P<__r0_0>[^/]+))|(?P<__r1>/posts/(?P<__r1_0>\d+)))$
//! ```
//!
//! The marker group `__r{i}` identifies which alternative matched; parameter
//! `j` of alternative `i` lives in group `__r{i}_{j}`. Group indices are
//! resolved once at compile time, so a match is decoded by index only and
//! custom expressions may contain groups of their own without shifting the
//! parameter positions.

use crate::Error;
use crate::logging::trace;
use regex::Regex;
use std::collections::HashMap;

/// Expression used for `{name}` tokens without a custom pattern
pub const DEFAULT_SEGMENT_PATTERN: &str = "[^/]+";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param {
        name: String,
        pattern: Option<String>,
        /// Token text as written in the template, braces included
        raw: String,
    },
}

/// A parsed route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    template: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parse a template, validating every parameter token.
    ///
    /// Fails with [`Error::MalformedRoutePattern`] on unbalanced braces,
    /// invalid or duplicate parameter names, and custom expressions that do
    /// not compile.
    ///
    /// A token ends at the first `}` that closes its opening brace; braces
    /// are counted without regard to character classes. A class containing a
    /// closing brace, as in `{id:[^}]+}`, therefore ends the token early and
    /// is reported as malformed. Write such classes with an escaped brace
    /// (`{id:[^\}]+}`).
    pub fn parse(template: &str) -> Result<Self, Error> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars();

        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    let token = read_token(template, &mut chars)?;
                    segments.push(parse_token(template, &token)?);
                }
                '}' => return Err(Error::malformed(template, "unexpected `}`")),
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        let pattern = Self {
            template: template.to_string(),
            segments,
        };

        let names = pattern.param_names();
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(Error::malformed(
                    template,
                    format!("duplicate parameter `{}`", name),
                ));
            }
        }

        Ok(pattern)
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// A template without parameter tokens
    pub fn is_static(&self) -> bool {
        self.segments
            .iter()
            .all(|segment| matches!(segment, Segment::Literal(_)))
    }

    /// Parameter names in declaration order
    pub fn param_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Param { name, .. } => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Whether `name` is exactly the name of one of the parameter tokens
    pub fn has_param(&self, name: &str) -> bool {
        self.param_names().contains(&name)
    }

    /// Regex source for this template with parameter `j` captured in the
    /// named group `{prefix}_{j}`. Not anchored.
    fn regex_source(&self, prefix: &str) -> String {
        let mut source = String::new();
        let mut index = 0;
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => source.push_str(&regex::escape(text)),
                Segment::Param { pattern, .. } => {
                    let pattern = pattern.as_deref().unwrap_or(DEFAULT_SEGMENT_PATTERN);
                    source.push_str(&format!("(?P<{}_{}>{})", prefix, index, pattern));
                    index += 1;
                }
            }
        }
        source
    }

    /// Substitute parameter tokens with the given values.
    ///
    /// Tokens without a value are left in place verbatim. Values are inserted
    /// as-is, without checking them against the token's expression.
    pub fn render(&self, values: &HashMap<&str, String>) -> String {
        let mut rendered = String::with_capacity(self.template.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Param { name, raw, .. } => match values.get(name.as_str()) {
                    Some(value) => rendered.push_str(value),
                    None => rendered.push_str(raw),
                },
            }
        }
        rendered
    }
}

/// Consume a token body up to its matching `}`; the opening `{` is already
/// consumed. Nested braces (`\d{4}`) are kept.
fn read_token(template: &str, chars: &mut std::str::Chars<'_>) -> Result<String, Error> {
    let mut token = String::new();
    let mut depth = 0usize;
    let mut escaped = false;

    for c in chars.by_ref() {
        if escaped {
            escaped = false;
            token.push(c);
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' if depth == 0 => return Ok(token),
            '}' => depth -= 1,
            _ => {}
        }
        token.push(c);
    }

    Err(Error::malformed(template, "unclosed parameter token"))
}

fn parse_token(template: &str, token: &str) -> Result<Segment, Error> {
    let (name, pattern) = match token.split_once(':') {
        Some((name, pattern)) => (name.trim(), Some(pattern)),
        None => (token.trim(), None),
    };

    let mut name_chars = name.chars();
    let valid_name = match name_chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && name_chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if !valid_name {
        return Err(Error::malformed(
            template,
            format!("invalid parameter name `{}`", name),
        ));
    }

    if let Some(pattern) = pattern {
        if pattern.is_empty() {
            return Err(Error::malformed(
                template,
                format!("empty pattern for parameter `{}`", name),
            ));
        }
        Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| {
            Error::malformed(
                template,
                format!("invalid pattern for parameter `{}`: {}", name, e),
            )
        })?;
    }

    Ok(Segment::Param {
        name: name.to_string(),
        pattern: pattern.map(str::to_string),
        raw: format!("{{{}}}", token),
    })
}

#[derive(Debug, Clone)]
struct Alternative {
    mark: String,
    marker_group: usize,
    /// (parameter name, capture group index), in declaration order
    param_groups: Vec<(String, usize)>,
}

/// The result of matching a path against a [`CompiledPattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch<'a> {
    /// Marker of the alternative that matched
    pub mark: &'a str,
    /// Captured parameter values in declaration order
    pub params: Vec<(String, String)>,
}

/// Several route patterns combined into one anchored alternation.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    alternatives: Vec<Alternative>,
}

impl CompiledPattern {
    /// Combine `patterns` in order. Earlier patterns win when several could
    /// match the same path.
    pub fn compile(patterns: &[&RoutePattern]) -> Result<Self, Error> {
        let marks: Vec<String> = (0..patterns.len()).map(|i| format!("__r{}", i)).collect();

        let branches: Vec<String> = patterns
            .iter()
            .zip(&marks)
            .map(|(pattern, mark)| format!("(?P<{}>{})", mark, pattern.regex_source(mark)))
            .collect();
        let source = format!("^(?:{})$", branches.join("|"));

        let templates = || {
            patterns
                .iter()
                .map(|p| p.template())
                .collect::<Vec<_>>()
                .join(" | ")
        };

        let regex =
            Regex::new(&source).map_err(|e| Error::malformed(&templates(), e.to_string()))?;

        let alternatives = {
            let groups: HashMap<&str, usize> = regex
                .capture_names()
                .enumerate()
                .filter_map(|(index, name)| name.map(|name| (name, index)))
                .collect();
            let group_index = |name: &str| {
                groups.get(name).copied().ok_or_else(|| {
                    Error::malformed(&templates(), format!("missing capture group `{}`", name))
                })
            };

            let mut alternatives = Vec::with_capacity(patterns.len());
            for (pattern, mark) in patterns.iter().zip(marks) {
                let param_groups = pattern
                    .param_names()
                    .into_iter()
                    .enumerate()
                    .map(|(j, name)| Ok((name.to_string(), group_index(&format!("{}_{}", mark, j))?)))
                    .collect::<Result<Vec<_>, Error>>()?;

                alternatives.push(Alternative {
                    marker_group: group_index(&mark)?,
                    mark,
                    param_groups,
                });
            }
            alternatives
        };

        trace!(
            alternatives = alternatives.len(),
            pattern = %source,
            "Compiled combined route pattern"
        );

        Ok(Self {
            regex,
            alternatives,
        })
    }

    /// Marker of the `index`-th combined pattern
    pub fn mark(&self, index: usize) -> Option<&str> {
        self.alternatives.get(index).map(|alt| alt.mark.as_str())
    }

    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    /// The combined regex source
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Match `path`, returning the matched alternative's marker and its
    /// parameter values. `None` when nothing matches or no marker group
    /// participated in the match.
    pub fn find(&self, path: &str) -> Option<PatternMatch<'_>> {
        let captures = self.regex.captures(path)?;
        let alternative = self
            .alternatives
            .iter()
            .find(|alt| captures.get(alt.marker_group).is_some())?;

        let params = alternative
            .param_groups
            .iter()
            .map(|(name, index)| {
                let value = captures
                    .get(*index)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                (name.clone(), value)
            })
            .collect();

        Some(PatternMatch {
            mark: &alternative.mark,
            params,
        })
    }
}
