//! Path template compilation.
//!
//! Route templates such as `/users/:id/posts` are compiled into anchored regular
//! expressions. Each `:name` segment becomes a single-segment capture class and its
//! position in the template (split on `/`) is recorded so the raw value can be picked
//! out of the matched path later.
//!
//! Group prefixes go through the same compiler but are only anchored at the start and
//! must end on a segment boundary, so a group mounted at `/account` never swallows
//! `/accountancy`.

use regex::Regex;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::sync::Arc;

/// Character that introduces a variable segment in a template (`/users/:id`).
pub const VARIABLE_MARKER: char = ':';

/// Regex class a variable segment accepts: letters, digits, hyphen and period.
pub const VARIABLE_CLASS: &str = "[A-Za-z0-9.-]+";

/// Most templates declare ≤4 variables; 8 keeps the common case off the heap.
pub const MAX_INLINE_VARIABLES: usize = 8;

/// Variable name → zero-based segment index within the owning template.
pub type VariableIndexVec = SmallVec<[(Arc<str>, usize); MAX_INLINE_VARIABLES]>;

/// Raw `(name, value)` pairs picked out of a path fragment.
pub type RawBindings<'s, 'p> = SmallVec<[(&'s str, &'p str); MAX_INLINE_VARIABLES]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    /// Must match the whole path.
    Exact,
    /// Must match a leading run of whole segments.
    Prefix,
}

/// A compiled route template or group prefix.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Regex,
    variables: VariableIndexVec,
    anchor: Anchor,
}

impl PathPattern {
    /// Compile a route template into a fully anchored matcher.
    ///
    /// `/` (and the empty template) only accepts the root path, which is either `/` or the
    /// empty remainder left once an enclosing group prefix has been stripped.
    #[must_use]
    pub fn route(template: &str) -> Self {
        let normalized = normalize(template);
        let mut variables = VariableIndexVec::new();

        let pattern = if normalized == "/" {
            String::from("^/?$")
        } else {
            let body = compile_segments(&normalized, &mut variables);
            let mut pattern = String::with_capacity(body.len() + 2);
            pattern.push('^');
            pattern.push_str(&body);
            pattern.push('$');
            pattern
        };

        Self {
            source: template.to_owned(),
            regex: build_regex(&pattern),
            variables,
            anchor: Anchor::Exact,
        }
    }

    /// Compile a group prefix into a matcher that stops at a segment boundary.
    ///
    /// A trailing `/` is ignored, so `/api` and `/api/` behave the same.
    #[must_use]
    pub fn prefix(prefix: &str) -> Self {
        let normalized = normalize(prefix);
        let trimmed = normalized.trim_end_matches('/');
        let mut variables = VariableIndexVec::new();
        let body = compile_segments(trimmed, &mut variables);

        let mut pattern = String::with_capacity(body.len() + 12);
        pattern.push_str("^(");
        pattern.push_str(&body);
        pattern.push_str(")(?:/|$)");

        Self {
            source: prefix.to_owned(),
            regex: build_regex(&pattern),
            variables,
            anchor: Anchor::Prefix,
        }
    }

    /// The template or prefix exactly as it was registered.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The generated regular expression, mostly useful when debugging a route table.
    #[must_use]
    pub fn as_regex(&self) -> &Regex {
        &self.regex
    }

    /// Declared variables with their segment index, in first-declaration order.
    #[must_use]
    pub fn variables(&self) -> &[(Arc<str>, usize)] {
        &self.variables
    }

    #[must_use]
    pub fn has_variables(&self) -> bool {
        !self.variables.is_empty()
    }

    /// Segment index recorded for `name`, if the template declares it.
    #[must_use]
    pub fn variable_index(&self, name: &str) -> Option<usize> {
        self.variables
            .iter()
            .find(|(n, _)| n.as_ref() == name)
            .map(|(_, index)| *index)
    }

    /// Whether `path` is accepted: the whole path for routes, a leading run of segments
    /// for prefixes.
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        match self.anchor {
            Anchor::Exact => self.regex.is_match(path),
            Anchor::Prefix => self.match_prefix(path).is_some(),
        }
    }

    /// Number of bytes of `path` consumed by this pattern.
    ///
    /// For a prefix this is the length of the matched segments, excluding the boundary
    /// `/`, so `&path[consumed..]` is either empty or starts with `/`.
    #[must_use]
    pub fn match_prefix(&self, path: &str) -> Option<usize> {
        match self.anchor {
            Anchor::Exact => self.regex.is_match(path).then_some(path.len()),
            Anchor::Prefix => self
                .regex
                .captures(path)
                .and_then(|caps| caps.get(1))
                .map(|m| m.end()),
        }
    }

    /// Pick the raw value of every declared variable out of `fragment`.
    ///
    /// `fragment` must be the same path fragment this pattern was matched against, since
    /// indices are relative to the start of the template.
    #[must_use]
    pub fn bind<'s, 'p>(&'s self, fragment: &'p str) -> RawBindings<'s, 'p> {
        if self.variables.is_empty() {
            return RawBindings::new();
        }
        let segments: SmallVec<[&str; 16]> = fragment.split('/').collect();
        self.variables
            .iter()
            .filter_map(|(name, index)| segments.get(*index).map(|raw| (name.as_ref(), *raw)))
            .collect()
    }
}

fn normalize(template: &str) -> Cow<'_, str> {
    if template.starts_with('/') {
        Cow::Borrowed(template)
    } else {
        Cow::Owned(format!("/{template}"))
    }
}

/// Emit one `/fragment` per non-empty segment. Empty segments still advance the index
/// because bindings are later taken from a raw `split('/')` of the incoming path.
fn compile_segments(template: &str, variables: &mut VariableIndexVec) -> String {
    let mut pattern = String::with_capacity(template.len() + 8);
    for (index, segment) in template.split('/').enumerate() {
        if segment.is_empty() {
            continue;
        }
        pattern.push('/');
        match segment.strip_prefix(VARIABLE_MARKER) {
            Some(name) => {
                pattern.push_str(VARIABLE_CLASS);
                record_variable(variables, name, index);
            }
            None => pattern.push_str(&regex::escape(segment)),
        }
    }
    pattern
}

// Last declaration wins for duplicate names.
fn record_variable(variables: &mut VariableIndexVec, name: &str, index: usize) {
    match variables.iter_mut().find(|(n, _)| n.as_ref() == name) {
        Some(existing) => existing.1 = index,
        None => variables.push((Arc::from(name), index)),
    }
}

#[allow(clippy::expect_used)]
fn build_regex(pattern: &str) -> Regex {
    // Literal segments are escaped and variables use a fixed class, so the expression is
    // always well formed.
    Regex::new(pattern).expect("Failed to compile path regex")
}
