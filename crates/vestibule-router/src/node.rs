//! Radix tree nodes.

use http::Method;

use crate::error::RouteError;
use crate::method_router::MethodRouter;
use crate::params::Params;

/// Kind of a path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Literal segment such as `customers`.
    Static,
    /// Named parameter such as `{id}`.
    Param(String),
    /// Catch-all such as `*path`; only valid as the last segment.
    Wildcard(String),
}

/// A node of the radix tree.
#[derive(Debug, Clone)]
pub struct Node<T> {
    /// Segment text as written in the pattern.
    pub segment: String,
    /// Segment kind.
    pub kind: SegmentKind,
    /// Methods registered for the path ending at this node.
    pub methods: Option<MethodRouter<T>>,
    /// Static children, sorted by segment for binary search.
    pub static_children: Vec<Node<T>>,
    /// At most one parameter child.
    pub param_child: Option<Box<Node<T>>>,
    /// At most one wildcard child.
    pub wildcard_child: Option<Box<Node<T>>>,
}

/// Returns true if `path` contains a `{name}` placeholder.
///
/// ```rust
/// assert!(vestibule_router::has_placeholder("/bills/{num}/items"));
/// ```
#[must_use]
pub fn has_placeholder(path: &str) -> bool {
    path.split('/')
        .any(|s| s.len() > 2 && s.starts_with('{') && s.ends_with('}'))
}

impl<T> Node<T> {
    fn with_kind(segment: String, kind: SegmentKind) -> Self {
        Self {
            segment,
            kind,
            methods: None,
            static_children: Vec::new(),
            param_child: None,
            wildcard_child: None,
        }
    }

    /// Creates the root node.
    #[must_use]
    pub fn root() -> Self {
        Self::with_kind(String::new(), SegmentKind::Static)
    }

    /// Inserts `value` for `method` under the path `pattern`.
    pub fn insert(&mut self, method: &Method, pattern: &str, value: T) -> Result<(), RouteError> {
        let segments = parse_pattern(pattern)?;
        let leaf = self.descend_or_create(pattern, &segments)?;
        let methods = leaf.methods.get_or_insert_with(MethodRouter::new);
        methods
            .insert(method.clone(), value)
            .map_err(|_| RouteError::Duplicate {
                method: method.to_string(),
                pattern: pattern.to_string(),
            })
    }

    fn descend_or_create(
        &mut self,
        pattern: &str,
        segments: &[(String, SegmentKind)],
    ) -> Result<&mut Self, RouteError> {
        let Some(((segment, kind), rest)) = segments.split_first() else {
            return Ok(self);
        };

        let child = match kind {
            SegmentKind::Static => {
                let idx = match self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(segment.as_str()))
                {
                    Ok(idx) => idx,
                    Err(idx) => {
                        self.static_children
                            .insert(idx, Self::with_kind(segment.clone(), SegmentKind::Static));
                        idx
                    }
                };
                &mut self.static_children[idx]
            }
            SegmentKind::Param(name) => {
                let child = self.param_child.get_or_insert_with(|| {
                    Box::new(Self::with_kind(segment.clone(), kind.clone()))
                });
                if let SegmentKind::Param(existing) = &child.kind {
                    if existing != name {
                        return Err(RouteError::ParamConflict {
                            pattern: pattern.to_string(),
                            name: name.clone(),
                            existing: existing.clone(),
                        });
                    }
                }
                child.as_mut()
            }
            SegmentKind::Wildcard(name) => {
                let child = self.wildcard_child.get_or_insert_with(|| {
                    Box::new(Self::with_kind(segment.clone(), kind.clone()))
                });
                if let SegmentKind::Wildcard(existing) = &child.kind {
                    if existing != name {
                        return Err(RouteError::ParamConflict {
                            pattern: pattern.to_string(),
                            name: name.clone(),
                            existing: existing.clone(),
                        });
                    }
                }
                child.as_mut()
            }
        };

        child.descend_or_create(pattern, rest)
    }

    /// Matches a concrete request path.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter<T>, Params)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Params::new();
        let methods = self.match_segments(&segments, &mut params)?;
        Some((methods, params))
    }

    fn match_segments<'a>(
        &'a self,
        segments: &[&str],
        params: &mut Params,
    ) -> Option<&'a MethodRouter<T>> {
        let Some((segment, rest)) = segments.split_first() else {
            return self.methods.as_ref();
        };

        if let Ok(idx) = self
            .static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
        {
            if let Some(found) = self.static_children[idx].match_segments(rest, params) {
                return Some(found);
            }
        }

        if let Some(child) = &self.param_child {
            if let SegmentKind::Param(name) = &child.kind {
                let mark = params.len();
                params.push(name.clone(), (*segment).to_string());
                if let Some(found) = child.match_segments(rest, params) {
                    return Some(found);
                }
                params.truncate(mark);
            }
        }

        if let Some(child) = &self.wildcard_child {
            if let SegmentKind::Wildcard(name) = &child.kind {
                if let Some(methods) = &child.methods {
                    params.push(name.clone(), segments.join("/"));
                    return Some(methods);
                }
            }
        }

        None
    }
}

fn parse_pattern(pattern: &str) -> Result<Vec<(String, SegmentKind)>, RouteError> {
    if !pattern.starts_with('/') {
        return Err(RouteError::invalid(pattern, "must start with '/'"));
    }

    let raw: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let mut segments = Vec::with_capacity(raw.len());

    for (i, s) in raw.iter().enumerate() {
        let kind = if let Some(inner) = s.strip_prefix('{') {
            let name = inner
                .strip_suffix('}')
                .ok_or_else(|| RouteError::invalid(pattern, format!("unclosed parameter {s}")))?;
            if name.is_empty() || name.contains(['{', '}']) {
                return Err(RouteError::invalid(pattern, format!("bad parameter name {s}")));
            }
            SegmentKind::Param(name.to_string())
        } else if let Some(name) = s.strip_prefix('*') {
            if i + 1 != raw.len() {
                return Err(RouteError::invalid(pattern, "wildcard must be the last segment"));
            }
            if name.is_empty() {
                return Err(RouteError::invalid(pattern, "wildcard needs a name"));
            }
            SegmentKind::Wildcard(name.to_string())
        } else if s.contains(['{', '}']) {
            return Err(RouteError::invalid(
                pattern,
                format!("parameter must span the whole segment: {s}"),
            ));
        } else {
            SegmentKind::Static
        };
        segments.push(((*s).to_string(), kind));
    }

    Ok(segments)
}
