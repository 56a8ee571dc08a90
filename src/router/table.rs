//! Ordered route table and the resolution walk.
//!
//! Entries are searched in registration order and the first matching route wins; there is
//! no specificity ranking. A group whose prefix matches but that contains no matching
//! child does not end the search, so routes registered after the group stay reachable.

use smallvec::SmallVec;
use tracing::trace;

use super::group::RouteGroup;
use super::pattern::{PathPattern, RawBindings};
use super::route::Route;

/// An entry of a route table: a route or a nested group.
#[derive(Debug)]
pub enum Matchable {
    Route(Route),
    Group(RouteGroup),
}

impl Matchable {
    #[must_use]
    pub fn matches_path(&self, path: &str) -> bool {
        match self {
            Matchable::Route(route) => route.matches_path(path),
            Matchable::Group(group) => group.matches_path(path),
        }
    }
}

#[allow(clippy::unreachable)]
pub(crate) fn push_route(entries: &mut Vec<Matchable>, route: Route) -> &mut Route {
    entries.push(Matchable::Route(route));
    match entries.last_mut() {
        Some(Matchable::Route(route)) => route,
        _ => unreachable!("a route was just pushed"),
    }
}

#[allow(clippy::unreachable)]
pub(crate) fn push_group(entries: &mut Vec<Matchable>, group: RouteGroup) -> &mut RouteGroup {
    entries.push(Matchable::Group(group));
    match entries.last_mut() {
        Some(Matchable::Group(group)) => group,
        _ => unreachable!("a group was just pushed"),
    }
}

/// Group nesting rarely goes past a few levels.
type ScopeVec<'r, 'p> = SmallVec<[(&'r PathPattern, &'p str); 4]>;

/// A resolved route plus every pattern on the way to it, each paired with the path
/// fragment it was matched against.
#[derive(Debug)]
pub struct RouteMatch<'r, 'p> {
    route: &'r Route,
    scopes: ScopeVec<'r, 'p>,
}

impl<'r, 'p> RouteMatch<'r, 'p> {
    #[must_use]
    pub fn route(&self) -> &'r Route {
        self.route
    }

    /// Whether any pattern on the path (group prefixes or the route) declares variables.
    #[must_use]
    pub fn has_variables(&self) -> bool {
        self.scopes.iter().any(|(pattern, _)| pattern.has_variables())
    }

    /// Raw `(name, value)` pairs, outermost group first. Later (inner) bindings shadow
    /// earlier ones of the same name when stored.
    #[must_use]
    pub fn raw_variables(&self) -> RawBindings<'r, 'p> {
        let mut bindings = RawBindings::new();
        for &(pattern, fragment) in &self.scopes {
            bindings.extend(pattern.bind(fragment));
        }
        bindings
    }

    /// The remaining path the route's own template matched.
    #[must_use]
    pub fn route_fragment(&self) -> &'p str {
        self.scopes.last().map_or("", |(_, fragment)| *fragment)
    }
}

/// Find the first route accepting `path`, descending into matching groups.
#[must_use]
pub fn resolve<'r, 'p>(entries: &'r [Matchable], path: &'p str) -> Option<RouteMatch<'r, 'p>> {
    let mut scopes = ScopeVec::new();
    search(entries, path, &mut scopes).map(|route| RouteMatch { route, scopes })
}

fn search<'r, 'p>(
    entries: &'r [Matchable],
    path: &'p str,
    scopes: &mut ScopeVec<'r, 'p>,
) -> Option<&'r Route> {
    for entry in entries {
        match entry {
            Matchable::Route(route) => {
                if route.matches_path(path) {
                    scopes.push((route.pattern(), path));
                    return Some(route);
                }
            }
            Matchable::Group(group) => {
                let Some(consumed) = group.pattern().match_prefix(path) else {
                    continue;
                };
                let depth = scopes.len();
                scopes.push((group.pattern(), path));
                if let Some(route) = search(group.children(), &path[consumed..], scopes) {
                    return Some(route);
                }
                trace!(
                    prefix = %group.prefix(),
                    path = %path,
                    "Group matched without a matching child"
                );
                scopes.truncate(depth);
            }
        }
    }
    None
}
