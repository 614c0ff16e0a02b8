/*!
Subject enum for the `list` / `get` subcommands.

Variants:
  groups  (route groups)
  routes  (every route, optionally within one group)
  route   (a single route)
*/

use std::fmt;

/// What a `list` or `get` command talks about.
#[derive(clap::ValueEnum, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Subject {
    /// Route groups
    Groups,
    /// Routes (all, or of one group)
    Routes,
    /// A single route
    Route,
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Subject::Groups => "groups",
            Subject::Routes => "routes",
            Subject::Route => "route",
        };
        f.write_str(s)
    }
}
