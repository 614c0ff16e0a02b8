//! Route registry and dispatch.
//!
//! A route is declared once at startup as a [`RouteDescriptor`]: function id,
//! source label, human name, owning group and an ordered parameter schema.
//! Targets are mounted separately as plain function pointers keyed by
//! (group, function), so a route can exist without a target and dispatch
//! then fails loudly.
//!
//! Per request the caller takes an [`Invocation`] from a descriptor, binds
//! named values into its slots (first schema entry with that name wins) and
//! hands it to [`Registry::invoke`], which calls the target with the slots
//! in declared order.

pub mod catalog;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::gitlab::{GitLab, Response, TransportError};

/// Input widget used to collect a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Password,
    Number,
    Textarea,
    Checkbox,
}

impl InputKind {
    /// Unknown kinds fall back to `Text`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "password" => InputKind::Password,
            "number" => InputKind::Number,
            "textarea" => InputKind::Textarea,
            "checkbox" => InputKind::Checkbox,
            _ => InputKind::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Password => "password",
            InputKind::Number => "number",
            InputKind::Textarea => "textarea",
            InputKind::Checkbox => "checkbox",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamSpec {
    pub name: String,
    pub input: InputKind,
    pub description: String,
}

impl ParamSpec {
    /// Build from the `"name:kind"` pair form, e.g. `"password:password"`.
    pub fn from_pair(pair: &str, description: &str) -> Self {
        let (name, kind) = pair.split_once(':').unwrap_or((pair, "text"));
        ParamSpec {
            name: name.trim().to_string(),
            input: InputKind::parse(kind),
            description: description.to_string(),
        }
    }

    /// Description for prompts, or the name when there is none.
    pub fn label(&self) -> &str {
        if self.description.is_empty() {
            &self.name
        } else {
            &self.description
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDescriptor {
    pub function: String,
    pub source: String,
    pub name: String,
    pub group: String,
    pub params: Vec<ParamSpec>,
}

impl RouteDescriptor {
    /// Append one parameter to the schema.
    pub fn declare_param(&mut self, pair: &str, description: &str) -> &mut Self {
        self.params.push(ParamSpec::from_pair(pair, description));
        self
    }

    /// `source: group::function`
    pub fn located(&self) -> String {
        format!("{}: {}::{}", self.source, self.group, self.function)
    }

    /// Fresh value slots, one per declared parameter, all empty.
    pub fn invocation(&self) -> Invocation<'_> {
        Invocation {
            route: self,
            slots: vec![None; self.params.len()],
        }
    }

    /// Old `#function||name||p:kind:desc;` record consumed by the form page.
    /// Delimiters inside names or descriptions are not escaped.
    pub fn legacy_record(&self) -> String {
        let params: String = self
            .params
            .iter()
            .map(|p| format!("{}:{}:{};", p.name, p.input, p.description))
            .collect();
        format!("#{}||{}||{}", self.function, self.name, params)
    }
}

/// Shown in place of every password value, whatever its length.
const SECRET_MASK: &str = "********";

/// Result of binding one named value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Slot(usize),
    Unmatched,
}

/// One pending call: a route plus its value slots.
#[derive(Debug, Clone)]
pub struct Invocation<'r> {
    route: &'r RouteDescriptor,
    slots: Vec<Option<String>>,
}

impl<'r> Invocation<'r> {
    /// Write `value` into the slot of the first parameter called `name`.
    pub fn bind(&mut self, name: &str, value: impl Into<String>) -> Binding {
        match self.route.params.iter().position(|p| p.name == name) {
            Some(idx) => {
                self.slots[idx] = Some(value.into());
                Binding::Slot(idx)
            }
            None => Binding::Unmatched,
        }
    }

    /// Bound value of the first parameter called `name`.
    pub fn value(&self, name: &str) -> Option<&str> {
        let idx = self.route.params.iter().position(|p| p.name == name)?;
        self.slots[idx].as_deref()
    }

    pub fn slots(&self) -> &[Option<String>] {
        &self.slots
    }

    /// Declared parameters that have not received a value.
    pub fn unbound(&self) -> impl Iterator<Item = &'r ParamSpec> + '_ {
        self.route
            .params
            .iter()
            .zip(&self.slots)
            .filter(|(_, v)| v.is_none())
            .map(|(p, _)| p)
    }

    /// Bound values by name, secrets masked, for display.
    pub fn arguments(&self) -> serde_json::Map<String, serde_json::Value> {
        self.route
            .params
            .iter()
            .zip(&self.slots)
            .filter_map(|(p, v)| {
                let v = v.as_deref()?;
                let shown = match p.input {
                    InputKind::Password => SECRET_MASK.to_string(),
                    _ => v.to_string(),
                };
                Some((p.name.clone(), serde_json::Value::String(shown)))
            })
            .collect()
    }
}

/// Positional view over bound slots handed to a target.
pub struct Args<'a> {
    slots: &'a [Option<String>],
}

impl<'a> Args<'a> {
    pub fn new(slots: &'a [Option<String>]) -> Self {
        Args { slots }
    }

    /// Value of slot `idx`; `None` when unbound or out of range.
    pub fn get(&self, idx: usize) -> Option<&'a str> {
        self.slots.get(idx).and_then(|v| v.as_deref())
    }
}

/// Target signature: client plus positional arguments.
pub type Handler = fn(&GitLab, &Args<'_>) -> Result<Response, TransportError>;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("route group '{0}' does not exist")]
    UnknownGroup(String),
    #[error("function '{function}' does not exist in group '{group}'")]
    UnknownFunction { group: String, function: String },
    #[error("no route '{function}' registered in group '{group}'")]
    RouteNotFound { group: String, function: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Default)]
pub struct Registry {
    routes: Vec<RouteDescriptor>,
    targets: BTreeMap<String, BTreeMap<String, Handler>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route. Duplicates are kept; lookups return the first.
    pub fn register(
        &mut self,
        group: &str,
        function: &str,
        source: &str,
        name: &str,
    ) -> &mut RouteDescriptor {
        self.routes.push(RouteDescriptor {
            function: function.to_string(),
            source: source.to_string(),
            name: name.to_string(),
            group: group.to_string(),
            params: Vec::new(),
        });
        let last = self.routes.len() - 1;
        &mut self.routes[last]
    }

    /// Install (or replace) the target for (group, function).
    pub fn mount(&mut self, group: &str, function: &str, handler: Handler) {
        self.targets
            .entry(group.to_string())
            .or_default()
            .insert(function.to_string(), handler);
    }

    /// First route matching both ids, in registration order.
    pub fn resolve(&self, group: &str, function: &str) -> Option<&RouteDescriptor> {
        self.routes
            .iter()
            .find(|r| r.group == group && r.function == function)
    }

    /// [`resolve`](Self::resolve) with an explicit not-found error.
    pub fn require(&self, group: &str, function: &str) -> Result<&RouteDescriptor, DispatchError> {
        self.resolve(group, function)
            .ok_or_else(|| DispatchError::RouteNotFound {
                group: group.to_string(),
                function: function.to_string(),
            })
    }

    /// Call the mounted target with the invocation's slots in declared order.
    pub fn invoke(&self, call: Invocation<'_>, api: &GitLab) -> Result<Response, DispatchError> {
        let route = call.route;
        let group = self
            .targets
            .get(&route.group)
            .ok_or_else(|| DispatchError::UnknownGroup(route.group.clone()))?;
        let handler = group
            .get(&route.function)
            .ok_or_else(|| DispatchError::UnknownFunction {
                group: route.group.clone(),
                function: route.function.clone(),
            })?;
        tracing::debug!(route = %route.located(), "invoking");
        Ok(handler(api, &Args::new(call.slots()))?)
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    /// Distinct group ids in first-registration order.
    pub fn groups(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for r in &self.routes {
            if !seen.contains(&r.group.as_str()) {
                seen.push(&r.group);
            }
        }
        seen
    }

    pub fn routes_in<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a RouteDescriptor> {
        self.routes.iter().filter(move |r| r.group == group)
    }
}
