/*!
`get.rs`

Implements `gitlab-devtools get <subject> [GROUP] [FUNCTION]`.

Subjects:
  - route  : one route with its parameter table; when FUNCTION is omitted
             the routes of GROUP are offered for interactive selection
  - routes : every route (or every route of GROUP) with parameters
  - groups : each group with the functions it exposes

Human output: boxed header with the located label
(`source: group::function`) and a NAME | KIND | DESCRIPTION table.

JSON Output Shapes:

1) get route users get_user
{
  "status": "ok",
  "subject": "route",
  "located": "src/gitlab/users.rs: users::get_user",
  "route": { "function": "get_user", "name": "...", "group": "users",
             "source": "...", "params": [ ... ] }
}

2) get routes [GROUP]
{ "status": "ok", "subject": "routes", "group": null, "count": 38, "routes": [ ... ] }

3) get groups
{ "status": "ok", "subject": "groups", "count": 7,
  "groups": [ { "group": "users", "functions": ["list_users", ...] } ] }
*/

use anyhow::{Context, Result};
use clap::Args;
use std::io::{self, BufRead, Write};

use crate::cmd::format::{Role, StyleOptions, TableOpts, box_header, color, emoji, table};
use crate::cmd::shared::output_error;
use crate::cmd::subject::Subject;
use crate::registry::{Registry, RouteDescriptor};

/// CLI arguments for `gitlab-devtools get <subject> [GROUP] [FUNCTION]`
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Subject (route|routes|groups)
    pub subject: Subject,

    /// Route group (required for `route`)
    #[arg(value_name = "GROUP")]
    pub group: Option<String>,

    /// Function id. If omitted for `route`, interactive selection is offered.
    #[arg(value_name = "FUNCTION")]
    pub function: Option<String>,

    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,
}

/// Entrypoint for `get` subcommand.
pub fn execute_get(args: GetArgs, registry: &Registry) -> Result<()> {
    match args.subject {
        Subject::Route => get_single_route(&args, registry),
        Subject::Routes => get_all_routes(&args, registry),
        Subject::Groups => get_groups(&args, registry),
    }
}

fn get_single_route(args: &GetArgs, registry: &Registry) -> Result<()> {
    let Some(group) = args.group.as_deref() else {
        return output_error(args.json, "Get Error", "GROUP is required for `get route`");
    };

    let function = match args.function.as_deref() {
        Some(f) => f.to_string(),
        None => {
            let names: Vec<&str> = registry
                .routes_in(group)
                .map(|r| r.function.as_str())
                .collect();
            if names.is_empty() {
                return output_error(
                    args.json,
                    "Get Error",
                    &format!("route group '{group}' has no routes"),
                );
            }
            if args.json {
                return output_error(args.json, "Get Error", "FUNCTION is required with --json");
            }
            let stdin = io::stdin();
            select_function(&names, &mut stdin.lock(), &mut io::stdout())?
        }
    };

    let route = match registry.require(group, &function) {
        Ok(r) => r,
        Err(e) => return output_error(args.json, "Get Error", &e.to_string()),
    };

    if args.json {
        let out = serde_json::json!({
            "status": "ok",
            "subject": "route",
            "located": route.located(),
            "route": route,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string())
        );
        return Ok(());
    }

    let style = StyleOptions::detect();
    print_route(route, &style);
    Ok(())
}

fn get_all_routes(args: &GetArgs, registry: &Registry) -> Result<()> {
    let routes: Vec<&RouteDescriptor> = match args.group.as_deref() {
        Some(g) => registry.routes_in(g).collect(),
        None => registry.routes().iter().collect(),
    };

    if args.json {
        let out = serde_json::json!({
            "status": "ok",
            "subject": "routes",
            "group": args.group,
            "count": routes.len(),
            "routes": routes,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string())
        );
        return Ok(());
    }

    let style = StyleOptions::detect();
    if routes.is_empty() {
        println!(
            "{}",
            color(Role::Dim, format!("{} No routes", emoji("info", &style)), &style)
        );
        return Ok(());
    }
    for (i, route) in routes.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_route(route, &style);
    }
    Ok(())
}

fn get_groups(args: &GetArgs, registry: &Registry) -> Result<()> {
    let groups: Vec<(&str, Vec<&str>)> = registry
        .groups()
        .into_iter()
        .filter(|g| args.group.as_deref().is_none_or(|want| want == *g))
        .map(|g| {
            let functions = registry.routes_in(g).map(|r| r.function.as_str()).collect();
            (g, functions)
        })
        .collect();

    if args.json {
        let items: Vec<_> = groups
            .iter()
            .map(|(g, f)| serde_json::json!({ "group": g, "functions": f }))
            .collect();
        println!(
            "{}",
            serde_json::json!({
                "status": "ok",
                "subject": "groups",
                "count": items.len(),
                "groups": items,
            })
        );
        return Ok(());
    }

    let style = StyleOptions::detect();
    let rows: Vec<Vec<String>> = groups
        .iter()
        .map(|(g, f)| vec![g.to_string(), f.join(", ")])
        .collect();
    println!(
        "{}",
        box_header(
            format!("{} Groups ({})", emoji("list", &style), rows.len()),
            None::<&str>,
            &style
        )
    );
    println!(
        "{}",
        table(&["GROUP", "FUNCTIONS"], &rows, TableOpts::default(), &style)
    );
    Ok(())
}

fn print_route(route: &RouteDescriptor, style: &StyleOptions) {
    println!(
        "{}",
        box_header(
            format!("{} {}", emoji("route", style), route.name),
            Some(route.located()),
            style
        )
    );
    if route.params.is_empty() {
        println!(
            "{}",
            color(Role::Dim, format!("{} No parameters", emoji("info", style)), style)
        );
        return;
    }
    let rows: Vec<Vec<String>> = route
        .params
        .iter()
        .map(|p| vec![p.name.clone(), p.input.to_string(), p.description.clone()])
        .collect();
    println!(
        "{}",
        table(&["NAME", "KIND", "DESCRIPTION"], &rows, TableOpts::default(), style)
    );
}

/// Numbered menu; accepts an index or a function id typed verbatim.
fn select_function<R: BufRead, W: Write>(
    names: &[&str],
    input: &mut R,
    out: &mut W,
) -> Result<String> {
    writeln!(out, "Select a function:")?;
    for (i, n) in names.iter().enumerate() {
        writeln!(out, "  [{}] {}", i + 1, n)?;
    }
    write!(out, "Enter number (1-{}): ", names.len())?;
    out.flush()?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("failed to read selection")?;
    let trimmed = line.trim();
    if let Ok(idx) = trimmed.parse::<usize>()
        && (1..=names.len()).contains(&idx)
    {
        return Ok(names[idx - 1].to_string());
    }
    if trimmed.is_empty() {
        anyhow::bail!("invalid selection");
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Cursor;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        cmd: TestSub,
    }

    #[derive(clap::Subcommand, Debug)]
    enum TestSub {
        Get(GetArgs),
    }

    #[test]
    fn clap_parses_route_lookup() {
        let cli = TestCli::try_parse_from(["t", "get", "route", "users", "get_user", "--json"])
            .unwrap();
        let TestSub::Get(a) = cli.cmd;
        assert_eq!(a.subject, Subject::Route);
        assert_eq!(a.group.as_deref(), Some("users"));
        assert_eq!(a.function.as_deref(), Some("get_user"));
    }

    #[test]
    fn select_by_number_or_name() {
        let names = ["list_users", "get_user"];
        let mut sink = Vec::new();
        let picked = select_function(&names, &mut Cursor::new("2\n"), &mut sink).unwrap();
        assert_eq!(picked, "get_user");
        let picked = select_function(&names, &mut Cursor::new("find_users\n"), &mut sink).unwrap();
        assert_eq!(picked, "find_users");
        let menu = String::from_utf8(sink).unwrap();
        assert!(menu.contains("[1] list_users"));
    }

    #[test]
    fn select_rejects_blank_and_out_of_range_falls_back_to_text() {
        let names = ["a"];
        let mut sink = Vec::new();
        assert!(select_function(&names, &mut Cursor::new("\n"), &mut sink).is_err());
        let picked = select_function(&names, &mut Cursor::new("9\n"), &mut sink).unwrap();
        assert_eq!(picked, "9");
    }

    #[test]
    fn missing_route_is_reported() {
        let registry = crate::registry::catalog::builtin();
        let args = GetArgs {
            subject: Subject::Route,
            group: Some("users".into()),
            function: Some("nope".into()),
            json: true,
        };
        let err = execute_get(args, &registry).unwrap_err().to_string();
        assert!(err.contains("nope"));
    }

    #[test]
    fn route_without_group_is_an_error() {
        let registry = crate::registry::catalog::builtin();
        let args = GetArgs {
            subject: Subject::Route,
            group: None,
            function: None,
            json: true,
        };
        assert!(execute_get(args, &registry).is_err());
    }
}
