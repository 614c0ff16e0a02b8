/*!
`list.rs`

Implements `gitlab-devtools list <subject> [GROUP]`.

Subjects:
  - groups : route group ids with their route counts
  - routes : route ids + names, optionally restricted to GROUP
  - route  : alias of `routes`

JSON Output Shape (routes):
{
  "status": "ok",
  "subject": "routes",
  "group": "users",
  "count": 2,
  "routes": [
    { "function": "get_user", "name": "...", "group": "users", "source": "...",
      "params": [ { "name": "id", "input": "text", "description": "User id" } ] }
  ]
}

`--legacy` prints the old `#function||name||p:kind:desc;` records used by
the form page instead; those records are not escaped.
*/

use anyhow::Result;
use clap::Args;

use crate::cmd::format::{Role, StyleOptions, TableOpts, box_header, color, emoji, table};
use crate::cmd::shared::output_error;
use crate::cmd::subject::Subject;
use crate::registry::{Registry, RouteDescriptor};

/// CLI arguments for `gitlab-devtools list <subject>`
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Subject to list (groups|routes|route)
    pub subject: Subject,

    /// Restrict routes to one group
    #[arg(value_name = "GROUP")]
    pub group: Option<String>,

    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,

    /// Delimiter-encoded route records (requires GROUP)
    #[arg(long, conflicts_with = "json")]
    pub legacy: bool,
}

/// Entry point for the list subcommand.
pub fn execute_list(args: ListArgs, registry: &Registry) -> Result<()> {
    match args.subject {
        Subject::Groups => list_groups(&args, registry),
        Subject::Routes | Subject::Route => list_routes(&args, registry),
    }
}

fn list_groups(args: &ListArgs, registry: &Registry) -> Result<()> {
    let groups: Vec<(&str, usize)> = registry
        .groups()
        .into_iter()
        .map(|g| (g, registry.routes_in(g).count()))
        .collect();

    if args.json {
        let items: Vec<_> = groups
            .iter()
            .map(|(g, n)| serde_json::json!({ "group": g, "routes": n }))
            .collect();
        println!(
            "{}",
            serde_json::json!({
                "status": "ok",
                "subject": args.subject.to_string(),
                "count": items.len(),
                "groups": items
            })
        );
        return Ok(());
    }

    let style = StyleOptions::detect();
    println!(
        "{}",
        box_header(
            format!("{} Groups ({})", emoji("list", &style), groups.len()),
            None::<&str>,
            &style
        )
    );
    let rows: Vec<Vec<String>> = groups
        .iter()
        .map(|(g, n)| vec![g.to_string(), n.to_string()])
        .collect();
    println!("{}", table(&["GROUP", "ROUTES"], &rows, TableOpts::default(), &style));
    Ok(())
}

fn list_routes(args: &ListArgs, registry: &Registry) -> Result<()> {
    let routes: Vec<&RouteDescriptor> = match args.group.as_deref() {
        Some(g) => registry.routes_in(g).collect(),
        None => registry.routes().iter().collect(),
    };

    if args.legacy {
        if args.group.is_none() {
            return output_error(false, "List Error", "--legacy requires a GROUP");
        }
        let records: String = routes.iter().map(|r| r.legacy_record()).collect();
        println!("{records}");
        return Ok(());
    }

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "status": "ok",
                "subject": "routes",
                "group": args.group,
                "count": routes.len(),
                "routes": routes
            })
        );
        return Ok(());
    }

    let style = StyleOptions::detect();
    let subtitle = args.group.as_ref().map(|g| format!("group={g}"));
    println!(
        "{}",
        box_header(
            format!("{} Routes ({})", emoji("list", &style), routes.len()),
            subtitle,
            &style
        )
    );

    if routes.is_empty() {
        println!(
            "{}",
            color(Role::Dim, format!("{} (none)", emoji("info", &style)), &style)
        );
        return Ok(());
    }

    let rows: Vec<Vec<String>> = routes
        .iter()
        .enumerate()
        .map(|(idx, r)| {
            let params = if r.params.is_empty() {
                "-".to_string()
            } else {
                r.params
                    .iter()
                    .map(|p| p.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            vec![
                (idx + 1).to_string(),
                r.group.clone(),
                r.function.clone(),
                r.name.clone(),
                params,
            ]
        })
        .collect();
    println!(
        "{}",
        table(
            &["#", "GROUP", "FUNCTION", "NAME", "PARAMS"],
            &rows,
            TableOpts::default(),
            &style
        )
    );
    println!(
        "\n{} {}",
        emoji("info", &style),
        color(
            Role::Dim,
            "Use `gitlab-devtools get route <group> <function>` for parameter details",
            &style
        )
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        cmd: TestSub,
    }

    #[derive(clap::Subcommand, Debug)]
    enum TestSub {
        List(ListArgs),
    }

    #[test]
    fn clap_parses_list_routes_with_group() {
        let cli = TestCli::try_parse_from(["t", "list", "routes", "users", "--json"]).unwrap();
        let TestSub::List(a) = cli.cmd;
        assert_eq!(a.subject, Subject::Routes);
        assert_eq!(a.group.as_deref(), Some("users"));
        assert!(a.json);
    }

    #[test]
    fn legacy_conflicts_with_json() {
        assert!(TestCli::try_parse_from(["t", "list", "routes", "g", "--json", "--legacy"]).is_err());
    }

    #[test]
    fn legacy_without_group_is_an_error() {
        let registry = crate::registry::catalog::builtin();
        let args = ListArgs {
            subject: Subject::Routes,
            group: None,
            json: false,
            legacy: true,
        };
        assert!(execute_list(args, &registry).is_err());
    }
}
