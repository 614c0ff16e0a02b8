/*!
`exec.rs`

Implements `gitlab-devtools exec GROUP FUNCTION`, which runs one registered
route against the configured GitLab server.

Parameter sources (merged in this order; first value for a key wins):
  --param KEY=VALUE              (repeatable)
  --param-file params.(json|yaml)
  --interactive                  (prompt for parameters still unbound;
                                  a blank answer leaves it unbound)

Names that match no declared parameter are reported with a warning and
ignored, or rejected outright with --strict.

Human output: success box with status + elapsed time, the bound arguments
(passwords masked) and the pretty-printed response body. `--raw` prints
the body exactly as received.

JSON Output:
{
  "status": "ok",
  "group": "users",
  "function": "get_user",
  "located": "src/gitlab/users.rs: users::get_user",
  "elapsed_ms": 42,
  "status_code": 200,            (null when no request was sent)
  "arguments": { "id": "7" },
  "response": { ... }            (string body with --raw or non-JSON replies)
}

JSON Error Output:
{ "status": "error", "error": "message" }
*/

use anyhow::Result;
use clap::Args;
use std::io::{self, BufRead, Write};
use std::time::Instant;

use crate::cmd::format::{Role, StyleOptions, TableOpts, box_header, color, emoji, table};
use crate::cmd::shared::{ServerArgs, connect, load_param_file, output_error, parse_params};
use crate::gitlab::Response;
use crate::registry::{Binding, InputKind, Invocation, Registry};

const TITLE: &str = "Exec Error";

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Route group (e.g. users, projects, files)
    #[arg(value_name = "GROUP")]
    pub group: String,

    /// Function id inside the group (e.g. get_user)
    #[arg(value_name = "FUNCTION")]
    pub function: String,

    /// Provide parameter (KEY=VALUE), repeatable
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Load parameters from file (JSON or YAML). CLI --param overrides file entries
    #[arg(long = "param-file", value_name = "PATH")]
    pub param_file: Option<String>,

    /// Prompt for declared parameters that received no value
    #[arg(long)]
    pub interactive: bool,

    /// Fail when a parameter name matches nothing in the route schema
    #[arg(long)]
    pub strict: bool,

    /// Output JSON
    #[arg(long)]
    pub json: bool,

    /// Print the response body exactly as received
    #[arg(long)]
    pub raw: bool,
}

pub fn execute_exec(args: ExecArgs, registry: &Registry, server: &ServerArgs) -> Result<()> {
    let group = args.group.trim();
    let function = args.function.trim();

    let route = match registry.require(group, function) {
        Ok(r) => r,
        Err(e) => return output_error(args.json, TITLE, &e.to_string()),
    };

    let mut provided = match parse_params(&args.params) {
        Ok(p) => p,
        Err(e) => return output_error(args.json, TITLE, &e.to_string()),
    };
    if let Some(ref pf) = args.param_file
        && let Err(e) = load_param_file(pf, &mut provided)
    {
        return output_error(args.json, TITLE, &format!("{e:#}"));
    }

    let mut call = route.invocation();
    let unmatched = bind_all(&mut call, provided);
    if !unmatched.is_empty() {
        if args.strict {
            return output_error(
                args.json,
                TITLE,
                &format!(
                    "unknown parameter(s) for {}::{}: {}",
                    route.group,
                    route.function,
                    unmatched.join(", ")
                ),
            );
        }
        for name in &unmatched {
            tracing::warn!(param = %name, route = %route.located(), "parameter matches nothing; ignored");
        }
    }

    if args.interactive {
        let stdin = io::stdin();
        prompt_for_unbound(&mut call, &mut stdin.lock(), &mut io::stdout())?;
    }

    let call_token = call.value("token").map(str::to_string);
    let api = match connect(server, call_token.as_deref()) {
        Ok(api) => api,
        Err(e) => return output_error(args.json, TITLE, &format!("{e:#}")),
    };

    let arguments = call.arguments();
    let located = route.located();
    let started = Instant::now();
    let result = registry.invoke(call, &api);
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let response = match result {
        Ok(r) => r,
        Err(e) => return output_error(args.json, TITLE, &e.to_string()),
    };
    tracing::debug!(
        route = %located,
        elapsed_ms,
        status = ?response.status,
        sent = !response.is_local(),
        "route finished"
    );

    if args.json {
        let out = serde_json::json!({
            "status": "ok",
            "group": route.group,
            "function": route.function,
            "located": located,
            "elapsed_ms": elapsed_ms,
            "status_code": response.status,
            "arguments": arguments,
            "response": response_value(&response, args.raw),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string())
        );
        return Ok(());
    }

    let style = StyleOptions::detect();
    let status = match response.status {
        Some(code) => format!("HTTP {code}"),
        None => "not sent".to_string(),
    };
    println!(
        "{}",
        box_header(
            format!(
                "{} {}::{}",
                emoji("success", &style),
                route.group,
                route.function
            ),
            Some(format!("{status} • {elapsed_ms} ms")),
            &style,
        )
    );

    if arguments.is_empty() {
        println!(
            "{}",
            color(
                Role::Dim,
                format!("{} No arguments supplied", emoji("info", &style)),
                &style
            )
        );
    } else {
        let rows: Vec<Vec<String>> = arguments
            .iter()
            .map(|(k, v)| vec![k.clone(), v.as_str().unwrap_or_default().to_string()])
            .collect();
        println!("{}", color(Role::Accent, "Arguments:", &style));
        println!(
            "{}",
            table(
                &["NAME", "VALUE"],
                &rows,
                TableOpts {
                    header_sep: false,
                    ..TableOpts::default()
                },
                &style
            )
        );
    }
    println!();

    if args.raw {
        println!("{}", response.body);
    } else {
        println!("{}", response.pretty());
    }
    Ok(())
}

/// Bind every pair; returns the names no parameter claimed.
fn bind_all(call: &mut Invocation<'_>, provided: Vec<(String, String)>) -> Vec<String> {
    let mut unmatched = Vec::new();
    for (name, value) in provided {
        if call.bind(&name, value) == Binding::Unmatched {
            unmatched.push(name);
        }
    }
    unmatched
}

fn prompt_for_unbound<R: BufRead, W: Write>(
    call: &mut Invocation<'_>,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    let pending: Vec<_> = call.unbound().cloned().collect();
    for p in pending {
        let hint = match p.input {
            InputKind::Text => String::new(),
            kind => format!(" ({kind})"),
        };
        write!(out, "{}{hint}: ", p.label())?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let value = line.trim_end_matches(['\r', '\n']);
        if value.trim().is_empty() {
            continue;
        }
        call.bind(&p.name, value);
    }
    Ok(())
}

fn response_value(response: &Response, raw: bool) -> serde_json::Value {
    if raw {
        return serde_json::Value::String(response.body.clone());
    }
    response
        .json()
        .unwrap_or_else(|_| serde_json::Value::String(response.body.clone()))
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
        Exec(ExecArgs),
    }

    #[test]
    fn clap_parses_exec() {
        let cli = TestCli::try_parse_from([
            "t", "exec", "users", "get_user", "--param", "id=7", "--strict", "--json",
        ])
        .unwrap();
        let TestSub::Exec(a) = cli.cmd;
        assert_eq!(a.group, "users");
        assert_eq!(a.function, "get_user");
        assert_eq!(a.params, vec!["id=7".to_string()]);
        assert!(a.strict && a.json && !a.raw);
    }

    #[test]
    fn unmatched_names_are_collected() {
        let registry = crate::registry::catalog::builtin();
        let route = registry.require("users", "get_user").unwrap();
        let mut call = route.invocation();
        let left = bind_all(
            &mut call,
            vec![
                ("id".into(), "7".into()),
                ("route".into(), "users::get_user".into()),
            ],
        );
        assert_eq!(left, vec!["route".to_string()]);
        assert_eq!(call.slots()[0].as_deref(), Some("7"));
    }

    #[test]
    fn unknown_route_fails_before_connecting() {
        let registry = crate::registry::catalog::builtin();
        let args = TestCli::try_parse_from(["t", "exec", "users", "nope", "--json"]).unwrap();
        let TestSub::Exec(a) = args.cmd;
        let err = execute_exec(a, &registry, &ServerArgs::default())
            .unwrap_err()
            .to_string();
        assert!(err.contains("nope"));
    }

    #[test]
    fn strict_rejects_unknown_parameter() {
        let registry = crate::registry::catalog::builtin();
        let args = TestCli::try_parse_from([
            "t", "exec", "users", "get_user", "--param", "bogus=1", "--strict", "--json",
        ])
        .unwrap();
        let TestSub::Exec(a) = args.cmd;
        let err = execute_exec(a, &registry, &ServerArgs::default())
            .unwrap_err()
            .to_string();
        assert!(err.contains("bogus"));
    }

    #[test]
    fn prompt_fills_unbound_and_skips_blank() {
        let registry = crate::registry::catalog::builtin();
        let route = registry.require("users", "create_user").unwrap();
        let mut call = route.invocation();
        call.bind("username", "ada");
        let mut sink = Vec::new();
        prompt_for_unbound(&mut call, &mut Cursor::new("Ada L\n\nsecret\n"), &mut sink).unwrap();
        assert_eq!(call.slots()[0].as_deref(), Some("ada"));
        assert_eq!(call.slots()[1].as_deref(), Some("Ada L"));
        assert_eq!(call.slots()[2], None);
        assert_eq!(call.slots()[3].as_deref(), Some("secret"));
        assert!(String::from_utf8(sink).unwrap().contains("(password)"));
    }

    #[test]
    fn response_value_falls_back_to_text() {
        let r = Response {
            status: Some(500),
            body: "oops".into(),
        };
        assert_eq!(response_value(&r, false), serde_json::json!("oops"));
        let r = Response {
            status: Some(200),
            body: r#"{"a":1}"#.into(),
        };
        assert_eq!(response_value(&r, false), serde_json::json!({"a": 1}));
        assert_eq!(response_value(&r, true), serde_json::json!(r#"{"a":1}"#));
    }
}
