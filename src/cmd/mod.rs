/*!
Command dispatcher module: declarations and re-exports only.

Layout:
  src/cmd/
    mod.rs      (this file)
    subject.rs  (Subject enum)
    list.rs     (ListArgs + execute_list)
    get.rs      (GetArgs  + execute_get)
    exec.rs     (ExecArgs + execute_exec)
    shared.rs   (server connection, parameter sources, error output)
    format.rs   (boxes, tables, colors)

Each subcommand module exposes exactly one public `execute_*` function
returning `anyhow::Result<()>`. The route registry is built once in
`main` and passed in by reference.
*/

pub mod exec;
pub mod format;
pub mod get;
pub mod list;
pub mod shared;
pub mod subject;

pub use exec::{ExecArgs, execute_exec};
pub use get::{GetArgs, execute_get};
pub use list::{ListArgs, execute_list};
pub use shared::ServerArgs;
