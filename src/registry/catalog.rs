//! Built-in route table: every GitLab operation with its parameter schema.

use super::{Handler, Registry, RouteDescriptor};
use crate::gitlab::files::Change;
use crate::gitlab::{api, branches, commits, files, projects, repository, users};

/// Registers routes and mounts targets for one group.
struct Group<'r> {
    registry: &'r mut Registry,
    id: &'static str,
    source: &'static str,
}

impl Group<'_> {
    fn route(&mut self, function: &str, name: &str, handler: Handler) -> &mut RouteDescriptor {
        self.registry.mount(self.id, function, handler);
        self.registry.register(self.id, function, self.source, name)
    }
}

fn group<'r>(registry: &'r mut Registry, id: &'static str, source: &'static str) -> Group<'r> {
    Group {
        registry,
        id,
        source,
    }
}

/// Registry holding every built-in route.
pub fn builtin() -> Registry {
    let mut registry = Registry::new();
    api_routes(&mut registry);
    user_routes(&mut registry);
    project_routes(&mut registry);
    branch_routes(&mut registry);
    commit_routes(&mut registry);
    repository_routes(&mut registry);
    file_routes(&mut registry);
    registry
}

fn api_routes(registry: &mut Registry) {
    let mut g = group(registry, "api", "src/gitlab/api.rs");
    g.route("execute", "Call APIs", |api, a| {
        api::execute(api, a.get(0), a.get(1), a.get(2), a.get(3), a.get(4))
    })
    .declare_param("method:text", "HTTP method: GET, POST, PUT or DELETE")
    .declare_param("endpoint:text", "Endpoint below /api/v4, e.g. projects/1")
    .declare_param("data:textarea", "JSON body (optional)")
    .declare_param("form:checkbox", "Send data form-encoded")
    .declare_param("token:password", "Token for this call only (optional)");
}

fn user_routes(registry: &mut Registry) {
    let mut g = group(registry, "users", "src/gitlab/users.rs");
    g.route("list_users", "List all users", |api, _| users::list_users(api));
    g.route("create_user", "Create a user", |api, a| {
        users::create_user(api, a.get(0), a.get(1), a.get(2), a.get(3))
    })
    .declare_param("username:text", "Username")
    .declare_param("name:text", "Full name")
    .declare_param("email:text", "Email")
    .declare_param("password:password", "Password");
    g.route("get_user", "Get user information by id", |api, a| {
        users::get_user(api, a.get(0))
    })
    .declare_param("id:text", "User id");
    g.route("update_user", "Update user information", |api, a| {
        users::update_user(api, a.get(0), a.get(1), a.get(2), a.get(3), a.get(4))
    })
    .declare_param("id:text", "User id")
    .declare_param("username:text", "Username")
    .declare_param("name:text", "Full name")
    .declare_param("email:text", "Email")
    .declare_param("password:password", "Password");
    g.route("find_users", "Find users", |api, a| {
        users::find_users(api, a.get(0), a.get(1))
    })
    .declare_param("string_in_username:text", "String for search in username")
    .declare_param(
        "string_in_email:text",
        "String for search in email (<search>@<exact domain>)",
    );
    g.route("delete_user", "Delete a user", |api, a| {
        users::delete_user(api, a.get(0))
    })
    .declare_param("id:text", "User id");
}

fn project_routes(registry: &mut Registry) {
    let mut g = group(registry, "projects", "src/gitlab/projects.rs");
    g.route("list_projects", "List all projects", |api, _| {
        projects::list_projects(api)
    });
    g.route("get_project", "Get project information by id", |api, a| {
        projects::get_project(api, a.get(0))
    })
    .declare_param("id:text", "Project id");
    g.route("create_project", "Create a project", |api, a| {
        projects::create_project(api, a.get(0), a.get(1), a.get(2))
    })
    .declare_param("name:text", "Project name")
    .declare_param("description:textarea", "Description (optional)")
    .declare_param("visibility:text", "private, internal or public (default private)");
    g.route(
        "create_project_for_user",
        "Create a project for a user",
        |api, a| projects::create_project_for_user(api, a.get(0), a.get(1), a.get(2), a.get(3)),
    )
    .declare_param("name:text", "Project name")
    .declare_param("description:textarea", "Description (optional)")
    .declare_param("user_id:text", "Owner user id")
    .declare_param("visibility:text", "private, internal or public (default private)");
    g.route("update_project", "Update a project", |api, a| {
        projects::update_project(api, a.get(0), a.get(1), a.get(2), a.get(3))
    })
    .declare_param("id:text", "Project id")
    .declare_param("name:text", "Project name")
    .declare_param("description:textarea", "Description")
    .declare_param("visibility:text", "private, internal or public");
    g.route("find_projects", "Find projects", |api, a| {
        projects::find_projects(api, a.get(0), a.get(1))
    })
    .declare_param("string_in_name:text", "String for search in name")
    .declare_param("string_in_description:text", "String for search in description");
    g.route("delete_project", "Delete a project", |api, a| {
        projects::delete_project(api, a.get(0))
    })
    .declare_param("id:text", "Project id");
}

fn branch_routes(registry: &mut Registry) {
    let mut g = group(registry, "branches", "src/gitlab/branches.rs");
    g.route("list_branches", "List branches of a project", |api, a| {
        branches::list_branches(api, a.get(0))
    })
    .declare_param("project_id:text", "Project id");
    g.route("get_branch", "Get a branch", |api, a| {
        branches::get_branch(api, a.get(0), a.get(1))
    })
    .declare_param("project_id:text", "Project id")
    .declare_param("branch:text", "Branch name");
    g.route("create_branch", "Create a branch", |api, a| {
        branches::create_branch(api, a.get(0), a.get(1), a.get(2))
    })
    .declare_param("project_id:text", "Project id")
    .declare_param("branch:text", "Branch name")
    .declare_param("ref:text", "Commit SHA, branch or tag to start from");
    g.route("delete_branch", "Delete a branch", |api, a| {
        branches::delete_branch(api, a.get(0), a.get(1))
    })
    .declare_param("project_id:text", "Project id")
    .declare_param("branch:text", "Branch name");
}

fn commit_routes(registry: &mut Registry) {
    let mut g = group(registry, "commits", "src/gitlab/commits.rs");
    g.route("list_commits", "List repository commits", |api, a| {
        commits::list_commits(api, a.get(0), a.get(1), a.get(2))
    })
    .declare_param("project_id:text", "Project id")
    .declare_param("ref:text", "Branch, tag or revision range (default branch if empty)")
    .declare_param("path:text", "Only commits touching this file path");
    g.route("create_commit", "Create a commit with actions", |api, a| {
        commits::create_commit(
            api,
            a.get(0),
            a.get(1),
            a.get(2),
            a.get(3),
            a.get(4),
            a.get(5),
            a.get(6),
        )
    })
    .declare_param("project_id:text", "Project id")
    .declare_param("branch:text", "Branch to commit into")
    .declare_param("commit_message:textarea", "Commit message")
    .declare_param("author_name:text", "Author name")
    .declare_param("author_email:text", "Author email")
    .declare_param("actions:textarea", "JSON array of actions (create, delete, move, update, chmod)")
    .declare_param("force:checkbox", "Overwrite the target branch");
    g.route("get_commit", "Get a single commit", |api, a| {
        commits::get_commit(api, a.get(0), a.get(1))
    })
    .declare_param("project_id:text", "Project id")
    .declare_param("sha:text", "Commit SHA, branch or tag");
    g.route("get_commit_diff", "Get the diff of a commit", |api, a| {
        commits::get_commit_diff(api, a.get(0), a.get(1))
    })
    .declare_param("project_id:text", "Project id")
    .declare_param("sha:text", "Commit SHA, branch or tag");
    g.route("get_commit_comments", "Get the comments of a commit", |api, a| {
        commits::get_commit_comments(api, a.get(0), a.get(1))
    })
    .declare_param("project_id:text", "Project id")
    .declare_param("sha:text", "Commit SHA, branch or tag");
    g.route("post_commit_comment", "Comment on a commit", |api, a| {
        commits::post_commit_comment(api, a.get(0), a.get(1), a.get(2), a.get(3), a.get(4), a.get(5))
    })
    .declare_param("project_id:text", "Project id")
    .declare_param("sha:text", "Full commit SHA for line comments")
    .declare_param("note:textarea", "Comment text")
    .declare_param("path:text", "File path relative to the repository")
    .declare_param("line:number", "Line number")
    .declare_param("line_type:text", "new or old");
}

fn repository_routes(registry: &mut Registry) {
    let mut g = group(registry, "repository", "src/gitlab/repository.rs");
    g.route("get_tree", "List repository tree", |api, a| {
        repository::get_tree(api, a.get(0), a.get(1), a.get(2), a.get(3))
    })
    .declare_param("project_id:text", "Project id")
    .declare_param("per_page:number", "Entries per page (default 100)")
    .declare_param("ref:text", "Branch, tag or commit")
    .declare_param("path:text", "Sub-directory");
}

fn file_routes(registry: &mut Registry) {
    let mut g = group(registry, "files", "src/gitlab/files.rs");
    g.route("get_file", "Get file metadata and content", |api, a| {
        files::get_file(api, a.get(0), a.get(1), a.get(2))
    })
    .declare_param("project_id:text", "Project id")
    .declare_param("file_path:text", "Full path of the file, e.g. lib/class.rb")
    .declare_param("ref:text", "Branch, tag or commit");
    g.route("get_file_blame", "Get file blame", |api, a| {
        files::get_file_blame(api, a.get(0), a.get(1), a.get(2))
    })
    .declare_param("project_id:text", "Project id")
    .declare_param("file_path:text", "Full path of the file")
    .declare_param("ref:text", "Branch, tag or commit");
    g.route("get_raw_file", "Get raw file contents", |api, a| {
        files::get_raw_file(api, a.get(0), a.get(1), a.get(2))
    })
    .declare_param("project_id:text", "Project id")
    .declare_param("file_path:text", "Full path of the file")
    .declare_param("ref:text", "Branch, tag or commit (default HEAD)");

    declare_write_params(g.route("create_file", "Create a file", |api, a| {
        files::create_file(api, &write_change(a), a.get(4))
    }));
    declare_write_params(g.route("update_file", "Update a file", |api, a| {
        files::update_file(api, &write_change(a), a.get(4))
    }));

    g.route("delete_file", "Delete a file", |api, a| {
        files::delete_file(
            api,
            &Change {
                project_id: a.get(0),
                path: a.get(1),
                branch: a.get(2),
                commit_message: a.get(3),
                author_email: a.get(4),
                author_name: a.get(5),
            },
        )
    })
    .declare_param("project_id:text", "Project id")
    .declare_param("file_path:text", "Full path of the file")
    .declare_param("branch:text", "Branch to commit into")
    .declare_param("commit_message:textarea", "Commit message")
    .declare_param("author_email:text", "Author email (optional)")
    .declare_param("author_name:text", "Author name (optional)");
}

/// Slot layout shared by create_file / update_file.
fn write_change<'a>(a: &super::Args<'a>) -> Change<'a> {
    Change {
        project_id: a.get(0),
        path: a.get(1),
        branch: a.get(2),
        commit_message: a.get(3),
        author_email: a.get(5),
        author_name: a.get(6),
    }
}

fn declare_write_params(route: &mut RouteDescriptor) {
    route
        .declare_param("project_id:text", "Project id")
        .declare_param("file_path:text", "Full path of the file")
        .declare_param("branch:text", "Branch to commit into")
        .declare_param("commit_message:textarea", "Commit message")
        .declare_param("content:textarea", "File content")
        .declare_param("author_email:text", "Author email (optional)")
        .declare_param("author_name:text", "Author name (optional)");
}
