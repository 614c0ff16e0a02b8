//! `commits` group.
//!
//! Creating a commit takes a batch of actions in one payload; see
//! <https://docs.gitlab.com/ee/api/commits.html#create-a-commit-with-multiple-files-and-actions>.
//! Actions arrive as a JSON array, e.g.
//! `[{"action":"create","file_path":"foo/bar","content":"some content"}]`.

use serde_json::Value;

use super::{
    Body, GitLab, Response, TransportError, encode_segment, object, present, reject, with_query,
};

type Outcome = Result<Response, TransportError>;

pub fn list_commits(
    api: &GitLab,
    project_id: Option<&str>,
    git_ref: Option<&str>,
    path: Option<&str>,
) -> Outcome {
    let Some(project_id) = present(project_id) else {
        return reject("Project id is required");
    };
    let mut query = Vec::new();
    if let Some(r) = present(git_ref) {
        query.push(("ref_name", r));
    }
    if let Some(p) = present(path) {
        query.push(("path", p));
    }
    api.call(
        "GET",
        &with_query(&format!("projects/{project_id}/repository/commits"), &query),
        None,
    )
}

#[allow(clippy::too_many_arguments)]
pub fn create_commit(
    api: &GitLab,
    project_id: Option<&str>,
    branch: Option<&str>,
    commit_message: Option<&str>,
    author_name: Option<&str>,
    author_email: Option<&str>,
    actions: Option<&str>,
    force: Option<&str>,
) -> Outcome {
    let (Some(project_id), Some(branch), Some(commit_message), Some(author_name), Some(actions)) = (
        present(project_id),
        present(branch),
        present(commit_message),
        present(author_name),
        present(actions),
    ) else {
        return reject("Project id, branch, commit message, author name and actions are required");
    };
    let actions = match serde_json::from_str::<Value>(actions) {
        Ok(list @ Value::Array(_)) => list,
        _ => return reject("Actions must be a JSON array of action objects"),
    };

    let mut data = object(&[
        ("branch", Some(branch)),
        ("commit_message", Some(commit_message)),
        ("author_name", Some(author_name)),
        ("author_email", author_email),
    ]);
    data.insert("actions".into(), actions);
    if present(force).is_some_and(truthy) {
        data.insert("force".into(), Value::Bool(true));
    }
    api.call(
        "POST",
        &format!("projects/{project_id}/repository/commits"),
        Some(Body::Json(Value::Object(data))),
    )
}

/// `sha` may also be a branch or tag name.
pub fn get_commit(api: &GitLab, project_id: Option<&str>, sha: Option<&str>) -> Outcome {
    commit_resource(api, project_id, sha, "")
}

pub fn get_commit_diff(api: &GitLab, project_id: Option<&str>, sha: Option<&str>) -> Outcome {
    commit_resource(api, project_id, sha, "/diff")
}

pub fn get_commit_comments(api: &GitLab, project_id: Option<&str>, sha: Option<&str>) -> Outcome {
    commit_resource(api, project_id, sha, "/comments")
}

fn commit_resource(
    api: &GitLab,
    project_id: Option<&str>,
    sha: Option<&str>,
    suffix: &str,
) -> Outcome {
    let (Some(project_id), Some(sha)) = (present(project_id), present(sha)) else {
        return reject("Project id and commit sha are required");
    };
    api.call(
        "GET",
        &format!(
            "projects/{project_id}/repository/commits/{}{suffix}",
            encode_segment(sha)
        ),
        None,
    )
}

/// A line comment needs the full SHA, `path` and `line`; giving a line
/// always pins `line_type` to `new`. Invalid positions make GitLab attach
/// the note to the commit itself.
pub fn post_commit_comment(
    api: &GitLab,
    project_id: Option<&str>,
    sha: Option<&str>,
    note: Option<&str>,
    path: Option<&str>,
    line: Option<&str>,
    line_type: Option<&str>,
) -> Outcome {
    let (Some(project_id), Some(sha), Some(note)) =
        (present(project_id), present(sha), present(note))
    else {
        return reject("Project id, commit sha and note are required");
    };
    let mut data = object(&[("note", Some(note)), ("path", path), ("line_type", line_type)]);
    if let Some(line) = present(line) {
        let Ok(line) = line.trim().parse::<u64>() else {
            return reject("Line must be a positive integer");
        };
        data.insert("line".into(), Value::from(line));
        data.insert("line_type".into(), Value::from("new"));
    }
    api.call(
        "POST",
        &format!(
            "projects/{project_id}/repository/commits/{}/comments",
            encode_segment(sha)
        ),
        Some(Body::Json(Value::Object(data))),
    )
}

fn truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "y" | "on"
    )
}
