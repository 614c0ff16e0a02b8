//! `branches` group. Branch names are path-encoded so `feature/x` works.

use serde_json::json;

use super::{Body, GitLab, Response, TransportError, encode_segment, present, reject};

type Outcome = Result<Response, TransportError>;

pub fn list_branches(api: &GitLab, project_id: Option<&str>) -> Outcome {
    let Some(project_id) = present(project_id) else {
        return reject("Project id is required");
    };
    api.call("GET", &format!("projects/{project_id}/repository/branches"), None)
}

pub fn get_branch(api: &GitLab, project_id: Option<&str>, branch: Option<&str>) -> Outcome {
    let (Some(project_id), Some(branch)) = (present(project_id), present(branch)) else {
        return reject("Required all parameters");
    };
    api.call(
        "GET",
        &format!(
            "projects/{project_id}/repository/branches/{}",
            encode_segment(branch)
        ),
        None,
    )
}

/// `git_ref` is a commit SHA, branch or tag to branch from.
pub fn create_branch(
    api: &GitLab,
    project_id: Option<&str>,
    branch: Option<&str>,
    git_ref: Option<&str>,
) -> Outcome {
    let (Some(project_id), Some(branch), Some(git_ref)) =
        (present(project_id), present(branch), present(git_ref))
    else {
        return reject("Required all parameters");
    };
    api.call(
        "POST",
        &format!("projects/{project_id}/repository/branches"),
        Some(Body::Json(json!({ "branch": branch, "ref": git_ref }))),
    )
}

pub fn delete_branch(api: &GitLab, project_id: Option<&str>, branch: Option<&str>) -> Outcome {
    let (Some(project_id), Some(branch)) = (present(project_id), present(branch)) else {
        return reject("Required all parameters");
    };
    api.call(
        "DELETE",
        &format!(
            "projects/{project_id}/repository/branches/{}",
            encode_segment(branch)
        ),
        None,
    )
}
