//! `files` group: single-file reads and writes in a repository.
//!
//! For several files in one commit use `commits::create_commit` instead.
//! File paths are given plain (`lib/class.rb`) and encoded here.

use serde_json::Value;

use super::{
    Body, GitLab, Response, TransportError, encode_segment, object, present, reject, with_query,
};

type Outcome = Result<Response, TransportError>;

fn file_path(project_id: &str, path: &str, suffix: &str) -> String {
    format!(
        "projects/{project_id}/repository/files/{}{suffix}",
        encode_segment(path)
    )
}

/// Metadata plus base64 content.
pub fn get_file(
    api: &GitLab,
    project_id: Option<&str>,
    path: Option<&str>,
    git_ref: Option<&str>,
) -> Outcome {
    read(api, project_id, path, git_ref, "")
}

pub fn get_file_blame(
    api: &GitLab,
    project_id: Option<&str>,
    path: Option<&str>,
    git_ref: Option<&str>,
) -> Outcome {
    read(api, project_id, path, git_ref, "/blame")
}

fn read(
    api: &GitLab,
    project_id: Option<&str>,
    path: Option<&str>,
    git_ref: Option<&str>,
    suffix: &str,
) -> Outcome {
    let (Some(project_id), Some(path), Some(git_ref)) =
        (present(project_id), present(path), present(git_ref))
    else {
        return reject("Required all parameters");
    };
    api.call(
        "GET",
        &with_query(&file_path(project_id, path, suffix), &[("ref", git_ref)]),
        None,
    )
}

/// Raw contents; `ref` defaults to HEAD.
pub fn get_raw_file(
    api: &GitLab,
    project_id: Option<&str>,
    path: Option<&str>,
    git_ref: Option<&str>,
) -> Outcome {
    let (Some(project_id), Some(path)) = (present(project_id), present(path)) else {
        return reject("Project id and file path are required");
    };
    let query: Vec<(&str, &str)> = present(git_ref).map(|r| ("ref", r)).into_iter().collect();
    api.call(
        "GET",
        &with_query(&file_path(project_id, path, "/raw"), &query),
        None,
    )
}

/// Fields shared by every write.
pub struct Change<'a> {
    pub project_id: Option<&'a str>,
    pub path: Option<&'a str>,
    pub branch: Option<&'a str>,
    pub commit_message: Option<&'a str>,
    pub author_email: Option<&'a str>,
    pub author_name: Option<&'a str>,
}

impl<'a> Change<'a> {
    /// (project id, path, fields) once the required parts are present.
    fn split(&self) -> Option<(&'a str, &'a str, serde_json::Map<String, Value>)> {
        let (Some(project_id), Some(path), Some(branch), Some(message)) = (
            present(self.project_id),
            present(self.path),
            present(self.branch),
            present(self.commit_message),
        ) else {
            return None;
        };
        let fields = object(&[
            ("branch", Some(branch)),
            ("commit_message", Some(message)),
            ("author_email", self.author_email),
            ("author_name", self.author_name),
        ]);
        Some((project_id, path, fields))
    }
}

pub fn create_file(api: &GitLab, change: &Change<'_>, content: Option<&str>) -> Outcome {
    write(api, "POST", change, content)
}

pub fn update_file(api: &GitLab, change: &Change<'_>, content: Option<&str>) -> Outcome {
    write(api, "PUT", change, content)
}

fn write(api: &GitLab, verb: &str, change: &Change<'_>, content: Option<&str>) -> Outcome {
    let Some((project_id, path, mut data)) = change.split() else {
        return reject("Required all parameters");
    };
    // Empty content is a legitimate (empty) file.
    let Some(content) = content else {
        return reject("Required all parameters");
    };
    data.insert("content".into(), Value::from(content));
    api.call(
        verb,
        &file_path(project_id, path, ""),
        Some(Body::Json(Value::Object(data))),
    )
}

/// DELETE carries no body, so the commit fields travel in the query string.
pub fn delete_file(api: &GitLab, change: &Change<'_>) -> Outcome {
    let Some((project_id, path, data)) = change.split() else {
        return reject("Required all parameters");
    };
    let query: Vec<(&str, &str)> = data
        .iter()
        .filter_map(|(k, v)| v.as_str().map(|v| (k.as_str(), v)))
        .collect();
    api.call(
        "DELETE",
        &with_query(&file_path(project_id, path, ""), &query),
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gitlab::Method;
    use crate::gitlab::testing::{only_path, recording_client};
    use serde_json::json;

    fn change<'a>(path: Option<&'a str>) -> Change<'a> {
        Change {
            project_id: Some("3"),
            path,
            branch: Some("main"),
            commit_message: Some("edit"),
            author_email: None,
            author_name: Some("Ada"),
        }
    }

    #[test]
    fn get_file_encodes_path_and_ref() {
        let (api, sent) = recording_client();
        get_file(&api, Some("3"), Some("lib/class.rb"), Some("main")).unwrap();
        assert_eq!(
            only_path(&sent),
            "/api/v4/projects/3/repository/files/lib%2Fclass.rb?ref=main"
        );
    }

    #[test]
    fn get_file_requires_ref() {
        let (api, sent) = recording_client();
        assert!(get_file_blame(&api, Some("3"), Some("a"), None).unwrap().is_local());
        assert!(sent.borrow().is_empty());
    }

    #[test]
    fn raw_file_ref_is_optional() {
        let (api, sent) = recording_client();
        get_raw_file(&api, Some("3"), Some("README.md"), None).unwrap();
        assert_eq!(only_path(&sent), "/api/v4/projects/3/repository/files/README.md/raw");
    }

    #[test]
    fn create_file_posts_content() {
        let (api, sent) = recording_client();
        create_file(&api, &change(Some("docs/a.md")), Some("# hi")).unwrap();
        let reqs = sent.borrow();
        assert_eq!(reqs[0].method, Method::Post);
        assert_eq!(reqs[0].url.path(), "/api/v4/projects/3/repository/files/docs%2Fa.md");
        assert_eq!(
            reqs[0].body,
            Some(Body::Json(json!({
                "branch": "main",
                "commit_message": "edit",
                "author_name": "Ada",
                "content": "# hi"
            })))
        );
    }

    #[test]
    fn writes_need_path_and_content() {
        let (api, sent) = recording_client();
        assert!(update_file(&api, &change(None), Some("x")).unwrap().is_local());
        assert!(update_file(&api, &change(Some("a")), None).unwrap().is_local());
        assert!(sent.borrow().is_empty());
    }

    #[test]
    fn delete_file_moves_fields_to_query() {
        let (api, sent) = recording_client();
        delete_file(&api, &change(Some("old.txt"))).unwrap();
        let reqs = sent.borrow();
        assert_eq!(reqs[0].method, Method::Delete);
        assert!(reqs[0].body.is_none());
        let query = reqs[0].url.query().unwrap_or_default();
        assert!(query.contains("branch=main"));
        assert!(query.contains("commit_message=edit"));
        assert!(query.contains("author_name=Ada"));
    }
}
