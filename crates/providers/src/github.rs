//! GitHub REST client building commits through the low-level git data API:
//! blob, tree, commit, then a plain (non-forced) ref update.

use crate::{read_json, send, ProviderError, RepoWriter};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

const USER_AGENT: &str = "drive-converter";

#[derive(Clone)]
pub struct GitHubConfig {
    pub token: String,
    pub owner: String,
    pub base_url: String,
}

#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    cfg: Arc<GitHubConfig>,
}

impl GitHubClient {
    pub fn new(cfg: GitHubConfig) -> Self {
        Self {
            client: Client::new(),
            cfg: Arc::new(cfg),
        }
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        // GitHub rejects requests without a User-Agent.
        self.client
            .request(method, url)
            .bearer_auth(&self.cfg.token)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
    }
}

#[derive(Deserialize)]
struct Repository {
    default_branch: String,
}

#[derive(Deserialize)]
struct Reference {
    object: GitObject,
}

#[derive(Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Deserialize)]
struct CommitObject {
    sha: String,
    tree: TreeRef,
}

#[derive(Deserialize)]
struct TreeRef {
    sha: String,
}

#[derive(Deserialize)]
struct Created {
    sha: String,
}

#[derive(Serialize)]
struct NewBlob {
    content: String,
    encoding: &'static str,
}

#[derive(Serialize)]
struct NewTree<'a> {
    base_tree: &'a str,
    tree: Vec<TreeEntry<'a>>,
}

#[derive(Serialize)]
struct TreeEntry<'a> {
    path: &'a str,
    mode: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    sha: &'a str,
}

#[derive(Serialize)]
struct NewCommit<'a> {
    message: String,
    tree: &'a str,
    parents: Vec<&'a str>,
}

#[derive(Serialize)]
struct RefUpdate<'a> {
    sha: &'a str,
}

fn commit_message(path: &str) -> String {
    format!("Add {path}")
}

fn blob_payload(content: &str) -> NewBlob {
    NewBlob {
        content: BASE64.encode(content),
        encoding: "base64",
    }
}

#[async_trait::async_trait]
impl RepoWriter for GitHubClient {
    async fn commit_file(
        &self,
        repo: &str,
        path: &str,
        content: &str,
    ) -> Result<(), ProviderError> {
        let base = format!("{}/repos/{}/{repo}", self.cfg.base_url, self.cfg.owner);

        // The default branch is re-read on every commit rather than cached.
        let repository: Repository =
            read_json(send(self.request(Method::GET, base.clone())).await?).await?;
        let branch = repository.default_branch;

        let tip: Reference = read_json(
            send(self.request(Method::GET, format!("{base}/git/ref/heads/{branch}"))).await?,
        )
        .await?;

        let tip_commit: CommitObject = read_json(
            send(self.request(
                Method::GET,
                format!("{base}/git/commits/{}", tip.object.sha),
            ))
            .await?,
        )
        .await?;

        let blob: Created = read_json(
            send(
                self.request(Method::POST, format!("{base}/git/blobs"))
                    .json(&blob_payload(content)),
            )
            .await?,
        )
        .await?;

        // Root the new tree at the tip's tree so every unrelated entry is
        // carried over unchanged.
        let tree: Created = read_json(
            send(
                self.request(Method::POST, format!("{base}/git/trees"))
                    .json(&NewTree {
                        base_tree: &tip_commit.tree.sha,
                        tree: vec![TreeEntry {
                            path,
                            mode: "100644",
                            kind: "blob",
                            sha: &blob.sha,
                        }],
                    }),
            )
            .await?,
        )
        .await?;

        let commit: Created = read_json(
            send(
                self.request(Method::POST, format!("{base}/git/commits"))
                    .json(&NewCommit {
                        message: commit_message(path),
                        tree: &tree.sha,
                        parents: vec![&tip_commit.sha],
                    }),
            )
            .await?,
        )
        .await?;

        // Not forced: if the branch moved since the tip was read, GitHub
        // rejects the update and the error stays scoped to this file.
        let _updated: Reference = read_json(
            send(
                self.request(Method::PATCH, format!("{base}/git/refs/heads/{branch}"))
                    .json(&RefUpdate { sha: &commit.sha }),
            )
            .await?,
        )
        .await?;

        debug!(repo, path, commit = %commit.sha, "Pushed commit");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_content_is_base64_encoded() {
        let payload = blob_payload("export default function Page() {}\n");
        assert_eq!(payload.encoding, "base64");
        assert_eq!(
            BASE64.decode(&payload.content).unwrap(),
            b"export default function Page() {}\n"
        );
    }

    #[test]
    fn tree_entry_is_a_regular_file_blob() {
        let entry = TreeEntry {
            path: "src/components/diagram.tsx",
            mode: "100644",
            kind: "blob",
            sha: "abc123",
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["path"], "src/components/diagram.tsx");
        assert_eq!(json["mode"], "100644");
        assert_eq!(json["type"], "blob");
        assert_eq!(json["sha"], "abc123");
    }

    #[test]
    fn commit_message_names_the_added_path() {
        assert_eq!(commit_message("src/diagram.tsx"), "Add src/diagram.tsx");
    }
}
