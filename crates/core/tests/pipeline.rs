use bytes::Bytes;
use converter_core::pipeline::{self, RunRequest};
use providers::{CodeGenerator, FileStore, GenerateRequest, ProviderError, RemoteFile, RepoWriter};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

struct FakeStore {
    files: Vec<RemoteFile>,
    contents: HashMap<String, Vec<u8>>,
}

impl FakeStore {
    fn new(entries: &[(&str, &str, &str, &[u8])]) -> Self {
        let files = entries
            .iter()
            .map(|(id, name, mime_type, _)| RemoteFile {
                id: id.to_string(),
                name: name.to_string(),
                mime_type: mime_type.to_string(),
            })
            .collect();
        let contents = entries
            .iter()
            .map(|(id, _, _, bytes)| (id.to_string(), bytes.to_vec()))
            .collect();
        Self { files, contents }
    }
}

#[async_trait::async_trait]
impl FileStore for FakeStore {
    async fn list_eligible_files(&self, _root: &str) -> Result<Vec<RemoteFile>, ProviderError> {
        Ok(self.files.clone())
    }

    async fn download(&self, file_id: &str) -> Result<Bytes, ProviderError> {
        self.contents
            .get(file_id)
            .map(|bytes| Bytes::from(bytes.clone()))
            .ok_or_else(|| ProviderError::RequestFailed(format!("no content for {file_id}")))
    }
}

struct FakeGenerator;

#[async_trait::async_trait]
impl CodeGenerator for FakeGenerator {
    async fn generate(&self, req: GenerateRequest<'_>) -> Result<String, ProviderError> {
        Ok(format!("// component for {}\n", req.file_name))
    }
}

#[derive(Default)]
struct RecordingRepo {
    commits: Mutex<Vec<(String, String, String)>>,
    reject_paths: Vec<String>,
}

#[async_trait::async_trait]
impl RepoWriter for RecordingRepo {
    async fn commit_file(
        &self,
        repo: &str,
        path: &str,
        content: &str,
    ) -> Result<(), ProviderError> {
        if self.reject_paths.iter().any(|p| p == path) {
            return Err(ProviderError::Api {
                status: 422,
                message: "Update is not a fast forward".to_string(),
            });
        }
        self.commits
            .lock()
            .unwrap()
            .push((repo.to_string(), path.to_string(), content.to_string()));
        Ok(())
    }
}

fn request() -> RunRequest {
    RunRequest {
        folder_id: "folder-1".to_string(),
        repository: "site".to_string(),
        target_dir: "src/components".to_string(),
        instruction: "Match the mockup.".to_string(),
    }
}

const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];

#[tokio::test]
async fn converts_listed_files_and_commits_components() {
    let store = FakeStore::new(&[
        ("1", "img1.jpg", "image/jpeg", JPEG),
        ("2", "a.b.png", "image/png", &[0x89, 0x50, 0x4E, 0x47, 0x0D]),
        ("3", "copy.txt", "text/plain", b"Launch page copy."),
    ]);
    let repo = RecordingRepo::default();
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink_lines = lines.clone();
    let sink = move |line: &str| sink_lines.lock().unwrap().push(line.to_string());

    let summary = pipeline::run_with_clients(&store, &FakeGenerator, &repo, &request(), &sink)
        .await
        .unwrap();

    assert_eq!(summary.found, 3);
    assert_eq!(summary.converted, 3);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.failed, 0);

    let commits = repo.commits.lock().unwrap();
    let paths: Vec<&str> = commits.iter().map(|(_, path, _)| path.as_str()).collect();
    assert_eq!(
        paths,
        [
            "src/components/img1.tsx",
            "src/components/a.b.tsx",
            "src/components/copy.tsx",
        ]
    );
    assert!(commits.iter().all(|(repo_name, _, _)| repo_name == "site"));
    assert!(commits[0].2.contains("img1.jpg"));

    let lines = lines.lock().unwrap();
    assert_eq!(lines[0], "Found 3 files to process.");
    assert!(lines.iter().any(|l| l == "Processing img1.jpg..."));
}

#[tokio::test]
async fn unrecognized_bytes_are_skipped_without_generation() {
    // Declared as an image, but the bytes are neither a known signature nor
    // non-empty text.
    let store = FakeStore::new(&[
        ("1", "broken.jpg", "image/jpeg", &[0x00, 0x01, 0xFE, 0xFF]),
        ("2", "img1.jpg", "image/jpeg", JPEG),
    ]);
    let repo = RecordingRepo::default();
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink_lines = lines.clone();
    let sink = move |line: &str| sink_lines.lock().unwrap().push(line.to_string());

    let summary = pipeline::run_with_clients(&store, &FakeGenerator, &repo, &request(), &sink)
        .await
        .unwrap();

    assert_eq!(summary.converted, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(repo.commits.lock().unwrap().len(), 1);
    assert!(lines
        .lock()
        .unwrap()
        .iter()
        .any(|l| l == "broken.jpg is not a recognized image or text file, skipping."));
}

#[tokio::test]
async fn a_rejected_ref_update_does_not_stop_the_run() {
    let store = FakeStore::new(&[
        ("1", "first.jpg", "image/jpeg", JPEG),
        ("2", "second.jpg", "image/jpeg", JPEG),
    ]);
    let repo = RecordingRepo {
        reject_paths: vec!["src/components/first.tsx".to_string()],
        ..Default::default()
    };
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink_lines = lines.clone();
    let sink = move |line: &str| sink_lines.lock().unwrap().push(line.to_string());

    let summary = pipeline::run_with_clients(&store, &FakeGenerator, &repo, &request(), &sink)
        .await
        .unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.converted, 1);

    let commits = repo.commits.lock().unwrap();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].1, "src/components/second.tsx");

    let lines = lines.lock().unwrap();
    assert!(lines
        .iter()
        .any(|l| l.starts_with("Failed to process first.jpg:")));
    assert_eq!(lines.last().unwrap(), "Run complete: 1 converted, 0 skipped, 1 failed.");
}

struct FailingStore;

#[async_trait::async_trait]
impl FileStore for FailingStore {
    async fn list_eligible_files(&self, _root: &str) -> Result<Vec<RemoteFile>, ProviderError> {
        Err(ProviderError::Api {
            status: 403,
            message: "insufficient permissions".to_string(),
        })
    }

    async fn download(&self, _file_id: &str) -> Result<Bytes, ProviderError> {
        unreachable!("listing failed")
    }
}

#[tokio::test]
async fn a_listing_failure_aborts_the_whole_run() {
    let repo = RecordingRepo::default();
    let sink = |_line: &str| {};

    let result =
        pipeline::run_with_clients(&FailingStore, &FakeGenerator, &repo, &request(), &sink).await;

    assert!(result.is_err());
    assert!(repo.commits.lock().unwrap().is_empty());
}
