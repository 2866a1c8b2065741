use std::fs;
use std::path::Path;

use repo2llm_core::config::Settings;
use repo2llm_core::provider::LocalProvider;
use repo2llm_core::{save_artifact, Flattener, RepoService, SourceError};
use tempfile::tempdir;

fn offline_service(settings: Settings) -> RepoService {
    RepoService::new(
        Err(SourceError::MissingCredential("GITHUB_TOKEN")),
        Err(SourceError::MissingCredential("GITLAB_TOKEN")),
        settings,
    )
}

fn demo_repo(root: &Path) -> String {
    let repo = root.join("demo");
    fs::create_dir_all(repo.join(".git")).unwrap();
    fs::write(repo.join(".git/config"), "[core]").unwrap();
    fs::write(repo.join("README.md"), "hello").unwrap();
    fs::write(repo.join("a.txt"), "x").unwrap();
    fs::write(repo.join("b.bin"), [0u8, 1, 2, 3]).unwrap();
    repo.display().to_string()
}

#[tokio::test]
async fn local_repository_flattens_to_the_expected_artifact() {
    let tmp = tempdir().unwrap();
    let repo = demo_repo(tmp.path());

    let output = offline_service(Settings::default())
        .get_local_repo(&repo)
        .await;

    assert_eq!(
        output,
        "Use the files and contents provided below to complete this analysis:\n\n\
         README:\nhello\n\n\
         Repository Structure: demo\n./README.md\n./a.txt\n./b.bin\n\n\n\
         File: ./README.md\nContent:\nhello\n\n\
         File: ./a.txt\nContent:\nx\n\n\
         File: ./b.bin\nContent: Skipped binary file\n\n"
    );
    assert!(!output.contains(".git"));
}

#[tokio::test]
async fn flattening_is_idempotent() {
    let tmp = tempdir().unwrap();
    let repo = demo_repo(tmp.path());
    fs::create_dir_all(tmp.path().join("demo/src/nested")).unwrap();
    fs::write(tmp.path().join("demo/src/nested/mod.rs"), "pub fn f() {}").unwrap();
    fs::write(tmp.path().join("demo/src/latin.txt"), [0x63, 0x61, 0x66, 0xE9]).unwrap();

    let flattener = Flattener::new(LocalProvider::new());
    let first = flattener.process_repo(&repo, None).await.unwrap();
    let second = flattener.process_repo(&repo, None).await.unwrap();

    assert_eq!(first, second);
    assert!(first
        .content
        .contains("File: ./src/latin.txt\nContent (Latin-1 Decoded):\ncafé\n\n"));
    assert!(first.content.contains("./src/nested/\n./src/nested/mod.rs\n"));
}

#[tokio::test]
async fn missing_readme_is_reported_in_place() {
    let tmp = tempdir().unwrap();
    let repo = tmp.path().join("bare");
    fs::create_dir(&repo).unwrap();

    let output = offline_service(Settings::default())
        .get_local_repo(&repo.display().to_string())
        .await;
    assert!(output.contains("README:\nREADME not found.\n\n"));
    assert!(output.ends_with("Repository Structure: bare\n\n\n"));
}

#[tokio::test]
async fn configured_ignores_and_suffixes_apply() {
    let tmp = tempdir().unwrap();
    let repo = demo_repo(tmp.path());
    fs::create_dir_all(tmp.path().join("demo/target/debug")).unwrap();
    fs::write(tmp.path().join("demo/target/debug/out"), "built").unwrap();
    fs::write(tmp.path().join("demo/data.parquet"), "not really parquet").unwrap();

    let mut settings = Settings::default();
    settings.local.extra_ignored_dirs = vec!["target".into()];
    settings.binary.extra_suffixes = vec![".parquet".into()];

    let output = offline_service(settings).get_local_repo(&repo).await;
    assert!(!output.contains("target"));
    assert!(output.contains("File: ./data.parquet\nContent: Skipped binary file\n\n"));
}

#[tokio::test]
async fn missing_path_yields_failure_string() {
    let tmp = tempdir().unwrap();
    let missing = tmp.path().join("does-not-exist");

    let output = offline_service(Settings::default())
        .get_local_repo(&missing.display().to_string())
        .await;
    assert!(output.starts_with("Processing failed: "), "got {output}");
    assert!(!output.contains("README:"));
}

#[tokio::test]
async fn unavailable_remote_backends_report_initialisation_error() {
    let service = offline_service(Settings::default());

    assert_eq!(
        service.get_github_repo("https://github.com/o/r", None).await,
        "Processing failed: Missing credential: please set 'GITHUB_TOKEN' env param"
    );
    assert_eq!(
        service.get_gitlab_repo("https://gitlab.com/g/p", Some("main")).await,
        "Processing failed: Missing credential: please set 'GITLAB_TOKEN' env param"
    );
}

#[tokio::test]
async fn save_artifact_writes_named_file() {
    let tmp = tempdir().unwrap();
    let repo = demo_repo(tmp.path());
    let out_dir = tmp.path().join("out");

    let artifact = Flattener::new(LocalProvider::new())
        .process_repo(&repo, None)
        .await
        .unwrap();
    let written = save_artifact(&artifact, &out_dir).await.unwrap();

    assert_eq!(written, out_dir.join("demo_contents.txt"));
    assert_eq!(fs::read_to_string(written).unwrap(), artifact.content);
}
