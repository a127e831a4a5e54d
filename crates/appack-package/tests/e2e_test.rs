//! End-to-end tests for application packages.
//!
//! These tests drive the full pipeline across crates:
//! 1. Initialize a package from a compose file and `.env`
//! 2. Locate packages by name, path, and directory scan
//! 3. Merge and split between encodings, in place and to new outputs
//! 4. Render with defaults, parameters files, and `--set` overrides
//! 5. Inspect and validate

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use appack_common::config::AppConfig;
use appack_common::error::AppError;
use appack_common::types::{Encoding, OutputFormat};
use appack_package::init::{InitRequest, init};
use appack_package::render::{RenderOptions, parameter_sources, render_package};
use appack_package::validate::validate_package;
use appack_package::{Attachment, Package, Replace, load, locate, merge, save, split, transform};
use appack_params::Environment;
use proptest::prelude::*;

const COMPOSE: &str = "version: \"3.2\"
services:
  nginx:
    image: nginx:latest
    command: nginx $NGINX_ARGS ${NGINX_DRY_RUN}
";

fn write(path: &Path, text: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("mkdir");
    }
    std::fs::write(path, text).expect("write");
}

fn init_app(dir: &Path, name: &str, single_file: bool) -> PathBuf {
    write(&dir.join("docker-compose.yml"), COMPOSE);
    write(&dir.join(".env"), "# some comment\nNGINX_DRY_RUN=-t");
    let request = InitRequest {
        name: name.into(),
        compose_file: Some(dir.join("docker-compose.yml")),
        description: Some("my cool app".into()),
        maintainers: vec!["bob".into(), "joe:joe@joe.com".into()],
        single_file,
        ..InitRequest::default()
    };
    init(&request, dir, &AppConfig::default()).expect("init")
}

fn attachments_app(dir: &Path) -> PathBuf {
    let root = dir.join("attachments.dockerapp");
    write(&root.join("metadata.yml"), "version: 0.1.0\nname: attachments\n");
    write(
        &root.join("docker-compose.yml"),
        "version: \"3.6\"\nservices:\n  web:\n    image: nginx:${tag}\n",
    );
    write(&root.join("parameters.yml"), "tag: latest\n");
    write(&root.join("config.cfg"), "something\n");
    write(&root.join("nesteddir/config2.cfg"), "nested\n");
    root
}

/// Snapshot of every regular file below `root`, keyed by relative path.
fn tree(root: &Path) -> Vec<(String, Vec<u8>)> {
    walkdir::WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| entry.expect("walk"))
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let rel = entry
                .path()
                .strip_prefix(root)
                .expect("prefix")
                .to_string_lossy()
                .replace('\\', "/");
            (rel, std::fs::read(entry.path()).expect("read"))
        })
        .collect()
}

// ── Init ─────────────────────────────────────────────────────────────

#[test]
fn init_seeds_parameters_from_compose_and_env() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = init_app(dir.path(), "app-test", false);

    assert_eq!(app, dir.path().join("app-test.dockerapp"));
    assert_eq!(
        std::fs::read_to_string(app.join("docker-compose.yml")).expect("compose"),
        COMPOSE
    );
    let params = std::fs::read_to_string(app.join("parameters.yml")).expect("params");
    assert!(params.starts_with("NGINX_ARGS: FILL ME\n"), "got: {params}");
    let parsed: serde_yaml::Mapping = serde_yaml::from_str(&params).expect("yaml");
    assert_eq!(parsed.get("NGINX_DRY_RUN").and_then(|v| v.as_str()), Some("-t"));

    let metadata = std::fs::read_to_string(app.join("metadata.yml")).expect("metadata");
    assert!(metadata.contains("# Name of the application\nname: app-test\n"));
    assert!(metadata.contains("  - name: bob\n    email: \n"));
}

#[test]
fn init_single_file_is_usable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = init_app(dir.path(), "tac", true);
    assert!(app.is_file());

    let location = locate(Some("tac"), dir.path()).expect("locate");
    assert_eq!(location.encoding, Encoding::SingleFile);
    let package = load(&location.path, location.encoding).expect("load");
    assert_eq!(package.name(), "tac");

    let report = appack_package::inspect::inspect(&package, &Environment::empty()).expect("inspect");
    assert_eq!(report.services.len(), 1);
}

#[test]
fn init_refuses_existing_package() {
    let dir = tempfile::tempdir().expect("tempdir");
    let _ = init_app(dir.path(), "app-test", false);
    let request = InitRequest {
        name: "app-test".into(),
        ..InitRequest::default()
    };
    let err = init(&request, dir.path(), &AppConfig::default()).unwrap_err();
    assert!(matches!(err, AppError::DestinationExists { .. }));
}

#[test]
fn init_then_validate_succeeds() {
    let dir = tempfile::tempdir().expect("tempdir");
    let _ = init_app(dir.path(), "app-test", false);
    let location = locate(Some("app-test"), dir.path()).expect("locate");
    let package = load(&location.path, location.encoding).expect("load");
    let sources = parameter_sources(&package, &RenderOptions::default()).expect("sources");
    let report = validate_package(&package, &sources, &Environment::empty());
    assert!(report.is_valid(), "{:?}", report.problems());
}

// ── Locator ──────────────────────────────────────────────────────────

#[test]
fn detect_app_in_and_around_package() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = attachments_app(dir.path());

    assert_eq!(locate(None, dir.path()).expect("scan").path, app);
    assert_eq!(locate(None, &app).expect("cwd").path, app);
    assert_eq!(locate(Some("."), &app).expect("dot").path, app);
}

#[test]
fn detect_app_ambiguity_never_picks() {
    let dir = tempfile::tempdir().expect("tempdir");
    let render = dir.path().join("render");
    let _ = attachments_app(&render.join("app1"));
    std::fs::rename(
        render.join("app1").join("attachments.dockerapp"),
        render.join("app1.dockerapp"),
    )
    .expect("rename");
    let _ = attachments_app(&render);
    std::fs::rename(render.join("attachments.dockerapp"), render.join("app2.dockerapp"))
        .expect("rename");

    let err = locate(None, &render).unwrap_err();
    assert!(matches!(err, AppError::MultipleApplications { .. }));
    assert!(err.to_string().starts_with(
        "multiple applications found in current directory, specify the application name on the command line"
    ));
}

// ── Split / Merge ────────────────────────────────────────────────────

#[test]
fn merge_split_round_trip_is_byte_identical() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = attachments_app(dir.path());
    let original = tree(&app);

    let merged = dir.path().join("remerged.dockerapp");
    let source = locate(Some("attachments"), dir.path()).expect("locate");
    let _ = transform(&source, Some(&merged), Replace::Never, Encoding::SingleFile).expect("merge");

    let merged_loc = locate(Some("remerged"), dir.path()).expect("locate merged");
    assert_eq!(merged_loc.encoding, Encoding::SingleFile);
    let split_dir = dir.path().join("split.dockerapp");
    let _ = transform(&merged_loc, Some(&split_dir), Replace::Never, Encoding::MultiFile)
        .expect("split");

    assert_eq!(tree(&split_dir), original);
}

#[test]
fn merge_then_split_in_place() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = attachments_app(dir.path());
    let original = tree(&app);
    let digest = load(&app, Encoding::MultiFile).expect("load").digest();

    let loc = locate(Some("attachments"), dir.path()).expect("locate");
    let _ = transform(&loc, None, Replace::Never, Encoding::SingleFile).expect("merge");
    let loc = locate(Some("attachments"), dir.path()).expect("locate");
    assert_eq!(loc.encoding, Encoding::SingleFile);
    assert_eq!(load(&loc.path, loc.encoding).expect("load").digest(), digest);

    let _ = transform(&loc, None, Replace::Never, Encoding::MultiFile).expect("split");
    assert_eq!(tree(&app), original);
}

#[test]
fn document_start_markers_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().join("marked.dockerapp");
    write(&root.join("metadata.yml"), "---\nversion: 0.1.0\nname: marked\n");
    write(
        &root.join("docker-compose.yml"),
        "---\nversion: \"3.6\"\nservices:\n  web:\n    image: nginx:${tag}\n",
    );
    write(&root.join("parameters.yml"), "---\ntag: latest\n");
    let original = tree(&root);

    let package = load(&root, Encoding::MultiFile).expect("load");
    assert_eq!(package.name(), "marked");
    let sources = parameter_sources(&package, &RenderOptions::default()).expect("sources");
    assert!(validate_package(&package, &sources, &Environment::empty()).is_valid());
    let json = render_package(
        &package,
        &RenderOptions {
            format: OutputFormat::Json,
            ..RenderOptions::default()
        },
        &Environment::empty(),
    )
    .expect("render");
    let value: serde_json::Value = serde_json::from_slice(&json.bytes).expect("json");
    assert_eq!(value["services"]["web"]["image"], "nginx:latest");

    let loc = locate(Some("marked"), dir.path()).expect("locate");
    let _ = transform(&loc, None, Replace::Never, Encoding::SingleFile).expect("merge");
    let merged = load(&root, Encoding::SingleFile).expect("load merged");
    assert_eq!(merged.compose().as_str(), package.compose().as_str());
    assert_eq!(merged.digest(), package.digest());

    let loc = locate(Some("marked"), dir.path()).expect("locate");
    let _ = transform(&loc, None, Replace::Never, Encoding::MultiFile).expect("split");
    assert_eq!(tree(&root), original);
}

#[cfg(unix)]
#[test]
fn merged_package_is_not_owner_only() {
    use std::os::unix::fs::PermissionsExt as _;

    let dir = tempfile::tempdir().expect("tempdir");
    let _ = attachments_app(dir.path());
    let loc = locate(Some("attachments"), dir.path()).expect("locate");
    let merged = dir.path().join("merged.dockerapp");
    let _ = transform(&loc, Some(&merged), Replace::Never, Encoding::SingleFile).expect("merge");

    let reference = dir.path().join("reference");
    write(&reference, "");
    let mode = |path: &Path| std::fs::metadata(path).expect("metadata").permissions().mode() & 0o777;
    assert_eq!(mode(&merged), mode(&reference));
}

#[test]
fn merged_output_does_not_depend_on_destination() {
    let dir = tempfile::tempdir().expect("tempdir");
    let _ = attachments_app(dir.path());
    let loc = locate(Some("attachments"), dir.path()).expect("locate");

    let a = dir.path().join("a.dockerapp");
    let b = dir.path().join("nested").join("b");
    std::fs::create_dir_all(dir.path().join("nested")).expect("mkdir");
    let _ = transform(&loc, Some(&a), Replace::Never, Encoding::SingleFile).expect("a");
    let _ = transform(&loc, Some(&b), Replace::Never, Encoding::SingleFile).expect("b");
    assert_eq!(std::fs::read(a).expect("a"), std::fs::read(b).expect("b"));
}

#[test]
fn corrupt_single_file_is_invalid_format() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.dockerapp");
    write(&path, "name: broken\n---\nservices: {}\n");
    let loc = locate(Some("broken"), dir.path()).expect("locate");
    let err = load(&loc.path, loc.encoding).unwrap_err();
    assert!(matches!(err, AppError::InvalidPackageFormat { .. }));
}

// ── Render ───────────────────────────────────────────────────────────

#[test]
fn render_set_beats_parameters_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().join("simple.dockerapp");
    write(&root.join("metadata.yml"), "version: 1.1.0-beta1\nname: simple\n");
    write(
        &root.join("docker-compose.yml"),
        "version: \"3.6\"\nservices:\n  web:\n    image: nginx:latest\n    ports:\n      - ${web_port}:80\n",
    );
    write(&root.join("parameters.yml"), "web_port: 8082\n");
    let params_file = dir.path().join("parameters-0.yml");
    write(&params_file, "web_port: 8080\n");

    let package = load(&root, Encoding::MultiFile).expect("load");
    let options = RenderOptions {
        parameter_files: vec![params_file],
        sets: vec!["web_port=8081".into()],
        format: OutputFormat::Yaml,
    };
    let out = render_package(&package, &options, &Environment::empty()).expect("render");
    let text = String::from_utf8(out.bytes).expect("utf8");
    assert!(text.contains("- 8081:80"), "got: {text}");

    let json = render_package(
        &package,
        &RenderOptions {
            format: OutputFormat::Json,
            ..options
        },
        &Environment::empty(),
    )
    .expect("json");
    let value: serde_json::Value = serde_json::from_slice(&json.bytes).expect("json");
    assert_eq!(value["services"]["web"]["ports"][0], "8081:80");
}

#[test]
fn render_uses_environment_snapshot() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = attachments_app(dir.path());
    write(&root.join("parameters.yml"), "");
    let package = load(&root, Encoding::MultiFile).expect("load");
    let env: Environment = [("tag", "1.25")].into_iter().collect();
    let out = render_package(&package, &RenderOptions::default(), &env).expect("render");
    assert!(String::from_utf8_lossy(&out.bytes).contains("nginx:1.25"));
    assert!(out.unfilled.is_empty());
}

// ── Validate ─────────────────────────────────────────────────────────

#[test]
fn validate_empty_name_is_schema_violation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = attachments_app(dir.path());
    write(&root.join("metadata.yml"), "version: 0.1.0\nname:\n");
    let package = load(&root, Encoding::MultiFile).expect("load");
    let sources = parameter_sources(&package, &RenderOptions::default()).expect("sources");
    let err = validate_package(&package, &sources, &Environment::empty())
        .into_result()
        .unwrap_err();
    assert!(matches!(err, AppError::SchemaViolation { .. }), "got: {err}");
}

// ── Properties ───────────────────────────────────────────────────────

fn arb_document() -> impl Strategy<Value = String> {
    proptest::collection::vec("[a-z]{1,6}: [a-z0-9]{0,10}", 0..4)
        .prop_map(|lines| lines.iter().map(|l| format!("{l}\n")).collect())
}

fn arb_content() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        "[ -~\n]{0,40}".prop_map(String::into_bytes),
        proptest::collection::vec(any::<u8>(), 0..32).prop_map(|mut bytes| {
            bytes.insert(0, 0xff);
            bytes
        }),
    ]
}

fn arb_attachments() -> impl Strategy<Value = Vec<(String, Vec<u8>)>> {
    proptest::collection::btree_map("[a-z]{1,5}(/[a-z]{1,5}){0,2}\\.txt", arb_content(), 0..4)
        .prop_map(|m| m.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn split_merge_split_is_identity(
        marker in any::<bool>(),
        compose in arb_document(),
        parameters in arb_document(),
        attachments in arb_attachments(),
    ) {
        let origin = Path::new("prop.dockerapp");
        let attachments: Vec<Attachment> = attachments
            .into_iter()
            .map(|(p, b)| Attachment::new(origin, p, b).expect("attachment"))
            .collect();
        let parsed: Option<serde_yaml::Mapping> = serde_yaml::from_str(&parameters).ok();
        prop_assume!(parsed.is_some() || parameters.is_empty());

        let compose = if marker { format!("---\n{compose}") } else { compose };

        let package = Package::from_documents(
            origin,
            "version: 0.1.0\nname: prop\n".into(),
            compose,
            parameters,
            attachments,
            Encoding::MultiFile,
        )
        .expect("package");

        let dir = tempfile::tempdir().expect("tempdir");
        let split_path = dir.path().join("q.dockerapp");
        save(&split(package.clone()), &split_path, Replace::Never).expect("save split");

        let merged_path = dir.path().join("p.dockerapp");
        let loaded = load(&split_path, Encoding::MultiFile).expect("load split");
        save(&merge(loaded), &merged_path, Replace::Never).expect("save merged");

        let resplit = split(load(&merged_path, Encoding::SingleFile).expect("load merged"));
        prop_assert_eq!(resplit.digest(), package.digest());
        prop_assert_eq!(resplit, split(package));
    }
}
