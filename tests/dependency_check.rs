// tests/dependency_check.rs
mod common;

use common::{TestResult, init_tracing, root};

use devlaunch::check::{check_dependencies, run_checks};
use devlaunch::errors::LauncherError;
use devlaunch::toolchain::RuntimeVersion;
use devlaunch_test_utils::builders::{
    LayoutBuilder, fake_context, healthy_toolchain, sentinel_args, test_config, venv_pip,
    venv_python,
};
use devlaunch_test_utils::fake_backend::{FakeProcessBackend, FakeResponse};

#[tokio::test]
async fn complete_layout_passes_without_touching_anything() -> TestResult {
    init_tracing();
    let config = test_config(&root());
    let backend = FakeProcessBackend::new();
    healthy_toolchain(&backend, &config);
    let fs = LayoutBuilder::complete(&config).build();

    let ctx = fake_context(config.clone(), backend.clone(), fs);
    let report = run_checks(&ctx).await?;

    assert_eq!(report.runtime_version, RuntimeVersion::new(3, 11, 4));
    assert_eq!(report.package_manager.version, "10.2.4");
    assert!(!report.venv_created);
    assert!(!report.packages_installed);

    assert_eq!(
        backend.commands(),
        vec![
            "python3 --version".to_string(),
            "npm --version".to_string(),
            format!(
                "{} -c import google.generativeai",
                venv_python(&config).display()
            ),
        ]
    );
    assert!(backend.spawned().is_empty());
    Ok(())
}

#[tokio::test]
async fn old_interpreter_fails_before_any_remediation() {
    init_tracing();
    let config = test_config(&root());
    let backend = FakeProcessBackend::new();
    healthy_toolchain(&backend, &config);
    backend.respond(
        "python3",
        &["--version"],
        FakeResponse::Success("Python 3.7.9".to_string()),
    );
    let fs = LayoutBuilder::complete(&config).without_venv().build();

    let ctx = fake_context(config, backend.clone(), fs);
    let err = run_checks(&ctx).await.unwrap_err();

    assert!(matches!(err, LauncherError::Toolchain(ref m) if m.contains("3.7.9")));
    assert_eq!(backend.commands(), vec!["python3 --version".to_string()]);
}

#[tokio::test]
async fn missing_interpreter_is_a_toolchain_error() {
    init_tracing();
    let config = test_config(&root());
    let backend = FakeProcessBackend::new();
    let fs = LayoutBuilder::complete(&config).build();

    let ctx = fake_context(config, backend, fs);
    let err = run_checks(&ctx).await.unwrap_err();

    assert!(matches!(err, LauncherError::Toolchain(_)));
}

#[tokio::test]
async fn interpreter_that_exits_non_zero_is_not_accepted() {
    init_tracing();
    let config = test_config(&root());
    let backend = FakeProcessBackend::new();
    healthy_toolchain(&backend, &config);
    backend.respond(
        "python3",
        &["--version"],
        FakeResponse::Fail {
            code: 9009,
            stderr: "Python was not found".to_string(),
        },
    );

    let ctx = fake_context(config.clone(), backend, LayoutBuilder::complete(&config).build());
    assert!(matches!(
        run_checks(&ctx).await,
        Err(LauncherError::Toolchain(_))
    ));
}

#[tokio::test]
async fn missing_package_manager_fails_the_check() {
    init_tracing();
    let config = test_config(&root());
    let backend = FakeProcessBackend::new();
    healthy_toolchain(&backend, &config);
    backend.respond("npm", &["--version"], FakeResponse::NotFound);
    let fs = LayoutBuilder::complete(&config).without_venv().build();

    let ctx = fake_context(config, backend.clone(), fs);
    let err = run_checks(&ctx).await.unwrap_err();

    assert!(matches!(err, LauncherError::Toolchain(ref m) if m.contains("npm not found")));
    assert!(
        !backend.commands().iter().any(|c| c.contains("-m venv")),
        "no venv may be created once the toolchain check failed"
    );
}

#[tokio::test]
async fn missing_backend_directory_is_not_created() {
    init_tracing();
    let config = test_config(&root());
    let backend = FakeProcessBackend::new();
    healthy_toolchain(&backend, &config);
    let fs = LayoutBuilder::complete(&config).without_backend_dir().build();

    let ctx = fake_context(config, backend.clone(), fs);
    let err = run_checks(&ctx).await.unwrap_err();

    assert!(matches!(err, LauncherError::MissingPrerequisite(ref m) if m.contains("backend directory")));
    assert_eq!(backend.commands().len(), 2);
}

#[tokio::test]
async fn missing_venv_is_created_with_the_host_interpreter() -> TestResult {
    init_tracing();
    let config = test_config(&root());
    let backend = FakeProcessBackend::new();
    healthy_toolchain(&backend, &config);
    let fs = LayoutBuilder::complete(&config).without_venv().build();

    let venv_dir = config.backend.venv_dir.display().to_string();
    backend.respond_and_create(
        "python3",
        &["-m", "venv", venv_dir.as_str()],
        FakeResponse::Success(String::new()),
        &fs,
        vec![venv_python(&config), venv_pip(&config)],
    );

    let ctx = fake_context(config.clone(), backend.clone(), fs);
    let report = run_checks(&ctx).await?;

    assert!(report.venv_created);
    assert!(!report.packages_installed);
    let creations = backend
        .commands()
        .into_iter()
        .filter(|c| c.contains("-m venv"))
        .count();
    assert_eq!(creations, 1);
    Ok(())
}

#[tokio::test]
async fn failed_venv_creation_stops_the_check() {
    init_tracing();
    let config = test_config(&root());
    let backend = FakeProcessBackend::new();
    healthy_toolchain(&backend, &config);
    let fs = LayoutBuilder::complete(&config).without_venv().build();

    let venv_dir = config.backend.venv_dir.display().to_string();
    backend.respond(
        "python3",
        &["-m", "venv", venv_dir.as_str()],
        FakeResponse::Fail {
            code: 1,
            stderr: "ensurepip is not available".to_string(),
        },
    );

    let ctx = fake_context(config, backend.clone(), fs);
    let err = run_checks(&ctx).await.unwrap_err();

    assert!(matches!(err, LauncherError::RemediationFailed(_)));
    assert!(!backend.commands().iter().any(|c| c.contains("import")));
}

#[tokio::test]
async fn venv_without_interpreter_is_reported() {
    init_tracing();
    let config = test_config(&root());
    let backend = FakeProcessBackend::new();
    healthy_toolchain(&backend, &config);
    let fs = LayoutBuilder::complete(&config).without_venv().build();

    // Creation "succeeds" but leaves no interpreter behind.
    let venv_dir = config.backend.venv_dir.display().to_string();
    backend.respond_and_create(
        "python3",
        &["-m", "venv", venv_dir.as_str()],
        FakeResponse::Success(String::new()),
        &fs,
        vec![config.backend.venv_dir.join("pyvenv.cfg")],
    );

    let ctx = fake_context(config, backend, fs);
    let err = run_checks(&ctx).await.unwrap_err();

    assert!(matches!(err, LauncherError::MissingPrerequisite(ref m) if m.contains("virtual environment")));
}

#[tokio::test]
async fn missing_manifest_is_reported() {
    init_tracing();
    let config = test_config(&root());
    let backend = FakeProcessBackend::new();
    healthy_toolchain(&backend, &config);
    let fs = LayoutBuilder::complete(&config).without_manifest().build();

    let ctx = fake_context(config, backend, fs);
    let err = run_checks(&ctx).await.unwrap_err();

    assert!(matches!(err, LauncherError::MissingPrerequisite(ref m) if m.contains("requirements.txt")));
}

#[tokio::test]
async fn failed_sentinel_import_installs_the_manifest_once() -> TestResult {
    init_tracing();
    let config = test_config(&root());
    let backend = FakeProcessBackend::new();
    healthy_toolchain(&backend, &config);

    let [c, import] = sentinel_args(&config);
    backend.respond(
        venv_python(&config),
        &[c.as_str(), import.as_str()],
        FakeResponse::Fail {
            code: 1,
            stderr: "ModuleNotFoundError: No module named 'google'".to_string(),
        },
    );
    let manifest = config.backend.manifest.display().to_string();
    backend.respond(
        venv_pip(&config),
        &["install", "-r", manifest.as_str()],
        FakeResponse::Success(String::new()),
    );

    let ctx = fake_context(config.clone(), backend.clone(), LayoutBuilder::complete(&config).build());
    let report = run_checks(&ctx).await?;

    assert!(report.packages_installed);
    let installs: Vec<_> = backend
        .commands()
        .into_iter()
        .filter(|c| c.contains("install -r"))
        .collect();
    assert_eq!(
        installs,
        vec![format!("{} install -r {manifest}", venv_pip(&config).display())]
    );
    Ok(())
}

#[tokio::test]
async fn failed_install_fails_the_check() {
    init_tracing();
    let config = test_config(&root());
    let backend = FakeProcessBackend::new();
    healthy_toolchain(&backend, &config);

    let [c, import] = sentinel_args(&config);
    backend.respond(
        venv_python(&config),
        &[c.as_str(), import.as_str()],
        FakeResponse::Fail {
            code: 1,
            stderr: String::new(),
        },
    );
    backend.respond_any(
        venv_pip(&config),
        FakeResponse::Fail {
            code: 1,
            stderr: "No matching distribution".to_string(),
        },
    );

    let ctx = fake_context(config.clone(), backend, LayoutBuilder::complete(&config).build());

    assert!(matches!(
        run_checks(&ctx).await,
        Err(LauncherError::RemediationFailed(_))
    ));
    assert!(!check_dependencies(&ctx).await);
}

#[tokio::test]
async fn missing_dependency_cache_points_at_install() {
    init_tracing();
    let config = test_config(&root());
    let backend = FakeProcessBackend::new();
    healthy_toolchain(&backend, &config);
    let fs = LayoutBuilder::complete(&config)
        .without_dependency_cache()
        .build();

    let ctx = fake_context(config, backend.clone(), fs);
    let err = run_checks(&ctx).await.unwrap_err();

    assert!(matches!(err, LauncherError::MissingPrerequisite(ref m) if m.contains("npm install")));
    assert!(backend.spawned().is_empty());
}

#[tokio::test]
async fn check_dependencies_reports_pass_as_true() {
    init_tracing();
    let config = test_config(&root());
    let backend = FakeProcessBackend::new();
    healthy_toolchain(&backend, &config);

    let ctx = fake_context(config.clone(), backend, LayoutBuilder::complete(&config).build());
    assert!(check_dependencies(&ctx).await);
}

/// Fresh venv without the sentinel package: created first, then installed.
fn fresh_venv_needing_install(
    backend: &FakeProcessBackend,
    config: &devlaunch::config::LauncherConfig,
) -> devlaunch::fs::mock::MockFileSystem {
    healthy_toolchain(backend, config);
    let fs = LayoutBuilder::complete(config).without_venv().build();

    let venv_dir = config.backend.venv_dir.display().to_string();
    backend.respond_and_create(
        "python3",
        &["-m", "venv", venv_dir.as_str()],
        FakeResponse::Success(String::new()),
        &fs,
        vec![venv_python(config), venv_pip(config)],
    );

    let [c, import] = sentinel_args(config);
    backend.respond(
        venv_python(config),
        &[c.as_str(), import.as_str()],
        FakeResponse::Fail {
            code: 1,
            stderr: "ModuleNotFoundError: No module named 'google'".to_string(),
        },
    );
    fs
}

fn count_matching(backend: &FakeProcessBackend, needle: &str) -> usize {
    backend
        .commands()
        .iter()
        .filter(|c| c.contains(needle))
        .count()
}

#[tokio::test]
async fn created_venv_then_successful_install_passes() -> TestResult {
    init_tracing();
    let config = test_config(&root());
    let backend = FakeProcessBackend::new();
    let fs = fresh_venv_needing_install(&backend, &config);
    backend.respond_any(venv_pip(&config), FakeResponse::Success(String::new()));

    let ctx = fake_context(config, backend.clone(), fs);
    let report = run_checks(&ctx).await?;

    assert!(report.venv_created);
    assert!(report.packages_installed);
    assert_eq!(count_matching(&backend, "-m venv"), 1);
    assert_eq!(count_matching(&backend, "install -r"), 1);
    Ok(())
}

#[tokio::test]
async fn created_venv_then_failed_install_fails() {
    init_tracing();
    let config = test_config(&root());
    let backend = FakeProcessBackend::new();
    let fs = fresh_venv_needing_install(&backend, &config);
    backend.respond_any(
        venv_pip(&config),
        FakeResponse::Fail {
            code: 1,
            stderr: "No matching distribution".to_string(),
        },
    );

    let ctx = fake_context(config, backend.clone(), fs);
    let err = run_checks(&ctx).await.unwrap_err();

    assert!(matches!(err, LauncherError::RemediationFailed(ref m) if m.contains("install")));
    assert_eq!(count_matching(&backend, "-m venv"), 1);
    assert_eq!(count_matching(&backend, "install -r"), 1);
}
