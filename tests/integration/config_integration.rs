//! Configuration loading through the public loader.

use super::test_utils::with_isolated_env;
use scout::cli::RunContext;
use scout::config::ConfigLoader;
use scout::error::ApiError;

#[test]
fn test_defaults_without_any_files() {
    with_isolated_env(|temp| {
        let config = ConfigLoader::load(temp.path()).unwrap();
        assert_eq!(config.solver.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.solver.request_timeout_secs, 120);
        assert_eq!(config.logging.level, "info");
    });
}

#[test]
fn test_global_file_then_workspace_then_env() {
    with_isolated_env(|temp| {
        let global_dir = temp.path().join("home").join(".config").join("scout");
        std::fs::create_dir_all(&global_dir).unwrap();
        std::fs::write(
            global_dir.join("config.toml"),
            "[solver]\nbase_url = \"http://global:5000\"\nrequest_timeout_secs = 15\n\n[logging]\nlevel = \"warn\"\n",
        )
        .unwrap();

        let workspace = temp.path().join("ws");
        std::fs::create_dir_all(workspace.join("config")).unwrap();
        std::fs::write(
            workspace.join("config").join("config.toml"),
            "[solver]\nbase_url = \"http://workspace:5000\"\n",
        )
        .unwrap();

        let config = ConfigLoader::load(&workspace).unwrap();
        assert_eq!(config.solver.base_url, "http://workspace:5000");
        assert_eq!(config.solver.request_timeout_secs, 15);
        assert_eq!(config.logging.level, "warn");

        std::env::set_var("SCOUT__LOGGING__LEVEL", "debug");
        let config = ConfigLoader::load(&workspace).unwrap();
        assert_eq!(config.logging.level, "debug");
    });
}

#[test]
fn test_run_context_rejects_invalid_solver_url() {
    with_isolated_env(|temp| {
        let result = RunContext::new(
            temp.path().to_path_buf(),
            None,
            Some("solver-without-scheme".to_string()),
        );
        assert!(matches!(result, Err(ApiError::ConfigError(_))));
    });
}

#[test]
fn test_run_context_applies_solver_url_override() {
    with_isolated_env(|temp| {
        let context = RunContext::new(
            temp.path().to_path_buf(),
            None,
            Some("http://10.0.0.5:5000".to_string()),
        )
        .unwrap();
        assert_eq!(context.config().solver.base_url, "http://10.0.0.5:5000");
    });
}

#[test]
fn test_explicit_config_file() {
    with_isolated_env(|temp| {
        let path = temp.path().join("custom.toml");
        std::fs::write(&path, "[solver]\ngenerate_path = \"/designs\"\n").unwrap();
        let context = RunContext::new(temp.path().to_path_buf(), Some(path), None).unwrap();
        assert_eq!(context.config().solver.generate_path, "/designs");
        assert_eq!(context.config().solver.validate_path, "/check");
    });
}
