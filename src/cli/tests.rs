//! Unit tests for CLI parsing and configuration layering

use crate::cli::{demo_router, resolve_config, Cli, Commands, ConfigArgs};
use crate::runtime_config::RuntimeConfig;
use clap::Parser;
use http::{Method, StatusCode};
use std::fs;
use std::path::PathBuf;

#[test]
fn test_serve_command_with_flags() {
    let cli = Cli::try_parse_from([
        "gyr",
        "serve",
        "--addr",
        "0.0.0.0:9999",
        "--static-dir",
        "public",
        "-c",
        "gyr.toml",
    ])
    .unwrap();

    match cli.command {
        Commands::Serve { config } => {
            assert_eq!(config.addr.as_deref(), Some("0.0.0.0:9999"));
            assert_eq!(config.static_dir, Some(PathBuf::from("public")));
            assert_eq!(config.config, Some(PathBuf::from("gyr.toml")));
            assert!(config.env_file.is_none());
        }
        other => panic!("Expected Serve command, got {other:?}"),
    }
}

#[test]
fn test_routes_command_exists() {
    let cli = Cli::try_parse_from(["gyr", "routes"]).unwrap();
    assert!(matches!(cli.command, Commands::Routes { .. }));
}

#[test]
fn test_unknown_command_rejected() {
    assert!(Cli::try_parse_from(["gyr", "generate"]).is_err());
}

#[test]
fn test_flags_override_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("gyr.toml");
    fs::write(&config_path, "addr = \"127.0.0.1:7000\"\nmax_body_bytes = 64\n").unwrap();
    let env_path = dir.path().join("test.env");
    fs::write(&env_path, "GYR_CLI_TEST_MARKER=1\n").unwrap();

    let args = ConfigArgs {
        config: Some(config_path),
        addr: Some(String::from("127.0.0.1:7001")),
        static_dir: None,
        env_file: Some(env_path.clone()),
    };
    let config = resolve_config(&args).unwrap();

    assert_eq!(config.addr, "127.0.0.1:7001");
    assert_eq!(config.max_body_bytes, 64);
    assert_eq!(config.env_file, Some(env_path));
    assert_eq!(std::env::var("GYR_CLI_TEST_MARKER").unwrap(), "1");
}

#[test]
fn test_missing_explicit_env_file_fails() {
    let args = ConfigArgs {
        env_file: Some(PathBuf::from("/definitely/not/here.env")),
        ..ConfigArgs::default()
    };
    assert!(resolve_config(&args).is_err());
}

#[test]
fn test_demo_router_serves_pets() {
    let dispatcher = demo_router(&RuntimeConfig::default())
        .unwrap()
        .into_dispatcher();

    let response = dispatcher.call(Method::GET, "/api/pets/7");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), b"pet 7");

    let response = dispatcher.call(Method::GET, "/api/pets/rex");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = dispatcher.call(Method::DELETE, "/api/pets");
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let response = dispatcher.call(Method::GET, "/metrics");
    assert_eq!(response.body(), b"gyr_api_requests_total 2\n");
}

#[test]
fn test_demo_router_mounts_static_dir() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), "<p>hi</p>").unwrap();
    let config = RuntimeConfig {
        static_dir: Some(dir.path().to_path_buf()),
        ..RuntimeConfig::default()
    };
    let dispatcher = demo_router(&config).unwrap().into_dispatcher();

    let response = dispatcher.call(Method::GET, "/static/index.html");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), b"<p>hi</p>");
}
