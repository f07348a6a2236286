// ABOUTME: Integration tests for runtime configuration and local runtime detection.
// ABOUTME: Tests YAML parsing, defaults, file discovery and DOCKER_HOST handling.

use stevedore::config::*;
use stevedore::error::{Error, ErrorKind};
use stevedore::runtime::{DetectionError, RuntimeType, detect_local};
use std::time::Duration;

mod parsing {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.stop.timeout, Duration::from_secs(10));
        assert!(config.runtime.is_none());
        assert!(config.socket.is_none());
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
runtime: podman
socket: /run/user/1000/podman/podman.sock
timeout: 2m 30s
stop:
  timeout: 45s
"#;
        let config = Config::from_yaml(yaml).unwrap();

        assert_eq!(config.runtime, Some(RuntimeType::Podman));
        assert_eq!(
            config.socket.as_deref(),
            Some("/run/user/1000/podman/podman.sock")
        );
        assert_eq!(config.timeout, Duration::from_secs(150));
        assert_eq!(config.stop.timeout, Duration::from_secs(45));
    }

    #[test]
    fn stop_section_defaults_missing_timeout() {
        let config = Config::from_yaml("stop: {}").unwrap();
        assert_eq!(config.stop, StopConfig::default());
    }

    #[test]
    fn unknown_runtime_is_rejected() {
        let err = Config::from_yaml("runtime: containerd").unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
        assert_eq!(err.kind(), ErrorKind::ConfigFile);
    }

    #[test]
    fn malformed_duration_is_rejected() {
        assert!(Config::from_yaml("timeout: soon").is_err());
    }
}

mod discovery {
    use super::*;
    use std::fs;

    #[test]
    fn finds_primary_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "runtime: docker\n").unwrap();

        let config = Config::discover(dir.path()).unwrap();

        assert_eq!(config.runtime, Some(RuntimeType::Docker));
    }

    #[test]
    fn primary_file_wins_over_alternatives() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "timeout: 5s\n").unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME_ALT), "timeout: 9s\n").unwrap();

        let config = Config::discover(dir.path()).unwrap();

        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn finds_file_in_dot_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".stevedore")).unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME_DIR), "stop:\n  timeout: 1s\n").unwrap();

        let config = Config::discover(dir.path()).unwrap();

        assert_eq!(config.stop.timeout, Duration::from_secs(1));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();

        let err = Config::discover(dir.path()).unwrap_err();

        assert!(matches!(err, Error::ConfigNotFound(ref p) if p == dir.path()));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            Config::discover_or_default(dir.path()).unwrap(),
            Config::default()
        );
    }

    #[test]
    fn broken_file_is_not_masked_by_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "timeout: [1, 2]\n").unwrap();

        assert!(Config::discover_or_default(dir.path()).is_err());
    }
}

mod detection {
    use super::*;

    #[test]
    fn explicit_runtime_uses_default_socket() {
        let config = Config {
            runtime: Some(RuntimeType::Podman),
            ..Config::default()
        };

        let socket = detect_local(&config).unwrap();

        assert_eq!(socket.runtime_type, RuntimeType::Podman);
        assert_eq!(socket.socket_path, "/run/podman/podman.sock");
    }

    #[test]
    fn explicit_socket_guesses_runtime() {
        let config = Config {
            socket: Some("/tmp/podman/podman.sock".to_string()),
            ..Config::default()
        };

        let socket = detect_local(&config).unwrap();

        assert_eq!(socket.runtime_type, RuntimeType::Podman);
        assert_eq!(socket.socket_path, "/tmp/podman/podman.sock");
    }

    #[test]
    fn explicit_config_beats_docker_host() {
        temp_env::with_var("DOCKER_HOST", Some("unix:///tmp/other.sock"), || {
            let config = Config {
                runtime: Some(RuntimeType::Docker),
                socket: Some("/tmp/mine.sock".to_string()),
                ..Config::default()
            };

            let socket = detect_local(&config).unwrap();

            assert_eq!(socket.socket_path, "/tmp/mine.sock");
        });
    }

    #[test]
    fn docker_host_unix_socket() {
        temp_env::with_var("DOCKER_HOST", Some("unix:///tmp/docker-test.sock"), || {
            let socket = detect_local(&Config::default()).unwrap();

            assert_eq!(socket.runtime_type, RuntimeType::Docker);
            assert_eq!(socket.socket_path, "/tmp/docker-test.sock");
        });
    }

    #[test]
    fn docker_host_tcp_is_unsupported() {
        temp_env::with_var("DOCKER_HOST", Some("tcp://10.0.0.5:2375"), || {
            let err = detect_local(&Config::default()).unwrap_err();

            assert!(matches!(err, DetectionError::UnsupportedHost(ref h) if h == "tcp://10.0.0.5:2375"));
        });
    }
}
