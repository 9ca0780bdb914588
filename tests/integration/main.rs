//! Integration tests for Cavern

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Isolated home: config, state and install locations under one temp dir
    struct Sandbox {
        root: TempDir,
    }

    impl Sandbox {
        fn new() -> Self {
            let sandbox = Self {
                root: TempDir::new().unwrap(),
            };
            let games = sandbox.games();
            std::fs::write(
                sandbox.config_path(),
                format!(
                    "[install]\ndefault_location = \"appdata\"\n\n[install.locations]\nappdata = {:?}\n",
                    games.display().to_string()
                ),
            )
            .unwrap();
            sandbox
        }

        fn path(&self) -> &Path {
            self.root.path()
        }

        fn games(&self) -> PathBuf {
            self.path().join("games")
        }

        fn config_path(&self) -> PathBuf {
            self.path().join("config.toml")
        }

        fn cavern(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("cavern");
            cmd.env("HOME", self.path())
                .env("XDG_CONFIG_HOME", self.path().join("xdg-config"))
                .env("XDG_STATE_HOME", self.path().join("xdg-state"))
                .env("XDG_DATA_HOME", self.path().join("xdg-data"))
                .env("CAVERN_CONFIG", self.config_path())
                .env("CI", "1");
            cmd
        }

        fn cave_ids(&self) -> Vec<String> {
            let output = self
                .cavern()
                .args(["list", "--all", "--format", "plain"])
                .output()
                .unwrap();
            assert!(output.status.success());
            String::from_utf8(output.stdout)
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }

        fn archive(&self, name: &str) -> PathBuf {
            let path = self.path().join(name);
            std::fs::write(&path, b"#!/bin/sh\necho bar\n").unwrap();
            path
        }
    }

    #[test]
    fn help_displays() {
        Sandbox::new()
            .cavern()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("install games into caves"));
    }

    #[test]
    fn version_displays() {
        Sandbox::new()
            .cavern()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("cavern"));
    }

    #[test]
    fn list_empty() {
        Sandbox::new()
            .cavern()
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("No caves installed"));
    }

    #[test]
    fn list_empty_json() {
        Sandbox::new()
            .cavern()
            .args(["list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn config_path() {
        let sandbox = Sandbox::new();
        sandbox
            .cavern()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        Sandbox::new()
            .cavern()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]"))
            .stdout(predicate::str::contains("[tasks]"));
    }

    #[test]
    fn invalid_config_reports_hint() {
        let sandbox = Sandbox::new();
        std::fs::write(sandbox.config_path(), "[install\n").unwrap();
        sandbox
            .cavern()
            .arg("list")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn show_missing_cave() {
        Sandbox::new()
            .cavern()
            .args(["show", "00000000-0000-0000-0000-000000000000"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Cave not found"));
    }

    #[test]
    fn uninstall_missing_cave() {
        Sandbox::new()
            .cavern()
            .args(["uninstall", "00000000-0000-0000-0000-000000000000", "--yes"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Cave not found"));
    }

    #[test]
    fn install_to_unknown_location_fails() {
        let sandbox = Sandbox::new();
        let archive = sandbox.archive("bar.sh");
        sandbox
            .cavern()
            .args(["install", "42", "--upload", "7", "--location", "usb", "--file"])
            .arg(&archive)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown install location"));
    }

    #[test]
    fn install_without_archive_queues_download() {
        let sandbox = Sandbox::new();
        sandbox
            .cavern()
            .args(["install", "42", "--upload", "7", "--filename", "bar.zip"])
            .assert()
            .success()
            .stdout(predicate::str::contains("not downloaded"));

        // The cave exists but was never installed
        assert_eq!(sandbox.cave_ids().len(), 1);
        sandbox
            .cavern()
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());
    }

    #[test]
    fn install_reinstall_uninstall() {
        let sandbox = Sandbox::new();
        let archive = sandbox.archive("bar.sh");

        sandbox
            .cavern()
            .args([
                "install",
                "42",
                "--title",
                "Bar Game",
                "--url",
                "https://foo.itch.io/bar-game",
                "--upload",
                "7",
                "--build-id",
                "12",
                "--user-version",
                "1.0",
                "--file",
            ])
            .arg(&archive)
            .assert()
            .success()
            .stdout(predicate::str::contains("Installed Bar Game"));

        let installed = sandbox.games().join("apps").join("bar-game").join("bar.sh");
        assert!(installed.exists());
        assert!(sandbox.games().join("downloads").join("7.sh").exists());

        let ids = sandbox.cave_ids();
        assert_eq!(ids.len(), 1);
        let cave = &ids[0];

        sandbox
            .cavern()
            .args(["show", cave.as_str()])
            .assert()
            .success()
            .stdout(predicate::str::contains("1.0 (#12)"))
            .stdout(predicate::str::contains("bar-game"));

        // A second copy of the same game lands next to the first
        sandbox
            .cavern()
            .args(["install", "42", "--url", "https://foo.itch.io/bar-game", "--upload", "7", "--file"])
            .arg(&archive)
            .assert()
            .success();
        assert!(sandbox.games().join("apps").join("bar-game-2").exists());
        assert_eq!(sandbox.cave_ids().len(), 2);

        std::fs::remove_file(&installed).unwrap();
        sandbox
            .cavern()
            .args(["reinstall", cave.as_str()])
            .assert()
            .success()
            .stdout(predicate::str::contains("Reinstalled Bar Game"));
        assert!(installed.exists());

        sandbox
            .cavern()
            .args(["uninstall", cave.as_str(), "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Uninstalled Bar Game"));
        assert!(!sandbox.games().join("apps").join("bar-game").exists());
        assert_eq!(sandbox.cave_ids().len(), 1);
    }

    #[test]
    fn uninstall_without_confirmation_keeps_cave() {
        let sandbox = Sandbox::new();
        let archive = sandbox.archive("bar.sh");
        sandbox
            .cavern()
            .args(["install", "42", "--upload", "7", "--file"])
            .arg(&archive)
            .assert()
            .success();
        let cave = sandbox.cave_ids().remove(0);

        sandbox
            .cavern()
            .args(["uninstall", cave.as_str()])
            .assert()
            .success()
            .stdout(predicate::str::contains("Nothing removed"));
        assert_eq!(sandbox.cave_ids(), vec![cave]);
        assert!(sandbox.games().join("apps").join("game-42").exists());
    }
}
