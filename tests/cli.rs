use clap::Parser;
use hunkfmt::cli::{Cli, Commands, FmtArgs, VcsBackend};

#[test]
fn fmt_flag_parsing() {
    // Given
    let argv = vec![
        "hfmt",
        "fmt",
        "src/lib.rs",
        "--formatter",
        "rustfmt --emit stdout",
        "--vcs",
        "git",
        "--trim-blank-lines",
        "--json",
    ];

    // When
    let cmd = Cli::parse_from(argv);

    // Then
    match cmd.command {
        Commands::Fmt(FmtArgs { file, formatter, vcs, trim_blank_lines, json }) => {
            assert!(file.to_string_lossy().ends_with("lib.rs"));
            assert_eq!(formatter.as_deref(), Some("rustfmt --emit stdout"));
            assert!(matches!(vcs, Some(VcsBackend::Git)));
            assert!(trim_blank_lines);
            assert!(json);
        }
        _ => panic!("expected Fmt command"),
    }
}

#[test]
fn fmt_defaults_leave_backend_to_config() {
    let cmd = Cli::parse_from(["hfmt", "fmt", "file.c"]);
    match cmd.command {
        Commands::Fmt(args) => {
            assert!(args.formatter.is_none());
            assert!(args.vcs.is_none());
            assert!(!args.trim_blank_lines);
        }
        _ => panic!("expected Fmt command"),
    }
}

#[test]
fn global_flags_are_accepted_after_subcommand() {
    let cmd = Cli::parse_from(["hfmt", "fmt", "file.c", "--dry-run", "--quiet"]);
    assert!(cmd.dry_run);
    assert!(cmd.quiet);
}

#[test]
fn hg_backend_parses() {
    let cmd = Cli::parse_from(["hfmt", "fmt", "f", "--vcs", "hg"]);
    match cmd.command {
        Commands::Fmt(args) => assert!(matches!(args.vcs, Some(VcsBackend::Hg))),
        _ => panic!("expected Fmt command"),
    }
}

mod binary {
    use assert_cmd::Command;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use predicates::prelude::*;

    #[test]
    fn help_mentions_the_core_subcommand() {
        Command::cargo_bin("hfmt")
            .unwrap()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("fmt"));
    }

    #[test]
    fn init_writes_a_default_config() {
        let tmp = TempDir::new().unwrap();
        Command::cargo_bin("hfmt")
            .unwrap()
            .args(["init", tmp.path().to_str().unwrap()])
            .assert()
            .success();
        tmp.child("hunkfmt.toml")
            .assert(predicate::str::contains("trim_blank_lines"));
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        tmp.child("hunkfmt.toml").write_str("# existing\n").unwrap();
        Command::cargo_bin("hfmt")
            .unwrap()
            .args(["init", tmp.path().to_str().unwrap()])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--force"));
    }

    #[test]
    fn fmt_outside_a_repository_warns_and_exits_clean() {
        let tmp = TempDir::new().unwrap();
        tmp.child("loose.txt").write_str("x\n").unwrap();
        Command::cargo_bin("hfmt")
            .unwrap()
            .args([
                "fmt",
                tmp.path().join("loose.txt").to_str().unwrap(),
                "--formatter",
                "cat",
            ])
            .assert()
            .success()
            .stderr(predicate::str::contains("not inside a repository"));
    }
}
