//! Integration tests for the flag layer and layer precedence.

use clap::{Arg, Command};
use serde::{Deserialize, Serialize};
use std::fs;
use tempfile::TempDir;
use tierconf::{ClapFlags, DefaultFile, FlagSet, MapEnv, Resolver, read_from_flags, settings};

settings! {
    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct HostPort {
        host: String => { flag: "host" },
        port: i32 => { flag: "port" },
    }
}

settings! {
    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct WithEnvs {
        number: String => { flag: "number", env: "TEST_NUMBER", env_default: "1" },
        string: String => { flag: "string", env: "TEST_STRING", env_default: "default" },
        no_default: String => { flag: "no-default", env: "TEST_NO_DEFAULT" },
        no_env: String => { flag: "no-env", env_default: "default" },
    }
}

/// Flag with a default, optionally set on the command line.
struct FlagSetting {
    name: &'static str,
    default: &'static str,
    value: &'static str,
}

fn flag_set(settings: &[FlagSetting]) -> FlagSet {
    settings.iter().fold(FlagSet::new(), |flags, setting| {
        let flags = flags.define(setting.name, setting.default);
        if setting.value.is_empty() {
            flags
        } else {
            flags.set(setting.name, setting.value)
        }
    })
}

#[test]
fn test_read_from_flags() {
    let flags = FlagSet::new()
        .define("host", "google.de")
        .define("port", "5432")
        .set("port", "1000");

    let env = MapEnv::new();
    let mut cfg = HostPort::default();
    Resolver::new()
        .env(&env)
        .flags(&flags)
        .resolve(&mut cfg)
        .unwrap();

    assert_eq!(
        cfg,
        HostPort {
            host: "google.de".into(),
            port: 1000,
        }
    );
}

#[test]
fn test_read_from_flags_with_envs() {
    let cases = [
        (
            "flags_only",
            vec![
                FlagSetting { name: "number", default: "3", value: "2" },
                FlagSetting { name: "string", default: "", value: "test" },
                FlagSetting { name: "no-env", default: "those", value: "" },
            ],
            vec![],
            WithEnvs {
                number: "2".into(),
                string: "test".into(),
                no_default: String::new(),
                no_env: "those".into(),
            },
        ),
        (
            "env_only",
            vec![],
            vec![("TEST_NUMBER", "2"), ("TEST_STRING", "test")],
            WithEnvs {
                number: "2".into(),
                string: "test".into(),
                no_default: String::new(),
                no_env: "default".into(),
            },
        ),
        (
            "flags_and_env",
            vec![
                FlagSetting { name: "number", default: "", value: "2" },
                FlagSetting { name: "no-default", default: "flagdefault", value: "" },
                FlagSetting { name: "no-env", default: "DefaultFromFlag", value: "" },
            ],
            vec![
                ("TEST_NUMBER", "3"),
                ("TEST_STRING", "fromEnv"),
                ("TEST_NO_DEFAULT", "value"),
            ],
            WithEnvs {
                number: "2".into(),
                string: "fromEnv".into(),
                no_default: "value".into(),
                no_env: "DefaultFromFlag".into(),
            },
        ),
        (
            "empty",
            vec![],
            vec![],
            WithEnvs {
                number: "1".into(),
                string: "default".into(),
                no_default: String::new(),
                no_env: "default".into(),
            },
        ),
    ];

    for (name, flags, vars, want) in cases {
        let flags = flag_set(&flags);
        let env = MapEnv::from_pairs(vars);
        let mut cfg = WithEnvs::default();
        Resolver::new()
            .env(&env)
            .flags(&flags)
            .resolve(&mut cfg)
            .unwrap_or_else(|err| panic!("{name}: {err}"));
        assert_eq!(cfg, want, "{name}");
    }
}

#[test]
fn test_flag_default_fills_empty_field_without_declared_default() {
    let flags = FlagSet::new().define("no-default", "flagdefault");
    let env = MapEnv::new();
    let mut cfg = WithEnvs::default();
    Resolver::new()
        .env(&env)
        .flags(&flags)
        .resolve(&mut cfg)
        .unwrap();
    assert_eq!(cfg.no_default, "flagdefault");
}

#[test]
fn test_clap_command_line() {
    let command = Command::new("app")
        .arg(Arg::new("host").long("host").default_value("google.de"))
        .arg(Arg::new("port").long("port").default_value("5432"));
    let matches = command
        .clone()
        .try_get_matches_from(["app", "--port", "1000"])
        .unwrap();
    let flags = ClapFlags::new(&command, &matches);

    let env = MapEnv::new();
    let mut cfg = HostPort::default();
    Resolver::new()
        .env(&env)
        .flags(&flags)
        .resolve(&mut cfg)
        .unwrap();

    assert_eq!(cfg.host, "google.de");
    assert_eq!(cfg.port, 1000);
}

#[test]
fn test_clap_derived_flags() {
    #[derive(clap::Parser)]
    #[allow(dead_code)]
    struct Cli {
        #[arg(long)]
        no_default: Option<String>,
    }

    let command = <Cli as clap::CommandFactory>::command();
    let matches = command
        .clone()
        .try_get_matches_from(["app", "--no-default", "x"])
        .unwrap();
    let flags = ClapFlags::new(&command, &matches);

    let env = MapEnv::new();
    let mut cfg = WithEnvs::default();
    Resolver::new()
        .env(&env)
        .flags(&flags)
        .resolve(&mut cfg)
        .unwrap();
    assert_eq!(cfg.no_default, "x");
}

settings! {
    #[derive(Debug, Default, PartialEq)]
    struct FlagsOnly {
        listen: String => { flag: "listen" },
        workers: usize => { flag: "workers" },
    }
}

#[test]
fn test_read_from_flags_without_serde_derives() {
    let flags = FlagSet::new()
        .define("listen", "0.0.0.0:8080")
        .define("workers", "4")
        .set("workers", "8");

    let mut cfg = FlagsOnly::default();
    read_from_flags(&mut cfg, &flags).unwrap();
    assert_eq!(
        cfg,
        FlagsOnly {
            listen: "0.0.0.0:8080".into(),
            workers: 8,
        }
    );
}

settings! {
    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Layered {
        host: String => { env: "HOST", env_default: "localhost", flag: "host" },
    }
}

/// Resolve `host` with any combination of file, env and flag.
fn layered(file: Option<&str>, env: Option<&str>, flag: Option<&str>) -> String {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.yaml");
    if let Some(host) = file {
        fs::write(&path, format!("host: {host}\n")).unwrap();
    }

    let default_file = DefaultFile::new("app")
        .with_extensions(["yaml"])
        .with_paths([dir.path().to_string_lossy()]);
    let env = MapEnv::from_pairs(env.map(|host| ("HOST", host)));
    let flags = match flag {
        Some(host) => FlagSet::new().set("host", host),
        None => FlagSet::new(),
    };

    let mut cfg = Layered::default();
    Resolver::new()
        .default_file(&default_file)
        .env(&env)
        .flags(&flags)
        .resolve(&mut cfg)
        .unwrap();
    cfg.host
}

#[test]
fn test_precedence_flag_env_file_default() {
    assert_eq!(layered(Some("file"), Some("env"), Some("flag")), "flag");
    assert_eq!(layered(Some("file"), Some("env"), None), "env");
    assert_eq!(layered(Some("file"), None, None), "file");
    assert_eq!(layered(None, None, None), "localhost");
    assert_eq!(layered(None, Some("env"), Some("flag")), "flag");
    assert_eq!(layered(Some("file"), None, Some("flag")), "flag");
}
