//! CLI end-to-end tests for the `sfl` binary.
//!
//! Every test writes its inputs to a temp dir and points XDG_CONFIG_HOME
//! there so no host configuration leaks in.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SPECTRA: &str = r#"{
    "traces": [
        {"successful": false, "involved": ["S1", "S2"]},
        {"successful": false, "involved": ["S2", "S3"]},
        {"successful": true, "involved": ["S1"]},
        {"successful": true, "involved": ["S1", "S2", "S3"]},
        {"successful": true, "involved": ["S1", "S3"]}
    ],
    "levels": [
        {"P1": ["S1"], "P2": ["S2", "S3"]}
    ]
}"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let ws = Self { dir };
        ws.write("spectra.json", SPECTRA);
        ws
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, content).expect("write fixture");
        path
    }

    fn spectra(&self) -> PathBuf {
        self.path("spectra.json")
    }

    fn sfl(&self) -> Command {
        let mut cmd = Command::cargo_bin("sfl").expect("sfl binary should exist");
        cmd.env_remove("SFL_CONFIG")
            .env_remove("SFL_CONFIG_DIR")
            .env_remove("RUST_LOG")
            .env("XDG_CONFIG_HOME", self.dir.path())
            .env("SFL_LOG", "off");
        cmd
    }
}

fn json_stdout(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn node_order(doc: &Value) -> Vec<String> {
    doc["ranking"]
        .as_array()
        .expect("ranking array")
        .iter()
        .map(|entry| entry["node"].as_str().unwrap_or_default().to_string())
        .collect()
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

/// Short id reported by `config show` for the same configuration.
fn config_short_id(ws: &Workspace, config: Option<&Path>) -> String {
    let mut cmd = ws.sfl();
    if let Some(config) = config {
        cmd.args(["--config", path_arg(config)]);
    }
    let output = cmd.args(["config", "show"]).output().unwrap();
    assert!(output.status.success());
    let hash = json_stdout(&output)["snapshot"]["config_hash"]
        .as_str()
        .expect("config hash")
        .to_string();
    hash[..12].to_string()
}

// ============================================================================
// formulas
// ============================================================================

mod formulas {
    use super::*;

    #[test]
    fn lists_every_formula_as_json() {
        let ws = Workspace::new();
        let output = ws.sfl().arg("formulas").output().unwrap();
        assert!(output.status.success());
        let doc = json_stdout(&output);
        assert_eq!(doc["command"], "formulas");
        assert_eq!(doc["formulas"].as_array().unwrap().len(), 33);
    }

    #[test]
    fn text_lists_one_per_line() {
        let ws = Workspace::new();
        ws.sfl()
            .args(["--format", "text", "formulas"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Tarantula\n"))
            .stdout(predicate::str::contains("Ochiai\n"));
    }
}

// ============================================================================
// rank
// ============================================================================

mod rank {
    use super::*;

    #[test]
    fn tarantula_order() {
        let ws = Workspace::new();
        let output = ws
            .sfl()
            .args(["rank", path_arg(&ws.spectra()), "--formula", "Tarantula"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let doc = json_stdout(&output);
        assert_eq!(doc["localizer"], "Tarantula");
        assert_eq!(doc["node_count"], 3);
        assert_eq!(node_order(&doc), vec!["S2", "S3", "S1"]);
        assert_eq!(doc["ranking"][2]["best_ranking"], 3);
    }

    #[test]
    fn text_output_is_a_ranking_dump() {
        let ws = Workspace::new();
        ws.sfl()
            .args([
                "--format",
                "text",
                "rank",
                path_arg(&ws.spectra()),
                "--formula",
                "Tarantula",
            ])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("S2: 0.75\n"));
    }

    #[test]
    fn saved_dump_can_be_inspected() {
        let ws = Workspace::new();
        let dump = ws.path("ranking.txt");
        ws.sfl()
            .args([
                "rank",
                path_arg(&ws.spectra()),
                "--formula",
                "Tarantula",
                "--out",
                path_arg(&dump),
            ])
            .assert()
            .success();
        assert!(dump.exists());

        let output = ws
            .sfl()
            .args(["inspect", path_arg(&dump), "S1"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let doc = json_stdout(&output);
        assert_eq!(doc["best_ranking"], 3);
        assert_eq!(doc["worst_ranking"], 3);
        assert_eq!(doc["total"], 3);
    }

    #[test]
    fn inspecting_an_unranked_node_exits_one() {
        let ws = Workspace::new();
        let dump = ws.write("ranking.txt", "a: 1\nb: 0.5\n");
        ws.sfl()
            .args(["inspect", path_arg(&dump), "zz"])
            .assert()
            .code(1);
    }

    #[test]
    fn normalized_reciprocal_rank() {
        let ws = Workspace::new();
        let output = ws
            .sfl()
            .args([
                "rank",
                path_arg(&ws.spectra()),
                "--formula",
                "Tarantula",
                "--normalize",
                "reciprocal-rank",
            ])
            .output()
            .unwrap();
        assert!(output.status.success());
        let doc = json_stdout(&output);
        assert_eq!(doc["normalization"], "ReciprocalRank");
        assert_eq!(doc["ranking"][0]["suspiciousness"], 1.0);
        assert_eq!(doc["ranking"][1]["suspiciousness"], 0.5);
    }

    #[test]
    fn unknown_formula_is_rejected() {
        let ws = Workspace::new();
        ws.sfl()
            .args(["rank", path_arg(&ws.spectra()), "--formula", "NoSuchFormula"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("error"));
    }

    #[test]
    fn missing_spectra_is_an_io_error() {
        let ws = Workspace::new();
        ws.sfl()
            .args(["rank", path_arg(&ws.path("absent.json"))])
            .assert()
            .code(21);
    }

    #[test]
    fn malformed_spectra_is_an_input_error() {
        let ws = Workspace::new();
        let bad = ws.write("bad.json", "{ not json");
        let output = ws.sfl().args(["rank", path_arg(&bad)]).output().unwrap();
        assert_eq!(output.status.code(), Some(12));
        let doc = json_stdout(&output);
        assert_eq!(doc["error"]["code"], "ERR_INPUT");
    }
}

// ============================================================================
// fuse / levels / metrics
// ============================================================================

mod localizers {
    use super::*;

    #[test]
    fn fuse_reports_selection() {
        let ws = Workspace::new();
        let output = ws
            .sfl()
            .args(["fuse", path_arg(&ws.spectra()), "--technique", "comb-mnz"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let doc = json_stdout(&output);
        assert_eq!(doc["localizer"], "F-ZeroOne-OverlapRate-CombMnz");
        assert_eq!(doc["selected"].as_array().unwrap().len(), 17);
        assert_eq!(doc["selection_scores"].as_array().unwrap().len(), 33);
        assert_eq!(doc["node_count"], 3);
    }

    #[test]
    fn fuse_with_two_formulas_cannot_select() {
        let ws = Workspace::new();
        ws.sfl()
            .args([
                "fuse",
                path_arg(&ws.spectra()),
                "--formula",
                "Ochiai",
                "--formula",
                "Tarantula",
            ])
            .assert()
            .code(13);
    }

    #[test]
    fn levels_walk_the_hierarchy() {
        let ws = Workspace::new();
        let output = ws
            .sfl()
            .args([
                "levels",
                path_arg(&ws.spectra()),
                "--formula",
                "Tarantula",
                "--formula",
                "Tarantula",
            ])
            .output()
            .unwrap();
        assert!(output.status.success());
        let doc = json_stdout(&output);
        assert_eq!(doc["levels"], 2);
        assert_eq!(doc["localizer"], "Level[Tarantula,Tarantula]");
        assert_eq!(node_order(&doc), vec!["S2", "S3", "S1"]);
    }

    #[test]
    fn levels_without_enough_formulas() {
        let ws = Workspace::new();
        ws.sfl()
            .args(["levels", path_arg(&ws.spectra()), "--formula", "Ochiai"])
            .assert()
            .code(13);
    }

    #[test]
    fn metrics_as_semicolon_rows() {
        let ws = Workspace::new();
        ws.sfl()
            .args([
                "--format",
                "text",
                "metrics",
                path_arg(&ws.spectra()),
                "--bug-id",
                "bug-1",
                "--formula",
                "Tarantula",
                "--node",
                "S2",
            ])
            .assert()
            .success()
            .stdout(predicate::str::starts_with(
                "BugID;Line;IF;IS;NF;NS;BestRanking;WorstRanking;MinWastedEffort;MaxWastedEffort;Suspiciousness\n",
            ))
            .stdout(predicate::str::contains("bug-1;S2;2;1;0;2;1;1;0;0;0.75\n"));
    }

    #[test]
    fn metrics_for_an_unknown_node() {
        let ws = Workspace::new();
        ws.sfl()
            .args([
                "metrics",
                path_arg(&ws.spectra()),
                "--bug-id",
                "bug-1",
                "--node",
                "ghost",
            ])
            .assert()
            .code(1);
    }
}

// ============================================================================
// config
// ============================================================================

mod config {
    use super::*;

    #[test]
    fn show_defaults() {
        let ws = Workspace::new();
        let output = ws.sfl().args(["config", "show"]).output().unwrap();
        assert!(output.status.success());
        let doc = json_stdout(&output);
        assert_eq!(doc["config"]["formula"], "Ochiai");
        assert_eq!(doc["snapshot"]["config_source"], "builtin default");
    }

    #[test]
    fn validate_accepts_a_good_file() {
        let ws = Workspace::new();
        let path = ws.write(
            "good.json",
            r#"{"schema_version": "1.0.0", "formula": "Tarantula"}"#,
        );
        ws.sfl()
            .args(["config", "validate", path_arg(&path)])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"valid\": true"));
    }

    #[test]
    fn validate_rejects_a_small_pool() {
        let ws = Workspace::new();
        let path = ws.write(
            "pool.json",
            r#"{"schema_version": "1.0.0", "fusion": {"formulas": ["Ochiai", "Jaccard"]}}"#,
        );
        ws.sfl()
            .args(["config", "validate", path_arg(&path)])
            .assert()
            .code(11);
    }

    #[test]
    fn missing_config_file_is_a_config_error() {
        let ws = Workspace::new();
        ws.sfl()
            .args([
                "--config",
                path_arg(&ws.path("nope.json")),
                "rank",
                path_arg(&ws.spectra()),
            ])
            .assert()
            .code(11);
    }

    #[test]
    fn configured_formula_is_used() {
        let ws = Workspace::new();
        let config = ws.write(
            "sfl.json",
            r#"{"schema_version": "1.0.0", "formula": "Tarantula"}"#,
        );
        let output = ws
            .sfl()
            .args(["--config", path_arg(&config), "rank", path_arg(&ws.spectra())])
            .output()
            .unwrap();
        assert!(output.status.success());
        assert_eq!(json_stdout(&output)["localizer"], "Tarantula");
    }
}

// ============================================================================
// config id and log events
// ============================================================================

mod config_id {
    use super::*;

    #[test]
    fn rank_payload_carries_default_config_id() {
        let ws = Workspace::new();
        let id = config_short_id(&ws, None);
        let output = ws
            .sfl()
            .args(["rank", path_arg(&ws.spectra())])
            .output()
            .unwrap();
        assert!(output.status.success());
        assert_eq!(json_stdout(&output)["config_id"], id.as_str());
    }

    #[test]
    fn config_file_changes_the_stamped_id() {
        let ws = Workspace::new();
        let config = ws.write(
            "sfl.json",
            r#"{"schema_version": "1.0.0", "formula": "Tarantula"}"#,
        );
        let default_id = config_short_id(&ws, None);
        let file_id = config_short_id(&ws, Some(&config));
        assert_ne!(default_id, file_id);

        for command in ["rank", "fuse", "levels"] {
            let output = ws
                .sfl()
                .args(["--config", path_arg(&config), command, path_arg(&ws.spectra())])
                .output()
                .unwrap();
            assert!(output.status.success(), "{} failed", command);
            assert_eq!(json_stdout(&output)["config_id"], file_id.as_str());
        }

        let output = ws
            .sfl()
            .args([
                "--config",
                path_arg(&config),
                "metrics",
                path_arg(&ws.spectra()),
                "--bug-id",
                "bug-1",
            ])
            .output()
            .unwrap();
        assert!(output.status.success());
        assert_eq!(json_stdout(&output)["config_id"], file_id.as_str());
    }

    #[test]
    fn jsonl_events_carry_config_id() {
        let ws = Workspace::new();
        let id = config_short_id(&ws, None);
        let output = ws
            .sfl()
            .args([
                "--log-level",
                "info",
                "--log-format",
                "jsonl",
                "rank",
                path_arg(&ws.spectra()),
            ])
            .output()
            .unwrap();
        assert!(output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains(&format!("\"config_id\":\"{}\"", id)), "{}", stderr);
        assert!(stderr.contains("\"localize.finished\""), "{}", stderr);
    }

    #[test]
    fn empty_trace_warning_uses_shared_target() {
        let ws = Workspace::new();
        let spectra = ws.write(
            "gap.json",
            r#"{"traces": [
                {"successful": false, "involved": ["S1"]},
                {"successful": true, "involved": []}
            ]}"#,
        );
        ws.sfl()
            .args([
                "--log-level",
                "warn",
                "--log-format",
                "jsonl",
                "rank",
                path_arg(&spectra),
            ])
            .assert()
            .success()
            .stderr(predicate::str::contains("\"spectra.trace_skipped\""));
    }
}
