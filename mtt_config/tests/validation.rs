use std::fs;

use mtt_config::{PortSpec, RegisterEntry, load_file, load_toml};
use rstest::rstest;
use tempfile::tempdir;

#[rstest]
#[case("[motor]\nid = 0", "motor.id must be 1~255")]
#[case("[motor]\ntorque_limit = 1024", "motor.torque_limit must be 0~1023")]
#[case("[timeouts]\ngoal_s = 0", "timeouts.goal_s must be 1~100")]
#[case("[timeouts]\ngoal_s = 101", "timeouts.goal_s must be 1~100")]
#[case("[timeouts]\nslip_s = 11", "timeouts.slip_s must be 1~10")]
#[case("[port]\nbaud_rate = 12345", "not a supported rate")]
#[case("[port]\nread_timeout_ms = 0", "read_timeout_ms must be >= 1")]
#[case("[port]\nname = \"  \"", "port.name must not be empty")]
#[case("[logging]\nrotation = \"weekly\"", "logging.rotation")]
#[case("[logging]\nlevel = \"verbose\"", "logging.level must be error, warn")]
#[case(
    "[registers]\ngoal_position = { addr = 30, width = 3 }",
    "registers.goal_position.width"
)]
#[case("[registers]\ntorque_limit = 36", "share address 36")]
fn rejects_out_of_range_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(
        format!("{err}").contains(needle),
        "error `{err}` should mention `{needle}`"
    );
}

#[rstest]
fn unknown_port_spec_fails_to_parse() {
    let err = load_toml("[port]\nspec = 484").expect_err("484 is not a port spec");
    assert!(err.to_string().contains("232, 422 or 485"));
}

#[rstest]
fn accepts_full_document_with_register_tables() {
    let toml = r#"
[port]
name = "/dev/ttyUSB0"
spec = 232
baud_rate = 1000000
read_timeout_ms = 20

[motor]
id = 7
torque_limit = 512
moving_threshold = 4

[timeouts]
goal_s = 10
slip_s = 2

[registers]
torque_enable = 64
goal_position = { addr = 116, width = 4 }
torque_limit = { addr = 38 }
present_position = { addr = 132, width = 4 }

[logging]
level = "debug"
rotation = "daily"
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.port.spec, PortSpec::Rs232);
    assert_eq!(cfg.motor.id, 7);
    assert_eq!(cfg.registers.torque_enable, RegisterEntry::at(64));
    assert_eq!(
        cfg.registers.goal_position,
        RegisterEntry {
            addr: 116,
            width: Some(4)
        }
    );
    assert_eq!(cfg.registers.torque_limit.width, None);
}

#[rstest]
#[case("info")]
#[case("DEBUG")]
#[case("trace")]
fn accepts_known_log_levels(#[case] level: &str) {
    let cfg = load_toml(&format!("[logging]\nlevel = \"{level}\"")).expect("parse TOML");
    cfg.validate().expect("known level should pass");
}

#[rstest]
fn load_file_names_the_path_on_malformed_content() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mtt.toml");
    fs::write(&path, "[motor]\nid = \"seven\"\n").unwrap();

    let err = load_file(&path).expect_err("id is not a number");
    let chain = format!("{err:#}");
    assert!(chain.contains("mtt.toml"), "{chain}");
    assert!(chain.contains("parse config"), "{chain}");
}

#[rstest]
fn load_file_leaves_range_checks_to_the_merged_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mtt.toml");
    fs::write(&path, "[timeouts]\ngoal_s = 0\n").unwrap();

    let mut cfg = load_file(&path).expect("well-formed file loads");
    assert_eq!(cfg.timeouts.goal_s, 0);
    assert!(cfg.validate().is_err());

    cfg.timeouts.goal_s = 5;
    cfg.validate().expect("overridden value is in range");
}
