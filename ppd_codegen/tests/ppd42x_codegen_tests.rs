//! End-to-end generator tests.
//!
//! Loads firmware documents from disk, runs both build phases and checks the
//! rendered program, the driver models, the manifest and the error paths
//! (duplicate identifiers, unknown platforms, missing bus, bad durations).

use ppd_codegen::platforms::ppd42x::Ppd42xComponent;
use ppd_codegen::{BuildManifest, CodegenCore, CodegenError, PlatformRegistry};
use ppd_common::config::ConfigError;
use std::fs;
use tempfile::TempDir;

const UART: &str = r#"
[build]
name = "air-node"

[[uart]]
id = "u1"
tx_pin = 17
rx_pin = 16
baud_rate = 9600
"#;

/// Write `content` to `firmware.toml` in `dir` and build a core from it.
fn core_from(dir: &TempDir, content: &str) -> Result<CodegenCore, ConfigError> {
    let path = dir.path().join("firmware.toml");
    fs::write(&path, content).unwrap();
    let config = CodegenCore::load_config(&path)?;
    Ok(CodegenCore::new(config, PlatformRegistry::with_builtin()))
}

fn build(content: &str) -> Result<ppd_codegen::BuildOutput, CodegenError> {
    let dir = TempDir::new().unwrap();
    core_from(&dir, content)?.build()
}

fn config_err(content: &str) -> ConfigError {
    match build(content) {
        Err(CodegenError::Config(e)) => e,
        Err(other) => panic!("expected config error, got {other}"),
        Ok(_) => panic!("expected build to fail"),
    }
}

#[test]
fn test_example_config_generates_program() {
    let output = build(
        r#"
[build]
name = "air-node"

[[uart]]
id = "u1"
rx_pin = 16
baud_rate = 9600

[[sensor]]
platform = "ppd42x"
id = "ppd"
uart_id = "u1"
rx_only = true
pm_2_5 = {}
"#,
    )
    .expect("build");

    let ppd = output.component::<Ppd42xComponent>("ppd").expect("ppd model");
    assert!(ppd.pm_2_5_sensor().is_some());
    assert!(ppd.pm_10_0_sensor().is_none());
    assert!(ppd.rx_mode_only());
    assert_eq!(ppd.update_interval_min(), None);

    let program = &output.program;
    assert!(program.contains("#include \"esphome/components/ppd42x/ppd42x.h\""));
    assert!(program.contains("App.pre_setup(\"air-node\""));
    assert!(program.contains("auto *u1 = new uart::UARTComponent();"));
    assert!(program.contains("auto *ppd = new ppd42x::PPD42XComponent();"));
    assert!(program.contains("ppd->set_uart_parent(u1);"));
    assert!(program.contains("ppd->set_rx_mode_only(true);"));
    assert!(program.contains("ppd->set_pm_2_5_sensor(ppd_pm_2_5);"));
    assert!(!program.contains("set_pm_10_0_sensor"));
    assert!(!program.contains("set_update_interval_min"));

    // Bus is constructed before the device that references it.
    let bus = program.find("new uart::UARTComponent").unwrap();
    let dev = program.find("new ppd42x::PPD42XComponent").unwrap();
    assert!(bus < dev);
    assert!(program.trim_end().ends_with("App.loop();\n}"));
}

#[test]
fn test_registration_order_and_priorities() {
    let output = build(&format!(
        "{UART}\n[[sensor]]\nplatform = \"ppd42x\"\nid = \"ppd\"\n"
    ))
    .expect("build");

    let ids: Vec<&str> = output
        .registered
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(ids, vec!["u1", "ppd"]);
    assert_eq!(output.registered[0].setup_priority, 1000.0);
    assert_eq!(output.registered[1].setup_priority, 50.0);
}

#[test]
fn test_two_sensors_on_one_bus() {
    let output = build(&format!(
        r#"{UART}
[[sensor]]
platform = "ppd42x"
id = "indoor"
update_interval = 2
[sensor.pm_2_5]
name = "Indoor PM2.5"
[sensor.pm_10_0]
name = "Indoor PM10"

[[sensor]]
platform = "ppd42x"
id = "outdoor"
update_interval = "1h"
pm_10_0 = {{}}
"#
    ))
    .expect("build");

    let indoor = output.component::<Ppd42xComponent>("indoor").unwrap();
    let outdoor = output.component::<Ppd42xComponent>("outdoor").unwrap();
    assert_eq!(indoor.update_interval_min(), Some(2));
    assert_eq!(outdoor.update_interval_min(), Some(60));
    assert!(outdoor.pm_2_5_sensor().is_none());
    assert!(outdoor.pm_10_0_sensor().is_some());

    assert!(output.program.contains("indoor_pm_2_5->set_name(\"Indoor PM2.5\");"));
    assert!(output.program.contains("outdoor->set_update_interval_min(60);"));
    assert!(output.program.contains("outdoor->set_pm_10_0_sensor(outdoor_pm_10_0);"));
}

#[test]
fn test_generated_ids_avoid_declared_ids() {
    // The second block declares the id the first block's channel would get.
    let output = build(&format!(
        r#"{UART}
[[sensor]]
platform = "ppd42x"
id = "ppd"
pm_2_5 = {{}}

[[sensor]]
platform = "ppd42x"
id = "other"
pm_2_5 = {{ id = "ppd_pm_2_5" }}
"#
    ))
    .expect("build");

    let ppd = output.component::<Ppd42xComponent>("ppd").unwrap();
    let other = output.component::<Ppd42xComponent>("other").unwrap();
    assert_eq!(ppd.pm_2_5_sensor().unwrap().id.as_str(), "ppd_pm_2_5_2");
    assert_eq!(other.pm_2_5_sensor().unwrap().id.as_str(), "ppd_pm_2_5");
    assert_eq!(output.program.matches("auto *ppd_pm_2_5 =").count(), 1);
}

#[test]
fn test_duplicate_id_across_blocks_rejected() {
    let err = config_err(&format!(
        r#"{UART}
[[sensor]]
platform = "ppd42x"
id = "ppd"

[[sensor]]
platform = "ppd42x"
id = "ppd"
"#
    ));
    match err {
        ConfigError::DuplicateId { id, first, path } => {
            assert_eq!(id, "ppd");
            assert_eq!(first, "sensor[0].id");
            assert_eq!(path, "sensor[1].id");
        }
        other => panic!("expected DuplicateId, got {other}"),
    }
}

#[test]
fn test_sensor_id_clashing_with_bus_rejected() {
    let err = config_err(&format!(
        "{UART}\n[[sensor]]\nplatform = \"ppd42x\"\nid = \"u1\"\n"
    ));
    assert!(matches!(err, ConfigError::DuplicateId { .. }), "{err}");
}

#[test]
fn test_unknown_platform_rejected() {
    let err = config_err(&format!(
        "{UART}\n[[sensor]]\nplatform = \"sds011\"\nid = \"dust\"\n"
    ));
    assert_eq!(err.to_string(), "sensor[0]: platform 'sds011' not found");
}

#[test]
fn test_missing_uart_dependency_rejected() {
    let err = config_err(
        r#"
[build]
name = "air-node"

[[sensor]]
platform = "ppd42x"
id = "ppd"
"#,
    );
    assert_eq!(
        err.to_string(),
        "Component sensor.ppd42x requires component uart"
    );
}

#[test]
fn test_invalid_durations_rejected() {
    for interval in ["0", "-3", "1.5", "\"90s\"", "\"0min\"", "\"soon\"", "true"] {
        let err = config_err(&format!(
            "{UART}\n[[sensor]]\nplatform = \"ppd42x\"\nid = \"ppd\"\nupdate_interval = {interval}\n"
        ));
        assert!(
            err.to_string().starts_with("sensor[0].update_interval:"),
            "{interval}: {err}"
        );
    }
}

#[test]
fn test_type_mismatch_names_offending_key() {
    let cases = [
        ("rx_only = \"yes\"", "sensor[0].rx_only: "),
        ("setup_priority = true", "sensor[0].setup_priority: "),
        ("pm_2_5 = { accuracy_decimals = \"x\" }", "sensor[0].pm_2_5.accuracy_decimals: "),
        ("pm_10_0 = { name = 7 }", "sensor[0].pm_10_0.name: "),
        ("update_interval = 1979-05-27", "sensor[0].update_interval: "),
    ];
    for (line, prefix) in cases {
        let err = config_err(&format!(
            "{UART}\n[[sensor]]\nplatform = \"ppd42x\"\nid = \"ppd\"\n{line}\n"
        ));
        assert!(err.to_string().starts_with(prefix), "{line}: {err}");
    }

    let err = config_err(&format!("{UART}\n[[sensor]]\nplatform = \"ppd42x\"\nid = 5\n"));
    assert!(err.to_string().starts_with("sensor[0].id: "), "{err}");
}

#[test]
fn test_valid_durations_accepted() {
    for (interval, minutes) in [("1", 1), ("\"120s\"", 2), ("\"2h\"", 120), ("\"1d\"", 1440)] {
        let output = build(&format!(
            "{UART}\n[[sensor]]\nplatform = \"ppd42x\"\nid = \"ppd\"\nupdate_interval = {interval}\n"
        ))
        .expect("build");
        let ppd = output.component::<Ppd42xComponent>("ppd").unwrap();
        assert_eq!(ppd.update_interval_min(), Some(minutes), "{interval}");
    }
}

#[test]
fn test_several_buses_need_uart_id() {
    let doc = r#"
[build]
name = "air-node"

[[uart]]
id = "u1"
tx_pin = 17
rx_pin = 16
baud_rate = 9600

[[uart]]
id = "u2"
tx_pin = 4
rx_pin = 5
baud_rate = 9600
"#;
    let err = config_err(&format!(
        "{doc}\n[[sensor]]\nplatform = \"ppd42x\"\nid = \"ppd\"\n"
    ));
    assert!(err.to_string().contains("uart_id"), "{err}");

    let output = build(&format!(
        "{doc}\n[[sensor]]\nplatform = \"ppd42x\"\nid = \"ppd\"\nuart_id = \"u2\"\n"
    ))
    .expect("build");
    assert!(output.program.contains("ppd->set_uart_parent(u2);"));
}

#[test]
fn test_uart_id_must_name_a_bus() {
    let err = config_err(&format!(
        r#"{UART}
[[sensor]]
platform = "ppd42x"
id = "ppd"
pm_2_5 = {{ id = "fine" }}

[[sensor]]
platform = "ppd42x"
id = "other"
uart_id = "fine"
"#
    ));
    match err {
        ConfigError::UnknownId { id, path, .. } => {
            assert_eq!(id, "fine");
            assert_eq!(path, "sensor[1].uart_id");
        }
        other => panic!("expected UnknownId, got {other}"),
    }
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    let result = CodegenCore::load_config(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::FileNotFound)));
}

#[test]
fn test_validate_only_emits_nothing() {
    let dir = TempDir::new().unwrap();
    let core = core_from(
        &dir,
        &format!("{UART}\n[[sensor]]\nplatform = \"ppd42x\"\nid = \"ppd\"\npm_2_5 = {{}}\n"),
    )
    .unwrap();
    let validated = core.validate().expect("valid");
    assert_eq!(validated.blocks.len(), 1);
    assert!(validated.ctx.cg.statements().is_empty());
    assert!(validated.ctx.components.is_empty());
}

#[test]
fn test_manifest_and_program_files() {
    let dir = TempDir::new().unwrap();
    let core = core_from(
        &dir,
        &format!("{UART}\n[[sensor]]\nplatform = \"ppd42x\"\nid = \"ppd\"\npm_10_0 = {{}}\n"),
    )
    .unwrap();
    let output = core.build().expect("build");

    let program_path = dir.path().join("main.cpp");
    output.write_program(&program_path).expect("write program");
    assert_eq!(fs::read_to_string(&program_path).unwrap(), output.program);

    let manifest_path = dir.path().join("build.json");
    BuildManifest::from_output(&output)
        .write(&manifest_path)
        .expect("write manifest");

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&manifest_path).unwrap()).unwrap();
    assert_eq!(json["name"], "air-node");
    assert_eq!(json["generator_version"], env!("CARGO_PKG_VERSION"));
    let components = json["components"].as_array().unwrap();
    assert_eq!(components.len(), 2);
    assert_eq!(components[0]["id"], "u1");
    assert_eq!(components[0]["class"], "uart::UARTComponent");
    assert_eq!(components[1]["id"], "ppd");
    assert_eq!(components[1]["class"], "ppd42x::PPD42XComponent");
    assert_eq!(components[1]["setup_priority"], 50.0);
}

#[test]
fn test_write_files_writes_program_and_manifest() {
    let dir = TempDir::new().unwrap();
    let core = core_from(
        &dir,
        &format!("{UART}\n[[sensor]]\nplatform = \"ppd42x\"\nid = \"ppd\"\n"),
    )
    .unwrap();
    let output = core.build().expect("build");

    let program_path = dir.path().join("main.cpp");
    let manifest_path = dir.path().join("build.json");
    output
        .write_files(&program_path, Some(&manifest_path))
        .expect("write files");
    assert_eq!(fs::read_to_string(&program_path).unwrap(), output.program);
    assert!(fs::read_to_string(&manifest_path).unwrap().contains("\"air-node\""));
}

#[test]
fn test_unwritable_manifest_leaves_no_program() {
    let dir = TempDir::new().unwrap();
    let core = core_from(
        &dir,
        &format!("{UART}\n[[sensor]]\nplatform = \"ppd42x\"\nid = \"ppd\"\n"),
    )
    .unwrap();
    let output = core.build().expect("build");

    let program_path = dir.path().join("main.cpp");
    let manifest_path = dir.path().join("missing").join("build.json");
    match output.write_files(&program_path, Some(&manifest_path)) {
        Err(CodegenError::Output { path, .. }) => assert_eq!(path, manifest_path),
        Err(other) => panic!("expected Output error, got {other}"),
        Ok(()) => panic!("expected manifest write to fail"),
    }
    assert!(!program_path.exists());
}

#[test]
fn test_failed_build_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let core = core_from(
        &dir,
        &format!(
            "{UART}\n[[sensor]]\nplatform = \"ppd42x\"\nid = \"ppd\"\n\n[[sensor]]\nplatform = \"ppd42x\"\nid = \"bad\"\nupdate_interval = 0\n"
        ),
    )
    .unwrap();
    assert!(core.build().is_err());
    assert!(!dir.path().join("main.cpp").exists());
}
