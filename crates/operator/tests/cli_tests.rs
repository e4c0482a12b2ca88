//! CLI integration tests

use std::process::Command;

fn eck_exporter() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_eck-exporter"));
    cmd.env_remove("ECK_EXPORTER_CONFIG")
        .env_remove("ECK_EXPORTER_CONTAINER_REGISTRY")
        .env_remove("ECK_EXPORTER_CONTAINER_SUFFIX")
        .env("RUST_LOG", "error");
    cmd
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = eck_exporter().arg("--help").output().expect("Failed to execute command");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("image"), "Should show image command");
    assert!(stdout.contains("deployment"), "Should show deployment command");
}

#[test]
fn test_image_reference() {
    let output = eck_exporter()
        .args(["image", "elastic-maps-server-ubi8", "8.1.0"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "docker.elastic.co/elastic-maps-service/elastic-maps-server-ubi8:8.1.0"
    );
}

#[test]
fn test_image_reference_with_env_overrides() {
    let output = eck_exporter()
        .env("ECK_EXPORTER_CONTAINER_REGISTRY", "mirror.local")
        .env("ECK_EXPORTER_CONTAINER_SUFFIX", "-ubi8")
        .args(["image", "kibana", "8.1.0"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "mirror.local/kibana/kibana-ubi8:8.1.0"
    );
}

#[test]
fn test_unknown_product_rejected() {
    let output = eck_exporter()
        .args(["image", "logstash", "8.1.0"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
}

#[test]
fn test_render_deployment() {
    let output = eck_exporter()
        .args([
            "deployment",
            "--name",
            "es1",
            "--namespace",
            "ns1",
            "--es-version",
            "8.1.0",
        ])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let deployment: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(deployment["kind"], "Deployment");
    assert_eq!(deployment["metadata"]["name"], "es1-es-exporter");
    assert_eq!(deployment["spec"]["replicas"], 1);

    let container = &deployment["spec"]["template"]["spec"]["containers"][0];
    assert_eq!(container["name"], "elasticsearch-exporter");
    assert_eq!(
        container["image"],
        "quay.io/prometheuscommunity/elasticsearch-exporter:v1.3.0"
    );
    assert_eq!(container["ports"][0]["containerPort"], 9108);
    let command: Vec<String> = serde_json::from_value(container["command"].clone()).unwrap();
    assert!(command
        .iter()
        .any(|t| t.ends_with("@es1-es-internal-http.ns1.svc:9200")));
}

#[test]
fn test_render_deployment_invalid_version() {
    let output = eck_exporter()
        .args([
            "deployment",
            "--name",
            "es1",
            "--namespace",
            "ns1",
            "--es-version",
            "latest",
        ])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty(), "No partial output on failure");
}
