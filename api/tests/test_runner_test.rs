mod common;

use axum::http::StatusCode;
use common::{body_json, empty_request, make_test_app};
use serde_json::json;
use serial_test::serial;
use std::fs;
use tower::ServiceExt;
use util::config::AppConfig;

fn write_report(dir: &std::path::Path) {
    let report = json!({
        "success": false,
        "numTotalTests": 2,
        "numPassedTests": 1,
        "numFailedTests": 1,
        "numPendingTests": 0,
        "testResults": [
            {
                "name": "/work/tests/unit/math.test.ts",
                "status": "failed",
                "perfStats": { "runtime": 42 },
                "assertionResults": [
                    {
                        "title": "adds numbers",
                        "status": "failed",
                        "failureMessages": [
                            "expect(received).toBe(expected)\n\nExpected: 2\nReceived: 3\n    at Object.<anonymous> (/work/node_modules/jest/index.js:3:1)\n    at async Promise.all (index 0)"
                        ]
                    },
                    { "title": "subtracts numbers", "status": "passed" }
                ]
            }
        ],
        "coverageMap": {
            "/work/app/math.ts": {
                "s": { "0": 1, "1": 1, "2": 0 },
                "f": { "0": 1 },
                "b": { "0": [1, 0] },
                "statementMap": {
                    "0": { "start": { "line": 1, "column": 0 }, "end": { "line": 1, "column": 9 } },
                    "1": { "start": { "line": 2, "column": 0 }, "end": { "line": 2, "column": 9 } },
                    "2": { "start": { "line": 4, "column": 0 }, "end": { "line": 4, "column": 9 } }
                }
            }
        }
    });
    fs::write(dir.join("report.json"), report.to_string()).unwrap();
}

#[tokio::test]
#[serial]
async fn aggregates_a_full_test_run() {
    let dir = tempfile::tempdir().unwrap();
    write_report(dir.path());
    AppConfig::set_content_root(dir.path().to_string_lossy().into_owned());
    AppConfig::set_test_command("echo 'PASS tests/unit/math.test.ts' && cat report.json");

    let app = make_test_app().await;
    let response = app
        .oneshot(empty_request("POST", "/api/tests/run"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["summary"]["totalTests"], 2);
    assert_eq!(body["summary"]["failedTests"], 1);
    assert_eq!(body["summary"]["success"], false);

    let suites = body["testSuites"].as_array().unwrap();
    assert_eq!(suites.len(), 1);
    assert_eq!(suites[0]["status"], "failed");
    assert_eq!(suites[0]["duration"], 42.0);

    let messages = suites[0]["tests"][0]["failureMessages"].as_array().unwrap();
    let sanitized = messages[0].as_str().unwrap();
    assert_eq!(
        sanitized,
        "expect(received).toBe(expected)\nExpected: 2\nReceived: 3"
    );
    assert!(!sanitized.contains("node_modules"));
    assert!(suites[0]["tests"][1]["failureMessages"].is_null());

    assert_eq!(body["coverage"]["statements"], "66.67");
    assert_eq!(body["coverage"]["functions"], "100.00");
    assert_eq!(body["coverage"]["branches"], "50.00");
    assert_eq!(body["coverage"]["lines"], "66.67");
    assert!(body["error"].is_null());
}

#[tokio::test]
#[serial]
async fn unparseable_output_yields_fixed_error_with_http_200() {
    let dir = tempfile::tempdir().unwrap();
    AppConfig::set_content_root(dir.path().to_string_lossy().into_owned());
    AppConfig::set_test_command("echo 'not json at all'");

    let app = make_test_app().await;
    let response = app
        .oneshot(empty_request("POST", "/api/tests/run"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to parse test results. Please try again.");
    assert_eq!(body["testSuites"].as_array().unwrap().len(), 0);
    assert!(body["summary"].is_null());
}

#[tokio::test]
#[serial]
async fn failed_command_without_report_surfaces_raw_error() {
    let dir = tempfile::tempdir().unwrap();
    AppConfig::set_content_root(dir.path().to_string_lossy().into_owned());
    AppConfig::set_test_command("echo 'boom' && exit 2");

    let app = make_test_app().await;
    let response = app
        .oneshot(empty_request("POST", "/api/tests/run"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("test command failed")
    );
    assert!(body["summary"].is_null());
}

#[tokio::test]
#[serial]
async fn failing_tests_with_clean_report_still_succeed() {
    // One failing test makes the runner exit nonzero, yet it prints the full
    // report; the run still counts as aggregated, coverage included.
    let dir = tempfile::tempdir().unwrap();
    write_report(dir.path());
    AppConfig::set_content_root(dir.path().to_string_lossy().into_owned());
    AppConfig::set_test_command("cat report.json && exit 1");

    let app = make_test_app().await;
    let response = app
        .oneshot(empty_request("POST", "/api/tests/run"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["summary"]["totalTests"], 2);
    assert_eq!(body["summary"]["failedTests"], 1);
    assert_eq!(body["summary"]["success"], false);
    assert_eq!(body["coverage"]["statements"], "66.67");
    assert_eq!(body["coverage"]["lines"], "66.67");
    assert!(body["error"].is_null());
}

#[tokio::test]
#[serial]
async fn failed_command_with_recovered_report_returns_partial_result() {
    let dir = tempfile::tempdir().unwrap();
    write_report(dir.path());
    AppConfig::set_content_root(dir.path().to_string_lossy().into_owned());
    AppConfig::set_test_command(
        "echo 'FAIL tests/unit/math.test.ts' && cat report.json && echo 'worker crashed' && exit 1",
    );

    let app = make_test_app().await;
    let response = app
        .oneshot(empty_request("POST", "/api/tests/run"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["summary"]["totalTests"], 2);
    assert_eq!(body["testSuites"].as_array().unwrap().len(), 1);
    assert!(body["coverage"].is_null());
    assert!(body["error"].as_str().unwrap().contains("test command failed"));
}
