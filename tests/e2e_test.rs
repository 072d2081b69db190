/// End-to-end tests for the CLI
use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use futures::FutureExt;
use predicates::prelude::*;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Binary with an empty environment so the host's variables never leak in
fn credwatch() -> Command {
    let mut cmd = cargo_bin_cmd!("credwatch");
    cmd.env_clear().env("RUST_LOG", "warn");
    cmd
}

fn with_directory(cmd: &mut Command, authority: &str, graph: &str) {
    cmd.env("AZURE_TENANT_ID", "contoso")
        .env("AZURE_CLIENT_ID", "client-id")
        .env("AZURE_CLIENT_SECRET", "client-secret")
        .env("AZURE_AUTHORITY_HOST", authority)
        .env("GRAPH_BASE_URL", graph);
}

/// Starts a mock server. A failure to bind fails the test unless
/// `CREDWATCH_SKIP_MOCK_TESTS` is set for hosts without loopback networking.
async fn try_start_mock() -> Option<MockServer> {
    let fut = std::panic::AssertUnwindSafe(MockServer::start());
    match fut.catch_unwind().await {
        Ok(server) => Some(server),
        Err(_) if std::env::var_os("CREDWATCH_SKIP_MOCK_TESTS").is_some() => None,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

// Exit code tests for CLI
mod exit_code_tests {
    use super::*;

    /// Exit code 0: --help should return success
    #[test]
    fn test_exit_code_help() {
        credwatch()
            .arg("--help")
            .assert()
            .code(0)
            .stdout(predicate::str::contains("test-services"));
    }

    /// Exit code 0: --version should return success
    #[test]
    fn test_exit_code_version() {
        credwatch()
            .arg("--version")
            .assert()
            .code(0)
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    /// Exit code 2: Invalid arguments
    #[test]
    fn test_exit_code_invalid_argument() {
        credwatch().arg("--invalid-option").assert().code(2);
    }

    /// Exit code 2: Unknown subcommand
    #[test]
    fn test_exit_code_unknown_subcommand() {
        credwatch().arg("rotate").assert().code(2);
    }

    /// Exit code 3: directory credentials missing
    #[test]
    fn test_exit_code_missing_directory_config() {
        credwatch()
            .arg("list")
            .assert()
            .code(3)
            .stderr(predicate::str::contains("AZURE_TENANT_ID is not set"));
    }

    /// Exit code 3: no mail backend selected
    #[test]
    fn test_exit_code_no_mail_backend() {
        let mut cmd = credwatch();
        with_directory(&mut cmd, "http://127.0.0.1:1", "http://127.0.0.1:1/v1.0");
        cmd.env("MAIL_TO", "ops@example.com")
            .env("MAIL_FROM", "credwatch@example.com")
            .arg("check")
            .assert()
            .code(3)
            .stderr(predicate::str::contains(
                "no mail delivery backend is configured",
            ));
    }

    /// Exit code 3: both mail backends selected
    #[test]
    fn test_exit_code_ambiguous_mail_backend() {
        let mut cmd = credwatch();
        with_directory(&mut cmd, "http://127.0.0.1:1", "http://127.0.0.1:1/v1.0");
        cmd.env("MAIL_TO", "ops@example.com")
            .env("MAIL_FROM", "credwatch@example.com")
            .env("SMTP_HOST", "smtp.example.com")
            .env("ACS_ENDPOINT", "https://mail.example.com")
            .arg("test-services")
            .assert()
            .code(3)
            .stderr(predicate::str::contains("both SMTP and cloud email"));
    }

    /// Exit code 3: malformed schedule
    #[test]
    fn test_exit_code_invalid_check_time() {
        let mut cmd = credwatch();
        with_directory(&mut cmd, "http://127.0.0.1:1", "http://127.0.0.1:1/v1.0");
        cmd.env("MAIL_TO", "ops@example.com")
            .env("MAIL_FROM", "credwatch@example.com")
            .env("SMTP_HOST", "smtp.example.com")
            .env("CHECK_TIME", "25:00")
            .arg("serve")
            .assert()
            .code(3)
            .stderr(predicate::str::contains("CHECK_TIME"));
    }

    /// Exit code 3: token endpoint unreachable
    #[test]
    fn test_exit_code_unreachable_directory() {
        let mut cmd = credwatch();
        with_directory(&mut cmd, "http://127.0.0.1:1", "http://127.0.0.1:1/v1.0");
        cmd.arg("list")
            .assert()
            .code(3)
            .stderr(predicate::str::contains("access token"));
    }
}

mod directory_tests {
    use super::*;

    async fn mock_directory() -> Option<MockServer> {
        let server = try_start_mock().await?;

        Mock::given(method("POST"))
            .and(path("/contoso/oauth2/v2.0/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token_type": "Bearer",
                "expires_in": 3599,
                "access_token": "graph-token"
            })))
            .mount(&server)
            .await;

        let soon = (chrono::Utc::now() + chrono::Duration::days(3) - chrono::Duration::hours(1))
            .to_rfc3339();
        let later = (chrono::Utc::now() + chrono::Duration::days(300)).to_rfc3339();

        Mock::given(method("GET"))
            .and(path("/v1.0/servicePrincipals"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [{
                    "id": "sp-1",
                    "appId": "payroll-app",
                    "displayName": "Payroll",
                    "passwordCredentials": [
                        { "keyId": "k1", "displayName": "ci key", "endDateTime": soon }
                    ],
                    "keyCredentials": []
                }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1.0/applications"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [{
                    "id": "app-2",
                    "appId": "billing-app",
                    "displayName": "Billing",
                    "passwordCredentials": [
                        { "keyId": "k2", "endDateTime": later }
                    ],
                    "keyCredentials": []
                }]
            })))
            .mount(&server)
            .await;

        Some(server)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_list_prints_every_application() {
        let Some(server) = mock_directory().await else {
            eprintln!("skipping test_list_prints_every_application: mock server unavailable");
            return;
        };

        let mut cmd = credwatch();
        with_directory(&mut cmd, &server.uri(), &format!("{}/v1.0", server.uri()));
        cmd.arg("list")
            .assert()
            .code(0)
            .stdout(predicate::str::contains("Payroll (payroll-app)"))
            .stdout(predicate::str::contains("Secret: ci key"))
            .stdout(predicate::str::contains("Billing (billing-app)"))
            .stdout(predicate::str::contains("2 application(s)"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_list_with_days_filters() {
        let Some(server) = mock_directory().await else {
            eprintln!("skipping test_list_with_days_filters: mock server unavailable");
            return;
        };

        let mut cmd = credwatch();
        with_directory(&mut cmd, &server.uri(), &format!("{}/v1.0", server.uri()));
        cmd.args(["list", "--days", "3"])
            .assert()
            .code(0)
            .stdout(predicate::str::contains("Payroll"))
            .stdout(predicate::str::contains("Billing").not())
            .stdout(predicate::str::contains("1 application(s)"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_services_fail_when_smtp_unreachable() {
        let Some(server) = mock_directory().await else {
            eprintln!("skipping test_services_fail_when_smtp_unreachable: mock server unavailable");
            return;
        };

        let mut cmd = credwatch();
        with_directory(&mut cmd, &server.uri(), &format!("{}/v1.0", server.uri()));
        cmd.env("MAIL_TO", "ops@example.com")
            .env("MAIL_FROM", "credwatch@example.com")
            .env("SMTP_HOST", "127.0.0.1")
            .env("SMTP_PORT", "1")
            .arg("test-services")
            .assert()
            .code(3)
            .stderr(predicate::str::contains("connection check"));
    }
}
