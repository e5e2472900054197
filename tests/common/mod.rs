// MIT License - Copyright (c) 2026 Peter Wright
// Shared helpers for portal integration tests

#![allow(dead_code)]

use mockito::{Matcher, Mock, Server};

use alarmdotcom::{AlarmClient, ClientConfig, PortalVariant};

pub const USERNAME: &str = "user@example.com";
pub const PASSWORD: &str = "secret";
pub const AJAX_KEY: &str = "KEY123";
pub const PARTITION_PATH: &str = "/web/api/devices/partitions/100200300-127";

pub fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("fixture {path}: {e}"))
}

pub fn client(server: &Server, variant: PortalVariant) -> AlarmClient {
    let config = ClientConfig::builder()
        .username(USERNAME)
        .password(PASSWORD)
        .base_url(server.url())
        .variant(variant)
        .timeout_ms(5_000)
        .build();
    AlarmClient::new(config).unwrap()
}

/// Login page GET and credential POST, each expected `times` times.
///
/// Mocks are removed from the server when dropped, so callers must keep
/// the returned pair alive for the duration of the test.
pub async fn mock_login(server: &mut Server, times: usize) -> (Mock, Mock) {
    let page = server
        .mock("GET", "/login.aspx")
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_header("set-cookie", &format!("afg={AJAX_KEY}; Path=/"))
        .with_body(fixture("login.html"))
        .expect(times)
        .create_async()
        .await;

    let post = server
        .mock("POST", "/web/Default.aspx")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("__VIEWSTATE".into(), "dDwtMTA4MzE0MjEwNTs7PrBvuNbYzU+4wDQXxBt9vRPRxDv1".into()),
            Matcher::UrlEncoded(
                "ctl00$ContentPlaceHolder1$loginform$txtUserName".into(),
                USERNAME.into(),
            ),
            Matcher::UrlEncoded(
                "ctl00$ContentPlaceHolder1$loginform$txtPassword".into(),
                PASSWORD.into(),
            ),
        ]))
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(fixture("landing.html"))
        .expect(times)
        .create_async()
        .await;

    (page, post)
}

/// System and partition lookups made once after the first login.
pub async fn mock_discovery(server: &mut Server) -> (Mock, Mock) {
    let systems = server
        .mock("GET", "/web/api/systems/availableSystemItems")
        .match_header("ajaxrequestuniquekey", AJAX_KEY)
        .with_status(200)
        .with_header("content-type", "application/vnd.api+json")
        .with_body(fixture("available_systems.json"))
        .create_async()
        .await;

    let system = server
        .mock("GET", "/web/api/systems/systems/100200300")
        .with_status(200)
        .with_header("content-type", "application/vnd.api+json")
        .with_body(fixture("system.json"))
        .create_async()
        .await;

    (systems, system)
}

/// GET of the status page returning the named fixture.
pub async fn mock_status_page(server: &mut Server, fixture_name: &str, times: usize) -> Mock {
    server
        .mock("GET", "/pda/Default.aspx")
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(fixture(fixture_name))
        .expect(times)
        .create_async()
        .await
}

/// POST of a status page button.
pub async fn mock_button(
    server: &mut Server,
    button: &str,
    value: &str,
    response_fixture: &str,
    times: usize,
) -> Mock {
    server
        .mock("POST", "/pda/Default.aspx")
        .match_body(Matcher::UrlEncoded(button.into(), value.into()))
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(fixture(response_fixture))
        .expect(times)
        .create_async()
        .await
}
