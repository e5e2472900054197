// MIT License - Copyright (c) 2026 Peter Wright
// Client against a mock portal serving the JSON API

mod common;

use alarmdotcom::{AlarmError, AlarmPanel, AlarmState, Command, HostAlarmState, PortalVariant};
use mockito::{Matcher, Server};
use serde_json::json;

use common::{client, fixture, mock_discovery, mock_login, AJAX_KEY, PARTITION_PATH};

fn arm_body() -> Matcher {
    Matcher::Json(json!({
        "forceBypass": false,
        "noEntryDelay": false,
        "silentArming": true,
        "statePollOnly": false
    }))
}

#[tokio::test]
async fn test_login_discovers_partition_and_polls() {
    let mut server = Server::new_async().await;
    let (page, post) = mock_login(&mut server, 1).await;
    let (systems, system) = mock_discovery(&mut server).await;
    let partition = server
        .mock("GET", PARTITION_PATH)
        .match_header("ajaxrequestuniquekey", AJAX_KEY)
        .match_header("accept", "application/vnd.api+json")
        .with_status(200)
        .with_body(fixture("partition_disarmed.json"))
        .create_async()
        .await;
    let sensors = server
        .mock("GET", "/web/api/devices/sensors")
        .match_header("ajaxrequestuniquekey", AJAX_KEY)
        .with_status(200)
        .with_body(fixture("sensors.json"))
        .create_async()
        .await;

    let mut client = client(&server, PortalVariant::JsonApi);
    let snapshot = client.poll_status().await.unwrap();

    assert_eq!(snapshot.state, AlarmState::Disarmed);
    assert_eq!(
        snapshot.sensor_status().as_deref(),
        Some("Front Door is Closed, Garage is Open")
    );
    assert_eq!(
        client.sensor_status().as_deref(),
        Some("Front Door is Closed, Garage is Open")
    );

    page.assert_async().await;
    post.assert_async().await;
    systems.assert_async().await;
    system.assert_async().await;
    partition.assert_async().await;
    sensors.assert_async().await;
}

#[tokio::test]
async fn test_no_partition_fails_login() {
    let mut server = Server::new_async().await;
    let (_page, _post) = mock_login(&mut server, 1).await;
    let _systems = server
        .mock("GET", "/web/api/systems/availableSystemItems")
        .with_status(200)
        .with_body(r#"{"data":[]}"#)
        .create_async()
        .await;

    let mut client = client(&server, PortalVariant::JsonApi);
    let err = client.ensure_logged_in().await.unwrap_err();
    assert!(matches!(err, AlarmError::NoPartition));
    assert!(!client.is_logged_in());
}

#[tokio::test]
async fn test_arm_away_posts_options() {
    let mut server = Server::new_async().await;
    let (_page, _post) = mock_login(&mut server, 1).await;
    let (_systems, _system) = mock_discovery(&mut server).await;
    let live = server
        .mock("GET", PARTITION_PATH)
        .with_status(200)
        .with_body(fixture("partition_disarmed.json"))
        .create_async()
        .await;
    let arm = server
        .mock("POST", format!("{PARTITION_PATH}/armAway").as_str())
        .match_header("ajaxrequestuniquekey", AJAX_KEY)
        .match_body(arm_body())
        .with_status(200)
        .with_body(fixture("partition_armed_away.json"))
        .create_async()
        .await;

    let mut client = client(&server, PortalVariant::JsonApi);
    assert_eq!(client.arm_away().await.unwrap(), AlarmState::ArmedAway);
    assert_eq!(client.state(), AlarmState::ArmedAway);

    live.assert_async().await;
    arm.assert_async().await;
}

#[tokio::test]
async fn test_unauthorized_command_relogs_and_retries_same_command() {
    let mut server = Server::new_async().await;
    let (page, post) = mock_login(&mut server, 2).await;
    // Discovery happens once; the partition id survives the new session.
    let (systems, system) = mock_discovery(&mut server).await;
    let rejected = server
        .mock("POST", format!("{PARTITION_PATH}/armAway").as_str())
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let accepted = server
        .mock("POST", format!("{PARTITION_PATH}/armAway").as_str())
        .match_body(arm_body())
        .with_status(200)
        .with_body(fixture("partition_armed_away.json"))
        .expect(1)
        .create_async()
        .await;
    let disarm = server
        .mock("POST", format!("{PARTITION_PATH}/disarm").as_str())
        .expect(0)
        .create_async()
        .await;
    // Live state is read before each attempt.
    let live = server
        .mock("GET", PARTITION_PATH)
        .with_status(200)
        .with_body(fixture("partition_disarmed.json"))
        .expect(2)
        .create_async()
        .await;
    let sensors = server
        .mock("GET", "/web/api/devices/sensors")
        .expect(0)
        .create_async()
        .await;

    let mut client = client(&server, PortalVariant::JsonApi);
    assert_eq!(client.arm_away().await.unwrap(), AlarmState::ArmedAway);

    page.assert_async().await;
    post.assert_async().await;
    systems.assert_async().await;
    system.assert_async().await;
    rejected.assert_async().await;
    accepted.assert_async().await;
    disarm.assert_async().await;
    live.assert_async().await;
    sensors.assert_async().await;
}

#[tokio::test]
async fn test_login_page_instead_of_json_is_expiry() {
    let mut server = Server::new_async().await;
    let (page, post) = mock_login(&mut server, 2).await;
    let (_systems, _system) = mock_discovery(&mut server).await;
    let bounced = server
        .mock("GET", PARTITION_PATH)
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(fixture("login.html"))
        .expect(1)
        .create_async()
        .await;
    let partition = server
        .mock("GET", PARTITION_PATH)
        .with_status(200)
        .with_body(fixture("partition_armed_away.json"))
        .expect(1)
        .create_async()
        .await;
    let _sensors = server
        .mock("GET", "/web/api/devices/sensors")
        .with_status(200)
        .with_body(r#"{"data":[]}"#)
        .create_async()
        .await;

    let mut client = client(&server, PortalVariant::JsonApi);
    assert_eq!(client.update().await.unwrap(), AlarmState::ArmedAway);
    assert_eq!(client.sensor_status(), None);

    page.assert_async().await;
    post.assert_async().await;
    bounced.assert_async().await;
    partition.assert_async().await;
}

#[tokio::test]
async fn test_panel_wrong_code_makes_no_request() {
    let mut server = Server::new_async().await;
    let (page, post) = mock_login(&mut server, 0).await;
    let disarm = server
        .mock("POST", format!("{PARTITION_PATH}/disarm").as_str())
        .expect(0)
        .create_async()
        .await;

    let client = client(&server, PortalVariant::JsonApi);
    let mut panel = AlarmPanel::new(None, Some("1234".to_string()), client);

    let err = panel.alarm_disarm(Some("9999")).await.unwrap_err();
    assert!(matches!(err, AlarmError::WrongCode));
    let err = panel.alarm_disarm(None).await.unwrap_err();
    assert!(matches!(err, AlarmError::WrongCode));

    page.assert_async().await;
    post.assert_async().await;
    disarm.assert_async().await;
}

#[tokio::test]
async fn test_panel_update_and_arm_home() {
    let mut server = Server::new_async().await;
    let (_page, _post) = mock_login(&mut server, 1).await;
    let (_systems, _system) = mock_discovery(&mut server).await;
    let _partition = server
        .mock("GET", PARTITION_PATH)
        .with_status(200)
        .with_body(fixture("partition_disarmed.json"))
        .expect(2)
        .create_async()
        .await;
    let _sensors = server
        .mock("GET", "/web/api/devices/sensors")
        .with_status(200)
        .with_body(fixture("sensors.json"))
        .create_async()
        .await;
    let arm_stay = server
        .mock("POST", format!("{PARTITION_PATH}/armStay").as_str())
        .match_body(arm_body())
        .with_status(200)
        .with_body(r#"{"data":{"id":"100200300-127","attributes":{"state":2}}}"#)
        .create_async()
        .await;

    let client = client(&server, PortalVariant::JsonApi);
    let mut panel = AlarmPanel::new(Some("Home".to_string()), Some("1234".to_string()), client);

    assert_eq!(panel.async_update().await, Some(HostAlarmState::Disarmed));
    assert_eq!(
        panel.attributes(),
        json!({ "sensor_status": "Front Door is Closed, Garage is Open" })
    );

    assert_eq!(panel.alarm_arm_home(Some("1234")).await.unwrap(), AlarmState::ArmedStay);
    assert_eq!(panel.state(), Some(HostAlarmState::ArmedHome));

    arm_stay.assert_async().await;
}

#[tokio::test]
async fn test_disarm_after_keypad_arming_is_sent() {
    let mut server = Server::new_async().await;
    let (_page, _post) = mock_login(&mut server, 1).await;
    let (_systems, _system) = mock_discovery(&mut server).await;
    let polled = server
        .mock("GET", PARTITION_PATH)
        .with_status(200)
        .with_body(fixture("partition_disarmed.json"))
        .expect(1)
        .create_async()
        .await;
    // Armed at the keypad after the poll.
    let armed = server
        .mock("GET", PARTITION_PATH)
        .with_status(200)
        .with_body(fixture("partition_armed_away.json"))
        .expect(1)
        .create_async()
        .await;
    let _sensors = server
        .mock("GET", "/web/api/devices/sensors")
        .with_status(200)
        .with_body(r#"{"data":[]}"#)
        .create_async()
        .await;
    let disarm = server
        .mock("POST", format!("{PARTITION_PATH}/disarm").as_str())
        .match_header("ajaxrequestuniquekey", AJAX_KEY)
        .match_body(arm_body())
        .with_status(200)
        .with_body(fixture("partition_disarmed.json"))
        .create_async()
        .await;

    let mut client = client(&server, PortalVariant::JsonApi);
    assert_eq!(client.update().await.unwrap(), AlarmState::Disarmed);
    assert_eq!(client.dispatch(Command::Disarm).await.unwrap(), AlarmState::Disarmed);

    polled.assert_async().await;
    armed.assert_async().await;
    disarm.assert_async().await;
}

#[tokio::test]
async fn test_command_skipped_when_portal_already_in_target_state() {
    let mut server = Server::new_async().await;
    let (_page, _post) = mock_login(&mut server, 1).await;
    let (_systems, _system) = mock_discovery(&mut server).await;
    let live = server
        .mock("GET", PARTITION_PATH)
        .with_status(200)
        .with_body(fixture("partition_armed_away.json"))
        .create_async()
        .await;
    let arm = server
        .mock("POST", format!("{PARTITION_PATH}/armAway").as_str())
        .expect(0)
        .create_async()
        .await;

    let mut client = client(&server, PortalVariant::JsonApi);
    assert_eq!(client.arm_away().await.unwrap(), AlarmState::ArmedAway);

    live.assert_async().await;
    arm.assert_async().await;
}
