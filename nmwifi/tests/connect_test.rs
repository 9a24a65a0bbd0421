//! Connect, disconnect and profile management through `WifiManager`.

mod common;

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use common::{
    ConnectBehavior, MockService, ap, drain, manager, profile_files, save_profile,
};
use nmwifi::{AccessPointState, ConnectPhase, ConnectionStatus, ManagerState, WifiEvent};

fn scanned_service() -> MockService {
    MockService::new().with_access_points(vec![ap("Home", -40, true), ap("Cafe", -70, true)])
}

#[tokio::test]
async fn unknown_ssid_is_wrong_protocol_without_service_call() {
    let tmp = tempfile::tempdir().unwrap();
    let service = Arc::new(scanned_service());
    let wifi = manager(&service, tmp.path());
    wifi.start().await;
    wifi.scan().await;

    let status = wifi.connect("Elsewhere", "password123", false).await;

    assert_eq!(status, ConnectionStatus::WrongProtocol);
    assert!(!service.called("connect:"));
    assert_eq!(
        wifi.connect_phase(),
        ConnectPhase::Finished(ConnectionStatus::WrongProtocol)
    );
}

#[tokio::test]
async fn profiles_are_cleared_even_when_validation_fails() {
    let tmp = tempfile::tempdir().unwrap();
    save_profile(tmp.path(), "Old");
    let service = Arc::new(scanned_service());
    let wifi = manager(&service, tmp.path());
    wifi.start().await;

    let status = wifi.connect("Elsewhere", "password123", false).await;

    assert_eq!(status, ConnectionStatus::WrongProtocol);
    assert_eq!(profile_files(tmp.path()), 0);
}

#[tokio::test]
async fn successful_connect_marks_target_and_publishes_catalog() {
    let tmp = tempfile::tempdir().unwrap();
    let service = Arc::new(scanned_service().with_active("Home"));
    let wifi = manager(&service, tmp.path());
    wifi.start().await;
    wifi.scan().await;
    let mut events = wifi.subscribe();

    let status = wifi.connect("Cafe", "password123", false).await;

    assert_eq!(status, ConnectionStatus::Successful);
    assert_eq!(service.calls().last().map(String::as_str), Some("connect:Cafe"));
    assert_eq!(wifi.current_connected_name(), "Cafe");

    let events = drain(&mut events);
    assert_eq!(events.len(), 1);
    let WifiEvent::ScanCompleted(snapshot) = &events[0] else {
        panic!("expected ScanCompleted, got {events:?}");
    };
    assert_eq!(snapshot[0].name, "Home");
    assert_eq!(snapshot[0].state, AccessPointState::Disconnected);
    assert_eq!(snapshot[1].name, "Cafe");
    assert_eq!(snapshot[1].state, AccessPointState::Connected);
    assert_eq!(
        wifi.connect_phase(),
        ConnectPhase::Finished(ConnectionStatus::Successful)
    );
}

#[tokio::test]
async fn hidden_network_skips_catalog_check() {
    let tmp = tempfile::tempdir().unwrap();
    let service = Arc::new(MockService::new());
    let wifi = manager(&service, tmp.path());
    wifi.start().await;

    let status = wifi.connect("Stealth", "password123", true).await;

    assert_eq!(status, ConnectionStatus::Successful);
    assert!(service.called("connect:Stealth"));
}

#[tokio::test]
async fn hidden_network_connect_reports_connectivity() {
    let tmp = tempfile::tempdir().unwrap();
    let service = Arc::new(
        MockService::new()
            .with_state(ManagerState::Disconnected)
            .with_active_strength(-61),
    );
    let wifi = manager(&service, tmp.path());
    wifi.start().await;
    assert!(!wifi.is_connected_to_wifi());

    let status = wifi.connect("Stealth", "password123", true).await;

    assert_eq!(status, ConnectionStatus::Successful);
    assert!(wifi.access_points().is_empty());
    assert!(wifi.is_connected_to_wifi());
    assert_eq!(wifi.current_signal_strength().await, -61);
}

#[tokio::test]
async fn failed_connect_leaves_catalog_and_empties_profiles() {
    let tmp = tempfile::tempdir().unwrap();
    let service = Arc::new(scanned_service().with_connect(ConnectBehavior::Fail));
    let wifi = manager(&service, tmp.path());
    wifi.start().await;
    let before = wifi.scan().await;
    save_profile(tmp.path(), "Cafe");
    let mut events = wifi.subscribe();

    let status = wifi.connect("Cafe", "wrong", false).await;

    assert_eq!(status, ConnectionStatus::Failed);
    assert_eq!(profile_files(tmp.path()), 0);
    assert_eq!(wifi.access_points(), before);
    assert!(drain(&mut events).is_empty());
}

#[tokio::test]
async fn connect_times_out() {
    let tmp = tempfile::tempdir().unwrap();
    let service = Arc::new(scanned_service().with_connect(ConnectBehavior::Hang));
    let wifi = manager(&service, tmp.path());
    wifi.start().await;
    wifi.scan().await;

    let status = wifi.connect("Home", "password123", false).await;

    assert_eq!(status, ConnectionStatus::Failed);
    assert_eq!(profile_files(tmp.path()), 0);
    assert_eq!(wifi.current_connected_name(), "");
}

#[tokio::test]
async fn cancelled_connect_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let service = Arc::new(scanned_service().with_connect(ConnectBehavior::Hang));
    let wifi = common::config(tmp.path()).with_connect_timeout(Duration::from_secs(30));
    let wifi = nmwifi::WifiManager::with_service(
        wifi,
        Arc::clone(&service) as Arc<dyn nmwifi::NetworkService>,
        Arc::new(nmwifi::DirProfileStore::new(tmp.path())),
    );
    wifi.start().await;
    wifi.scan().await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let status = wifi
        .connect_with_cancel("Home", "password123", false, &cancel)
        .await;

    assert_eq!(status, ConnectionStatus::Failed);
    assert!(service.called("connect:Home"));
}

#[tokio::test]
async fn connect_phase_starts_idle() {
    let tmp = tempfile::tempdir().unwrap();
    let service = Arc::new(MockService::new());
    let wifi = manager(&service, tmp.path());

    assert_eq!(wifi.connect_phase(), ConnectPhase::Idle);
}

#[tokio::test]
async fn disconnect_leaves_catalog_alone() {
    let tmp = tempfile::tempdir().unwrap();
    let service = Arc::new(scanned_service().with_active("Home"));
    let wifi = manager(&service, tmp.path());
    wifi.start().await;
    wifi.scan().await;

    wifi.disconnect().await;

    assert!(service.called("disconnect"));
    assert_eq!(wifi.current_connected_name(), "Home");
}

#[tokio::test]
async fn delete_connections_removes_every_profile() {
    let tmp = tempfile::tempdir().unwrap();
    let service = Arc::new(MockService::new().with_profiles(&["Home", "Cafe"]));
    let wifi = manager(&service, tmp.path());

    wifi.delete_connections().await;

    assert_eq!(service.calls(), vec!["delete:Home", "delete:Cafe"]);
    assert!(service.profiles.lock().unwrap().is_empty());
}

#[tokio::test]
async fn delete_connections_without_profiles_is_a_no_op() {
    let tmp = tempfile::tempdir().unwrap();
    let service = Arc::new(MockService::new());
    let wifi = manager(&service, tmp.path());

    wifi.delete_connections().await;

    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn remove_active_connection_clears_marker_and_notifies() {
    let tmp = tempfile::tempdir().unwrap();
    let service = Arc::new(scanned_service().with_active("Home"));
    let wifi = manager(&service, tmp.path());
    wifi.start().await;
    wifi.scan().await;
    let mut events = wifi.subscribe();

    wifi.remove_active_connection().await;

    assert_eq!(drain(&mut events), vec![WifiEvent::ActiveConnectionRemoved]);
    assert_eq!(wifi.current_connected_name(), "");
}

#[tokio::test]
async fn remove_active_connection_failure_emits_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let service = Arc::new(scanned_service().with_active("Home"));
    *service.deactivate_fails.lock().unwrap() = true;
    let wifi = manager(&service, tmp.path());
    wifi.start().await;
    wifi.scan().await;
    let mut events = wifi.subscribe();

    wifi.remove_active_connection().await;

    assert!(drain(&mut events).is_empty());
    assert_eq!(wifi.current_connected_name(), "Home");
}
