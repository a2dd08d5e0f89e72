//! Behavioural tests for a complete bridge invocation.
//!
//! Each scenario drives `auth_bridge::run` or `auth_bridge::run_online_count`
//! with a scripted client and checks the JSON document the desktop shell
//! would read.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use auth_bridge::{
    BridgeSettings, FixtureAuthClient, FixtureBehaviour, HostDocument, UserSnapshot,
    write_document,
};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use serde_json::Value;

#[derive(Default, ScenarioState)]
struct World {
    settings: Slot<BridgeSettings>,
    behaviour: Slot<FixtureBehaviour>,
    document: Slot<Value>,
    exit_status: Slot<u8>,
    client_built: Slot<bool>,
    online_users: Slot<usize>,
}

#[fixture]
fn world() -> World {
    World::default()
}

#[given("a configured KeyAuth application")]
fn a_configured_keyauth_application(world: &World) {
    world.settings.set(BridgeSettings {
        name: Some("PMDF".to_owned()),
        ownerid: Some("a1b2c3d4e5".to_owned()),
        hwid: Some("test-machine".to_owned()),
        ..BridgeSettings::default()
    });
}

#[given("an unconfigured KeyAuth application")]
fn an_unconfigured_keyauth_application(world: &World) {
    world.settings.set(BridgeSettings::default());
}

#[given("an authentication client that accepts the login")]
fn an_authentication_client_that_accepts_the_login(world: &World) {
    world.behaviour.set(FixtureBehaviour::Succeed(UserSnapshot {
        username: "alice".to_owned(),
        subscription: "premium".to_owned(),
        subscriptions: vec!["premium".to_owned()],
        expires: "1767225600".to_owned(),
        ..UserSnapshot::default()
    }));
}

#[given("an authentication client that terminates with \"{text}\"")]
fn an_authentication_client_that_terminates_with(world: &World, text: String) {
    world.behaviour.set(FixtureBehaviour::Terminate(text));
}

#[given("an authentication client that panics with \"{text}\"")]
fn an_authentication_client_that_panics_with(world: &World, text: String) {
    world.behaviour.set(FixtureBehaviour::Panic(text));
}

#[given("{count} users are online")]
fn users_are_online(world: &World, count: usize) {
    world.online_users.set(count);
}

#[when("the online count runs")]
fn the_online_count_runs(world: &World) {
    let settings = world.settings.get().expect("settings should be set");
    let behaviour = world.behaviour.get().expect("client behaviour should be set");
    let online = world.online_users.get().unwrap_or_default();

    let document = auth_bridge::run_online_count(
        || Ok(settings),
        |_credentials| Ok(FixtureAuthClient::new(behaviour).with_online_users(online)),
    );

    world.exit_status.set(document.exit_status());
    world.document.set(render(&document));
}

#[when("the bridge runs with arguments \"{args}\"")]
fn the_bridge_runs_with_arguments(world: &World, args: String) {
    let settings = world.settings.get().expect("settings should be set");
    let behaviour = world.behaviour.get().expect("client behaviour should be set");
    let mut built = false;

    let document = auth_bridge::run(
        args.split_whitespace().map(str::to_owned),
        || Ok(settings),
        |_credentials| {
            built = true;
            Ok(FixtureAuthClient::new(behaviour))
        },
    );

    world.client_built.set(built);
    world.exit_status.set(document.exit_status());
    world.document.set(render(&document));
}

#[then("the bridge reports success for user \"{username}\"")]
fn the_bridge_reports_success_for_user(world: &World, username: String) {
    let document = rendered_document(world);

    assert_eq!(document["success"], Value::Bool(true), "document: {document}");
    assert_eq!(document["message"], auth_bridge::SUCCESS_MESSAGE);
    assert_eq!(document["userData"]["username"], username.as_str());
    assert_eq!(document["userData"]["subscription"], "premium");
}

#[then("the bridge reports error code {code} of type \"{error_type}\"")]
fn the_bridge_reports_error_code_of_type(world: &World, code: u16, error_type: String) {
    let document = rendered_document(world);

    assert_eq!(document["success"], Value::Bool(false), "document: {document}");
    assert_eq!(document["errorCode"], u64::from(code), "document: {document}");
    assert_eq!(document["errorType"], error_type.as_str());
    let message = document["message"].as_str().expect("message should be text");
    assert!(!message.is_empty());
}

#[then("the online count is {count}")]
fn the_online_count_is(world: &World, count: u64) {
    let document = rendered_document(world);

    assert_eq!(document["success"], Value::Bool(true), "document: {document}");
    assert_eq!(document["count"], count, "document: {document}");
}

#[then("the online count fails with \"{text}\"")]
fn the_online_count_fails_with(world: &World, text: String) {
    let document = rendered_document(world);

    assert_eq!(document["success"], Value::Bool(false), "document: {document}");
    assert_eq!(document["count"], 0);
    assert_eq!(document["error"], text.as_str());
}

#[then("the original error is \"{text}\"")]
fn the_original_error_is(world: &World, text: String) {
    let document = rendered_document(world);

    assert_eq!(document["originalError"], text.as_str());
}

#[then("the authentication client was never built")]
fn the_authentication_client_was_never_built(world: &World) {
    let built = world.client_built.get().expect("run should have happened");

    assert!(!built);
}

#[then("the exit status is {status}")]
fn the_exit_status_is(world: &World, status: u8) {
    let actual = world.exit_status.get().expect("run should have happened");

    assert_eq!(actual, status);
}

#[scenario(path = "tests/features/auth_bridge.feature", index = 0)]
fn successful_login_returns_the_user_snapshot(world: World) {
    drop(world);
}

#[scenario(path = "tests/features/auth_bridge.feature", index = 1)]
fn incorrect_password_is_classified(world: World) {
    drop(world);
}

#[scenario(path = "tests/features/auth_bridge.feature", index = 2)]
fn single_argument_is_rejected_before_the_client_is_built(world: World) {
    drop(world);
}

#[scenario(path = "tests/features/auth_bridge.feature", index = 3)]
fn unmapped_diagnostic_keeps_the_original_text(world: World) {
    drop(world);
}

#[scenario(path = "tests/features/auth_bridge.feature", index = 4)]
fn missing_configuration_stops_before_the_client_is_built(world: World) {
    drop(world);
}

#[scenario(path = "tests/features/auth_bridge.feature", index = 5)]
fn client_panic_is_reported_as_a_critical_error(world: World) {
    drop(world);
}

#[scenario(path = "tests/features/auth_bridge.feature", index = 6)]
fn online_users_are_counted(world: World) {
    drop(world);
}

#[scenario(path = "tests/features/auth_bridge.feature", index = 7)]
fn rejected_online_count_reports_the_diagnostic(world: World) {
    drop(world);
}

fn rendered_document(world: &World) -> Value {
    world.document.get().expect("document should be rendered")
}

fn render<D: HostDocument>(document: &D) -> Value {
    let mut out = Vec::new();
    write_document(document, &mut out).expect("write to vec");
    let line = String::from_utf8(out).expect("utf-8 output");
    assert_eq!(line.matches('\n').count(), 1, "expected one line: {line}");
    serde_json::from_str(line.trim_end()).expect("valid JSON document")
}
