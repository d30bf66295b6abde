use edgesync_core::{ArtifactKind, Config, HttpMethod, ServiceId};
use edgesync_renderer::{TemplateEngine, VclContext};
use edgesync_sync::{
    testing::{RecordingNotifier, ScriptedTransport},
    Endpoints, RunOutcome, VersionSync,
};
use rstest::rstest;
use serde_json::json;

const DRAFT: u32 = 8;
const PAGE: &str = "<html><body>Back soon.</body></html>";

fn config() -> Config {
    let mut config = Config::new(ServiceId::from("S"), "secret");
    config.api_base_url = "https://api.example.test".into();
    config
}

fn endpoints() -> Endpoints {
    Endpoints::from_config(&config())
}

fn session<'a>(
    t: &'a ScriptedTransport,
    n: &'a RecordingNotifier,
) -> VersionSync<&'a ScriptedTransport, &'a RecordingNotifier> {
    let templates = TemplateEngine::new(None, &VclContext::from_config(&config())).expect("templates");
    VersionSync::connect(t, n, templates, &config())
}

fn active_at_seven() -> ScriptedTransport {
    ScriptedTransport::healthy(&endpoints(), json!([{"number": 7, "active": true}]))
}

/// Clone, validation, and every write succeed; nothing exists in the draft yet.
fn ready_transport() -> ScriptedTransport {
    let e = endpoints();
    let t = active_at_seven();
    t.on_json(HttpMethod::Put, &e.clone_version(7), 200, json!({"number": DRAFT}));
    t.on_json(HttpMethod::Get, &e.validate(DRAFT), 200, json!({"errors": []}));
    for kind in [
        ArtifactKind::Condition,
        ArtifactKind::ResponseObject,
        ArtifactKind::VclSnippet,
    ] {
        t.on(HttpMethod::Post, &e.collection(DRAFT, kind), 200, "{}");
    }
    t.on(HttpMethod::Put, &e.activate(DRAFT), 200, "{}");
    t
}

#[test]
fn failed_clone_aborts_with_no_further_calls() {
    let e = endpoints();
    let t = active_at_seven();
    t.on_json(HttpMethod::Put, &e.clone_version(7), 500, json!({"msg": "busy"}));
    let n = RecordingNotifier::new();
    let mut sync = session(&t, &n);
    let before = t.requests().len();

    let report = sync.upload_maintenance_page(PAGE);

    assert!(report.is_aborted());
    assert!(report.errors[0].contains("Unable to clone last version"));
    assert_eq!(t.requests().len(), before + 1, "only the clone was attempted");
    let sent = n.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, "maintenance_page");
}

#[test]
fn fresh_draft_gets_every_piece_in_order() {
    let e = endpoints();
    let t = ready_transport();
    let n = RecordingNotifier::new();
    let mut sync = session(&t, &n);

    let report = sync.upload_maintenance_page(PAGE);

    assert_eq!(
        report.outcome,
        RunOutcome::Completed {
            version: DRAFT,
            pass: true,
            activated: true
        }
    );
    let urls: Vec<_> = t.mutations().into_iter().map(|r| r.url).collect();
    assert_eq!(
        urls,
        [
            e.clone_version(7),
            e.collection(DRAFT, ArtifactKind::Condition),
            e.collection(DRAFT, ArtifactKind::ResponseObject),
            e.collection(DRAFT, ArtifactKind::VclSnippet),
            e.activate(DRAFT),
        ]
    );

    let mutations = t.mutations();
    assert_eq!(mutations[1].form["statement"], "req.http.X-Maintenance-Page == \"1\"");
    assert_eq!(mutations[2].form["content"], PAGE);
    assert_eq!(mutations[2].form["status"], "503");
    assert_eq!(mutations[2].form["request_condition"], "maintenance_page_condition");
    assert_eq!(mutations[3].form["name"], "drupalmodule_maintenance_deliver");
    assert_eq!(mutations[3].form["type"], "deliver");

    assert_eq!(n.sent()[0].0, "Maintenance page updated and activated (version 8).");
    assert_eq!(sync.active_version().map(|v| v.number), Some(DRAFT));
}

#[test]
fn existing_pieces_are_updated_in_place() {
    let e = endpoints();
    let t = ready_transport();
    t.on_json(
        HttpMethod::Get,
        &e.resource(DRAFT, ArtifactKind::Condition, "maintenance_page_condition"),
        200,
        json!({"name": "maintenance_page_condition", "version": DRAFT}),
    );
    let object = e.resource(DRAFT, ArtifactKind::ResponseObject, "maintenance_page_response");
    t.on_json(HttpMethod::Get, &object, 200, json!({"name": "maintenance_page_response"}));
    t.on(HttpMethod::Put, &object, 200, "{}");
    let n = RecordingNotifier::new();
    let mut sync = session(&t, &n);

    let report = sync.upload_maintenance_page(PAGE);

    assert!(report.activated());
    assert!(!t.sent(HttpMethod::Post, &e.collection(DRAFT, ArtifactKind::Condition)));
    assert!(t.sent(HttpMethod::Put, &object));
}

#[test]
fn rejected_response_object_stops_the_upload() {
    let e = endpoints();
    let t = ready_transport();
    t.replace(
        HttpMethod::Post,
        &e.collection(DRAFT, ArtifactKind::ResponseObject),
        400,
        "{\"msg\":\"content too large\"}",
    );
    let n = RecordingNotifier::new();
    let mut sync = session(&t, &n);

    let report = sync.upload_maintenance_page(PAGE);

    assert!(report.is_aborted());
    assert!(report.errors[0].contains("content too large"));
    assert!(!t.sent(HttpMethod::Get, &e.validate(DRAFT)));
    assert!(!t.sent(HttpMethod::Put, &e.activate(DRAFT)));
}

#[test]
fn invalid_draft_skips_snippet_and_activation() {
    let e = endpoints();
    let t = ready_transport();
    t.replace(HttpMethod::Get, &e.validate(DRAFT), 200, r#"{"errors": "bad"}"#);
    let n = RecordingNotifier::new();
    let mut sync = session(&t, &n);

    let report = sync.upload_maintenance_page(PAGE);

    assert!(report.is_aborted());
    assert!(!t.sent(HttpMethod::Post, &e.collection(DRAFT, ArtifactKind::VclSnippet)));
    assert!(!t.sent(HttpMethod::Put, &e.activate(DRAFT)));
}

#[test]
fn failed_validation_request_blocks_activation() {
    let e = endpoints();
    let t = ready_transport();
    t.replace(HttpMethod::Get, &e.validate(DRAFT), 500, r#"{"msg":"Internal Server Error"}"#);
    let n = RecordingNotifier::new();
    let mut sync = session(&t, &n);

    let report = sync.upload_maintenance_page(PAGE);

    assert!(report.is_aborted());
    assert!(report.errors[0].contains("validation request returned status 500"));
    assert!(!t.sent(HttpMethod::Post, &e.collection(DRAFT, ArtifactKind::VclSnippet)));
    assert!(!t.sent(HttpMethod::Put, &e.activate(DRAFT)));
    assert_eq!(sync.active_version().map(|v| v.number), Some(7));
}

#[rstest]
#[case::deliver_snippet(HttpMethod::Post, "snippet", 400, "duplicate snippet")]
#[case::activation(HttpMethod::Put, "activate", 409, "version locked")]
fn late_rejection_leaves_active_version_alone(
    #[case] method: HttpMethod,
    #[case] step: &str,
    #[case] status: u16,
    #[case] reason: &str,
) {
    let e = endpoints();
    let t = ready_transport();
    let url = match step {
        "snippet" => e.collection(DRAFT, ArtifactKind::VclSnippet),
        _ => e.activate(DRAFT),
    };
    t.replace(method, &url, status, &json!({ "msg": reason }).to_string());
    let n = RecordingNotifier::new();
    let mut sync = session(&t, &n);

    let report = sync.upload_maintenance_page(PAGE);

    assert!(report.is_aborted());
    assert!(report.errors[0].contains(reason));
    assert!(t.sent(method, &url));
    assert_eq!(sync.active_version().map(|v| v.number), Some(7));
    if step == "snippet" {
        assert!(!t.sent(HttpMethod::Put, &e.activate(DRAFT)));
    }
    assert!(n.sent()[0].0.starts_with("Maintenance page update failed"));
}

#[test]
fn blank_page_is_rejected_before_cloning() {
    let e = endpoints();
    let t = ready_transport();
    let n = RecordingNotifier::new();
    let mut sync = session(&t, &n);

    let report = sync.upload_maintenance_page("  \n");

    assert!(report.is_aborted());
    assert!(!t.sent(HttpMethod::Put, &e.clone_version(7)));
}
