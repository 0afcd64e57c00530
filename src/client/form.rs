use crate::client::transport::SubmitTransport;
use crate::models::{FieldSet, SchemaError, SubmissionPayload};
use crate::services::analytics::{emit, AnalyticsSink};
use http::StatusCode;
use serde_json::{json, Map};
use std::sync::Arc;
use tracing::error;

/// Page visibility state. Exactly one holds at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiState {
    /// Call-to-action button visible, form hidden.
    Idle,
    /// Form shown, button hidden.
    FormVisible,
    /// Thank-you message shown.
    Submitted,
}

/// One deployment variant of the signup flow. Both known variants are
/// configurations of the same controller, not separate code paths.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub field_set: FieldSet,
    /// Emit "CTA Clicked" on reveal.
    pub cta_event: bool,
    /// Advance to the thank-you view after submit, whatever the outcome.
    pub advance_to_submitted: bool,
    pub endpoint: String,
}

impl FlowConfig {
    /// The lead-capture variant: company field, CTA tracking, thank-you view.
    pub fn full(endpoint: impl Into<String>) -> Self {
        FlowConfig {
            field_set: FieldSet::Company,
            cta_event: true,
            advance_to_submitted: true,
            endpoint: endpoint.into(),
        }
    }

    /// The account-signup variant: password field, no CTA tracking, the form
    /// stays open after submit.
    pub fn minimal(endpoint: impl Into<String>) -> Self {
        FlowConfig {
            field_set: FieldSet::Password,
            cta_event: false,
            advance_to_submitted: false,
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The handler accepted the submission.
    Delivered,
    /// The handler responded with a non-success status.
    Rejected(StatusCode),
    /// No response at all.
    Unreachable,
}

/// Client-side controller owning UI visibility and form field values. The
/// analytics sink and transport are injected so the whole flow is testable
/// against fakes.
pub struct FormController {
    config: FlowConfig,
    ui: UiState,
    payload: SubmissionPayload,
    page_loaded: bool,
    analytics: Arc<dyn AnalyticsSink>,
    transport: Arc<dyn SubmitTransport>,
}

impl FormController {
    pub fn new(
        config: FlowConfig,
        analytics: Arc<dyn AnalyticsSink>,
        transport: Arc<dyn SubmitTransport>,
    ) -> Self {
        let payload = SubmissionPayload::empty(config.field_set);
        FormController {
            config,
            ui: UiState::Idle,
            payload,
            page_loaded: false,
            analytics,
            transport,
        }
    }

    pub fn ui_state(&self) -> UiState {
        self.ui
    }

    pub fn payload(&self) -> &SubmissionPayload {
        &self.payload
    }

    /// Runs the page-load side effect. Guarded so re-renders cannot fire
    /// "Page Loaded" twice within one controller lifetime.
    pub async fn page_load(&mut self) {
        if self.page_loaded {
            return;
        }
        self.page_loaded = true;
        emit(self.analytics.as_ref(), "Page Loaded", None).await;
    }

    /// Call-to-action: reveals the form. No-op outside `Idle`.
    pub async fn click_cta(&mut self) {
        if self.ui != UiState::Idle {
            return;
        }
        self.ui = UiState::FormVisible;
        if self.config.cta_event {
            emit(self.analytics.as_ref(), "CTA Clicked", None).await;
        }
    }

    /// Mutates exactly the named field, leaving all others untouched.
    pub fn edit_field(&mut self, field: &str, value: &str) -> Result<(), SchemaError> {
        self.payload.set_field(field, value)
    }

    /// The submission pipeline. Returns `None` when the form is not visible.
    ///
    /// "Form Submitted" fires before the network call: it records intent, not
    /// outcome. Any non-success outcome, transport failures included, emits
    /// exactly one "Form Submitted Failure".
    pub async fn submit(&mut self) -> Option<SubmitOutcome> {
        if self.ui != UiState::FormVisible {
            return None;
        }

        emit(
            self.analytics.as_ref(),
            "Form Submitted",
            Some(self.payload.analytics_properties()),
        )
        .await;

        let outcome = match self
            .transport
            .post_json(&self.config.endpoint, &self.payload.to_json())
            .await
        {
            Ok(status) if status.is_success() => {
                emit(self.analytics.as_ref(), "Form Submitted Success", None).await;
                self.payload.clear();
                SubmitOutcome::Delivered
            }
            Ok(status) => {
                let mut properties = Map::new();
                properties.insert("status".into(), json!(status.as_u16()));
                emit(
                    self.analytics.as_ref(),
                    "Form Submitted Failure",
                    Some(properties),
                )
                .await;
                SubmitOutcome::Rejected(status)
            }
            Err(err) => {
                error!(%err, "signup submission could not reach the server");
                emit(self.analytics.as_ref(), "Form Submitted Failure", None).await;
                SubmitOutcome::Unreachable
            }
        };

        if self.config.advance_to_submitted {
            // Failure is not visibly distinguished from success here; the
            // thank-you view is shown either way.
            self.ui = UiState::Submitted;
        }

        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockTransport;
    use crate::services::analytics::MockSink;
    use serde_json::json;

    fn controller(
        config: FlowConfig,
        transport: MockTransport,
    ) -> (FormController, Arc<MockSink>, Arc<MockTransport>) {
        let sink = Arc::new(MockSink::default());
        let transport = Arc::new(transport);
        let controller = FormController::new(config, sink.clone(), transport.clone());
        (controller, sink, transport)
    }

    #[tokio::test]
    async fn page_load_emits_exactly_once() {
        let (mut form, sink, _) =
            controller(FlowConfig::full("/api/signup"), MockTransport::default());

        form.page_load().await;
        form.page_load().await;
        form.page_load().await;

        assert_eq!(sink.events_named("Page Loaded").len(), 1);
    }

    #[tokio::test]
    async fn cta_reveals_form_and_tracks_in_full_variant() {
        let (mut form, sink, _) =
            controller(FlowConfig::full("/api/signup"), MockTransport::default());

        assert_eq!(form.ui_state(), UiState::Idle);
        form.click_cta().await;
        assert_eq!(form.ui_state(), UiState::FormVisible);
        assert_eq!(sink.events_named("CTA Clicked").len(), 1);

        // repeat click is a no-op
        form.click_cta().await;
        assert_eq!(sink.events_named("CTA Clicked").len(), 1);
    }

    #[tokio::test]
    async fn minimal_variant_reveals_without_cta_event() {
        let (mut form, sink, _) =
            controller(FlowConfig::minimal("/api/signup"), MockTransport::default());

        form.click_cta().await;
        assert_eq!(form.ui_state(), UiState::FormVisible);
        assert!(sink.events_named("CTA Clicked").is_empty());
    }

    #[tokio::test]
    async fn field_edits_touch_only_the_named_field() {
        let (mut form, _, _) =
            controller(FlowConfig::full("/api/signup"), MockTransport::default());
        form.click_cta().await;

        form.edit_field("name", "Ana").unwrap();
        form.edit_field("email", "ana@x.com").unwrap();
        form.edit_field("email", "ana@acme.com").unwrap();

        assert_eq!(form.payload().get("name"), Some("Ana"));
        assert_eq!(form.payload().get("email"), Some("ana@acme.com"));
        assert_eq!(form.payload().get("company"), Some(""));
    }

    #[tokio::test]
    async fn successful_submit_emits_intent_and_success_then_clears() {
        let (mut form, sink, transport) =
            controller(FlowConfig::full("/api/signup"), MockTransport::default());
        form.click_cta().await;
        form.edit_field("name", "Ana").unwrap();
        form.edit_field("email", "ana@x.com").unwrap();
        form.edit_field("company", "Acme").unwrap();

        let outcome = form.submit().await;
        assert_eq!(outcome, Some(SubmitOutcome::Delivered));

        let submitted = sink.events_named("Form Submitted");
        assert_eq!(submitted.len(), 1);
        let properties = submitted[0].properties.as_ref().unwrap();
        assert_eq!(properties.get("name"), Some(&json!("Ana")));
        assert_eq!(properties.get("email"), Some(&json!("ana@x.com")));
        assert_eq!(properties.get("company"), Some(&json!("Acme")));

        assert_eq!(sink.events_named("Form Submitted Success").len(), 1);
        assert!(sink.events_named("Form Submitted Failure").is_empty());
        assert!(form.payload().is_empty());
        assert_eq!(form.ui_state(), UiState::Submitted);

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "/api/signup");
        assert_eq!(
            requests[0].1,
            json!({"name": "Ana", "email": "ana@x.com", "company": "Acme"})
        );
    }

    #[tokio::test]
    async fn rejected_submit_emits_failure_but_still_thanks_the_user() {
        let (mut form, sink, _) = controller(
            FlowConfig::full("/api/signup"),
            MockTransport::responding(StatusCode::INTERNAL_SERVER_ERROR),
        );
        form.click_cta().await;
        form.edit_field("email", "ana@x.com").unwrap();

        let outcome = form.submit().await;
        assert_eq!(
            outcome,
            Some(SubmitOutcome::Rejected(StatusCode::INTERNAL_SERVER_ERROR))
        );
        assert_eq!(sink.events_named("Form Submitted").len(), 1);
        assert_eq!(sink.events_named("Form Submitted Failure").len(), 1);
        assert!(sink.events_named("Form Submitted Success").is_empty());

        // full variant: failure is not visibly distinguished
        assert_eq!(form.ui_state(), UiState::Submitted);
        assert_eq!(form.payload().get("email"), Some("ana@x.com"));
    }

    #[tokio::test]
    async fn unreachable_transport_also_emits_one_failure_event() {
        let (mut form, sink, _) =
            controller(FlowConfig::full("/api/signup"), MockTransport::unreachable());
        form.click_cta().await;

        let outcome = form.submit().await;
        assert_eq!(outcome, Some(SubmitOutcome::Unreachable));
        assert_eq!(sink.events_named("Form Submitted").len(), 1);
        assert_eq!(sink.events_named("Form Submitted Failure").len(), 1);
        assert_eq!(form.ui_state(), UiState::Submitted);
    }

    #[tokio::test]
    async fn minimal_variant_keeps_form_open_cleared_on_success() {
        let (mut form, _, _) =
            controller(FlowConfig::minimal("/api/signup"), MockTransport::default());
        form.click_cta().await;
        form.edit_field("password", "hunter2").unwrap();

        form.submit().await;
        assert_eq!(form.ui_state(), UiState::FormVisible);
        assert!(form.payload().is_empty());
    }

    #[tokio::test]
    async fn minimal_variant_keeps_form_populated_on_failure() {
        let (mut form, _, _) = controller(
            FlowConfig::minimal("/api/signup"),
            MockTransport::responding(StatusCode::BAD_GATEWAY),
        );
        form.click_cta().await;
        form.edit_field("email", "ana@x.com").unwrap();

        form.submit().await;
        assert_eq!(form.ui_state(), UiState::FormVisible);
        assert_eq!(form.payload().get("email"), Some("ana@x.com"));
    }

    #[tokio::test]
    async fn secrets_never_reach_the_intent_event() {
        let (mut form, sink, transport) =
            controller(FlowConfig::minimal("/api/signup"), MockTransport::default());
        form.click_cta().await;
        form.edit_field("email", "ana@x.com").unwrap();
        form.edit_field("password", "hunter2").unwrap();

        form.submit().await;

        let submitted = sink.events_named("Form Submitted");
        let properties = submitted[0].properties.as_ref().unwrap();
        assert!(!properties.contains_key("password"));

        // the wire body still carries the full field set
        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0].1.get("password"), Some(&json!("hunter2")));
    }

    #[tokio::test]
    async fn submit_is_ignored_while_form_is_hidden() {
        let (mut form, sink, transport) =
            controller(FlowConfig::full("/api/signup"), MockTransport::default());

        assert_eq!(form.submit().await, None);
        assert!(sink.recorded.lock().unwrap().is_empty());
        assert!(transport.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failing_sink_never_blocks_the_submission() {
        let sink = Arc::new(MockSink {
            fail_track: true,
            ..Default::default()
        });
        let transport = Arc::new(MockTransport::default());
        let mut form = FormController::new(
            FlowConfig::full("/api/signup"),
            sink.clone(),
            transport.clone(),
        );

        form.click_cta().await;
        form.edit_field("email", "ana@x.com").unwrap();
        let outcome = form.submit().await;

        assert_eq!(outcome, Some(SubmitOutcome::Delivered));
        assert_eq!(transport.requests.lock().unwrap().len(), 1);
    }
}
