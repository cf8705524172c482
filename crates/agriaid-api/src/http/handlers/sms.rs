//! Africa's Talking inbound SMS callback.
//!
//! The gateway posts a form-encoded body (`from`, `text`, ...). The message is
//! processed in a background task and the reply is sent back through the
//! gateway, so the callback is acknowledged immediately. Payloads that cannot
//! be decoded are logged and acknowledged without processing.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use serde_json::{Value, json};
use tracing::Instrument;

use agriaid_core::sms::SmsGateway;
use agriaid_types::sms::InboundSms;

use crate::state::AppState;

/// POST /receive-sms
pub async fn receive_sms(
    State(state): State<AppState>,
    form: Result<Form<InboundSms>, FormRejection>,
) -> (StatusCode, Json<Value>) {
    let sms = match form {
        Ok(Form(sms)) => sms,
        Err(FormRejection::InvalidFormContentType(_)) => {
            tracing::warn!(error = "Unsupported content type", "sms callback ignored");
            return received();
        }
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "malformed sms callback ignored");
            return received();
        }
    };

    tracing::info!(
        from = %sms.from,
        link_id = ?sms.link_id,
        text_len = sms.text.len(),
        "sms received"
    );

    let router = Arc::clone(&state.router);
    let gateway = state.gateway.clone();
    let config = Arc::clone(&state.session);
    let span = tracing::info_span!("sms.webhook", from = %sms.from);
    tokio::spawn(
        async move {
            let reply = router.process(&sms.from, &sms.text, &config).await;
            let Some(gateway) = gateway else {
                tracing::warn!(reply_len = reply.len(), "no SMS gateway configured; reply not sent");
                return;
            };
            match gateway.send(&[sms.from.clone()], &reply).await {
                Ok(report) => tracing::info!(summary = %report.message, "reply sent"),
                Err(e) => tracing::error!(error = %e, "failed to send reply"),
            }
        }
        .instrument(span),
    );

    received()
}

/// The gateway retries non-2xx callbacks, so every delivery is acknowledged,
/// including ones that are dropped.
fn received() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({"status": "received"})))
}
