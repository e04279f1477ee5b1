use tracing::{error, info};

use crate::adapters::callback::CallbackSender;
use crate::error::CallbackTransportError;
use crate::runtime::contract::{callback_body, Correlation, LifecycleOutcome};

/// Delivers the outcome to the orchestrator. Delivery failures are logged and
/// swallowed; returns whether the callback was accepted.
pub fn send(
    sender: &dyn CallbackSender,
    callback_url: &str,
    outcome: &LifecycleOutcome,
    correlation: &Correlation,
    log_stream_name: &str,
) -> bool {
    match deliver(sender, callback_url, outcome, correlation, log_stream_name) {
        Ok(status_code) => {
            info!(
                component = "callback_reporter",
                event = "callback_delivered",
                status_code
            );
            true
        }
        Err(transport_error) => {
            error!(
                component = "callback_reporter",
                event = "callback_failed",
                error = %transport_error,
            );
            false
        }
    }
}

fn deliver(
    sender: &dyn CallbackSender,
    callback_url: &str,
    outcome: &LifecycleOutcome,
    correlation: &Correlation,
    log_stream_name: &str,
) -> Result<u16, CallbackTransportError> {
    let body = serde_json::to_vec(&callback_body(outcome, correlation, log_stream_name))?;
    info!(
        component = "callback_reporter",
        event = "callback_body",
        body = %String::from_utf8_lossy(&body),
    );
    sender
        .put(callback_url, &body)
        .map_err(CallbackTransportError::Delivery)
}
