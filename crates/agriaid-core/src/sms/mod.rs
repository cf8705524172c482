//! Outbound SMS gateway port.

use std::future::Future;
use std::pin::Pin;

use agriaid_types::error::GatewayError;
use agriaid_types::sms::SmsReport;

/// Sends text messages to phone numbers.
pub trait SmsGateway: Send + Sync {
    /// Send `message` to every number in `recipients`.
    fn send(
        &self,
        recipients: &[String],
        message: &str,
    ) -> impl Future<Output = Result<SmsReport, GatewayError>> + Send;
}

/// Object-safe version of [`SmsGateway`].
pub trait SmsGatewayDyn: Send + Sync {
    fn send_boxed<'a>(
        &'a self,
        recipients: &'a [String],
        message: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<SmsReport, GatewayError>> + Send + 'a>>;
}

impl<T: SmsGateway> SmsGatewayDyn for T {
    fn send_boxed<'a>(
        &'a self,
        recipients: &'a [String],
        message: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<SmsReport, GatewayError>> + Send + 'a>> {
        Box::pin(self.send(recipients, message))
    }
}

/// Type-erased gateway, shared by the webhook and the `send_message` tool.
pub struct BoxSmsGateway {
    inner: Box<dyn SmsGatewayDyn>,
}

impl BoxSmsGateway {
    pub fn new<T: SmsGateway + 'static>(gateway: T) -> Self {
        Self {
            inner: Box::new(gateway),
        }
    }
}

impl SmsGateway for BoxSmsGateway {
    async fn send(&self, recipients: &[String], message: &str) -> Result<SmsReport, GatewayError> {
        self.inner.send_boxed(recipients, message).await
    }
}
