//! SMS payload types.
//!
//! `InboundSms` is the form body the gateway posts to the webhook.
//! `SmsReport` is the gateway's answer to an outbound send.

use serde::{Deserialize, Serialize};

/// Form-encoded callback body. Only `from` and `text` are used; the gateway
/// also sends `to`, `date`, `id` and `linkId`, which are kept for logging.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundSms {
    pub from: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, rename = "linkId")]
    pub link_id: Option<String>,
}

/// Delivery status for one recipient of an outbound send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipientStatus {
    pub number: String,
    pub status: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(default)]
    pub cost: String,
    #[serde(default, rename = "messageId")]
    pub message_id: String,
}

impl RecipientStatus {
    /// Gateway codes 100-102 mean the message was accepted.
    pub fn accepted(&self) -> bool {
        (100..=102).contains(&self.status_code)
    }
}

/// Summary returned by the gateway for one outbound send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsReport {
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Recipients", default)]
    pub recipients: Vec<RecipientStatus>,
}

/// Envelope the gateway wraps around [`SmsReport`].
#[derive(Debug, Clone, Deserialize)]
pub struct SmsReportEnvelope {
    #[serde(rename = "SMSMessageData")]
    pub data: SmsReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_envelope_parses_gateway_json() {
        let body = r#"{
            "SMSMessageData": {
                "Message": "Sent to 1/1 Total Cost: KES 0.8000",
                "Recipients": [{
                    "statusCode": 101,
                    "number": "+254711000111",
                    "status": "Success",
                    "cost": "KES 0.8000",
                    "messageId": "ATPid_1"
                }]
            }
        }"#;
        let env: SmsReportEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(env.data.recipients.len(), 1);
        assert!(env.data.recipients[0].accepted());
        assert_eq!(env.data.recipients[0].message_id, "ATPid_1");
    }

    #[test]
    fn test_rejected_recipient_not_accepted() {
        let status = RecipientStatus {
            number: "+254711000111".into(),
            status: "InvalidPhoneNumber".into(),
            status_code: 403,
            cost: String::new(),
            message_id: String::new(),
        };
        assert!(!status.accepted());
    }
}
