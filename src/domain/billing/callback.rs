//! Inbound callback parsing.
//!
//! The gateway posts its result as a form, but proxies and test tooling have
//! been seen to deliver the same fields as raw text or JSON. Every shape is
//! reduced to the same flat [`GatewayFields`] before verification.

use serde_json::Value;

use super::errors::PaymentError;
use super::gateway::{
    GatewayFields, AMOUNT, PASSTHROUGH_PLAN_ID, PASSTHROUGH_USER_ID, RESPONSE_CODE,
    RESPONSE_MESSAGE, RETRIEVAL_REFERENCE_NO, TXN_REF_NO,
};
use super::payment::GatewayResponse;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Reduces a callback body to a flat field bag.
///
/// Form bodies are decoded as-is. JSON bodies must be a single object whose
/// values are scalars: strings are kept, numbers and booleans are rendered
/// as text, nulls are dropped. Anything else, including a missing content
/// type, is treated as raw text and sniffed.
pub fn normalize_callback_body(
    content_type: Option<&str>,
    body: &[u8],
) -> Result<GatewayFields, PaymentError> {
    let media_type = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());

    match media_type.as_deref() {
        Some(FORM_CONTENT_TYPE) => parse_form(body),
        Some(ct) if ct == JSON_CONTENT_TYPE || ct.ends_with("+json") => parse_json(body),
        _ => parse_text(body),
    }
}

fn parse_text(body: &[u8]) -> Result<GatewayFields, PaymentError> {
    let text = std::str::from_utf8(body)
        .map_err(|_| PaymentError::MalformedCallback("body is not valid UTF-8".into()))?;
    if text.trim_start().starts_with('{') {
        parse_json(text.as_bytes())
    } else {
        parse_form(text.as_bytes())
    }
}

fn parse_form(body: &[u8]) -> Result<GatewayFields, PaymentError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
        .map_err(|e| PaymentError::MalformedCallback(format!("invalid form body: {}", e)))?;
    Ok(pairs.into_iter().collect())
}

fn parse_json(body: &[u8]) -> Result<GatewayFields, PaymentError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| PaymentError::MalformedCallback(format!("invalid JSON body: {}", e)))?;
    let Value::Object(map) = value else {
        return Err(PaymentError::MalformedCallback(
            "JSON body must be an object".into(),
        ));
    };

    let mut fields = GatewayFields::new();
    for (key, value) in map {
        let text = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => continue,
            Value::Array(_) | Value::Object(_) => {
                return Err(PaymentError::MalformedCallback(format!(
                    "field '{}' is not a scalar",
                    key
                )))
            }
        };
        fields.insert(key, text);
    }
    Ok(fields)
}

/// Read-only view over the callback fields this service acts on.
#[derive(Debug, Clone, Copy)]
pub struct CallbackFields<'a> {
    fields: &'a GatewayFields,
}

impl<'a> CallbackFields<'a> {
    pub fn new(fields: &'a GatewayFields) -> Self {
        Self { fields }
    }

    fn get(&self, key: &str) -> Option<&'a str> {
        self.fields
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// The merchant reference; required to locate the payment record.
    pub fn txn_ref(&self) -> Result<&'a str, PaymentError> {
        self.get(TXN_REF_NO)
            .ok_or(PaymentError::MissingField(TXN_REF_NO))
    }

    pub fn response_code(&self) -> Option<&'a str> {
        self.get(RESPONSE_CODE)
    }

    pub fn amount(&self) -> Option<&'a str> {
        self.get(AMOUNT)
    }

    pub fn user_id(&self) -> Option<&'a str> {
        self.get(PASSTHROUGH_USER_ID)
    }

    pub fn plan_id(&self) -> Option<&'a str> {
        self.get(PASSTHROUGH_PLAN_ID)
    }

    /// Response metadata stored on the payment record, exactly as received.
    ///
    /// Unlike the accessors above, values are neither trimmed nor dropped
    /// when blank; only absent fields become `None`.
    pub fn gateway_response(&self) -> GatewayResponse {
        GatewayResponse {
            response_code: self.fields.get(RESPONSE_CODE).cloned(),
            response_message: self.fields.get(RESPONSE_MESSAGE).cloned(),
            retrieval_ref: self.fields.get(RETRIEVAL_REFERENCE_NO).cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ══════════════════════════════════════════════════════════════
    // Body normalization
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn form_body_is_decoded() {
        let fields = normalize_callback_body(
            Some("application/x-www-form-urlencoded"),
            b"pp_TxnRefNo=T123&pp_ResponseMessage=Thank+you%21",
        )
        .unwrap();
        assert_eq!(fields["pp_TxnRefNo"], "T123");
        assert_eq!(fields["pp_ResponseMessage"], "Thank you!");
    }

    #[test]
    fn form_content_type_parameters_are_ignored() {
        let fields = normalize_callback_body(
            Some("application/x-www-form-urlencoded; charset=UTF-8"),
            b"pp_Amount=160000",
        )
        .unwrap();
        assert_eq!(fields["pp_Amount"], "160000");
    }

    #[test]
    fn json_scalars_are_stringified_and_nulls_dropped() {
        let fields = normalize_callback_body(
            Some("application/json"),
            br#"{"pp_Amount":160000,"pp_IsTest":true,"pp_ResponseCode":"000","pp_BankID":null}"#,
        )
        .unwrap();
        assert_eq!(fields["pp_Amount"], "160000");
        assert_eq!(fields["pp_IsTest"], "true");
        assert_eq!(fields["pp_ResponseCode"], "000");
        assert!(!fields.contains_key("pp_BankID"));
    }

    #[test]
    fn json_nested_values_are_rejected() {
        let err = normalize_callback_body(
            Some("application/json"),
            br#"{"pp_Amount":{"value":1}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, PaymentError::MalformedCallback(_)));

        let err =
            normalize_callback_body(Some("application/json"), br#"{"a":[1,2]}"#).unwrap_err();
        assert!(matches!(err, PaymentError::MalformedCallback(_)));
    }

    #[test]
    fn json_non_object_is_rejected() {
        let err = normalize_callback_body(Some("application/json"), b"[1,2]").unwrap_err();
        assert!(matches!(err, PaymentError::MalformedCallback(_)));
    }

    #[test]
    fn raw_text_json_is_sniffed() {
        let fields =
            normalize_callback_body(Some("text/plain"), br#"  {"pp_TxnRefNo":"T9"}"#).unwrap();
        assert_eq!(fields["pp_TxnRefNo"], "T9");
    }

    #[test]
    fn raw_text_form_is_sniffed() {
        let fields = normalize_callback_body(None, b"pp_TxnRefNo=T9&ppmpf_1=u1").unwrap();
        assert_eq!(fields["pp_TxnRefNo"], "T9");
        assert_eq!(fields["ppmpf_1"], "u1");
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = normalize_callback_body(Some("application/json"), b"{oops").unwrap_err();
        assert!(matches!(err, PaymentError::MalformedCallback(_)));
    }

    #[test]
    fn empty_body_yields_no_fields() {
        let fields = normalize_callback_body(None, b"").unwrap();
        assert!(fields.is_empty());
    }

    // ══════════════════════════════════════════════════════════════
    // Field access
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn txn_ref_is_required() {
        let fields = GatewayFields::new();
        let err = CallbackFields::new(&fields).txn_ref().unwrap_err();
        assert!(matches!(err, PaymentError::MissingField("pp_TxnRefNo")));
    }

    #[test]
    fn blank_values_read_as_absent() {
        let mut fields = GatewayFields::new();
        fields.insert(TXN_REF_NO.into(), "  ".into());
        fields.insert(RESPONSE_CODE.into(), " 000 ".into());
        let view = CallbackFields::new(&fields);
        assert!(view.txn_ref().is_err());
        assert_eq!(view.response_code(), Some("000"));
    }

    #[test]
    fn gateway_response_collects_metadata() {
        let mut fields = GatewayFields::new();
        fields.insert(RESPONSE_CODE.into(), "124".into());
        fields.insert(RESPONSE_MESSAGE.into(), "Pending".into());
        fields.insert(RETRIEVAL_REFERENCE_NO.into(), "R1".into());

        let response = CallbackFields::new(&fields).gateway_response();
        assert_eq!(response.response_code.as_deref(), Some("124"));
        assert_eq!(response.response_message.as_deref(), Some("Pending"));
        assert_eq!(response.retrieval_ref.as_deref(), Some("R1"));
    }

    #[test]
    fn gateway_response_keeps_raw_values() {
        let mut fields = GatewayFields::new();
        fields.insert(RESPONSE_CODE.into(), " 000 ".into());
        fields.insert(RESPONSE_MESSAGE.into(), "  Thank you for Using JazzCash ".into());
        fields.insert(RETRIEVAL_REFERENCE_NO.into(), String::new());

        let view = CallbackFields::new(&fields);
        let response = view.gateway_response();
        assert_eq!(response.response_code.as_deref(), Some(" 000 "));
        assert_eq!(
            response.response_message.as_deref(),
            Some("  Thank you for Using JazzCash ")
        );
        assert_eq!(response.retrieval_ref.as_deref(), Some(""));
        assert_eq!(view.response_code(), Some("000"));
    }

    #[test]
    fn gateway_response_leaves_absent_fields_empty() {
        let fields = GatewayFields::new();
        assert_eq!(
            CallbackFields::new(&fields).gateway_response(),
            GatewayResponse::default()
        );
    }
}
