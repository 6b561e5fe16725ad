//! Hosted payment page field contract.
//!
//! Field names, fixed values and formats here are dictated by the gateway
//! and must stay bit-exact.

use chrono::FixedOffset;
use std::collections::BTreeMap;

use crate::domain::foundation::{Timestamp, UserId};

use super::plan::Plan;
use super::secure_hash;
use super::txn_ref::TxnRef;

/// Flat field bag exchanged with the gateway, ordered by key.
pub type GatewayFields = BTreeMap<String, String>;

/// Identifier stored on payment records handled by this gateway.
pub const GATEWAY_NAME: &str = "jazzcash";

/// Response code the gateway uses for an approved transaction.
pub const APPROVED_RESPONSE_CODE: &str = "000";

/// Timestamp layout used by every gateway datetime field.
pub const DATETIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Pakistan Standard Time, the zone the gateway interprets datetimes in.
pub const PKT_OFFSET_SECS: i32 = 5 * 3600;

pub const VERSION: &str = "pp_Version";
pub const TXN_TYPE: &str = "pp_TxnType";
pub const LANGUAGE: &str = "pp_Language";
pub const MERCHANT_ID: &str = "pp_MerchantID";
pub const SUB_MERCHANT_ID: &str = "pp_SubMerchantID";
pub const PASSWORD: &str = "pp_Password";
pub const BANK_ID: &str = "pp_BankID";
pub const PRODUCT_ID: &str = "pp_ProductID";
pub const TXN_REF_NO: &str = "pp_TxnRefNo";
pub const AMOUNT: &str = "pp_Amount";
pub const TXN_CURRENCY: &str = "pp_TxnCurrency";
pub const TXN_DATE_TIME: &str = "pp_TxnDateTime";
pub const BILL_REFERENCE: &str = "pp_BillReference";
pub const DESCRIPTION: &str = "pp_Description";
pub const TXN_EXPIRY_DATE_TIME: &str = "pp_TxnExpiryDateTime";
pub const RETURN_URL: &str = "pp_ReturnURL";
pub const SECURE_HASH: &str = "pp_SecureHash";
pub const RESPONSE_CODE: &str = "pp_ResponseCode";
pub const RESPONSE_MESSAGE: &str = "pp_ResponseMessage";
/// Spelled as the gateway spells it.
pub const RETRIEVAL_REFERENCE_NO: &str = "pp_RetreivalReferenceNo";

/// Passthrough slot carrying the purchasing user's id.
pub const PASSTHROUGH_USER_ID: &str = "ppmpf_1";
/// Passthrough slot carrying the purchased plan id.
pub const PASSTHROUGH_PLAN_ID: &str = "ppmpf_2";
pub const PASSTHROUGH_3: &str = "ppmpf_3";
pub const PASSTHROUGH_4: &str = "ppmpf_4";
pub const PASSTHROUGH_5: &str = "ppmpf_5";

const API_VERSION: &str = "1.1";
const LANGUAGE_EN: &str = "EN";
const BANK_ID_VALUE: &str = "TBANK";
const PRODUCT_ID_VALUE: &str = "RETL";
const CURRENCY_PKR: &str = "PKR";
const BILL_REFERENCE_VALUE: &str = "billRef";

/// Returns the gateway's timezone.
pub fn pkt_offset() -> FixedOffset {
    FixedOffset::east_opt(PKT_OFFSET_SECS).expect("UTC+5 is a valid offset")
}

/// Renders an instant the way gateway datetime fields expect it.
pub fn format_gateway_datetime(ts: &Timestamp) -> String {
    ts.format_in(pkt_offset(), DATETIME_FORMAT)
}

/// Merchant-side values needed to build a request.
#[derive(Debug, Clone)]
pub struct MerchantCredentials {
    pub merchant_id: String,
    pub password: String,
    pub integrity_salt: String,
    pub return_url: String,
}

/// Builder for the signed outbound field set of a hosted checkout.
#[derive(Debug, Clone)]
pub struct CheckoutRequestBuilder<'a> {
    credentials: &'a MerchantCredentials,
    txn_ref: &'a TxnRef,
    plan: Plan,
    user_id: &'a UserId,
    created_at: Timestamp,
    expires_at: Timestamp,
}

impl<'a> CheckoutRequestBuilder<'a> {
    pub fn new(
        credentials: &'a MerchantCredentials,
        txn_ref: &'a TxnRef,
        plan: Plan,
        user_id: &'a UserId,
        created_at: Timestamp,
        expires_at: Timestamp,
    ) -> Self {
        Self {
            credentials,
            txn_ref,
            plan,
            user_id,
            created_at,
            expires_at,
        }
    }

    /// Assembles every field the gateway expects, without the hash.
    pub fn unsigned_fields(&self) -> GatewayFields {
        let c = self.credentials;
        [
            (VERSION, API_VERSION.to_string()),
            // Left blank so the hosted page offers every payment method.
            (TXN_TYPE, String::new()),
            (LANGUAGE, LANGUAGE_EN.to_string()),
            (MERCHANT_ID, c.merchant_id.clone()),
            (SUB_MERCHANT_ID, String::new()),
            (PASSWORD, c.password.clone()),
            (BANK_ID, BANK_ID_VALUE.to_string()),
            (PRODUCT_ID, PRODUCT_ID_VALUE.to_string()),
            (TXN_REF_NO, self.txn_ref.to_string()),
            (AMOUNT, self.plan.amount_minor_units().to_string()),
            (TXN_CURRENCY, CURRENCY_PKR.to_string()),
            (TXN_DATE_TIME, format_gateway_datetime(&self.created_at)),
            (BILL_REFERENCE, BILL_REFERENCE_VALUE.to_string()),
            (DESCRIPTION, self.plan.description().to_string()),
            (TXN_EXPIRY_DATE_TIME, format_gateway_datetime(&self.expires_at)),
            (RETURN_URL, c.return_url.clone()),
            (PASSTHROUGH_USER_ID, self.user_id.to_string()),
            (PASSTHROUGH_PLAN_ID, self.plan.id().to_string()),
            (PASSTHROUGH_3, String::new()),
            (PASSTHROUGH_4, String::new()),
            (PASSTHROUGH_5, String::new()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    /// Assembles the fields and appends `pp_SecureHash`.
    pub fn build(&self) -> GatewayFields {
        let mut fields = self.unsigned_fields();
        let hash = secure_hash::sign(&fields, &self.credentials.integrity_salt);
        fields.insert(SECURE_HASH.to_string(), hash);
        fields
    }
}
