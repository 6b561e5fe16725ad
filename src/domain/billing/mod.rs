//! Billing domain - plans, gateway signing, payments and subscriptions.

mod callback;
mod errors;
pub mod gateway;
mod payment;
mod plan;
pub mod secure_hash;
mod subscription;
mod txn_ref;

pub use callback::{normalize_callback_body, CallbackFields};
pub use errors::PaymentError;
pub use gateway::{CheckoutRequestBuilder, GatewayFields, MerchantCredentials};
pub use payment::{GatewayResponse, OutcomeApplied, PaymentRecord, PaymentStatus};
pub use plan::{Plan, SUBSCRIPTION_DAYS};
pub use subscription::{SubscriptionState, SubscriptionStatus};
pub use txn_ref::TxnRef;
