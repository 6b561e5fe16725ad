//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod billing;

pub use billing::{
    CallbackOutcome, CheckoutSession, GetPaymentStatusHandler, GetPaymentStatusQuery,
    GetSubscriptionHandler, GetSubscriptionQuery, HandleGatewayCallbackCommand,
    HandleGatewayCallbackHandler, InitiateCheckoutCommand, InitiateCheckoutHandler,
    ListPaymentsHandler, ListPaymentsQuery, SubscriptionView,
};
