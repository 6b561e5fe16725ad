//! Billing handlers.
//!
//! ## Commands
//! - Initiating a hosted checkout
//! - Settling a payment from the gateway's callback
//!
//! ## Queries
//! - Payment status for the paying user
//! - Payment history
//! - Current subscription

mod get_payment_status;
mod get_subscription;
mod handle_gateway_callback;
mod initiate_checkout;
mod list_payments;

// Commands
pub use handle_gateway_callback::{
    CallbackOutcome, HandleGatewayCallbackCommand, HandleGatewayCallbackHandler,
};
pub use initiate_checkout::{CheckoutSession, InitiateCheckoutCommand, InitiateCheckoutHandler};

// Queries
pub use get_payment_status::{GetPaymentStatusHandler, GetPaymentStatusQuery};
pub use get_subscription::{GetSubscriptionHandler, GetSubscriptionQuery, SubscriptionView};
pub use list_payments::{ListPaymentsHandler, ListPaymentsQuery};
