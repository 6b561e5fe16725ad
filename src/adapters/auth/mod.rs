//! Authentication adapters.
//!
//! Implementations of the `SessionValidator` port:
//!
//! - `supabase` - HS256 access tokens issued by the managed auth provider
//! - `mock` - Test implementation that doesn't require external services

mod mock;
mod supabase;

pub use mock::MockSessionValidator;
pub use supabase::SupabaseSessionValidator;
