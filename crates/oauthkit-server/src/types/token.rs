//! Token information produced by the token manager.

use std::time::Duration;

/// Read-only view of an issued token or authorization code.
///
/// Implemented by the token manager's own token model. The engine never
/// mutates or persists token state; it only reads these accessors to build
/// responses.
pub trait TokenInfo: Send + Sync {
    /// Client the token was issued to.
    fn client_id(&self) -> &str;

    /// Resource owner the token was issued for (empty for client grants).
    fn user_id(&self) -> &str;

    /// Granted scope, space separated.
    fn scope(&self) -> &str;

    /// Authorization code (authorization code flow only).
    fn code(&self) -> &str;

    /// Access token value.
    fn access(&self) -> &str;

    /// Remaining lifetime of the access token.
    fn access_expires_in(&self) -> Duration;

    /// Refresh token value, empty when none was issued.
    fn refresh(&self) -> &str;
}
