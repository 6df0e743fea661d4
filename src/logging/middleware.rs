//! Request ID generation

use uuid::Uuid;

/// Generate a new request ID using UUID v4
///
/// Every query carries one through its dispatch span, so the
/// classification, gateway call and outcome log lines correlate.
///
/// # Examples
///
/// ```
/// use querygate::logging::generate_request_id;
///
/// let request_id = generate_request_id();
/// assert!(!request_id.is_empty());
/// ```
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}
