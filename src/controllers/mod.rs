pub mod bookings;
pub mod customers;
pub mod dashboard;
pub mod shows;
pub mod venues;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(dashboard::routes())
        .merge(customers::routes())
        .merge(venues::routes())
        .merge(shows::routes())
        .merge(bookings::routes())
}

// Optional form fields arrive as empty strings; store them as NULL.
pub(crate) fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn normalize_drops_blank_values() {
        assert_eq!(normalize(None), None);
        assert_eq!(normalize(Some("".into())), None);
        assert_eq!(normalize(Some("   ".into())), None);
        assert_eq!(
            normalize(Some("  a@b.com ".into())),
            Some("a@b.com".to_string())
        );
    }
}
