use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

use service::auth::errors::AuthError;

// Prometheus metrics (default registry)
pub static SIGNUPS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!("cride_signups_total", "Sign-up attempts by outcome", &["outcome"])
        .expect("register signups_total")
});

pub static LOGINS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!("cride_logins_total", "Login attempts by outcome", &["outcome"])
        .expect("register logins_total")
});

pub static VERIFICATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!("cride_verifications_total", "Account verification attempts by outcome", &["outcome"])
        .expect("register verifications_total")
});

/// Label for a failed attempt.
pub fn failure_outcome(e: &AuthError) -> &'static str {
    match e {
        AuthError::InvalidCredentials => "invalid_credentials",
        AuthError::AccountNotActive => "inactive",
        AuthError::InvalidToken(_) => "invalid_token",
        e if e.is_client_error() => "rejected",
        _ => "error",
    }
}

pub fn record<T>(counter: &IntCounterVec, success: &str, result: &Result<T, AuthError>) {
    let outcome = match result {
        Ok(_) => success,
        Err(e) => failure_outcome(e),
    };
    counter.with_label_values(&[outcome]).inc();
}

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes() {
        assert_eq!(failure_outcome(&AuthError::InvalidCredentials), "invalid_credentials");
        assert_eq!(failure_outcome(&AuthError::PasswordMismatch), "rejected");
        assert_eq!(failure_outcome(&AuthError::Repository("x".into())), "error");
    }

    #[test]
    fn recorded_attempts_are_exported() {
        record::<()>(&LOGINS_TOTAL, "succeeded", &Err(AuthError::AccountNotActive));
        let (status, body) = encode_metrics();
        assert_eq!(status, axum::http::StatusCode::OK);
        assert!(body.contains("cride_logins_total{outcome=\"inactive\"}"));
    }
}
