use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use service::auth::service::{AuthService, AuthConfig};
use service::auth::repository::mock::MockAuthRepository;
use service::auth::domain::{LoginInput, SignUpInput, VerifyInput};
use service::auth::token::issue_verification_token;
use service::mail::mock::RecordingMailer;

fn bench_login(c: &mut Criterion) {
    let repo = Arc::new(MockAuthRepository::default());
    let svc = AuthService::new(repo, Arc::new(RecordingMailer::default()), AuthConfig::new("secret"));

    // create and verify the account outside of the measured loop
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(svc.sign_up(SignUpInput {
        email: "bench@example.com".into(),
        username: "bencher".into(),
        phone_number: "+5215500000000".into(),
        password: "Benchmark-ride1".into(),
        password_confirmation: "Benchmark-ride1".into(),
        first_name: "Bench".into(),
        last_name: "Mark".into(),
    }))
    .unwrap();
    let token = issue_verification_token("bencher", "secret", chrono::Duration::days(1)).unwrap();
    rt.block_on(svc.verify_account(VerifyInput { token })).unwrap();

    c.bench_function("auth_login_verify", |b| {
        b.iter(|| {
            let _ = rt
                .block_on(svc.login(LoginInput { email: "bench@example.com".into(), password: "Benchmark-ride1".into() }))
                .unwrap();
        });
    });
}

criterion_group!(benches, bench_login);
criterion_main!(benches);
