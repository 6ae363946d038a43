use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use service::auth::service::{AuthService, AuthConfig};
use service::auth::repository::mock::MockAuthRepository;
use service::auth::domain::{RegisterInput, LoginInput};
use service::auth::token::TokenSettings;

fn bench_login(c: &mut Criterion) {
    let repo = Arc::new(MockAuthRepository::default());
    let settings = TokenSettings { key: "bench-signing-key-0123456789abcdef".into(), issuer: "bench".into(), audience: "bench".into(), expiry_minutes: 60 };
    let svc = AuthService::new(repo, AuthConfig::new(settings));

    // pre-create user outside of the benchmark using a tokio runtime
    let rt = tokio::runtime::Runtime::new().unwrap();
    let _ = rt.block_on(svc.register(RegisterInput { email: "bench@example.com".into(), name: "Bench".into(), password: "Benchmark1!".into() }));

    c.bench_function("auth_login_verify", |b| {
        b.iter(|| {
            let _ = rt.block_on(svc.login(LoginInput { email: "bench@example.com".into(), password: "Benchmark1!".into() })).unwrap();
        });
    });
}

criterion_group!(benches, bench_login);
criterion_main!(benches);
