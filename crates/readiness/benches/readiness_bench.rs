use criterion::{Criterion, criterion_group, criterion_main};
use readiness::{
    Endpoint, HttpGetProber, HttpGetSpec, PollPolicy, Poller, PortSpec, ProbeSpec, Prober,
    TcpSocketProber, TcpSocketSpec, resolve_address,
};
use std::hint::black_box;
use std::time::Duration;

fn resolve_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_address");

    let numeric = PortSpec::numeric(8080);
    group.bench_function("numeric_port", |b| {
        b.iter(|| black_box(resolve_address(black_box("10.0.0.12"), &numeric)))
    });

    let named = PortSpec::named("http");
    group.bench_function("named_port", |b| {
        b.iter(|| black_box(resolve_address(black_box("app.default.svc"), &named)))
    });

    group.bench_function("ipv6_host", |b| {
        b.iter(|| black_box(resolve_address(black_box("fd00::12"), &numeric)))
    });

    group.finish();
}

fn probe_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("probe");

    // Failure paths: nothing listens on port 1
    let tcp = TcpSocketProber::new();
    let tcp_spec = TcpSocketSpec {
        host: "127.0.0.1".to_string(),
        port: PortSpec::numeric(1),
    };
    group.bench_function("tcp_connection_refused", |b| {
        let rt = tokio::runtime::Runtime::new().unwrap();
        b.iter(|| rt.block_on(async { black_box(tcp.check_probe(Some(&tcp_spec)).await) }));
    });

    let http = HttpGetProber::new().unwrap();
    let http_spec = HttpGetSpec {
        host: "127.0.0.1".to_string(),
        port: PortSpec::numeric(1),
        path: "/health".to_string(),
        scheme: "http".to_string(),
    };
    group.bench_function("http_connection_refused", |b| {
        let rt = tokio::runtime::Runtime::new().unwrap();
        b.iter(|| rt.block_on(async { black_box(http.check_probe(Some(&http_spec)).await) }));
    });

    group.finish();
}

fn poller_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("poller");

    let poller = Poller::new(PollPolicy {
        max_attempts: 1,
        interval: Duration::from_millis(1),
    })
    .unwrap();
    let spec = ProbeSpec::TcpSocket(TcpSocketSpec::default());
    let endpoint = Endpoint::new("127.0.0.1", 1);

    group.bench_function("bind_tcp", |b| {
        b.iter(|| black_box(poller.bind(Some(&spec), &endpoint).is_ok()))
    });

    group.bench_function("poll_tcp_refused", |b| {
        let rt = tokio::runtime::Runtime::new().unwrap();
        b.iter(|| rt.block_on(async { black_box(poller.poll(Some(&spec), &endpoint).await) }));
    });

    group.finish();
}

criterion_group!(
    benches,
    resolve_benchmark,
    probe_benchmark,
    poller_benchmark
);
criterion_main!(benches);
