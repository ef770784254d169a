mod common;

use std::time::{Duration, Instant};

use apiprobe::config::Delays;
use apiprobe::middleware::{RequestMetrics, TimingMiddleware};
use apiprobe::{Capabilities, Request, Service, SystemClock, api};
use http::{Method, StatusCode};

use common::{FixedIds, Recorded, TickingClock, get, json};

fn service(delays: Delays) -> Service {
    api::app(&Capabilities::system(), delays).into_service()
}

fn fast() -> Delays {
    Delays { blocking: Duration::ZERO, slow: Duration::ZERO }
}

#[tokio::test]
async fn root_greets_in_plain_text() {
    let res = get(&service(fast()), "/").await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.header("content-type"), Some("text/plain; charset=utf-8"));
    assert_eq!(&res.body()[..], b"Hello World! API is running.");
}

#[tokio::test]
async fn health_is_healthy_with_advancing_timestamps() {
    let caps = Capabilities::new(TickingClock::starting_at(1_700_000_000), FixedIds(0));
    let svc = api::app(&caps, fast()).into_service();

    let first = json(&get(&svc, "/health").await);
    let second = json(&get(&svc, "/health").await);

    assert_eq!(first["status"], "Healthy");
    assert_eq!(second["status"], "Healthy");
    let t1: chrono::DateTime<chrono::Utc> = first["timestamp"].as_str().unwrap().parse().unwrap();
    let t2: chrono::DateTime<chrono::Utc> = second["timestamp"].as_str().unwrap().parse().unwrap();
    assert!(t2 > t1);
}

#[tokio::test]
async fn health_timestamp_is_utc_iso8601() {
    let body = json(&get(&service(fast()), "/health").await);
    let ts = body["timestamp"].as_str().unwrap();
    assert!(ts.ends_with('Z'), "{ts}");
    assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
}

#[tokio::test]
async fn user_list_is_fixed_and_stateless() {
    let svc = service(fast());
    let expected = serde_json::json!([
        {"id": 1, "name": "John Doe", "email": "john@example.com"},
        {"id": 2, "name": "Jane Smith", "email": "jane@example.com"},
        {"id": 3, "name": "Bob Johnson", "email": "bob@example.com"},
    ]);
    for _ in 0..3 {
        let res = get(&svc, "/api/users").await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(json(&res), expected);
    }
}

#[tokio::test]
async fn user_by_id_is_derived_from_the_id() {
    let svc = service(fast());
    for id in [0, 1, 42, -7, i32::MAX, i32::MIN] {
        let res = get(&svc, &format!("/api/users/{id}")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(
            json(&res),
            serde_json::json!({"id": id, "name": format!("User {id}"), "email": format!("user{id}@example.com")})
        );
    }
}

#[tokio::test]
async fn user_by_non_integer_id_is_rejected() {
    let svc = service(fast());
    for path in ["/api/users/abc", "/api/users/4.2", "/api/users/2147483648"] {
        let res = get(&svc, path).await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST, "{path}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn create_user_echoes_body_and_blocks() {
    let svc = service(Delays::default());
    let req = Request::new(Method::POST, "/api/users").with_body(r#"{"name":"X"}"#);

    let start = Instant::now();
    let res = svc.call(req).await;
    let elapsed = start.elapsed();

    assert_eq!(res.status_code(), StatusCode::CREATED);
    assert_eq!(&res.body()[..], br#"{"name":"X"}"#);
    assert!(elapsed >= Duration::from_millis(100), "{elapsed:?}");

    let location = res.header("location").unwrap();
    let id: u32 = location.strip_prefix("/api/users/").unwrap().parse().unwrap();
    assert!(id < 1000);
}

#[tokio::test]
async fn create_user_location_uses_injected_ids() {
    let caps = Capabilities::new(SystemClock::new(), FixedIds(417));
    let svc = api::app(&caps, fast()).into_service();
    let req = Request::new(Method::POST, "/api/users").with_body("[1,2,3]");
    let res = svc.call(req).await;
    assert_eq!(res.header("location"), Some("/api/users/417"));
    assert_eq!(&res.body()[..], b"[1,2,3]");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn slow_calls_overlap() {
    let svc = service(Delays::default());

    let start = Instant::now();
    let calls: Vec<_> = (0..5)
        .map(|_| tokio::spawn(svc.call(Request::new(Method::GET, "/api/slow"))))
        .collect();
    for call in calls {
        let res = call.await.unwrap();
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(json(&res), serde_json::json!({"message": "This was a slow operation"}));
    }
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(2000), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(4000), "{elapsed:?}");
}

#[tokio::test(flavor = "current_thread")]
async fn blocking_delay_holds_the_worker_but_slow_does_not() {
    let delays = Delays { blocking: Duration::from_millis(100), slow: Duration::from_millis(100) };
    let svc = service(delays);

    let start = Instant::now();
    tokio::join!(
        svc.call(Request::new(Method::GET, "/api/slow")),
        svc.call(Request::new(Method::GET, "/api/slow")),
        svc.call(Request::new(Method::GET, "/api/slow")),
    );
    let suspended = start.elapsed();

    let start = Instant::now();
    tokio::join!(
        svc.call(Request::new(Method::POST, "/api/users").with_body("{}")),
        svc.call(Request::new(Method::POST, "/api/users").with_body("{}")),
        svc.call(Request::new(Method::POST, "/api/users").with_body("{}")),
    );
    let blocked = start.elapsed();

    assert!(suspended < Duration::from_millis(250), "{suspended:?}");
    assert!(blocked >= Duration::from_millis(300), "{blocked:?}");
}

#[tokio::test]
async fn error_is_a_simulated_500() {
    let res = get(&service(fast()), "/api/error").await;
    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.header("content-type"), Some("application/problem+json"));
    let body = json(&res);
    assert_eq!(body["detail"], "Simulated error");
    assert_eq!(body["status"], 500);
}

#[tokio::test]
async fn every_request_is_timed_exactly_once() {
    let caps = Capabilities::system();
    let recorded = Recorded::default();
    let svc = api::routes(&caps, fast())
        .layer(TimingMiddleware::new(caps.clock.clone()).with_recorder(recorded.clone()))
        .into_service();

    let requests = [
        (Method::GET, "/"),
        (Method::GET, "/health"),
        (Method::GET, "/api/users"),
        (Method::GET, "/api/users/5"),
        (Method::GET, "/api/users/five"),
        (Method::GET, "/api/error"),
        (Method::GET, "/api/slow"),
        (Method::GET, "/nowhere"),
        (Method::DELETE, "/api/users"),
    ];
    for (method, path) in &requests {
        svc.call(Request::new(method.clone(), *path)).await;
    }

    let timings = recorded.take();
    let seen: Vec<(Method, &str, u16)> = timings
        .iter()
        .map(|t| (t.method.clone(), t.path.as_str(), t.status))
        .collect();
    assert_eq!(
        seen,
        [
            (Method::GET, "/", 200),
            (Method::GET, "/health", 200),
            (Method::GET, "/api/users", 200),
            (Method::GET, "/api/users/5", 200),
            (Method::GET, "/api/users/five", 400),
            (Method::GET, "/api/error", 500),
            (Method::GET, "/api/slow", 200),
            (Method::GET, "/nowhere", 404),
            (Method::DELETE, "/api/users", 405),
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn timing_covers_the_blocking_delay() {
    let caps = Capabilities::system();
    let recorded = Recorded::default();
    let delays = Delays { blocking: Duration::from_millis(120), slow: Duration::ZERO };
    let svc = api::routes(&caps, delays)
        .layer(TimingMiddleware::new(caps.clock.clone()).with_recorder(recorded.clone()))
        .into_service();

    svc.call(Request::new(Method::POST, "/api/users").with_body(r#"{"name":"X"}"#)).await;

    let timings = recorded.take();
    assert_eq!(timings.len(), 1);
    assert_eq!(timings[0].status, 201);
    assert!(timings[0].elapsed_ms() >= 120);
}

#[tokio::test]
async fn app_with_metrics_counts_every_route_and_status() {
    let metrics = RequestMetrics::new();
    let svc = api::app_with_metrics(&Capabilities::system(), fast(), &metrics).into_service();

    get(&svc, "/api/users/1").await;
    get(&svc, "/api/users/1").await;
    get(&svc, "/api/error").await;
    get(&svc, "/api/users/").await;

    let counts: Vec<(String, u16, u64)> = metrics
        .snapshot()
        .into_iter()
        .map(|(key, stats)| (key.path, key.status, stats.count))
        .collect();
    assert_eq!(
        counts,
        [
            ("/api/error".to_owned(), 500, 1),
            ("/api/users/".to_owned(), 200, 1),
            ("/api/users/1".to_owned(), 200, 2),
        ]
    );
    assert_eq!(metrics.errors(), 1);
}
