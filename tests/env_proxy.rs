use actix_web::{App, HttpResponse, HttpServer, web};
use jobscrape::{Config, JobScraper};

const FIXTURE: &str = include_str!("fixtures/search_page.html");

async fn search() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(FIXTURE)
}

// Own test binary: the environment is process-wide.
#[actix_web::test]
async fn environment_proxy_ignored_without_configured_proxies() {
    let server = HttpServer::new(|| App::new().route("/search", web::get().to(search)))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_web::rt::spawn(server);

    // nothing listens on the discard port
    unsafe {
        std::env::set_var("HTTP_PROXY", "http://127.0.0.1:9");
        std::env::set_var("http_proxy", "http://127.0.0.1:9");
        std::env::set_var("ALL_PROXY", "http://127.0.0.1:9");
        std::env::remove_var("NO_PROXY");
        std::env::remove_var("no_proxy");
    }

    let raw = format!(
        r#"{{
            "search_queries": [{{"keywords": "rust", "location": "Berlin", "f_WT": ""}}],
            "pages_to_scrape": 1,
            "search_url": "http://{addr}/search",
            "retry": {{"attempts": 1, "delay_ms": 10, "timeout_ms": 500}}
        }}"#
    );
    let cfg = Config::from_json(&raw).unwrap();
    assert!(cfg.proxies.is_empty());

    let jobs = JobScraper::new(cfg).unwrap().run().await;
    assert_eq!(jobs.len(), 3);

    handle.stop(false).await;
}
