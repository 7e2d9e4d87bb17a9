use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use newsletter_ai_backend::api::routes::create_router;
use newsletter_ai_backend::config::Config;
use newsletter_ai_backend::error::PROVIDER_UNAVAILABLE_MESSAGE;
use newsletter_ai_backend::llm::mock::MockProvider;
use newsletter_ai_backend::llm::{Citation, SearchOutput};
use newsletter_ai_backend::AppState;

fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "OPENAI_API_KEY" => Some("sk-test".to_string()),
        "MAX_ITEM_COUNT" => Some("5".to_string()),
        _ => None,
    })
    .expect("test config")
}

fn app(provider: &Arc<MockProvider>) -> Router {
    create_router(AppState::new(test_config(), provider.clone()))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_check_works() {
    let provider = Arc::new(MockProvider::failing());
    let (status, body) = send(app(&provider), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn root_reports_liveness() {
    let provider = Arc::new(MockProvider::failing());
    let (status, body) = send(app(&provider), get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert!(body["message"].as_str().unwrap().contains("Newsletter"));
}

#[tokio::test]
async fn generate_returns_content() {
    let provider = Arc::new(MockProvider::new().with_completion_text("Fresh copy"));
    let (status, body) = send(
        app(&provider),
        post_json("/api/ai/generate", json!({"prompt": "Write a tagline", "options": {"temperature": 0.3}})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"content": "Fresh copy"}));
    assert_eq!(provider.completion_requests()[0].temperature, Some(0.3));
}

#[tokio::test]
async fn generate_rejects_empty_prompt() {
    let provider = Arc::new(MockProvider::failing());
    let (status, body) = send(app(&provider), post_json("/api/ai/generate", json!({"prompt": ""}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status_code"], 400);
    assert_eq!(provider.completion_calls(), 0);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let provider = Arc::new(MockProvider::failing());
    let request = Request::builder()
        .method("POST")
        .uri("/api/ai/summarize")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(app(&provider), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn summarize_empty_text_short_circuits() {
    let provider = Arc::new(MockProvider::failing());
    let (status, body) = send(app(&provider), post_json("/api/ai/summarize", json!({"text": ""}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"summary": ""}));
    assert_eq!(provider.completion_calls(), 0);
}

#[tokio::test]
async fn summarize_provider_failure_is_bad_gateway() {
    let provider = Arc::new(MockProvider::failing());
    let (status, body) = send(
        app(&provider),
        post_json("/api/ai/summarize", json!({"text": "A long article about search ads."})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], PROVIDER_UNAVAILABLE_MESSAGE);
}

#[tokio::test]
async fn newsletter_uses_web_search_when_it_succeeds() {
    let provider = Arc::new(MockProvider::new().with_search_text(
        r#"[{"title": "Core update", "url": "https://a.example/1", "summary": "S1", "publisher": "A"},
            {"title": "AI mode", "url": "https://b.example/2", "summary": "S2", "publisher": "B"}]"#,
    ));
    let (status, body) = send(
        app(&provider),
        post_json("/api/ai/newsletter", json!({"topic": "seo", "itemCount": 2})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["usedWebSearch"], true);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["url"], "https://a.example/1");
    assert_eq!(items[1]["publisher"], "B");
}

#[tokio::test]
async fn newsletter_fallback_items_have_no_url() {
    let provider = Arc::new(
        MockProvider::new()
            .with_search_text("no results today")
            .with_completion_text(r#"[{"title": "Invented", "summary": "S"}]"#),
    );
    let (status, body) = send(
        app(&provider),
        post_json("/api/ai/newsletter", json!({"topic": "ppc", "itemCount": 1})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["usedWebSearch"], false);
    assert!(body["items"][0].get("url").is_none());
}

#[tokio::test]
async fn newsletter_rejects_item_count_above_maximum() {
    let provider = Arc::new(MockProvider::failing());
    let (status, _) = send(
        app(&provider),
        post_json("/api/ai/newsletter", json!({"topic": "seo", "itemCount": 50})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(provider.search_calls(), 0);
}

#[tokio::test]
async fn newsletter_with_dead_provider_is_bad_gateway() {
    let provider = Arc::new(MockProvider::failing());
    let (status, body) = send(
        app(&provider),
        post_json("/api/ai/newsletter", json!({"topic": "seo", "itemCount": 2})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], PROVIDER_UNAVAILABLE_MESSAGE);
    assert_eq!(provider.search_calls(), 1);
    assert_eq!(provider.completion_calls(), 1);
}

#[tokio::test]
async fn hook_title_route_returns_hook_title_field() {
    let provider = Arc::new(MockProvider::new().with_completion_text("\"Your Rankings Just Moved\""));
    let (status, body) = send(
        app(&provider),
        post_json("/api/ai/generate-hook-title", json!({"title": "Google confirms update"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"hook_title": "Your Rankings Just Moved"}));
}

#[tokio::test]
async fn news_impact_route_uses_camel_case_fields() {
    let provider = Arc::new(MockProvider::new().with_completion_text(
        r#"{"whyItMatters": "Ad costs shift.", "actionItems": ["Review budgets"]}"#,
    ));
    let (status, body) = send(
        app(&provider),
        post_json(
            "/api/ai/news-impact",
            json!({"title": "T", "description": "D", "source": "S", "category": "ppc"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["whyItMatters"], "Ad costs shift.");
    assert_eq!(body["actionItems"], json!(["Review budgets"]));
    assert_eq!(body["tokens_used"], 0);
}

#[tokio::test]
async fn sections_lists_the_newsletter_layout() {
    let provider = Arc::new(MockProvider::failing());
    let (status, body) = send(app(&provider), get("/api/news/sections")).await;

    assert_eq!(status, StatusCode::OK);
    let sections = body["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 7);
    assert_eq!(sections[0]["key"], "main-story");
}

#[tokio::test]
async fn search_for_section_tags_its_source() {
    let provider = Arc::new(MockProvider::new().with_search_text(
        r#"{"items": [{"title": "Threads ads open", "url": "https://social.example/t", "summary": "S"}]}"#,
    ));
    let (status, body) = send(
        app(&provider),
        post_json(
            "/api/news/search-for-section",
            json!({"section_key": "trendsetter", "section_title": "Trendsetter", "section_description": "Emerging trends", "num_items": 1}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["section_key"], "trendsetter");
    assert_eq!(body["usedWebSearch"], true);
    assert!(provider.search_requests()[0].user.contains("Trendsetter"));
}

#[tokio::test]
async fn newsletter_drops_links_the_search_did_not_cite() {
    let provider = Arc::new(
        MockProvider::new()
            .with_search(Ok(SearchOutput {
                text: r#"[{"title": "Made up", "url": "https://hallucinated.example/none", "summary": "S"}]"#.into(),
                citations: vec![Citation {
                    url: "https://real.example/story".into(),
                    title: Some("Real story".into()),
                }],
            }))
            .with_completion_text(r#"[{"title": "Invented", "summary": "S"}]"#),
    );
    let (status, body) = send(
        app(&provider),
        post_json("/api/ai/newsletter", json!({"topic": "seo", "itemCount": 1})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["usedWebSearch"], false);
    assert!(body["items"][0].get("url").is_none());
}

#[tokio::test]
async fn search_all_sections_reports_each_source_and_skips_retired_sections() {
    let provider = Arc::new(
        MockProvider::new()
            .with_search_text(
                r#"[{"title": "Threads ads open", "url": "https://social.example/t", "summary": "S"}]

Sources: [social.example](https://social.example/t)"#,
            )
            .with_search_text("nothing found")
            .with_completion_text(r#"[{"title": "Invented link", "summary": "S"}, {"title": "Another", "summary": "S"}]"#),
    );
    let (status, body) = send(
        app(&provider),
        post_json(
            "/api/news/search-all-sections",
            json!({"sections": [
                {"section_key": "trendsetter", "section_title": "Trendsetter", "section_description": "Emerging trends", "num_items": 1},
                {"section_key": "tomorrow-top", "section_title": "Tomorrow", "section_description": "", "num_items": 1},
                {"section_key": "links", "section_title": "Links that Don't Suck", "section_description": "Resources", "num_items": 2}
            ]}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let sections = body["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0]["section_key"], "trendsetter");
    assert_eq!(sections[0]["usedWebSearch"], true);
    assert_eq!(sections[1]["section_title"], "Links that Don't Suck");
    assert_eq!(sections[1]["usedWebSearch"], false);
    assert_eq!(body["total_items"], 3);
    assert_eq!(provider.search_calls(), 2);
}

#[tokio::test]
async fn search_all_sections_rejects_blank_section_title() {
    let provider = Arc::new(MockProvider::failing());
    let (status, _) = send(
        app(&provider),
        post_json(
            "/api/news/search-all-sections",
            json!({"sections": [{"section_key": "links", "section_title": "", "num_items": 1}]}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(provider.search_calls(), 0);
}

#[tokio::test]
async fn generate_article_uses_main_and_supporting_stories() {
    let provider = Arc::new(MockProvider::new().with_completion_text("## The feature"));
    let (status, body) = send(
        app(&provider),
        post_json(
            "/api/news/generate-article",
            json!({
                "main_story": {"id": "1", "title": "Search ads get AI", "summary": "Big shift", "url": "https://a.example"},
                "supporting_items": [
                    {"title": "One", "summary": "S1"},
                    {"title": "Two", "summary": "S2"},
                    {"title": "Three", "summary": "S3"},
                    {"title": "Four", "summary": "S4"}
                ]
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"article": "## The feature"}));
    let request = &provider.completion_requests()[0];
    assert!(request.user.contains("Main Story: Search ads get AI"));
    assert!(request.user.contains("- Three: S3"));
    assert!(!request.user.contains("Four"));
    assert!(request.system.as_deref().unwrap().contains("TONE: professional"));
}

#[tokio::test]
async fn generate_article_requires_a_main_story_title() {
    let provider = Arc::new(MockProvider::failing());
    let (status, _) = send(
        app(&provider),
        post_json("/api/news/generate-article", json!({"main_story": {"title": ""}})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(provider.completion_calls(), 0);
}

#[tokio::test]
async fn generate_story_defaults_to_450_words() {
    let provider = Arc::new(MockProvider::new().with_completion_text("Story text"));
    let (status, body) = send(
        app(&provider),
        post_json("/api/news/generate-story", json!({"title": "Threads ads open"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"story": "Story text"}));
    let system = provider.completion_requests()[0].system.clone().unwrap();
    assert!(system.contains("450 word article"));
}

#[tokio::test]
async fn generate_catchy_summary_returns_summary_field() {
    let provider = Arc::new(MockProvider::new().with_completion_text("Your ads just got smarter. Ready?"));
    let (status, body) = send(
        app(&provider),
        post_json(
            "/api/news/generate-catchy-summary",
            json!({"item": {"id": "7", "title": "Search ads get AI", "summary": "Google adds AI bidding.", "tags": ["ppc"]}}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"summary": "Your ads just got smarter. Ready?"}));
    assert!(provider.completion_requests()[0].user.contains("Original Summary: Google adds AI bidding."));
}

#[tokio::test]
async fn generate_catchy_summary_falls_back_to_original_summary() {
    let provider = Arc::new(MockProvider::failing());
    let (status, body) = send(
        app(&provider),
        post_json(
            "/api/news/generate-catchy-summary",
            json!({"item": {"title": "Search ads get AI", "summary": "Google adds AI bidding."}}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"summary": "Google adds AI bidding."}));
}

#[tokio::test]
async fn cors_allows_configured_origin_only() {
    let provider = Arc::new(MockProvider::failing());
    let preflight = |origin: &str| {
        Request::builder()
            .method("OPTIONS")
            .uri("/api/ai/summarize")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    };

    let response = app(&provider).oneshot(preflight("http://localhost:5173")).await.unwrap();
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:5173"
    );

    let response = app(&provider).oneshot(preflight("https://evil.example")).await.unwrap();
    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
