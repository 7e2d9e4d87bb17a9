use axum::{
    routing::{get, post},
    Router,
    extract::State,
    http::{Method, header},
    response::IntoResponse,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::AppState;
use crate::api::extract::ValidatedJson;
use crate::api::models::*;
use crate::api::response;
use crate::error::Result;
use crate::prompt;
use crate::writer::{DEFAULT_STORY_WORDS, GenerateOptions};

/// Sections the frontend may still send but the newsletter no longer has.
const RETIRED_SECTION_KEYS: [&str; 1] = ["tomorrow-top"];

pub fn create_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(app_state.config.cors_origins.clone()))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let ai = Router::new()
        .route("/generate", post(generate_handler))
        .route("/summarize", post(summarize_handler))
        .route("/newsletter", post(newsletter_handler))
        .route("/rewrite-title", post(rewrite_title_handler))
        .route("/generate-hook-title", post(hook_title_handler))
        .route("/generate-summary", post(title_summary_handler))
        .route("/generate-description", post(description_handler))
        .route("/generate-one-liner", post(one_liner_handler))
        .route("/generate-full-story", post(full_story_handler))
        .route("/generate-main-article", post(main_article_handler))
        .route("/news-impact", post(news_impact_handler));

    let news = Router::new()
        .route("/sections", get(sections_handler))
        .route("/search-for-section", post(search_for_section_handler))
        .route("/search-all-sections", post(search_all_sections_handler))
        .route("/generate-article", post(feature_article_handler))
        .route("/generate-story", post(section_story_handler))
        .route("/generate-catchy-summary", post(catchy_summary_handler));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .nest("/api/ai", ai)
        .nest("/api/news", news)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

async fn root_handler() -> impl IntoResponse {
    response::success(ServiceInfo {
        message: "Newsletter AI Backend API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
    })
}

async fn health_handler() -> impl IntoResponse {
    response::success(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn generate_handler(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<GenerateRequest>,
) -> Result<impl IntoResponse> {
    let options = req.options.map(GenerateOptions::from).unwrap_or_default();
    let content = state.writer.generate(&req.prompt, options).await?;
    Ok(response::success(GenerateResponse { content }))
}

async fn summarize_handler(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SummarizeRequest>,
) -> Result<impl IntoResponse> {
    let summary = state.writer.summarize(&req.text).await?;
    Ok(response::success(SummarizeResponse { summary }))
}

async fn newsletter_handler(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<NewsletterRequest>,
) -> Result<impl IntoResponse> {
    info!(topic = %req.topic, item_count = req.item_count, "Newsletter content requested");
    let result = state
        .pipeline
        .fetch_content(&req.topic, req.item_count, req.prefer_web_search)
        .await?;
    Ok(response::success(result))
}

async fn rewrite_title_handler(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<TitleRequest>,
) -> Result<impl IntoResponse> {
    let title = state.writer.hook_title(&req.title).await?;
    Ok(response::success(TitleResponse { title }))
}

async fn hook_title_handler(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<TitleRequest>,
) -> Result<impl IntoResponse> {
    let hook_title = state.writer.hook_title(&req.title).await?;
    Ok(response::success(HookTitleResponse { hook_title }))
}

async fn title_summary_handler(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<TitleSummaryRequest>,
) -> Result<impl IntoResponse> {
    let summary = state
        .writer
        .title_summary(&req.title, req.existing_summary.as_deref())
        .await?;
    Ok(response::success(SummarizeResponse { summary }))
}

async fn description_handler(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<TitleRequest>,
) -> Result<impl IntoResponse> {
    let description = state.writer.description(&req.title).await?;
    Ok(response::success(DescriptionResponse { description }))
}

async fn one_liner_handler(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<TitleRequest>,
) -> Result<impl IntoResponse> {
    let one_liner = state.writer.one_liner(&req.title).await?;
    Ok(response::success(OneLinerResponse { one_liner }))
}

async fn full_story_handler(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<StoryRequest>,
) -> Result<impl IntoResponse> {
    let story = state
        .writer
        .story(&req.title, &req.summary, DEFAULT_STORY_WORDS)
        .await?;
    Ok(response::success(StoryResponse { story }))
}

async fn main_article_handler(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<MainArticleRequest>,
) -> Result<impl IntoResponse> {
    let article = state
        .writer
        .main_article(&req.title, &req.summary, req.word_count)
        .await?;
    Ok(response::success(ArticleResponse { article }))
}

async fn news_impact_handler(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<NewsImpactRequest>,
) -> Result<impl IntoResponse> {
    let impact = state
        .writer
        .news_impact(&req.title, &req.description, &req.source, &req.category)
        .await?;
    Ok(response::success(NewsImpactResponse {
        why_it_matters: impact.why_it_matters,
        action_items: impact.action_items,
        tokens_used: 0,
    }))
}

async fn sections_handler() -> impl IntoResponse {
    response::success(SectionsResponse {
        sections: newsletter_sections(),
    })
}

async fn search_for_section_handler(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SectionSearchRequest>,
) -> Result<impl IntoResponse> {
    let topic = prompt::section_topic(&req.section_title, &req.section_description);
    let result = state
        .pipeline
        .fetch_content(&topic, req.num_items, true)
        .await?;
    Ok(response::success(SectionSearchResponse {
        section_key: req.section_key,
        items: result.items,
        used_web_search: result.used_web_search,
    }))
}

async fn search_all_sections_handler(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SearchAllSectionsRequest>,
) -> Result<impl IntoResponse> {
    let mut sections = Vec::with_capacity(req.sections.len());
    let mut total_items = 0;

    for section in req.sections {
        if RETIRED_SECTION_KEYS.contains(&section.section_key.as_str()) {
            debug!(section_key = %section.section_key, "Skipping retired section");
            continue;
        }

        let topic = prompt::section_topic(&section.section_title, &section.section_description);
        let result = state
            .pipeline
            .fetch_content(&topic, section.num_items, true)
            .await?;

        total_items += result.items.len();
        sections.push(SectionWithNews {
            section_key: section.section_key,
            section_title: section.section_title,
            items: result.items,
            used_web_search: result.used_web_search,
        });
    }

    info!(sections = sections.len(), total_items, "Searched all sections");
    Ok(response::success(SearchAllSectionsResponse {
        sections,
        total_items,
    }))
}

async fn feature_article_handler(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<FeatureArticleRequest>,
) -> Result<impl IntoResponse> {
    let supporting: Vec<_> = req.supporting_items.iter().map(NewsItemInput::brief).collect();
    let article = state
        .writer
        .feature_article(req.main_story.brief(), &supporting, &req.style)
        .await?;
    Ok(response::success(ArticleResponse { article }))
}

async fn section_story_handler(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SectionStoryRequest>,
) -> Result<impl IntoResponse> {
    let story = state
        .writer
        .story(&req.title, &req.summary, req.word_count)
        .await?;
    Ok(response::success(StoryResponse { story }))
}

async fn catchy_summary_handler(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CatchySummaryRequest>,
) -> Result<impl IntoResponse> {
    let summary = state
        .writer
        .catchy_summary(&req.item.title, &req.item.summary)
        .await?;
    Ok(response::success(SummarizeResponse { summary }))
}

/// The fixed newsletter layout the frontend assembles drafts against.
pub fn newsletter_sections() -> Vec<NewsletterSection> {
    const SECTIONS: [(&str, &str, &str, u32, u32); 7] = [
        ("main-story", "Main Story", "The headline story with hook title", 1, 1),
        ("main-story-summary", "Main Story Summary", "AI-generated summary of main story", 1, 1),
        ("second-story", "Second Story", "Supporting story with 400-500 word article", 1, 1),
        ("third-story", "Third Story", "Additional story with 400-500 word article", 1, 1),
        ("trendsetter", "Trendsetter", "One-liners with hyperlinks for emerging trends", 1, 3),
        ("top-news", "Top Digital Marketing News", "One-liners with hyperlinks", 2, 5),
        ("links", "Links that Don't Suck", "Valuable resources with hyperlinks", 2, 5),
    ];

    SECTIONS
        .iter()
        .map(|&(key, title, description, min_items, max_items)| NewsletterSection {
            key: key.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            min_items,
            max_items,
        })
        .collect()
}
