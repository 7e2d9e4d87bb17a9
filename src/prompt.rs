use chrono::{Datelike, NaiveDate};

/// How far back the web search may reach for news.
pub const SEARCH_WINDOW_DAYS: u32 = 7;

const PLAIN_STYLE_RULES: &str = "\
STYLE:
- Write like a knowledgeable human, not a robot
- Short, direct sentences and simple language
- NO em dashes or en dashes, use commas or periods instead
- NO semicolons
- NO filler phrases such as \"delve into\", \"in today's landscape\", \"furthermore\", \"moreover\"
- NO buzzwords such as \"ecosystem\", \"synergy\", \"leverage\", \"seamlessly\"";

const ITEM_SCHEMA: &str = r#"[
  {
    "title": "catchy headline, under 12 words",
    "url": "link to the source article",
    "summary": "2-3 sentence summary",
    "publisher": "name of the publication"
  }
]"#;

pub fn date_context(today: NaiveDate) -> String {
    format!(
        "CURRENT DATE: {} (Year: {}). All content should be relevant to {}, not past years.",
        today.format("%B %d, %Y"),
        today.year(),
        today.year()
    )
}

pub fn web_search_news(topic: &str, item_count: usize, today: NaiveDate) -> String {
    let mut prompt = String::with_capacity(1200 + topic.len());
    prompt.push_str(&date_context(today));
    prompt.push_str(&format!(
        "\n\nSearch the web for news about \"{topic}\" published in the last {SEARCH_WINDOW_DAYS} days \
         and pick the {item_count} most relevant stories for a digital marketing newsletter.\n\n"
    ));
    prompt.push_str(
        "For every story:\n\
         - Write a catchy, click-worthy title: power words, numbers or an intriguing question, \
         conversational and punchy, no colons in the middle, no em dashes\n\
         - Copy the url exactly from the search result you used, never invent or shorten one\n\
         - Summarize the story in 2-3 sentences\n\
         - Name the publisher\n\n",
    );
    prompt.push_str("Respond with ONLY a JSON array, no commentary, matching:\n");
    prompt.push_str(ITEM_SCHEMA);
    prompt
}

pub fn invented_news(topic: &str, item_count: usize, today: NaiveDate) -> String {
    let mut prompt = String::with_capacity(800 + topic.len());
    prompt.push_str(&date_context(today));
    prompt.push_str(&format!(
        "\n\nWrite {item_count} plausible, timely news items about \"{topic}\" for a digital \
         marketing newsletter. Each item needs a catchy title (under 12 words, no colons, no em \
         dashes), a 2-3 sentence summary and a likely publisher name. Do not include urls.\n\n"
    ));
    prompt.push_str("Respond with ONLY a JSON array, no commentary, matching:\n");
    prompt.push_str(
        r#"[
  {
    "title": "catchy headline",
    "summary": "2-3 sentence summary",
    "publisher": "publication name"
  }
]"#,
    );
    prompt
}

pub fn summarize(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 200);
    result.push_str(
        "Summarize the following text for a newsletter reader in one or two short paragraphs. \
         Keep the key facts, drop the fluff, and do not use em dashes:\n\n",
    );
    result.push_str(text);
    result
}

pub fn hook_title_system(today: NaiveDate) -> String {
    format!(
        "{}\n\nYou are an expert newsletter headline writer. Turn headlines into compelling, \
         click-worthy titles that sound human-written.\n\n\
         RULES:\n\
         - Keep it under 10 words\n\
         - Use power words, numbers, or intriguing questions\n\
         - Make it conversational and punchy\n\
         - Reference {} if mentioning dates\n\
         - Avoid cliches like \"game-changer\" or \"revolutionary\"\n\
         - NO em dashes, NO colons in the middle, NO unnecessary punctuation\n\n\
         Return ONLY the rewritten headline.",
        date_context(today),
        today.year()
    )
}

pub fn hook_title_user(title: &str) -> String {
    format!("Rewrite this headline:\n\n{title}")
}

pub fn description_system(today: NaiveDate) -> String {
    format!(
        "{}\n\nYou are writing the opening hook for a digital marketing newsletter. Write a \
         compelling 1-2 sentence description, under 25 words, that makes readers want to keep \
         reading.\n\n{PLAIN_STYLE_RULES}",
        date_context(today)
    )
}

pub fn description_user(title: &str) -> String {
    format!("Write a compelling intro for this newsletter topic:\n\n{title}")
}

pub fn title_summary_system(today: NaiveDate) -> String {
    format!(
        "{}\n\nYou are a digital marketing journalist writing a newsletter summary of 150-200 \
         words in 2-3 short paragraphs separated by blank lines. Bold 3-4 key terms with \
         **markdown**. Open with the news, then explain why it matters for marketers in {}. \
         Do not repeat the title.\n\n{PLAIN_STYLE_RULES}",
        date_context(today),
        today.year()
    )
}

/// Existing summaries shorter than this are ignored as context.
const MIN_CONTEXT_CHARS: usize = 10;

pub fn title_summary_user(title: &str, existing_summary: Option<&str>) -> String {
    let mut context = format!("Title: {title}");
    if let Some(existing) = existing_summary.map(str::trim) {
        if existing.chars().count() > MIN_CONTEXT_CHARS {
            context.push_str("\n\nOriginal Content/Context: ");
            context.push_str(existing);
        }
    }
    format!("Write a 150-200 word summary with proper markdown formatting:\n\n{context}")
}

pub fn one_liner_system(today: NaiveDate) -> String {
    format!(
        "{}\n\nYou are a newsletter editor writing punchy one-liners. Write a single sentence of \
         at most 15 words that captures the key point of this news. No em dashes, no colons.",
        date_context(today)
    )
}

pub fn one_liner_user(title: &str) -> String {
    format!("Write a one-liner for:\n\n{title}")
}

pub fn story_system(today: NaiveDate, word_count: u32) -> String {
    format!(
        "{}\n\nYou are a digital marketing journalist. Write a {word_count} word article that opens \
         with a strong hook, explains the news and its context, discusses business implications, \
         gives actionable insights and ends with a forward-looking statement. Use short \
         paragraphs of 2-3 sentences.\n\n{PLAIN_STYLE_RULES}",
        date_context(today)
    )
}

pub fn main_article_system(today: NaiveDate, min_words: u32, max_words: u32) -> String {
    format!(
        "{}\n\nYou are a digital marketing thought leader writing the main feature of a \
         newsletter. Write {min_words}-{max_words} words in 4-5 short paragraphs: an opening \
         hook, two paragraphs of analysis grounded in {} trends, a \"### Key Takeaways\" section \
         with 2-3 bullets that start with a verb, and a short closing.\n\n{PLAIN_STYLE_RULES}",
        date_context(today),
        today.year()
    )
}

pub fn article_user(title: &str, summary: &str) -> String {
    let summary = summary.trim();
    let context = if summary.is_empty() { "No additional context" } else { summary };
    format!("Write an article about:\n\nTitle: {title}\nContext: {context}")
}

pub fn feature_article_system(today: NaiveDate, style: &str) -> String {
    format!(
        "{}\n\nYou are a senior digital marketing journalist writing for a B2B newsletter in {}. \
         Write a comprehensive {FEATURE_MIN_WORDS}-{FEATURE_MAX_WORDS} word feature article that \
         opens with a narrative hook, analyzes the topic in depth with industry context and \
         trends, offers strategic insights and predictions, gives 3-4 actionable takeaways and \
         ends with a thought-provoking conclusion.\n\n\
         TONE: {style}, authoritative, insightful\n\
         FORMAT: subheadings, short paragraphs and bullet points where they help.\n\n{PLAIN_STYLE_RULES}",
        date_context(today),
        today.year()
    )
}

pub const FEATURE_MIN_WORDS: u32 = 600;
pub const FEATURE_MAX_WORDS: u32 = 800;

/// Supporting stories beyond this many are left out of the feature prompt.
pub const MAX_SUPPORTING_ITEMS: usize = 3;

/// A story fed into the feature article prompt.
#[derive(Debug, Clone, Copy)]
pub struct StoryBrief<'a> {
    pub title: &'a str,
    pub summary: &'a str,
    pub why_it_matters: Option<&'a str>,
}

pub fn feature_article_user(main: StoryBrief<'_>, supporting: &[StoryBrief<'_>]) -> String {
    let summary = non_blank(main.summary).unwrap_or("No summary provided");
    let why = main.why_it_matters.and_then(non_blank).unwrap_or("Impact to be determined");

    let context = supporting
        .iter()
        .take(MAX_SUPPORTING_ITEMS)
        .map(|item| format!("- {}: {}", item.title.trim(), item.summary.trim()))
        .collect::<Vec<_>>()
        .join("\n");
    let context = if context.is_empty() { "No additional context".to_string() } else { context };

    format!(
        "Write the main feature article:\n\nMain Story: {}\nSummary: {summary}\n\
         Why It Matters: {why}\n\nSupporting Context:\n{context}",
        main.title.trim()
    )
}

pub fn catchy_summary_system(today: NaiveDate) -> String {
    format!(
        "{}\n\nYou are a copywriter creating engaging newsletter summaries in {}. Write a 2-3 \
         sentence summary that hooks the reader immediately, explains the key point, creates \
         urgency or curiosity, uses active voice and ends with a hook or question.\n\n{PLAIN_STYLE_RULES}",
        date_context(today),
        today.year()
    )
}

pub fn catchy_summary_user(title: &str, summary: &str) -> String {
    let summary = non_blank(summary).unwrap_or("No summary provided");
    format!("Create a catchy summary for:\n\nTitle: {title}\nOriginal Summary: {summary}")
}

fn non_blank(text: &str) -> Option<&str> {
    let text = text.trim();
    (!text.is_empty()).then_some(text)
}

pub fn news_impact_system(today: NaiveDate) -> String {
    format!(
        "{}\n\nYou are a digital marketing consultant analyzing news for business owners. Be \
         specific and actionable, no em dashes, no jargon.\n\n\
         Respond with ONLY valid JSON:\n\
         {{\"whyItMatters\": \"1-2 sentences on the business impact\", \
         \"actionItems\": [\"1-2 concrete actions starting with a verb\"]}}\n\n\
         Keep the total under 80 words.",
        date_context(today)
    )
}

pub fn news_impact_user(title: &str, description: &str, source: &str, category: &str) -> String {
    format!(
        "News Article:\nTitle: {title}\nDescription: {description}\nSource: {source}\n\
         Category: {category}\n\nAnalyze the business impact:"
    )
}

pub fn section_topic(section_title: &str, section_description: &str) -> String {
    let description = section_description.trim();
    if description.is_empty() {
        format!("digital marketing news for the \"{}\" newsletter section", section_title.trim())
    } else {
        format!(
            "digital marketing news for the \"{}\" newsletter section ({})",
            section_title.trim(),
            description
        )
    }
}

/// Replaces the dash characters models keep producing despite instructions.
pub fn strip_dashes(text: &str) -> String {
    text.replace('\u{2014}', ",").replace('\u{2013}', "-").trim().to_string()
}
