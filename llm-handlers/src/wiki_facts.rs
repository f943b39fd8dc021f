//! Wiki Facts bot: `/start`, `/help`, `/fact`, `/search [keyword]`.

use std::sync::Arc;

use async_trait::async_trait;
use dbot_core::{CommandContext, CommandHandler, HandlerError, Reply};
use handler_chain::{CommandSet, HandlerChain, StaticReply};
use llm_client::{CompletionRequest, LlmClient};
use tracing::{info, warn};

use crate::wiki::{Article, ArticleSource};

pub const WELCOME_TEXT: &str = "👋 Welcome to the Wiki Facts Bot!\n\n\
I'll fetch interesting Wikipedia articles and provide you with \
summaries and fun facts to keep you engaged\n\n\
Available commands:\n\
📚 /fact - Get a random Wikipedia article\n\
🔍 /search [keyword] - Search for a specific topic\n\
❓ /help - Show all available commands";

pub const HELP_TEXT: &str = "Available commands:\n\
/start - Start the bot\n\
/fact - Get a new random Wikipedia article with summary and fun facts\n\
/help - Show this help message\n\
/search [keyword] - Search for a Wikipedia article";

pub const SEARCH_USAGE_TEXT: &str = "Please provide a keyword to search for.\n\
Example: /search artificial intelligence";

pub const FACT_FALLBACK_TEXT: &str = "Sorry, I encountered an error while fetching the article. \
Please try again with /fact";

pub const NO_RESULTS_TEXT: &str = "No relevant articles found. Please try a different search term.";

pub const LOOKUP_FAILED_TEXT: &str = "Failed to fetch the article. Please try again.";

pub const SEARCH_FALLBACK_TEXT: &str = "Sorry, I encountered an error while processing your search. \
Please try again with a different keyword.";

const FRIEND_PERSONA: &str = "You are a knowledgeable friend who makes complex information \
accessible and relevant to daily life.";

fn summary_prompt(article: &Article) -> String {
    format!(
        "Article Title: {title}
Content: {content}

Please provide:
1. A concise summary (under 100 words) highlighting the most interesting facts
2. Three practical interesting things about this fact (under 30 words each)
3. End off with a question that is related to the fact and a short answer to it (under 30 words)

Format the response as:
SUMMARY:
[summary here]

Fun facts:
1. [first interesting thing]

2. [second interesting thing]

3. [third interesting thing]

Question: [question related to the fact]
Answer: [short answer to the question]
",
        title = article.title,
        content = article.content,
    )
}

async fn summarise(llm: &dyn LlmClient, article: &Article) -> Result<String, HandlerError> {
    let request = CompletionRequest::new(FRIEND_PERSONA, summary_prompt(article))
        .with_max_tokens(500)
        .with_temperature(0.7);
    llm.complete(request)
        .await
        .map_err(|e| HandlerError::Generation(e.to_string()))
}

/// `/fact`: a random Good article with summary and fun facts.
pub struct FactHandler {
    llm: Arc<dyn LlmClient>,
    articles: Arc<dyn ArticleSource>,
}

impl FactHandler {
    pub fn new(llm: Arc<dyn LlmClient>, articles: Arc<dyn ArticleSource>) -> Self {
        Self { llm, articles }
    }
}

#[async_trait]
impl CommandHandler for FactHandler {
    async fn handle(&self, ctx: &CommandContext) -> Result<Reply, HandlerError> {
        ctx.typing().await;
        let article = self
            .articles
            .random_article()
            .await
            .map_err(|e| HandlerError::Lookup(e.to_string()))?;
        info!(chat_id = ctx.chat().id, title = %article.title, "Random article fetched");
        let summary = summarise(self.llm.as_ref(), &article).await?;
        Ok(Reply::markdown(format!(
            "📚 *{title}*\n\n{summary}\n\n🔗 [Read full article]({url})\n\n\
             Use /fact to get another random article!",
            title = article.title,
            url = article.url,
        ))
        .without_link_preview())
    }

    fn fallback(&self, _error: &HandlerError) -> Reply {
        Reply::plain(FACT_FALLBACK_TEXT)
    }
}

/// `/search <keyword>`: summary of the most relevant article.
pub struct SearchHandler {
    llm: Arc<dyn LlmClient>,
    articles: Arc<dyn ArticleSource>,
}

impl SearchHandler {
    pub fn new(llm: Arc<dyn LlmClient>, articles: Arc<dyn ArticleSource>) -> Self {
        Self { llm, articles }
    }
}

#[async_trait]
impl CommandHandler for SearchHandler {
    async fn handle(&self, ctx: &CommandContext) -> Result<Reply, HandlerError> {
        let Some(keyword) = ctx.joined_args() else {
            return Ok(Reply::plain(SEARCH_USAGE_TEXT));
        };
        ctx.typing().await;
        let article = self
            .articles
            .search(&keyword)
            .await
            .map_err(|e| HandlerError::Lookup(e.to_string()))?
            .ok_or_else(|| HandlerError::NotFound(keyword.clone()))?;
        let summary = summarise(self.llm.as_ref(), &article).await?;
        Ok(Reply::markdown(format!(
            "🔍 *Search Result for: {keyword}*\n\n📚 *{title}*\n\n{summary}\n\n\
             🔗 [Read full article]({url})\n\n\
             Use /search [keyword] to search for another topic!",
            title = article.title,
            url = article.url,
        ))
        .without_link_preview())
    }

    fn fallback(&self, error: &HandlerError) -> Reply {
        match error {
            HandlerError::NotFound(_) => Reply::plain(NO_RESULTS_TEXT),
            HandlerError::Lookup(e) => {
                warn!(error = %e, "Article lookup failed");
                Reply::plain(LOOKUP_FAILED_TEXT)
            }
            _ => Reply::plain(SEARCH_FALLBACK_TEXT),
        }
    }
}

/// The Wiki Facts bot's command set.
pub struct WikiFactsBot {
    llm: Arc<dyn LlmClient>,
    articles: Arc<dyn ArticleSource>,
}

impl WikiFactsBot {
    pub fn new(llm: Arc<dyn LlmClient>, articles: Arc<dyn ArticleSource>) -> Self {
        Self { llm, articles }
    }
}

impl CommandSet for WikiFactsBot {
    fn name(&self) -> &str {
        "wiki-facts"
    }

    fn register(&self, chain: HandlerChain) -> HandlerChain {
        chain
            .register("start", Arc::new(StaticReply::plain(WELCOME_TEXT)))
            .register("help", Arc::new(StaticReply::plain(HELP_TEXT)))
            .register(
                "fact",
                Arc::new(FactHandler::new(self.llm.clone(), self.articles.clone())),
            )
            .register(
                "search",
                Arc::new(SearchHandler::new(self.llm.clone(), self.articles.clone())),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_prompt_carries_article() {
        let article = Article {
            title: "Rust".to_string(),
            url: "https://en.wikipedia.org/wiki/Rust".to_string(),
            content: "Rust is an iron oxide.".to_string(),
        };
        let prompt = summary_prompt(&article);
        assert!(prompt.starts_with("Article Title: Rust\nContent: Rust is an iron oxide."));
        assert!(prompt.contains("Question: [question related to the fact]"));
    }

    #[test]
    fn test_search_fallback_by_error_kind() {
        struct Never;
        #[async_trait]
        impl LlmClient for Never {
            async fn complete(&self, _r: CompletionRequest) -> anyhow::Result<String> {
                anyhow::bail!("unused")
            }
        }
        #[async_trait]
        impl ArticleSource for Never {
            async fn random_article(&self) -> anyhow::Result<Article> {
                anyhow::bail!("unused")
            }
            async fn search(&self, _k: &str) -> anyhow::Result<Option<Article>> {
                Ok(None)
            }
        }
        let handler = SearchHandler::new(Arc::new(Never), Arc::new(Never));
        assert_eq!(
            handler.fallback(&HandlerError::NotFound("x".into())).text,
            NO_RESULTS_TEXT
        );
        assert_eq!(
            handler.fallback(&HandlerError::Lookup("timeout".into())).text,
            LOOKUP_FAILED_TEXT
        );
        assert_eq!(
            handler.fallback(&HandlerError::Generation("boom".into())).text,
            SEARCH_FALLBACK_TEXT
        );
    }
}
