//! Business Ideas bot: `/start`, `/help`, `/idea`, `/analyze [idea]`.

use std::sync::Arc;

use async_trait::async_trait;
use dbot_core::{CommandContext, CommandHandler, HandlerError, Reply};
use handler_chain::{CommandSet, HandlerChain, StaticReply};
use llm_client::{CompletionRequest, LlmClient};
use tracing::info;

pub const WELCOME_TEXT: &str = "👋 Welcome to the Business Ideas Bot!\n\n\
I'll help you generate innovative business ideas and provide detailed analysis for each one.\n\n\
Available commands:\n\
💡 /idea - Get a new business idea\n\
🔍 /analyze [idea] - Get detailed analysis of a business idea\n\
❓ /help - Show all available commands";

pub const HELP_TEXT: &str = "Available commands:\n\
/start - Start the bot\n\
/idea - Get a new business idea\n\
/analyze [idea] - Get detailed analysis of a business idea\n\
/help - Show this help message";

pub const ANALYZE_USAGE_TEXT: &str = "Please provide a business idea to analyze.\n\
Example: /analyze A mobile app for pet sitting services";

pub const IDEA_FALLBACK_TEXT: &str = "Sorry, I encountered an error while generating the business idea. \
Please try again with /idea";

pub const ANALYZE_FALLBACK_TEXT: &str = "Sorry, I encountered an error while analyzing your business idea. \
Please try again with a different idea.";

const CONSULTANT_PERSONA: &str =
    "You are a business consultant with expertise in entrepreneurship and market analysis.";

const IDEA_PROMPT: &str = "Generate a unique and innovative business idea. Include:
1. Business Name
2. One-line description
3. Target market
4. Key value proposition
5. Initial investment range
6. Potential challenges
7. First steps to start

Format the response as:
BUSINESS NAME:
[name]

DESCRIPTION:
[one-line description]

TARGET MARKET:
[target market]

VALUE PROPOSITION:
[key value proposition]

INVESTMENT:
[investment range]

CHALLENGES:
[potential challenges]

FIRST STEPS:
[first steps to start]
";

fn analysis_prompt(idea: &str) -> String {
    format!(
        "Analyze this business idea: {idea}

Please provide:
1. Market Analysis
2. Competitive Advantage
3. Revenue Model
4. Marketing Strategy
5. Risk Assessment
6. Growth Potential
7. Action Plan

Format the response as:
MARKET ANALYSIS:
[analysis]

COMPETITIVE ADVANTAGE:
[advantages]

REVENUE MODEL:
[model]

MARKETING STRATEGY:
[strategy]

RISK ASSESSMENT:
[risks]

GROWTH POTENTIAL:
[potential]

ACTION PLAN:
[plan]
"
    )
}

/// `/idea`: one generated business idea.
pub struct IdeaHandler {
    llm: Arc<dyn LlmClient>,
}

impl IdeaHandler {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl CommandHandler for IdeaHandler {
    async fn handle(&self, ctx: &CommandContext) -> Result<Reply, HandlerError> {
        ctx.typing().await;
        let request = CompletionRequest::new(CONSULTANT_PERSONA, IDEA_PROMPT)
            .with_max_tokens(500)
            .with_temperature(0.8);
        let idea = self
            .llm
            .complete(request)
            .await
            .map_err(|e| HandlerError::Generation(e.to_string()))?;
        info!(chat_id = ctx.chat().id, len = idea.len(), "Business idea generated");
        Ok(Reply::markdown(format!(
            "💡 *New Business Idea*\n\n{idea}\n\n\
             Use /idea to get another business idea!\n\
             Use /analyze [idea] to get detailed analysis of any business idea."
        )))
    }

    fn fallback(&self, _error: &HandlerError) -> Reply {
        Reply::plain(IDEA_FALLBACK_TEXT)
    }
}

/// `/analyze <idea>`: structured analysis of a user-supplied idea.
pub struct AnalyzeHandler {
    llm: Arc<dyn LlmClient>,
}

impl AnalyzeHandler {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl CommandHandler for AnalyzeHandler {
    async fn handle(&self, ctx: &CommandContext) -> Result<Reply, HandlerError> {
        let Some(idea) = ctx.joined_args() else {
            return Ok(Reply::plain(ANALYZE_USAGE_TEXT));
        };
        ctx.typing().await;
        let request = CompletionRequest::new(CONSULTANT_PERSONA, analysis_prompt(&idea))
            .with_max_tokens(800)
            .with_temperature(0.7);
        let analysis = self
            .llm
            .complete(request)
            .await
            .map_err(|e| HandlerError::Generation(e.to_string()))?;
        Ok(Reply::markdown(format!(
            "🔍 *Analysis for: {idea}*\n\n{analysis}\n\n\
             Use /analyze [idea] to analyze another business idea!"
        )))
    }

    fn fallback(&self, _error: &HandlerError) -> Reply {
        Reply::plain(ANALYZE_FALLBACK_TEXT)
    }
}

/// The Business Ideas bot's command set.
pub struct BusinessIdeasBot {
    llm: Arc<dyn LlmClient>,
}

impl BusinessIdeasBot {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

impl CommandSet for BusinessIdeasBot {
    fn name(&self) -> &str {
        "business-ideas"
    }

    fn register(&self, chain: HandlerChain) -> HandlerChain {
        chain
            .register("start", Arc::new(StaticReply::plain(WELCOME_TEXT)))
            .register("help", Arc::new(StaticReply::plain(HELP_TEXT)))
            .register("idea", Arc::new(IdeaHandler::new(self.llm.clone())))
            .register("analyze", Arc::new(AnalyzeHandler::new(self.llm.clone())))
    }
}
