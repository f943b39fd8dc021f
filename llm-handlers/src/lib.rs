//! # llm-handlers
//!
//! The gateway's two bots as [`handler_chain::CommandSet`] variants:
//! [`BusinessIdeasBot`] (idea generation and analysis) and [`WikiFactsBot`] (random or searched
//! Wikipedia article, summarised). Both call the Content Provider through
//! [`llm_client::LlmClient`]; the wiki bot also reads articles through [`ArticleSource`].

pub mod business_ideas;
mod wiki;
pub mod wiki_facts;

pub use business_ideas::{AnalyzeHandler, BusinessIdeasBot, IdeaHandler};
pub use wiki::{Article, ArticleSource, WikiClient};
pub use wiki_facts::{FactHandler, SearchHandler, WikiFactsBot};
