//! WikiClient against a mockito server standing in for Wikipedia.

use llm_handlers::{ArticleSource, WikiClient};
use mockito::Matcher;

fn summary_body(title: &str, page: &str) -> String {
    serde_json::json!({
        "title": title,
        "extract": "First paragraph.\n\nSecond paragraph.\nThird paragraph.\nFourth paragraph.",
        "content_urls": { "desktop": { "page": page } }
    })
    .to_string()
}

/// **Test: random article reads the pick from the redirect and fetches only its summary.**
#[tokio::test]
async fn test_random_article_uses_redirect_target() {
    let mut server = mockito::Server::new_async().await;
    let landed = format!("{}/wiki/Alan_Turing", server.url());

    let redirect = server
        .mock("GET", "/wiki/Special:RandomInCategory/Good_articles")
        .with_status(302)
        .with_header("location", &landed)
        .create_async()
        .await;
    let page = server
        .mock("GET", "/wiki/Alan_Turing")
        .with_status(200)
        .with_body("<html></html>")
        .expect(0)
        .create_async()
        .await;
    let summary = server
        .mock("GET", "/api/rest_v1/page/summary/Alan_Turing")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(summary_body("Alan Turing", "https://en.wikipedia.org/wiki/Alan_Turing"))
        .create_async()
        .await;

    let client = WikiClient::with_base_url(&server.url()).unwrap();
    let article = client.random_article().await.unwrap();

    assert_eq!(article.title, "Alan Turing");
    assert_eq!(article.url, "https://en.wikipedia.org/wiki/Alan_Turing");
    assert_eq!(
        article.content,
        "First paragraph. Second paragraph. Third paragraph."
    );
    redirect.assert_async().await;
    page.assert_async().await;
    summary.assert_async().await;
}

/// **Test: a title containing a slash is summarised whole, not by its last path segment.**
#[tokio::test]
async fn test_random_article_with_slash_in_title() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/wiki/Special:RandomInCategory/Good_articles")
        .with_status(302)
        .with_header("location", "/wiki/AC/DC")
        .create_async()
        .await;
    let whole = server
        .mock("GET", "/api/rest_v1/page/summary/AC%2FDC")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(summary_body("AC/DC", "https://en.wikipedia.org/wiki/AC/DC"))
        .expect(1)
        .create_async()
        .await;
    let tail = server
        .mock("GET", "/api/rest_v1/page/summary/DC")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(summary_body("DC", "https://en.wikipedia.org/wiki/DC"))
        .expect(0)
        .create_async()
        .await;

    let client = WikiClient::with_base_url(&server.url()).unwrap();
    let article = client.random_article().await.unwrap();

    assert_eq!(article.title, "AC/DC");
    whole.assert_async().await;
    tail.assert_async().await;
}

/// **Test: a pick that does not redirect is an error.**
#[tokio::test]
async fn test_random_article_without_redirect_is_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/wiki/Special:RandomInCategory/Good_articles")
        .with_status(200)
        .with_body("<html></html>")
        .create_async()
        .await;

    let client = WikiClient::with_base_url(&server.url()).unwrap();
    assert!(client.random_article().await.is_err());
}

/// **Test: search takes the top hit and fetches it by title.**
#[tokio::test]
async fn test_search_fetches_top_hit() {
    let mut server = mockito::Server::new_async().await;

    let search = server
        .mock("GET", "/w/api.php")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("action".into(), "query".into()),
            Matcher::UrlEncoded("list".into(), "search".into()),
            Matcher::UrlEncoded("srsearch".into(), "rust language".into()),
            Matcher::UrlEncoded("srlimit".into(), "1".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"query":{"search":[{"title":"Rust language","snippet":"..."}]}}"#)
        .create_async()
        .await;
    let summary = server
        .mock("GET", "/api/rest_v1/page/summary/Rust_language")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(summary_body("Rust language", "https://en.wikipedia.org/wiki/Rust_language"))
        .create_async()
        .await;

    let client = WikiClient::with_base_url(&server.url()).unwrap();
    let article = client.search("rust language").await.unwrap().unwrap();

    assert_eq!(article.title, "Rust language");
    search.assert_async().await;
    summary.assert_async().await;
}

/// **Test: an empty hit list is `None`, not an error.**
#[tokio::test]
async fn test_search_without_hits() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/w/api.php")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"batchcomplete":"","query":{"searchinfo":{"totalhits":0},"search":[]}}"#)
        .create_async()
        .await;

    let client = WikiClient::with_base_url(&server.url()).unwrap();
    assert!(client.search("qwxzv").await.unwrap().is_none());
}

/// **Test: a failing summary endpoint surfaces as an error.**
#[tokio::test]
async fn test_search_summary_failure_is_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/w/api.php")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"query":{"search":[{"title":"Gone"}]}}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/rest_v1/page/summary/Gone")
        .with_status(503)
        .create_async()
        .await;

    let client = WikiClient::with_base_url(&server.url()).unwrap();
    assert!(client.search("gone").await.is_err());
}
