use std::sync::Arc;

use async_trait::async_trait;

use shoptalk_core::catalog::Catalog;
use shoptalk_core::domain::product::Product;
use shoptalk_core::domain::session::SessionId;
use shoptalk_core::errors::ApplicationError;

use crate::intent::search_terms;
use crate::Agent;

/// Read-only catalog keyword search. Matches query terms against the
/// product's name, description, and category.
pub struct SearchAgent {
    catalog: Arc<Catalog>,
}

impl SearchAgent {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn search(&self, query: &str) -> Vec<&Product> {
        let terms = search_terms(query);
        if terms.is_empty() {
            return Vec::new();
        }

        self.catalog
            .products()
            .iter()
            .filter(|product| {
                let haystack = format!(
                    "{} {} {}",
                    product.name, product.description, product.category
                )
                .to_lowercase();
                terms.iter().any(|term| haystack.contains(term))
            })
            .collect()
    }
}

#[async_trait]
impl Agent for SearchAgent {
    fn name(&self) -> &'static str {
        "search"
    }

    async fn handle(
        &self,
        _session: &SessionId,
        message: &str,
    ) -> Result<String, ApplicationError> {
        let results = self.search(message);

        if results.is_empty() {
            return Ok("I couldn't find any products matching your search.".to_string());
        }

        let mut reply = String::from("I found these products for you:\n\n");
        for product in results {
            reply.push_str(&format!(
                "- **{}** ({}): ${} - {}\n",
                product.name, product.id, product.price, product.description
            ));
        }
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shoptalk_core::catalog::Catalog;
    use shoptalk_core::domain::session::SessionId;

    use crate::Agent;

    use super::SearchAgent;

    fn agent() -> SearchAgent {
        SearchAgent::new(Arc::new(Catalog::demo()))
    }

    fn session() -> SessionId {
        SessionId("default".to_string())
    }

    #[tokio::test]
    async fn finds_products_by_description_keyword() {
        let agent = agent();
        let reply = agent.handle(&session(), "find me a coffee maker").await.expect("reply");

        assert!(reply.contains("Coffee Maker (12-cup)"));
        assert!(reply.contains("HOME001"));
        assert!(reply.contains("$79.99"));
    }

    #[tokio::test]
    async fn matches_by_category() {
        let agent = agent();
        let hits = agent.search("show me electronics");
        assert_eq!(hits.len(), 3);
    }

    #[tokio::test]
    async fn no_match_returns_friendly_message() {
        let agent = agent();
        let reply = agent.handle(&session(), "search for a unicycle").await.expect("reply");
        assert_eq!(reply, "I couldn't find any products matching your search.");
    }

    #[tokio::test]
    async fn stop_words_alone_match_nothing() {
        let agent = agent();
        assert!(agent.search("show me the products please").is_empty());
    }
}
