use jiwa_index::{Retrieval, Searcher};

pub const PROFESSIONAL_RESOURCES: &[&str] = &[
    "Indonesian Psychological Association (HIMPSI): https://himpsi.or.id",
    "Into The Light Indonesia (Suicide Prevention): https://intothelightidn.org",
    "PULIH Foundation: http://pulih.or.id",
    "Jakarta Counseling Center: https://jakartacounselingcenter.com",
    "Emergency contact: 119 (Indonesian mental health emergency number)",
];

const TOP_K: usize = 3;

/// Index passages for `query` when both a query and a searcher are given,
/// otherwise (or when the search finds nothing) the fixed resource list.
pub async fn professional_help<S: Searcher>(query: Option<&str>, searcher: Option<&S>) -> String {
    if let (Some(query), Some(searcher)) = (query, searcher) {
        match searcher.search(query, TOP_K).await {
            Ok(Retrieval::Hits(hits)) => {
                let lines: Vec<String> = hits.iter().map(|h| format!("• {}", h.text)).collect();
                return lines.join("\n");
            }
            Ok(Retrieval::Empty) => {}
            Ok(Retrieval::Failed(reason)) => {
                tracing::warn!("professional resource search failed: {reason}");
            }
            Err(e) => tracing::warn!("professional resource search rejected: {e}"),
        }
    }
    default_resources()
}

#[must_use]
pub fn default_resources() -> String {
    let lines: Vec<String> = PROFESSIONAL_RESOURCES
        .iter()
        .map(|r| format!("• {r}"))
        .collect();
    format!(
        "Berikut beberapa sumber bantuan profesional:\n\n{}",
        lines.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use jiwa_index::{RetrieverError, ScoredChunk};

    use super::*;

    struct FixedSearcher(Retrieval);

    impl Searcher for FixedSearcher {
        async fn search(&self, query: &str, _k: usize) -> Result<Retrieval, RetrieverError> {
            if query.trim().is_empty() {
                return Err(RetrieverError::EmptyQuery);
            }
            Ok(self.0.clone())
        }
    }

    fn hit(text: &str) -> ScoredChunk {
        ScoredChunk {
            id: text.into(),
            text: text.into(),
            source: "kb.csv".into(),
            row: 0,
            chunk_index: 0,
            score: 0.9,
        }
    }

    #[tokio::test]
    async fn hits_rendered_as_bullets() {
        let searcher = FixedSearcher(Retrieval::Hits(vec![hit("Psikolog klinis A"), hit("Puskesmas B")]));
        let text = professional_help(Some("psikolog jakarta"), Some(&searcher)).await;
        assert_eq!(text, "• Psikolog klinis A\n• Puskesmas B");
    }

    #[tokio::test]
    async fn no_query_uses_default_list() {
        let searcher = FixedSearcher(Retrieval::Hits(vec![hit("x")]));
        assert_eq!(professional_help(None, Some(&searcher)).await, default_resources());
    }

    #[tokio::test]
    async fn no_searcher_uses_default_list() {
        let text = professional_help::<FixedSearcher>(Some("q"), None).await;
        assert!(text.contains("HIMPSI"));
        assert!(text.contains("119"));
    }

    #[tokio::test]
    async fn empty_or_failed_search_falls_back() {
        for outcome in [Retrieval::Empty, Retrieval::Failed("timeout".into())] {
            let searcher = FixedSearcher(outcome);
            assert_eq!(professional_help(Some("q"), Some(&searcher)).await, default_resources());
        }
        let searcher = FixedSearcher(Retrieval::Empty);
        assert_eq!(professional_help(Some("  "), Some(&searcher)).await, default_resources());
    }
}
