//! The word-explainer boundary.
//!
//! The session talks to whatever produces explanations (an AI backend,
//! a dictionary service) through the single-method [`Explain`] trait.
//! A failed call is never surfaced: the session falls back to
//! [`placeholder`]. [`GlossaryExplainer`] is a local, deterministic
//! implementation good enough for offline use and for tests.

use serde::{Deserialize, Serialize};

/// Structured explanation of a word in its sentence context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub english: String,
    pub chinese: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical_note: Option<String>,
}

/// Error from an explainer backend.
#[derive(Debug, Clone)]
pub struct ExplainError {
    pub message: String,
}

impl std::fmt::Display for ExplainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// One blocking call: explain `word` as used in `sentence`.
/// Implementations run on a worker thread, hence the bounds.
pub trait Explain: Send + Sync {
    fn explain(&self, word: &str, sentence: &str) -> Result<Explanation, ExplainError>;
}

/// Deterministic fallback when the backend fails. Both sentences
/// reference the word so the popover is never blank.
pub fn placeholder(word: &str) -> Explanation {
    Explanation {
        english: format!("Definition of \"{}\" in technical context.", word),
        chinese: format!("\"{}\" 的技术含义。", word),
        technical_note: None,
    }
}

/// Local explainer backed by a small glossary of common technical
/// vocabulary. No network, fully deterministic.
pub struct GlossaryExplainer;

impl Explain for GlossaryExplainer {
    fn explain(&self, word: &str, sentence: &str) -> Result<Explanation, ExplainError> {
        let english = String::from(
            "A term commonly used in technical contexts to describe or refer to \
             specific concepts or operations.",
        );
        let chinese = format!(
            "在技术语境中，\"{}\" 通常指代特定的概念或操作。这个词在编程和系统设计中经常出现。",
            word
        );
        let technical_note = Some(format!(
            "In the context of \"{}\", this term typically refers to {}.",
            truncate_sentence(sentence, 50),
            technical_context(word)
        ));
        Ok(Explanation {
            english,
            chinese,
            technical_note,
        })
    }
}

fn truncate_sentence(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len).collect();
        format!("{}...", cut)
    }
}

fn technical_context(word: &str) -> &'static str {
    match word.to_lowercase().as_str() {
        "api" => "Application Programming Interface, a set of protocols for building software",
        "async" | "asynchronous" => "non-blocking operations that don't wait for completion",
        "cache" => "temporary storage for frequently accessed data",
        "concurrency" => "handling multiple tasks simultaneously",
        "database" => "organized collection of structured data",
        "deploy" | "deployment" => "releasing software to production environment",
        "endpoint" => "URL where an API can be accessed",
        "framework" => "reusable software platform for development",
        "git" => "distributed version control system",
        "http" => "protocol for transferring data on the web",
        "index" => "data structure for fast data retrieval",
        "json" => "JavaScript Object Notation, a data format",
        "kubernetes" | "k8s" => "container orchestration platform",
        "latency" => "delay in data transmission",
        "middleware" => "software that bridges different applications",
        "node" => "a point in a network or data structure",
        "orm" => "Object-Relational Mapping for database abstraction",
        "pipeline" => "sequence of data processing stages",
        "query" => "request for data from a database",
        "rest" | "restful" => "architectural style for web services",
        "schema" => "structure definition for data",
        "thread" => "smallest unit of execution in a process",
        "url" => "Uniform Resource Locator, web address",
        "webhook" => "HTTP callback for event notifications",
        _ => "a concept commonly encountered in software development",
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_mentions_word() {
        let p = placeholder("latency");
        assert!(p.english.contains("latency"));
        assert!(p.chinese.contains("latency"));
        assert!(p.technical_note.is_none());
    }

    #[test]
    fn test_glossary_known_word() {
        let e = GlossaryExplainer
            .explain("kubernetes", "Kubernetes schedules pods.")
            .unwrap();
        let note = e.technical_note.unwrap();
        assert!(note.contains("container orchestration platform"));
        assert!(e.chinese.contains("kubernetes"));
    }

    #[test]
    fn test_glossary_unknown_word_uses_default_context() {
        let e = GlossaryExplainer.explain("flange", "Attach the flange.").unwrap();
        assert!(e
            .technical_note
            .unwrap()
            .contains("commonly encountered in software development"));
    }

    #[test]
    fn test_glossary_is_deterministic() {
        let a = GlossaryExplainer.explain("cache", "The cache is warm.").unwrap();
        let b = GlossaryExplainer.explain("cache", "The cache is warm.").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_truncate_long_sentence_in_note() {
        let long = "word ".repeat(40);
        let e = GlossaryExplainer.explain("api", &long).unwrap();
        assert!(e.technical_note.unwrap().contains("..."));
    }

    #[test]
    fn test_truncate_is_char_safe() {
        let cjk = "这是一个很长的中文句子，".repeat(10);
        // Must not split a multi-byte char.
        let e = GlossaryExplainer.explain("api", &cjk).unwrap();
        assert!(e.technical_note.is_some());
    }
}
