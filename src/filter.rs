use regex::Regex;

/// Keywords that mark an item as AI news.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "ai",
    "a.i.",
    "artificial intelligence",
    "machine learning",
    "ml",
    "neural",
    "deep learning",
    "generative",
    "genai",
    "foundation model",
    "llm",
    "gpt",
    "openai",
    "anthropic",
    "deepmind",
    "meta ai",
    "cohere",
    "mistral",
    "stability ai",
    "rag",
    "vector db",
    "fine-tune",
    "prompt",
    "inference",
    "token",
    "transformer",
    "diffusion",
];

/// Keywords this short are abbreviations and must match as whole words.
const WORD_KEYWORD_MAX_LEN: usize = 3;

#[derive(Debug)]
enum Keyword {
    Word(Regex),
    Phrase(String),
}

impl Keyword {
    fn new(keyword: &str) -> Option<Self> {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return None;
        }
        if keyword.chars().count() <= WORD_KEYWORD_MAX_LEN {
            let pattern = format!(r"\b{}\b", regex::escape(&keyword));
            // An escaped literal always compiles
            Regex::new(&pattern).ok().map(Keyword::Word)
        } else {
            Some(Keyword::Phrase(keyword))
        }
    }

    fn matches(&self, text: &str) -> bool {
        match self {
            Keyword::Word(re) => re.is_match(text),
            Keyword::Phrase(phrase) => text.contains(phrase.as_str()),
        }
    }
}

/// Keyword relevance test over an item's title and body text.
#[derive(Debug)]
pub struct TopicFilter {
    keywords: Vec<Keyword>,
}

impl TopicFilter {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        Self {
            keywords: keywords
                .iter()
                .filter_map(|k| Keyword::new(k.as_ref()))
                .collect(),
        }
    }

    pub fn is_relevant(&self, title: &str, text: &str) -> bool {
        let haystack = format!("{} {}", title, text).to_lowercase();
        self.keywords.iter().any(|k| k.matches(&haystack))
    }
}

impl Default for TopicFilter {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS)
    }
}
