/// Deterministic text → chunk strategy.
pub trait Splitter: Send + Sync {
    fn split(&self, text: &str) -> Vec<String>;
}

/// One chunk per non-empty line, trimmed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineSplitter;

impl Splitter for LineSplitter {
    fn split(&self, text: &str) -> Vec<String> {
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct SplitterConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub sentence_aware: bool,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            sentence_aware: true,
        }
    }
}

/// Sentence-merging or fixed character window splitter with overlap.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    #[must_use]
    pub fn new(config: SplitterConfig) -> Self {
        Self { config }
    }
}

impl Splitter for TextSplitter {
    fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let SplitterConfig {
            chunk_size,
            chunk_overlap,
            sentence_aware,
        } = self.config;

        let chunks = if sentence_aware {
            merge_sentences(&split_sentences(text), chunk_size, chunk_overlap)
        } else {
            split_chars(text, chunk_size, chunk_overlap)
        };
        chunks
            .into_iter()
            .filter(|c| !c.trim().is_empty())
            .collect()
    }
}

fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let next = chars.peek().copied();

        if c == '\n' && next == Some('\n') {
            current.push('\n');
            chars.next();
            if !current.trim().is_empty() {
                sentences.push(std::mem::take(&mut current));
            }
        } else if matches!(c, '.' | '?' | '!') && next == Some(' ') && !current.trim().is_empty()
        {
            sentences.push(std::mem::take(&mut current));
        }
    }

    if !current.trim().is_empty() {
        sentences.push(current);
    }
    sentences
}

fn merge_sentences(sentences: &[String], chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut window_start = 0;

    for (idx, sentence) in sentences.iter().enumerate() {
        if !current.is_empty() && current.len() + sentence.len() > chunk_size {
            chunks.push(std::mem::take(&mut current));

            let mut overlap_len = 0;
            let mut overlap_start = idx;
            for i in (window_start..idx).rev() {
                if overlap_len + sentences[i].len() > chunk_overlap {
                    break;
                }
                overlap_len += sentences[i].len();
                overlap_start = i;
            }
            for s in &sentences[overlap_start..idx] {
                current.push_str(s);
            }
            window_start = overlap_start;
        }
        current.push_str(sentence);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn split_chars(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let size = chunk_size.max(1);
    let step = size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}
