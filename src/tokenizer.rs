/// Tokens shorter than this are counted but never scored
pub const MIN_SCORING_LEN: usize = 2;

/// Share of symbol characters above which an update looks like keyboard mashing
pub const MASHING_RATIO: f64 = 0.4;

/// The mashing check only applies to texts strictly longer than this
pub const MASHING_MIN_LEN: usize = 20;

/// Result of scanning the full editor text for one update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scan {
    /// The update looks like mashing, skip scoring entirely
    Mashing,
    /// Lowercase word tokens in order of appearance
    Words(Vec<String>),
}

/// Word characters are the ASCII `\w` class: letters, digits and underscore
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Split `text` into lowercase word tokens, keeping their order
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut tokens = Vec::new();
    let mut current = String::new();

    for c in lowered.chars() {
        if is_word_char(c) {
            current.push(c);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// True when the text is long enough and dominated by symbols
pub fn is_mashing(text: &str) -> bool {
    let length = text.chars().count();
    if length <= MASHING_MIN_LEN {
        return false;
    }

    let symbols = text
        .chars()
        .filter(|&c| !is_word_char(c) && !c.is_whitespace())
        .count();

    symbols as f64 / length as f64 > MASHING_RATIO
}

/// Apply the mashing gate, then tokenize
pub fn scan(text: &str) -> Scan {
    if is_mashing(text) {
        Scan::Mashing
    } else {
        Scan::Words(tokenize(text))
    }
}

/// Whether a token is long enough to earn points
pub fn is_scoring_token(token: &str) -> bool {
    token.len() >= MIN_SCORING_LEN
}
