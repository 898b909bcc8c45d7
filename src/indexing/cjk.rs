//! Bigram tokenizer for Chinese, Japanese and Korean text.
//!
//! Runs of CJK characters become overlapping bigrams (a run of one character
//! stays a unigram). Other letters and digits form whole-word tokens. Every
//! token gets its own position, so phrase queries work on the result.

use tantivy::tokenizer::{Token, TokenStream, Tokenizer};

/// True for Han, Hiragana, Katakana and Hangul characters.
pub fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x11FF
        | 0x3040..=0x309F
        | 0x30A0..=0x30FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xAC00..=0xD7AF
        | 0xF900..=0xFAFF
        | 0x20000..=0x2A6DF)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Cjk,
    Word,
    Separator,
}

fn char_class(c: char) -> CharClass {
    if is_cjk(c) {
        CharClass::Cjk
    } else if c.is_alphanumeric() || c == '_' {
        CharClass::Word
    } else {
        CharClass::Separator
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CjkBigramTokenizer;

pub struct CjkTokenStream {
    tokens: std::vec::IntoIter<Token>,
    token: Token,
}

fn push(tokens: &mut Vec<Token>, text: &str, from: usize, to: usize) {
    tokens.push(Token {
        offset_from: from,
        offset_to: to,
        position: tokens.len(),
        text: text[from..to].to_string(),
        position_length: 1,
    });
}

/// Emits the tokens of one run of same-class characters, given as byte offsets.
fn emit_run(tokens: &mut Vec<Token>, text: &str, class: CharClass, run: &[usize], end: usize) {
    match class {
        CharClass::Separator => {}
        CharClass::Word => push(tokens, text, run[0], end),
        CharClass::Cjk if run.len() == 1 => push(tokens, text, run[0], end),
        CharClass::Cjk => {
            for (i, &from) in run.iter().enumerate().take(run.len() - 1) {
                let to = run.get(i + 2).copied().unwrap_or(end);
                push(tokens, text, from, to);
            }
        }
    }
}

pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut run: Vec<usize> = Vec::new();
    let mut class = CharClass::Separator;
    for (offset, c) in text.char_indices() {
        let next = char_class(c);
        if next != class && !run.is_empty() {
            emit_run(&mut tokens, text, class, &run, offset);
            run.clear();
        }
        class = next;
        run.push(offset);
    }
    if !run.is_empty() {
        emit_run(&mut tokens, text, class, &run, text.len());
    }
    tokens
}

impl Tokenizer for CjkBigramTokenizer {
    type TokenStream<'a> = CjkTokenStream;

    fn token_stream<'a>(&'a mut self, text: &'a str) -> CjkTokenStream {
        CjkTokenStream { tokens: tokenize(text).into_iter(), token: Token::default() }
    }
}

impl TokenStream for CjkTokenStream {
    fn advance(&mut self) -> bool {
        match self.tokens.next() {
            Some(token) => {
                self.token = token;
                true
            }
            None => false,
        }
    }

    fn token(&self) -> &Token {
        &self.token
    }

    fn token_mut(&mut self) -> &mut Token {
        &mut self.token
    }
}
