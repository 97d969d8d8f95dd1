use crate::cell::MAX_NUMBER;
use crate::error::{LogicError, LogicResult};

/// One word of a clause element, already classified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Word {
    Const(String),
    Number(i64),
    Var(String),
    /// `X holds f a b`: the element is the structure bound to `X`.
    Holds(String),
    /// `X lists a b c`: sugar for a chain of `holds list` elements.
    Lists(String),
}

/// A head, goal, or equation: the words between `if`/`and` separators.
pub type Element = Vec<Word>;

/// One clause: head element first, then body elements.
pub type Sentence = Vec<Element>;

const IF: &str = "if";
const AND: &str = "and";
const HOLDS: &str = "holds";
const LISTS: &str = "lists";
const IS: &str = "is";

/// Tokenizer for the sentence source format:
///
/// ```text
/// add 0 X X .
/// add _0 Y _1 and _0 holds s X and _1 holds s Z if add X Y Z .
/// goal R if add _0 _1 R and _0 holds s 0 and _1 holds s 0 .
/// ```
pub struct Reader<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(input: &'a str) -> Self {
        Reader { input, pos: 0 }
    }

    /// Read one sentence. Returns None at EOF.
    pub fn read_sentence(&mut self) -> LogicResult<Option<Sentence>> {
        let mut sentence: Sentence = Vec::new();
        let mut element: Element = Vec::new();
        let start = self.pos;

        loop {
            self.skip_whitespace_and_comments();
            let Some(ch) = self.peek() else {
                if sentence.is_empty() && element.is_empty() {
                    return Ok(None);
                }
                return Err(self.error_at(start, "sentence is missing its final '.'"));
            };

            if ch == '.' {
                self.advance();
                self.close_element(&mut sentence, element)?;
                return Ok(Some(sentence));
            }

            if !is_word_char(ch) {
                self.advance();
                element.push(Word::Const(ch.to_string()));
                continue;
            }

            let word = self.read_word();
            match word {
                IF | AND => {
                    self.close_element(&mut sentence, std::mem::take(&mut element))?;
                }
                HOLDS => {
                    let var = self.marker_target(&element, HOLDS)?;
                    element[0] = Word::Holds(var);
                }
                LISTS => {
                    let var = self.marker_target(&element, LISTS)?;
                    element[0] = Word::Lists(var);
                }
                IS => {
                    return Err(LogicError::Unsupported(format!(
                        "arithmetic 'is' at line {}",
                        self.line_of(self.pos)
                    )));
                }
                _ => element.push(classify(word)),
            }
        }
    }

    /// Read all sentences from input.
    pub fn read_all(&mut self) -> LogicResult<Vec<Sentence>> {
        let mut sentences = Vec::new();
        while let Some(sentence) = self.read_sentence()? {
            sentences.push(sentence);
        }
        Ok(sentences)
    }

    fn close_element(&self, sentence: &mut Sentence, element: Element) -> LogicResult<()> {
        if element.is_empty() {
            return Err(self.error_at(self.pos, "empty clause element"));
        }
        sentence.push(element);
        Ok(())
    }

    /// The variable a `holds`/`lists` marker applies to: the single word
    /// preceding it in the element.
    fn marker_target(&self, element: &Element, marker: &str) -> LogicResult<String> {
        match element.as_slice() {
            [Word::Var(name)] => Ok(name.clone()),
            _ => Err(self.error_at(
                self.pos,
                &format!("'{}' must follow exactly one variable", marker),
            )),
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn read_word(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if !is_word_char(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
        let input = self.input;
        &input[start..self.pos]
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while let Some(ch) = self.peek() {
                if ch.is_whitespace() {
                    self.advance();
                } else {
                    break;
                }
            }
            match (self.peek(), self.peek_second()) {
                (Some('/'), Some('/')) => {
                    while let Some(ch) = self.advance() {
                        if ch == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    self.pos += 2;
                    match self.input[self.pos..].find("*/") {
                        Some(end) => self.pos += end + 2,
                        None => self.pos = self.input.len(),
                    }
                }
                _ => break,
            }
        }
    }

    fn line_of(&self, pos: usize) -> usize {
        1 + self.input[..pos.min(self.input.len())]
            .bytes()
            .filter(|&b| b == b'\n')
            .count()
    }

    fn error_at(&self, pos: usize, msg: &str) -> LogicError {
        LogicError::ReadError(format!("{} (line {})", msg, self.line_of(pos)))
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn classify(word: &str) -> Word {
    let first = word.chars().next().unwrap_or('_');
    if first.is_uppercase() || first == '_' {
        return Word::Var(word.to_string());
    }
    match word.parse::<i64>() {
        Ok(n) if n.abs() < MAX_NUMBER => Word::Number(n),
        _ => Word::Const(word.to_string()),
    }
}

/// Tokenize a whole program.
pub fn read_program(input: &str) -> LogicResult<Vec<Sentence>> {
    Reader::new(input).read_all()
}
