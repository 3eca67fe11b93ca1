// Survey questions and the questionnaire file.
//
// QUESTNS.TXT, one question per line, '#' comments:
//   code;style;min;max;prompt
// style is bar | steps | emoji | volume. Bad lines are skipped.
// Without a usable file the built-in questionnaire is used.

use core::fmt;

use log::{info, warn};

use crate::drivers::storage::{FileStore, StorageError};
use crate::settings::trim;

pub const QUESTIONS_FILE: &str = "QUESTNS.TXT";

pub const MAX_QUESTIONS: usize = 16;
pub const CODE_CAP: usize = 8;
pub const PROMPT_CAP: usize = 64;

// widest scale any style can lay out
pub const MAX_SPAN: i16 = 10;
pub const MAX_EMOJI_STEPS: i16 = 7;

const FILE_BUF: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationStyle {
    /// Outlined bar filled in proportion to the score.
    PlainBar,
    /// One cell per score value.
    SteppedBar,
    /// A row of faces, frowning to smiling.
    Emoji,
    /// Rising bars like a volume meter.
    VolumeBar,
}

impl PresentationStyle {
    pub fn from_name(s: &[u8]) -> Option<Self> {
        match s {
            b"bar" => Some(Self::PlainBar),
            b"steps" => Some(Self::SteppedBar),
            b"emoji" => Some(Self::Emoji),
            b"volume" => Some(Self::VolumeBar),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionError {
    BadCode,
    BadRange,
    BadStyle,
    MissingField,
    BadNumber,
}

impl fmt::Display for QuestionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QuestionError::BadCode => "variable code must be 1-8 of [A-Za-z0-9_]",
            QuestionError::BadRange => "need min < max within the style's span",
            QuestionError::BadStyle => "unknown style",
            QuestionError::MissingField => "expected code;style;min;max;prompt",
            QuestionError::BadNumber => "min/max not a number",
        })
    }
}

#[derive(Clone, Copy)]
pub struct Question {
    code: [u8; CODE_CAP],
    code_len: u8,
    prompt: [u8; PROMPT_CAP],
    prompt_len: u8,
    pub min: i16,
    pub max: i16,
    pub style: PresentationStyle,
}

impl Question {
    pub const EMPTY: Self = Self {
        code: [0u8; CODE_CAP],
        code_len: 0,
        prompt: [0u8; PROMPT_CAP],
        prompt_len: 0,
        min: 0,
        max: 1,
        style: PresentationStyle::PlainBar,
    };

    pub fn new(
        code: &str,
        prompt: &str,
        min: i16,
        max: i16,
        style: PresentationStyle,
    ) -> Result<Self, QuestionError> {
        let cb = code.as_bytes();
        if cb.is_empty()
            || cb.len() > CODE_CAP
            || !cb.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'_')
        {
            return Err(QuestionError::BadCode);
        }

        let span = max as i32 - min as i32;
        let limit = match style {
            PresentationStyle::Emoji => MAX_EMOJI_STEPS - 1,
            _ => MAX_SPAN,
        };
        if span <= 0 || span > limit as i32 {
            return Err(QuestionError::BadRange);
        }

        let mut q = Self::EMPTY;
        q.code[..cb.len()].copy_from_slice(cb);
        q.code_len = cb.len() as u8;

        // truncate on a char boundary
        let mut n = prompt.len().min(PROMPT_CAP);
        while !prompt.is_char_boundary(n) {
            n -= 1;
        }
        q.prompt[..n].copy_from_slice(&prompt.as_bytes()[..n]);
        q.prompt_len = n as u8;

        q.min = min;
        q.max = max;
        q.style = style;
        Ok(q)
    }

    pub fn code(&self) -> &str {
        core::str::from_utf8(&self.code[..self.code_len as usize]).unwrap_or("?")
    }

    pub fn prompt(&self) -> &str {
        core::str::from_utf8(&self.prompt[..self.prompt_len as usize]).unwrap_or("")
    }
}

impl fmt::Debug for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Question")
            .field("code", &self.code())
            .field("min", &self.min)
            .field("max", &self.max)
            .field("style", &self.style)
            .finish()
    }
}

const BUILTIN: [(&str, &str, i16, i16, PresentationStyle); 4] = [
    ("mood", "How do you feel right now?", 1, 5, PresentationStyle::Emoji),
    ("energy", "How much energy do you have?", 1, 7, PresentationStyle::SteppedBar),
    ("stress", "How stressed are you?", 0, 10, PresentationStyle::PlainBar),
    ("focus", "How well can you concentrate?", 1, 5, PresentationStyle::VolumeBar),
];

pub struct Questionnaire {
    items: [Question; MAX_QUESTIONS],
    count: usize,
}

impl Default for Questionnaire {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Questionnaire {
    pub const fn empty() -> Self {
        Self {
            items: [Question::EMPTY; MAX_QUESTIONS],
            count: 0,
        }
    }

    pub fn builtin() -> Self {
        let mut qs = Self::empty();
        for (code, prompt, min, max, style) in BUILTIN {
            if let Ok(q) = Question::new(code, prompt, min, max, style) {
                qs.push(q);
            }
        }
        qs
    }

    fn push(&mut self, q: Question) -> bool {
        if self.count >= MAX_QUESTIONS {
            return false;
        }
        self.items[self.count] = q;
        self.count += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn get(&self, idx: usize) -> Option<&Question> {
        self.items[..self.count].get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.items[..self.count].iter()
    }

    /// Parse questionnaire text; malformed lines are logged and skipped.
    pub fn parse(data: &[u8]) -> Self {
        let mut qs = Self::empty();
        for (lineno, line) in data.split(|&b| b == b'\n').enumerate() {
            let line = trim(line);
            if line.is_empty() || line[0] == b'#' {
                continue;
            }
            match parse_line(line) {
                Ok(q) => {
                    if !qs.push(q) {
                        warn!("questions: more than {}, rest ignored", MAX_QUESTIONS);
                        break;
                    }
                }
                Err(e) => warn!("questions: line {}: {}", lineno + 1, e),
            }
        }
        qs
    }

    /// Questionnaire from the card, or the built-in one.
    pub fn load<S: FileStore>(store: &S) -> Self {
        let mut buf = [0u8; FILE_BUF];
        let n = match store.read_chunk(QUESTIONS_FILE, 0, &mut buf) {
            Ok(n) => n,
            Err(StorageError::NotFound) => {
                info!("questions: no {}, using built-in", QUESTIONS_FILE);
                return Self::builtin();
            }
            Err(e) => {
                warn!("questions: read failed: {}", e);
                return Self::builtin();
            }
        };

        // a full buffer may end mid-line; drop the partial tail
        let mut text = &buf[..n];
        if n == FILE_BUF
            && let Some(nl) = text.iter().rposition(|&b| b == b'\n')
        {
            text = &text[..nl];
        }

        let qs = Self::parse(text);
        if qs.is_empty() {
            warn!("questions: {} has no valid lines, using built-in", QUESTIONS_FILE);
            return Self::builtin();
        }
        info!("questions: {} loaded from {}", qs.len(), QUESTIONS_FILE);
        qs
    }
}

fn parse_i16(s: &[u8]) -> Option<i16> {
    core::str::from_utf8(s).ok()?.parse().ok()
}

fn parse_line(line: &[u8]) -> Result<Question, QuestionError> {
    // prompt is last and may itself contain ';'
    let mut fields = line.splitn(5, |&b| b == b';');
    let mut next = || fields.next().map(trim).ok_or(QuestionError::MissingField);

    let code = next()?;
    let style = next()?;
    let min = next()?;
    let max = next()?;
    let prompt = next()?;

    let style = PresentationStyle::from_name(style).ok_or(QuestionError::BadStyle)?;
    let min = parse_i16(min).ok_or(QuestionError::BadNumber)?;
    let max = parse_i16(max).ok_or(QuestionError::BadNumber)?;
    let code = core::str::from_utf8(code).map_err(|_| QuestionError::BadCode)?;
    let prompt = core::str::from_utf8(prompt).unwrap_or("");

    Question::new(code, prompt, min, max, style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::storage::mem::MemStore;

    #[test]
    fn builtin_is_valid() {
        let qs = Questionnaire::builtin();
        assert_eq!(qs.len(), BUILTIN.len());
        assert_eq!(qs.get(0).unwrap().code(), "mood");
        let mood = qs.get(0).unwrap();
        assert_eq!((mood.min, mood.max), (1, 5));
    }

    #[test]
    fn parses_lines_and_skips_bad_ones() {
        let text = b"# survey\n\
            c;steps;1;5;Concentration today?\n\
            bad line\n\
            x;sparkles;1;5;nope\n\
            r;bar;5;1;reversed\n\
            w;emoji;1;9;too many faces\n\
            q;volume;-2;2;Prompt; with semicolon\r\n";
        let qs = Questionnaire::parse(text);

        assert_eq!(qs.len(), 2);
        let c = qs.get(0).unwrap();
        assert_eq!(c.code(), "c");
        assert_eq!(c.style, PresentationStyle::SteppedBar);
        assert_eq!((c.min, c.max), (1, 5));
        assert_eq!(c.prompt(), "Concentration today?");

        let q = qs.get(1).unwrap();
        assert_eq!(q.prompt(), "Prompt; with semicolon");
        assert_eq!(q.min, -2);
    }

    #[test]
    fn code_rejects_csv_breakers() {
        let s = PresentationStyle::PlainBar;
        assert_eq!(Question::new("a,b", "p", 0, 1, s).err(), Some(QuestionError::BadCode));
        assert_eq!(Question::new("", "p", 0, 1, s).err(), Some(QuestionError::BadCode));
        assert_eq!(
            Question::new("waytoolong", "p", 0, 1, s).err(),
            Some(QuestionError::BadCode)
        );
        assert_eq!(Question::new("a", "p", 0, 11, s).err(), Some(QuestionError::BadRange));
    }

    #[test]
    fn long_prompt_truncates_on_char_boundary() {
        let long = "ä".repeat(40); // 80 bytes
        let q = Question::new("a", &long, 0, 1, PresentationStyle::PlainBar).unwrap();
        assert_eq!(q.prompt().len(), PROMPT_CAP);
        assert!(q.prompt().chars().all(|c| c == 'ä'));
    }

    #[test]
    fn load_falls_back_to_builtin() {
        let missing = MemStore::new();
        assert_eq!(Questionnaire::load(&missing).len(), BUILTIN.len());

        let junk = MemStore::new().with_file(QUESTIONS_FILE, b"nothing useful\n");
        assert_eq!(Questionnaire::load(&junk).len(), BUILTIN.len());

        let good = MemStore::new().with_file(QUESTIONS_FILE, b"z;bar;0;3;Zed?\n");
        let qs = Questionnaire::load(&good);
        assert_eq!(qs.len(), 1);
        assert_eq!(qs.get(0).unwrap().code(), "z");
    }

    #[test]
    fn caps_at_max_questions() {
        let mut text = std::vec::Vec::new();
        for _ in 0..MAX_QUESTIONS + 3 {
            text.extend_from_slice(b"a;bar;0;1;p\n");
        }
        assert_eq!(Questionnaire::parse(&text).len(), MAX_QUESTIONS);
    }
}
