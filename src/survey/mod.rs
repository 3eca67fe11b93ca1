// Survey domain: questions, the scoring flow, and the answer log.

pub mod answers;
pub mod flow;
pub mod question;

pub use answers::{ANSWERS_FILE, LogSummary, append_answer, count_rows, summarize};
pub use flow::{FlowOutcome, ScoreFlow};
pub use question::{PresentationStyle, Question, Questionnaire};
