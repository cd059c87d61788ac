//! Question provider adapters.

pub mod mock;
pub mod question_bank;

pub use mock::{MockQuestionProvider, MockResponse};
pub use question_bank::{BankQuestion, QuestionBank, QuestionBankError};
