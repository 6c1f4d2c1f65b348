use serde::{Deserialize, Serialize};

/// Full description of a coding problem as returned by the problem bank.
///
/// `content` is null in the bank for locked problems, so it stays optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemDetail {
    pub title: String,
    pub difficulty: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(rename = "exampleTestcases", default)]
    pub example_testcases: Option<String>,
}
