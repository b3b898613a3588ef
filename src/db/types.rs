use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Teacher,
    Student,
}

/// Categorical exam tag used purely for filtering; scoring rules do not
/// differ between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "examtype", rename_all = "UPPERCASE")]
pub(crate) enum ExamType {
    Neet,
    Jee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "answeroption", rename_all = "lowercase")]
pub(crate) enum AnswerOption {
    A,
    B,
    C,
    D,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exam_type_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&ExamType::Neet).unwrap(), "\"NEET\"");
        assert_eq!(serde_json::to_string(&ExamType::Jee).unwrap(), "\"JEE\"");
        assert!(serde_json::from_str::<ExamType>("\"SAT\"").is_err());
    }

    #[test]
    fn answer_option_is_a_closed_lowercase_set() {
        assert_eq!(serde_json::to_string(&AnswerOption::C).unwrap(), "\"c\"");
        assert!(serde_json::from_str::<AnswerOption>("\"e\"").is_err());
        assert!(serde_json::from_str::<AnswerOption>("\"A\"").is_err());
    }
}
