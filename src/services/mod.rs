pub(crate) mod email;
pub(crate) mod question_extraction;
