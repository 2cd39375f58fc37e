pub mod answer;
pub mod attempt;
pub mod question;
#[allow(clippy::module_inception)]
pub mod quiz;
pub mod response;
pub mod response_answer;
