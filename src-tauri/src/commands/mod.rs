pub mod advice;
pub mod assessment;
