//! Domain query functions. Every statement is parameterized; multi-statement
//! writes run inside a transaction.

pub mod applications;
pub mod courses;
pub mod quizzes;
pub mod resources;
pub mod tasks;
pub mod users;
