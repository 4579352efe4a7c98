pub(crate) mod answers;
pub(crate) mod attempts;
pub(crate) mod categories;
pub(crate) mod health;
pub(crate) mod questions;
pub(crate) mod results;
pub(crate) mod statistics;
pub(crate) mod user_answers;
pub(crate) mod users;
