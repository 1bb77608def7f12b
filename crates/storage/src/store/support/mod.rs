#![forbid(unsafe_code)]

mod clock;
mod schema;

pub(super) use clock::now_unix;
pub(super) use schema::install_schema;
