#![forbid(unsafe_code)]

use time::OffsetDateTime;

pub(in crate::store) fn now_unix() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}
