#![forbid(unsafe_code)]

use super::query::Select;
use cm_core::auth::Caller;

/// Restricts `select` to the jobs `caller` may see.
///
/// Must run before any caller-supplied filter is applied.
pub fn scope_to_caller(select: Select, caller: Option<&Caller>) -> Select {
    match caller {
        Some(caller) if !caller.is_admin() => select.where_eq("job.user", caller.username.clone()),
        _ => select,
    }
}
