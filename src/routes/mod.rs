pub(crate) use claude::relay_claude;
pub(crate) use health_check::health_check;

mod claude;
mod health_check;
