mod context;
mod router;

pub(crate) use context::BotContext;
pub(crate) use router::process_update;
