use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::DataStore;

pub fn run<S: DataStore>(store: &mut S, id: &str) -> Result<CmdResult> {
    let id = id.trim();
    store.delete(id)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Deleted post '{}'", id)));
    Ok(result)
}
