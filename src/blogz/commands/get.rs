use crate::commands::CmdResult;
use crate::error::Result;
use crate::store::DataStore;

pub fn run<S: DataStore>(store: &S, id: &str) -> Result<CmdResult> {
    let post = store.load(id.trim())?;
    Ok(CmdResult::default().with_affected_posts(vec![post]))
}
