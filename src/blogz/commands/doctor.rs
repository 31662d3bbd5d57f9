use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::DataStore;

pub fn run<S: DataStore>(store: &mut S) -> Result<CmdResult> {
    let report = store.reconcile()?;
    let mut result = CmdResult::default();

    if report.repairs() == 0 {
        result.add_message(CmdMessage::success("No inconsistencies found."));
    } else {
        result.add_message(CmdMessage::warning("Inconsistencies found and fixed:"));
        if report.removed_entries > 0 {
            result.add_message(CmdMessage::info(format!(
                "  - Removed {} index entr(y/ies) whose post file is missing.",
                report.removed_entries
            )));
        }
        if report.recovered_entries > 0 {
            result.add_message(CmdMessage::success(format!(
                "  - Recovered {} post(s) found on disk but missing from the index.",
                report.recovered_entries
            )));
        }
        if report.refreshed_entries > 0 {
            result.add_message(CmdMessage::info(format!(
                "  - Refreshed {} stale index entr(y/ies).",
                report.refreshed_entries
            )));
        }
        if report.discarded_index_entries > 0 {
            result.add_message(CmdMessage::info(format!(
                "  - Discarded {} malformed index entr(y/ies).",
                report.discarded_index_entries
            )));
        }
    }

    if report.unreadable_files > 0 {
        result.add_message(CmdMessage::error(format!(
            "{} post file(s) could not be read and were left untouched. Run with --verbose for details.",
            report.unreadable_files
        )));
    }

    Ok(result)
}
