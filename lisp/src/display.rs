// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Module that implements Display for forwarding entries, and the diagnostics
//! built on it

use crate::entry::{EntryFwd, FwdEntry, FwdEntryKind, NegativeAction};
use crate::manager::LispGpe;
use crate::paths::Path;
use crate::pool::{FwdEntryIndex, slot_of};
use std::fmt::Display;

impl Display for NegativeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NegativeAction::NoAction => write!(f, "no-action"),
            NegativeAction::ForwardNative => write!(f, "natively-forward"),
            NegativeAction::SendMapRequest => write!(f, "send-map-request"),
            NegativeAction::Drop => write!(f, "drop"),
        }
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "priority:{} weight:{} {}",
            self.priority, self.weight, self.adjacency
        )
    }
}

/// An entry as shown by the diagnostics
pub(crate) struct EntryFmt<'a> {
    pub(crate) index: FwdEntryIndex,
    pub(crate) entry: &'a FwdEntry,
    pub(crate) detail: bool,
}

impl Display for EntryFmt<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entry = self.entry;
        let key = &entry.key;
        match &entry.fwd {
            EntryFwd::Ip(fwd) => write!(f, "VNI:{} VRF:{}", key.vni, fwd.eid_table_id)?,
            EntryFwd::L2(fwd) => write!(f, "VNI:{} BD:{}", key.vni, fwd.bd_id)?,
        }
        write!(
            f,
            " EID: {} -> {}  [index:{}]",
            key.local,
            key.remote,
            slot_of(self.index)
        )?;
        match entry.kind {
            FwdEntryKind::Negative(action) => write!(f, "\n Negative - action:{action}")?,
            FwdEntryKind::Normal => {
                write!(f, "\n via:")?;
                for path in &entry.paths {
                    write!(f, "\n  {path}")?;
                }
            }
        }
        if !self.detail {
            return Ok(());
        }
        match &entry.fwd {
            EntryFwd::L2(fwd) => {
                if let Some(child) = &fwd.child {
                    write!(f, "\n fib-path-list:{}", child.pathlist().index())?;
                }
                if let Some(dpo) = &fwd.dpo {
                    write!(f, "\n dpo:{dpo}")?;
                }
            }
            EntryFwd::Ip(fwd) => {
                write!(f, "\n eid-fib-index:{}", fwd.eid_fib.index())?;
                if let Some(src_fib) = &fwd.src_fib {
                    write!(f, "\n src-fib-index:{}", src_fib.index())?;
                }
            }
        }
        Ok(())
    }
}

impl LispGpe {
    /// Show the entry in a pool slot, in detail
    #[must_use]
    pub fn show_entry(&self, slot: usize) -> String {
        match self.entries.get_by_slot(slot) {
            Some((index, entry)) => EntryFmt {
                index,
                entry,
                detail: true,
            }
            .to_string(),
            None => format!("entry {slot} invalid"),
        }
    }

    /// Show every entry, or those of a vni, one summary per entry
    #[must_use]
    pub fn show_entries(&self, vni: Option<u32>) -> String {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, e)| vni.is_none_or(|vni| e.key.vni == vni))
            .collect();
        entries.sort_by_key(|(index, _)| slot_of(*index));
        entries
            .into_iter()
            .map(|(index, entry)| {
                EntryFmt {
                    index,
                    entry,
                    detail: false,
                }
                .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Display for LispGpe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} entries:{}", self.params().name, self.entries.len())?;
        let all = self.show_entries(None);
        if !all.is_empty() {
            writeln!(f, "{all}")?;
        }
        Ok(())
    }
}
