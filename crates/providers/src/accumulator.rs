//! Tool-call accumulator — stitches streamed fragments into complete calls.
//!
//! Tool-calling transports split one call across many deltas: the id and
//! the first piece of the name arrive in one chunk, the argument JSON
//! trickles in over the following ones, and parallel calls interleave,
//! distinguished only by an integer slot index. The accumulator is a fold
//! over those fragments: same-index name and argument substrings are
//! concatenated in arrival order, and no call is considered ready until
//! the stream has ended.

use codecrew_core::message::MessageToolCall;
use std::collections::BTreeMap;

/// One streamed fragment of a tool call, tagged by its slot index.
#[derive(Debug, Clone, Default)]
pub struct CallFragment {
    /// Slot index distinguishing parallel calls within one response.
    pub index: u32,
    /// Call id, present only in the fragment that opens the slot.
    pub id: Option<String>,
    /// A piece of the tool name.
    pub name: Option<String>,
    /// A piece of the raw argument text.
    pub arguments: Option<String>,
}

impl CallFragment {
    /// A fragment carrying a complete call in one piece (the
    /// non-streaming path).
    pub fn complete(index: u32, call: &MessageToolCall) -> Self {
        Self {
            index,
            id: Some(call.id.clone()),
            name: Some(call.name.clone()),
            arguments: Some(call.arguments.clone()),
        }
    }
}

/// Accumulates fragments into a slot → call mapping.
#[derive(Debug, Default)]
pub struct CallAccumulator {
    slots: BTreeMap<u32, PartialCall>,
}

#[derive(Debug, Default)]
struct PartialCall {
    id: String,
    name: String,
    arguments: String,
}

impl CallAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one fragment in. Name and argument substrings concatenate in
    /// arrival order; the id is taken from whichever fragment carries it.
    pub fn feed(&mut self, fragment: CallFragment) {
        let slot = self.slots.entry(fragment.index).or_default();
        if let Some(id) = fragment.id {
            slot.id = id;
        }
        if let Some(name) = fragment.name {
            slot.name.push_str(&name);
        }
        if let Some(args) = fragment.arguments {
            slot.arguments.push_str(&args);
        }
    }

    /// Whether any fragments have been seen.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Finalize: the stream has ended, every slot becomes one immutable
    /// call, ordered by slot index.
    pub fn finish(self) -> Vec<MessageToolCall> {
        self.slots
            .into_values()
            .map(|slot| MessageToolCall {
                id: slot.id,
                name: slot.name,
                arguments: slot.arguments,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(index: u32, id: Option<&str>, name: Option<&str>, args: Option<&str>) -> CallFragment {
        CallFragment {
            index,
            id: id.map(String::from),
            name: name.map(String::from),
            arguments: args.map(String::from),
        }
    }

    #[test]
    fn split_name_and_arguments_reassemble() {
        let mut acc = CallAccumulator::new();
        acc.feed(frag(0, Some("call_1"), Some("wri"), None));
        acc.feed(frag(0, None, Some("te_file"), None));
        acc.feed(frag(0, None, None, Some("{\"a\":")));
        acc.feed(frag(0, None, None, Some("1}")));

        let calls = acc.finish();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "call_1");
        assert_eq!(calls[0].name, "write_file");
        assert_eq!(calls[0].arguments, "{\"a\":1}");
    }

    #[test]
    fn parallel_calls_keep_slot_order() {
        let mut acc = CallAccumulator::new();
        // Interleaved arrival: slot 1 opens before slot 0 finishes.
        acc.feed(frag(0, Some("call_a"), Some("get_file_content"), Some("{\"file_path\"")));
        acc.feed(frag(1, Some("call_b"), Some("get_files_info"), Some("{}")));
        acc.feed(frag(0, None, None, Some(":\"main.py\"}")));

        let calls = acc.finish();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].id, "call_a");
        assert_eq!(calls[0].arguments, "{\"file_path\":\"main.py\"}");
        assert_eq!(calls[1].id, "call_b");
        assert_eq!(calls[1].name, "get_files_info");
    }

    #[test]
    fn complete_call_list_in_one_shot() {
        let original = vec![
            MessageToolCall {
                id: "call_1".into(),
                name: "delete_file".into(),
                arguments: "{\"file_path\":\"old.py\"}".into(),
            },
            MessageToolCall {
                id: "call_2".into(),
                name: "run_script".into(),
                arguments: "{\"file_path\":\"main.py\"}".into(),
            },
        ];

        let mut acc = CallAccumulator::new();
        for (i, call) in original.iter().enumerate() {
            acc.feed(CallFragment::complete(i as u32, call));
        }
        assert_eq!(acc.finish(), original);
    }

    #[test]
    fn empty_stream_yields_no_calls() {
        let acc = CallAccumulator::new();
        assert!(acc.is_empty());
        assert!(acc.finish().is_empty());
    }

    #[test]
    fn unparseable_arguments_still_finalize() {
        // The accumulator does not validate JSON; the dispatcher decides
        // what to do with garbage argument text.
        let mut acc = CallAccumulator::new();
        acc.feed(frag(0, Some("call_1"), Some("write_file"), Some("{not json")));
        let calls = acc.finish();
        assert_eq!(calls[0].arguments, "{not json");
    }
}
