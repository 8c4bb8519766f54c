#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use svgedit_core::{EngineCapabilities, NodeId};
use svgedit_runtime::{BlurEditor, BlurError, FilterResource, HistoryConfig, SvgCanvas};

#[derive(Debug, Arbitrary)]
enum Op {
    Set { tenths: u16, complete: bool },
    Begin { tenths: u16 },
    Preview { tenths: u16 },
    Commit,
    Select { target: u8 },
    ClearSelection,
    Undo,
    Redo,
    Raw { bits: u64 },
}

#[derive(Debug, Arbitrary)]
struct Input {
    stale_filter_cache: bool,
    ops: Vec<Op>,
}

const TARGETS: [&str; 3] = ["a", "b", "c"];

fuzz_target!(|input: Input| {
    let caps = EngineCapabilities::generic().with_stale_filter_cache(input.stale_filter_cache);
    let mut editor = BlurEditor::new(caps);
    let mut canvas = SvgCanvas::with_history(HistoryConfig::new(16, 0));
    let targets: Vec<NodeId> = TARGETS
        .iter()
        .map(|id| canvas.add_element("rect", [("id", *id)]).expect("root accepts children"))
        .collect();
    canvas.select(targets[0]);

    for op in input.ops.iter().take(256) {
        let result = match *op {
            Op::Set { tenths, complete } => editor
                .set_blur(&mut canvas, f64::from(tenths) / 10.0, complete)
                .map(drop),
            Op::Begin { tenths } => editor
                .begin_edit(&mut canvas, f64::from(tenths) / 10.0)
                .map(drop),
            Op::Preview { tenths } => editor.update_preview(&mut canvas, f64::from(tenths) / 10.0),
            Op::Commit => editor.commit_edit(&mut canvas).map(drop),
            Op::Select { target } => {
                canvas.select(targets[usize::from(target) % targets.len()]);
                Ok(())
            }
            Op::ClearSelection => {
                canvas.clear_selection();
                Ok(())
            }
            Op::Undo => editor.commit_all(&mut canvas).map(|_| {
                if let Some(result) = canvas.undo() {
                    result.expect("undo of recorded blur succeeds");
                }
            }),
            Op::Redo => editor.commit_all(&mut canvas).map(|_| {
                if let Some(result) = canvas.redo() {
                    result.expect("redo of recorded blur succeeds");
                }
            }),
            Op::Raw { bits } => editor
                .set_blur(&mut canvas, f64::from_bits(bits), true)
                .map(drop),
        };

        match result {
            Ok(())
            | Err(BlurError::NoSelection)
            | Err(BlurError::InvalidDeviation(_))
            | Err(BlurError::TransactionOpen { .. }) => {}
            Err(other) => panic!("unexpected blur error: {other}"),
        }

        // At most one resource per target, and a referenced one exists.
        for (node, id) in targets.iter().zip(TARGETS) {
            let resource = FilterResource::locate(canvas.document(), id)
                .expect("resources stay well formed");
            if canvas.document().attribute(*node, "filter").is_some() {
                assert!(resource.is_some(), "filter references a missing resource");
            }
        }
    }
});
