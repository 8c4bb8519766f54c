#![forbid(unsafe_code)]

//! End-to-end blur editing through the canvas host.
//!
//! Run:
//!   cargo test -p svgedit-runtime --test blur_scenarios

use svgedit_core::{EngineCapabilities, EngineProfile, NodeId};
use svgedit_runtime::blur::resource::filter_url;
use svgedit_runtime::{
    BlurEditor, BlurError, CommitOutcome, EditHost, FilterResource, SetBlurOutcome, SvgCanvas,
};

// ============================================================================
// Helpers
// ============================================================================

fn setup(caps: EngineCapabilities) -> (SvgCanvas, BlurEditor, NodeId) {
    let mut canvas = SvgCanvas::new();
    let rect = canvas
        .add_element("rect", [("id", "rect1"), ("width", "40"), ("height", "20")])
        .unwrap();
    canvas.select(rect);
    (canvas, BlurEditor::new(caps), rect)
}

fn resource(canvas: &SvgCanvas) -> FilterResource {
    FilterResource::locate(canvas.document(), "rect1")
        .unwrap()
        .expect("filter resource exists")
}

fn deviation(canvas: &SvgCanvas) -> Option<f64> {
    resource(canvas).std_deviation(canvas.document())
}

fn filter_attr(canvas: &SvgCanvas, node: NodeId) -> Option<&str> {
    canvas.document().attribute(node, "filter")
}

fn filters_in_defs(canvas: &SvgCanvas) -> usize {
    let doc = canvas.document();
    doc.find_defs()
        .map(|defs| {
            doc.children(defs)
                .iter()
                .filter(|&&c| doc.tag(c) == Some("filter"))
                .count()
        })
        .unwrap_or(0)
}

/// Scenario A: first blur on a bare element.
fn scenario_a(canvas: &mut SvgCanvas, editor: &mut BlurEditor) {
    let outcome = editor.set_blur(canvas, 5.0, true).unwrap();
    assert!(matches!(
        outcome,
        SetBlurOutcome::Finished(CommitOutcome::Recorded { .. })
    ));
}

/// Scenario B: a slider drag from 8 to 10.
fn scenario_b(canvas: &mut SvgCanvas, editor: &mut BlurEditor) {
    assert_eq!(
        editor.set_blur(canvas, 8.0, false).unwrap(),
        SetBlurOutcome::Opened
    );
    editor.update_preview(canvas, 9.0).unwrap();
    editor.update_preview(canvas, 10.0).unwrap();
    let outcome = editor.set_blur(canvas, 10.0, true).unwrap();
    assert!(matches!(
        outcome,
        SetBlurOutcome::Finished(CommitOutcome::Recorded { .. })
    ));
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn scenario_a_creates_resource_and_one_entry() {
    let (mut canvas, mut editor, rect) = setup(EngineCapabilities::generic());
    scenario_a(&mut canvas, &mut editor);

    let res = resource(&canvas);
    let doc = canvas.document();
    assert_eq!(doc.parent(res.filter), doc.find_defs());
    assert_eq!(doc.attribute(res.filter, "id"), Some("rect1_blur"));
    assert_eq!(doc.children(res.filter), &[res.primitive]);
    assert_eq!(doc.tag(res.primitive), Some("feGaussianBlur"));
    assert_eq!(doc.attribute(res.primitive, "stdDeviation"), Some("5"));
    assert_eq!(filter_attr(&canvas, rect), Some("url(#rect1_blur)"));
    assert_eq!(canvas.history().undo_depth(), 1);
    assert!(!editor.is_editing(rect));
}

#[test]
fn scenario_b_coalesces_drag_into_one_entry() {
    let (mut canvas, mut editor, _) = setup(EngineCapabilities::generic());
    scenario_a(&mut canvas, &mut editor);
    scenario_b(&mut canvas, &mut editor);

    assert_eq!(canvas.history().undo_depth(), 2);
    assert_eq!(deviation(&canvas), Some(10.0));

    canvas.undo().unwrap().unwrap();
    assert_eq!(deviation(&canvas), Some(5.0));
    assert_eq!(filters_in_defs(&canvas), 1);
}

#[test]
fn scenario_c_detaches_but_keeps_resource() {
    let (mut canvas, mut editor, rect) = setup(EngineCapabilities::generic());
    scenario_a(&mut canvas, &mut editor);
    scenario_b(&mut canvas, &mut editor);

    let outcome = editor.set_blur(&mut canvas, 0.0, true).unwrap();
    assert!(matches!(
        outcome,
        SetBlurOutcome::Finished(CommitOutcome::Recorded { .. })
    ));
    assert_eq!(filter_attr(&canvas, rect), None);
    assert_eq!(filters_in_defs(&canvas), 1, "resource stays in defs");
    assert_eq!(canvas.history().undo_depth(), 3);

    canvas.undo().unwrap().unwrap();
    assert_eq!(filter_attr(&canvas, rect), Some("url(#rect1_blur)"));
    assert_eq!(deviation(&canvas), Some(10.0));
}

// ============================================================================
// History behaviour
// ============================================================================

#[test]
fn undo_of_first_blur_removes_resource_and_redo_restores_it() {
    let (mut canvas, mut editor, rect) = setup(EngineCapabilities::generic());
    scenario_a(&mut canvas, &mut editor);

    canvas.undo().unwrap().unwrap();
    assert_eq!(filter_attr(&canvas, rect), None);
    assert_eq!(FilterResource::locate(canvas.document(), "rect1").unwrap(), None);
    assert_eq!(canvas.selected_element(), Some(rect));

    canvas.redo().unwrap().unwrap();
    assert_eq!(filter_attr(&canvas, rect), Some("url(#rect1_blur)"));
    assert_eq!(deviation(&canvas), Some(5.0));
}

#[test]
fn reblur_after_clear_reuses_single_resource() {
    let (mut canvas, mut editor, _) = setup(EngineCapabilities::generic());
    scenario_a(&mut canvas, &mut editor);
    editor.set_blur(&mut canvas, 0.0, true).unwrap();
    editor.set_blur(&mut canvas, 2.0, true).unwrap();
    editor.set_blur(&mut canvas, 6.0, true).unwrap();
    assert_eq!(filters_in_defs(&canvas), 1);
    assert_eq!(deviation(&canvas), Some(6.0));
}

#[test]
fn drag_ending_at_start_value_records_nothing() {
    let (mut canvas, mut editor, _) = setup(EngineCapabilities::generic());
    scenario_a(&mut canvas, &mut editor);

    editor.begin_edit(&mut canvas, 7.0).unwrap();
    editor.update_preview(&mut canvas, 9.0).unwrap();
    editor.update_preview(&mut canvas, 5.0).unwrap();
    assert_eq!(
        editor.commit_edit(&mut canvas).unwrap(),
        CommitOutcome::Unchanged
    );
    assert_eq!(canvas.history().undo_depth(), 1);
}

#[test]
fn clearing_twice_equals_clearing_once() {
    let (mut canvas, mut editor, rect) = setup(EngineCapabilities::generic());
    scenario_a(&mut canvas, &mut editor);

    editor.set_blur(&mut canvas, 0.0, true).unwrap();
    let depth = canvas.history().undo_depth();
    let second = editor.set_blur(&mut canvas, 0.0, true).unwrap();

    assert_eq!(second, SetBlurOutcome::Finished(CommitOutcome::Unchanged));
    assert_eq!(canvas.history().undo_depth(), depth);
    assert_eq!(filter_attr(&canvas, rect), None);
}

#[test]
fn region_expands_above_threshold_and_undo_restores_it() {
    let (mut canvas, mut editor, _) = setup(EngineCapabilities::generic());
    editor.set_blur(&mut canvas, 2.0, true).unwrap();
    let res = resource(&canvas);
    assert_eq!(canvas.document().attribute(res.filter, "width"), None);

    editor.set_blur(&mut canvas, 4.0, true).unwrap();
    let doc = canvas.document();
    assert_eq!(doc.attribute(res.filter, "x"), Some("-50%"));
    assert_eq!(doc.attribute(res.filter, "y"), Some("-50%"));
    assert_eq!(doc.attribute(res.filter, "width"), Some("200%"));
    assert_eq!(doc.attribute(res.filter, "height"), Some("200%"));

    canvas.undo().unwrap().unwrap();
    assert_eq!(canvas.document().attribute(res.filter, "x"), None);
    assert_eq!(deviation(&canvas), Some(2.0));
}

// ============================================================================
// Engine quirk
// ============================================================================

#[test]
fn webkit_keeps_region_when_deviation_drops() {
    let caps = EngineCapabilities::for_profile(EngineProfile::WebKit);
    assert!(caps.stale_filter_cache);
    let (mut canvas, mut editor, rect) = setup(caps);

    editor.set_blur(&mut canvas, 6.0, true).unwrap();
    editor.set_blur(&mut canvas, 1.0, true).unwrap();

    let res = resource(&canvas);
    assert_eq!(canvas.document().attribute(res.filter, "width"), Some("200%"));
    assert_eq!(filter_attr(&canvas, rect), Some(filter_url("rect1").as_str()));
}

#[test]
fn generic_engine_clears_region_when_deviation_drops() {
    let (mut canvas, mut editor, _) = setup(EngineCapabilities::generic());
    editor.set_blur(&mut canvas, 6.0, true).unwrap();
    editor.set_blur(&mut canvas, 1.0, true).unwrap();

    let res = resource(&canvas);
    assert_eq!(canvas.document().attribute(res.filter, "width"), None);
}

// ============================================================================
// Errors and protocol misuse
// ============================================================================

#[test]
fn no_selection_is_rejected_without_side_effects() {
    let (mut canvas, mut editor, _) = setup(EngineCapabilities::generic());
    canvas.clear_selection();
    assert_eq!(
        editor.begin_edit(&mut canvas, 3.0),
        Err(BlurError::NoSelection)
    );
    assert_eq!(
        editor.commit_edit(&mut canvas),
        Err(BlurError::NoSelection)
    );
    assert!(canvas.document().find_defs().is_none());
}

#[test]
fn impostor_resource_is_reported_not_duplicated() {
    let (mut canvas, mut editor, _) = setup(EngineCapabilities::generic());
    canvas.add_element("g", [("id", "rect1_blur")]).unwrap();

    let err = editor.set_blur(&mut canvas, 3.0, true).unwrap_err();
    assert!(matches!(err, BlurError::InconsistentResource { .. }));
    assert!(canvas.document().find_defs().is_none());
    assert!(!canvas.history().can_undo());
}

#[test]
fn second_begin_on_same_target_is_rejected() {
    let (mut canvas, mut editor, rect) = setup(EngineCapabilities::generic());
    editor.begin_edit(&mut canvas, 2.0).unwrap();
    assert!(matches!(
        editor.begin_edit(&mut canvas, 3.0),
        Err(BlurError::TransactionOpen { .. })
    ));
    assert!(editor.is_editing(rect));
    assert_eq!(deviation(&canvas), Some(2.0));
}

#[test]
fn stray_commit_leaves_history_alone() {
    let (mut canvas, mut editor, _) = setup(EngineCapabilities::generic());
    scenario_a(&mut canvas, &mut editor);
    assert_eq!(
        editor.commit_edit(&mut canvas).unwrap(),
        CommitOutcome::NoTransaction
    );
    assert_eq!(canvas.history().undo_depth(), 1);
}

// ============================================================================
// Multiple targets
// ============================================================================

#[test]
fn interleaved_edits_on_two_targets_stay_separate() {
    let (mut canvas, mut editor, rect) = setup(EngineCapabilities::generic());
    let circle = canvas.add_element("circle", [("id", "c1")]).unwrap();

    editor.set_blur(&mut canvas, 2.0, false).unwrap();
    canvas.select(circle);
    editor.set_blur(&mut canvas, 4.0, false).unwrap();
    editor.update_preview(&mut canvas, 5.0).unwrap();

    canvas.select(rect);
    editor.set_blur(&mut canvas, 3.0, true).unwrap();
    canvas.select(circle);
    editor.set_blur(&mut canvas, 6.0, true).unwrap();

    assert_eq!(editor.pending_len(), 0);
    assert_eq!(canvas.history().undo_depth(), 2);
    assert_eq!(filter_attr(&canvas, rect), Some("url(#rect1_blur)"));
    assert_eq!(filter_attr(&canvas, circle), Some("url(#c1_blur)"));
    assert_eq!(filters_in_defs(&canvas), 2);

    canvas.undo().unwrap().unwrap();
    assert_eq!(filter_attr(&canvas, circle), None);
    assert_eq!(deviation(&canvas), Some(3.0));
}

#[test]
fn resources_committed_out_of_order_redo_cleanly() {
    let (mut canvas, mut editor, rect) = setup(EngineCapabilities::generic());
    let circle = canvas.add_element("circle", [("id", "c1")]).unwrap();

    editor.set_blur(&mut canvas, 2.0, false).unwrap();
    canvas.select(circle);
    editor.set_blur(&mut canvas, 2.0, false).unwrap();
    editor.commit_edit(&mut canvas).unwrap();
    editor.commit_edit_for(&mut canvas, rect).unwrap();
    assert_eq!(canvas.history().undo_depth(), 2);

    canvas.undo().unwrap().unwrap();
    canvas.undo().unwrap().unwrap();
    assert_eq!(filters_in_defs(&canvas), 0);

    canvas.redo().unwrap().unwrap();
    assert_eq!(filter_attr(&canvas, circle), Some("url(#c1_blur)"));
    canvas.redo().unwrap().unwrap();
    assert_eq!(filter_attr(&canvas, rect), Some("url(#rect1_blur)"));
    assert_eq!(filters_in_defs(&canvas), 2);
    assert_eq!(deviation(&canvas), Some(2.0));
    let doc = canvas.document();
    assert!(doc.find_by_id("c1_blur").is_some());
}

#[test]
fn undo_of_first_blur_keeps_empty_defs_for_reuse() {
    let (mut canvas, mut editor, _) = setup(EngineCapabilities::generic());
    scenario_a(&mut canvas, &mut editor);
    let defs = canvas.document().find_defs().unwrap();

    canvas.undo().unwrap().unwrap();
    assert_eq!(canvas.document().find_defs(), Some(defs));
    assert!(canvas.document().children(defs).is_empty());

    editor.set_blur(&mut canvas, 3.0, true).unwrap();
    assert_eq!(canvas.document().find_defs(), Some(defs));
    assert_eq!(filters_in_defs(&canvas), 1);
}

#[test]
fn commit_all_closes_open_edits_before_undo() {
    let (mut canvas, mut editor, rect) = setup(EngineCapabilities::generic());
    let circle = canvas.add_element("circle", [("id", "c1")]).unwrap();
    editor.set_blur(&mut canvas, 2.0, false).unwrap();
    canvas.select(circle);
    editor.set_blur(&mut canvas, 4.0, false).unwrap();

    assert_eq!(editor.commit_all(&mut canvas).unwrap(), 2);
    assert_eq!(editor.pending_len(), 0);
    assert_eq!(canvas.history().undo_depth(), 2);

    canvas.undo().unwrap().unwrap();
    canvas.undo().unwrap().unwrap();
    for node in [rect, circle] {
        assert_eq!(filter_attr(&canvas, node), None);
    }
    assert_eq!(editor.commit_all(&mut canvas).unwrap(), 0);
}
