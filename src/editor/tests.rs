use super::*;
use crate::draw::color::{BLUE, GREEN};
use crate::geometry::Rect;

fn create_test_editor() -> Editor {
    create_editor_with(&Config::default())
}

fn create_editor_with(config: &Config) -> Editor {
    let raster = Raster::filled(200, 100, [40, 40, 40, 255]);
    Editor::new(CapturedImage::new(raster, (10, 20)), config)
}

fn press_key(editor: &mut Editor, key: Key) {
    editor.on_key_press(key);
    editor.on_key_release(key);
}

fn chord(editor: &mut Editor, modifiers: &[Key], key: Key) {
    for m in modifiers {
        editor.on_key_press(*m);
    }
    press_key(editor, key);
    for m in modifiers.iter().rev() {
        editor.on_key_release(*m);
    }
}

fn drag(editor: &mut Editor, from: (f64, f64), to: (f64, f64)) {
    editor.on_pointer_press(MouseButton::Left, from.0, from.1);
    editor.on_pointer_motion((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0);
    editor.on_pointer_motion(to.0, to.1);
    editor.on_pointer_release(MouseButton::Left, to.0, to.1);
}

fn add_rect(editor: &mut Editor, x: f64, y: f64) -> AnnotationId {
    editor
        .add_annotation(AnnotationKind::Rectangle {
            rect: Rect::new(x, y, 20.0, 20.0),
        })
        .unwrap()
}

fn z_order(editor: &Editor) -> Vec<AnnotationId> {
    editor.scene().iter().map(|a| a.id).collect()
}

#[test]
fn new_session_starts_in_select_mode() {
    let editor = create_test_editor();
    assert_eq!(editor.tool_kind(), ToolKind::Select);
    assert_eq!(editor.origin(), (10, 20));
    assert!(editor.needs_redraw);
    assert!(editor.scene().is_empty());
    assert_eq!(editor.export_status(), &ExportStatus::Idle);
}

#[test]
fn tool_keys_switch_tools() {
    let mut editor = create_test_editor();
    press_key(&mut editor, Key::Char('r'));
    assert_eq!(editor.tool_kind(), ToolKind::Rectangle);
    press_key(&mut editor, Key::Char('T'));
    assert_eq!(editor.tool_kind(), ToolKind::Text);
    press_key(&mut editor, Key::Char('n'));
    assert_eq!(editor.tool_kind(), ToolKind::StepCounter);
}

#[test]
fn drag_maps_device_to_image_space() {
    let mut editor = create_test_editor();
    editor.on_pointer_press(MouseButton::Middle, 0.0, 0.0);
    editor.on_pointer_motion(10.0, 20.0);
    editor.on_pointer_release(MouseButton::Middle, 10.0, 20.0);
    assert_eq!(editor.viewport().pan_offset(), Point::new(10.0, 20.0));

    editor.set_tool(ToolKind::Rectangle);
    drag(&mut editor, (20.0, 30.0), (60.0, 70.0));
    match editor.scene().iter().next().map(|a| &a.kind) {
        Some(AnnotationKind::Rectangle { rect }) => {
            assert_eq!(*rect, Rect::new(10.0, 10.0, 40.0, 40.0));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn escape_and_right_click_abort_drags() {
    let mut editor = create_test_editor();
    editor.set_tool(ToolKind::Ellipse);

    editor.on_pointer_press(MouseButton::Left, 10.0, 10.0);
    editor.on_pointer_motion(80.0, 60.0);
    press_key(&mut editor, Key::Escape);
    editor.on_pointer_release(MouseButton::Left, 80.0, 60.0);

    editor.on_pointer_press(MouseButton::Left, 10.0, 10.0);
    editor.on_pointer_motion(80.0, 60.0);
    editor.on_pointer_press(MouseButton::Right, 80.0, 60.0);
    editor.on_pointer_release(MouseButton::Left, 80.0, 60.0);

    assert!(editor.scene().is_empty());
    assert_eq!(editor.history().undo_count(), 0);
}

#[test]
fn escape_without_gesture_clears_selection() {
    let mut editor = create_test_editor();
    let id = add_rect(&mut editor, 10.0, 10.0);
    editor.scene.select_only(id);
    press_key(&mut editor, Key::Escape);
    assert!(editor.scene().selection().is_empty());
}

#[test]
fn letters_are_text_while_editing() {
    let mut editor = create_test_editor();
    editor.set_tool(ToolKind::Text);
    editor.on_pointer_press(MouseButton::Left, 30.0, 30.0);
    editor.on_pointer_release(MouseButton::Left, 30.0, 30.0);
    for c in "red".chars() {
        press_key(&mut editor, Key::Char(c));
    }
    assert_eq!(editor.tool_kind(), ToolKind::Text);
    press_key(&mut editor, Key::Return);

    assert_eq!(editor.history().undo_count(), 1);
    match &editor.scene().iter().next().unwrap().kind {
        AnnotationKind::Text { text, .. } => assert_eq!(text, "red"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn undo_while_typing_finishes_then_undoes() {
    let mut editor = create_test_editor();
    editor.set_tool(ToolKind::Text);
    editor.on_pointer_press(MouseButton::Left, 30.0, 30.0);
    press_key(&mut editor, Key::Char('a'));
    chord(&mut editor, &[Key::Ctrl], Key::Char('z'));

    assert!(!editor.tool().is_text_editing());
    assert!(editor.scene().is_empty());
    assert_eq!(editor.history().redo_count(), 1);
}

#[test]
fn delete_selection_is_one_step() {
    let mut editor = create_test_editor();
    let a = add_rect(&mut editor, 10.0, 10.0);
    let b = add_rect(&mut editor, 50.0, 10.0);
    add_rect(&mut editor, 90.0, 10.0);
    editor.scene.set_selection([a, b]);
    let before = z_order(&editor);

    press_key(&mut editor, Key::Delete);
    assert_eq!(editor.scene().len(), 1);
    assert_eq!(editor.history().undo_count(), 4);

    assert!(editor.undo());
    assert_eq!(z_order(&editor), before);
}

#[test]
fn select_all_shortcut() {
    let mut editor = create_test_editor();
    add_rect(&mut editor, 10.0, 10.0);
    add_rect(&mut editor, 50.0, 10.0);
    chord(&mut editor, &[Key::Ctrl], Key::Char('a'));
    assert_eq!(editor.scene().selection().len(), 2);
}

#[test]
fn bring_to_front_keeps_relative_order() {
    let mut editor = create_test_editor();
    let a = add_rect(&mut editor, 0.0, 0.0);
    let b = add_rect(&mut editor, 10.0, 0.0);
    let c = add_rect(&mut editor, 20.0, 0.0);
    let d = add_rect(&mut editor, 30.0, 0.0);
    editor.scene.set_selection([a, b]);

    assert!(editor.reorder_selection(ZOrder::ToFront));
    assert_eq!(z_order(&editor), vec![c, d, a, b]);

    assert!(editor.reorder_selection(ZOrder::ToBack));
    assert_eq!(z_order(&editor), vec![a, b, c, d]);
    assert!(!editor.reorder_selection(ZOrder::Backward));

    assert!(editor.reorder_selection(ZOrder::Forward));
    assert_eq!(z_order(&editor), vec![c, a, b, d]);

    editor.undo();
    assert_eq!(z_order(&editor), vec![a, b, c, d]);
    editor.undo();
    assert_eq!(z_order(&editor), vec![c, d, a, b]);
}

#[test]
fn forward_stops_at_the_top() {
    let mut editor = create_test_editor();
    let a = add_rect(&mut editor, 0.0, 0.0);
    let b = add_rect(&mut editor, 10.0, 0.0);
    editor.scene.select_only(b);
    assert!(!editor.reorder_selection(ZOrder::Forward));
    editor.scene.select_only(a);
    chord(&mut editor, &[Key::Ctrl], Key::Char(']'));
    assert_eq!(z_order(&editor), vec![b, a]);
}

#[test]
fn selection_style_reports_mixed_values() {
    let mut editor = create_test_editor();
    let a = add_rect(&mut editor, 0.0, 0.0);
    let b = add_rect(&mut editor, 30.0, 0.0);
    assert!(editor.selection_style().is_none());

    editor.scene.select_only(b);
    editor.apply_style(StyleChange {
        stroke: Some(BLUE),
        ..StyleChange::default()
    });
    editor.scene.set_selection([a, b]);
    let style = editor.selection_style().unwrap();
    assert_eq!(style.stroke, Mixed::Mixed);
    assert_eq!(style.width, Mixed::Uniform(3.0));
}

#[test]
fn apply_style_is_one_undoable_step() {
    let mut editor = create_test_editor();
    let a = add_rect(&mut editor, 0.0, 0.0);
    let b = add_rect(&mut editor, 30.0, 0.0);
    editor.scene.set_selection([a, b]);

    assert!(editor.apply_style(StyleChange {
        fill: Some(Some(GREEN)),
        ..StyleChange::default()
    }));
    assert_eq!(editor.history().undo_count(), 3);
    assert_eq!(
        editor.selection_style().unwrap().fill,
        Mixed::Uniform(Some(GREEN))
    );

    editor.undo();
    assert!(editor.scene().iter().all(|x| x.style.fill.is_none()));
}

#[test]
fn apply_style_without_selection_changes_defaults() {
    let mut editor = create_test_editor();
    editor.apply_style(StyleChange {
        width: Some(9.0),
        ..StyleChange::default()
    });
    assert_eq!(editor.defaults().style.width, 9.0);
    assert_eq!(editor.history().undo_count(), 0);
}

#[test]
fn thickness_keys_adjust_defaults_and_selection() {
    let mut editor = create_test_editor();
    let id = add_rect(&mut editor, 0.0, 0.0);
    editor.scene.select_only(id);
    press_key(&mut editor, Key::Char(']'));
    press_key(&mut editor, Key::Char(']'));
    assert_eq!(editor.defaults().style.width, 5.0);
    assert_eq!(editor.scene().get(id).unwrap().style.width, 5.0);

    for _ in 0..20 {
        press_key(&mut editor, Key::Char('['));
    }
    assert_eq!(editor.defaults().style.width, 1.0);
}

#[test]
fn font_size_is_clamped() {
    let mut editor = create_test_editor();
    for _ in 0..100 {
        editor.adjust_font_size(FONT_SIZE_STEP);
    }
    assert_eq!(editor.defaults().style.font_size, 96.0);
}

#[test]
fn scroll_zooms_about_cursor() {
    let mut editor = create_test_editor();
    let cursor = Point::new(120.0, 40.0);
    let anchor = editor.viewport().to_image_space(cursor);
    editor.on_scroll(cursor.x, cursor.y, 2.0);
    assert!((editor.viewport().zoom() - 1.5625).abs() < 1e-9);
    let back = editor.viewport().to_screen_space(anchor);
    assert!((back.x - cursor.x).abs() < 1e-9 && (back.y - cursor.y).abs() < 1e-9);

    chord(&mut editor, &[Key::Ctrl], Key::Char('0'));
    assert_eq!(editor.viewport().zoom(), 1.0);
}

#[test]
fn fit_to_window_uses_viewport_size() {
    let mut editor = create_test_editor();
    editor.set_viewport_size(280.0, 580.0);
    editor.fit_to_window();
    assert!((editor.viewport().zoom() - 1.0).abs() < 1e-9);
    editor.set_viewport_size(180.0, 580.0);
    editor.fit_to_window();
    assert!((editor.viewport().zoom() - 0.5).abs() < 1e-9);
}

#[test]
fn eyedropper_reports_sample() {
    let mut editor = create_test_editor();
    press_key(&mut editor, Key::Char('i'));
    editor.on_pointer_press(MouseButton::Left, 5.0, 5.0);
    editor.on_pointer_release(MouseButton::Left, 5.0, 5.0);
    let sampled = Color::from_rgb8(40, 40, 40);
    assert_eq!(editor.sampled_color(), Some(sampled));
    assert_eq!(editor.defaults().style.stroke, sampled);
    assert!(editor.scene().is_empty());
}

#[test]
fn non_finite_pointer_input_is_dropped() {
    let mut editor = create_test_editor();
    editor.set_tool(ToolKind::Rectangle);
    editor.on_pointer_press(MouseButton::Left, f64::NAN, 3.0);
    editor.on_pointer_motion(50.0, 50.0);
    editor.on_pointer_release(MouseButton::Left, 50.0, 50.0);
    editor.on_scroll(f64::INFINITY, 0.0, 1.0);
    assert!(editor.scene().is_empty());
    assert_eq!(editor.viewport().zoom(), 1.0);
}

#[test]
fn invalid_keybindings_fall_back_to_defaults() {
    let mut config = Config::default();
    // Collides with the rectangle tool
    config.keybindings.undo = vec!["R".to_string()];
    let mut editor = create_editor_with(&config);
    add_rect(&mut editor, 0.0, 0.0);
    chord(&mut editor, &[Key::Ctrl], Key::Char('z'));
    assert!(editor.scene().is_empty());
}

#[test]
fn export_outcome_never_touches_the_scene() {
    let mut editor = create_test_editor();
    add_rect(&mut editor, 0.0, 0.0);
    let raster = editor.begin_export().unwrap();
    assert_eq!((raster.width(), raster.height()), (200, 100));
    assert!(editor.export_status().is_pending());

    editor.finish_export(Err("disk full".to_string()));
    assert_eq!(
        editor.export_status(),
        &ExportStatus::Failed("disk full".to_string())
    );
    assert_eq!(editor.scene().len(), 1);
    assert_eq!(editor.history().undo_count(), 1);
    assert!(editor.scene().is_dirty());

    editor.begin_export().unwrap();
    editor.finish_export(Ok(()));
    assert_eq!(editor.export_status(), &ExportStatus::Done);
    assert!(!editor.scene().is_dirty());
    assert!(editor.undo());
}

#[test]
fn render_paints_view_and_clears_redraw_flag() {
    let mut editor = create_test_editor();
    let surface = ImageSurface::create(cairo::Format::ARgb32, 300, 150).unwrap();
    {
        let ctx = Context::new(&surface).unwrap();
        editor.render(&ctx, 300.0, 150.0).unwrap();
    }
    assert!(!editor.needs_redraw);
    assert_eq!(editor.viewport().size(), (300.0, 150.0));

    let mut surface = surface;
    let stride = surface.stride() as usize;
    let data = surface.data().unwrap();
    // Inside the image: base gray; outside: view background
    let inside = &data[(50 * stride + 50 * 4)..(50 * stride + 50 * 4 + 4)];
    let outside = &data[(120 * stride + 250 * 4)..(120 * stride + 250 * 4 + 4)];
    assert_eq!(inside[0], 40);
    assert!((24..=27).contains(&outside[0]));
}

fn rect_of(editor: &Editor, id: AnnotationId) -> Rect {
    match editor.scene().get(id).map(|a| &a.kind) {
        Some(AnnotationKind::Rectangle { rect }) => *rect,
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn thickness_key_during_move_keeps_both_changes() {
    let mut editor = create_test_editor();
    let id = add_rect(&mut editor, 20.0, 20.0);
    editor.select_all();

    // Grab the top border between two handles and drag it right
    editor.on_pointer_press(MouseButton::Left, 25.0, 20.0);
    editor.on_pointer_motion(35.0, 20.0);
    press_key(&mut editor, Key::Char(']'));
    editor.on_pointer_motion(45.0, 20.0);
    editor.on_pointer_release(MouseButton::Left, 45.0, 20.0);

    assert_eq!(rect_of(&editor, id), Rect::new(30.0, 20.0, 20.0, 20.0));
    assert_eq!(editor.defaults().style.width, 4.0);
    assert_eq!(editor.scene().get(id).unwrap().style.width, 4.0);
    assert_eq!(editor.history().undo_count(), 3);

    assert!(editor.undo());
    assert_eq!(editor.scene().get(id).unwrap().style.width, 3.0);
    assert_eq!(rect_of(&editor, id), Rect::new(30.0, 20.0, 20.0, 20.0));
    assert!(editor.undo());
    assert_eq!(rect_of(&editor, id), Rect::new(20.0, 20.0, 20.0, 20.0));
}

#[test]
fn font_chord_on_fresh_text_still_discards_it() {
    let mut editor = create_test_editor();
    editor.set_tool(ToolKind::Text);
    editor.on_pointer_press(MouseButton::Left, 50.0, 50.0);
    editor.on_pointer_release(MouseButton::Left, 50.0, 50.0);
    assert!(editor.tool().is_text_editing());

    chord(&mut editor, &[Key::Ctrl, Key::Shift], Key::Char('='));
    editor.set_tool(ToolKind::Select);

    assert!(editor.scene().is_empty());
    assert_eq!(editor.history().undo_count(), 0);
    assert_eq!(editor.defaults().style.font_size, 20.0);
}

#[test]
fn font_chord_while_typing_resizes_the_text_in_its_own_step() {
    let mut editor = create_test_editor();
    editor.set_tool(ToolKind::Text);
    editor.on_pointer_press(MouseButton::Left, 50.0, 50.0);
    editor.on_pointer_release(MouseButton::Left, 50.0, 50.0);
    for c in "hi".chars() {
        press_key(&mut editor, Key::Char(c));
    }
    chord(&mut editor, &[Key::Ctrl, Key::Shift], Key::Char('='));

    assert!(!editor.tool().is_text_editing());
    assert_eq!(editor.history().undo_count(), 2);
    let text = editor.scene().iter().next().unwrap();
    assert_eq!(text.style.font_size, 20.0);

    assert!(editor.undo());
    let text = editor.scene().iter().next().unwrap();
    assert_eq!(text.style.font_size, 18.0);
    assert!(matches!(&text.kind, AnnotationKind::Text { text, .. } if text == "hi"));
    assert!(editor.undo());
    assert!(editor.scene().is_empty());
}

#[test]
fn crop_to_marquee_is_undoable() {
    let mut editor = create_test_editor();
    let id = add_rect(&mut editor, 50.0, 30.0);
    let full = editor.flatten().unwrap();

    // Nothing marked yet
    chord(&mut editor, &[Key::Ctrl, Key::Shift], Key::Char('x'));
    assert_eq!(editor.history().undo_count(), 1);

    drag(&mut editor, (5.0, 5.0), (105.0, 55.0));
    chord(&mut editor, &[Key::Ctrl, Key::Shift], Key::Char('x'));

    assert_eq!(editor.history().undo_count(), 2);
    assert_eq!(rect_of(&editor, id), Rect::new(45.0, 25.0, 20.0, 20.0));
    let cropped = editor.flatten().unwrap();
    assert_eq!((cropped.width(), cropped.height()), (100, 50));
    assert_eq!(cropped.pixel(50, 30), full.pixel(55, 35));

    assert!(editor.undo());
    assert_eq!(rect_of(&editor, id), Rect::new(50.0, 30.0, 20.0, 20.0));
    assert!(editor.flatten().unwrap() == full);

    assert!(editor.redo());
    assert_eq!(editor.flatten().unwrap().width(), 100);
    assert_eq!(rect_of(&editor, id), Rect::new(45.0, 25.0, 20.0, 20.0));
}
