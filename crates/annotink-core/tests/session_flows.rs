//! End-to-end editing flows driven through `AnnotationSession` over a
//! `MemoryScene`.

use annotink_core::scene::RasterRequest;
use annotink_core::source::encode_data_uri;
use annotink_core::{
    AnnotationSession, DataUriDecoder, ExportFormat, ExportOptions, ImageDecoder, ImageSource,
    Instant, Key, KeyEvent, LineKind, MemoryScene, PointerEvent, Scene, SceneEvent, SceneResult,
    SessionConfig, Shape, ToolKind,
};
use kurbo::{Point, Size, Vec2};
use std::io::Cursor;
use std::time::Duration;

type Session = AnnotationSession<MemoryScene>;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Data URI of a blank `width` x `height` PNG.
fn png(width: u32, height: u32) -> String {
    let mut data = Vec::new();
    image::GrayImage::new(width, height)
        .write_to(&mut Cursor::new(&mut data), image::ImageFormat::Png)
        .unwrap();
    encode_data_uri("image/png", &data)
}

fn fake_raster(_: &MemoryScene, _: &RasterRequest) -> SceneResult<Vec<u8>> {
    Ok(vec![0x89, b'P', b'N', b'G'])
}

/// Session over a 1600x1200 image fitted into 800x600 (scale 0.5).
fn loaded() -> (Session, DataUriDecoder) {
    init_logger();
    let mut session = Session::new(SessionConfig::default());
    let decoder = DataUriDecoder::new(session.blobs().clone());
    let source = ImageSource::parse(&png(1600, 1200)).unwrap();
    pollster::block_on(session.load_image(
        MemoryScene::default().with_rasterizer(fake_raster),
        source,
        Size::new(800.0, 600.0),
        &decoder,
    ))
    .unwrap();
    (session, decoder)
}

fn drag(session: &mut Session, from: (f64, f64), to: (f64, f64)) {
    session.handle_pointer(PointerEvent::down(Point::new(from.0, from.1)));
    session.handle_pointer(PointerEvent::moved(Point::new(to.0, to.1)));
    session.handle_pointer(PointerEvent::up(Point::new(to.0, to.1)));
}

fn draw_rect(session: &mut Session, from: (f64, f64), to: (f64, f64)) {
    session.set_tool(ToolKind::Shape);
    drag(session, from, to);
}

fn objects(session: &Session) -> &[Shape] {
    session.scene().unwrap().objects()
}

fn rect_origins(session: &Session) -> Vec<Point> {
    objects(session)
        .iter()
        .filter_map(|s| match s {
            Shape::Rectangle(r) => Some(r.position),
            _ => None,
        })
        .collect()
}

#[test]
fn test_undo_then_redo_restores_snapshot() {
    let (mut session, decoder) = loaded();
    draw_rect(&mut session, (10.0, 10.0), (60.0, 60.0));
    let drawn = session.history().current().cloned().unwrap();
    assert_eq!(drawn.len(), 1);

    pollster::block_on(session.undo_and_wait(&decoder)).unwrap();
    assert!(objects(&session).is_empty());
    assert!(session.scene().unwrap().background().is_some());
    assert!(session.is_consistent());

    pollster::block_on(session.redo_and_wait(&decoder)).unwrap();
    assert_eq!(session.scene().unwrap().to_snapshot(true), drawn);
    assert!(session.view().can_undo);
    assert!(!session.view().can_redo);
}

#[test]
fn test_undo_is_idempotent_at_initial_state() {
    let (mut session, _) = loaded();
    assert!(session.undo().unwrap().is_none());
    assert!(session.undo().unwrap().is_none());
    assert_eq!(session.history().undo_len(), 1);
    assert!(session.scene().unwrap().background().is_some());
}

#[test]
fn test_new_edit_discards_redo() {
    let (mut session, decoder) = loaded();
    draw_rect(&mut session, (10.0, 10.0), (60.0, 60.0));
    draw_rect(&mut session, (100.0, 100.0), (150.0, 150.0));
    pollster::block_on(session.undo_and_wait(&decoder)).unwrap();
    draw_rect(&mut session, (200.0, 200.0), (250.0, 250.0));

    assert!(session.redo().unwrap().is_none());
    assert_eq!(
        rect_origins(&session),
        vec![Point::new(10.0, 10.0), Point::new(200.0, 200.0)]
    );
}

#[test]
fn test_small_drags_add_nothing() {
    let (mut session, _) = loaded();

    session.set_tool(ToolKind::Shape);
    drag(&mut session, (10.0, 10.0), (12.0, 100.0));
    session.set_tool(ToolKind::Line);
    drag(&mut session, (10.0, 10.0), (13.0, 12.0));
    session.set_line_kind(LineKind::Arrow);
    drag(&mut session, (10.0, 10.0), (12.0, 14.0));

    let scene = session.scene().unwrap();
    assert!(scene.objects().is_empty());
    assert!(scene.provisional_objects().is_empty());
    assert_eq!(session.history().undo_len(), 1);
    assert_eq!(session.tool(), ToolKind::Line);
}

#[test]
fn test_arrow_is_one_object() {
    let (mut session, decoder) = loaded();
    session.set_line_kind(LineKind::Arrow);
    session.set_tool(ToolKind::Line);
    drag(&mut session, (10.0, 10.0), (100.0, 50.0));

    assert_eq!(objects(&session).len(), 1);
    assert_eq!(objects(&session)[0].kind_name(), "arrow");
    assert!(session.scene().unwrap().provisional_objects().is_empty());
    assert_eq!(session.tool(), ToolKind::Select);

    pollster::block_on(session.undo_and_wait(&decoder)).unwrap();
    assert!(objects(&session).is_empty());
}

#[test]
fn test_delete_requires_selection() {
    let (mut session, _) = loaded();
    assert!(!session.handle_key(&KeyEvent::Pressed(Key::Delete)));
    assert_eq!(session.history().undo_len(), 1);

    draw_rect(&mut session, (10.0, 10.0), (60.0, 60.0));
    let event = session.scene_mut().unwrap().click(Point::new(500.0, 500.0));
    session.handle_scene_event(event, Instant::now());
    assert!(!session.view().has_selection);
    assert!(!session.handle_key(&KeyEvent::Pressed(Key::Backspace)));
    assert_eq!(session.history().undo_len(), 2);

    let event = session.scene_mut().unwrap().click(Point::new(10.0, 30.0));
    session.handle_scene_event(event, Instant::now());
    assert!(session.view().has_selection);
    assert!(session.handle_key(&KeyEvent::Pressed(Key::Delete)));
    assert!(objects(&session).is_empty());
    assert_eq!(session.history().undo_len(), 3);
    assert!(!session.view().has_selection);
}

#[test]
fn test_switching_tools_mid_drag_restores_scene() {
    let (mut session, _) = loaded();
    draw_rect(&mut session, (10.0, 10.0), (60.0, 60.0));
    session.set_tool(ToolKind::Shape);
    let before = session.scene().unwrap().to_snapshot(true);
    let saved = session.history().undo_len();

    session.pointer_down(Point::new(100.0, 100.0));
    session.pointer_move(Point::new(200.0, 180.0));
    session.set_tool(ToolKind::Line);

    let scene = session.scene().unwrap();
    assert_eq!(scene.to_snapshot(true), before);
    assert!(scene.provisional_objects().is_empty());
    assert_eq!(session.history().undo_len(), saved);
}

#[test]
fn test_text_commit_and_discard() {
    let (mut session, _) = loaded();

    session.set_tool(ToolKind::Text);
    session.pointer_down(Point::new(100.0, 100.0));
    assert!(session.view().is_editing_text);
    let scene = session.scene_mut().unwrap();
    scene.type_text("   ");
    let event = scene.finish_text_editing().unwrap();
    session.handle_scene_event(event, Instant::now());
    assert!(objects(&session).is_empty());
    assert_eq!(session.tool(), ToolKind::Select);

    session.set_tool(ToolKind::Text);
    session.pointer_down(Point::new(100.0, 100.0));
    let saved = session.history().undo_len();
    let scene = session.scene_mut().unwrap();
    scene.type_text("hello");
    let event = scene.finish_text_editing().unwrap();
    session.handle_scene_event(event, Instant::now());

    assert_eq!(objects(&session).len(), 1);
    assert_eq!(objects(&session)[0].as_text().unwrap().content, "hello");
    assert_eq!(session.history().undo_len(), saved + 1);
    assert!(!session.view().is_editing_text);
}

#[test]
fn test_blur_region_crop_is_debounced() {
    let (mut session, _) = loaded();
    session.set_tool(ToolKind::Blur);
    drag(&mut session, (10.0, 10.0), (110.0, 60.0));

    let region = objects(&session)[0].as_region().cloned().unwrap();
    assert!((region.crop_x - 20.0).abs() < f64::EPSILON);
    assert!((region.crop_y - 20.0).abs() < f64::EPSILON);
    assert!((region.width - 200.0).abs() < f64::EPSILON);
    assert!((region.height - 100.0).abs() < f64::EPSILON);
    let id = objects(&session)[0].id();
    let saved = session.history().undo_len();

    let t0 = Instant::now();
    for step in 0..3u64 {
        let event = session
            .scene_mut()
            .unwrap()
            .move_object(id, Vec2::new(5.0, 0.0))
            .unwrap();
        session.handle_scene_event(event, t0 + Duration::from_millis(step * 30));
    }
    // Last request at 60 ms, so nothing is due before 160 ms.
    assert_eq!(session.tick(t0 + Duration::from_millis(120)), 0);
    assert_eq!(session.tick(t0 + Duration::from_millis(170)), 1);
    assert_eq!(session.tick(t0 + Duration::from_millis(400)), 0);
    let crop_x = |session: &Session| {
        objects(session)
            .iter()
            .find_map(|s| s.as_region())
            .map(|r| r.crop_x)
            .unwrap()
    };
    assert!((crop_x(&session) - 50.0).abs() < 1e-9);

    let scene = session.scene_mut().unwrap();
    let moving = scene.move_object(id, Vec2::new(10.0, 0.0)).unwrap();
    session.handle_scene_event(moving, t0);
    assert!(session.has_pending_crop_updates());
    let modified = session.scene().unwrap().release_object(id).unwrap();
    session.handle_scene_event(modified, t0);

    assert!(!session.has_pending_crop_updates());
    assert!((crop_x(&session) - 70.0).abs() < 1e-9);
    assert_eq!(session.history().undo_len(), saved + 1);
}

#[test]
fn test_region_scaling_updates_crop_size() {
    let (mut session, _) = loaded();
    session.set_tool(ToolKind::Blur);
    drag(&mut session, (10.0, 10.0), (110.0, 60.0));
    let id = objects(&session)[0].id();

    let scene = session.scene_mut().unwrap();
    let scaling = scene.scale_object(id, 2.0, 1.0).unwrap();
    session.handle_scene_event(scaling, Instant::now());
    assert_eq!(session.flush_crop_updates(), 1);

    let region = objects(&session)[0].as_region().cloned().unwrap();
    assert!((region.width - 400.0).abs() < 1e-9);
    assert!((region.height - 100.0).abs() < 1e-9);
    assert!((region.scale_x - 0.5).abs() < f64::EPSILON);
}

#[test]
fn test_blur_needs_background() {
    init_logger();
    let mut session = Session::with_scene(
        SessionConfig::default(),
        MemoryScene::new(Size::new(400.0, 300.0)),
    );
    session.set_tool(ToolKind::Blur);
    drag(&mut session, (10.0, 10.0), (110.0, 60.0));
    assert!(objects(&session).is_empty());
    assert_eq!(session.tool(), ToolKind::Blur);
}

#[test]
fn test_stale_background_decode_discarded() {
    let (mut session, decoder) = loaded();
    draw_rect(&mut session, (10.0, 10.0), (60.0, 60.0));

    let first = session.undo().unwrap().unwrap();
    assert!(!session.is_consistent());
    let second = session.redo().unwrap().unwrap();

    let decoded = pollster::block_on(decoder.decode(first.src()));
    assert!(!session.apply_background(first, decoded).unwrap());
    assert!(session.scene().unwrap().background().is_none());
    assert!(!session.is_consistent());

    let decoded = pollster::block_on(decoder.decode(second.src()));
    assert!(session.apply_background(second, decoded).unwrap());
    assert!(session.is_consistent());
    assert_eq!(objects(&session).len(), 1);
}

#[test]
fn test_decode_stale_after_new_image() {
    let (mut session, decoder) = loaded();
    draw_rect(&mut session, (10.0, 10.0), (60.0, 60.0));
    let request = session.undo().unwrap().unwrap();

    let source = ImageSource::parse(&png(400, 300)).unwrap();
    pollster::block_on(session.load_image(
        MemoryScene::default(),
        source,
        Size::new(800.0, 600.0),
        &decoder,
    ))
    .unwrap();

    let decoded = pollster::block_on(decoder.decode(request.src()));
    assert!(!session.apply_background(request, decoded).unwrap());
    let background = session.scene().unwrap().background().unwrap();
    assert!((background.width - 400.0).abs() < f64::EPSILON);
}

#[test]
fn test_failed_load_keeps_pending_background() {
    let (mut session, decoder) = loaded();
    draw_rect(&mut session, (10.0, 10.0), (60.0, 60.0));
    let request = session.undo().unwrap().unwrap();

    let broken = ImageSource::Blob {
        bytes: vec![1, 2, 3],
        mime: "image/png".to_string(),
    };
    assert!(
        pollster::block_on(session.load_image(
            MemoryScene::default(),
            broken,
            Size::new(800.0, 600.0),
            &decoder,
        ))
        .is_err()
    );
    assert!(session.blobs().is_empty());

    let decoded = pollster::block_on(decoder.decode(request.src()));
    assert!(session.apply_background(request, decoded).unwrap());
    assert!(session.scene().unwrap().background().is_some());
    assert!(session.is_consistent());
}

#[test]
fn test_pen_strokes_are_recorded() {
    let (mut session, decoder) = loaded();
    session.set_tool(ToolKind::Pen);
    assert_eq!(session.history().undo_len(), 2);

    let event = session
        .scene_mut()
        .unwrap()
        .draw_stroke(vec![Point::new(0.0, 0.0), Point::new(40.0, 40.0)])
        .unwrap();
    session.handle_scene_event(event, Instant::now());
    assert_eq!(session.history().undo_len(), 3);
    assert_eq!(session.tool(), ToolKind::Pen);

    pollster::block_on(session.undo_and_wait(&decoder)).unwrap();
    assert!(objects(&session).is_empty());
    assert!(session.scene().unwrap().brush().is_some());

    session.set_tool(ToolKind::Select);
    assert!(session.scene().unwrap().brush().is_none());
}

#[test]
fn test_vector_export_leaves_scene_unchanged() {
    let (mut session, _) = loaded();
    session.set_tool(ToolKind::Highlighter);
    let event = session
        .scene_mut()
        .unwrap()
        .draw_stroke(vec![Point::new(0.0, 0.0), Point::new(40.0, 40.0)])
        .unwrap();
    session.handle_scene_event(event, Instant::now());
    let before = session.scene().unwrap().to_snapshot(true);

    let output = session
        .export_scene(ExportFormat::Svg, &ExportOptions::default())
        .unwrap();
    assert!(output.data.contains(r#"opacity="0.30"#));
    assert!(!output.data.contains("feDropShadow"));
    assert_eq!(session.scene().unwrap().to_snapshot(true), before);
}

#[test]
fn test_data_url_falls_back_to_png() {
    let (mut session, _) = loaded();
    let options = session.export_options();
    let url = session.data_url(ExportFormat::Svg, &options).unwrap();
    assert!(url.starts_with("data:image/png;base64,"));

    let jpeg = session.data_url(ExportFormat::Jpeg, &options).unwrap();
    assert!(jpeg.starts_with("data:image/jpeg;base64,"));

    let bad = ExportOptions {
        quality: 2.0,
        scale: 1.0,
    };
    assert!(session.data_url(ExportFormat::Png, &bad).is_err());
}

#[test]
fn test_scene_event_selection_tracking() {
    let (mut session, _) = loaded();
    draw_rect(&mut session, (10.0, 10.0), (60.0, 60.0));
    let id = objects(&session)[0].id();

    session.handle_scene_event(SceneEvent::SelectionChanged(Vec::new()), Instant::now());
    assert!(!session.view().has_selection);
    session.handle_scene_event(SceneEvent::SelectionChanged(vec![id]), Instant::now());
    assert!(session.view().has_selection);

    // Modifying a plain object records a snapshot.
    let saved = session.history().undo_len();
    session.handle_scene_event(SceneEvent::ObjectModified(id), Instant::now());
    assert_eq!(session.history().undo_len(), saved + 1);
}
