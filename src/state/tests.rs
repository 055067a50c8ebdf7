use super::*;
use crate::commands::window::NativeWindow;
use crate::testing::{Call, FakeCursor, FakeDisplays, FakeHookLoader, FakeWindowFactory, ManualTimers};
use serde_json::json;

struct Harness {
    state: Arc<AppState>,
    factory: Arc<FakeWindowFactory>,
    hook: FakeHookLoader,
    timers: Arc<ManualTimers>,
    cursor: Arc<FakeCursor>,
}

fn harness_with(hook: FakeHookLoader) -> Harness {
    let factory = Arc::new(FakeWindowFactory::default());
    let timers = Arc::new(ManualTimers::default());
    let cursor = Arc::new(FakeCursor::default());
    let state = AppState::new(HostServices {
        factory: factory.clone(),
        displays: Arc::new(FakeDisplays::dual()),
        hook_loader: Arc::new(hook.clone()),
        timers: timers.clone(),
        cursor: cursor.clone(),
        hook_config: HookConfig::default(),
    });
    Harness {
        state,
        factory,
        hook,
        timers,
        cursor,
    }
}

fn harness() -> Harness {
    harness_with(FakeHookLoader::available())
}

const TOOLBAR_SHOWN: Point = Point { x: 790.0, y: 0.0 };
const TOOLBAR_HIDDEN: Point = Point { x: 790.0, y: -55.0 };

// ============================================================================
// Main window and app lifecycle
// ============================================================================

#[test]
fn test_reopen_recreates_main_when_nothing_is_open() {
    let h = harness();
    h.state.start().unwrap();
    h.state.close_window(WindowKind::Main);
    assert!(!h.state.has_open_windows());

    h.state.reopen().unwrap();
    let mains = h.factory.of_kind(WindowKind::Main);
    assert_eq!(mains.len(), 2);
    assert_eq!(mains[0].calls(), vec![Call::Close]);
    assert!(h.state.has_open_windows());
}

#[test]
fn test_reopen_focuses_first_open_window() {
    let h = harness();
    h.state.start().unwrap();
    h.state.open_settings().unwrap();

    h.state.reopen().unwrap();
    let main = h.factory.latest(WindowKind::Main).unwrap();
    assert_eq!(main.calls().last(), Some(&Call::Focus));
    assert_eq!(h.factory.of_kind(WindowKind::Main).len(), 1);
}

#[test]
fn test_page_load_releases_deferred_show() {
    let h = harness();
    h.state.open_settings().unwrap();
    let settings = h.factory.latest(WindowKind::Settings).unwrap();
    assert!(settings.calls().is_empty());

    h.state.on_page_loaded(settings.label());
    assert_eq!(settings.calls(), vec![Call::Center, Call::Show]);
}

// ============================================================================
// Toolbar
// ============================================================================

#[test]
fn test_hot_zone_reveals_and_hides_toolbar() {
    let h = harness();
    h.state.open_toolbar().unwrap();
    let toolbar = h.factory.latest(WindowKind::RecorderFullScreen).unwrap();
    assert_eq!(h.timers.pending(), vec![HOT_ZONE_POLL]);

    // Cursor touches the strip at the top edge
    h.cursor.move_to(1000, 2);
    h.timers.fire(HOT_ZONE_POLL);
    assert_eq!(toolbar.calls().last(), Some(&Call::SetPosition(TOOLBAR_SHOWN)));
    h.timers.fire(SLIDE_DURATION);

    // Cursor wanders off: a hide is scheduled, then runs
    h.cursor.move_to(1000, 500);
    h.timers.fire(HOT_ZONE_POLL);
    assert!(h.timers.pending().contains(&HIDE_DELAY));
    h.timers.fire(HIDE_DELAY);
    let calls = toolbar.calls();
    assert_eq!(
        calls[calls.len() - 2..],
        [Call::IgnoreCursor(true), Call::SetPosition(TOOLBAR_HIDDEN)]
    );
}

#[test]
fn test_cursor_returning_to_toolbar_keeps_it_shown() {
    let h = harness();
    h.state.open_toolbar().unwrap();
    let toolbar = h.factory.latest(WindowKind::RecorderFullScreen).unwrap();

    h.cursor.move_to(960, 2);
    h.timers.fire(HOT_ZONE_POLL);
    h.timers.fire(SLIDE_DURATION);

    // Leave, then come back before the hide runs
    h.cursor.move_to(960, 500);
    h.timers.fire(HOT_ZONE_POLL);
    assert!(h.timers.pending().contains(&HIDE_DELAY));
    h.cursor.move_to(960, 30);
    h.timers.fire(HOT_ZONE_POLL);
    h.timers.fire(HIDE_DELAY);

    assert_eq!(toolbar.calls().last(), Some(&Call::SetPosition(TOOLBAR_SHOWN)));
}

#[test]
fn test_renewed_hover_cancels_pending_hide() {
    let h = harness();
    h.state.open_toolbar().unwrap();
    let toolbar = h.factory.latest(WindowKind::RecorderFullScreen).unwrap();

    h.state.toolbar_mouse_enter();
    h.timers.fire(SLIDE_DURATION);
    h.state.toolbar_mouse_leave();
    h.state.toolbar_mouse_enter();
    h.timers.fire(HIDE_DELAY);

    assert_eq!(toolbar.calls().last(), Some(&Call::SetPosition(TOOLBAR_SHOWN)));
}

#[test]
fn test_blur_schedules_hide() {
    let h = harness();
    h.state.open_toolbar().unwrap();
    let toolbar = h.factory.latest(WindowKind::RecorderFullScreen).unwrap();
    h.state.toolbar_mouse_enter();
    h.timers.fire(SLIDE_DURATION);

    h.state.on_window_blurred("settings-99");
    assert!(!h.timers.pending().contains(&HIDE_DELAY));

    h.state.on_window_blurred(toolbar.label());
    h.timers.fire(HIDE_DELAY);
    assert_eq!(toolbar.calls().last(), Some(&Call::SetPosition(TOOLBAR_HIDDEN)));
}

#[test]
fn test_stale_hide_timer_ignores_new_toolbar() {
    let h = harness();
    h.state.open_toolbar().unwrap();
    h.state.toolbar_mouse_enter();
    h.timers.fire(SLIDE_DURATION);
    h.state.toolbar_mouse_leave();

    // Reopen while the old hide timer is still pending
    h.state.open_toolbar().unwrap();
    let second = h.factory.latest(WindowKind::RecorderFullScreen).unwrap();
    h.state.toolbar_mouse_enter();
    h.timers.fire(SLIDE_DURATION);
    h.timers.fire(HIDE_DELAY);

    assert_eq!(second.calls().last(), Some(&Call::SetPosition(TOOLBAR_SHOWN)));
    assert_eq!(h.factory.of_kind(WindowKind::RecorderFullScreen).len(), 2);
}

#[test]
fn test_hot_zone_poll_stops_with_toolbar() {
    let h = harness();
    h.state.open_toolbar().unwrap();
    h.state.open_toolbar().unwrap();
    assert_eq!(h.timers.pending(), vec![HOT_ZONE_POLL]);

    h.state.close_window(WindowKind::RecorderFullScreen);
    h.timers.fire(HOT_ZONE_POLL);
    assert!(h.timers.pending().is_empty());

    h.state.open_toolbar().unwrap();
    assert_eq!(h.timers.pending(), vec![HOT_ZONE_POLL]);
}

#[test]
fn test_timers_outliving_state_do_nothing() {
    let h = harness();
    h.state.open_toolbar().unwrap();
    h.state.toolbar_mouse_enter();
    drop(h.state);
    h.timers.fire_all();
    assert!(h.timers.pending().is_empty());
}

// ============================================================================
// Recording flows
// ============================================================================

#[test]
fn test_full_screen_recording_drives_click_overlay() {
    let h = harness();
    h.state.open_toolbar().unwrap();
    h.state.set_full_screen_recording(true).unwrap();

    let overlay = h.factory.latest(WindowKind::MouseClickOverlay).unwrap();
    assert!(h.hook.probe().running);

    h.hook.click(100, 200);
    assert_eq!(
        overlay.emitted(channels::MOUSE_CLICK),
        vec![json!({ "x": 100.0, "y": 200.0 })]
    );

    h.state.set_full_screen_recording(false).unwrap();
    assert!(overlay.calls().contains(&Call::Close));
    assert!(!h.hook.probe().running);
    assert!(!h.hook.probe().has_mouse_listener());
}

#[test]
fn test_closing_toolbar_mid_recording_detaches_mouse() {
    let h = harness();
    h.state.open_toolbar().unwrap();
    h.state.set_full_screen_recording(true).unwrap();

    h.state.close_window(WindowKind::RecorderFullScreen);
    assert!(!h.hook.probe().running);
    assert!(h
        .factory
        .latest(WindowKind::MouseClickOverlay)
        .unwrap()
        .calls()
        .contains(&Call::Close));
}

#[test]
fn test_source_clip_recording_locks_and_filters_clicks() {
    let h = harness();
    h.state
        .open_source_clip(Rect::new(100.0, 100.0, 640.0, 360.0))
        .unwrap();
    let clip = h.factory.latest(WindowKind::RecorderSourceClip).unwrap();

    h.state.set_source_clip_recording(true).unwrap();
    let overlay = h.factory.latest(WindowKind::MouseClickOverlay).unwrap();

    h.hook.click(50, 50);
    h.hook.click(200, 150);
    assert_eq!(
        overlay.emitted(channels::MOUSE_CLICK),
        vec![json!({ "x": 200.0, "y": 150.0 })]
    );

    // Locked: a drag is pulled back to the anchor
    h.state.on_window_moved(clip.label(), Point::new(300.0, 300.0));
    assert_eq!(
        clip.calls().last(),
        Some(&Call::SetPosition(Point::new(100.0, 100.0)))
    );

    h.state.set_source_clip_recording(false).unwrap();
    assert_eq!(
        clip.emitted(channels::RS_RECORDING_STATE_CHANGE),
        vec![json!(true), json!(false)]
    );
    assert!(!h.hook.probe().running);
}

#[test]
fn test_source_clip_recording_without_clip_is_noop() {
    let h = harness();
    h.state.set_source_clip_recording(true).unwrap();
    assert!(h.factory.created().is_empty());
    assert!(!h.hook.probe().running);
}

#[test]
fn test_source_clip_bounds_and_ignore_toggle() {
    let h = harness();
    assert_eq!(h.state.source_clip_bounds(), None);

    h.state
        .open_source_clip(Rect::new(10.0, 20.0, 300.0, 200.0))
        .unwrap();
    assert_eq!(
        h.state.source_clip_bounds(),
        Some(Rect::new(10.0, 20.0, 300.0, 200.0))
    );

    h.state.set_source_clip_ignore_mouse(true);
    let clip = h.factory.latest(WindowKind::RecorderSourceClip).unwrap();
    assert_eq!(clip.calls().last(), Some(&Call::IgnoreCursor(true)));
}

#[test]
fn test_moves_of_other_windows_are_ignored() {
    let h = harness();
    h.state
        .open_source_clip(Rect::new(100.0, 100.0, 400.0, 300.0))
        .unwrap();
    let screen = h.factory.latest(WindowKind::RecorderScreen).unwrap();
    screen.clear_calls();

    h.state.on_window_moved(screen.label(), Point::new(-500.0, 0.0));
    assert!(screen.calls().is_empty());

    let clip = h.factory.latest(WindowKind::RecorderSourceClip).unwrap();
    h.state.on_window_moved(clip.label(), Point::new(-50.0, 100.0));
    assert_eq!(
        clip.calls().last(),
        Some(&Call::SetPosition(Point::new(0.0, 100.0)))
    );
}

#[test]
fn test_recording_without_native_hook_still_opens_overlay() {
    let h = harness_with(FakeHookLoader::unavailable());
    h.state.open_toolbar().unwrap();
    h.state.set_full_screen_recording(true).unwrap();

    assert!(h.factory.latest(WindowKind::MouseClickOverlay).is_some());
    assert!(!h.hook.probe().running);
    h.state.set_full_screen_recording(false).unwrap();
}

// ============================================================================
// Key overlay
// ============================================================================

#[test]
fn test_key_overlay_attaches_and_detaches_keyboard() {
    let h = harness();
    h.state.open_keyboard_overlay().unwrap();
    assert!(h.hook.probe().has_key_listener());
    assert!(h.hook.probe().running);

    h.state.close_window(WindowKind::KeyboardOverlay);
    assert!(!h.hook.probe().has_key_listener());
    assert!(!h.hook.probe().running);
}

#[test]
fn test_destroyed_key_overlay_detaches_keyboard() {
    let h = harness();
    h.state.open_keyboard_overlay().unwrap();
    let overlay = h.factory.latest(WindowKind::KeyboardOverlay).unwrap();
    overlay.destroy();

    h.state.on_window_destroyed(overlay.label());
    assert!(!h.hook.probe().running);
}

#[test]
fn test_shutdown_stops_hook() {
    let h = harness();
    h.state.open_keyboard_overlay().unwrap();
    h.state.shutdown();
    assert!(!h.hook.probe().running);
}

// ============================================================================
// Theme and capture
// ============================================================================

#[test]
fn test_theme_changes_reach_every_window() {
    let h = harness();
    h.state.start().unwrap();
    h.state.open_settings().unwrap();

    h.state.set_theme(ThemeMode::Dark);
    h.state.set_theme_color(ThemeColor::DeepBlue);

    assert_eq!(h.state.theme(), ThemeMode::Dark);
    assert_eq!(h.state.theme_color(), ThemeColor::DeepBlue);
    for window in h.factory.created() {
        assert_eq!(window.emitted(channels::THEME_CHANGE), vec![json!("dark")]);
        assert_eq!(
            window.emitted(channels::THEME_COLOR_CHANGE),
            vec![json!("deep-blue")]
        );
    }
}

#[test]
fn test_theme_broadcast_skips_closed_windows() {
    let h = harness();
    h.state.start().unwrap();
    h.state.open_settings().unwrap();
    let settings = h.factory.latest(WindowKind::Settings).unwrap();
    h.state.close_window(WindowKind::Settings);

    h.state.set_theme(ThemeMode::Light);
    assert!(settings.emitted(channels::THEME_CHANGE).is_empty());
}

#[test]
fn test_shot_receives_snapshot_once_loaded() {
    let h = harness();
    h.state.open_shot().unwrap();
    let shot = h.factory.latest(WindowKind::RecorderShot).unwrap();
    assert!(shot.emitted(channels::SHOT_SHOW).is_empty());

    h.state.on_page_loaded(shot.label());
    assert_eq!(
        shot.emitted(channels::SHOT_SHOW),
        vec![json!("data:image/png;base64,DISPLAY1")]
    );
    assert_eq!(shot.calls().last(), Some(&Call::Show));
}

#[test]
fn test_desktop_capturer_source_describes_primary() {
    let h = harness();
    let source = h.state.desktop_capturer_source().unwrap();
    assert_eq!(source.display_id, 1);
    assert_eq!(source.width, 1920.0);
}
