use super::*;

#[test]
fn test_ctrl_space_arrives_as_null() {
    let event = ct::KeyEvent::new(ct::KeyCode::Null, ct::KeyModifiers::NONE);
    let converted = KeyEvent::from(event);
    assert_eq!(converted.code, KeyCode::Char(' '));
    assert!(converted.modifiers.contains(KeyModifiers::CONTROL));
}

#[test]
fn test_modifiers_map_one_to_one() {
    let mods = ct::KeyModifiers::CONTROL | ct::KeyModifiers::ALT;
    let converted = KeyModifiers::from(mods);
    assert!(converted.contains(KeyModifiers::CONTROL));
    assert!(converted.contains(KeyModifiers::ALT));
    assert!(!converted.contains(KeyModifiers::SHIFT));
    assert_eq!(KeyModifiers::from(ct::KeyModifiers::NONE), KeyModifiers::NONE);
}

#[test]
fn test_release_kind_is_kept() {
    let mut event = ct::KeyEvent::new(ct::KeyCode::Char('j'), ct::KeyModifiers::NONE);
    event.kind = ct::KeyEventKind::Release;
    let converted = KeyEvent::from(event);
    assert_eq!(converted.kind, KeyEventKind::Release);
    assert!(!converted.is_press());
}

#[test]
fn test_mouse_drag_converts_position() {
    let event = ct::MouseEvent {
        kind: ct::MouseEventKind::Drag(ct::MouseButton::Left),
        column: 7,
        row: 3,
        modifiers: ct::KeyModifiers::SHIFT,
    };
    assert_eq!(
        into_input_event(ct::Event::Mouse(event)),
        InputEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Drag(MouseButton::Left),
            column: 7,
            row: 3,
            modifiers: KeyModifiers::SHIFT,
        })
    );
}

#[test]
fn test_resize_and_paste_pass_through() {
    assert_eq!(into_input_event(ct::Event::Resize(100, 40)), InputEvent::Resize(100, 40));
    assert_eq!(
        into_input_event(ct::Event::Paste("hi".to_string())),
        InputEvent::Paste("hi".to_string())
    );
}
