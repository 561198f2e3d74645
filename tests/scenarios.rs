use image::{Rgba, RgbaImage};
use proptest::prelude::*;

use paintfe_core::canvas::PixelBuffer;
use paintfe_core::ops::fill::flood_fill_contiguous;
use paintfe_core::{
    Modifiers, Notification, PixelPos, PixelRect, PointerButton, Project, TRANSPARENT, Tool, ToolEvent, ToolShape,
};

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);

fn project(width: u32, height: u32) -> Project {
    let mut p = Project::new_untitled(1, width, height).unwrap();
    p.set_foreground_colour(RED);
    p
}

fn press(p: &mut Project, x: i32, y: i32) {
    let pos = PixelPos::new(x, y);
    p.apply_tool(ToolEvent::PointerPress { pos, button: PointerButton::Left, modifiers: Modifiers::default() });
}

fn move_to(p: &mut Project, x: i32, y: i32) {
    p.apply_tool(ToolEvent::PointerMove { pos: PixelPos::new(x, y), modifiers: Modifiers::default() });
}

fn release(p: &mut Project, x: i32, y: i32) {
    let pos = PixelPos::new(x, y);
    p.apply_tool(ToolEvent::PointerRelease { pos, button: PointerButton::Left, modifiers: Modifiers::default() });
}

fn drag(p: &mut Project, from: (i32, i32), to: (i32, i32)) {
    press(p, from.0, from.1);
    move_to(p, to.0, to.1);
    release(p, to.0, to.1);
}

fn raw(p: &Project) -> Vec<u8> {
    p.canvas().unwrap().layers[0].pixels.as_raw().to_vec()
}

fn pixel(p: &Project, x: i32, y: i32) -> Rgba<u8> {
    p.canvas().unwrap().layers[0].pixels.pixel(x, y)
}

fn red_pixels(p: &Project) -> Vec<(i32, i32)> {
    let mut out = Vec::new();
    for y in 0..p.canvas().unwrap().height as i32 {
        for x in 0..p.canvas().unwrap().width as i32 {
            if pixel(p, x, y) == RED {
                out.push((x, y));
            }
        }
    }
    out
}

#[test]
fn square_brush_paints_undoes_and_redoes() {
    let mut p = project(10, 10);
    p.set_tool_shape(ToolShape::Square);
    p.set_tool_size(3);
    press(&mut p, 5, 5);
    release(&mut p, 5, 5);

    let expected: Vec<(i32, i32)> = (4..=6).flat_map(|y| (4..=6).map(move |x| (x, y))).collect();
    assert_eq!(red_pixels(&p), expected);
    assert_eq!(pixel(&p, 3, 5), TRANSPARENT);

    p.undo();
    assert!(raw(&p).iter().all(|&b| b == 0));

    p.redo();
    assert_eq!(red_pixels(&p), expected);
}

#[test]
fn fill_replaces_only_the_seed_region() {
    let mut image = RgbaImage::new(10, 10);
    for (x, _, px) in image.enumerate_pixels_mut() {
        *px = if x < 5 { RED } else { BLUE };
    }
    let mut p = Project::from_image("halves", image).unwrap();
    p.set_tool(Tool::Fill);
    p.set_foreground_colour(GREEN);
    press(&mut p, 0, 0);
    release(&mut p, 0, 0);

    for y in 0..10 {
        for x in 0..10 {
            let want = if x < 5 { GREEN } else { BLUE };
            assert_eq!(pixel(&p, x, y), want, "pixel ({x}, {y})");
        }
    }
    assert_eq!(p.undo_count(), 1);
}

#[test]
fn stroke_is_one_undo_step() {
    let mut p = project(10, 10);
    press(&mut p, 1, 1);
    for x in 2..=8 {
        move_to(&mut p, x, 1 + x % 2);
    }
    release(&mut p, 8, 1);

    assert_eq!(p.undo_count(), 1);
    assert_eq!(pixel(&p, 1, 1), RED);
    assert_eq!(pixel(&p, 7, 2), RED);

    p.undo();
    assert!(raw(&p).iter().all(|&b| b == 0));
    assert!(!p.can_undo());
}

#[test]
fn separate_strokes_are_separate_steps() {
    let mut p = project(10, 10);
    drag(&mut p, (1, 1), (3, 1));
    drag(&mut p, (1, 5), (3, 5));
    assert_eq!(p.undo_count(), 2);
    p.undo();
    assert_eq!(pixel(&p, 2, 5), TRANSPARENT);
    assert_eq!(pixel(&p, 2, 1), RED);
}

#[test]
fn paste_survives_undo_redo_cycles() {
    let mut p = project(10, 10);
    let mut image = RgbaImage::new(2, 2);
    image.fill(255);
    let white = Rgba([255, 255, 255, 255]);

    p.paste(Some(image), PixelPos::new(2, 2));
    p.confirm_selection_modification();
    assert_eq!(p.undo_text().as_deref(), Some("Paste"));
    assert_eq!(pixel(&p, 3, 3), white);
    let pasted = raw(&p);

    for _ in 0..2 {
        p.undo();
        assert_eq!(pixel(&p, 3, 3), TRANSPARENT);
        p.redo();
        assert_eq!(raw(&p), pasted);
        assert_eq!(p.selection_area(), PixelRect::new(2, 2, 2, 2));
    }
}

#[test]
fn paste_uses_internal_clipboard() {
    let mut p = project(10, 10);
    press(&mut p, 1, 1);
    release(&mut p, 1, 1);
    p.set_selection_area(PixelRect::new(0, 0, 3, 3));
    assert!(p.copy_selection().is_some());

    p.paste(None, PixelPos::new(5, 5));
    p.confirm_selection_modification();
    assert_eq!(pixel(&p, 6, 6), RED);
    assert_eq!(pixel(&p, 1, 1), RED);
}

#[test]
fn move_there_and_back_in_a_macro_stays_saved() {
    let mut p = project(10, 10);
    p.set_tool_size(3);
    press(&mut p, 3, 3);
    release(&mut p, 3, 3);
    p.mark_saved();
    let saved = raw(&p);

    p.set_tool(Tool::Selection);
    p.set_selection_area(PixelRect::new(2, 2, 3, 3));
    p.begin_macro("Nudge");
    drag(&mut p, (3, 3), (8, 8));
    assert_eq!(p.selection_area(), PixelRect::new(7, 7, 3, 3));
    assert_eq!(pixel(&p, 8, 8), RED);
    drag(&mut p, (8, 8), (3, 3));
    p.take_notifications();
    p.end_macro();

    assert_eq!(raw(&p), saved);
    assert_eq!(p.undo_text().as_deref(), Some("Nudge"));
    assert!(!p.has_unsaved_changes());
    assert!(!p.take_notifications().contains(&Notification::UnsavedChangesChanged(true)));
}

#[test]
fn right_click_fill_uses_background() {
    let mut p = project(4, 4);
    p.set_tool(Tool::Fill);
    p.set_background_colour(BLUE);
    let pos = PixelPos::new(0, 0);
    p.apply_tool(ToolEvent::PointerPress { pos, button: PointerButton::Right, modifiers: Modifiers::default() });
    p.apply_tool(ToolEvent::PointerRelease { pos, button: PointerButton::Right, modifiers: Modifiers::default() });
    assert_eq!(pixel(&p, 3, 3), BLUE);
}

proptest! {
    #[test]
    fn selection_drag_stays_inside_canvas(
        x0 in -20i32..30, y0 in -20i32..30,
        x1 in -20i32..30, y1 in -20i32..30,
    ) {
        let mut p = project(10, 8);
        p.set_tool(Tool::Selection);
        drag(&mut p, (x0, y0), (x1, y1));
        let area = p.selection_area();
        prop_assert!(!p.has_selection() || (area.x >= 0 && area.y >= 0 && area.right() <= 10 && area.bottom() <= 8));
    }

    #[test]
    fn drags_to_far_off_canvas_points_stay_inside(
        x0 in any::<i32>(), y0 in any::<i32>(),
        x1 in any::<i32>(), y1 in any::<i32>(),
    ) {
        let mut p = project(10, 8);
        p.set_tool(Tool::Selection);
        drag(&mut p, (x0, y0), (x1, y1));
        let area = p.selection_area();
        prop_assert!(!p.has_selection() || PixelRect::canvas(10, 8).contains_rect(&area));

        p.set_selection_area(PixelRect::new(2, 2, 3, 3));
        drag(&mut p, (3, 3), (x1, y1));
        let area = p.selection_area();
        prop_assert_eq!((area.width, area.height), (3, 3));
        prop_assert!(PixelRect::canvas(10, 8).contains_rect(&area));

        p.set_tool(Tool::Pen);
        drag(&mut p, (x0, y0), (x1, y1));
        prop_assert_eq!(raw(&p).len(), 10 * 8 * 4);
    }

    #[test]
    fn pen_stroke_undo_redo_is_byte_identical(
        x0 in 0i32..12, y0 in 0i32..12,
        x1 in 0i32..12, y1 in 0i32..12,
        size in 1u32..5,
    ) {
        let mut p = project(12, 12);
        p.set_tool_size(size);
        drag(&mut p, (3, 3), (4, 3));
        let before = raw(&p);

        p.set_foreground_colour(BLUE);
        drag(&mut p, (x0, y0), (x1, y1));
        let after = raw(&p);

        p.undo();
        prop_assert_eq!(raw(&p), before);
        p.redo();
        prop_assert_eq!(raw(&p), after);
    }

    #[test]
    fn exact_fill_only_touches_seed_colour(
        cells in prop::collection::vec(any::<bool>(), 64),
        sx in 0i32..8, sy in 0i32..8,
    ) {
        let mut buffer = PixelBuffer::new(8, 8);
        for (i, red) in cells.iter().enumerate() {
            buffer.put_pixel(i as i32 % 8, i as i32 / 8, if *red { RED } else { BLUE });
        }
        let seed = PixelPos::new(sx, sy);
        let seed_colour = buffer.pixel_at(seed);
        let plan = flood_fill_contiguous(&buffer, seed, GREEN, 0);
        prop_assert!(!plan.pixels.is_empty());
        for (pos, _) in &plan.pixels {
            prop_assert_eq!(buffer.pixel_at(*pos), seed_colour);
        }
    }
}
