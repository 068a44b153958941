//! egui implementation of [`DebugGui`]
//!
//! Runs an `egui::Context` without a window: pointer, key, text and wheel
//! input is fed from the [`InputState`] each frame and the tessellated
//! output is discarded, so a
//! renderer backend that wants to draw the GUI can take over
//! [`EguiDebugGui::context`] and paint the shapes itself.

use crate::input::{GuiCapture, InputState, KeyCode, MouseButton};
use crate::scene::LightKind;

use super::{DebugGui, EntityView, FrameInfo, LightView, MaterialView, SceneView};

/// Lines scrolled per wheel notch
const WHEEL_LINES: f32 = 1.0;

fn egui_key(key: KeyCode) -> Option<egui::Key> {
    let key = match key {
        KeyCode::A => egui::Key::A,
        KeyCode::D => egui::Key::D,
        KeyCode::S => egui::Key::S,
        KeyCode::W => egui::Key::W,
        KeyCode::X => egui::Key::X,
        KeyCode::Space => egui::Key::Space,
        KeyCode::Tab => egui::Key::Tab,
        KeyCode::Enter => egui::Key::Enter,
        KeyCode::Escape => egui::Key::Escape,
        KeyCode::Backspace => egui::Key::Backspace,
        KeyCode::Delete => egui::Key::Delete,
        KeyCode::Up => egui::Key::ArrowUp,
        KeyCode::Down => egui::Key::ArrowDown,
        KeyCode::Left => egui::Key::ArrowLeft,
        KeyCode::Right => egui::Key::ArrowRight,
        KeyCode::LeftShift | KeyCode::LeftControl | KeyCode::LeftAlt => return None,
    };
    Some(key)
}

const BUTTONS: [(MouseButton, egui::PointerButton); 3] = [
    (MouseButton::Left, egui::PointerButton::Primary),
    (MouseButton::Right, egui::PointerButton::Secondary),
    (MouseButton::Middle, egui::PointerButton::Middle),
];

/// Debug GUI drawn with egui
pub struct EguiDebugGui {
    ctx: egui::Context,
    buttons_down: [bool; 3],
}

impl Default for EguiDebugGui {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EguiDebugGui {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EguiDebugGui").field("buttons_down", &self.buttons_down).finish_non_exhaustive()
    }
}

impl EguiDebugGui {
    /// Create a GUI with a fresh egui context
    pub fn new() -> Self {
        Self {
            ctx: egui::Context::default(),
            buttons_down: [false; 3],
        }
    }

    /// The underlying egui context
    pub fn context(&self) -> &egui::Context {
        &self.ctx
    }

    fn raw_input(&mut self, input: &InputState, info: &FrameInfo) -> egui::RawInput {
        let modifiers = egui::Modifiers {
            alt: input.raw_key_down(KeyCode::LeftAlt),
            ctrl: input.raw_key_down(KeyCode::LeftControl),
            shift: input.raw_key_down(KeyCode::LeftShift),
            mac_cmd: false,
            command: input.raw_key_down(KeyCode::LeftControl),
        };

        let cursor = input.mouse_position();
        let pos = egui::pos2(cursor.x, cursor.y);
        let mut events = vec![egui::Event::PointerMoved(pos)];

        for (slot, (button, pointer)) in BUTTONS.iter().enumerate() {
            let down = input.raw_mouse_down(*button);
            if down != self.buttons_down[slot] {
                events.push(egui::Event::PointerButton {
                    pos,
                    button: *pointer,
                    pressed: down,
                    modifiers,
                });
                self.buttons_down[slot] = down;
            }
        }

        for &(key, pressed) in input.raw_key_events() {
            if let Some(key) = egui_key(key) {
                events.push(egui::Event::Key {
                    key,
                    physical_key: None,
                    pressed,
                    repeat: false,
                    modifiers,
                });
            }
        }

        if !input.text_input().is_empty() {
            events.push(egui::Event::Text(input.text_input().to_string()));
        }

        let wheel = input.raw_wheel_delta();
        if wheel != 0.0 {
            events.push(egui::Event::MouseWheel {
                unit: egui::MouseWheelUnit::Line,
                delta: egui::vec2(0.0, wheel * WHEEL_LINES),
                modifiers,
            });
        }

        egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(info.width as f32, info.height as f32),
            )),
            modifiers,
            events,
            ..Default::default()
        }
    }
}

impl DebugGui for EguiDebugGui {
    fn frame(&mut self, input: &InputState, info: &FrameInfo, view: &mut SceneView) -> GuiCapture {
        let raw_input = self.raw_input(input, info);
        // Shapes are not painted here
        let _ = self.ctx.run(raw_input, |ctx| {
            stats_window(ctx, info, view);
            scene_window(ctx, view);
        });

        let mut capture = GuiCapture::empty();
        if self.ctx.wants_keyboard_input() {
            capture |= GuiCapture::KEYBOARD;
        }
        if self.ctx.wants_pointer_input() {
            capture |= GuiCapture::MOUSE;
        }
        capture
    }
}

fn stats_window(ctx: &egui::Context, info: &FrameInfo, view: &SceneView) {
    egui::Window::new("Program Stats").default_pos([10.0, 10.0]).show(ctx, |ui| {
        ui.label(format!("Framerate: {:.0} fps", info.frame_rate));
        ui.collapsing("Window Properties", |ui| {
            ui.label(format!("Width: {}", info.width));
            ui.label(format!("Height: {}", info.height));
            let aspect = if info.height == 0 { 0.0 } else { info.width as f32 / info.height as f32 };
            ui.label(format!("Aspect ratio: {aspect:.3}"));
        });
        ui.collapsing("Scene Properties", |ui| {
            ui.label(format!("Entities: {}", view.entities.len()));
            ui.label(format!("Lights: {}", view.lights.len()));
            ui.label(format!("Materials: {}", view.materials.len()));
        });
    });
}

fn scene_window(ctx: &egui::Context, view: &mut SceneView) {
    egui::Window::new("Scene").default_pos([10.0, 160.0]).show(ctx, |ui| {
        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.collapsing("Entities", |ui| entities_section(ui, view));
            ui.collapsing("Lights", |ui| lights_section(ui, view));
            ui.collapsing("Cameras", |ui| camera_section(ui, view));
            ui.collapsing("Materials", |ui| materials_section(ui, view));
        });
    });
}

fn drag_vec3(ui: &mut egui::Ui, label: &str, value: &mut [f32; 3], speed: f64) {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.add(egui::DragValue::new(&mut value[0]).speed(speed).prefix("x: "));
        ui.add(egui::DragValue::new(&mut value[1]).speed(speed).prefix("y: "));
        ui.add(egui::DragValue::new(&mut value[2]).speed(speed).prefix("z: "));
    });
}

fn combo(ui: &mut egui::Ui, label: &str, selected: &mut usize, names: &[String]) {
    egui::ComboBox::from_label(label).show_index(ui, selected, names.len(), |i| {
        names.get(i).cloned().unwrap_or_default()
    });
}

fn entities_section(ui: &mut egui::Ui, view: &mut SceneView) {
    let names: Vec<String> = view.entities.iter().map(|e| e.name.clone()).collect();
    let catalog = &view.catalog;

    for (i, entity) in view.entities.iter_mut().enumerate() {
        ui.push_id(("entity", i), |ui| {
            ui.collapsing(format!("Entity {i}: {}", entity.name), |ui| {
                entity_row(ui, i, entity, &names, &catalog.meshes, &catalog.materials);
            });
        });
    }
}

fn entity_row(
    ui: &mut egui::Ui,
    index: usize,
    entity: &mut EntityView,
    names: &[String],
    meshes: &[String],
    materials: &[String],
) {
    combo(ui, "Mesh", &mut entity.mesh, meshes);
    combo(ui, "Material", &mut entity.material, materials);
    drag_vec3(ui, "Position", &mut entity.position, 0.01);
    drag_vec3(ui, "Rotation", &mut entity.rotation, 0.01);
    drag_vec3(ui, "Scale", &mut entity.scale, 0.01);

    ui.collapsing("Children", |ui| {
        for (j, child) in entity.children.iter_mut().enumerate() {
            if j == index {
                continue;
            }
            let name = names.get(j).map_or("", String::as_str);
            ui.checkbox(child, format!("Entity {j}: {name}"));
        }
    });
}

fn lights_section(ui: &mut egui::Ui, view: &mut SceneView) {
    ui.add(egui::Slider::new(&mut view.light_count, 0..=view.max_lights).text("Light count"));

    for (i, light) in view.lights.iter_mut().enumerate() {
        ui.push_id(("light", i), |ui| {
            ui.collapsing(format!("Light {i}"), |ui| light_row(ui, light));
        });
    }
}

fn light_row(ui: &mut egui::Ui, light: &mut LightView) {
    ui.horizontal(|ui| {
        for kind in LightKind::ALL {
            ui.radio_value(&mut light.kind, kind, kind.label());
        }
    });

    if matches!(light.kind, LightKind::Directional | LightKind::Spot) {
        ui.horizontal(|ui| {
            ui.label("Direction");
            for axis in &mut light.direction {
                ui.add(egui::Slider::new(axis, -1.0..=1.0));
            }
        });
    }
    if matches!(light.kind, LightKind::Point | LightKind::Spot) {
        drag_vec3(ui, "Position", &mut light.position, 0.05);
        ui.add(egui::Slider::new(&mut light.range, 0.0..=20.0).text("Range"));
    }
    if light.kind == LightKind::Spot {
        ui.add(egui::Slider::new(&mut light.spot_falloff, 0.0..=64.0).text("Spot falloff"));
    }

    ui.horizontal(|ui| {
        ui.label("Color");
        ui.color_edit_button_rgb(&mut light.color);
    });
    ui.add(egui::Slider::new(&mut light.intensity, 0.0..=5.0).text("Intensity"));
}

fn camera_section(ui: &mut egui::Ui, view: &mut SceneView) {
    let camera = &mut view.camera;
    ui.label(format!("Active: {}", camera.label));
    drag_vec3(ui, "Position", &mut camera.position, 0.05);
    ui.horizontal(|ui| {
        ui.label("Rotation");
        ui.add(egui::DragValue::new(&mut camera.pitch_yaw[0]).speed(0.01).prefix("pitch: "));
        ui.add(egui::DragValue::new(&mut camera.pitch_yaw[1]).speed(0.01).prefix("yaw: "));
    });
}

fn materials_section(ui: &mut egui::Ui, view: &mut SceneView) {
    let textures = &view.catalog.textures;

    for (i, material) in view.materials.iter_mut().enumerate() {
        ui.push_id(("material", i), |ui| {
            ui.collapsing(format!("Material {i}: {}", material.name), |ui| {
                material_row(ui, material, textures);
            });
        });
    }
}

fn material_row(ui: &mut egui::Ui, material: &mut MaterialView, textures: &[String]) {
    ui.checkbox(&mut material.pbr, "PBR");
    if !material.pbr {
        ui.add(egui::Slider::new(&mut material.shininess, 0.0..=256.0).text("Shininess"));
    }
    ui.horizontal(|ui| {
        ui.label("Color");
        ui.color_edit_button_rgb(&mut material.color);
    });
    combo(ui, "Albedo", &mut material.albedo, textures);
    combo(ui, "Normal", &mut material.normal, textures);
    combo(ui, "Roughness", &mut material.roughness, textures);
    combo(ui, "Metal", &mut material.metal, textures);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::{CameraView, Catalog};

    fn sample_view() -> SceneView {
        SceneView {
            entities: vec![EntityView {
                name: "Cobblestone".to_string(),
                mesh: 0,
                material: 0,
                position: [0.0, 1.0, 0.0],
                rotation: [0.0; 3],
                scale: [3.0; 3],
                children: vec![false],
            }],
            lights: vec![LightView::default()],
            light_count: 1,
            max_lights: 64,
            camera: CameraView {
                label: "First-Person Controllable".to_string(),
                position: [0.0, 0.0, 10.0],
                pitch_yaw: [0.0, 0.0],
            },
            materials: vec![MaterialView {
                name: "Cobblestone".to_string(),
                pbr: true,
                shininess: 256.0,
                color: [1.0; 3],
                albedo: 0,
                normal: 1,
                roughness: 2,
                metal: 3,
            }],
            catalog: Catalog {
                meshes: vec!["Sphere".to_string()],
                materials: vec!["Cobblestone".to_string()],
                textures: ["Albedo", "Normals", "Roughness", "Metal"].map(String::from).to_vec(),
            },
        }
    }

    fn info() -> FrameInfo {
        FrameInfo { frame_rate: 60.0, width: 1280, height: 720 }
    }

    #[test]
    fn test_idle_frames_leave_view_untouched() {
        let mut gui = EguiDebugGui::new();
        let input = InputState::new();
        let original = sample_view();
        let mut view = original.clone();

        for _ in 0..3 {
            let capture = gui.frame(&input, &info(), &mut view);
            assert!(!capture.contains(GuiCapture::KEYBOARD));
        }

        assert_eq!(view, original);
    }

    #[test]
    fn test_button_edges_are_tracked() {
        let mut gui = EguiDebugGui::new();
        let mut input = InputState::new();
        let mut view = sample_view();

        input.set_button(MouseButton::Left, true);
        gui.frame(&input, &info(), &mut view);
        assert!(gui.buttons_down[0]);

        input.set_button(MouseButton::Left, false);
        gui.frame(&input, &info(), &mut view);
        assert!(!gui.buttons_down[0]);
    }

    fn text_frame(gui: &mut EguiDebugGui, input: &InputState, text: &mut String) {
        let raw_input = gui.raw_input(input, &info());
        let _ = gui.ctx.run(raw_input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                let response = ui.text_edit_singleline(text);
                if !response.has_focus() {
                    response.request_focus();
                }
            });
        });
    }

    #[test]
    fn test_input_is_forwarded_as_egui_events() {
        let mut gui = EguiDebugGui::new();
        let mut input = InputState::new();
        input.set_key(KeyCode::Enter, true);
        input.set_key(KeyCode::LeftShift, true);
        input.type_text("7");
        input.handle_event(&crate::application::AppEvent::MouseWheel { delta_x: 0.0, delta_y: -2.0 });

        let events = gui.raw_input(&input, &info()).events;

        assert!(events.iter().any(|e| matches!(
            e,
            egui::Event::Key { key: egui::Key::Enter, pressed: true, modifiers, .. } if modifiers.shift
        )));
        assert!(events.contains(&egui::Event::Text("7".to_string())));
        assert!(events.iter().any(|e| matches!(
            e,
            egui::Event::MouseWheel { unit: egui::MouseWheelUnit::Line, delta, .. } if delta.y < 0.0
        )));
        let keys = events.iter().filter(|e| matches!(e, egui::Event::Key { .. })).count();
        assert_eq!(keys, 1);
    }

    #[test]
    fn test_typing_edits_focused_field() {
        let mut gui = EguiDebugGui::new();
        let mut input = InputState::new();
        let mut text = String::new();

        text_frame(&mut gui, &input, &mut text);

        input.type_text("42");
        text_frame(&mut gui, &input, &mut text);
        input.end_frame();
        assert_eq!(text, "42");
        assert!(gui.ctx.wants_keyboard_input());

        input.set_key(KeyCode::Backspace, true);
        text_frame(&mut gui, &input, &mut text);
        input.end_frame();
        assert_eq!(text, "4");
    }
}
