use bevy::{
    input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel},
    prelude::*,
    window::PrimaryWindow,
};
use bevy_egui::{egui, EguiContexts, EguiPlugin};

use crate::config::PlannerConfig;
use crate::engine::geomath::{format_coordinate, format_distance};
use crate::engine::mission::MissionState;
use crate::engine::models::{MissionStatus, WaypointId};
use crate::engine::route::RouteView;
use crate::engine::waypoints::{SurfaceEvent, WaypointStore};

pub mod map;
use map::{
    fit_route_system, map_click_system, marker_popup_system, render_route_system,
    render_tiles_system, scale_markers_system, sync_markers_system, MarkerSelection, TileCache,
};

/// Width of the mission control side panel in logical pixels
pub const PANEL_WIDTH: f32 = 384.0;

pub struct UiPlugin {
    pub config: PlannerConfig,
}

impl UiPlugin {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }
}

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        let mission = MissionState::new(
            self.config.mission.initial_metrics,
            self.config.mission.tick_interval(),
        );

        app.add_plugins(EguiPlugin)
            .add_event::<SurfaceEvent>()
            .insert_resource(self.config.clone())
            .insert_resource(TileCache::new(self.config.tiles.clone()))
            .insert_resource(mission)
            .init_resource::<WaypointStore>()
            .init_resource::<MarkerSelection>()
            .add_systems(Startup, setup_camera)
            .add_systems(
                Update,
                (
                    ui_panel_system,
                    marker_popup_system,
                    map_click_system,
                    apply_surface_events_system,
                    sync_markers_system,
                    fit_route_system,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    mission_tick_system,
                    render_tiles_system,
                    render_route_system,
                    camera_movement_system,
                    scale_markers_system.after(camera_movement_system),
                ),
            );
    }
}

fn setup_camera(mut commands: Commands, config: Res<PlannerConfig>) {
    let center = map::project_mercator(&config.map.center);
    let scale = map::scale_for_zoom(config.map.zoom);

    commands.spawn((
        Camera2d,
        OrthographicProjection {
            scale,
            ..OrthographicProjection::default_2d()
        },
        // Keep the configured center in the middle of the visible map area
        Transform::from_xyz(center.x + PANEL_WIDTH / 2.0 * scale, center.y, 0.0),
    ));
}

/// The only place the waypoint sequence is mutated from map and list requests
fn apply_surface_events_system(
    mut events: EventReader<SurfaceEvent>,
    mut store: ResMut<WaypointStore>,
) {
    for event in events.read() {
        store.apply(event);
    }
}

fn mission_tick_system(time: Res<Time>, mut mission: ResMut<MissionState>) {
    if mission.is_running() {
        mission.tick(time.delta(), &mut rand::rng());
    }
}

fn status_color(status: MissionStatus) -> egui::Color32 {
    match status {
        MissionStatus::Idle => egui::Color32::from_rgb(0x94, 0xa3, 0xb8),
        MissionStatus::Running => egui::Color32::from_rgb(0x10, 0xb9, 0x81),
        MissionStatus::Completed => egui::Color32::from_rgb(0x3b, 0x82, 0xf6),
    }
}

/// Waypoint list of the side panel. `on_remove` fires for each removal click.
fn waypoint_list(ui: &mut egui::Ui, route: &RouteView, on_remove: &mut impl FnMut(WaypointId)) {
    if route.is_empty() {
        ui.vertical_centered(|ui| {
            ui.add_space(16.0);
            ui.weak("Click on the map to add waypoints");
            ui.add_space(16.0);
        });
        return;
    }

    egui::ScrollArea::vertical().max_height(256.0).show(ui, |ui| {
        for view in &route.waypoints {
            let role = view.role();
            let [r, g, b] = role.rgb();
            ui.group(|ui| {
                ui.horizontal(|ui| {
                    ui.colored_label(
                        egui::Color32::from_rgb(r, g, b),
                        egui::RichText::new(format!("● {}", view.order)).strong(),
                    );
                    ui.strong(role.list_title(view.order));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("✕").on_hover_text("Remove waypoint").clicked() {
                            on_remove(view.id.clone());
                        }
                    });
                });
                ui.monospace(format!("Lat: {}", format_coordinate(view.lat)));
                ui.monospace(format!("Lng: {}", format_coordinate(view.lng)));
            });
        }
    });
}

fn metric_card(ui: &mut egui::Ui, title: &str, value: String) {
    ui.group(|ui| {
        ui.vertical(|ui| {
            ui.small(title.to_uppercase());
            ui.heading(value);
        });
    });
}

fn ui_panel_system(
    mut contexts: EguiContexts,
    mut store: ResMut<WaypointStore>,
    mut mission: ResMut<MissionState>,
    mut selection: ResMut<MarkerSelection>,
    mut surface_events: EventWriter<SurfaceEvent>,
) {
    let ctx = contexts.ctx_mut();

    egui::TopBottomPanel::top("header").show(ctx, |ui| {
        ui.add_space(4.0);
        ui.heading("BO-AT Mission Planner");
        ui.add_space(4.0);
    });

    egui::SidePanel::right("mission_control")
        .exact_width(PANEL_WIDTH)
        .resizable(false)
        .show(ctx, |ui| {
            ui.heading("Mission Control");

            let can_start = mission.can_start(store.len());
            if ui
                .add_enabled(can_start, egui::Button::new("▶ Start Mission").min_size(egui::vec2(ui.available_width(), 32.0)))
                .clicked()
            {
                mission.start(store.len());
            }
            if ui
                .add(egui::Button::new("⟲ Reset").min_size(egui::vec2(ui.available_width(), 24.0)))
                .clicked()
            {
                store.reset();
                mission.reset();
                selection.0 = None;
            }

            ui.add_space(8.0);
            egui::Grid::new("mission_summary").num_columns(2).show(ui, |ui| {
                ui.label("Status:");
                ui.label("Waypoints:");
                ui.end_row();

                let status = mission.status();
                ui.colored_label(status_color(status), format!("● {}", status));
                ui.heading(store.len().to_string());
                ui.end_row();
            });

            if let Some(started) = mission.started_at() {
                let local = started.with_timezone(&chrono::Local);
                ui.label(format!("Started: {}", local.format("%Y-%m-%d %H:%M:%S")));
            }

            let route = RouteView::build(store.waypoints());
            if route.has_path() {
                ui.label(format!("Total distance: {}", format_distance(route.total_distance_m)));
            }

            ui.separator();
            ui.heading("Waypoints");
            waypoint_list(ui, &route, &mut |id| {
                surface_events.send(SurfaceEvent::RemoveRequested(id));
            });

            ui.separator();
            ui.heading("Metrics");
            let metrics = *mission.metrics();
            egui::Grid::new("metrics").num_columns(2).spacing([8.0, 8.0]).show(ui, |ui| {
                ui.vertical(|ui| {
                    metric_card(ui, "Battery", format!("{}%", metrics.battery.round()));
                    ui.add(egui::ProgressBar::new((metrics.battery / 100.0) as f32).desired_width(120.0));
                });
                metric_card(ui, "Wind Speed", format!("{:.1} kts", metrics.wind_speed));
                ui.end_row();

                metric_card(ui, "Speed", format!("{:.1} kts", metrics.speed));
                metric_card(ui, "Temp", format!("{}°", metrics.temperature.round()));
                ui.end_row();
            });
        });
}

fn camera_movement_system(
    mut contexts: EguiContexts,
    mut q_camera: Query<(&Camera, &GlobalTransform, &mut Transform, &mut OrthographicProjection), With<Camera2d>>,
    q_window: Query<&Window, With<PrimaryWindow>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    keyboard_input: Res<ButtonInput<KeyCode>>,
    mut mouse_motion_events: EventReader<MouseMotion>,
    mut scroll_evr: EventReader<MouseWheel>,
    time: Res<Time>,
) {
    let Ok((camera, camera_global_transform, mut transform, mut projection)) = q_camera.get_single_mut() else {
        return;
    };
    let pointer_on_panel = contexts.ctx_mut().is_pointer_over_area();

    // Keyboard panning
    let pan_speed = 500.0 * projection.scale * time.delta_secs();
    let mut pan = Vec2::ZERO;
    if keyboard_input.pressed(KeyCode::ArrowUp) || keyboard_input.pressed(KeyCode::KeyW) {
        pan.y += pan_speed;
    }
    if keyboard_input.pressed(KeyCode::ArrowDown) || keyboard_input.pressed(KeyCode::KeyS) {
        pan.y -= pan_speed;
    }
    if keyboard_input.pressed(KeyCode::ArrowLeft) || keyboard_input.pressed(KeyCode::KeyA) {
        pan.x -= pan_speed;
    }
    if keyboard_input.pressed(KeyCode::ArrowRight) || keyboard_input.pressed(KeyCode::KeyD) {
        pan.x += pan_speed;
    }
    transform.translation.x += pan.x;
    transform.translation.y += pan.y;

    // Left click places waypoints, so dragging uses the other buttons
    let dragging = mouse_buttons.pressed(MouseButton::Right) || mouse_buttons.pressed(MouseButton::Middle);
    for ev in mouse_motion_events.read() {
        if dragging && !pointer_on_panel {
            transform.translation.x -= ev.delta.x * projection.scale;
            transform.translation.y += ev.delta.y * projection.scale;
        }
    }

    // Scroll zoom keeps the point under the cursor fixed
    let Ok(window) = q_window.get_single() else {
        scroll_evr.clear();
        return;
    };
    for ev in scroll_evr.read() {
        if pointer_on_panel {
            continue;
        }
        let zoom_delta = match ev.unit {
            MouseScrollUnit::Line => -ev.y * 0.1,
            MouseScrollUnit::Pixel => -ev.y * 0.005,
        };
        let new_scale = (projection.scale.ln() + zoom_delta)
            .exp()
            .clamp(map::scale_for_zoom(map::MAX_TILE_ZOOM), map::scale_for_zoom(0));

        if let Some(cursor) = window.cursor_position() {
            if let Ok(world_pos) = camera.viewport_to_world_2d(camera_global_transform, cursor) {
                let ratio = new_scale / projection.scale;
                let new_translation = world_pos - (world_pos - transform.translation.truncate()) * ratio;
                transform.translation.x = new_translation.x;
                transform.translation.y = new_translation.y;
            }
        }
        projection.scale = new_scale;
    }
}
