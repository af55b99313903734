use bevy::{prelude::*, tasks::{IoTaskPool, Task}, window::PrimaryWindow};
use bevy_egui::{egui, EguiContexts};
use futures_lite::future;
use image::{load_from_memory_with_format, ImageFormat};
use log::warn;
use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::config::{PlannerConfig, TileConfig};
use crate::engine::geomath::format_coordinate;
use crate::engine::models::{Coordinate, WaypointId, WaypointRole};
use crate::engine::route::{RouteView, WaypointView};
use crate::engine::waypoints::{SurfaceEvent, WaypointStore};

pub const TILE_SIZE: f32 = 256.0;
/// Width of the projected world in world units. Equivalent to slippy zoom 1.
pub const WORLD_SIZE: f32 = 2.0 * TILE_SIZE;
pub const MAX_TILE_ZOOM: u8 = 19;
/// How long a tile that failed to download is left alone before retrying
pub const TILE_RETRY_BACKOFF: Duration = Duration::from_secs(30);
/// Web Mercator is undefined at the poles
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

/// Marker disc radius in screen pixels
pub const MARKER_RADIUS_PX: f32 = 20.0;
const MARKER_BORDER_PX: f32 = 3.0;
const ARROW_LENGTH_PX: f32 = 12.0;
const ARROW_HALF_WIDTH_PX: f32 = 8.0;

const ROUTE_COLOR: Color = Color::srgba(0.231, 0.510, 0.965, 0.8);

/// Projects a geographical coordinate to Web Mercator world coordinates (y up)
pub fn project_mercator(coord: &Coordinate) -> Vec2 {
    let lat_rad = coord.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let x = (coord.lng + 180.0) / 360.0;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0;

    // Mercator rows grow downwards, bevy's y axis grows upwards
    Vec2::new((x * WORLD_SIZE as f64) as f32, -(y * WORLD_SIZE as f64) as f32)
}

/// Inverts [`project_mercator`]
pub fn inverse_project_mercator(pos: Vec2) -> Coordinate {
    let lng = pos.x as f64 / WORLD_SIZE as f64 * 360.0 - 180.0;
    let y = -pos.y as f64 / WORLD_SIZE as f64;
    let lat = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();
    Coordinate::new(lat, lng)
}

/// World units per screen pixel at which tiles of `zoom` show at native size
pub fn scale_for_zoom(zoom: u8) -> f32 {
    WORLD_SIZE / (TILE_SIZE * f32::powi(2.0, zoom as i32))
}

/// Tile zoom to request for a camera scale, one level sharper than native
pub fn tile_zoom_for_scale(scale: f32) -> u8 {
    let z = (2.0 - scale.log2()).round() as i32;
    z.clamp(0, MAX_TILE_ZOOM as i32) as u8
}

/// Camera scale that fits `extent` (world units) into `viewport` (pixels) minus padding
pub fn fit_scale(extent: Vec2, viewport: Vec2, padding: f32) -> f32 {
    let usable = (viewport - Vec2::splat(2.0 * padding)).max(Vec2::ONE);
    let scale = (extent.x / usable.x).max(extent.y / usable.y);
    scale.max(scale_for_zoom(MAX_TILE_ZOOM))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileKey {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl TileKey {
    pub fn world_size(zoom: u8) -> f32 {
        WORLD_SIZE / f32::powi(2.0, zoom as i32)
    }

    pub fn world_center(&self) -> Vec2 {
        let size = Self::world_size(self.zoom);
        Vec2::new((self.x as f32 + 0.5) * size, -((self.y as f32 + 0.5) * size))
    }

    pub fn url(&self, template: &str) -> String {
        template
            .replace("{z}", &self.zoom.to_string())
            .replace("{x}", &self.x.to_string())
            .replace("{y}", &self.y.to_string())
    }

    pub fn cache_path(&self, cache_dir: &str) -> PathBuf {
        PathBuf::from(cache_dir)
            .join(self.zoom.to_string())
            .join(format!("{}_{}.png", self.x, self.y))
    }
}

/// Tiles at `zoom` intersecting the world-space rectangle `min..max`
pub fn visible_tiles(min: Vec2, max: Vec2, zoom: u8) -> Vec<TileKey> {
    let size = TileKey::world_size(zoom);
    let max_index = (1i64 << zoom) - 1;
    let to_index = |v: f32| ((v / size).floor() as i64).clamp(0, max_index) as u32;

    let (x_min, x_max) = (to_index(min.x), to_index(max.x));
    // World y is negated
    let (y_min, y_max) = (to_index(-max.y), to_index(-min.y));

    let mut keys = Vec::new();
    for x in x_min..=x_max {
        for y in y_min..=y_max {
            keys.push(TileKey { zoom, x, y });
        }
    }
    keys
}

/// True when the tile lies within `margin` world units of the rectangle `min..max`
pub fn tile_near_view(key: &TileKey, min: Vec2, max: Vec2, margin: f32) -> bool {
    let half = TileKey::world_size(key.zoom) / 2.0;
    let center = key.world_center();
    center.x + half >= min.x - margin
        && center.x - half <= max.x + margin
        && center.y + half >= min.y - margin
        && center.y - half <= max.y + margin
}

/// Reads a tile from the disk cache, downloading and caching it on a miss
fn fetch_tile(
    key: TileKey,
    config: &TileConfig,
    client: Option<&reqwest::blocking::Client>,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let cache_file = key.cache_path(&config.cache_dir);
    if let Ok(bytes) = fs::read(&cache_file) {
        return Ok(bytes);
    }

    let client = client.ok_or("no HTTP client available")?;
    let bytes = client
        .get(key.url(&config.url_template))
        .send()?
        .error_for_status()?
        .bytes()?
        .to_vec();

    if let Some(dir) = cache_file.parent() {
        if let Err(e) = fs::create_dir_all(dir).and_then(|_| fs::write(&cache_file, &bytes)) {
            warn!("Could not cache tile {:?}: {}", cache_file, e);
        }
    }
    Ok(bytes)
}

#[derive(Component)]
pub struct TileDownloadTask(Task<(TileKey, Option<Vec<u8>>)>);

#[derive(Component)]
pub struct MapTile {
    pub key: TileKey,
}

/// Tracks which tiles are on screen, in flight or recently failed
#[derive(Resource)]
pub struct TileCache {
    pub config: TileConfig,
    pub loaded: HashSet<TileKey>,
    pub downloading: HashSet<TileKey>,
    /// Failed tiles and when they failed
    pub failed: HashMap<TileKey, Instant>,
    /// Shared by every download task; `None` leaves only the disk cache
    client: Option<reqwest::blocking::Client>,
}

impl TileCache {
    pub fn new(config: TileConfig) -> Self {
        let client = match reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
        {
            Ok(client) => Some(client),
            Err(e) => {
                log::error!("Could not build tile HTTP client, using cached tiles only: {}", e);
                None
            }
        };
        Self {
            config,
            loaded: HashSet::new(),
            downloading: HashSet::new(),
            failed: HashMap::new(),
            client,
        }
    }

    pub fn wants(&self, key: &TileKey, now: Instant) -> bool {
        if self.loaded.contains(key) || self.downloading.contains(key) {
            return false;
        }
        match self.failed.get(key) {
            Some(failed_at) => now.saturating_duration_since(*failed_at) >= TILE_RETRY_BACKOFF,
            None => true,
        }
    }

    pub fn mark_failed(&mut self, key: TileKey, now: Instant) {
        self.downloading.remove(&key);
        self.failed.insert(key, now);
    }

    fn has_download_slot(&self) -> bool {
        self.downloading.len() < self.config.max_concurrent_downloads
    }
}

pub fn render_tiles_system(
    mut commands: Commands,
    mut tile_cache: ResMut<TileCache>,
    mut images: ResMut<Assets<Image>>,
    mut tasks_query: Query<(Entity, &mut TileDownloadTask)>,
    q_camera: Query<(&Transform, &OrthographicProjection), With<Camera2d>>,
    q_window: Query<&Window, With<PrimaryWindow>>,
    q_tiles: Query<(Entity, &MapTile)>,
) {
    let now = Instant::now();

    // 1. Finished downloads become sprites
    for (entity, mut task) in &mut tasks_query {
        let Some((key, result)) = future::block_on(future::poll_once(&mut task.0)) else {
            continue;
        };
        commands.entity(entity).despawn();

        let Some(bytes) = result else {
            tile_cache.mark_failed(key, now);
            continue;
        };
        let rgba = match load_from_memory_with_format(&bytes, ImageFormat::Png) {
            Ok(decoded) => decoded.to_rgba8(),
            Err(e) => {
                warn!("Tile {:?} is not a valid PNG: {}", key, e);
                tile_cache.mark_failed(key, now);
                continue;
            }
        };
        tile_cache.downloading.remove(&key);
        tile_cache.failed.remove(&key);
        let (width, height) = rgba.dimensions();
        let image = Image::new(
            bevy::render::render_resource::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            bevy::render::render_resource::TextureDimension::D2,
            rgba.into_raw(),
            bevy::render::render_resource::TextureFormat::Rgba8UnormSrgb,
            bevy::asset::RenderAssetUsages::default(),
        );

        let size = TileKey::world_size(key.zoom);
        let center = key.world_center();
        commands.spawn((
            Sprite {
                image: images.add(image),
                custom_size: Some(Vec2::splat(size)),
                ..default()
            },
            // Sharper zoom levels draw on top
            Transform::from_xyz(center.x, center.y, -20.0 + key.zoom as f32 * 0.1),
            MapTile { key },
        ));
        tile_cache.loaded.insert(key);
    }

    // 2. Request the tiles covering the view
    let Ok((transform, projection)) = q_camera.get_single() else {
        return;
    };
    let (window_width, window_height) = q_window
        .get_single()
        .map(|w| (w.width(), w.height()))
        .unwrap_or((1280.0, 720.0));
    let half = Vec2::new(window_width, window_height) * projection.scale / 2.0;
    let center = transform.translation.truncate();
    let target_zoom = tile_zoom_for_scale(projection.scale);

    let (view_min, view_max) = (center - half, center + half);

    for key in visible_tiles(view_min, view_max, target_zoom) {
        if !tile_cache.wants(&key, now) {
            continue;
        }
        if !tile_cache.has_download_slot() {
            break;
        }
        tile_cache.downloading.insert(key);

        let config = tile_cache.config.clone();
        let client = tile_cache.client.clone();
        let task = IoTaskPool::get().spawn(async move {
            match fetch_tile(key, &config, client.as_ref()) {
                Ok(bytes) => (key, Some(bytes)),
                Err(e) => {
                    warn!("Failed to fetch tile {:?}: {}", key, e);
                    (key, None)
                }
            }
        });
        commands.spawn(TileDownloadTask(task));
    }

    // 3. Drop tiles more than one level away or a screen beyond the view
    let margin = half.max_element();
    for (entity, tile) in &q_tiles {
        let wrong_zoom = (tile.key.zoom as i32 - target_zoom as i32).abs() > 1;
        if wrong_zoom || !tile_near_view(&tile.key, view_min, view_max, margin) {
            commands.entity(entity).despawn();
            tile_cache.loaded.remove(&tile.key);
        }
    }
}

/// Waypoint currently showing its popup
#[derive(Resource, Default, Debug)]
pub struct MarkerSelection(pub Option<WaypointId>);

/// Marker disc spawned for a waypoint
#[derive(Component)]
pub struct WaypointMarker {
    pub id: WaypointId,
}

fn role_color(role: WaypointRole) -> Color {
    let [r, g, b] = role.rgb();
    Color::srgb_u8(r, g, b)
}

/// Respawns the marker entities whenever the waypoint sequence changes
pub fn sync_markers_system(
    mut commands: Commands,
    store: Res<WaypointStore>,
    q_markers: Query<Entity, With<WaypointMarker>>,
    q_camera: Query<&OrthographicProjection, With<Camera2d>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    if !store.is_changed() {
        return;
    }
    for entity in &q_markers {
        commands.entity(entity).despawn_recursive();
    }

    let scale = q_camera.get_single().map(|p| p.scale).unwrap_or(1.0);
    let disc = meshes.add(Circle::new(MARKER_RADIUS_PX));
    let ring = meshes.add(Circle::new(MARKER_RADIUS_PX + MARKER_BORDER_PX));
    let white = materials.add(ColorMaterial::from(Color::WHITE));

    let route = RouteView::build(store.waypoints());
    for view in &route.waypoints {
        let pos = project_mercator(&view.coordinate());
        let fill = materials.add(ColorMaterial::from(role_color(view.role())));

        commands
            .spawn((
                Mesh2d(disc.clone()),
                MeshMaterial2d(fill),
                Transform::from_xyz(pos.x, pos.y, 10.0).with_scale(Vec3::splat(scale)),
                WaypointMarker { id: view.id.clone() },
            ))
            .with_children(|parent| {
                parent.spawn((
                    Mesh2d(ring.clone()),
                    MeshMaterial2d(white.clone()),
                    Transform::from_xyz(0.0, 0.0, -0.05),
                ));
                parent.spawn((
                    Text2d::new(view.order.to_string()),
                    TextFont {
                        font_size: 16.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                    Transform::from_xyz(0.0, 0.0, 0.05),
                ));
            });
    }
}

/// Keeps markers at a constant on-screen size while zooming
pub fn scale_markers_system(
    q_camera: Query<&OrthographicProjection, (With<Camera2d>, Changed<OrthographicProjection>)>,
    mut q_markers: Query<&mut Transform, With<WaypointMarker>>,
) {
    let Ok(projection) = q_camera.get_single() else {
        return;
    };
    for mut transform in &mut q_markers {
        transform.scale = Vec3::splat(projection.scale);
    }
}

/// Draws the connecting path and one direction arrow per segment
pub fn render_route_system(
    store: Res<WaypointStore>,
    mut gizmos: Gizmos,
    q_camera: Query<&OrthographicProjection, With<Camera2d>>,
) {
    let route = RouteView::build(store.waypoints());
    if !route.has_path() {
        return;
    }
    let scale = q_camera.get_single().map(|p| p.scale).unwrap_or(1.0);

    let points: Vec<Vec2> = route
        .waypoints
        .iter()
        .map(|wp| project_mercator(&wp.coordinate()))
        .collect();
    gizmos.linestrip_2d(points, ROUTE_COLOR);

    for segment in &route.segments {
        let anchor = project_mercator(&segment.midpoint);
        // Bearing is measured clockwise from north
        let heading = (segment.bearing_deg as f32).to_radians();
        let dir = Vec2::new(heading.sin(), heading.cos());
        let normal = Vec2::new(dir.y, -dir.x);

        let tip = anchor + dir * (ARROW_LENGTH_PX / 2.0) * scale;
        let base = anchor - dir * (ARROW_LENGTH_PX / 2.0) * scale;
        let left = base + normal * ARROW_HALF_WIDTH_PX * scale;
        let right = base - normal * ARROW_HALF_WIDTH_PX * scale;
        gizmos.linestrip_2d([tip, left, right, tip], ROUTE_COLOR);
    }
}

/// Converts a left click into either a marker selection or a new waypoint
pub fn map_click_system(
    mut contexts: EguiContexts,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    q_window: Query<&Window, With<PrimaryWindow>>,
    q_camera: Query<(&Camera, &GlobalTransform, &OrthographicProjection), With<Camera2d>>,
    store: Res<WaypointStore>,
    mut selection: ResMut<MarkerSelection>,
    mut surface_events: EventWriter<SurfaceEvent>,
) {
    if !mouse_buttons.just_pressed(MouseButton::Left) {
        return;
    }
    let ctx = contexts.ctx_mut();
    if ctx.wants_pointer_input() || ctx.is_pointer_over_area() {
        return;
    }
    let Ok(window) = q_window.get_single() else { return };
    let Ok((camera, camera_transform, projection)) = q_camera.get_single() else { return };
    let Some(cursor) = window.cursor_position() else { return };
    let Ok(world_pos) = camera.viewport_to_world_2d(camera_transform, cursor) else { return };

    let hit_radius = MARKER_RADIUS_PX * projection.scale;
    let hit = store
        .waypoints()
        .iter()
        .map(|wp| (wp, project_mercator(&wp.coordinate()).distance(world_pos)))
        .filter(|(_, dist)| *dist <= hit_radius)
        .min_by(|a, b| a.1.total_cmp(&b.1));

    if let Some((wp, _)) = hit {
        selection.0 = Some(wp.id.clone());
        return;
    }

    selection.0 = None;
    let coord = inverse_project_mercator(world_pos).normalized();
    surface_events.send(SurfaceEvent::Clicked {
        lat: coord.lat,
        lng: coord.lng,
    });
}

/// Popup of a single marker. `on_remove` fires when the user removes the waypoint.
pub fn show_marker_popup(
    ctx: &egui::Context,
    view: &WaypointView,
    anchor: egui::Pos2,
    on_remove: impl FnOnce(WaypointId),
) -> bool {
    let role = view.role();
    let [r, g, b] = role.rgb();
    let mut open = true;
    let mut remove = false;

    egui::Window::new(role.popup_title(view.order))
        .id(egui::Id::new(("marker_popup", view.id.as_str())))
        .fixed_pos(anchor)
        .collapsible(false)
        .resizable(false)
        .open(&mut open)
        .show(ctx, |ui| {
            ui.colored_label(egui::Color32::from_rgb(r, g, b), format!("● {}", view.order));
            ui.monospace(format!("Lat: {}", format_coordinate(view.lat)));
            ui.monospace(format!("Lng: {}", format_coordinate(view.lng)));
            if let Some(label) = &view.next_segment_distance_label {
                ui.label(format!("Next: {}", label));
            }
            ui.add_space(4.0);
            if ui.button("Remove Waypoint").clicked() {
                remove = true;
            }
        });

    if remove {
        on_remove(view.id.clone());
        return false;
    }
    open
}

pub fn marker_popup_system(
    mut contexts: EguiContexts,
    store: Res<WaypointStore>,
    mut selection: ResMut<MarkerSelection>,
    q_camera: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    mut surface_events: EventWriter<SurfaceEvent>,
) {
    let Some(id) = selection.0.clone() else { return };
    let route = RouteView::build(store.waypoints());
    let Some(view) = route.find(&id) else {
        // Removed from elsewhere
        selection.0 = None;
        return;
    };
    let Ok((camera, camera_transform)) = q_camera.get_single() else { return };
    let world = project_mercator(&view.coordinate()).extend(0.0);
    let Ok(screen) = camera.world_to_viewport(camera_transform, world) else { return };

    let anchor = egui::pos2(screen.x + MARKER_RADIUS_PX + 4.0, screen.y - MARKER_RADIUS_PX);
    let open = show_marker_popup(contexts.ctx_mut(), view, anchor, |removed| {
        surface_events.send(SurfaceEvent::RemoveRequested(removed));
    });
    if !open {
        selection.0 = None;
    }
}

/// Fits the view to the route after every change of a multi-waypoint sequence
pub fn fit_route_system(
    store: Res<WaypointStore>,
    config: Res<PlannerConfig>,
    q_window: Query<&Window, With<PrimaryWindow>>,
    mut q_camera: Query<(&mut Transform, &mut OrthographicProjection), With<Camera2d>>,
) {
    if !store.is_changed() || store.len() < 2 {
        return;
    }
    let Some(bounds) = RouteView::build(store.waypoints()).bounds() else { return };
    let Ok(window) = q_window.get_single() else { return };
    let Ok((mut transform, mut projection)) = q_camera.get_single_mut() else { return };

    let south_west = project_mercator(&Coordinate::new(bounds.min().y, bounds.min().x));
    let north_east = project_mercator(&Coordinate::new(bounds.max().y, bounds.max().x));
    let extent = (north_east - south_west).abs();

    // The side panel covers the right edge of the window
    let map_width = (window.width() - super::PANEL_WIDTH).max(1.0);
    let scale = fit_scale(extent, Vec2::new(map_width, window.height()), config.map.fit_padding);

    let center = (south_west + north_east) / 2.0;
    transform.translation.x = center.x + super::PANEL_WIDTH / 2.0 * scale;
    transform.translation.y = center.y;
    projection.scale = scale;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mercator_round_trip() {
        for (lat, lng) in [(42.36, -71.06), (0.0, 0.0), (-33.8688, 151.2093), (60.0, -179.5)] {
            let back = inverse_project_mercator(project_mercator(&Coordinate::new(lat, lng)));
            assert!((back.lat - lat).abs() < 1e-3, "lat {} -> {}", lat, back.lat);
            assert!((back.lng - lng).abs() < 1e-3, "lng {} -> {}", lng, back.lng);
        }
    }

    #[test]
    fn test_mercator_origin_and_extent() {
        let center = project_mercator(&Coordinate::new(0.0, 0.0));
        assert!((center.x - WORLD_SIZE / 2.0).abs() < 1e-3);
        assert!((center.y + WORLD_SIZE / 2.0).abs() < 1e-3);

        // North is up
        let north = project_mercator(&Coordinate::new(10.0, 0.0));
        assert!(north.y > center.y);
    }

    #[test]
    fn test_tile_zoom_for_scale() {
        assert_eq!(tile_zoom_for_scale(scale_for_zoom(13)), 14);
        assert_eq!(tile_zoom_for_scale(100.0), 0);
        assert_eq!(tile_zoom_for_scale(1e-9), MAX_TILE_ZOOM);
    }

    #[test]
    fn test_visible_tiles_whole_world() {
        let keys = visible_tiles(Vec2::new(0.0, -WORLD_SIZE + 1.0), Vec2::new(WORLD_SIZE - 1.0, 0.0), 1);
        assert_eq!(keys.len(), 4);
        assert!(keys.contains(&TileKey { zoom: 1, x: 1, y: 1 }));

        // Views past the world edge are clamped
        let keys = visible_tiles(Vec2::splat(-5000.0), Vec2::splat(5000.0), 2);
        assert_eq!(keys.len(), 16);
    }

    #[test]
    fn test_tile_paths() {
        let key = TileKey { zoom: 13, x: 2478, y: 3030 };
        assert_eq!(
            key.url("https://tile.openstreetmap.org/{z}/{x}/{y}.png"),
            "https://tile.openstreetmap.org/13/2478/3030.png"
        );
        assert_eq!(key.cache_path("data/tiles"), PathBuf::from("data/tiles/13/2478_3030.png"));
    }

    #[test]
    fn test_failed_tile_waits_for_backoff() {
        let mut cache = TileCache::new(TileConfig::default());
        let key = TileKey { zoom: 14, x: 4954, y: 6060 };
        let t0 = Instant::now();
        assert!(cache.wants(&key, t0));

        cache.downloading.insert(key);
        assert!(!cache.wants(&key, t0));

        cache.mark_failed(key, t0);
        assert!(!cache.downloading.contains(&key));
        assert!(!cache.wants(&key, t0));
        assert!(!cache.wants(&key, t0 + Duration::from_secs(1)));
        assert!(cache.wants(&key, t0 + TILE_RETRY_BACKOFF));

        // Other tiles are unaffected
        assert!(cache.wants(&TileKey { zoom: 14, x: 4955, y: 6060 }, t0));
    }

    #[test]
    fn test_tile_near_view() {
        let key = TileKey { zoom: 2, x: 0, y: 0 };
        // Tile spans x 0..128, y -128..0
        assert!(tile_near_view(&key, Vec2::new(100.0, -50.0), Vec2::new(200.0, 50.0), 0.0));
        assert!(!tile_near_view(&key, Vec2::new(300.0, -50.0), Vec2::new(400.0, 50.0), 0.0));
        assert!(tile_near_view(&key, Vec2::new(300.0, -50.0), Vec2::new(400.0, 50.0), 200.0));
        assert!(!tile_near_view(&key, Vec2::new(0.0, -500.0), Vec2::new(100.0, -300.0), 100.0));
    }

    #[test]
    fn test_fit_scale() {
        let scale = fit_scale(Vec2::new(10.0, 5.0), Vec2::new(200.0, 200.0), 50.0);
        assert!((scale - 0.1).abs() < 1e-6);

        // Identical points never zoom past the tile limit
        let scale = fit_scale(Vec2::ZERO, Vec2::new(800.0, 600.0), 50.0);
        assert_eq!(scale, scale_for_zoom(MAX_TILE_ZOOM));
    }
}
