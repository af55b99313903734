use bevy::prelude::*;
use log::info;
use MissionPlanner::config::PlannerConfig;
use MissionPlanner::ui;

fn main() {
    // Initialize env logger for basic logging
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting MissionPlanner application...");
    let config = PlannerConfig::load_or_default();

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "BO-AT Mission Planner".to_string(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(ui::UiPlugin::new(config))
        .run();
}
