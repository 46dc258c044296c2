use bevy::input::ButtonInput;
use bevy::prelude::*;
use bevy_sph_fluid::{FluidError, FluidPlugin, FluidSimulation, FluidView};

const RENDER_SCALE: f32 = 60.0;

fn main() -> Result<(), FluidError> {
    let sim = FluidSimulation::demo_block_5k()?;

    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(FluidPlugin {
            view: FluidView {
                render_scale: RENDER_SCALE,
                ..default()
            },
        })
        .insert_resource(sim)
        .add_systems(Startup, setup)
        .add_systems(Update, reset_on_key)
        .run();
    Ok(())
}

fn setup(mut commands: Commands) {
    commands.spawn(Camera2d);
}

// R puts the block back at its starting layout
fn reset_on_key(keys: Res<ButtonInput<KeyCode>>, mut sim: ResMut<FluidSimulation>) {
    if keys.just_pressed(KeyCode::KeyR) {
        sim.reset();
        info!(particles = sim.config().num_particles, "fluid reset");
    }
}
