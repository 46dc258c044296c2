//! Bevy glue: steps a [`FluidSimulation`] resource every frame and draws its
//! particles as gizmo circles.
//!
//! ```rust,ignore
//! App::new()
//!     .add_plugins(DefaultPlugins)
//!     .add_plugins(FluidPlugin::default())
//!     .insert_resource(FluidSimulation::new(FluidConfig::default())?)
//!     .run();
//! ```

use bevy::prelude::*;

use crate::cpu::sph2d::FluidSimulation;

const CIRCLE_SEGMENTS: u32 = 10;

#[derive(Resource, Clone, Copy, Debug)]
pub struct FluidView {
    /// Screen pixels per simulation unit.
    pub render_scale: f32,
    /// Upper limit on the frame delta fed to the simulation.
    pub max_dt: f32,
    pub particle_color: Color,
    pub bounds_color: Color,
}

impl Default for FluidView {
    fn default() -> Self {
        Self {
            render_scale: 50.0,
            max_dt: 1.0 / 30.0,
            particle_color: Color::srgb(0.2, 0.6, 1.0),
            bounds_color: Color::srgb(0.8, 0.8, 0.8),
        }
    }
}

#[derive(Default)]
pub struct FluidPlugin {
    pub view: FluidView,
}

impl Plugin for FluidPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.view)
            .add_systems(Update, (step_fluid, draw_fluid).chain());
    }
}

fn step_fluid(sim: Option<ResMut<FluidSimulation>>, view: Res<FluidView>, time: Res<Time>) {
    let Some(mut sim) = sim else {
        return;
    };
    let dt = time.delta_secs().min(view.max_dt);
    if let Err(err) = sim.step(dt) {
        tracing::error!(%err, "fluid step rejected");
    }
}

fn draw_fluid(sim: Option<Res<FluidSimulation>>, view: Res<FluidView>, mut gizmos: Gizmos) {
    let Some(sim) = sim else {
        return;
    };
    let scale = view.render_scale;
    let config = sim.config();

    let bounds = config.bounds_size * scale;
    gizmos.rect_2d(Isometry2d::IDENTITY, Vec2::new(bounds.x, bounds.y), view.bounds_color);

    let radius = config.particle_size * scale;
    for p in sim.positions() {
        gizmos
            .circle_2d(Vec2::new(p.x, p.y) * scale, radius, view.particle_color)
            .resolution(CIRCLE_SEGMENTS);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::FluidConfig;

    fn app_with(sim: Option<FluidSimulation>) -> App {
        let mut app = App::new();
        app.init_resource::<Time>()
            .insert_resource(FluidView::default())
            .add_systems(Update, step_fluid);
        if let Some(sim) = sim {
            app.insert_resource(sim);
        }
        app
    }

    #[test]
    fn steps_once_per_update() {
        let sim = FluidSimulation::new(FluidConfig::default()).unwrap();
        let mut app = app_with(Some(sim));
        app.update();
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_millis(10));
        app.update();
        assert_eq!(app.world().resource::<FluidSimulation>().tick_count(), 2);
    }

    #[test]
    fn frame_delta_is_capped() {
        let cfg = FluidConfig::default().with_gravity(10.0);
        let sim = FluidSimulation::new(cfg).unwrap();
        let mut app = app_with(Some(sim));
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs(5));
        app.update();
        let sim = app.world().resource::<FluidSimulation>();
        let max_dv = 10.0 * FluidView::default().max_dt;
        // one capped tick of gravity, plus a small pressure kick
        assert!(sim.particles().velocity.iter().all(|v| v.length() < max_dv * 2.0));
    }

    #[test]
    fn missing_simulation_is_ignored() {
        let mut app = app_with(None);
        app.update();
        assert!(app.world().get_resource::<FluidSimulation>().is_none());
    }
}
