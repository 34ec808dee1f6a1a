use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use bevy::{asset::LoadState, prelude::*};

use crate::{
    components::{
        AxePivot, MainCamera, PlayerRoot, PlayerVisual, TreePlantedEvent, TreeRemovedEvent,
        TreeVisual,
    },
    game_loop::{AssetReadinessState, FrameSet},
    sim::{AXE_BLADE_OFFSET, AXE_PIVOT_OFFSET, Simulation},
};

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::srgb_u8(0xcf, 0xe7, 0xc9)))
            .add_systems(Startup, setup_scene)
            .add_systems(
                Update,
                track_asset_readiness_system
                    .in_set(FrameSet::Input)
                    .run_if(resource_exists::<SceneAssets>),
            )
            .add_systems(
                Update,
                (
                    sync_player_system,
                    sync_trees_system,
                    sync_camera_system,
                )
                    .in_set(FrameSet::Present)
                    .run_if(resource_exists::<Simulation>),
            )
            .add_observer(on_tree_planted)
            .add_observer(on_tree_removed);
    }
}

/// The tree model is authored small; every tree is drawn at this scale
/// before the despawn shrink is applied.
pub const TREE_MODEL_SCALE: f32 = 3.0;

/// Drawn a little smaller than the sell radius, so selling starts on the rim.
const BASE_PAD_RADIUS: f32 = 1.2;

#[derive(Resource)]
pub struct SceneAssets {
    pub tree_prefab: Handle<Scene>,
    pub axe_model: Handle<Scene>,
    tree_failure_logged: bool,
    axe_failure_logged: bool,
}

fn setup_scene(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Loading happens in the background. The simulation is told when each
    // model is usable through AssetReadinessState.
    let tree_prefab = asset_server.load(GltfAssetLabel::Scene(0).from_asset("models/tree/scene.gltf"));
    let axe_model = asset_server.load(GltfAssetLabel::Scene(0).from_asset("models/axe/scene.gltf"));
    let lumberjack =
        asset_server.load(GltfAssetLabel::Scene(0).from_asset("models/lumberjack/scene.gltf"));

    // Sky half of the fill light. The ground half is the upward light below.
    commands.spawn((
        MainCamera,
        Camera3d::default(),
        AmbientLight {
            color: Color::WHITE,
            brightness: 400.0,
            ..default()
        },
        Transform::from_xyz(0.0, 8.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        DirectionalLight {
            color: Color::srgb_u8(0xff, 0xf2, 0xd6),
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(8.0, 14.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Grass bounce: a faint green light shining up from under the ground.
    commands.spawn((
        DirectionalLight {
            color: Color::srgb_u8(0x6f, 0x8a, 0x63),
            illuminance: 1500.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(0.0, -10.0, 0.0).looking_at(Vec3::ZERO, Vec3::Z),
    ));

    // Ground disc, rotated from the XY plane onto XZ.
    commands.spawn((
        Mesh3d(meshes.add(Circle::new(40.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb_u8(0x88, 0xb3, 0x6e),
            perceptual_roughness: 0.95,
            ..default()
        })),
        Transform::from_rotation(Quat::from_rotation_x(-FRAC_PI_2)),
    ));

    commands.spawn((
        Mesh3d(meshes.add(Cylinder::new(BASE_PAD_RADIUS, 0.01))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::WHITE,
            base_color_texture: Some(asset_server.load("textures/money-texture.png")),
            emissive: LinearRgba::rgb(0.5, 0.5, 0.0),
            ..default()
        })),
        Transform::from_xyz(0.0, 0.005, 0.0),
    ));

    commands
        .spawn((PlayerRoot, Transform::default(), Visibility::default()))
        .with_children(|parent| {
            parent.spawn((
                PlayerVisual,
                Transform::default(),
                Visibility::default(),
                SceneRoot(lumberjack),
            ));
            parent
                .spawn((
                    AxePivot,
                    Transform::from_translation(AXE_PIVOT_OFFSET),
                    Visibility::default(),
                ))
                .with_children(|pivot| {
                    pivot.spawn((
                        SceneRoot(axe_model.clone()),
                        Transform::from_translation(AXE_BLADE_OFFSET).with_rotation(
                            Quat::from_euler(EulerRot::XYZ, FRAC_PI_2, 0.0, FRAC_PI_4),
                        ),
                    ));
                });
        });

    commands.insert_resource(SceneAssets {
        tree_prefab,
        axe_model,
        tree_failure_logged: false,
        axe_failure_logged: false,
    });
}

/// Polls the asset server. A failed load is logged once and the matching
/// readiness flag stays false for the rest of the run.
fn track_asset_readiness_system(
    asset_server: Res<AssetServer>,
    mut assets: ResMut<SceneAssets>,
    mut readiness: ResMut<AssetReadinessState>,
) {
    readiness.0.tree_prefab = asset_server.is_loaded_with_dependencies(assets.tree_prefab.id());
    readiness.0.axe_model = asset_server.is_loaded_with_dependencies(assets.axe_model.id());

    if !assets.tree_failure_logged {
        if let LoadState::Failed(err) = asset_server.load_state(assets.tree_prefab.id()) {
            warn!("Tree model failed to load, the forest stays empty: {}", err);
            assets.tree_failure_logged = true;
        }
    }
    if !assets.axe_failure_logged {
        if let LoadState::Failed(err) = asset_server.load_state(assets.axe_model.id()) {
            warn!("Axe model failed to load, chopping is disabled: {}", err);
            assets.axe_failure_logged = true;
        }
    }
}

fn on_tree_planted(trigger: On<TreePlantedEvent>, mut commands: Commands, assets: Res<SceneAssets>) {
    commands.spawn((
        TreeVisual(trigger.id),
        Transform::from_translation(trigger.position)
            .with_rotation(Quat::from_rotation_y(trigger.facing_angle))
            .with_scale(Vec3::splat(TREE_MODEL_SCALE)),
        Visibility::default(),
        SceneRoot(assets.tree_prefab.clone()),
    ));
}

fn on_tree_removed(
    trigger: On<TreeRemovedEvent>,
    mut commands: Commands,
    trees: Query<(Entity, &TreeVisual)>,
) {
    for (entity, visual) in &trees {
        if visual.0 == trigger.id {
            commands.entity(entity).despawn();
        }
    }
}

fn sync_player_system(
    sim: Res<Simulation>,
    mut roots: Query<&mut Transform, With<PlayerRoot>>,
    mut visuals: Query<&mut Transform, (With<PlayerVisual>, Without<PlayerRoot>)>,
    mut pivots: Query<&mut Transform, (With<AxePivot>, Without<PlayerRoot>, Without<PlayerVisual>)>,
) {
    if let Ok(mut root) = roots.single_mut() {
        root.translation = sim.player.position;
    }
    if let Ok(mut visual) = visuals.single_mut() {
        visual.rotation = Quat::from_rotation_y(sim.player.facing_yaw);
    }
    if let Ok(mut pivot) = pivots.single_mut() {
        pivot.rotation = Quat::from_rotation_y(sim.axe.angle());
    }
}

/// Only trees mid-despawn change, but the lookup is cheap at forest sizes.
fn sync_trees_system(sim: Res<Simulation>, mut trees: Query<(&TreeVisual, &mut Transform)>) {
    let timing = sim.despawn_timing();
    for (visual, mut transform) in &mut trees {
        let Some(tree) = sim.forest.get(visual.0) else {
            continue;
        };
        if tree.alive {
            continue;
        }
        let pose = tree.pose(&timing);
        transform.rotation =
            Quat::from_euler(EulerRot::XYZ, pose.tilt_x, tree.facing_angle, pose.tilt_z);
        transform.scale = Vec3::splat(TREE_MODEL_SCALE * pose.scale);
    }
}

fn sync_camera_system(sim: Res<Simulation>, mut cameras: Query<&mut Transform, With<MainCamera>>) {
    let Ok(mut camera) = cameras.single_mut() else {
        return;
    };
    *camera = Transform::from_translation(sim.camera.position).looking_at(sim.camera.look_at, Vec3::Y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::AssetReadiness;

    fn readiness_app(tree_prefab: Handle<Scene>, axe_model: Handle<Scene>) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Scene>()
            .init_resource::<AssetReadinessState>()
            .insert_resource(SceneAssets {
                tree_prefab,
                axe_model,
                tree_failure_logged: false,
                axe_failure_logged: false,
            })
            .add_systems(Update, track_asset_readiness_system);
        app
    }

    fn readiness(app: &App) -> AssetReadiness {
        app.world().resource::<AssetReadinessState>().0
    }

    #[test]
    fn unloaded_models_are_not_ready() {
        let mut app = readiness_app(Handle::default(), Handle::default());
        app.world_mut().resource_mut::<AssetReadinessState>().0 = AssetReadiness {
            tree_prefab: true,
            axe_model: true,
        };
        for _ in 0..3 {
            app.update();
        }
        assert_eq!(readiness(&app), AssetReadiness::default());
        let assets = app.world().resource::<SceneAssets>();
        assert!(!assets.tree_failure_logged && !assets.axe_failure_logged);
    }

    #[test]
    fn each_model_is_tracked_on_its_own() {
        let mut app = readiness_app(Handle::default(), Handle::default());
        let tree = app
            .world()
            .resource::<AssetServer>()
            .add(Scene::new(World::new()));
        app.world_mut().resource_mut::<SceneAssets>().tree_prefab = tree;

        for _ in 0..10 {
            app.update();
            if readiness(&app).tree_prefab {
                break;
            }
        }
        assert!(readiness(&app).tree_prefab);
        assert!(!readiness(&app).axe_model);
    }
}
