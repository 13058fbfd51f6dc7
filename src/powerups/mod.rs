//! Power-ups: Cap (double jump), Shield (invincibility) and Megaphone (shouts)

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::collectibles::Bob;
use crate::combat::defeat_enemy;
use crate::constants::*;
use crate::effects::{Effect, EffectQueue};
use crate::enemies::Enemy;
use crate::events::{DefeatCause, EventBus, GameEvent};
use crate::helpers::aabb_overlap;
use crate::input::PlayerInput;
use crate::player::{Body, Facing, Player, PlayerPose};
use crate::run::RunState;
use crate::world::LevelEntity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerKind {
    Cap,
    Shield,
    Megaphone,
}

impl PowerKind {
    pub const ALL: [PowerKind; 3] = [PowerKind::Cap, PowerKind::Shield, PowerKind::Megaphone];

    pub fn name(&self) -> &'static str {
        match self {
            PowerKind::Cap => "cap",
            PowerKind::Shield => "shield",
            PowerKind::Megaphone => "megaphone",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name().eq_ignore_ascii_case(name))
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PowerKind::Cap => "Lucky Cap",
            PowerKind::Shield => "Shield",
            PowerKind::Megaphone => "Megaphone",
        }
    }

    /// Seconds the power lasts, 0 for permanent
    pub fn duration(&self) -> f32 {
        match self {
            PowerKind::Cap => 0.0,
            PowerKind::Shield => SHIELD_DURATION,
            PowerKind::Megaphone => MEGAPHONE_DURATION,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            PowerKind::Cap => CAP_TINT,
            PowerKind::Shield => Color::srgb(0.5, 0.8, 1.0),
            PowerKind::Megaphone => MEGAPHONE_TINT,
        }
    }

    /// Popup text shown on pickup
    pub fn announcement(&self) -> String {
        match self {
            PowerKind::Cap => "DOUBLE JUMP!".to_string(),
            _ => format!("{}!", self.display_name()),
        }
    }
}

/// Active power and its timers
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct PowerState {
    pub active: Option<PowerKind>,
    pub timer: f32,
    pub invincible: bool,
    pub has_cap: bool,
    /// Survives expiry and later pickups; cleared only by a fresh PowerState
    pub can_double_jump: bool,
    pub blast_cooldown: f32,
}

impl PowerState {
    /// Replace whatever is active with `kind`
    pub fn collect(&mut self, kind: PowerKind) {
        self.invincible = false;
        self.active = Some(kind);
        self.timer = kind.duration();
        match kind {
            PowerKind::Cap => {
                self.has_cap = true;
                self.can_double_jump = true;
            }
            PowerKind::Shield => self.invincible = true,
            PowerKind::Megaphone => {}
        }
    }

    /// Count down the active power. Returns the kind that expired this tick.
    pub fn tick(&mut self, dt: f32) -> Option<PowerKind> {
        self.blast_cooldown = (self.blast_cooldown - dt).max(0.0);

        let kind = self.active?;
        if self.timer <= 0.0 {
            return None;
        }
        self.timer -= dt;
        if self.timer > 0.0 {
            return None;
        }
        self.timer = 0.0;
        if kind == PowerKind::Shield {
            self.invincible = false;
        }
        self.active = None;
        Some(kind)
    }

    /// Start a blast if the megaphone is up and off cooldown
    pub fn try_blast(&mut self) -> bool {
        if self.active != Some(PowerKind::Megaphone) || self.blast_cooldown > 0.0 {
            return false;
        }
        self.blast_cooldown = SHOUT_COOLDOWN;
        true
    }

    /// Player tint for the active power
    pub fn tint(&self) -> Option<Color> {
        match self.active {
            Some(PowerKind::Cap) => Some(CAP_TINT),
            Some(PowerKind::Megaphone) => Some(MEGAPHONE_TINT),
            _ => None,
        }
    }

    /// HUD line: name plus remaining whole seconds for timed powers
    pub fn hud_text(&self) -> String {
        let Some(kind) = self.active else {
            return String::new();
        };
        if self.timer > 0.0 {
            format!("{} {}s", kind.display_name(), self.timer.ceil() as u32)
        } else {
            kind.display_name().to_string()
        }
    }
}

/// Collectible power-up item
#[derive(Component, Debug, Clone, Copy)]
pub struct PowerUp {
    pub kind: PowerKind,
}

/// Glint timer for shield items
#[derive(Component, Default)]
pub struct ItemGlint(pub f32);

/// Translucent bubble drawn around a shielded player
#[derive(Component)]
pub struct ShieldBubble;

/// Megaphone projectile. Flies straight, ignores gravity and platforms.
#[derive(Component)]
pub struct Shout {
    pub dir: f32,
    pub lifetime: f32,
}

pub fn spawn_powerup(commands: &mut Commands, kind: PowerKind, x: f32, y: f32) {
    let world_y = level_to_world_y(y);
    let mut entity = commands.spawn((
        Sprite::from_color(kind.color(), POWERUP_HITBOX),
        Transform::from_xyz(x, world_y, 2.0),
        PowerUp { kind },
        Bob::new(world_y, 8.0, 1.0),
        LevelEntity,
    ));
    if kind == PowerKind::Shield {
        entity.insert(ItemGlint::default());
    }
}

pub fn spawn_shield_bubble(commands: &mut Commands, textures: Option<&crate::textures::GameTextures>) {
    let size = Vec2::splat(SHIELD_BUBBLE_SIZE);
    let sprite = match textures {
        Some(textures) => Sprite {
            image: textures.disc.clone(),
            color: Color::srgba(0.5, 0.8, 1.0, 0.35),
            custom_size: Some(size),
            ..default()
        },
        None => Sprite::from_color(Color::srgba(0.5, 0.8, 1.0, 0.35), size),
    };
    commands.spawn((sprite, Transform::from_xyz(0.0, 0.0, 6.0), Visibility::Hidden, ShieldBubble, LevelEntity));
}

pub fn collect_powerups(
    mut commands: Commands,
    mut power: ResMut<PowerState>,
    mut bus: ResMut<EventBus>,
    mut effects: ResMut<EffectQueue>,
    players: Query<(&Transform, &Body), With<Player>>,
    items: Query<(Entity, &Transform, &PowerUp)>,
) {
    let Ok((player_transform, body)) = players.single() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();

    for (entity, transform, item) in &items {
        let pos = transform.translation.truncate();
        if aabb_overlap(player_pos, body.half(), pos, POWERUP_HITBOX / 2.0).is_none() {
            continue;
        }
        commands.entity(entity).despawn();
        power.collect(item.kind);
        info!("Power-up collected: {}", item.kind.name());

        effects.push(Effect::Sparkles { at: pos, count: 6 });
        effects.push(Effect::Popup {
            at: pos,
            text: item.kind.announcement(),
            color: POWER_POPUP_COLOR,
            duration: POWER_POPUP_TIME,
        });
        bus.emit(GameEvent::PowerUpCollected { kind: item.kind });
    }
}

pub fn tick_power_timers(time: Res<Time>, mut power: ResMut<PowerState>, mut bus: ResMut<EventBus>) {
    if let Some(kind) = power.tick(time.delta_secs()) {
        bus.emit(GameEvent::PowerUpExpired { kind });
    }
}

pub fn fire_shouts(
    mut commands: Commands,
    input: Res<PlayerInput>,
    mut power: ResMut<PowerState>,
    mut bus: ResMut<EventBus>,
    mut effects: ResMut<EffectQueue>,
    mut players: Query<(&Transform, &Facing, &mut PlayerPose), With<Player>>,
) {
    if !input.blast_pressed {
        return;
    }
    let Ok((transform, facing, mut pose)) = players.single_mut() else {
        return;
    };
    if !power.try_blast() {
        return;
    }

    let dir = facing.0;
    let x = transform.translation.x + dir * SHOUT_SPAWN_OFFSET;
    commands.spawn((
        Sprite {
            flip_x: dir < 0.0,
            ..Sprite::from_color(SHOUT_COLOR, SHOUT_SIZE)
        },
        Transform::from_xyz(x, transform.translation.y, 4.0),
        Shout { dir, lifetime: SHOUT_LIFETIME },
        LevelEntity,
    ));
    pose.blast_timer = BLAST_POSE_TIME;
    effects.push(Effect::Flash);
    bus.emit(GameEvent::BlastFired { x, dir });
}

/// Fly shouts and drop them when they expire or leave the view
pub fn move_shouts(
    mut commands: Commands,
    time: Res<Time>,
    cameras: Query<&Transform, (With<Camera2d>, Without<Shout>)>,
    mut shouts: Query<(Entity, &mut Shout, &mut Transform)>,
) {
    let dt = time.delta_secs();
    let view_x = cameras.single().map(|t| t.translation.x).ok();

    for (entity, mut shout, mut transform) in &mut shouts {
        transform.translation.x += shout.dir * SHOUT_SPEED * dt;
        shout.lifetime -= dt;

        let offscreen = view_x
            .is_some_and(|cx| (transform.translation.x - cx).abs() > SCREEN_WIDTH / 2.0 + SHOUT_OFFSCREEN_MARGIN);
        if shout.lifetime <= 0.0 || offscreen {
            commands.entity(entity).despawn();
        }
    }
}

pub fn shouts_hit_enemies(
    mut commands: Commands,
    mut run: ResMut<RunState>,
    mut bus: ResMut<EventBus>,
    mut effects: ResMut<EffectQueue>,
    shouts: Query<(Entity, &Transform), With<Shout>>,
    enemies: Query<(Entity, &Transform, &Enemy, &Body)>,
) {
    let mut hit = Vec::new();
    for (shout_entity, shout_transform) in &shouts {
        let shout_pos = shout_transform.translation.truncate();
        let target = enemies.iter().find(|(entity, transform, _, body)| {
            !hit.contains(entity)
                && aabb_overlap(shout_pos, SHOUT_SIZE / 2.0, transform.translation.truncate(), body.half()).is_some()
        });
        if let Some((enemy_entity, transform, enemy, _)) = target {
            hit.push(enemy_entity);
            commands.entity(shout_entity).despawn();
            defeat_enemy(
                &mut commands,
                &mut run,
                &mut bus,
                &mut effects,
                enemy_entity,
                enemy.kind,
                transform.translation.truncate(),
                DefeatCause::Shout,
            );
        }
    }
}

/// Presentation: tint the player, keep the bubble on them, sprinkle glints
pub fn update_power_visuals(
    power: Res<PowerState>,
    run: Res<RunState>,
    time: Res<Time>,
    mut effects: ResMut<EffectQueue>,
    mut players: Query<(&Transform, &mut Sprite), With<Player>>,
    mut bubbles: Query<(&mut Transform, &mut Visibility), (With<ShieldBubble>, Without<Player>)>,
    mut glints: Query<(&Transform, &mut ItemGlint), (Without<Player>, Without<ShieldBubble>)>,
) {
    let mut rng = rand::thread_rng();

    if let Ok((player_transform, mut sprite)) = players.single_mut() {
        sprite.color = power.tint().unwrap_or(PLAYER_COLOR);

        for (mut bubble_transform, mut visibility) in &mut bubbles {
            bubble_transform.translation.x = player_transform.translation.x;
            bubble_transform.translation.y = player_transform.translation.y;
            let shown = power.invincible && run.is_playing();
            *visibility = if shown {
                Visibility::Inherited
            } else {
                Visibility::Hidden
            };
            if shown && rng.gen_bool(0.3) {
                let offset = Vec2::new(rng.gen_range(-20.0..=20.0), rng.gen_range(-20.0..=20.0));
                effects.push(Effect::Sparkles { at: player_transform.translation.truncate() + offset, count: 1 });
            }
        }
    }

    for (transform, mut glint) in &mut glints {
        glint.0 += time.delta_secs();
        if glint.0 >= 0.3 {
            glint.0 -= 0.3;
            let offset = Vec2::new(rng.gen_range(-15.0..=15.0), rng.gen_range(-15.0..=15.0));
            effects.push(Effect::Sparkles { at: transform.translation.truncate() + offset, count: 1 });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pickup_popup_rises_from_the_item() {
        let mut app = App::new();
        app.init_resource::<PowerState>()
            .init_resource::<EventBus>()
            .init_resource::<EffectQueue>()
            .add_systems(Update, collect_powerups);
        app.world_mut().spawn((Player, Transform::from_xyz(100.0, 60.0, 0.0), Body::new(PLAYER_HITBOX)));
        app.world_mut().spawn((Transform::from_xyz(110.0, 70.0, 0.0), PowerUp { kind: PowerKind::Shield }));
        app.update();

        assert_eq!(app.world().resource::<PowerState>().active, Some(PowerKind::Shield));
        let mut effects = app.world_mut().resource_mut::<EffectQueue>();
        let popup = effects.drain().find_map(|effect| match effect {
            Effect::Popup { at, .. } => Some(at),
            _ => None,
        });
        assert_eq!(popup, Some(Vec2::new(110.0, 70.0)));
    }

    #[test]
    fn test_shield_expires_after_duration() {
        let mut state = PowerState::default();
        state.collect(PowerKind::Shield);
        assert!(state.invincible);
        assert_eq!(state.timer, 10.0);

        assert_eq!(state.tick(9.5), None);
        assert_eq!(state.hud_text(), "Shield 1s");
        assert_eq!(state.tick(0.6), Some(PowerKind::Shield));
        assert!(!state.invincible);
        assert_eq!(state.active, None);
        assert_eq!(state.timer, 0.0);
        assert_eq!(state.tick(1.0), None);
    }

    #[test]
    fn test_cap_is_permanent_and_double_jump_survives() {
        let mut state = PowerState::default();
        state.collect(PowerKind::Cap);
        assert_eq!(state.tick(100.0), None);
        assert_eq!(state.active, Some(PowerKind::Cap));
        assert_eq!(state.tint(), Some(CAP_TINT));

        state.collect(PowerKind::Megaphone);
        assert!(state.can_double_jump);
        assert_eq!(state.tick(15.0), Some(PowerKind::Megaphone));
        assert!(state.can_double_jump);
        assert_eq!(state.tint(), None);
    }

    #[test]
    fn test_new_pickup_drops_shield() {
        let mut state = PowerState::default();
        state.collect(PowerKind::Shield);
        state.collect(PowerKind::Megaphone);
        assert!(!state.invincible);
        assert_eq!(state.timer, 15.0);
        assert_eq!(state.hud_text(), "Megaphone 15s");
    }

    #[test]
    fn test_blast_requires_megaphone_and_cooldown() {
        let mut state = PowerState::default();
        assert!(!state.try_blast());
        state.collect(PowerKind::Megaphone);
        assert!(state.try_blast());
        assert!(!state.try_blast());
        state.tick(0.71);
        assert!(state.try_blast());
    }

    #[test]
    fn test_announcements() {
        assert_eq!(PowerKind::Cap.announcement(), "DOUBLE JUMP!");
        assert_eq!(PowerKind::Shield.announcement(), "Shield!");
        assert_eq!(PowerKind::from_name("MEGAPHONE"), Some(PowerKind::Megaphone));
    }
}
