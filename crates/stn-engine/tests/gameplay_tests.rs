//! End-to-end gameplay through the public loop API: shooting, pickups,
//! fire, and the wire payload clients receive.

use stn_engine::entities::ammo::spawn_pistol_ammo;
use stn_engine::entities::{count_state, PISTOL, PISTOL_AMMO};
use stn_engine::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn game_at(fixed_dt: f64) -> (GameLoop, EventLog) {
    let log = EventLog::new();
    let config = GameConfig {
        tick: TickConfig { fixed_dt },
        ..GameConfig::default()
    };
    (GameLoop::with_broadcaster(config, log.clone()), log)
}

fn inventory(game: &GameLoop, player: EntityId) -> Vec<InventoryItem> {
    game.manager()
        .entity(player)
        .unwrap()
        .ext::<Inventory>()
        .unwrap()
        .items()
        .to_vec()
}

fn give(game: &mut GameLoop, player: EntityId, item: InventoryItem) {
    let added = game
        .manager_mut()
        .get_mut(player)
        .unwrap()
        .ext_mut::<Inventory>()
        .unwrap()
        .add_item(item);
    assert!(added);
}

// ---------------------------------------------------------------------------
// Combat
// ---------------------------------------------------------------------------

#[test]
fn player_shoots_approaching_zombie_dead() {
    let (mut game, log) = game_at(1.0 / 60.0);
    let player = game.spawn_player(Vec2::ZERO);
    let zombie = game.spawn_zombie(Vec2::new(100.0, 0.0));
    give(&mut game, player, InventoryItem::new(PISTOL_AMMO).with_state(count_state(10)));

    let aim = Input {
        facing: Direction::Right,
        selected_slot: 2,
        fire: true,
        ..Input::default()
    };
    for _ in 0..90 {
        game.set_player_input(player, aim).unwrap();
        game.tick();
        if log.count(EventType::ZombieDeath) > 0 {
            break;
        }
    }

    assert_eq!(log.count(EventType::ZombieDeath), 1);
    assert_eq!(log.count(EventType::ZombieHurt), 3);
    assert_eq!(log.count(EventType::PlayerHurt), 0);

    // corpse stays, ammo was spent
    let corpse = game.manager().entity(zombie).unwrap();
    assert!(corpse.is_dead());
    let rounds = inventory(&game, player)[3].state_u64("count").unwrap();
    assert!(rounds <= 7);
    assert_eq!(inventory(&game, player)[1].item_type, PISTOL);
}

#[test]
fn zombie_kills_idle_player() {
    let (mut game, log) = game_at(1.0 / 30.0);
    let player = game.spawn_player(Vec2::ZERO);
    game.spawn_zombie(Vec2::new(40.0, 0.0));

    game.run_ticks(30 * 6);

    assert_eq!(log.count(EventType::PlayerHurt), 3);
    assert_eq!(log.count(EventType::PlayerDeath), 1);
    assert!(game.manager().entity(player).unwrap().is_dead());
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[test]
fn walking_up_to_ammo_and_interacting_picks_it_up() {
    let (mut game, log) = game_at(1.0 / 60.0);
    let player = game.spawn_player(Vec2::ZERO);
    let first = spawn_pistol_ammo(game.manager_mut(), Vec2::new(40.0, 0.0), 10);

    let walk = Input {
        dx: 1.0,
        interact: true,
        ..Input::default()
    };
    for _ in 0..40 {
        game.set_player_input(player, walk).unwrap();
        game.tick();
    }
    assert!(game.manager().entity(first).is_none());
    assert_eq!(log.count(EventType::PlayerPickedUpItem), 1);

    let here = game.manager().position_of(player).unwrap();
    spawn_pistol_ammo(game.manager_mut(), here, 4);
    game.set_player_input(player, Input { interact: true, ..Input::default() })
        .unwrap();
    game.tick();

    let items = inventory(&game, player);
    assert_eq!(items.len(), 4);
    assert_eq!(items[3].item_type, PISTOL_AMMO);
    assert_eq!(items[3].state_u64("count"), Some(14));

    let messages: Vec<_> = log.events().iter().map(GameEvent::to_message).collect();
    assert_eq!(messages[0]["type"], "player_picked_up_item");
    assert_eq!(messages[0]["payload"]["playerId"], player.to_string());
    assert_eq!(messages[0]["payload"]["itemType"], PISTOL_AMMO);
}

#[test]
fn fire_burns_a_wall_and_goes_out() {
    let (mut game, _) = game_at(0.5);
    let wall = game.spawn_wall(Vec2::ZERO);
    let fire = game.spawn_fire(Vec2::new(4.0, 4.0));

    game.run_ticks(12);

    assert!(game.manager().entity(fire).is_none());
    let health = game
        .manager()
        .entity(wall)
        .unwrap()
        .ext::<Destructible>()
        .unwrap()
        .health();
    assert!(health > 0 && health < 10);
}

// ---------------------------------------------------------------------------
// Wire payload
// ---------------------------------------------------------------------------

#[test]
fn payload_is_the_flat_entity_list() {
    let (mut game, _) = game_at(1.0 / 30.0);
    game.spawn_player(Vec2::new(32.0, 48.0));
    game.spawn_wall(Vec2::new(100.0, 100.0));

    let payload = game.tick().payload();
    let list = payload.as_array().unwrap();
    assert_eq!(list.len(), 2);

    let player = &list[0];
    assert_eq!(player["id"], "1");
    assert_eq!(player["type"], "player");
    let kinds: Vec<&str> = player["extensions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["kind"].as_str().unwrap())
        .collect();
    assert_eq!(
        kinds,
        [
            "positionable",
            "movable",
            "collidable",
            "destructible",
            "inventory",
            "groupable",
            "controllable",
            "updatable",
        ]
    );
    assert_eq!(player["extensions"][0]["position"]["x"], 32.0);
    assert_eq!(player["extensions"][3]["maxHealth"], 3);
    assert_eq!(player["extensions"][4]["items"][1]["itemType"], "pistol");
    assert_eq!(player["extensions"][5]["group"], "friendly");

    let wall = &list[1];
    assert_eq!(wall["type"], "wall");
    assert_eq!(wall["extensions"][2]["health"], 10);
}

#[test]
fn ids_are_never_reused() {
    let (mut game, _) = game_at(1.0);
    let a = game.spawn_wall(Vec2::ZERO);
    game.manager_mut().damage(a, 10);
    game.tick();
    let b = game.spawn_wall(Vec2::ZERO);
    assert!(b > a);
    assert!(game.manager().entity(a).is_none());
}
