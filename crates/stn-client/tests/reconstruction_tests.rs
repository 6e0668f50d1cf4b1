//! Server-to-client round trips: payloads produced by a running game loop
//! must reconstruct into mirrors that agree with the server's entities.

use serde_json::json;
use stn_client::prelude::*;
use stn_engine::entities::ammo::spawn_shotgun_ammo;
use stn_engine::entities::bandage::spawn_bandage;
use stn_engine::prelude::{Destructible, Direction, GameConfig, GameLoop};

fn arena() -> (GameLoop, EntityId, EntityId) {
    let mut game = GameLoop::from_config(GameConfig::default());
    let player = game.spawn_player(Vec2::new(0.0, 0.0));
    let zombie = game.spawn_zombie(Vec2::new(150.0, 0.0));
    game.spawn_wall(Vec2::new(0.0, 64.0));
    game.spawn_fire(Vec2::new(300.0, 300.0));
    spawn_shotgun_ammo(game.manager_mut(), Vec2::new(-40.0, 0.0), 5);
    spawn_bandage(game.manager_mut(), Vec2::new(-80.0, 0.0));
    (game, player, zombie)
}

#[test]
fn every_server_entity_reconstructs() {
    let (mut game, player, zombie) = arena();
    let snapshot = game.tick();

    let result = EntityFactory::new().reconstruct(&snapshot.payload());
    assert!(result.is_clean(), "{:?}", result.errors);
    assert_eq!(result.entities.len(), snapshot.len());

    for (mirror, record) in result.entities.iter().zip(&snapshot.entities) {
        assert_eq!(mirror.id(), record.id);
        assert_eq!(mirror.entity_type(), record.entity_type);
        let server = game.manager().entity(record.id).unwrap();
        assert_eq!(Some(mirror.position()), server.position());
    }

    let types: Vec<EntityType> = result.entities.iter().map(ClientEntity::entity_type).collect();
    assert_eq!(
        types,
        [
            EntityType::Player,
            EntityType::Zombie,
            EntityType::Wall,
            EntityType::Fire,
            EntityType::ShotgunAmmo,
            EntityType::Bandage,
        ]
    );
    assert!(matches!(&result.entities[0], ClientEntity::Player(p) if p.id == player));
    assert!(matches!(&result.entities[1], ClientEntity::Zombie(z) if z.id == zombie));
}

#[test]
fn mirrors_carry_display_fields() {
    let (mut game, player, zombie) = arena();
    game.manager_mut().damage(zombie, 1);
    game.set_player_input(
        player,
        Input {
            facing: Direction::Left,
            selected_slot: 3,
            ..Input::default()
        },
    )
    .unwrap();
    let payload = game.tick().payload();

    let mut state = ClientState::new();
    assert!(state.apply(&payload).is_empty());

    let p = state.player(player).unwrap();
    assert_eq!((p.health, p.max_health), (3, 3));
    assert_eq!(p.input.facing, Direction::Left);
    assert_eq!(p.active_item().unwrap().item_type, "shotgun");
    assert_eq!(p.inventory.len(), 3);

    let Some(ClientEntity::Zombie(z)) = state.get(zombie) else {
        panic!("zombie mirror missing");
    };
    assert_eq!(z.health, 2);
    assert!(z.velocity.x < 0.0);

    let items: Vec<&ItemMirror> = state
        .entities()
        .filter_map(|e| match e {
            ClientEntity::Item(item) => Some(item),
            _ => None,
        })
        .collect();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].item_type, "shotgun_ammo");
    assert_eq!(items[0].display_name.as_deref(), Some("shotgun ammo"));
    assert_eq!(items[0].count(), Some(5));
    assert_eq!(items[1].item_type, "bandage");
    assert_eq!(items[1].count(), None);
}

#[test]
fn state_follows_removals_across_ticks() {
    let (mut game, _, _) = arena();
    let mut state = ClientState::new();
    state.apply(&game.tick().payload());
    assert_eq!(state.of_type(EntityType::Wall).count(), 1);

    let wall = game.manager().entities_of_type(EntityType::Wall)[0];
    let health = game
        .manager()
        .entity(wall)
        .unwrap()
        .ext::<Destructible>()
        .unwrap()
        .health();
    game.manager_mut().damage(wall, health);
    state.apply(&game.tick().payload());

    assert_eq!(state.of_type(EntityType::Wall).count(), 0);
    assert!(state.get(wall).is_none());
}

#[test]
fn one_unknown_record_does_not_poison_the_payload() {
    let (mut game, _, _) = arena();
    let mut payload = game.tick().payload();
    payload
        .as_array_mut()
        .unwrap()
        .push(json!({ "id": "999", "type": "landmine", "extensions": [] }));

    let result = EntityFactory::new().reconstruct(&payload);
    assert_eq!(result.entities.len(), 6);
    assert_eq!(
        result.errors,
        [ReconstructError::UnknownEntityType {
            type_tag: "landmine".to_owned()
        }]
    );
}

#[test]
fn non_finite_input_keeps_the_player_on_the_wire() {
    let (mut game, player, _) = arena();
    game.set_player_input(
        player,
        Input {
            dx: f64::INFINITY,
            dy: f64::NAN,
            ..Input::default()
        },
    )
    .unwrap();
    let payload = game.tick().payload();

    let mut state = ClientState::new();
    assert!(state.apply(&payload).is_empty());
    let p = state.player(player).unwrap();
    assert_eq!(p.position, Vec2::new(0.0, 0.0));
    assert_eq!((p.input.dx, p.input.dy), (0.0, 0.0));
}
