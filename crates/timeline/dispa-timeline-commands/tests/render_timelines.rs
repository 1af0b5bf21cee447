use dispa_timeline_commands::{CommandConfig, CommandHost};
use dispa_timeline_core::{parse_stored_timeline_json, Engine, Inputs, Objective, TimelineCommand};

fn engine_for(fixture: &str) -> Engine {
    let json = dispa_test_fixtures::timelines::json(fixture).expect("fixture");
    let table = parse_stored_timeline_json(&json).expect("parse");
    Engine::default().with_timeline(table).expect("register")
}

fn quiet_host() -> CommandHost {
    CommandHost::new(CommandConfig {
        emit_scores: false,
        ..CommandConfig::default()
    })
}

#[test]
fn dtest_atest_emits_merge_commands() {
    let mut eng = engine_for("dtest-atest");
    let mut host = quiet_host();

    eng.update(Inputs::none(), &mut host);
    assert_eq!(
        host.take_lines(),
        vec!["execute as @e[tag=dtest-a] run data merge entity @s {start_interpolation:0,interpolation_duration:100,transformation:{translation:[1f,0f,0f]}}"]
    );

    for _ in 1..100 {
        eng.update(Inputs::none(), &mut host);
    }
    assert!(host.lines().is_empty());

    eng.update(Inputs::none(), &mut host);
    assert_eq!(
        host.take_lines(),
        vec![
            "execute as @e[tag=dtest-a] run data merge entity @s {start_interpolation:0,interpolation_duration:20,transformation:{translation:[0f,0f,0f]}}",
            "execute as @e[tag=dtest-a] run data merge entity @s {start_interpolation:0,interpolation_duration:20,transformation:{left_rotation:[0f,0.70710677f,0f,0.70710677f]}}",
            "execute as @e[tag=dtest-a] run data merge entity @s {start_interpolation:0,interpolation_duration:20,transformation:{scale:[2f,2f,2f]}}",
        ]
    );
    assert_eq!(eng.score("dtest-atest", Objective::Timer), 0);
}

#[test]
fn test_obj_spawn_tick_renders_in_source_order() {
    let mut eng = engine_for("test_obj-test_anim");
    let mut host = quiet_host();
    for _ in 0..40 {
        eng.update(Inputs::none(), &mut host);
    }
    host.take_lines();

    eng.update(Inputs::none(), &mut host);
    assert_eq!(
        host.take_lines(),
        vec![
            r#"execute at @e[tag=test_obj-body] run summon minecraft:block_display ~ ~ ~ {Tags:["test_obj","test_obj-block"]}"#,
            r#"execute at @e[tag=test_obj-body] run summon minecraft:item_display ~ ~ ~ {Tags:["test_obj","test_obj-item"]}"#,
            r#"execute at @e[tag=test_obj-body] run summon minecraft:text_display ~ ~ ~ {Tags:["test_obj","test_obj-label"]}"#,
            r#"execute as @e[tag=test_obj-block] run data merge entity @s {block_state:{Name:"minecraft:oak_stairs",Properties:{facing:"north",half:"top"}}}"#,
            "item replace entity @e[tag=test_obj-item] container.0 with minecraft:diamond_sword",
            r#"execute as @e[tag=test_obj-label] run data merge entity @s {text:'"Hello there"'}"#,
            "execute as @e[tag=test_obj-label] at @s run tp @s ~0 ~1.5 ~0",
            "setblock 10 64 -3 minecraft:redstone_block",
        ]
    );
}

#[test]
fn register_writes_become_scoreboard_lines() {
    let mut eng = engine_for("dtest-atest");
    let mut host = CommandHost::default();

    eng.update(
        Inputs::none().with(TimelineCommand::SetScore {
            timeline: "dtest-atest".into(),
            objective: Objective::Timer,
            value: 100,
        }),
        &mut host,
    );
    let lines = host.take_lines();
    assert_eq!(
        lines.first().map(String::as_str),
        Some("scoreboard players set $dtest-atest timer 100")
    );
    assert_eq!(
        &lines[lines.len() - 3..],
        [
            "scoreboard players set $dtest-atest flags 0",
            "scoreboard players set $dtest-atest timer -1",
            "scoreboard players set $dtest-atest timer 0",
        ]
    );
}
