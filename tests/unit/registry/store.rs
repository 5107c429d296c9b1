use std::sync::{Arc, Mutex};

use super::*;
use crate::sheet::descriptor::SpritesheetRegion;

fn solid_surface(width: u32, height: u32, rgba: [u8; 4]) -> Surface {
    Surface::from_rgba8(width, height, rgba.repeat((width * height) as usize)).unwrap()
}

fn descriptor(keys: &[&str], wordmap: &[(&str, &str)]) -> SpritesheetDescriptor {
    let mut d = SpritesheetDescriptor::default();
    for key in keys {
        d.regions.insert(
            (*key).to_string(),
            vec![SpritesheetRegion::new(0, 0, 2, 2).unwrap()],
        );
    }
    for (word, object) in wordmap {
        d.wordmap.insert((*word).to_string(), (*object).to_string());
    }
    d
}

fn startup_registry() -> SpriteRegistry {
    let mut reg = SpriteRegistry::new();
    reg.install_main(&solid_surface(4, 4, [1, 1, 1, 255]), descriptor(&["baba", "is"], &[]))
        .unwrap();
    reg.install_object_default(
        &solid_surface(4, 4, [2, 2, 2, 255]),
        descriptor(&["babaj", "trans"], &[("blahaj", "Babaj"), ("trans", "trans")]),
    )
    .unwrap();
    reg
}

#[test]
fn startup_sources_load_once() {
    let mut reg = startup_registry();
    assert_eq!(reg.state(SpritesheetSource::Main), LoadState::Loaded);
    assert_eq!(reg.state(SpritesheetSource::ObjectDefault), LoadState::Loaded);
    assert_eq!(reg.state(SpritesheetSource::ObjectUsermade), LoadState::Unloaded);

    let again = reg.install_main(&solid_surface(4, 4, [0; 4]), descriptor(&["baba"], &[]));
    assert!(matches!(again, Err(SmtxError::Registry(_))));
    assert_eq!(reg.animated_sprites().len(), 4);
}

#[test]
fn init_fires_once_after_both_startup_sheets() {
    let fired = Arc::new(Mutex::new(0usize));
    let mut reg = SpriteRegistry::new();
    let counter = Arc::clone(&fired);
    reg.on_spritesheet_init(move || *counter.lock().unwrap() += 1);

    reg.install_main(&solid_surface(4, 4, [1; 4]), descriptor(&["baba"], &[]))
        .unwrap();
    assert_eq!(*fired.lock().unwrap(), 0);
    reg.install_object_default(&solid_surface(4, 4, [2; 4]), descriptor(&["babaj"], &[]))
        .unwrap();
    assert_eq!(*fired.lock().unwrap(), 1);

    reg.install_usermade(&solid_surface(4, 4, [3; 4]), descriptor(&["babaj"], &[]))
        .unwrap();
    assert_eq!(*fired.lock().unwrap(), 1);
}

#[test]
fn usermade_override_respects_toggle() {
    let mut reg = startup_registry();
    reg.install_usermade(&solid_surface(4, 4, [9, 9, 9, 255]), descriptor(&["babaj"], &[]))
        .unwrap();

    let s = reg.get_animated_sprite("babaj").unwrap();
    assert_eq!(s.source(), SpritesheetSource::ObjectDefault);

    reg.set_enable_usermade(true);
    let s = reg.get_animated_sprite("babaj").unwrap();
    assert_eq!(s.source(), SpritesheetSource::ObjectUsermade);
    assert_eq!(s.frame(0).pixel(0, 0), Some([9, 9, 9, 255]));

    reg.set_enable_usermade(false);
    assert!(
        reg.animated_sprites()
            .iter()
            .any(|s| s.source() == SpritesheetSource::ObjectUsermade)
    );
    assert_eq!(
        reg.get_animated_sprite("babaj").unwrap().source(),
        SpritesheetSource::ObjectDefault
    );
}

#[test]
fn usermade_only_keys_are_hidden_while_disabled() {
    let mut reg = startup_registry();
    reg.install_usermade(&solid_surface(4, 4, [5; 4]), descriptor(&["prunsel"], &[]))
        .unwrap();
    assert!(reg.get_animated_sprite("prunsel").is_none());
    reg.set_enable_usermade(true);
    assert!(reg.get_animated_sprite("prunsel").is_some());
}

#[test]
fn reload_replaces_previous_usermade_set() {
    let mut reg = startup_registry();
    reg.set_enable_usermade(true);
    reg.install_usermade(&solid_surface(4, 4, [5; 4]), descriptor(&["a", "b"], &[]))
        .unwrap();
    reg.install_usermade(&solid_surface(4, 4, [6; 4]), descriptor(&["c"], &[]))
        .unwrap();

    let usermade: Vec<_> = reg
        .animated_sprites()
        .iter()
        .filter(|s| s.source() == SpritesheetSource::ObjectUsermade)
        .map(|s| s.key().to_string())
        .collect();
    assert_eq!(usermade, vec!["c".to_string()]);
    assert!(reg.get_animated_sprite("a").is_none());
    assert_eq!(
        reg.sheets_for_test(SpritesheetSource::ObjectUsermade),
        1,
        "at most one record per source"
    );
}

#[test]
fn failed_usermade_cut_keeps_previous_data() {
    let mut reg = startup_registry();
    reg.set_enable_usermade(true);
    reg.install_usermade(&solid_surface(4, 4, [5; 4]), descriptor(&["babaj"], &[]))
        .unwrap();

    let mut bad = SpritesheetDescriptor::default();
    bad.regions.insert(
        "babaj".to_string(),
        vec![SpritesheetRegion::new(3, 3, 2, 2).unwrap()],
    );
    let err = reg
        .install_usermade(&solid_surface(4, 4, [7; 4]), bad)
        .unwrap_err();
    assert!(matches!(err, SmtxError::OutOfBounds { .. }));

    let s = reg.get_animated_sprite("babaj").unwrap();
    assert_eq!(s.source(), SpritesheetSource::ObjectUsermade);
    assert_eq!(s.frame(0).pixel(0, 0), Some([5; 4]));
    assert_eq!(reg.state(SpritesheetSource::ObjectUsermade), LoadState::Loaded);
}

#[test]
fn failed_usermade_decode_keeps_previous_state() {
    let mut reg = startup_registry();
    let err = pollster::block_on(reg.load_usermade(b"not an image", descriptor(&["x"], &[])))
        .unwrap_err();
    assert!(matches!(err, SmtxError::SurfaceInit(_)));
    assert_eq!(reg.state(SpritesheetSource::ObjectUsermade), LoadState::Unloaded);
}

#[test]
fn unload_removes_sprites_and_record() {
    let mut reg = startup_registry();
    assert!(!reg.unload_usermade());
    reg.install_usermade(&solid_surface(4, 4, [5; 4]), descriptor(&["babaj"], &[]))
        .unwrap();
    assert!(reg.unload_usermade());
    assert!(reg.get_spritesheet(SpritesheetSource::ObjectUsermade).is_none());
    assert_eq!(reg.state(SpritesheetSource::ObjectUsermade), LoadState::Unloaded);
    assert!(
        reg.animated_sprites()
            .iter()
            .all(|s| s.source() != SpritesheetSource::ObjectUsermade)
    );
}

#[test]
fn reload_notifications_follow_committed_mutations() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut reg = startup_registry();
    let sink = Arc::clone(&seen);
    reg.on_spritesheet_reload(move |reason| sink.lock().unwrap().push(reason));

    reg.install_usermade(&solid_surface(4, 4, [5; 4]), descriptor(&["a"], &[]))
        .unwrap();
    let _ = reg.install_usermade(&solid_surface(1, 1, [5; 4]), descriptor(&["a"], &[]));
    reg.set_enable_usermade(true);
    reg.unload_usermade();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            ReloadReason::UsermadeLoaded,
            ReloadReason::UsermadeToggled { enabled: true },
            ReloadReason::UsermadeUnloaded,
        ]
    );
}

#[test]
fn word_map_merges_usermade_only_when_enabled() {
    let mut reg = startup_registry();
    reg.install_usermade(
        &solid_surface(4, 4, [5; 4]),
        descriptor(&["keke"], &[("blahaj", "keke"), ("kiki", "KEKE")]),
    )
    .unwrap();

    assert_eq!(reg.get_word_object("blahaj").as_deref(), Some("babaj"));
    assert!(!reg.is_word_special("kiki"));

    reg.set_enable_usermade(true);
    let map = reg.get_word_object_map();
    assert_eq!(map.get("blahaj").map(String::as_str), Some("keke"));
    assert_eq!(map.get("trans").map(String::as_str), Some("trans"));
    assert_eq!(reg.get_word_object("kiki").as_deref(), Some("keke"));
    assert!(reg.is_word_special("kiki"));
}

#[test]
fn resolve_word_uses_object_sprite_for_special_words() {
    let reg = startup_registry();
    assert_eq!(reg.resolve_word("blahaj").unwrap().key(), "babaj");
    assert_eq!(reg.resolve_word("baba").unwrap().key(), "baba");
    assert!(reg.resolve_word("rock").is_none());
}

impl SpriteRegistry {
    fn sheets_for_test(&self, source: SpritesheetSource) -> usize {
        self.sheets.iter().filter(|s| s.source == source).count()
    }
}
