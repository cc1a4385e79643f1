use vacuum_replay::{
    AutoContinue, JsonLinesRenderer, Replay, SessionContext, TrajectoryStore, run,
};

fn frame_stream() -> Vec<u8> {
    let store = TrajectoryStore::from_json_str(
        include_str!("data/initial_house.json"),
        include_str!("data/steps_history.json"),
    )
    .unwrap();
    let replay = Replay::new(&store, SessionContext::default()).unwrap();
    let mut renderer = JsonLinesRenderer::new(Vec::new());
    run(replay, &mut renderer, &mut AutoContinue).unwrap();
    renderer.into_inner()
}

#[test]
fn replay_is_deterministic() {
    let a = frame_stream();
    let b = frame_stream();
    assert!(!a.is_empty());
    assert_eq!(a, b);

    // 2 session events + 17 frames + 1 report.
    let text = String::from_utf8(a).unwrap();
    assert_eq!(text.lines().count(), 20);
}
