use vacuum_replay::{HouseLog, StepRecord};

#[test]
fn json_fixtures_validate() {
    let houses: HouseLog = serde_json::from_str(include_str!("data/initial_house.json")).unwrap();
    for h in &houses.houses {
        h.validate().unwrap();
    }

    let records: Vec<StepRecord> =
        serde_json::from_str(include_str!("data/steps_history.json")).unwrap();
    assert_eq!(records.len(), 5);
    for r in &records {
        r.validate().unwrap();
        assert!(r.algorithm().is_some());
    }
}
