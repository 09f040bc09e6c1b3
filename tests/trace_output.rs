use canopy::{
    controller::ControllerBuilder,
    grid::Grid,
    policy::Policy,
    state::{TreeRecord, TurnInput},
    trace::{TraceConfig, TraceWriter},
};
use tempfile::tempdir;

fn input(day: u32) -> TurnInput {
    TurnInput {
        day,
        nutrients: 20,
        sun: 3,
        score: 0,
        opp_sun: 0,
        opp_score: 0,
        opp_waiting: false,
        trees: vec![TreeRecord {
            cell: 0,
            size: 1,
            is_mine: true,
            is_dormant: false,
        }],
    }
}

#[test]
fn writes_a_trace_per_interval() {
    let temp = tempdir().expect("tempdir");
    let config = TraceConfig::default()
        .with_output_dir(temp.path())
        .with_interval(2);
    let mut controller = ControllerBuilder::new(Grid::standard().unwrap(), Policy::default())
        .with_default_planners()
        .with_trace(TraceWriter::new(config))
        .build();

    for day in 1..=4 {
        controller.decide(&input(day)).expect("valid input");
    }

    let mut files: Vec<String> = std::fs::read_dir(temp.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    assert_eq!(files, vec!["turn_0002.json", "turn_0004.json"]);

    let text = std::fs::read_to_string(temp.path().join("turn_0004.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["decision"]["turn"], 4);
    assert_eq!(json["decision"]["day"], 4);
    assert_eq!(json["state"]["day"], 4);
    assert_eq!(json["decision"]["reports"][0]["name"], "complete");
    assert!(json["decision"]["action"]["kind"].is_string());
}

#[test]
fn zero_interval_writes_nothing() {
    let temp = tempdir().expect("tempdir");
    let config = TraceConfig::default()
        .with_output_dir(temp.path().join("never"))
        .with_interval(0);
    let mut controller = ControllerBuilder::new(Grid::standard().unwrap(), Policy::default())
        .with_default_planners()
        .with_trace(TraceWriter::new(config))
        .build();
    controller.decide(&input(1)).expect("valid input");
    assert!(!temp.path().join("never").exists());
}

#[test]
fn unwritable_trace_dir_does_not_fail_the_turn() {
    let temp = tempdir().expect("tempdir");
    let blocker = temp.path().join("file");
    std::fs::write(&blocker, "not a directory").unwrap();
    let config = TraceConfig::default().with_output_dir(blocker.join("traces"));
    let mut controller = ControllerBuilder::new(Grid::standard().unwrap(), Policy::default())
        .with_default_planners()
        .with_trace(TraceWriter::new(config))
        .build();
    assert!(controller.decide(&input(1)).is_ok());
    assert!(controller.last_decision().is_some());
}
