use canopy::{
    controller::TurnController,
    grid::{standard_records, Grid},
    policy::Policy,
    protocol::{ProtocolError, ProtocolReader},
};

fn board_text() -> String {
    let records = standard_records();
    let mut text = format!("{}\n", records.len());
    for record in &records {
        let neighbors: Vec<String> = record.neighbors.iter().map(|n| n.to_string()).collect();
        text.push_str(&format!(
            "{} {} {}\n",
            record.id,
            record.richness,
            neighbors.join(" ")
        ));
    }
    text
}

fn play(text: &str) -> Result<Vec<String>, ProtocolError> {
    let mut reader = ProtocolReader::new(text.as_bytes());
    let grid = Grid::from_records(&reader.read_board()?)?;
    let mut controller = TurnController::new(grid, Policy::default());
    let mut out = Vec::new();
    while let Some(input) = reader.read_turn()? {
        out.push(controller.decide(&input)?.to_string());
    }
    Ok(out)
}

#[test]
fn plays_a_short_game_over_the_line_protocol() {
    let mut text = board_text();
    // Day 0, nothing on the board.
    text.push_str("0\n20\n2 0\n2 0 0\n0\n1\nWAIT\n");
    // Day 12, losing, one unshaded fully grown tree and a dormant sapling.
    text.push_str("12\n20\n10 0\n8 20 0\n2\n0 3 1 0\n20 1 1 1\n2\nWAIT\nCOMPLETE 0\n");

    let out = play(&text).unwrap();
    assert_eq!(out, vec!["WAIT".to_string(), "COMPLETE 0".to_string()]);
}

#[test]
fn parsed_board_matches_the_built_in_one() {
    let text = board_text();
    let mut reader = ProtocolReader::new(text.as_bytes());
    let records = reader.read_board().unwrap();
    assert_eq!(records, standard_records());
    assert_eq!(reader.line(), 38);
}

#[test]
fn invalid_tree_surfaces_as_input_error() {
    let mut text = board_text();
    text.push_str("3\n20\n2 0\n2 0 0\n1\n44 1 1 0\n0\n");
    let err = play(&text).unwrap_err();
    assert!(matches!(err, ProtocolError::Input(_)), "{err}");
}

#[test]
fn broken_board_surfaces_as_grid_error() {
    let text = "2\n0 3 5 -1 -1 -1 -1 -1\n1 3 -1 -1 -1 0 -1 -1\n";
    let err = play(text).unwrap_err();
    assert!(matches!(err, ProtocolError::Grid(_)), "{err}");
}
