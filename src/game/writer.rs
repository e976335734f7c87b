//! Text renderings of a game in the classic `.nfg` and `.efg` layouts.

use rustc_hash::FxHashMap;

use crate::game::arena::Key;
use crate::game::data::{Form, GameData};
use crate::game::error::{GameError, Result};
use crate::game::Game;

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

fn payoff_list(data: &GameData, outcome: Key) -> Result<String> {
    let values: Vec<String> = data
        .outcome(outcome)?
        .payoffs
        .iter()
        .map(|p| p.text().to_string())
        .collect();
    Ok(values.join(", "))
}

fn outcome_numbers(data: &GameData) -> FxHashMap<Key, usize> {
    data.outcomes
        .iter()
        .enumerate()
        .map(|(i, &o)| (o, i + 1))
        .collect()
}

fn header(data: &GameData, tag: &str) -> Result<String> {
    let mut out = format!("{} R {} {{ ", tag, quote(&data.title));
    for &player in &data.players {
        out.push_str(&quote(&data.player(player)?.label));
        out.push(' ');
    }
    out.push('}');
    Ok(out)
}

impl Game {
    /// Renders a table game in outcome-list `.nfg` format.
    ///
    /// Contingencies are listed with the first player's strategy varying
    /// fastest; `0` marks a cell without an outcome.
    pub fn to_nfg(&self) -> Result<String> {
        let data = self.shared().borrow();
        data.require_table("to_nfg")?;
        let Some(Form::Table { results }) = &data.form else {
            return Err(GameError::Uninitialized);
        };

        let mut out = header(&data, "NFG 1")?;
        out.push_str("\n\n{ ");
        for strategies in data.strategy_lists() {
            out.push_str("{ ");
            for key in strategies {
                out.push_str(&quote(&data.strategy(key)?.label));
                out.push(' ');
            }
            out.push_str("}\n");
        }
        out.push_str("}\n");
        out.push_str(&quote(&data.comment));
        out.push_str("\n\n{\n");
        for &outcome in &data.outcomes {
            out.push_str(&format!(
                "{{ {} {} }}\n",
                quote(&data.outcome(outcome)?.label),
                payoff_list(&data, outcome)?
            ));
        }
        out.push_str("}\n");

        let numbers = outcome_numbers(&data);
        let cells: Vec<String> = results
            .iter()
            .map(|cell| {
                cell.and_then(|o| numbers.get(&o).copied())
                    .unwrap_or(0)
                    .to_string()
            })
            .collect();
        out.push_str(&cells.join(" "));
        out.push('\n');
        Ok(out)
    }

    /// Renders a tree game in `.efg` format, nodes in depth-first order.
    pub fn to_efg(&self) -> Result<String> {
        let data = self.shared().borrow();
        let (root, chance) = data.require_tree("to_efg")?;
        let mut out = header(&data, "EFG 2")?;
        out.push('\n');
        out.push_str(&quote(&data.comment));
        out.push_str("\n\n");

        let numbers = outcome_numbers(&data);
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            let node_data = data.node(node)?;
            let mut line = match node_data.infoset {
                None => format!("t {} ", quote(&node_data.label)),
                Some(infoset) => {
                    let info = data.infoset(infoset)?;
                    let owner = data.player(info.player)?;
                    let number = owner
                        .infosets
                        .iter()
                        .position(|&i| i == infoset)
                        .map_or(0, |i| i + 1);
                    let mut line = if info.player == chance {
                        format!("c {} {} {} {{ ", quote(&node_data.label), number, quote(&info.label))
                    } else {
                        let player = data.player_position(info.player).map_or(0, |p| p + 1);
                        format!(
                            "p {} {} {} {} {{ ",
                            quote(&node_data.label),
                            player,
                            number,
                            quote(&info.label)
                        )
                    };
                    for &action in &info.actions {
                        let action = data.action(action)?;
                        line.push_str(&quote(&action.label));
                        line.push(' ');
                        if let Some(prob) = &action.prob {
                            line.push_str(prob.text());
                            line.push(' ');
                        }
                    }
                    line.push_str("} ");
                    line
                }
            };
            match node_data.outcome {
                Some(outcome) => {
                    line.push_str(&format!(
                        "{} {} {{ {} }}",
                        numbers.get(&outcome).copied().unwrap_or(0),
                        quote(&data.outcome(outcome)?.label),
                        payoff_list(&data, outcome)?
                    ));
                }
                None => line.push('0'),
            }
            out.push_str(&line);
            out.push('\n');
            stack.extend(node_data.children.iter().rev());
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nfg_lists_cells_first_player_fastest() {
        let game = Game::new_table(&[2, 2]);
        game.set_title("Test");
        let players = game.players().unwrap();
        players[0].set_label("Row").unwrap();
        players[1].set_label("Col").unwrap();
        let outcome = game.outcome_at((1, 0)).unwrap().unwrap();
        outcome.set_payoff(&players[0], "1/2").unwrap();
        game.set_outcome_at((1, 1), None).unwrap();

        let nfg = game.to_nfg().unwrap();
        assert!(nfg.starts_with("NFG 1 R \"Test\" { \"Row\" \"Col\" }"));
        assert!(nfg.contains("{ \"1\" \"2\" }"));
        assert!(nfg.contains("{ \"\" 1/2, 0 }"));
        assert!(nfg.trim_end().ends_with("1 2 3 0"));
    }

    #[test]
    fn test_efg_writes_nodes_depth_first() {
        let game = Game::new_tree();
        let player = game.add_player("Alice").unwrap();
        let root = game.root().unwrap();
        game.append_move(&root, &game.chance().unwrap(), ["H", "T"])
            .unwrap();
        game.append_move(&root.child(0).unwrap(), &player, ["a", "b"])
            .unwrap();
        let outcome = game.add_outcome("win").unwrap();
        outcome.set_payoff(&player, 2).unwrap();
        game.set_outcome(&root.child(1).unwrap(), Some(&outcome))
            .unwrap();

        let efg = game.to_efg().unwrap();
        let lines: Vec<&str> = efg.lines().collect();
        assert_eq!(lines[0], "EFG 2 R \"\" { \"Alice\" }");
        assert_eq!(lines[3], "c \"\" 1 \"\" { \"H\" 1/2 \"T\" 1/2 } 0");
        assert_eq!(lines[4], "p \"\" 1 1 \"\" { \"a\" \"b\" } 0");
        assert_eq!(lines[5], "t \"\" 0");
        assert_eq!(lines[7], "t \"\" 1 \"win\" { 2 }");
    }

    #[test]
    fn test_writers_check_representation() {
        assert!(matches!(
            Game::new_tree().to_nfg(),
            Err(GameError::UnsupportedRepresentation { .. })
        ));
        assert!(matches!(
            Game::new_table(&[1]).to_efg(),
            Err(GameError::UnsupportedRepresentation { .. })
        ));
        assert_eq!(Game::new().to_efg(), Err(GameError::Uninitialized));
    }
}
