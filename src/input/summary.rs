use std::{collections::BTreeSet, io::Write};

use crate::{
    foundation::error::{ReplayError, ReplayResult},
    input::store::TrajectoryStore,
};

/// Algorithm x house table of recorded scores, as the planner's `summary.csv` lays it out.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ScoreSummary {
    pub houses: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SummaryRow {
    pub algorithm: String,
    pub scores: Vec<Option<f64>>, // parallel to `ScoreSummary::houses`
}

impl ScoreSummary {
    /// Every algorithm name in the step log is listed, including ones the replay does not
    /// compare. Houses and algorithms are sorted; the first record per pair wins.
    pub fn from_store(store: &TrajectoryStore) -> Self {
        let houses: BTreeSet<&str> = store
            .records()
            .iter()
            .map(|r| r.house_name.as_str())
            .collect();
        let algorithms: BTreeSet<&str> = store
            .records()
            .iter()
            .map(|r| r.algorithm_name.as_str())
            .collect();

        let rows = algorithms
            .iter()
            .map(|&algorithm| SummaryRow {
                algorithm: algorithm.to_string(),
                scores: houses
                    .iter()
                    .map(|&house| {
                        store
                            .records()
                            .iter()
                            .find(|r| r.algorithm_name == algorithm && r.house_name == house)
                            .map(|r| r.trajectory.score)
                    })
                    .collect(),
            })
            .collect();

        Self {
            houses: houses.into_iter().map(str::to_string).collect(),
            rows,
        }
    }

    pub fn write_csv<W: Write>(&self, mut w: W) -> ReplayResult<()> {
        let io = |e: std::io::Error| ReplayError::io(format!("write summary: {e}"));

        write!(w, "Algorithm/House").map_err(io)?;
        for house in &self.houses {
            write!(w, ",{house}").map_err(io)?;
        }
        writeln!(w).map_err(io)?;

        for row in &self.rows {
            write!(w, "{}", row.algorithm).map_err(io)?;
            for score in &row.scores {
                match score {
                    Some(s) => write!(w, ",{s}").map_err(io)?,
                    None => write!(w, ",N/A").map_err(io)?,
                }
            }
            writeln!(w).map_err(io)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_matches_planner_layout() {
        let steps = r#"[
            {"houseName": "b", "algorithmName": "SpiralCleaningAlgorithm",
             "steps": [{"x": 0, "y": 0}], "score": 30},
            {"houseName": "a", "algorithmName": "DFSAlgorithm",
             "steps": [{"x": 0, "y": 0}], "score": 12},
            {"houseName": "b", "algorithmName": "DFSAlgorithm",
             "steps": [{"x": 0, "y": 0}], "score": 20}
        ]"#;
        let store = TrajectoryStore::from_json_str(r#"{"houses": []}"#, steps).unwrap();
        let summary = ScoreSummary::from_store(&store);
        assert_eq!(summary.houses, vec!["a", "b"]);

        let mut out = Vec::new();
        summary.write_csv(&mut out).unwrap();
        let csv = String::from_utf8(out).unwrap();
        assert_eq!(
            csv,
            "Algorithm/House,a,b\nDFSAlgorithm,12,20\nSpiralCleaningAlgorithm,N/A,30\n"
        );
    }
}
