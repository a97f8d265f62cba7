// Ballots stored as a JSON list.

use crate::rcv::{io_common::make_default_id, *};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct JsonBallot {
    id: Option<String>,
    count: Option<u64>,
    choices: Vec<String>,
}

pub fn read_json_ranking(path: &str) -> RcvResult<Vec<ParsedBallot>> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    parse_json_ranking(&contents, path)
}

pub fn parse_json_ranking(contents: &str, path: &str) -> RcvResult<Vec<ParsedBallot>> {
    let default_id = make_default_id(path);
    let ballots: Vec<JsonBallot> =
        serde_json::from_str(contents).context(ParsingJsonSnafu { path })?;
    Ok(ballots
        .into_iter()
        .enumerate()
        .map(|(idx, jb)| ParsedBallot {
            id: Some(jb.id.unwrap_or_else(|| default_id(idx + 1))),
            count: jb.count,
            choices: jb
                .choices
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_ballots() {
        let js = r#"[
            { "id": "b1", "count": 20, "choices": ["A", "B", "C"] },
            { "choices": ["B", " ", "C"] }
        ]"#;
        let res = parse_json_ranking(js, "ballots.json").unwrap();
        assert_eq!(res[0].id, Some("b1".to_string()));
        assert_eq!(res[0].count, Some(20));
        assert_eq!(res[1].id, Some("ballots.json-00000002".to_string()));
        assert_eq!(res[1].count, None);
        assert_eq!(res[1].choices, vec!["B".to_string(), "C".to_string()]);
    }

    #[test]
    fn malformed_json() {
        let res = parse_json_ranking("{", "ballots.json");
        assert!(matches!(res, Err(RcvError::ParsingJson { .. })));
    }
}
