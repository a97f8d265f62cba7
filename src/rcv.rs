use log::{debug, info, warn};

use ranked_choice::builder::Builder;
use ranked_choice::*;
use snafu::{prelude::*, Snafu};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::rcv::config_reader::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_json;

#[derive(Debug, Snafu)]
pub enum RcvError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Expected a column index (starting at 1), found {value}"))]
    ParsingJsonNumber { value: String },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("CSV line {lineno} is too short"))]
    CsvLineTooShort { lineno: usize },
    #[snafu(display("CSV line {lineno}: could not read count {value:?}"))]
    CsvCount { lineno: usize, value: String },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("No ballot file given, use --input or a ballotSource in the configuration"))]
    MissingInput {},
    #[snafu(display("Input type {provider} is not supported (expected csv or json)"))]
    UnknownProvider { provider: String },
    #[snafu(display("Invalid ballot {id}"))]
    InvalidBallot { source: VotingErrors, id: String },
    #[snafu(display("Cannot tabulate the election"))]
    EmptyElection { source: VotingErrors },
    #[snafu(display("The election has no winner after {rounds} round(s)"))]
    NoWinner {
        source: TabulationError,
        rounds: usize,
    },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error serializing the summary"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},
}

pub type RcvResult<T> = Result<T, RcvError>;

/// A ballot, as parsed by the readers.
/// Empty choices have already been removed.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedBallot {
    pub id: Option<String>,
    pub count: Option<u64>,
    pub choices: Vec<String>,
}

/// The options of one run of the program.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RunOptions {
    pub config_path: Option<String>,
    pub input_path: Option<String>,
    pub input_type: Option<String>,
    pub out_path: Option<String>,
    pub reference_path: Option<String>,
}

fn result_stats_to_json(tab: &Tabulation<String>) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for (idx, round_stat) in tab.round_stats.iter().enumerate() {
        let mut tally: JSMap<String, JSValue> = JSMap::new();
        for (name, count) in round_stat.tally.iter() {
            tally.insert(name.clone(), json!(count.to_string()));
        }

        let mut tally_results: Vec<JSValue> = Vec::new();
        if let Some(elim_stats) = &round_stat.eliminated {
            // Only one candidate is eliminated per round: every gain in the next
            // round comes from its ballots.
            let mut transfers: JSMap<String, JSValue> = JSMap::new();
            if let Some(next_round) = tab.round_stats.get(idx + 1) {
                let previous: BTreeMap<&String, u64> =
                    round_stat.tally.iter().map(|(n, c)| (n, *c)).collect();
                for (name, count) in next_round.tally.iter() {
                    let before = previous.get(name).cloned().unwrap_or(0);
                    if *count > before {
                        transfers.insert(name.clone(), json!((count - before).to_string()));
                    }
                }
                let exhausted = next_round.exhausted.saturating_sub(round_stat.exhausted);
                if exhausted > 0 {
                    transfers.insert("exhausted".to_string(), json!(exhausted.to_string()));
                }
            }
            tally_results.push(json!({
                "eliminated": elim_stats.candidate,
                "transfers": transfers
            }));
        }
        if let Some(winner_name) = &round_stat.elected {
            tally_results.push(json!({
                "elected": winner_name,
                "transfers": {}
            }));
        }

        let js = json!({"round": round_stat.round, "tally": tally, "tallyResults": tally_results});
        l.push(js);
    }
    l
}

fn build_summary_js(settings: &OutputSettings, tab: &Tabulation<String>) -> JSValue {
    let c = OutputConfig {
        contest: settings.contest_name.clone(),
        date: settings.contest_date.clone(),
        jurisdiction: settings.contest_jurisdiction.clone(),
        office: settings.contest_office.clone(),
        threshold: Some(tab.threshold.to_string()),
    };
    json!({
        "config": c,
        "results": result_stats_to_json(tab) })
}

fn read_ranking_data(path: &str, cfs: &FileSource) -> RcvResult<Vec<ParsedBallot>> {
    info!("Attempting to read rank file {:?}", path);
    match cfs.provider.as_str() {
        "csv" => io_csv::read_csv_ranking(path, cfs),
        "json" => io_json::read_json_ranking(path),
        x => UnknownProviderSnafu { provider: x }.fail(),
    }
}

/// Checks the ballots and prepares the tabulator.
///
/// Progress is reported about every 10% of the ballots.
fn validate_ballots(
    parsed_ballots: &[ParsedBallot],
    candidates: &Option<Vec<RcvCandidate>>,
) -> RcvResult<RankedChoice<String>> {
    let mut builder: Builder<String> = Builder::new();
    if let Some(cands) = candidates {
        let names: Vec<String> = cands.iter().map(|c| c.name.clone()).collect();
        builder = builder.candidates(&names);
    }

    let total_to_process = parsed_ballots.len();
    let report_every = std::cmp::max(total_to_process / 10, 1);
    for (idx, pb) in parsed_ballots.iter().enumerate() {
        let count = pb.count.unwrap_or(1);
        if count == 0 {
            warn!("validate_ballots: skipping ballot {:?} with a count of 0", pb.id);
        } else {
            builder
                .add_weighted_ballot(&pb.choices, count)
                .context(InvalidBallotSnafu {
                    id: pb.id.clone().unwrap_or_default(),
                })?;
        }
        let processed = idx + 1;
        if processed % report_every == 0 || processed == total_to_process {
            info!("{} ballots processed", processed);
        }
    }
    builder.build().context(EmptyElectionSnafu {})
}

fn write_summary(out_path: &str, pretty_js_stats: &str) -> RcvResult<()> {
    if out_path == "stdout" {
        println!("{}", pretty_js_stats);
    } else {
        info!("Writing summary to {:?}", out_path);
        fs::write(out_path, pretty_js_stats).context(WritingOutputSnafu { path: out_path })?;
    }
    Ok(())
}

fn check_reference(summary_path: &str, pretty_js_stats: &str) -> RcvResult<()> {
    let summary_ref = read_summary(summary_path)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(SerializingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        return ReferenceMismatchSnafu {}.fail();
    }
    info!("Summary matches the reference {:?}", summary_path);
    Ok(())
}

fn resolve_source(
    opts: &RunOptions,
    config: &Option<RcvConfig>,
) -> RcvResult<(String, FileSource)> {
    let config_source = config.as_ref().and_then(|c| c.ballot_source.clone());
    let mut source = config_source.clone().unwrap_or_default();

    let path: String = match (&opts.input_path, &config_source, &opts.config_path) {
        (Some(p), _, _) => p.clone(),
        (None, Some(cfs), Some(config_path)) => {
            let root_p = Path::new(config_path.as_str())
                .parent()
                .context(MissingParentDirSnafu {})?;
            let p: PathBuf = root_p.join(cfs.file_path.as_str());
            p.as_path().display().to_string()
        }
        _ => return MissingInputSnafu {}.fail(),
    };

    if let Some(it) = &opts.input_type {
        source.provider = it.clone();
    } else if opts.input_path.is_some() || source.provider.is_empty() {
        source.provider = io_common::input_type_from_path(&path).unwrap_or_else(|| "csv".to_string());
    }
    Ok((path, source))
}

pub fn run_election(opts: &RunOptions) -> RcvResult<()> {
    let config: Option<RcvConfig> = match &opts.config_path {
        Some(p) => Some(read_config(p)?),
        None => None,
    };
    info!("config: {:?}", config);

    let (path, source) = resolve_source(opts, &config)?;
    let parsed_ballots = read_ranking_data(&path, &source)?;
    debug!("parsed ballots: {:?}", parsed_ballots.len());

    let candidates = config.as_ref().and_then(|c| c.candidates.clone());
    let tabulator = validate_ballots(&parsed_ballots, &candidates)?;
    let result = tabulator.tabulate();

    let settings = match &config {
        Some(c) => c.output_settings.clone(),
        None => OutputSettings {
            contest_name: io_common::simplify_file_name(&path),
            contest_date: None,
            contest_jurisdiction: None,
            contest_office: None,
        },
    };

    // Assemble the final json
    let result_js = build_summary_js(&settings, &result);
    let pretty_js_stats =
        serde_json::to_string_pretty(&result_js).context(SerializingJsonSnafu {})?;

    if let Some(out_path) = &opts.out_path {
        write_summary(out_path, &pretty_js_stats)?;
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &opts.reference_path {
        check_reference(summary_p, &pretty_js_stats)?;
    }

    let rounds = result.round_stats.len();
    let winner = result.into_winner().context(NoWinnerSnafu { rounds })?;
    info!("Winner: {}", winner);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn ballot(choices: &[&str]) -> ParsedBallot {
        ParsedBallot {
            id: None,
            count: None,
            choices: choices.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn tabulate(ballots: &[ParsedBallot]) -> Tabulation<String> {
        validate_ballots(ballots, &None).unwrap().tabulate()
    }

    // Writes a file under a fresh directory of the temporary directory.
    fn write_tmp(test_name: &str, file_name: &str, contents: &str) -> String {
        let dir = std::env::temp_dir().join(format!("rctab-{}-{}", test_name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let p = dir.join(file_name);
        fs::write(&p, contents).unwrap();
        p.display().to_string()
    }

    #[test]
    fn summary_with_transfers() {
        init();
        let tab = tabulate(&[
            ballot(&["A", "B", "C"]),
            ballot(&["B", "A", "C"]),
            ballot(&["C", "B", "A"]),
            ballot(&["A", "B", "C"]),
            ballot(&["B", "A", "C"]),
        ]);
        let js = result_stats_to_json(&tab);
        assert_eq!(
            js,
            vec![
                json!({
                    "round": 1,
                    "tally": {"A": "2", "B": "2", "C": "1"},
                    "tallyResults": [{"eliminated": "C", "transfers": {"B": "1"}}]
                }),
                json!({
                    "round": 2,
                    "tally": {"A": "2", "B": "3"},
                    "tallyResults": [{"elected": "B", "transfers": {}}]
                }),
            ]
        );
    }

    #[test]
    fn summary_with_exhausted_ballots() {
        init();
        let tab = tabulate(&[ballot(&["A"]), ballot(&["B"]), ballot(&["C"])]);
        let js = result_stats_to_json(&tab);
        assert_eq!(js.len(), 3);
        assert_eq!(
            js[0]["tallyResults"],
            json!([{"eliminated": "C", "transfers": {"exhausted": "1"}}])
        );
        assert_eq!(js[2]["tallyResults"], json!([]));

        let settings = OutputSettings {
            contest_name: "Board".to_string(),
            contest_date: None,
            contest_jurisdiction: None,
            contest_office: None,
        };
        let summary = build_summary_js(&settings, &tab);
        assert_eq!(summary["config"]["contest"], json!("Board"));
        assert_eq!(summary["config"]["threshold"], json!("2"));
    }

    #[test]
    fn counts_and_declared_candidates() {
        init();
        let mut heavy = ballot(&["B"]);
        heavy.count = Some(3);
        let mut ignored = ballot(&["A"]);
        ignored.count = Some(0);
        let cands = Some(vec![
            RcvCandidate {
                name: "A".to_string(),
            },
            RcvCandidate {
                name: "B".to_string(),
            },
        ]);
        let tc = validate_ballots(&[ballot(&["A", "B"]), heavy, ignored], &cands).unwrap();
        assert_eq!(tc.total_ballots(), 4);
        assert_eq!(tc.get_winning_proposal(), Ok("B".to_string()));

        let res = validate_ballots(&[ballot(&["A", "Z"])], &cands);
        assert!(matches!(res, Err(RcvError::InvalidBallot { .. })));
    }

    #[test]
    fn counts_overflowing_the_total() {
        init();
        let mut huge = ballot(&["A"]);
        huge.count = Some(u64::MAX);
        let mut last = ballot(&["B"]);
        last.id = Some("b2".to_string());
        let res = validate_ballots(&[huge, last], &None);
        match res {
            Err(RcvError::InvalidBallot { source, id }) => {
                assert_eq!(source, VotingErrors::TooManyBallots);
                assert_eq!(id, "b2");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn no_ballots() {
        let res = validate_ballots(&[], &None);
        assert!(matches!(res, Err(RcvError::EmptyElection { .. })));
    }

    #[test]
    fn run_from_config_file() {
        init();
        let csv_data = "id,count,c1,c2\nb1,4,A,\nb2,3,B,\nb3,2,C,A\nb4,1,D,B\n";
        write_tmp("config", "ballots.csv", csv_data);
        let config_path = write_tmp(
            "config",
            "config.json",
            r#"{
                "outputSettings": { "contestName": "Three rounds" },
                "ballotSource": {
                    "provider": "csv",
                    "filePath": "ballots.csv",
                    "idColumnIndex": 1,
                    "countColumnIndex": 2,
                    "firstVoteColumnIndex": 3
                }
            }"#,
        );
        let out_path = config_path.replace("config.json", "summary.json");
        let opts = RunOptions {
            config_path: Some(config_path),
            out_path: Some(out_path.clone()),
            ..RunOptions::default()
        };
        run_election(&opts).unwrap();

        let summary = read_summary(&out_path).unwrap();
        assert_eq!(summary["config"]["contest"], json!("Three rounds"));
        assert_eq!(summary["config"]["threshold"], json!("6"));
        let results = summary["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(
            results[2]["tallyResults"],
            json!([{"elected": "A", "transfers": {}}])
        );

        // The summary is its own reference.
        let opts = RunOptions {
            reference_path: Some(out_path.clone()),
            ..opts
        };
        run_election(&opts).unwrap();
    }

    #[test]
    fn run_without_winner() {
        init();
        let path = write_tmp(
            "nowinner",
            "ballots.json",
            r#"[{"choices": ["A"]}, {"choices": ["B"]}, {"choices": ["C"]}]"#,
        );
        let opts = RunOptions {
            input_path: Some(path),
            ..RunOptions::default()
        };
        let res = run_election(&opts);
        assert!(matches!(res, Err(RcvError::NoWinner { rounds: 3, .. })));
    }

    #[test]
    fn reference_mismatch() {
        init();
        let path = write_tmp("mismatch", "ballots.csv", "c1\nA\nA\nB\n");
        let reference = write_tmp("mismatch", "reference.json", r#"{"results": []}"#);
        let opts = RunOptions {
            input_path: Some(path),
            reference_path: Some(reference),
            ..RunOptions::default()
        };
        let res = run_election(&opts);
        assert!(matches!(res, Err(RcvError::ReferenceMismatch {})));
    }

    #[test]
    fn missing_input() {
        let res = run_election(&RunOptions::default());
        assert!(matches!(res, Err(RcvError::MissingInput {})));
    }

    #[test]
    fn unknown_input_type() {
        let path = write_tmp("unknown", "ballots.csv", "c1\nA\n");
        let opts = RunOptions {
            input_path: Some(path),
            input_type: Some("xlsx".to_string()),
            ..RunOptions::default()
        };
        let res = run_election(&opts);
        assert!(matches!(res, Err(RcvError::UnknownProvider { .. })));
    }
}
