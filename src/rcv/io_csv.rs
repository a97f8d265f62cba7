// Primitives for reading CSV files.

use std::io::Read;

use crate::rcv::{io_common::make_default_id, *};

pub fn read_csv_ranking(path: &str, cfs: &FileSource) -> RcvResult<Vec<ParsedBallot>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    parse_csv_ranking(rdr, path, cfs)
}

pub fn parse_csv_ranking<R: Read>(
    rdr: csv::Reader<R>,
    path: &str,
    cfs: &FileSource,
) -> RcvResult<Vec<ParsedBallot>> {
    let default_id = make_default_id(path);

    let id_idx_o = cfs.id_column_index()?;
    let count_idx_o = cfs.count_column_index()?;
    let choices_start_col = cfs.first_vote_column_index()?;
    let row_offset = if cfs.has_headers() { 1 } else { 0 };

    let mut res: Vec<ParsedBallot> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate().skip(row_offset) {
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        debug!("read_csv_ranking: lineno: {:?} row: {:?}", lineno, line);

        let id = if let Some(id_idx) = id_idx_o {
            line.get(id_idx)
                .context(CsvLineTooShortSnafu { lineno })?
                .to_string()
        } else {
            default_id(lineno)
        };

        let count: Option<u64> = if let Some(count_idx) = count_idx_o {
            let s = line
                .get(count_idx)
                .context(CsvLineTooShortSnafu { lineno })?
                .trim();
            let c = s.parse::<u64>().ok().context(CsvCountSnafu {
                lineno,
                value: s.to_string(),
            })?;
            Some(c)
        } else {
            None
        };

        // The id and count columns may sit among the choice columns.
        let choices: Vec<String> = line
            .iter()
            .enumerate()
            .skip(choices_start_col)
            .filter(|(col, _)| Some(*col) != id_idx_o && Some(*col) != count_idx_o)
            .map(|(_, s)| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        res.push(ParsedBallot {
            id: Some(id),
            count,
            choices,
        });
    }
    Ok(res)
}
