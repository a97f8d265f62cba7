use crate::rcv::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    #[serde(rename = "contestDate")]
    pub contest_date: Option<String>,
    #[serde(rename = "contestJurisdiction")]
    pub contest_jurisdiction: Option<String>,
    #[serde(rename = "contestOffice")]
    pub contest_office: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    pub date: Option<String>,
    pub jurisdiction: Option<String>,
    pub office: Option<String>,
    pub threshold: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "firstVoteColumnIndex")]
    pub first_vote_column_index: Option<JSValue>,
    #[serde(rename = "idColumnIndex")]
    pub id_column_index: Option<JSValue>,
    #[serde(rename = "countColumnIndex")]
    pub count_column_index: Option<JSValue>,
    #[serde(rename = "hasHeaders")]
    pub has_headers: Option<bool>,
}

impl FileSource {
    /// The 0-based column of the first choice. Defaults to the first column.
    pub fn first_vote_column_index(&self) -> RcvResult<usize> {
        match &self.first_vote_column_index {
            None => Ok(0),
            x => Ok(read_js_index(x)? - 1),
        }
    }

    pub fn id_column_index(&self) -> RcvResult<Option<usize>> {
        match &self.id_column_index {
            None => Ok(None),
            x => Ok(Some(read_js_index(x)? - 1)),
        }
    }

    pub fn count_column_index(&self) -> RcvResult<Option<usize>> {
        match &self.count_column_index {
            None => Ok(None),
            x => Ok(Some(read_js_index(x)? - 1)),
        }
    }

    pub fn has_headers(&self) -> bool {
        self.has_headers.unwrap_or(true)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RcvCandidate {
    pub name: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RcvConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "ballotSource")]
    pub ballot_source: Option<FileSource>,
    pub candidates: Option<Vec<RcvCandidate>>,
}

pub fn read_config(path: &str) -> RcvResult<RcvConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })
}

pub fn read_summary(path: &str) -> RcvResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read content: {:?}", contents);
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(js)
}

// Column indexes are 1-based, written either as numbers or as strings.
fn read_js_index(x: &Option<JSValue>) -> RcvResult<usize> {
    let idx = match x {
        Some(JSValue::Number(n)) => n.as_u64().map(|x| x as usize),
        Some(JSValue::String(s)) => s.parse::<usize>().ok(),
        _ => None,
    };
    match idx {
        Some(i) if i >= 1 => Ok(i),
        _ => ParsingJsonNumberSnafu { value: format!("{:?}", x) }.fail(),
    }
}
