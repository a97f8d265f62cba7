use std::path::Path;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Ballot ids default to the file name followed by the line number.
pub fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

/// Guesses the input type from the extension of the file.
pub fn input_type_from_path(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
        .filter(|s| s == "csv" || s == "json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ids() {
        let f = make_default_id("/tmp/data/ballots.csv");
        assert_eq!(f(12), "ballots.csv-00000012");
    }

    #[test]
    fn input_types() {
        assert_eq!(input_type_from_path("a/b.CSV"), Some("csv".to_string()));
        assert_eq!(input_type_from_path("b.json"), Some("json".to_string()));
        assert_eq!(input_type_from_path("b.xlsx"), None);
        assert_eq!(input_type_from_path("ballots"), None);
    }
}
