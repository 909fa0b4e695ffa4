use std::{fs::File, io::BufReader, path::Path};

use serde::de::DeserializeOwned;

use crate::error::Result;

/// Parse any option struct (e.g. `SiteSearch`, `OverlapOptions`, `AggregationPlan`) from JSON text.
pub fn from_json_str<T: DeserializeOwned>(text: &str) -> Result<T> {
    Ok(serde_json::from_str(text)?)
}

/// Read any option struct from a JSON file at `path`.
pub fn from_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::{CastAs, Error, OverlapOptions, SearchMethod, SiteSearch};

    #[test]
    fn site_search_defaults_to_clustering() {
        let params: SiteSearch = from_json_str(r#"{
            "key": "GEOID",
            "weight_col": "population",
            "search_distance": 5280.0
        }"#).unwrap();

        assert_eq!(params.method, SearchMethod::Clustering);
        assert_eq!(params.search_distance, 5280.0);
    }

    #[test]
    fn unknown_search_method_is_rejected() {
        let err = from_json_str::<SiteSearch>(r#"{
            "key": "GEOID", "weight_col": "pop", "search_distance": 1.0, "method": "genetic"
        }"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn overlap_options_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{
            "transfer_field": "SPA_NAME",
            "new_name": "neighborhood",
            "cast_as": "int_string",
            "fix_missing": {{}}
        }}"#).unwrap();

        let options: OverlapOptions = from_json_file(file.path()).unwrap();
        assert_eq!(options.cast_as, CastAs::IntString);
        let reference = options.fix_missing.unwrap();
        assert_eq!(reference.field, "par_city");
        assert_eq!(reference.value, "CLEVELAND");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = from_json_file::<SiteSearch>(Path::new("/nonexistent/site.json")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
