use crate::error::CompileError;
use crate::intent::Intent;
use log::{info, warn};
use std::fs;
use std::path::Path;

/// Serialization format of an intent document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentFormat {
    Json,
    Yaml,
}

impl IntentFormat {
    /// Pick the format from the file extension. Unknown extensions are read
    /// as YAML, which also accepts JSON documents.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => IntentFormat::Json,
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                IntentFormat::Yaml
            }
            other => {
                warn!("Unrecognized intent extension {:?}, parsing as YAML", other);
                IntentFormat::Yaml
            }
        }
    }
}

/// Parse an intent document from text
pub fn parse_intent(content: &str, format: IntentFormat) -> Result<Intent, CompileError> {
    let intent = match format {
        IntentFormat::Json => serde_json::from_str(content)?,
        IntentFormat::Yaml => serde_yaml::from_str(content)?,
    };
    Ok(intent)
}

/// Load and parse an intent document from a JSON or YAML file.
///
/// Only the document structure is checked here; semantic validation happens
/// when the document is compiled.
pub fn load_intent(intent_path: &Path) -> Result<Intent, CompileError> {
    info!("Loading intent from: {:?}", intent_path);

    let content = fs::read_to_string(intent_path)?;
    let intent = parse_intent(&content, IntentFormat::from_path(intent_path))?;

    info!(
        "Intent declares {} ASes, {} routers and {} links",
        intent.ases.len(),
        intent.routers.len(),
        intent.links.len()
    );
    Ok(intent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    const JSON: &str = r#"{
  "ases": {
    "100": {
      "ip_pools": { "loopbacks": "2001:100::/64" },
      "routers": ["R1"],
      "igp": { "type": "ripng", "process_name": "CORE" }
    }
  },
  "routers": { "R1": { "as": 100, "router_id": "1.1.1.1" } },
  "links": [],
  "bgp": { "required": true, "ibgp": { "mode": "full_mesh" } }
}"#;

    #[test]
    fn test_format_from_path() {
        assert_eq!(IntentFormat::from_path(Path::new("a/intent.json")), IntentFormat::Json);
        assert_eq!(IntentFormat::from_path(Path::new("intent.YAML")), IntentFormat::Yaml);
        assert_eq!(IntentFormat::from_path(Path::new("intent.yml")), IntentFormat::Yaml);
        assert_eq!(IntentFormat::from_path(Path::new("intent")), IntentFormat::Yaml);
    }

    #[test]
    fn test_load_json_intent() {
        let mut temp_file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(temp_file, "{}", JSON).unwrap();

        let intent = load_intent(temp_file.path()).unwrap();
        assert_eq!(intent.routers.len(), 1);
        assert_eq!(intent.ases.values().next().unwrap().igp.process_name.as_deref(), Some("CORE"));
        assert!(intent.bgp.required);
    }

    #[test]
    fn test_unknown_extension_accepts_json() {
        let mut temp_file = Builder::new().suffix(".intent").tempfile().unwrap();
        write!(temp_file, "{}", JSON).unwrap();
        assert!(load_intent(temp_file.path()).is_ok());
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            parse_intent("{ \"ases\": 3 }", IntentFormat::Json),
            Err(CompileError::Json(_))
        ));
        assert!(matches!(
            parse_intent("ases: [", IntentFormat::Yaml),
            Err(CompileError::Yaml(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_intent(Path::new("/nonexistent/intent.json")),
            Err(CompileError::Io(_))
        ));
    }
}
