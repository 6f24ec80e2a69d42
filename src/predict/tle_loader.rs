use std::fs;
use std::path::Path;

use sgp4::Elements;

use crate::overhead::Satellite;
use crate::predict::PredictError;

/// Loads satellites from a TLE file, or from every `.tle`/`.txt` file in a
/// directory.
pub struct TleLoader;

impl TleLoader {
    pub fn load(path: &Path) -> Result<Vec<Satellite>, PredictError> {
        if !path.exists() {
            return Err(PredictError::PathNotFound(path.display().to_string()));
        }

        let mut satellites = if path.is_dir() {
            Self::load_dir(path)?
        } else {
            Self::load_file(path)?
        };
        satellites.sort_by(|a, b| a.norad_id.cmp(&b.norad_id).then(a.name.cmp(&b.name)));
        satellites.dedup_by(|a, b| a.norad_id.is_some() && a.norad_id == b.norad_id);
        Ok(satellites)
    }

    fn load_dir(dir: &Path) -> Result<Vec<Satellite>, PredictError> {
        let mut satellites = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_tle = path
                .extension()
                .is_some_and(|ext| ext == "tle" || ext == "txt");
            if !path.is_file() || !is_tle {
                continue;
            }
            match Self::load_file(&path) {
                Ok(loaded) => satellites.extend(loaded),
                Err(e) => {
                    log::warn!("Failed to parse TLE file {}: {}", path.display(), e);
                }
            }
        }
        Ok(satellites)
    }

    /// Parse a single TLE file (may contain multiple satellites)
    pub fn load_file(path: &Path) -> Result<Vec<Satellite>, PredictError> {
        let content = fs::read_to_string(path)?;
        let filename = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        parse_tle_content(&content, &filename)
    }
}

pub fn parse_tle_content(content: &str, source: &str) -> Result<Vec<Satellite>, PredictError> {
    parse_multi_tle(content)
        .into_iter()
        .map(|(name, line1, line2)| {
            Elements::from_tle(name, line1.as_bytes(), line2.as_bytes())
                .map(Satellite::from_elements)
                .map_err(|e| PredictError::InvalidTle {
                    file: source.to_string(),
                    message: e.to_string(),
                })
        })
        .collect()
}

/// Parse multi-satellite TLE content
fn parse_multi_tle(content: &str) -> Vec<(Option<String>, String, String)> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            // 2-line TLE (no name)
            result.push((None, lines[i].to_string(), lines[i + 1].to_string()));
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            // 3-line TLE (with name)
            result.push((
                Some(lines[i].to_string()),
                lines[i + 1].to_string(),
                lines[i + 2].to_string(),
            ));
            i += 3;
        } else {
            i += 1;
        }
    }

    result
}
