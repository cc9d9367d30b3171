//! Embedded data block extraction and `[SECTION]` splitting

/// Markers that start the embedded documentation block of a script
const DATA_MARKERS: [&str; 2] = ["__DATA__", "__END__"];

pub const SECTION_SUMMARY: &str = "SUMMARY";
pub const SECTION_SYNOPSIS: &str = "SYNOPSIS";
pub const SECTION_DESCRIPTION: &str = "DESCRIPTION";
pub const SECTION_VERSION: &str = "VERSION";
pub const SECTION_NAMEARGS: &str = "NAMEARGS";
pub const SECTION_ARGS: &str = "ARGS";
pub const SECTION_OPTIONS: &str = "OPTIONS";

/// Sections the compiler and renderer read
pub const KNOWN_SECTIONS: [&str; 7] = [
    SECTION_SUMMARY,
    SECTION_SYNOPSIS,
    SECTION_DESCRIPTION,
    SECTION_VERSION,
    SECTION_NAMEARGS,
    SECTION_ARGS,
    SECTION_OPTIONS,
];

/// Return the text following the first `__DATA__`/`__END__` line.
///
/// Scripts without a marker are treated as a bare spec block.
pub fn extract_data_block(script: &str) -> &str {
    let mut offset = 0;
    for line in script.split_inclusive('\n') {
        offset += line.len();
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if DATA_MARKERS.contains(&trimmed) {
            return &script[offset..];
        }
    }
    script
}

/// A spec block split into named sections, in order of appearance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    entries: Vec<(String, String)>,
}

impl Sections {
    pub fn parse(text: &str) -> Self {
        let mut entries: Vec<(String, String)> = Vec::new();
        let mut current: Option<usize> = None;

        for line in text.lines() {
            if let Some(name) = section_header(line) {
                current = match entries.iter().position(|(n, _)| n == name) {
                    Some(idx) => Some(idx),
                    None => {
                        entries.push((name.to_string(), String::new()));
                        Some(entries.len() - 1)
                    }
                };
                continue;
            }

            // Text before the first header has no section to belong to
            if let Some(idx) = current {
                let body = &mut entries[idx].1;
                body.push_str(line);
                body.push('\n');
            }
        }

        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, body)| body.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Section body with surrounding blank lines removed, or empty
    pub fn text(&self, name: &str) -> String {
        self.get(name).map(|s| s.trim().to_string()).unwrap_or_default()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }
}

fn section_header(line: &str) -> Option<&str> {
    let name = line.trim().strip_prefix('[')?.strip_suffix(']')?;
    let valid = !name.is_empty()
        && name.starts_with(|c: char| c.is_ascii_uppercase())
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == '-');
    valid.then_some(name)
}
