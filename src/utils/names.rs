use std::collections::{HashMap, HashSet};

/// Duplicate-name resolver for a single namespace
///
/// The first claim of a base name returns it unchanged; later claims append `_2`, `_3`, ...
/// Each namespace gets its own `UniqueNames`, so collisions never leak between siblings.
#[derive(Debug, Default)]
pub struct UniqueNames {
    counts: HashMap<String, usize>,
    taken: HashSet<String>,
}

impl UniqueNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver that will never hand out any of `names`
    pub fn with_reserved<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { counts: HashMap::new(), taken: names.into_iter().map(Into::into).collect() }
    }

    /// Claim a name derived from `base`, suffixing `_N` on repeats
    pub fn claim(&mut self, base: &str) -> String {
        let count = self.counts.entry(base.to_string()).or_insert(0);
        *count += 1;

        let mut candidate =
            if *count == 1 { base.to_string() } else { format!("{}_{}", base, count) };
        while self.taken.contains(&candidate) {
            *count += 1;
            candidate = format!("{}_{}", base, count);
        }

        self.taken.insert(candidate.clone());
        candidate
    }

    /// Claim a file name, inserting `_N` before the extension on collision
    ///
    /// `notes.md` becomes `notes_2.md`; `README` becomes `README_2`.
    pub fn claim_file(&mut self, filename: &str) -> String {
        if self.taken.insert(filename.to_string()) {
            return filename.to_string();
        }

        let (stem, ext) = split_extension(filename);
        let mut counter = 2;
        loop {
            let candidate = match ext {
                Some(ext) => format!("{}_{}.{}", stem, counter, ext),
                None => format!("{}_{}", stem, counter),
            };
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }
}

/// Split on the last `.`, returning `(stem, extension)`
pub fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (filename, None),
    }
}

/// Make a caller-supplied file name usable as a single path component
///
/// Path separators and NUL become `_`; empty, `.` and `..` become `untitled`.
pub fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => "untitled".to_string(),
        _ => cleaned,
    }
}
