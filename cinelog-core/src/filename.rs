use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

/// Fixed vocabulary of tokens that mark the end of the meaningful title
/// portion in a release-style filename: language tags, codecs, rip
/// sources, resolutions, release markers, and known group artifacts.
/// Matching is case-insensitive.
const NOISE_TOKENS: &[&str] = &[
    "italian",
    "italiano",
    "eng",
    "english",
    "multi",
    "sub",
    "subs",
    "ac3",
    "dts",
    "xvid",
    "divx",
    "h264",
    "x264",
    "h265",
    "x265",
    "dvdrip",
    "bdrip",
    "webrip",
    "webdl",
    "bluray",
    "hdrip",
    "cam",
    "limited",
    "uncut",
    "extended",
    "remastered",
    "1080p",
    "720p",
    "2160p",
    "4k",
    "uhd",
    "gbm",
    "i_n_r_g",
    "ita",
    "proper",
    "repack",
];

/// Plausible movie years: 1900-2039.
const YEAR_PATTERN: &str = r"(19[0-9]{2}|20[0-3][0-9])";

/// Best-guess (title, year) pair inferred from a filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleGuess {
    pub title: String,
    pub year: Option<u16>,
}

/// Infers a human-readable title and an optional year from names like
/// `Cheri.2009.iTALiAN.LiMITED.AC3.DVDRip.XviD.GBM.avi`.
///
/// Total and deterministic: the worst a garbled name can produce is an
/// empty or unhelpful title, never an error.
#[derive(Debug, Clone)]
pub struct FilenameParser {
    noise: HashSet<&'static str>,
    year: Regex,
    separators: Regex,
}

impl Default for FilenameParser {
    fn default() -> Self {
        Self {
            noise: NOISE_TOKENS.iter().copied().collect(),
            year: Regex::new(YEAR_PATTERN).unwrap(),
            separators: Regex::new(r"[._]+").unwrap(),
        }
    }
}

impl FilenameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw filename (with or without directory components and
    /// extension) into a cleaned title and an optional 4-digit year.
    ///
    /// The first noise token terminates title consumption outright; it is
    /// a prefix-truncation rule, not a filter, so a noise-like word later
    /// in a legitimate title still cuts there. `cd<n>`/`disc<n>` tokens
    /// are skipped without terminating.
    pub fn guess_title_year(&self, filename: &str) -> TitleGuess {
        let stem = Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        let cleaned = self.separators.replace_all(stem, " ");
        let cleaned = cleaned.trim();

        let mut year = None;
        let candidate = match self.year.find(cleaned) {
            Some(m) => {
                year = m.as_str().parse::<u16>().ok();
                &cleaned[..m.start()]
            }
            None => cleaned,
        };

        let mut kept: Vec<&str> = Vec::new();
        for token in candidate.split_whitespace() {
            let lowered = token.to_lowercase();
            if self.noise.contains(lowered.as_str()) {
                break;
            }
            if is_disc_token(&lowered) {
                continue;
            }
            kept.push(token);
        }

        let mut title = kept.join(" ");
        if title.is_empty() {
            // Noise as the very first token; better the raw candidate
            // than nothing.
            title = candidate.trim().to_string();
        }

        if is_all_uppercase(&title) {
            title = title_case(&title);
        }

        TitleGuess { title, year }
    }
}

/// `cd1`, `disc2`, ... (already lower-cased); prefix match, so trailing
/// characters after the digits do not disqualify the token.
fn is_disc_token(token: &str) -> bool {
    ["cd", "disc"].iter().any(|prefix| {
        token
            .strip_prefix(prefix)
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c.is_ascii_digit())
    })
}

/// At least one cased character and no lower-case ones.
fn is_all_uppercase(s: &str) -> bool {
    let mut has_upper = false;
    for c in s.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_upper = true;
        }
    }
    has_upper
}

/// CHERI -> Cheri; a letter starts a new word after any non-letter.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guess(name: &str) -> (String, Option<u16>) {
        let parser = FilenameParser::new();
        let g = parser.guess_title_year(name);
        (g.title, g.year)
    }

    #[test]
    fn release_style_name_with_year_and_noise() {
        assert_eq!(
            guess("Cheri.2009.iTALiAN.LiMITED.AC3.DVDRip.XviD.GBM.avi"),
            ("Cheri".to_string(), Some(2009))
        );
    }

    #[test]
    fn lowercase_title_is_preserved() {
        assert_eq!(
            guess("the.matrix.1999.avi"),
            ("the matrix".to_string(), Some(1999))
        );
    }

    #[test]
    fn all_uppercase_title_is_title_cased() {
        assert_eq!(
            guess("CASABLANCA.720p.mkv"),
            ("Casablanca".to_string(), None)
        );
    }

    #[test]
    fn uppercase_with_digits_still_title_cases() {
        assert_eq!(
            guess("2.FAST.2.FURIOUS.mkv"),
            ("2 Fast 2 Furious".to_string(), None)
        );
    }

    #[test]
    fn disc_tokens_are_skipped_not_terminating() {
        assert_eq!(guess("Movie.CD1.2010.mkv"), ("Movie".to_string(), Some(2010)));
        assert_eq!(
            guess("Movie.DISC2.Part.mkv"),
            ("Movie Part".to_string(), None)
        );
    }

    #[test]
    fn first_noise_token_truncates_the_rest() {
        // "extended" terminates even though more title-looking words follow.
        assert_eq!(
            guess("Family.Extended.Cut.2023.mkv"),
            ("Family".to_string(), Some(2023))
        );
    }

    #[test]
    fn noise_as_first_token_falls_back_to_candidate() {
        assert_eq!(
            guess("Extended.Family.mkv"),
            ("Extended Family".to_string(), None)
        );
    }

    #[test]
    fn leftmost_year_wins() {
        let (title, year) = guess("2001.A.Space.Odyssey.1968.avi");
        assert_eq!(year, Some(2001));
        assert_eq!(title, "");
    }

    #[test]
    fn directory_components_are_stripped() {
        assert_eq!(
            guess("films/drama/Cheri.2009.avi"),
            ("Cheri".to_string(), Some(2009))
        );
    }

    #[test]
    fn no_year_uses_whole_name() {
        assert_eq!(guess("Some Movie.mkv"), ("Some Movie".to_string(), None));
    }

    #[test]
    fn empty_name_yields_empty_title() {
        assert_eq!(guess(""), (String::new(), None));
    }

    #[test]
    fn underscores_collapse_to_spaces() {
        assert_eq!(
            guess("My__Great___Movie.2012.mkv"),
            ("My Great Movie".to_string(), Some(2012))
        );
    }

    #[test]
    fn year_window_bounds() {
        assert_eq!(guess("Movie.1899.mkv"), ("Movie 1899".to_string(), None));
        assert_eq!(guess("Movie.1900.mkv"), ("Movie".to_string(), Some(1900)));
        assert_eq!(guess("Movie.2039.mkv"), ("Movie".to_string(), Some(2039)));
        assert_eq!(guess("Movie.2040.mkv"), ("Movie 2040".to_string(), None));
    }
}
