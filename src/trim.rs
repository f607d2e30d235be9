//! Post-processing for paper listings.

/// Number of lines kept by [`trim_papers`].
pub const MAX_LINES: usize = 5;

/// Keep the first five non-blank lines, each stripped of surrounding whitespace.
pub fn trim_papers(raw: &str) -> String {
    raw.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_LINES)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_blank_lines() {
        assert_eq!(trim_papers("a\n\nb\nc\n\nd\ne\nf"), "a\nb\nc\nd\ne");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(trim_papers(""), "");
        assert_eq!(trim_papers("\n  \n\t\n"), "");
    }

    #[test]
    fn test_strips_lines() {
        assert_eq!(trim_papers("  Title: X  \r\n\tAuthors: Y"), "Title: X\nAuthors: Y");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "one\n\ntwo\nthree\nfour\nfive\nsix\nseven",
            "Published: 2021\n Title: A \n\n",
            "single",
        ];
        for input in inputs {
            let once = trim_papers(input);
            assert!(once.split('\n').count() <= MAX_LINES);
            assert_eq!(trim_papers(&once), once);
        }
    }

    #[test]
    fn test_prefix_of_non_blank_lines() {
        let input = "x\n\n y \nz\nw\nv\nu\nt";
        let expected: Vec<&str> = input
            .split('\n')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let trimmed = trim_papers(input);
        let got: Vec<&str> = trimmed.split('\n').collect();
        assert_eq!(got, expected[..got.len()]);
    }
}
